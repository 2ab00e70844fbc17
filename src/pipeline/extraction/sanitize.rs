/// Strip OCR debris from one line of prescription text.
/// Keeps letters, digits, whitespace and the punctuation that appears on
/// medication labels; drops control characters and stray glyphs.
pub fn sanitize_line(raw: &str) -> String {
    raw.chars()
        .filter_map(|c| {
            if c.is_whitespace() {
                // Tabs and other control whitespace still separate words.
                Some(if c.is_control() { ' ' } else { c })
            } else if c.is_alphanumeric() || is_label_punctuation(c) {
                Some(c)
            } else {
                None
            }
        })
        .collect::<String>()
        .trim()
        .to_string()
}

/// A line is noise when nothing readable survives sanitizing
/// (rulers like `-----`, stray `***`).
pub fn is_noise_line(sanitized: &str) -> bool {
    !sanitized.chars().any(char::is_alphanumeric)
}

fn is_label_punctuation(c: char) -> bool {
    matches!(
        c,
        '.' | ','
            | ';'
            | ':'
            | '-'
            | '/'
            | '('
            | ')'
            | '['
            | ']'
            | '+'
            | '='
            | '%'
            | '#'
            | '&'
            | '\''
            | '"'
            | '!'
            | '?'
            | '*'
            | '_'
            | 'µ'
            | '\u{2013}' // En-dash
            | '\u{2019}' // Right single quotation mark
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_control_characters() {
        let clean = sanitize_line("Metformin\x00 500mg\x01\x02");
        assert_eq!(clean, "Metformin 500mg");
    }

    #[test]
    fn strips_ocr_glyphs() {
        assert_eq!(sanitize_line("|Aspirin 81mg~"), "Aspirin 81mg");
        assert_eq!(sanitize_line("Amoxicillin 250mg ©®"), "Amoxicillin 250mg");
    }

    #[test]
    fn trims_surrounding_whitespace() {
        assert_eq!(sanitize_line("  \tLisinopril 10mg \r"), "Lisinopril 10mg");
    }

    #[test]
    fn tabs_become_spaces() {
        assert_eq!(sanitize_line("Metformin\t500mg"), "Metformin 500mg");
    }

    #[test]
    fn preserves_label_punctuation() {
        let raw = "Rx #12: Ibuprofen 200mg (1-2 tablets) / 8h, 0.5%";
        assert_eq!(sanitize_line(raw), raw);
    }

    #[test]
    fn preserves_accented_letters() {
        assert_eq!(sanitize_line("Paracétamol 500mg"), "Paracétamol 500mg");
    }

    #[test]
    fn noise_lines() {
        assert!(is_noise_line(""));
        assert!(is_noise_line("-----"));
        assert!(is_noise_line("* * *"));
        assert!(!is_noise_line("Rx 1"));
        assert!(!is_noise_line("5"));
    }
}
