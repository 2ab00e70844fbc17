//! Token classification: one `Line` → contiguous role-tagged `Token`s.
//!
//! Precedence, highest first: frequency instruction, route keyword,
//! dosage quantity+unit, drug name. A lower-precedence match that overlaps
//! an accepted span is discarded, so "Take 2 tablets daily" is a single
//! instruction and never a 2-tablet dosage. Whatever is left is `Unknown`.
//!
//! Classification never looks at neighbouring lines.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::types::{DoseSchedule, Line, TimeOfDay, Token, TokenRole};

/// `take <count> <form>(s) <when>`, the instruction sentence printed under a drug.
static FREQUENCY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\btake\s+([0-9]+)\s*(tablet|capsule|pill)s?\s*(daily|twice|morning|evening|night)\b",
    )
    .expect("Invalid frequency regex pattern")
});

/// Decimal quantity followed by a dosage unit. Accepts `1,000mg`.
/// ASCII digits only: `f64::from_str` rejects fullwidth and other scripts.
static DOSAGE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b([0-9]{1,3}(?:,[0-9]{3})+(?:\.[0-9]+)?|[0-9]+(?:\.[0-9]+)?)\s*(tablets?|capsules?|mg|ml|g)\b",
    )
        .expect("Invalid dosage regex pattern")
});

static ROUTE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:oral|orally|po|sublingual|topical|inhaled|nasal|rectal|ophthalmic|subcutaneous|intramuscular|intravenous)\b",
    )
    .expect("Invalid route regex pattern")
});

/// Imperative verbs that open an instruction rather than a drug name.
const INSTRUCTION_VERBS: &[&str] = &["apply", "give", "take", "use"];

type Span = (usize, usize, TokenRole);

/// Classify every byte of `line` into tokens ordered by position.
pub fn classify(line: &Line) -> Vec<Token> {
    let text = line.text.as_str();
    let mut spans: Vec<Span> = FREQUENCY_PATTERN
        .find_iter(text)
        .map(|m| (m.start(), m.end(), TokenRole::FrequencyWord))
        .collect();

    for m in ROUTE_PATTERN.find_iter(text) {
        if !overlaps(&spans, m.start(), m.end()) {
            spans.push((m.start(), m.end(), TokenRole::RouteWord));
        }
    }

    for caps in DOSAGE_PATTERN.captures_iter(text) {
        let (Some(whole), Some(quantity), Some(unit)) = (caps.get(0), caps.get(1), caps.get(2))
        else {
            continue;
        };
        if overlaps(&spans, whole.start(), whole.end()) {
            continue;
        }
        spans.push((quantity.start(), quantity.end(), TokenRole::Quantity));
        spans.push((unit.start(), unit.end(), TokenRole::Unit));
    }

    spans.sort_by_key(|span| span.0);

    let mut names = Vec::new();
    for (i, &(start, _, role)) in spans.iter().enumerate() {
        if role != TokenRole::Quantity {
            continue;
        }
        let floor = if i == 0 { 0 } else { spans[i - 1].1 };
        let mut found = name_span(text, floor, start);

        // "Metformin PO 500mg": the name sits left of the route word.
        if found.is_none() && i > 0 && spans[i - 1].2 == TokenRole::RouteWord {
            let route_start = spans[i - 1].0;
            let route_floor = if i == 1 { 0 } else { spans[i - 2].1 };
            found = name_span(text, route_floor, route_start);
        }

        if let Some((name_start, name_end)) = found {
            names.push((name_start, name_end, TokenRole::Name));
        }
    }
    spans.extend(names);
    spans.sort_by_key(|span| span.0);

    cover_line(line, &spans)
}

/// Lowercase singular form of a dosage unit (`Tablets` → `tablet`).
pub fn normalize_unit(unit: &str) -> String {
    let lower = unit.trim().to_lowercase();
    match lower.as_str() {
        "tablets" => "tablet".to_string(),
        "capsules" => "capsule".to_string(),
        _ => lower,
    }
}

/// Parse a quantity token, tolerating thousands separators.
pub fn parse_quantity(text: &str) -> Option<f64> {
    text.replace(',', "").parse::<f64>().ok()
}

/// Read the structured schedule out of an instruction sentence.
pub fn parse_schedule(instructions: &str) -> Option<DoseSchedule> {
    let caps = FREQUENCY_PATTERN.captures(instructions)?;
    schedule_from_captures(&caps)
}

fn schedule_from_captures(caps: &Captures<'_>) -> Option<DoseSchedule> {
    let units_per_dose = caps.get(1)?.as_str().parse::<u32>().ok()?;
    let form = caps.get(2)?.as_str().to_lowercase();
    let (times_per_day, time_of_day) = match caps.get(3)?.as_str().to_lowercase().as_str() {
        "twice" => (2, None),
        "morning" => (1, Some(TimeOfDay::Morning)),
        "evening" => (1, Some(TimeOfDay::Evening)),
        "night" => (1, Some(TimeOfDay::Night)),
        _ => (1, None),
    };
    Some(DoseSchedule {
        units_per_dose,
        form,
        times_per_day,
        time_of_day,
    })
}

fn overlaps(spans: &[Span], start: usize, end: usize) -> bool {
    spans.iter().any(|&(s, e, _)| start < e && s < end)
}

/// Longest run of whitespace-separated alphabetic words ending right
/// before `quantity_start`, never reaching left of `floor`.
fn name_span(text: &str, floor: usize, quantity_start: usize) -> Option<(usize, usize)> {
    let region = &text[floor..quantity_start];
    let mut words: Vec<(usize, usize)> = Vec::new();
    let mut cursor = region.trim_end().len();

    while cursor > 0 {
        let head = &region[..cursor];
        let Some(word_start) = head
            .char_indices()
            .rev()
            .take_while(|(_, c)| c.is_alphabetic())
            .last()
            .map(|(i, _)| i)
        else {
            break;
        };
        words.push((word_start, cursor));

        let before = &head[..word_start];
        if !before.chars().next_back().map_or(true, char::is_whitespace) {
            // Punctuation glued to the word ends the run.
            break;
        }
        cursor = before.trim_end().len();
    }

    words.reverse();
    let first = words
        .iter()
        .position(|&(s, e)| !is_instruction_verb(&region[s..e]))?;
    let (start, _) = words[first];
    let (_, end) = *words.last()?;
    Some((floor + start, floor + end))
}

fn is_instruction_verb(word: &str) -> bool {
    INSTRUCTION_VERBS
        .iter()
        .any(|verb| verb.eq_ignore_ascii_case(word))
}

/// Turn sorted, non-overlapping spans into tokens, filling gaps with `Unknown`.
fn cover_line(line: &Line, spans: &[Span]) -> Vec<Token> {
    let text = line.text.as_str();
    let mut tokens = Vec::with_capacity(spans.len() * 2 + 1);
    let mut cursor = 0;

    let mut push = |start: usize, end: usize, role: TokenRole| {
        tokens.push(Token {
            text: text[start..end].to_string(),
            role,
            line_index: line.index,
            span_start: start,
            span_end: end,
        });
    };

    for &(start, end, role) in spans {
        if start > cursor {
            push(cursor, start, TokenRole::Unknown);
        }
        push(start, end, role);
        cursor = end;
    }
    if cursor < text.len() {
        push(cursor, text.len(), TokenRole::Unknown);
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_line(text: &str) -> Line {
        Line {
            index: 0,
            text: text.to_string(),
        }
    }

    fn classified(text: &str) -> Vec<(TokenRole, String)> {
        classify(&make_line(text))
            .into_iter()
            .filter(Token::is_classified)
            .map(|t| (t.role, t.text))
            .collect()
    }

    fn assert_covers(text: &str) {
        let tokens = classify(&make_line(text));
        let mut cursor = 0;
        for token in &tokens {
            assert_eq!(token.span_start, cursor, "gap or overlap in {text:?}: {tokens:?}");
            assert!(token.span_end > token.span_start, "empty token in {text:?}");
            assert_eq!(token.text, &text[token.span_start..token.span_end]);
            cursor = token.span_end;
        }
        assert_eq!(cursor, text.len(), "line {text:?} not fully covered");
    }

    #[test]
    fn drug_line_yields_name_quantity_unit() {
        assert_eq!(
            classified("Metformin 500mg"),
            vec![
                (TokenRole::Name, "Metformin".into()),
                (TokenRole::Quantity, "500".into()),
                (TokenRole::Unit, "mg".into()),
            ]
        );
    }

    #[test]
    fn multi_word_name_and_spaced_unit() {
        assert_eq!(
            classified("Vitamin C 1.5 g"),
            vec![
                (TokenRole::Name, "Vitamin C".into()),
                (TokenRole::Quantity, "1.5".into()),
                (TokenRole::Unit, "g".into()),
            ]
        );
    }

    #[test]
    fn instruction_line_is_one_frequency_token() {
        assert_eq!(
            classified("Take 2 tablets daily"),
            vec![(TokenRole::FrequencyWord, "Take 2 tablets daily".into())]
        );
    }

    #[test]
    fn frequency_wins_over_dosage_inside_it() {
        let roles: Vec<TokenRole> = classified("take 1 capsule night")
            .into_iter()
            .map(|(r, _)| r)
            .collect();
        assert_eq!(roles, vec![TokenRole::FrequencyWord]);
    }

    #[test]
    fn name_stops_at_punctuation() {
        let tokens = classified("Rx: Lisinopril 10mg");
        assert_eq!(tokens[0], (TokenRole::Name, "Lisinopril".into()));
    }

    #[test]
    fn glued_punctuation_keeps_adjacent_run() {
        let tokens = classified("Co-Amoxiclav 625mg");
        assert_eq!(tokens[0], (TokenRole::Name, "Amoxiclav".into()));
    }

    #[test]
    fn instruction_verb_is_not_a_name() {
        let tokens = classified("Take 2 tablets with food");
        assert_eq!(
            tokens,
            vec![
                (TokenRole::Quantity, "2".into()),
                (TokenRole::Unit, "tablets".into()),
            ]
        );
        let tokens = classified("Take Ibuprofen 200mg");
        assert_eq!(tokens[0], (TokenRole::Name, "Ibuprofen".into()));
    }

    #[test]
    fn route_word_bounds_name() {
        assert_eq!(
            classified("Oral Amoxicillin 250 mg"),
            vec![
                (TokenRole::RouteWord, "Oral".into()),
                (TokenRole::Name, "Amoxicillin".into()),
                (TokenRole::Quantity, "250".into()),
                (TokenRole::Unit, "mg".into()),
            ]
        );
    }

    #[test]
    fn name_before_route_word() {
        assert_eq!(
            classified("Amoxicillin Oral 250mg"),
            vec![
                (TokenRole::Name, "Amoxicillin".into()),
                (TokenRole::RouteWord, "Oral".into()),
                (TokenRole::Quantity, "250".into()),
                (TokenRole::Unit, "mg".into()),
            ]
        );
        assert_eq!(classified("Metformin PO 500mg")[0], (TokenRole::Name, "Metformin".into()));
        assert_covers("Amoxicillin Oral 250mg");
    }

    #[test]
    fn route_word_alone_is_not_a_name() {
        let roles: Vec<TokenRole> = classified("Oral 250mg").into_iter().map(|(r, _)| r).collect();
        assert_eq!(roles, vec![TokenRole::RouteWord, TokenRole::Quantity, TokenRole::Unit]);
    }

    #[test]
    fn non_ascii_digits_are_not_quantities() {
        assert!(classified("Metformin ５００mg").is_empty());
        assert!(classified("Metformin ٥٠٠mg").is_empty());
        assert!(parse_schedule("Take ２ tablets daily").is_none());
    }

    #[test]
    fn two_drugs_on_one_line() {
        let names: Vec<String> = classified("Metformin 500mg, Glipizide 5mg")
            .into_iter()
            .filter(|(r, _)| *r == TokenRole::Name)
            .map(|(_, t)| t)
            .collect();
        assert_eq!(names, vec!["Metformin", "Glipizide"]);
    }

    #[test]
    fn number_inside_word_is_not_quantity() {
        assert!(classified("B12mg booster").is_empty());
    }

    #[test]
    fn unit_needs_word_boundary() {
        assert!(classified("Sugar 500 grams").is_empty());
    }

    #[test]
    fn thousands_separator_quantity() {
        let tokens = classified("Calcium 1,000mg");
        assert_eq!(tokens[1], (TokenRole::Quantity, "1,000".into()));
        assert_eq!(parse_quantity("1,000"), Some(1000.0));
    }

    #[test]
    fn coverage_holds_for_assorted_lines() {
        for text in [
            "Metformin 500mg",
            "Take 2 tablets daily",
            "  Dr. Smith, Clinic  ",
            "Oral Amoxicillin 250 mg take 1 capsule twice",
            "Paracétamol 500mg",
            "500mg",
            "Metformin 500mg, Glipizide 5mg; take 1 tablet morning",
            "",
        ] {
            assert_covers(text);
        }
    }

    #[test]
    fn token_line_index_matches_line() {
        let line = Line {
            index: 7,
            text: "Aspirin 81mg".into(),
        };
        assert!(classify(&line).iter().all(|t| t.line_index == 7));
    }

    #[test]
    fn normalize_unit_folds_plural_and_case() {
        assert_eq!(normalize_unit("Tablets"), "tablet");
        assert_eq!(normalize_unit("CAPSULES"), "capsule");
        assert_eq!(normalize_unit("MG"), "mg");
        assert_eq!(normalize_unit("ml"), "ml");
    }

    #[test]
    fn schedule_from_instruction() {
        let schedule = parse_schedule("Take 2 tablets twice").unwrap();
        assert_eq!(schedule.units_per_dose, 2);
        assert_eq!(schedule.form, "tablet");
        assert_eq!(schedule.times_per_day, 2);
        assert_eq!(schedule.time_of_day, None);

        let schedule = parse_schedule("take 1 capsule night").unwrap();
        assert_eq!(schedule.times_per_day, 1);
        assert_eq!(schedule.time_of_day, Some(TimeOfDay::Night));
    }

    #[test]
    fn schedule_absent_for_free_text() {
        assert!(parse_schedule("As prescribed").is_none());
    }
}
