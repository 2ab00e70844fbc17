//! Post-OCR drug-name correction.
//!
//! Fixes common OCR misreads (`rn` → `m`, `l` → `1`) in extracted drug
//! names by fuzzy matching against a dictionary. Only corrects words of at
//! least 5 characters within edit distance 2 of exactly one best term.

use super::types::MedicationCandidate;

/// Drug names for correction. Sorted for binary search, lowercase.
const DRUG_NAMES: &[&str] = &[
    "albuterol", "allopurinol", "amlodipine", "amoxicillin", "aspirin",
    "atenolol", "atorvastatin", "azithromycin", "bisoprolol", "budesonide",
    "carbamazepine", "carvedilol", "cephalexin", "cetirizine", "ciprofloxacin",
    "citalopram", "clopidogrel", "codeine", "colchicine", "diclofenac",
    "digoxin", "doxycycline", "duloxetine", "enalapril", "escitalopram",
    "estradiol", "finasteride", "fluconazole", "fluoxetine", "fluticasone",
    "furosemide", "gabapentin", "glipizide", "hydrochlorothiazide", "ibuprofen",
    "insulin", "levetiracetam", "levothyroxine", "lisinopril", "losartan",
    "metformin", "methotrexate", "metoprolol", "montelukast", "morphine",
    "naproxen", "nitrofurantoin", "olanzapine", "omeprazole", "pantoprazole",
    "paracetamol", "perindopril", "phenytoin", "prednisone", "quetiapine",
    "ramipril", "risperidone", "rivaroxaban", "rosuvastatin", "sertraline",
    "simvastatin", "spironolactone", "sulfasalazine", "tamsulosin", "tiotropium",
    "tramadol", "trimethoprim", "valproate", "venlafaxine", "warfarin",
];

/// Shortest word eligible for correction.
const MIN_WORD_CHARS: usize = 5;
const MAX_EDIT_DISTANCE: u32 = 2;

/// Correct candidate names in place. Returns how many names changed.
pub fn correct_candidate_names(candidates: &mut [MedicationCandidate]) -> usize {
    let mut changed = 0;
    for candidate in candidates.iter_mut() {
        let corrected = correct_drug_name(&candidate.name);
        if corrected != candidate.name {
            candidate.name = corrected;
            changed += 1;
        }
    }
    changed
}

/// Correct each word of a drug name against the dictionary.
pub fn correct_drug_name(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    let mut word_buf = String::new();

    for ch in name.chars() {
        if ch.is_alphanumeric() {
            word_buf.push(ch);
        } else {
            if !word_buf.is_empty() {
                result.push_str(&try_correct_word(&word_buf));
                word_buf.clear();
            }
            result.push(ch);
        }
    }

    if !word_buf.is_empty() {
        result.push_str(&try_correct_word(&word_buf));
    }

    result
}

fn try_correct_word(word: &str) -> String {
    let word_chars = word.chars().count();
    if word_chars < MIN_WORD_CHARS {
        return word.to_string();
    }

    let lower = word.to_lowercase();
    if DRUG_NAMES.binary_search(&lower.as_str()).is_ok() {
        return word.to_string();
    }

    let mut best_term: Option<&str> = None;
    let mut best_distance = MAX_EDIT_DISTANCE + 1;
    let mut ambiguous = false;

    for &term in DRUG_NAMES {
        if word_chars.abs_diff(term.len()) > MAX_EDIT_DISTANCE as usize {
            continue;
        }

        let dist = edit_distance(&lower, term);
        if dist < best_distance {
            best_distance = dist;
            best_term = Some(term);
            ambiguous = false;
        } else if dist == best_distance && best_term.is_some() {
            ambiguous = true;
        }
    }

    match best_term {
        Some(term) if !ambiguous => preserve_case(word, term),
        _ => word.to_string(),
    }
}

/// Apply the original word's capitalization pattern to the correction.
fn preserve_case(original: &str, correction: &str) -> String {
    if original.chars().all(|c| c.is_uppercase() || !c.is_alphabetic()) {
        return correction.to_uppercase();
    }

    let first_upper = original.chars().next().is_some_and(char::is_uppercase);
    if !first_upper {
        return correction.to_string();
    }

    let mut chars = correction.chars();
    match chars.next() {
        Some(c) => {
            let mut s = c.to_uppercase().to_string();
            s.extend(chars);
            s
        }
        None => correction.to_string(),
    }
}

/// Levenshtein distance over chars.
fn edit_distance(a: &str, b: &str) -> u32 {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let m = a_chars.len();
    let n = b_chars.len();

    if m == 0 {
        return n as u32;
    }
    if n == 0 {
        return m as u32;
    }

    let mut prev: Vec<u32> = (0..=n as u32).collect();
    let mut curr = vec![0u32; n + 1];

    for (i, &a_ch) in a_chars.iter().enumerate() {
        curr[0] = (i + 1) as u32;
        for (j, &b_ch) in b_chars.iter().enumerate() {
            let cost = u32::from(a_ch != b_ch);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[n]
}
