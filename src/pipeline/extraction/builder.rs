//! Medication record building: classified tokens → raw candidates.
//!
//! Pure pattern assembly. Candidates may still duplicate each other and
//! carry no confidence or default instructions; the resolver owns both.

use std::collections::{HashMap, HashSet};

use super::classify::{normalize_unit, parse_quantity, parse_schedule};
use super::types::{Line, MedicationCandidate, Token, TokenRole};

/// A bare name line holds at most this many words.
const MAX_SPLIT_NAME_WORDS: usize = 4;

/// Candidate plus the byte offset where its dosage ends on the drug line.
struct Draft {
    candidate: MedicationCandidate,
    dosage_end: usize,
}

/// Assemble candidates from per-line tokens.
///
/// `lines` must be in filtered order; `tokens_by_line` is keyed by
/// `Line::index`. Missing entries are treated as lines with no tokens.
pub fn build(
    lines: &[Line],
    tokens_by_line: &HashMap<usize, Vec<Token>>,
    merge_split_names: bool,
) -> Vec<MedicationCandidate> {
    let mut candidates = Vec::new();
    let mut name_lines_used: HashSet<usize> = HashSet::new();

    for (pos, line) in lines.iter().enumerate() {
        let tokens = tokens_for(tokens_by_line, line.index);
        let classified: Vec<&Token> = tokens.iter().filter(|t| t.is_classified()).collect();
        let line_has_name = classified.iter().any(|t| t.role == TokenRole::Name);

        let mut drafts: Vec<Draft> = Vec::new();
        for (i, token) in classified.iter().enumerate() {
            if token.role != TokenRole::Quantity {
                continue;
            }
            let Some(unit) = classified.get(i + 1).filter(|t| t.role == TokenRole::Unit) else {
                continue;
            };

            let owner = preceding_name(&classified, i);

            let (name, source_lines, split_name) = match owner {
                Some(name_token) => (name_token.text.trim().to_string(), vec![line.index], false),
                None if merge_split_names && !line_has_name && drafts.is_empty() && pos > 0 => {
                    let previous = &lines[pos - 1];
                    if name_lines_used.contains(&previous.index) {
                        continue;
                    }
                    let Some(name) = bare_name(previous, tokens_for(tokens_by_line, previous.index))
                    else {
                        continue;
                    };
                    name_lines_used.insert(previous.index);
                    (name, vec![previous.index, line.index], true)
                }
                None => continue,
            };
            if name.is_empty() {
                continue;
            }

            drafts.push(Draft {
                candidate: MedicationCandidate {
                    name,
                    dosage_value: parse_quantity(&token.text),
                    dosage_unit: Some(normalize_unit(&unit.text)),
                    instructions: None,
                    route: first_route(&classified),
                    schedule: None,
                    source_lines,
                    confidence: 0.0,
                    split_name,
                },
                dosage_end: unit.span_end,
            });
        }

        if drafts.is_empty() {
            continue;
        }

        attach_same_line_instructions(&mut drafts, &classified);

        if let Some(next) = lines.get(pos + 1) {
            if let Some(last) = drafts.last_mut() {
                if last.candidate.instructions.is_none() {
                    attach_next_line_instructions(
                        &mut last.candidate,
                        next,
                        tokens_for(tokens_by_line, next.index),
                    );
                }
            }
        }

        candidates.extend(drafts.into_iter().map(|d| d.candidate));
    }

    for candidate in &mut candidates {
        candidate.schedule = candidate.instructions.as_deref().and_then(parse_schedule);
    }

    candidates
}

/// Name token owning the quantity at `quantity_pos`; a route word may sit
/// between them.
fn preceding_name<'a>(classified: &[&'a Token], quantity_pos: usize) -> Option<&'a Token> {
    let mut pos = quantity_pos.checked_sub(1)?;
    if classified[pos].role == TokenRole::RouteWord {
        pos = pos.checked_sub(1)?;
    }
    Some(classified[pos]).filter(|t| t.role == TokenRole::Name)
}

fn tokens_for(tokens_by_line: &HashMap<usize, Vec<Token>>, index: usize) -> &[Token] {
    tokens_by_line.get(&index).map(Vec::as_slice).unwrap_or(&[])
}

fn first_route(classified: &[&Token]) -> Option<String> {
    classified
        .iter()
        .find(|t| t.role == TokenRole::RouteWord)
        .map(|t| t.text.to_lowercase())
}

/// Each instruction on the drug line goes to the closest drug before it.
fn attach_same_line_instructions(drafts: &mut [Draft], classified: &[&Token]) {
    for token in classified.iter().filter(|t| t.role == TokenRole::FrequencyWord) {
        let owner = drafts
            .iter_mut()
            .rev()
            .find(|d| d.dosage_end <= token.span_start);
        if let Some(draft) = owner {
            if draft.candidate.instructions.is_none() {
                draft.candidate.instructions = Some(token.text.trim().to_string());
            }
        }
    }
}

/// An instruction-only line directly below a drug line continues it.
fn attach_next_line_instructions(candidate: &mut MedicationCandidate, next: &Line, tokens: &[Token]) {
    let claims_own_drug = tokens
        .iter()
        .any(|t| matches!(t.role, TokenRole::Name | TokenRole::Quantity));
    if claims_own_drug {
        return;
    }
    let Some(frequency) = tokens.iter().find(|t| t.role == TokenRole::FrequencyWord) else {
        return;
    };

    candidate.instructions = Some(frequency.text.trim().to_string());
    candidate.source_lines.push(next.index);
    if candidate.route.is_none() {
        candidate.route = tokens
            .iter()
            .find(|t| t.role == TokenRole::RouteWord)
            .map(|t| t.text.to_lowercase());
    }
}

/// A line reading only as a drug name: a few alphabetic words and nothing
/// the classifier recognised.
fn bare_name(line: &Line, tokens: &[Token]) -> Option<String> {
    if tokens.iter().any(Token::is_classified) {
        return None;
    }
    let words: Vec<&str> = line.text.split_whitespace().collect();
    if words.is_empty() || words.len() > MAX_SPLIT_NAME_WORDS {
        return None;
    }
    if !words.iter().all(|w| w.chars().all(char::is_alphabetic)) {
        return None;
    }
    if words[0].eq_ignore_ascii_case("take") {
        return None;
    }
    Some(words.join(" "))
}
