//! Conflict resolution: score, deduplicate, default and order candidates.

use std::collections::{HashMap, HashSet};

use super::confidence::score_candidate;
use super::types::{ExtractionResult, MedicationCandidate};

/// Normalized name, dosage value bits, dosage unit.
type DedupKey = (String, Option<u64>, Option<String>);

/// Turn raw candidates into the final result.
///
/// `line_count` is the number of segmented lines the candidates were built
/// from; lines no surviving candidate references count as unmatched.
pub fn resolve(
    raw: Vec<MedicationCandidate>,
    line_count: usize,
    default_instructions: &str,
) -> ExtractionResult {
    let mut survivors: Vec<MedicationCandidate> = Vec::with_capacity(raw.len());
    let mut slots: HashMap<DedupKey, usize> = HashMap::new();
    let mut dropped = 0usize;

    for mut candidate in raw {
        candidate.confidence = score_candidate(&candidate);
        let key = dedup_key(&candidate);
        match slots.get(&key).copied() {
            Some(slot) => {
                if supersedes(&candidate, &survivors[slot]) {
                    survivors[slot] = candidate;
                }
                dropped += 1;
            }
            None => {
                slots.insert(key, survivors.len());
                survivors.push(candidate);
            }
        }
    }

    for candidate in &mut survivors {
        if candidate.instructions.is_none() {
            candidate.instructions = Some(default_instructions.to_string());
        }
    }

    survivors.sort_by_key(MedicationCandidate::first_line);

    let matched: HashSet<usize> = survivors
        .iter()
        .flat_map(|c| c.source_lines.iter().copied())
        .filter(|&index| index < line_count)
        .collect();

    if dropped > 0 {
        tracing::debug!(dropped, kept = survivors.len(), "Merged duplicate medications");
    }

    ExtractionResult {
        candidates: survivors,
        raw_line_count: line_count,
        unmatched_line_count: line_count - matched.len(),
    }
}

/// Case-insensitive, whitespace-collapsed drug name.
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn dedup_key(candidate: &MedicationCandidate) -> DedupKey {
    (
        normalize_name(&candidate.name),
        candidate.dosage_value.map(f64::to_bits),
        candidate.dosage_unit.clone(),
    )
}

/// Higher confidence wins; on a tie the earlier line wins.
fn supersedes(challenger: &MedicationCandidate, incumbent: &MedicationCandidate) -> bool {
    challenger.confidence > incumbent.confidence
        || (challenger.confidence == incumbent.confidence
            && challenger.first_line() < incumbent.first_line())
}
