use super::types::MedicationCandidate;

/// Confidence thresholds used by review screens and the resolver.
pub mod thresholds {
    /// Every surviving candidate has a name, so nothing scores below this.
    pub const FLOOR: f32 = 0.50;

    /// Below this: name without a usable dosage, or a shaky cross-line merge.
    pub const MODERATE: f32 = 0.70;

    /// At or above this: name and dosage both matched on the same line.
    pub const HIGH: f32 = 0.80;

    /// Name, dosage and instructions all matched.
    pub const COMPLETE: f32 = 1.00;
}

/// Score contributions.
pub mod weights {
    pub const NAME: f32 = 0.5;
    pub const DOSAGE: f32 = 0.3;
    pub const INSTRUCTIONS: f32 = 0.2;
    /// Name read from the line above its dosage.
    pub const SPLIT_NAME_PENALTY: f32 = 0.1;
}

/// Score a candidate from what was matched.
///
/// Must run before default instructions are filled in: only instructions
/// read from the prescription count.
pub fn score_candidate(candidate: &MedicationCandidate) -> f32 {
    let mut score = 0.0;
    if !candidate.name.trim().is_empty() {
        score += weights::NAME;
    }
    if candidate.has_dosage() {
        score += weights::DOSAGE;
    }
    if candidate.instructions.is_some() {
        score += weights::INSTRUCTIONS;
    }
    if candidate.split_name {
        score -= weights::SPLIT_NAME_PENALTY;
    }

    // Two decimals keep repeated runs bit-identical and comparisons exact.
    let rounded = (score * 100.0).round() / 100.0;
    rounded.clamp(thresholds::FLOOR, thresholds::COMPLETE)
}

/// Whether a candidate should be shown to the user for confirmation.
pub fn needs_review(candidate: &MedicationCandidate) -> bool {
    candidate.confidence < thresholds::HIGH
}
