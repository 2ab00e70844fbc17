use std::collections::HashMap;

use super::builder::build;
use super::classify::classify;
use super::medical_correction::correct_candidate_names;
use super::resolve::resolve;
use super::segment::segment;
use super::types::{ExtractionResult, Token};
use crate::pipeline_config::ExtractionConfig;

/// Prescription text → medication records.
///
/// Holds only its configuration; every `extract` call builds and returns
/// its own result, so one extractor can be shared across threads.
#[derive(Debug, Clone, Default)]
pub struct PrescriptionExtractor {
    config: ExtractionConfig,
}

impl PrescriptionExtractor {
    pub fn new(config: ExtractionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Run segment → classify → build → (correct) → resolve.
    /// Any input, including empty text, produces a valid result.
    pub fn extract(&self, raw_text: &str) -> ExtractionResult {
        let _span = tracing::debug_span!("extract_medications", input_bytes = raw_text.len()).entered();

        let lines = segment(raw_text);
        if lines.is_empty() {
            tracing::debug!("No readable lines in OCR text");
            return ExtractionResult::default();
        }

        let tokens_by_line: HashMap<usize, Vec<Token>> =
            lines.iter().map(|line| (line.index, classify(line))).collect();

        let mut candidates = build(&lines, &tokens_by_line, self.config.merge_split_names);
        tracing::debug!(lines = lines.len(), raw_candidates = candidates.len(), "Built candidates");

        if self.config.correct_drug_names {
            let corrected = correct_candidate_names(&mut candidates);
            tracing::debug!(corrected, "Applied drug-name correction");
        }

        let result = resolve(candidates, lines.len(), &self.config.default_instructions);

        tracing::info!(
            lines = result.raw_line_count,
            medications = result.candidates.len(),
            unmatched_lines = result.unmatched_line_count,
            "Prescription text extracted"
        );

        result
    }
}

/// Extract with the default configuration.
pub fn extract(raw_text: &str) -> ExtractionResult {
    PrescriptionExtractor::default().extract(raw_text)
}
