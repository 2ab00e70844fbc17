//! Prescription photo processing.
//!
//! Drives OCR → extraction for one uploaded image. The OCR engine is
//! injected as a trait object so the flow stays testable with mocks.

use serde::Serialize;

use crate::pipeline::extraction::orchestrator::PrescriptionExtractor;
use crate::pipeline::extraction::types::{ExtractionResult, MedicationSummary};
use crate::pipeline::ocr::{OcrEngine, OcrError};

/// Outcome of scanning one prescription image.
#[derive(Debug, Clone, Serialize)]
pub struct PrescriptionScan {
    /// Full OCR text as returned by the engine.
    pub extracted_text: String,
    /// Flat medication list, one entry per resolved candidate.
    pub medications: Vec<MedicationSummary>,
    pub result: ExtractionResult,
}

/// OCR an image and extract its medications.
pub fn process_prescription(
    engine: &dyn OcrEngine,
    extractor: &PrescriptionExtractor,
    image_bytes: &[u8],
) -> Result<PrescriptionScan, OcrError> {
    if image_bytes.is_empty() {
        return Err(OcrError::EmptyImage);
    }

    let _span = tracing::info_span!("process_prescription", image_size = image_bytes.len()).entered();

    let extracted_text = engine.recognize_text(image_bytes)?;
    let result = extractor.extract(&extracted_text);
    if result.is_empty() {
        tracing::info!(lines = result.raw_line_count, "No medications recognised in prescription");
    }
    let medications = result.summaries();

    tracing::info!(
        text_len = extracted_text.len(),
        medications = medications.len(),
        "Prescription processed"
    );

    Ok(PrescriptionScan {
        extracted_text,
        medications,
        result,
    })
}

/// Owns an OCR engine and an extractor for repeated scans.
pub struct PrescriptionProcessor {
    ocr: Box<dyn OcrEngine>,
    extractor: PrescriptionExtractor,
}

impl PrescriptionProcessor {
    pub fn new(ocr: Box<dyn OcrEngine>, extractor: PrescriptionExtractor) -> Self {
        Self { ocr, extractor }
    }

    pub fn process(&self, image_bytes: &[u8]) -> Result<PrescriptionScan, OcrError> {
        process_prescription(self.ocr.as_ref(), &self.extractor, image_bytes)
    }
}
