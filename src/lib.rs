pub mod config;
pub mod pipeline;
pub mod pipeline_config;

pub use pipeline::extraction::{extract, ExtractionResult, MedicationCandidate, MedicationSummary, PrescriptionExtractor};
pub use pipeline::ocr::{GoogleVisionClient, OcrEngine, OcrError};
pub use pipeline::processor::{process_prescription, PrescriptionProcessor, PrescriptionScan};
pub use pipeline_config::{ConfigError, ExtractionConfig};

use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` wins when set; otherwise `config::default_log_filter()`.
/// Safe to call more than once: later calls are ignored.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .with_writer(std::io::stderr)
        .try_init();
}
