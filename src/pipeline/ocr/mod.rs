//! OCR collaborator boundary.
//!
//! The extraction pipeline only ever sees text. Turning a prescription
//! photo into that text is delegated to an `OcrEngine`, which keeps the
//! network dependency swappable (and mockable in tests).

pub mod google_vision;

pub use google_vision::GoogleVisionClient;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum OcrError {
    #[error("No image provided")]
    EmptyImage,

    #[error("Vision API key not configured (set {})", google_vision::API_KEY_ENV)]
    MissingApiKey,

    #[error("Vision API unreachable at {0}")]
    Connection(String),

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Vision API returned error (status {status}): {body}")]
    VisionApi { status: u16, body: String },

    #[error("Vision API could not annotate image: {0}")]
    Annotation(String),

    #[error("Malformed Vision API response: {0}")]
    ResponseParsing(String),
}

/// Image bytes → recognised text.
pub trait OcrEngine: Send + Sync {
    /// Full text of the image. An image without text yields `Ok("")`.
    fn recognize_text(&self, image_bytes: &[u8]) -> Result<String, OcrError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_image_message_matches_upload_error() {
        assert_eq!(OcrError::EmptyImage.to_string(), "No image provided");
    }

    #[test]
    fn missing_key_message_names_variable() {
        assert!(OcrError::MissingApiKey
            .to_string()
            .contains("GOOGLE_VISION_API_KEY"));
    }
}
