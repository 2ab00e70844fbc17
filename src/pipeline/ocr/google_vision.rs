//! Google Cloud Vision `TEXT_DETECTION` client.
//!
//! Sends the image inline as base64 and reads the first text annotation,
//! which Vision fills with the full detected text of the image.

use std::time::Duration;

use base64::Engine as _;
use serde::{Deserialize, Serialize};

use super::{OcrEngine, OcrError};
use crate::config::env_key;

pub const DEFAULT_ENDPOINT: &str = "https://vision.googleapis.com/v1/images:annotate";
pub const API_KEY_ENV: &str = "GOOGLE_VISION_API_KEY";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub struct GoogleVisionClient {
    endpoint: String,
    api_key: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl GoogleVisionClient {
    /// Client for the public Vision endpoint.
    pub fn new(api_key: impl Into<String>, timeout_secs: u64) -> Result<Self, OcrError> {
        Self::with_endpoint(DEFAULT_ENDPOINT, api_key, timeout_secs)
    }

    /// Client for a specific endpoint (regional endpoint, proxy, test server).
    pub fn with_endpoint(
        endpoint: &str,
        api_key: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self, OcrError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(OcrError::MissingApiKey);
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| OcrError::HttpClient(e.to_string()))?;

        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
            client,
            timeout_secs,
        })
    }

    /// Key from `GOOGLE_VISION_API_KEY`, endpoint from `RXSCAN_VISION_ENDPOINT`
    /// when set.
    pub fn from_env() -> Result<Self, OcrError> {
        let api_key = std::env::var(API_KEY_ENV).map_err(|_| OcrError::MissingApiKey)?;
        let endpoint = std::env::var(env_key("VISION_ENDPOINT"))
            .unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());
        Self::with_endpoint(&endpoint, api_key, DEFAULT_TIMEOUT_SECS)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

// ──────────────────────────────────────────────
// Wire types
// ──────────────────────────────────────────────

#[derive(Serialize)]
struct AnnotateRequest {
    requests: Vec<ImageRequest>,
}

#[derive(Serialize)]
struct ImageRequest {
    image: ImageContent,
    features: Vec<Feature>,
}

#[derive(Serialize)]
struct ImageContent {
    content: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Feature {
    #[serde(rename = "type")]
    kind: &'static str,
    max_results: u32,
}

#[derive(Deserialize)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<ImageResponse>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImageResponse {
    #[serde(default)]
    text_annotations: Vec<TextAnnotation>,
    error: Option<VisionStatus>,
}

#[derive(Deserialize)]
struct TextAnnotation {
    #[serde(default)]
    description: String,
}

#[derive(Deserialize)]
struct VisionStatus {
    #[serde(default)]
    code: i32,
    #[serde(default)]
    message: String,
}

fn build_request(image_bytes: &[u8]) -> AnnotateRequest {
    AnnotateRequest {
        requests: vec![ImageRequest {
            image: ImageContent {
                content: base64::engine::general_purpose::STANDARD.encode(image_bytes),
            },
            features: vec![Feature {
                kind: "TEXT_DETECTION",
                max_results: 1,
            }],
        }],
    }
}

/// Pull the detected text out of an `images:annotate` response body.
fn text_from_response(body: &str) -> Result<String, OcrError> {
    let parsed: AnnotateResponse =
        serde_json::from_str(body).map_err(|e| OcrError::ResponseParsing(e.to_string()))?;

    let Some(first) = parsed.responses.into_iter().next() else {
        return Ok(String::new());
    };
    if let Some(status) = first.error {
        return Err(OcrError::Annotation(format!("{} (code {})", status.message, status.code)));
    }

    Ok(first
        .text_annotations
        .into_iter()
        .next()
        .map(|a| a.description)
        .unwrap_or_default())
}

impl OcrEngine for GoogleVisionClient {
    fn recognize_text(&self, image_bytes: &[u8]) -> Result<String, OcrError> {
        if image_bytes.is_empty() {
            return Err(OcrError::EmptyImage);
        }

        let _span = tracing::info_span!("vision_text_detection", image_size = image_bytes.len()).entered();
        let start = std::time::Instant::now();

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&build_request(image_bytes))
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    OcrError::Connection(self.endpoint.clone())
                } else if e.is_timeout() {
                    OcrError::HttpClient(format!("Request timed out after {}s", self.timeout_secs))
                } else {
                    // Strip the URL: it carries the API key.
                    OcrError::HttpClient(e.without_url().to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "Vision API request failed");
            return Err(OcrError::VisionApi {
                status: status.as_u16(),
                body,
            });
        }

        let body = response
            .text()
            .map_err(|e| OcrError::ResponseParsing(e.without_url().to_string()))?;
        let text = text_from_response(&body)?;

        tracing::info!(
            elapsed_ms = %start.elapsed().as_millis(),
            text_len = text.len(),
            "Vision text detection complete"
        );

        Ok(text)
    }
}
