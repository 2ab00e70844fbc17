//! Line segmentation: raw OCR text → ordered, filtered `Line`s.

use super::sanitize::{is_noise_line, sanitize_line};
use super::types::Line;

/// Split OCR text into lines, dropping blank and noise-only segments.
///
/// `Line::index` counts kept lines only, so adjacency downstream is
/// adjacency in the filtered stream.
pub fn segment(raw: &str) -> Vec<Line> {
    raw.split(['\n', '\r'])
        .map(sanitize_line)
        .filter(|text| !text.is_empty() && !is_noise_line(text))
        .enumerate()
        .map(|(index, text)| Line { index, text })
        .collect()
}
