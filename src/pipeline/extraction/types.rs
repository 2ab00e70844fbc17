use serde::{Deserialize, Serialize};

/// One trimmed, non-blank segment of the OCR text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    /// Position in the filtered line sequence (not the raw line number).
    pub index: usize,
    pub text: String,
}

/// Semantic role of a span within one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenRole {
    Name,
    Quantity,
    Unit,
    FrequencyWord,
    RouteWord,
    Unknown,
}

/// A classified span. `span_start..span_end` are byte offsets into the
/// owning `Line::text`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    pub role: TokenRole,
    pub line_index: usize,
    pub span_start: usize,
    pub span_end: usize,
}

impl Token {
    pub fn is_classified(&self) -> bool {
        self.role != TokenRole::Unknown
    }
}

/// When in the day a dose is taken, if the instruction says.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeOfDay {
    Morning,
    Evening,
    Night,
}

/// Structured reading of an instruction such as "Take 2 tablets twice".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoseSchedule {
    pub units_per_dose: u32,
    /// Dose form, singular: tablet, capsule or pill.
    pub form: String,
    pub times_per_day: u8,
    pub time_of_day: Option<TimeOfDay>,
}

/// A medication record as built from one or more lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicationCandidate {
    pub name: String,
    pub dosage_value: Option<f64>,
    pub dosage_unit: Option<String>,
    pub instructions: Option<String>,
    pub route: Option<String>,
    pub schedule: Option<DoseSchedule>,
    /// Filtered line indices this record was built from, in document order.
    pub source_lines: Vec<usize>,
    pub confidence: f32,
    /// Name came from the line above the dosage rather than the same line.
    #[serde(skip)]
    pub split_name: bool,
}

impl MedicationCandidate {
    pub fn has_dosage(&self) -> bool {
        self.dosage_value.is_some() && self.dosage_unit.is_some()
    }

    pub fn first_line(&self) -> usize {
        self.source_lines.first().copied().unwrap_or(usize::MAX)
    }

    /// Dosage rendered the way a label prints it: `500mg`, `5ml`, `2 tablets`.
    pub fn dosage_label(&self) -> String {
        match (self.dosage_value, self.dosage_unit.as_deref()) {
            (Some(value), Some(unit)) => format_dosage(value, unit),
            _ => String::new(),
        }
    }

    pub fn summary(&self) -> MedicationSummary {
        MedicationSummary {
            name: self.name.clone(),
            dosage: self.dosage_label(),
            instructions: self.instructions.clone().unwrap_or_default(),
        }
    }
}

/// Terminal pipeline output. Each call produces a fresh value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub candidates: Vec<MedicationCandidate>,
    /// Lines left after blank and noise filtering.
    pub raw_line_count: usize,
    pub unmatched_line_count: usize,
}

impl ExtractionResult {
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn summaries(&self) -> Vec<MedicationSummary> {
        self.candidates.iter().map(MedicationCandidate::summary).collect()
    }
}

/// Flat medication shape consumed by the upload screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicationSummary {
    pub name: String,
    pub dosage: String,
    pub instructions: String,
}

fn format_dosage(value: f64, unit: &str) -> String {
    let number = if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    };
    match unit {
        "tablet" | "capsule" => {
            let plural = if value == 1.0 { "" } else { "s" };
            format!("{number} {unit}{plural}")
        }
        _ => format!("{number}{unit}"),
    }
}
