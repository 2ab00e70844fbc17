use std::fs;
use std::io::{IsTerminal, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use rxscan_lib::config;
use rxscan_lib::{process_prescription, ExtractionConfig, GoogleVisionClient, PrescriptionExtractor};

/// Extract medications from prescription label text or a label photo.
#[derive(Debug, Parser)]
#[command(name = config::APP_NAME, version = config::APP_VERSION)]
struct Cli {
    /// OCR text as a literal string.
    #[arg(long = "text", value_name = "TEXT", conflicts_with_all = ["input", "image"])]
    text: Option<String>,

    /// Path to an OCR text file. Use '-' to read from stdin.
    #[arg(long = "input", short = 'i', value_name = "FILE", value_hint = clap::ValueHint::FilePath, conflicts_with = "image")]
    input: Option<PathBuf>,

    /// Prescription photo to send through Google Vision (needs GOOGLE_VISION_API_KEY).
    #[arg(long = "image", value_name = "FILE", value_hint = clap::ValueHint::FilePath)]
    image: Option<PathBuf>,

    /// Correct OCR misreads in drug names against the built-in dictionary.
    #[arg(long = "correct-names", default_value_t = false)]
    correct_names: bool,

    /// Instructions for medications whose label carries none.
    #[arg(long = "default-instructions", value_name = "TEXT")]
    default_instructions: Option<String>,

    /// Print the flat `{name, dosage, instructions}` list instead of the full result.
    #[arg(long = "summary", default_value_t = false)]
    summary: bool,

    /// Pretty-print JSON output.
    #[arg(long = "pretty", default_value_t = false)]
    pretty: bool,
}

fn main() -> Result<()> {
    rxscan_lib::init_tracing();
    let cli = Cli::parse();

    let mut extraction_config =
        ExtractionConfig::from_env().context("Invalid RXSCAN_* environment override")?;
    if cli.correct_names {
        extraction_config = extraction_config.with_name_correction(true);
    }
    if let Some(text) = &cli.default_instructions {
        extraction_config = extraction_config.with_default_instructions(text.as_str());
    }
    let extractor = PrescriptionExtractor::new(extraction_config);

    if let Some(image_path) = &cli.image {
        let image = fs::read(image_path)
            .with_context(|| format!("Failed to read image {}", image_path.display()))?;
        let client = GoogleVisionClient::from_env().context("Failed to set up Google Vision client")?;
        let scan = process_prescription(&client, &extractor, &image)
            .with_context(|| format!("Failed to scan {}", image_path.display()))?;
        return if cli.summary {
            print_json(&scan.medications, cli.pretty)
        } else {
            print_json(&scan, cli.pretty)
        };
    }

    let text = read_input_text(cli.text.as_ref(), cli.input.as_ref())?;
    let result = extractor.extract(&text);
    if cli.summary {
        print_json(&result.summaries(), cli.pretty)
    } else {
        print_json(&result, cli.pretty)
    }
}

fn read_input_text(text: Option<&String>, input: Option<&PathBuf>) -> Result<String> {
    if let Some(literal) = text {
        return Ok(literal.to_string());
    }

    match input {
        Some(path) if path.as_path() == Path::new("-") => read_stdin(),
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read input file {}", path.display())),
        None => {
            if std::io::stdin().is_terminal() {
                anyhow::bail!("No input provided. Use --text, --input, --image, or pipe via stdin.");
            }
            read_stdin()
        }
    }
}

fn read_stdin() -> Result<String> {
    let mut buffer = String::new();
    std::io::stdin()
        .read_to_string(&mut buffer)
        .context("Failed to read stdin")?;
    Ok(buffer)
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .context("Failed to serialize output")?;
    println!("{json}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn text_conflicts_with_input() {
        let parsed = Cli::try_parse_from(["rxscan", "--text", "Aspirin 81mg", "--input", "x.txt"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn literal_text_wins() {
        let text = "Aspirin 81mg".to_string();
        assert_eq!(read_input_text(Some(&text), None).unwrap(), "Aspirin 81mg");
    }

    #[test]
    fn reads_input_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("label.txt");
        fs::write(&path, "Metformin 500mg\nTake 2 tablets daily\n").unwrap();
        let text = read_input_text(None, Some(&path)).unwrap();
        assert_eq!(text, "Metformin 500mg\nTake 2 tablets daily\n");
    }

    #[test]
    fn missing_file_reports_path() {
        let path = PathBuf::from("/nonexistent/label.txt");
        let err = read_input_text(None, Some(&path)).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/label.txt"));
    }
}
