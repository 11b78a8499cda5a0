//! CLI command definitions and argument parsing.

use crate::config::DuplicateLabels;
use crate::form::fields_to_json;
use crate::FormError;
use clap::{Parser, Subcommand};
use fluradar_domain::extract_with;
use fluradar_fhir::parse_observation;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Flu Radar - Clinical intake form with flu probability scoring.
#[derive(Debug, Parser)]
#[command(name = "fluradar")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Command to run
    #[command(subcommand)]
    pub command: Command,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the intake web service
    Serve(ServeArgs),

    /// Extract canonical fields from an observation file
    Extract(ExtractArgs),
}

/// Arguments for the serve command.
#[derive(Debug, Parser)]
pub struct ServeArgs {
    /// Configuration file path
    #[arg(short, long, env = "FLURADAR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Listen address, overriding the configuration (e.g., 0.0.0.0:8501)
    #[arg(short, long)]
    pub bind: Option<SocketAddr>,
}

/// Arguments for the extract command.
#[derive(Debug, Parser)]
pub struct ExtractArgs {
    /// Observation JSON file
    pub path: PathBuf,

    /// Which component wins when a label repeats
    #[arg(short, long, value_enum, default_value_t = DuplicateLabels::First)]
    pub duplicates: DuplicateLabels,
}

/// Read an observation file and return its canonical fields as JSON
pub fn extract_file(path: &Path, duplicates: DuplicateLabels) -> Result<serde_json::Value, FormError> {
    let body = std::fs::read_to_string(path)?;
    let record = parse_observation(&body)?;
    let fields = extract_with(&record, duplicates.into());
    Ok(fields_to_json(&fields))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const OBSERVATION: &str = r#"{
        "resourceType": "Observation",
        "component": [
            {"code": {"text": "Pulse"}, "valueQuantity": {"value": 88}},
            {"code": {"text": "Pulse"}, "valueQuantity": {"value": 120}},
            {"code": {"text": "Temperature (°C)"}, "valueQuantity": {"value": 38.4}},
            {"code": {"text": "Sore throat?"}, "valueInteger": 1}
        ]
    }"#;

    #[test]
    fn test_parse_serve() {
        let cli = Cli::try_parse_from(["fluradar", "serve", "--bind", "0.0.0.0:9000"]).unwrap();
        match cli.command {
            Command::Serve(args) => {
                assert_eq!(args.bind, Some("0.0.0.0:9000".parse().unwrap()));
            }
            _ => panic!("Expected serve"),
        }
    }

    #[test]
    fn test_parse_extract_defaults_to_first() {
        let cli = Cli::try_parse_from(["fluradar", "extract", "obs.json"]).unwrap();
        match cli.command {
            Command::Extract(args) => {
                assert_eq!(args.path, PathBuf::from("obs.json"));
                assert_eq!(args.duplicates, DuplicateLabels::First);
            }
            _ => panic!("Expected extract"),
        }
    }

    #[test]
    fn test_bad_duplicates_value() {
        let result = Cli::try_parse_from(["fluradar", "extract", "obs.json", "--duplicates", "middle"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_extract_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("observation.json");
        std::fs::write(&path, OBSERVATION).unwrap();

        let first = extract_file(&path, DuplicateLabels::First).unwrap();
        assert_eq!(first, json!({"temp": 38.4, "pulse": 88, "sorethroat": "Yes"}));

        let last = extract_file(&path, DuplicateLabels::Last).unwrap();
        assert_eq!(last["pulse"], json!(120));
    }

    #[test]
    fn test_extract_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("observation.json");
        std::fs::write(&path, "<html>").unwrap();

        assert!(matches!(
            extract_file(&path, DuplicateLabels::First),
            Err(FormError::Fhir(_))
        ));
        assert!(matches!(
            extract_file(&dir.path().join("missing.json"), DuplicateLabels::First),
            Err(FormError::Io(_))
        ));
    }
}
