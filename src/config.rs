//! Configuration management for the submission toolkit
//!
//! Centralizes default paths and per-command options and provides validation.

use crate::{
    cli::{Args, Command},
    error::SubmissionError,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Test file the validator checks against. Edit this to change the default.
pub const DEFAULT_TEST_PATH: &str = "data/processed/test_from_train.csv";
/// Labelled training data
pub const DEFAULT_TRAIN_PATH: &str = "data/processed/train.csv";
/// Output of `parse-train`
pub const DEFAULT_PARSED_TRAIN_PATH: &str = "data/processed/parsed_train_test.csv";
/// Submission written by `generate-submission` and read by the other commands
pub const DEFAULT_SUBMISSION_PATH: &str = "data/processed/submission.csv";
pub const DEFAULT_NUM_EXAMPLES: usize = 5;
pub const DEFAULT_SHOW_ERRORS: usize = 10;

/// HTTP methods accepted in the `type` column
pub const VALID_METHODS: [&str; 7] = ["GET", "POST", "PUT", "DELETE", "PATCH", "HEAD", "OPTIONS"];

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Enable debug logging
    pub debug: bool,
    /// Field delimiter for every CSV file
    pub delimiter: char,
    /// `parse-train` options
    pub extraction: ExtractionConfig,
    /// `generate-submission` options
    pub generation: GenerationConfig,
    /// `validate-submission` options
    pub validation: ValidationConfig,
    /// `calculate-metrics` options
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    pub input: PathBuf,
    pub output: PathBuf,
}

/// Submission generation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Labelled training file
    pub train_file: PathBuf,
    /// Test questions
    pub test_file: PathBuf,
    /// Where the submission is written
    pub output_file: PathBuf,
    /// Nearest neighbours consulted per question
    pub num_examples: usize,
}

/// Submission validation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    pub submission_file: PathBuf,
    pub test_file: PathBuf,
    /// Accepted values of the `type` column
    pub valid_methods: Vec<String>,
}

/// Metrics configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Ground-truth file; only known once `--true` is given
    pub truth_file: Option<PathBuf>,
    pub submission_file: PathBuf,
    /// How many of the worst errors to print
    pub show_errors: usize,
    /// Optional JSON report destination
    pub report_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debug: false,
            delimiter: ';',
            extraction: ExtractionConfig::default(),
            generation: GenerationConfig::default(),
            validation: ValidationConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_TRAIN_PATH),
            output: PathBuf::from(DEFAULT_PARSED_TRAIN_PATH),
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            train_file: PathBuf::from(DEFAULT_TRAIN_PATH),
            test_file: PathBuf::from(DEFAULT_TEST_PATH),
            output_file: PathBuf::from(DEFAULT_SUBMISSION_PATH),
            num_examples: DEFAULT_NUM_EXAMPLES,
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            submission_file: PathBuf::from(DEFAULT_SUBMISSION_PATH),
            test_file: PathBuf::from(DEFAULT_TEST_PATH),
            valid_methods: VALID_METHODS.iter().map(|m| m.to_string()).collect(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            truth_file: None,
            submission_file: PathBuf::from(DEFAULT_SUBMISSION_PATH),
            show_errors: DEFAULT_SHOW_ERRORS,
            report_file: None,
        }
    }
}

impl Config {
    /// Create configuration from command line arguments
    pub fn from_args(args: &Args) -> Result<Self, SubmissionError> {
        let mut config = Self {
            debug: args.debug,
            delimiter: args.delimiter,
            ..Self::default()
        };

        // Override with command-specific options
        match &args.command {
            Command::ParseTrain { input, output } => {
                config.extraction.input = input.clone();
                config.extraction.output = output.clone();
            }
            Command::GenerateSubmission {
                train_file,
                test_file,
                num_examples,
                output,
            } => {
                config.generation.train_file = train_file.clone();
                config.generation.test_file = test_file.clone();
                config.generation.num_examples = *num_examples;
                config.generation.output_file = output.clone();
            }
            Command::ValidateSubmission {
                submission_file,
                test_file,
            } => {
                config.validation.submission_file = submission_file.clone();
                config.validation.test_file = test_file.clone();
            }
            Command::CalculateMetrics {
                truth_file,
                submission,
                show_errors,
                report,
            } => {
                config.metrics.truth_file = Some(truth_file.clone());
                config.metrics.submission_file = submission.clone();
                config.metrics.show_errors = *show_errors;
                config.metrics.report_file = report.clone();
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), SubmissionError> {
        if self.generation.num_examples == 0 {
            return Err(SubmissionError::config(
                "--num-examples must be at least 1",
            ));
        }

        if !self.delimiter.is_ascii() || matches!(self.delimiter, '"' | '\n' | '\r') {
            return Err(SubmissionError::config(format!(
                "Unsupported CSV delimiter: {:?}",
                self.delimiter
            )));
        }

        Ok(())
    }

    /// Delimiter as the byte the csv crate expects
    pub fn delimiter_byte(&self) -> u8 {
        // validate() guarantees an ASCII delimiter
        self.delimiter as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_default_paths() {
        let config = Config::default();
        assert_eq!(config.validation.test_file, PathBuf::from(DEFAULT_TEST_PATH));
        assert_eq!(config.generation.num_examples, 5);
        assert_eq!(config.validation.valid_methods.len(), 7);
        assert_eq!(config.delimiter_byte(), b';');
    }

    #[test]
    fn test_from_args_overrides_generation() {
        let args = Args::try_parse_from([
            "submission",
            "generate-submission",
            "--train-file",
            "train.csv",
            "--num-examples",
            "2",
            "-o",
            "out.csv",
        ])
        .unwrap();
        let config = Config::from_args(&args).unwrap();
        assert_eq!(config.generation.train_file, PathBuf::from("train.csv"));
        assert_eq!(config.generation.num_examples, 2);
        assert_eq!(config.generation.output_file, PathBuf::from("out.csv"));
    }

    #[test]
    fn test_from_args_sets_truth_file() {
        let args = Args::try_parse_from([
            "submission",
            "calculate-metrics",
            "--true",
            "truth.csv",
            "--report",
            "metrics.json",
        ])
        .unwrap();
        let config = Config::from_args(&args).unwrap();
        assert_eq!(config.metrics.truth_file, Some(PathBuf::from("truth.csv")));
        assert_eq!(config.metrics.report_file, Some(PathBuf::from("metrics.json")));
        assert_eq!(config.metrics.show_errors, DEFAULT_SHOW_ERRORS);
    }

    #[test]
    fn test_rejects_zero_examples() {
        let args = Args::try_parse_from([
            "submission",
            "generate-submission",
            "--num-examples",
            "0",
        ])
        .unwrap();
        let err = Config::from_args(&args).unwrap_err();
        assert!(matches!(err, SubmissionError::Config { .. }));
    }

    #[test]
    fn test_rejects_quote_delimiter() {
        let config = Config {
            delimiter: '"',
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}
