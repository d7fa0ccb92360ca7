//! Command-line argument parsing and validation

use crate::config::{
    DEFAULT_NUM_EXAMPLES, DEFAULT_PARSED_TRAIN_PATH, DEFAULT_SHOW_ERRORS,
    DEFAULT_SUBMISSION_PATH, DEFAULT_TEST_PATH, DEFAULT_TRAIN_PATH,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Submission toolkit - generate, validate and score submission files
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "submission")]
pub struct Args {
    /// Enable debug output
    #[arg(long, global = true)]
    pub debug: bool,

    /// Field delimiter used by every CSV file
    #[arg(long, global = true, default_value_t = ';')]
    pub delimiter: char,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Extract the uid and question columns from a training file
    ParseTrain {
        /// Training CSV to read
        #[arg(long, default_value = DEFAULT_TRAIN_PATH)]
        input: PathBuf,

        /// Where to write the uid;question file
        #[arg(long, default_value = DEFAULT_PARSED_TRAIN_PATH)]
        output: PathBuf,
    },

    /// Predict type and request for every test question
    GenerateSubmission {
        /// Labelled training CSV (uid;question;type;request)
        #[arg(long = "train-file", default_value = DEFAULT_TRAIN_PATH)]
        train_file: PathBuf,

        /// Test CSV with the questions to answer
        #[arg(long = "test-file", default_value = DEFAULT_TEST_PATH)]
        test_file: PathBuf,

        /// Number of nearest training examples consulted per question
        #[arg(long = "num-examples", default_value_t = DEFAULT_NUM_EXAMPLES)]
        num_examples: usize,

        /// Submission file to write
        #[arg(short = 'o', long, default_value = DEFAULT_SUBMISSION_PATH)]
        output: PathBuf,
    },

    /// Check a submission file against the expected test file
    ValidateSubmission {
        /// Submission file to check
        #[arg(long = "submission-file", default_value = DEFAULT_SUBMISSION_PATH)]
        submission_file: PathBuf,

        /// Test file the submission must cover
        #[arg(long = "test-file", default_value = DEFAULT_TEST_PATH)]
        test_file: PathBuf,
    },

    /// Score a submission against ground truth
    CalculateMetrics {
        /// Ground-truth CSV (uid;question;type;request)
        #[arg(long = "true")]
        truth_file: PathBuf,

        /// Submission file to score
        #[arg(long, default_value = DEFAULT_SUBMISSION_PATH)]
        submission: PathBuf,

        /// Number of worst errors to print
        #[arg(long = "show-errors", default_value_t = DEFAULT_SHOW_ERRORS)]
        show_errors: usize,

        /// Optional JSON report output
        #[arg(long)]
        report: Option<PathBuf>,
    },
}

/// Parse command line arguments
pub fn parse_args() -> Args {
    Args::parse()
}
