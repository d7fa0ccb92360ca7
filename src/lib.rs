//! # Submission Toolkit
//!
//! Tools for a question-to-API-request prediction task. Every file is a
//! `;`-separated CSV: training data maps a `question` to an HTTP method
//! (`type`) and an API path (`request`), and a submission answers each test
//! `uid` with a `uid;type;request` row.
//!
//! ## Features
//!
//! - Question extraction from labelled training data
//! - Nearest-neighbour submission generation with id transfer
//! - Submission format validation against a test file
//! - Accuracy metrics with ranked error examples
//!
//! ## Example
//!
//! ```no_run
//! use submission_toolkit::{config::Config, core::SubmissionValidator};
//!
//! let validator = SubmissionValidator::new(Config::default());
//! let report = validator.run_all_validations();
//! println!("{report}");
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod utils;

use anyhow::Result;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging with appropriate verbosity.
///
/// Logs go to stderr so reports printed on stdout stay clean.
pub fn setup_logging(debug: bool) -> Result<()> {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_level(true)
                .compact(),
        )
        .with(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}
