//! Core functionality for the submission workflow
//!
//! Contains CSV handling, the request predictor, and the generate, validate,
//! score and extract steps built on top of them.

pub mod extract;
pub mod generator;
pub mod metrics;
pub mod predictor;
pub mod records;
pub mod validator;

pub use extract::QuestionExtractor;
pub use generator::{GenerationSummary, SubmissionGenerator};
pub use metrics::{MetricsCalculator, MetricsReport};
pub use predictor::{Prediction, RequestPredictor};
pub use records::{CsvStore, SubmissionRow, TestRecord, TrainRecord};
pub use validator::{SubmissionValidator, ValidationReport};
