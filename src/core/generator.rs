//! Submission generation
//!
//! Answers every test question with the predictor and writes the result as a
//! `uid;type;request` file.

use crate::{
    config::Config,
    core::{
        predictor::RequestPredictor,
        records::{CsvStore, SUBMISSION_HEADER, SubmissionRow},
    },
    error::Result,
};
use tracing::{debug, info, instrument, warn};

/// Summary of a generation run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationSummary {
    /// Rows written
    pub rows: usize,
    /// Rows answered by the most-frequent fallback
    pub fallbacks: usize,
    /// Mean vote score of the winning answers
    pub mean_score: f64,
}

impl std::fmt::Display for GenerationSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Generated {} rows ({} fallback answers, mean vote score {:.3})",
            self.rows, self.fallbacks, self.mean_score
        )
    }
}

/// Builds submission files from training and test data
pub struct SubmissionGenerator {
    config: Config,
    store: CsvStore,
}

impl SubmissionGenerator {
    /// Create a new generator
    pub fn new(config: Config) -> Self {
        Self {
            store: CsvStore::new(config.delimiter_byte()),
            config,
        }
    }

    /// Predict every test row and write the submission file
    #[instrument(skip(self))]
    pub fn generate(&self) -> Result<GenerationSummary> {
        let settings = &self.config.generation;

        let train = self.store.read_train(&settings.train_file)?;
        info!(
            "Loaded {} training examples from {}",
            train.len(),
            settings.train_file.display()
        );

        let test = self.store.read_test(&settings.test_file)?;
        info!(
            "Loaded {} test questions from {}",
            test.len(),
            settings.test_file.display()
        );
        if test.is_empty() {
            warn!("Test file has no rows; the submission will only contain a header");
        }

        let predictor = RequestPredictor::fit(train)?;

        let mut rows = Vec::with_capacity(test.len());
        let mut summary = GenerationSummary::default();
        let mut total_score = 0.0;

        for record in &test {
            let prediction = predictor.predict(&record.question, settings.num_examples);
            debug!(
                "{}: {} {} (score {:.3}, {} votes)",
                record.uid, prediction.method, prediction.request, prediction.score, prediction.support
            );

            if prediction.support == 0 {
                summary.fallbacks += 1;
            }
            total_score += prediction.score;

            rows.push(SubmissionRow {
                uid: record.uid.clone(),
                method: prediction.method,
                request: prediction.request,
            });
        }

        summary.rows = rows.len();
        if summary.rows > 0 {
            summary.mean_score = total_score / summary.rows as f64;
        }

        // csv's serializer needs a header even for an empty file
        if rows.is_empty() {
            self.store
                .write_header_only(&settings.output_file, &SUBMISSION_HEADER)?;
        } else {
            self.store.write(&settings.output_file, &rows)?;
        }

        info!(
            "Submission written to {}",
            settings.output_file.display()
        );
        Ok(summary)
    }
}
