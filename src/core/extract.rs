//! Question extraction from labelled data
//!
//! Turns a training file into a questions-only file shaped like a test file.

use crate::{
    config::Config,
    core::records::{CsvStore, TestRecord},
    error::Result,
};
use tracing::{info, instrument};

/// Copies the uid and question columns out of a training file
pub struct QuestionExtractor {
    config: Config,
    store: CsvStore,
}

impl QuestionExtractor {
    pub fn new(config: Config) -> Self {
        Self {
            store: CsvStore::new(config.delimiter_byte()),
            config,
        }
    }

    /// Write `uid;question` rows in input order and return how many were written
    #[instrument(skip(self))]
    pub fn extract(&self) -> Result<usize> {
        let settings = &self.config.extraction;

        let records = self.store.read_test(&settings.input)?;
        if records.is_empty() {
            self.store
                .write_header_only(&settings.output, &["uid", "question"])?;
        } else {
            self.store.write::<TestRecord>(&settings.output, &records)?;
        }

        info!(
            "Extracted {} questions from {} to {}",
            records.len(),
            settings.input.display(),
            settings.output.display()
        );
        Ok(records.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_config(temp_dir: &TempDir) -> Config {
        let mut config = Config::default();
        config.extraction.input = temp_dir.path().join("train.csv");
        config.extraction.output = temp_dir.path().join("processed").join("parsed.csv");
        config
    }

    #[test]
    fn test_extract_keeps_uid_and_question() {
        let temp_dir = TempDir::new().unwrap();
        let config = create_test_config(&temp_dir);
        fs::write(
            &config.extraction.input,
            "uid;question;type;request\nu1;list users;GET;/api/users\nu2;drop order 4;DELETE;/api/orders/4\n",
        )
        .unwrap();

        let written = QuestionExtractor::new(config.clone()).extract().unwrap();
        assert_eq!(written, 2);
        assert_eq!(
            fs::read_to_string(&config.extraction.output).unwrap(),
            "uid;question\nu1;list users\nu2;drop order 4\n"
        );
    }

    #[test]
    fn test_extract_quotes_embedded_delimiters() {
        let temp_dir = TempDir::new().unwrap();
        let config = create_test_config(&temp_dir);
        fs::write(
            &config.extraction.input,
            "uid;question;type;request\nu1;\"users; all of them\";GET;/api/users\n",
        )
        .unwrap();

        QuestionExtractor::new(config.clone()).extract().unwrap();
        assert_eq!(
            fs::read_to_string(&config.extraction.output).unwrap(),
            "uid;question\nu1;\"users; all of them\"\n"
        );
    }

    #[test]
    fn test_extract_requires_question_column() {
        let temp_dir = TempDir::new().unwrap();
        let config = create_test_config(&temp_dir);
        fs::write(&config.extraction.input, "uid;type;request\nu1;GET;/\n").unwrap();

        assert!(QuestionExtractor::new(config.clone()).extract().is_err());
        assert!(!config.extraction.output.exists());
    }
}
