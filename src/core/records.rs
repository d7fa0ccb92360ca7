//! CSV data model and file access
//!
//! Reads training, test and submission files and writes CSV output without
//! leaving half-written files behind.

use crate::{
    error::{Result, SubmissionError},
    utils::fs::FileSystemUtils,
};
use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::{fs::File, path::Path};
use tracing::{debug, instrument};

/// Header of a submission file, in order
pub const SUBMISSION_HEADER: [&str; 3] = ["uid", "type", "request"];

/// Labelled row from a training or ground-truth file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrainRecord {
    pub uid: String,
    pub question: String,
    /// HTTP method
    #[serde(rename = "type")]
    pub method: String,
    /// API path
    pub request: String,
}

/// Question to answer, from a test file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TestRecord {
    pub uid: String,
    pub question: String,
}

/// One predicted answer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubmissionRow {
    pub uid: String,
    /// HTTP method
    #[serde(rename = "type")]
    pub method: String,
    /// API path
    pub request: String,
}

/// Reads and writes delimited files
#[derive(Debug)]
pub struct CsvStore {
    delimiter: u8,
    fs_utils: FileSystemUtils,
}

impl CsvStore {
    /// Create a store for files separated by `delimiter`
    pub fn new(delimiter: u8) -> Self {
        Self {
            delimiter,
            fs_utils: FileSystemUtils::new(),
        }
    }

    /// Read a labelled training or ground-truth file
    pub fn read_train(&self, path: &Path) -> Result<Vec<TrainRecord>> {
        self.read_typed(path, &["uid", "question", "type", "request"])
    }

    /// Read a test file; columns other than uid and question are ignored
    pub fn read_test(&self, path: &Path) -> Result<Vec<TestRecord>> {
        self.read_typed(path, &["uid", "question"])
    }

    /// Read a submission file
    pub fn read_submission(&self, path: &Path) -> Result<Vec<SubmissionRow>> {
        self.read_typed(path, &SUBMISSION_HEADER)
    }

    /// Read every row, header included, as trimmed cells.
    ///
    /// Rows may have differing lengths; callers decide what is acceptable.
    /// Blank lines are skipped and never show up as empty rows.
    #[instrument(skip(self))]
    pub fn read_rows(&self, path: &Path) -> Result<Vec<Vec<String>>> {
        self.fs_utils.require_file(path)?;

        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(false)
            .flexible(true)
            .trim(Trim::All)
            .from_path(path)
            .map_err(|e| SubmissionError::csv("failed to open", path, e))?;

        let mut rows = Vec::new();
        for record in reader.records() {
            let record =
                record.map_err(|e| SubmissionError::csv("failed to read row", path, e))?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        debug!("Read {} raw rows from {}", rows.len(), path.display());
        Ok(rows)
    }

    /// Write `rows` with a header derived from their field names
    #[instrument(skip(self, rows))]
    pub fn write<T: Serialize>(&self, path: &Path, rows: &[T]) -> Result<()> {
        let mut writer = WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_writer(Vec::new());

        for row in rows {
            writer
                .serialize(row)
                .map_err(|e| SubmissionError::csv("failed to serialize row", path, e))?;
        }

        let buffer = writer
            .into_inner()
            .map_err(|e| SubmissionError::file_system("flush", path, e.into_error()))?;
        self.fs_utils.write_file(path, buffer)?;

        debug!("Wrote {} rows to {}", rows.len(), path.display());
        Ok(())
    }

    /// Write a file that holds nothing but `header`
    pub fn write_header_only(&self, path: &Path, header: &[&str]) -> Result<()> {
        let mut writer = WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_writer(Vec::new());
        writer
            .write_record(header)
            .map_err(|e| SubmissionError::csv("failed to write header", path, e))?;

        let buffer = writer
            .into_inner()
            .map_err(|e| SubmissionError::file_system("flush", path, e.into_error()))?;
        self.fs_utils.write_file(path, buffer)
    }

    #[instrument(skip(self))]
    fn read_typed<T: DeserializeOwned>(&self, path: &Path, required: &[&str]) -> Result<Vec<T>> {
        self.fs_utils.require_file(path)?;

        let mut reader = self.open(path)?;
        let headers = reader
            .headers()
            .map_err(|e| SubmissionError::csv("failed to read header", path, e))?
            .clone();
        check_columns(&headers, required, path)?;

        let mut records = Vec::new();
        for (index, result) in reader.deserialize::<T>().enumerate() {
            // line 1 is the header
            let record = result.map_err(|e| {
                SubmissionError::csv(format!("invalid row at line {}", index + 2), path, e)
            })?;
            records.push(record);
        }

        debug!("Read {} records from {}", records.len(), path.display());
        Ok(records)
    }

    fn open(&self, path: &Path) -> Result<csv::Reader<File>> {
        ReaderBuilder::new()
            .delimiter(self.delimiter)
            .trim(Trim::All)
            .from_path(path)
            .map_err(|e| SubmissionError::csv("failed to open", path, e))
    }
}

fn check_columns(headers: &StringRecord, required: &[&str], path: &Path) -> Result<()> {
    let missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|column| !headers.iter().any(|h| h == *column))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(SubmissionError::schema(
            format!(
                "missing column(s) {} (found: {})",
                missing.join(", "),
                headers.iter().collect::<Vec<_>>().join(", ")
            ),
            path,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_fixture(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_read_train_trims_and_ignores_extra_columns() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_fixture(
            &temp_dir,
            "train.csv",
            "uid;question;type;request;source\n a1 ; list users ;GET;/api/users;manual\n",
        );

        let records = CsvStore::new(b';').read_train(&path).unwrap();
        assert_eq!(
            records,
            vec![TrainRecord {
                uid: "a1".to_string(),
                question: "list users".to_string(),
                method: "GET".to_string(),
                request: "/api/users".to_string(),
            }]
        );
    }

    #[test]
    fn test_read_test_missing_column() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_fixture(&temp_dir, "test.csv", "id;question\n1;hello\n");

        let err = CsvStore::new(b';').read_test(&path).unwrap_err();
        match err {
            SubmissionError::Schema { message, .. } => assert!(message.contains("uid")),
            other => panic!("Expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn test_read_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let err = CsvStore::new(b';')
            .read_train(&temp_dir.path().join("nope.csv"))
            .unwrap_err();
        assert!(matches!(err, SubmissionError::FileSystem { .. }));
    }

    #[test]
    fn test_write_submission_header_and_delimiter() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out").join("submission.csv");
        let rows = vec![SubmissionRow {
            uid: "a1".to_string(),
            method: "GET".to_string(),
            request: "/api/users".to_string(),
        }];

        CsvStore::new(b';').write(&path, &rows).unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "uid;type;request\na1;GET;/api/users\n"
        );
    }

    #[test]
    fn test_write_header_only() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("empty.csv");

        CsvStore::new(b';')
            .write_header_only(&path, &SUBMISSION_HEADER)
            .unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "uid;type;request\n");
    }

    #[test]
    fn test_read_rows_keeps_ragged_rows() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_fixture(&temp_dir, "sub.csv", "uid;type;request\na; GET ;/x\nb;POST\n");

        let rows = CsvStore::new(b';').read_rows(&path).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1], vec!["a", "GET", "/x"]);
        assert_eq!(rows[2].len(), 2);
    }

    #[test]
    fn test_read_rows_skips_blank_lines() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_fixture(&temp_dir, "sub.csv", "uid;type;request\n\na;GET;/x\n\n");

        let rows = CsvStore::new(b';').read_rows(&path).unwrap();
        assert_eq!(rows, vec![vec!["uid", "type", "request"], vec!["a", "GET", "/x"]]);
    }
}
