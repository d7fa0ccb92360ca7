//! Submission format validation
//!
//! Checks a submission file against the test file it is supposed to answer
//! and records every check as a named pass/fail entry.

use crate::{
    config::Config,
    core::records::{CsvStore, SUBMISSION_HEADER},
    error::Result,
};
use std::collections::{BTreeSet, HashSet};
use std::path::Path;
use tracing::{debug, info, instrument, warn};

/// How many uids to list in a missing/extra detail message
const MAX_LISTED_UIDS: usize = 5;

/// Outcome of one check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    /// Human readable check name
    pub name: String,
    pub passed: bool,
    /// Failure explanation
    pub detail: Option<String>,
}

impl CheckResult {
    fn pass(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: true,
            detail: None,
        }
    }

    fn fail(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: false,
            detail: Some(detail.into()),
        }
    }
}

/// Ordered list of check outcomes
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub checks: Vec<CheckResult>,
}

impl ValidationReport {
    /// True when every recorded check passed
    pub fn is_valid(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    /// Checks that failed, in order
    pub fn failures(&self) -> impl Iterator<Item = &CheckResult> {
        self.checks.iter().filter(|c| !c.passed)
    }

    fn push(&mut self, check: CheckResult) {
        if check.passed {
            debug!("PASS {}", check.name);
        } else {
            warn!(
                "FAIL {}: {}",
                check.name,
                check.detail.as_deref().unwrap_or_default()
            );
        }
        self.checks.push(check);
    }
}

impl std::fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for check in &self.checks {
            match &check.detail {
                Some(detail) if !check.passed => {
                    writeln!(f, "[FAIL] {}: {}", check.name, detail)?
                }
                _ => writeln!(
                    f,
                    "[{}] {}",
                    if check.passed { "PASS" } else { "FAIL" },
                    check.name
                )?,
            }
        }
        let failed = self.failures().count();
        write!(
            f,
            "{} checks, {} passed, {} failed",
            self.checks.len(),
            self.checks.len() - failed,
            failed
        )
    }
}

/// Validator for submission files
pub struct SubmissionValidator {
    config: Config,
    store: CsvStore,
}

impl SubmissionValidator {
    /// Create a new validator
    pub fn new(config: Config) -> Self {
        Self {
            store: CsvStore::new(config.delimiter_byte()),
            config,
        }
    }

    /// Run every check, stopping early where later checks would be meaningless
    #[instrument(skip(self))]
    pub fn run_all_validations(&self) -> ValidationReport {
        let submission_path = &self.config.validation.submission_file;
        let test_path = &self.config.validation.test_file;
        let mut report = ValidationReport::default();

        info!(
            "Validating {} against {}",
            submission_path.display(),
            test_path.display()
        );

        if !submission_path.is_file() {
            report.push(CheckResult::fail(
                "Submission file exists",
                format!("File {} not found", submission_path.display()),
            ));
            return report;
        }
        report.push(CheckResult::pass("Submission file exists"));

        if !test_path.is_file() {
            report.push(CheckResult::fail(
                "Test file exists",
                format!("File {} not found", test_path.display()),
            ));
            return report;
        }
        report.push(CheckResult::pass("Test file exists"));

        let (submission, test) = match self.read_both(submission_path, test_path) {
            Ok(data) => data,
            Err(e) => {
                report.push(CheckResult::fail(
                    "File processing",
                    format!("Failed to process files: {}", e),
                ));
                return report;
            }
        };

        if let Some(problem) = self.structure_problem(&submission) {
            report.push(CheckResult::fail("File structure", problem));
            return report;
        }
        report.push(CheckResult::pass("File structure"));

        let test_uids = test_uids(&test);
        let submission_rows = &submission[1..];
        let submission_uids = self.check_rows(submission_rows, &mut report);

        if submission_rows.len() == test_uids.len() {
            report.push(CheckResult::pass("Row count"));
        } else {
            report.push(CheckResult::fail(
                "Row count",
                format!(
                    "Wrong number of rows: expected {}, found {}",
                    test_uids.len(),
                    submission_rows.len()
                ),
            ));
        }

        let missing: BTreeSet<&str> = test_uids
            .iter()
            .copied()
            .filter(|uid| !submission_uids.contains(uid))
            .collect();
        if missing.is_empty() {
            report.push(CheckResult::pass("All test uids present"));
        } else {
            report.push(CheckResult::fail(
                "All test uids present",
                format!("Missing rows for uid: {}", list_uids(&missing)),
            ));
        }

        let extra: BTreeSet<&str> = submission_uids
            .iter()
            .copied()
            .filter(|uid| !test_uids.contains(uid))
            .collect();
        if extra.is_empty() {
            report.push(CheckResult::pass("No extra uids"));
        } else {
            report.push(CheckResult::fail(
                "No extra uids",
                format!("Found uids absent from the test file: {}", list_uids(&extra)),
            ));
        }

        report
    }

    fn read_both(
        &self,
        submission_path: &Path,
        test_path: &Path,
    ) -> Result<(Vec<Vec<String>>, Vec<Vec<String>>)> {
        let submission = self.store.read_rows(submission_path)?;
        let test = self.store.read_rows(test_path)?;
        Ok((submission, test))
    }

    fn structure_problem(&self, submission: &[Vec<String>]) -> Option<String> {
        let Some(header) = submission.first() else {
            return Some("Submission file is empty".to_string());
        };
        if submission.iter().any(|row| row.len() != SUBMISSION_HEADER.len()) {
            return Some(format!(
                "Expected {} columns ({}) in every row",
                SUBMISSION_HEADER.len(),
                SUBMISSION_HEADER.join(";")
            ));
        }
        if header.iter().map(String::as_str).ne(SUBMISSION_HEADER) {
            return Some(format!(
                "Expected header {}, found {}",
                SUBMISSION_HEADER.join(";"),
                header.join(";")
            ));
        }
        None
    }

    /// Per-row checks; returns the set of uids seen
    fn check_rows<'a>(
        &self,
        rows: &'a [Vec<String>],
        report: &mut ValidationReport,
    ) -> HashSet<&'a str> {
        let valid_methods = &self.config.validation.valid_methods;
        let mut seen = HashSet::new();

        // line 1 is the header
        for (line, row) in (2..).zip(rows) {
            let (uid, method, request) = (row[0].as_str(), row[1].as_str(), row[2].as_str());

            if uid.is_empty() || method.is_empty() || request.is_empty() {
                report.push(CheckResult::fail(
                    format!("Empty values (line {})", line),
                    format!("Line {}: empty values found", line),
                ));
                continue;
            }

            if !seen.insert(uid) {
                report.push(CheckResult::fail(
                    format!("Unique uid (line {})", line),
                    format!("Line {}: duplicate uid '{}'", line, uid),
                ));
            }

            if !valid_methods.iter().any(|m| m == method) {
                let mut allowed: Vec<&str> = valid_methods.iter().map(String::as_str).collect();
                allowed.sort_unstable();
                report.push(CheckResult::fail(
                    format!("HTTP method (line {})", line),
                    format!(
                        "Line {}: invalid HTTP method '{}'. Allowed values: {}",
                        line,
                        method,
                        allowed.join(", ")
                    ),
                ));
            }

            if !request.starts_with('/') {
                report.push(CheckResult::fail(
                    format!("API path (line {})", line),
                    format!(
                        "Line {}: invalid request path '{}'. The path must start with '/'",
                        line, request
                    ),
                ));
            }
        }

        seen
    }
}

/// Distinct uids of a test file, located by the `uid` header when present
fn test_uids(rows: &[Vec<String>]) -> HashSet<&str> {
    let Some(header) = rows.first() else {
        return HashSet::new();
    };
    let column = header.iter().position(|h| h == "uid").unwrap_or(0);

    rows[1..]
        .iter()
        .filter_map(|row| row.get(column))
        .map(String::as_str)
        .collect()
}

fn list_uids(uids: &BTreeSet<&str>) -> String {
    let listed: Vec<&str> = uids.iter().copied().take(MAX_LISTED_UIDS).collect();
    let suffix = if uids.len() > MAX_LISTED_UIDS { "..." } else { "" };
    format!("{}{}", listed.join(", "), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const TEST_CSV: &str = "uid;question\nu1;list users\nu2;delete user 3\nu3;create order\n";

    fn validate(submission: Option<&str>, test: Option<&str>) -> ValidationReport {
        let temp_dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.validation.submission_file = temp_dir.path().join("submission.csv");
        config.validation.test_file = temp_dir.path().join("test.csv");
        if let Some(content) = submission {
            fs::write(&config.validation.submission_file, content).unwrap();
        }
        if let Some(content) = test {
            fs::write(&config.validation.test_file, content).unwrap();
        }
        SubmissionValidator::new(config).run_all_validations()
    }

    fn failed_names(report: &ValidationReport) -> Vec<String> {
        report.failures().map(|c| c.name.clone()).collect()
    }

    #[test]
    fn test_valid_submission_passes_everything() {
        let report = validate(
            Some("uid;type;request\nu1;GET;/api/users\nu2;DELETE;/api/users/3\nu3;POST;/api/orders\n"),
            Some(TEST_CSV),
        );
        assert!(report.is_valid(), "{}", report);
        assert_eq!(report.checks.len(), 6);
    }

    #[test]
    fn test_missing_submission_stops_early() {
        let report = validate(None, Some(TEST_CSV));
        assert_eq!(report.checks.len(), 1);
        assert_eq!(failed_names(&report), vec!["Submission file exists"]);
    }

    #[test]
    fn test_missing_test_file_stops_early() {
        let report = validate(Some("uid;type;request\n"), None);
        assert_eq!(report.checks.len(), 2);
        assert_eq!(failed_names(&report), vec!["Test file exists"]);
    }

    #[test]
    fn test_wrong_column_count() {
        let report = validate(Some("uid;type;request\nu1;GET\n"), Some(TEST_CSV));
        assert_eq!(failed_names(&report), vec!["File structure"]);
    }

    #[test]
    fn test_wrong_header() {
        let report = validate(Some("id;method;path\nu1;GET;/x\n"), Some(TEST_CSV));
        let failure = report.failures().next().unwrap();
        assert_eq!(failure.name, "File structure");
        assert!(failure.detail.as_ref().unwrap().contains("id;method;path"));
    }

    #[test]
    fn test_empty_submission_file() {
        let report = validate(Some(""), Some(TEST_CSV));
        let failure = report.failures().next().unwrap();
        assert_eq!(failure.name, "File structure");
        assert_eq!(failure.detail.as_deref(), Some("Submission file is empty"));
    }

    #[test]
    fn test_row_level_failures() {
        let report = validate(
            Some(
                "uid;type;request\n\
                 u1;GET;/api/users\n\
                 u1;FETCH;/api/users\n\
                 u2;POST;api/orders\n\
                 u3;;/api\n",
            ),
            Some(TEST_CSV),
        );
        assert_eq!(
            failed_names(&report),
            vec![
                "Unique uid (line 3)",
                "HTTP method (line 3)",
                "API path (line 4)",
                "Empty values (line 5)",
                "Row count",
                "All test uids present",
            ]
        );

        let method_failure = report
            .failures()
            .find(|c| c.name == "HTTP method (line 3)")
            .unwrap();
        assert!(method_failure
            .detail
            .as_ref()
            .unwrap()
            .ends_with("DELETE, GET, HEAD, OPTIONS, PATCH, POST, PUT"));
    }

    #[test]
    fn test_missing_and_extra_uids_are_listed() {
        let report = validate(
            Some("uid;type;request\nu1;GET;/a\nx1;GET;/b\nx2;GET;/c\n"),
            Some(TEST_CSV),
        );
        let details: Vec<String> = report
            .failures()
            .filter_map(|c| c.detail.clone())
            .collect();
        assert!(details.contains(&"Missing rows for uid: u2, u3".to_string()));
        assert!(details.contains(&"Found uids absent from the test file: x1, x2".to_string()));
        // three rows for three test uids, so the count itself is fine
        assert!(!failed_names(&report).contains(&"Row count".to_string()));
    }

    #[test]
    fn test_unreadable_submission_stops_at_file_processing() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.validation.submission_file = temp_dir.path().join("submission.csv");
        config.validation.test_file = temp_dir.path().join("test.csv");
        fs::write(
            &config.validation.submission_file,
            b"uid;type;request\n\xff\xfe;GET;/api\n",
        )
        .unwrap();
        fs::write(&config.validation.test_file, TEST_CSV).unwrap();

        let report = SubmissionValidator::new(config).run_all_validations();
        let last = report.checks.last().unwrap();
        assert_eq!(last.name, "File processing");
        assert!(!last.passed);
        assert_eq!(report.checks.len(), 3);
        assert!(!report.checks.iter().any(|c| c.name == "File structure"));
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let report = validate(
            Some("uid;type;request\n\nu1;GET;/api/users\nu2;DELETE;/api/users/3\n\nu3;POST;/api/orders\n"),
            Some(TEST_CSV),
        );
        assert!(report.is_valid(), "{}", report);
    }

    #[test]
    fn test_uid_listing_is_truncated() {
        let uids: BTreeSet<&str> = ["a", "b", "c", "d", "e", "f"].into_iter().collect();
        assert_eq!(list_uids(&uids), "a, b, c, d, e...");
    }
}
