//! Submission scoring against ground truth
//!
//! Computes method, request and exact-match accuracy and ranks the errors so
//! the worst ones can be inspected first.

use crate::{
    config::Config,
    core::records::{CsvStore, SubmissionRow, TrainRecord},
    error::{Result, SubmissionError},
    utils::fs::FileSystemUtils,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;
use tracing::{debug, info, instrument, warn};

/// Accuracy figures for one true HTTP method
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MethodBreakdown {
    /// Ground-truth rows with this method
    pub support: usize,
    /// Rows answered exactly right
    pub exact: usize,
}

/// A ground-truth row the submission got wrong
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorExample {
    pub uid: String,
    pub question: String,
    pub expected_method: String,
    pub expected_request: String,
    /// `None` when the submission has no row for this uid
    pub predicted_method: Option<String>,
    pub predicted_request: Option<String>,
    /// 0.0 for a missing row, up to just below 1.0 for a near miss
    pub score: f64,
}

impl std::fmt::Display for ErrorExample {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "uid {} (score {:.3})", self.uid, self.score)?;
        writeln!(f, "  question:  {}", self.question)?;
        writeln!(
            f,
            "  expected:  {} {}",
            self.expected_method, self.expected_request
        )?;
        match (&self.predicted_method, &self.predicted_request) {
            (Some(method), Some(request)) => write!(f, "  predicted: {} {}", method, request),
            _ => write!(f, "  predicted: <missing>"),
        }
    }
}

/// Full scoring result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsReport {
    pub generated_at: DateTime<Utc>,
    /// Ground-truth rows
    pub total: usize,
    /// Ground-truth rows that have a prediction
    pub predicted: usize,
    /// Ground-truth rows without a prediction
    pub missing: usize,
    /// Submission rows whose uid is not in the ground truth
    pub extra: usize,
    pub method_accuracy: f64,
    pub request_accuracy: f64,
    pub exact_accuracy: f64,
    /// Mean segment similarity between true and predicted paths
    pub mean_request_similarity: f64,
    pub per_method: BTreeMap<String, MethodBreakdown>,
    /// Every non-exact row, worst first
    pub errors: Vec<ErrorExample>,
}

impl MetricsReport {
    /// The `n` lowest-scoring errors
    pub fn worst_errors(&self, n: usize) -> &[ErrorExample] {
        &self.errors[..n.min(self.errors.len())]
    }
}

impl std::fmt::Display for MetricsReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Ground truth rows:   {}", self.total)?;
        writeln!(f, "Predicted rows:      {}", self.predicted)?;
        writeln!(f, "Missing predictions: {}", self.missing)?;
        writeln!(f, "Extra predictions:   {}", self.extra)?;
        writeln!(f, "Method accuracy:     {:.4}", self.method_accuracy)?;
        writeln!(f, "Request accuracy:    {:.4}", self.request_accuracy)?;
        writeln!(f, "Exact accuracy:      {:.4}", self.exact_accuracy)?;
        writeln!(f, "Request similarity:  {:.4}", self.mean_request_similarity)?;
        write!(f, "Per method:")?;
        for (method, breakdown) in &self.per_method {
            write!(
                f,
                "\n  {:<8} {:>5}/{:<5} ({:.4})",
                method,
                breakdown.exact,
                breakdown.support,
                ratio(breakdown.exact, breakdown.support)
            )?;
        }
        Ok(())
    }
}

/// Scores submissions against ground truth
pub struct MetricsCalculator {
    config: Config,
    store: CsvStore,
    fs_utils: FileSystemUtils,
}

impl MetricsCalculator {
    /// Create a new calculator
    pub fn new(config: Config) -> Self {
        Self {
            store: CsvStore::new(config.delimiter_byte()),
            fs_utils: FileSystemUtils::new(),
            config,
        }
    }

    /// Read the configured files and score them
    #[instrument(skip(self))]
    pub fn calculate(&self) -> Result<MetricsReport> {
        let settings = &self.config.metrics;
        let truth_file = settings
            .truth_file
            .as_deref()
            .ok_or_else(|| SubmissionError::config("ground-truth file (--true) is required"))?;

        let truth = self.store.read_train(truth_file)?;
        let submission = self.store.read_submission(&settings.submission_file)?;
        info!(
            "Scoring {} predictions against {} ground-truth rows",
            submission.len(),
            truth.len()
        );

        let report = score(&truth, &submission)?;

        if let Some(report_file) = &settings.report_file {
            self.write_report(&report, report_file)?;
        }
        Ok(report)
    }

    /// Save the report as pretty-printed JSON
    pub fn write_report(&self, report: &MetricsReport, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(report)
            .map_err(|e| SubmissionError::serialization("failed to encode metrics report", e))?;
        self.fs_utils.write_file(path, json)?;
        info!("Metrics report written to {}", path.display());
        Ok(())
    }
}

/// Score `submission` against `truth`
pub fn score(truth: &[TrainRecord], submission: &[SubmissionRow]) -> Result<MetricsReport> {
    if truth.is_empty() {
        return Err(SubmissionError::validation("ground-truth file has no rows"));
    }

    let mut predictions: HashMap<&str, &SubmissionRow> = HashMap::new();
    for row in submission {
        if predictions.insert(row.uid.as_str(), row).is_some() {
            warn!("Duplicate prediction for uid {}; keeping the last one", row.uid);
        }
    }

    let truth_uids: HashSet<&str> = truth.iter().map(|r| r.uid.as_str()).collect();
    let extra = predictions
        .keys()
        .filter(|uid| !truth_uids.contains(*uid))
        .count();

    let mut method_hits = 0;
    let mut request_hits = 0;
    let mut exact_hits = 0;
    let mut predicted = 0;
    let mut similarity_sum = 0.0;
    let mut per_method: BTreeMap<String, MethodBreakdown> = BTreeMap::new();
    let mut errors = Vec::new();

    for record in truth {
        let expected_method = normalize_method(&record.method);
        let breakdown = per_method.entry(expected_method.clone()).or_default();
        breakdown.support += 1;

        let Some(&prediction) = predictions.get(record.uid.as_str()) else {
            errors.push(error_example(record, None, 0.0));
            continue;
        };
        predicted += 1;

        let method_match = normalize_method(&prediction.method) == expected_method;
        let request_match =
            normalize_request(&prediction.request) == normalize_request(&record.request);
        let similarity = path_similarity(&record.request, &prediction.request);
        similarity_sum += similarity;

        method_hits += usize::from(method_match);
        request_hits += usize::from(request_match);

        if method_match && request_match {
            exact_hits += 1;
            breakdown.exact += 1;
        } else {
            let score = 0.5 * f64::from(u8::from(method_match)) + 0.5 * similarity;
            errors.push(error_example(record, Some(prediction), score));
        }
    }

    errors.sort_by(|a, b| a.score.total_cmp(&b.score).then_with(|| a.uid.cmp(&b.uid)));

    let total = truth.len();
    debug!("{} of {} rows are errors", errors.len(), total);

    Ok(MetricsReport {
        generated_at: Utc::now(),
        total,
        predicted,
        missing: total - predicted,
        extra,
        method_accuracy: ratio(method_hits, total),
        request_accuracy: ratio(request_hits, total),
        exact_accuracy: ratio(exact_hits, total),
        mean_request_similarity: if predicted > 0 {
            similarity_sum / predicted as f64
        } else {
            0.0
        },
        per_method,
        errors,
    })
}

fn error_example(record: &TrainRecord, prediction: Option<&SubmissionRow>, score: f64) -> ErrorExample {
    ErrorExample {
        uid: record.uid.clone(),
        question: record.question.clone(),
        expected_method: record.method.clone(),
        expected_request: record.request.clone(),
        predicted_method: prediction.map(|p| p.method.clone()),
        predicted_request: prediction.map(|p| p.request.clone()),
        score,
    }
}

fn ratio(hits: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        hits as f64 / total as f64
    }
}

fn normalize_method(method: &str) -> String {
    method.trim().to_uppercase()
}

/// Trimmed request without a single trailing slash; the root path stays `/`
pub fn normalize_request(request: &str) -> &str {
    let request = request.trim();
    match request.strip_suffix('/') {
        Some(stripped) if !stripped.is_empty() => stripped,
        _ => request,
    }
}

/// `1 - edit distance / longer length` over the non-empty `/` segments
pub fn path_similarity(a: &str, b: &str) -> f64 {
    let a: Vec<&str> = normalize_request(a).split('/').filter(|s| !s.is_empty()).collect();
    let b: Vec<&str> = normalize_request(b).split('/').filter(|s| !s.is_empty()).collect();

    let longest = a.len().max(b.len());
    if longest == 0 {
        return 1.0;
    }

    // single-row Levenshtein over segments
    let mut previous: Vec<usize> = (0..=b.len()).collect();
    for (i, segment_a) in a.iter().enumerate() {
        let mut current = vec![i + 1; b.len() + 1];
        for (j, segment_b) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(segment_a != segment_b);
            current[j + 1] = substitution.min(previous[j + 1] + 1).min(current[j] + 1);
        }
        previous = current;
    }

    1.0 - previous[b.len()] as f64 / longest as f64
}
