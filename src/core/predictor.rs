//! Nearest-neighbour prediction of API requests
//!
//! Questions are embedded as TF-IDF vectors. A test question is answered by
//! letting its most similar training questions vote on a `(type, request)`
//! pair, with ids copied over from the test question.

use crate::{
    core::records::TrainRecord,
    error::{Result, SubmissionError},
    utils::text::Tokenizer,
};
use std::collections::HashMap;
use tracing::{debug, instrument};

/// L2-normalized sparse vector, sorted by term id
type SparseVector = Vec<(usize, f64)>;

/// A predicted answer
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub method: String,
    pub request: String,
    /// Summed similarity of the neighbours that voted for this answer
    pub score: f64,
    /// Number of neighbours that voted for this answer
    pub support: usize,
}

/// A training example together with its similarity to a query
#[derive(Debug, Clone, Copy)]
pub struct Neighbour<'a> {
    pub record: &'a TrainRecord,
    pub similarity: f64,
}

/// TF-IDF index over training questions
pub struct RequestPredictor {
    tokenizer: Tokenizer,
    records: Vec<TrainRecord>,
    vectors: Vec<SparseVector>,
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
    /// Most frequent answer, used when nothing is similar
    fallback: (String, String),
}

impl RequestPredictor {
    /// Build the index from labelled training records
    #[instrument(skip(records), fields(examples = records.len()))]
    pub fn fit(records: Vec<TrainRecord>) -> Result<Self> {
        if records.is_empty() {
            return Err(SubmissionError::prediction("training set is empty"));
        }

        let tokenizer = Tokenizer::new()?;
        let tokenized: Vec<Vec<String>> = records
            .iter()
            .map(|r| tokenizer.tokens(&r.question))
            .collect();

        let mut vocabulary: HashMap<String, usize> = HashMap::new();
        let mut document_frequency: Vec<usize> = Vec::new();
        for tokens in &tokenized {
            let mut seen: Vec<usize> = Vec::new();
            for token in tokens {
                let next_id = vocabulary.len();
                let id = *vocabulary.entry(token.clone()).or_insert(next_id);
                if id == document_frequency.len() {
                    document_frequency.push(0);
                }
                if !seen.contains(&id) {
                    seen.push(id);
                    document_frequency[id] += 1;
                }
            }
        }

        let n = records.len() as f64;
        let idf: Vec<f64> = document_frequency
            .iter()
            .map(|&df| ((1.0 + n) / (1.0 + df as f64)).ln() + 1.0)
            .collect();

        let mut predictor = Self {
            tokenizer,
            vectors: Vec::with_capacity(records.len()),
            fallback: most_frequent_answer(&records),
            records,
            vocabulary,
            idf,
        };
        let vectors = tokenized.iter().map(|t| predictor.vectorize(t)).collect();
        predictor.vectors = vectors;

        debug!(
            "Indexed {} questions over {} terms",
            predictor.records.len(),
            predictor.vocabulary.len()
        );
        Ok(predictor)
    }

    /// Number of indexed training examples
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The `k` most similar training examples with positive similarity,
    /// most similar first
    pub fn neighbours(&self, question: &str, k: usize) -> Vec<Neighbour<'_>> {
        let query = self.vectorize(&self.tokenizer.tokens(question));
        if query.is_empty() || k == 0 {
            return Vec::new();
        }

        let mut scored: Vec<Neighbour<'_>> = self
            .records
            .iter()
            .zip(&self.vectors)
            .map(|(record, vector)| Neighbour {
                record,
                similarity: dot(&query, vector),
            })
            .filter(|n| n.similarity > 0.0)
            .collect();

        // stable sort keeps file order among equal similarities
        scored.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        scored.truncate(k);
        scored
    }

    /// Predict the answer for `question` from its `k` nearest neighbours
    pub fn predict(&self, question: &str, k: usize) -> Prediction {
        let neighbours = self.neighbours(question, k);
        if neighbours.is_empty() {
            debug!("No similar training question for {:?}, using fallback", question);
            return Prediction {
                method: self.fallback.0.clone(),
                request: self.fallback.1.clone(),
                score: 0.0,
                support: 0,
            };
        }

        // (method, request) -> (total similarity, best similarity, votes)
        let mut ballots: HashMap<(String, String), (f64, f64, usize)> = HashMap::new();
        for neighbour in &neighbours {
            let request = self.tokenizer.transfer_numbers(
                &neighbour.record.request,
                &neighbour.record.question,
                question,
            );
            let entry = ballots
                .entry((neighbour.record.method.clone(), request))
                .or_insert((0.0, 0.0, 0));
            entry.0 += neighbour.similarity;
            entry.1 = entry.1.max(neighbour.similarity);
            entry.2 += 1;
        }

        let ((method, request), (score, _, support)) = ballots
            .into_iter()
            .max_by(|(key_a, a), (key_b, b)| {
                a.0.total_cmp(&b.0)
                    .then(a.1.total_cmp(&b.1))
                    // lexicographically smaller answer wins a full tie
                    .then_with(|| key_b.cmp(key_a))
            })
            .unwrap_or_else(|| {
                (
                    (self.fallback.0.clone(), self.fallback.1.clone()),
                    (0.0, 0.0, 0),
                )
            });

        Prediction {
            method,
            request,
            score,
            support,
        }
    }

    fn vectorize(&self, tokens: &[String]) -> SparseVector {
        let mut counts: HashMap<usize, f64> = HashMap::new();
        for token in tokens {
            if let Some(&id) = self.vocabulary.get(token) {
                *counts.entry(id).or_insert(0.0) += 1.0;
            }
        }

        let mut vector: SparseVector = counts
            .into_iter()
            .map(|(id, tf)| (id, tf * self.idf[id]))
            .collect();
        vector.sort_by_key(|(id, _)| *id);

        let norm = vector.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, weight) in &mut vector {
                *weight /= norm;
            }
        }
        vector
    }
}

/// Dot product of two sparse vectors sorted by term id
fn dot(a: &SparseVector, b: &SparseVector) -> f64 {
    let (mut i, mut j) = (0, 0);
    let mut sum = 0.0;
    while i < a.len() && j < b.len() {
        match a[i].0.cmp(&b[j].0) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                sum += a[i].1 * b[j].1;
                i += 1;
                j += 1;
            }
        }
    }
    sum
}

fn most_frequent_answer(records: &[TrainRecord]) -> (String, String) {
    let mut counts: HashMap<(&str, &str), usize> = HashMap::new();
    for record in records {
        *counts
            .entry((record.method.as_str(), record.request.as_str()))
            .or_insert(0) += 1;
    }

    counts
        .into_iter()
        .max_by(|(key_a, a), (key_b, b)| a.cmp(b).then_with(|| key_b.cmp(key_a)))
        .map(|((method, request), _)| (method.to_string(), request.to_string()))
        .unwrap_or_default()
}
