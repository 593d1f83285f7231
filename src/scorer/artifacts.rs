use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::{ScorerError, ScorerResult};

/// Character-n-gram TF-IDF vectorizer, deserialized from `vectorizer.json`.
///
/// N-grams are taken from each whitespace-separated word of the lowercased
/// text, padded with a single space on both sides so that n-grams anchor to
/// word boundaries. Term frequencies are optionally sublinear (1 + ln tf),
/// scaled by the per-column IDF weight, and the resulting vector is
/// L2-normalized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vectorizer {
    pub ngram_min: usize,
    pub ngram_max: usize,
    #[serde(default)]
    pub sublinear_tf: bool,
    pub vocabulary: HashMap<String, usize>,
    pub idf: Vec<f64>,
}

impl Vectorizer {
    pub fn validate(&self, path: &Path) -> ScorerResult<()> {
        if self.ngram_min == 0 || self.ngram_min > self.ngram_max {
            return Err(ScorerError::CorruptArtifact {
                path: path.to_path_buf(),
                detail: format!(
                    "invalid n-gram range ({}, {})",
                    self.ngram_min, self.ngram_max
                ),
            });
        }
        for (ngram, &column) in &self.vocabulary {
            if column >= self.idf.len() {
                return Err(ScorerError::CorruptArtifact {
                    path: path.to_path_buf(),
                    detail: format!(
                        "vocabulary entry {ngram:?} points past the IDF table ({} columns)",
                        self.idf.len()
                    ),
                });
            }
        }
        Ok(())
    }

    pub fn dimension(&self) -> usize {
        self.idf.len()
    }

    /// Transforms text into a sparse column → weight map.
    pub fn transform(&self, text: &str) -> HashMap<usize, f64> {
        let mut counts: HashMap<usize, f64> = HashMap::new();
        let normalized = text.to_lowercase();

        for word in normalized.split_whitespace() {
            let padded: Vec<char> = std::iter::once(' ')
                .chain(word.chars())
                .chain(std::iter::once(' '))
                .collect();
            for n in self.ngram_min..=self.ngram_max {
                if padded.len() < n {
                    break;
                }
                for window in padded.windows(n) {
                    let ngram: String = window.iter().collect();
                    if let Some(&column) = self.vocabulary.get(&ngram) {
                        *counts.entry(column).or_insert(0.0) += 1.0;
                    }
                }
            }
        }

        let mut weights: HashMap<usize, f64> = counts
            .into_iter()
            .map(|(column, tf)| {
                let tf = if self.sublinear_tf { 1.0 + tf.ln() } else { tf };
                (column, tf * self.idf[column])
            })
            .collect();

        let norm = weights.values().map(|w| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            for weight in weights.values_mut() {
                *weight /= norm;
            }
        }
        weights
    }
}

/// Linear decision model, deserialized from `classifier.json`. Binary models
/// carry a single weight row; multi-class models carry one row per class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearClassifier {
    pub classes: Vec<String>,
    pub weights: Vec<Vec<f64>>,
    pub intercepts: Vec<f64>,
}

impl LinearClassifier {
    pub fn validate(&self, path: &Path, dimension: usize) -> ScorerResult<()> {
        let corrupt = |detail: String| ScorerError::CorruptArtifact {
            path: path.to_path_buf(),
            detail,
        };

        if self.classes.len() < 2 {
            return Err(corrupt(format!(
                "expected at least 2 classes, found {}",
                self.classes.len()
            )));
        }
        if self.weights.len() != self.intercepts.len() {
            return Err(corrupt(format!(
                "{} weight rows but {} intercepts",
                self.weights.len(),
                self.intercepts.len()
            )));
        }
        let expected_rows = if self.classes.len() == 2 {
            1
        } else {
            self.classes.len()
        };
        if self.weights.len() != expected_rows {
            return Err(corrupt(format!(
                "{} classes require {} weight rows, found {}",
                self.classes.len(),
                expected_rows,
                self.weights.len()
            )));
        }
        for (row, weights) in self.weights.iter().enumerate() {
            if weights.len() != dimension {
                return Err(corrupt(format!(
                    "weight row {row} has {} columns, vectorizer has {dimension}",
                    weights.len()
                )));
            }
        }
        Ok(())
    }

    pub fn is_binary(&self) -> bool {
        self.weights.len() == 1
    }

    /// Per-row decision scores for a sparse feature vector.
    pub fn decision_function(&self, features: &HashMap<usize, f64>) -> Vec<f64> {
        self.weights
            .iter()
            .zip(&self.intercepts)
            .map(|(row, intercept)| {
                features
                    .iter()
                    .map(|(&column, weight)| row[column] * weight)
                    .sum::<f64>()
                    + intercept
            })
            .collect()
    }
}

/// Offline training metrics, the optional `metrics.json` artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetrics {
    pub accuracy: f64,
    pub f1_macro: f64,
}
