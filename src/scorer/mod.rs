use std::fs;
use std::path::{Path, PathBuf};

use once_cell::sync::OnceCell;

use crate::categories::DepartmentCategory;

pub mod artifacts;
pub mod error;

pub use artifacts::{LinearClassifier, ModelMetrics, Vectorizer};
pub use error::{ScorerError, ScorerResult};

pub const VECTORIZER_FILE: &str = "vectorizer.json";
pub const CLASSIFIER_FILE: &str = "classifier.json";
pub const METRICS_FILE: &str = "metrics.json";

/// Primary statistical classifier.
pub trait TextScorer: Send + Sync {
    /// Scores text into a category and a normalized confidence in [0, 1].
    fn score(&self, text: &str) -> ScorerResult<(DepartmentCategory, f64)>;
}

/// TF-IDF + linear SVM scorer backed by the two pre-built JSON artifacts.
///
/// The loaded model is immutable and safe to share by reference across
/// concurrent requests.
#[derive(Debug, Clone)]
pub struct LinearScorer {
    vectorizer: Vectorizer,
    classifier: LinearClassifier,
    classes: Vec<DepartmentCategory>,
}

impl LinearScorer {
    /// Loads and validates both artifacts from `model_dir`.
    pub fn load(model_dir: &Path) -> ScorerResult<Self> {
        let vectorizer_path = model_dir.join(VECTORIZER_FILE);
        let vectorizer: Vectorizer = read_artifact(&vectorizer_path)?;
        vectorizer.validate(&vectorizer_path)?;

        let classifier_path = model_dir.join(CLASSIFIER_FILE);
        let classifier: LinearClassifier = read_artifact(&classifier_path)?;
        classifier.validate(&classifier_path, vectorizer.dimension())?;

        let classes = classifier
            .classes
            .iter()
            .map(|label| {
                DepartmentCategory::from_label(label).map_err(|_| {
                    ScorerError::CorruptArtifact {
                        path: classifier_path.clone(),
                        detail: format!("unknown class label {label:?}"),
                    }
                })
            })
            .collect::<ScorerResult<Vec<_>>>()?;

        tracing::info!(
            model_dir = %model_dir.display(),
            classes = classes.len(),
            dimension = vectorizer.dimension(),
            "loaded classifier model"
        );

        Ok(Self {
            vectorizer,
            classifier,
            classes,
        })
    }
}

impl TextScorer for LinearScorer {
    fn score(&self, text: &str) -> ScorerResult<(DepartmentCategory, f64)> {
        let features = self.vectorizer.transform(text);
        let scores = self.classifier.decision_function(&features);

        if self.classifier.is_binary() {
            // Binary models expose one margin; distance from the hyperplane
            // maps to confidence through a halved sigmoid.
            let margin = scores[0];
            let confidence = 1.0 / (1.0 + (-margin.abs() / 2.0).exp());
            let index = if margin > 0.0 { 1 } else { 0 };
            return Ok((self.classes[index], confidence));
        }

        let mut index = 0;
        for (i, score) in scores.iter().enumerate() {
            if *score > scores[index] {
                index = i;
            }
        }
        let top = scores[index];
        // Softmax at the arg-max class, stabilized against the row maximum.
        let denominator: f64 = scores.iter().map(|s| (s - top).exp()).sum();
        let confidence = 1.0 / denominator;
        Ok((self.classes[index], confidence))
    }
}

/// Lazily loaded scorer handle. The first call loads the artifacts exactly
/// once; concurrent first calls block on the same initialization instead of
/// racing to load twice. Cheap to construct before the artifacts exist.
#[derive(Debug)]
pub struct LazyScorer {
    model_dir: PathBuf,
    model: OnceCell<LinearScorer>,
}

impl LazyScorer {
    pub fn new(model_dir: impl Into<PathBuf>) -> Self {
        Self {
            model_dir: model_dir.into(),
            model: OnceCell::new(),
        }
    }
}

impl TextScorer for LazyScorer {
    fn score(&self, text: &str) -> ScorerResult<(DepartmentCategory, f64)> {
        self.model
            .get_or_try_init(|| LinearScorer::load(&self.model_dir))?
            .score(text)
    }
}

impl ModelMetrics {
    /// Reads the optional `metrics.json` artifact; absence is not an error.
    pub fn load(model_dir: &Path) -> ScorerResult<Option<Self>> {
        let path = model_dir.join(METRICS_FILE);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(ScorerError::ModelUnavailable { path, source }),
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| ScorerError::CorruptArtifact {
                path,
                detail: e.to_string(),
            })
    }
}

fn read_artifact<T: serde::de::DeserializeOwned>(path: &Path) -> ScorerResult<T> {
    let raw = fs::read_to_string(path).map_err(|source| ScorerError::ModelUnavailable {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|e| ScorerError::CorruptArtifact {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })
}
