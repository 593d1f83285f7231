use serde::{Deserialize, Serialize};

use crate::categories::DepartmentCategory;

/// Which stage produced a classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchSource {
    #[default]
    None,
    Model,
    Keyword,
    Advisory,
}

/// Human-auditable justification for a label. Downstream logic decides on
/// `label`/`confidence` only; evidence is carried for audit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evidence {
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub matched_by: MatchSource,
}

/// A classification normalized to one shape regardless of which stage
/// produced it. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub label: DepartmentCategory,
    pub department_id: i64,
    pub confidence: f64,
    pub evidence: Evidence,
}

impl ClassificationResult {
    pub fn new(label: DepartmentCategory, confidence: f64, evidence: Evidence) -> Self {
        Self {
            label,
            department_id: label.department_id(),
            confidence,
            evidence,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutedTo {
    AutoRoute,
    HumanTriage,
    AdvisoryPending,
}

impl std::fmt::Display for RoutedTo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoutedTo::AutoRoute => write!(f, "auto_route"),
            RoutedTo::HumanTriage => write!(f, "human_triage"),
            RoutedTo::AdvisoryPending => write!(f, "advisory_pending"),
        }
    }
}

/// Terminal routing verdict. `result` is present except when every stage
/// failed to produce a usable label; `advisory_pending` with no result is
/// the documented "try again later" outcome, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteDecision {
    pub routed_to: RoutedTo,
    pub reason: String,
    pub result: Option<ClassificationResult>,
}
