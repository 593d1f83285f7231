use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Closed set of report categories. Every category maps to exactly one
/// department id; labels outside this set are rejected, never coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DepartmentCategory {
    #[serde(rename = "시설")]
    Facility,
    #[serde(rename = "환경")]
    Environment,
    #[serde(rename = "전산")]
    It,
    #[serde(rename = "기타")]
    Other,
}

#[derive(Debug, Clone, Error)]
pub enum CategoryError {
    #[error("unknown category label: {label}")]
    UnknownLabel { label: String },
}

impl DepartmentCategory {
    pub const ALL: [DepartmentCategory; 4] = [
        DepartmentCategory::Facility,
        DepartmentCategory::Environment,
        DepartmentCategory::It,
        DepartmentCategory::Other,
    ];

    /// Wire label as used by the rule table, the cache payload and the
    /// advisory prompt.
    pub fn as_label(&self) -> &'static str {
        match self {
            DepartmentCategory::Facility => "시설",
            DepartmentCategory::Environment => "환경",
            DepartmentCategory::It => "전산",
            DepartmentCategory::Other => "기타",
        }
    }

    pub fn from_label(label: &str) -> Result<Self, CategoryError> {
        match label {
            "시설" => Ok(DepartmentCategory::Facility),
            "환경" => Ok(DepartmentCategory::Environment),
            "전산" => Ok(DepartmentCategory::It),
            "기타" => Ok(DepartmentCategory::Other),
            _ => Err(CategoryError::UnknownLabel {
                label: label.to_string(),
            }),
        }
    }

    pub fn department_id(&self) -> i64 {
        match self {
            DepartmentCategory::Facility => 1,
            DepartmentCategory::Environment => 2,
            DepartmentCategory::It => 3,
            DepartmentCategory::Other => 4,
        }
    }
}

impl std::fmt::Display for DepartmentCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_label())
    }
}

impl std::str::FromStr for DepartmentCategory {
    type Err = CategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s)
    }
}
