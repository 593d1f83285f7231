use async_trait::async_trait;

use crate::categories::DepartmentCategory;

pub mod gemini;

#[cfg(test)]
mod gemini_tests;

pub use gemini::{GeminiAdvisor, GeminiConfig};

/// Result of one advisory consultation. `reason` is always populated, on
/// success (`gemini_ok`) and on every failure mode, so callers can surface
/// it without separate logging plumbing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvisoryOutcome {
    pub label: Option<DepartmentCategory>,
    pub reason: String,
}

impl AdvisoryOutcome {
    pub fn success(label: DepartmentCategory, reason: impl Into<String>) -> Self {
        Self {
            label: Some(label),
            reason: reason.into(),
        }
    }

    pub fn failure(reason: impl Into<String>) -> Self {
        Self {
            label: None,
            reason: reason.into(),
        }
    }
}

/// Last-resort advisory classifier. Implementations never propagate a
/// fault; every failure is a typed outcome.
#[async_trait]
pub trait Advisor: Send + Sync {
    async fn advise(&self, text: &str) -> AdvisoryOutcome;

    fn name(&self) -> &str;
}

/// No-op advisor selected at startup when the advisory service is not
/// configured. Always fails with its fixed reason.
pub struct DisabledAdvisor {
    reason: String,
}

impl DisabledAdvisor {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    /// Startup selection when no API key is configured.
    pub fn no_key() -> Self {
        Self::new("no_llm_key")
    }
}

impl Default for DisabledAdvisor {
    fn default() -> Self {
        Self::new("llm_disabled")
    }
}

#[async_trait]
impl Advisor for DisabledAdvisor {
    async fn advise(&self, _text: &str) -> AdvisoryOutcome {
        AdvisoryOutcome::failure(self.reason.clone())
    }

    fn name(&self) -> &str {
        "disabled"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_advisor_reports_fixed_reason() {
        let advisor = DisabledAdvisor::no_key();
        let outcome = advisor.advise("와이파이가 안 됩니다").await;
        assert_eq!(outcome.label, None);
        assert_eq!(outcome.reason, "no_llm_key");
    }

    #[tokio::test]
    async fn test_default_disabled_advisor() {
        let outcome = DisabledAdvisor::default().advise("텍스트").await;
        assert_eq!(outcome.reason, "llm_disabled");
    }
}
