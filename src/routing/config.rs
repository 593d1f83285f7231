use serde::{Deserialize, Serialize};

use super::errors::EngineError;

/// Deployed default. Deliberately conservative so that nearly every
/// submission escalates past the automated stage while the model is young.
fn default_confidence_threshold() -> f64 {
    0.99
}

fn default_max_input_chars() -> usize {
    8192
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f64,
    #[serde(default = "default_max_input_chars")]
    pub max_input_chars: usize,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: default_confidence_threshold(),
            max_input_chars: default_max_input_chars(),
        }
    }
}

impl RoutingConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(EngineError::InvalidConfig(format!(
                "confidence threshold {} must be between 0.0 and 1.0",
                self.confidence_threshold
            )));
        }
        if self.max_input_chars == 0 {
            return Err(EngineError::InvalidConfig(
                "max input length must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
