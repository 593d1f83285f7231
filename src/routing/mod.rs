pub mod config;
pub mod engine;
pub mod errors;
pub mod log;
pub mod types;

pub use config::RoutingConfig;
pub use engine::RoutingEngine;
pub use errors::{EngineError, EngineResult};
pub use log::{DecisionLog, NoopDecisionLog, TracingDecisionLog};
pub use types::{ClassificationResult, Evidence, MatchSource, RouteDecision, RoutedTo};
