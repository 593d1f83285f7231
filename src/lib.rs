pub mod advisory;
pub mod cache;
pub mod categories;
pub mod config;
pub mod routing;
pub mod rules;
pub mod scorer;

pub use advisory::{Advisor, AdvisoryOutcome, DisabledAdvisor, GeminiAdvisor, GeminiConfig};
#[cfg(feature = "redis-cache")]
pub use cache::RedisStore;
pub use cache::{CacheError, CacheStore, MemoryStore, NoopStore, ResultCache};
pub use categories::{CategoryError, DepartmentCategory};
pub use config::{AdvisoryConfig, AppConfig, CacheConfig, ConfigError};
pub use routing::{
    ClassificationResult, DecisionLog, EngineError, Evidence, MatchSource, NoopDecisionLog,
    RouteDecision, RoutedTo, RoutingConfig, RoutingEngine, TracingDecisionLog,
};
pub use rules::RuleEngine;
pub use scorer::{LazyScorer, LinearScorer, ModelMetrics, ScorerError, TextScorer};
