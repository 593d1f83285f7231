use std::sync::Arc;

use anyhow::{Context, Result};

use super::config::RoutingConfig;
use super::errors::{EngineError, EngineResult};
use super::log::{DecisionLog, NoopDecisionLog};
use super::types::{ClassificationResult, Evidence, MatchSource, RouteDecision, RoutedTo};
use crate::advisory::{Advisor, DisabledAdvisor, GeminiAdvisor, GeminiConfig};
#[cfg(feature = "redis-cache")]
use crate::cache::RedisStore;
use crate::cache::{CacheStore, MemoryStore, ResultCache};
use crate::config::AppConfig;
use crate::rules::RuleEngine;
use crate::scorer::{LazyScorer, TextScorer};

/// Confidence attached to a rule-derived fallback result.
const RULE_FALLBACK_CONFIDENCE: f64 = 0.51;
/// Confidence attached to an advisory-derived fallback result.
const ADVISORY_CONFIDENCE: f64 = 0.60;

/// Orchestrates scorer, keyword rules, advisory service and result cache
/// into one decision: check cache → score → threshold check → rule
/// fallback → advisory fallback → final route.
pub struct RoutingEngine {
    scorer: Arc<dyn TextScorer>,
    rules: RuleEngine,
    advisor: Arc<dyn Advisor>,
    cache: ResultCache,
    log: Arc<dyn DecisionLog>,
    config: RoutingConfig,
}

impl RoutingEngine {
    pub fn new(
        scorer: Arc<dyn TextScorer>,
        rules: RuleEngine,
        advisor: Arc<dyn Advisor>,
        cache: ResultCache,
        config: RoutingConfig,
    ) -> EngineResult<Self> {
        config.validate()?;
        Ok(Self {
            scorer,
            rules,
            advisor,
            cache,
            log: Arc::new(NoopDecisionLog),
            config,
        })
    }

    pub fn with_decision_log(mut self, log: Arc<dyn DecisionLog>) -> Self {
        self.log = log;
        self
    }

    /// Assembles the deployed pipeline from configuration: lazy model
    /// handle, the default rule table, the advisory client when an API key
    /// is present, and the configured cache store.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let scorer: Arc<dyn TextScorer> = Arc::new(LazyScorer::new(config.model_dir.clone()));

        let advisor: Arc<dyn Advisor> = match config.advisory.api_key.as_deref() {
            Some(key) if !key.is_empty() => Arc::new(
                GeminiAdvisor::new(GeminiConfig {
                    api_key: key.to_string(),
                    base_url: config.advisory.base_url.clone(),
                    ..GeminiConfig::default()
                })
                .context("Failed to build advisory client")?,
            ),
            _ => Arc::new(DisabledAdvisor::no_key()),
        };

        let store: Arc<dyn CacheStore> = match config.cache.redis_url.as_deref() {
            #[cfg(feature = "redis-cache")]
            Some(url) => {
                Arc::new(RedisStore::connect(url).context("Failed to open cache store")?)
            }
            #[cfg(not(feature = "redis-cache"))]
            Some(_) => {
                tracing::warn!("built without redis-cache; falling back to in-process cache");
                Arc::new(MemoryStore::new())
            }
            None => Arc::new(MemoryStore::new()),
        };
        let cache = ResultCache::new(store, config.cache.ttl());

        let engine = Self::new(
            scorer,
            RuleEngine::new(),
            advisor,
            cache,
            config.routing.clone(),
        )?;
        Ok(engine)
    }

    fn check_length(&self, text: &str) -> EngineResult<()> {
        let len = text.chars().count();
        if len > self.config.max_input_chars {
            return Err(EngineError::InputTooLarge {
                len,
                max: self.config.max_input_chars,
            });
        }
        Ok(())
    }

    /// Cheap classification: cache hit short-circuits, a miss scores the
    /// text and writes back. Fails only when the input is over the cap or
    /// the model artifacts are unavailable.
    pub async fn classify(&self, text: &str) -> EngineResult<ClassificationResult> {
        let text = text.trim();
        self.check_length(text)?;

        if let Some(cached) = self.cache.get(text).await {
            tracing::debug!(label = %cached.label, "cache hit");
            return Ok(cached);
        }

        let (label, confidence) = self.scorer.score(text)?;
        let result = ClassificationResult::new(
            label,
            confidence,
            Evidence {
                keywords: self.rules.evidence(text, label),
                matched_by: MatchSource::Model,
            },
        );

        self.cache.put(text, &result).await;
        self.log.record_classify(text, &result);
        Ok(result)
    }

    /// Full escalation policy. Always recomputes (no cache participation)
    /// and always returns a decision; the unresolved terminal state is
    /// `advisory_pending`, not an error.
    pub async fn route(&self, text: &str, force_advisory: bool) -> EngineResult<RouteDecision> {
        let text = text.trim();
        self.check_length(text)?;

        let (label, confidence) = self.scorer.score(text)?;

        if confidence >= self.config.confidence_threshold && !force_advisory {
            // Even confident results go to a person for now; automated
            // dispatch is a future extension point.
            let result = ClassificationResult::new(
                label,
                confidence,
                Evidence {
                    keywords: self.rules.evidence(text, label),
                    matched_by: MatchSource::Model,
                },
            );
            return Ok(self.finish(
                text,
                RouteDecision {
                    routed_to: RoutedTo::HumanTriage,
                    reason: "alpha stage manual check".to_string(),
                    result: Some(result),
                },
            ));
        }

        if !force_advisory {
            if let Some(rule_label) = self.rules.apply(text) {
                if rule_label != label {
                    let result = ClassificationResult::new(
                        rule_label,
                        RULE_FALLBACK_CONFIDENCE,
                        Evidence {
                            keywords: self.rules.evidence(text, rule_label),
                            matched_by: MatchSource::Keyword,
                        },
                    );
                    return Ok(self.finish(
                        text,
                        RouteDecision {
                            routed_to: RoutedTo::HumanTriage,
                            reason: format!("low confidence {confidence:.2}"),
                            result: Some(result),
                        },
                    ));
                }
            }
        }

        let outcome = self.advisor.advise(text).await;
        tracing::debug!(advisor = self.advisor.name(), reason = %outcome.reason, "advisory outcome");

        let decision = match outcome.label {
            Some(advisory_label) => RouteDecision {
                routed_to: RoutedTo::HumanTriage,
                reason: format!("llm:{}", outcome.reason),
                result: Some(ClassificationResult::new(
                    advisory_label,
                    ADVISORY_CONFIDENCE,
                    Evidence {
                        keywords: Vec::new(),
                        matched_by: MatchSource::Advisory,
                    },
                )),
            },
            None => RouteDecision {
                routed_to: RoutedTo::AdvisoryPending,
                reason: format!("llm:{}", outcome.reason),
                result: None,
            },
        };
        Ok(self.finish(text, decision))
    }

    fn finish(&self, text: &str, decision: RouteDecision) -> RouteDecision {
        self.log.record_route(text, &decision);
        decision
    }
}
