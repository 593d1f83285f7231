use super::types::{ClassificationResult, RouteDecision};

/// Observer for finished decisions. Injected at construction; the pipeline
/// never depends on a recording having happened.
pub trait DecisionLog: Send + Sync {
    fn record_classify(&self, text: &str, result: &ClassificationResult);

    fn record_route(&self, text: &str, decision: &RouteDecision);
}

/// Default log that records nothing.
#[derive(Debug, Default)]
pub struct NoopDecisionLog;

impl DecisionLog for NoopDecisionLog {
    fn record_classify(&self, _text: &str, _result: &ClassificationResult) {}

    fn record_route(&self, _text: &str, _decision: &RouteDecision) {}
}

/// Log that emits one structured event per decision.
#[derive(Debug, Default)]
pub struct TracingDecisionLog;

impl DecisionLog for TracingDecisionLog {
    fn record_classify(&self, text: &str, result: &ClassificationResult) {
        tracing::info!(
            chars = text.chars().count(),
            label = %result.label,
            department_id = result.department_id,
            confidence = result.confidence,
            "classified"
        );
    }

    fn record_route(&self, text: &str, decision: &RouteDecision) {
        tracing::info!(
            chars = text.chars().count(),
            routed_to = %decision.routed_to,
            reason = %decision.reason,
            label = decision.result.as_ref().map(|r| r.label.as_label()),
            "routed"
        );
    }
}
