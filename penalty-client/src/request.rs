//! Wire body of a penalty enforcement call.

use serde::{Deserialize, Serialize};
use sla_core::{EvaluationResult, PenaltyRule};

/// Body of `POST /rpc/agreements/enforce-penalty-rules`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnforcePenaltyRulesRequest {
    pub evaluation_id: String,
    pub reservation_id: String,
    pub agreement_id: String,
    pub penalty_rules: Vec<PenaltyRule>,
    pub reason: String,
}

impl EnforcePenaltyRulesRequest {
    /// Request without a verdict; the service applies the agreement's own rules.
    pub fn new(
        evaluation_id: impl Into<String>,
        reservation_id: impl Into<String>,
        agreement_id: impl Into<String>,
    ) -> Self {
        Self {
            evaluation_id: evaluation_id.into(),
            reservation_id: reservation_id.into(),
            agreement_id: agreement_id.into(),
            penalty_rules: Vec::new(),
            reason: String::new(),
        }
    }

    /// Attach the penalty and reason of a verdict.
    pub fn with_verdict(mut self, verdict: &EvaluationResult) -> Self {
        self.penalty_rules = verdict.penalty_rule.iter().cloned().collect();
        self.reason = verdict.failure_reason.clone().unwrap_or_default();
        self
    }
}
