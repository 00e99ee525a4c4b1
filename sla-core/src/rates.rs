//! Incremental satisfaction and rule-abiding rates.
//!
//! An agreement rate is `(total - failures) / total`, and 1.0 while nothing
//! has been recorded. A service is only as reliable as its weakest agreement,
//! so its rollup is the minimum agreement rate (1.0 with no agreements).

use crate::types::{Agreement, Service};

/// Which of the two tracked rates an update touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateKind {
    Satisfaction,
    RuleAbiding,
}

/// Share of non-failed events, 1.0 when there are none.
pub fn rate(total: u64, failures: u64) -> f64 {
    if total == 0 {
        return 1.0;
    }
    total.saturating_sub(failures) as f64 / total as f64
}

impl Agreement {
    /// Fold one satisfaction verdict into the counters.
    pub fn record_feedback(&mut self, satisfied: bool, at: &str) {
        self.total_feedbacks += 1;
        if !satisfied {
            self.total_unsatisfied += 1;
        }
        self.satisfaction_rate = rate(self.total_feedbacks, self.total_unsatisfied);
        self.last_evaluation_at = at.to_string();
    }

    /// Fold one rule violation into the counters.
    pub fn record_rule_violation(&mut self, compensated: bool, at: &str) {
        self.total_rule_violations += 1;
        if !compensated {
            self.total_rule_violation_without_compensations += 1;
        }
        self.rule_abiding_rate = rate(
            self.total_rule_violations,
            self.total_rule_violation_without_compensations,
        );
        self.last_evaluation_at = at.to_string();
    }

    /// Current value of a rate.
    pub fn rate(&self, kind: RateKind) -> f64 {
        match kind {
            RateKind::Satisfaction => self.satisfaction_rate,
            RateKind::RuleAbiding => self.rule_abiding_rate,
        }
    }
}

impl Service {
    /// Minimum agreement rate of the given kind, 1.0 with no agreements.
    pub fn weakest(&self, kind: RateKind) -> f64 {
        self.agreements
            .iter()
            .map(|a| a.rate(kind))
            .reduce(f64::min)
            .unwrap_or(1.0)
    }

    /// Recompute both rollup rates from the agreements.
    pub fn refresh_rollup(&mut self) {
        self.satisfaction_rate = self.weakest(RateKind::Satisfaction);
        self.rule_abiding_rate = self.weakest(RateKind::RuleAbiding);
    }

    /// Record a satisfaction verdict for one agreement.
    ///
    /// Returns `None`, leaving the service untouched, if the agreement is unknown.
    pub fn record_satisfaction(
        &mut self,
        agreement_id: &str,
        satisfied: bool,
        at: &str,
    ) -> Option<&Agreement> {
        self.agreement_mut(agreement_id)?.record_feedback(satisfied, at);
        self.stamp(at);
        self.agreement(agreement_id)
    }

    /// Record a rule violation for one agreement.
    ///
    /// Returns `None`, leaving the service untouched, if the agreement is unknown.
    pub fn record_rule_abiding(
        &mut self,
        agreement_id: &str,
        compensated: bool,
        at: &str,
    ) -> Option<&Agreement> {
        self.agreement_mut(agreement_id)?
            .record_rule_violation(compensated, at);
        self.stamp(at);
        self.agreement(agreement_id)
    }

    fn stamp(&mut self, at: &str) {
        self.refresh_rollup();
        self.number_of_evaluations += 1;
        self.last_evaluation_at = at.to_string();
    }
}
