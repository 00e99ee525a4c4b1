//! Sauna availability.
//!
//! A failure only counts when it happens at least the agreed number of minutes
//! after the previous failure. The anchor moves to every failure, counted or
//! not, so a burst of failures counts at most once.

use super::{minutes_between, VerificationError};
use crate::catalog::codes;
use crate::item::{Evidence, SaunaStatus, SaunaTerms};
use crate::types::{Agreement, EvaluationResult, PenaltyTier};

pub(super) fn verify(
    agreement: &Agreement,
    terms: &SaunaTerms,
    evidence: &Evidence,
) -> Result<EvaluationResult, VerificationError> {
    let Evidence::Sauna(requests) = evidence else {
        return Err(VerificationError::CodeMismatch {
            expected: codes::SERVICE_SAUNA.to_string(),
            actual: evidence.code().to_string(),
        });
    };

    let mut requests = requests.clone();
    requests.sort_by_key(|r| r.request_at);

    let min_gap = f64::from(terms.min_time_between_2_failures);
    let mut previous_failure = None;
    let mut failures = 0u32;

    for request in &requests {
        if request.status == SaunaStatus::Fail {
            if let Some(previous) = previous_failure {
                if minutes_between(request.request_at, previous) >= min_gap {
                    failures += 1;
                }
            }
            previous_failure = Some(request.request_at);
        }

        if failures >= terms.max_failures {
            return Ok(EvaluationResult::unsatisfied(
                agreement.penalty_for(PenaltyTier::Standard)?,
                Some(format!("sauna failed {failures} time(s)")),
            ));
        }
    }

    Ok(EvaluationResult::satisfied())
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::*;
    use super::*;
    use crate::item::{AgreementItem, SaunaRequest};
    use crate::types::{Category, PenaltyRule};

    fn check(max_failures: u32, min_gap: u32, requests: &[(&str, SaunaStatus)]) -> EvaluationResult {
        let terms = SaunaTerms {
            max_failures,
            min_time_between_2_failures: min_gap,
        };
        let agreement = agreement(Category::Service, vec![AgreementItem::Sauna(terms)]);
        let evidence = Evidence::Sauna(
            requests
                .iter()
                .map(|(time, status)| SaunaRequest {
                    request_at: at(time),
                    status: *status,
                })
                .collect(),
        );

        verify(&agreement, &terms, &evidence).unwrap()
    }

    #[test]
    fn test_failures_too_close_do_not_count() {
        let result = check(
            1,
            10,
            &[("10:00", SaunaStatus::Fail), ("10:05", SaunaStatus::Fail)],
        );
        assert!(result.satisfied);
    }

    #[test]
    fn test_spaced_failures_count() {
        let result = check(
            1,
            10,
            &[("10:00", SaunaStatus::Fail), ("10:15", SaunaStatus::Fail)],
        );
        assert!(!result.satisfied);
        assert_eq!(result.penalty_rule, Some(PenaltyRule::discount(10.0)));
    }

    #[test]
    fn test_requests_are_sorted_before_scanning() {
        let result = check(
            1,
            10,
            &[
                ("10:15", SaunaStatus::Fail),
                ("10:07", SaunaStatus::Success),
                ("10:00", SaunaStatus::Fail),
            ],
        );
        assert!(!result.satisfied);
    }

    #[test]
    fn test_anchor_moves_on_every_failure() {
        // 10:00 -> 10:06 -> 10:12: each gap is 6 minutes, none reaches 10
        let result = check(
            1,
            10,
            &[
                ("10:00", SaunaStatus::Fail),
                ("10:06", SaunaStatus::Fail),
                ("10:12", SaunaStatus::Fail),
            ],
        );
        assert!(result.satisfied);
    }

    #[test]
    fn test_zero_max_failures_fails_on_first_request() {
        let result = check(0, 10, &[("10:00", SaunaStatus::Success)]);
        assert!(!result.satisfied);

        let result = check(0, 10, &[]);
        assert!(result.satisfied);
    }

    #[test]
    fn test_without_penalty_rules() {
        let terms = SaunaTerms {
            max_failures: 1,
            min_time_between_2_failures: 0,
        };
        let agreement = Agreement::new(
            "sauna",
            Category::Service,
            vec![AgreementItem::Sauna(terms)],
            false,
            vec![],
        );
        let evidence = Evidence::Sauna(vec![
            SaunaRequest {
                request_at: at("10:00"),
                status: SaunaStatus::Fail,
            },
            SaunaRequest {
                request_at: at("10:01"),
                status: SaunaStatus::Fail,
            },
        ]);

        let result = verify(&agreement, &terms, &evidence).unwrap();
        assert!(!result.satisfied);
        assert!(result.penalty_rule.is_none());
    }
}
