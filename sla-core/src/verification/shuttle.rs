//! Airport shuttle punctuality.

use chrono::{DateTime, Utc};

use super::{minutes_between, VerificationError};
use crate::catalog::codes;
use crate::item::{Evidence, ShuttleStatus, ShuttleTerms, ShuttleTrip};
use crate::types::{Agreement, EvaluationResult, PenaltyTier};

const DRIVER_NO_SHOW: &str = "driver did not come";
const DRIVER_LATE: &str = "the driver came to pick up the passenger late";

pub(super) fn verify(
    agreement: &Agreement,
    terms: &ShuttleTerms,
    evidence: &Evidence,
) -> Result<EvaluationResult, VerificationError> {
    let Evidence::AirportShuttle(trip) = evidence else {
        return Err(VerificationError::CodeMismatch {
            expected: codes::SERVICE_AIRPORT_SHUTTLE.to_string(),
            actual: evidence.code().to_string(),
        });
    };

    if !trip.status.is_terminal() {
        return Err(VerificationError::InvalidState(format!(
            "airport shuttle is {:?}",
            trip.status
        )));
    }

    match trip.status {
        // The customer cancelled; not a provider failure
        ShuttleStatus::Canceled => Ok(EvaluationResult::satisfied()),
        ShuttleStatus::NotServed => late(agreement, PenaltyTier::Standard, DRIVER_NO_SHOW),
        ShuttleStatus::WaitingTimeExceeded => {
            let pick_up = required(trip.pick_up_time, "pickUpTime")?;
            let notified = required(
                trip.driver_notify_customer_do_not_show_up_at,
                "driverNotifyCustomerDoNotShowUpAt",
            )?;
            let arrived = required(trip.driver_arrive_at, "driverArriveAt")?;

            let driver_waited_long_enough =
                minutes_between(notified, pick_up) > f64::from(terms.driver_max_wait_time);
            let driver_was_on_time =
                minutes_between(arrived, pick_up) <= f64::from(terms.customer_short_wait_time);

            if driver_waited_long_enough && driver_was_on_time {
                Ok(EvaluationResult::satisfied())
            } else {
                late(agreement, PenaltyTier::Standard, DRIVER_LATE)
            }
        }
        _ => {
            let delay = delay_minutes(trip)?;
            if delay <= f64::from(terms.customer_short_wait_time) {
                Ok(EvaluationResult::satisfied())
            } else if delay <= f64::from(terms.customer_long_wait_time) {
                late(agreement, PenaltyTier::Elevated, DRIVER_LATE)
            } else {
                late(agreement, PenaltyTier::Maximum, DRIVER_LATE)
            }
        }
    }
}

fn delay_minutes(trip: &ShuttleTrip) -> Result<f64, VerificationError> {
    let pick_up = required(trip.pick_up_time, "pickUpTime")?;
    let arrived = required(trip.driver_arrive_at, "driverArriveAt")?;
    Ok(minutes_between(arrived, pick_up))
}

fn required(
    value: Option<DateTime<Utc>>,
    field: &str,
) -> Result<DateTime<Utc>, VerificationError> {
    value.ok_or_else(|| {
        VerificationError::InvalidEvidence(format!("airport shuttle evidence is missing {field}"))
    })
}

fn late(
    agreement: &Agreement,
    tier: PenaltyTier,
    reason: &str,
) -> Result<EvaluationResult, VerificationError> {
    Ok(EvaluationResult::unsatisfied(
        agreement.penalty_for(tier)?,
        Some(reason.to_string()),
    ))
}
