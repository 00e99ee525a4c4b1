//! Room size.

use super::VerificationError;
use crate::catalog::codes;
use crate::item::Evidence;
use crate::types::{Agreement, EvaluationResult, PenaltyTier};

pub(super) fn verify(
    agreement: &Agreement,
    required: f64,
    evidence: &Evidence,
) -> Result<EvaluationResult, VerificationError> {
    let Evidence::RoomSize { value } = evidence else {
        return Err(VerificationError::CodeMismatch {
            expected: codes::ROOM_DESIGN_SIZE.to_string(),
            actual: evidence.code().to_string(),
        });
    };

    if *value >= required {
        return Ok(EvaluationResult::satisfied());
    }

    Ok(EvaluationResult::unsatisfied(
        agreement.penalty_for(PenaltyTier::Standard)?,
        Some(format!("room size {value} is below the agreed {required}")),
    ))
}
