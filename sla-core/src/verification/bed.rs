//! Bed arrangement: both the number of beds and their weighted points must
//! meet the agreement.

use super::VerificationError;
use crate::catalog::Catalog;
use crate::item::Evidence;
use crate::types::{Agreement, EvaluationResult, PenaltyTier};

pub(super) fn verify(
    catalog: &Catalog,
    agreement: &Agreement,
    evidence: &[Evidence],
) -> Result<EvaluationResult, VerificationError> {
    let (required_beds, required_points) = agreement
        .items
        .iter()
        .fold((0u64, 0u64), |(beds, points), item| {
            (
                beds + u64::from(item.quantity()),
                points + u64::from(catalog.bed_points(item.code())),
            )
        });

    let (observed_beds, observed_points) =
        evidence.iter().fold((0u64, 0u64), |(beds, points), item| {
            (
                beds + u64::from(item.quantity()),
                points + u64::from(catalog.bed_points(item.code())),
            )
        });

    if observed_beds >= required_beds && observed_points >= required_points {
        return Ok(EvaluationResult::satisfied());
    }

    Ok(EvaluationResult::unsatisfied(
        agreement.penalty_for(PenaltyTier::Standard)?,
        Some(format!(
            "beds provided {observed_beds} ({observed_points} points), agreed {required_beds} ({required_points} points)"
        )),
    ))
}
