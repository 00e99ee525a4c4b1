//! Default matcher for views, interior, outdoor and similar item lists.
//!
//! Every required item needs one matching piece of evidence. Views match on
//! ordinal level (a better view satisfies a worse one); everything else
//! matches on code and quantity.

use super::VerificationError;
use crate::catalog::Catalog;
use crate::item::{AgreementItem, Evidence};
use crate::types::{Agreement, Category, EvaluationResult, PenaltyTier};

pub(super) fn verify(
    catalog: &Catalog,
    agreement: &Agreement,
    evidence: &[Evidence],
) -> Result<EvaluationResult, VerificationError> {
    let unmatched = agreement.items.iter().find(|required| {
        !evidence
            .iter()
            .any(|observed| matches(catalog, &agreement.category, required, observed))
    });

    match unmatched {
        None => Ok(EvaluationResult::satisfied()),
        Some(required) => Ok(EvaluationResult::unsatisfied(
            agreement.penalty_for(PenaltyTier::Standard)?,
            Some(format!("required item {} was not provided", required.code())),
        )),
    }
}

fn matches(
    catalog: &Catalog,
    category: &Category,
    required: &AgreementItem,
    observed: &Evidence,
) -> bool {
    if *category == Category::View {
        return catalog.view_level(observed.code()) >= catalog.view_level(required.code());
    }

    observed.code() == required.code()
        && (required.quantity() == 0 || observed.quantity() >= required.quantity())
}
