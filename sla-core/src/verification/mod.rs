//! Verification of submitted evidence against an agreement.
//!
//! [`VerificationEngine::verify`] dispatches on the agreement category and its
//! first item. Each evaluator returns an [`EvaluationResult`]; none of them
//! touch counters or storage.

mod bed;
mod matcher;
mod room;
mod sauna;
mod shuttle;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::catalog::Catalog;
use crate::item::{AgreementItem, Evidence};
use crate::types::{Agreement, Category, EvaluationResult, PenaltyTier};

/// Reason given when an evaluation arrives without evidence.
pub const NO_DATA_REASON: &str = "no data to evaluate";

/// Errors raised while verifying an agreement.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum VerificationError {
    /// Category has no evaluator
    #[error("agreement category {0} is not supported yet")]
    UnsupportedCategory(Category),

    /// Item code has no evaluator within a supported category
    #[error("agreement item code {code} in category {category} is not supported yet")]
    UnsupportedItemCode { code: String, category: Category },

    /// Evidence was submitted for a different item than the agreement covers
    #[error("evaluation data code {actual} does not match agreement item code {expected}")]
    CodeMismatch { expected: String, actual: String },

    /// The agreement has no penalty rule for the requested tier
    #[error("agreement {agreement_id} has no penalty rule for tier {tier} ({available} defined)")]
    MissingPenaltyTier {
        agreement_id: String,
        tier: PenaltyTier,
        available: usize,
    },

    /// Evidence describes a state that cannot be judged yet
    #[error("can not verify agreement in state: {0}")]
    InvalidState(String),

    /// Agreement has no terms to evaluate against
    #[error("agreement {0} has no items")]
    EmptyAgreement(String),

    /// Evidence is structurally valid but lacks a value the evaluator needs
    #[error("invalid evidence: {0}")]
    InvalidEvidence(String),
}

/// Dispatches evidence to the evaluator for an agreement.
#[derive(Debug, Clone, Default)]
pub struct VerificationEngine {
    catalog: Catalog,
}

impl VerificationEngine {
    /// Create an engine over the given lookup tables.
    pub fn new(catalog: Catalog) -> Self {
        Self { catalog }
    }

    /// Lookup tables in use.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Verify evidence against an agreement.
    pub fn verify(
        &self,
        agreement: &Agreement,
        evidence: &[Evidence],
    ) -> Result<EvaluationResult, VerificationError> {
        if !agreement.category.is_supported() {
            return Err(VerificationError::UnsupportedCategory(
                agreement.category.clone(),
            ));
        }

        let Some(first) = evidence.first() else {
            return Ok(EvaluationResult::unsatisfied(
                agreement.penalty_for(PenaltyTier::Standard)?,
                Some(NO_DATA_REASON.to_string()),
            ));
        };

        debug!(
            agreement_id = %agreement.agreement_id,
            category = %agreement.category,
            evidence = evidence.len(),
            "Verifying agreement"
        );

        match (&agreement.category, agreement.items.first()) {
            (Category::Service, Some(AgreementItem::AirportShuttle(terms))) => {
                shuttle::verify(agreement, terms, first)
            }
            (Category::Service, Some(AgreementItem::Sauna(terms))) => {
                sauna::verify(agreement, terms, first)
            }
            (Category::RoomDesign, Some(AgreementItem::RoomSize { value })) => {
                room::verify(agreement, *value, first)
            }
            (Category::Service | Category::RoomDesign, Some(other)) => {
                Err(VerificationError::UnsupportedItemCode {
                    code: other.code().to_string(),
                    category: agreement.category.clone(),
                })
            }
            (Category::Service | Category::RoomDesign, None) => Err(
                VerificationError::EmptyAgreement(agreement.agreement_id.clone()),
            ),
            (Category::Bed, _) => bed::verify(&self.catalog, agreement, evidence),
            _ => matcher::verify(&self.catalog, agreement, evidence),
        }
    }
}

/// Minutes elapsed from `earlier` to `later`, fractional and signed.
pub(crate) fn minutes_between(later: DateTime<Utc>, earlier: DateTime<Utc>) -> f64 {
    (later - earlier).num_milliseconds() as f64 / 60_000.0
}
