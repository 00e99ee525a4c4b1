//! Core types for services, agreements and evaluation verdicts.
//!
//! Field names serialize in camelCase; these records are stored as JSON in the
//! world state and must stay readable by every validator.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::item::AgreementItem;
use crate::verification::VerificationError;

/// Document type tag stored on every service record.
pub const SERVICE_DOC_TYPE: &str = "Service";

/// Agreement category.
///
/// Unknown category strings are kept verbatim so an agreement can still be
/// stored; verification rejects them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    View,
    Service,
    Interior,
    RoomDesign,
    Outdoor,
    Bed,
    /// Legacy category, accepted on write but never verified
    Facility,
    Other(String),
}

impl Category {
    /// Get string representation
    pub fn as_str(&self) -> &str {
        match self {
            Self::View => "view",
            Self::Service => "service",
            Self::Interior => "interior",
            Self::RoomDesign => "room_design",
            Self::Outdoor => "outdoor",
            Self::Bed => "bed",
            Self::Facility => "facility",
            Self::Other(other) => other,
        }
    }

    /// Whether the verification engine has evaluators for this category.
    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Facility | Self::Other(_))
    }
}

impl From<String> for Category {
    fn from(value: String) -> Self {
        match value.as_str() {
            "view" => Self::View,
            "service" => Self::Service,
            "interior" => Self::Interior,
            "room_design" => Self::RoomDesign,
            "outdoor" => Self::Outdoor,
            "bed" => Self::Bed,
            "facility" => Self::Facility,
            _ => Self::Other(value),
        }
    }
}

impl From<&str> for Category {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<Category> for String {
    fn from(value: Category) -> Self {
        match value {
            Category::Other(other) => other,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of compensation a penalty rule grants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PenaltyRuleType {
    Discount,
    UpgradeLevel,
}

/// Severity slot of a penalty rule.
///
/// Evaluators ask for a tier; the agreement resolves it to one of its rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum PenaltyTier {
    /// Default tier for any failure
    Standard = 0,
    /// Moderate breach (e.g. a late but bounded shuttle)
    Elevated = 1,
    /// Severe breach
    Maximum = 2,
}

impl PenaltyTier {
    /// Position of this tier in a legacy, positional rule list.
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl TryFrom<u8> for PenaltyTier {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Standard),
            1 => Ok(Self::Elevated),
            2 => Ok(Self::Maximum),
            other => Err(format!("penalty tier {other} is out of range (0-2)")),
        }
    }
}

impl From<PenaltyTier> for u8 {
    fn from(value: PenaltyTier) -> Self {
        value as u8
    }
}

impl fmt::Display for PenaltyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

/// A penalty the provider grants when an agreement is breached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PenaltyRule {
    #[serde(rename = "type")]
    pub rule_type: PenaltyRuleType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_percent: Option<f64>,
    /// Explicit tier; rules without one are resolved by position
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier: Option<PenaltyTier>,
}

impl PenaltyRule {
    /// A discount rule.
    pub fn discount(percent: f64) -> Self {
        Self {
            rule_type: PenaltyRuleType::Discount,
            discount_percent: Some(percent),
            tier: None,
        }
    }

    /// A room upgrade rule.
    pub fn upgrade_level() -> Self {
        Self {
            rule_type: PenaltyRuleType::UpgradeLevel,
            discount_percent: None,
            tier: None,
        }
    }

    /// Pin this rule to a tier.
    pub fn with_tier(mut self, tier: PenaltyTier) -> Self {
        self.tier = Some(tier);
        self
    }
}

/// One agreement of a service together with its running counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agreement {
    pub agreement_id: String,
    pub category: Category,
    pub items: Vec<AgreementItem>,

    pub total_feedbacks: u64,
    pub total_unsatisfied: u64,
    pub total_rule_violations: u64,
    pub total_rule_violation_without_compensations: u64,

    pub has_penalty_rule: bool,
    #[serde(default)]
    pub penalty_rules: Vec<PenaltyRule>,

    #[serde(default)]
    pub last_evaluation_at: String,

    pub rule_abiding_rate: f64,
    pub satisfaction_rate: f64,
}

impl Agreement {
    /// Create an agreement with zeroed counters and perfect rates.
    pub fn new(
        agreement_id: impl Into<String>,
        category: impl Into<Category>,
        items: Vec<AgreementItem>,
        has_penalty_rule: bool,
        penalty_rules: Vec<PenaltyRule>,
    ) -> Self {
        Self {
            agreement_id: agreement_id.into(),
            category: category.into(),
            items,
            total_feedbacks: 0,
            total_unsatisfied: 0,
            total_rule_violations: 0,
            total_rule_violation_without_compensations: 0,
            has_penalty_rule,
            penalty_rules,
            last_evaluation_at: String::new(),
            rule_abiding_rate: 1.0,
            satisfaction_rate: 1.0,
        }
    }

    /// Resolve the penalty for a tier.
    ///
    /// Returns `None` when the agreement carries no penalties. A rule pinned to
    /// the tier wins over the rule at the tier's position.
    pub fn penalty_for(&self, tier: PenaltyTier) -> Result<Option<PenaltyRule>, VerificationError> {
        if !self.has_penalty_rule {
            return Ok(None);
        }

        self.penalty_rules
            .iter()
            .find(|rule| rule.tier == Some(tier))
            .or_else(|| self.penalty_rules.get(tier.index()))
            .cloned()
            .map(Some)
            .ok_or_else(|| VerificationError::MissingPenaltyTier {
                agreement_id: self.agreement_id.clone(),
                tier,
                available: self.penalty_rules.len(),
            })
    }
}

/// A rated hospitality service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub doc_type: String,
    pub service_id: String,
    pub rule_abiding_rate: f64,
    pub satisfaction_rate: f64,
    pub number_of_evaluations: u64,
    #[serde(default)]
    pub last_evaluation_at: String,
    #[serde(default)]
    pub agreements: Vec<Agreement>,
}

impl Service {
    /// Create a freshly registered service.
    pub fn new(service_id: impl Into<String>) -> Self {
        Self {
            doc_type: SERVICE_DOC_TYPE.to_string(),
            service_id: service_id.into(),
            rule_abiding_rate: 1.0,
            satisfaction_rate: 1.0,
            number_of_evaluations: 0,
            last_evaluation_at: String::new(),
            agreements: Vec::new(),
        }
    }

    /// Find an agreement by ID.
    pub fn agreement(&self, agreement_id: &str) -> Option<&Agreement> {
        self.agreements
            .iter()
            .find(|a| a.agreement_id == agreement_id)
    }

    /// Find an agreement by ID for mutation.
    pub fn agreement_mut(&mut self, agreement_id: &str) -> Option<&mut Agreement> {
        self.agreements
            .iter_mut()
            .find(|a| a.agreement_id == agreement_id)
    }

    /// Position of an agreement in the ordered list.
    pub fn agreement_index(&self, agreement_id: &str) -> Option<usize> {
        self.agreements
            .iter()
            .position(|a| a.agreement_id == agreement_id)
    }
}

/// Verdict of a category evaluator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResult {
    pub satisfied: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub penalty_rule: Option<PenaltyRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
}

impl EvaluationResult {
    /// The agreement was honoured.
    pub fn satisfied() -> Self {
        Self {
            satisfied: true,
            penalty_rule: None,
            failure_reason: None,
        }
    }

    /// The agreement was breached.
    pub fn unsatisfied(penalty_rule: Option<PenaltyRule>, reason: Option<String>) -> Self {
        Self {
            satisfied: false,
            penalty_rule,
            failure_reason: reason,
        }
    }
}
