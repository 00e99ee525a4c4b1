//! The reputation contract: every operation callers can submit.
//!
//! Operations run against a [`TransactionContext`] and never talk to the
//! network. When an operation wants a penalty enforced it returns an
//! [`EnforcementIntent`] in its [`Outcome`]; the runner sends it once the
//! state change has committed.

use penalty_client::EnforcePenaltyRulesRequest;
use sla_core::{
    Agreement, AgreementItem, Evidence, EvaluationResult, PenaltyRule, Service,
    VerificationEngine,
};
use tracing::{debug, info, warn};

use crate::access_key::{self, AccessKey};
use crate::args::{self, AGREEMENT_ITEMS, EVALUATION_DATA, PENALTY_RULES};
use crate::context::TransactionContext;
use crate::error::ContractError;
use crate::ledger::{self, Evaluation};
use crate::registry::{self, AgreementTerms};

/// A penalty call to make after commit.
#[derive(Debug, Clone, PartialEq)]
pub struct EnforcementIntent {
    pub request: EnforcePenaltyRulesRequest,
    pub token: String,
}

/// Result of an operation plus any enforcement it asks for.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome<T> {
    pub value: T,
    pub enforcement: Option<EnforcementIntent>,
}

impl<T> Outcome<T> {
    /// An outcome with nothing to enforce.
    pub fn plain(value: T) -> Self {
        Self {
            value,
            enforcement: None,
        }
    }
}

/// Arguments of add-agreement and update-agreement.
///
/// `items` and `penalty_rules` are base64-encoded JSON arrays.
#[derive(Debug, Clone, Default)]
pub struct AgreementArgs {
    pub service_id: String,
    pub agreement_id: String,
    pub category: String,
    pub has_penalty_rule: bool,
    pub items: String,
    pub penalty_rules: String,
}

/// Arguments of evaluate-SLA.
#[derive(Debug, Clone, Default)]
pub struct EvaluateArgs {
    pub service_id: String,
    pub agreement_id: String,
    pub evaluation_id: String,
    /// Base64-encoded JSON array of evidence
    pub evaluation_data: String,
    pub hash: String,
    pub evaluated_at: String,
    /// Request enforcement of the verdict's penalty for this reservation
    pub reservation_id: Option<String>,
}

/// Arguments of update-rule-abiding-rate and handle-penalty-event.
#[derive(Debug, Clone, Default)]
pub struct RuleAbidingArgs {
    pub service_id: String,
    pub agreement_id: String,
    pub evaluation_id: String,
    pub hash: String,
    pub evaluated_at: String,
    pub compensated: bool,
}

/// Arguments of handle-satisfaction-event.
#[derive(Debug, Clone, Default)]
pub struct SatisfactionEventArgs {
    pub service_id: String,
    pub agreement_id: String,
    pub evaluation_id: String,
    pub reservation_id: String,
    pub hash: String,
    pub evaluated_at: String,
    pub satisfied: bool,
    pub enforce_penalty_rule: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ReputationContract {
    engine: VerificationEngine,
}

impl ReputationContract {
    pub fn new(engine: VerificationEngine) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &VerificationEngine {
        &self.engine
    }

    // Services

    pub fn create_service(
        &self,
        ctx: &mut TransactionContext<'_>,
        service_id: &str,
    ) -> Result<Service, ContractError> {
        registry::create_service(ctx, service_id)
    }

    pub fn read_service(
        &self,
        ctx: &mut TransactionContext<'_>,
        service_id: &str,
    ) -> Result<Service, ContractError> {
        registry::read_service(ctx, service_id)
    }

    pub fn delete_service(
        &self,
        ctx: &mut TransactionContext<'_>,
        service_id: &str,
    ) -> Result<(), ContractError> {
        registry::delete_service(ctx, service_id)
    }

    pub fn service_exists(
        &self,
        ctx: &mut TransactionContext<'_>,
        service_id: &str,
    ) -> Result<bool, ContractError> {
        registry::service_exists(ctx, service_id)
    }

    pub fn list_services(
        &self,
        ctx: &mut TransactionContext<'_>,
    ) -> Result<Vec<Service>, ContractError> {
        registry::list_services(ctx)
    }

    // Agreements

    pub fn add_agreement(
        &self,
        ctx: &mut TransactionContext<'_>,
        args: &AgreementArgs,
    ) -> Result<Service, ContractError> {
        let terms = decode_terms(args)?;
        let agreement = Agreement::new(
            args.agreement_id.as_str(),
            terms.category,
            terms.items,
            terms.has_penalty_rule,
            terms.penalty_rules,
        );
        registry::add_agreement(ctx, &args.service_id, agreement)
    }

    pub fn update_agreement(
        &self,
        ctx: &mut TransactionContext<'_>,
        args: &AgreementArgs,
    ) -> Result<Service, ContractError> {
        let terms = decode_terms(args)?;
        registry::update_agreement(ctx, &args.service_id, &args.agreement_id, terms)
    }

    pub fn remove_agreement(
        &self,
        ctx: &mut TransactionContext<'_>,
        service_id: &str,
        agreement_id: &str,
    ) -> Result<Service, ContractError> {
        registry::remove_agreement(ctx, service_id, agreement_id)
    }

    // Evaluations

    /// Verify evidence against an agreement and fold the verdict into the
    /// satisfaction rates.
    pub fn evaluate_sla(
        &self,
        ctx: &mut TransactionContext<'_>,
        args: &EvaluateArgs,
    ) -> Result<Outcome<EvaluationResult>, ContractError> {
        let mut service = registry::read_service(ctx, &args.service_id)?;
        let agreement = find_agreement(&service, &args.agreement_id)?;

        let evidence: Vec<Evidence> = args::decode_list(EVALUATION_DATA, &args.evaluation_data)?;
        let verdict = self.engine.verify(agreement, &evidence)?;
        let has_penalty_rule = agreement.has_penalty_rule;

        debug!(
            service_id = %args.service_id,
            agreement_id = %args.agreement_id,
            satisfied = verdict.satisfied,
            "Verified agreement"
        );

        self.record_satisfaction(
            ctx,
            &mut service,
            verdict.satisfied,
            Stamp {
                agreement_id: &args.agreement_id,
                evaluation_id: &args.evaluation_id,
                hash: &args.hash,
                evaluated_at: &args.evaluated_at,
            },
        )?;

        let enforcement = match &args.reservation_id {
            Some(reservation_id) if !verdict.satisfied && has_penalty_rule => {
                let request = EnforcePenaltyRulesRequest::new(
                    args.evaluation_id.as_str(),
                    reservation_id.as_str(),
                    args.agreement_id.as_str(),
                )
                .with_verdict(&verdict);
                enforcement_intent(ctx, request)?
            }
            _ => None,
        };

        Ok(Outcome {
            value: verdict,
            enforcement,
        })
    }

    /// Fold an externally judged satisfaction verdict into the rates.
    pub fn handle_satisfaction_event(
        &self,
        ctx: &mut TransactionContext<'_>,
        args: &SatisfactionEventArgs,
    ) -> Result<Outcome<Service>, ContractError> {
        let mut service = registry::read_service(ctx, &args.service_id)?;
        let has_penalty_rule = find_agreement(&service, &args.agreement_id)?.has_penalty_rule;

        self.record_satisfaction(
            ctx,
            &mut service,
            args.satisfied,
            Stamp {
                agreement_id: &args.agreement_id,
                evaluation_id: &args.evaluation_id,
                hash: &args.hash,
                evaluated_at: &args.evaluated_at,
            },
        )?;

        let enforcement = if !args.satisfied && has_penalty_rule && args.enforce_penalty_rule {
            let request = EnforcePenaltyRulesRequest::new(
                args.evaluation_id.as_str(),
                args.reservation_id.as_str(),
                args.agreement_id.as_str(),
            );
            enforcement_intent(ctx, request)?
        } else {
            None
        };

        Ok(Outcome {
            value: service,
            enforcement,
        })
    }

    /// Record a rule violation and whether it was compensated.
    pub fn update_rule_abiding_rate(
        &self,
        ctx: &mut TransactionContext<'_>,
        args: &RuleAbidingArgs,
    ) -> Result<Service, ContractError> {
        let mut service = registry::read_service(ctx, &args.service_id)?;
        service
            .record_rule_abiding(&args.agreement_id, args.compensated, &args.evaluated_at)
            .ok_or_else(|| ContractError::AgreementNotFound {
                service_id: args.service_id.clone(),
                agreement_id: args.agreement_id.clone(),
            })?;

        registry::save_service(ctx, &service)?;
        ledger::record(
            ctx,
            &args.evaluation_id,
            &args.service_id,
            &args.agreement_id,
            &args.hash,
        )?;

        info!(
            service_id = %args.service_id,
            agreement_id = %args.agreement_id,
            compensated = args.compensated,
            rule_abiding_rate = service.rule_abiding_rate,
            "Updated rule-abiding rate"
        );
        Ok(service)
    }

    /// Penalty-rule evaluation event; same effect as a rule-abiding update.
    pub fn handle_penalty_event(
        &self,
        ctx: &mut TransactionContext<'_>,
        args: &RuleAbidingArgs,
    ) -> Result<Service, ContractError> {
        self.update_rule_abiding_rate(ctx, args)
    }

    /// Evaluations in the first page of `page_size` records.
    pub fn count_evaluations(
        &self,
        ctx: &mut TransactionContext<'_>,
        page_size: usize,
    ) -> Result<usize, ContractError> {
        ledger::count(ctx, page_size)
    }

    pub fn read_evaluation(
        &self,
        ctx: &mut TransactionContext<'_>,
        evaluation_id: &str,
    ) -> Result<Evaluation, ContractError> {
        ledger::read(ctx, evaluation_id)
    }

    // Access key

    pub fn set_access_key(
        &self,
        ctx: &mut TransactionContext<'_>,
        token: &str,
    ) -> Result<AccessKey, ContractError> {
        access_key::set(ctx, token)
    }

    pub fn read_access_key(
        &self,
        ctx: &mut TransactionContext<'_>,
    ) -> Result<AccessKey, ContractError> {
        access_key::get(ctx)
    }

    fn record_satisfaction(
        &self,
        ctx: &mut TransactionContext<'_>,
        service: &mut Service,
        satisfied: bool,
        stamp: Stamp<'_>,
    ) -> Result<(), ContractError> {
        let agreement_id = stamp.agreement_id;
        let service_id = service.service_id.clone();
        service
            .record_satisfaction(agreement_id, satisfied, stamp.evaluated_at)
            .ok_or_else(|| ContractError::AgreementNotFound {
                service_id,
                agreement_id: agreement_id.to_string(),
            })?;

        registry::save_service(ctx, service)?;
        ledger::record(
            ctx,
            stamp.evaluation_id,
            &service.service_id,
            agreement_id,
            stamp.hash,
        )?;

        info!(
            service_id = %service.service_id,
            agreement_id = %agreement_id,
            satisfied,
            satisfaction_rate = service.satisfaction_rate,
            "Updated satisfaction rate"
        );
        Ok(())
    }
}

/// Identifies the evaluation a rate update belongs to.
struct Stamp<'a> {
    agreement_id: &'a str,
    evaluation_id: &'a str,
    hash: &'a str,
    evaluated_at: &'a str,
}

fn find_agreement<'a>(service: &'a Service, agreement_id: &str) -> Result<&'a Agreement, ContractError> {
    service
        .agreement(agreement_id)
        .ok_or_else(|| ContractError::AgreementNotFound {
            service_id: service.service_id.clone(),
            agreement_id: agreement_id.to_string(),
        })
}

fn decode_terms(args: &AgreementArgs) -> Result<AgreementTerms, ContractError> {
    let items: Vec<AgreementItem> = args::decode_list(AGREEMENT_ITEMS, &args.items)?;
    let penalty_rules: Vec<PenaltyRule> = args::decode_list(PENALTY_RULES, &args.penalty_rules)?;

    Ok(AgreementTerms {
        category: args.category.as_str().into(),
        items,
        has_penalty_rule: args.has_penalty_rule,
        penalty_rules,
    })
}

/// Pair a request with the stored access key; without a key nothing is sent.
fn enforcement_intent(
    ctx: &mut TransactionContext<'_>,
    request: EnforcePenaltyRulesRequest,
) -> Result<Option<EnforcementIntent>, ContractError> {
    match access_key::get(ctx) {
        Ok(key) => Ok(Some(EnforcementIntent {
            request,
            token: key.key,
        })),
        Err(ContractError::AccessKeyNotFound) => {
            warn!(
                agreement_id = %request.agreement_id,
                reservation_id = %request.reservation_id,
                "No internal service access key, skipping penalty enforcement"
            );
            Ok(None)
        }
        Err(err) => Err(err),
    }
}
