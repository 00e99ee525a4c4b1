//! Command line interface of `reputation-node`.
//!
//! Every subcommand is one contract operation. Writes run as a committed
//! transaction; reads are evaluated without committing.

use chrono::{SecondsFormat, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;
use penalty_client::HttpPenaltyEnforcer;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::config::ContractConfig;
use crate::contract::{
    AgreementArgs, EvaluateArgs, Outcome, ReputationContract, RuleAbidingArgs,
    SatisfactionEventArgs,
};
use crate::runner::{Receipt, TransactionRunner};
use crate::store::FileStore;

/// Base64 of `null`, an empty penalty rule list.
const NO_PENALTY_RULES: &str = "bnVsbA==";

#[derive(Parser, Debug, Clone)]
#[command(name = "reputation-node")]
#[command(about = "SLA verification and reputation ledger for hospitality services")]
pub struct Args {
    /// YAML configuration file
    #[arg(long, env = "REPUTATION_CONFIG")]
    pub config: Option<PathBuf>,

    /// World state snapshot file (overrides the config)
    #[arg(long, env = "REPUTATION_STATE")]
    pub state: Option<PathBuf>,

    /// Penalty service base URL (overrides the config)
    #[arg(long, env = "PENALTY_BASE_URL")]
    pub penalty_url: Option<String>,

    /// Never call the penalty service
    #[arg(long, env = "DISABLE_PENALTY", default_value = "false")]
    pub disable_penalty: bool,

    /// Transaction ID (generated when absent)
    #[arg(long, env = "TX_ID")]
    pub tx_id: Option<String>,

    /// Log level
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    /// Fold command line overrides into a loaded config.
    pub fn apply(&self, config: &mut ContractConfig) {
        if let Some(state) = &self.state {
            config.state.path = state.clone();
        }
        if let Some(url) = &self.penalty_url {
            config.penalty.base_url = url.clone();
        }
        if self.disable_penalty {
            config.penalty.enabled = false;
        }
    }
}

/// Agreement arguments shared by add and update.
#[derive(clap::Args, Debug, Clone)]
pub struct AgreementCommand {
    #[arg(long)]
    pub service: String,
    #[arg(long)]
    pub agreement: String,
    #[arg(long)]
    pub category: String,
    #[arg(long)]
    pub has_penalty_rule: bool,
    /// Base64 JSON array of agreement items
    #[arg(long)]
    pub items: String,
    /// Base64 JSON array of penalty rules
    #[arg(long, default_value = NO_PENALTY_RULES)]
    pub penalty_rules: String,
}

impl From<AgreementCommand> for AgreementArgs {
    fn from(cmd: AgreementCommand) -> Self {
        Self {
            service_id: cmd.service,
            agreement_id: cmd.agreement,
            category: cmd.category,
            has_penalty_rule: cmd.has_penalty_rule,
            items: cmd.items,
            penalty_rules: cmd.penalty_rules,
        }
    }
}

/// Rule-abiding arguments shared by rule-abiding and penalty-event.
#[derive(clap::Args, Debug, Clone)]
pub struct RuleAbidingCommand {
    #[arg(long)]
    pub service: String,
    #[arg(long)]
    pub agreement: String,
    #[arg(long)]
    pub evaluation: String,
    #[arg(long, default_value = "")]
    pub hash: String,
    /// Evaluation time (now when absent)
    #[arg(long)]
    pub at: Option<String>,
    #[arg(long)]
    pub compensated: bool,
}

impl From<RuleAbidingCommand> for RuleAbidingArgs {
    fn from(cmd: RuleAbidingCommand) -> Self {
        Self {
            service_id: cmd.service,
            agreement_id: cmd.agreement,
            evaluation_id: cmd.evaluation,
            hash: cmd.hash,
            evaluated_at: cmd.at.unwrap_or_else(now),
            compensated: cmd.compensated,
        }
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    CreateService {
        #[arg(long)]
        id: String,
    },
    ReadService {
        #[arg(long)]
        id: String,
    },
    DeleteService {
        #[arg(long)]
        id: String,
    },
    ServiceExists {
        #[arg(long)]
        id: String,
    },
    ListServices,
    AddAgreement(AgreementCommand),
    UpdateAgreement(AgreementCommand),
    RemoveAgreement {
        #[arg(long)]
        service: String,
        #[arg(long)]
        agreement: String,
    },
    /// Verify evidence against an agreement
    EvaluateSla {
        #[arg(long)]
        service: String,
        #[arg(long)]
        agreement: String,
        #[arg(long)]
        evaluation: String,
        /// Base64 JSON array of evidence
        #[arg(long)]
        data: String,
        /// Evidence digest (SHA-256 of `--data` when absent)
        #[arg(long)]
        hash: Option<String>,
        #[arg(long)]
        at: Option<String>,
        /// Enforce the verdict's penalty on this reservation
        #[arg(long)]
        reservation: Option<String>,
    },
    UpdateRuleAbidingRate(RuleAbidingCommand),
    SatisfactionEvent {
        #[arg(long)]
        service: String,
        #[arg(long)]
        agreement: String,
        #[arg(long)]
        evaluation: String,
        #[arg(long)]
        reservation: String,
        #[arg(long, default_value = "")]
        hash: String,
        #[arg(long)]
        at: Option<String>,
        #[arg(long)]
        satisfied: bool,
        #[arg(long)]
        enforce_penalty_rule: bool,
    },
    PenaltyEvent(RuleAbidingCommand),
    CountEvaluations {
        /// Page size (config default when absent)
        #[arg(long)]
        page_size: Option<usize>,
    },
    ReadEvaluation {
        #[arg(long)]
        id: String,
    },
    SetAccessKey {
        #[arg(long, env = "INTERNAL_SERVICE_TOKEN")]
        token: String,
    },
    ReadAccessKey,
}

/// Open the world state and wire the penalty enforcer described by `config`.
pub fn build_runner(config: &ContractConfig) -> anyhow::Result<TransactionRunner> {
    let store = Arc::new(FileStore::open(&config.state.path)?);
    let runner = TransactionRunner::new(store, ReputationContract::default());

    if !config.penalty.enabled {
        info!("Penalty enforcement disabled");
        return Ok(runner);
    }

    let enforcer =
        HttpPenaltyEnforcer::new(config.penalty.base_url.clone(), config.penalty.timeout())?;
    info!(endpoint = %enforcer.endpoint(), "Penalty enforcement enabled");
    Ok(runner.with_enforcer(Arc::new(enforcer)))
}

/// Hex SHA-256 of an evidence payload as submitted.
pub fn evidence_digest(data: &str) -> String {
    hex::encode(Sha256::digest(data.as_bytes()))
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn receipt<T: Serialize>(receipt: Receipt<T>) -> anyhow::Result<Value> {
    Ok(json!({
        "txId": receipt.tx_id,
        "height": receipt.height,
        "result": serde_json::to_value(receipt.value)?,
        "dispatch": receipt.dispatch,
    }))
}

/// Run one command and render its result as JSON.
pub async fn execute(
    runner: &TransactionRunner,
    config: &ContractConfig,
    tx_id: String,
    command: Command,
) -> anyhow::Result<Value> {
    let value = match command {
        Command::CreateService { id } => receipt(
            runner
                .submit(tx_id, |c, ctx| c.create_service(ctx, &id).map(Outcome::plain))
                .await?,
        )?,
        Command::ReadService { id } => {
            serde_json::to_value(runner.evaluate(tx_id, |c, ctx| c.read_service(ctx, &id))?)?
        }
        Command::DeleteService { id } => receipt(
            runner
                .submit(tx_id, |c, ctx| c.delete_service(ctx, &id).map(Outcome::plain))
                .await?,
        )?,
        Command::ServiceExists { id } => {
            Value::Bool(runner.evaluate(tx_id, |c, ctx| c.service_exists(ctx, &id))?)
        }
        Command::ListServices => {
            serde_json::to_value(runner.evaluate(tx_id, |c, ctx| c.list_services(ctx))?)?
        }
        Command::AddAgreement(cmd) => {
            let args = AgreementArgs::from(cmd);
            receipt(
                runner
                    .submit(tx_id, |c, ctx| c.add_agreement(ctx, &args).map(Outcome::plain))
                    .await?,
            )?
        }
        Command::UpdateAgreement(cmd) => {
            let args = AgreementArgs::from(cmd);
            receipt(
                runner
                    .submit(tx_id, |c, ctx| c.update_agreement(ctx, &args).map(Outcome::plain))
                    .await?,
            )?
        }
        Command::RemoveAgreement { service, agreement } => receipt(
            runner
                .submit(tx_id, |c, ctx| {
                    c.remove_agreement(ctx, &service, &agreement)
                        .map(Outcome::plain)
                })
                .await?,
        )?,
        Command::EvaluateSla {
            service,
            agreement,
            evaluation,
            data,
            hash,
            at,
            reservation,
        } => {
            let hash = hash.unwrap_or_else(|| evidence_digest(&data));
            let args = EvaluateArgs {
                service_id: service,
                agreement_id: agreement,
                evaluation_id: evaluation,
                evaluation_data: data,
                hash,
                evaluated_at: at.unwrap_or_else(now),
                reservation_id: reservation,
            };
            receipt(runner.submit(tx_id, |c, ctx| c.evaluate_sla(ctx, &args)).await?)?
        }
        Command::UpdateRuleAbidingRate(cmd) => {
            let args = RuleAbidingArgs::from(cmd);
            receipt(
                runner
                    .submit(tx_id, |c, ctx| {
                        c.update_rule_abiding_rate(ctx, &args).map(Outcome::plain)
                    })
                    .await?,
            )?
        }
        Command::SatisfactionEvent {
            service,
            agreement,
            evaluation,
            reservation,
            hash,
            at,
            satisfied,
            enforce_penalty_rule,
        } => {
            let args = SatisfactionEventArgs {
                service_id: service,
                agreement_id: agreement,
                evaluation_id: evaluation,
                reservation_id: reservation,
                hash,
                evaluated_at: at.unwrap_or_else(now),
                satisfied,
                enforce_penalty_rule,
            };
            receipt(
                runner
                    .submit(tx_id, |c, ctx| c.handle_satisfaction_event(ctx, &args))
                    .await?,
            )?
        }
        Command::PenaltyEvent(cmd) => {
            let args = RuleAbidingArgs::from(cmd);
            receipt(
                runner
                    .submit(tx_id, |c, ctx| {
                        c.handle_penalty_event(ctx, &args).map(Outcome::plain)
                    })
                    .await?,
            )?
        }
        Command::CountEvaluations { page_size } => {
            let page_size = page_size.unwrap_or(config.query.default_page_size);
            let count = runner.evaluate(tx_id, |c, ctx| c.count_evaluations(ctx, page_size))?;
            json!(count)
        }
        Command::ReadEvaluation { id } => {
            serde_json::to_value(runner.evaluate(tx_id, |c, ctx| c.read_evaluation(ctx, &id))?)?
        }
        Command::SetAccessKey { token } => receipt(
            runner
                .submit(tx_id, |c, ctx| c.set_access_key(ctx, &token).map(Outcome::plain))
                .await?,
        )?,
        Command::ReadAccessKey => {
            serde_json::to_value(runner.evaluate(tx_id, |c, ctx| c.read_access_key(ctx))?)?
        }
    };
    Ok(value)
}
