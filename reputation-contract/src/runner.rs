//! Transaction runner.
//!
//! Executes one contract operation in a fresh [`TransactionContext`], commits
//! its write set, and only then sends any penalty enforcement the operation
//! asked for. A failed enforcement is logged and reported on the receipt; the
//! committed state stays as it is.

use penalty_client::PenaltyEnforcer;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::context::TransactionContext;
use crate::contract::{EnforcementIntent, Outcome, ReputationContract};
use crate::error::ContractError;
use crate::store::WorldState;

/// What happened to the enforcement an operation requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchStatus {
    /// The operation did not ask for enforcement
    NotRequested,
    /// The penalty service accepted the request
    Delivered,
    /// No enforcer is configured
    Skipped,
    /// The penalty service call failed
    Failed(String),
}

/// Result of a committed transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct Receipt<T> {
    pub tx_id: String,
    /// Store height after the commit
    pub height: u64,
    pub value: T,
    pub dispatch: DispatchStatus,
}

pub struct TransactionRunner {
    store: Arc<dyn WorldState>,
    contract: ReputationContract,
    enforcer: Option<Arc<dyn PenaltyEnforcer>>,
}

impl TransactionRunner {
    pub fn new(store: Arc<dyn WorldState>, contract: ReputationContract) -> Self {
        Self {
            store,
            contract,
            enforcer: None,
        }
    }

    /// Send enforcement requests through `enforcer`.
    pub fn with_enforcer(mut self, enforcer: Arc<dyn PenaltyEnforcer>) -> Self {
        self.enforcer = Some(enforcer);
        self
    }

    pub fn store(&self) -> &Arc<dyn WorldState> {
        &self.store
    }

    pub fn contract(&self) -> &ReputationContract {
        &self.contract
    }

    /// Run a read-only operation; nothing is committed.
    pub fn evaluate<T, F>(&self, tx_id: impl Into<String>, op: F) -> Result<T, ContractError>
    where
        F: FnOnce(&ReputationContract, &mut TransactionContext<'_>) -> Result<T, ContractError>,
    {
        let mut ctx = TransactionContext::new(self.store.as_ref(), tx_id);
        op(&self.contract, &mut ctx)
    }

    /// Run an operation, commit it, then dispatch its enforcement.
    ///
    /// Any error from the operation or the commit discards the write set.
    pub async fn submit<T, F>(
        &self,
        tx_id: impl Into<String>,
        op: F,
    ) -> Result<Receipt<T>, ContractError>
    where
        F: FnOnce(&ReputationContract, &mut TransactionContext<'_>) -> Result<Outcome<T>, ContractError>,
    {
        let tx_id = tx_id.into();

        let (outcome, set) = {
            let mut ctx = TransactionContext::new(self.store.as_ref(), tx_id.as_str());
            let outcome = op(&self.contract, &mut ctx).map_err(|e| {
                debug!(tx_id = %tx_id, error = %e, "Transaction rejected");
                e
            })?;
            (outcome, ctx.into_write_set())
        };

        let height = self.store.commit(&set)?;
        info!(tx_id = %tx_id, height, writes = set.writes.len(), "Committed transaction");

        let dispatch = match &outcome.enforcement {
            None => DispatchStatus::NotRequested,
            Some(intent) => self.dispatch(&tx_id, intent).await,
        };

        Ok(Receipt {
            tx_id,
            height,
            value: outcome.value,
            dispatch,
        })
    }

    /// Send one enforcement request.
    pub async fn enforce(&self, intent: &EnforcementIntent) -> Result<(), ContractError> {
        let Some(enforcer) = &self.enforcer else {
            return Ok(());
        };
        enforcer.enforce(&intent.request, &intent.token).await?;
        Ok(())
    }

    async fn dispatch(&self, tx_id: &str, intent: &EnforcementIntent) -> DispatchStatus {
        let Some(enforcer) = &self.enforcer else {
            warn!(tx_id = %tx_id, "No penalty enforcer configured, skipping enforcement");
            return DispatchStatus::Skipped;
        };

        match self.enforce(intent).await {
            Ok(()) => {
                info!(
                    tx_id = %tx_id,
                    enforcer = %enforcer.id(),
                    reservation_id = %intent.request.reservation_id,
                    agreement_id = %intent.request.agreement_id,
                    "Penalty rules enforced"
                );
                DispatchStatus::Delivered
            }
            Err(e) => {
                warn!(
                    tx_id = %tx_id,
                    enforcer = %enforcer.id(),
                    reservation_id = %intent.request.reservation_id,
                    error = %e,
                    "Penalty enforcement failed"
                );
                DispatchStatus::Failed(e.to_string())
            }
        }
    }
}
