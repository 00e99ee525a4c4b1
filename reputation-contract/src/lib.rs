//! Reputation contract for hospitality service agreements.
//!
//! Services register agreements (views, beds, shuttle, sauna, room size and
//! so on). Evidence submitted against an agreement is verified, the verdict
//! is folded into the agreement's satisfaction or rule-abiding rate, and each
//! evaluation is recorded in an append-only ledger. Every operation runs as
//! one transaction over a versioned world state:
//!
//! - [`store`]: versioned key-value world state with optimistic commits
//! - [`TransactionContext`]: buffered reads and writes of one invocation
//! - [`ReputationContract`]: the operation surface
//! - [`TransactionRunner`]: commit, then send penalty enforcement
//!
//! ```no_run
//! use std::sync::Arc;
//! use reputation_contract::{MemoryStore, Outcome, ReputationContract, TransactionRunner};
//!
//! # async fn example() -> Result<(), reputation_contract::ContractError> {
//! let runner = TransactionRunner::new(Arc::new(MemoryStore::new()), ReputationContract::default());
//! runner
//!     .submit("tx-1", |c, ctx| c.create_service(ctx, "hotel-1").map(Outcome::plain))
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod access_key;
pub mod args;
pub mod cli;
pub mod config;
pub mod context;
pub mod contract;
pub mod error;
pub mod ledger;
pub mod registry;
pub mod runner;
pub mod store;

pub use access_key::AccessKey;
pub use config::ContractConfig;
pub use context::TransactionContext;
pub use contract::{
    AgreementArgs, EnforcementIntent, EvaluateArgs, Outcome, ReputationContract,
    RuleAbidingArgs, SatisfactionEventArgs,
};
pub use error::{ContractError, DecodeStep, ErrorKind};
pub use ledger::Evaluation;
pub use runner::{DispatchStatus, Receipt, TransactionRunner};
pub use store::{FileStore, MemoryStore, StoreError, WorldState};
