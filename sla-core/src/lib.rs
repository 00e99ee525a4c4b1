//! SLA verification and reputation arithmetic for hospitality services.
//!
//! Services publish agreements in a fixed set of categories. Each evaluation
//! event is classified against the matching agreement and folded into running
//! satisfaction and rule-abiding rates:
//!
//! - **Catalog**: item codes and the view-level / bed-point lookup tables
//! - **Verification**: per-category evaluators behind a single dispatcher
//! - **Rates**: incremental counters and the worst-case service rollup
//!
//! Everything in this crate is synchronous and free of I/O so that replaying
//! the same inputs always produces the same state.
//!
//! # Example
//!
//! ```ignore
//! use sla_core::{Catalog, VerificationEngine};
//!
//! let engine = VerificationEngine::new(Catalog::standard());
//! let result = engine.verify(&agreement, &evidence)?;
//! service.record_satisfaction(&agreement.agreement_id, result.satisfied, at);
//! ```

pub mod catalog;
pub mod item;
pub mod rates;
pub mod types;
pub mod verification;

pub use catalog::Catalog;
pub use item::{
    AgreementItem, Evidence, FacilityTerm, ObservedFacility, SaunaRequest, SaunaStatus,
    SaunaTerms, ShuttleStatus, ShuttleTerms, ShuttleTrip,
};
pub use rates::{rate, RateKind};
pub use types::*;
pub use verification::{VerificationEngine, VerificationError};
