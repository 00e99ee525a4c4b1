//! Penalty enforcement client.
//!
//! When an agreement is breached and the caller asks for enforcement, the
//! contract hands an [`EnforcePenaltyRulesRequest`] to a [`PenaltyEnforcer`]
//! after the state change has been committed. Enforcement is best effort:
//! a failed call never rolls the state change back.
//!
//! - [`HttpPenaltyEnforcer`]: posts to the penalty service over HTTP
//! - [`MockPenaltyEnforcer`]: records requests for tests

pub mod http;
pub mod mock;
pub mod request;
pub mod traits;

pub use http::HttpPenaltyEnforcer;
pub use mock::MockPenaltyEnforcer;
pub use request::EnforcePenaltyRulesRequest;
pub use traits::{DispatchError, PenaltyEnforcer};
