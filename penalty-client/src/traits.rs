//! The enforcement seam between the contract and the penalty service.

use async_trait::async_trait;

use crate::request::EnforcePenaltyRulesRequest;

/// Error types for penalty dispatch.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// Could not build the HTTP client
    #[error("Client setup failed: {0}")]
    Setup(String),

    /// Transport failure or timeout
    #[error("Network error: {0}")]
    Network(String),

    /// The service answered with something other than 200
    #[error("EnforcePenaltyRules with response: {status}")]
    Status { status: u16, body: String },
}

/// Something that can enforce penalty rules on a reservation.
#[async_trait]
pub trait PenaltyEnforcer: Send + Sync {
    /// Identifier for logs.
    fn id(&self) -> &str;

    /// Ask the penalty service to enforce the rules in `request`.
    async fn enforce(
        &self,
        request: &EnforcePenaltyRulesRequest,
        token: &str,
    ) -> Result<(), DispatchError>;
}
