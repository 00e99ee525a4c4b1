//! Mock penalty enforcer for testing.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

use crate::request::EnforcePenaltyRulesRequest;
use crate::traits::{DispatchError, PenaltyEnforcer};

/// Records every request; can be switched to fail.
pub struct MockPenaltyEnforcer {
    failing: AtomicBool,
    calls: Mutex<Vec<(EnforcePenaltyRulesRequest, String)>>,
}

impl MockPenaltyEnforcer {
    /// Create a mock that accepts every request.
    pub fn new() -> Self {
        Self {
            failing: AtomicBool::new(false),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Make every call fail with a 503.
    pub fn failing(self) -> Self {
        self.failing.store(true, Ordering::SeqCst);
        self
    }

    /// Requests received so far, with the token they carried.
    pub async fn calls(&self) -> Vec<(EnforcePenaltyRulesRequest, String)> {
        self.calls.lock().await.clone()
    }

    /// Number of requests received.
    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }
}

impl Default for MockPenaltyEnforcer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PenaltyEnforcer for MockPenaltyEnforcer {
    fn id(&self) -> &str {
        "mock"
    }

    async fn enforce(
        &self,
        request: &EnforcePenaltyRulesRequest,
        token: &str,
    ) -> Result<(), DispatchError> {
        self.calls
            .lock()
            .await
            .push((request.clone(), token.to_string()));

        if self.failing.load(Ordering::SeqCst) {
            return Err(DispatchError::Status {
                status: 503,
                body: "mock failure".to_string(),
            });
        }
        Ok(())
    }
}
