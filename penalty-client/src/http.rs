//! HTTP penalty enforcer.

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use std::time::Duration;
use tracing::{debug, info};

use crate::request::EnforcePenaltyRulesRequest;
use crate::traits::{DispatchError, PenaltyEnforcer};

/// Path of the enforcement RPC below the service base URL.
pub const ENFORCE_PATH: &str = "/rpc/agreements/enforce-penalty-rules";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Posts enforcement requests to the penalty service.
pub struct HttpPenaltyEnforcer {
    client: Client,
    base_url: String,
}

impl HttpPenaltyEnforcer {
    /// Create an enforcer for a service base URL.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, DispatchError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| DispatchError::Setup(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Full URL of the enforcement endpoint.
    pub fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, ENFORCE_PATH)
    }
}

#[async_trait]
impl PenaltyEnforcer for HttpPenaltyEnforcer {
    fn id(&self) -> &str {
        &self.base_url
    }

    async fn enforce(
        &self,
        request: &EnforcePenaltyRulesRequest,
        token: &str,
    ) -> Result<(), DispatchError> {
        debug!(
            evaluation_id = %request.evaluation_id,
            agreement_id = %request.agreement_id,
            "Posting penalty enforcement"
        );

        let response = self
            .client
            .post(self.endpoint())
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .json(request)
            .send()
            .await
            .map_err(|e| DispatchError::Network(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(DispatchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        info!(
            reservation_id = %request.reservation_id,
            agreement_id = %request.agreement_id,
            "Penalty rules enforced"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_strips_trailing_slash() {
        let enforcer =
            HttpPenaltyEnforcer::new("http://localhost:8181/tourism-block/v1/", DEFAULT_TIMEOUT)
                .unwrap();
        assert_eq!(
            enforcer.endpoint(),
            "http://localhost:8181/tourism-block/v1/rpc/agreements/enforce-penalty-rules"
        );
        assert_eq!(enforcer.id(), "http://localhost:8181/tourism-block/v1");
    }
}
