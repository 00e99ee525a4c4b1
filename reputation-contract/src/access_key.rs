//! Bearer token used to call the penalty service.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::context::TransactionContext;
use crate::error::ContractError;

pub const ACCESS_KEY_KEY: &str = "jwt_internal_service_access_key";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessKey {
    #[serde(rename = "type")]
    pub key_type: String,
    pub key: String,
}

impl AccessKey {
    pub fn bearer(key: impl Into<String>) -> Self {
        Self {
            key_type: "Bearer".to_string(),
            key: key.into(),
        }
    }
}

pub fn set(ctx: &mut TransactionContext<'_>, token: &str) -> Result<AccessKey, ContractError> {
    let access_key = AccessKey::bearer(token);
    ctx.put_json(ACCESS_KEY_KEY, &access_key)?;
    info!(tx_id = %ctx.tx_id(), "Stored internal service access key");
    Ok(access_key)
}

pub fn get(ctx: &mut TransactionContext<'_>) -> Result<AccessKey, ContractError> {
    ctx.get_json(ACCESS_KEY_KEY)?
        .ok_or(ContractError::AccessKeyNotFound)
}
