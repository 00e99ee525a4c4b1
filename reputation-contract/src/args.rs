//! Transaction arguments that arrive as base64-encoded JSON.

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{ContractError, DecodeStep};

pub const AGREEMENT_ITEMS: &str = "agreement items";
pub const PENALTY_RULES: &str = "penalty rules";
pub const EVALUATION_DATA: &str = "evaluation data";

/// Decode a base64 JSON array; `null` decodes to an empty list.
pub fn decode_list<T: DeserializeOwned>(
    payload: &'static str,
    encoded: &str,
) -> Result<Vec<T>, ContractError> {
    let raw = STANDARD
        .decode(encoded.trim())
        .map_err(|e| ContractError::decode(payload, DecodeStep::Base64, e))?;

    let list: Option<Vec<T>> = serde_json::from_slice(&raw)
        .map_err(|e| ContractError::decode(payload, DecodeStep::Json, e))?;
    Ok(list.unwrap_or_default())
}

/// Encode a value the way [`decode_list`] expects it.
pub fn encode_payload<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    Ok(STANDARD.encode(serde_json::to_vec(value)?))
}
