//! Contract errors.

use penalty_client::DispatchError;
use sla_core::VerificationError;
use std::fmt;

use crate::store::StoreError;

/// Step of argument decoding that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStep {
    Base64,
    Json,
}

impl fmt::Display for DecodeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Base64 => f.write_str("base64"),
            Self::Json => f.write_str("json"),
        }
    }
}

/// Coarse error class reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    DecodeError,
    UnsupportedCategory,
    CodeMismatch,
    IndexOutOfRange,
    InvalidState,
    StorageError,
    DispatchError,
}

/// Error types for contract operations.
#[derive(Debug, thiserror::Error)]
pub enum ContractError {
    #[error("the service {0} does not exist")]
    ServiceNotFound(String),

    #[error("the agreement {agreement_id} does not exist in service {service_id}")]
    AgreementNotFound {
        service_id: String,
        agreement_id: String,
    },

    #[error("the evaluation {0} does not exist")]
    EvaluationNotFound(String),

    #[error("the internal service access key does not exist")]
    AccessKeyNotFound,

    #[error("the service {0} already exists")]
    ServiceExists(String),

    #[error("the agreement {agreement_id} already exists in service {service_id}")]
    AgreementExists {
        service_id: String,
        agreement_id: String,
    },

    /// A transaction argument could not be decoded
    #[error("can not decode {payload} ({step}): {message}")]
    Decode {
        payload: &'static str,
        step: DecodeStep,
        message: String,
    },

    #[error(transparent)]
    Verification(#[from] VerificationError),

    #[error(transparent)]
    Storage(#[from] StoreError),

    /// Penalty enforcement failed after commit
    #[error("penalty enforcement failed: {0}")]
    Dispatch(#[from] DispatchError),
}

impl ContractError {
    pub(crate) fn decode(payload: &'static str, step: DecodeStep, err: impl fmt::Display) -> Self {
        Self::Decode {
            payload,
            step,
            message: err.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ServiceNotFound(_)
            | Self::AgreementNotFound { .. }
            | Self::EvaluationNotFound(_)
            | Self::AccessKeyNotFound => ErrorKind::NotFound,
            Self::ServiceExists(_) | Self::AgreementExists { .. } => ErrorKind::Conflict,
            Self::Decode { .. } => ErrorKind::DecodeError,
            Self::Verification(err) => match err {
                VerificationError::UnsupportedCategory(_)
                | VerificationError::UnsupportedItemCode { .. } => ErrorKind::UnsupportedCategory,
                VerificationError::CodeMismatch { .. } => ErrorKind::CodeMismatch,
                VerificationError::MissingPenaltyTier { .. } => ErrorKind::IndexOutOfRange,
                VerificationError::InvalidState(_) | VerificationError::EmptyAgreement(_) => {
                    ErrorKind::InvalidState
                }
                VerificationError::InvalidEvidence(_) => ErrorKind::DecodeError,
            },
            Self::Storage(_) => ErrorKind::StorageError,
            Self::Dispatch(_) => ErrorKind::DispatchError,
        }
    }
}
