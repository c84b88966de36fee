use thiserror::Error;

use crate::anchor::AnchorError;
use crate::core_types::{Role, SessionId, TransferId};
use crate::error::ErrorKind;
use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum KycError {
    #[error("Transfer not found: {0}")]
    TransferNotFound(TransferId),

    #[error("Transfer {transfer_id} has no {role} auth session")]
    SessionRequired { transfer_id: TransferId, role: Role },

    #[error("Auth session not found: {0}")]
    SessionNotFound(SessionId),

    #[error("Auth session {0} has no bearer token")]
    NotAuthenticated(SessionId),

    #[error("No KYC submitted for {role} of transfer {transfer_id}")]
    NotSubmitted { transfer_id: TransferId, role: Role },

    #[error("No KYC fields supplied")]
    EmptyFields,

    #[error(transparent)]
    Anchor(#[from] AnchorError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl KycError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            KycError::TransferNotFound(_) | KycError::SessionNotFound(_) => ErrorKind::NotFound,
            KycError::SessionRequired { .. } => ErrorKind::SessionRequired,
            KycError::NotAuthenticated(_) => ErrorKind::AuthenticationError,
            KycError::NotSubmitted { .. } => ErrorKind::KycNotSubmitted,
            KycError::EmptyFields => ErrorKind::InvalidInput,
            KycError::Anchor(e) => e.kind(),
            KycError::Store(e) => e.kind(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            KycError::TransferNotFound(_) => "TRANSFER_NOT_FOUND",
            KycError::SessionNotFound(_) => "SESSION_NOT_FOUND",
            other => other.kind().code(),
        }
    }

    pub fn http_status(&self) -> u16 {
        self.kind().http_status()
    }

    pub fn is_retryable(&self) -> bool {
        self.kind().is_retryable()
    }
}
