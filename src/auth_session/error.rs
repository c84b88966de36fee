use thiserror::Error;

use crate::anchor::AnchorError;
use crate::core_types::{Role, SessionId, TransferId};
use crate::error::ErrorKind;
use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum AuthSessionError {
    #[error("Invalid Stellar public key: {0}")]
    InvalidPublicKey(String),

    #[error("Token must not be empty")]
    EmptyToken,

    #[error("Auth session not found: {0}")]
    SessionNotFound(SessionId),

    #[error("Transfer not found: {0}")]
    TransferNotFound(TransferId),

    #[error("Auth session {0} is already authenticated")]
    AlreadyFinalized(SessionId),

    #[error("Transfer {transfer_id} already has a different {role} session")]
    RoleAlreadyLinked { transfer_id: TransferId, role: Role },

    #[error(transparent)]
    Anchor(#[from] AnchorError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AuthSessionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthSessionError::InvalidPublicKey(_) | AuthSessionError::EmptyToken => {
                ErrorKind::InvalidInput
            }
            AuthSessionError::SessionNotFound(_) | AuthSessionError::TransferNotFound(_) => {
                ErrorKind::NotFound
            }
            AuthSessionError::AlreadyFinalized(_) => ErrorKind::SessionAlreadyFinalized,
            AuthSessionError::RoleAlreadyLinked { .. } => ErrorKind::RoleAlreadyLinked,
            AuthSessionError::Anchor(e) => e.kind(),
            AuthSessionError::Store(e) => e.kind(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AuthSessionError::SessionNotFound(_) => "SESSION_NOT_FOUND",
            AuthSessionError::TransferNotFound(_) => "TRANSFER_NOT_FOUND",
            AuthSessionError::InvalidPublicKey(_) => "INVALID_PUBLIC_KEY",
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(
            AuthSessionError::AlreadyFinalized(1).kind(),
            ErrorKind::SessionAlreadyFinalized
        );
        assert_eq!(
            AuthSessionError::RoleAlreadyLinked {
                transfer_id: uuid::Uuid::nil(),
                role: Role::Receiver
            }
            .http_status(),
            409
        );
        assert_eq!(
            AuthSessionError::Anchor(AnchorError::Authentication("bad sig".into())).kind(),
            ErrorKind::AuthenticationError
        );
        assert!(AuthSessionError::Anchor(AnchorError::Unavailable("timeout".into())).is_retryable());
        assert_eq!(AuthSessionError::SessionNotFound(3).code(), "SESSION_NOT_FOUND");
    }
}
