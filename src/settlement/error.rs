use thiserror::Error;

use crate::anchor::AnchorError;
use crate::core_types::{Role, SessionId, TransferId};
use crate::error::ErrorKind;
use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum SettlementError {
    #[error("Transfer not found: {0}")]
    TransferNotFound(TransferId),

    #[error("Transfer {transfer_id} has no {role} auth session")]
    SessionRequired { transfer_id: TransferId, role: Role },

    #[error("Auth session not found: {0}")]
    SessionNotFound(SessionId),

    #[error("Auth session {0} has no bearer token")]
    NotAuthenticated(SessionId),

    #[error("Invalid destination account: {0}")]
    InvalidDestination(String),

    /// The anchor accepted the operation but the local record was not
    /// written. `anchor_operation_id` is the only handle left to reconcile.
    #[error("Anchor operation {anchor_operation_id} accepted but not recorded: {source}")]
    Persistence {
        anchor_operation_id: String,
        #[source]
        source: StoreError,
    },

    #[error(transparent)]
    Anchor(#[from] AnchorError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl SettlementError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SettlementError::TransferNotFound(_) | SettlementError::SessionNotFound(_) => {
                ErrorKind::NotFound
            }
            SettlementError::SessionRequired { .. } => ErrorKind::SessionRequired,
            SettlementError::NotAuthenticated(_) => ErrorKind::AuthenticationError,
            SettlementError::InvalidDestination(_) => ErrorKind::InvalidInput,
            SettlementError::Persistence { .. } => ErrorKind::PersistenceFailure,
            SettlementError::Anchor(e) => e.kind(),
            SettlementError::Store(e) => e.kind(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            SettlementError::TransferNotFound(_) => "TRANSFER_NOT_FOUND",
            SettlementError::SessionNotFound(_) => "SESSION_NOT_FOUND",
            other => other.kind().code(),
        }
    }

    pub fn http_status(&self) -> u16 {
        self.kind().http_status()
    }

    pub fn is_retryable(&self) -> bool {
        self.kind().is_retryable()
    }

    /// Anchor operation left without a local record, if any
    pub fn orphaned_operation_id(&self) -> Option<&str> {
        match self {
            SettlementError::Persistence {
                anchor_operation_id,
                ..
            } => Some(anchor_operation_id.as_str()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchor_kinds_pass_through() {
        assert_eq!(
            SettlementError::Anchor(AnchorError::Unavailable("timeout".into())).kind(),
            ErrorKind::AnchorUnavailable
        );
        assert_eq!(
            SettlementError::Anchor(AnchorError::InvalidOperation("limit".into())).kind(),
            ErrorKind::InvalidOperation
        );
        assert!(SettlementError::Anchor(AnchorError::Unavailable("x".into())).is_retryable());
    }

    #[test]
    fn test_persistence_carries_operation_id() {
        let err = SettlementError::Persistence {
            anchor_operation_id: "deposit-9".into(),
            source: StoreError::Unavailable("down".into()),
        };
        assert_eq!(err.kind(), ErrorKind::PersistenceFailure);
        assert_eq!(err.orphaned_operation_id(), Some("deposit-9"));
        assert!(err.to_string().contains("deposit-9"));
        assert!(!err.is_retryable());
    }
}
