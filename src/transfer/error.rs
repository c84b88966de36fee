//! Transfer error types

use thiserror::Error;

use crate::core_types::TransferId;
use crate::error::ErrorKind;
use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum TransferError {
    #[error("Amount must be greater than zero")]
    InvalidAmount,

    #[error("Invalid recipient: {0}")]
    InvalidRecipient(&'static str),

    #[error("Transfer not found: {0}")]
    TransferNotFound(TransferId),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl TransferError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TransferError::InvalidAmount | TransferError::InvalidRecipient(_) => {
                ErrorKind::InvalidInput
            }
            TransferError::TransferNotFound(_) => ErrorKind::NotFound,
            TransferError::Store(e) => e.kind(),
        }
    }

    /// Get the error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            TransferError::InvalidAmount => "INVALID_AMOUNT",
            TransferError::InvalidRecipient(_) => "INVALID_RECIPIENT",
            TransferError::TransferNotFound(_) => "TRANSFER_NOT_FOUND",
            TransferError::Store(e) => e.kind().code(),
        }
    }

    pub fn http_status(&self) -> u16 {
        self.kind().http_status()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_mapping() {
        assert_eq!(TransferError::InvalidAmount.http_status(), 400);
        assert_eq!(
            TransferError::TransferNotFound(uuid::Uuid::nil()).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            TransferError::Store(StoreError::Unavailable("x".into())).code(),
            "PERSISTENCE_FAILURE"
        );
    }
}
