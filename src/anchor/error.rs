use thiserror::Error;

use crate::error::ErrorKind;

/// Failure of a single anchor round trip.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AnchorError {
    #[error("Anchor rejected authentication: {0}")]
    Authentication(String),

    #[error("Anchor rejected KYC fields: {0}")]
    ComplianceRejected(String),

    #[error("Anchor unavailable: {0}")]
    Unavailable(String),

    #[error("Anchor rejected operation: {0}")]
    InvalidOperation(String),

    #[error("Unexpected anchor response: {0}")]
    Protocol(String),

    #[error("Anchor does not advertise {0}")]
    MissingEndpoint(&'static str),
}

impl AnchorError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AnchorError::Authentication(_) => ErrorKind::AuthenticationError,
            AnchorError::ComplianceRejected(_) => ErrorKind::ComplianceRejected,
            AnchorError::Unavailable(_) => ErrorKind::AnchorUnavailable,
            AnchorError::InvalidOperation(_) => ErrorKind::InvalidOperation,
            AnchorError::Protocol(_) | AnchorError::MissingEndpoint(_) => ErrorKind::Internal,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.kind().is_retryable()
    }
}

impl From<reqwest::Error> for AnchorError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            AnchorError::Protocol(e.to_string())
        } else {
            // timeouts, refused connections, TLS and body read failures
            AnchorError::Unavailable(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(
            AnchorError::Authentication("expired".into()).kind(),
            ErrorKind::AuthenticationError
        );
        assert_eq!(
            AnchorError::MissingEndpoint("KYC_SERVER").kind(),
            ErrorKind::Internal
        );
        assert!(AnchorError::Unavailable("timeout".into()).is_retryable());
        assert!(!AnchorError::InvalidOperation("amount".into()).is_retryable());
    }

    #[test]
    fn test_display() {
        let err = AnchorError::MissingEndpoint("TRANSFER_SERVER");
        assert_eq!(err.to_string(), "Anchor does not advertise TRANSFER_SERVER");
    }
}
