//! Shared error taxonomy
//!
//! Every module error maps onto one [`ErrorKind`] so callers can decide on
//! retries without matching module-specific variants. The kind survives
//! from the anchor client up to the HTTP response.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Transfer, session or KYC entry missing
    NotFound,
    /// Operation needs a linked auth session that is absent
    SessionRequired,
    /// Challenge, signature or bearer token rejected
    AuthenticationError,
    /// Anchor rejected KYC fields
    ComplianceRejected,
    /// Transport failure or timeout talking to a remote endpoint
    AnchorUnavailable,
    /// Anchor-side business rule violation
    InvalidOperation,
    /// Local write failed after a successful remote call
    PersistenceFailure,
    KycNotSubmitted,
    SessionAlreadyFinalized,
    RoleAlreadyLinked,
    InvalidInput,
    Internal,
}

impl ErrorKind {
    /// Stable error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::SessionRequired => "SESSION_REQUIRED",
            ErrorKind::AuthenticationError => "AUTHENTICATION_ERROR",
            ErrorKind::ComplianceRejected => "COMPLIANCE_REJECTED",
            ErrorKind::AnchorUnavailable => "ANCHOR_UNAVAILABLE",
            ErrorKind::InvalidOperation => "INVALID_OPERATION",
            ErrorKind::PersistenceFailure => "PERSISTENCE_FAILURE",
            ErrorKind::KycNotSubmitted => "KYC_NOT_SUBMITTED",
            ErrorKind::SessionAlreadyFinalized => "SESSION_ALREADY_FINALIZED",
            ErrorKind::RoleAlreadyLinked => "ROLE_ALREADY_LINKED",
            ErrorKind::InvalidInput => "INVALID_INPUT",
            ErrorKind::Internal => "INTERNAL_ERROR",
        }
    }

    /// Numeric code carried in `ApiResponse::code`
    pub fn api_code(&self) -> i32 {
        match self {
            ErrorKind::InvalidInput => 1001,
            ErrorKind::InvalidOperation => 1002,
            ErrorKind::ComplianceRejected => 1003,
            ErrorKind::AuthenticationError => 2001,
            ErrorKind::SessionRequired => 2002,
            ErrorKind::SessionAlreadyFinalized => 2003,
            ErrorKind::NotFound => 4001,
            ErrorKind::KycNotSubmitted => 4002,
            ErrorKind::RoleAlreadyLinked => 4091,
            ErrorKind::Internal => 5000,
            ErrorKind::AnchorUnavailable => 5001,
            ErrorKind::PersistenceFailure => 5002,
        }
    }

    /// Get HTTP status code suggestion
    pub fn http_status(&self) -> u16 {
        match self {
            ErrorKind::InvalidInput => 400,
            ErrorKind::AuthenticationError => 401,
            ErrorKind::NotFound => 404,
            ErrorKind::SessionAlreadyFinalized | ErrorKind::RoleAlreadyLinked => 409,
            ErrorKind::SessionRequired
            | ErrorKind::KycNotSubmitted
            | ErrorKind::ComplianceRejected
            | ErrorKind::InvalidOperation => 422,
            ErrorKind::Internal | ErrorKind::PersistenceFailure => 500,
            ErrorKind::AnchorUnavailable => 503,
        }
    }

    /// Only transport-level failures are worth retrying unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::AnchorUnavailable)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
