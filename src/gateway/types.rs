//! API envelope, error mapping and request DTOs

use axum::{Json, http::StatusCode};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::anchor::KycFields;
use crate::auth_session::AuthSessionError;
use crate::core_types::{Currency, Role, SessionId, UserId, is_account_id};
use crate::error::ErrorKind;
use crate::horizon::LedgerError;
use crate::kyc::KycError;
use crate::settlement::SettlementError;
use crate::transfer::TransferError;

/// Unified API response wrapper
///
/// - code: 0 = success, non-zero = error code
/// - msg: short message description
/// - error: symbolic error code, e.g. `TRANSFER_NOT_FOUND` (errors only)
/// - data: payload on success
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    #[schema(example = 0)]
    pub code: i32,
    #[schema(example = "ok")]
    pub msg: String,
    #[schema(example = "TRANSFER_NOT_FOUND")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            code: 0,
            msg: "ok".to_string(),
            error: None,
            data: Some(data),
        }
    }

    pub fn error(code: i32, error: &str, msg: impl Into<String>) -> ApiResponse<()> {
        ApiResponse {
            code,
            msg: msg.into(),
            error: Some(error.to_string()),
            data: None,
        }
    }
}

pub type ApiError = (StatusCode, Json<ApiResponse<()>>);
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

pub fn ok<T>(data: T) -> ApiResult<T> {
    Ok(Json(ApiResponse::success(data)))
}

/// Service errors that can be rendered as an API error
pub trait ServiceError: std::fmt::Display {
    fn error_kind(&self) -> ErrorKind;

    /// Symbolic code, more specific than the kind where the module knows better
    fn error_code(&self) -> &'static str {
        self.error_kind().code()
    }
}

impl ServiceError for TransferError {
    fn error_kind(&self) -> ErrorKind {
        self.kind()
    }

    fn error_code(&self) -> &'static str {
        self.code()
    }
}

impl ServiceError for AuthSessionError {
    fn error_kind(&self) -> ErrorKind {
        self.kind()
    }

    fn error_code(&self) -> &'static str {
        self.code()
    }
}

impl ServiceError for KycError {
    fn error_kind(&self) -> ErrorKind {
        self.kind()
    }

    fn error_code(&self) -> &'static str {
        self.code()
    }
}

impl ServiceError for SettlementError {
    fn error_kind(&self) -> ErrorKind {
        self.kind()
    }

    fn error_code(&self) -> &'static str {
        self.code()
    }
}

impl ServiceError for LedgerError {
    fn error_kind(&self) -> ErrorKind {
        self.kind()
    }

    fn error_code(&self) -> &'static str {
        self.code()
    }
}

pub fn error_response(kind: ErrorKind, error: &str, msg: impl Into<String>) -> ApiError {
    let status =
        StatusCode::from_u16(kind.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(ApiResponse::<()>::error(kind.api_code(), error, msg)))
}

/// Map a service error onto status + `ApiResponse` code
pub fn reject<E: ServiceError>(err: E) -> ApiError {
    let kind = err.error_kind();
    let code = err.error_code();
    if kind.http_status() >= 500 {
        tracing::error!(code, error = %err, "Request failed");
    } else {
        tracing::debug!(code, error = %err, "Request rejected");
    }
    error_response(kind, code, err.to_string())
}

pub fn invalid(errors: ValidationErrors) -> ApiError {
    let kind = ErrorKind::InvalidInput;
    error_response(kind, kind.code(), errors.to_string())
}

fn validate_account_id(value: &str) -> Result<(), ValidationError> {
    if is_account_id(value) {
        Ok(())
    } else {
        Err(ValidationError::new("stellar_account_id"))
    }
}

fn validate_positive(value: &Decimal) -> Result<(), ValidationError> {
    if *value > Decimal::ZERO {
        Ok(())
    } else {
        Err(ValidationError::new("positive_amount"))
    }
}

// ============================================================================
// Requests
// ============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateTransferRequest {
    /// Exact decimal amount, string or number
    #[schema(value_type = String, example = "100.00")]
    #[validate(custom(function = "validate_positive"))]
    pub amount: Decimal,
    #[serde(default)]
    pub currency: Currency,
    #[validate(length(min = 1, max = 256))]
    pub recipient_name: String,
    #[validate(length(min = 3, max = 32))]
    pub recipient_phone: String,
}

#[derive(Debug, Deserialize, Validate, IntoParams)]
pub struct ChallengeQuery {
    /// Stellar account id (`G...`)
    #[validate(custom(function = "validate_account_id"))]
    pub account: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateSessionRequest {
    #[validate(range(min = 1))]
    pub user_id: UserId,
    #[schema(example = "GCDNJUBQSX7AJWLJACMJ7I4BC3Z47BQUTMHEICZLE6MU4KQBRYG5JY6B")]
    #[validate(custom(function = "validate_account_id"))]
    pub public_key: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct FinalizeSessionRequest {
    #[validate(length(min = 1))]
    pub token: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SignedChallengeRequest {
    /// Signed base64 XDR envelope
    #[validate(length(min = 1))]
    pub transaction: String,
    #[validate(length(min = 1))]
    pub network_passphrase: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LinkSessionRequest {
    pub session_id: SessionId,
    pub role: Role,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SubmitKycRequest {
    pub role: Role,
    /// SEP-9 fields (`first_name`, `email_address`, ...)
    #[schema(value_type = Object)]
    pub fields: KycFields,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct RoleQuery {
    pub role: Role,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct WithdrawRequest {
    /// Off-chain account the anchor pays out to
    #[validate(length(min = 1, max = 256))]
    pub destination_account: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SendTransactionRequest {
    /// Signed base64 XDR transaction envelope
    #[validate(length(min = 1))]
    pub envelope: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = 1703494800000_i64)]
    pub timestamp_ms: i64,
    pub version: String,
    pub store: String,
    pub anchor: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_status_and_code() {
        let (status, Json(body)) = reject(SettlementError::SessionRequired {
            transfer_id: uuid::Uuid::nil(),
            role: Role::Sender,
        });
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body.code, 2002);
        assert_eq!(body.error.as_deref(), Some("SESSION_REQUIRED"));
        assert!(body.data.is_none());
    }

    #[test]
    fn test_module_code_reaches_response() {
        let (status, Json(body)) = reject(TransferError::TransferNotFound(uuid::Uuid::nil()));
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.code, ErrorKind::NotFound.api_code());
        assert_eq!(body.error.as_deref(), Some("TRANSFER_NOT_FOUND"));

        let (_, Json(body)) = reject(AuthSessionError::SessionNotFound(9));
        assert_eq!(body.error.as_deref(), Some("SESSION_NOT_FOUND"));
    }

    #[test]
    fn test_create_transfer_validation() {
        let req: CreateTransferRequest = serde_json::from_str(
            r#"{"amount": "0", "recipient_name": "", "recipient_phone": "+1555"}"#,
        )
        .unwrap();
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("amount"));
        assert!(fields.contains_key("recipient_name"));
        assert!(!fields.contains_key("recipient_phone"));
    }

    #[test]
    fn test_amount_accepts_string_and_number() {
        let from_str: CreateTransferRequest = serde_json::from_str(
            r#"{"amount": "100.10", "recipient_name": "A", "recipient_phone": "+1555"}"#,
        )
        .unwrap();
        assert_eq!(from_str.amount.to_string(), "100.10");
        assert_eq!(from_str.currency, Currency::USD);
        assert!(from_str.validate().is_ok());
    }

    #[test]
    fn test_session_request_rejects_bad_key() {
        let req = CreateSessionRequest {
            user_id: 1,
            public_key: "GNOPE".into(),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_kyc_request_extra_fields() {
        let req: SubmitKycRequest = serde_json::from_str(
            r#"{"role": "receiver", "fields": {"first_name": "Ana", "mobile_number": "+521"}}"#,
        )
        .unwrap();
        assert_eq!(req.role, Role::Receiver);
        assert_eq!(req.fields.first_name.as_deref(), Some("Ana"));
        assert_eq!(req.fields.extra.get("mobile_number").map(String::as_str), Some("+521"));
    }
}
