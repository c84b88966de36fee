//! HTTP handlers
//!
//! Thin adapters: validate the request, call one service operation, wrap the
//! result in [`ApiResponse`]. Error kinds decide status and code.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use super::state::AppState;
use super::types::{
    ApiResponse, ApiResult, ChallengeQuery, CreateSessionRequest, CreateTransferRequest,
    FinalizeSessionRequest, HealthResponse, LinkSessionRequest, RoleQuery, SendTransactionRequest,
    SignedChallengeRequest, SubmitKycRequest, WithdrawRequest, invalid, ok, reject,
};
use crate::anchor::{ChallengeTransaction, FileUploadConfig, KycRequirements};
use crate::auth_session::AuthSession;
use crate::core_types::SessionId;
use crate::error::ErrorKind;
use crate::horizon::SubmissionResult;
use crate::kyc::KycEntry;
use crate::settlement::{DepositReceipt, SettlementHistory, WithdrawalReceipt};
use crate::transfer::{NewTransfer, Transfer};

/// Health check
///
/// - Healthy: 200 + {code: 0, data: {timestamp_ms, version, store}}
/// - Store unreachable: 503
#[utoipa::path(
    get,
    path = "/api/v1/health",
    responses(
        (status = 200, description = "Service healthy", body = HealthResponse),
        (status = 503, description = "Store unavailable")
    ),
    tag = "System"
)]
pub async fn health_check(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<ApiResponse<HealthResponse>>) {
    match state.store.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse::success(HealthResponse {
                timestamp_ms: chrono::Utc::now().timestamp_millis(),
                version: env!("GIT_HASH").to_string(),
                store: state.store_kind.to_string(),
                anchor: state.anchor_domain.clone(),
            })),
        ),
        Err(e) => {
            tracing::error!("[HEALTH] store check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse {
                    code: ErrorKind::PersistenceFailure.api_code(),
                    msg: "unavailable".to_string(),
                    error: Some(ErrorKind::PersistenceFailure.code().to_string()),
                    data: None,
                }),
            )
        }
    }
}

// ============================================================================
// Transfers
// ============================================================================

#[utoipa::path(
    post,
    path = "/api/v1/transfers",
    request_body = CreateTransferRequest,
    responses(
        (status = 200, description = "Transfer created", body = Transfer),
        (status = 400, description = "Invalid amount or recipient")
    ),
    tag = "Transfer"
)]
pub async fn create_transfer(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateTransferRequest>,
) -> ApiResult<Transfer> {
    req.validate().map_err(invalid)?;
    let transfer = state
        .transfers
        .create(NewTransfer {
            amount: req.amount,
            currency: req.currency,
            recipient_name: req.recipient_name,
            recipient_phone: req.recipient_phone,
        })
        .await
        .map_err(reject)?;
    ok(transfer)
}

#[utoipa::path(
    get,
    path = "/api/v1/transfers/{transfer_id}",
    params(("transfer_id" = String, Path, description = "Transfer UUID")),
    responses(
        (status = 200, description = "Transfer", body = Transfer),
        (status = 404, description = "Transfer not found")
    ),
    tag = "Transfer"
)]
pub async fn get_transfer(
    State(state): State<Arc<AppState>>,
    Path(transfer_id): Path<Uuid>,
) -> ApiResult<Transfer> {
    ok(state.transfers.get(transfer_id).await.map_err(reject)?)
}

// ============================================================================
// Auth sessions (SEP-10)
// ============================================================================

#[utoipa::path(
    get,
    path = "/api/v1/auth/challenge",
    params(ChallengeQuery),
    responses(
        (status = 200, description = "Challenge to sign", body = ChallengeTransaction),
        (status = 400, description = "Malformed account id"),
        (status = 503, description = "Anchor unavailable")
    ),
    tag = "Auth"
)]
pub async fn get_challenge(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ChallengeQuery>,
) -> ApiResult<ChallengeTransaction> {
    query.validate().map_err(invalid)?;
    ok(state
        .sessions
        .request_challenge(&query.account)
        .await
        .map_err(reject)?)
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/sessions",
    request_body = CreateSessionRequest,
    responses(
        (status = 200, description = "Pending session created", body = AuthSession),
        (status = 400, description = "Malformed public key")
    ),
    tag = "Auth"
)]
pub async fn create_session(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateSessionRequest>,
) -> ApiResult<AuthSession> {
    req.validate().map_err(invalid)?;
    ok(state
        .sessions
        .create_session(req.user_id, &req.public_key)
        .await
        .map_err(reject)?)
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/sessions/{session_id}",
    params(("session_id" = i64, Path, description = "Auth session id")),
    responses(
        (status = 200, description = "Session (token omitted)", body = AuthSession),
        (status = 404, description = "Session not found")
    ),
    tag = "Auth"
)]
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<SessionId>,
) -> ApiResult<AuthSession> {
    ok(state.sessions.get_session(session_id).await.map_err(reject)?)
}

/// Attach a token obtained out of band
#[utoipa::path(
    post,
    path = "/api/v1/auth/sessions/{session_id}/finalize",
    params(("session_id" = i64, Path, description = "Auth session id")),
    request_body = FinalizeSessionRequest,
    responses(
        (status = 200, description = "Session authenticated", body = AuthSession),
        (status = 404, description = "Session not found"),
        (status = 409, description = "Session already authenticated")
    ),
    tag = "Auth"
)]
pub async fn finalize_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<SessionId>,
    Json(req): Json<FinalizeSessionRequest>,
) -> ApiResult<AuthSession> {
    req.validate().map_err(invalid)?;
    ok(state
        .sessions
        .finalize_session(session_id, &req.token)
        .await
        .map_err(reject)?)
}

/// Submit the signed challenge; the issued token finalizes the session
#[utoipa::path(
    post,
    path = "/api/v1/auth/sessions/{session_id}/challenge",
    params(("session_id" = i64, Path, description = "Auth session id")),
    request_body = SignedChallengeRequest,
    responses(
        (status = 200, description = "Session authenticated", body = AuthSession),
        (status = 401, description = "Challenge rejected by the anchor"),
        (status = 409, description = "Session already authenticated")
    ),
    tag = "Auth"
)]
pub async fn submit_signed_challenge(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<SessionId>,
    Json(req): Json<SignedChallengeRequest>,
) -> ApiResult<AuthSession> {
    req.validate().map_err(invalid)?;
    ok(state
        .sessions
        .complete_challenge(session_id, &req.transaction, &req.network_passphrase)
        .await
        .map_err(reject)?)
}

#[utoipa::path(
    post,
    path = "/api/v1/transfers/{transfer_id}/sessions",
    params(("transfer_id" = String, Path, description = "Transfer UUID")),
    request_body = LinkSessionRequest,
    responses(
        (status = 200, description = "Linked", body = Transfer),
        (status = 404, description = "Transfer or session not found"),
        (status = 409, description = "Role already linked to another session")
    ),
    tag = "Auth"
)]
pub async fn link_session(
    State(state): State<Arc<AppState>>,
    Path(transfer_id): Path<Uuid>,
    Json(req): Json<LinkSessionRequest>,
) -> ApiResult<Transfer> {
    state
        .sessions
        .link_to_transfer(transfer_id, req.session_id, req.role)
        .await
        .map_err(reject)?;
    ok(state.transfers.get(transfer_id).await.map_err(reject)?)
}

// ============================================================================
// KYC (SEP-12 / SEP-31)
// ============================================================================

#[utoipa::path(
    post,
    path = "/api/v1/transfers/{transfer_id}/kyc",
    params(("transfer_id" = String, Path, description = "Transfer UUID")),
    request_body = SubmitKycRequest,
    responses(
        (status = 200, description = "KYC submitted or updated", body = KycEntry),
        (status = 422, description = "No session for role, or rejected by the anchor")
    ),
    tag = "KYC"
)]
pub async fn submit_kyc(
    State(state): State<Arc<AppState>>,
    Path(transfer_id): Path<Uuid>,
    Json(req): Json<SubmitKycRequest>,
) -> ApiResult<KycEntry> {
    ok(state
        .kyc
        .submit_kyc(transfer_id, req.role, req.fields)
        .await
        .map_err(reject)?)
}

#[utoipa::path(
    get,
    path = "/api/v1/transfers/{transfer_id}/kyc",
    params(("transfer_id" = String, Path, description = "Transfer UUID"), RoleQuery),
    responses(
        (status = 200, description = "KYC entry", body = KycEntry),
        (status = 422, description = "Nothing submitted for role")
    ),
    tag = "KYC"
)]
pub async fn get_kyc(
    State(state): State<Arc<AppState>>,
    Path(transfer_id): Path<Uuid>,
    Query(query): Query<RoleQuery>,
) -> ApiResult<KycEntry> {
    ok(state
        .kyc
        .status(transfer_id, query.role)
        .await
        .map_err(reject)?)
}

#[utoipa::path(
    get,
    path = "/api/v1/transfers/{transfer_id}/kyc/upload-config",
    params(("transfer_id" = String, Path, description = "Transfer UUID"), RoleQuery),
    responses(
        (status = 200, description = "Document upload target", body = FileUploadConfig),
        (status = 422, description = "KYC not submitted yet")
    ),
    tag = "KYC"
)]
pub async fn get_kyc_upload_config(
    State(state): State<Arc<AppState>>,
    Path(transfer_id): Path<Uuid>,
    Query(query): Query<RoleQuery>,
) -> ApiResult<FileUploadConfig> {
    ok(state
        .kyc
        .get_file_upload_config(transfer_id, query.role)
        .await
        .map_err(reject)?)
}

#[utoipa::path(
    get,
    path = "/api/v1/kyc/requirements",
    params(RoleQuery),
    responses(
        (status = 200, description = "Customer types required for role", body = KycRequirements),
        (status = 503, description = "Anchor unavailable")
    ),
    tag = "KYC"
)]
pub async fn get_kyc_requirements(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RoleQuery>,
) -> ApiResult<KycRequirements> {
    ok(state.kyc.requirements(query.role).await.map_err(reject)?)
}

// ============================================================================
// Settlement (SEP-6)
// ============================================================================

#[utoipa::path(
    post,
    path = "/api/v1/transfers/{transfer_id}/deposit",
    params(("transfer_id" = String, Path, description = "Transfer UUID")),
    responses(
        (status = 200, description = "Deposit initiated", body = DepositReceipt),
        (status = 422, description = "No sender session, or rejected by the anchor"),
        (status = 500, description = "Anchor accepted but not recorded"),
        (status = 503, description = "Anchor unavailable")
    ),
    tag = "Settlement"
)]
pub async fn deposit(
    State(state): State<Arc<AppState>>,
    Path(transfer_id): Path<Uuid>,
) -> ApiResult<DepositReceipt> {
    ok(state.settlement.deposit(transfer_id).await.map_err(reject)?)
}

#[utoipa::path(
    post,
    path = "/api/v1/transfers/{transfer_id}/withdraw",
    params(("transfer_id" = String, Path, description = "Transfer UUID")),
    request_body = WithdrawRequest,
    responses(
        (status = 200, description = "Withdrawal initiated", body = WithdrawalReceipt),
        (status = 422, description = "No session for role, or rejected by the anchor"),
        (status = 500, description = "Anchor accepted but not recorded"),
        (status = 503, description = "Anchor unavailable")
    ),
    tag = "Settlement"
)]
pub async fn withdraw(
    State(state): State<Arc<AppState>>,
    Path(transfer_id): Path<Uuid>,
    Json(req): Json<WithdrawRequest>,
) -> ApiResult<WithdrawalReceipt> {
    req.validate().map_err(invalid)?;
    ok(state
        .settlement
        .withdraw(transfer_id, &req.destination_account)
        .await
        .map_err(reject)?)
}

#[utoipa::path(
    get,
    path = "/api/v1/transfers/{transfer_id}/settlements",
    params(("transfer_id" = String, Path, description = "Transfer UUID")),
    responses(
        (status = 200, description = "Hosted deposits and withdrawals", body = SettlementHistory),
        (status = 404, description = "Transfer not found")
    ),
    tag = "Settlement"
)]
pub async fn get_settlements(
    State(state): State<Arc<AppState>>,
    Path(transfer_id): Path<Uuid>,
) -> ApiResult<SettlementHistory> {
    ok(state.settlement.history(transfer_id).await.map_err(reject)?)
}

// ============================================================================
// Ledger
// ============================================================================

#[utoipa::path(
    post,
    path = "/api/v1/ledger/transactions",
    request_body = SendTransactionRequest,
    responses(
        (status = 200, description = "Submitted", body = SubmissionResult),
        (status = 422, description = "Rejected by the network"),
        (status = 503, description = "Horizon unavailable")
    ),
    tag = "Ledger"
)]
pub async fn send_transaction(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SendTransactionRequest>,
) -> ApiResult<SubmissionResult> {
    req.validate().map_err(invalid)?;
    ok(state.ledger.send(&req.envelope).await.map_err(reject)?)
}
