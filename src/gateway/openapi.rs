//! OpenAPI / Swagger UI documentation
//!
//! - Swagger UI: `http://localhost:8080/docs`
//! - OpenAPI JSON: `http://localhost:8080/api-docs/openapi.json`

use utoipa::OpenApi;

use crate::anchor::{
    AnchorOperation, ChallengeTransaction, FileUploadConfig, KycRequirements, UploadRequestConfig,
};
use crate::auth_session::{AuthSession, SessionState};
use crate::core_types::{Currency, Role};
use crate::gateway::types::{
    CreateSessionRequest, CreateTransferRequest, FinalizeSessionRequest, HealthResponse,
    LinkSessionRequest, SendTransactionRequest, SignedChallengeRequest, SubmitKycRequest,
    WithdrawRequest,
};
use crate::horizon::SubmissionResult;
use crate::kyc::{KycEntry, KycStatus};
use crate::settlement::{
    DepositReceipt, HostedDeposit, HostedWithdrawal, SettlementHistory, WithdrawalReceipt,
};
use crate::transfer::Transfer;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Anchor Remit Settlement API",
        version = "1.0.0",
        description = "Cross-border transfers settled through a Stellar anchor (SEP-6, SEP-10, SEP-12, SEP-31).",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "Development"),
    ),
    paths(
        crate::gateway::handlers::health_check,
        crate::gateway::handlers::create_transfer,
        crate::gateway::handlers::get_transfer,
        crate::gateway::handlers::get_challenge,
        crate::gateway::handlers::create_session,
        crate::gateway::handlers::get_session,
        crate::gateway::handlers::finalize_session,
        crate::gateway::handlers::submit_signed_challenge,
        crate::gateway::handlers::link_session,
        crate::gateway::handlers::submit_kyc,
        crate::gateway::handlers::get_kyc,
        crate::gateway::handlers::get_kyc_upload_config,
        crate::gateway::handlers::get_kyc_requirements,
        crate::gateway::handlers::deposit,
        crate::gateway::handlers::withdraw,
        crate::gateway::handlers::get_settlements,
        crate::gateway::handlers::send_transaction,
    ),
    components(
        schemas(
            HealthResponse,
            Role,
            Currency,
            Transfer,
            CreateTransferRequest,
            SessionState,
            AuthSession,
            CreateSessionRequest,
            FinalizeSessionRequest,
            SignedChallengeRequest,
            LinkSessionRequest,
            ChallengeTransaction,
            KycStatus,
            KycEntry,
            SubmitKycRequest,
            FileUploadConfig,
            UploadRequestConfig,
            KycRequirements,
            AnchorOperation,
            HostedDeposit,
            HostedWithdrawal,
            DepositReceipt,
            WithdrawalReceipt,
            SettlementHistory,
            WithdrawRequest,
            SendTransactionRequest,
            SubmissionResult,
        )
    ),
    tags(
        (name = "Transfer", description = "Create and read transfers"),
        (name = "Auth", description = "SEP-10 sessions and transfer links"),
        (name = "KYC", description = "SEP-12 customer data and SEP-31 requirements"),
        (name = "Settlement", description = "SEP-6 hosted deposits and withdrawals"),
        (name = "Ledger", description = "Signed transaction submission"),
        (name = "System", description = "Health checks")
    )
)]
pub struct ApiDoc;
