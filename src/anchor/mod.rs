//! Anchor Protocol Client
//!
//! Typed access to the Stellar anchor flows the settlement core depends on:
//!
//! | Flow                      | SEP | Endpoint                              |
//! |---------------------------|-----|---------------------------------------|
//! | challenge / token         | 10  | `WEB_AUTH_ENDPOINT`                   |
//! | customer fields, uploads  | 12  | `KYC_SERVER/customer`                 |
//! | deposit / withdrawal      | 6   | `TRANSFER_SERVER/{deposit,withdraw}-exchange` |
//! | sender/receiver KYC types | 31  | `DIRECT_PAYMENT_SERVER/info`          |
//!
//! Every call is a single attempt bounded by the configured timeout.
//! Retrying is the caller's decision, guided by [`AnchorError::is_retryable`].

pub mod discovery;
pub mod error;
pub mod fake;
pub mod http;
pub mod types;

pub use discovery::AnchorEndpoints;
pub use error::AnchorError;
pub use fake::FakeAnchor;
pub use http::HttpAnchorClient;
pub use types::{
    AnchorOperation, ChallengeTransaction, ExchangeRequest, FileUploadConfig, KycFields,
    KycRequirements, UploadRequestConfig,
};

use async_trait::async_trait;

use crate::core_types::Role;

/// Anchor protocol operations
///
/// Injected into every service as `Arc<dyn AnchorClient>` so tests can swap
/// in [`FakeAnchor`].
#[async_trait]
pub trait AnchorClient: Send + Sync {
    /// Home domain the client talks to (for logging)
    fn home_domain(&self) -> &str;

    /// Request a signable challenge for `public_key`. No side effects.
    async fn get_challenge(&self, public_key: &str) -> Result<ChallengeTransaction, AnchorError>;

    /// Exchange a signed challenge envelope for a bearer token.
    async fn submit_signed_challenge(
        &self,
        signed_envelope: &str,
        network_passphrase: &str,
    ) -> Result<String, AnchorError>;

    /// Create or update a customer. Returns the anchor customer id.
    ///
    /// When `fields.id` is set the anchor treats the call as an update.
    async fn submit_kyc_fields(&self, token: &str, fields: &KycFields)
    -> Result<String, AnchorError>;

    async fn initiate_deposit(
        &self,
        token: &str,
        request: &ExchangeRequest,
    ) -> Result<AnchorOperation, AnchorError>;

    async fn initiate_withdrawal(
        &self,
        token: &str,
        request: &ExchangeRequest,
    ) -> Result<AnchorOperation, AnchorError>;

    /// Upload target for supporting documents. Pure query.
    async fn get_kyc_file_upload_config(&self, token: &str)
    -> Result<FileUploadConfig, AnchorError>;

    /// Customer types the anchor requires for one side of a payment.
    async fn get_kyc_requirements(&self, role: Role) -> Result<KycRequirements, AnchorError>;
}
