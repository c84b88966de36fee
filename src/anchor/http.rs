//! reqwest-backed anchor client
//!
//! Endpoints are either injected through config or discovered lazily from
//! the anchor's `stellar.toml` on first use and cached for the lifetime of
//! the client.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use super::AnchorClient;
use super::discovery::AnchorEndpoints;
use super::error::AnchorError;
use super::types::{
    AnchorOperation, ChallengeTransaction, CustomerIdResponse, ExchangeRequest, FileUploadConfig,
    KycFields, KycRequirements, Sep31Info,
};
use crate::config::AnchorConfig;
use crate::core_types::Role;

/// Which protocol flow a response belongs to. Drives error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Auth,
    Kyc,
    Transfer,
    Info,
}

#[derive(Deserialize)]
struct ChallengeResponse {
    transaction: String,
    network_passphrase: Option<String>,
}

#[derive(Deserialize)]
struct TokenResponse {
    token: String,
}

/// Error body shapes used by SEP servers
#[derive(Deserialize, Default)]
struct AnchorErrorBody {
    error: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
}

pub struct HttpAnchorClient {
    client: reqwest::Client,
    home_domain: String,
    endpoints: OnceCell<AnchorEndpoints>,
}

impl HttpAnchorClient {
    pub fn new(config: &AnchorConfig) -> Result<Self, AnchorError> {
        info!(
            home_domain = %config.home_domain,
            timeout_ms = config.timeout_ms,
            "Initializing anchor client"
        );

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| {
                AnchorError::Unavailable(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            home_domain: config.home_domain.clone(),
            endpoints: OnceCell::new_with(config.endpoints.clone()),
        })
    }

    /// Resolved endpoints, fetching `stellar.toml` on first use.
    pub async fn endpoints(&self) -> Result<&AnchorEndpoints, AnchorError> {
        self.endpoints
            .get_or_try_init(|| async {
                let url = AnchorEndpoints::stellar_toml_url(&self.home_domain);
                debug!(url = %url, "Fetching stellar.toml");
                let response = self.client.get(&url).send().await?;
                let response = check(Flow::Info, response).await?;
                let body = response.text().await?;
                AnchorEndpoints::from_toml(&body)
            })
            .await
    }
}

#[async_trait]
impl AnchorClient for HttpAnchorClient {
    fn home_domain(&self) -> &str {
        &self.home_domain
    }

    async fn get_challenge(&self, public_key: &str) -> Result<ChallengeTransaction, AnchorError> {
        let endpoints = self.endpoints().await?;
        let response = self
            .client
            .get(endpoints.web_auth()?)
            .query(&[
                ("account", public_key),
                ("home_domain", self.home_domain.as_str()),
            ])
            .send()
            .await?;
        let challenge: ChallengeResponse = check(Flow::Auth, response).await?.json().await?;

        let network_passphrase = challenge
            .network_passphrase
            .or_else(|| endpoints.network_passphrase.clone())
            .ok_or_else(|| {
                AnchorError::Protocol("Challenge carries no network passphrase".to_string())
            })?;

        Ok(ChallengeTransaction {
            transaction: challenge.transaction,
            network_passphrase,
        })
    }

    async fn submit_signed_challenge(
        &self,
        signed_envelope: &str,
        network_passphrase: &str,
    ) -> Result<String, AnchorError> {
        let endpoints = self.endpoints().await?;
        if let Some(expected) = &endpoints.network_passphrase
            && expected != network_passphrase
        {
            return Err(AnchorError::Authentication(format!(
                "Challenge signed for '{}' but anchor runs on '{}'",
                network_passphrase, expected
            )));
        }

        let response = self
            .client
            .post(endpoints.web_auth()?)
            .json(&serde_json::json!({ "transaction": signed_envelope }))
            .send()
            .await?;
        let token: TokenResponse = check(Flow::Auth, response).await?.json().await?;
        Ok(token.token)
    }

    async fn submit_kyc_fields(
        &self,
        token: &str,
        fields: &KycFields,
    ) -> Result<String, AnchorError> {
        let endpoints = self.endpoints().await?;
        let url = format!("{}/customer", endpoints.kyc_server()?);
        let response = self
            .client
            .put(&url)
            .bearer_auth(token)
            .json(fields)
            .send()
            .await?;
        let customer: CustomerIdResponse = check(Flow::Kyc, response).await?.json().await?;
        Ok(customer.id)
    }

    async fn initiate_deposit(
        &self,
        token: &str,
        request: &ExchangeRequest,
    ) -> Result<AnchorOperation, AnchorError> {
        let endpoints = self.endpoints().await?;
        let url = format!("{}/deposit-exchange", endpoints.transfer_server()?);
        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .query(request)
            .send()
            .await?;
        Ok(check(Flow::Transfer, response).await?.json().await?)
    }

    async fn initiate_withdrawal(
        &self,
        token: &str,
        request: &ExchangeRequest,
    ) -> Result<AnchorOperation, AnchorError> {
        let endpoints = self.endpoints().await?;
        let url = format!("{}/withdraw-exchange", endpoints.transfer_server()?);
        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .query(request)
            .send()
            .await?;
        Ok(check(Flow::Transfer, response).await?.json().await?)
    }

    async fn get_kyc_file_upload_config(
        &self,
        token: &str,
    ) -> Result<FileUploadConfig, AnchorError> {
        let endpoints = self.endpoints().await?;
        Ok(FileUploadConfig::for_customer_endpoint(
            endpoints.kyc_server()?,
            token,
        ))
    }

    async fn get_kyc_requirements(&self, role: Role) -> Result<KycRequirements, AnchorError> {
        let endpoints = self.endpoints().await?;
        let url = format!("{}/info", endpoints.direct_payment_server()?);
        let response = self.client.get(&url).send().await?;
        let info: Sep31Info = check(Flow::Info, response).await?.json().await?;
        Ok(info.requirements_for(role))
    }
}

/// Pass successful responses through, map everything else onto the taxonomy.
async fn check(flow: Flow, response: reqwest::Response) -> Result<reqwest::Response, AnchorError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => {
            debug!(?flow, status = status.as_u16(), error = %e, "Failed to read anchor error body");
            String::new()
        }
    };
    let err = classify(flow, status, parse_error_body(flow, &body));
    warn!(?flow, status = status.as_u16(), error = %err, "Anchor call failed");
    Err(err)
}

/// Plain-text and empty bodies are common on proxies; they classify by status alone.
fn parse_error_body(flow: Flow, body: &str) -> AnchorErrorBody {
    match serde_json::from_str(body) {
        Ok(parsed) => parsed,
        Err(e) => {
            debug!(?flow, error = %e, body, "Anchor error body is not JSON");
            AnchorErrorBody::default()
        }
    }
}

fn classify(flow: Flow, status: StatusCode, body: AnchorErrorBody) -> AnchorError {
    let message = body
        .error
        .clone()
        .or_else(|| body.kind.clone())
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));

    match status {
        StatusCode::UNAUTHORIZED => AnchorError::Authentication(message),
        // SEP-6 uses 403 both for bad tokens and for "customer info needed"
        StatusCode::FORBIDDEN => match body.kind.as_deref() {
            Some("authentication_required") | None => AnchorError::Authentication(message),
            Some(_) if flow == Flow::Transfer => AnchorError::InvalidOperation(message),
            Some(_) => AnchorError::Authentication(message),
        },
        StatusCode::REQUEST_TIMEOUT | StatusCode::TOO_MANY_REQUESTS => {
            AnchorError::Unavailable(message)
        }
        s if s.is_server_error() => AnchorError::Unavailable(message),
        s if s.is_client_error() => match flow {
            Flow::Auth => AnchorError::Authentication(message),
            Flow::Kyc => AnchorError::ComplianceRejected(message),
            Flow::Transfer => AnchorError::InvalidOperation(message),
            Flow::Info => AnchorError::Protocol(message),
        },
        _ => AnchorError::Protocol(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(error: Option<&str>, kind: Option<&str>) -> AnchorErrorBody {
        AnchorErrorBody {
            error: error.map(String::from),
            kind: kind.map(String::from),
        }
    }

    #[test]
    fn test_error_body_fallbacks() {
        let parsed = parse_error_body(Flow::Kyc, r#"{"error": "id not found", "type": "x"}"#);
        assert_eq!(parsed.error.as_deref(), Some("id not found"));
        assert_eq!(parsed.kind.as_deref(), Some("x"));

        for raw in ["", "maintenance", "<html>502</html>"] {
            let parsed = parse_error_body(Flow::Transfer, raw);
            assert!(parsed.error.is_none() && parsed.kind.is_none());
            let err = classify(Flow::Transfer, StatusCode::BAD_GATEWAY, parsed);
            assert_eq!(err, AnchorError::Unavailable("HTTP 502".into()));
        }
    }

    #[test]
    fn test_classify_bad_request_per_flow() {
        let err = classify(
            Flow::Kyc,
            StatusCode::BAD_REQUEST,
            body(Some("email_address invalid"), None),
        );
        assert_eq!(
            err,
            AnchorError::ComplianceRejected("email_address invalid".into())
        );

        let err = classify(
            Flow::Transfer,
            StatusCode::BAD_REQUEST,
            body(Some("amount out of bounds"), None),
        );
        assert!(matches!(err, AnchorError::InvalidOperation(_)));

        let err = classify(Flow::Auth, StatusCode::BAD_REQUEST, body(None, None));
        assert_eq!(err, AnchorError::Authentication("HTTP 400".into()));
    }

    #[test]
    fn test_classify_forbidden() {
        let err = classify(
            Flow::Transfer,
            StatusCode::FORBIDDEN,
            body(None, Some("non_interactive_customer_info_needed")),
        );
        assert!(matches!(err, AnchorError::InvalidOperation(_)));

        let err = classify(
            Flow::Transfer,
            StatusCode::FORBIDDEN,
            body(None, Some("authentication_required")),
        );
        assert!(matches!(err, AnchorError::Authentication(_)));
    }

    #[test]
    fn test_classify_unavailable() {
        for status in [
            StatusCode::BAD_GATEWAY,
            StatusCode::SERVICE_UNAVAILABLE,
            StatusCode::TOO_MANY_REQUESTS,
        ] {
            let err = classify(Flow::Transfer, status, body(None, None));
            assert!(err.is_retryable(), "{} should be retryable", status);
        }
    }
}
