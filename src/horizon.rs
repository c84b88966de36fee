//! Ledger submission
//!
//! Signing happens in the wallet; this side only forwards a signed
//! transaction envelope (base64 XDR) to Horizon and reports the outcome.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use thiserror::Error;
use utoipa::ToSchema;

use crate::config::LedgerConfig;
use crate::error::ErrorKind;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SubmissionResult {
    pub hash: String,
    #[serde(default)]
    pub ledger: Option<i64>,
    #[serde(default = "default_successful")]
    pub successful: bool,
}

fn default_successful() -> bool {
    true
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Empty transaction envelope")]
    EmptyEnvelope,

    #[error("Transaction rejected: {0}")]
    Rejected(String),

    #[error("Horizon unavailable: {0}")]
    Unavailable(String),

    #[error("Unexpected Horizon response: {0}")]
    Protocol(String),
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::EmptyEnvelope => ErrorKind::InvalidInput,
            LedgerError::Rejected(_) => ErrorKind::InvalidOperation,
            LedgerError::Unavailable(_) => ErrorKind::AnchorUnavailable,
            LedgerError::Protocol(_) => ErrorKind::Internal,
        }
    }

    pub fn code(&self) -> &'static str {
        self.kind().code()
    }

    pub fn http_status(&self) -> u16 {
        self.kind().http_status()
    }
}

impl From<reqwest::Error> for LedgerError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            LedgerError::Protocol(e.to_string())
        } else {
            LedgerError::Unavailable(e.to_string())
        }
    }
}

/// Opaque "submit a signed envelope" capability
#[async_trait]
pub trait LedgerSubmitter: Send + Sync {
    async fn send(&self, envelope: &str) -> Result<SubmissionResult, LedgerError>;
}

/// Horizon problem document (`application/problem+json`)
#[derive(Debug, Default, Deserialize)]
struct HorizonProblem {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    extras: Option<HorizonExtras>,
}

#[derive(Debug, Default, Deserialize)]
struct HorizonExtras {
    #[serde(default)]
    result_codes: Option<ResultCodes>,
}

#[derive(Debug, Default, Deserialize)]
struct ResultCodes {
    #[serde(default)]
    transaction: Option<String>,
    #[serde(default)]
    operations: Vec<String>,
}

impl HorizonProblem {
    /// `tx_failed [op_underfunded]` style summary
    fn describe(&self) -> String {
        match self.extras.as_ref().and_then(|e| e.result_codes.as_ref()) {
            Some(codes) => {
                let tx = codes.transaction.as_deref().unwrap_or("unknown");
                if codes.operations.is_empty() {
                    tx.to_string()
                } else {
                    format!("{} [{}]", tx, codes.operations.join(", "))
                }
            }
            None => self
                .title
                .clone()
                .unwrap_or_else(|| "Transaction Failed".to_string()),
        }
    }
}

pub struct HorizonSubmitter {
    client: reqwest::Client,
    horizon_url: String,
}

impl HorizonSubmitter {
    pub fn new(config: &LedgerConfig) -> Result<Self, LedgerError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| LedgerError::Protocol(e.to_string()))?;
        Ok(Self {
            client,
            horizon_url: config.horizon_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl LedgerSubmitter for HorizonSubmitter {
    async fn send(&self, envelope: &str) -> Result<SubmissionResult, LedgerError> {
        if envelope.trim().is_empty() {
            return Err(LedgerError::EmptyEnvelope);
        }

        let response = self
            .client
            .post(format!("{}/transactions", self.horizon_url))
            .form(&[("tx", envelope)])
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            let result: SubmissionResult = response.json().await?;
            tracing::info!(hash = %result.hash, ledger = ?result.ledger, "Transaction submitted");
            return Ok(result);
        }

        let problem: HorizonProblem = match response.json().await {
            Ok(problem) => problem,
            Err(e) => {
                tracing::debug!(status = status.as_u16(), error = %e, "Unreadable Horizon problem body");
                HorizonProblem::default()
            }
        };
        Err(classify(status, &problem))
    }
}

fn classify(status: StatusCode, problem: &HorizonProblem) -> LedgerError {
    match status {
        StatusCode::BAD_REQUEST => LedgerError::Rejected(problem.describe()),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT | StatusCode::TOO_MANY_REQUESTS => {
            LedgerError::Unavailable(format!("{}: {}", status, problem.describe()))
        }
        s if s.is_server_error() => LedgerError::Unavailable(s.to_string()),
        s => LedgerError::Protocol(format!("{}: {}", s, problem.describe())),
    }
}

/// Accepts every non-empty envelope and remembers it. For offline runs and tests.
#[derive(Default)]
pub struct MemoryLedger {
    sequence: AtomicU64,
    submitted: Mutex<Vec<String>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn submitted(&self) -> Vec<String> {
        self.submitted.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl LedgerSubmitter for MemoryLedger {
    async fn send(&self, envelope: &str) -> Result<SubmissionResult, LedgerError> {
        if envelope.trim().is_empty() {
            return Err(LedgerError::EmptyEnvelope);
        }
        let ledger = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        if let Ok(mut submitted) = self.submitted.lock() {
            submitted.push(envelope.to_string());
        }
        Ok(SubmissionResult {
            hash: format!("{:064x}", ledger),
            ledger: Some(ledger as i64),
            successful: true,
        })
    }
}
