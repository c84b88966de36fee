//! In-process anchor
//!
//! Behaves like a permissive test anchor: any challenge signed with the
//! `signed:` prefix is accepted, customers get sequential ids, and every
//! deposit/withdrawal is accepted. Individual flows can be switched to fail
//! to exercise error paths.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use super::AnchorClient;
use super::error::AnchorError;
use super::types::{
    AnchorOperation, ChallengeTransaction, ExchangeRequest, FileUploadConfig, KycFields,
    KycRequirements,
};
use crate::core_types::Role;

pub const FAKE_NETWORK_PASSPHRASE: &str = "Test SDF Network ; September 2015";
pub const SIGNED_PREFIX: &str = "signed:";

pub struct FakeAnchor {
    home_domain: String,
    next_id: AtomicU64,
    /// token -> account the challenge was issued for
    tokens: Mutex<HashMap<String, String>>,
    /// customer id -> last fields received
    customers: Mutex<HashMap<String, KycFields>>,
    deposits: Mutex<Vec<ExchangeRequest>>,
    withdrawals: Mutex<Vec<ExchangeRequest>>,
    kyc_count: AtomicUsize,
    fail_kyc: Mutex<Option<AnchorError>>,
    fail_deposit: Mutex<Option<AnchorError>>,
    fail_withdrawal: Mutex<Option<AnchorError>>,
    latency: Mutex<Duration>,
}

impl FakeAnchor {
    pub fn new(home_domain: impl Into<String>) -> Self {
        Self {
            home_domain: home_domain.into(),
            next_id: AtomicU64::new(1),
            tokens: Mutex::new(HashMap::new()),
            customers: Mutex::new(HashMap::new()),
            deposits: Mutex::new(Vec::new()),
            withdrawals: Mutex::new(Vec::new()),
            kyc_count: AtomicUsize::new(0),
            fail_kyc: Mutex::new(None),
            fail_deposit: Mutex::new(None),
            fail_withdrawal: Mutex::new(None),
            latency: Mutex::new(Duration::ZERO),
        }
    }

    /// What a wallet would hand back after signing `challenge`.
    pub fn sign(challenge: &ChallengeTransaction) -> String {
        format!("{}{}", SIGNED_PREFIX, challenge.transaction)
    }

    pub fn set_fail_kyc(&self, err: Option<AnchorError>) {
        *lock(&self.fail_kyc) = err;
    }

    pub fn set_fail_deposit(&self, err: Option<AnchorError>) {
        *lock(&self.fail_deposit) = err;
    }

    pub fn set_fail_withdrawal(&self, err: Option<AnchorError>) {
        *lock(&self.fail_withdrawal) = err;
    }

    /// Delay applied before every KYC, deposit and withdrawal response.
    pub fn set_latency(&self, latency: Duration) {
        *lock(&self.latency) = latency;
    }

    /// Register a token directly, skipping the challenge exchange.
    pub fn issue_token(&self, account: &str) -> String {
        let token = format!("fake-token-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        lock(&self.tokens).insert(token.clone(), account.to_string());
        token
    }

    pub fn kyc_count(&self) -> usize {
        self.kyc_count.load(Ordering::SeqCst)
    }

    pub fn customer_count(&self) -> usize {
        lock(&self.customers).len()
    }

    pub fn customer(&self, id: &str) -> Option<KycFields> {
        lock(&self.customers).get(id).cloned()
    }

    pub fn deposits(&self) -> Vec<ExchangeRequest> {
        lock(&self.deposits).clone()
    }

    pub fn withdrawals(&self) -> Vec<ExchangeRequest> {
        lock(&self.withdrawals).clone()
    }

    fn next_id(&self, prefix: &str) -> String {
        format!("{}-{}", prefix, self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    fn authorize(&self, token: &str) -> Result<(), AnchorError> {
        if lock(&self.tokens).contains_key(token) {
            Ok(())
        } else {
            Err(AnchorError::Authentication("Unknown bearer token".to_string()))
        }
    }

    async fn simulate_latency(&self) {
        let latency = *lock(&self.latency);
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
    }
}

/// Recovers the data of a poisoned lock.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl AnchorClient for FakeAnchor {
    fn home_domain(&self) -> &str {
        &self.home_domain
    }

    async fn get_challenge(&self, public_key: &str) -> Result<ChallengeTransaction, AnchorError> {
        Ok(ChallengeTransaction {
            transaction: format!("challenge:{}", public_key),
            network_passphrase: FAKE_NETWORK_PASSPHRASE.to_string(),
        })
    }

    async fn submit_signed_challenge(
        &self,
        signed_envelope: &str,
        network_passphrase: &str,
    ) -> Result<String, AnchorError> {
        if network_passphrase != FAKE_NETWORK_PASSPHRASE {
            return Err(AnchorError::Authentication(
                "Network passphrase mismatch".to_string(),
            ));
        }
        let account = signed_envelope
            .strip_prefix(SIGNED_PREFIX)
            .and_then(|rest| rest.strip_prefix("challenge:"))
            .ok_or_else(|| AnchorError::Authentication("Challenge not signed".to_string()))?;
        Ok(self.issue_token(account))
    }

    async fn submit_kyc_fields(
        &self,
        token: &str,
        fields: &KycFields,
    ) -> Result<String, AnchorError> {
        self.simulate_latency().await;
        self.authorize(token)?;
        self.kyc_count.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = lock(&self.fail_kyc).clone() {
            return Err(err);
        }

        let mut customers = lock(&self.customers);
        let id = match &fields.id {
            Some(id) if customers.contains_key(id) => id.clone(),
            Some(id) => {
                return Err(AnchorError::ComplianceRejected(format!(
                    "Unknown customer id {}",
                    id
                )));
            }
            None => self.next_id("customer"),
        };
        customers.insert(id.clone(), fields.clone());
        Ok(id)
    }

    async fn initiate_deposit(
        &self,
        token: &str,
        request: &ExchangeRequest,
    ) -> Result<AnchorOperation, AnchorError> {
        self.simulate_latency().await;
        self.authorize(token)?;
        if let Some(err) = lock(&self.fail_deposit).clone() {
            return Err(err);
        }
        lock(&self.deposits).push(request.clone());
        Ok(AnchorOperation {
            id: self.next_id("deposit"),
            how: Some("Wire funds to the account in instructions".to_string()),
            instructions: Some(serde_json::json!({
                "organization.bank_number": { "value": "121122676", "description": "routing number" },
                "organization.bank_account_number": { "value": "13719713158835300", "description": "account number" }
            })),
            account_id: None,
            memo_type: None,
            memo: None,
            eta: Some(3600),
            extra_info: None,
        })
    }

    async fn initiate_withdrawal(
        &self,
        token: &str,
        request: &ExchangeRequest,
    ) -> Result<AnchorOperation, AnchorError> {
        self.simulate_latency().await;
        self.authorize(token)?;
        if let Some(err) = lock(&self.fail_withdrawal).clone() {
            return Err(err);
        }
        lock(&self.withdrawals).push(request.clone());
        let id = self.next_id("withdrawal");
        Ok(AnchorOperation {
            memo: Some(id.clone()),
            id,
            how: None,
            instructions: None,
            account_id: Some(format!("G{}", "A".repeat(55))),
            memo_type: Some("text".to_string()),
            eta: Some(600),
            extra_info: None,
        })
    }

    async fn get_kyc_file_upload_config(
        &self,
        token: &str,
    ) -> Result<FileUploadConfig, AnchorError> {
        self.authorize(token)?;
        Ok(FileUploadConfig::for_customer_endpoint(
            &format!("https://{}/sep12", self.home_domain),
            token,
        ))
    }

    async fn get_kyc_requirements(&self, role: Role) -> Result<KycRequirements, AnchorError> {
        let mut requirements = KycRequirements::default();
        let (name, description) = match role {
            Role::Sender => ("sep31-sender", "Senders identified by name and email"),
            Role::Receiver => ("sep31-receiver", "Receivers with a bank account"),
        };
        requirements
            .types
            .insert(name.to_string(), description.to_string());
        Ok(requirements)
    }
}
