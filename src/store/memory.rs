//! In-memory store
//!
//! Same semantics as [`super::PgStore`], one mutex over all tables. Used by
//! tests and the offline mode. Hosted-operation writes can be made to fail
//! to exercise the "anchor accepted, local write lost" path.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use uuid::Uuid;

use super::{Store, StoreError};
use crate::auth_session::types::{AuthSession, SessionState};
use crate::core_types::{Role, SessionId, TransferId, UserId};
use crate::kyc::types::{KycEntry, NewKycEntry};
use crate::settlement::types::{HostedDeposit, HostedWithdrawal, NewHostedOperation};
use crate::transfer::types::{NewTransfer, Transfer};

#[derive(Default)]
struct Tables {
    transfers: BTreeMap<TransferId, Transfer>,
    sessions: BTreeMap<SessionId, AuthSession>,
    kyc: Vec<KycEntry>,
    deposits: Vec<HostedDeposit>,
    withdrawals: Vec<HostedWithdrawal>,
    next_session_id: SessionId,
    next_row_id: i64,
}

impl Tables {
    fn next_row_id(&mut self) -> i64 {
        self.next_row_id += 1;
        self.next_row_id
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    fail_hosted_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make hosted deposit/withdrawal inserts fail with `Unavailable`
    pub fn set_fail_hosted_writes(&self, fail: bool) {
        self.fail_hosted_writes.store(fail, Ordering::SeqCst);
    }

    pub fn kyc_entry_count(&self) -> usize {
        self.lock().map(|t| t.kyc.len()).unwrap_or(0)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Tables>, StoreError> {
        self.tables
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".into()))
    }

    fn check_hosted_writes(&self) -> Result<(), StoreError> {
        if self.fail_hosted_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("hosted writes disabled".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_transfer(&self, new: &NewTransfer) -> Result<Transfer, StoreError> {
        let transfer = Transfer {
            id: Uuid::new_v4(),
            amount: new.amount,
            currency: new.currency,
            recipient_name: new.recipient_name.clone(),
            recipient_phone: new.recipient_phone.clone(),
            sender_auth_session_id: None,
            receiver_auth_session_id: None,
            created_at: Utc::now(),
        };
        self.lock()?.transfers.insert(transfer.id, transfer.clone());
        Ok(transfer)
    }

    async fn get_transfer(&self, id: TransferId) -> Result<Option<Transfer>, StoreError> {
        Ok(self.lock()?.transfers.get(&id).cloned())
    }

    async fn link_session(
        &self,
        transfer_id: TransferId,
        role: Role,
        session_id: SessionId,
    ) -> Result<bool, StoreError> {
        let mut tables = self.lock()?;
        let Some(transfer) = tables.transfers.get_mut(&transfer_id) else {
            return Ok(false);
        };
        let slot = match role {
            Role::Sender => &mut transfer.sender_auth_session_id,
            Role::Receiver => &mut transfer.receiver_auth_session_id,
        };
        match *slot {
            Some(existing) => Ok(existing == session_id),
            None => {
                *slot = Some(session_id);
                Ok(true)
            }
        }
    }

    async fn insert_auth_session(
        &self,
        user_id: UserId,
        public_key: &str,
    ) -> Result<AuthSession, StoreError> {
        let mut tables = self.lock()?;
        tables.next_session_id += 1;
        let now = Utc::now();
        let session = AuthSession {
            id: tables.next_session_id,
            user_id,
            public_key: public_key.to_string(),
            token: None,
            state: SessionState::Pending,
            created_at: now,
            updated_at: now,
        };
        tables.sessions.insert(session.id, session.clone());
        Ok(session)
    }

    async fn get_auth_session(&self, id: SessionId) -> Result<Option<AuthSession>, StoreError> {
        Ok(self.lock()?.sessions.get(&id).cloned())
    }

    async fn finalize_auth_session(&self, id: SessionId, token: &str) -> Result<bool, StoreError> {
        let mut tables = self.lock()?;
        match tables.sessions.get_mut(&id) {
            Some(session) if session.state == SessionState::Pending => {
                session.token = Some(token.to_string());
                session.state = SessionState::Authenticated;
                session.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn find_kyc(
        &self,
        auth_session_id: SessionId,
        user_id: UserId,
    ) -> Result<Option<KycEntry>, StoreError> {
        Ok(self
            .lock()?
            .kyc
            .iter()
            .find(|e| e.auth_session_id == auth_session_id && e.user_id == user_id)
            .cloned())
    }

    async fn upsert_kyc(&self, new: &NewKycEntry) -> Result<KycEntry, StoreError> {
        let mut tables = self.lock()?;
        if let Some(existing) = tables
            .kyc
            .iter_mut()
            .find(|e| e.auth_session_id == new.auth_session_id && e.user_id == new.user_id)
        {
            if existing.sep12_id.is_none() {
                existing.sep12_id = Some(new.sep12_id.clone());
            }
            return Ok(existing.clone());
        }

        let entry = KycEntry {
            id: tables.next_row_id(),
            user_id: new.user_id,
            auth_session_id: new.auth_session_id,
            sep12_id: Some(new.sep12_id.clone()),
            status: new.status,
            created_at: Utc::now(),
        };
        tables.kyc.push(entry.clone());
        Ok(entry)
    }

    async fn insert_hosted_deposit(
        &self,
        new: &NewHostedOperation,
    ) -> Result<HostedDeposit, StoreError> {
        self.check_hosted_writes()?;
        let mut tables = self.lock()?;
        let deposit = HostedDeposit {
            id: tables.next_row_id(),
            transfer_id: new.transfer_id,
            user_id: new.user_id,
            amount: new.amount,
            source_asset: new.source_asset.clone(),
            destination_asset: new.destination_asset.clone(),
            method: new.method.clone(),
            sep6_id: new.sep6_id.clone(),
            created_at: Utc::now(),
        };
        tables.deposits.push(deposit.clone());
        Ok(deposit)
    }

    async fn insert_hosted_withdrawal(
        &self,
        new: &NewHostedOperation,
        dest: &str,
    ) -> Result<HostedWithdrawal, StoreError> {
        self.check_hosted_writes()?;
        let mut tables = self.lock()?;
        let withdrawal = HostedWithdrawal {
            id: tables.next_row_id(),
            transfer_id: new.transfer_id,
            user_id: new.user_id,
            amount: new.amount,
            source_asset: new.source_asset.clone(),
            destination_asset: new.destination_asset.clone(),
            method: new.method.clone(),
            dest: dest.to_string(),
            sep6_id: new.sep6_id.clone(),
            created_at: Utc::now(),
        };
        tables.withdrawals.push(withdrawal.clone());
        Ok(withdrawal)
    }

    async fn list_hosted_deposits(
        &self,
        transfer_id: TransferId,
    ) -> Result<Vec<HostedDeposit>, StoreError> {
        Ok(self
            .lock()?
            .deposits
            .iter()
            .filter(|d| d.transfer_id == transfer_id)
            .cloned()
            .collect())
    }

    async fn list_hosted_withdrawals(
        &self,
        transfer_id: TransferId,
    ) -> Result<Vec<HostedWithdrawal>, StoreError> {
        Ok(self
            .lock()?
            .withdrawals
            .iter()
            .filter(|w| w.transfer_id == transfer_id)
            .cloned()
            .collect())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        self.lock().map(|_| ())
    }
}
