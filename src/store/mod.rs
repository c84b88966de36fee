//! Persistence seam
//!
//! Services talk to a [`Store`] so the settlement flow runs unchanged on
//! PostgreSQL ([`PgStore`]) and in memory ([`MemoryStore`]).
//!
//! Writes that guard an invariant are compare-and-swap:
//! `link_session` and `finalize_auth_session` return `false` when the row
//! was already in a different state, and `upsert_kyc` returns the row that
//! won if two submissions race.

pub mod memory;
pub mod postgres;
pub mod schema;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use thiserror::Error;

use crate::auth_session::types::AuthSession;
use crate::core_types::{Role, SessionId, TransferId, UserId};
use crate::error::ErrorKind;
use crate::kyc::types::{KycEntry, NewKycEntry};
use crate::settlement::types::{HostedDeposit, HostedWithdrawal, NewHostedOperation};
use crate::transfer::types::{NewTransfer, Transfer};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Corrupt row in {table}: {detail}")]
    Corrupt { table: &'static str, detail: String },

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::Database(sqlx::Error::RowNotFound) => ErrorKind::NotFound,
            _ => ErrorKind::PersistenceFailure,
        }
    }
}

#[async_trait]
pub trait Store: Send + Sync {
    async fn insert_transfer(&self, new: &NewTransfer) -> Result<Transfer, StoreError>;

    async fn get_transfer(&self, id: TransferId) -> Result<Option<Transfer>, StoreError>;

    /// Set the `role` session link when it is empty or already `session_id`.
    ///
    /// Returns `false` if the transfer is missing or the role is linked to
    /// another session.
    async fn link_session(
        &self,
        transfer_id: TransferId,
        role: Role,
        session_id: SessionId,
    ) -> Result<bool, StoreError>;

    async fn insert_auth_session(
        &self,
        user_id: UserId,
        public_key: &str,
    ) -> Result<AuthSession, StoreError>;

    async fn get_auth_session(&self, id: SessionId) -> Result<Option<AuthSession>, StoreError>;

    /// CAS `pending -> authenticated`, storing `token`.
    ///
    /// Returns `false` if the session is missing or already authenticated.
    async fn finalize_auth_session(&self, id: SessionId, token: &str) -> Result<bool, StoreError>;

    async fn find_kyc(
        &self,
        auth_session_id: SessionId,
        user_id: UserId,
    ) -> Result<Option<KycEntry>, StoreError>;

    /// Insert the entry, or return the existing one for the same
    /// `(auth_session_id, user_id)`. An existing `sep12_id` is never replaced.
    async fn upsert_kyc(&self, new: &NewKycEntry) -> Result<KycEntry, StoreError>;

    async fn insert_hosted_deposit(
        &self,
        new: &NewHostedOperation,
    ) -> Result<HostedDeposit, StoreError>;

    async fn insert_hosted_withdrawal(
        &self,
        new: &NewHostedOperation,
        dest: &str,
    ) -> Result<HostedWithdrawal, StoreError>;

    async fn list_hosted_deposits(
        &self,
        transfer_id: TransferId,
    ) -> Result<Vec<HostedDeposit>, StoreError>;

    async fn list_hosted_withdrawals(
        &self,
        transfer_id: TransferId,
    ) -> Result<Vec<HostedWithdrawal>, StoreError>;

    async fn health_check(&self) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_kind() {
        assert_eq!(
            StoreError::Database(sqlx::Error::RowNotFound).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            StoreError::Unavailable("down".into()).kind(),
            ErrorKind::PersistenceFailure
        );
        assert_eq!(
            StoreError::Corrupt {
                table: "kyc_tb",
                detail: "bad status".into()
            }
            .kind(),
            ErrorKind::PersistenceFailure
        );
    }
}
