use std::sync::Arc;

use super::error::AuthSessionError;
use super::types::{AuthSession, SessionState};
use crate::anchor::{AnchorClient, ChallengeTransaction};
use crate::core_types::{Role, SessionId, TransferId, UserId, is_account_id};
use crate::store::Store;

/// Owns the auth session lifecycle and the transfer <-> session links
pub struct AuthSessionManager {
    store: Arc<dyn Store>,
    anchor: Arc<dyn AnchorClient>,
}

impl AuthSessionManager {
    pub fn new(store: Arc<dyn Store>, anchor: Arc<dyn AnchorClient>) -> Self {
        Self { store, anchor }
    }

    /// Insert a new pending session. Repeated calls create distinct sessions.
    pub async fn create_session(
        &self,
        user_id: UserId,
        public_key: &str,
    ) -> Result<AuthSession, AuthSessionError> {
        if !is_account_id(public_key) {
            return Err(AuthSessionError::InvalidPublicKey(public_key.to_string()));
        }

        let session = self.store.insert_auth_session(user_id, public_key).await?;
        tracing::info!(session_id = session.id, user_id, "Auth session created");
        Ok(session)
    }

    pub async fn get_session(&self, session_id: SessionId) -> Result<AuthSession, AuthSessionError> {
        self.store
            .get_auth_session(session_id)
            .await?
            .ok_or(AuthSessionError::SessionNotFound(session_id))
    }

    /// Attach the bearer token. Allowed once, from `pending` only.
    pub async fn finalize_session(
        &self,
        session_id: SessionId,
        token: &str,
    ) -> Result<AuthSession, AuthSessionError> {
        if token.trim().is_empty() {
            return Err(AuthSessionError::EmptyToken);
        }

        if !self.store.finalize_auth_session(session_id, token).await? {
            // CAS lost: either no such row or it is already authenticated
            return match self.store.get_auth_session(session_id).await? {
                None => Err(AuthSessionError::SessionNotFound(session_id)),
                Some(_) => Err(AuthSessionError::AlreadyFinalized(session_id)),
            };
        }

        tracing::info!(session_id, "Auth session authenticated");
        self.get_session(session_id).await
    }

    /// Link `session_id` to the transfer as `role`.
    ///
    /// Re-linking the same session is a no-op; a different session for an
    /// already linked role is rejected.
    pub async fn link_to_transfer(
        &self,
        transfer_id: TransferId,
        session_id: SessionId,
        role: Role,
    ) -> Result<(), AuthSessionError> {
        if self.store.get_transfer(transfer_id).await?.is_none() {
            return Err(AuthSessionError::TransferNotFound(transfer_id));
        }
        if self.store.get_auth_session(session_id).await?.is_none() {
            return Err(AuthSessionError::SessionNotFound(session_id));
        }

        if !self.store.link_session(transfer_id, role, session_id).await? {
            tracing::warn!(
                %transfer_id,
                session_id,
                role = %role,
                "Link rejected: role already bound to another session"
            );
            return Err(AuthSessionError::RoleAlreadyLinked { transfer_id, role });
        }

        tracing::info!(%transfer_id, session_id, role = %role, "Auth session linked");
        Ok(())
    }

    pub async fn request_challenge(
        &self,
        public_key: &str,
    ) -> Result<ChallengeTransaction, AuthSessionError> {
        if !is_account_id(public_key) {
            return Err(AuthSessionError::InvalidPublicKey(public_key.to_string()));
        }
        Ok(self.anchor.get_challenge(public_key).await?)
    }

    /// Exchange a signed challenge for a token and finalize the session with it
    pub async fn complete_challenge(
        &self,
        session_id: SessionId,
        signed_envelope: &str,
        network_passphrase: &str,
    ) -> Result<AuthSession, AuthSessionError> {
        let session = self.get_session(session_id).await?;
        if session.state == SessionState::Authenticated {
            return Err(AuthSessionError::AlreadyFinalized(session_id));
        }

        let token = self
            .anchor
            .submit_signed_challenge(signed_envelope, network_passphrase)
            .await
            .inspect_err(|e| {
                tracing::warn!(session_id, error = %e, "Challenge rejected by anchor");
            })?;

        self.finalize_session(session_id, &token).await
    }
}
