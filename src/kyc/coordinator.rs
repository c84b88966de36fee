use std::sync::Arc;

use super::error::KycError;
use super::types::{KycEntry, KycStatus, NewKycEntry};
use crate::anchor::{AnchorClient, FileUploadConfig, KycFields, KycRequirements};
use crate::auth_session::AuthSession;
use crate::core_types::{Role, SessionId, TransferId, UserId};
use crate::locks::KeyedLocks;
use crate::store::Store;

/// Gates compliance data for each side of a transfer
///
/// Per `(transfer, role)`:
///
/// ```text
/// no session linked      -> SessionRequired
/// linked, no KYC entry   -> submit creates the anchor customer + one entry
/// linked, sep12_id known -> submit updates the same anchor customer
/// ```
pub struct KycCoordinator {
    store: Arc<dyn Store>,
    anchor: Arc<dyn AnchorClient>,
    locks: KeyedLocks<(SessionId, UserId)>,
}

impl KycCoordinator {
    pub fn new(store: Arc<dyn Store>, anchor: Arc<dyn AnchorClient>) -> Self {
        Self {
            store,
            anchor,
            locks: KeyedLocks::new(),
        }
    }

    async fn resolve_session(
        &self,
        transfer_id: TransferId,
        role: Role,
    ) -> Result<AuthSession, KycError> {
        let transfer = self
            .store
            .get_transfer(transfer_id)
            .await?
            .ok_or(KycError::TransferNotFound(transfer_id))?;
        let session_id = transfer
            .session_for(role)
            .ok_or(KycError::SessionRequired { transfer_id, role })?;
        self.store
            .get_auth_session(session_id)
            .await?
            .ok_or(KycError::SessionNotFound(session_id))
    }

    /// Submit or update the customer for `role` of the transfer.
    ///
    /// The first successful call records the anchor customer id; later calls
    /// send that id along so the anchor updates instead of creating a new
    /// customer. Concurrent first-time calls for one session produce a
    /// single entry.
    pub async fn submit_kyc(
        &self,
        transfer_id: TransferId,
        role: Role,
        mut fields: KycFields,
    ) -> Result<KycEntry, KycError> {
        if fields.is_empty() {
            return Err(KycError::EmptyFields);
        }

        let session = self.resolve_session(transfer_id, role).await?;
        let token = session
            .bearer_token()
            .ok_or(KycError::NotAuthenticated(session.id))?;

        let _guard = self.locks.lock((session.id, session.user_id)).await;

        let existing = self.store.find_kyc(session.id, session.user_id).await?;
        if let Some(entry) = existing
            && let Some(sep12_id) = entry.sep12_id.clone()
        {
            fields.id = Some(sep12_id.clone());
            let returned = self.anchor.submit_kyc_fields(token, &fields).await?;
            if returned != sep12_id {
                tracing::warn!(
                    %transfer_id,
                    anchor = self.anchor.home_domain(),
                    expected = %sep12_id,
                    returned = %returned,
                    "Anchor returned a different customer id on update"
                );
            }
            tracing::info!(%transfer_id, role = %role, sep12_id = %sep12_id, "KYC updated");
            return Ok(entry);
        }

        fields.id = None;
        let sep12_id = self.anchor.submit_kyc_fields(token, &fields).await?;
        let entry = self
            .store
            .upsert_kyc(&NewKycEntry {
                user_id: session.user_id,
                auth_session_id: session.id,
                sep12_id: sep12_id.clone(),
                status: KycStatus::Submitted,
            })
            .await
            .inspect_err(|e| {
                tracing::error!(
                    %transfer_id,
                    anchor = self.anchor.home_domain(),
                    sep12_id = %sep12_id,
                    error = %e,
                    "Anchor accepted KYC but local entry was not written"
                );
            })?;

        tracing::info!(%transfer_id, role = %role, sep12_id = %sep12_id, "KYC submitted");
        Ok(entry)
    }

    /// Current KYC entry for `role`, if one was submitted
    pub async fn status(
        &self,
        transfer_id: TransferId,
        role: Role,
    ) -> Result<KycEntry, KycError> {
        let session = self.resolve_session(transfer_id, role).await?;
        self.store
            .find_kyc(session.id, session.user_id)
            .await?
            .ok_or(KycError::NotSubmitted { transfer_id, role })
    }

    /// Upload target for supporting documents. Requires a prior submission.
    pub async fn get_file_upload_config(
        &self,
        transfer_id: TransferId,
        role: Role,
    ) -> Result<FileUploadConfig, KycError> {
        let session = self.resolve_session(transfer_id, role).await?;
        let submitted = self
            .store
            .find_kyc(session.id, session.user_id)
            .await?
            .is_some_and(|entry| entry.sep12_id.is_some());
        if !submitted {
            return Err(KycError::NotSubmitted { transfer_id, role });
        }

        let token = session
            .bearer_token()
            .ok_or(KycError::NotAuthenticated(session.id))?;
        Ok(self.anchor.get_kyc_file_upload_config(token).await?)
    }

    pub async fn requirements(&self, role: Role) -> Result<KycRequirements, KycError> {
        Ok(self.anchor.get_kyc_requirements(role).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchor::{AnchorError, FakeAnchor};
    use crate::core_types::Currency;
    use crate::error::ErrorKind;
    use crate::store::MemoryStore;
    use crate::transfer::NewTransfer;
    use rust_decimal::Decimal;

    struct Harness {
        store: Arc<MemoryStore>,
        anchor: Arc<FakeAnchor>,
        kyc: KycCoordinator,
    }

    impl Harness {
        fn new() -> Self {
            let store = Arc::new(MemoryStore::new());
            let anchor = Arc::new(FakeAnchor::new("testanchor.stellar.org"));
            let kyc = KycCoordinator::new(store.clone(), anchor.clone());
            Self { store, anchor, kyc }
        }

        async fn transfer(&self) -> TransferId {
            self.store
                .insert_transfer(&NewTransfer {
                    amount: Decimal::ONE_HUNDRED,
                    currency: Currency::USD,
                    recipient_name: "Maria".into(),
                    recipient_phone: "+63".into(),
                })
                .await
                .unwrap()
                .id
        }

        /// Authenticated session linked as `role`
        async fn link(&self, transfer_id: TransferId, role: Role) -> SessionId {
            let session = self.store.insert_auth_session(7, "GKEY").await.unwrap();
            let token = self.anchor.issue_token("GKEY");
            assert!(self.store.finalize_auth_session(session.id, &token).await.unwrap());
            assert!(self.store.link_session(transfer_id, role, session.id).await.unwrap());
            session.id
        }
    }

    fn fields() -> KycFields {
        KycFields {
            first_name: Some("Ada".into()),
            last_name: Some("Lovelace".into()),
            email_address: Some("ada@example.com".into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_unlinked_requires_session() {
        let h = Harness::new();
        let transfer_id = h.transfer().await;
        let err = h
            .kyc
            .submit_kyc(transfer_id, Role::Sender, fields())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SessionRequired);
        assert_eq!(h.anchor.kyc_count(), 0);
    }

    #[tokio::test]
    async fn test_resubmit_updates_same_customer() {
        let h = Harness::new();
        let transfer_id = h.transfer().await;
        h.link(transfer_id, Role::Sender).await;

        let first = h.kyc.submit_kyc(transfer_id, Role::Sender, fields()).await.unwrap();
        let second = h.kyc.submit_kyc(transfer_id, Role::Sender, fields()).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(first.sep12_id, second.sep12_id);
        assert_eq!(h.store.kyc_entry_count(), 1);
        assert_eq!(h.anchor.kyc_count(), 2);
        assert_eq!(h.anchor.customer_count(), 1);
    }

    #[tokio::test]
    async fn test_submissions_release_their_lock_entries() {
        let h = Harness::new();
        for _ in 0..20 {
            let transfer_id = h.transfer().await;
            h.link(transfer_id, Role::Sender).await;
            h.kyc.submit_kyc(transfer_id, Role::Sender, fields()).await.unwrap();
        }

        let transfer_id = h.transfer().await;
        h.link(transfer_id, Role::Sender).await;
        let (a, b) = futures::join!(
            h.kyc.submit_kyc(transfer_id, Role::Sender, fields()),
            h.kyc.submit_kyc(transfer_id, Role::Sender, fields()),
        );
        a.unwrap();
        b.unwrap();

        assert!(h.kyc.locks.is_empty());
    }

    #[tokio::test]
    async fn test_pending_session_not_authenticated() {
        let h = Harness::new();
        let transfer_id = h.transfer().await;
        let session = h.store.insert_auth_session(7, "GKEY").await.unwrap();
        h.store
            .link_session(transfer_id, Role::Receiver, session.id)
            .await
            .unwrap();

        let err = h
            .kyc
            .submit_kyc(transfer_id, Role::Receiver, fields())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AuthenticationError);
    }

    #[tokio::test]
    async fn test_compliance_rejection_leaves_no_entry() {
        let h = Harness::new();
        let transfer_id = h.transfer().await;
        h.link(transfer_id, Role::Sender).await;
        h.anchor
            .set_fail_kyc(Some(AnchorError::ComplianceRejected("invalid email".into())));

        let err = h
            .kyc
            .submit_kyc(transfer_id, Role::Sender, fields())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ComplianceRejected);
        assert_eq!(h.store.kyc_entry_count(), 0);
    }

    #[tokio::test]
    async fn test_file_upload_config_needs_submission() {
        let h = Harness::new();
        let transfer_id = h.transfer().await;
        h.link(transfer_id, Role::Sender).await;

        let err = h
            .kyc
            .get_file_upload_config(transfer_id, Role::Sender)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::KycNotSubmitted);

        h.kyc.submit_kyc(transfer_id, Role::Sender, fields()).await.unwrap();
        let config = h
            .kyc
            .get_file_upload_config(transfer_id, Role::Sender)
            .await
            .unwrap();
        assert_eq!(config.config.method, "PUT");
        assert!(config.url.ends_with("/customer"));
    }

    #[tokio::test]
    async fn test_empty_fields_rejected() {
        let h = Harness::new();
        let transfer_id = h.transfer().await;
        let err = h
            .kyc
            .submit_kyc(transfer_id, Role::Sender, KycFields::default())
            .await
            .unwrap_err();
        assert!(matches!(err, KycError::EmptyFields));
    }

    #[tokio::test]
    async fn test_requirements_per_role() {
        let h = Harness::new();
        let sender = h.kyc.requirements(Role::Sender).await.unwrap();
        assert!(sender.types.contains_key("sep31-sender"));
        let receiver = h.kyc.requirements(Role::Receiver).await.unwrap();
        assert!(receiver.types.contains_key("sep31-receiver"));
    }
}
