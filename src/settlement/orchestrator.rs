use std::sync::Arc;

use super::error::SettlementError;
use super::types::{DepositReceipt, NewHostedOperation, SettlementHistory, WithdrawalReceipt};
use crate::anchor::{AnchorClient, ExchangeRequest};
use crate::auth_session::AuthSession;
use crate::config::{AssetPair, SettlementConfig};
use crate::core_types::{Role, TransferId};
use crate::store::Store;
use crate::transfer::Transfer;

/// Drives a transfer's funds through the anchor's SEP-6 flows
///
/// Each call is a single anchor round trip followed by one local insert.
/// Nothing is written unless the anchor accepted the operation.
pub struct SettlementOrchestrator {
    store: Arc<dyn Store>,
    anchor: Arc<dyn AnchorClient>,
    config: SettlementConfig,
}

impl SettlementOrchestrator {
    pub fn new(
        store: Arc<dyn Store>,
        anchor: Arc<dyn AnchorClient>,
        config: SettlementConfig,
    ) -> Self {
        Self {
            store,
            anchor,
            config,
        }
    }

    async fn load_transfer(&self, transfer_id: TransferId) -> Result<Transfer, SettlementError> {
        self.store
            .get_transfer(transfer_id)
            .await?
            .ok_or(SettlementError::TransferNotFound(transfer_id))
    }

    async fn resolve_session(
        &self,
        transfer: &Transfer,
        role: Role,
    ) -> Result<(AuthSession, String), SettlementError> {
        let session_id = transfer
            .session_for(role)
            .ok_or(SettlementError::SessionRequired {
                transfer_id: transfer.id,
                role,
            })?;
        let session = self
            .store
            .get_auth_session(session_id)
            .await?
            .ok_or(SettlementError::SessionNotFound(session_id))?;
        let token = session
            .bearer_token()
            .ok_or(SettlementError::NotAuthenticated(session_id))?
            .to_string();
        Ok((session, token))
    }

    fn exchange_request(
        &self,
        transfer: &Transfer,
        session: &AuthSession,
        assets: &AssetPair,
    ) -> ExchangeRequest {
        ExchangeRequest {
            source_asset: assets.source.clone(),
            destination_asset: assets.destination.clone(),
            amount: transfer.amount,
            account: session.public_key.clone(),
            kind: self.config.method.clone(),
            dest: None,
            dest_extra: None,
        }
    }

    fn hosted_operation(
        &self,
        transfer: &Transfer,
        session: &AuthSession,
        request: &ExchangeRequest,
        sep6_id: &str,
    ) -> NewHostedOperation {
        NewHostedOperation {
            transfer_id: transfer.id,
            user_id: session.user_id,
            amount: request.amount,
            source_asset: request.source_asset.clone(),
            destination_asset: request.destination_asset.clone(),
            method: request.kind.clone(),
            sep6_id: sep6_id.to_string(),
        }
    }

    /// Start a hosted deposit (fiat in) using the sender's session
    pub async fn deposit(&self, transfer_id: TransferId) -> Result<DepositReceipt, SettlementError> {
        let transfer = self.load_transfer(transfer_id).await?;
        let (session, token) = self.resolve_session(&transfer, Role::Sender).await?;

        let request = self.exchange_request(&transfer, &session, &self.config.deposit_assets);
        let operation = self
            .anchor
            .initiate_deposit(&token, &request)
            .await
            .inspect_err(|e| {
                tracing::warn!(
                    %transfer_id,
                    anchor = self.anchor.home_domain(),
                    error = %e,
                    retryable = e.is_retryable(),
                    "Deposit rejected"
                );
            })?;

        let new = self.hosted_operation(&transfer, &session, &request, &operation.id);
        let record = match self.store.insert_hosted_deposit(&new).await {
            Ok(record) => record,
            Err(source) => {
                tracing::error!(
                    %transfer_id,
                    anchor = self.anchor.home_domain(),
                    anchor_operation_id = %operation.id,
                    error = %source,
                    "Deposit accepted by anchor but not recorded"
                );
                return Err(SettlementError::Persistence {
                    anchor_operation_id: operation.id,
                    source,
                });
            }
        };

        tracing::info!(
            %transfer_id,
            sep6_id = %record.sep6_id,
            amount = %record.amount,
            "Hosted deposit recorded"
        );
        Ok(DepositReceipt { record, operation })
    }

    /// Start a hosted withdrawal (fiat out) to `destination_account`
    ///
    /// The session comes from `settlement.withdrawal_session_role`.
    pub async fn withdraw(
        &self,
        transfer_id: TransferId,
        destination_account: &str,
    ) -> Result<WithdrawalReceipt, SettlementError> {
        let destination_account = destination_account.trim();
        if destination_account.is_empty() {
            return Err(SettlementError::InvalidDestination(
                "destination account is empty".to_string(),
            ));
        }

        let transfer = self.load_transfer(transfer_id).await?;
        let role = self.config.withdrawal_session_role;
        let (session, token) = self.resolve_session(&transfer, role).await?;

        let mut request =
            self.exchange_request(&transfer, &session, &self.config.withdrawal_assets);
        request.dest = Some(destination_account.to_string());
        request.dest_extra = Some(transfer.id.to_string());

        let operation = self
            .anchor
            .initiate_withdrawal(&token, &request)
            .await
            .inspect_err(|e| {
                tracing::warn!(
                    %transfer_id,
                    anchor = self.anchor.home_domain(),
                    error = %e,
                    retryable = e.is_retryable(),
                    "Withdrawal rejected"
                );
            })?;

        let new = self.hosted_operation(&transfer, &session, &request, &operation.id);
        let record = match self
            .store
            .insert_hosted_withdrawal(&new, destination_account)
            .await
        {
            Ok(record) => record,
            Err(source) => {
                tracing::error!(
                    %transfer_id,
                    anchor = self.anchor.home_domain(),
                    anchor_operation_id = %operation.id,
                    error = %source,
                    "Withdrawal accepted by anchor but not recorded"
                );
                return Err(SettlementError::Persistence {
                    anchor_operation_id: operation.id,
                    source,
                });
            }
        };

        tracing::info!(
            %transfer_id,
            sep6_id = %record.sep6_id,
            role = %role,
            "Hosted withdrawal recorded"
        );
        Ok(WithdrawalReceipt { record, operation })
    }

    /// All hosted operations recorded for a transfer
    pub async fn history(&self, transfer_id: TransferId) -> Result<SettlementHistory, SettlementError> {
        self.load_transfer(transfer_id).await?;
        Ok(SettlementHistory {
            deposits: self.store.list_hosted_deposits(transfer_id).await?,
            withdrawals: self.store.list_hosted_withdrawals(transfer_id).await?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchor::{AnchorError, FakeAnchor};
    use crate::config::{SRT_ASSET, USD_ASSET};
    use crate::core_types::Currency;
    use crate::error::ErrorKind;
    use crate::store::MemoryStore;
    use crate::transfer::NewTransfer;
    use rust_decimal::Decimal;

    const ACCOUNT: &str = "GCDNJUBQSX7AJWLJACMJ7I4BC3Z47BQUTMHEICZLE6MU4KQBRYG5JY6B";

    struct Harness {
        store: Arc<MemoryStore>,
        anchor: Arc<FakeAnchor>,
        settlement: SettlementOrchestrator,
    }

    impl Harness {
        fn with_config(config: SettlementConfig) -> Self {
            let store = Arc::new(MemoryStore::new());
            let anchor = Arc::new(FakeAnchor::new("testanchor.stellar.org"));
            let settlement = SettlementOrchestrator::new(store.clone(), anchor.clone(), config);
            Self {
                store,
                anchor,
                settlement,
            }
        }

        fn new() -> Self {
            Self::with_config(SettlementConfig::default())
        }

        async fn transfer(&self, amount: &str) -> TransferId {
            self.store
                .insert_transfer(&NewTransfer {
                    amount: amount.parse().unwrap(),
                    currency: Currency::USD,
                    recipient_name: "Maria".into(),
                    recipient_phone: "+63".into(),
                })
                .await
                .unwrap()
                .id
        }

        async fn link(&self, transfer_id: TransferId, role: Role) {
            let session = self.store.insert_auth_session(11, ACCOUNT).await.unwrap();
            let token = self.anchor.issue_token(ACCOUNT);
            self.store
                .finalize_auth_session(session.id, &token)
                .await
                .unwrap();
            self.store
                .link_session(transfer_id, role, session.id)
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_deposit_records_exact_amount() {
        let h = Harness::new();
        let transfer_id = h.transfer("100.00").await;
        h.link(transfer_id, Role::Sender).await;

        let receipt = h.settlement.deposit(transfer_id).await.unwrap();
        assert_eq!(receipt.record.amount, Decimal::new(10_000, 2));
        assert_eq!(receipt.record.source_asset, USD_ASSET);
        assert_eq!(receipt.record.destination_asset, SRT_ASSET);
        assert_eq!(receipt.record.method, "bank_account");
        assert_eq!(receipt.record.sep6_id, receipt.operation.id);
        assert_eq!(receipt.record.user_id, 11);

        let sent = h.anchor.deposits();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].account, ACCOUNT);
        assert_eq!(sent[0].amount.to_string(), "100.00");
    }

    #[tokio::test]
    async fn test_deposit_without_session() {
        let h = Harness::new();
        let transfer_id = h.transfer("100.00").await;

        let err = h.settlement.deposit(transfer_id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SessionRequired);
        assert!(h.anchor.deposits().is_empty());
        assert!(h.settlement.history(transfer_id).await.unwrap().deposits.is_empty());
    }

    #[tokio::test]
    async fn test_deposit_missing_transfer() {
        let h = Harness::new();
        let err = h.settlement.deposit(uuid::Uuid::new_v4()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_anchor_rejection_writes_nothing() {
        let h = Harness::new();
        let transfer_id = h.transfer("50").await;
        h.link(transfer_id, Role::Sender).await;
        h.anchor
            .set_fail_deposit(Some(AnchorError::InvalidOperation("amount above limit".into())));

        let err = h.settlement.deposit(transfer_id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidOperation);
        assert!(h.settlement.history(transfer_id).await.unwrap().deposits.is_empty());
    }

    #[tokio::test]
    async fn test_local_write_failure_keeps_operation_id() {
        let h = Harness::new();
        let transfer_id = h.transfer("50").await;
        h.link(transfer_id, Role::Sender).await;
        h.store.set_fail_hosted_writes(true);

        let err = h.settlement.deposit(transfer_id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PersistenceFailure);
        assert!(err.orphaned_operation_id().unwrap().starts_with("deposit-"));
        assert_eq!(h.anchor.deposits().len(), 1);
    }

    #[tokio::test]
    async fn test_withdraw_anchor_rejection_writes_nothing() {
        let h = Harness::new();
        let transfer_id = h.transfer("50").await;
        h.link(transfer_id, Role::Sender).await;
        h.anchor
            .set_fail_withdrawal(Some(AnchorError::InvalidOperation("unknown account".into())));

        let err = h
            .settlement
            .withdraw(transfer_id, "1234567890")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidOperation);
        assert!(err.orphaned_operation_id().is_none());
        assert!(h.anchor.withdrawals().is_empty());
        assert!(h.settlement.history(transfer_id).await.unwrap().withdrawals.is_empty());
    }

    #[tokio::test]
    async fn test_withdraw_local_write_failure_keeps_operation_id() {
        let h = Harness::new();
        let transfer_id = h.transfer("50").await;
        h.link(transfer_id, Role::Sender).await;
        h.store.set_fail_hosted_writes(true);

        let err = h
            .settlement
            .withdraw(transfer_id, "1234567890")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PersistenceFailure);
        assert!(err.orphaned_operation_id().unwrap().starts_with("withdrawal-"));
        assert_eq!(h.anchor.withdrawals().len(), 1);

        h.store.set_fail_hosted_writes(false);
        assert!(h.settlement.history(transfer_id).await.unwrap().withdrawals.is_empty());
    }

    #[tokio::test]
    async fn test_withdraw_uses_sender_session_by_default() {
        let h = Harness::new();
        let transfer_id = h.transfer("75.5").await;
        h.link(transfer_id, Role::Sender).await;

        let receipt = h.settlement.withdraw(transfer_id, "1234567890").await.unwrap();
        assert_eq!(receipt.record.dest, "1234567890");
        assert_eq!(receipt.record.source_asset, SRT_ASSET);
        assert_eq!(receipt.record.destination_asset, USD_ASSET);

        let sent = h.anchor.withdrawals();
        assert_eq!(sent[0].dest.as_deref(), Some("1234567890"));
        assert_eq!(sent[0].dest_extra, Some(transfer_id.to_string()));

        let history = h.settlement.history(transfer_id).await.unwrap();
        assert_eq!(history.withdrawals.len(), 1);
    }

    #[tokio::test]
    async fn test_withdraw_receiver_role_flag() {
        let h = Harness::with_config(SettlementConfig {
            withdrawal_session_role: Role::Receiver,
            ..Default::default()
        });
        let transfer_id = h.transfer("20").await;
        h.link(transfer_id, Role::Sender).await;

        let err = h.settlement.withdraw(transfer_id, "ACC-1").await.unwrap_err();
        assert!(matches!(
            err,
            SettlementError::SessionRequired {
                role: Role::Receiver,
                ..
            }
        ));

        h.link(transfer_id, Role::Receiver).await;
        h.settlement.withdraw(transfer_id, "ACC-1").await.unwrap();
    }

    #[tokio::test]
    async fn test_withdraw_rejects_blank_destination() {
        let h = Harness::new();
        let transfer_id = h.transfer("20").await;
        let err = h.settlement.withdraw(transfer_id, "   ").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }
}
