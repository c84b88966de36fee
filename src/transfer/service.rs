use rust_decimal::Decimal;
use std::sync::Arc;

use super::error::TransferError;
use super::types::{NewTransfer, Transfer};
use crate::core_types::TransferId;
use crate::store::Store;

/// Creates and reads transfers
pub struct TransferService {
    store: Arc<dyn Store>,
}

impl TransferService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn create(&self, new: NewTransfer) -> Result<Transfer, TransferError> {
        if new.amount <= Decimal::ZERO {
            return Err(TransferError::InvalidAmount);
        }
        if new.recipient_name.trim().is_empty() {
            return Err(TransferError::InvalidRecipient("recipient_name is empty"));
        }
        if new.recipient_phone.trim().is_empty() {
            return Err(TransferError::InvalidRecipient("recipient_phone is empty"));
        }

        let transfer = self.store.insert_transfer(&new).await?;
        tracing::info!(
            transfer_id = %transfer.id,
            amount = %transfer.amount,
            currency = %transfer.currency,
            "Transfer created"
        );
        Ok(transfer)
    }

    pub async fn get(&self, id: TransferId) -> Result<Transfer, TransferError> {
        self.store
            .get_transfer(id)
            .await?
            .ok_or(TransferError::TransferNotFound(id))
    }
}
