//! Hosted operation records
//!
//! One row per anchor-accepted deposit or withdrawal. Rows are append-only.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::anchor::AnchorOperation;
use crate::core_types::{TransferId, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HostedDeposit {
    pub id: i64,
    #[schema(value_type = String, format = Uuid)]
    pub transfer_id: TransferId,
    pub user_id: UserId,
    #[schema(value_type = String, example = "100.00")]
    pub amount: Decimal,
    pub source_asset: String,
    pub destination_asset: String,
    /// SEP-6 `type`, e.g. `bank_account`
    pub method: String,
    /// Anchor transaction id
    pub sep6_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HostedWithdrawal {
    pub id: i64,
    #[schema(value_type = String, format = Uuid)]
    pub transfer_id: TransferId,
    pub user_id: UserId,
    #[schema(value_type = String, example = "100.00")]
    pub amount: Decimal,
    pub source_asset: String,
    pub destination_asset: String,
    pub method: String,
    /// Off-chain account the anchor pays out to
    pub dest: String,
    pub sep6_id: String,
    pub created_at: DateTime<Utc>,
}

/// Insert payload shared by both directions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewHostedOperation {
    pub transfer_id: TransferId,
    pub user_id: UserId,
    pub amount: Decimal,
    pub source_asset: String,
    pub destination_asset: String,
    pub method: String,
    pub sep6_id: String,
}

/// Result of a successful deposit: the local row plus the anchor's instructions
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DepositReceipt {
    pub record: HostedDeposit,
    pub operation: AnchorOperation,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct WithdrawalReceipt {
    pub record: HostedWithdrawal,
    pub operation: AnchorOperation,
}

/// Everything recorded against a transfer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct SettlementHistory {
    pub deposits: Vec<HostedDeposit>,
    pub withdrawals: Vec<HostedWithdrawal>,
}
