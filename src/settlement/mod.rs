//! Hosted deposit and withdrawal settlement
//!
//! ```text
//! deposit(transfer)           withdraw(transfer, dest)
//!   sender session              configured role's session
//!   USD -> SRT                  SRT -> USD, dest_extra = transfer id
//!        \                        /
//!         anchor SEP-6 exchange call
//!                  |
//!         one hosted_*_tb row (only on anchor success)
//! ```

pub mod error;
pub mod orchestrator;
pub mod types;

pub use error::SettlementError;
pub use orchestrator::SettlementOrchestrator;
pub use types::{
    DepositReceipt, HostedDeposit, HostedWithdrawal, NewHostedOperation, SettlementHistory,
    WithdrawalReceipt,
};
