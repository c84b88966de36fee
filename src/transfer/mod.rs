//! Transfers
//!
//! A transfer is the root aggregate of a remittance. It is created once with
//! an amount and a recipient; afterwards only its sender and receiver auth
//! session links change (see [`crate::auth_session`]).

pub mod error;
pub mod service;
pub mod types;

pub use error::TransferError;
pub use service::TransferService;
pub use types::{NewTransfer, Transfer};
