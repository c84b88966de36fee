//! Anchor Remit - transfer settlement over Stellar anchors
//!
//! Brokers a remittance through an anchor's standard protocols on behalf of
//! a sender and a receiver:
//!
//! ```text
//! ┌──────────┐   ┌──────────────┐   ┌──────────┐   ┌──────────────┐
//! │ Transfer │──▶│ Auth session │──▶│   KYC    │──▶│  Settlement  │
//! │ (amount, │   │  (SEP-10,    │   │ (SEP-12) │   │ (SEP-6 dep / │
//! │ recipient│   │ sender/recv) │   │          │   │  withdraw)   │
//! └──────────┘   └──────────────┘   └──────────┘   └──────────────┘
//!                        │                │                │
//!                        └──────── AnchorClient ───────────┘
//! ```
//!
//! # Modules
//!
//! - [`anchor`] - Anchor protocol client (HTTP + in-process fake)
//! - [`transfer`] - Transfer aggregate
//! - [`auth_session`] - Session lifecycle and transfer links
//! - [`kyc`] - Customer submission per session
//! - [`settlement`] - Hosted deposit / withdrawal orchestration
//! - [`store`] - Persistence (PostgreSQL / memory)
//! - [`horizon`] - Signed envelope submission
//! - [`gateway`] - HTTP API

pub mod core_types;
pub mod error;
pub mod locks;

pub mod anchor;
pub mod auth_session;
pub mod kyc;
pub mod settlement;
pub mod transfer;

pub mod config;
pub mod db;
pub mod gateway;
pub mod horizon;
pub mod logging;
pub mod store;

pub use core_types::{Currency, Role, SessionId, TransferId, UserId};
pub use error::ErrorKind;
