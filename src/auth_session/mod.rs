//! Anchor auth sessions
//!
//! A session records one SEP-10 authentication: the Stellar account that
//! signed the challenge and, once finalized, the bearer token the anchor
//! issued. Sessions are linked to a transfer as its sender or receiver.
//!
//! ```text
//! PENDING --finalize_session / complete_challenge--> AUTHENTICATED
//! ```

pub mod error;
pub mod manager;
pub mod types;

pub use error::AuthSessionError;
pub use manager::AuthSessionManager;
pub use types::{AuthSession, SessionState};
