//! SEP-12 KYC coordination
//!
//! One [`KycEntry`] per `(auth_session_id, user_id)`. The entry is created
//! after the anchor accepts the first submission and holds the anchor's
//! customer id (`sep12_id`) for every later update.

pub mod coordinator;
pub mod error;
pub mod types;

pub use coordinator::KycCoordinator;
pub use error::KycError;
pub use types::{KycEntry, KycStatus, NewKycEntry};
