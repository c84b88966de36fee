//! Auth session records and their two-state lifecycle

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

use crate::core_types::{SessionId, UserId};

/// Session lifecycle
///
/// State IDs are stored as SMALLINT.
/// `Pending -> Authenticated` is the only transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
#[repr(i16)]
pub enum SessionState {
    /// Created, no bearer token yet
    Pending = 0,
    /// Token attached; terminal
    Authenticated = 10,
}

impl SessionState {
    #[inline]
    pub fn id(&self) -> i16 {
        *self as i16
    }

    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            0 => Some(SessionState::Pending),
            10 => Some(SessionState::Authenticated),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Pending => "PENDING",
            SessionState::Authenticated => "AUTHENTICATED",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Anchor authentication for one Stellar account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AuthSession {
    pub id: SessionId,
    pub user_id: UserId,
    /// Stellar account id the challenge was signed for
    pub public_key: String,
    /// SEP-10 JWT. Never echoed back to clients.
    #[serde(skip_serializing, default)]
    pub token: Option<String>,
    pub state: SessionState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AuthSession {
    /// Bearer token, only once the session is authenticated
    pub fn bearer_token(&self) -> Option<&str> {
        match self.state {
            SessionState::Authenticated => self.token.as_deref(),
            SessionState::Pending => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(state: SessionState, token: Option<&str>) -> AuthSession {
        AuthSession {
            id: 1,
            user_id: 42,
            public_key: "GABC".into(),
            token: token.map(String::from),
            state,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_state_ids() {
        for state in [SessionState::Pending, SessionState::Authenticated] {
            assert_eq!(SessionState::from_id(state.id()), Some(state));
        }
        assert!(SessionState::from_id(5).is_none());
    }

    #[test]
    fn test_bearer_token_requires_authenticated() {
        assert_eq!(
            session(SessionState::Authenticated, Some("jwt")).bearer_token(),
            Some("jwt")
        );
        assert_eq!(session(SessionState::Pending, Some("jwt")).bearer_token(), None);
    }

    #[test]
    fn test_token_not_serialized() {
        let json = serde_json::to_value(session(SessionState::Authenticated, Some("jwt"))).unwrap();
        assert!(json.get("token").is_none());
        assert_eq!(json["state"], "authenticated");
    }
}
