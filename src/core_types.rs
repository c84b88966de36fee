//! Core identifiers and enums shared by every module.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// Owner of sessions, KYC entries and hosted operations.
pub type UserId = i64;

/// Primary key of an auth session row.
pub type SessionId = i64;

/// Transfers are addressed by UUID so the id can be shared in links.
pub type TransferId = uuid::Uuid;

/// Side of a transfer an auth session acts for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Sender,
    Receiver,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Sender => "sender",
            Role::Receiver => "receiver",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sender" => Ok(Role::Sender),
            "receiver" => Ok(Role::Receiver),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

/// Fiat currency a transfer is denominated in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default, ToSchema)]
pub enum Currency {
    #[default]
    USD,
}

impl Currency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::USD => "USD",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "USD" => Ok(Currency::USD),
            _ => Err(format!("Unsupported currency: {}", s)),
        }
    }
}

const STRKEY_ACCOUNT_LEN: usize = 56;

/// Shallow check of a Stellar account id (`G...`, base32, 56 chars).
///
/// Checksum verification is left to the anchor, which rejects bad keys
/// during the challenge exchange anyway.
pub fn is_account_id(key: &str) -> bool {
    key.len() == STRKEY_ACCOUNT_LEN
        && key.starts_with('G')
        && key
            .bytes()
            .all(|b| b.is_ascii_uppercase() || (b'2'..=b'7').contains(&b))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_ACCOUNT: &str = "GCDNJUBQSX7AJWLJACMJ7I4BC3Z47BQUTMHEICZLE6MU4KQBRYG5JY6B";

    #[test]
    fn test_role_parse() {
        assert_eq!("sender".parse::<Role>().unwrap(), Role::Sender);
        assert_eq!("RECEIVER".parse::<Role>().unwrap(), Role::Receiver);
        assert!("broker".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_serde_lowercase() {
        let json = serde_json::to_string(&Role::Receiver).unwrap();
        assert_eq!(json, "\"receiver\"");
    }

    #[test]
    fn test_currency_parse() {
        assert_eq!("usd".parse::<Currency>().unwrap(), Currency::USD);
    }

    #[test]
    fn test_account_id_shape() {
        assert!(is_account_id(TEST_ACCOUNT));
        assert!(!is_account_id("G123"));
        assert!(!is_account_id(&TEST_ACCOUNT.replace('G', "S")));
        assert!(!is_account_id(&TEST_ACCOUNT.to_lowercase()));
    }
}
