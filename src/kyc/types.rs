use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::core_types::{SessionId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum KycStatus {
    Submitted,
    NeedsInfo,
    Approved,
    Rejected,
}

impl KycStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            KycStatus::Submitted => "submitted",
            KycStatus::NeedsInfo => "needs_info",
            KycStatus::Approved => "approved",
            KycStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for KycStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KycStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "submitted" => Ok(KycStatus::Submitted),
            "needs_info" => Ok(KycStatus::NeedsInfo),
            "approved" => Ok(KycStatus::Approved),
            "rejected" => Ok(KycStatus::Rejected),
            _ => Err(format!("Invalid KYC status: {}", s)),
        }
    }
}

/// Local record of a SEP-12 customer. One per `(auth_session_id, user_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct KycEntry {
    pub id: i64,
    pub user_id: UserId,
    pub auth_session_id: SessionId,
    /// Anchor customer id, set by the first successful submission
    pub sep12_id: Option<String>,
    pub status: KycStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewKycEntry {
    pub user_id: UserId,
    pub auth_session_id: SessionId,
    pub sep12_id: String,
    pub status: KycStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse() {
        for status in [
            KycStatus::Submitted,
            KycStatus::NeedsInfo,
            KycStatus::Approved,
            KycStatus::Rejected,
        ] {
            assert_eq!(status.as_str().parse::<KycStatus>().unwrap(), status);
        }
        assert!("pending".parse::<KycStatus>().is_err());
    }
}
