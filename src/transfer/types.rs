//! Transfer aggregate

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::core_types::{Currency, Role, SessionId, TransferId};

/// Root record of one remittance.
///
/// Amount and recipient never change after creation; only the two session
/// links are filled in later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Transfer {
    #[schema(value_type = String, format = Uuid)]
    pub id: TransferId,
    #[schema(value_type = String, example = "100.00")]
    pub amount: Decimal,
    pub currency: Currency,
    pub recipient_name: String,
    pub recipient_phone: String,
    pub sender_auth_session_id: Option<SessionId>,
    pub receiver_auth_session_id: Option<SessionId>,
    pub created_at: DateTime<Utc>,
}

impl Transfer {
    /// Session linked for `role`, if any
    pub fn session_for(&self, role: Role) -> Option<SessionId> {
        match role {
            Role::Sender => self.sender_auth_session_id,
            Role::Receiver => self.receiver_auth_session_id,
        }
    }
}

/// Validated input for a new transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransfer {
    pub amount: Decimal,
    pub currency: Currency,
    pub recipient_name: String,
    pub recipient_phone: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_for_role() {
        let transfer = Transfer {
            id: uuid::Uuid::new_v4(),
            amount: Decimal::ONE_HUNDRED,
            currency: Currency::USD,
            recipient_name: "Maria".into(),
            recipient_phone: "+639171234567".into(),
            sender_auth_session_id: Some(4),
            receiver_auth_session_id: None,
            created_at: Utc::now(),
        };
        assert_eq!(transfer.session_for(Role::Sender), Some(4));
        assert_eq!(transfer.session_for(Role::Receiver), None);
    }
}
