//! Anchor protocol request/response types
//!
//! Field names follow the SEP documents so the structs serialize straight
//! onto the wire.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

use crate::core_types::Role;

/// SEP-10 challenge returned for a public key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ChallengeTransaction {
    /// Base64 XDR envelope to be signed by the account holder
    pub transaction: String,
    pub network_passphrase: String,
}

/// SEP-12 customer fields
///
/// Supporting documents (photo ids) are uploaded out of band through the
/// file upload config, so only scalar fields travel here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KycFields {
    /// Anchor-assigned customer id. Present means "update".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// SEP-12 customer type, e.g. `sep31-sender`
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub customer_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_account_number: Option<String>,
    /// Any other SEP-9 field the anchor asks for
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

impl KycFields {
    pub fn is_empty(&self) -> bool {
        self.customer_type.is_none()
            && self.first_name.is_none()
            && self.last_name.is_none()
            && self.email_address.is_none()
            && self.bank_number.is_none()
            && self.bank_account_number.is_none()
            && self.extra.is_empty()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CustomerIdResponse {
    pub id: String,
}

/// SEP-6 `deposit-exchange` / `withdraw-exchange` query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRequest {
    pub source_asset: String,
    pub destination_asset: String,
    pub amount: Decimal,
    /// Stellar account the funds are credited to / debited from
    pub account: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dest: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dest_extra: Option<String>,
}

/// Anchor response to a SEP-6 exchange request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AnchorOperation {
    /// Anchor-side transaction id
    pub id: String,
    /// Human readable deposit instructions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub how: Option<String>,
    /// Structured next-step instructions (bank details, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub instructions: Option<serde_json::Value>,
    /// Withdrawal: Stellar account to send funds to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
    /// Estimated seconds until completion
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eta: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub extra_info: Option<serde_json::Value>,
}

/// Where and how to upload KYC documents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FileUploadConfig {
    pub url: String,
    pub config: UploadRequestConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UploadRequestConfig {
    pub method: String,
    pub headers: BTreeMap<String, String>,
}

impl FileUploadConfig {
    /// SEP-12 accepts documents as multipart on `PUT /customer`.
    pub fn for_customer_endpoint(kyc_server: &str, token: &str) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("Authorization".to_string(), format!("Bearer {}", token));
        headers.insert(
            "Content-Type".to_string(),
            "multipart/form-data".to_string(),
        );
        Self {
            url: format!("{}/customer", kyc_server.trim_end_matches('/')),
            config: UploadRequestConfig {
                method: "PUT".to_string(),
                headers,
            },
        }
    }
}

/// SEP-12 customer types the anchor expects for one side of a payment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct KycRequirements {
    /// Customer type name -> description
    pub types: BTreeMap<String, String>,
}

// SEP-31 `GET /info` shapes. Only the parts needed for KYC discovery.

#[derive(Debug, Deserialize)]
pub(crate) struct Sep31Info {
    #[serde(default)]
    pub receive: BTreeMap<String, Sep31Asset>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Sep31Asset {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub sep12: Option<Sep31Sep12>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Sep31Sep12 {
    #[serde(default)]
    pub sender: Option<Sep31CustomerTypes>,
    #[serde(default)]
    pub receiver: Option<Sep31CustomerTypes>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Sep31CustomerTypes {
    #[serde(default)]
    pub types: BTreeMap<String, Sep31TypeInfo>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Sep31TypeInfo {
    #[serde(default)]
    pub description: String,
}

fn default_enabled() -> bool {
    true
}

impl Sep31Info {
    /// Merge the customer types of every enabled receive asset for `role`.
    pub(crate) fn requirements_for(&self, role: Role) -> KycRequirements {
        let mut types = BTreeMap::new();
        for asset in self.receive.values().filter(|a| a.enabled) {
            let Some(sep12) = &asset.sep12 else { continue };
            let side = match role {
                Role::Sender => sep12.sender.as_ref(),
                Role::Receiver => sep12.receiver.as_ref(),
            };
            if let Some(side) = side {
                for (name, info) in &side.types {
                    types
                        .entry(name.clone())
                        .or_insert_with(|| info.description.clone());
                }
            }
        }
        KycRequirements { types }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_kyc_fields_wire_names() {
        let fields = KycFields {
            id: Some("c-1".into()),
            customer_type: Some("sep31-sender".into()),
            first_name: Some("Ada".into()),
            ..Default::default()
        };
        let json = serde_json::to_value(&fields).unwrap();
        assert_eq!(json["id"], "c-1");
        assert_eq!(json["type"], "sep31-sender");
        assert_eq!(json["first_name"], "Ada");
        assert!(json.get("last_name").is_none());
    }

    #[test]
    fn test_kyc_fields_extra_flattened() {
        let json = r#"{"first_name":"Ada","mobile_number":"+6312345"}"#;
        let fields: KycFields = serde_json::from_str(json).unwrap();
        assert_eq!(fields.first_name.as_deref(), Some("Ada"));
        assert_eq!(fields.extra.get("mobile_number").unwrap(), "+6312345");
        assert!(!fields.is_empty());
        assert!(KycFields::default().is_empty());
    }

    #[test]
    fn test_exchange_request_query_keeps_amount_scale() {
        let req = ExchangeRequest {
            source_asset: "iso4217:USD".into(),
            destination_asset: "stellar:SRT:GISSUER".into(),
            amount: Decimal::from_str("100.00").unwrap(),
            account: "GACCOUNT".into(),
            kind: "bank_account".into(),
            dest: None,
            dest_extra: None,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["amount"], "100.00");
        assert_eq!(json["type"], "bank_account");
        assert!(json.get("dest").is_none());
    }

    #[test]
    fn test_operation_parses_minimal_deposit_response() {
        let json = r#"{"id":"op-9","how":"Wire to account 123","eta":3600}"#;
        let op: AnchorOperation = serde_json::from_str(json).unwrap();
        assert_eq!(op.id, "op-9");
        assert_eq!(op.eta, Some(3600));
        assert!(op.instructions.is_none());
    }

    #[test]
    fn test_file_upload_config() {
        let cfg = FileUploadConfig::for_customer_endpoint("https://anchor/kyc/", "tok");
        assert_eq!(cfg.url, "https://anchor/kyc/customer");
        assert_eq!(cfg.config.method, "PUT");
        assert_eq!(cfg.config.headers["Authorization"], "Bearer tok");
    }

    #[test]
    fn test_sep31_requirements_per_role() {
        let json = r#"{
            "receive": {
                "SRT": {
                    "enabled": true,
                    "sep12": {
                        "sender": {"types": {"sep31-sender": {"description": "U.S. citizens"}}},
                        "receiver": {"types": {"sep31-receiver": {"description": "bank account holders"}}}
                    }
                },
                "OFF": {
                    "enabled": false,
                    "sep12": {"sender": {"types": {"sep31-large-sender": {"description": "x"}}}}
                }
            }
        }"#;
        let info: Sep31Info = serde_json::from_str(json).unwrap();

        let sender = info.requirements_for(Role::Sender);
        assert_eq!(sender.types.len(), 1);
        assert_eq!(sender.types["sep31-sender"], "U.S. citizens");

        let receiver = info.requirements_for(Role::Receiver);
        assert!(receiver.types.contains_key("sep31-receiver"));
    }
}
