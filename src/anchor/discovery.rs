//! SEP-1 endpoint discovery
//!
//! An anchor publishes its service URLs in
//! `https://{home_domain}/.well-known/stellar.toml`.

use serde::{Deserialize, Serialize};

use super::error::AnchorError;

/// Service URLs of one anchor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorEndpoints {
    /// SEP-10
    pub web_auth: Option<String>,
    /// SEP-12
    pub kyc_server: Option<String>,
    /// SEP-6
    pub transfer_server: Option<String>,
    /// SEP-31
    #[serde(default)]
    pub direct_payment_server: Option<String>,
    #[serde(default)]
    pub network_passphrase: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StellarToml {
    #[serde(rename = "WEB_AUTH_ENDPOINT")]
    web_auth_endpoint: Option<String>,
    #[serde(rename = "KYC_SERVER")]
    kyc_server: Option<String>,
    #[serde(rename = "TRANSFER_SERVER")]
    transfer_server: Option<String>,
    #[serde(rename = "DIRECT_PAYMENT_SERVER")]
    direct_payment_server: Option<String>,
    #[serde(rename = "NETWORK_PASSPHRASE")]
    network_passphrase: Option<String>,
}

impl AnchorEndpoints {
    pub fn stellar_toml_url(home_domain: &str) -> String {
        format!("https://{}/.well-known/stellar.toml", home_domain)
    }

    /// Parse a `stellar.toml` body. Unknown keys are ignored.
    pub fn from_toml(content: &str) -> Result<Self, AnchorError> {
        let parsed: StellarToml = toml::from_str(content)
            .map_err(|e| AnchorError::Protocol(format!("Invalid stellar.toml: {}", e)))?;

        Ok(Self {
            web_auth: parsed.web_auth_endpoint.map(strip_slash),
            kyc_server: parsed.kyc_server.map(strip_slash),
            transfer_server: parsed.transfer_server.map(strip_slash),
            direct_payment_server: parsed.direct_payment_server.map(strip_slash),
            network_passphrase: parsed.network_passphrase,
        })
    }

    /// Every endpoint under one base URL. Used for emulators and tests.
    pub fn single_host(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            web_auth: Some(format!("{}/auth", base)),
            kyc_server: Some(format!("{}/kyc", base)),
            transfer_server: Some(format!("{}/sep6", base)),
            direct_payment_server: Some(format!("{}/sep31", base)),
            network_passphrase: None,
        }
    }

    pub fn web_auth(&self) -> Result<&str, AnchorError> {
        self.web_auth
            .as_deref()
            .ok_or(AnchorError::MissingEndpoint("WEB_AUTH_ENDPOINT"))
    }

    pub fn kyc_server(&self) -> Result<&str, AnchorError> {
        self.kyc_server
            .as_deref()
            .ok_or(AnchorError::MissingEndpoint("KYC_SERVER"))
    }

    pub fn transfer_server(&self) -> Result<&str, AnchorError> {
        self.transfer_server
            .as_deref()
            .ok_or(AnchorError::MissingEndpoint("TRANSFER_SERVER"))
    }

    pub fn direct_payment_server(&self) -> Result<&str, AnchorError> {
        self.direct_payment_server
            .as_deref()
            .ok_or(AnchorError::MissingEndpoint("DIRECT_PAYMENT_SERVER"))
    }
}

fn strip_slash(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_testanchor_toml() {
        let toml = r#"
ACCOUNTS = ["GCSGSR6KQQ5BP2FXVPWRL6SWPUSFWLVONLIBJZUKTVQB5FYJFVL6XOXE"]
VERSION = "0.1.0"
NETWORK_PASSPHRASE = "Test SDF Network ; September 2015"
SIGNING_KEY = "GCHLHDBOKG2JWMJQBTLSL5XG6NO7ESXI2TAQKZXCXWXB5WI2X6W233PR"
TRANSFER_SERVER = "https://testanchor.stellar.org/sep6"
WEB_AUTH_ENDPOINT = "https://testanchor.stellar.org/auth"
KYC_SERVER = "https://testanchor.stellar.org/sep12/"
DIRECT_PAYMENT_SERVER = "https://testanchor.stellar.org/sep31"

[[CURRENCIES]]
code = "SRT"
issuer = "GCDNJUBQSX7AJWLJACMJ7I4BC3Z47BQUTMHEICZLE6MU4KQBRYG5JY6B"
"#;
        let endpoints = AnchorEndpoints::from_toml(toml).unwrap();
        assert_eq!(
            endpoints.web_auth().unwrap(),
            "https://testanchor.stellar.org/auth"
        );
        assert_eq!(
            endpoints.kyc_server().unwrap(),
            "https://testanchor.stellar.org/sep12"
        );
        assert_eq!(
            endpoints.network_passphrase.as_deref(),
            Some("Test SDF Network ; September 2015")
        );
    }

    #[test]
    fn test_missing_endpoint() {
        let endpoints = AnchorEndpoints::from_toml("VERSION = \"2.0\"").unwrap();
        assert_eq!(
            endpoints.transfer_server(),
            Err(AnchorError::MissingEndpoint("TRANSFER_SERVER"))
        );
    }

    #[test]
    fn test_invalid_toml() {
        let err = AnchorEndpoints::from_toml("NOT TOML [").unwrap_err();
        assert!(matches!(err, AnchorError::Protocol(_)));
    }

    #[test]
    fn test_single_host() {
        let endpoints = AnchorEndpoints::single_host("http://127.0.0.1:9000/");
        assert_eq!(endpoints.kyc_server().unwrap(), "http://127.0.0.1:9000/kyc");
        assert_eq!(
            AnchorEndpoints::stellar_toml_url("testanchor.stellar.org"),
            "https://testanchor.stellar.org/.well-known/stellar.toml"
        );
    }
}
