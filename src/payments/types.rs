//! Request and outcome types shared by the payment operations

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Open field map sent to the gateway (instrument fields plus `amount`,
/// `email`, `phonenumber`, `IP`, `txRef`, `orderRef`, ...).
pub type PaymentDetails = Map<String, Value>;

/// Follow-up authentication suggested by the gateway after a charge.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AuthMethod {
    Pin,
    AvsVbvSecureCode,
    NoAuthInternational,
    /// Anything else the gateway suggests (bank-specific USSD codes, ...),
    /// kept verbatim.
    Other(String),
}

impl AuthMethod {
    pub fn as_str(&self) -> &str {
        match self {
            AuthMethod::Pin => "PIN",
            AuthMethod::AvsVbvSecureCode => "AVS_VBVSECURECODE",
            AuthMethod::NoAuthInternational => "NOAUTH_INTERNATIONAL",
            AuthMethod::Other(value) => value.as_str(),
        }
    }
}

impl From<&str> for AuthMethod {
    fn from(value: &str) -> Self {
        match value {
            "PIN" => AuthMethod::Pin,
            "AVS_VBVSECURECODE" => AuthMethod::AvsVbvSecureCode,
            "NOAUTH_INTERNATIONAL" => AuthMethod::NoAuthInternational,
            other => AuthMethod::Other(other.to_string()),
        }
    }
}

impl fmt::Display for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for AuthMethod {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for AuthMethod {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(AuthMethod::from(value.as_str()))
    }
}

/// Result of one request/response cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TransactionOutcome {
    /// The step finished (`"00"` response code)
    Complete,
    /// The charge needs another step before it completes
    ValidationRequired {
        auth_method: Option<AuthMethod>,
        redirect_url: Option<String>,
        instructions: Option<String>,
    },
    /// The gateway answered but the transaction did not go through
    Failed { reason: String },
}

impl TransactionOutcome {
    pub fn is_complete(&self) -> bool {
        matches!(self, TransactionOutcome::Complete)
    }

    pub fn requires_validation(&self) -> bool {
        matches!(self, TransactionOutcome::ValidationRequired { .. })
    }

    pub fn auth_method(&self) -> Option<&AuthMethod> {
        match self {
            TransactionOutcome::ValidationRequired { auth_method, .. } => auth_method.as_ref(),
            _ => None,
        }
    }
}

/// Result of a charge call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChargeResult {
    pub tx_ref: String,
    /// Gateway reference, needed for validate/capture/void/refund
    pub flw_ref: Option<String>,
    pub outcome: TransactionOutcome,
    /// Field map actually submitted (defaults and references included).
    /// Pass it to `merge_follow_up` when the charge asks for a PIN or address.
    pub request: PaymentDetails,
    /// Raw `data` object returned by the gateway
    pub data: Value,
}

/// Result of validate, capture, void and refund calls
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationResult {
    pub flw_ref: Option<String>,
    pub outcome: TransactionOutcome,
    pub data: Value,
}

/// Result of a verify call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyResult {
    pub tx_ref: String,
    pub flw_ref: Option<String>,
    pub outcome: TransactionOutcome,
    pub amount: Option<Value>,
    pub currency: Option<String>,
    /// Reusable card token, for card transactions
    pub card_token: Option<String>,
    pub data: Value,
}

impl VerifyResult {
    /// Whether the gateway reports the transaction as settled
    pub fn is_complete(&self) -> bool {
        self.outcome.is_complete()
    }
}

/// Supplemental data shape an auth method requires before resubmitting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FollowUpShape {
    /// `pin: string`
    Pin,
    /// `billingzip`, `billingcity`, `billingaddress`, `billingstate`, `billingcountry`
    Address,
}

/// Data the customer supplied for a follow-up step
#[derive(Debug, Clone, PartialEq)]
pub enum Supplemental {
    Pin(String),
    Address(Map<String, Value>),
}
