use thiserror::Error;

use crate::payments::instruments::Instrument;

pub type RaveResult<T> = Result<T, RaveError>;

/// Message used when the gateway rejects a call without explaining why.
pub const NO_MESSAGE: &str = "Your call failed with no message";

/// What the gateway said when it rejected an operation, plus the references
/// known at that point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayFailure {
    pub message: String,
    pub tx_ref: Option<String>,
    pub flw_ref: Option<String>,
}

impl GatewayFailure {
    pub fn new(
        message: impl Into<String>,
        tx_ref: Option<String>,
        flw_ref: Option<String>,
    ) -> Self {
        Self {
            message: message.into(),
            tx_ref,
            flw_ref,
        }
    }
}

#[derive(Debug, Error)]
pub enum RaveError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error(
        "\"{missing_field}\" was not defined in your payment details. Please supply: {}",
        .required_fields.join(", ")
    )]
    IncompletePaymentDetails {
        missing_field: String,
        required_fields: Vec<String>,
    },

    #[error("Auth method \"{auth_method}\" is not supported")]
    UnsupportedAuthMethod { auth_method: String },

    #[error("Gateway returned an unreadable response (HTTP {status})")]
    GatewayProtocol {
        status: u16,
        body: String,
        tx_ref: Option<String>,
    },

    #[error(
        "Your {} charge call failed with message: {}",
        .instrument.map(|i| i.as_str()).unwrap_or("payment"),
        .failure.message
    )]
    Charge {
        instrument: Option<Instrument>,
        failure: GatewayFailure,
    },

    #[error("Your transaction validation call failed with message: {}", .0.message)]
    Validation(GatewayFailure),

    #[error("Your transaction verification call failed with message: {}", .0.message)]
    Verification(GatewayFailure),

    #[error("Your preauth capture call failed with message: {}", .0.message)]
    Capture(GatewayFailure),

    #[error("Your preauth refund/void call failed with message: {}", .0.message)]
    RefundVoid(GatewayFailure),

    #[error("Your refund call failed with message: {}", .0.message)]
    Refund(GatewayFailure),

    #[error("Timeout error: {endpoint} did not answer within {seconds} seconds")]
    Timeout {
        seconds: u64,
        endpoint: String,
        tx_ref: Option<String>,
    },

    #[error("Transport error: {message}")]
    Transport { message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RaveError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn incomplete(missing_field: impl Into<String>, required_fields: &[&str]) -> Self {
        Self::IncompletePaymentDetails {
            missing_field: missing_field.into(),
            required_fields: required_fields.iter().map(|f| f.to_string()).collect(),
        }
    }

    pub fn unsupported_auth_method(auth_method: impl Into<String>) -> Self {
        Self::UnsupportedAuthMethod {
            auth_method: auth_method.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Server-side or network conditions; the caller may retry the same
    /// transaction reference (with the polling hint for charges).
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::GatewayProtocol { .. } | Self::Timeout { .. } | Self::Transport { .. }
        )
    }

    /// Raised locally before anything was sent; fix the input and resubmit.
    pub fn is_caller_fixable(&self) -> bool {
        matches!(
            self,
            Self::IncompletePaymentDetails { .. } | Self::UnsupportedAuthMethod { .. }
        )
    }

    fn failure(&self) -> Option<&GatewayFailure> {
        match self {
            Self::Charge { failure, .. } => Some(failure),
            Self::Validation(f)
            | Self::Verification(f)
            | Self::Capture(f)
            | Self::RefundVoid(f)
            | Self::Refund(f) => Some(f),
            _ => None,
        }
    }

    /// The gateway's own message, verbatim, for gateway-raised errors.
    pub fn gateway_message(&self) -> Option<&str> {
        self.failure().map(|f| f.message.as_str())
    }

    pub fn tx_ref(&self) -> Option<&str> {
        match self {
            Self::GatewayProtocol { tx_ref, .. } | Self::Timeout { tx_ref, .. } => {
                tx_ref.as_deref()
            }
            _ => self.failure().and_then(|f| f.tx_ref.as_deref()),
        }
    }

    pub fn flw_ref(&self) -> Option<&str> {
        self.failure().and_then(|f| f.flw_ref.as_deref())
    }
}

#[cfg(feature = "http")]
impl From<reqwest::Error> for RaveError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RaveError::Timeout {
                seconds: 0,
                endpoint: err.url().map(|u| u.to_string()).unwrap_or_default(),
                tx_ref: None,
            }
        } else {
            RaveError::transport(format!("Request error: {}", err))
        }
    }
}
