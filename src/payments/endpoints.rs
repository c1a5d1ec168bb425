//! Endpoint routing table

use crate::error::{RaveError, RaveResult};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const SANDBOX_BASE_URL: &str = "https://ravesandboxapi.flutterwave.com/";
pub const PRODUCTION_BASE_URL: &str = "https://api.ravepay.co/";

/// Appended to the charge URL when retrying after a timeout.
pub const POLLING_HINT: &str = "?use_polling=1";

const CHARGE: &str = "flwv3-pug/getpaidx/api/charge";
const VERIFY: &str = "flwv3-pug/getpaidx/api/v2/verify";
const CARD_VALIDATE: &str = "flwv3-pug/getpaidx/api/validatecharge";
const ACCOUNT_VALIDATE: &str = "flwv3-pug/getpaidx/api/validate";
const CAPTURE: &str = "flwv3-pug/getpaidx/api/capture";
const REFUND_OR_VOID: &str = "flwv3-pug/getpaidx/api/refundorvoid";
const REFUND: &str = "gpx/merchant/transactions/refund";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Sandbox,
    Production,
}

impl Environment {
    pub fn base_url(&self) -> &'static str {
        match self {
            Environment::Sandbox => SANDBOX_BASE_URL,
            Environment::Production => PRODUCTION_BASE_URL,
        }
    }
}

/// Route group an instrument belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointCategory {
    Card,
    Account,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndpointKind {
    Charge,
    Validate,
    Verify,
    Capture,
    RefundOrVoid,
    /// Top-level refund, usable for any instrument.
    Refund,
}

impl EndpointKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EndpointKind::Charge => "charge",
            EndpointKind::Validate => "validate",
            EndpointKind::Verify => "verify",
            EndpointKind::Capture => "capture",
            EndpointKind::RefundOrVoid => "refundorvoid",
            EndpointKind::Refund => "refund",
        }
    }
}

impl fmt::Display for EndpointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn path(category: EndpointCategory, kind: EndpointKind) -> Option<&'static str> {
    use EndpointCategory::*;
    use EndpointKind::*;

    match (category, kind) {
        (_, Charge) => Some(CHARGE),
        (_, Verify) => Some(VERIFY),
        (_, Refund) => Some(REFUND),
        (Card, Validate) => Some(CARD_VALIDATE),
        (Account, Validate) => Some(ACCOUNT_VALIDATE),
        (Card, Capture) => Some(CAPTURE),
        (Card, RefundOrVoid) => Some(REFUND_OR_VOID),
        (Account, Capture) | (Account, RefundOrVoid) => None,
    }
}

#[derive(Debug, Clone)]
pub struct Endpoints {
    base_url: String,
}

impl Endpoints {
    pub fn new(environment: Environment) -> Self {
        Self {
            base_url: environment.base_url().to_string(),
        }
    }

    /// Point at another host (mock gateway, proxy). A trailing slash is added
    /// when missing.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Self { base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, category: EndpointCategory, kind: EndpointKind) -> RaveResult<String> {
        let path = path(category, kind).ok_or_else(|| {
            RaveError::configuration(format!(
                "No {} endpoint is routed for {:?} instruments",
                kind, category
            ))
        })?;
        Ok(format!("{}{}", self.base_url, path))
    }

    pub fn charge_url(&self, category: EndpointCategory, has_failed: bool) -> RaveResult<String> {
        let mut url = self.url(category, EndpointKind::Charge)?;
        if has_failed {
            url.push_str(POLLING_HINT);
        }
        Ok(url)
    }
}
