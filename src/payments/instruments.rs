//! Payment instrument adapters
//!
//! Each instrument is described by data only: the fields a caller must
//! supply, the fields filled in when absent, the fields always forced, and
//! the route group its requests go to. One shared preparation routine
//! consumes the table.

use crate::error::{RaveError, RaveResult};
use crate::payments::endpoints::EndpointCategory;
use crate::payments::reference::generate_reference;
use crate::payments::types::PaymentDetails;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

pub const TX_REF: &str = "txRef";
pub const ORDER_REF: &str = "orderRef";

const CARD_FIELDS: &[&str] = &[
    "cardno",
    "cvv",
    "expirymonth",
    "expiryyear",
    "amount",
    "email",
    "phonenumber",
    "firstname",
    "lastname",
    "IP",
];
const ACCOUNT_FIELDS: &[&str] = &[
    "accountbank",
    "accountnumber",
    "amount",
    "email",
    "phonenumber",
    "IP",
];
const GH_MOBILE_FIELDS: &[&str] = &[
    "amount",
    "email",
    "phonenumber",
    "network",
    "IP",
    "redirect_url",
];
const MPESA_FIELDS: &[&str] = &["amount", "email", "phonenumber", "IP"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Instrument {
    Card,
    Account,
    Ussd,
    GhMobileMoney,
    Mpesa,
    Preauth,
}

impl Instrument {
    pub const ALL: [Instrument; 6] = [
        Instrument::Card,
        Instrument::Account,
        Instrument::Ussd,
        Instrument::GhMobileMoney,
        Instrument::Mpesa,
        Instrument::Preauth,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Instrument::Card => "card",
            Instrument::Account => "account",
            Instrument::Ussd => "ussd",
            Instrument::GhMobileMoney => "ghana mobile money",
            Instrument::Mpesa => "mpesa",
            Instrument::Preauth => "preauth",
        }
    }

    pub fn required_fields(&self) -> &'static [&'static str] {
        match self {
            Instrument::Card | Instrument::Preauth => CARD_FIELDS,
            Instrument::Account | Instrument::Ussd => ACCOUNT_FIELDS,
            Instrument::GhMobileMoney => GH_MOBILE_FIELDS,
            Instrument::Mpesa => MPESA_FIELDS,
        }
    }

    /// Filled in only when the caller did not supply the key.
    pub fn defaults(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            Instrument::Card | Instrument::Preauth => &[],
            Instrument::Account => &[("payment_type", "account")],
            Instrument::Ussd => &[("payment_type", "ussd"), ("is_ussd", "1")],
            Instrument::GhMobileMoney => &[
                ("payment_type", "mobilemoneygh"),
                ("country", "GH"),
                ("is_mobile_money_gh", "1"),
                ("currency", "GHS"),
            ],
            Instrument::Mpesa => &[
                ("payment_type", "mpesa"),
                ("country", "KE"),
                ("is_mpesa", "1"),
                ("currency", "KES"),
            ],
        }
    }

    /// Always set, whatever the caller supplied.
    pub fn forced(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            Instrument::Preauth => &[("charge_type", "preauth")],
            _ => &[],
        }
    }

    pub fn generates_order_ref(&self) -> bool {
        matches!(
            self,
            Instrument::Ussd | Instrument::GhMobileMoney | Instrument::Mpesa
        )
    }

    pub fn category(&self) -> EndpointCategory {
        match self {
            Instrument::Card | Instrument::Preauth => EndpointCategory::Card,
            _ => EndpointCategory::Account,
        }
    }

    /// Fail on the first required field (in table order) missing from `details`.
    pub fn check_required(&self, details: &PaymentDetails) -> RaveResult<()> {
        let required = self.required_fields();
        match required.iter().find(|field| !details.contains_key(**field)) {
            Some(missing) => Err(RaveError::incomplete(*missing, required)),
            None => Ok(()),
        }
    }

    /// Build the request map for a charge: checks required fields, then
    /// copies the caller's map and injects defaults, forced fields and
    /// references. The caller's map is left untouched.
    pub fn prepare(
        &self,
        details: &PaymentDetails,
        reference_prefix: Option<&str>,
    ) -> RaveResult<PaymentDetails> {
        self.check_required(details)?;

        let mut request = details.clone();
        for (key, value) in self.defaults() {
            request
                .entry(key.to_string())
                .or_insert_with(|| Value::String(value.to_string()));
        }
        for (key, value) in self.forced() {
            request.insert(key.to_string(), Value::String(value.to_string()));
        }
        if !request.contains_key(TX_REF) {
            request.insert(
                TX_REF.to_string(),
                Value::String(generate_reference(reference_prefix)),
            );
        }
        if self.generates_order_ref() && !request.contains_key(ORDER_REF) {
            request.insert(
                ORDER_REF.to_string(),
                Value::String(generate_reference(reference_prefix)),
            );
        }

        Ok(request)
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
