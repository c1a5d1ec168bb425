//! Follow-up data for charges that asked for a PIN or a billing address

use crate::error::{RaveError, RaveResult};
use crate::payments::instruments::{ORDER_REF, TX_REF};
use crate::payments::types::{AuthMethod, FollowUpShape, PaymentDetails, Supplemental};
use serde_json::Value;

pub const PIN_FIELDS: &[&str] = &["pin"];
pub const ADDRESS_FIELDS: &[&str] = &[
    "billingzip",
    "billingcity",
    "billingaddress",
    "billingstate",
    "billingcountry",
];

/// Which supplemental data `auth_method` needs.
pub fn resolve_follow_up(auth_method: &AuthMethod) -> RaveResult<FollowUpShape> {
    match auth_method {
        AuthMethod::Pin => Ok(FollowUpShape::Pin),
        AuthMethod::AvsVbvSecureCode | AuthMethod::NoAuthInternational => {
            Ok(FollowUpShape::Address)
        }
        AuthMethod::Other(other) => Err(RaveError::unsupported_auth_method(other.as_str())),
    }
}

/// Merge the customer's supplemental data into the field map of the
/// original charge so it can be charged again.
///
/// The shape is checked first (non-empty pin, or all five billing fields).
/// `txRef` and `orderRef` of the original are kept even if the supplement
/// carries keys of the same name. `original` itself is not modified.
pub fn merge_follow_up(
    original: &PaymentDetails,
    auth_method: &AuthMethod,
    supplemental: &Supplemental,
) -> RaveResult<PaymentDetails> {
    let shape = resolve_follow_up(auth_method)?;
    let mut merged = original.clone();

    match (shape, supplemental) {
        (FollowUpShape::Pin, Supplemental::Pin(pin)) if !pin.trim().is_empty() => {
            merged.insert("pin".to_string(), Value::String(pin.clone()));
        }
        (FollowUpShape::Pin, _) => return Err(RaveError::incomplete("pin", PIN_FIELDS)),
        (FollowUpShape::Address, Supplemental::Address(address)) => {
            if let Some(missing) = ADDRESS_FIELDS.iter().find(|f| !address.contains_key(**f)) {
                return Err(RaveError::incomplete(*missing, ADDRESS_FIELDS));
            }
            for (key, value) in address {
                if key != TX_REF && key != ORDER_REF {
                    merged.insert(key.clone(), value.clone());
                }
            }
        }
        (FollowUpShape::Address, Supplemental::Pin(_)) => {
            return Err(RaveError::incomplete(ADDRESS_FIELDS[0], ADDRESS_FIELDS))
        }
    }

    merged.insert(
        "suggested_auth".to_string(),
        Value::String(auth_method.as_str().to_string()),
    );
    Ok(merged)
}
