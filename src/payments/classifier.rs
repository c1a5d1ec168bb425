//! Gateway response classification
//!
//! The gateway names its response-code field differently per endpoint
//! (`chargeResponseCode`, `tx.chargeResponseCode`, `chargecode`). All of that
//! lives in [`response_fields`]; the decision procedure in [`classify`] only
//! asks the table where to look. A new endpoint quirk is a new table row.

use crate::error::{GatewayFailure, RaveError, RaveResult, NO_MESSAGE};
use crate::payments::endpoints::EndpointKind;
use crate::payments::instruments::Instrument;
use crate::payments::traits::HttpResponse;
use crate::payments::types::{AuthMethod, TransactionOutcome};
use serde_json::Value;
use tracing::{error, warn};

/// Response code meaning "this step is complete".
pub const SUCCESS_CODE: &str = "00";

/// GTBank's sort code; its USSD charges are completed with a fixed dial string.
pub const GTBANK_CODE: &str = "058";
pub const GTBANK_USSD_INSTRUCTIONS: &str =
    "To complete this transaction, please dial *737*50*charged_amount*159#";

type FieldPath = &'static [&'static str];

/// Where one endpoint keeps the fields the classifier reads. Paths are tried
/// in order; the first present one wins.
#[derive(Debug, Clone, Copy)]
pub struct ResponseFields {
    /// Empty when the endpoint has no code and a success body is complete.
    pub code: &'static [FieldPath],
    pub message: &'static [FieldPath],
}

const FLW_REF_PATHS: &[FieldPath] = &[
    &["data", "flwRef"],
    &["data", "flwref"],
    &["data", "tx", "flwRef"],
];
const ERROR_MESSAGE_PATHS: &[FieldPath] = &[&["message"], &["data", "message"]];

const CHARGE_FIELDS: ResponseFields = ResponseFields {
    code: &[&["data", "chargeResponseCode"]],
    message: &[&["data", "chargeResponseMessage"]],
};
const VALIDATE_FIELDS: ResponseFields = ResponseFields {
    code: &[&["data", "tx", "chargeResponseCode"], &["data", "chargeResponseCode"]],
    message: &[
        &["data", "tx", "chargeResponseMessage"],
        &["data", "chargeResponseMessage"],
    ],
};
const VERIFY_FIELDS: ResponseFields = ResponseFields {
    code: &[&["data", "chargecode"]],
    message: &[&["data", "chargemessage"], &["data", "status"]],
};
const REFUND_FIELDS: ResponseFields = ResponseFields {
    code: &[],
    message: &[&["message"]],
};

pub fn response_fields(kind: EndpointKind) -> ResponseFields {
    match kind {
        EndpointKind::Charge | EndpointKind::Capture | EndpointKind::RefundOrVoid => {
            CHARGE_FIELDS
        }
        EndpointKind::Validate => VALIDATE_FIELDS,
        EndpointKind::Verify => VERIFY_FIELDS,
        EndpointKind::Refund => REFUND_FIELDS,
    }
}

/// What the caller knew when it sent the request.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub instrument: Option<Instrument>,
    pub tx_ref: Option<String>,
    pub flw_ref: Option<String>,
    /// Bank code of the charged account (USSD instructions depend on it)
    pub account_bank: Option<String>,
}

impl RequestContext {
    pub fn new(instrument: Option<Instrument>) -> Self {
        Self {
            instrument,
            ..Default::default()
        }
    }

    pub fn with_tx_ref(mut self, tx_ref: impl Into<String>) -> Self {
        self.tx_ref = Some(tx_ref.into());
        self
    }

    pub fn with_flw_ref(mut self, flw_ref: impl Into<String>) -> Self {
        self.flw_ref = Some(flw_ref.into());
        self
    }

    pub fn with_account_bank(mut self, account_bank: Option<String>) -> Self {
        self.account_bank = account_bank;
        self
    }
}

/// A successfully classified response.
#[derive(Debug, Clone)]
pub struct Classified {
    pub outcome: TransactionOutcome,
    pub flw_ref: Option<String>,
    /// The response's `data` member (`Value::Null` when absent)
    pub data: Value,
}

fn lookup<'a>(body: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(body, |value, key| value.get(*key))
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// First path yielding a string (or number) value.
fn first_text(body: &Value, paths: &[FieldPath]) -> Option<String> {
    paths
        .iter()
        .find_map(|path| lookup(body, path).and_then(as_text))
}

fn endpoint_error(kind: EndpointKind, context: &RequestContext, failure: GatewayFailure) -> RaveError {
    match kind {
        EndpointKind::Charge => RaveError::Charge {
            instrument: context.instrument,
            failure,
        },
        EndpointKind::Validate => RaveError::Validation(failure),
        EndpointKind::Verify => RaveError::Verification(failure),
        EndpointKind::Capture => RaveError::Capture(failure),
        EndpointKind::RefundOrVoid => RaveError::RefundVoid(failure),
        EndpointKind::Refund => RaveError::Refund(failure),
    }
}

fn follow_up_instructions(data: &Value, context: &RequestContext) -> Option<String> {
    if context.instrument == Some(Instrument::Ussd)
        && context.account_bank.as_deref() == Some(GTBANK_CODE)
    {
        return Some(GTBANK_USSD_INSTRUCTIONS.to_string());
    }

    match data.get("validateInstructions") {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::Object(obj)) => obj.get("instruction").and_then(as_text),
        _ => data.get("chargeResponseMessage").and_then(as_text),
    }
}

fn redirect_url(data: &Value) -> Option<String> {
    data.get("authurl")
        .and_then(as_text)
        .filter(|url| !url.is_empty() && url != "N/A")
}

/// Turn an HTTP response from `kind` into an outcome, or the typed error the
/// gateway's answer amounts to.
pub fn classify(
    response: &HttpResponse,
    kind: EndpointKind,
    context: &RequestContext,
) -> RaveResult<Classified> {
    let body: Value = serde_json::from_str(&response.body).map_err(|e| {
        warn!(
            "Unparseable {} response (HTTP {}): {}",
            kind, response.status, e
        );
        RaveError::GatewayProtocol {
            status: response.status,
            body: response.body.clone(),
            tx_ref: context.tx_ref.clone(),
        }
    })?;

    let flw_ref = first_text(&body, FLW_REF_PATHS).or_else(|| context.flw_ref.clone());
    let gateway_status = body.get("status").and_then(Value::as_str);

    if !response.is_success() || gateway_status == Some("error") {
        let message = first_text(&body, ERROR_MESSAGE_PATHS).unwrap_or_else(|| NO_MESSAGE.to_string());
        error!(
            "Gateway rejected {} call (HTTP {}): {}",
            kind, response.status, message
        );
        let failure = GatewayFailure::new(message, context.tx_ref.clone(), flw_ref);
        return Err(endpoint_error(kind, context, failure));
    }

    let fields = response_fields(kind);
    let data = match body.get("data") {
        Some(data @ Value::Object(_)) => data.clone(),
        other if fields.code.is_empty() => other.cloned().unwrap_or(Value::Null),
        _ => {
            warn!(
                "{} response without a data object (HTTP {})",
                kind, response.status
            );
            return Err(RaveError::GatewayProtocol {
                status: response.status,
                body: response.body.clone(),
                tx_ref: context.tx_ref.clone(),
            });
        }
    };
    let complete = fields.code.is_empty()
        || first_text(&body, fields.code).as_deref() == Some(SUCCESS_CODE);

    let outcome = if complete {
        TransactionOutcome::Complete
    } else {
        let message = first_text(&body, fields.message);
        match kind {
            EndpointKind::Charge => TransactionOutcome::ValidationRequired {
                auth_method: data
                    .get("suggested_auth")
                    .and_then(Value::as_str)
                    .map(AuthMethod::from),
                redirect_url: redirect_url(&data),
                instructions: follow_up_instructions(&data, context),
            },
            EndpointKind::Validate => {
                let failure = GatewayFailure::new(
                    message.unwrap_or_else(|| NO_MESSAGE.to_string()),
                    context.tx_ref.clone(),
                    flw_ref,
                );
                return Err(RaveError::Validation(failure));
            }
            _ => TransactionOutcome::Failed {
                reason: message.unwrap_or_else(|| "Transaction not completed".to_string()),
            },
        }
    };

    Ok(Classified {
        outcome,
        flw_ref,
        data,
    })
}
