//! Rave gateway client
//!
//! Every operation runs the same pipeline: build the request (encrypting the
//! field map for charges), POST it through the [`HttpTransport`] under a
//! timeout, and hand the response to the classifier. The client holds no
//! mutable state and can serve concurrent transactions.
//!
//! Verify, capture, void and refund send the secret key in the clear in the
//! request body instead of an encrypted blob; that is the gateway's wire
//! format for those endpoints.

use crate::config::RaveConfig;
use crate::error::{RaveError, RaveResult};
use crate::payments::cipher::{self, ALGORITHM};
use crate::payments::classifier::{classify, Classified, RequestContext};
use crate::payments::credentials::Credentials;
use crate::payments::endpoints::{EndpointCategory, EndpointKind, Endpoints};
use crate::payments::follow_up::merge_follow_up;
use crate::payments::instruments::{Instrument, TX_REF};
use crate::payments::traits::{HttpResponse, HttpTransport};
use crate::payments::types::{
    ChargeResult, OperationResult, PaymentDetails, Supplemental, TransactionOutcome, VerifyResult,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

const JSON_HEADERS: &[(&str, &str)] = &[("Content-Type", "application/json")];

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Rave gateway client bound to one set of credentials
pub struct RaveClient {
    config: RaveConfig,
    credentials: Credentials,
    endpoints: Endpoints,
    transport: Arc<dyn HttpTransport>,
}

impl RaveClient {
    /// Create a client using the bundled reqwest transport
    #[cfg(feature = "http")]
    pub fn new(config: RaveConfig) -> RaveResult<Self> {
        let transport = crate::payments::transport::ReqwestTransport::new(config.timeout())?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Create a client from `RAVE_*` environment variables
    #[cfg(feature = "http")]
    pub fn from_env() -> RaveResult<Self> {
        let config = RaveConfig::from_env()?;
        Self::new(config)
    }

    pub fn with_transport(
        config: RaveConfig,
        transport: Arc<dyn HttpTransport>,
    ) -> RaveResult<Self> {
        config.validate()?;
        let credentials = Credentials::new(config.public_key.clone(), config.secret_key.clone())?;

        let endpoints = match &config.base_url {
            Some(url) => Endpoints::with_base_url(url.clone()),
            None => Endpoints::new(config.environment()),
        };

        info!(
            "Rave client initialized for {:?} with URL: {}",
            config.environment(),
            endpoints.base_url()
        );

        Ok(Self {
            config,
            credentials,
            endpoints,
            transport,
        })
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub fn public_key(&self) -> &str {
        self.credentials.public_key()
    }

    fn timeout(&self) -> Duration {
        self.config.timeout()
    }

    /// POST under the configured timeout. An elapsed timeout is reported as
    /// [`RaveError::Timeout`]; retry a charge with `has_failed = true`.
    async fn send(
        &self,
        kind: EndpointKind,
        url: &str,
        body: &Value,
        tx_ref: Option<&str>,
    ) -> RaveResult<HttpResponse> {
        let timeout = self.timeout();
        let timed_out = || RaveError::Timeout {
            seconds: timeout.as_secs(),
            endpoint: kind.to_string(),
            tx_ref: tx_ref.map(str::to_string),
        };

        match tokio::time::timeout(timeout, self.transport.post_json(url, JSON_HEADERS, body)).await
        {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(RaveError::Timeout { .. })) | Err(_) => {
                warn!(
                    "{} call timed out after {:?} (txRef={:?})",
                    kind, timeout, tx_ref
                );
                Err(timed_out())
            }
            Ok(Err(e)) => {
                warn!("{} call failed before a response arrived: {}", kind, e);
                Err(e)
            }
        }
    }

    /// Charge a payment instrument.
    ///
    /// `details` is copied, never modified. Set `has_failed` when retrying a
    /// charge whose previous attempt timed out (same `txRef`); the gateway is
    /// then asked to poll instead of charging twice.
    pub async fn charge(
        &self,
        instrument: Instrument,
        details: &PaymentDetails,
        has_failed: bool,
    ) -> RaveResult<ChargeResult> {
        let request = instrument.prepare(details, self.config.reference_prefix.as_deref())?;
        let tx_ref = request.get(TX_REF).map(value_text).unwrap_or_default();

        info!(
            "Initiating {} charge: txRef={}, retry={}",
            instrument, tx_ref, has_failed
        );

        let mut payload = request.clone();
        payload.insert(
            "PBFPubKey".to_string(),
            Value::String(self.credentials.public_key().to_string()),
        );
        let client = cipher::encrypt(
            &serde_json::to_string(&payload)?,
            self.credentials.encryption_key(),
        )?;

        let body = json!({
            "PBFPubKey": self.credentials.public_key(),
            "client": client,
            "alg": ALGORITHM,
        });

        let url = self.endpoints.charge_url(instrument.category(), has_failed)?;
        let response = self
            .send(EndpointKind::Charge, &url, &body, Some(&tx_ref))
            .await?;

        let context = RequestContext::new(Some(instrument))
            .with_tx_ref(tx_ref.clone())
            .with_account_bank(request.get("accountbank").map(value_text));
        let Classified {
            outcome,
            flw_ref,
            data,
        } = classify(&response, EndpointKind::Charge, &context)?;

        info!(
            "{} charge answered: txRef={}, flwRef={:?}, complete={}",
            instrument,
            tx_ref,
            flw_ref,
            outcome.is_complete()
        );

        Ok(ChargeResult {
            tx_ref,
            flw_ref,
            outcome,
            request,
            data,
        })
    }

    /// Resubmit a charge that asked for a PIN or billing address, merging
    /// `supplemental` into the request the previous charge sent.
    pub async fn charge_with_follow_up(
        &self,
        instrument: Instrument,
        previous: &ChargeResult,
        supplemental: &Supplemental,
    ) -> RaveResult<ChargeResult> {
        let auth_method = previous
            .outcome
            .auth_method()
            .ok_or_else(|| {
                RaveError::configuration(format!(
                    "Charge {} did not ask for a PIN or address follow-up",
                    previous.tx_ref
                ))
            })?;
        let merged = merge_follow_up(&previous.request, auth_method, supplemental)?;
        self.charge(instrument, &merged, false).await
    }

    /// Complete an OTP step. A rejected OTP is a terminal
    /// [`RaveError::Validation`]; call again to retry with another OTP.
    pub async fn validate(
        &self,
        instrument: Instrument,
        flw_ref: &str,
        otp: &str,
    ) -> RaveResult<OperationResult> {
        info!("Validating {} transaction: flwRef={}", instrument, flw_ref);

        let body = json!({
            "PBFPubKey": self.credentials.public_key(),
            "transactionreference": flw_ref,
            "transaction_reference": flw_ref,
            "otp": otp,
        });
        let url = self
            .endpoints
            .url(instrument.category(), EndpointKind::Validate)?;
        let response = self.send(EndpointKind::Validate, &url, &body, None).await?;

        let context = RequestContext::new(Some(instrument)).with_flw_ref(flw_ref);
        let classified = classify(&response, EndpointKind::Validate, &context)?;

        info!("Transaction validated: flwRef={:?}", classified.flw_ref);
        Ok(OperationResult {
            flw_ref: classified.flw_ref,
            outcome: classified.outcome,
            data: classified.data,
        })
    }

    /// Query the settlement status of a transaction by its `txRef`
    pub async fn verify(&self, tx_ref: &str) -> RaveResult<VerifyResult> {
        info!("Verifying transaction: txRef={}", tx_ref);

        let body = json!({
            "txref": tx_ref,
            "SECKEY": self.credentials.secret_key(),
        });
        let url = self
            .endpoints
            .url(EndpointCategory::Card, EndpointKind::Verify)?;
        let response = self
            .send(EndpointKind::Verify, &url, &body, Some(tx_ref))
            .await?;

        let context = RequestContext::default().with_tx_ref(tx_ref);
        let Classified {
            outcome,
            flw_ref,
            data,
        } = classify(&response, EndpointKind::Verify, &context)?;

        let card_token = data
            .pointer("/card/card_tokens/0/embedtoken")
            .and_then(Value::as_str)
            .map(str::to_string);
        info!(
            "Transaction verified: txRef={}, complete={}",
            tx_ref,
            outcome.is_complete()
        );

        Ok(VerifyResult {
            tx_ref: tx_ref.to_string(),
            flw_ref,
            outcome,
            amount: data.get("amount").cloned(),
            currency: data.get("currency").and_then(Value::as_str).map(str::to_string),
            card_token,
            data,
        })
    }

    async fn secret_operation(
        &self,
        kind: EndpointKind,
        flw_ref: &str,
        body: Value,
    ) -> RaveResult<OperationResult> {
        let url = self.endpoints.url(EndpointCategory::Card, kind)?;
        let response = self.send(kind, &url, &body, None).await?;

        let context = RequestContext::new(Some(Instrument::Preauth)).with_flw_ref(flw_ref);
        let classified = classify(&response, kind, &context)?;

        if let TransactionOutcome::Failed { reason } = &classified.outcome {
            warn!("{} for flwRef={} not completed: {}", kind, flw_ref, reason);
        } else {
            info!("{} completed for flwRef={}", kind, flw_ref);
        }

        Ok(OperationResult {
            flw_ref: classified.flw_ref,
            outcome: classified.outcome,
            data: classified.data,
        })
    }

    /// Settle a preauthorized charge
    pub async fn capture(&self, flw_ref: &str) -> RaveResult<OperationResult> {
        info!("Capturing preauthorized transaction: flwRef={}", flw_ref);
        let body = json!({
            "SECKEY": self.credentials.secret_key(),
            "flwRef": flw_ref,
        });
        self.secret_operation(EndpointKind::Capture, flw_ref, body)
            .await
    }

    /// Release a preauthorized charge
    pub async fn void(&self, flw_ref: &str) -> RaveResult<OperationResult> {
        info!("Voiding preauthorized transaction: flwRef={}", flw_ref);
        let body = json!({
            "SECKEY": self.credentials.secret_key(),
            "flwRef": flw_ref,
            "action": "void",
        });
        self.secret_operation(EndpointKind::RefundOrVoid, flw_ref, body)
            .await
    }

    /// Refund a preauthorized charge, fully or (with `amount`) partially
    pub async fn refund(&self, flw_ref: &str, amount: Option<&str>) -> RaveResult<OperationResult> {
        info!(
            "Refunding preauthorized transaction: flwRef={}, amount={:?}",
            flw_ref, amount
        );
        let mut body = json!({
            "SECKEY": self.credentials.secret_key(),
            "flwRef": flw_ref,
            "action": "refund",
        });
        if let Some(amount) = amount {
            body["amount"] = Value::String(amount.to_string());
        }
        self.secret_operation(EndpointKind::RefundOrVoid, flw_ref, body)
            .await
    }

    /// Refund any completed transaction through the merchant refund endpoint
    pub async fn refund_transaction(&self, flw_ref: &str) -> RaveResult<OperationResult> {
        info!("Refunding transaction: flwRef={}", flw_ref);
        let body = json!({
            "ref": flw_ref,
            "seckey": self.credentials.secret_key(),
        });
        self.secret_operation(EndpointKind::Refund, flw_ref, body)
            .await
    }
}
