//! Client-side protocol engine for the Rave (Flutterwave) payment gateway
//!
//! Formats card, bank account, USSD and mobile-money charges, encrypts them
//! the way the gateway expects, and classifies its answers into
//! [`TransactionOutcome`]s or typed [`RaveError`]s.
//!
//! ```no_run
//! use rave_gateway::{Instrument, PaymentDetails, RaveClient, RaveConfig};
//!
//! # async fn run(details: PaymentDetails) -> rave_gateway::RaveResult<()> {
//! let client = RaveClient::new(RaveConfig::new("FLWPUBK-...", "FLWSECK-..."))?;
//! let charge = client.charge(Instrument::Card, &details, false).await?;
//! if charge.outcome.requires_validation() {
//!     // collect an OTP, PIN or address from the customer
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod payments;

pub use config::RaveConfig;
pub use error::{GatewayFailure, RaveError, RaveResult};
pub use payments::endpoints::Environment;
pub use payments::follow_up::{merge_follow_up, resolve_follow_up};
pub use payments::instruments::Instrument;
pub use payments::providers::RaveClient;
pub use payments::traits::{HttpResponse, HttpTransport};
pub use payments::types::{
    AuthMethod, ChargeResult, FollowUpShape, OperationResult, PaymentDetails, Supplemental,
    TransactionOutcome, VerifyResult,
};
