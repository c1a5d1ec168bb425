//! Rave payment gateway protocol
//!
//! Payload encryption, per-instrument request rules, endpoint routing and
//! response classification, tied together by [`providers::RaveClient`].

pub mod cipher;
pub mod classifier;
pub mod credentials;
pub mod endpoints;
pub mod follow_up;
pub mod instruments;
pub mod providers;
pub mod reference;
pub mod traits;
#[cfg(feature = "http")]
pub mod transport;
pub mod types;
