//! Payment gateway clients

pub mod rave;

pub use rave::RaveClient;
