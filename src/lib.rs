//! Platform adapters for the SDK
//!
//! - [`observability`] - severity-filtered event logging to console and file
//! - [`rest`] - REST calls that always resolve to a normalized response

pub mod config;
pub mod error;
pub mod observability;
pub mod rest;

pub use error::AdapterError;
