//! Errors raised synchronously by the adapters.
//!
//! Transport failures are not errors: the REST adapter folds them into a
//! [`RestResponse`](crate::rest::RestResponse) with `ok == false`.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AdapterError {
    /// A required string argument was empty.
    #[error("argument '{0}' is required and must not be empty")]
    ArgumentMissing(&'static str),
    /// The runtime has no capability for the requested operation.
    #[error("capability unavailable: {0}")]
    CapabilityUnavailable(&'static str),
}
