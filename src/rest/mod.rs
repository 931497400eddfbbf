//! REST calls with normalized, non-throwing outcomes

pub mod adapter;
pub mod query;
pub mod response;

pub use adapter::{RestMessageAdapter, RestRequestType};
pub use response::RestResponse;
