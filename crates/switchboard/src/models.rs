//! Data passed between the browser, the relay, and the upstream gateway.
//!
//! The wire format from the browser is the plain `{role, content}` message
//! shape; the role stays a free string because nothing downstream filters
//! on it. Tool endpoints are built once from configuration at startup and
//! shared read-only across requests.
pub mod message;
pub mod tool;

pub use message::Message;
pub use tool::{ToolAuth, ToolEndpoint};
