use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::errors::ProviderResult;
use crate::generation::{Completion, Fragment, GenerationRequest};

/// Incremental output of a streaming generation. Fragments arrive in
/// emission order; the stream is finite and cannot be restarted.
pub type FragmentStream = BoxStream<'static, ProviderResult<Fragment>>;

/// Base trait for model backends.
///
/// Requests are taken by value: each one is built fresh for a single
/// HTTP call and carries the complete conversation, so implementations
/// hold no per-conversation state. Instrumentation wraps this trait
/// rather than forking the call sites (see [`super::logging`]).
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Run a generation to completion and return the terminal outcome.
    async fn complete(&self, request: GenerationRequest) -> ProviderResult<Completion>;

    /// Start a streaming generation. Errors before any output arrive as
    /// the outer `Result`; mid-stream failures arrive as an `Err` item.
    async fn complete_stream(&self, request: GenerationRequest) -> ProviderResult<FragmentStream>;
}
