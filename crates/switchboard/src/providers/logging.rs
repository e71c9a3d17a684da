use async_stream::stream;
use async_trait::async_trait;
use futures::StreamExt;

use super::base::{FragmentStream, ModelClient};
use crate::errors::ProviderResult;
use crate::generation::{Completion, GenerationRequest};

/// Decorator adding tracing around another client. Call sites stay
/// unchanged; enabling this is a configuration flag, not a code fork.
pub struct LoggingClient {
    inner: Box<dyn ModelClient>,
}

impl LoggingClient {
    pub fn new(inner: Box<dyn ModelClient>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl ModelClient for LoggingClient {
    async fn complete(&self, request: GenerationRequest) -> ProviderResult<Completion> {
        tracing::info!(
            prompt_chars = request.prompt.len(),
            tools = request.tools.len(),
            "dispatching buffered generation"
        );
        match self.inner.complete(request).await {
            Ok(completion) => {
                tracing::info!(
                    outputs = completion.outputs.len(),
                    model = completion.model.as_deref().unwrap_or("unknown"),
                    "generation complete"
                );
                Ok(completion)
            }
            Err(err) => {
                tracing::error!("generation failed: {}", err);
                Err(err)
            }
        }
    }

    async fn complete_stream(&self, request: GenerationRequest) -> ProviderResult<FragmentStream> {
        tracing::info!(
            prompt_chars = request.prompt.len(),
            tools = request.tools.len(),
            "dispatching streaming generation"
        );
        let mut inner = match self.inner.complete_stream(request).await {
            Ok(stream) => stream,
            Err(err) => {
                tracing::error!("failed to start stream: {}", err);
                return Err(err);
            }
        };

        let stream = stream! {
            let mut fragments = 0usize;
            let mut total_chars = 0usize;
            while let Some(item) = inner.next().await {
                match &item {
                    Ok(fragment) => {
                        fragments += 1;
                        total_chars += fragment.text.len();
                    }
                    Err(err) => tracing::error!("stream error after {} fragments: {}", fragments, err),
                }
                yield item;
            }
            tracing::info!(fragments, total_chars, "stream complete");
        };

        Ok(Box::pin(stream))
    }
}
