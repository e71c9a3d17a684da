use async_trait::async_trait;
use futures::stream;

use super::base::{FragmentStream, ModelClient};
use crate::errors::ProviderResult;
use crate::generation::{Completion, Fragment, GenerationRequest};

/// A mock client returning pre-configured outcomes for testing.
#[derive(Default)]
pub struct MockClient {
    completion: Completion,
    fragments: Vec<Fragment>,
}

impl MockClient {
    pub fn with_outputs(outputs: Vec<&str>) -> Self {
        Self {
            completion: Completion {
                outputs: outputs.into_iter().map(str::to_string).collect(),
                model: Some("mock-model".to_string()),
            },
            ..Default::default()
        }
    }

    pub fn with_fragments(fragments: Vec<Fragment>) -> Self {
        Self {
            fragments,
            ..Default::default()
        }
    }
}

#[async_trait]
impl ModelClient for MockClient {
    async fn complete(&self, _request: GenerationRequest) -> ProviderResult<Completion> {
        Ok(self.completion.clone())
    }

    async fn complete_stream(&self, _request: GenerationRequest) -> ProviderResult<FragmentStream> {
        let fragments: Vec<ProviderResult<Fragment>> =
            self.fragments.iter().cloned().map(Ok).collect();
        Ok(Box::pin(stream::iter(fragments)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_completion() {
        let client = MockClient::with_outputs(vec!["", "tool echo", "final"]);
        let request = GenerationRequest::from_conversation(&[], Vec::new());
        let completion = client.complete(request).await.unwrap();
        assert_eq!(completion.final_text(), Some("final"));
    }
}
