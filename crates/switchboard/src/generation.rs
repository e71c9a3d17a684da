//! Per-request generation types.
//!
//! A [`GenerationRequest`] is constructed fresh for every HTTP call and
//! never reused: the upstream is handed the full ordered conversation
//! each time, so no state has to survive between calls.

use crate::models::{Message, ToolEndpoint};

/// Everything the upstream needs for one generation call.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// The serialized conversation, sent as the prompt payload.
    pub prompt: String,
    /// Tool services the gateway may call while generating. Empty when
    /// the classifier decided the request needs no augmentation.
    pub tools: Vec<ToolEndpoint>,
}

impl GenerationRequest {
    /// Build a request from the full conversation history. The messages
    /// are serialized in order as pretty-printed JSON.
    pub fn from_conversation(messages: &[Message], tools: Vec<ToolEndpoint>) -> Self {
        let prompt = serde_json::to_string_pretty(messages).unwrap_or_default();
        Self { prompt, tools }
    }
}

/// Terminal outcome of a buffered generation.
///
/// `outputs` holds every upstream output in emission order; entries may
/// be empty when a generation step produced only a tool interaction.
#[derive(Debug, Clone, Default)]
pub struct Completion {
    pub outputs: Vec<String>,
    pub model: Option<String>,
}

impl Completion {
    /// The answer to surface to the caller: the last output carrying any
    /// text. Later outputs take precedence, so a final answer wins over
    /// an earlier tool-call echo.
    pub fn final_text(&self) -> Option<&str> {
        self.outputs
            .iter()
            .rev()
            .map(String::as_str)
            .find(|text| !text.is_empty())
    }
}

/// One incremental piece of streamed output.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub text: String,
}

impl Fragment {
    pub fn new<S: Into<String>>(text: S) -> Self {
        Self { text: text.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_non_empty_output_wins() {
        let completion = Completion {
            outputs: vec!["".to_string(), "A".to_string(), "B".to_string()],
            model: None,
        };
        assert_eq!(completion.final_text(), Some("B"));
    }

    #[test]
    fn test_trailing_empty_output_skipped() {
        let completion = Completion {
            outputs: vec!["answer".to_string(), "".to_string()],
            model: None,
        };
        assert_eq!(completion.final_text(), Some("answer"));
    }

    #[test]
    fn test_no_text_yields_none() {
        let completion = Completion {
            outputs: vec!["".to_string(), "".to_string()],
            model: None,
        };
        assert_eq!(completion.final_text(), None);
        assert_eq!(Completion::default().final_text(), None);
    }

    #[test]
    fn test_prompt_preserves_message_order() {
        let messages = vec![
            Message::user("first"),
            Message::assistant("second"),
            Message::user("third"),
        ];
        let request = GenerationRequest::from_conversation(&messages, Vec::new());
        let first = request.prompt.find("first").unwrap();
        let second = request.prompt.find("second").unwrap();
        let third = request.prompt.find("third").unwrap();
        assert!(first < second && second < third);
    }
}
