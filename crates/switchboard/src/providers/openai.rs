use async_stream::try_stream;
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

use super::base::{FragmentStream, ModelClient};
use super::configs::UpstreamConfig;
use crate::errors::{ProviderError, ProviderResult};
use crate::generation::{Completion, Fragment, GenerationRequest};
use crate::models::{ToolAuth, ToolEndpoint};

/// Client for an OpenAI-compatible chat completions gateway.
///
/// Tool endpoints are passed through in the payload for the gateway to
/// resolve and call during generation; this client never speaks the
/// tool protocol itself.
pub struct OpenAiClient {
    client: Client,
    config: UpstreamConfig,
}

impl OpenAiClient {
    pub fn new(config: UpstreamConfig) -> ProviderResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(600)) // 10 minutes timeout
            .build()?;

        Ok(Self { client, config })
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/v1/chat/completions",
            self.config.host.trim_end_matches('/')
        )
    }

    fn build_payload(&self, request: &GenerationRequest, stream: bool) -> Value {
        let mut payload = json!({
            "model": self.config.model,
            "messages": [{
                "role": "user",
                "content": request.prompt,
            }],
        });

        if stream {
            payload
                .as_object_mut()
                .unwrap()
                .insert("stream".to_string(), json!(true));
        }
        if !request.tools.is_empty() {
            payload
                .as_object_mut()
                .unwrap()
                .insert("tools".to_string(), json!(tools_to_gateway_spec(&request.tools)));
        }

        payload
    }

    async fn post(&self, payload: &Value) -> ProviderResult<reqwest::Response> {
        let response = self
            .client
            .post(self.completions_url())
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Upstream { status, body });
        }

        Ok(response)
    }
}

#[async_trait]
impl ModelClient for OpenAiClient {
    async fn complete(&self, request: GenerationRequest) -> ProviderResult<Completion> {
        let payload = self.build_payload(&request, false);
        let data: Value = self.post(&payload).await?.json().await?;

        let choices = data
            .get("choices")
            .and_then(Value::as_array)
            .ok_or_else(|| ProviderError::Malformed("no choices in response".to_string()))?;

        // One output per choice, in order. Choices carrying only tool
        // interactions have no content and collapse to empty strings.
        let outputs = choices
            .iter()
            .map(|choice| {
                choice["message"]["content"]
                    .as_str()
                    .unwrap_or("")
                    .to_string()
            })
            .collect();
        let model = data["model"].as_str().map(str::to_string);

        Ok(Completion { outputs, model })
    }

    async fn complete_stream(&self, request: GenerationRequest) -> ProviderResult<FragmentStream> {
        let payload = self.build_payload(&request, true);
        let response = self.post(&payload).await?;
        let mut bytes = response.bytes_stream();

        let stream = try_stream! {
            let mut lines = LineBuffer::default();
            let mut done = false;

            while !done {
                let chunk = match bytes.next().await {
                    Some(chunk) => chunk?,
                    None => break,
                };

                for line in lines.feed(&chunk)? {
                    match line {
                        StreamLine::Delta(text) => yield Fragment::new(text),
                        StreamLine::Done => {
                            done = true;
                            break;
                        }
                        StreamLine::Ignore => {}
                    }
                }
            }
        };

        Ok(Box::pin(stream))
    }
}

/// Reassembles newline-delimited stream lines from raw network chunks.
///
/// Bytes are buffered undecoded: a multi-byte codepoint split across
/// two chunks can only ever sit in the tail after the last newline, so
/// decoding complete lines keeps it intact.
#[derive(Default)]
pub(crate) struct LineBuffer {
    buffer: Vec<u8>,
}

impl LineBuffer {
    pub(crate) fn feed(&mut self, chunk: &[u8]) -> ProviderResult<Vec<StreamLine>> {
        self.buffer.extend_from_slice(chunk);

        let mut lines = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line_bytes: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = std::str::from_utf8(&line_bytes).map_err(|err| {
                ProviderError::Malformed(format!("invalid UTF-8 in stream chunk: {err}"))
            })?;
            lines.push(parse_stream_line(line)?);
        }
        Ok(lines)
    }
}

/// One parsed line of the upstream's event stream.
#[derive(Debug, PartialEq)]
pub(crate) enum StreamLine {
    /// A text delta from `choices[0].delta.content`.
    Delta(String),
    /// The `[DONE]` sentinel.
    Done,
    /// Keep-alive comments, non-data fields, and deltas with no text.
    Ignore,
}

pub(crate) fn parse_stream_line(line: &str) -> ProviderResult<StreamLine> {
    let line = line.trim_end();
    if line.is_empty() || line.starts_with(':') {
        return Ok(StreamLine::Ignore);
    }

    let data = match line.strip_prefix("data:") {
        Some(data) => data.trim(),
        None => return Ok(StreamLine::Ignore),
    };

    if data == "[DONE]" {
        return Ok(StreamLine::Done);
    }

    let value: Value = serde_json::from_str(data)
        .map_err(|err| ProviderError::Malformed(format!("invalid JSON in stream chunk: {err}")))?;

    Ok(match value["choices"][0]["delta"]["content"].as_str() {
        Some(text) => StreamLine::Delta(text.to_string()),
        None => StreamLine::Ignore,
    })
}

fn tools_to_gateway_spec(tools: &[ToolEndpoint]) -> Vec<Value> {
    tools
        .iter()
        .map(|endpoint| {
            let mut spec = json!({
                "type": "mcp",
                "server_label": endpoint.name,
                "server_url": endpoint.url.as_str(),
            });
            if let Some(ToolAuth::Bearer { token }) = &endpoint.auth {
                spec.as_object_mut().unwrap().insert(
                    "headers".to_string(),
                    json!({ "Authorization": format!("Bearer {token}") }),
                );
            }
            spec
        })
        .collect()
}
