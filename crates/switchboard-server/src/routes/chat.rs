use crate::configuration::DeliveryMode;
use crate::state::AppState;
use axum::{
    extract::State,
    http::{self, StatusCode},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use bytes::Bytes;
use futures::{stream::StreamExt, Stream};
use serde::Deserialize;
use serde_json::{json, Value};
use std::{
    convert::Infallible,
    pin::Pin,
    task::{Context, Poll},
};
use switchboard::{
    classifier,
    errors::ProviderError,
    generation::GenerationRequest,
    models::Message,
};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

pub(crate) const RATE_LIMIT_MESSAGE: &str =
    "Rate limit has been hit. Please wait a few seconds and try again.";
pub(crate) const CONTENT_FILTER_MESSAGE: &str =
    "Your message was blocked by content filters. Please rephrase your request.";
pub(crate) const GENERIC_ERROR_MESSAGE: &str =
    "Sorry I am unable to help right now, please ask me something else";
pub(crate) const EMPTY_RESPONSE_FALLBACK: &str = "Sorry, I could not produce a response.";

// Types matching the incoming JSON structure
#[derive(Debug, Deserialize)]
struct ChatRequest {
    messages: Vec<Message>,
}

/// Response type for the two streaming modes: an unbounded chunked body
/// fed by a channel. Raw and SSE delivery differ only in content type
/// and in how the spawned producer frames each write.
pub struct StreamResponse {
    rx: ReceiverStream<String>,
    content_type: &'static str,
}

impl StreamResponse {
    fn raw(rx: ReceiverStream<String>) -> Self {
        Self {
            rx,
            content_type: "text/plain; charset=utf-8",
        }
    }

    fn events(rx: ReceiverStream<String>) -> Self {
        Self {
            rx,
            content_type: "text/event-stream",
        }
    }
}

impl Stream for StreamResponse {
    type Item = Result<Bytes, Infallible>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.rx)
            .poll_next(cx)
            .map(|opt| opt.map(|s| Ok(Bytes::from(s))))
    }
}

impl IntoResponse for StreamResponse {
    fn into_response(self) -> axum::response::Response {
        let content_type = self.content_type;
        let body = axum::body::Body::from_stream(self);

        http::Response::builder()
            .header("Content-Type", content_type)
            .header("Cache-Control", "no-cache")
            .header("Connection", "keep-alive")
            .body(body)
            .unwrap()
    }
}

/// Pick the user-facing message and JSON-mode status for an upstream
/// failure. The raw error never reaches the caller.
fn translate_error(err: &ProviderError) -> (StatusCode, &'static str) {
    match err.status().map(|status| status.as_u16()) {
        Some(429) => (StatusCode::TOO_MANY_REQUESTS, RATE_LIMIT_MESSAGE),
        Some(400) => (StatusCode::BAD_REQUEST, CONTENT_FILTER_MESSAGE),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, GENERIC_ERROR_MESSAGE),
    }
}

fn sse_event(payload: &Value) -> String {
    format!("data: {payload}\n\n")
}

async fn chat_handler(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> axum::response::Response {
    // Tool augmentation is keyword-gated on the latest message only.
    let tools = if classifier::needs_tools(&request.messages) {
        state.tools.as_ref().clone()
    } else {
        Vec::new()
    };
    let generation = GenerationRequest::from_conversation(&request.messages, tools);

    match state.delivery {
        DeliveryMode::Buffered => buffered(state, generation).await,
        DeliveryMode::Stream => raw_stream(state, generation).into_response(),
        DeliveryMode::Sse => sse(state, generation).into_response(),
    }
}

/// Buffered delivery: the generation is fully awaited, so errors become
/// ordinary status-coded JSON responses.
async fn buffered(state: AppState, generation: GenerationRequest) -> axum::response::Response {
    match state.client.complete(generation).await {
        Ok(completion) => {
            let text = completion.final_text().unwrap_or(EMPTY_RESPONSE_FALLBACK);
            (StatusCode::OK, Json(json!({ "response": text }))).into_response()
        }
        Err(err) => {
            tracing::error!("buffered generation failed: {}", err);
            let (status, message) = translate_error(&err);
            (status, Json(json!({ "error": message }))).into_response()
        }
    }
}

/// Raw delivery: fragment text is written verbatim, no framing. Headers
/// go out before generation finishes, so mid-stream errors can only be
/// appended as plain text.
fn raw_stream(state: AppState, generation: GenerationRequest) -> StreamResponse {
    let (tx, rx) = mpsc::channel(100);

    tokio::spawn(async move {
        let mut stream = match state.client.complete_stream(generation).await {
            Ok(stream) => stream,
            Err(err) => {
                tracing::error!("failed to start stream: {}", err);
                let (_, message) = translate_error(&err);
                let _ = tx.send(message.to_string()).await;
                return;
            }
        };

        while let Some(next) = stream.next().await {
            match next {
                Ok(fragment) => {
                    // A failed send means the client disconnected;
                    // dropping the stream releases the generation.
                    if tx.send(fragment.text).await.is_err() {
                        break;
                    }
                }
                Err(err) => {
                    tracing::error!("stream failed mid-generation: {}", err);
                    let (_, message) = translate_error(&err);
                    let _ = tx.send(message.to_string()).await;
                    break;
                }
            }
        }
    });

    StreamResponse::raw(ReceiverStream::new(rx))
}

/// SSE delivery: one event per fragment, then a final event carrying
/// the concatenated response. A mid-stream error ends the stream with
/// an error event instead of the done event.
fn sse(state: AppState, generation: GenerationRequest) -> StreamResponse {
    let (tx, rx) = mpsc::channel(100);

    tokio::spawn(async move {
        let mut stream = match state.client.complete_stream(generation).await {
            Ok(stream) => stream,
            Err(err) => {
                tracing::error!("failed to start stream: {}", err);
                let (_, message) = translate_error(&err);
                let _ = tx
                    .send(sse_event(&json!({ "error": message, "done": true })))
                    .await;
                return;
            }
        };

        let mut full_response = String::new();
        while let Some(next) = stream.next().await {
            match next {
                Ok(fragment) => {
                    let event = sse_event(&json!({ "chunk": fragment.text, "done": false }));
                    if tx.send(event).await.is_err() {
                        return;
                    }
                    full_response.push_str(&fragment.text);
                }
                Err(err) => {
                    tracing::error!("stream failed mid-generation: {}", err);
                    let (_, message) = translate_error(&err);
                    let _ = tx
                        .send(sse_event(&json!({ "error": message, "done": true })))
                        .await;
                    return;
                }
            }
        }

        let done = sse_event(&json!({
            "chunk": "",
            "done": true,
            "fullResponse": full_response,
        }));
        let _ = tx.send(done).await;
    });

    StreamResponse::events(ReceiverStream::new(rx))
}

// Configure routes for this module
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/chat", post(chat_handler))
        .with_state(state)
}
