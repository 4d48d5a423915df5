//! Ollama chat API provider with NDJSON streaming

use crate::provider::{LlmError, LlmProvider, LlmResult, LlmStream};
use crate::types::{ContentBlock, LlmContent, LlmMessage, LlmRequest, StreamDelta, Usage};
use futures::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:11434";

pub struct OllamaProvider {
    client: Client,
    base_url: String,
    models: Vec<String>,
}

impl OllamaProvider {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            models: Vec::new(),
        }
    }

    /// Models this instance is expected to serve.
    pub fn with_models<I, S>(mut self, models: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.models = models.into_iter().map(Into::into).collect();
        self
    }

    fn chat_url(&self) -> String {
        format!("{}/api/chat", self.base_url)
    }
}

impl Default for OllamaProvider {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[async_trait::async_trait]
impl LlmProvider for OllamaProvider {
    fn name(&self) -> &str { "ollama" }

    fn models(&self) -> &[String] {
        &self.models
    }

    async fn complete_stream(
        &self,
        request: LlmRequest,
        cancel: Option<CancellationToken>,
    ) -> LlmResult<LlmStream> {
        let body = build_chat_request(&request);
        debug!("Ollama request: model={} messages={}", body.model, body.messages.len());

        let response = self.client.post(self.chat_url()).json(&body).send().await?;
        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("Ollama error {}: {}", status, error_text);

            if status.as_u16() == 404 {
                return Err(LlmError::ModelNotFound(format!("{}: {}", request.model, error_text)));
            }
            return Err(LlmError::RequestFailed(format!("{}: {}", status, error_text)));
        }

        let stream = parse_ndjson_stream(response.bytes_stream(), cancel);
        Ok(Box::pin(stream))
    }
}

/// Map content blocks onto Ollama's flat message list.
fn build_chat_request(request: &LlmRequest) -> ChatRequest {
    let mut messages = Vec::new();
    if let Some(system) = request.system.as_deref().filter(|s| !s.is_empty()) {
        messages.push(ChatMessage::text("system", system));
    }

    let mut tool_names: HashMap<String, String> = HashMap::new();
    for message in &request.messages {
        messages.extend(convert_message(message, &mut tool_names));
    }

    ChatRequest {
        model: request.model.clone(),
        messages,
        stream: true,
        tools: request.tools.as_ref().filter(|t| !t.is_empty()).map(|tools| {
            tools
                .iter()
                .map(|t| ChatTool {
                    kind: "function",
                    function: ChatFunction {
                        name: t.name.clone(),
                        description: t.description.clone(),
                        parameters: t.input_schema.clone(),
                    },
                })
                .collect()
        }),
        options: ChatOptions { temperature: request.temperature, num_predict: request.max_tokens },
    }
}

fn convert_message(message: &LlmMessage, tool_names: &mut HashMap<String, String>) -> Vec<ChatMessage> {
    let blocks = match &message.content {
        LlmContent::Text(text) => return vec![ChatMessage::text(&message.role, text)],
        LlmContent::Blocks(blocks) => blocks,
    };

    let mut out = Vec::new();
    let mut text = Vec::new();
    let mut calls = Vec::new();

    for block in blocks {
        match block {
            ContentBlock::Text { text: t } => text.push(t.as_str()),
            ContentBlock::ToolUse { id, name, input } => {
                tool_names.insert(id.clone(), name.clone());
                calls.push(json!({ "function": { "name": name, "arguments": input } }));
            }
            ContentBlock::ToolResult { tool_use_id, content, .. } => out.push(ChatMessage {
                role: "tool".into(),
                content: content.clone(),
                tool_calls: None,
                tool_name: tool_names.get(tool_use_id).cloned(),
            }),
        }
    }

    if !text.is_empty() || !calls.is_empty() {
        out.insert(
            0,
            ChatMessage {
                role: message.role.clone(),
                content: text.join("\n"),
                tool_calls: (!calls.is_empty()).then_some(calls),
                tool_name: None,
            },
        );
    }
    out
}

fn parse_ndjson_stream(
    bytes_stream: impl futures::Stream<Item = Result<bytes::Bytes, reqwest::Error>> + Send + 'static,
    cancel: Option<CancellationToken>,
) -> impl futures::Stream<Item = LlmResult<StreamDelta>> + Send {
    async_stream::stream! {
        // raw bytes: a chunk may end inside a multi-byte character
        let mut buffer: Vec<u8> = Vec::new();
        tokio::pin!(bytes_stream);

        loop {
            let next = match &cancel {
                Some(token) => tokio::select! {
                    _ = token.cancelled() => None,
                    chunk = bytes_stream.next() => Some(chunk),
                },
                None => Some(bytes_stream.next().await),
            };

            let chunk = match next {
                None => {
                    yield Err(LlmError::Cancelled);
                    break;
                }
                Some(None) => break,
                Some(Some(Err(e))) => {
                    yield Err(LlmError::StreamError(e.to_string()));
                    break;
                }
                Some(Some(Ok(c))) => c,
            };

            buffer.extend_from_slice(&chunk);

            while let Some(line_end) = buffer.iter().position(|b| *b == b'\n') {
                let line: Vec<u8> = buffer.drain(..=line_end).collect();
                for delta in parse_line_bytes(&line) {
                    yield delta;
                }
            }
        }

        for delta in parse_line_bytes(&buffer) {
            yield delta;
        }
    }
}

/// Decode one complete NDJSON line.
fn parse_line_bytes(line: &[u8]) -> Vec<LlmResult<StreamDelta>> {
    match std::str::from_utf8(line) {
        Ok(text) => parse_chunk_line(text.trim()),
        Err(e) => vec![Err(LlmError::InvalidResponse(format!("line is not UTF-8: {}", e)))],
    }
}

/// Decode one NDJSON line into stream deltas.
pub(crate) fn parse_chunk_line(line: &str) -> Vec<LlmResult<StreamDelta>> {
    if line.is_empty() {
        return Vec::new();
    }
    let chunk: ChatChunk = match serde_json::from_str(line) {
        Ok(c) => c,
        Err(e) => return vec![Err(LlmError::InvalidResponse(format!("{}: {}", e, line)))],
    };

    if let Some(message) = chunk.error {
        return vec![Err(LlmError::StreamError(message))];
    }

    let mut deltas = Vec::new();
    if let Some(message) = chunk.message {
        if !message.content.is_empty() {
            deltas.push(Ok(StreamDelta::Text(message.content)));
        }
        for call in message.tool_calls.unwrap_or_default() {
            let id = format!("call_{}", uuid::Uuid::new_v4().simple());
            let arguments = match call.function.arguments {
                Value::String(s) => s,
                other => other.to_string(),
            };
            deltas.push(Ok(StreamDelta::ToolCallStart { id: id.clone(), name: call.function.name }));
            deltas.push(Ok(StreamDelta::ToolCallDelta { id: id.clone(), arguments }));
            deltas.push(Ok(StreamDelta::ToolCallEnd { id }));
        }
    }

    if chunk.done {
        debug!("Ollama stream complete: done_reason={:?}", chunk.done_reason);
        let usage = match (chunk.prompt_eval_count, chunk.eval_count) {
            (None, None) => None,
            (input, output) => Some(Usage {
                input_tokens: input.unwrap_or(0),
                output_tokens: output.unwrap_or(0),
            }),
        };
        deltas.push(Ok(StreamDelta::Done { stop_reason: chunk.done_reason, usage }));
    }
    deltas
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<ChatTool>>,
    options: ChatOptions,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_name: Option<String>,
}

impl ChatMessage {
    fn text(role: &str, content: &str) -> Self {
        Self { role: role.to_string(), content: content.to_string(), tool_calls: None, tool_name: None }
    }
}

#[derive(Serialize)]
struct ChatTool {
    #[serde(rename = "type")]
    kind: &'static str,
    function: ChatFunction,
}

#[derive(Serialize)]
struct ChatFunction {
    name: String,
    description: String,
    parameters: Value,
}

#[derive(Serialize)]
struct ChatOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

#[derive(Deserialize)]
struct ChatChunk {
    #[serde(default)]
    message: Option<ChunkMessage>,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    done_reason: Option<String>,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize)]
struct ChunkMessage {
    #[serde(default)]
    content: String,
    #[serde(default)]
    tool_calls: Option<Vec<ChunkToolCall>>,
}

#[derive(Deserialize)]
struct ChunkToolCall {
    function: ChunkFunction,
}

#[derive(Deserialize)]
struct ChunkFunction {
    name: String,
    #[serde(default)]
    arguments: Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LlmTool;

    #[test]
    fn text_chunk_yields_text() {
        let deltas = parse_chunk_line(r#"{"message":{"role":"assistant","content":"Halo"},"done":false}"#);
        assert_eq!(deltas.len(), 1);
        assert!(matches!(&deltas[0], Ok(StreamDelta::Text(t)) if t == "Halo"));
    }

    #[test]
    fn tool_call_chunk_yields_start_delta_end() {
        let line = r#"{"message":{"role":"assistant","content":"","tool_calls":[{"function":{"name":"get_province_id","arguments":{"province":"Jawa Timur"}}}]},"done":false}"#;
        let deltas = parse_chunk_line(line);
        assert_eq!(deltas.len(), 3);
        match &deltas[1] {
            Ok(StreamDelta::ToolCallDelta { arguments, .. }) => assert!(arguments.contains("Jawa Timur")),
            other => panic!("unexpected delta: {:?}", other),
        }
    }

    #[test]
    fn done_chunk_carries_usage() {
        let deltas = parse_chunk_line(r#"{"done":true,"done_reason":"stop","prompt_eval_count":12,"eval_count":7}"#);
        match &deltas[0] {
            Ok(StreamDelta::Done { stop_reason, usage }) => {
                assert_eq!(stop_reason.as_deref(), Some("stop"));
                assert_eq!(usage.as_ref().map(|u| u.output_tokens), Some(7));
            }
            other => panic!("unexpected delta: {:?}", other),
        }
    }

    fn texts(deltas: Vec<LlmResult<StreamDelta>>) -> String {
        deltas
            .into_iter()
            .filter_map(|d| match d {
                Ok(StreamDelta::Text(t)) => Some(t),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn character_split_across_chunks_survives() {
        let line = "{\"message\":{\"content\":\"Halo 😊\"},\"done\":false}\n{\"done\":true}\n";
        let cut = line.find('😊').unwrap() + 2;
        let chunks: Vec<Result<bytes::Bytes, reqwest::Error>> = vec![
            Ok(bytes::Bytes::copy_from_slice(&line.as_bytes()[..cut])),
            Ok(bytes::Bytes::copy_from_slice(&line.as_bytes()[cut..])),
        ];
        let deltas: Vec<_> = parse_ndjson_stream(futures::stream::iter(chunks), None).collect().await;
        assert_eq!(texts(deltas), "Halo 😊");
    }

    #[tokio::test]
    async fn line_without_trailing_newline_is_parsed() {
        let chunks: Vec<Result<bytes::Bytes, reqwest::Error>> = vec![
            Ok(bytes::Bytes::from_static(b"{\"message\":{\"content\":\"Sel")),
            Ok(bytes::Bytes::from_static("amat pagi\"},\"done\":true}".as_bytes())),
        ];
        let deltas: Vec<_> = parse_ndjson_stream(futures::stream::iter(chunks), None).collect().await;
        assert_eq!(texts(deltas), "Selamat pagi");
    }

    #[test]
    fn error_line_is_stream_error() {
        let deltas = parse_chunk_line(r#"{"error":"model 'x' not found"}"#);
        assert!(matches!(&deltas[0], Err(LlmError::StreamError(m)) if m.contains("not found")));
    }

    #[test]
    fn tool_round_trip_maps_to_tool_role() {
        let request = LlmRequest {
            system: Some("be helpful".into()),
            messages: vec![
                LlmMessage::user("cari kerja"),
                LlmMessage {
                    role: "assistant".into(),
                    content: LlmContent::Blocks(vec![ContentBlock::ToolUse {
                        id: "t1".into(),
                        name: "search_job_vacancy".into(),
                        input: json!({"keyword": "finance"}),
                    }]),
                },
                LlmMessage {
                    role: "user".into(),
                    content: LlmContent::Blocks(vec![ContentBlock::ToolResult {
                        tool_use_id: "t1".into(),
                        content: "1. Finance Staff".into(),
                        is_error: None,
                    }]),
                },
            ],
            tools: Some(vec![LlmTool {
                name: "search_job_vacancy".into(),
                description: "search".into(),
                input_schema: json!({"type": "object"}),
            }]),
            ..Default::default()
        };

        let body = serde_json::to_value(build_chat_request(&request)).unwrap();
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0]["role"], "system");
        assert_eq!(messages[2]["tool_calls"][0]["function"]["name"], "search_job_vacancy");
        assert_eq!(messages[3]["role"], "tool");
        assert_eq!(messages[3]["tool_name"], "search_job_vacancy");
        assert_eq!(body["tools"][0]["type"], "function");
        assert_eq!(body["stream"], true);
    }
}
