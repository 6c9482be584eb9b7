//! Gemini `generateContent` chat session.
//!
//! Keeps the conversation contents client-side and replays them with every
//! request, along with the system instruction and function declarations
//! registered at construction.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{debug, trace};

use super::{
    Candidate, ChatError, ChatInput, ChatReply, ChatSession, Part, ToolInvocationRequest,
    ToolInvocationResult,
};
use crate::constants::GEMINI_DEFAULT_BASE_URL;
use crate::tools::ToolDeclaration;

/// Placeholder answer for a call this turn carries no result for.
const UNANSWERED_STATUS: &str = "no result returned for this call";

/// A chat session backed by the Gemini REST API.
pub struct GeminiChat {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
    system_instruction: Option<Content>,
    tools: Vec<GeminiTool>,
    history: Vec<Content>,
    /// Calls from the latest model turn that have not been answered yet.
    open_calls: Vec<FunctionCall>,
}

impl GeminiChat {
    /// Starts a chat with `model` using the given system prompt.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, system_prompt: &str) -> Self {
        let system_instruction = (!system_prompt.trim().is_empty()).then(|| Content {
            role: None,
            parts: vec![WirePart::text(system_prompt)],
        });
        Self {
            http: reqwest::Client::new(),
            base_url: GEMINI_DEFAULT_BASE_URL.to_string(),
            model: model.into(),
            api_key: api_key.into(),
            system_instruction,
            tools: Vec::new(),
            history: Vec::new(),
            open_calls: Vec::new(),
        }
    }

    /// Overrides the API endpoint (proxies, regional endpoints).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Advertises the given tools to the model for the whole session.
    pub fn with_function_declarations(mut self, declarations: &[ToolDeclaration]) -> Self {
        self.tools = if declarations.is_empty() {
            Vec::new()
        } else {
            vec![GeminiTool {
                function_declarations: declarations
                    .iter()
                    .map(|d| FunctionDeclaration {
                        name: d.name.clone(),
                        description: d.description.clone(),
                        parameters: d.parameters.clone(),
                    })
                    .collect(),
            }]
        };
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    /// Converts the input into the user turn appended to the history.
    ///
    /// Gemini requires one response per call of the preceding model turn,
    /// so every open call is answered first: the call `input` carries a
    /// result for gets it, the others get a placeholder. Queries and
    /// results that match no open call follow as plain text.
    fn user_turn(&self, input: ChatInput) -> Content {
        let (mut answer, text) = match input {
            ChatInput::Query(text) => (None, Some(text)),
            ChatInput::ToolResult(result) if self.open_calls.iter().any(|c| c.answers(&result)) => {
                (Some(result), None)
            }
            ChatInput::ToolResult(result) => {
                let text = format!(
                    "Result of the earlier `{}` call: {}",
                    result.name, result.output
                );
                (None, Some(text))
            }
        };

        let mut parts: Vec<WirePart> = self
            .open_calls
            .iter()
            .map(|call| {
                let response = match answer.take_if(|result| call.answers(result)) {
                    Some(result) => FunctionResponse {
                        id: result.id.or_else(|| call.id.clone()),
                        name: result.name,
                        response: result.output,
                    },
                    None => FunctionResponse {
                        id: call.id.clone(),
                        name: call.name.clone(),
                        response: json!({ "output": "", "status": UNANSWERED_STATUS }),
                    },
                };
                WirePart {
                    function_response: Some(response),
                    ..WirePart::default()
                }
            })
            .collect();
        parts.extend(text.map(WirePart::text));

        Content {
            role: Some("user".to_string()),
            parts,
        }
    }

    async fn generate(&self) -> Result<GenerateContentResponse, ChatError> {
        let request = GenerateContentRequest {
            contents: &self.history,
            system_instruction: self.system_instruction.as_ref(),
            tools: &self.tools,
        };
        trace!(
            "gemini request: {}",
            serde_json::to_string(&request).unwrap_or_default()
        );

        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChatError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ChatError::Decode(e.to_string()))
    }
}

#[async_trait]
impl ChatSession for GeminiChat {
    async fn send(&mut self, input: ChatInput) -> Result<ChatReply, ChatError> {
        let turn = self.user_turn(input);
        self.history.push(turn);

        let response = match self.generate().await {
            Ok(response) => response,
            Err(err) => {
                // Leave the history untouched so a retry resends the same turn.
                self.history.pop();
                return Err(err);
            }
        };

        debug!(
            model = %self.model,
            candidates = response.candidates.len(),
            "gemini reply received"
        );

        // Only the first candidate continues the conversation.
        self.open_calls.clear();
        if let Some(content) = response.candidates.first().and_then(|c| c.content.clone()) {
            self.open_calls = content
                .parts
                .iter()
                .filter_map(|p| p.function_call.clone())
                .collect();
            self.history.push(Content {
                role: Some("model".to_string()),
                parts: content.parts,
            });
        }

        Ok(response.into_reply())
    }
}

// --- Wire types ---

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: &'a [Content],
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<&'a Content>,
    #[serde(skip_serializing_if = "no_tools")]
    tools: &'a [GeminiTool],
}

fn no_tools(tools: &&[GeminiTool]) -> bool {
    tools.is_empty()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<WirePart>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WirePart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_call: Option<FunctionCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_response: Option<FunctionResponse>,
    /// Fields this client does not interpret (thought signatures, inline
    /// data, ...). Kept so they are echoed back verbatim in the history.
    #[serde(flatten)]
    other: Map<String, Value>,
}

impl WirePart {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    fn resolve(self) -> Part {
        if let Some(call) = self.function_call {
            return Part::ToolCalls(vec![call.into_request()]);
        }
        if let Some(text) = self.text {
            return Part::Text(text);
        }
        if self.function_response.is_some() {
            return Part::Unrecognized("functionResponse".to_string());
        }
        let kind = self
            .other
            .keys()
            .next()
            .cloned()
            .unwrap_or_else(|| "empty".to_string());
        Part::Unrecognized(kind)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct FunctionCall {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    name: String,
    #[serde(default)]
    args: Map<String, Value>,
}

impl FunctionCall {
    fn answers(&self, result: &ToolInvocationResult) -> bool {
        match (&self.id, &result.id) {
            (Some(call_id), Some(result_id)) => call_id == result_id,
            _ => self.name == result.name,
        }
    }

    fn into_request(self) -> ToolInvocationRequest {
        ToolInvocationRequest {
            id: self.id,
            name: self.name,
            arguments: self.args,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct FunctionResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    name: String,
    response: Value,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiTool {
    function_declarations: Vec<FunctionDeclaration>,
}

#[derive(Debug, Clone, Serialize)]
struct FunctionDeclaration {
    name: String,
    description: String,
    parameters: Value,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<WireCandidate>,
}

#[derive(Debug, Deserialize)]
struct WireCandidate {
    #[serde(default)]
    content: Option<Content>,
}

impl GenerateContentResponse {
    fn into_reply(self) -> ChatReply {
        ChatReply {
            candidates: self
                .candidates
                .into_iter()
                .map(|c| Candidate {
                    parts: c
                        .content
                        .map(|content| content.parts.into_iter().map(WirePart::resolve).collect())
                        .unwrap_or_default(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(body: Value) -> ChatReply {
        serde_json::from_value::<GenerateContentResponse>(body)
            .unwrap()
            .into_reply()
    }

    #[test]
    fn test_decode_text_and_function_call() {
        let reply = decode(json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        {"text": "Let me check."},
                        {"functionCall": {"name": "kubectl", "args": {"command": "get pods"}}}
                    ]
                },
                "finishReason": "STOP"
            }],
            "usageMetadata": {"totalTokenCount": 12}
        }));

        let parts = &reply.candidates[0].parts;
        assert_eq!(parts[0], Part::Text("Let me check.".into()));
        match &parts[1] {
            Part::ToolCalls(calls) => {
                assert_eq!(calls.len(), 1);
                assert_eq!(calls[0].name, "kubectl");
                assert_eq!(calls[0].command(), Some("get pods"));
                assert_eq!(calls[0].id, None);
            }
            other => panic!("expected tool calls, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_unknown_part() {
        let reply = decode(json!({
            "candidates": [{
                "content": {"parts": [{"executableCode": {"language": "PYTHON", "code": "1"}}]}
            }]
        }));
        assert_eq!(
            reply.candidates[0].parts,
            vec![Part::Unrecognized("executableCode".into())]
        );
    }

    #[test]
    fn test_decode_empty_responses() {
        assert!(decode(json!({})).candidates.is_empty());
        let reply = decode(json!({"candidates": [{"finishReason": "SAFETY"}]}));
        assert_eq!(reply.candidates.len(), 1);
        assert!(reply.candidates[0].parts.is_empty());
    }

    #[test]
    fn test_request_shape() {
        let declarations = vec![ToolDeclaration::command_tool(
            "kubectl",
            "Execute a kubectl command.",
        )];
        let mut chat = GeminiChat::new("key", "gemini-2.0-flash", "be brief")
            .with_function_declarations(&declarations);
        let turn = chat.user_turn(ChatInput::Query("hi".into()));
        chat.history.push(turn);

        let request = GenerateContentRequest {
            contents: &chat.history,
            system_instruction: chat.system_instruction.as_ref(),
            tools: &chat.tools,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["contents"][0]["role"], "user");
        assert_eq!(value["contents"][0]["parts"][0]["text"], "hi");
        assert_eq!(value["systemInstruction"]["parts"][0]["text"], "be brief");
        assert_eq!(value["tools"][0]["functionDeclarations"][0]["name"], "kubectl");
        assert_eq!(
            value["tools"][0]["functionDeclarations"][0]["parameters"]["required"][0],
            "command"
        );
    }

    fn open_call(name: &str) -> FunctionCall {
        FunctionCall {
            id: None,
            name: name.into(),
            args: Map::new(),
        }
    }

    fn responses(turn: &Content) -> Vec<&FunctionResponse> {
        turn.parts
            .iter()
            .filter_map(|p| p.function_response.as_ref())
            .collect()
    }

    fn result(name: &str, output: &str) -> ChatInput {
        let request = ToolInvocationRequest::new(name, Map::new());
        ChatInput::ToolResult(ToolInvocationResult::for_request(&request, output))
    }

    #[test]
    fn test_tool_result_answers_every_open_call() {
        let mut chat = GeminiChat::new("key", "m", "");
        chat.open_calls = vec![open_call("gcloud"), open_call("kubectl")];

        let turn = chat.user_turn(result("kubectl", "ok"));

        assert_eq!(turn.parts.len(), 2);
        let answered = responses(&turn);
        assert_eq!(answered[0].name, "gcloud");
        assert_eq!(
            answered[0].response,
            json!({"output": "", "status": UNANSWERED_STATUS})
        );
        assert_eq!(answered[1].name, "kubectl");
        assert_eq!(answered[1].response, json!({"output": "ok"}));
    }

    #[test]
    fn test_query_after_failed_call_closes_it() {
        // The kubectl call failed locally, so no result was ever sent.
        let mut chat = GeminiChat::new("key", "m", "");
        chat.open_calls = vec![open_call("kubectl")];

        let turn = chat.user_turn(ChatInput::Query("next question".into()));

        let value = serde_json::to_value(&turn).unwrap();
        assert_eq!(value["role"], "user");
        assert_eq!(value["parts"][0]["functionResponse"]["name"], "kubectl");
        assert_eq!(
            value["parts"][0]["functionResponse"]["response"]["status"],
            UNANSWERED_STATUS
        );
        assert_eq!(value["parts"][1]["text"], "next question");
        assert_eq!(turn.parts.len(), 2);
    }

    #[test]
    fn test_query_without_open_calls_is_plain_text() {
        let chat = GeminiChat::new("key", "m", "");
        let value = serde_json::to_value(chat.user_turn(ChatInput::Query("hi".into()))).unwrap();
        assert_eq!(value, json!({"role": "user", "parts": [{"text": "hi"}]}));
    }

    #[test]
    fn test_unmatched_tool_result_becomes_text() {
        let chat = GeminiChat::new("key", "m", "");
        let turn = chat.user_turn(result("kubectl", "ok"));
        assert_eq!(turn.parts.len(), 1);
        assert!(turn.parts[0].text.as_deref().unwrap().contains("kubectl"));
    }

    #[test]
    fn test_stale_result_still_closes_open_calls() {
        let mut chat = GeminiChat::new("key", "m", "");
        chat.open_calls = vec![open_call("gcloud")];

        let turn = chat.user_turn(result("kubectl", "ok"));

        assert_eq!(turn.parts.len(), 2);
        assert_eq!(responses(&turn)[0].name, "gcloud");
        assert!(turn.parts[1].text.as_deref().unwrap().contains("kubectl"));
    }

    #[test]
    fn test_duplicate_call_names_answered_once() {
        let mut chat = GeminiChat::new("key", "m", "");
        chat.open_calls = vec![open_call("kubectl"), open_call("kubectl")];

        let turn = chat.user_turn(result("kubectl", "pods"));

        let answered = responses(&turn);
        assert_eq!(answered[0].response, json!({"output": "pods"}));
        assert_eq!(answered[1].response["status"], UNANSWERED_STATUS);
    }

    #[test]
    fn test_unknown_fields_round_trip() {
        let part: WirePart = serde_json::from_value(json!({
            "functionCall": {"name": "kubectl", "args": {}},
            "thoughtSignature": "abc"
        }))
        .unwrap();
        let value = serde_json::to_value(&part).unwrap();
        assert_eq!(value["thoughtSignature"], "abc");
        assert_eq!(value["functionCall"]["name"], "kubectl");
    }
}
