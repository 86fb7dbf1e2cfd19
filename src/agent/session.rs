//! Conversation sessions with the reasoning model.
//!
//! A [`ConversationModel`] opens one [`ConversationSession`] per
//! verification. The session owns the message history and the tool catalog
//! bound at creation; nothing is shared between sessions.

use super::tools::{tool_definitions, ToolCallRequest};
use crate::config::ModelSettings;
use crate::error::{Result, VeritasError};
use crate::openai::create_client;
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestToolMessageArgs, ChatCompletionRequestUserMessageArgs,
    ChatCompletionTool, ChatCompletionToolChoiceOption, CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use async_trait::async_trait;
use tracing::{debug, instrument};

/// One model reply: free text, tool requests, or both.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionReply {
    pub text: Option<String>,
    pub tool_calls: Vec<ToolCallRequest>,
}

impl SessionReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            tool_calls: Vec::new(),
        }
    }

    pub fn tool_call(call: ToolCallRequest) -> Self {
        Self {
            text: None,
            tool_calls: vec![call],
        }
    }
}

/// Stateful multi-turn exchange with the model.
///
/// Sends must be sequential: a tool result has to be delivered before any
/// further message goes out on the same session.
#[async_trait]
pub trait ConversationSession: Send {
    /// Send a user message and wait for the reply.
    async fn send_user_message(&mut self, text: &str) -> Result<SessionReply>;

    /// Answer a tool request and wait for the reply.
    async fn send_tool_result(
        &mut self,
        call: &ToolCallRequest,
        payload: serde_json::Value,
    ) -> Result<SessionReply>;
}

/// Factory for per-verification sessions.
pub trait ConversationModel: Send + Sync {
    fn open_session(&self) -> Box<dyn ConversationSession>;

    fn model_name(&self) -> &str;
}

/// Chat-completions backed model (OpenAI or any compatible endpoint).
pub struct OpenAIChatModel {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: Option<f32>,
}

impl OpenAIChatModel {
    pub fn new(client: Client<OpenAIConfig>, model: &str) -> Self {
        Self {
            client,
            model: model.to_string(),
            temperature: None,
        }
    }

    pub fn from_settings(settings: &ModelSettings) -> Result<Self> {
        let client = create_client(settings)?;
        Ok(Self::new(client, &settings.model).with_temperature(settings.temperature))
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }
}

impl ConversationModel for OpenAIChatModel {
    fn open_session(&self) -> Box<dyn ConversationSession> {
        Box::new(OpenAIChatSession {
            client: self.client.clone(),
            model: self.model.clone(),
            temperature: self.temperature,
            tools: tool_definitions(),
            messages: Vec::new(),
        })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Session over the chat-completions API.
pub struct OpenAIChatSession {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: Option<f32>,
    tools: Vec<ChatCompletionTool>,
    messages: Vec<ChatCompletionRequestMessage>,
}

impl OpenAIChatSession {
    /// Send the history and record the assistant turn.
    ///
    /// Only the first tool call of a reply is written to history, so the
    /// single tool result sent afterwards answers every call on record.
    async fn complete(&mut self, tool_choice: Option<ChatCompletionToolChoiceOption>) -> Result<SessionReply> {
        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(&self.model)
            .messages(self.messages.clone())
            .tools(self.tools.clone());
        if let Some(choice) = tool_choice {
            args.tool_choice(choice);
        }
        if let Some(temperature) = self.temperature {
            args.temperature(temperature);
        }
        let request = args
            .build()
            .map_err(|e| VeritasError::Session(e.to_string()))?;

        debug!("Sending {} message(s) to {}", self.messages.len(), self.model);

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| VeritasError::OpenAI(format!("Chat API error: {}", e)))?;

        let message = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| VeritasError::Session("No response from model".to_string()))?
            .message;

        let raw_calls = message.tool_calls.unwrap_or_default();

        let mut assistant = ChatCompletionRequestAssistantMessageArgs::default();
        if let Some(text) = &message.content {
            assistant.content(text.clone());
        }
        if let Some(first) = raw_calls.first() {
            assistant.tool_calls(vec![first.clone()]);
        }
        let assistant = assistant
            .build()
            .map_err(|e| VeritasError::Session(e.to_string()))?;
        self.messages.push(assistant.into());

        Ok(SessionReply {
            text: message.content,
            tool_calls: raw_calls.iter().map(ToolCallRequest::from).collect(),
        })
    }
}

#[async_trait]
impl ConversationSession for OpenAIChatSession {
    #[instrument(skip(self, text), fields(model = %self.model))]
    async fn send_user_message(&mut self, text: &str) -> Result<SessionReply> {
        let message = ChatCompletionRequestUserMessageArgs::default()
            .content(text)
            .build()
            .map_err(|e| VeritasError::Session(e.to_string()))?;
        self.messages.push(message.into());

        self.complete(None).await
    }

    #[instrument(skip(self, payload), fields(model = %self.model, tool = %call.name))]
    async fn send_tool_result(
        &mut self,
        call: &ToolCallRequest,
        payload: serde_json::Value,
    ) -> Result<SessionReply> {
        let message = ChatCompletionRequestToolMessageArgs::default()
            .tool_call_id(call.id.clone())
            .content(payload.to_string())
            .build()
            .map_err(|e| VeritasError::Session(e.to_string()))?;
        self.messages.push(message.into());

        // One round trip only: ask for text, not another tool call.
        self.complete(Some(ChatCompletionToolChoiceOption::None)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::openai::create_client_with;
    use crate::testing::StubServer;
    use std::time::Duration;

    fn model() -> OpenAIChatModel {
        let client =
            create_client_with("http://127.0.0.1:9/v1", "test-key", Duration::from_secs(2)).unwrap();
        OpenAIChatModel::new(client, "gemini-2.5-flash")
    }

    #[test]
    fn test_reply_constructors() {
        let reply = SessionReply::text("{}");
        assert_eq!(reply.text.as_deref(), Some("{}"));
        assert!(reply.tool_calls.is_empty());

        let reply = SessionReply::tool_call(ToolCallRequest::new("c1", "getResult", "{}"));
        assert!(reply.text.is_none());
        assert_eq!(reply.tool_calls.len(), 1);
    }

    #[test]
    fn test_model_name() {
        assert_eq!(model().model_name(), "gemini-2.5-flash");
    }

    #[tokio::test]
    async fn test_rate_limited_model_fails_after_one_request() {
        let server = StubServer::start(vec![(
            429,
            serde_json::json!({
                "error": {
                    "message": "Resource has been exhausted",
                    "type": "rate_limit_exceeded",
                    "param": null,
                    "code": null
                }
            }),
        )])
        .await;
        let client = create_client_with(
            &format!("{}/v1", server.base_url),
            "test-key",
            Duration::from_secs(5),
        )
        .unwrap();
        let model = OpenAIChatModel::new(client, "gemini-2.5-flash");
        let mut session = model.open_session();

        let err = tokio::time::timeout(Duration::from_secs(10), session.send_user_message("hi"))
            .await
            .expect("rate-limited call was retried")
            .unwrap_err();

        assert_eq!(err.kind(), "model_unavailable");
        assert_eq!(server.hits(), 1);
    }

    #[tokio::test]
    async fn test_unreachable_model_is_openai_error() {
        let model = model();
        let mut session = model.open_session();
        let err = session.send_user_message("hello").await.unwrap_err();
        assert_eq!(err.kind(), "model_unavailable");
    }
}
