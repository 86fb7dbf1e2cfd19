//! Agent loop with at most one tool round trip.
//!
//! The loop is a small state machine:
//!
//! ```text
//! Sent ──(no tool call)──────────────────────────────▶ Done
//!   └──(tool call)──▶ AwaitingTool ──▶ ToolResolved ──▶ Done
//! ```
//!
//! `ToolResolved` can only move to `Done`, so a second tool request from the
//! model is dropped rather than executed. Any error ends the loop (`Failed`)
//! and is returned to the caller without retry.

use super::session::{ConversationModel, SessionReply};
use super::tools::{parse_tool_call, ToolCall, ToolCallRequest};
use crate::config::{render_verification_prompt, MAX_SEARCH_RESULTS};
use crate::error::Result;
use crate::search::{SearchProvider, SearchResults};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

#[derive(Debug)]
enum LoopState {
    /// Prompt dispatched, first reply in hand.
    Sent(SessionReply),
    /// A valid tool call is waiting for its search.
    AwaitingTool {
        call: ToolCallRequest,
        item_name: String,
    },
    /// Search result delivered, second reply in hand.
    ToolResolved(SessionReply),
    Done(String),
}

impl LoopState {
    fn name(&self) -> &'static str {
        match self {
            LoopState::Sent(_) => "Sent",
            LoopState::AwaitingTool { .. } => "AwaitingTool",
            LoopState::ToolResolved(_) => "ToolResolved",
            LoopState::Done(_) => "Done",
        }
    }
}

/// Drives one verification conversation.
pub struct AgentLoop {
    model: Arc<dyn ConversationModel>,
    search: Arc<dyn SearchProvider>,
    max_results: usize,
}

impl AgentLoop {
    pub fn new(model: Arc<dyn ConversationModel>, search: Arc<dyn SearchProvider>) -> Self {
        Self {
            model,
            search,
            max_results: MAX_SEARCH_RESULTS,
        }
    }

    /// Set how many search results to request (capped at three).
    pub fn with_max_results(mut self, max: usize) -> Self {
        self.max_results = max.clamp(1, MAX_SEARCH_RESULTS);
        self
    }

    /// Run the loop for a claim and return the model's final text.
    #[instrument(skip(self, claim), fields(model = %self.model.model_name()))]
    pub async fn run(&self, claim: &str) -> Result<AgentOutcome> {
        match self.drive(claim).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                warn!("Agent loop failed ({}): {}", e.kind(), e);
                if let Some(snippet) = e.snippet() {
                    debug!("Offending model output: {}", snippet);
                }
                Err(e)
            }
        }
    }

    async fn drive(&self, claim: &str) -> Result<AgentOutcome> {
        let prompt = render_verification_prompt(claim);
        let mut session = self.model.open_session();
        let mut round_trips = 1;
        let mut tool_call = None;

        let mut state = LoopState::Sent(session.send_user_message(&prompt).await?);

        loop {
            debug!("Agent state: {}", state.name());

            state = match state {
                LoopState::Sent(reply) => match reply.tool_calls.split_first() {
                    None => LoopState::Done(reply.text.unwrap_or_default()),
                    Some((first, rest)) => {
                        if !rest.is_empty() {
                            warn!("Ignoring {} extra tool call(s) in reply", rest.len());
                        }
                        let ToolCall::GetResult { item_name } =
                            parse_tool_call(&first.name, &first.arguments)?;
                        LoopState::AwaitingTool {
                            call: first.clone(),
                            item_name,
                        }
                    }
                },

                LoopState::AwaitingTool { call, item_name } => {
                    info!("Agent calling tool: {} with args: {}", call.name, call.arguments);

                    let results = self.search.search(&item_name, self.max_results).await?;
                    debug!("Tool returned {} result(s)", results.len());

                    tool_call = Some(ToolCallRecord {
                        name: call.name.clone(),
                        arguments: call.arguments.clone(),
                        item_name,
                        result_urls: results.urls().map(str::to_string).collect(),
                    });

                    round_trips += 1;
                    let reply = session.send_tool_result(&call, tool_payload(&results)).await?;
                    LoopState::ToolResolved(reply)
                }

                LoopState::ToolResolved(reply) => {
                    if !reply.tool_calls.is_empty() {
                        warn!(
                            "Ignoring {} tool call(s) after the tool round trip",
                            reply.tool_calls.len()
                        );
                    }
                    LoopState::Done(reply.text.unwrap_or_default())
                }

                LoopState::Done(text) => {
                    return Ok(AgentOutcome {
                        text,
                        tool_call,
                        round_trips,
                    });
                }
            };
        }
    }
}

/// Tool response body sent back to the model.
pub fn tool_payload(results: &SearchResults) -> serde_json::Value {
    let mut result = serde_json::json!({
        "query": results.query,
        "results": results.results,
    });
    if results.is_empty() {
        result["note"] = serde_json::Value::String("No results found for this query.".to_string());
    }
    serde_json::json!({ "result": result })
}

/// Final text of a loop run and what it took to get there.
#[derive(Debug)]
pub struct AgentOutcome {
    /// Raw model output, untrusted.
    pub text: String,
    /// The tool call that was honored, if any.
    pub tool_call: Option<ToolCallRecord>,
    /// Model requests made (1 or 2).
    pub round_trips: usize,
}

/// Record of the tool call made by the agent.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ToolCallRecord {
    pub name: String,
    /// JSON arguments passed to the tool.
    pub arguments: String,
    pub item_name: String,
    pub result_urls: Vec<String>,
}

impl std::fmt::Display for ToolCallRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.name, self.arguments)
    }
}
