//! Tool-augmented conversation with the reasoning model.
//!
//! The model may ask for one web search (`getResult`) before giving its
//! final answer. Sessions are per verification and never shared.

mod runner;
mod session;
mod tools;

pub use runner::{tool_payload, AgentLoop, AgentOutcome, ToolCallRecord};
pub use session::{
    ConversationModel, ConversationSession, OpenAIChatModel, OpenAIChatSession, SessionReply,
};
pub use tools::{
    get_result_parameters, parse_tool_call, tool_definitions, ToolCall, ToolCallRequest,
    GET_RESULT_TOOL, ITEM_NAME_ARG,
};
