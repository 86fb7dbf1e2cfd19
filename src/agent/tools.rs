//! The tool catalog exposed to the model.
//!
//! One tool is declared, `getResult`, which runs a web search for `itemName`.

use crate::error::{Result, VeritasError};
use async_openai::types::{ChatCompletionMessageToolCall, ChatCompletionTool};
use serde_json::Value;

/// Name of the single declared tool.
pub const GET_RESULT_TOOL: &str = "getResult";

/// Required argument of [`GET_RESULT_TOOL`].
pub const ITEM_NAME_ARG: &str = "itemName";

/// A parsed, catalog-checked tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolCall {
    /// Search the web for the latest information on an item.
    GetResult { item_name: String },
}

/// A tool invocation as emitted by the model, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCallRequest {
    /// Provider-assigned call id, echoed back with the result.
    pub id: String,
    pub name: String,
    /// Raw JSON argument object.
    pub arguments: String,
}

impl ToolCallRequest {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments: arguments.into(),
        }
    }
}

impl From<&ChatCompletionMessageToolCall> for ToolCallRequest {
    fn from(call: &ChatCompletionMessageToolCall) -> Self {
        Self {
            id: call.id.clone(),
            name: call.function.name.clone(),
            arguments: call.function.arguments.clone(),
        }
    }
}

/// JSON schema of the `getResult` parameters.
pub fn get_result_parameters() -> Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            ITEM_NAME_ARG: {
                "type": "string",
                "description": "It is the text or phrase to search for."
            }
        },
        "required": [ITEM_NAME_ARG]
    })
}

/// Tool declarations bound to every conversation session.
pub fn tool_definitions() -> Vec<ChatCompletionTool> {
    use async_openai::types::{ChatCompletionToolType, FunctionObject};

    vec![ChatCompletionTool {
        r#type: ChatCompletionToolType::Function,
        function: FunctionObject {
            name: GET_RESULT_TOOL.to_string(),
            description: Some(
                "It searches the web for the latest information on a given item.".to_string(),
            ),
            parameters: Some(get_result_parameters()),
            strict: None,
        },
    }]
}

/// Validate a tool request against the catalog.
///
/// Unknown tool names, unparseable arguments, and a missing or non-string
/// `itemName` are protocol violations. An empty `itemName` is passed through.
pub fn parse_tool_call(name: &str, arguments: &str) -> Result<ToolCall> {
    if name != GET_RESULT_TOOL {
        return Err(VeritasError::tool_protocol(
            format!("unknown tool '{}'", name),
            arguments,
        ));
    }

    let args: Value = if arguments.trim().is_empty() {
        Value::Object(Default::default())
    } else {
        serde_json::from_str(arguments).map_err(|e| {
            VeritasError::tool_protocol(format!("invalid tool arguments: {}", e), arguments)
        })?
    };

    let item_name = args
        .get(ITEM_NAME_ARG)
        .and_then(Value::as_str)
        .ok_or_else(|| {
            VeritasError::tool_protocol(
                format!("missing '{}' argument for {}", ITEM_NAME_ARG, GET_RESULT_TOOL),
                arguments,
            )
        })?
        .to_string();

    Ok(ToolCall::GetResult { item_name })
}
