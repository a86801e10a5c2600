//! Conversion between chatlab protocol types and the DeepSeek wire format

use super::types::*;
use crate::protocol::{
    FunctionCall, Message, MessageChunk, MessageRole, ResponseMeta, TokenUsage, ToolCall,
    ToolDefinition,
};
use crate::providers::{ModelOptions, ProviderError, ProviderResult};

/// Build a request for `model` from messages, options, and bound tools
pub fn to_deepseek_request(
    model: &str,
    messages: &[Message],
    options: &ModelOptions,
    tools: &[ToolDefinition],
) -> DeepSeekRequest {
    DeepSeekRequest {
        model: options.model.clone().unwrap_or_else(|| model.to_string()),
        messages: messages.iter().map(to_deepseek_message).collect(),
        temperature: options.temperature,
        max_tokens: options.max_tokens,
        top_p: options.top_p,
        stop: options.stop.clone(),
        stream: None,
        stream_options: None,
        tools: (!tools.is_empty()).then(|| tools.iter().map(to_deepseek_tool).collect()),
    }
}

fn to_deepseek_message(message: &Message) -> DeepSeekMessage {
    DeepSeekMessage {
        role: message.role.as_str().to_string(),
        content: Some(message.content.clone()),
        reasoning_content: None,
        tool_calls: message.tool_calls.as_ref().map(|calls| {
            calls
                .iter()
                .map(|tc| DeepSeekToolCall {
                    id: tc.id.clone(),
                    tool_type: tc.tool_type.clone(),
                    function: DeepSeekFunctionCall {
                        name: tc.function.name.clone(),
                        arguments: tc.function.arguments.clone(),
                    },
                })
                .collect()
        }),
        tool_call_id: message.tool_call_id.clone(),
    }
}

fn to_deepseek_tool(tool: &ToolDefinition) -> DeepSeekTool {
    DeepSeekTool {
        tool_type: tool.tool_type.clone(),
        function: DeepSeekFunction {
            name: tool.function.name.clone(),
            description: tool.function.description.clone(),
            parameters: tool.function.parameters.clone(),
        },
    }
}

fn parse_role(role: &str) -> MessageRole {
    match role {
        "system" => MessageRole::System,
        "user" => MessageRole::User,
        "tool" => MessageRole::Tool,
        _ => MessageRole::Assistant,
    }
}

fn to_usage(usage: DeepSeekUsage) -> TokenUsage {
    TokenUsage {
        prompt_tokens: usage.prompt_tokens,
        completion_tokens: usage.completion_tokens,
        total_tokens: usage.total_tokens,
    }
}

/// Convert a complete response into the first choice's message
pub fn from_deepseek_response(response: DeepSeekResponse) -> ProviderResult<Message> {
    let usage = response.usage.map(to_usage);
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::ParseError("response contained no choices".to_string()))?;

    let wire = choice.message;
    Ok(Message {
        role: parse_role(&wire.role),
        content: wire.content.unwrap_or_default(),
        reasoning_content: wire.reasoning_content.filter(|r| !r.is_empty()),
        tool_calls: wire.tool_calls.map(|calls| {
            calls
                .into_iter()
                .map(|tc| ToolCall {
                    id: tc.id,
                    tool_type: tc.tool_type,
                    function: FunctionCall {
                        name: tc.function.name,
                        arguments: tc.function.arguments,
                    },
                })
                .collect()
        }),
        tool_call_id: wire.tool_call_id,
        response_meta: Some(ResponseMeta {
            finish_reason: choice.finish_reason,
            usage,
        }),
    })
}

/// Convert a streaming chunk; chunks without choices may still carry usage
pub fn from_deepseek_stream_chunk(chunk: DeepSeekStreamChunk) -> MessageChunk {
    let usage = chunk.usage.map(to_usage);
    match chunk.choices.into_iter().next() {
        Some(choice) => MessageChunk {
            role: choice.delta.role.as_deref().map(parse_role),
            content: choice.delta.content.unwrap_or_default(),
            reasoning_content: choice.delta.reasoning_content,
            finish_reason: choice.finish_reason,
            usage,
        },
        None => MessageChunk {
            usage,
            ..Default::default()
        },
    }
}
