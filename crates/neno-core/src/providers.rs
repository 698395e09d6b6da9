//! Model-family payload adapters.
//!
//! Bedrock-style endpoints expect a different request shape and return a
//! different response shape per model family. Each family is a pair of plain
//! functions selected through a prefix table; adding a family is one table
//! entry, not a new type.

use serde_json::{json, Value};

use crate::error::{GatewayError, Result};
use crate::request::ResolvedRequest;
use crate::response::TokenUsage;

/// Text and token accounting extracted from a provider response.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderOutput {
    pub content: String,
    pub usage: Option<TokenUsage>,
}

type BuildRequest = fn(&ResolvedRequest) -> Value;
type ParseResponse = fn(&Value) -> Result<ProviderOutput>;

pub struct ProviderAdapter {
    pub prefix: &'static str,
    pub build_request: BuildRequest,
    pub parse_response: ParseResponse,
}

/// Longest matching prefix wins; the empty prefix is the generic fallback.
const ADAPTERS: &[ProviderAdapter] = &[
    ProviderAdapter {
        prefix: "anthropic.",
        build_request: anthropic_request,
        parse_response: anthropic_response,
    },
    ProviderAdapter {
        prefix: "amazon.titan",
        build_request: titan_request,
        parse_response: titan_response,
    },
    ProviderAdapter {
        prefix: "meta.llama",
        build_request: llama_request,
        parse_response: llama_response,
    },
    ProviderAdapter {
        prefix: "",
        build_request: generic_request,
        parse_response: generic_response,
    },
];

/// Select the adapter for a model identifier.
pub fn adapter_for(model_id: &str) -> &'static ProviderAdapter {
    let key = family_key(model_id);
    ADAPTERS
        .iter()
        .filter(|adapter| key.starts_with(adapter.prefix))
        .max_by_key(|adapter| adapter.prefix.len())
        .expect("the fallback adapter matches every model id")
}

/// Cross-region inference profiles prepend a geo segment to the vendor id
/// (`us.anthropic.claude-...`); dispatch happens on the vendor part.
fn family_key(model_id: &str) -> &str {
    for geo in ["us.", "eu.", "apac."] {
        if let Some(rest) = model_id.strip_prefix(geo) {
            return rest;
        }
    }
    model_id
}

fn shape_error(detail: &str) -> GatewayError {
    GatewayError::ResponseShape(detail.to_string())
}

fn anthropic_request(request: &ResolvedRequest) -> Value {
    json!({
        "anthropic_version": "bedrock-2023-05-31",
        "max_tokens": request.max_tokens,
        "temperature": request.temperature,
        "top_p": request.top_p,
        "messages": [{ "role": "user", "content": request.prompt }],
    })
}

fn anthropic_response(body: &Value) -> Result<ProviderOutput> {
    let content = body["content"][0]["text"]
        .as_str()
        .ok_or_else(|| shape_error("missing content[0].text"))?
        .to_string();
    let usage = match (
        body["usage"]["input_tokens"].as_u64(),
        body["usage"]["output_tokens"].as_u64(),
    ) {
        (Some(input), Some(output)) => Some(TokenUsage {
            input_tokens: input as u32,
            output_tokens: output as u32,
        }),
        _ => None,
    };
    Ok(ProviderOutput { content, usage })
}

fn titan_request(request: &ResolvedRequest) -> Value {
    json!({
        "inputText": request.prompt,
        "textGenerationConfig": {
            "maxTokenCount": request.max_tokens,
            "temperature": request.temperature,
            "topP": request.top_p,
        },
    })
}

fn titan_response(body: &Value) -> Result<ProviderOutput> {
    let content = body["results"][0]["outputText"]
        .as_str()
        .ok_or_else(|| shape_error("missing results[0].outputText"))?
        .to_string();
    let usage = match (
        body["inputTextTokenCount"].as_u64(),
        body["results"][0]["tokenCount"].as_u64(),
    ) {
        (Some(input), Some(output)) => Some(TokenUsage {
            input_tokens: input as u32,
            output_tokens: output as u32,
        }),
        _ => None,
    };
    Ok(ProviderOutput { content, usage })
}

fn llama_request(request: &ResolvedRequest) -> Value {
    json!({
        "prompt": request.prompt,
        "max_gen_len": request.max_tokens,
        "temperature": request.temperature,
        "top_p": request.top_p,
    })
}

fn llama_response(body: &Value) -> Result<ProviderOutput> {
    let content = body["generation"]
        .as_str()
        .ok_or_else(|| shape_error("missing generation"))?
        .to_string();
    let usage = match (
        body["prompt_token_count"].as_u64(),
        body["generation_token_count"].as_u64(),
    ) {
        (Some(input), Some(output)) => Some(TokenUsage {
            input_tokens: input as u32,
            output_tokens: output as u32,
        }),
        _ => None,
    };
    Ok(ProviderOutput { content, usage })
}

fn generic_request(request: &ResolvedRequest) -> Value {
    json!({
        "prompt": request.prompt,
        "max_tokens": request.max_tokens,
        "temperature": request.temperature,
        "top_p": request.top_p,
    })
}

fn generic_response(body: &Value) -> Result<ProviderOutput> {
    let content = body["completion"]
        .as_str()
        .or_else(|| body["text"].as_str())
        .ok_or_else(|| shape_error("missing completion or text"))?
        .to_string();
    Ok(ProviderOutput {
        content,
        usage: None,
    })
}
