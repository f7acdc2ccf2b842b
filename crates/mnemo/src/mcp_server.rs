use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::{BufRead, Write};
use tracing::{debug, error, info};

use mnemo_config::MnemoConfig;
use mnemo_core::SavedAs;
use mnemo_memory::{HttpStoreClient, NoopEnricher, Persister, SaveRequest, recall_memory};

/// MCP server implementation
///
/// Exposes transcript save/recall as MCP tools over the JSON-RPC 2.0 stdio
/// protocol, so an assistant host can persist conversations directly.
pub(crate) async fn run_mcp_server() -> Result<()> {
    info!("Starting MCP server on stdio");

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();

    for line in stdin.lock().lines() {
        let line = line.context("Failed to read line from stdin")?;
        let trimmed = line.trim();

        // Skip empty lines
        if trimmed.is_empty() {
            continue;
        }

        debug!("Received: {}", trimmed);

        let request: JsonRpcRequest = match serde_json::from_str(trimmed) {
            Ok(req) => req,
            Err(e) => {
                error!("Failed to parse JSON-RPC request: {}", e);
                let error_response = JsonRpcResponse {
                    jsonrpc: "2.0".to_string(),
                    result: None,
                    error: Some(JsonRpcError {
                        code: -32700,
                        message: format!("Parse error: {}", e),
                    }),
                    id: None,
                };
                write_response(&stdout, &error_response)?;
                continue;
            }
        };

        let response = handle_request(request).await;
        write_response(&stdout, &response)?;
    }

    info!("MCP server shutting down");
    Ok(())
}

/// JSON-RPC 2.0 Request
#[derive(Deserialize)]
struct JsonRpcRequest {
    #[allow(dead_code)]
    jsonrpc: String,
    method: String,
    #[serde(default)]
    params: Option<Value>,
    id: Option<Value>,
}

/// JSON-RPC 2.0 Response
#[derive(Serialize)]
struct JsonRpcResponse {
    jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonRpcError>,
    id: Option<Value>,
}

/// JSON-RPC 2.0 Error
#[derive(Serialize)]
struct JsonRpcError {
    code: i32,
    message: String,
}

/// MCP Tool Definition
#[derive(Serialize)]
struct McpToolDef {
    name: String,
    description: String,
    #[serde(rename = "inputSchema")]
    input_schema: Value,
}

/// MCP tool definitions
fn get_tools() -> Vec<McpToolDef> {
    vec![
        McpToolDef {
            name: "mnemo_save_memory".to_string(),
            description: "Save a conversation transcript to the memory store. Oversized \
                          transcripts are split at semantic boundaries and linked; repeated \
                          saves with the same conversation_id update one living record."
                .to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "content": {
                        "type": "string",
                        "description": "Full transcript text to persist"
                    },
                    "title": {
                        "type": "string",
                        "description": "Record title; also seeds the living-document key"
                    },
                    "tags": {
                        "type": "string",
                        "description": "Comma-separated tags (optional)"
                    },
                    "conversation_id": {
                        "type": "string",
                        "description": "Stable key for living-document updates (optional)"
                    }
                },
                "required": ["content"]
            }),
        },
        McpToolDef {
            name: "mnemo_get_memory".to_string(),
            description: "Retrieve a saved record by id, reassembling chunked sessions into \
                          the full transcript."
                .to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "id": {
                        "type": "string",
                        "description": "Record id as assigned by the store"
                    },
                    "full": {
                        "type": "boolean",
                        "description": "Return the full reassembled transcript (default true)"
                    }
                },
                "required": ["id"]
            }),
        },
    ]
}

/// Handle JSON-RPC request
async fn handle_request(request: JsonRpcRequest) -> JsonRpcResponse {
    let id = request.id.clone();

    match request.method.as_str() {
        "initialize" => {
            debug!("Handling initialize");
            JsonRpcResponse {
                jsonrpc: "2.0".to_string(),
                result: Some(serde_json::json!({
                    "protocolVersion": "2024-11-05",
                    "capabilities": {
                        "tools": {}
                    },
                    "serverInfo": {
                        "name": "mnemo-mcp",
                        "version": env!("CARGO_PKG_VERSION")
                    }
                })),
                error: None,
                id,
            }
        }
        "notifications/initialized" => {
            debug!("Handling initialized notification");
            // Notification, no response needed
            JsonRpcResponse {
                jsonrpc: "2.0".to_string(),
                result: None,
                error: None,
                id: None,
            }
        }
        "tools/list" => {
            debug!("Handling tools/list");
            let tools = get_tools();
            JsonRpcResponse {
                jsonrpc: "2.0".to_string(),
                result: Some(serde_json::json!({
                    "tools": tools
                })),
                error: None,
                id,
            }
        }
        "tools/call" => {
            debug!("Handling tools/call");
            match handle_tool_call(request.params).await {
                Ok(result) => JsonRpcResponse {
                    jsonrpc: "2.0".to_string(),
                    result: Some(result),
                    error: None,
                    id,
                },
                Err(e) => JsonRpcResponse {
                    jsonrpc: "2.0".to_string(),
                    result: None,
                    error: Some(JsonRpcError {
                        code: -32603,
                        message: e.to_string(),
                    }),
                    id,
                },
            }
        }
        "shutdown" => {
            debug!("Handling shutdown");
            JsonRpcResponse {
                jsonrpc: "2.0".to_string(),
                result: Some(serde_json::json!({})),
                error: None,
                id,
            }
        }
        _ => JsonRpcResponse {
            jsonrpc: "2.0".to_string(),
            result: None,
            error: Some(JsonRpcError {
                code: -32601,
                message: format!("Method not found: {}", request.method),
            }),
            id,
        },
    }
}

/// Handle tool call
async fn handle_tool_call(params: Option<Value>) -> Result<Value> {
    let params = params.context("Missing params for tools/call")?;
    let name = params
        .get("name")
        .and_then(|v| v.as_str())
        .context("Missing tool name")?;
    let arguments = params.get("arguments").cloned().unwrap_or(Value::Null);

    debug!("Tool call: {} with args: {:?}", name, arguments);

    match name {
        "mnemo_save_memory" => handle_save_tool(arguments).await,
        "mnemo_get_memory" => handle_get_tool(arguments).await,
        _ => anyhow::bail!("Unknown tool: {}", name),
    }
}

/// Handle mnemo_save_memory tool
async fn handle_save_tool(args: Value) -> Result<Value> {
    let content = args
        .get("content")
        .and_then(|v| v.as_str())
        .context("Missing content argument")?
        .to_string();
    let title = args
        .get("title")
        .and_then(|v| v.as_str())
        .map(String::from);
    let tags = args
        .get("tags")
        .and_then(|v| v.as_str())
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(ToString::to_string)
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();
    let conversation_id = args
        .get("conversation_id")
        .and_then(|v| v.as_str())
        .map(String::from);

    let config = MnemoConfig::load()?;
    let store = HttpStoreClient::new(&config.store.base_url, &config.store.api_key);
    let persister = Persister::new(&config.store.platform, config.chunking.limits());

    let outcome = persister
        .save(
            &store,
            &NoopEnricher,
            SaveRequest {
                content,
                title,
                tags,
                conversation_id,
            },
        )
        .await?;

    let verb = match outcome.saved_as {
        SavedAs::Created => "Saved",
        SavedAs::Updated => "Updated",
    };
    let mut text = match outcome.part_count {
        Some(parts) => format!(
            "{verb} memory as {parts} part(s) + index ({} chars total). Index record: {}",
            outcome.total_size,
            outcome.record_ids.last().map_or("-", String::as_str)
        ),
        None => format!(
            "{verb} memory {} ({} chars).",
            outcome.record_ids.first().map_or("-", String::as_str),
            outcome.total_size
        ),
    };
    if let Some(conversation_id) = &outcome.conversation_id {
        text.push_str(&format!("\nConversation: {conversation_id}"));
    }
    if outcome.degraded_lookup {
        text.push_str(
            "\nWarning: living-document lookup failed; saved as a new record. \
             Duplicates may exist for this conversation.",
        );
    }

    Ok(serde_json::json!({
        "content": [
            {
                "type": "text",
                "text": text
            }
        ]
    }))
}

/// Handle mnemo_get_memory tool
async fn handle_get_tool(args: Value) -> Result<Value> {
    let id = args
        .get("id")
        .and_then(|v| v.as_str())
        .context("Missing id argument")?;
    let full = args.get("full").and_then(|v| v.as_bool()).unwrap_or(true);

    let config = MnemoConfig::load()?;
    let store = HttpStoreClient::new(&config.store.base_url, &config.store.api_key);

    let result = recall_memory(&store, id).await?;

    let text = if full {
        result
            .assembled_content()
            .unwrap_or_else(|| result.record.content.clone())
    } else {
        match result.declared_total_size {
            Some(total) => format!(
                "{} ({} parts, {} chars total)",
                result.record.title,
                result.parts.len(),
                total
            ),
            None => format!(
                "{} ({} chars)",
                result.record.title,
                result.record.content.chars().count()
            ),
        }
    };

    Ok(serde_json::json!({
        "content": [
            {
                "type": "text",
                "text": text
            }
        ]
    }))
}

/// Write JSON-RPC response to stdout
fn write_response(stdout: &std::io::Stdout, response: &JsonRpcResponse) -> Result<()> {
    let mut out = stdout.lock();
    serde_json::to_writer(&mut out, response).context("Failed to serialize response")?;
    out.write_all(b"\n")
        .context("Failed to write newline to stdout")?;
    out.flush().context("Failed to flush stdout")?;
    Ok(())
}
