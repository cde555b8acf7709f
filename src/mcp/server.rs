use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rmcp::handler::server::ServerHandler;
use rmcp::model::{
    CallToolRequestParams, CallToolResult, Content, Implementation, ListToolsResult,
    PaginatedRequestParams, ServerCapabilities, ServerInfo, Tool, ToolsCapability,
};
use rmcp::service::RequestContext;
use rmcp::{ErrorData as McpError, RoleServer};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use huffman_service::service::{DecryptRequest, HuffmanService};

#[derive(Clone)]
pub struct McpServer {
    service: HuffmanService,
}

impl McpServer {
    pub fn new(service: HuffmanService) -> Self {
        Self { service }
    }

    fn export_tree_impl(&self, session_id: &str) -> huffman_service::Result<String> {
        let document = self.service.export_tree(session_id)?;
        let output = serde_json::json!({
            "filename": document.filename,
            "contentType": document.content_type,
            "document": STANDARD.encode(&document.bytes),
        });
        Ok(serde_json::to_string_pretty(&output).unwrap_or_default())
    }

    fn dispatch(
        &self,
        name: &str,
        arguments: serde_json::Map<String, serde_json::Value>,
    ) -> Result<CallToolResult, McpError> {
        let arguments = serde_json::Value::Object(arguments);
        let result = match name {
            "encrypt" => {
                let params: EncryptParams = serde_json::from_value(arguments)
                    .map_err(|e| McpError::invalid_params(e.to_string(), None))?;

                to_result(self.service.encrypt(&params.text))
            }
            "decrypt" => {
                let params: DecryptParams = serde_json::from_value(arguments)
                    .map_err(|e| McpError::invalid_params(e.to_string(), None))?;

                let request = DecryptRequest {
                    session_id: params.session_id,
                    encoded_text: params.encoded_text,
                    packed_payload: params.packed_payload,
                    bit_count: params.bit_count,
                };
                to_result(self.service.decrypt(&request))
            }
            "visualize_tree" => {
                let params: SessionParams = serde_json::from_value(arguments)
                    .map_err(|e| McpError::invalid_params(e.to_string(), None))?;

                to_result(self.service.visualize_tree(&params.session_id))
            }
            "export_tree" => {
                let params: SessionParams = serde_json::from_value(arguments)
                    .map_err(|e| McpError::invalid_params(e.to_string(), None))?;

                match self.export_tree_impl(&params.session_id) {
                    Ok(json) => CallToolResult::success(vec![Content::text(json)]),
                    Err(e) => CallToolResult::error(vec![Content::text(e.to_string())]),
                }
            }
            _ => {
                return Err(McpError::invalid_params(
                    format!("Unknown tool: {}", name),
                    None,
                ));
            }
        };

        Ok(result)
    }

    /// Runs a tool on the blocking pool; rendering is CPU-bound.
    async fn run_tool(
        &self,
        name: String,
        arguments: serde_json::Map<String, serde_json::Value>,
    ) -> Result<CallToolResult, McpError> {
        let server = self.clone();
        tokio::task::spawn_blocking(move || server.dispatch(&name, arguments))
            .await
            .map_err(|e| McpError::internal_error(e.to_string(), None))?
    }
}

fn to_result<T: Serialize>(result: huffman_service::Result<T>) -> CallToolResult {
    match result {
        Ok(value) => {
            let json = serde_json::to_string_pretty(&value).unwrap_or_default();
            CallToolResult::success(vec![Content::text(json)])
        }
        Err(e) => CallToolResult::error(vec![Content::text(e.to_string())]),
    }
}

fn schema_for<T: JsonSchema>() -> Arc<serde_json::Map<String, serde_json::Value>> {
    let schema = schemars::schema_for!(T);
    match serde_json::to_value(&schema) {
        Ok(serde_json::Value::Object(map)) => Arc::new(map),
        _ => Arc::new(serde_json::Map::new()),
    }
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct EncryptParams {
    /// Text to compress
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DecryptParams {
    /// Session returned by encrypt
    pub session_id: String,
    /// Payload as a 0/1 string
    #[serde(default)]
    pub encoded_text: Option<String>,
    /// Base64 packed payload, used with bitCount
    #[serde(default)]
    pub packed_payload: Option<String>,
    /// Meaningful bits in packedPayload
    #[serde(default)]
    pub bit_count: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionParams {
    /// Session returned by encrypt
    pub session_id: String,
}

impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: Default::default(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: Some(false),
                }),
                ..Default::default()
            },
            server_info: Implementation {
                name: "huffman-service".to_string(),
                title: Some("Huffman Service".to_string()),
                version: env!("CARGO_PKG_VERSION").to_string(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Huffman text compression. Call encrypt first; the returned sessionId \
                 selects the tree for decrypt, visualize_tree and export_tree."
                    .to_string(),
            ),
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult {
            next_cursor: None,
            tools: tools(),
            meta: None,
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        self.run_tool(request.name.to_string(), request.arguments.unwrap_or_default())
            .await
    }
}

fn tools() -> Vec<Tool> {
    vec![
        Tool {
            name: "encrypt".into(),
            title: Some("Encrypt".to_string()),
            description: Some("Huffman-encode text and open a session".into()),
            input_schema: schema_for::<EncryptParams>(),
            output_schema: None,
            annotations: None,
            icons: None,
            meta: None,
        },
        Tool {
            name: "decrypt".into(),
            title: Some("Decrypt".to_string()),
            description: Some("Decode a payload with a session's tree".into()),
            input_schema: schema_for::<DecryptParams>(),
            output_schema: None,
            annotations: None,
            icons: None,
            meta: None,
        },
        Tool {
            name: "visualize_tree".into(),
            title: Some("Visualize Tree".to_string()),
            description: Some("Render a session's tree as a base64 PNG".into()),
            input_schema: schema_for::<SessionParams>(),
            output_schema: None,
            annotations: None,
            icons: None,
            meta: None,
        },
        Tool {
            name: "export_tree".into(),
            title: Some("Export Tree".to_string()),
            description: Some("Render a session's tree as a base64 PDF".into()),
            input_schema: schema_for::<SessionParams>(),
            output_schema: None,
            annotations: None,
            icons: None,
            meta: None,
        },
    ]
}
