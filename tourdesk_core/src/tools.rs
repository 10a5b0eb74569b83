//! Tool abstractions exposed to the dialogue engine.
//!
//! Every tool declares a JSON Schema for its arguments; the registry
//! compiles the schema at registration and validates arguments before
//! dispatch, so malformed model output becomes a structured error
//! result the model can correct on its next round-trip instead of an
//! exception crossing the tool boundary.

use async_trait::async_trait;
use jsonschema::JSONSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::SessionContext;

/// Declared surface of one tool: name, description, and the JSON
/// Schema its arguments are validated against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: serde_json::Value,
}

/// Result of tool execution, fed back to the model as a tool-result
/// message. Failures are data, not exceptions.
#[derive(Debug, Clone)]
pub struct ToolResult {
    pub content: String,
    pub is_error: bool,
    pub error_type: Option<String>,
}

impl ToolResult {
    pub fn success(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: false,
            error_type: None,
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: true,
            error_type: Some("tool_error".to_string()),
        }
    }

    #[must_use]
    pub fn with_error_type(mut self, error_type: impl Into<String>) -> Self {
        self.error_type = Some(error_type.into());
        self
    }
}

/// A schema-validated operation the dialogue policy may request.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn definition(&self) -> ToolDefinition;

    /// Execute with already-validated arguments. The session context is
    /// bound in at dispatch time; tools needing customer identity read
    /// it from here, never from model-supplied arguments.
    async fn execute(&self, input: serde_json::Value, ctx: &SessionContext) -> ToolResult;
}

struct RegisteredTool {
    tool: Box<dyn Tool>,
    definition: ToolDefinition,
    schema: JSONSchema,
}

/// Registry of callable tools, keyed by name, in registration order.
pub struct ToolRegistry {
    tools: Vec<RegisteredTool>,
}

impl ToolRegistry {
    #[must_use]
    pub const fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Register a tool, compiling its argument schema.
    pub fn register(&mut self, tool: Box<dyn Tool>) -> anyhow::Result<()> {
        let definition = tool.definition();
        let schema = JSONSchema::compile(&definition.input_schema).map_err(|e| {
            anyhow::anyhow!("invalid argument schema for tool '{}': {e}", definition.name)
        })?;
        info!("Registering tool: {}", definition.name);
        self.tools.push(RegisteredTool {
            tool,
            definition,
            schema,
        });
        Ok(())
    }

    /// Definitions advertised to the model on every invocation.
    #[must_use]
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.definition.clone()).collect()
    }

    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.definition.name.as_str()).collect()
    }

    /// Validate arguments and run the named tool.
    ///
    /// Unknown names and schema violations come back as error results,
    /// not errors: the model sees them and can self-correct.
    pub async fn dispatch(
        &self,
        name: &str,
        input: serde_json::Value,
        ctx: &SessionContext,
    ) -> ToolResult {
        let Some(entry) = self.tools.iter().find(|t| t.definition.name == name) else {
            return ToolResult::error(format!("Unknown tool: {name}"))
                .with_error_type("unknown_tool");
        };

        if let Err(errors) = entry.schema.validate(&input) {
            let detail = errors
                .map(|e| {
                    let path = e.instance_path.to_string();
                    if path.is_empty() {
                        e.to_string()
                    } else {
                        format!("{path}: {e}")
                    }
                })
                .collect::<Vec<_>>()
                .join("; ");
            return ToolResult::error(format!("Invalid arguments for {name}: {detail}"))
                .with_error_type("validation_error");
        }

        entry.tool.execute(input, ctx).await
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Helper to build an object schema from a property map.
#[must_use]
#[allow(clippy::needless_pass_by_value)]
pub fn schema_object(properties: serde_json::Value, required: &[&str]) -> serde_json::Value {
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}
