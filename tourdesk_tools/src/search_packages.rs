//! Tour-package search tool.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tourdesk_catalog::{PackageCatalog, PackageFilter};
use tourdesk_core::{SessionContext, Tool, ToolDefinition, ToolResult, schema_object};
use tracing::warn;

pub struct SearchPackagesTool {
    catalog: Arc<dyn PackageCatalog>,
}

impl SearchPackagesTool {
    #[must_use]
    pub fn new(catalog: Arc<dyn PackageCatalog>) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl Tool for SearchPackagesTool {
    fn name(&self) -> &str {
        "search_packages"
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: "Search for available tour packages based on location, destination \
                type, price, and duration. Returns package details including package name, \
                cities included, URL, and more."
                .to_string(),
            input_schema: schema_object(
                json!({
                    "location": {
                        "type": "string",
                        "description": "Name of the destination (city, country or region)"
                    },
                    "duration": {
                        "type": "integer",
                        "minimum": 1,
                        "description": "Number of days for the tour"
                    },
                    "price": {
                        "type": "number",
                        "exclusiveMinimum": 0,
                        "description": "Maximum price per person"
                    },
                    "destination_type": {
                        "type": "string",
                        "description": "Type of destination (Beach/Island, Wildlife/Nature, \
                            Culture, Heritage, Shopping, Other)"
                    }
                }),
                &[],
            ),
        }
    }

    async fn execute(&self, input: serde_json::Value, _ctx: &SessionContext) -> ToolResult {
        let filter = PackageFilter {
            location: input
                .get("location")
                .and_then(|v| v.as_str())
                .map(str::to_string),
            duration: input
                .get("duration")
                .and_then(serde_json::Value::as_i64)
                .and_then(|v| i32::try_from(v).ok()),
            max_price: input.get("price").and_then(serde_json::Value::as_f64),
            destination_type: input
                .get("destination_type")
                .and_then(|v| v.as_str())
                .map(str::to_string),
        };

        match self.catalog.search(&filter).await {
            Ok(packages) => ToolResult::success(json!({ "packages": packages }).to_string()),
            Err(e) => {
                warn!("Package catalog lookup failed: {e}");
                ToolResult::error(
                    "The package catalog is currently unreachable; no packages could be \
                     retrieved. Please try again shortly.",
                )
                .with_error_type("upstream_unavailable")
            }
        }
    }
}
