//! Hotel availability tool.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tourdesk_core::{SessionContext, Tool, ToolDefinition, ToolResult, schema_object};
use tourdesk_hotels::{HotelQuery, HotelSearch, HotelSearchOutcome};

pub struct SearchHotelsTool {
    gateway: Arc<dyn HotelSearch>,
}

impl SearchHotelsTool {
    #[must_use]
    pub fn new(gateway: Arc<dyn HotelSearch>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl Tool for SearchHotelsTool {
    fn name(&self) -> &str {
        "search_hotels"
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: "Search for hotels in a city for a stay window and party size. \
                Results are sorted by price, cheapest first."
                .to_string(),
            input_schema: schema_object(
                json!({
                    "city": {
                        "type": "string",
                        "description": "City to search hotels in"
                    },
                    "arrival_date": {
                        "type": "string",
                        "description": "Check-in date (YYYY-MM-DD)"
                    },
                    "departure_date": {
                        "type": "string",
                        "description": "Check-out date (YYYY-MM-DD)"
                    },
                    "adults": {
                        "type": "integer",
                        "minimum": 1,
                        "description": "Number of adults"
                    },
                    "children": {
                        "type": "integer",
                        "minimum": 0,
                        "default": 0,
                        "description": "Number of children"
                    },
                    "rooms": {
                        "type": "integer",
                        "minimum": 1,
                        "default": 1,
                        "description": "Number of rooms"
                    },
                    "min_rating": {
                        "type": "number",
                        "minimum": 0,
                        "default": 0,
                        "description": "Minimum review score to include"
                    }
                }),
                &["city", "arrival_date", "departure_date", "adults"],
            ),
        }
    }

    async fn execute(&self, input: serde_json::Value, _ctx: &SessionContext) -> ToolResult {
        let Some(city) = input.get("city").and_then(|v| v.as_str()) else {
            return ToolResult::error("Missing required parameter: city")
                .with_error_type("validation_error");
        };

        let query = HotelQuery {
            city: city.to_string(),
            arrival_date: string_arg(&input, "arrival_date"),
            departure_date: string_arg(&input, "departure_date"),
            adults: uint_arg(&input, "adults", 1),
            children: uint_arg(&input, "children", 0),
            rooms: uint_arg(&input, "rooms", 1),
            min_rating: input
                .get("min_rating")
                .and_then(serde_json::Value::as_f64)
                .unwrap_or(0.0),
        };

        match self.gateway.search(&query).await {
            HotelSearchOutcome::Offers(hotels) => {
                ToolResult::success(json!({ "status": "ok", "hotels": hotels }).to_string())
            }
            HotelSearchOutcome::Unavailable => ToolResult::success(
                json!({
                    "status": "unavailable",
                    "hotels": [],
                    "message": format!(
                        "No hotels were found for {city}: the hotel search service \
                         returned no results or was unreachable."
                    )
                })
                .to_string(),
            ),
        }
    }
}

fn string_arg(input: &serde_json::Value, key: &str) -> String {
    input
        .get(key)
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string()
}

fn uint_arg(input: &serde_json::Value, key: &str, default: u32) -> u32 {
    input
        .get(key)
        .and_then(serde_json::Value::as_u64)
        .and_then(|v| u32::try_from(v).ok())
        .unwrap_or(default)
}
