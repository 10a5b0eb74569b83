//! Booking persistence tool.
//!
//! Customer identity never appears in this tool's schema: it is bound
//! from the session context at dispatch time, so the model cannot
//! fabricate or leak contact details through arguments.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tourdesk_booking::{BookingRecord, BookingStore, HotelBooking};
use tourdesk_core::{SessionContext, Tool, ToolDefinition, ToolResult, schema_object};
use tracing::warn;
use uuid::Uuid;

pub struct RecordBookingTool {
    store: Arc<dyn BookingStore>,
}

impl RecordBookingTool {
    #[must_use]
    pub fn new(store: Arc<dyn BookingStore>) -> Self {
        Self { store }
    }
}

#[derive(Debug, Deserialize)]
struct RecordBookingArgs {
    package_name: String,
    package_id: String,
    trip_start_date: String,
    origin_city: String,
    tot_adults: i32,
    #[serde(default)]
    tot_children: i32,
    tot_cost: String,
    #[serde(default)]
    hotel_bookings: Option<BTreeMap<String, HotelBooking>>,
}

#[async_trait]
impl Tool for RecordBookingTool {
    fn name(&self) -> &str {
        "record_booking"
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: "Record a confirmed booking and trigger the confirmation email. \
                Call exactly once per completed booking. Do not include the customer's \
                name, email, or phone number."
                .to_string(),
            input_schema: schema_object(
                json!({
                    "package_name": {
                        "type": "string",
                        "description": "Name of the booked package"
                    },
                    "package_id": {
                        "type": "string",
                        "description": "Identifier of the booked package"
                    },
                    "trip_start_date": {
                        "type": "string",
                        "description": "Start date of the trip (YYYY-MM-DD)"
                    },
                    "origin_city": {
                        "type": "string",
                        "description": "City the trip starts from"
                    },
                    "tot_adults": {
                        "type": "integer",
                        "minimum": 1,
                        "description": "Number of adults"
                    },
                    "tot_children": {
                        "type": "integer",
                        "minimum": 0,
                        "description": "Number of children"
                    },
                    "tot_cost": {
                        "type": "string",
                        "description": "Total cost of the trip as presented to the customer"
                    },
                    "hotel_bookings": {
                        "type": "object",
                        "description": "Hotels booked separately, keyed by city",
                        "additionalProperties": {
                            "type": "object",
                            "properties": {
                                "name": {"type": "string"},
                                "check_in": {"type": "string"},
                                "check_out": {"type": "string"},
                                "price": {"type": "number"}
                            },
                            "required": ["name", "check_in", "check_out"]
                        }
                    }
                }),
                &[
                    "package_name",
                    "package_id",
                    "trip_start_date",
                    "origin_city",
                    "tot_adults",
                    "tot_cost",
                ],
            ),
        }
    }

    async fn execute(&self, input: serde_json::Value, ctx: &SessionContext) -> ToolResult {
        let args: RecordBookingArgs = match serde_json::from_value(input) {
            Ok(args) => args,
            Err(e) => {
                return ToolResult::error(format!("Invalid booking arguments: {e}"))
                    .with_error_type("validation_error");
            }
        };

        let record = BookingRecord {
            id: Uuid::now_v7(),
            package_name: args.package_name,
            package_id: args.package_id,
            trip_start_date: args.trip_start_date,
            origin_city: args.origin_city,
            tot_adults: args.tot_adults,
            tot_children: args.tot_children,
            tot_cost: args.tot_cost,
            hotel_bookings: args.hotel_bookings,
        };

        match self.store.commit(&record, &ctx.identity).await {
            Ok(()) => ToolResult::success(
                json!({ "status": "recorded", "booking_id": record.id }).to_string(),
            ),
            Err(e) => {
                warn!("Booking persistence failed: {e}");
                ToolResult::error(
                    "The booking could not be saved; nothing was recorded. Please try again.",
                )
                .with_error_type("persistence_failure")
            }
        }
    }
}
