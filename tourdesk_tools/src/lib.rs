#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

//! The three operations the dialogue policy may request: package
//! search, hotel search, and booking persistence. Each wraps one leaf
//! component behind a schema-validated [`Tool`].

mod record_booking;
mod search_hotels;
mod search_packages;

pub use record_booking::RecordBookingTool;
pub use search_hotels::SearchHotelsTool;
pub use search_packages::SearchPackagesTool;

use std::sync::Arc;

use tourdesk_booking::BookingStore;
use tourdesk_catalog::PackageCatalog;
use tourdesk_core::ToolRegistry;
use tourdesk_hotels::HotelSearch;

/// Registry with all three travel tools registered.
pub fn travel_tool_registry(
    catalog: Arc<dyn PackageCatalog>,
    hotels: Arc<dyn HotelSearch>,
    bookings: Arc<dyn BookingStore>,
) -> anyhow::Result<ToolRegistry> {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(SearchPackagesTool::new(catalog)))?;
    registry.register(Box::new(SearchHotelsTool::new(hotels)))?;
    registry.register(Box::new(RecordBookingTool::new(bookings)))?;
    Ok(registry)
}
