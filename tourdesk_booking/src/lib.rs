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

//! Booking persistence and the confirmation-email side effect.
//!
//! A commit ensures the backing schema, inserts exactly one row, then
//! attempts a best-effort confirmation email when the session knows an
//! address. Email failure never fails the commit; a failed insert is
//! reported truthfully.

mod email;
mod store;

pub use email::{
    CONFIRMATION_SUBJECT, ConfirmationSender, SmtpConfig, SmtpConfirmationSender,
    confirmation_body,
};
pub use store::SqlBookingStore;

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tourdesk_core::CustomerIdentity;
use uuid::Uuid;

/// One hotel booked separately from the package, keyed by city in
/// [`BookingRecord::hotel_bookings`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HotelBooking {
    pub name: String,
    pub check_in: String,
    pub check_out: String,
    /// Price per night, when known
    pub price: Option<f64>,
}

/// A finalized booking, created exactly once per completed booking.
///
/// Customer identity is deliberately absent: it is carried from the
/// session at commit time, never from model-supplied arguments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRecord {
    pub id: Uuid,
    pub package_name: String,
    pub package_id: String,
    pub trip_start_date: String,
    pub origin_city: String,
    pub tot_adults: i32,
    pub tot_children: i32,
    /// Total cost as computed by the dialogue policy
    pub tot_cost: String,
    pub hotel_bookings: Option<BTreeMap<String, HotelBooking>>,
}

#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Persist the record and trigger the confirmation notification.
    /// `Err` means the write failed and nothing was recorded.
    async fn commit(
        &self,
        record: &BookingRecord,
        identity: &CustomerIdentity,
    ) -> anyhow::Result<()>;
}
