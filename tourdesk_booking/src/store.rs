//! SQL-backed booking store.

use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, DbErr, NotSet, Schema, Set,
};
use tourdesk_core::CustomerIdentity;
use tracing::{debug, info, warn};

use crate::email::{CONFIRMATION_SUBJECT, ConfirmationSender, confirmation_body};
use crate::{BookingRecord, BookingStore};
use tourdesk_entities::bookings;

fn is_table_already_exists_error(err: &DbErr) -> bool {
    err.to_string().contains("table") && err.to_string().contains("already exists")
}

/// Booking store over the append-only `bookings` table, with an
/// optional confirmation sender.
pub struct SqlBookingStore {
    db: DatabaseConnection,
    sender: Option<Arc<dyn ConfirmationSender>>,
}

impl SqlBookingStore {
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db, sender: None }
    }

    #[must_use]
    pub fn with_sender(mut self, sender: Arc<dyn ConfirmationSender>) -> Self {
        self.sender = Some(sender);
        self
    }

    async fn ensure_schema(&self) -> anyhow::Result<()> {
        let backend = self.db.get_database_backend();
        let schema = Schema::new(backend);
        let stmt = schema.create_table_from_entity(bookings::Entity);
        match self.db.execute(&stmt).await {
            Ok(_) => Ok(()),
            Err(e) if is_table_already_exists_error(&e) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Best-effort confirmation email. Never fails the commit.
    async fn notify(&self, record: &BookingRecord, identity: &CustomerIdentity) {
        let (Some(sender), Some(email)) = (self.sender.as_ref(), identity.email.as_deref()) else {
            debug!("No confirmation sender or email on session; skipping notification");
            return;
        };

        let body = confirmation_body(identity, record);
        match sender.send(email, CONFIRMATION_SUBJECT, &body).await {
            Ok(()) => info!("Confirmation email sent to {email}"),
            Err(e) => warn!("Confirmation email to {email} failed: {e}"),
        }
    }
}

#[async_trait]
impl BookingStore for SqlBookingStore {
    async fn commit(
        &self,
        record: &BookingRecord,
        identity: &CustomerIdentity,
    ) -> anyhow::Result<()> {
        self.ensure_schema().await?;

        let hotel_bookings = record
            .hotel_bookings
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        bookings::ActiveModel {
            cust_id: NotSet,
            booking_id: Set(record.id.to_string()),
            customer_name: Set(identity.name.clone()),
            customer_email: Set(identity.email.clone()),
            customer_mobile: Set(identity.phone.clone()),
            package_name: Set(record.package_name.clone()),
            package_id: Set(record.package_id.clone()),
            trip_start_date: Set(record.trip_start_date.clone()),
            origin_city: Set(record.origin_city.clone()),
            tot_adults: Set(record.tot_adults),
            tot_children: Set(record.tot_children),
            tot_cost: Set(record.tot_cost.clone()),
            hotel_bookings: Set(hotel_bookings),
            created_at: Set(chrono::Utc::now()),
        }
        .insert(&self.db)
        .await?;

        info!(
            "Booking {} recorded for package {} ({})",
            record.id, record.package_name, record.package_id
        );

        self.notify(record, identity).await;
        Ok(())
    }
}
