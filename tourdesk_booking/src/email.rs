//! Confirmation email formatting and SMTP delivery.

use anyhow::Context;
use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use serde::{Deserialize, Serialize};
use tourdesk_core::CustomerIdentity;

use crate::BookingRecord;

pub const CONFIRMATION_SUBJECT: &str = "Your BlingDestinations Tour Package Confirmation";

/// Outbound notification seam; implementations deliver one plain-text
/// message to one recipient.
#[async_trait]
pub trait ConfirmationSender: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    /// Sender address, also the SMTP username
    pub email: String,
    pub password: String,
    #[serde(default = "SmtpConfig::default_relay")]
    pub relay: String,
}

impl SmtpConfig {
    fn default_relay() -> String {
        "smtp.gmail.com".to_string()
    }
}

/// STARTTLS SMTP sender using externally configured credentials.
pub struct SmtpConfirmationSender {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpConfirmationSender {
    pub fn new(config: &SmtpConfig) -> anyhow::Result<Self> {
        let credentials = Credentials::new(config.email.clone(), config.password.clone());
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.relay)
            .context("Failed to configure SMTP relay")?
            .credentials(credentials)
            .build();
        let from = config
            .email
            .parse::<Mailbox>()
            .context("Invalid sender address")?;
        Ok(Self { transport, from })
    }
}

#[async_trait]
impl ConfirmationSender for SmtpConfirmationSender {
    async fn send(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(to.parse::<Mailbox>().context("Invalid recipient address")?)
            .subject(subject)
            .body(body.to_string())
            .context("Failed to build confirmation message")?;
        self.transport.send(message).await?;
        Ok(())
    }
}

/// Plain-text confirmation body enumerating the package and any hotel
/// bookings.
#[must_use]
pub fn confirmation_body(identity: &CustomerIdentity, record: &BookingRecord) -> String {
    let mut body = format!(
        "Dear {},\n\n\
         Thank you for booking with BlingDestinations! Here are your trip details:\n\n\
         BOOKING DETAILS:\n\n\
         TOUR PACKAGE:\n\
         Package Name: {}\n\
         Package ID: {}\n\
         Trip Start Date: {}\n\
         Origin City: {}\n\
         Number of Adults: {}\n\
         Number of Children: {}\n\
         Total Cost: {}\n",
        identity.name.as_deref().unwrap_or("Valued Customer"),
        record.package_name,
        record.package_id,
        record.trip_start_date,
        record.origin_city,
        record.tot_adults,
        record.tot_children,
        record.tot_cost,
    );

    if let Some(hotels) = &record.hotel_bookings {
        body.push_str("\nHOTEL BOOKINGS:\n");
        for (city, hotel) in hotels {
            body.push_str(&format!(
                "City: {city}\n\
                 Hotel Name: {}\n\
                 Check-in: {}\n\
                 Check-out: {}\n\
                 Price per Night: {}\n\n",
                hotel.name,
                hotel.check_in,
                hotel.check_out,
                hotel
                    .price
                    .map_or_else(|| "N/A".to_string(), |p| p.to_string()),
            ));
        }
    }

    body.push_str(
        "\nFor any queries or assistance, please feel free to contact us.\n\n\
         Best Regards,\n\
         BlingDestinations Team\n",
    );
    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HotelBooking;
    use std::collections::BTreeMap;
    use uuid::Uuid;

    fn record() -> BookingRecord {
        BookingRecord {
            id: Uuid::nil(),
            package_name: "Bali Bliss".to_string(),
            package_id: "7".to_string(),
            trip_start_date: "2025-03-01".to_string(),
            origin_city: "Mumbai".to_string(),
            tot_adults: 2,
            tot_children: 1,
            tot_cost: "3600 USD".to_string(),
            hotel_bookings: None,
        }
    }

    #[test]
    fn body_without_hotels_has_no_hotel_section() {
        let identity = CustomerIdentity {
            name: Some("Asha Rao".to_string()),
            email: Some("asha@example.com".to_string()),
            phone: None,
        };

        let body = confirmation_body(&identity, &record());

        assert!(body.contains("Dear Asha Rao"));
        assert!(body.contains("Package Name: Bali Bliss"));
        assert!(body.contains("Total Cost: 3600 USD"));
        assert!(!body.contains("HOTEL BOOKINGS"));
    }

    #[test]
    fn body_lists_every_hotel_booking() {
        let mut hotels = BTreeMap::new();
        hotels.insert(
            "Ubud".to_string(),
            HotelBooking {
                name: "Ubud Garden Stay".to_string(),
                check_in: "2025-03-01".to_string(),
                check_out: "2025-03-03".to_string(),
                price: Some(120.0),
            },
        );
        hotels.insert(
            "Kuta".to_string(),
            HotelBooking {
                name: "Kuta Beachfront".to_string(),
                check_in: "2025-03-03".to_string(),
                check_out: "2025-03-06".to_string(),
                price: None,
            },
        );
        let mut record = record();
        record.hotel_bookings = Some(hotels);

        let body = confirmation_body(&CustomerIdentity::default(), &record);

        assert!(body.contains("Dear Valued Customer"));
        assert!(body.contains("Ubud Garden Stay"));
        assert!(body.contains("Kuta Beachfront"));
        assert!(body.contains("Price per Night: 120"));
        assert!(body.contains("Price per Night: N/A"));
    }
}
