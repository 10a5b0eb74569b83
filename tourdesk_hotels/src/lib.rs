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

//! Hotel availability gateway.
//!
//! A city name resolves to one or more destination identifiers; each
//! identifier gets an independent search request; results are filtered
//! by rating, merged, and sorted ascending by current price with
//! missing prices last. Unavailability is a sentinel outcome, never an
//! error crossing the tool boundary.

mod gateway;

pub use gateway::{BookingComGateway, HotelApiConfig};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Current and strikethrough price for an offer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OfferPrice {
    pub current: Option<f64>,
    pub original: Option<f64>,
    pub currency: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OfferLocation {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub distance_to_center: Option<String>,
}

/// One hotel offer for the requested stay window. Ephemeral;
/// constructed per search and never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HotelOffer {
    pub name: String,
    pub rating: Option<f64>,
    pub rating_word: Option<String>,
    pub description: String,
    pub image_url: Option<String>,
    pub price: OfferPrice,
    pub location: OfferLocation,
}

/// Search parameters for one city and stay window.
#[derive(Debug, Clone, PartialEq)]
pub struct HotelQuery {
    pub city: String,
    pub arrival_date: String,
    pub departure_date: String,
    pub adults: u32,
    pub children: u32,
    pub rooms: u32,
    pub min_rating: f64,
}

/// Outcome of a hotel search. `Unavailable` means no destination
/// resolved or every remote call failed; an empty `Offers` list means
/// the searches ran but nothing matched.
#[derive(Debug, Clone, PartialEq)]
pub enum HotelSearchOutcome {
    Offers(Vec<HotelOffer>),
    Unavailable,
}

#[async_trait]
pub trait HotelSearch: Send + Sync {
    async fn search(&self, query: &HotelQuery) -> HotelSearchOutcome;
}

/// Stable ascending sort by current price; offers without a current
/// price are treated as infinitely expensive and end up last.
pub fn sort_by_price(offers: &mut [HotelOffer]) {
    offers.sort_by(|a, b| price_key(a).total_cmp(&price_key(b)));
}

fn price_key(offer: &HotelOffer) -> f64 {
    offer.price.current.unwrap_or(f64::INFINITY)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offer(name: &str, current: Option<f64>) -> HotelOffer {
        HotelOffer {
            name: name.to_string(),
            rating: Some(8.0),
            rating_word: Some("Very good".to_string()),
            description: String::new(),
            image_url: None,
            price: OfferPrice {
                current,
                original: None,
                currency: Some("AED".to_string()),
            },
            location: OfferLocation {
                latitude: None,
                longitude: None,
                distance_to_center: None,
            },
        }
    }

    #[test]
    fn sorts_ascending_with_missing_price_last() {
        let mut offers = vec![
            offer("mid", Some(300.0)),
            offer("unpriced", None),
            offer("cheap", Some(150.0)),
        ];

        sort_by_price(&mut offers);

        let names: Vec<&str> = offers.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["cheap", "mid", "unpriced"]);
    }

    #[test]
    fn equal_prices_keep_their_relative_order() {
        let mut offers = vec![
            offer("first", Some(200.0)),
            offer("second", Some(200.0)),
            offer("third", Some(100.0)),
        ];

        sort_by_price(&mut offers);

        let names: Vec<&str> = offers.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["third", "first", "second"]);
    }

    #[test]
    fn sort_is_idempotent() {
        let mut offers = vec![
            offer("b", Some(300.0)),
            offer("a", Some(150.0)),
            offer("c", None),
        ];
        sort_by_price(&mut offers);
        let once = offers.clone();
        sort_by_price(&mut offers);
        assert_eq!(offers, once);
    }
}
