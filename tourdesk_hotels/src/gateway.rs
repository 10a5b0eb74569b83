//! RapidAPI booking-data gateway.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::{
    HotelOffer, HotelQuery, HotelSearch, HotelSearchOutcome, OfferLocation, OfferPrice,
    sort_by_price,
};

/// Hotel data service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HotelApiConfig {
    pub api_key: String,

    /// RapidAPI host serving destination lookup and hotel search
    #[serde(default = "HotelApiConfig::default_host")]
    pub host: String,

    #[serde(default = "HotelApiConfig::default_currency")]
    pub currency: String,

    /// Request timeout (seconds)
    #[serde(default = "HotelApiConfig::default_timeout")]
    pub timeout: u64,
}

impl HotelApiConfig {
    fn default_host() -> String {
        "booking-com15.p.rapidapi.com".to_string()
    }

    fn default_currency() -> String {
        "AED".to_string()
    }

    const fn default_timeout() -> u64 {
        20
    }
}

/// Gateway over the remote hotel-data service.
pub struct BookingComGateway {
    client: Client,
    config: HotelApiConfig,
}

impl BookingComGateway {
    pub fn new(config: HotelApiConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self { client, config })
    }

    async fn get(&self, path: &str, params: &[(&str, String)]) -> anyhow::Result<Value> {
        let url = format!("https://{}{path}", self.config.host);
        let payload = self
            .client
            .get(&url)
            .query(params)
            .header("X-RapidAPI-Key", &self.config.api_key)
            .header("X-RapidAPI-Host", &self.config.host)
            .send()
            .await?
            .error_for_status()?
            .json::<Value>()
            .await?;
        Ok(payload)
    }

    /// Resolve a city name to searchable destination identifiers,
    /// keeping city- and district-level matches only.
    async fn resolve_destinations(&self, city: &str) -> anyhow::Result<Vec<String>> {
        let payload = self
            .get(
                "/api/v1/hotels/searchDestination",
                &[("query", city.to_string())],
            )
            .await?;
        let ids = collect_destination_ids(&payload);
        info!("Resolved {} destination id(s) for '{city}'", ids.len());
        Ok(ids)
    }

    /// Search one destination identifier for the stay window.
    async fn search_destination(
        &self,
        dest_id: &str,
        query: &HotelQuery,
    ) -> anyhow::Result<Vec<HotelOffer>> {
        let params: Vec<(&str, String)> = vec![
            ("dest_id", dest_id.to_string()),
            ("search_type", "CITY".to_string()),
            ("adults", query.adults.to_string()),
            ("children_age", children_age(query.children)),
            ("room_qty", query.rooms.to_string()),
            ("arrival_date", query.arrival_date.clone()),
            ("departure_date", query.departure_date.clone()),
            ("units", "metric".to_string()),
            ("currency_code", self.config.currency.clone()),
        ];

        let payload = self.get("/api/v1/hotels/searchHotels", &params).await?;
        if !payload["status"].as_bool().unwrap_or(false) {
            let message = payload["message"].as_str().unwrap_or("Unknown error");
            anyhow::bail!("hotel search rejected for dest_id {dest_id}: {message}");
        }

        Ok(shape_offers(&payload, query.min_rating))
    }
}

#[async_trait]
impl HotelSearch for BookingComGateway {
    async fn search(&self, query: &HotelQuery) -> HotelSearchOutcome {
        let dest_ids = match self.resolve_destinations(&query.city).await {
            Ok(ids) => ids,
            Err(e) => {
                warn!("Destination lookup failed for '{}': {e}", query.city);
                return HotelSearchOutcome::Unavailable;
            }
        };

        if dest_ids.is_empty() {
            info!("No destination ids found for '{}'", query.city);
            return HotelSearchOutcome::Unavailable;
        }

        let mut offers = Vec::new();
        let mut any_success = false;
        for dest_id in &dest_ids {
            match self.search_destination(dest_id, query).await {
                Ok(mut found) => {
                    info!("Found {} hotel(s) for destination {dest_id}", found.len());
                    any_success = true;
                    offers.append(&mut found);
                }
                // Partial failures degrade gracefully: skip the id.
                Err(e) => warn!("Hotel search failed for destination {dest_id}: {e}"),
            }
        }

        if !any_success {
            return HotelSearchOutcome::Unavailable;
        }

        sort_by_price(&mut offers);
        HotelSearchOutcome::Offers(offers)
    }
}

/// One "0" placeholder per child, comma-joined, as the remote service
/// expects ages it is not given.
fn children_age(children: u32) -> String {
    vec!["0"; children as usize].join(",")
}

/// City- and district-level destination ids from a lookup payload.
fn collect_destination_ids(payload: &Value) -> Vec<String> {
    if !payload["status"].as_bool().unwrap_or(false) {
        return Vec::new();
    }
    payload["data"]
        .as_array()
        .map(|locations| {
            locations
                .iter()
                .filter(|loc| {
                    matches!(loc["dest_type"].as_str(), Some("city" | "district"))
                })
                .filter_map(|loc| json_to_id(&loc["dest_id"]))
                .collect()
        })
        .unwrap_or_default()
}

fn json_to_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Shape one search payload into offers, dropping those below the
/// rating floor.
fn shape_offers(payload: &Value, min_rating: f64) -> Vec<HotelOffer> {
    payload["data"]["hotels"]
        .as_array()
        .map(|hotels| {
            hotels
                .iter()
                .filter_map(|hotel| shape_offer(hotel, min_rating))
                .collect()
        })
        .unwrap_or_default()
}

fn shape_offer(hotel: &Value, min_rating: f64) -> Option<HotelOffer> {
    let property = &hotel["property"];
    let rating = property["reviewScore"].as_f64();
    if rating.unwrap_or(0.0) < min_rating {
        return None;
    }

    let breakdown = &property["priceBreakdown"];
    Some(HotelOffer {
        name: property["name"].as_str().unwrap_or_default().to_string(),
        rating,
        rating_word: property["reviewScoreWord"].as_str().map(str::to_string),
        description: hotel["accessibilityLabel"]
            .as_str()
            .unwrap_or_default()
            .to_string(),
        image_url: property["photoUrls"][0].as_str().map(str::to_string),
        price: OfferPrice {
            current: breakdown["grossPrice"]["value"].as_f64(),
            original: breakdown["strikethroughPrice"]["value"].as_f64(),
            currency: property["currency"].as_str().map(str::to_string),
        },
        location: OfferLocation {
            latitude: property["latitude"].as_f64(),
            longitude: property["longitude"].as_f64(),
            distance_to_center: distance_text(&property["distanceFromCenter"]),
        },
    })
}

fn distance_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
