//! End-to-end turns through the dialogue engine with mocked leaves.

#![allow(clippy::unwrap_used)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Value, json};
use tourdesk_booking::{BookingRecord, BookingStore};
use tourdesk_catalog::{PackageCatalog, PackageFilter, TourPackage};
use tourdesk_core::{
    ChatMessage, ChatModel, ChatParams, CustomerIdentity, DialogueEngine, EngineConfig, ModelTurn,
    Role, SessionContext, ToolCall, ToolDefinition,
};
use tourdesk_hotels::{
    HotelOffer, HotelQuery, HotelSearch, HotelSearchOutcome, OfferLocation, OfferPrice,
    sort_by_price,
};
use tourdesk_tools::travel_tool_registry;

// --- scripted model -------------------------------------------------

struct ScriptedModel {
    turns: Mutex<VecDeque<ModelTurn>>,
    seen: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedModel {
    fn new(turns: Vec<ModelTurn>) -> Arc<Self> {
        Arc::new(Self {
            turns: Mutex::new(turns.into()),
            seen: Mutex::new(Vec::new()),
        })
    }

    fn seen(&self) -> Vec<Vec<ChatMessage>> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        _tools: &[ToolDefinition],
        _params: &ChatParams,
    ) -> anyhow::Result<ModelTurn> {
        self.seen.lock().unwrap().push(messages.to_vec());
        self.turns
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| anyhow::anyhow!("script exhausted"))
    }
}

fn reply(text: &str) -> ModelTurn {
    ModelTurn {
        content: text.to_string(),
        tool_calls: Vec::new(),
        usage: None,
    }
}

fn tool_request(id: &str, name: &str, arguments: Value) -> ModelTurn {
    ModelTurn {
        content: String::new(),
        tool_calls: vec![ToolCall {
            id: id.to_string(),
            name: name.to_string(),
            arguments,
        }],
        usage: None,
    }
}

// --- mocked leaves --------------------------------------------------

struct StaticCatalog {
    packages: Vec<TourPackage>,
}

#[async_trait]
impl PackageCatalog for StaticCatalog {
    async fn search(&self, filter: &PackageFilter) -> anyhow::Result<Vec<TourPackage>> {
        Ok(self
            .packages
            .iter()
            .filter(|p| {
                filter.location.as_ref().is_none_or(|loc| {
                    p.location.to_lowercase().contains(&loc.to_lowercase())
                }) && filter.duration.is_none_or(|d| p.duration == d)
                    && filter.max_price.is_none_or(|max| p.price <= max)
                    && filter
                        .destination_type
                        .as_ref()
                        .is_none_or(|t| p.destination_type.as_deref() == Some(t.as_str()))
            })
            .cloned()
            .collect())
    }
}

struct DownCatalog;

#[async_trait]
impl PackageCatalog for DownCatalog {
    async fn search(&self, _filter: &PackageFilter) -> anyhow::Result<Vec<TourPackage>> {
        anyhow::bail!("database file is locked")
    }
}

struct ScriptedGateway {
    offers: Vec<HotelOffer>,
}

#[async_trait]
impl HotelSearch for ScriptedGateway {
    async fn search(&self, _query: &HotelQuery) -> HotelSearchOutcome {
        let mut offers = self.offers.clone();
        sort_by_price(&mut offers);
        HotelSearchOutcome::Offers(offers)
    }
}

struct OutageGateway {
    calls: AtomicUsize,
}

#[async_trait]
impl HotelSearch for OutageGateway {
    async fn search(&self, _query: &HotelQuery) -> HotelSearchOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        HotelSearchOutcome::Unavailable
    }
}

#[derive(Default)]
struct MemoryBookingStore {
    commits: Mutex<Vec<(BookingRecord, CustomerIdentity)>>,
}

#[async_trait]
impl BookingStore for MemoryBookingStore {
    async fn commit(
        &self,
        record: &BookingRecord,
        identity: &CustomerIdentity,
    ) -> anyhow::Result<()> {
        self.commits
            .lock()
            .unwrap()
            .push((record.clone(), identity.clone()));
        Ok(())
    }
}

struct FailingBookingStore;

#[async_trait]
impl BookingStore for FailingBookingStore {
    async fn commit(
        &self,
        _record: &BookingRecord,
        _identity: &CustomerIdentity,
    ) -> anyhow::Result<()> {
        anyhow::bail!("storage unreachable")
    }
}

// --- fixtures -------------------------------------------------------

fn bali_package() -> TourPackage {
    TourPackage {
        id: 7,
        location: "Bali, Indonesia".to_string(),
        trip_id: Some("TRIP-7".to_string()),
        package_name: "Bali Bliss".to_string(),
        url: Some("https://example.com/packages/7".to_string()),
        duration: 5,
        tour_type: Some("standard".to_string()),
        cities_included: vec!["Ubud".to_string(), "Kuta".to_string()],
        price: 1200.0,
        itinerary_data: Some("Day 1: arrival in Ubud".to_string()),
        destination_type: Some("Beach/Island".to_string()),
        hotel: Some("Not Included".to_string()),
    }
}

fn offer(name: &str, current: Option<f64>) -> HotelOffer {
    HotelOffer {
        name: name.to_string(),
        rating: Some(8.0),
        rating_word: Some("Very good".to_string()),
        description: format!("{name}, central"),
        image_url: None,
        price: OfferPrice {
            current,
            original: None,
            currency: Some("AED".to_string()),
        },
        location: OfferLocation {
            latitude: None,
            longitude: None,
            distance_to_center: Some("1 km".to_string()),
        },
    }
}

fn ctx() -> SessionContext {
    SessionContext {
        session_id: "session-1".to_string(),
        identity: CustomerIdentity {
            name: Some("Asha Rao".to_string()),
            email: Some("asha@example.com".to_string()),
            phone: Some("+91-98000-00000".to_string()),
        },
    }
}

struct Harness {
    engine: DialogueEngine<Arc<ScriptedModel>>,
    model: Arc<ScriptedModel>,
}

fn harness(
    turns: Vec<ModelTurn>,
    catalog: Arc<dyn PackageCatalog>,
    gateway: Arc<dyn HotelSearch>,
    bookings: Arc<MemoryBookingStore>,
) -> Harness {
    let model = ScriptedModel::new(turns);
    let registry = travel_tool_registry(catalog, gateway, bookings).unwrap();
    Harness {
        engine: DialogueEngine::new(model.clone(), registry, EngineConfig::default()),
        model,
    }
}

fn tool_message(history: &[ChatMessage]) -> &ChatMessage {
    history
        .iter()
        .find(|m| m.role == Role::Tool)
        .expect("expected a tool-result message")
}

// --- scenarios ------------------------------------------------------

#[tokio::test]
async fn package_search_returns_the_matching_package() {
    let harness = harness(
        vec![
            tool_request(
                "c1",
                "search_packages",
                json!({"location": "Bali", "duration": 5}),
            ),
            reply("The Bali Bliss package fits: 5 days at 1200 per person."),
        ],
        Arc::new(StaticCatalog {
            packages: vec![bali_package()],
        }),
        Arc::new(ScriptedGateway { offers: Vec::new() }),
        Arc::new(MemoryBookingStore::default()),
    );
    let mut history = Vec::new();

    harness
        .engine
        .advance(&ctx(), &mut history, "5 days in Bali please")
        .await
        .unwrap();

    let payload: Value = serde_json::from_str(&tool_message(&history).content).unwrap();
    let packages = payload["packages"].as_array().unwrap();
    assert_eq!(packages.len(), 1);
    assert_eq!(packages[0]["package_name"], "Bali Bliss");
    assert_eq!(packages[0]["duration"], 5);
    assert_eq!(packages[0]["price"], 1200.0);
}

#[tokio::test]
async fn hotel_results_come_back_cheapest_first_with_unpriced_last() {
    let harness = harness(
        vec![
            tool_request(
                "c1",
                "search_hotels",
                json!({
                    "city": "Dubai",
                    "arrival_date": "2025-03-01",
                    "departure_date": "2025-03-05",
                    "adults": 2,
                    "children": 0
                }),
            ),
            reply("Here are the best-priced options."),
        ],
        Arc::new(StaticCatalog { packages: Vec::new() }),
        Arc::new(ScriptedGateway {
            offers: vec![
                offer("Marina View", Some(300.0)),
                offer("Old Town Suites", None),
                offer("Desert Rose", Some(150.0)),
            ],
        }),
        Arc::new(MemoryBookingStore::default()),
    );
    let mut history = Vec::new();

    harness
        .engine
        .advance(&ctx(), &mut history, "hotels in Dubai")
        .await
        .unwrap();

    let payload: Value = serde_json::from_str(&tool_message(&history).content).unwrap();
    assert_eq!(payload["status"], "ok");
    let hotels = payload["hotels"].as_array().unwrap();
    let names: Vec<&str> = hotels.iter().map(|h| h["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["Desert Rose", "Marina View", "Old Town Suites"]);
    assert!(hotels[2]["price"]["current"].is_null());
}

#[tokio::test]
async fn booking_with_missing_start_date_is_rejected_before_persistence() {
    let bookings = Arc::new(MemoryBookingStore::default());
    let harness = harness(
        vec![
            tool_request(
                "c1",
                "record_booking",
                json!({
                    "package_name": "Bali Bliss",
                    "package_id": "7",
                    "origin_city": "Mumbai",
                    "tot_adults": 2,
                    "tot_cost": "2400 USD"
                }),
            ),
            reply("I still need the trip start date before I can confirm."),
        ],
        Arc::new(StaticCatalog { packages: Vec::new() }),
        Arc::new(ScriptedGateway { offers: Vec::new() }),
        bookings.clone(),
    );
    let mut history = Vec::new();

    harness
        .engine
        .advance(&ctx(), &mut history, "book it")
        .await
        .unwrap();

    assert!(bookings.commits.lock().unwrap().is_empty());
    let tool_msg = tool_message(&history);
    assert!(tool_msg.content.contains("Invalid arguments"));
    assert!(tool_msg.content.contains("trip_start_date"));
}

#[tokio::test]
async fn hotel_outage_degrades_to_an_unavailable_tool_result() {
    let gateway = Arc::new(OutageGateway {
        calls: AtomicUsize::new(0),
    });
    let harness = harness(
        vec![
            tool_request(
                "c1",
                "search_hotels",
                json!({
                    "city": "Dubai",
                    "arrival_date": "2025-03-01",
                    "departure_date": "2025-03-05",
                    "adults": 2
                }),
            ),
            reply("I could not find hotels right now; shall we try later?"),
        ],
        Arc::new(StaticCatalog { packages: Vec::new() }),
        gateway.clone(),
        Arc::new(MemoryBookingStore::default()),
    );
    let mut history = Vec::new();

    let answer = harness
        .engine
        .advance(&ctx(), &mut history, "hotels in Dubai")
        .await
        .unwrap();

    assert!(answer.contains("try later"));
    assert_eq!(gateway.calls.load(Ordering::SeqCst), 1);

    // The follow-up model invocation saw the unavailability as data.
    let seen = harness.model.seen();
    assert_eq!(seen.len(), 2);
    let second = &seen[1];
    let tool_msg = second.iter().find(|m| m.role == Role::Tool).unwrap();
    let payload: Value = serde_json::from_str(&tool_msg.content).unwrap();
    assert_eq!(payload["status"], "unavailable");
    assert!(payload["hotels"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn committed_booking_carries_identity_from_the_session() {
    let bookings = Arc::new(MemoryBookingStore::default());
    let harness = harness(
        vec![
            tool_request(
                "c1",
                "record_booking",
                json!({
                    "package_name": "Bali Bliss",
                    "package_id": "7",
                    "trip_start_date": "2025-03-01",
                    "origin_city": "Mumbai",
                    "tot_adults": 2,
                    "tot_children": 1,
                    "tot_cost": "3600 USD",
                    "hotel_bookings": {
                        "Ubud": {
                            "name": "Ubud Garden Stay",
                            "check_in": "2025-03-01",
                            "check_out": "2025-03-03",
                            "price": 120.0
                        }
                    }
                }),
            ),
            reply("Your booking is confirmed! A confirmation email is on its way."),
        ],
        Arc::new(StaticCatalog { packages: Vec::new() }),
        Arc::new(ScriptedGateway { offers: Vec::new() }),
        bookings.clone(),
    );
    let mut history = Vec::new();

    harness
        .engine
        .advance(&ctx(), &mut history, "yes, confirm the booking")
        .await
        .unwrap();

    let commits = bookings.commits.lock().unwrap();
    assert_eq!(commits.len(), 1);
    let (record, identity) = &commits[0];
    assert_eq!(record.package_name, "Bali Bliss");
    assert_eq!(record.tot_adults, 2);
    assert_eq!(record.tot_children, 1);
    assert_eq!(
        record.hotel_bookings.as_ref().unwrap()["Ubud"].name,
        "Ubud Garden Stay"
    );
    // Identity came from the session context, not from the arguments.
    assert_eq!(identity.name.as_deref(), Some("Asha Rao"));
    assert_eq!(identity.email.as_deref(), Some("asha@example.com"));

    let payload: Value = serde_json::from_str(&tool_message(&history).content).unwrap();
    assert_eq!(payload["status"], "recorded");
    assert!(payload["booking_id"].is_string());
}

#[tokio::test]
async fn persistence_failure_is_reported_truthfully() {
    let model = ScriptedModel::new(vec![
        tool_request(
            "c1",
            "record_booking",
            json!({
                "package_name": "Bali Bliss",
                "package_id": "7",
                "trip_start_date": "2025-03-01",
                "origin_city": "Mumbai",
                "tot_adults": 2,
                "tot_cost": "2400 USD"
            }),
        ),
        reply("I am sorry - saving the booking failed. Let me try again in a moment."),
    ]);
    let registry = travel_tool_registry(
        Arc::new(StaticCatalog { packages: Vec::new() }),
        Arc::new(ScriptedGateway { offers: Vec::new() }),
        Arc::new(FailingBookingStore),
    )
    .unwrap();
    let engine = DialogueEngine::new(model, registry, EngineConfig::default());
    let mut history = Vec::new();

    engine
        .advance(&ctx(), &mut history, "confirm")
        .await
        .unwrap();

    let tool_msg = tool_message(&history);
    assert!(tool_msg.content.contains("could not be saved"));
}

#[tokio::test]
async fn unreachable_catalog_is_distinct_from_no_matches() {
    let harness = harness(
        vec![
            tool_request("c1", "search_packages", json!({"location": "Bali"})),
            reply("The catalog is unreachable right now."),
        ],
        Arc::new(DownCatalog),
        Arc::new(ScriptedGateway { offers: Vec::new() }),
        Arc::new(MemoryBookingStore::default()),
    );
    let mut history = Vec::new();

    harness
        .engine
        .advance(&ctx(), &mut history, "packages for Bali?")
        .await
        .unwrap();

    let tool_msg = tool_message(&history);
    assert!(tool_msg.content.contains("unreachable"));
    assert!(!tool_msg.content.contains("\"packages\""));
}
