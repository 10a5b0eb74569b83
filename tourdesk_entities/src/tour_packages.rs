//! Read-only reference data owned by the package catalog.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tour_packages")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub location: String,
    pub trip_id: Option<String>,
    pub package_name: String,
    pub url: Option<String>,
    pub duration: i32,
    pub tour_type: Option<String>,
    /// Pipe-delimited list of cities covered by the itinerary
    pub cities_included: Option<String>,
    pub price: f64,
    pub created_at: Option<String>,
    pub itinerary_data: Option<String>,
    pub destination_type: Option<String>,
    /// Hotel inclusion flag as free text ("Included" / "Not Included")
    pub hotel: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
