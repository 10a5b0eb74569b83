//! Append-only booking records.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "bookings")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub cust_id: i32,
    /// Generated booking identifier (UUID)
    pub booking_id: String,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub customer_mobile: Option<String>,
    pub package_name: String,
    pub package_id: String,
    pub trip_start_date: String,
    pub origin_city: String,
    pub tot_adults: i32,
    pub tot_children: i32,
    /// Total cost as computed by the dialogue policy, stored verbatim
    pub tot_cost: String,
    /// Serialized per-city hotel-booking map, if hotels were booked
    pub hotel_bookings: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
