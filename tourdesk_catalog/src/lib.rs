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

//! Read-only lookup over the tour-package dataset.
//!
//! All filters are conjunctive; absent filters are no-ops. Location is
//! a case-insensitive substring match, duration and destination type
//! are exact, price is an inclusive upper bound. A store failure is an
//! `Err`, distinct from an empty match list.

use async_trait::async_trait;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{ColumnTrait, Condition, DatabaseConnection, EntityTrait, ExprTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use tracing::info;

use tourdesk_entities::tour_packages;

/// A tour package as presented to the dialogue policy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TourPackage {
    pub id: i32,
    pub location: String,
    pub trip_id: Option<String>,
    pub package_name: String,
    pub url: Option<String>,
    pub duration: i32,
    pub tour_type: Option<String>,
    pub cities_included: Vec<String>,
    pub price: f64,
    pub itinerary_data: Option<String>,
    pub destination_type: Option<String>,
    pub hotel: Option<String>,
}

impl From<tour_packages::Model> for TourPackage {
    fn from(model: tour_packages::Model) -> Self {
        let cities_included = model
            .cities_included
            .as_deref()
            .map(split_cities)
            .unwrap_or_default();
        Self {
            id: model.id,
            location: model.location,
            trip_id: model.trip_id,
            package_name: model.package_name,
            url: model.url,
            duration: model.duration,
            tour_type: model.tour_type,
            cities_included,
            price: model.price,
            itinerary_data: model.itinerary_data,
            destination_type: model.destination_type,
            hotel: model.hotel,
        }
    }
}

/// Pipe-delimited city list as stored in the backing table.
fn split_cities(raw: &str) -> Vec<String> {
    raw.split('|')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Conjunctive search filters; `None` fields do not constrain.
#[derive(Debug, Clone, Default)]
pub struct PackageFilter {
    pub location: Option<String>,
    pub duration: Option<i32>,
    pub max_price: Option<f64>,
    pub destination_type: Option<String>,
}

#[async_trait]
pub trait PackageCatalog: Send + Sync {
    async fn search(&self, filter: &PackageFilter) -> anyhow::Result<Vec<TourPackage>>;
}

/// Catalog backed by the `tour_packages` table.
pub struct DbPackageCatalog {
    db: DatabaseConnection,
}

impl DbPackageCatalog {
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn condition(filter: &PackageFilter) -> Condition {
        let mut cond = Condition::all();
        if let Some(location) = &filter.location {
            let needle = format!("%{}%", location.to_lowercase());
            cond = cond.add(
                Expr::expr(Func::lower(Expr::col(tour_packages::Column::Location))).like(needle),
            );
        }
        if let Some(duration) = filter.duration {
            cond = cond.add(tour_packages::Column::Duration.eq(duration));
        }
        if let Some(max_price) = filter.max_price {
            cond = cond.add(tour_packages::Column::Price.lte(max_price));
        }
        if let Some(destination_type) = &filter.destination_type {
            cond = cond.add(tour_packages::Column::DestinationType.eq(destination_type.clone()));
        }
        cond
    }
}

#[async_trait]
impl PackageCatalog for DbPackageCatalog {
    async fn search(&self, filter: &PackageFilter) -> anyhow::Result<Vec<TourPackage>> {
        let models = tour_packages::Entity::find()
            .filter(Self::condition(filter))
            .all(&self.db)
            .await?;
        info!("Package search matched {} package(s)", models.len());
        Ok(models.into_iter().map(TourPackage::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_cities_handles_pipes_and_blanks() {
        assert_eq!(split_cities("Ubud|Kuta|Seminyak"), vec!["Ubud", "Kuta", "Seminyak"]);
        assert_eq!(split_cities("Dubai"), vec!["Dubai"]);
        assert!(split_cities("").is_empty());
        assert_eq!(split_cities("Ubud||Kuta"), vec!["Ubud", "Kuta"]);
    }
}
