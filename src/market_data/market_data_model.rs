use chrono::{Duration, NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

/// One daily price observation as returned by a market data provider.
/// Providers may emit garbage for individual days; `is_valid` is the
/// single place that decides what is persistable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, price: f64) -> Self {
        Self { date, price }
    }

    /// Only finite, strictly positive prices are ever persisted.
    pub fn is_valid(&self) -> bool {
        self.price.is_finite() && self.price > 0.0
    }
}

/// Enumerated lookback window for a historical backfill request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LookbackRange {
    OneMonth,
    ThreeMonths,
    SixMonths,
    OneYear,
    All,
}

impl LookbackRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            LookbackRange::OneMonth => "1M",
            LookbackRange::ThreeMonths => "3M",
            LookbackRange::SixMonths => "6M",
            LookbackRange::OneYear => "1Y",
            LookbackRange::All => "ALL",
        }
    }

    /// Number of calendar days covered, `None` for the unbounded window.
    pub fn days(&self) -> Option<i64> {
        match self {
            LookbackRange::OneMonth => Some(30),
            LookbackRange::ThreeMonths => Some(90),
            LookbackRange::SixMonths => Some(180),
            LookbackRange::OneYear => Some(365),
            LookbackRange::All => None,
        }
    }

    pub fn start_date(&self, today: NaiveDate) -> Option<NaiveDate> {
        self.days().map(|d| today - Duration::days(d))
    }
}

impl From<&str> for LookbackRange {
    fn from(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "1M" => LookbackRange::OneMonth,
            "3M" => LookbackRange::ThreeMonths,
            "6M" => LookbackRange::SixMonths,
            "1Y" => LookbackRange::OneYear,
            _ => LookbackRange::All,
        }
    }
}

/// One persisted historical price observation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceHistoryPoint {
    pub id: String,
    pub asset_id: String,
    pub date: NaiveDate,
    pub price: f64,
    pub created_at: NaiveDateTime,
}

/// Database model for price history rows
#[derive(Queryable, Identifiable, Insertable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::price_history)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PriceHistoryPointDB {
    pub id: String,
    pub asset_id: String,
    pub date: NaiveDate,
    pub price: f64,
    pub created_at: NaiveDateTime,
}

impl From<PriceHistoryPointDB> for PriceHistoryPoint {
    fn from(db: PriceHistoryPointDB) -> Self {
        PriceHistoryPoint {
            id: db.id,
            asset_id: db.asset_id,
            date: db.date,
            price: db.price,
            created_at: db.created_at,
        }
    }
}
