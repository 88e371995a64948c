//! Public data API types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Daily market summary for a coin, as returned by
/// `/api/{coin}/day-summary/{year}/{month}/{day}/`.
///
/// Unlike the trade API, the public endpoint sends plain JSON numbers, so
/// the numeric fields are `f64`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySummary {
    /// Summary date
    pub date: NaiveDate,
    /// Opening price
    pub opening: f64,
    /// Closing price
    pub closing: f64,
    /// Lowest trade price
    pub lowest: f64,
    /// Highest trade price
    pub highest: f64,
    /// Traded volume in the quote currency
    pub volume: f64,
    /// Traded quantity in the base currency
    pub quantity: f64,
    /// Number of trades
    pub amount: u64,
    /// Volume-weighted average price
    pub avg_price: f64,
}
