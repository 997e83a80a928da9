//! Aggregate: the pipeline's single output value.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::stock::StockRecord;

/// Date and price of the highest `high` observed in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aggregate {
    date: NaiveDate,
    high: Decimal,
}

impl Aggregate {
    pub fn new(date: NaiveDate, high: Decimal) -> Self {
        Self { date, high }
    }

    pub fn from_record(record: &StockRecord) -> Self {
        Self::new(record.date(), record.high())
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn high(&self) -> Decimal {
        self.high
    }

    /// Store key: the date as `YYYY-MM-DD`.
    pub fn key(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }

    /// Store value: the high, normalized.
    ///
    /// Trailing fractional zeros are dropped, so `15.00` and `15` both
    /// publish as `"15"`. Never uses exponent notation.
    pub fn value(&self) -> String {
        self.high.normalize().to_string()
    }
}
