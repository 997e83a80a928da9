//! Domain types for stockpeak

pub mod aggregate;
pub mod stock;

pub use aggregate::Aggregate;
pub use stock::{ParseError, RawRecord, StockRecord, FIELDS};
