//! stockpeak core: domain types, raw-record parsing, and the aggregator.
//!
//! This crate holds everything in the pipeline that does not touch a store:
//! - `StockRecord` parsing from raw field lists
//! - headerless CSV decoding of object bodies
//! - the peak-high aggregator (`aggregate`) and its `Aggregate` output
//! - dataset fingerprinting for run provenance

pub mod data;
pub mod domain;
pub mod fingerprint;
pub mod peak;

pub use data::{decode_records, DecodeError};
pub use domain::{Aggregate, ParseError, RawRecord, StockRecord};
pub use fingerprint::dataset_hash;
pub use peak::{aggregate, EmptyInputError};
