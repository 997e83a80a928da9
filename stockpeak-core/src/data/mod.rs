//! Object body decoding

pub mod body;

pub use body::{decode_records, DecodeError};
