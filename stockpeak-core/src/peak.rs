//! The aggregator: pick the record with the highest `high`.

use thiserror::Error;

use crate::domain::{Aggregate, StockRecord};

/// The maximum of an empty sequence is undefined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot aggregate an empty record sequence: maximum high is undefined")]
pub struct EmptyInputError;

/// Single linear scan for the maximum `high`.
///
/// The tracked maximum moves only on a strictly greater value, so among
/// equal highs the first record in `records` wins.
pub fn aggregate(records: &[StockRecord]) -> Result<Aggregate, EmptyInputError> {
    let (first, rest) = records.split_first().ok_or(EmptyInputError)?;

    let mut best = first;
    for record in rest {
        if record.high() > best.high() {
            best = record;
        }
    }

    Ok(Aggregate::from_record(best))
}
