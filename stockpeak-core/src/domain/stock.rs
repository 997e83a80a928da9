//! StockRecord: one trading-day observation.
//!
//! Records are built from a raw ordered field list
//! `[date, open, high, low, close, volume]`. Prices are kept as
//! `Decimal` so the text read from the source survives parsing exactly.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unparsed ordered field list as read from the object store.
pub type RawRecord = Vec<String>;

/// Field names in raw-record order.
pub const FIELDS: [&str; 6] = ["date", "open", "high", "low", "close", "volume"];

/// Accepted date layouts. Upstream stock files use the slash form.
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

/// Why a raw record could not become a `StockRecord`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("missing field '{field}' (expected {expected} fields, got {got})")]
    MissingField {
        field: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("invalid date '{value}' (expected YYYY-MM-DD or YYYY/MM/DD)")]
    InvalidDate { value: String },

    #[error("invalid decimal '{value}' in field '{field}'")]
    InvalidDecimal { field: &'static str, value: String },

    #[error("invalid volume '{value}' (expected a non-negative integer)")]
    InvalidVolume { value: String },
}

/// OHLCV observation for a single trading day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockRecord {
    date: NaiveDate,
    open: Decimal,
    high: Decimal,
    low: Decimal,
    close: Decimal,
    volume: u64,
}

impl StockRecord {
    pub fn new(
        date: NaiveDate,
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
        volume: u64,
    ) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Parse one raw field list.
    ///
    /// Surrounding whitespace is ignored. Fields past the sixth are ignored;
    /// a short list fails on the first absent field.
    pub fn from_fields<S: AsRef<str>>(fields: &[S]) -> Result<Self, ParseError> {
        if fields.len() < FIELDS.len() {
            return Err(ParseError::MissingField {
                field: FIELDS[fields.len()],
                expected: FIELDS.len(),
                got: fields.len(),
            });
        }

        Ok(Self {
            date: parse_date(fields[0].as_ref())?,
            open: parse_decimal(FIELDS[1], fields[1].as_ref())?,
            high: parse_decimal(FIELDS[2], fields[2].as_ref())?,
            low: parse_decimal(FIELDS[3], fields[3].as_ref())?,
            close: parse_decimal(FIELDS[4], fields[4].as_ref())?,
            volume: parse_volume(fields[5].as_ref())?,
        })
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn open(&self) -> Decimal {
        self.open
    }

    pub fn high(&self) -> Decimal {
        self.high
    }

    pub fn low(&self) -> Decimal {
        self.low
    }

    pub fn close(&self) -> Decimal {
        self.close
    }

    pub fn volume(&self) -> u64 {
        self.volume
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, ParseError> {
    let text = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .ok_or_else(|| ParseError::InvalidDate {
            value: raw.to_string(),
        })
}

/// Largest exponent magnitude worth expanding; `Decimal` holds at most
/// 28 fractional digits and 29 integer digits.
const MAX_EXPONENT: i64 = 64;

/// Parse a price exactly. Text that `Decimal` could only hold by rounding
/// is rejected, as is anything outside `[+-]digits[.digits][(e|E)[+-]digits]`.
fn parse_decimal(field: &'static str, raw: &str) -> Result<Decimal, ParseError> {
    let invalid = || ParseError::InvalidDecimal {
        field,
        value: raw.to_string(),
    };

    let literal = DecimalLiteral::split(raw.trim()).ok_or_else(invalid)?;
    let plain = literal.to_plain().ok_or_else(invalid)?;
    Decimal::from_str_exact(&plain).map_err(|_| invalid())
}

/// The pieces of a strictly formed decimal literal.
struct DecimalLiteral<'a> {
    negative: bool,
    int: &'a str,
    frac: &'a str,
    exponent: i64,
}

impl<'a> DecimalLiteral<'a> {
    fn split(text: &'a str) -> Option<Self> {
        let (mantissa, exponent) = match text.find(['e', 'E']) {
            Some(at) => (&text[..at], Some(&text[at + 1..])),
            None => (text, None),
        };

        let (negative, unsigned) = strip_sign(mantissa);
        let (int, frac) = match unsigned.split_once('.') {
            Some((int, frac)) => (int, frac),
            None => (unsigned, ""),
        };
        if !is_digits(int) || (unsigned.contains('.') && !is_digits(frac)) {
            return None;
        }

        let exponent = match exponent {
            Some(exp) => {
                let (exp_negative, digits) = strip_sign(exp);
                if !is_digits(digits) {
                    return None;
                }
                let magnitude: i64 = digits.parse().ok()?;
                if exp_negative {
                    -magnitude
                } else {
                    magnitude
                }
            }
            None => 0,
        };

        Some(Self {
            negative,
            int,
            frac,
            exponent,
        })
    }

    /// Rewrite without an exponent by moving the decimal point.
    fn to_plain(&self) -> Option<String> {
        if self.exponent == 0 {
            let sign = if self.negative { "-" } else { "" };
            return Some(if self.frac.is_empty() {
                format!("{sign}{}", self.int)
            } else {
                format!("{sign}{}.{}", self.int, self.frac)
            });
        }
        if self.exponent.abs() > MAX_EXPONENT {
            return None;
        }

        let digits = format!("{}{}", self.int, self.frac);
        let point = self.int.len() as i64 + self.exponent;
        let body = if point <= 0 {
            format!("0.{}{digits}", "0".repeat(point.unsigned_abs() as usize))
        } else if point as usize >= digits.len() {
            format!("{digits}{}", "0".repeat(point as usize - digits.len()))
        } else {
            let (int, frac) = digits.split_at(point as usize);
            format!("{int}.{frac}")
        };
        Some(if self.negative { format!("-{body}") } else { body })
    }
}

fn strip_sign(text: &str) -> (bool, &str) {
    match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    }
}

fn is_digits(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())
}

fn parse_volume(raw: &str) -> Result<u64, ParseError> {
    raw.trim()
        .parse::<u64>()
        .map_err(|_| ParseError::InvalidVolume {
            value: raw.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn parses_ordered_fields() {
        let rec = StockRecord::from_fields(&["2020-01-02", "10.5", "15", "9.75", "14.25", "1200"])
            .unwrap();
        assert_eq!(rec.date(), NaiveDate::from_ymd_opt(2020, 1, 2).unwrap());
        assert_eq!(rec.open(), dec("10.5"));
        assert_eq!(rec.high(), dec("15"));
        assert_eq!(rec.low(), dec("9.75"));
        assert_eq!(rec.close(), dec("14.25"));
        assert_eq!(rec.volume(), 1200);
    }

    #[test]
    fn accepts_slash_dates_and_padding() {
        let rec =
            StockRecord::from_fields(&["2018/10/15 ", " 1", "2", "0.5", "1.5", " 42 "]).unwrap();
        assert_eq!(rec.date(), NaiveDate::from_ymd_opt(2018, 10, 15).unwrap());
        assert_eq!(rec.volume(), 42);
    }

    #[test]
    fn keeps_decimal_scale() {
        let rec =
            StockRecord::from_fields(&["2020-01-02", "1.10", "15.100", "1", "1", "1"]).unwrap();
        assert_eq!(rec.high().to_string(), "15.100");
        assert_eq!(rec.open().to_string(), "1.10");
    }

    #[test]
    fn accepts_scientific_prices() {
        let rec = StockRecord::from_fields(&["2020-01-02", "1.5e2", "2E2", "1", "1", "1"]).unwrap();
        assert_eq!(rec.open(), dec("150"));
        assert_eq!(rec.high(), dec("200"));
    }

    #[test]
    fn ignores_trailing_fields() {
        let rec =
            StockRecord::from_fields(&["2020-01-02", "1", "2", "0.5", "1.5", "10", "extra"]).unwrap();
        assert_eq!(rec.volume(), 10);
    }

    #[test]
    fn missing_volume_is_reported() {
        let err = StockRecord::from_fields(&["2020-01-02", "1", "2", "0.5", "1.5"]).unwrap_err();
        assert_eq!(
            err,
            ParseError::MissingField {
                field: "volume",
                expected: 6,
                got: 5
            }
        );
    }

    #[test]
    fn empty_list_reports_date_missing() {
        let fields: [&str; 0] = [];
        let err = StockRecord::from_fields(&fields).unwrap_err();
        assert!(matches!(err, ParseError::MissingField { field: "date", .. }));
    }

    #[test]
    fn rejects_bad_date() {
        let err = StockRecord::from_fields(&["02-01-2020", "1", "2", "0.5", "1.5", "1"]).unwrap_err();
        assert!(matches!(err, ParseError::InvalidDate { .. }));
    }

    #[test]
    fn rejects_bad_price() {
        let err = StockRecord::from_fields(&["2020-01-02", "1", "abc", "0.5", "1.5", "1"]).unwrap_err();
        assert_eq!(
            err,
            ParseError::InvalidDecimal {
                field: "high",
                value: "abc".into()
            }
        );
    }

    #[test]
    fn rejects_malformed_price_text() {
        for bad in ["1_000", "1_0.5_0", "1.", ".5", "1.5.0", "1e", "1e+", "+-1", "1e2.5", "0x10"] {
            let err =
                StockRecord::from_fields(&["2020-01-02", "1", bad, "0.5", "1.5", "1"]).unwrap_err();
            assert_eq!(
                err,
                ParseError::InvalidDecimal {
                    field: "high",
                    value: bad.into()
                },
                "{bad}"
            );
        }
    }

    #[test]
    fn rejects_prices_that_would_round() {
        for long in [
            "0.12345678901234567890123456789",
            "123456789012345678901234567.891",
            "1.2345678901234567890123456789012e3",
        ] {
            let err = StockRecord::from_fields(&["2020-01-02", "1", long, "0", "1", "1"]).unwrap_err();
            assert!(
                matches!(err, ParseError::InvalidDecimal { field: "high", .. }),
                "{long}"
            );
        }
    }

    #[test]
    fn keeps_full_precision_up_to_the_limit() {
        let rec = StockRecord::from_fields(&[
            "2020-01-02",
            "1",
            "0.1234567890123456789012345678",
            "0",
            "1",
            "1",
        ])
        .unwrap();
        assert_eq!(rec.high().to_string(), "0.1234567890123456789012345678");
    }

    #[test]
    fn scientific_prices_move_the_point_exactly() {
        let rec = StockRecord::from_fields(&["2020-01-02", "-2.5e-3", "1.50e1", "12e-1", "+7E+0", "1"])
            .unwrap();
        assert_eq!(rec.open().to_string(), "-0.0025");
        assert_eq!(rec.high().to_string(), "15.0");
        assert_eq!(rec.low().to_string(), "1.2");
        assert_eq!(rec.close(), dec("7"));
    }

    #[test]
    fn rejects_empty_price() {
        let err = StockRecord::from_fields(&["2020-01-02", "", "2", "0.5", "1.5", "1"]).unwrap_err();
        assert!(matches!(err, ParseError::InvalidDecimal { field: "open", .. }));
    }

    #[test]
    fn rejects_fractional_and_negative_volume() {
        for bad in ["1.5", "-3", "lots"] {
            let err =
                StockRecord::from_fields(&["2020-01-02", "1", "2", "0.5", "1.5", bad]).unwrap_err();
            assert!(matches!(err, ParseError::InvalidVolume { .. }), "{bad}");
        }
    }

    #[test]
    fn serialization_roundtrip() {
        let rec =
            StockRecord::from_fields(&["2020-01-02", "10.50", "15", "9", "14", "100"]).unwrap();
        let json = serde_json::to_string(&rec).unwrap();
        let back: StockRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(rec, back);
    }
}
