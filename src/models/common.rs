use std::iter::Sum;
use std::ops::{Add, AddAssign};

use chrono::prelude::*;
use serde_json::Value;

/// Offset of the farm's local calendar (Asia/Tokyo, no DST).
pub const LOCAL_OFFSET_SECS: i32 = 9 * 3600;

/// Largest weight or manual amount accepted from a form.
pub const MAX_KG: f64 = 100_000.0;
pub const MAX_COUNT: u32 = 100_000;
pub const MAX_AMOUNT: i64 = 1_000_000_000;

#[derive(Clone, Copy, Debug, Default, Display, From, Into, PartialEq, PartialOrd, Add, AddAssign, Serialize, Deserialize)]
pub struct Kg(pub f64);

// Empty sums are +0.0
impl Sum for Kg {
    fn sum<I: Iterator<Item = Kg>>(iter: I) -> Self {
        iter.fold(Kg(0.0), |acc, v| acc + v)
    }
}

/// Arithmetic saturates at the `i64` bounds.
#[derive(Clone, Copy, Debug, Default, Display, From, Into, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Yen(pub i64);

impl Add for Yen {
    type Output = Yen;

    fn add(self, other: Yen) -> Yen {
        Yen(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Yen {
    fn add_assign(&mut self, other: Yen) {
        *self = *self + other;
    }
}

impl Sum for Yen {
    fn sum<I: Iterator<Item = Yen>>(iter: I) -> Self {
        iter.fold(Yen(0), |acc, v| acc + v)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SetterPayload<T> {
    pub value: T,
}

pub fn local_offset() -> FixedOffset {
    FixedOffset::east_opt(LOCAL_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}

/// Midnight of the given local calendar day.
pub fn local_midnight(date: NaiveDate) -> Option<DateTime<Utc>> {
    date.and_hms_opt(0, 0, 0)
        .and_then(|naive| local_offset().from_local_datetime(&naive).single())
        .map(|dt| dt.with_timezone(&Utc))
}

/// Reads a document field as a number. Numeric strings are parsed;
/// missing, non-finite, negative or non-numeric values read as zero.
pub fn coerce_number(value: Option<&Value>) -> f64 {
    let v = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match v {
        Some(v) if v.is_finite() && v > 0.0 => v,
        _ => 0.0,
    }
}

/// Bags are whole: fractional counts in old documents are truncated.
pub fn coerce_count(value: Option<&Value>) -> u32 {
    let v = coerce_number(value).floor();
    if v >= f64::from(u32::max_value()) {
        u32::max_value()
    } else {
        v as u32
    }
}

/// Like `coerce_number`, but tells a missing amount apart from zero.
pub fn coerce_amount(value: Option<&Value>) -> Option<Yen> {
    let v = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;

    if v.is_finite() {
        Some(Yen(v.round() as i64))
    } else {
        None
    }
}

/// Non-blank text, numbers rendered as text.
pub fn coerce_text(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

/// Accepts RFC 3339 strings, `YYYY-MM-DD` local dates, `{seconds, nanoseconds}`
/// timestamp objects and epoch milliseconds.
pub fn coerce_timestamp(value: Option<&Value>) -> Option<DateTime<Utc>> {
    match value? {
        Value::String(s) => {
            let s = s.trim();
            DateTime::parse_from_rfc3339(s)
                .map(|dt| dt.with_timezone(&Utc))
                .ok()
                .or_else(|| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok().and_then(local_midnight))
                .or_else(|| NaiveDate::parse_from_str(s, "%Y/%m/%d").ok().and_then(local_midnight))
        }
        Value::Number(n) => n.as_i64().and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
        Value::Object(map) => {
            let seconds = map.get("seconds").or_else(|| map.get("_seconds"))?.as_i64()?;
            let nanos = map
                .get("nanoseconds")
                .or_else(|| map.get("_nanoseconds"))
                .and_then(Value::as_u64)
                .unwrap_or(0);
            Utc.timestamp_opt(seconds, nanos as u32).single()
        }
        _ => None,
    }
}
