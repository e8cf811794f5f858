//! Date-time and time-of-day types
//!
//! Both parse ISO-8601 text into their native value and render it back in a
//! single canonical form. Primitive conversion of a string goes through the
//! same parse, so `to_primitive` is idempotent.

use std::sync::Arc;

use chrono::{FixedOffset, NaiveDate, NaiveTime};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use typerighter_core::types::string_is_falsy;
use typerighter_core::{
    format_time, Configurable, Definition, DefinitionBuilder, Direction, Error, FieldPath, Native,
    PrimitiveType, Result, Settings, Timestamp, Type, TypeBuilder, TypeCore, Value,
};

static ISO8601: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(concat!(
        r"^(?P<year>\d{4})-(?P<month>\d\d)-(?P<day>\d\d)(?:T| )",
        r"(?P<hour>\d\d):(?P<minute>\d\d)",
        r"(?::(?P<second>\d\d)(?:[.,](?P<frac>\d{1,6}))?)?",
        r"(?:(?P<sign>[+\x{2212}-])(?P<tz_hour>\d\d):?(?P<tz_minute>\d\d)?|(?P<utc>Z))?$",
    ))
    .ok()
});

static TIME: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(concat!(
        r"^(?P<hour>\d\d):(?P<minute>\d\d)",
        r"(?::(?P<second>\d\d)(?:[.,](?P<frac>\d{1,6}))?)?$",
    ))
    .ok()
});

static DATETIME: Lazy<Arc<Definition>> = Lazy::new(|| {
    DefinitionBuilder::new("DateTimeType")
        .extends(PrimitiveType::base_definition())
        .native(Native::DateTime)
        .build()
});

static TIME_OF_DAY: Lazy<Arc<Definition>> = Lazy::new(|| {
    DefinitionBuilder::new("TimeType")
        .extends(PrimitiveType::base_definition())
        .native(Native::Time)
        .build()
});

fn compiled(pattern: &'static Lazy<Option<Regex>>) -> Result<&'static Regex> {
    Lazy::force(pattern)
        .as_ref()
        .ok_or_else(|| Error::config("Regex failed to compile"))
}

fn number(caps: &Captures<'_>, name: &str) -> u32 {
    caps.name(name)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

fn microseconds(caps: &Captures<'_>) -> u32 {
    caps.name("frac").map_or(0, |m| {
        let digits = m.as_str();
        let scale = 10u32.pow(6 - u32::try_from(digits.len()).unwrap_or(6));
        digits.parse::<u32>().unwrap_or(0) * scale
    })
}

fn time_of(caps: &Captures<'_>, text: &str) -> Result<NaiveTime> {
    NaiveTime::from_hms_micro_opt(
        number(caps, "hour"),
        number(caps, "minute"),
        number(caps, "second"),
        microseconds(caps),
    )
    .ok_or_else(|| Error::conversion(format!("Time out of range: {text}")))
}

/// Parse ISO-8601 date-time text
///
/// `Z` and a zero offset both yield a `+00:00` offset; no designator yields
/// a naive timestamp.
///
/// # Errors
/// Returns [`Error::Conversion`] when the text does not match or names an
/// impossible date, time or offset
pub fn parse_datetime(text: &str) -> Result<Timestamp> {
    let caps = compiled(&ISO8601)?
        .captures(text)
        .ok_or_else(|| Error::conversion(format!("Value did not match date pattern: {text}")))?;

    let year = caps
        .name("year")
        .and_then(|m| m.as_str().parse::<i32>().ok())
        .unwrap_or(0);
    let date = NaiveDate::from_ymd_opt(year, number(&caps, "month"), number(&caps, "day"))
        .ok_or_else(|| Error::conversion(format!("Date out of range: {text}")))?;
    let local = date.and_time(time_of(&caps, text)?);

    let offset_seconds = if caps.name("utc").is_some() {
        Some(0)
    } else if let Some(sign) = caps.name("sign") {
        let minutes = number(&caps, "tz_hour") * 60 + number(&caps, "tz_minute");
        let seconds = i32::try_from(minutes * 60).unwrap_or(i32::MAX);
        Some(if sign.as_str() == "+" { seconds } else { -seconds })
    } else {
        None
    };

    match offset_seconds {
        None => Ok(Timestamp::naive(local)),
        Some(seconds) => FixedOffset::east_opt(seconds)
            .map(|offset| Timestamp::with_offset(local, offset))
            .ok_or_else(|| Error::conversion(format!("UTC offset out of range: {text}"))),
    }
}

/// Parse `hh:mm[:ss[.ffffff]]`
///
/// # Errors
/// Returns [`Error::Conversion`] when the text does not match or is out of
/// range
pub fn parse_time(text: &str) -> Result<NaiveTime> {
    let caps = compiled(&TIME)?
        .captures(text)
        .ok_or_else(|| Error::conversion(format!("Value did not match time pattern: {text}")))?;
    time_of(&caps, text)
}

/// ISO-8601 date-time, naive or with a fixed offset
#[derive(Debug, Clone)]
pub struct DateTimeType {
    core: TypeCore,
}

impl DateTimeType {
    /// Start a builder
    #[must_use]
    pub fn builder() -> TypeBuilder<Self> {
        TypeBuilder::new()
    }
}

impl Configurable for DateTimeType {
    type Params = ();

    fn base_definition() -> &'static Arc<Definition> {
        &DATETIME
    }

    fn construct(definition: Arc<Definition>, settings: &Settings, (): ()) -> Result<Self> {
        Ok(Self {
            core: TypeCore::new(definition, settings)?,
        })
    }
}

impl Type for DateTimeType {
    fn core(&self) -> &TypeCore {
        &self.core
    }

    fn is_falsy(&self, value: &Value) -> bool {
        string_is_falsy(value)
    }

    fn convert(&self, value: &Value, direction: Direction, _: Option<&[FieldPath]>) -> Result<Value> {
        if self.is_falsy(value) {
            return Ok(value.clone());
        }
        let timestamp = match value {
            Value::DateTime(ts) => *ts,
            Value::Str(text) => parse_datetime(text)?,
            other => {
                return Err(Error::conversion(format!(
                    "Value must be iso8601 string or datetime: {other}"
                )))
            }
        };
        Ok(match direction {
            Direction::Native => Value::DateTime(timestamp),
            Direction::Primitive => Value::Str(timestamp.to_iso8601()),
        })
    }
}

/// ISO-8601 time of day
#[derive(Debug, Clone)]
pub struct TimeType {
    core: TypeCore,
}

impl TimeType {
    /// Start a builder
    #[must_use]
    pub fn builder() -> TypeBuilder<Self> {
        TypeBuilder::new()
    }
}

impl Configurable for TimeType {
    type Params = ();

    fn base_definition() -> &'static Arc<Definition> {
        &TIME_OF_DAY
    }

    fn construct(definition: Arc<Definition>, settings: &Settings, (): ()) -> Result<Self> {
        Ok(Self {
            core: TypeCore::new(definition, settings)?,
        })
    }
}

impl Type for TimeType {
    fn core(&self) -> &TypeCore {
        &self.core
    }

    fn is_falsy(&self, value: &Value) -> bool {
        string_is_falsy(value)
    }

    fn convert(&self, value: &Value, direction: Direction, _: Option<&[FieldPath]>) -> Result<Value> {
        if self.is_falsy(value) {
            return Ok(value.clone());
        }
        let time = match value {
            Value::Time(t) => *t,
            Value::Str(text) => parse_time(text)?,
            other => {
                return Err(Error::conversion(format!(
                    "Value must be time string or time: {other}"
                )))
            }
        };
        Ok(match direction {
            Direction::Native => Value::Time(time),
            Direction::Primitive => Value::Str(format_time(time)),
        })
    }
}
