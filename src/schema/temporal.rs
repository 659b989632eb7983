//! Date, time and datetime schemas.
//!
//! Native temporal values are accepted as is. Strings are parsed only when a
//! `format` (chrono strftime syntax) is configured, and numbers are read as
//! UTC unix timestamps only when `unixts` is set.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use crate::dump::{self, Params};
use crate::error::{ErrorKind, ValidationError};
use crate::load::LoadError;
use crate::validation::Context;
use crate::value::{Map, Value, ValueKind};

use super::traits::{settle, Outcome, SchemaLike};

fn parse_error(format: &str, actual: &str) -> ValidationError {
    ValidationError::new(ErrorKind::DatetimeParse {
        expected: format.to_string(),
        actual: actual.to_string(),
    })
}

fn from_timestamp(value: &Value, expected: ValueKind) -> Result<NaiveDateTime, ValidationError> {
    let parsed = match value {
        Value::Int(secs) => DateTime::<Utc>::from_timestamp(*secs, 0),
        Value::Float(ts) if ts.is_finite() => {
            let secs = ts.floor();
            let nanos = ((ts - secs) * 1e9).round().min(999_999_999.0) as u32;
            DateTime::<Utc>::from_timestamp(secs as i64, nanos)
        }
        _ => None,
    };
    parsed
        .map(|dt| dt.naive_utc())
        .ok_or_else(|| ValidationError::invalid_type(expected, value))
}

fn check_range<T>(min: Option<T>, max: Option<T>, value: T) -> Result<(), ValidationError>
where
    T: PartialOrd + Into<Value> + Copy,
{
    if let Some(min) = min {
        if value < min {
            return Err(ValidationError::min_value(min, value));
        }
    }
    if let Some(max) = max {
        if value > max {
            return Err(ValidationError::max_value(max, value));
        }
    }
    Ok(())
}

/// A schema for validating calendar dates.
///
/// # Example
///
/// ```rust
/// use chrono::NaiveDate;
/// use vouch::{Schema, SchemaLike, Value};
///
/// let schema = Schema::date().format("%Y-%m-%d").min(NaiveDate::from_ymd_opt(2000, 1, 1).unwrap());
///
/// let result = schema.check(&Value::from("2024-02-29")).unwrap();
/// assert_eq!(
///     result.into_result().unwrap(),
///     Value::Date(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap())
/// );
///
/// assert!(schema.check(&Value::from("1999-12-31")).unwrap().is_failure());
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DateSchema {
    nullable: bool,
    unixts: bool,
    format: Option<String>,
    min: Option<NaiveDate>,
    max: Option<NaiveDate>,
}

impl DateSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts null and returns it unchanged.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Reads numbers as UTC unix timestamps.
    pub fn unixts(mut self) -> Self {
        self.unixts = true;
        self
    }

    /// Parses strings with a chrono format string.
    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn min(mut self, min: NaiveDate) -> Self {
        self.min = Some(min);
        self
    }

    pub fn max(mut self, max: NaiveDate) -> Self {
        self.max = Some(max);
        self
    }

    fn coerce_checked(&self, value: &Value) -> Result<Value, ValidationError> {
        let date = match (value, self.format.as_deref()) {
            (Value::Null, _) if self.nullable => return Ok(Value::Null),
            (Value::Date(date), _) => *date,
            (Value::Int(_) | Value::Float(_), _) if self.unixts => {
                from_timestamp(value, ValueKind::Date)?.date()
            }
            (Value::Str(s), Some(format)) => {
                NaiveDate::parse_from_str(s, format).map_err(|_| parse_error(format, s))?
            }
            _ => return Err(ValidationError::invalid_type(ValueKind::Date, value)),
        };
        check_range(self.min, self.max, date)?;
        Ok(Value::Date(date))
    }

    pub(crate) fn load(params: &mut Params<'_>) -> Result<Self, LoadError> {
        Ok(Self {
            nullable: params.flag("nullable")?,
            unixts: params.flag("unixts")?,
            format: params.string("format")?,
            min: params.date("min")?,
            max: params.date("max")?,
        })
    }
}

impl SchemaLike for DateSchema {
    const CLASS: &'static str = "Date";

    fn validate(&self, value: &Value, _context: &mut Context) -> Outcome {
        settle(self.coerce_checked(value))
    }

    fn dump_params(&self, params: &mut Map) {
        dump::put_flag(params, "nullable", self.nullable);
        dump::put_flag(params, "unixts", self.unixts);
        dump::put_opt(params, "format", self.format.clone());
        dump::put_opt(params, "min", self.min);
        dump::put_opt(params, "max", self.max);
    }
}

/// A schema for validating times of day.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TimeSchema {
    nullable: bool,
    format: Option<String>,
    min: Option<NaiveTime>,
    max: Option<NaiveTime>,
}

impl TimeSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lets null through untouched.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn min(mut self, min: NaiveTime) -> Self {
        self.min = Some(min);
        self
    }

    pub fn max(mut self, max: NaiveTime) -> Self {
        self.max = Some(max);
        self
    }

    fn coerce_checked(&self, value: &Value) -> Result<Value, ValidationError> {
        let time = match (value, self.format.as_deref()) {
            (Value::Null, _) if self.nullable => return Ok(Value::Null),
            (Value::Time(time), _) => *time,
            (Value::Str(s), Some(format)) => {
                NaiveTime::parse_from_str(s, format).map_err(|_| parse_error(format, s))?
            }
            _ => return Err(ValidationError::invalid_type(ValueKind::Time, value)),
        };
        check_range(self.min, self.max, time)?;
        Ok(Value::Time(time))
    }

    pub(crate) fn load(params: &mut Params<'_>) -> Result<Self, LoadError> {
        Ok(Self {
            nullable: params.flag("nullable")?,
            format: params.string("format")?,
            min: params.time("min")?,
            max: params.time("max")?,
        })
    }
}

impl SchemaLike for TimeSchema {
    const CLASS: &'static str = "Time";

    fn validate(&self, value: &Value, _context: &mut Context) -> Outcome {
        settle(self.coerce_checked(value))
    }

    fn dump_params(&self, params: &mut Map) {
        dump::put_flag(params, "nullable", self.nullable);
        dump::put_opt(params, "format", self.format.clone());
        dump::put_opt(params, "min", self.min);
        dump::put_opt(params, "max", self.max);
    }
}

/// A schema for validating naive datetimes.
///
/// Unix timestamps are converted in UTC.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DatetimeSchema {
    nullable: bool,
    unixts: bool,
    format: Option<String>,
    min: Option<NaiveDateTime>,
    max: Option<NaiveDateTime>,
}

impl DatetimeSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts null and returns it unchanged.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Reads integer and float input as seconds since the epoch, UTC.
    pub fn unixts(mut self) -> Self {
        self.unixts = true;
        self
    }

    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn min(mut self, min: NaiveDateTime) -> Self {
        self.min = Some(min);
        self
    }

    pub fn max(mut self, max: NaiveDateTime) -> Self {
        self.max = Some(max);
        self
    }

    fn coerce_checked(&self, value: &Value) -> Result<Value, ValidationError> {
        let datetime = match (value, self.format.as_deref()) {
            (Value::Null, _) if self.nullable => return Ok(Value::Null),
            (Value::Datetime(datetime), _) => *datetime,
            (Value::Int(_) | Value::Float(_), _) if self.unixts => {
                from_timestamp(value, ValueKind::Datetime)?
            }
            (Value::Str(s), Some(format)) => NaiveDateTime::parse_from_str(s, format)
                .map_err(|_| parse_error(format, s))?,
            _ => return Err(ValidationError::invalid_type(ValueKind::Datetime, value)),
        };
        check_range(self.min, self.max, datetime)?;
        Ok(Value::Datetime(datetime))
    }

    pub(crate) fn load(params: &mut Params<'_>) -> Result<Self, LoadError> {
        Ok(Self {
            nullable: params.flag("nullable")?,
            unixts: params.flag("unixts")?,
            format: params.string("format")?,
            min: params.datetime("min")?,
            max: params.datetime("max")?,
        })
    }
}

impl SchemaLike for DatetimeSchema {
    const CLASS: &'static str = "Datetime";

    fn validate(&self, value: &Value, _context: &mut Context) -> Outcome {
        settle(self.coerce_checked(value))
    }

    fn dump_params(&self, params: &mut Map) {
        dump::put_flag(params, "nullable", self.nullable);
        dump::put_flag(params, "unixts", self.unixts);
        dump::put_opt(params, "format", self.format.clone());
        dump::put_opt(params, "min", self.min);
        dump::put_opt(params, "max", self.max);
    }
}
