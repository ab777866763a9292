//! Typed field extraction from raw JSON payloads.
//!
//! Every accessor returns `Ok(Field::Missing)` for an absent, null or blank
//! value, `Ok(Field::Present(..))` for a value of the expected shape, and a
//! `SchemaMismatch` when the value is there but has the wrong shape.

use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use num_traits::FromPrimitive;
use rust_decimal::Decimal;
use serde_json::{Map, Value};

use crate::errors::AcquisitionError;
use crate::models::{Field, League};

pub(crate) struct PayloadReader<'a> {
    provider: &'a str,
    payload: &'a Map<String, Value>,
}

impl<'a> PayloadReader<'a> {
    pub(crate) fn new(provider: &'a str, payload: &'a Map<String, Value>) -> Self {
        Self { provider, payload }
    }

    pub(crate) fn mismatch(&self, path: &str, expected: &str) -> AcquisitionError {
        AcquisitionError::SchemaMismatch {
            provider: self.provider.to_string(),
            message: format!("field '{}' is not {}", path, expected),
        }
    }

    /// Look up a dotted path. Numeric segments index into arrays
    /// (`weather.0.main`).
    pub(crate) fn lookup(&self, path: &str) -> Option<&'a Value> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut current = self.payload.get(first)?;

        for segment in segments {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }

        match current {
            Value::Null => None,
            Value::String(s) if s.trim().is_empty() => None,
            value => Some(value),
        }
    }

    /// First path that holds a value.
    pub(crate) fn first_of(&self, paths: &[&'static str]) -> Option<(&'static str, &'a Value)> {
        paths
            .iter()
            .find_map(|path| self.lookup(path).map(|value| (*path, value)))
    }

    pub(crate) fn decimal(&self, path: &str) -> Result<Field<Decimal>, AcquisitionError> {
        match self.lookup(path) {
            None => Ok(Field::Missing),
            Some(value) => self.decimal_value(path, value).map(Field::Present),
        }
    }

    pub(crate) fn decimal_value(&self, path: &str, value: &Value) -> Result<Decimal, AcquisitionError> {
        match value {
            Value::Number(n) => n
                .as_i64()
                .map(Decimal::from)
                .or_else(|| n.as_f64().and_then(Decimal::from_f64))
                .ok_or_else(|| self.mismatch(path, "a finite number")),
            Value::String(s) => parse_decimal(s).ok_or_else(|| self.mismatch(path, "a number")),
            _ => Err(self.mismatch(path, "a number")),
        }
    }

    pub(crate) fn integer(&self, path: &str) -> Result<Field<i64>, AcquisitionError> {
        let Some(value) = self.lookup(path) else {
            return Ok(Field::Missing);
        };

        let parsed = match value {
            Value::Number(n) => n.as_i64().or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                    .map(|f| f as i64)
            }),
            Value::String(s) => s.trim().trim_start_matches('+').parse::<i64>().ok(),
            _ => None,
        };

        parsed
            .map(Field::Present)
            .ok_or_else(|| self.mismatch(path, "an integer"))
    }

    /// Text field. Numbers are accepted and rendered as text, since rotation
    /// numbers and ids arrive both ways.
    pub(crate) fn text(&self, path: &str) -> Result<Field<String>, AcquisitionError> {
        match self.lookup(path) {
            None => Ok(Field::Missing),
            Some(Value::String(s)) => Ok(Field::Present(s.trim().to_string())),
            Some(Value::Number(n)) => Ok(Field::Present(n.to_string())),
            Some(_) => Err(self.mismatch(path, "text")),
        }
    }

    /// Timestamp as RFC 3339 text, naive ISO text (taken as UTC), or unix seconds.
    pub(crate) fn timestamp(&self, path: &str) -> Result<Field<DateTime<Utc>>, AcquisitionError> {
        match self.lookup(path) {
            None => Ok(Field::Missing),
            Some(value) => self.timestamp_value(path, value).map(Field::Present),
        }
    }

    pub(crate) fn timestamp_value(&self, path: &str, value: &Value) -> Result<DateTime<Utc>, AcquisitionError> {
        match value {
            Value::Number(n) => n
                .as_i64()
                .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
                .ok_or_else(|| self.mismatch(path, "a unix timestamp")),
            Value::String(s) => parse_timestamp(s).ok_or_else(|| self.mismatch(path, "a timestamp")),
            _ => Err(self.mismatch(path, "a timestamp")),
        }
    }

    pub(crate) fn league(&self, path: &str) -> Result<Field<League>, AcquisitionError> {
        match self.text(path)? {
            Field::Missing => Ok(Field::Missing),
            Field::Present(text) => League::from_str(&text)
                .map(Field::Present)
                .map_err(|_| self.mismatch(path, "a supported league")),
        }
    }

    /// Team identity: a plain string, or an object carrying an abbreviation
    /// or a name. Abbreviations are upper-cased; multi-word names are kept
    /// as given.
    pub(crate) fn team(&self, path: &str) -> Result<Field<String>, AcquisitionError> {
        let text = match self.lookup(path) {
            Some(Value::Object(_)) => match self.text(&format!("{}.abbreviation", path))? {
                Field::Present(abbreviation) => {
                    return Ok(Field::Present(abbreviation.to_ascii_uppercase()))
                }
                Field::Missing => return self.text(&format!("{}.name", path)),
            },
            _ => self.text(path)?,
        };
        Ok(text.map(|team| {
            if team.contains(char::is_whitespace) {
                team
            } else {
                team.to_ascii_uppercase()
            }
        }))
    }
}

/// Parse a decimal from provider text such as "-3.5", "+7" or "44.5".
pub(crate) fn parse_decimal(text: &str) -> Option<Decimal> {
    let trimmed = text.trim();
    let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
    Decimal::from_str(unsigned).ok()
}

pub(crate) fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let trimmed = text.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .map(|naive| naive.and_utc())
}
