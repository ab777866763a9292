//! Shared identifier and marker types.

use std::borrow::Cow;
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Provider identifier (e.g., "accuweather", "action_network").
///
/// Doubles as the rate-limit domain: one limiter state per identity.
pub type ProviderId = Cow<'static, str>;

/// Supported leagues.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum League {
    #[serde(rename = "NFL")]
    Nfl,
    #[serde(rename = "NCAAF")]
    Ncaaf,
}

impl League {
    pub fn as_str(&self) -> &'static str {
        match self {
            League::Nfl => "NFL",
            League::Ncaaf => "NCAAF",
        }
    }

    /// Valid week numbers.
    ///
    /// NFL: 1-18 regular season, 19-22 playoffs.
    /// NCAAF: 0 is preseason, 1-15 regular season, 16 bowls.
    pub fn week_range(&self) -> RangeInclusive<i64> {
        match self {
            League::Nfl => 1..=22,
            League::Ncaaf => 0..=16,
        }
    }
}

impl fmt::Display for League {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for League {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NFL" => Ok(League::Nfl),
            "NCAAF" | "CFB" => Ok(League::Ncaaf),
            other => Err(format!("unknown league '{}'", other)),
        }
    }
}

/// Kind of request a caller can make. Preference orders are keyed by this.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    Odds,
    Games,
    Forecast,
}

impl RequestKind {
    pub const ALL: [RequestKind; 3] = [RequestKind::Odds, RequestKind::Games, RequestKind::Forecast];

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestKind::Odds => "odds",
            RequestKind::Games => "games",
            RequestKind::Forecast => "forecast",
        }
    }

    /// The record kind a request of this kind yields.
    pub fn record_kind(&self) -> RecordKind {
        match self {
            RequestKind::Odds => RecordKind::Odds,
            RequestKind::Games => RecordKind::Game,
            RequestKind::Forecast => RecordKind::Weather,
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of record a provider produces.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Odds,
    Game,
    Weather,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Odds => f.write_str("odds"),
            RecordKind::Game => f.write_str("game"),
            RecordKind::Weather => f.write_str("weather"),
        }
    }
}

/// A normalized field value.
///
/// Absent provider fields become `Missing` rather than a guessed default.
/// The validator decides whether a missing field matters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Field<T> {
    Present(T),
    Missing,
}

impl<T> Field<T> {
    pub fn is_present(&self) -> bool {
        matches!(self, Field::Present(_))
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Field::Missing)
    }

    pub fn as_ref(&self) -> Option<&T> {
        match self {
            Field::Present(value) => Some(value),
            Field::Missing => None,
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Field::Present(value) => Some(value),
            Field::Missing => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Field<U> {
        match self {
            Field::Present(value) => Field::Present(f(value)),
            Field::Missing => Field::Missing,
        }
    }
}

impl<T: Copy> Field<T> {
    pub fn value(&self) -> Option<T> {
        self.as_ref().copied()
    }
}

impl<T> Default for Field<T> {
    fn default() -> Self {
        Field::Missing
    }
}

impl<T> From<Option<T>> for Field<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Field::Present(v),
            None => Field::Missing,
        }
    }
}

impl<T: Serialize> Serialize for Field<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Field::Present(value) => serializer.serialize_some(value),
            Field::Missing => serializer.serialize_none(),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Field<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(Field::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_league_parsing() {
        assert_eq!("nfl".parse::<League>(), Ok(League::Nfl));
        assert_eq!(" NCAAF ".parse::<League>(), Ok(League::Ncaaf));
        assert!("MLB".parse::<League>().is_err());
    }

    #[test]
    fn test_league_week_ranges() {
        assert!(League::Nfl.week_range().contains(&22));
        assert!(!League::Nfl.week_range().contains(&0));
        assert!(League::Ncaaf.week_range().contains(&0));
        assert!(!League::Ncaaf.week_range().contains(&17));
    }

    #[test]
    fn test_field_serializes_missing_as_null() {
        let present: Field<i64> = Field::Present(7);
        let missing: Field<i64> = Field::Missing;
        assert_eq!(serde_json::to_string(&present).unwrap(), "7");
        assert_eq!(serde_json::to_string(&missing).unwrap(), "null");
    }

    #[test]
    fn test_field_from_option() {
        assert_eq!(Field::from(Some("KC")), Field::Present("KC"));
        assert!(Field::<&str>::from(None).is_missing());
    }
}
