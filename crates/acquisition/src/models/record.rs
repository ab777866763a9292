//! Normalized domain records.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Field, League, ProviderId, RecordKind};

/// Betting line for one game at one sportsbook.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OddsRecord {
    pub league: Field<League>,
    pub away_team: Field<String>,
    pub home_team: Field<String>,
    /// Kickoff as displayed by the provider.
    pub game_time: Field<String>,
    pub away_rotation: Field<String>,
    pub home_rotation: Field<String>,
    /// Home spread in points.
    pub spread: Field<Decimal>,
    /// American odds on the spread.
    pub spread_odds: Field<i64>,
    /// Over/under in points.
    pub total: Field<Decimal>,
    /// American odds on the total.
    pub total_odds: Field<i64>,
    pub moneyline_home: Field<i64>,
    pub moneyline_away: Field<i64>,
    pub sportsbook: Field<String>,
}

impl OddsRecord {
    /// Spread odds in decimal format.
    pub fn spread_decimal_odds(&self) -> Option<Decimal> {
        self.spread_odds.value().and_then(american_to_decimal)
    }

    /// Total odds in decimal format.
    pub fn total_decimal_odds(&self) -> Option<Decimal> {
        self.total_odds.value().and_then(american_to_decimal)
    }
}

/// Game lifecycle status.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    Scheduled,
    InProgress,
    Final,
    Postponed,
}

impl GameStatus {
    /// Parse provider status text. Returns `None` for unknown labels.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().replace([' ', '-'], "_").as_str() {
            "scheduled" | "pre" | "pregame" => Some(GameStatus::Scheduled),
            "in_progress" | "live" => Some(GameStatus::InProgress),
            "final" | "completed" => Some(GameStatus::Final),
            "postponed" => Some(GameStatus::Postponed),
            _ => None,
        }
    }
}

/// Schedule and score for one game.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GameRecord {
    pub game_id: Field<String>,
    pub league: Field<League>,
    pub week: Field<i64>,
    pub home_team: Field<String>,
    pub away_team: Field<String>,
    pub home_score: Field<i64>,
    pub away_score: Field<i64>,
    pub status: Field<GameStatus>,
    pub game_date: Field<DateTime<Utc>>,
}

impl GameRecord {
    /// Home minus away, when both scores are known.
    pub fn point_differential(&self) -> Option<i64> {
        self.home_score.value()?.checked_sub(self.away_score.value()?)
    }

    /// Combined score, when both scores are known.
    pub fn total_points(&self) -> Option<i64> {
        self.home_score.value()?.checked_add(self.away_score.value()?)
    }
}

/// Weather at a venue for one point in time.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WeatherRecord {
    pub forecast_time: Field<DateTime<Utc>>,
    pub temperature_f: Field<Decimal>,
    pub wind_speed_mph: Field<Decimal>,
    /// 16-point compass direction (e.g., "NNW").
    pub wind_direction: Field<String>,
    /// Relative humidity, percent.
    pub humidity: Field<Decimal>,
    /// Chance of precipitation, percent.
    pub precipitation_chance: Field<Decimal>,
    pub precipitation_type: Field<String>,
    pub conditions: Field<String>,
}

/// Record payload, one variant per record kind.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecordData {
    Odds(OddsRecord),
    Game(GameRecord),
    Weather(WeatherRecord),
}

impl RecordData {
    pub fn kind(&self) -> RecordKind {
        match self {
            RecordData::Odds(_) => RecordKind::Odds,
            RecordData::Game(_) => RecordKind::Game,
            RecordData::Weather(_) => RecordKind::Weather,
        }
    }
}

/// A provider record mapped into the shared schema.
///
/// Only the normalizer builds these; the provenance is inherited from the
/// raw record it came from.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NormalizedRecord {
    source: ProviderId,
    fetched_at: DateTime<Utc>,
    #[serde(flatten)]
    data: RecordData,
}

impl NormalizedRecord {
    pub(crate) fn new(source: ProviderId, fetched_at: DateTime<Utc>, data: RecordData) -> Self {
        Self {
            source,
            fetched_at,
            data,
        }
    }

    pub fn source(&self) -> &ProviderId {
        &self.source
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    pub fn data(&self) -> &RecordData {
        &self.data
    }

    pub fn kind(&self) -> RecordKind {
        self.data.kind()
    }

    pub fn as_odds(&self) -> Option<&OddsRecord> {
        match &self.data {
            RecordData::Odds(odds) => Some(odds),
            _ => None,
        }
    }

    pub fn as_game(&self) -> Option<&GameRecord> {
        match &self.data {
            RecordData::Game(game) => Some(game),
            _ => None,
        }
    }

    pub fn as_weather(&self) -> Option<&WeatherRecord> {
        match &self.data {
            RecordData::Weather(weather) => Some(weather),
            _ => None,
        }
    }
}

impl fmt::Display for NormalizedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = |field: &Field<String>| field.as_ref().cloned().unwrap_or_else(|| "?".to_string());
        match &self.data {
            RecordData::Odds(odds) => write!(
                f,
                "{} odds {} @ {}",
                self.source,
                text(&odds.away_team),
                text(&odds.home_team)
            ),
            RecordData::Game(game) => write!(
                f,
                "{} game {} ({} @ {})",
                self.source,
                text(&game.game_id),
                text(&game.away_team),
                text(&game.home_team)
            ),
            RecordData::Weather(weather) => match weather.forecast_time.as_ref() {
                Some(time) => write!(f, "{} weather at {}", self.source, time.to_rfc3339()),
                None => write!(f, "{} weather", self.source),
            },
        }
    }
}

/// Convert American odds to decimal odds.
///
/// `+150` becomes `2.5`, `-110` becomes `1.9090...`. Zero is not a valid
/// American price and yields `None`.
pub fn american_to_decimal(american: i64) -> Option<Decimal> {
    match american {
        0 => None,
        odds if odds > 0 => Some(Decimal::from(odds) / Decimal::ONE_HUNDRED + Decimal::ONE),
        odds => Decimal::ONE_HUNDRED
            .checked_div(Decimal::from(odds.unsigned_abs()))
            .map(|d| d + Decimal::ONE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_american_to_decimal_positive() {
        assert_eq!(american_to_decimal(150), Some(dec!(2.5)));
        assert_eq!(american_to_decimal(100), Some(dec!(2)));
    }

    #[test]
    fn test_american_to_decimal_negative() {
        assert_eq!(american_to_decimal(-200), Some(dec!(1.5)));
        let juice = american_to_decimal(-110).unwrap();
        assert_eq!(juice.round_dp(4), dec!(1.9091));
    }

    #[test]
    fn test_american_to_decimal_zero_is_invalid() {
        assert_eq!(american_to_decimal(0), None);
    }

    #[test]
    fn test_game_status_parse() {
        assert_eq!(GameStatus::parse("Final"), Some(GameStatus::Final));
        assert_eq!(GameStatus::parse("in progress"), Some(GameStatus::InProgress));
        assert_eq!(GameStatus::parse("in-progress"), Some(GameStatus::InProgress));
        assert_eq!(GameStatus::parse("halftime show"), None);
    }

    #[test]
    fn test_point_helpers_need_both_scores() {
        let mut game = GameRecord {
            game_id: Field::Present("401".to_string()),
            league: Field::Present(League::Nfl),
            week: Field::Present(5),
            home_team: Field::Present("KC".to_string()),
            away_team: Field::Present("BUF".to_string()),
            home_score: Field::Present(27),
            away_score: Field::Present(24),
            status: Field::Present(GameStatus::Final),
            game_date: Field::Missing,
        };
        assert_eq!(game.point_differential(), Some(3));
        assert_eq!(game.total_points(), Some(51));

        game.away_score = Field::Missing;
        assert_eq!(game.point_differential(), None);
        assert_eq!(game.total_points(), None);
    }

    #[test]
    fn test_point_helpers_overflow_is_none() {
        let game = GameRecord {
            game_id: Field::Missing,
            league: Field::Present(League::Nfl),
            week: Field::Missing,
            home_team: Field::Missing,
            away_team: Field::Missing,
            home_score: Field::Present(i64::MIN),
            away_score: Field::Present(i64::MAX),
            status: Field::Missing,
            game_date: Field::Missing,
        };
        assert_eq!(game.point_differential(), None);
        assert_eq!(game.total_points(), Some(-1));
    }

    #[test]
    fn test_american_to_decimal_extremes() {
        assert!(american_to_decimal(i64::MIN).is_some());
        assert!(american_to_decimal(i64::MAX).is_some());
    }
}
