//! Raw payload to domain record mapping.
//!
//! [`normalize`] is a pure function of its input: the mapping is picked by
//! the raw record's schema and kind, unit conversions are deterministic, and
//! absent fields come out as [`Field::Missing`](crate::models::Field).
//! Payloads whose values have the wrong shape fail with
//! [`AcquisitionError::SchemaMismatch`].

mod fields;
mod games;
mod odds;
mod weather;

pub use weather::{celsius_to_fahrenheit, compass_direction, kmh_to_mph, mps_to_mph};

pub(crate) use weather::entry_time;

use crate::errors::AcquisitionError;
use crate::models::{NormalizedRecord, RawRecord, RawSchema, RecordData, RecordKind};

use fields::PayloadReader;

/// Map one raw record into the shared schema.
pub fn normalize(raw: &RawRecord) -> Result<NormalizedRecord, AcquisitionError> {
    let reader = PayloadReader::new(raw.source(), raw.payload());

    let data = match (raw.schema(), raw.kind()) {
        (RawSchema::Canonical | RawSchema::ActionNetwork, RecordKind::Odds) => {
            RecordData::Odds(odds::odds(&reader)?)
        }
        (RawSchema::Canonical | RawSchema::Overtime, RecordKind::Game) => {
            RecordData::Game(games::game(&reader)?)
        }
        (RawSchema::Canonical, RecordKind::Weather) => RecordData::Weather(weather::canonical(&reader)?),
        (RawSchema::AccuWeather, RecordKind::Weather) => {
            RecordData::Weather(weather::accuweather(&reader)?)
        }
        (RawSchema::OpenWeather { units }, RecordKind::Weather) => {
            RecordData::Weather(weather::openweather(&reader, units)?)
        }
        (schema, kind) => {
            return Err(AcquisitionError::SchemaMismatch {
                provider: raw.source().to_string(),
                message: format!("{:?} payloads do not carry {} records", schema, kind),
            })
        }
    };

    Ok(NormalizedRecord::new(raw.source().clone(), raw.fetched_at(), data))
}

/// Map every record of a provider response. The first mismatch fails the batch.
pub fn normalize_all(raws: &[RawRecord]) -> Result<Vec<NormalizedRecord>, AcquisitionError> {
    raws.iter().map(normalize).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Field, GameStatus, League, UnitSystem};
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn raw(source: &'static str, schema: RawSchema, kind: RecordKind, payload: serde_json::Value) -> RawRecord {
        RawRecord::from_value(source, schema, kind, payload).unwrap()
    }

    #[test]
    fn test_action_network_odds() {
        let record = raw(
            "action_network",
            RawSchema::ActionNetwork,
            RecordKind::Odds,
            json!({
                "league": "NFL",
                "away_team": "Buffalo Bills",
                "home_team": "Kansas City Chiefs",
                "game_time": "Sun 4:25 PM",
                "away_rotation": "461",
                "home_rotation": 462,
                "spread": "-2.5",
                "spread_odds": "-110",
                "over_under": 47.5,
                "total_odds": -105,
                "moneyline_home": -135,
                "moneyline_away": "+115",
                "sportsbook": "DraftKings",
                "source": "action_network",
            }),
        );

        let normalized = normalize(&record).unwrap();
        let odds = normalized.as_odds().unwrap();

        assert_eq!(normalized.source(), "action_network");
        assert_eq!(odds.league, Field::Present(League::Nfl));
        assert_eq!(odds.spread, Field::Present(dec!(-2.5)));
        assert_eq!(odds.total, Field::Present(dec!(47.5)));
        assert_eq!(odds.spread_odds, Field::Present(-110));
        assert_eq!(odds.moneyline_away, Field::Present(115));
        assert_eq!(odds.home_rotation, Field::Present("462".to_string()));
        assert_eq!(odds.home_team, Field::Present("Kansas City Chiefs".to_string()));
    }

    #[test]
    fn test_plain_team_abbreviations_are_upper_cased() {
        let odds_row = raw(
            "replay",
            RawSchema::Canonical,
            RecordKind::Odds,
            json!({ "league": "NFL", "away_team": "buf", "home_team": " kc " }),
        );
        let normalized = normalize(&odds_row).unwrap();
        let odds = normalized.as_odds().unwrap();
        assert_eq!(odds.away_team, Field::Present("BUF".to_string()));
        assert_eq!(odds.home_team, Field::Present("KC".to_string()));

        let game_row = raw(
            "replay",
            RawSchema::Canonical,
            RecordKind::Game,
            json!({ "league": "NFL", "home_team": "gb", "away_team": "Chi" }),
        );
        let normalized = normalize(&game_row).unwrap();
        let game = normalized.as_game().unwrap();
        assert_eq!(game.home_team, Field::Present("GB".to_string()));
        assert_eq!(game.away_team, Field::Present("CHI".to_string()));
    }

    #[test]
    fn test_missing_fields_are_marked_not_defaulted() {
        let record = raw(
            "action_network",
            RawSchema::ActionNetwork,
            RecordKind::Odds,
            json!({ "league": "NFL", "away_team": "BUF", "home_team": "KC", "spread": -2.5 }),
        );

        let normalized = normalize(&record).unwrap();
        let odds = normalized.as_odds().unwrap();
        assert!(odds.spread_odds.is_missing());
        assert!(odds.total.is_missing());
        assert!(odds.sportsbook.is_missing());
    }

    #[test]
    fn test_overtime_game_with_team_objects() {
        let record = raw(
            "overtime",
            RawSchema::Overtime,
            RecordKind::Game,
            json!({
                "game_id": 401_547_000,
                "league": "NCAAF",
                "week": 12,
                "home_team": { "abbreviation": "osu", "name": "Ohio State" },
                "away_team": { "name": "Michigan" },
                "home_score": 24,
                "away_score": 30,
                "status": "final",
                "game_date": "2024-11-30T17:00:00Z",
            }),
        );

        let normalized = normalize(&record).unwrap();
        let game = normalized.as_game().unwrap();
        assert_eq!(game.game_id, Field::Present("401547000".to_string()));
        assert_eq!(game.league, Field::Present(League::Ncaaf));
        assert_eq!(game.home_team, Field::Present("OSU".to_string()));
        assert_eq!(game.away_team, Field::Present("Michigan".to_string()));
        assert_eq!(game.status, Field::Present(GameStatus::Final));
        assert_eq!(
            game.game_date,
            Field::Present(Utc.with_ymd_and_hms(2024, 11, 30, 17, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_unknown_status_is_schema_mismatch() {
        let record = raw(
            "overtime",
            RawSchema::Overtime,
            RecordKind::Game,
            json!({ "game_id": "1", "status": "abandoned at sea" }),
        );
        assert!(matches!(
            normalize(&record),
            Err(AcquisitionError::SchemaMismatch { .. })
        ));
    }

    #[test]
    fn test_accuweather_hourly_celsius_is_converted() {
        let record = raw(
            "accuweather",
            RawSchema::AccuWeather,
            RecordKind::Weather,
            json!({
                "DateTime": "2024-12-01T13:00:00-05:00",
                "IconPhrase": "Snow showers",
                "HasPrecipitation": true,
                "PrecipitationType": "Snow",
                "PrecipitationProbability": 70,
                "Temperature": { "Value": -5.0, "Unit": "C", "UnitType": 17 },
                "Wind": {
                    "Speed": { "Value": 24.1, "Unit": "km/h", "UnitType": 7 },
                    "Direction": { "Degrees": 315, "English": "NW" },
                },
                "RelativeHumidity": 81,
            }),
        );

        let normalized = normalize(&record).unwrap();
        let weather = normalized.as_weather().unwrap();
        assert_eq!(weather.temperature_f, Field::Present(dec!(23)));
        assert_eq!(weather.wind_speed_mph, Field::Present(dec!(14.98)));
        assert_eq!(weather.wind_direction, Field::Present("NW".to_string()));
        assert_eq!(weather.precipitation_type, Field::Present("snow".to_string()));
        assert_eq!(weather.precipitation_chance, Field::Present(dec!(70)));
        assert_eq!(weather.conditions, Field::Present("Snow showers".to_string()));
        assert_eq!(
            weather.forecast_time,
            Field::Present(Utc.with_ymd_and_hms(2024, 12, 1, 18, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_accuweather_current_conditions_imperial() {
        let record = raw(
            "accuweather",
            RawSchema::AccuWeather,
            RecordKind::Weather,
            json!({
                "LocalObservationDateTime": "2024-12-01T12:55:00-05:00",
                "WeatherText": "Cloudy",
                "Temperature": {
                    "Metric": { "Value": 4.4, "Unit": "C" },
                    "Imperial": { "Value": 40.0, "Unit": "F" },
                },
                "Wind": { "Speed": { "Imperial": { "Value": 12.0, "Unit": "mi/h" } } },
            }),
        );

        let normalized = normalize(&record).unwrap();
        let weather = normalized.as_weather().unwrap();
        assert_eq!(weather.temperature_f, Field::Present(dec!(40)));
        assert_eq!(weather.wind_speed_mph, Field::Present(dec!(12)));
        assert_eq!(weather.conditions, Field::Present("Cloudy".to_string()));
        assert!(weather.humidity.is_missing());
    }

    #[test]
    fn test_accuweather_value_without_unit_is_mismatch() {
        let record = raw(
            "accuweather",
            RawSchema::AccuWeather,
            RecordKind::Weather,
            json!({ "Temperature": { "Value": 40.0 } }),
        );
        assert!(normalize(&record).is_err());
    }

    #[test]
    fn test_openweather_metric_entry() {
        let record = raw(
            "openweather",
            RawSchema::OpenWeather {
                units: UnitSystem::Metric,
            },
            RecordKind::Weather,
            json!({
                "dt": 1_733_076_000,
                "main": { "temp": 10.0, "humidity": 64 },
                "wind": { "speed": 5.0, "deg": 200 },
                "weather": [{ "main": "Rain", "description": "light rain" }],
                "pop": 0.45,
                "rain": { "3h": 0.8 },
            }),
        );

        let normalized = normalize(&record).unwrap();
        let weather = normalized.as_weather().unwrap();
        assert_eq!(weather.temperature_f, Field::Present(dec!(50)));
        assert_eq!(weather.wind_speed_mph, Field::Present(dec!(11.18)));
        assert_eq!(weather.wind_direction, Field::Present("SSW".to_string()));
        assert_eq!(weather.precipitation_chance, Field::Present(dec!(45)));
        assert_eq!(weather.precipitation_type, Field::Present("rain".to_string()));
        assert_eq!(weather.conditions, Field::Present("Rain".to_string()));
    }

    #[test]
    fn test_canonical_weather_accepts_celsius() {
        let record = raw(
            "replay",
            RawSchema::Canonical,
            RecordKind::Weather,
            json!({ "temperature_c": 20, "wind_speed_mph": 8, "wind_direction_deg": 90 }),
        );

        let normalized = normalize(&record).unwrap();
        let weather = normalized.as_weather().unwrap();
        assert_eq!(weather.temperature_f, Field::Present(dec!(68)));
        assert_eq!(weather.wind_direction, Field::Present("E".to_string()));
    }

    #[test]
    fn test_out_of_range_measurements_are_mismatches() {
        let huge = "79228162514264337593543950335";
        let canonical = raw(
            "replay",
            RawSchema::Canonical,
            RecordKind::Weather,
            json!({ "temperature_c": huge }),
        );
        assert!(matches!(
            normalize(&canonical),
            Err(AcquisitionError::SchemaMismatch { .. })
        ));

        let openweather = raw(
            "openweather",
            RawSchema::OpenWeather {
                units: UnitSystem::Imperial,
            },
            RecordKind::Weather,
            json!({ "dt": 1_733_076_000, "pop": huge }),
        );
        assert!(matches!(
            normalize(&openweather),
            Err(AcquisitionError::SchemaMismatch { .. })
        ));
    }

    #[test]
    fn test_extreme_bearing_still_normalizes() {
        let record = raw(
            "replay",
            RawSchema::Canonical,
            RecordKind::Weather,
            json!({ "wind_direction_deg": -90 }),
        );
        let normalized = normalize(&record).unwrap();
        let weather = normalized.as_weather().unwrap();
        assert_eq!(weather.wind_direction, Field::Present("W".to_string()));
    }

    #[test]
    fn test_schema_kind_mismatch() {
        let record = raw(
            "accuweather",
            RawSchema::AccuWeather,
            RecordKind::Odds,
            json!({ "spread": 3 }),
        );
        assert!(matches!(
            normalize(&record),
            Err(AcquisitionError::SchemaMismatch { .. })
        ));
    }

    #[test]
    fn test_normalize_is_deterministic() {
        let record = raw(
            "replay",
            RawSchema::Canonical,
            RecordKind::Weather,
            json!({ "temperature_f": 40, "wind_speed_mph": 12 }),
        );
        assert_eq!(normalize(&record).unwrap(), normalize(&record).unwrap());
    }

    #[test]
    fn test_normalize_all_fails_on_first_mismatch() {
        let good = raw("replay", RawSchema::Canonical, RecordKind::Odds, json!({ "spread": 3 }));
        let bad = raw("replay", RawSchema::Canonical, RecordKind::Odds, json!({ "spread": [3] }));
        assert_eq!(normalize_all(&[good.clone()]).unwrap().len(), 1);
        assert!(normalize_all(&[good, bad]).is_err());
    }
}
