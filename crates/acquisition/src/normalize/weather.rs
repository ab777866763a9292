//! Weather payload mappings and unit conversions.

use num_traits::ToPrimitive;
use rust_decimal::Decimal;
use serde_json::Value;

use super::fields::PayloadReader;
use crate::errors::AcquisitionError;
use crate::models::{Field, UnitSystem, WeatherRecord};

/// 16-point compass, clockwise from north.
const COMPASS_POINTS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

/// Convert Celsius to Fahrenheit. `None` when the result does not fit a
/// `Decimal`.
pub fn celsius_to_fahrenheit(celsius: Decimal) -> Option<Decimal> {
    celsius
        .checked_mul(Decimal::new(18, 1))?
        .checked_add(Decimal::from(32))
}

/// Convert kilometres per hour to miles per hour, rounded to 2 places.
pub fn kmh_to_mph(kmh: Decimal) -> Option<Decimal> {
    kmh.checked_div(Decimal::new(1_609_344, 6)).map(|mph| mph.round_dp(2))
}

/// Convert metres per second to miles per hour, rounded to 2 places.
pub fn mps_to_mph(mps: Decimal) -> Option<Decimal> {
    mps.checked_div(Decimal::new(44_704, 5)).map(|mph| mph.round_dp(2))
}

/// Map a bearing in degrees to a 16-point compass label.
///
/// Bearings outside [0, 360) wrap around.
pub fn compass_direction(degrees: Decimal) -> Option<&'static str> {
    let full_turn = Decimal::from(360);
    let bearing = degrees.checked_rem(full_turn)?;
    let bearing = if bearing.is_sign_negative() {
        bearing + full_turn
    } else {
        bearing
    };

    let sector = ((bearing + Decimal::new(1125, 2)) / Decimal::new(225, 1))
        .floor()
        .to_usize()?;
    COMPASS_POINTS.get(sector % COMPASS_POINTS.len()).copied()
}

/// Apply a checked conversion to a field read from `path`.
fn converted(
    reader: &PayloadReader<'_>,
    path: &str,
    value: Field<Decimal>,
    convert: impl FnOnce(Decimal) -> Option<Decimal>,
) -> Result<Field<Decimal>, AcquisitionError> {
    match value {
        Field::Missing => Ok(Field::Missing),
        Field::Present(value) => convert(value)
            .map(Field::Present)
            .ok_or_else(|| reader.mismatch(path, "a value in range")),
    }
}

/// Read a bearing from `path` as a compass label.
fn compass(reader: &PayloadReader<'_>, path: &str) -> Result<Field<String>, AcquisitionError> {
    match reader.decimal(path)? {
        Field::Missing => Ok(Field::Missing),
        Field::Present(degrees) => compass_direction(degrees)
            .map(|label| Field::Present(label.to_string()))
            .ok_or_else(|| reader.mismatch(path, "a bearing in degrees")),
    }
}

/// Flat payload keyed by normalized names.
pub(crate) fn canonical(reader: &PayloadReader<'_>) -> Result<WeatherRecord, AcquisitionError> {
    let temperature_f = match reader.decimal("temperature_f")? {
        Field::Missing => converted(
            reader,
            "temperature_c",
            reader.decimal("temperature_c")?,
            celsius_to_fahrenheit,
        )?,
        present => present,
    };

    let wind_direction = match reader.text("wind_direction")? {
        Field::Missing => compass(reader, "wind_direction_deg")?,
        present => present,
    };

    Ok(WeatherRecord {
        forecast_time: reader.timestamp("forecast_time")?,
        temperature_f,
        wind_speed_mph: reader.decimal("wind_speed_mph")?,
        wind_direction,
        humidity: reader.decimal("humidity")?,
        precipitation_chance: reader.decimal("precipitation_chance")?,
        precipitation_type: reader.text("precipitation_type")?,
        conditions: reader.text("conditions")?,
    })
}

/// AccuWeather hourly forecast entry or current conditions object.
///
/// Hourly entries carry `{Value, Unit}` pairs; current conditions nest the
/// value under `Imperial`/`Metric`.
pub(crate) fn accuweather(reader: &PayloadReader<'_>) -> Result<WeatherRecord, AcquisitionError> {
    let forecast_time = match reader.first_of(&[
        "DateTime",
        "LocalObservationDateTime",
        "EpochDateTime",
        "EpochTime",
    ]) {
        Some((path, value)) => Field::Present(reader.timestamp_value(path, value)?),
        None => Field::Missing,
    };

    let temperature_f = accuweather_measure(reader, "Temperature", |value, unit| match unit {
        "F" => Some(Some(value)),
        "C" => Some(celsius_to_fahrenheit(value)),
        _ => None,
    })?;

    let wind_speed_mph = accuweather_measure(reader, "Wind.Speed", |value, unit| {
        match unit.to_ascii_lowercase().as_str() {
            "mi/h" | "mph" => Some(Some(value)),
            "km/h" => Some(kmh_to_mph(value)),
            _ => None,
        }
    })?;

    let precipitation_type = match reader.text("PrecipitationType")? {
        Field::Present(kind) => Field::Present(kind.to_ascii_lowercase()),
        Field::Missing => Field::Missing,
    };

    Ok(WeatherRecord {
        forecast_time,
        temperature_f,
        wind_speed_mph,
        wind_direction: reader.text("Wind.Direction.English")?,
        humidity: reader.decimal("RelativeHumidity")?,
        precipitation_chance: reader.decimal("PrecipitationProbability")?,
        precipitation_type,
        conditions: match reader.first_of(&["IconPhrase", "WeatherText"]) {
            Some((path, _)) => reader.text(path)?,
            None => Field::Missing,
        },
    })
}

/// Read an AccuWeather measurement and convert it with `convert(value, unit)`.
///
/// `convert` returns `None` for an unknown unit and `Some(None)` when the
/// converted value is out of range.
fn accuweather_measure(
    reader: &PayloadReader<'_>,
    base: &str,
    convert: impl Fn(Decimal, &str) -> Option<Option<Decimal>>,
) -> Result<Field<Decimal>, AcquisitionError> {
    let candidates = [
        (format!("{}.Value", base), format!("{}.Unit", base)),
        (format!("{}.Imperial.Value", base), format!("{}.Imperial.Unit", base)),
        (format!("{}.Metric.Value", base), format!("{}.Metric.Unit", base)),
    ];

    for (value_path, unit_path) in candidates.iter() {
        let Field::Present(value) = reader.decimal(value_path)? else {
            continue;
        };
        let Field::Present(unit) = reader.text(unit_path)? else {
            return Err(reader.mismatch(unit_path, "a unit label"));
        };
        return match convert(value, &unit) {
            Some(Some(converted)) => Ok(Field::Present(converted)),
            Some(None) => Err(reader.mismatch(value_path, "a value in range")),
            None => Err(reader.mismatch(unit_path, "a supported unit")),
        };
    }

    Ok(Field::Missing)
}

/// OpenWeather forecast list item or current weather object.
pub(crate) fn openweather(
    reader: &PayloadReader<'_>,
    units: UnitSystem,
) -> Result<WeatherRecord, AcquisitionError> {
    let temperature_f = converted(reader, "main.temp", reader.decimal("main.temp")?, |temp| {
        match units {
            UnitSystem::Imperial => Some(temp),
            UnitSystem::Metric => celsius_to_fahrenheit(temp),
        }
    })?;

    let wind_speed_mph = converted(reader, "wind.speed", reader.decimal("wind.speed")?, |speed| {
        match units {
            UnitSystem::Imperial => Some(speed),
            UnitSystem::Metric => mps_to_mph(speed),
        }
    })?;

    let precipitation_chance = converted(reader, "pop", reader.decimal("pop")?, |pop| {
        pop.checked_mul(Decimal::ONE_HUNDRED).map(|percent| percent.round_dp(1))
    })?;

    Ok(WeatherRecord {
        forecast_time: reader.timestamp("dt")?,
        temperature_f,
        wind_speed_mph,
        wind_direction: compass(reader, "wind.deg")?,
        humidity: reader.decimal("main.humidity")?,
        precipitation_chance,
        precipitation_type: openweather_precipitation(reader)?,
        conditions: reader.text("weather.0.main")?,
    })
}

/// "rain" or "snow" when the payload reports a positive volume.
fn openweather_precipitation(reader: &PayloadReader<'_>) -> Result<Field<String>, AcquisitionError> {
    for kind in ["rain", "snow"] {
        for window in ["1h", "3h"] {
            let path = format!("{}.{}", kind, window);
            if let Field::Present(volume) = reader.decimal(&path)? {
                if volume > Decimal::ZERO {
                    return Ok(Field::Present(kind.to_string()));
                }
            }
        }
    }
    Ok(Field::Missing)
}

/// The forecast time of an AccuWeather or OpenWeather entry, used by the
/// adapters to pick the entry closest to kickoff.
pub(crate) fn entry_time(entry: &Value) -> Option<chrono::DateTime<chrono::Utc>> {
    let map = entry.as_object()?;
    let reader = PayloadReader::new("", map);
    let (path, value) = reader.first_of(&["DateTime", "LocalObservationDateTime", "dt", "EpochDateTime"])?;
    reader.timestamp_value(path, value).ok()
}
