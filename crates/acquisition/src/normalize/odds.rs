//! Odds payload mappings.

use super::fields::PayloadReader;
use crate::errors::AcquisitionError;
use crate::models::{Field, OddsRecord};

/// Map an odds row. Action Network rows and canonical rows share field
/// names except for the total, which Action Network calls `over_under`.
pub(crate) fn odds(reader: &PayloadReader<'_>) -> Result<OddsRecord, AcquisitionError> {
    let total = match reader.first_of(&["total", "over_under"]) {
        Some((path, value)) => Field::Present(reader.decimal_value(path, value)?),
        None => Field::Missing,
    };

    Ok(OddsRecord {
        league: reader.league("league")?,
        away_team: reader.team("away_team")?,
        home_team: reader.team("home_team")?,
        game_time: reader.text("game_time")?,
        away_rotation: reader.text("away_rotation")?,
        home_rotation: reader.text("home_rotation")?,
        spread: reader.decimal("spread")?,
        spread_odds: reader.integer("spread_odds")?,
        total,
        total_odds: reader.integer("total_odds")?,
        moneyline_home: reader.integer("moneyline_home")?,
        moneyline_away: reader.integer("moneyline_away")?,
        sportsbook: reader.text("sportsbook")?,
    })
}
