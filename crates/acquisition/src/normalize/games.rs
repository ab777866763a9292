//! Game payload mappings.

use super::fields::PayloadReader;
use crate::errors::AcquisitionError;
use crate::models::{Field, GameRecord, GameStatus};

/// Map a game object. Overtime nests teams as `{abbreviation, name}`;
/// canonical rows use plain strings. Both are accepted.
pub(crate) fn game(reader: &PayloadReader<'_>) -> Result<GameRecord, AcquisitionError> {
    let status = match reader.text("status")? {
        Field::Missing => Field::Missing,
        Field::Present(label) => GameStatus::parse(&label)
            .map(Field::Present)
            .ok_or_else(|| reader.mismatch("status", "a known game status"))?,
    };

    Ok(GameRecord {
        game_id: reader.text("game_id")?,
        league: reader.league("league")?,
        week: reader.integer("week")?,
        home_team: reader.team("home_team")?,
        away_team: reader.team("away_team")?,
        home_score: reader.integer("home_score")?,
        away_score: reader.integer("away_score")?,
        status,
        game_date: reader.timestamp("game_date")?,
    })
}
