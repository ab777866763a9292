//! Record admission.
//!
//! Applies domain rules to normalized records and turns the findings into
//! a [`ValidationVerdict`]:
//! - Range rules (spread, total, temperature, wind, scores, odds, percentages)
//! - Completeness rules (required fields per record kind)
//! - Domain-membership rules (league week ranges, team identity, rosters)
//!
//! Every rule runs; a verdict carries all of the reasons at once.

mod roster;

pub use roster::{RosterSource, StaticRoster};

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;
use std::sync::Arc;

use log::warn;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{Field, GameRecord, League, NormalizedRecord, OddsRecord, RecordData, WeatherRecord};

/// Union of every supported league's week numbers.
const ANY_LEAGUE_WEEKS: RangeInclusive<i64> = 0..=22;

/// Admission policy for records that fail a rule.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMode {
    /// Failing records are rejected.
    #[default]
    Strict,
    /// Failing records are passed through with warnings.
    NonStrict,
}

impl fmt::Display for ValidationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationMode::Strict => f.write_str("strict"),
            ValidationMode::NonStrict => f.write_str("non_strict"),
        }
    }
}

impl FromStr for ValidationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "strict" => Ok(ValidationMode::Strict),
            "non_strict" | "nonstrict" | "lenient" => Ok(ValidationMode::NonStrict),
            other => Err(format!("unknown validation mode '{}'", other)),
        }
    }
}

/// Rule families. Failures are data, never errors.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleFamily {
    Range,
    Completeness,
    DomainMembership,
}

/// One failing rule.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ValidationIssue {
    pub family: RuleFamily,
    pub message: String,
}

impl ValidationIssue {
    fn range(message: String) -> Self {
        Self {
            family: RuleFamily::Range,
            message,
        }
    }

    fn completeness(field: &str) -> Self {
        Self {
            family: RuleFamily::Completeness,
            message: format!("missing required field: {}", field),
        }
    }

    fn membership(message: String) -> Self {
        Self {
            family: RuleFamily::DomainMembership,
            message,
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Outcome of validating one record.
#[derive(Clone, Debug, PartialEq)]
pub enum ValidationVerdict {
    /// No rule failed.
    Accepted(NormalizedRecord),
    /// Non-strict mode: rules failed, the record is kept, unchanged, with warnings.
    Quarantined(NormalizedRecord, Vec<String>),
    /// Strict mode: rules failed and the record is dropped.
    Rejected(Vec<String>),
}

impl ValidationVerdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, ValidationVerdict::Accepted(_))
    }

    /// The record, unless it was rejected.
    pub fn record(&self) -> Option<&NormalizedRecord> {
        match self {
            ValidationVerdict::Accepted(record) | ValidationVerdict::Quarantined(record, _) => {
                Some(record)
            }
            ValidationVerdict::Rejected(_) => None,
        }
    }

    /// Warnings or rejection reasons; empty when accepted.
    pub fn reasons(&self) -> &[String] {
        match self {
            ValidationVerdict::Accepted(_) => &[],
            ValidationVerdict::Quarantined(_, reasons) | ValidationVerdict::Rejected(reasons) => {
                reasons
            }
        }
    }
}

/// Inclusive numeric bounds.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Bounds {
    pub min: Decimal,
    pub max: Decimal,
}

impl Bounds {
    pub fn new(min: Decimal, max: Decimal) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: Decimal) -> bool {
        value >= self.min && value <= self.max
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{}]", self.min, self.max)
    }
}

/// Rule thresholds.
#[derive(Clone, Debug)]
pub struct ValidatorConfig {
    /// Point spread.
    pub spread: Bounds,
    /// Over/under.
    pub total: Bounds,
    /// Temperature in °F.
    pub temperature_f: Bounds,
    /// Wind speed in mph.
    pub wind_speed_mph: Bounds,
    /// Humidity and precipitation chance.
    pub percent: Bounds,
    /// Final or in-progress scores.
    pub score: Bounds,
    /// Largest absolute American odds value accepted.
    pub max_american_odds: i64,
    /// Shortest accepted team identifier.
    pub min_team_len: usize,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            spread: Bounds::new(Decimal::from(-50), Decimal::from(50)),
            total: Bounds::new(Decimal::from(20), Decimal::from(100)),
            temperature_f: Bounds::new(Decimal::from(-50), Decimal::from(150)),
            wind_speed_mph: Bounds::new(Decimal::ZERO, Decimal::from(100)),
            percent: Bounds::new(Decimal::ZERO, Decimal::ONE_HUNDRED),
            score: Bounds::new(Decimal::ZERO, Decimal::from(150)),
            max_american_odds: 10_000,
            min_team_len: 2,
        }
    }
}

/// Normalized record validator.
///
/// Pure with respect to the record: validating never changes it, so a
/// record that was accepted once is accepted again with identical content.
#[derive(Clone, Default)]
pub struct Validator {
    config: ValidatorConfig,
    roster: Option<Arc<dyn RosterSource>>,
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("config", &self.config)
            .field("roster", &self.roster.is_some())
            .finish()
    }
}

impl Validator {
    /// Create a validator with the default thresholds and no roster.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ValidatorConfig) -> Self {
        Self {
            config,
            roster: None,
        }
    }

    /// Install a roster source. Without one, roster membership is not checked.
    pub fn with_roster(mut self, roster: Arc<dyn RosterSource>) -> Self {
        self.roster = Some(roster);
        self
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Every failing rule for `record`, in rule order.
    pub fn issues(&self, record: &NormalizedRecord) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        match record.data() {
            RecordData::Odds(odds) => {
                self.validate_odds_completeness(odds, &mut issues);
                self.validate_odds_ranges(odds, &mut issues);
                self.validate_teams(
                    &odds.league,
                    [("away_team", &odds.away_team), ("home_team", &odds.home_team)],
                    &mut issues,
                );
            }
            RecordData::Game(game) => {
                self.validate_game_completeness(game, &mut issues);
                self.validate_scores(game, &mut issues);
                self.validate_week(game, &mut issues);
                self.validate_teams(
                    &game.league,
                    [("away_team", &game.away_team), ("home_team", &game.home_team)],
                    &mut issues,
                );
            }
            RecordData::Weather(weather) => {
                self.validate_weather_completeness(weather, &mut issues);
                self.validate_weather_ranges(weather, &mut issues);
            }
        }

        issues
    }

    /// Classify `record` under `mode`.
    pub fn validate(&self, record: NormalizedRecord, mode: ValidationMode) -> ValidationVerdict {
        let issues = self.issues(&record);
        if issues.is_empty() {
            return ValidationVerdict::Accepted(record);
        }

        let reasons: Vec<String> = issues.into_iter().map(|issue| issue.message).collect();
        match mode {
            ValidationMode::Strict => {
                warn!(
                    "Rejected {} record from '{}': {}",
                    record.kind(),
                    record.source(),
                    reasons.join("; ")
                );
                ValidationVerdict::Rejected(reasons)
            }
            ValidationMode::NonStrict => {
                warn!(
                    "Quarantined {} record from '{}': {}",
                    record.kind(),
                    record.source(),
                    reasons.join("; ")
                );
                ValidationVerdict::Quarantined(record, reasons)
            }
        }
    }

    fn validate_odds_completeness(&self, odds: &OddsRecord, issues: &mut Vec<ValidationIssue>) {
        require("away_team", odds.away_team.is_present(), issues);
        require("home_team", odds.home_team.is_present(), issues);
        require("spread", odds.spread.is_present(), issues);
        require("total", odds.total.is_present(), issues);
    }

    fn validate_game_completeness(&self, game: &GameRecord, issues: &mut Vec<ValidationIssue>) {
        require("game_id", game.game_id.is_present(), issues);
        require("home_team", game.home_team.is_present(), issues);
        require("away_team", game.away_team.is_present(), issues);
        require("week", game.week.is_present(), issues);
    }

    fn validate_weather_completeness(&self, weather: &WeatherRecord, issues: &mut Vec<ValidationIssue>) {
        require("temperature_f", weather.temperature_f.is_present(), issues);
        require("wind_speed_mph", weather.wind_speed_mph.is_present(), issues);
    }

    fn validate_odds_ranges(&self, odds: &OddsRecord, issues: &mut Vec<ValidationIssue>) {
        check_range("spread", &odds.spread, &self.config.spread, issues);
        check_range("total", &odds.total, &self.config.total, issues);

        for (name, value) in [
            ("spread_odds", &odds.spread_odds),
            ("total_odds", &odds.total_odds),
            ("moneyline_home", &odds.moneyline_home),
            ("moneyline_away", &odds.moneyline_away),
        ] {
            let Some(american) = value.value() else {
                continue;
            };
            if american == 0 || american.unsigned_abs() > self.config.max_american_odds.unsigned_abs() {
                issues.push(ValidationIssue::range(format!(
                    "{} {} is not valid American odds (non-zero, within ±{})",
                    name, american, self.config.max_american_odds
                )));
            }
        }
    }

    fn validate_weather_ranges(&self, weather: &WeatherRecord, issues: &mut Vec<ValidationIssue>) {
        check_range("temperature_f", &weather.temperature_f, &self.config.temperature_f, issues);
        check_range("wind_speed_mph", &weather.wind_speed_mph, &self.config.wind_speed_mph, issues);
        check_range("humidity", &weather.humidity, &self.config.percent, issues);
        check_range(
            "precipitation_chance",
            &weather.precipitation_chance,
            &self.config.percent,
            issues,
        );
    }

    fn validate_scores(&self, game: &GameRecord, issues: &mut Vec<ValidationIssue>) {
        for (name, score) in [("home_score", &game.home_score), ("away_score", &game.away_score)] {
            check_range(name, &score.clone().map(Decimal::from), &self.config.score, issues);
        }
    }

    /// Week number must fall in the league's season. Without a league, any
    /// supported league's season is accepted.
    fn validate_week(&self, game: &GameRecord, issues: &mut Vec<ValidationIssue>) {
        let Some(week) = game.week.value() else {
            return;
        };

        let (label, range) = match game.league.value() {
            Some(league) => (league.as_str(), league.week_range()),
            None => ("any league", ANY_LEAGUE_WEEKS),
        };
        if !range.contains(&week) {
            issues.push(ValidationIssue::membership(format!(
                "week {} not in {} range [{},{}]",
                week,
                label,
                range.start(),
                range.end()
            )));
        }
    }

    /// Team identifiers must be long enough to be real, and on the league
    /// roster when one is installed.
    fn validate_teams(
        &self,
        league: &Field<League>,
        teams: [(&str, &Field<String>); 2],
        issues: &mut Vec<ValidationIssue>,
    ) {
        for (name, team) in teams {
            let Some(team) = team.as_ref() else {
                continue;
            };

            if team.trim().chars().count() < self.config.min_team_len {
                issues.push(ValidationIssue::membership(format!(
                    "{} '{}' is not a valid team identifier",
                    name, team
                )));
                continue;
            }

            let (Some(roster), Some(league)) = (self.roster.as_ref(), league.value()) else {
                continue;
            };
            if roster.is_member(league, team) == Some(false) {
                issues.push(ValidationIssue::membership(format!(
                    "{} '{}' is not on the {} roster",
                    name, team, league
                )));
            }
        }
    }
}

fn require(field: &str, present: bool, issues: &mut Vec<ValidationIssue>) {
    if !present {
        issues.push(ValidationIssue::completeness(field));
    }
}

fn check_range(name: &str, value: &Field<Decimal>, bounds: &Bounds, issues: &mut Vec<ValidationIssue>) {
    if let Some(value) = value.value() {
        if !bounds.contains(value) {
            issues.push(ValidationIssue::range(format!("{} out of range {}", name, bounds)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GameStatus, RecordData};
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use std::borrow::Cow;

    fn wrap(source: &'static str, data: RecordData) -> NormalizedRecord {
        NormalizedRecord::new(Cow::Borrowed(source), Utc::now(), data)
    }

    fn odds(spread: Decimal) -> NormalizedRecord {
        wrap("action_network", RecordData::Odds(odds_data(spread)))
    }

    fn odds_data(spread: Decimal) -> OddsRecord {
        OddsRecord {
            league: Field::Present(League::Nfl),
            away_team: Field::Present("BUF".to_string()),
            home_team: Field::Present("KC".to_string()),
            game_time: Field::Present("Sun 4:25 PM".to_string()),
            away_rotation: Field::Missing,
            home_rotation: Field::Missing,
            spread: Field::Present(spread),
            spread_odds: Field::Present(-110),
            total: Field::Present(dec!(47.5)),
            total_odds: Field::Present(-110),
            moneyline_home: Field::Present(-135),
            moneyline_away: Field::Present(115),
            sportsbook: Field::Present("DraftKings".to_string()),
        }
    }

    fn weather(temperature_f: Field<Decimal>, wind_speed_mph: Field<Decimal>) -> NormalizedRecord {
        NormalizedRecord::new(
            Cow::Borrowed("accuweather"),
            Utc::now(),
            RecordData::Weather(WeatherRecord {
                forecast_time: Field::Present(Utc::now()),
                temperature_f,
                wind_speed_mph,
                wind_direction: Field::Present("NW".to_string()),
                humidity: Field::Present(dec!(55)),
                precipitation_chance: Field::Present(dec!(10)),
                precipitation_type: Field::Missing,
                conditions: Field::Present("Cloudy".to_string()),
            }),
        )
    }

    fn game(league: League, week: i64) -> NormalizedRecord {
        wrap("overtime", RecordData::Game(game_data(league, week)))
    }

    fn game_data(league: League, week: i64) -> GameRecord {
        GameRecord {
            game_id: Field::Present("401547000".to_string()),
            league: Field::Present(league),
            week: Field::Present(week),
            home_team: Field::Present("KC".to_string()),
            away_team: Field::Present("BUF".to_string()),
            home_score: Field::Present(27),
            away_score: Field::Present(24),
            status: Field::Present(GameStatus::Final),
            game_date: Field::Missing,
        }
    }

    #[test]
    fn test_out_of_range_spread_strict_is_rejected() {
        let validator = Validator::new();
        let verdict = validator.validate(odds(dec!(62)), ValidationMode::Strict);

        assert_eq!(
            verdict,
            ValidationVerdict::Rejected(vec!["spread out of range [-50,50]".to_string()])
        );
    }

    #[test]
    fn test_out_of_range_spread_non_strict_is_quarantined_unchanged() {
        let validator = Validator::new();
        let record = odds(dec!(62));
        let verdict = validator.validate(record.clone(), ValidationMode::NonStrict);

        match verdict {
            ValidationVerdict::Quarantined(kept, warnings) => {
                assert_eq!(kept, record);
                assert_eq!(warnings, vec!["spread out of range [-50,50]".to_string()]);
            }
            other => panic!("expected quarantine, got {:?}", other),
        }
    }

    #[test]
    fn test_mild_weather_accepted_in_both_modes() {
        let validator = Validator::new();
        let record = weather(Field::Present(dec!(40)), Field::Present(dec!(12)));

        for mode in [ValidationMode::Strict, ValidationMode::NonStrict] {
            assert_eq!(
                validator.validate(record.clone(), mode),
                ValidationVerdict::Accepted(record.clone())
            );
        }
    }

    #[test]
    fn test_rules_are_not_short_circuited() {
        let validator = Validator::new();
        let record = weather(Field::Missing, Field::Present(dec!(130)));

        let issues = validator.issues(&record);
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].family, RuleFamily::Completeness);
        assert_eq!(issues[0].message, "missing required field: temperature_f");
        assert_eq!(issues[1].family, RuleFamily::Range);
        assert_eq!(issues[1].message, "wind_speed_mph out of range [0,100]");
    }

    #[test]
    fn test_validation_is_idempotent() {
        let validator = Validator::new();
        let record = odds(dec!(-3.5));

        let first = validator.validate(record.clone(), ValidationMode::Strict);
        let ValidationVerdict::Accepted(accepted) = first else {
            panic!("expected accepted");
        };
        let second = validator.validate(accepted.clone(), ValidationMode::Strict);
        assert_eq!(second, ValidationVerdict::Accepted(record));
    }

    #[test]
    fn test_week_membership_per_league() {
        let validator = Validator::new();

        assert!(validator.issues(&game(League::Nfl, 22)).is_empty());
        assert!(validator.issues(&game(League::Ncaaf, 0)).is_empty());

        let issues = validator.issues(&game(League::Nfl, 0));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].family, RuleFamily::DomainMembership);
        assert_eq!(issues[0].message, "week 0 not in NFL range [1,22]");

        let issues = validator.issues(&game(League::Ncaaf, 17));
        assert_eq!(issues[0].message, "week 17 not in NCAAF range [0,16]");
    }

    #[test]
    fn test_invalid_american_odds() {
        let validator = Validator::new();
        let mut data = odds_data(dec!(3));
        data.moneyline_home = Field::Present(0);
        data.total_odds = Field::Present(-25_000);
        let record = wrap("action_network", RecordData::Odds(data));

        let issues = validator.issues(&record);
        assert_eq!(issues.len(), 2);
        assert!(issues.iter().all(|i| i.family == RuleFamily::Range));
        assert!(issues[0].message.starts_with("total_odds -25000"));
        assert!(issues[1].message.starts_with("moneyline_home 0"));
    }

    #[test]
    fn test_extreme_american_odds_are_range_issues() {
        let validator = Validator::new();
        let mut data = odds_data(dec!(3));
        data.moneyline_home = Field::Present(i64::MIN);
        data.moneyline_away = Field::Present(i64::MAX);
        let record = wrap("action_network", RecordData::Odds(data));

        let issues = validator.issues(&record);
        assert_eq!(issues.len(), 2);
        assert!(issues.iter().all(|i| i.family == RuleFamily::Range));
        assert!(issues[0].message.starts_with("moneyline_home -9223372036854775808"));
        assert!(matches!(
            validator.validate(record, ValidationMode::Strict),
            ValidationVerdict::Rejected(_)
        ));
    }

    #[test]
    fn test_short_team_identifier() {
        let validator = Validator::new();
        let mut data = game_data(League::Nfl, 5);
        data.home_team = Field::Present("K".to_string());
        let record = wrap("overtime", RecordData::Game(data));

        let issues = validator.issues(&record);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].message, "home_team 'K' is not a valid team identifier");
    }

    #[test]
    fn test_roster_membership() {
        let roster = StaticRoster::new().with_league(League::Nfl, ["KC", "BUF"]);
        let validator = Validator::new().with_roster(Arc::new(roster));

        assert!(validator.issues(&game(League::Nfl, 3)).is_empty());

        // No NCAAF roster installed, so membership is not checked.
        assert!(validator.issues(&game(League::Ncaaf, 3)).is_empty());

        let mut data = game_data(League::Nfl, 3);
        data.away_team = Field::Present("OSU".to_string());
        let record = wrap("overtime", RecordData::Game(data));
        let issues = validator.issues(&record);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].message, "away_team 'OSU' is not on the NFL roster");
    }

    #[test]
    fn test_score_range() {
        let validator = Validator::new();
        let mut data = game_data(League::Nfl, 3);
        data.home_score = Field::Present(-1);
        let record = wrap("overtime", RecordData::Game(data));

        let issues = validator.issues(&record);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].message, "home_score out of range [0,150]");
    }

    #[test]
    fn test_validation_mode_parsing() {
        assert_eq!("strict".parse::<ValidationMode>(), Ok(ValidationMode::Strict));
        assert_eq!("non-strict".parse::<ValidationMode>(), Ok(ValidationMode::NonStrict));
        assert_eq!("NON_STRICT".parse::<ValidationMode>(), Ok(ValidationMode::NonStrict));
        assert!("loose".parse::<ValidationMode>().is_err());
    }
}
