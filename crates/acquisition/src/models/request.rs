//! Typed acquisition requests.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{League, RequestKind};

/// Current betting lines for a league.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OddsRequest {
    pub league: League,
}

/// Game schedule and scores for a league, optionally narrowed to one week.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRequest {
    pub league: League,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub week: Option<u32>,
}

/// Weather at a venue around kickoff.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastRequest {
    pub city: String,
    /// State abbreviation (e.g., "WI").
    pub state: String,
    pub at_time: DateTime<Utc>,
}

/// Any request the coordinator accepts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AcquisitionRequest {
    Odds(OddsRequest),
    Games(GameRequest),
    Forecast(ForecastRequest),
}

impl AcquisitionRequest {
    pub fn kind(&self) -> RequestKind {
        match self {
            AcquisitionRequest::Odds(_) => RequestKind::Odds,
            AcquisitionRequest::Games(_) => RequestKind::Games,
            AcquisitionRequest::Forecast(_) => RequestKind::Forecast,
        }
    }

    pub fn league(&self) -> Option<League> {
        match self {
            AcquisitionRequest::Odds(r) => Some(r.league),
            AcquisitionRequest::Games(r) => Some(r.league),
            AcquisitionRequest::Forecast(_) => None,
        }
    }
}

impl fmt::Display for AcquisitionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AcquisitionRequest::Odds(r) => write!(f, "{} odds", r.league),
            AcquisitionRequest::Games(r) => match r.week {
                Some(week) => write!(f, "{} games week {}", r.league, week),
                None => write!(f, "{} games", r.league),
            },
            AcquisitionRequest::Forecast(r) => {
                write!(f, "forecast {}, {} at {}", r.city, r.state, r.at_time.to_rfc3339())
            }
        }
    }
}

impl From<OddsRequest> for AcquisitionRequest {
    fn from(request: OddsRequest) -> Self {
        AcquisitionRequest::Odds(request)
    }
}

impl From<GameRequest> for AcquisitionRequest {
    fn from(request: GameRequest) -> Self {
        AcquisitionRequest::Games(request)
    }
}

impl From<ForecastRequest> for AcquisitionRequest {
    fn from(request: ForecastRequest) -> Self {
        AcquisitionRequest::Forecast(request)
    }
}
