//! Command-line arguments.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use sideline_acquisition::{
    AcquisitionRequest, ForecastRequest, GameRequest, League, OddsRequest, ValidationMode,
};

/// Sideline - fetch betting lines, game results and venue weather.
#[derive(Debug, Parser)]
#[command(name = "sideline")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// JSON configuration file
    #[arg(short, long, env = "SIDELINE_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Validation mode (strict or non_strict); overrides the configuration
    #[arg(short, long, global = true)]
    pub mode: Option<ValidationMode>,

    /// Serve requests from a file of canonical raw records
    #[arg(long, global = true)]
    pub replay: Option<PathBuf>,

    /// Pretty-print the JSON result
    #[arg(long, global = true)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Requests.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Current betting lines
    Odds {
        /// League (NFL or NCAAF)
        league: League,
    },

    /// Game schedule and scores
    Games {
        /// League (NFL or NCAAF)
        league: League,

        /// Week number
        #[arg(short, long)]
        week: Option<u32>,
    },

    /// Weather at a venue around kickoff
    Forecast {
        /// City name (e.g., "Green Bay")
        city: String,

        /// State abbreviation (e.g., WI)
        state: String,

        /// Kickoff time, RFC 3339 (e.g., 2024-12-01T18:00:00Z)
        #[arg(short, long)]
        at: DateTime<Utc>,
    },
}

impl Command {
    pub fn request(&self) -> AcquisitionRequest {
        match self {
            Command::Odds { league } => OddsRequest { league: *league }.into(),
            Command::Games { league, week } => GameRequest {
                league: *league,
                week: *week,
            }
            .into(),
            Command::Forecast { city, state, at } => ForecastRequest {
                city: city.clone(),
                state: state.to_ascii_uppercase(),
                at_time: *at,
            }
            .into(),
        }
    }
}
