//! League roster membership.

use std::collections::{HashMap, HashSet};

use crate::models::League;

/// Answers whether a team belongs to a league.
///
/// Implemented by an external collaborator (a roster service, a cached
/// schedule). Returning `None` means the source has no roster for that
/// league, and the membership rule is skipped.
pub trait RosterSource: Send + Sync {
    fn is_member(&self, league: League, team: &str) -> Option<bool>;
}

/// In-memory roster keyed by league. Team names compare case-insensitively.
#[derive(Clone, Debug, Default)]
pub struct StaticRoster {
    teams: HashMap<League, HashSet<String>>,
}

impl StaticRoster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a league's teams, merging with any already present.
    pub fn with_league<I, S>(mut self, league: League, teams: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.insert(league, teams);
        self
    }

    pub fn insert<I, S>(&mut self, league: League, teams: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.teams
            .entry(league)
            .or_default()
            .extend(teams.into_iter().map(|t| t.as_ref().trim().to_ascii_uppercase()));
    }
}

impl RosterSource for StaticRoster {
    fn is_member(&self, league: League, team: &str) -> Option<bool> {
        self.teams
            .get(&league)
            .map(|teams| teams.contains(&team.trim().to_ascii_uppercase()))
    }
}
