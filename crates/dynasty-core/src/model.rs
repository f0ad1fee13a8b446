// Normalized league entities produced by the decoder.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Last week assumed for a league whose metadata carries no `end_week`.
pub const DEFAULT_END_WEEK: u32 = 17;

// ---------------------------------------------------------------------------
// League
// ---------------------------------------------------------------------------

/// One season's instance of a league, as listed by the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct League {
    /// Provider key, e.g. "423.l.12345".
    pub league_key: String,
    pub league_id: u64,
    /// Display name. Leagues sharing it across seasons form a lineage.
    pub name: String,
    pub season: u16,
    pub num_teams: u32,
    pub scoring_type: String,
    #[serde(default)]
    pub start_week: Option<u32>,
    #[serde(default)]
    pub current_week: Option<u32>,
    #[serde(default)]
    pub end_week: Option<u32>,
    #[serde(default)]
    pub is_finished: bool,
}

impl League {
    /// Final week to probe for matchups.
    pub fn last_week(&self) -> u32 {
        self.end_week.unwrap_or(DEFAULT_END_WEEK)
    }

    /// Number of teams counted as playoff teams.
    ///
    /// Heuristic: the top half of the league (rounded up). This is not the
    /// provider's configured bracket size, which older seasons do not expose.
    pub fn playoff_cutoff(&self) -> u32 {
        self.num_teams.div_ceil(2)
    }
}

// ---------------------------------------------------------------------------
// Standings
// ---------------------------------------------------------------------------

/// A team's final result for one season.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Standing {
    pub team_key: String,
    pub team_name: String,
    /// Manager nickname, "Unknown" when the provider omitted it.
    pub manager_name: String,
    /// Final rank, 1 = champion.
    pub rank: u32,
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    /// Win fraction as reported by the provider.
    pub percentage: f64,
    pub points_for: f64,
    pub points_against: f64,
    #[serde(default)]
    pub playoff_seed: Option<u32>,
}

// ---------------------------------------------------------------------------
// Matchups
// ---------------------------------------------------------------------------

/// One team's half of a weekly matchup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchupSide {
    pub team_key: String,
    pub team_name: String,
    pub points: f64,
}

/// A single week's head-to-head game. Always exactly two sides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matchup {
    pub week: u32,
    pub teams: [MatchupSide; 2],
    pub is_playoffs: bool,
    pub is_consolation: bool,
    #[serde(default)]
    pub is_tied: bool,
    /// Winner as recorded by the provider, if any.
    #[serde(default)]
    pub winner_team_key: Option<String>,
}

impl Matchup {
    /// Sides belonging to the named team (normally zero or one).
    pub fn sides_for<'a>(&'a self, team_name: &'a str) -> impl Iterator<Item = &'a MatchupSide> {
        self.teams.iter().filter(move |side| side.team_name == team_name)
    }

    /// Whether the provider's tie flag or winner key contradicts the points.
    /// A missing winner key is not a contradiction.
    pub fn result_conflicts_with_points(&self) -> bool {
        let [a, b] = &self.teams;
        let points_winner = if a.points > b.points {
            Some(a.team_key.as_str())
        } else if b.points > a.points {
            Some(b.team_key.as_str())
        } else {
            None
        };
        if self.is_tied && points_winner.is_some() {
            return true;
        }
        match (self.winner_team_key.as_deref(), points_winner) {
            (Some(recorded), Some(scored)) => recorded != scored,
            (Some(_), None) => true,
            (None, _) => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Transactions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionKind {
    Add,
    Drop,
    AddDrop,
    Trade,
    Commish,
    Other(String),
}

impl TransactionKind {
    pub fn from_provider(s: &str) -> Self {
        match s {
            "add" => TransactionKind::Add,
            "drop" => TransactionKind::Drop,
            "add/drop" => TransactionKind::AddDrop,
            "trade" => TransactionKind::Trade,
            "commish" => TransactionKind::Commish,
            other => TransactionKind::Other(other.to_string()),
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionKind::Add => f.write_str("add"),
            TransactionKind::Drop => f.write_str("drop"),
            TransactionKind::AddDrop => f.write_str("add/drop"),
            TransactionKind::Trade => f.write_str("trade"),
            TransactionKind::Commish => f.write_str("commish"),
            TransactionKind::Other(s) => f.write_str(s),
        }
    }
}

/// A player moved by a transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionPlayer {
    pub player_key: String,
    pub name: String,
    /// Movement type for this player ("add", "drop", "trade").
    pub movement: String,
    #[serde(default)]
    pub source_team_key: Option<String>,
    #[serde(default)]
    pub destination_team_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub transaction_key: String,
    pub kind: TransactionKind,
    pub status: String,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub players: Vec<TransactionPlayer>,
    /// For trades: the proposing and receiving teams.
    #[serde(default)]
    pub trader_team_key: Option<String>,
    #[serde(default)]
    pub tradee_team_key: Option<String>,
}

impl Transaction {
    /// Distinct team keys touched by this transaction, in first-seen order.
    pub fn team_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = Vec::new();
        let candidates = self
            .trader_team_key
            .iter()
            .chain(self.tradee_team_key.iter())
            .chain(self.players.iter().flat_map(|p| {
                p.source_team_key.iter().chain(p.destination_team_key.iter())
            }));
        for key in candidates {
            if !keys.contains(&key.as_str()) {
                keys.push(key.as_str());
            }
        }
        keys
    }
}

// ---------------------------------------------------------------------------
// Draft
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftPick {
    /// Overall pick number (1-indexed).
    pub pick: u32,
    pub round: u32,
    pub team_key: String,
    pub player_key: String,
    /// Auction cost, absent for snake drafts.
    #[serde(default)]
    pub cost: Option<u32>,
}
