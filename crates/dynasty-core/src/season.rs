// Season assembly: one league's standings and weekly matchups combined into
// a single immutable record.

use std::fmt::Display;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::model::{DraftPick, League, Matchup, Standing, Transaction};

/// Everything known about one league-season.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonRecord {
    pub league: League,
    /// Sorted ascending by rank.
    pub standings: Vec<Standing>,
    pub matchups: Vec<Matchup>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub draft: Vec<DraftPick>,
    /// The rank-1 standing; absent for seasons with no standings yet.
    pub champion: Option<Standing>,
    /// Candidate weeks whose scoreboard could not be fetched or decoded.
    #[serde(default)]
    pub missing_weeks: Vec<u32>,
}

impl SeasonRecord {
    pub fn year(&self) -> u16 {
        self.league.season
    }

    pub fn runner_up(&self) -> Option<&Standing> {
        self.standings.iter().find(|s| s.rank == 2)
    }

    /// Standing for the given team name, if the team finished the season.
    pub fn standing_for_team(&self, team_name: &str) -> Option<&Standing> {
        self.standings.iter().find(|s| s.team_name == team_name)
    }
}

/// Combine one league's standings and matchups into a season record.
pub fn assemble_season(
    league: League,
    standings: Vec<Standing>,
    matchups: Vec<Matchup>,
) -> SeasonRecord {
    let mut builder = SeasonBuilder::new(league).standings(standings);
    builder.matchups = matchups;
    builder.finish()
}

/// Incremental assembly of a season from independently fetched parts.
///
/// Weeks are recorded one at a time as the caller fetches them; a week that
/// returned nothing is treated as not played, and a week that failed is
/// noted in `missing_weeks` without aborting the season.
#[derive(Debug, Clone)]
pub struct SeasonBuilder {
    league: League,
    standings: Vec<Standing>,
    matchups: Vec<Matchup>,
    transactions: Vec<Transaction>,
    draft: Vec<DraftPick>,
    missing_weeks: Vec<u32>,
}

impl SeasonBuilder {
    pub fn new(league: League) -> Self {
        SeasonBuilder {
            league,
            standings: Vec::new(),
            matchups: Vec::new(),
            transactions: Vec::new(),
            draft: Vec::new(),
            missing_weeks: Vec::new(),
        }
    }

    pub fn league(&self) -> &League {
        &self.league
    }

    /// Weeks to probe for matchups: 1 through the league's end week.
    pub fn candidate_weeks(&self) -> RangeInclusive<u32> {
        1..=self.league.last_week()
    }

    pub fn standings(mut self, mut standings: Vec<Standing>) -> Self {
        standings.sort_by_key(|s| s.rank);
        self.standings = standings;
        self
    }

    pub fn transactions(mut self, transactions: Vec<Transaction>) -> Self {
        self.transactions = transactions;
        self
    }

    pub fn draft(mut self, draft: Vec<DraftPick>) -> Self {
        self.draft = draft;
        self
    }

    /// Record the outcome of fetching one week's scoreboard.
    pub fn record_week<E: Display>(&mut self, week: u32, result: Result<Vec<Matchup>, E>) {
        match result {
            Ok(matchups) if matchups.is_empty() => {
                debug!(league = %self.league.league_key, week, "no matchups; week not played");
            }
            Ok(matchups) => self.matchups.extend(matchups),
            Err(e) => {
                warn!(
                    "week {week} of {} ({}) unavailable: {e}",
                    self.league.name, self.league.season
                );
                self.missing_weeks.push(week);
            }
        }
    }

    pub fn finish(self) -> SeasonRecord {
        let champion = self.standings.iter().find(|s| s.rank == 1).cloned();
        SeasonRecord {
            league: self.league,
            standings: self.standings,
            matchups: self.matchups,
            transactions: self.transactions,
            draft: self.draft,
            champion,
            missing_weeks: self.missing_weeks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MatchupSide;

    fn league(end_week: Option<u32>) -> League {
        League {
            league_key: "423.l.1".into(),
            league_id: 1,
            name: "Dynasty".into(),
            season: 2024,
            num_teams: 2,
            scoring_type: "head".into(),
            start_week: Some(1),
            current_week: None,
            end_week,
            is_finished: true,
        }
    }

    fn standing(team: &str, rank: u32) -> Standing {
        Standing {
            team_key: format!("key.{team}"),
            team_name: team.into(),
            manager_name: format!("{team} manager"),
            rank,
            wins: 0,
            losses: 0,
            ties: 0,
            percentage: 0.0,
            points_for: 0.0,
            points_against: 0.0,
            playoff_seed: None,
        }
    }

    fn matchup(week: u32) -> Matchup {
        let side = |name: &str, points: f64| MatchupSide {
            team_key: format!("key.{name}"),
            team_name: name.into(),
            points,
        };
        Matchup {
            week,
            teams: [side("X", 100.0), side("Y", 90.0)],
            is_playoffs: false,
            is_consolation: false,
            is_tied: false,
            winner_team_key: None,
        }
    }

    #[test]
    fn champion_is_rank_one() {
        let season = assemble_season(
            league(None),
            vec![standing("Y", 2), standing("X", 1)],
            vec![],
        );
        assert_eq!(season.champion.as_ref().map(|c| c.team_name.as_str()), Some("X"));
        assert_eq!(season.runner_up().map(|s| s.team_name.as_str()), Some("Y"));
        assert_eq!(season.standings[0].rank, 1);
    }

    #[test]
    fn empty_standings_have_no_champion() {
        let season = assemble_season(league(None), vec![], vec![matchup(1)]);
        assert!(season.champion.is_none());
        assert!(season.runner_up().is_none());
        assert_eq!(season.matchups.len(), 1);
    }

    #[test]
    fn candidate_weeks_follow_end_week() {
        assert_eq!(SeasonBuilder::new(league(None)).candidate_weeks(), 1..=17);
        assert_eq!(SeasonBuilder::new(league(Some(14))).candidate_weeks(), 1..=14);
    }

    #[test]
    fn failed_week_is_omitted_and_recorded() {
        let mut builder = SeasonBuilder::new(league(Some(16))).standings(vec![standing("X", 1)]);
        for week in builder.candidate_weeks() {
            let result: Result<Vec<Matchup>, String> = match week {
                14 => Err("HTTP 500".into()),
                16 => Ok(vec![]),
                w => Ok(vec![matchup(w)]),
            };
            builder.record_week(week, result);
        }
        let season = builder.finish();
        let weeks: Vec<u32> = season.matchups.iter().map(|m| m.week).collect();
        assert_eq!(weeks.len(), 14);
        assert!(!weeks.contains(&14));
        assert!(!weeks.contains(&16));
        assert!(weeks.contains(&15));
        assert_eq!(season.missing_weeks, vec![14]);
        assert!(season.champion.is_some());
    }
}
