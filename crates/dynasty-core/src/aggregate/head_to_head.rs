// Pairwise head-to-head records between manager identities.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::identity::ManagerId;
use crate::season::SeasonRecord;

/// Results from one manager's perspective against one opponent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
}

impl Record {
    pub fn games(&self) -> u32 {
        self.wins + self.losses + self.ties
    }

    pub fn win_percentage(&self) -> f64 {
        match self.games() {
            0 => 0.0,
            games => (self.wins as f64 + 0.5 * self.ties as f64) / games as f64,
        }
    }

    /// The same games seen from the opponent's side.
    pub fn mirrored(&self) -> Record {
        Record {
            wins: self.losses,
            losses: self.wins,
            ties: self.ties,
        }
    }
}

/// Symmetric ledger: `get(a, b)` is always `get(b, a)` mirrored.
/// Pairs that never met are absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeadToHeadLedger {
    records: BTreeMap<ManagerId, BTreeMap<ManagerId, Record>>,
}

impl HeadToHeadLedger {
    pub fn get(&self, manager: &ManagerId, opponent: &ManagerId) -> Option<&Record> {
        self.records.get(manager)?.get(opponent)
    }

    /// Every opponent `manager` has faced, ordered by id.
    pub fn opponents(&self, manager: &ManagerId) -> impl Iterator<Item = (&ManagerId, &Record)> {
        self.records.get(manager).into_iter().flatten()
    }

    pub fn managers(&self) -> impl Iterator<Item = &ManagerId> {
        self.records.keys()
    }

    /// Each unordered pair once, from the perspective of the smaller id.
    pub fn pairs(&self) -> impl Iterator<Item = (&ManagerId, &ManagerId, &Record)> {
        self.records.iter().flat_map(|(a, row)| {
            row.iter()
                .filter(move |(b, _)| a < *b)
                .map(move |(b, record)| (a, b, record))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn entry(&mut self, manager: &ManagerId, opponent: &ManagerId) -> &mut Record {
        self.records
            .entry(manager.clone())
            .or_default()
            .entry(opponent.clone())
            .or_default()
    }

    fn record_game(&mut self, a: &ManagerId, a_points: f64, b: &ManagerId, b_points: f64) {
        if a_points > b_points {
            self.entry(a, b).wins += 1;
            self.entry(b, a).losses += 1;
        } else if b_points > a_points {
            self.entry(b, a).wins += 1;
            self.entry(a, b).losses += 1;
        } else {
            self.entry(a, b).ties += 1;
            self.entry(b, a).ties += 1;
        }
    }
}

/// Build the head-to-head ledger from scratch.
///
/// Team names are resolved to managers through each season's own standings.
/// Consolation games, games with a side missing from the standings, and
/// games where both sides resolve to the same manager are left out. The
/// result is decided on points; a contradicting tie flag or winner key is
/// logged.
pub fn aggregate_head_to_head(seasons: &[SeasonRecord]) -> HeadToHeadLedger {
    let mut ledger = HeadToHeadLedger::default();

    for season in seasons {
        let owners: HashMap<&str, ManagerId> = season
            .standings
            .iter()
            .map(|s| (s.team_name.as_str(), ManagerId::from_display_name(&s.manager_name)))
            .collect();

        for matchup in season.matchups.iter().filter(|m| !m.is_consolation) {
            let [home, away] = &matchup.teams;
            let (Some(a), Some(b)) = (
                owners.get(home.team_name.as_str()),
                owners.get(away.team_name.as_str()),
            ) else {
                debug!(
                    season = season.year(),
                    week = matchup.week,
                    "skipping matchup with unresolved team: {} vs {}",
                    home.team_name,
                    away.team_name
                );
                continue;
            };
            if a == b {
                continue;
            }
            if matchup.result_conflicts_with_points() {
                warn!(
                    season = season.year(),
                    week = matchup.week,
                    "provider result disagrees with points for {} vs {}; using points",
                    home.team_name,
                    away.team_name
                );
            }
            ledger.record_game(a, home.points, b, away.points);
        }
    }

    ledger
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{League, Matchup, MatchupSide, Standing};
    use crate::season::assemble_season;

    fn league(season: u16) -> League {
        League {
            league_key: format!("{season}.l.1"),
            league_id: 1,
            name: "Dynasty".into(),
            season,
            num_teams: 4,
            scoring_type: "head".into(),
            start_week: Some(1),
            current_week: None,
            end_week: Some(16),
            is_finished: true,
        }
    }

    fn standing(team: &str, manager: &str, rank: u32) -> Standing {
        Standing {
            team_key: format!("key.{team}"),
            team_name: team.into(),
            manager_name: manager.into(),
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

    fn matchup(week: u32, a: (&str, f64), b: (&str, f64), consolation: bool) -> Matchup {
        let side = |(name, points): (&str, f64)| MatchupSide {
            team_key: format!("key.{name}"),
            team_name: name.into(),
            points,
        };
        Matchup {
            week,
            teams: [side(a), side(b)],
            is_playoffs: consolation,
            is_consolation: consolation,
            is_tied: false,
            winner_team_key: None,
        }
    }

    #[test]
    fn points_decide_over_contradicting_tie_flag() {
        let mut flagged = matchup(1, ("A", 101.0), ("B", 99.0), false);
        flagged.is_tied = true;
        flagged.winner_team_key = Some("key.B".into());
        assert!(flagged.result_conflicts_with_points());

        let seasons = vec![assemble_season(
            league(2022),
            vec![standing("A", "Ann", 1), standing("B", "Bob", 2)],
            vec![flagged],
        )];
        let ledger = aggregate_head_to_head(&seasons);
        let ann = ledger.get(&id("Ann"), &id("Bob")).unwrap();
        assert_eq!((ann.wins, ann.losses, ann.ties), (1, 0, 0));
    }

    fn id(name: &str) -> ManagerId {
        ManagerId::from_display_name(name)
    }

    #[test]
    fn consolation_games_are_excluded() {
        let seasons = vec![
            assemble_season(
                league(2022),
                vec![standing("A", "Ann", 1), standing("B", "Bob", 2)],
                vec![matchup(1, ("A", 120.0), ("B", 100.0), false)],
            ),
            assemble_season(
                league(2023),
                vec![standing("A", "Ann", 3), standing("B", "Bob", 4)],
                vec![matchup(15, ("A", 90.0), ("B", 80.0), true)],
            ),
        ];
        let ledger = aggregate_head_to_head(&seasons);
        assert_eq!(
            ledger.get(&id("Ann"), &id("Bob")),
            Some(&Record { wins: 1, losses: 0, ties: 0 })
        );
        assert_eq!(
            ledger.get(&id("Bob"), &id("Ann")),
            Some(&Record { wins: 0, losses: 1, ties: 0 })
        );
    }

    #[test]
    fn ledger_is_symmetric() {
        let season = assemble_season(
            league(2024),
            vec![
                standing("A", "Ann", 1),
                standing("B", "Bob", 2),
                standing("C", "Cy", 3),
            ],
            vec![
                matchup(1, ("A", 110.0), ("B", 100.0), false),
                matchup(2, ("B", 95.5), ("A", 95.5), false),
                matchup(3, ("C", 130.0), ("A", 70.0), false),
                matchup(4, ("B", 80.0), ("C", 81.0), false),
                matchup(5, ("B", 120.0), ("A", 60.0), false),
            ],
        );
        let ledger = aggregate_head_to_head(&[season]);
        for a in ledger.managers() {
            for (b, record) in ledger.opponents(a) {
                assert_eq!(ledger.get(b, a), Some(&record.mirrored()), "{a} vs {b}");
            }
        }
        assert_eq!(
            ledger.get(&id("Ann"), &id("Bob")),
            Some(&Record { wins: 1, losses: 1, ties: 1 })
        );
        assert_eq!(ledger.pairs().count(), 3);
    }

    #[test]
    fn team_names_resolve_per_season() {
        // "Sharks" belongs to Ann in 2022 and to Bob in 2023.
        let seasons = vec![
            assemble_season(
                league(2022),
                vec![standing("Sharks", "Ann", 1), standing("Jets", "Bob", 2)],
                vec![matchup(1, ("Sharks", 100.0), ("Jets", 90.0), false)],
            ),
            assemble_season(
                league(2023),
                vec![standing("Sharks", "Bob", 1), standing("Owls", "Ann", 2)],
                vec![matchup(1, ("Sharks", 100.0), ("Owls", 90.0), false)],
            ),
        ];
        let ledger = aggregate_head_to_head(&seasons);
        assert_eq!(
            ledger.get(&id("Ann"), &id("Bob")),
            Some(&Record { wins: 1, losses: 1, ties: 0 })
        );
    }

    #[test]
    fn unresolved_and_self_matchups_are_skipped() {
        let season = assemble_season(
            league(2024),
            vec![
                standing("A", "Ann", 1),
                standing("A2", "ANN", 2),
                standing("B", "Bob", 3),
            ],
            vec![
                matchup(1, ("A", 100.0), ("Ghosts", 90.0), false),
                matchup(2, ("A", 100.0), ("A2", 90.0), false),
            ],
        );
        let ledger = aggregate_head_to_head(&[season]);
        assert!(ledger.is_empty());
        assert_eq!(ledger.get(&id("Ann"), &id("Bob")), None);
    }

    #[test]
    fn record_win_percentage() {
        let record = Record { wins: 3, losses: 1, ties: 2 };
        assert!((record.win_percentage() - 4.0 / 6.0).abs() < 1e-12);
        assert_eq!(Record::default().win_percentage(), 0.0);
    }
}
