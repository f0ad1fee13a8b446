// Lifetime manager statistics folded from season records.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::identity::ManagerId;
use crate::model::{Standing, TransactionKind};
use crate::season::SeasonRecord;

/// One season of a manager's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonSnapshot {
    pub year: u16,
    pub rank: u32,
    pub wins: u32,
    pub losses: u32,
    pub points_for: f64,
    pub made_playoffs: bool,
    pub won_championship: bool,
}

/// Lifetime statistics for one manager identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagerProfile {
    pub id: ManagerId,
    /// Display name as used in the manager's most recent season.
    pub name: String,
    pub seasons_played: u32,
    pub championships: u32,
    /// Seasons finishing first or second.
    pub championship_appearances: u32,
    /// Seasons finishing in the top half of the league (see
    /// [`League::playoff_cutoff`](crate::model::League::playoff_cutoff)).
    pub playoff_appearances: u32,
    pub total_wins: u32,
    pub total_losses: u32,
    pub total_ties: u32,
    pub total_points_for: f64,
    pub total_points_against: f64,
    /// (wins + 0.5 * ties) / games, 0 with no games.
    pub win_percentage: f64,
    pub avg_finish: f64,
    pub best_finish: u32,
    pub worst_finish: u32,
    /// Best weekly score, zero-point weeks included.
    pub highest_single_week_score: Option<f64>,
    /// Worst weekly score, zero-point weeks excluded.
    pub lowest_single_week_score: Option<f64>,
    pub trades: u32,
    /// Adds, drops, and add/drops.
    pub moves: u32,
    /// Ascending by year.
    pub seasons: Vec<SeasonSnapshot>,
}

impl ManagerProfile {
    fn new(id: ManagerId, name: &str) -> Self {
        ManagerProfile {
            id,
            name: name.to_string(),
            seasons_played: 0,
            championships: 0,
            championship_appearances: 0,
            playoff_appearances: 0,
            total_wins: 0,
            total_losses: 0,
            total_ties: 0,
            total_points_for: 0.0,
            total_points_against: 0.0,
            win_percentage: 0.0,
            avg_finish: 0.0,
            best_finish: u32::MAX,
            worst_finish: 0,
            highest_single_week_score: None,
            lowest_single_week_score: None,
            trades: 0,
            moves: 0,
            seasons: Vec::new(),
        }
    }

    pub fn games_played(&self) -> u32 {
        self.total_wins + self.total_losses + self.total_ties
    }

    fn add_standing(&mut self, season: &SeasonRecord, standing: &Standing) {
        let cutoff = season.league.playoff_cutoff();
        let made_playoffs = standing.rank <= cutoff;
        let won_championship = standing.rank == 1;

        self.name = standing.manager_name.clone();
        self.seasons_played += 1;
        self.total_wins += standing.wins;
        self.total_losses += standing.losses;
        self.total_ties += standing.ties;
        self.total_points_for += standing.points_for;
        self.total_points_against += standing.points_against;
        if won_championship {
            self.championships += 1;
        }
        if standing.rank <= 2 {
            self.championship_appearances += 1;
        }
        if made_playoffs {
            self.playoff_appearances += 1;
        }
        self.best_finish = self.best_finish.min(standing.rank);
        self.worst_finish = self.worst_finish.max(standing.rank);

        self.seasons.push(SeasonSnapshot {
            year: season.year(),
            rank: standing.rank,
            wins: standing.wins,
            losses: standing.losses,
            points_for: standing.points_for,
            made_playoffs,
            won_championship,
        });

        for matchup in &season.matchups {
            for side in matchup.sides_for(&standing.team_name) {
                self.add_week_score(side.points);
            }
        }
    }

    fn add_week_score(&mut self, points: f64) {
        self.highest_single_week_score = Some(match self.highest_single_week_score {
            Some(high) => high.max(points),
            None => points,
        });
        // A zero is an unplayed or forfeited week, not a real low.
        if points > 0.0 {
            self.lowest_single_week_score = Some(match self.lowest_single_week_score {
                Some(low) => low.min(points),
                None => points,
            });
        }
    }

    fn finalize(&mut self) {
        let games = self.games_played();
        self.win_percentage = if games > 0 {
            (self.total_wins as f64 + 0.5 * self.total_ties as f64) / games as f64
        } else {
            0.0
        };
        self.avg_finish = if self.seasons_played > 0 {
            self.seasons.iter().map(|s| s.rank as f64).sum::<f64>() / self.seasons_played as f64
        } else {
            0.0
        };
        self.seasons.sort_by_key(|s| s.year);
    }
}

// ---------------------------------------------------------------------------
// Ordering
// ---------------------------------------------------------------------------

/// Orderings offered for manager rankings. Ties fall back to the manager id
/// so every ordering is total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ManagerSort {
    /// Championships, then win percentage, both descending.
    #[default]
    Championships,
    WinPercentage,
    PointsFor,
    /// Ascending: a lower average finish is better.
    AvgFinish,
    SeasonsPlayed,
}

impl ManagerSort {
    pub fn compare(&self, a: &ManagerProfile, b: &ManagerProfile) -> Ordering {
        let primary = match self {
            ManagerSort::Championships => b
                .championships
                .cmp(&a.championships)
                .then_with(|| b.win_percentage.total_cmp(&a.win_percentage)),
            ManagerSort::WinPercentage => b.win_percentage.total_cmp(&a.win_percentage),
            ManagerSort::PointsFor => b.total_points_for.total_cmp(&a.total_points_for),
            ManagerSort::AvgFinish => a.avg_finish.total_cmp(&b.avg_finish),
            ManagerSort::SeasonsPlayed => b.seasons_played.cmp(&a.seasons_played),
        };
        primary.then_with(|| a.id.cmp(&b.id))
    }

    pub fn sort(&self, profiles: &mut [ManagerProfile]) {
        profiles.sort_by(|a, b| self.compare(a, b));
    }
}

// ---------------------------------------------------------------------------
// Fold
// ---------------------------------------------------------------------------

/// Fold season records into one profile per manager identity, ordered by
/// [`ManagerSort::Championships`].
///
/// Seasons are folded in (year, league key) order whatever order they are
/// passed in, so the output depends only on the set of seasons.
pub fn aggregate_managers(seasons: &[SeasonRecord]) -> Vec<ManagerProfile> {
    let mut ordered: Vec<&SeasonRecord> = seasons.iter().collect();
    ordered.sort_by(|a, b| {
        a.year()
            .cmp(&b.year())
            .then_with(|| a.league.league_key.cmp(&b.league.league_key))
    });

    let mut profiles: HashMap<ManagerId, ManagerProfile> = HashMap::new();
    for season in ordered {
        let mut team_managers: HashMap<&str, ManagerId> = HashMap::new();
        for standing in &season.standings {
            let id = ManagerId::from_display_name(&standing.manager_name);
            team_managers.insert(standing.team_key.as_str(), id.clone());
            profiles
                .entry(id.clone())
                .or_insert_with(|| ManagerProfile::new(id, &standing.manager_name))
                .add_standing(season, standing);
        }

        for tx in &season.transactions {
            if !tx.status.is_empty() && tx.status != "successful" {
                continue;
            }
            for team_key in tx.team_keys() {
                let Some(profile) = team_managers
                    .get(team_key)
                    .and_then(|id| profiles.get_mut(id))
                else {
                    continue;
                };
                match tx.kind {
                    TransactionKind::Trade => profile.trades += 1,
                    TransactionKind::Add | TransactionKind::Drop | TransactionKind::AddDrop => {
                        profile.moves += 1
                    }
                    TransactionKind::Commish | TransactionKind::Other(_) => {}
                }
            }
        }
    }

    let mut profiles: Vec<ManagerProfile> = profiles
        .into_values()
        .map(|mut p| {
            p.finalize();
            p
        })
        .collect();
    ManagerSort::Championships.sort(&mut profiles);
    profiles
}
