// League-wide summary figures and the championship timeline.

use serde::{Deserialize, Serialize};

use super::managers::ManagerProfile;
use crate::lineage::year_span_label;
use crate::model::Standing;
use crate::season::SeasonRecord;

/// Seasons a manager needs before counting toward the win percentage leader.
pub const MIN_SEASONS_FOR_WIN_PCT_LEADER: u32 = 3;

/// Headline numbers for one league lineage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeagueOverview {
    pub total_seasons: usize,
    /// Every recorded matchup, consolation games included.
    pub total_games: usize,
    pub total_managers: usize,
    pub first_year: Option<u16>,
    pub last_year: Option<u16>,
    /// Most championships; absent when nobody has won one.
    pub dynasty_leader: Option<ManagerProfile>,
    pub win_pct_leader: Option<ManagerProfile>,
    pub points_leader: Option<ManagerProfile>,
}

impl LeagueOverview {
    pub fn year_label(&self) -> String {
        year_span_label(self.first_year.zip(self.last_year))
    }
}

/// Summarize a lineage from its seasons and the profiles aggregated from them.
///
/// Leaders are picked by strict improvement over profiles in id order, so
/// the smallest id wins a tie.
pub fn league_overview(seasons: &[SeasonRecord], profiles: &[ManagerProfile]) -> LeagueOverview {
    let mut by_id: Vec<&ManagerProfile> = profiles.iter().collect();
    by_id.sort_by(|a, b| a.id.cmp(&b.id));

    let dynasty_leader = leader(&by_id, |p| p.championships > 0, |p| p.championships as f64);
    let win_pct_leader = leader(
        &by_id,
        |p| p.seasons_played >= MIN_SEASONS_FOR_WIN_PCT_LEADER,
        |p| p.win_percentage,
    );
    let points_leader = leader(&by_id, |_| true, |p| p.total_points_for);

    LeagueOverview {
        total_seasons: seasons.len(),
        total_games: seasons.iter().map(|s| s.matchups.len()).sum(),
        total_managers: profiles.len(),
        first_year: seasons.iter().map(SeasonRecord::year).min(),
        last_year: seasons.iter().map(SeasonRecord::year).max(),
        dynasty_leader,
        win_pct_leader,
        points_leader,
    }
}

fn leader(
    profiles: &[&ManagerProfile],
    eligible: impl Fn(&ManagerProfile) -> bool,
    score: impl Fn(&ManagerProfile) -> f64,
) -> Option<ManagerProfile> {
    let mut best: Option<&ManagerProfile> = None;
    for &profile in profiles.iter().filter(|p| eligible(p)) {
        match best {
            Some(current) if score(profile) <= score(current) => {}
            _ => best = Some(profile),
        }
    }
    best.cloned()
}

/// One season's champion and runner-up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub year: u16,
    pub league_name: String,
    pub champion: Standing,
    pub runner_up: Option<Standing>,
}

/// Champions by season, oldest first. Seasons without a champion are left
/// out.
pub fn championship_timeline(seasons: &[SeasonRecord]) -> Vec<TimelineEntry> {
    let mut timeline: Vec<TimelineEntry> = seasons
        .iter()
        .filter_map(|season| {
            let champion = season.champion.clone()?;
            Some(TimelineEntry {
                year: season.year(),
                league_name: season.league.name.clone(),
                champion,
                runner_up: season.runner_up().cloned(),
            })
        })
        .collect();
    timeline.sort_by_key(|entry| entry.year);
    timeline
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::managers::aggregate_managers;
    use crate::model::{League, Matchup, MatchupSide};
    use crate::season::assemble_season;

    fn league(season: u16) -> League {
        League {
            league_key: format!("{season}.l.1"),
            league_id: 1,
            name: "Dynasty".into(),
            season,
            num_teams: 2,
            scoring_type: "head".into(),
            start_week: Some(1),
            current_week: None,
            end_week: Some(16),
            is_finished: true,
        }
    }

    fn standing(team: &str, manager: &str, rank: u32, w: u32, l: u32, pf: f64) -> Standing {
        Standing {
            team_key: format!("key.{team}"),
            team_name: team.into(),
            manager_name: manager.into(),
            rank,
            wins: w,
            losses: l,
            ties: 0,
            percentage: 0.0,
            points_for: pf,
            points_against: 0.0,
            playoff_seed: None,
        }
    }

    fn matchup(week: u32) -> Matchup {
        let side = |name: &str| MatchupSide {
            team_key: format!("key.{name}"),
            team_name: name.into(),
            points: 100.0,
        };
        Matchup {
            week,
            teams: [side("A"), side("B")],
            is_playoffs: false,
            is_consolation: false,
            is_tied: false,
            winner_team_key: None,
        }
    }

    fn seasons() -> Vec<SeasonRecord> {
        vec![
            assemble_season(
                league(2021),
                vec![standing("A", "Ann", 1, 9, 5, 1000.0), standing("B", "Bob", 2, 5, 9, 1200.0)],
                vec![matchup(1), matchup(2)],
            ),
            assemble_season(
                league(2023),
                vec![standing("A", "Ann", 2, 6, 8, 1100.0), standing("B", "Bob", 1, 8, 6, 1300.0)],
                vec![matchup(1)],
            ),
            assemble_season(
                league(2022),
                vec![standing("A", "Ann", 1, 10, 4, 1150.0), standing("B", "Bob", 2, 4, 10, 900.0)],
                vec![],
            ),
            assemble_season(league(2024), vec![], vec![]),
        ]
    }

    #[test]
    fn overview_totals_and_leaders() {
        let seasons = seasons();
        let profiles = aggregate_managers(&seasons);
        let overview = league_overview(&seasons, &profiles);

        assert_eq!(overview.total_seasons, 4);
        assert_eq!(overview.total_games, 3);
        assert_eq!(overview.total_managers, 2);
        assert_eq!(overview.year_label(), "2021 - 2024");
        assert_eq!(overview.dynasty_leader.unwrap().name, "Ann");
        assert_eq!(overview.win_pct_leader.unwrap().name, "Ann");
        assert_eq!(overview.points_leader.unwrap().name, "Bob");
    }

    #[test]
    fn win_pct_leader_needs_three_seasons() {
        let seasons: Vec<SeasonRecord> = seasons().into_iter().take(2).collect();
        let profiles = aggregate_managers(&seasons);
        let overview = league_overview(&seasons, &profiles);
        assert!(overview.win_pct_leader.is_none());
        assert!(overview.dynasty_leader.is_some());
    }

    #[test]
    fn no_titles_means_no_dynasty_leader() {
        let seasons = vec![assemble_season(league(2024), vec![], vec![])];
        let overview = league_overview(&seasons, &aggregate_managers(&seasons));
        assert!(overview.dynasty_leader.is_none());
        assert!(overview.points_leader.is_none());
        assert_eq!(overview.year_label(), "2024");
    }

    #[test]
    fn empty_lineage_overview() {
        let overview = league_overview(&[], &[]);
        assert_eq!(overview.total_seasons, 0);
        assert_eq!(overview.year_label(), "N/A");
    }

    #[test]
    fn single_season_label_matches_lineage_label() {
        let seasons: Vec<SeasonRecord> = seasons().into_iter().take(1).collect();
        let profiles = aggregate_managers(&seasons);
        let overview = league_overview(&seasons, &profiles);

        let lineage = crate::lineage::LeagueLineage {
            name: seasons[0].league.name.clone(),
            leagues: vec![seasons[0].league.clone()],
        };
        assert_eq!(overview.year_label(), seasons[0].year().to_string());
        assert_eq!(overview.year_label(), lineage.year_label());
    }

    #[test]
    fn timeline_is_ascending_and_skips_unfinished() {
        let timeline = championship_timeline(&seasons());
        let years: Vec<u16> = timeline.iter().map(|e| e.year).collect();
        assert_eq!(years, vec![2021, 2022, 2023]);
        assert_eq!(timeline[2].champion.manager_name, "Bob");
        assert_eq!(
            timeline[2].runner_up.as_ref().map(|s| s.manager_name.as_str()),
            Some("Ann")
        );
    }
}
