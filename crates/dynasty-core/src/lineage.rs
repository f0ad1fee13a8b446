// League lineages: the same league across seasons, matched by exact name.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::League;

/// Every season of one recurring league.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeagueLineage {
    pub name: String,
    /// Sorted ascending by season.
    pub leagues: Vec<League>,
}

impl LeagueLineage {
    /// First and last season, or `None` for an empty lineage.
    pub fn year_range(&self) -> Option<(u16, u16)> {
        let first = self.leagues.iter().map(|l| l.season).min()?;
        let last = self.leagues.iter().map(|l| l.season).max()?;
        Some((first, last))
    }

    /// Human-readable span, e.g. "2012 - 2024" or "2024".
    pub fn year_label(&self) -> String {
        year_span_label(self.year_range())
    }
}

/// Format an inclusive `(first, last)` season span; "N/A" when there is none.
pub fn year_span_label(range: Option<(u16, u16)>) -> String {
    match range {
        Some((first, last)) if first == last => first.to_string(),
        Some((first, last)) => format!("{first} - {last}"),
        None => "N/A".to_string(),
    }
}

/// Group leagues into lineages by exact display name. Groups are ordered by
/// name; a lineage never contains the same league key twice.
pub fn group_lineages(leagues: impl IntoIterator<Item = League>) -> Vec<LeagueLineage> {
    let mut groups: BTreeMap<String, Vec<League>> = BTreeMap::new();
    for league in leagues {
        let group = groups.entry(league.name.clone()).or_default();
        if !group.iter().any(|l| l.league_key == league.league_key) {
            group.push(league);
        }
    }

    groups
        .into_iter()
        .map(|(name, mut leagues)| {
            leagues.sort_by_key(|l| l.season);
            LeagueLineage { name, leagues }
        })
        .collect()
}

/// The lineage with exactly `name`, if any.
pub fn find_lineage(lineages: &[LeagueLineage], name: &str) -> Option<LeagueLineage> {
    lineages.iter().find(|l| l.name == name).cloned()
}
