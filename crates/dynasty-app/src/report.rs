// Plain-text league report and CSV export of the manager rankings.

use std::collections::HashMap;
use std::fmt::{self, Write as _};
use std::path::Path;

use anyhow::{Context, Result};
use dynasty_core::{LeagueLineage, ManagerId, ManagerProfile, ManagerSort};
use serde::Serialize;

use crate::pipeline::Analysis;

// ---------------------------------------------------------------------------
// Text report
// ---------------------------------------------------------------------------

/// Render the full report for one lineage.
pub fn render_report(analysis: &Analysis, sort: ManagerSort) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_report(&mut out, analysis, sort);
    out
}

pub fn write_report<W: fmt::Write>(out: &mut W, analysis: &Analysis, sort: ManagerSort) -> fmt::Result {
    let overview = &analysis.overview;
    let title = format!("{} ({})", analysis.league_name, overview.year_label());
    writeln!(out, "{title}")?;
    writeln!(out, "{}", "=".repeat(title.chars().count()))?;
    writeln!(
        out,
        "Seasons: {}   Games: {}   Managers: {}",
        overview.total_seasons, overview.total_games, overview.total_managers
    )?;
    if let Some(p) = &overview.dynasty_leader {
        writeln!(out, "Dynasty leader: {} ({} titles)", p.name, p.championships)?;
    }
    if let Some(p) = &overview.win_pct_leader {
        writeln!(
            out,
            "Best win %:     {} ({}, {} seasons)",
            p.name,
            pct(p.win_percentage),
            p.seasons_played
        )?;
    }
    if let Some(p) = &overview.points_leader {
        writeln!(out, "Points leader:  {} ({:.2})", p.name, p.total_points_for)?;
    }

    let gaps: Vec<String> = analysis
        .seasons
        .iter()
        .filter(|s| !s.missing_weeks.is_empty())
        .map(|s| format!("{} weeks {:?}", s.year(), s.missing_weeks))
        .collect();
    if !gaps.is_empty() {
        writeln!(out, "Incomplete:     {}", gaps.join("; "))?;
    }

    let mut profiles = analysis.profiles.clone();
    sort.sort(&mut profiles);
    writeln!(out)?;
    write_manager_table(out, &profiles)?;

    writeln!(out)?;
    writeln!(out, "Champions")?;
    writeln!(out, "---------")?;
    if analysis.timeline.is_empty() {
        writeln!(out, "(no completed seasons)")?;
    }
    for entry in &analysis.timeline {
        write!(
            out,
            "{}  {} ({})",
            entry.year, entry.champion.manager_name, entry.champion.team_name
        )?;
        if let Some(runner_up) = &entry.runner_up {
            write!(out, " over {} ({})", runner_up.manager_name, runner_up.team_name)?;
        }
        writeln!(out)?;
    }

    writeln!(out)?;
    writeln!(out, "Head-to-head")?;
    writeln!(out, "------------")?;
    let names: HashMap<&ManagerId, &str> = analysis
        .profiles
        .iter()
        .map(|p| (&p.id, p.name.as_str()))
        .collect();
    let name_of = |id: &ManagerId| names.get(id).map(|n| n.to_string()).unwrap_or_else(|| id.to_string());
    let mut pairs: Vec<_> = analysis.head_to_head.pairs().collect();
    pairs.sort_by(|a, b| b.2.games().cmp(&a.2.games()).then_with(|| (a.0, a.1).cmp(&(b.0, b.1))));
    if pairs.is_empty() {
        writeln!(out, "(no regular-season or playoff games)")?;
    }
    for (a, b, record) in pairs {
        writeln!(
            out,
            "{:<20} vs {:<20} {}-{}-{}",
            name_of(a),
            name_of(b),
            record.wins,
            record.losses,
            record.ties
        )?;
    }

    Ok(())
}

fn write_manager_table<W: fmt::Write>(out: &mut W, profiles: &[ManagerProfile]) -> fmt::Result {
    writeln!(
        out,
        "{:>3}  {:<20} {:>4} {:>6} {:>6} {:>8} {:>10} {:>6} {:>10} {:>6} {:>9} {:>8} {:>8}",
        "#", "Manager", "Szn", "Titles", "Finals", "Playoffs", "W-L-T", "Win%", "PF", "AvgFin",
        "Best/Wst", "High", "Low"
    )?;
    for (i, p) in profiles.iter().enumerate() {
        writeln!(
            out,
            "{:>3}  {:<20} {:>4} {:>6} {:>6} {:>8} {:>10} {:>6} {:>10.2} {:>6.2} {:>9} {:>8} {:>8}",
            i + 1,
            truncate(&p.name, 20),
            p.seasons_played,
            p.championships,
            p.championship_appearances,
            p.playoff_appearances,
            format!("{}-{}-{}", p.total_wins, p.total_losses, p.total_ties),
            pct(p.win_percentage),
            p.total_points_for,
            p.avg_finish,
            format!("{}/{}", p.best_finish, p.worst_finish),
            score(p.highest_single_week_score),
            score(p.lowest_single_week_score),
        )?;
    }
    Ok(())
}

/// Available lineages, for when no league name was given or it matched none.
pub fn render_lineages(lineages: &[LeagueLineage]) -> String {
    let mut out = String::new();
    if lineages.is_empty() {
        out.push_str("No leagues found for this account.\n");
        return out;
    }
    out.push_str("Leagues:\n");
    for lineage in lineages {
        let _ = writeln!(
            out,
            "  {:<40} {:>3} seasons  {}",
            lineage.name,
            lineage.leagues.len(),
            lineage.year_label()
        );
    }
    out
}

/// Baseball-style percentage: ".625", "1.000".
fn pct(value: f64) -> String {
    let s = format!("{value:.3}");
    match s.strip_prefix('0') {
        Some(rest) => rest.to_string(),
        None => s,
    }
}

fn score(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.2}")).unwrap_or_else(|| "-".to_string())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut t: String = s.chars().take(max - 1).collect();
        t.push('…');
        t
    }
}

// ---------------------------------------------------------------------------
// CSV export
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    rank: usize,
    manager: &'a str,
    seasons: u32,
    championships: u32,
    finals: u32,
    playoffs: u32,
    wins: u32,
    losses: u32,
    ties: u32,
    win_pct: f64,
    points_for: f64,
    points_against: f64,
    avg_finish: f64,
    best_finish: u32,
    worst_finish: u32,
    high_week: Option<f64>,
    low_week: Option<f64>,
}

impl<'a> CsvRow<'a> {
    fn new(rank: usize, p: &'a ManagerProfile) -> Self {
        Self {
            rank,
            manager: &p.name,
            seasons: p.seasons_played,
            championships: p.championships,
            finals: p.championship_appearances,
            playoffs: p.playoff_appearances,
            wins: p.total_wins,
            losses: p.total_losses,
            ties: p.total_ties,
            win_pct: round(p.win_percentage, 3),
            points_for: round(p.total_points_for, 2),
            points_against: round(p.total_points_against, 2),
            avg_finish: round(p.avg_finish, 2),
            best_finish: p.best_finish,
            worst_finish: p.worst_finish,
            high_week: p.highest_single_week_score.map(|v| round(v, 2)),
            low_week: p.lowest_single_week_score.map(|v| round(v, 2)),
        }
    }
}

fn round(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Write `profiles` as CSV, ranked in the order given.
pub fn write_csv<W: std::io::Write>(writer: W, profiles: &[ManagerProfile]) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    for (i, profile) in profiles.iter().enumerate() {
        wtr.serialize(CsvRow::new(i + 1, profile))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn export_csv(path: &Path, profiles: &[ManagerProfile]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    write_csv(file, profiles).with_context(|| format!("failed to write {}", path.display()))
}
