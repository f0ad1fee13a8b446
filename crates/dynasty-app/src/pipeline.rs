// Fetch pipeline: league discovery, per-season assembly, and the analysis of
// a whole lineage.
//
// Requests run one at a time with a pause between them to stay under the
// provider's rate limit.

use std::time::Duration;

use dynasty_core::{
    aggregate_head_to_head, aggregate_managers, championship_timeline, decode_draft_results,
    decode_leagues, decode_matchups, decode_standings, decode_transactions, league_overview,
    DecodeError, HeadToHeadLedger, League, LeagueLineage, LeagueOverview, ManagerProfile,
    SeasonBuilder, SeasonRecord, TimelineEntry,
};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::client::{Endpoint, FetchError, FetchJson};
use crate::config::FetchConfig;

// ---------------------------------------------------------------------------
// Settings and events
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub request_delay: Duration,
    pub week_delay: Duration,
    pub default_end_week: u32,
}

impl FetchSettings {
    pub fn from_config(config: &FetchConfig) -> Self {
        Self {
            request_delay: Duration::from_millis(config.request_delay_ms),
            week_delay: Duration::from_millis(config.week_delay_ms),
            default_end_week: config.default_end_week,
        }
    }
}

/// Progress notifications for a lineage fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchEvent {
    SeasonStarted {
        year: u16,
        league_key: String,
        completed: usize,
        total: usize,
    },
    SeasonFinished {
        year: u16,
        completed: usize,
        total: usize,
    },
    SeasonFailed {
        year: u16,
        error: String,
        completed: usize,
        total: usize,
    },
}

/// Why a season could not be assembled.
#[derive(Debug, Error)]
pub enum SeasonError {
    #[error("{league_key}: {source}")]
    Fetch {
        league_key: String,
        source: FetchError,
    },

    #[error("{league_key}: {source}")]
    Decode {
        league_key: String,
        source: DecodeError,
    },
}

// ---------------------------------------------------------------------------
// League discovery
// ---------------------------------------------------------------------------

/// List the user's leagues across the given `(season, game_key)` pairs.
///
/// A season whose listing fails or is malformed contributes no leagues. A
/// rejected token aborts the whole listing since every later request would
/// fail the same way.
pub async fn list_leagues<F: FetchJson + ?Sized>(
    fetcher: &F,
    game_keys: &[(u16, u32)],
    settings: &FetchSettings,
) -> Result<Vec<League>, FetchError> {
    let mut leagues = Vec::new();

    for (i, &(season, game_key)) in game_keys.iter().enumerate() {
        if i > 0 {
            tokio::time::sleep(settings.request_delay).await;
        }
        let raw = match fetcher.fetch_json(&Endpoint::Leagues { game_key }).await {
            Ok(raw) => raw,
            Err(e @ (FetchError::Unauthorized { .. } | FetchError::MissingToken)) => return Err(e),
            Err(e) => {
                warn!("no league listing for {season} (game {game_key}): {e}");
                continue;
            }
        };
        match decode_leagues(&raw) {
            Ok(decoded) => {
                debug!("{season}: {} leagues", decoded.records.len());
                leagues.extend(decoded.into_records());
            }
            Err(e) => warn!("league listing for {season} unreadable: {e}"),
        }
    }

    info!("found {} leagues across {} seasons", leagues.len(), game_keys.len());
    Ok(leagues)
}

// ---------------------------------------------------------------------------
// Season assembly
// ---------------------------------------------------------------------------

/// Fetch and assemble one league-season.
///
/// Standings are required. Each week's scoreboard, the transactions and the
/// draft results are best-effort: failures are logged and leave a gap.
pub async fn fetch_season<F: FetchJson + ?Sized>(
    fetcher: &F,
    mut league: League,
    settings: &FetchSettings,
) -> Result<SeasonRecord, SeasonError> {
    if league.end_week.is_none() {
        league.end_week = Some(settings.default_end_week);
    }
    let league_key = league.league_key.clone();

    let standings_endpoint = Endpoint::Standings {
        league_key: league_key.clone(),
    };
    let raw = fetcher
        .fetch_json(&standings_endpoint)
        .await
        .map_err(|source| SeasonError::Fetch {
            league_key: league_key.clone(),
            source,
        })?;
    let standings = decode_standings(&raw)
        .map_err(|source| SeasonError::Decode {
            league_key: league_key.clone(),
            source,
        })?
        .into_records();

    // Future weeks of a running season come back as 0-0 "games".
    let last_played = match (league.is_finished, league.current_week) {
        (false, Some(current)) => Some(current),
        _ => None,
    };

    let mut builder = SeasonBuilder::new(league).standings(standings);
    for week in builder.candidate_weeks() {
        if last_played.is_some_and(|current| week > current) {
            debug!("{league_key}: stopping before unplayed week {week}");
            break;
        }
        if week > 1 {
            tokio::time::sleep(settings.week_delay).await;
        }
        let endpoint = Endpoint::Scoreboard {
            league_key: league_key.clone(),
            week,
        };
        let result = match fetcher.fetch_json(&endpoint).await {
            Ok(raw) => decode_matchups(&raw)
                .map(|decoded| decoded.into_records())
                .map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };
        builder.record_week(week, result);
    }

    let transactions = fetch_optional(fetcher, Endpoint::Transactions {
        league_key: league_key.clone(),
    })
    .await
    .and_then(|raw| log_decode(&league_key, decode_transactions(&raw)))
    .map(|decoded| decoded.into_records())
    .unwrap_or_default();

    let draft = fetch_optional(fetcher, Endpoint::DraftResults {
        league_key: league_key.clone(),
    })
    .await
    .and_then(|raw| log_decode(&league_key, decode_draft_results(&raw)))
    .map(|decoded| decoded.into_records())
    .unwrap_or_default();

    let season = builder.transactions(transactions).draft(draft).finish();
    info!(
        "assembled {} {}: {} teams, {} matchups, {} missing weeks",
        season.league.name,
        season.year(),
        season.standings.len(),
        season.matchups.len(),
        season.missing_weeks.len()
    );
    Ok(season)
}

async fn fetch_optional<F: FetchJson + ?Sized>(
    fetcher: &F,
    endpoint: Endpoint,
) -> Option<serde_json::Value> {
    match fetcher.fetch_json(&endpoint).await {
        Ok(raw) => Some(raw),
        Err(e) => {
            warn!("skipping {endpoint}: {e}");
            None
        }
    }
}

fn log_decode<T>(league_key: &str, result: Result<T, DecodeError>) -> Option<T> {
    match result {
        Ok(decoded) => Some(decoded),
        Err(e) => {
            warn!("{league_key}: {e}");
            None
        }
    }
}

/// Fetch every season of a lineage, oldest first.
///
/// A season that fails is dropped with a warning; the rest still load.
/// Progress events go to `progress` when given; a closed receiver is ignored.
pub async fn fetch_lineage<F: FetchJson + ?Sized>(
    fetcher: &F,
    lineage: &LeagueLineage,
    settings: &FetchSettings,
    progress: Option<&mpsc::Sender<FetchEvent>>,
) -> Vec<SeasonRecord> {
    let total = lineage.leagues.len();
    let mut seasons = Vec::with_capacity(total);

    for (completed, league) in lineage.leagues.iter().enumerate() {
        let year = league.season;
        emit(
            progress,
            FetchEvent::SeasonStarted {
                year,
                league_key: league.league_key.clone(),
                completed,
                total,
            },
        )
        .await;

        let event = match fetch_season(fetcher, league.clone(), settings).await {
            Ok(season) => {
                seasons.push(season);
                FetchEvent::SeasonFinished {
                    year,
                    completed: completed + 1,
                    total,
                }
            }
            Err(e) => {
                warn!("dropping {} {year} from the analysis: {e}", lineage.name);
                FetchEvent::SeasonFailed {
                    year,
                    error: e.to_string(),
                    completed: completed + 1,
                    total,
                }
            }
        };
        emit(progress, event).await;
    }

    info!(
        "loaded {}/{} seasons of {}",
        seasons.len(),
        total,
        lineage.name
    );
    seasons
}

async fn emit(progress: Option<&mpsc::Sender<FetchEvent>>, event: FetchEvent) {
    if let Some(tx) = progress {
        let _ = tx.send(event).await;
    }
}

// ---------------------------------------------------------------------------
// Analysis
// ---------------------------------------------------------------------------

/// Everything the report needs for one lineage.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub league_name: String,
    pub seasons: Vec<SeasonRecord>,
    pub profiles: Vec<ManagerProfile>,
    pub head_to_head: HeadToHeadLedger,
    pub overview: LeagueOverview,
    pub timeline: Vec<TimelineEntry>,
}

/// Aggregate fetched seasons. Recomputed from scratch on every call.
pub fn analyze(league_name: &str, seasons: Vec<SeasonRecord>) -> Analysis {
    let profiles = aggregate_managers(&seasons);
    let head_to_head = aggregate_head_to_head(&seasons);
    let overview = league_overview(&seasons, &profiles);
    let timeline = championship_timeline(&seasons);
    Analysis {
        league_name: league_name.to_string(),
        seasons,
        profiles,
        head_to_head,
        overview,
        timeline,
    }
}
