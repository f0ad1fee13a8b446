// Dynasty entry point.
//
// Startup sequence (after argument parsing):
// 1. Initialize tracing (log to file; stdout carries the report)
// 2. Load config
// 3. Build the fetcher (Yahoo client, optionally behind the response cache)
// 4. List leagues across every NFL season and group them into lineages
// 5. Fetch the selected lineage season by season, printing progress
// 6. Aggregate, print the report, export CSV if configured

use clap::Parser;
use dynasty_app::cache::{CachedFetcher, ResponseCache};
use dynasty_app::cli::Args;
use dynasty_app::client::{FetchJson, YahooClient, NFL_GAME_KEYS};
use dynasty_app::config;
use dynasty_app::pipeline::{self, FetchEvent, FetchSettings};
use dynasty_app::report;
use dynasty_core::{find_lineage, group_lineages, ManagerSort};

use anyhow::{bail, Context};
use tokio::sync::mpsc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let sort = ManagerSort::from(args.sort);

    // 1. Initialize tracing
    init_tracing()?;
    info!("Dynasty starting up");

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    let league_name = args.league_name.or_else(|| config.report.league_name.clone());
    info!("Config loaded: base_url={}, cache enabled={}", config.yahoo.base_url, config.cache.enabled);

    // 3. Build the fetcher
    let client = YahooClient::from_config(&config)?;
    let fetcher: Box<dyn FetchJson> = if config.cache.enabled {
        let cwd = std::env::current_dir().context("failed to read working directory")?;
        let cache_path = config.prepare_cache_dir(&cwd)?;
        let cache = ResponseCache::open(&cache_path.to_string_lossy())?;
        info!("Response cache at {}", cache_path.display());
        Box::new(CachedFetcher::new(client, cache, config.cache.max_age_hours))
    } else {
        Box::new(client)
    };
    let settings = FetchSettings::from_config(&config.fetch);

    // 4. Discover leagues
    eprintln!("Listing leagues across {} seasons...", NFL_GAME_KEYS.len());
    let leagues = pipeline::list_leagues(fetcher.as_ref(), NFL_GAME_KEYS, &settings)
        .await
        .context("failed to list leagues")?;
    let lineages = group_lineages(leagues);

    let Some(name) = league_name else {
        print!("{}", report::render_lineages(&lineages));
        eprintln!("Pass a league name to analyze it (see --help).");
        return Ok(());
    };
    let Some(lineage) = find_lineage(&lineages, &name) else {
        print!("{}", report::render_lineages(&lineages));
        bail!("no league named {name:?}");
    };

    // 5. Fetch the lineage with progress on stderr
    let (progress_tx, mut progress_rx) = mpsc::channel::<FetchEvent>(64);
    let progress_handle = tokio::spawn(async move {
        while let Some(event) = progress_rx.recv().await {
            match event {
                FetchEvent::SeasonStarted { year, completed, total, .. } => {
                    eprintln!("[{}/{}] fetching {}...", completed + 1, total, year);
                }
                FetchEvent::SeasonFinished { .. } => {}
                FetchEvent::SeasonFailed { year, error, .. } => {
                    eprintln!("  {year} skipped: {error}");
                }
            }
        }
    });

    let seasons =
        pipeline::fetch_lineage(fetcher.as_ref(), &lineage, &settings, Some(&progress_tx)).await;
    drop(progress_tx);
    let _ = progress_handle.await;

    if seasons.is_empty() {
        bail!("no season of {name:?} could be loaded; see logs/dynasty.log");
    }

    // 6. Aggregate and report
    let analysis = pipeline::analyze(&lineage.name, seasons);
    print!("{}", report::render_report(&analysis, sort));

    if let Some(csv_path) = &config.report.csv_path {
        let mut ranked = analysis.profiles.clone();
        sort.sort(&mut ranked);
        match report::export_csv(std::path::Path::new(csv_path), &ranked) {
            Ok(()) => eprintln!("Wrote {csv_path}"),
            Err(e) => warn!("CSV export failed: {e:#}"),
        }
    }

    info!("Dynasty finished");
    Ok(())
}

/// Initialize tracing to log to a file (stdout is reserved for the report).
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("dynasty.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("dynasty=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
