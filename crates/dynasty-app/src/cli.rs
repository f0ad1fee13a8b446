// Command-line arguments for the `dynasty` binary.

use clap::{Parser, ValueEnum};
use dynasty_core::ManagerSort;

#[derive(Debug, Parser)]
#[command(name = "dynasty")]
#[command(about = "All-time records for a Yahoo fantasy football league")]
#[command(version)]
pub struct Args {
    /// League name to analyze; lists your leagues when omitted
    pub league_name: Option<String>,

    /// Ordering of the manager table and CSV export
    #[arg(short, long, value_enum, default_value_t = SortKey::Championships)]
    pub sort: SortKey,
}

/// Manager table orderings selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortKey {
    Championships,
    #[value(name = "win-pct")]
    WinPercentage,
    #[value(name = "points")]
    PointsFor,
    #[value(name = "finish")]
    AvgFinish,
    #[value(name = "seasons")]
    SeasonsPlayed,
}

impl From<SortKey> for ManagerSort {
    fn from(key: SortKey) -> Self {
        match key {
            SortKey::Championships => ManagerSort::Championships,
            SortKey::WinPercentage => ManagerSort::WinPercentage,
            SortKey::PointsFor => ManagerSort::PointsFor,
            SortKey::AvgFinish => ManagerSort::AvgFinish,
            SortKey::SeasonsPlayed => ManagerSort::SeasonsPlayed,
        }
    }
}
