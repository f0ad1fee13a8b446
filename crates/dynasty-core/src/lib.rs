// Library root: the decoder, season assembler, and cross-season aggregator
// for Yahoo fantasy league history.

pub mod aggregate;
pub mod decode;
pub mod lineage;
pub mod model;
pub mod season;

pub use aggregate::head_to_head::{aggregate_head_to_head, HeadToHeadLedger, Record};
pub use aggregate::identity::ManagerId;
pub use aggregate::managers::{aggregate_managers, ManagerProfile, ManagerSort, SeasonSnapshot};
pub use aggregate::overview::{championship_timeline, league_overview, LeagueOverview, TimelineEntry};
pub use decode::{
    decode, decode_draft_results, decode_leagues, decode_matchups, decode_standings,
    decode_transactions, DecodeError, Decoded, DecodedDocument, EndpointKind,
};
pub use lineage::{find_lineage, group_lineages, year_span_label, LeagueLineage};
pub use model::{DraftPick, League, Matchup, MatchupSide, Standing, Transaction};
pub use season::{assemble_season, SeasonBuilder, SeasonRecord};
