// Draft results: `fantasy_content.league[..].draft_results{..}.draft_result`.

use serde_json::Value;

use super::coerce::{opt_u32, req_u32, text};
use super::{decode_entries, league_section, DecodeError, Decoded, EndpointKind, EntryError};
use crate::model::DraftPick;

/// Decode a draft results document, sorted by overall pick.
pub fn decode_draft_results(raw: &Value) -> Result<Decoded<DraftPick>, DecodeError> {
    let endpoint = EndpointKind::DraftResults;
    let results = league_section(raw, endpoint, "draft_results")?;
    let mut decoded = decode_entries(results, "draft_result", endpoint, parse_pick);
    decoded.records.sort_by_key(|p| p.pick);
    Ok(decoded)
}

fn parse_pick(result: &Value) -> Result<DraftPick, EntryError> {
    Ok(DraftPick {
        pick: req_u32(result.get("pick"), "pick")?,
        round: req_u32(result.get("round"), "round")?,
        team_key: text(result.get("team_key")).ok_or(EntryError::MissingField("team_key"))?,
        // Keeper leagues list undrafted slots without a player.
        player_key: text(result.get("player_key"))
            .ok_or(EntryError::MissingField("player_key"))?,
        cost: opt_u32(result.get("cost"), "cost")?,
    })
}
