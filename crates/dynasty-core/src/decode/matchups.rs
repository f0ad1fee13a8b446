// Weekly scoreboard: `fantasy_content.league[..].scoreboard[..].matchups`.

use serde_json::Value;

use super::coerce::{flag, opt_f64, opt_u32, text};
use super::slots::{tagged_entries, Slots};
use super::{decode_entries, league_section, DecodeError, Decoded, EndpointKind, EntryError, UNKNOWN};
use crate::model::{Matchup, MatchupSide};

/// Decode a scoreboard document. Matchups keep discovery order.
///
/// The week comes from each matchup's own `week` field, falling back to the
/// scoreboard's `week`; a matchup with neither is skipped.
pub fn decode_matchups(raw: &Value) -> Result<Decoded<Matchup>, DecodeError> {
    let endpoint = EndpointKind::Scoreboard;
    let scoreboard = Slots::new(league_section(raw, endpoint, "scoreboard")?);
    let matchups = scoreboard
        .field("matchups")
        .ok_or(DecodeError::MissingContainer {
            endpoint,
            container: "matchups",
        })?;
    let scoreboard_week = opt_u32(scoreboard.field("week"), "week").ok().flatten();

    Ok(decode_entries(matchups, "matchup", endpoint, |m| {
        parse_matchup(m, scoreboard_week)
    }))
}

fn parse_matchup(matchup: &Value, scoreboard_week: Option<u32>) -> Result<Matchup, EntryError> {
    // The teams container is either a direct field or nested under an
    // index-keyed child ("0": {"teams": ...}).
    let slots = Slots::new(matchup);
    let teams = slots.field("teams").ok_or(EntryError::MissingField("teams"))?;

    let sides = tagged_entries(teams, "team")
        .into_iter()
        .map(|entry| parse_side(entry.body))
        .collect::<Result<Vec<_>, _>>()?;
    let teams: [MatchupSide; 2] = sides
        .try_into()
        .map_err(|sides: Vec<MatchupSide>| EntryError::SideCount(sides.len()))?;

    let week = opt_u32(slots.field("week"), "week")?
        .or(scoreboard_week)
        .ok_or(EntryError::MissingField("week"))?;

    Ok(Matchup {
        week,
        teams,
        is_playoffs: flag(slots.field("is_playoffs")),
        is_consolation: flag(slots.field("is_consolation")),
        is_tied: flag(slots.field("is_tied")),
        winner_team_key: text(slots.field("winner_team_key")),
    })
}

fn parse_side(team: &Value) -> Result<MatchupSide, EntryError> {
    let slots = Slots::new(team);
    let team_key = text(slots.field("team_key")).ok_or(EntryError::MissingField("team_key"))?;
    let team_name = text(slots.field("name")).unwrap_or_else(|| UNKNOWN.to_string());
    let points = match slots.field("team_points") {
        Some(tp) => opt_f64(tp.get("total"), "team_points.total")?.unwrap_or(0.0),
        None => 0.0,
    };
    Ok(MatchupSide {
        team_key,
        team_name,
        points,
    })
}
