// League standings: `fantasy_content.league[..].standings[..].teams`.

use serde_json::Value;

use super::coerce::{opt_f64, opt_u32, req_u32, text};
use super::slots::{tagged_entries, Slots};
use super::{decode_entries, league_section, DecodeError, Decoded, EndpointKind, EntryError, UNKNOWN};
use crate::model::Standing;

/// Decode a standings document. Records are sorted ascending by rank.
pub fn decode_standings(raw: &Value) -> Result<Decoded<Standing>, DecodeError> {
    let endpoint = EndpointKind::Standings;
    let standings = league_section(raw, endpoint, "standings")?;
    let teams = Slots::new(standings)
        .field("teams")
        .ok_or(DecodeError::MissingContainer {
            endpoint,
            container: "teams",
        })?;

    let mut decoded = decode_entries(teams, "team", endpoint, parse_standing);
    decoded.records.sort_by_key(|s| s.rank);
    Ok(decoded)
}

/// First manager nickname of a team, or "Unknown".
pub(crate) fn manager_nickname(team: &Slots<'_>) -> String {
    team.field("managers")
        .and_then(|managers| {
            tagged_entries(managers, "manager")
                .into_iter()
                .find_map(|m| text(m.body.get("nickname")))
        })
        .unwrap_or_else(|| UNKNOWN.to_string())
}

fn parse_standing(team: &Value) -> Result<Standing, EntryError> {
    let slots = Slots::new(team);

    let team_key = text(slots.field("team_key")).ok_or(EntryError::MissingField("team_key"))?;
    let team_name = text(slots.field("name")).unwrap_or_else(|| UNKNOWN.to_string());
    let manager_name = manager_nickname(&slots);

    // team_standings sits at index 1 or 2 depending on whether team_points
    // was included in the response.
    let standing = slots
        .field("team_standings")
        .ok_or(EntryError::MissingField("team_standings"))?;
    let totals = standing
        .get("outcome_totals")
        .ok_or(EntryError::MissingField("outcome_totals"))?;

    Ok(Standing {
        team_key,
        team_name,
        manager_name,
        rank: req_u32(standing.get("rank"), "rank")?,
        wins: req_u32(totals.get("wins"), "wins")?,
        losses: req_u32(totals.get("losses"), "losses")?,
        ties: opt_u32(totals.get("ties"), "ties")?.unwrap_or(0),
        percentage: opt_f64(totals.get("percentage"), "percentage")?.unwrap_or(0.0),
        points_for: opt_f64(standing.get("points_for"), "points_for")?.unwrap_or(0.0),
        points_against: opt_f64(standing.get("points_against"), "points_against")?
            .unwrap_or(0.0),
        playoff_seed: opt_u32(standing.get("playoff_seed"), "playoff_seed")?,
    })
}
