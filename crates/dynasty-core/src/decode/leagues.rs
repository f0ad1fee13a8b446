// League listings: `fantasy_content.users{..}.user[..].games{..}.game[..].leagues{..}.league`.

use serde_json::Value;

use super::coerce::{flag, opt_u32, opt_u64, req_u32, text};
use super::slots::{tagged_entries, Slots};
use super::{DecodeError, Decoded, EndpointKind, EntryError};
use crate::model::League;

/// Decode a user's league listing across every game in the document.
///
/// Users or games without leagues contribute nothing; only a document with
/// no `users` container at all is an error.
pub fn decode_leagues(raw: &Value) -> Result<Decoded<League>, DecodeError> {
    let endpoint = EndpointKind::Leagues;
    let users = raw
        .get("fantasy_content")
        .and_then(|content| content.get("users"))
        .ok_or(DecodeError::MissingContainer {
            endpoint,
            container: "users",
        })?;

    let mut decoded = Decoded::default();
    for user in tagged_entries(users, "user") {
        let Some(games) = Slots::new(user.body).field("games") else {
            continue;
        };
        for game in tagged_entries(games, "game") {
            let Some(leagues) = Slots::new(game.body).field("leagues") else {
                continue;
            };
            for league in tagged_entries(leagues, "league") {
                let index = format!("{}/{}/{}", user.index, game.index, league.index);
                decoded.push_result(endpoint, index, parse_league(league.body));
            }
        }
    }
    Ok(decoded)
}

fn parse_league(league: &Value) -> Result<League, EntryError> {
    let slots = Slots::new(league);
    let league_key =
        text(slots.field("league_key")).ok_or(EntryError::MissingField("league_key"))?;
    let name = text(slots.field("name")).ok_or(EntryError::MissingField("name"))?;
    let season = req_u32(slots.field("season"), "season")?;
    let season = u16::try_from(season).map_err(|_| EntryError::BadNumber {
        field: "season",
        value: season.to_string(),
    })?;

    Ok(League {
        league_key,
        league_id: opt_u64(slots.field("league_id"), "league_id")?.unwrap_or(0),
        name,
        season,
        num_teams: opt_u32(slots.field("num_teams"), "num_teams")?.unwrap_or(0),
        scoring_type: text(slots.field("scoring_type")).unwrap_or_default(),
        start_week: opt_u32(slots.field("start_week"), "start_week")?,
        current_week: opt_u32(slots.field("current_week"), "current_week")?,
        end_week: opt_u32(slots.field("end_week"), "end_week")?,
        is_finished: flag(slots.field("is_finished")),
    })
}
