// League transactions: `fantasy_content.league[..].transactions{..}.transaction`.

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::coerce::{opt_u64, text};
use super::slots::{tagged_entries, Slots};
use super::{decode_entries, league_section, DecodeError, Decoded, EndpointKind, EntryError, UNKNOWN};
use crate::model::{Transaction, TransactionKind, TransactionPlayer};

/// Decode a transactions document. Records keep discovery order (the
/// provider lists newest first).
pub fn decode_transactions(raw: &Value) -> Result<Decoded<Transaction>, DecodeError> {
    let endpoint = EndpointKind::Transactions;
    let transactions = league_section(raw, endpoint, "transactions")?;
    Ok(decode_entries(
        transactions,
        "transaction",
        endpoint,
        parse_transaction,
    ))
}

fn parse_transaction(transaction: &Value) -> Result<Transaction, EntryError> {
    let slots = Slots::new(transaction);
    let transaction_key = text(slots.field("transaction_key"))
        .ok_or(EntryError::MissingField("transaction_key"))?;
    let kind = text(slots.field("type"))
        .map(|t| TransactionKind::from_provider(&t))
        .ok_or(EntryError::MissingField("type"))?;
    let timestamp = opt_u64(slots.field("timestamp"), "timestamp")?
        .and_then(|secs| i64::try_from(secs).ok())
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0));

    let players = match slots.field("players") {
        Some(players) => tagged_entries(players, "player")
            .into_iter()
            .map(|p| parse_player(p.body))
            .collect::<Result<Vec<_>, _>>()?,
        None => Vec::new(),
    };

    Ok(Transaction {
        transaction_key,
        kind,
        status: text(slots.field("status")).unwrap_or_default(),
        timestamp,
        players,
        trader_team_key: text(slots.field("trader_team_key")),
        tradee_team_key: text(slots.field("tradee_team_key")),
    })
}

fn parse_player(player: &Value) -> Result<TransactionPlayer, EntryError> {
    let slots = Slots::new(player);
    let player_key =
        text(slots.field("player_key")).ok_or(EntryError::MissingField("player_key"))?;
    // `name` is an object ({"full": ..., "first": ...}) on player slots.
    let name = slots
        .field("name")
        .and_then(|n| text(n.get("full")).or_else(|| text(Some(n))))
        .unwrap_or_else(|| UNKNOWN.to_string());

    // transaction_data is an array of one object for single-move entries and
    // a bare object for others.
    let data = slots
        .field("transaction_data")
        .and_then(|d| Slots::new(d).find(|slot| slot.contains_key("type")))
        .ok_or(EntryError::MissingField("transaction_data"))?;

    Ok(TransactionPlayer {
        player_key,
        name,
        movement: text(data.get("type")).unwrap_or_default(),
        source_team_key: text(data.get("source_team_key")),
        destination_team_key: text(data.get("destination_team_key")),
    })
}
