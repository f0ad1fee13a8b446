// Decoding of raw provider documents into normalized records.
//
// Two failure levels: a document missing its top-level container is a
// `DecodeError`; a single malformed entry inside a valid container is
// skipped and recorded in `Decoded::skipped`, never propagated.

pub mod coerce;
pub mod draft;
pub mod leagues;
pub mod matchups;
pub mod slots;
pub mod standings;
pub mod transactions;

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::model::{DraftPick, League, Matchup, Standing, Transaction};
use slots::{tagged_entries, Slots};

pub use draft::decode_draft_results;
pub use leagues::decode_leagues;
pub use matchups::decode_matchups;
pub use standings::decode_standings;
pub use transactions::decode_transactions;

/// Name used when the provider omits a team or manager name.
pub const UNKNOWN: &str = "Unknown";

// ---------------------------------------------------------------------------
// Endpoint families
// ---------------------------------------------------------------------------

/// The response shape family a raw document is expected to have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EndpointKind {
    Standings,
    Scoreboard,
    Leagues,
    Transactions,
    DraftResults,
}

impl fmt::Display for EndpointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EndpointKind::Standings => "standings",
            EndpointKind::Scoreboard => "scoreboard",
            EndpointKind::Leagues => "leagues",
            EndpointKind::Transactions => "transactions",
            EndpointKind::DraftResults => "draft results",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// The document does not have the shape its endpoint promises.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("{endpoint} response has no `{container}` container")]
    MissingContainer {
        endpoint: EndpointKind,
        container: &'static str,
    },
}

/// Why one entry of an otherwise valid document was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntryError {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("field `{field}` is not a valid number: {value}")]
    BadNumber { field: &'static str, value: String },

    #[error("expected 2 teams in matchup, found {0}")]
    SideCount(usize),
}

/// A skipped entry and where it sat in its container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryFailure {
    /// Container path of the entry, e.g. "3" or "0/1".
    pub index: String,
    pub error: EntryError,
}

// ---------------------------------------------------------------------------
// Decoded output
// ---------------------------------------------------------------------------

/// Records decoded from one document, plus the entries that were skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded<T> {
    pub records: Vec<T>,
    pub skipped: Vec<EntryFailure>,
}

impl<T> Default for Decoded<T> {
    fn default() -> Self {
        Decoded {
            records: Vec::new(),
            skipped: Vec::new(),
        }
    }
}

impl<T> Decoded<T> {
    pub fn into_records(self) -> Vec<T> {
        self.records
    }

    fn push_result(
        &mut self,
        endpoint: EndpointKind,
        index: String,
        result: Result<T, EntryError>,
    ) {
        match result {
            Ok(record) => self.records.push(record),
            Err(error) => {
                warn!("skipping malformed {endpoint} entry {index}: {error}");
                self.skipped.push(EntryFailure { index, error });
            }
        }
    }
}

/// One decoded document of any endpoint family.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedDocument {
    Standings(Decoded<Standing>),
    Matchups(Decoded<Matchup>),
    Leagues(Decoded<League>),
    Transactions(Decoded<Transaction>),
    DraftResults(Decoded<DraftPick>),
}

/// Decode `raw` according to the shape family `kind`.
pub fn decode(raw: &Value, kind: EndpointKind) -> Result<DecodedDocument, DecodeError> {
    Ok(match kind {
        EndpointKind::Standings => DecodedDocument::Standings(decode_standings(raw)?),
        EndpointKind::Scoreboard => DecodedDocument::Matchups(decode_matchups(raw)?),
        EndpointKind::Leagues => DecodedDocument::Leagues(decode_leagues(raw)?),
        EndpointKind::Transactions => DecodedDocument::Transactions(decode_transactions(raw)?),
        EndpointKind::DraftResults => DecodedDocument::DraftResults(decode_draft_results(raw)?),
    })
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Locate the named section of `fantasy_content.league`, which the provider
/// sends as `[metadata, {section: ...}]`.
fn league_section<'a>(
    raw: &'a Value,
    endpoint: EndpointKind,
    section: &'static str,
) -> Result<&'a Value, DecodeError> {
    raw.get("fantasy_content")
        .and_then(|content| content.get("league"))
        .and_then(|league| Slots::new(league).field(section))
        .ok_or(DecodeError::MissingContainer {
            endpoint,
            container: section,
        })
}

/// Parse every `tag` entry of `container`, isolating per-entry failures.
fn decode_entries<'a, T, F>(
    container: &'a Value,
    tag: &str,
    endpoint: EndpointKind,
    mut parse: F,
) -> Decoded<T>
where
    F: FnMut(&'a Value) -> Result<T, EntryError>,
{
    let mut decoded = Decoded::default();
    for entry in tagged_entries(container, tag) {
        decoded.push_result(endpoint, entry.index.to_string(), parse(entry.body));
    }
    decoded
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decode_dispatches_on_endpoint_kind() {
        let raw = json!({
            "fantasy_content": {
                "league": [
                    {"league_key": "423.l.1"},
                    {"draft_results": {
                        "0": {"draft_result": {"pick": 1, "round": 1, "team_key": "t.1", "player_key": "p.1"}},
                        "count": 1
                    }}
                ]
            }
        });
        match decode(&raw, EndpointKind::DraftResults).unwrap() {
            DecodedDocument::DraftResults(picks) => assert_eq!(picks.records.len(), 1),
            other => panic!("expected draft results, got {other:?}"),
        }
    }

    #[test]
    fn missing_container_names_the_endpoint() {
        let raw = json!({"fantasy_content": {"league": [{"league_key": "423.l.1"}]}});
        let err = decode(&raw, EndpointKind::Transactions).unwrap_err();
        assert_eq!(
            err,
            DecodeError::MissingContainer {
                endpoint: EndpointKind::Transactions,
                container: "transactions",
            }
        );
        assert_eq!(
            err.to_string(),
            "transactions response has no `transactions` container"
        );
    }

    #[test]
    fn entirely_foreign_document_is_a_decode_error() {
        let raw = json!({"error": {"description": "nope"}});
        for kind in [
            EndpointKind::Standings,
            EndpointKind::Scoreboard,
            EndpointKind::Leagues,
            EndpointKind::Transactions,
            EndpointKind::DraftResults,
        ] {
            assert!(decode(&raw, kind).is_err(), "{kind} should fail");
        }
    }
}
