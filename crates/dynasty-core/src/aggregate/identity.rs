// Manager identity: the aggregation key derived from a display name.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Normalized manager name: lowercased, whitespace runs collapsed into `_`.
///
/// Two different people whose names normalize identically are merged. Older
/// seasons carry no stable manager id, so the name is the only key available.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ManagerId(String);

impl ManagerId {
    pub fn from_display_name(name: &str) -> Self {
        let folded = name.to_lowercase();
        ManagerId(folded.split_whitespace().collect::<Vec<_>>().join("_"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ManagerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
