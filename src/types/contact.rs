//! Contact search result types

use crate::types::peer::PeerId;
use serde::{Deserialize, Serialize};

/// Result of a contact search: peers from the account's own contacts and
/// publicly resolvable peers (username matches).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactMatches {
    pub my_results: Vec<PeerId>,
    pub global_results: Vec<PeerId>,
}

impl ContactMatches {
    pub fn is_empty(&self) -> bool {
        self.my_results.is_empty() && self.global_results.is_empty()
    }
}
