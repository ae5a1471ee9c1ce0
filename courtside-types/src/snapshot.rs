use serde::{Deserialize, Serialize};

use crate::{CompletedGame, Player};

/// Roster plus history, as kept in local storage for offline start-up and
/// as the source of the first upload to the remote store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalSnapshot {
    #[serde(default)]
    pub players: Vec<Player>,
    #[serde(default)]
    pub history: Vec<CompletedGame>,
}

impl LocalSnapshot {
    pub fn is_empty(&self) -> bool {
        self.players.is_empty() && self.history.is_empty()
    }
}
