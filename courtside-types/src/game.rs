use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::{GameId, GameStats, PlayerId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CompletedGame {
    pub id: GameId,
    pub date: String, // ISO 8601 string
    /// Not enforced: may point at a player that has since been deleted.
    pub player_id: PlayerId,
    #[serde(default)]
    pub opponent: Option<String>,
    pub stats: GameStats,
}

/// Replacement values from the match edit flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct GameEdit {
    pub date: String,
    pub player_id: PlayerId,
    #[serde(default)]
    pub opponent: Option<String>,
    pub stats: GameStats,
}

impl CompletedGame {
    pub fn apply_edit(&mut self, edit: GameEdit) {
        self.date = edit.date;
        self.player_id = edit.player_id;
        self.opponent = edit.opponent;
        self.stats = edit.stats;
    }

    pub fn opponent_label(&self) -> &str {
        match self.opponent.as_deref() {
            Some(label) if !label.trim().is_empty() => label,
            _ => "—",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum BadgeKind {
    Sniper,
    TheWall,
    Pickpocket,
    Maestro,
    Cleaner,
    MvpPerf,
    Energizer,
}

/// Derived achievement; recomputed from stats and never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Badge {
    pub kind: BadgeKind,
    pub label: String,
    pub description: String,
    pub icon: String,
}
