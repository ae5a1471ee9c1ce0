use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::PlayerId;

/// Age tiers, ordered from youngest to oldest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum AgeCategory {
    U11,
    U13,
    U15,
    #[default]
    Senior,
}

impl AgeCategory {
    pub const ALL: [AgeCategory; 4] = [
        AgeCategory::U11,
        AgeCategory::U13,
        AgeCategory::U15,
        AgeCategory::Senior,
    ];

    /// The youngest tier plays without a 3-point line.
    pub fn allows_three_pointers(self) -> bool {
        self != AgeCategory::U11
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AgeCategory::U11 => "U11",
            AgeCategory::U13 => "U13",
            AgeCategory::U15 => "U15",
            AgeCategory::Senior => "Senior",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(value.trim()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    /// Kept as text so "07" and "7" stay distinct.
    pub number: String,
    pub position: String,
    #[serde(default)]
    pub level: AgeCategory,
}

/// Roster form payload; the id is assigned on creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PlayerDraft {
    pub name: String,
    pub number: String,
    pub position: String,
    #[serde(default)]
    pub level: AgeCategory,
}

impl PlayerDraft {
    pub fn into_player(self, id: PlayerId) -> Player {
        Player {
            id,
            name: self.name,
            number: self.number,
            position: self.position,
            level: self.level,
        }
    }
}
