use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::{Badge, CompletedGame, GameStats, PlayerId};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ShootingSplits {
    pub field_goal: u32,
    pub three_point: u32,
    pub free_throw: u32,
    pub effective_field_goal: u32,
    pub true_shooting: u32,
}

/// Everything a match card, detail modal or share card displays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct MatchReport {
    pub game: CompletedGame,
    pub player_name: Option<String>,
    pub total_points: u32,
    pub total_rebounds: u32,
    pub shooting: ShootingSplits,
    pub evaluation: i32,
    pub badges: Vec<Badge>,
    pub share_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct TrendPoint {
    pub game_id: String,
    pub date: String,
    pub evaluation: i32,
    pub points: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DashboardSummary {
    /// `None` when aggregating the whole roster.
    pub player_id: Option<PlayerId>,
    pub games_played: u32,
    pub totals: GameStats,
    pub total_points: u32,
    pub total_rebounds: u32,
    pub points_per_game: f64,
    pub rebounds_per_game: f64,
    pub assists_per_game: f64,
    pub evaluation_per_game: f64,
    pub best_evaluation: Option<i32>,
    pub shooting: ShootingSplits,
    pub trend: Vec<TrendPoint>,
}
