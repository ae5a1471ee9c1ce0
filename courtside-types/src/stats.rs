use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Raw counters recorded for one player during one game.
///
/// Every field defaults to zero so records written before a counter existed
/// still deserialize.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct GameStats {
    pub points_1: u32,
    pub missed_points_1: u32,
    pub points_2: u32,
    pub missed_points_2: u32,
    pub points_3: u32,
    pub missed_points_3: u32,
    pub offensive_rebounds: u32,
    pub defensive_rebounds: u32,
    /// Combined counter from before rebounds were split.
    pub rebounds: u32,
    pub assists: u32,
    pub steals: u32,
    pub blocks: u32,
    pub turnovers: u32,
    pub fouls: u32,
    /// Seconds on the clock while the player was recorded.
    pub time_played: u32,
}

/// Counters that can be changed from a live session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub enum StatKind {
    Points1,
    MissedPoints1,
    Points2,
    MissedPoints2,
    Points3,
    MissedPoints3,
    OffensiveRebounds,
    DefensiveRebounds,
    Assists,
    Steals,
    Blocks,
    Turnovers,
    Fouls,
}

impl StatKind {
    pub const ALL: [StatKind; 13] = [
        StatKind::Points1,
        StatKind::MissedPoints1,
        StatKind::Points2,
        StatKind::MissedPoints2,
        StatKind::Points3,
        StatKind::MissedPoints3,
        StatKind::OffensiveRebounds,
        StatKind::DefensiveRebounds,
        StatKind::Assists,
        StatKind::Steals,
        StatKind::Blocks,
        StatKind::Turnovers,
        StatKind::Fouls,
    ];

    pub fn is_three_point(self) -> bool {
        matches!(self, StatKind::Points3 | StatKind::MissedPoints3)
    }

    pub fn label(self) -> &'static str {
        match self {
            StatKind::Points1 => "Free throw made",
            StatKind::MissedPoints1 => "Free throw missed",
            StatKind::Points2 => "2PT made",
            StatKind::MissedPoints2 => "2PT missed",
            StatKind::Points3 => "3PT made",
            StatKind::MissedPoints3 => "3PT missed",
            StatKind::OffensiveRebounds => "Offensive rebound",
            StatKind::DefensiveRebounds => "Defensive rebound",
            StatKind::Assists => "Assist",
            StatKind::Steals => "Steal",
            StatKind::Blocks => "Block",
            StatKind::Turnovers => "Turnover",
            StatKind::Fouls => "Foul",
        }
    }
}

impl GameStats {
    pub fn get(&self, stat: StatKind) -> u32 {
        match stat {
            StatKind::Points1 => self.points_1,
            StatKind::MissedPoints1 => self.missed_points_1,
            StatKind::Points2 => self.points_2,
            StatKind::MissedPoints2 => self.missed_points_2,
            StatKind::Points3 => self.points_3,
            StatKind::MissedPoints3 => self.missed_points_3,
            StatKind::OffensiveRebounds => self.offensive_rebounds,
            StatKind::DefensiveRebounds => self.defensive_rebounds,
            StatKind::Assists => self.assists,
            StatKind::Steals => self.steals,
            StatKind::Blocks => self.blocks,
            StatKind::Turnovers => self.turnovers,
            StatKind::Fouls => self.fouls,
        }
    }

    pub fn get_mut(&mut self, stat: StatKind) -> &mut u32 {
        match stat {
            StatKind::Points1 => &mut self.points_1,
            StatKind::MissedPoints1 => &mut self.missed_points_1,
            StatKind::Points2 => &mut self.points_2,
            StatKind::MissedPoints2 => &mut self.missed_points_2,
            StatKind::Points3 => &mut self.points_3,
            StatKind::MissedPoints3 => &mut self.missed_points_3,
            StatKind::OffensiveRebounds => &mut self.offensive_rebounds,
            StatKind::DefensiveRebounds => &mut self.defensive_rebounds,
            StatKind::Assists => &mut self.assists,
            StatKind::Steals => &mut self.steals,
            StatKind::Blocks => &mut self.blocks,
            StatKind::Turnovers => &mut self.turnovers,
            StatKind::Fouls => &mut self.fouls,
        }
    }

    /// Field-wise saturating sum, used for career totals.
    pub fn accumulate(&mut self, other: &GameStats) {
        for stat in StatKind::ALL {
            let counter = self.get_mut(stat);
            *counter = counter.saturating_add(other.get(stat));
        }
        self.rebounds = self.rebounds.saturating_add(other.rebounds);
        self.time_played = self.time_played.saturating_add(other.time_played);
    }
}
