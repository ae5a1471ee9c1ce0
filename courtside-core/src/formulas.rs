use courtside_types::{GameStats, ShootingSplits};

/// Derived basketball metrics. Every screen goes through these functions so
/// a given game always shows the same numbers.
pub struct StatEngine;

impl StatEngine {
    pub fn total_points(stats: &GameStats) -> u32 {
        stats
            .points_1
            .saturating_add(stats.points_2.saturating_mul(2))
            .saturating_add(stats.points_3.saturating_mul(3))
    }

    /// Split counters win; the legacy combined counter is only read when both
    /// split counters are zero.
    pub fn total_rebounds(stats: &GameStats) -> u32 {
        let split = stats.offensive_rebounds.saturating_add(stats.defensive_rebounds);
        if split > 0 { split } else { stats.rebounds }
    }

    // Imported counters can be arbitrarily large; integer sums saturate.
    pub fn field_goal_attempts(stats: &GameStats) -> u32 {
        sum(&[
            stats.points_2,
            stats.points_3,
            stats.missed_points_2,
            stats.missed_points_3,
        ])
    }

    pub fn free_throw_attempts(stats: &GameStats) -> u32 {
        stats.points_1.saturating_add(stats.missed_points_1)
    }

    pub fn missed_shots(stats: &GameStats) -> u32 {
        sum(&[stats.missed_points_1, stats.missed_points_2, stats.missed_points_3])
    }

    pub fn field_goal_percentage(stats: &GameStats) -> u32 {
        percentage(
            stats.points_2 as f64 + stats.points_3 as f64,
            field_goal_attempts_exact(stats),
        )
    }

    pub fn three_point_percentage(stats: &GameStats) -> u32 {
        percentage(
            stats.points_3 as f64,
            stats.points_3 as f64 + stats.missed_points_3 as f64,
        )
    }

    pub fn free_throw_percentage(stats: &GameStats) -> u32 {
        percentage(
            stats.points_1 as f64,
            stats.points_1 as f64 + stats.missed_points_1 as f64,
        )
    }

    pub fn effective_field_goal_percentage(stats: &GameStats) -> u32 {
        let made = stats.points_2 as f64 + 1.5 * stats.points_3 as f64;
        percentage(made, field_goal_attempts_exact(stats))
    }

    pub fn true_shooting_percentage(stats: &GameStats) -> u32 {
        let points =
            stats.points_1 as f64 + 2.0 * stats.points_2 as f64 + 3.0 * stats.points_3 as f64;
        let attempts = field_goal_attempts_exact(stats)
            + 0.44 * (stats.points_1 as f64 + stats.missed_points_1 as f64);
        percentage(points, 2.0 * attempts)
    }

    /// Additive efficiency rating. Can go negative.
    pub fn evaluation(stats: &GameStats) -> i32 {
        let positive = i64::from(Self::total_points(stats))
            + i64::from(Self::total_rebounds(stats))
            + i64::from(stats.assists)
            + i64::from(stats.steals)
            + i64::from(stats.blocks);
        let negative = i64::from(Self::missed_shots(stats))
            + i64::from(stats.turnovers)
            + i64::from(stats.fouls);
        (positive - negative).clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
    }

    pub fn shooting_splits(stats: &GameStats) -> ShootingSplits {
        ShootingSplits {
            field_goal: Self::field_goal_percentage(stats),
            three_point: Self::three_point_percentage(stats),
            free_throw: Self::free_throw_percentage(stats),
            effective_field_goal: Self::effective_field_goal_percentage(stats),
            true_shooting: Self::true_shooting_percentage(stats),
        }
    }
}

fn sum(counters: &[u32]) -> u32 {
    counters.iter().fold(0, |total, &n| total.saturating_add(n))
}

fn field_goal_attempts_exact(stats: &GameStats) -> f64 {
    stats.points_2 as f64
        + stats.points_3 as f64
        + stats.missed_points_2 as f64
        + stats.missed_points_3 as f64
}

/// Rounded (half up) integer percentage; 0 when nothing was attempted.
fn percentage(numerator: f64, denominator: f64) -> u32 {
    if denominator <= 0.0 {
        return 0;
    }
    (100.0 * numerator / denominator).round() as u32
}
