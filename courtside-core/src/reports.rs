use courtside_types::{
    CompletedGame, DashboardSummary, GameStats, MatchReport, Player, PlayerId, TrendPoint,
};

use crate::{BadgeEvaluator, StatEngine, exchange};

pub fn match_report(game: &CompletedGame, player: Option<&Player>) -> MatchReport {
    let player_name = player.map(|p| p.name.clone());
    MatchReport {
        game: game.clone(),
        total_points: StatEngine::total_points(&game.stats),
        total_rebounds: StatEngine::total_rebounds(&game.stats),
        shooting: StatEngine::shooting_splits(&game.stats),
        evaluation: StatEngine::evaluation(&game.stats),
        badges: BadgeEvaluator::evaluate(&game.stats),
        share_text: exchange::share_text(game, player_name.as_deref()),
        player_name,
    }
}

/// Aggregate the given games. Pass `player_id` to restrict to one player.
pub fn dashboard_summary(games: &[CompletedGame], player_id: Option<&PlayerId>) -> DashboardSummary {
    let mut selected: Vec<&CompletedGame> = games
        .iter()
        .filter(|game| player_id.is_none_or(|id| &game.player_id == id))
        .collect();
    // ISO 8601 strings sort chronologically
    selected.sort_by(|a, b| a.date.cmp(&b.date));

    let mut totals = GameStats::default();
    let mut total_points = 0u32;
    let mut total_rebounds = 0u32;
    let mut total_evaluation = 0i64;
    let mut best_evaluation: Option<i32> = None;
    let mut trend = Vec::with_capacity(selected.len());

    for game in &selected {
        let evaluation = StatEngine::evaluation(&game.stats);
        let points = StatEngine::total_points(&game.stats);
        totals.accumulate(&game.stats);
        total_points = total_points.saturating_add(points);
        // per game, so legacy and split records can be mixed
        total_rebounds = total_rebounds.saturating_add(StatEngine::total_rebounds(&game.stats));
        total_evaluation += evaluation as i64;
        best_evaluation = Some(best_evaluation.map_or(evaluation, |best| best.max(evaluation)));
        trend.push(TrendPoint {
            game_id: game.id.clone(),
            date: game.date.clone(),
            evaluation,
            points,
        });
    }

    let games_played = selected.len() as u32;
    DashboardSummary {
        player_id: player_id.cloned(),
        games_played,
        totals,
        total_points,
        total_rebounds,
        points_per_game: per_game(total_points as f64, games_played),
        rebounds_per_game: per_game(total_rebounds as f64, games_played),
        assists_per_game: per_game(totals.assists as f64, games_played),
        evaluation_per_game: per_game(total_evaluation as f64, games_played),
        best_evaluation,
        shooting: StatEngine::shooting_splits(&totals),
        trend,
    }
}

fn per_game(total: f64, games: u32) -> f64 {
    if games == 0 {
        return 0.0;
    }
    (total / games as f64 * 10.0).round() / 10.0
}
