use chrono::{DateTime, NaiveDate};
use courtside_types::{ApiError, CompletedGame};
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

use crate::{BadgeEvaluator, StatEngine};

const REQUIRED_FIELDS: [&str; 3] = ["stats", "playerId", "date"];

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("file is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("expected a match or a list of matches")]
    UnexpectedShape,
    #[error("file contains no matches")]
    Empty,
    #[error("entry {index} is not an object")]
    NotAnObject { index: usize },
    #[error("entry {index} is missing `{field}`")]
    MissingField { index: usize, field: &'static str },
    #[error("entry {index} is invalid: {reason}")]
    InvalidRecord { index: usize, reason: String },
}

impl From<ImportError> for ApiError {
    fn from(error: ImportError) -> Self {
        ApiError::InvalidImport {
            reason: error.to_string(),
        }
    }
}

pub fn export_game(game: &CompletedGame) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(game)
}

pub fn export_history(games: &[CompletedGame]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(games)
}

pub fn game_file_name(game: &CompletedGame) -> String {
    format!("match-{}-{}.json", calendar_date(&game.date), game.id)
}

pub fn history_file_name(today: NaiveDate) -> String {
    format!("history-{}.json", today.format("%Y-%m-%d"))
}

/// Parse an exported file. Either every entry is valid or nothing is
/// returned.
pub fn parse_import(text: &str) -> Result<Vec<CompletedGame>, ImportError> {
    let value: Value = serde_json::from_str(text)?;
    let entries = match value {
        Value::Array(entries) => entries,
        Value::Object(_) => vec![value],
        _ => return Err(ImportError::UnexpectedShape),
    };
    if entries.is_empty() {
        return Err(ImportError::Empty);
    }

    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| parse_entry(index, entry))
        .collect()
}

fn parse_entry(index: usize, entry: Value) -> Result<CompletedGame, ImportError> {
    let Value::Object(mut fields) = entry else {
        return Err(ImportError::NotAnObject { index });
    };

    for field in REQUIRED_FIELDS {
        if fields.get(field).is_none_or(Value::is_null) {
            return Err(ImportError::MissingField { index, field });
        }
    }
    normalize_id(&mut fields);

    serde_json::from_value(Value::Object(fields)).map_err(|e| ImportError::InvalidRecord {
        index,
        reason: e.to_string(),
    })
}

// Older exports used numeric ids.
fn normalize_id(fields: &mut Map<String, Value>) {
    let id = match fields.get("id") {
        Some(Value::String(id)) if !id.trim().is_empty() => return,
        Some(Value::Number(number)) => number.to_string(),
        _ => Uuid::new_v4().to_string(),
    };
    fields.insert("id".to_string(), Value::String(id));
}

/// Short plain-text summary for the platform share sheet or clipboard.
pub fn share_text(game: &CompletedGame, player_name: Option<&str>) -> String {
    let stats = &game.stats;
    let shooting = StatEngine::shooting_splits(stats);
    let mut lines = vec![
        format!(
            "🏀 {} vs {} ({})",
            player_name.unwrap_or("Unknown player"),
            game.opponent_label(),
            calendar_date(&game.date)
        ),
        format!(
            "Points: {} | Rebounds: {} | Assists: {}",
            StatEngine::total_points(stats),
            StatEngine::total_rebounds(stats),
            stats.assists
        ),
        format!(
            "Steals: {} | Blocks: {} | Turnovers: {}",
            stats.steals, stats.blocks, stats.turnovers
        ),
        format!(
            "FG: {}% | 3PT: {}% | FT: {}%",
            shooting.field_goal, shooting.three_point, shooting.free_throw
        ),
        format!("Evaluation: {}", StatEngine::evaluation(stats)),
    ];

    let badges = BadgeEvaluator::evaluate(stats);
    if !badges.is_empty() {
        let labels: Vec<&str> = badges.iter().map(|badge| badge.label.as_str()).collect();
        lines.push(format!("Badges: {}", labels.join(", ")));
    }
    lines.join("\n")
}

fn calendar_date(date: &str) -> String {
    match DateTime::parse_from_rfc3339(date) {
        Ok(parsed) => parsed.format("%Y-%m-%d").to_string(),
        Err(_) => date.chars().take(10).collect(),
    }
}
