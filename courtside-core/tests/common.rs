#![allow(dead_code)]

use courtside_core::ClientStateStore;
use courtside_types::{AgeCategory, GameStats, Player, StatKind};

/// Creates a roster player with a predictable id
pub fn create_test_player(name: &str, level: AgeCategory) -> Player {
    Player {
        id: format!("test-player-{}", name.to_lowercase()),
        name: name.to_string(),
        number: "00".to_string(),
        position: "Guard".to_string(),
        level,
    }
}

/// Store with two senior players and one U11 player
pub fn create_test_store() -> ClientStateStore {
    let mut store = ClientStateStore::new();
    store.add_player(create_test_player("Alice", AgeCategory::Senior));
    store.add_player(create_test_player("Bob", AgeCategory::Senior));
    store.add_player(create_test_player("Mini", AgeCategory::U11));
    store
}

/// Applies `count` increments of `stat`
pub fn record(store: &mut ClientStateStore, stat: StatKind, count: u32) {
    for _ in 0..count {
        store.increment(stat).expect("increment should apply");
    }
}

/// The stat line used throughout the scenario tests
pub fn scenario_stats() -> GameStats {
    GameStats {
        points_1: 4,
        missed_points_1: 0,
        points_2: 3,
        missed_points_2: 1,
        points_3: 1,
        missed_points_3: 2,
        offensive_rebounds: 3,
        defensive_rebounds: 5,
        assists: 5,
        steals: 4,
        blocks: 2,
        turnovers: 0,
        fouls: 1,
        ..Default::default()
    }
}
