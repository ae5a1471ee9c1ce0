use courtside_types::{
    CompletedGame, GameEdit, LocalSnapshot, Player, PlayerId, SessionSnapshot, StatKind,
};
use tracing::debug;

use crate::{LiveSession, SessionError, UndoOutcome};

#[derive(Debug, Clone)]
pub enum StoreEvent {
    RosterChanged { players: Vec<Player> },
    HistoryChanged { games: Vec<CompletedGame> },
    SessionChanged { session: SessionSnapshot },
}

/// Observer notified after every store mutation
pub trait StoreObserver: Send + Sync {
    fn on_store_event(&mut self, event: &StoreEvent);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// In-memory application state. Once remote sync runs this is a mirror of
/// the account's collections rather than the source of truth.
pub struct ClientStateStore {
    players: Vec<Player>,
    history: Vec<CompletedGame>,
    session: LiveSession,
    observers: Vec<(SubscriptionId, Box<dyn StoreObserver>)>,
    next_subscription: u64,
}

impl ClientStateStore {
    pub fn new() -> Self {
        Self {
            players: Vec::new(),
            history: Vec::new(),
            session: LiveSession::new(),
            observers: Vec::new(),
            next_subscription: 0,
        }
    }

    pub fn from_snapshot(snapshot: LocalSnapshot) -> Self {
        let mut store = Self::new();
        store.players = snapshot.players;
        store.history = snapshot.history;
        store
    }

    pub fn subscribe(&mut self, observer: Box<dyn StoreObserver>) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, observer));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(existing, _)| *existing != id);
        self.observers.len() != before
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    fn publish(&mut self, event: StoreEvent) {
        for (_, observer) in &mut self.observers {
            observer.on_store_event(&event);
        }
    }

    fn publish_roster(&mut self) {
        let players = self.players.clone();
        self.publish(StoreEvent::RosterChanged { players });
    }

    fn publish_history(&mut self) {
        let games = self.history.clone();
        self.publish(StoreEvent::HistoryChanged { games });
    }

    fn publish_session(&mut self) {
        let session = self.session.snapshot();
        self.publish(StoreEvent::SessionChanged { session });
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn history(&self) -> &[CompletedGame] {
        &self.history
    }

    pub fn session(&self) -> &LiveSession {
        &self.session
    }

    pub fn find_player(&self, player_id: &str) -> Option<&Player> {
        self.players.iter().find(|player| player.id == player_id)
    }

    pub fn find_game(&self, game_id: &str) -> Option<&CompletedGame> {
        self.history.iter().find(|game| game.id == game_id)
    }

    pub fn snapshot(&self) -> LocalSnapshot {
        LocalSnapshot {
            players: self.players.clone(),
            history: self.history.clone(),
        }
    }

    // Roster

    pub fn add_player(&mut self, player: Player) {
        self.players.push(player);
        self.publish_roster();
    }

    pub fn update_player(&mut self, player: Player) -> bool {
        let Some(existing) = self.players.iter_mut().find(|p| p.id == player.id) else {
            return false;
        };
        *existing = player;
        self.publish_roster();
        true
    }

    /// Games recorded for the player are kept.
    pub fn remove_player(&mut self, player_id: &str) -> bool {
        let before = self.players.len();
        self.players.retain(|player| player.id != player_id);
        if self.players.len() == before {
            return false;
        }
        self.publish_roster();
        true
    }

    /// Wholesale replacement from a remote snapshot.
    pub fn replace_players(&mut self, players: Vec<Player>) {
        debug!("Replacing roster with {} players", players.len());
        self.players = players;
        self.publish_roster();
    }

    // History

    pub fn add_game(&mut self, game: CompletedGame) {
        self.history.insert(0, game);
        self.publish_history();
    }

    pub fn update_game(&mut self, game_id: &str, edit: GameEdit) -> bool {
        let Some(game) = self.history.iter_mut().find(|g| g.id == game_id) else {
            return false;
        };
        game.apply_edit(edit);
        self.publish_history();
        true
    }

    pub fn remove_game(&mut self, game_id: &str) -> bool {
        let before = self.history.len();
        self.history.retain(|game| game.id != game_id);
        if self.history.len() == before {
            return false;
        }
        self.publish_history();
        true
    }

    pub fn replace_history(&mut self, games: Vec<CompletedGame>) {
        debug!("Replacing history with {} games", games.len());
        self.history = games;
        self.publish_history();
    }

    pub fn games_for_player(&self, player_id: &str) -> Vec<&CompletedGame> {
        self.history
            .iter()
            .filter(|game| game.player_id == player_id)
            .collect()
    }

    // Live session

    pub fn start_session(
        &mut self,
        player_id: &PlayerId,
        opponent: Option<String>,
    ) -> Result<(), SessionError> {
        let player = self
            .find_player(player_id)
            .cloned()
            .ok_or_else(|| SessionError::UnknownPlayer {
                player_id: player_id.clone(),
            })?;
        self.session.start(&player, opponent);
        self.publish_session();
        Ok(())
    }

    pub fn requires_foul_out_confirmation(&self, stat: StatKind) -> bool {
        self.session.requires_foul_out_confirmation(stat)
    }

    pub fn increment(&mut self, stat: StatKind) -> Result<u32, SessionError> {
        let value = self.session.increment(stat)?;
        self.publish_session();
        Ok(value)
    }

    pub fn decrement(&mut self, stat: StatKind) -> Result<u32, SessionError> {
        let value = self.session.decrement(stat)?;
        self.publish_session();
        Ok(value)
    }

    pub fn undo(&mut self) -> UndoOutcome {
        let outcome = self.session.undo();
        if let UndoOutcome::Restored(_) = outcome {
            self.publish_session();
        }
        outcome
    }

    pub fn set_timer_running(&mut self, running: bool) {
        self.session.set_timer_running(running);
        self.publish_session();
    }

    pub fn tick(&mut self) -> bool {
        let advanced = self.session.tick();
        if advanced {
            self.publish_session();
        }
        advanced
    }

    /// Ends the session, records the game locally and hands it back for
    /// remote persistence. `None` when nothing was being recorded.
    pub fn end_session(&mut self, date: String) -> Option<CompletedGame> {
        let game = self.session.finish(date)?;
        self.history.insert(0, game.clone());
        self.publish_history();
        self.publish_session();
        Some(game)
    }

    pub fn reset_session(&mut self) {
        self.session.clear();
        self.publish_session();
    }
}

impl Default for ClientStateStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courtside_types::{AgeCategory, SessionPhase};
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Recorder {
        events: Arc<Mutex<Vec<StoreEvent>>>,
    }

    impl StoreObserver for Recorder {
        fn on_store_event(&mut self, event: &StoreEvent) {
            self.events.lock().unwrap().push(event.clone());
        }
    }

    fn player(id: &str) -> Player {
        Player {
            id: id.to_string(),
            name: format!("Player {}", id),
            number: "4".to_string(),
            position: "Center".to_string(),
            level: AgeCategory::U15,
        }
    }

    #[test]
    fn test_start_session_unknown_player_is_rejected() {
        let mut store = ClientStateStore::new();
        let result = store.start_session(&"ghost".to_string(), None);
        assert!(matches!(result, Err(SessionError::UnknownPlayer { .. })));
        assert_eq!(store.session().phase(), SessionPhase::Idle);
    }

    #[test]
    fn test_observers_receive_events() {
        let mut store = ClientStateStore::new();
        let recorder = Recorder::default();
        store.subscribe(Box::new(recorder.clone()));

        store.add_player(player("a"));
        store.start_session(&"a".to_string(), None).unwrap();
        store.increment(StatKind::Assists).unwrap();

        let events = recorder.events.lock().unwrap();
        assert_eq!(events.len(), 3);
        assert!(matches!(events[0], StoreEvent::RosterChanged { .. }));
        assert!(matches!(events[2], StoreEvent::SessionChanged { .. }));
    }

    #[test]
    fn test_unsubscribe_stops_notifications() {
        let mut store = ClientStateStore::new();
        let recorder = Recorder::default();
        let id = store.subscribe(Box::new(recorder.clone()));
        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));

        store.add_player(player("a"));
        assert!(recorder.events.lock().unwrap().is_empty());
    }

    #[test]
    fn test_end_session_records_game() {
        let mut store = ClientStateStore::new();
        store.add_player(player("a"));
        store
            .start_session(&"a".to_string(), Some("Hawks".to_string()))
            .unwrap();
        store.increment(StatKind::Points2).unwrap();

        let game = store.end_session("2026-01-10T18:00:00Z".to_string()).unwrap();
        assert_eq!(store.history().len(), 1);
        assert_eq!(store.history()[0], game);
        assert_eq!(store.session().phase(), SessionPhase::Idle);
        assert!(store.end_session("2026-01-10T18:00:00Z".to_string()).is_none());
    }

    #[test]
    fn test_reset_session_discards_counters() {
        let mut store = ClientStateStore::new();
        store.add_player(player("a"));
        store.start_session(&"a".to_string(), None).unwrap();
        store.increment(StatKind::Blocks).unwrap();
        store.reset_session();

        assert!(store.history().is_empty());
        assert_eq!(store.session().undo_depth(), 0);
        assert_eq!(store.session().stats().blocks, 0);
    }

    #[test]
    fn test_remove_player_keeps_history() {
        let mut store = ClientStateStore::new();
        store.add_player(player("a"));
        store.start_session(&"a".to_string(), None).unwrap();
        store.end_session("2026-01-10T18:00:00Z".to_string());

        assert!(store.remove_player("a"));
        assert_eq!(store.games_for_player("a").len(), 1);
        assert!(!store.remove_player("a"));
    }

    #[test]
    fn test_replace_overwrites_local_lists() {
        let mut store = ClientStateStore::new();
        store.add_player(player("local"));
        store.replace_players(vec![player("remote-1"), player("remote-2")]);
        assert_eq!(store.players().len(), 2);
        assert!(store.find_player("local").is_none());
    }
}
