use courtside_types::{
    AgeCategory, ApiError, CompletedGame, GameStats, Player, PlayerId, SessionPhase, SessionSnapshot,
    StatKind,
};
use thiserror::Error;
use uuid::Uuid;

/// Fifth personal foul disqualifies the player.
pub const FOUL_OUT_LIMIT: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Player {player_id} is not on the roster")]
    UnknownPlayer { player_id: PlayerId },
    #[error("No match is being recorded")]
    NoActiveSession,
    #[error("Player has fouled out")]
    FouledOut,
    #[error("{} is not tracked for {}", .stat.label(), .category.as_str())]
    StatUnavailable { stat: StatKind, category: AgeCategory },
}

impl From<SessionError> for ApiError {
    fn from(error: SessionError) -> Self {
        match error {
            SessionError::UnknownPlayer { player_id } => ApiError::PlayerNotFound { player_id },
            SessionError::NoActiveSession => ApiError::NoActiveSession,
            SessionError::FouledOut => ApiError::FouledOut,
            SessionError::StatUnavailable { stat, .. } => ApiError::StatUnavailable {
                stat: stat.label().to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UndoEntry {
    pub stat: StatKind,
    pub previous: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndoOutcome {
    Restored(UndoEntry),
    NothingToUndo,
}

/// Live counters for the match currently being recorded.
#[derive(Debug, Clone, Default)]
pub struct LiveSession {
    player_id: Option<PlayerId>,
    category: AgeCategory,
    opponent: Option<String>,
    stats: GameStats,
    active: bool,
    elapsed_seconds: u32,
    timer_running: bool,
    undo_stack: Vec<UndoEntry>,
}

impl LiveSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Choose who is being recorded without starting the clock on counters.
    pub fn configure(&mut self, player: &Player, opponent: Option<String>) {
        self.player_id = Some(player.id.clone());
        self.category = player.level;
        self.opponent = opponent.filter(|label| !label.trim().is_empty());
        self.active = false;
    }

    pub fn start(&mut self, player: &Player, opponent: Option<String>) {
        self.configure(player, opponent);
        self.stats = GameStats::default();
        self.elapsed_seconds = 0;
        self.timer_running = false;
        self.undo_stack.clear();
        self.active = true;
    }

    pub fn phase(&self) -> SessionPhase {
        match (&self.player_id, self.active) {
            (None, _) => SessionPhase::Idle,
            (Some(_), false) => SessionPhase::Configuring,
            (Some(_), true) if self.stats.fouls >= FOUL_OUT_LIMIT => SessionPhase::FouledOut,
            (Some(_), true) => SessionPhase::Active,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn player_id(&self) -> Option<&PlayerId> {
        self.player_id.as_ref()
    }

    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    pub fn elapsed_seconds(&self) -> u32 {
        self.elapsed_seconds
    }

    pub fn timer_running(&self) -> bool {
        self.timer_running
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    /// The fifth foul must be confirmed by the user before it is applied.
    pub fn requires_foul_out_confirmation(&self, stat: StatKind) -> bool {
        self.active && stat == StatKind::Fouls && self.stats.fouls == FOUL_OUT_LIMIT - 1
    }

    pub fn increment(&mut self, stat: StatKind) -> Result<u32, SessionError> {
        if !self.active {
            return Err(SessionError::NoActiveSession);
        }
        if self.phase() == SessionPhase::FouledOut {
            return Err(SessionError::FouledOut);
        }
        if stat.is_three_point() && !self.category.allows_three_pointers() {
            return Err(SessionError::StatUnavailable {
                stat,
                category: self.category,
            });
        }

        let counter = self.stats.get_mut(stat);
        self.undo_stack.push(UndoEntry {
            stat,
            previous: *counter,
        });
        *counter += 1;
        Ok(*counter)
    }

    /// Corrections clamp at zero and are not recorded for undo.
    pub fn decrement(&mut self, stat: StatKind) -> Result<u32, SessionError> {
        if !self.active {
            return Err(SessionError::NoActiveSession);
        }
        let counter = self.stats.get_mut(stat);
        *counter = counter.saturating_sub(1);
        Ok(*counter)
    }

    pub fn undo(&mut self) -> UndoOutcome {
        match self.undo_stack.pop() {
            Some(entry) => {
                *self.stats.get_mut(entry.stat) = entry.previous;
                UndoOutcome::Restored(entry)
            }
            None => UndoOutcome::NothingToUndo,
        }
    }

    pub fn set_timer_running(&mut self, running: bool) {
        self.timer_running = running && self.active;
    }

    /// Returns whether the clock advanced.
    pub fn tick(&mut self) -> bool {
        if self.active && self.timer_running {
            self.elapsed_seconds += 1;
            true
        } else {
            false
        }
    }

    /// Package the counters into a finished game and return to idle.
    pub fn finish(&mut self, date: String) -> Option<CompletedGame> {
        let player_id = self.player_id.clone()?;
        if !self.active {
            return None;
        }

        let mut stats = self.stats;
        stats.time_played = self.elapsed_seconds;
        let game = CompletedGame {
            id: Uuid::new_v4().to_string(),
            date,
            player_id,
            opponent: self.opponent.take(),
            stats,
        };
        self.clear();
        Some(game)
    }

    /// Drop everything without producing a game.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase(),
            player_id: self.player_id.clone(),
            opponent: self.opponent.clone(),
            stats: self.stats,
            elapsed_seconds: self.elapsed_seconds,
            timer_running: self.timer_running,
            undo_depth: self.undo_stack.len() as u32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(level: AgeCategory) -> Player {
        Player {
            id: "p1".to_string(),
            name: "Ana".to_string(),
            number: "07".to_string(),
            position: "Guard".to_string(),
            level,
        }
    }

    fn started() -> LiveSession {
        let mut session = LiveSession::new();
        session.start(&player(AgeCategory::Senior), Some("Lions".to_string()));
        session
    }

    #[test]
    fn test_phases() {
        let mut session = LiveSession::new();
        assert_eq!(session.phase(), SessionPhase::Idle);
        session.configure(&player(AgeCategory::Senior), None);
        assert_eq!(session.phase(), SessionPhase::Configuring);
        session.start(&player(AgeCategory::Senior), None);
        assert_eq!(session.phase(), SessionPhase::Active);
    }

    #[test]
    fn test_increment_requires_active_session() {
        let mut session = LiveSession::new();
        assert_eq!(
            session.increment(StatKind::Assists),
            Err(SessionError::NoActiveSession)
        );
    }

    #[test]
    fn test_decrement_clamps_at_zero() {
        let mut session = started();
        session.increment(StatKind::Steals).unwrap();
        for _ in 0..5 {
            session.decrement(StatKind::Steals).unwrap();
        }
        assert_eq!(session.stats().steals, 0);
        // decrement leaves the undo stack alone
        assert_eq!(session.undo_depth(), 1);
    }

    #[test]
    fn test_undo_restores_previous_value() {
        let mut session = started();
        session.increment(StatKind::Points2).unwrap();
        session.increment(StatKind::Points2).unwrap();
        session.increment(StatKind::Assists).unwrap();

        assert_eq!(
            session.undo(),
            UndoOutcome::Restored(UndoEntry {
                stat: StatKind::Assists,
                previous: 0
            })
        );
        assert_eq!(session.stats().assists, 0);
        assert_eq!(session.stats().points_2, 2);
        assert_eq!(session.undo_depth(), 2);
    }

    #[test]
    fn test_undo_on_empty_stack() {
        let mut session = started();
        assert_eq!(session.undo(), UndoOutcome::NothingToUndo);
        assert_eq!(session.stats(), &GameStats::default());
    }

    #[test]
    fn test_foul_out_flow() {
        let mut session = started();
        for _ in 0..4 {
            assert!(!session.requires_foul_out_confirmation(StatKind::Fouls));
            session.increment(StatKind::Fouls).unwrap();
        }
        assert!(session.requires_foul_out_confirmation(StatKind::Fouls));
        assert!(!session.requires_foul_out_confirmation(StatKind::Assists));

        session.increment(StatKind::Fouls).unwrap();
        assert_eq!(session.phase(), SessionPhase::FouledOut);
        assert_eq!(
            session.increment(StatKind::Points2),
            Err(SessionError::FouledOut)
        );

        // undo is still allowed and lifts the foul out
        session.undo();
        assert_eq!(session.phase(), SessionPhase::Active);
    }

    #[test]
    fn test_youngest_category_has_no_three_pointers() {
        let mut session = LiveSession::new();
        session.start(&player(AgeCategory::U11), None);
        assert!(matches!(
            session.increment(StatKind::Points3),
            Err(SessionError::StatUnavailable { .. })
        ));
        assert_eq!(session.undo_depth(), 0);
        session.increment(StatKind::Points2).unwrap();
    }

    #[test]
    fn test_timer_only_ticks_while_running() {
        let mut session = LiveSession::new();
        session.set_timer_running(true);
        assert!(!session.tick());

        let mut session = started();
        assert!(!session.tick());
        session.set_timer_running(true);
        assert!(session.tick());
        assert!(session.tick());
        session.set_timer_running(false);
        assert!(!session.tick());
        assert_eq!(session.elapsed_seconds(), 2);
    }

    #[test]
    fn test_finish_packages_counters() {
        let mut session = started();
        session.increment(StatKind::Points3).unwrap();
        session.set_timer_running(true);
        session.tick();

        let game = session.finish("2026-03-01T10:00:00Z".to_string()).unwrap();
        assert_eq!(game.player_id, "p1");
        assert_eq!(game.opponent.as_deref(), Some("Lions"));
        assert_eq!(game.stats.points_3, 1);
        assert_eq!(game.stats.time_played, 1);
        assert_eq!(session.phase(), SessionPhase::Idle);
        assert_eq!(session.undo_depth(), 0);
    }

    #[test]
    fn test_finish_without_player_is_noop() {
        let mut session = LiveSession::new();
        assert!(session.finish("2026-03-01T10:00:00Z".to_string()).is_none());
    }
}
