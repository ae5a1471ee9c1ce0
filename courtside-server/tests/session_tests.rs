mod test_helpers;

use std::time::Duration;

use courtside_core::UndoOutcome;
use courtside_server::app_state::IncrementOutcome;
use courtside_types::{AgeCategory, ApiError, LocalSnapshot, SessionPhase, StatKind};
use test_helpers::*;

async fn setup_with_roster() -> TestServerSetup {
    TestServerSetup::with_local_snapshot(Some(LocalSnapshot {
        players: vec![
            create_test_player("Alice", AgeCategory::Senior),
            create_test_player("Mini", AgeCategory::U11),
        ],
        history: Vec::new(),
    }))
    .await
}

#[tokio::test]
async fn test_fifth_foul_needs_confirmation() {
    let setup = setup_with_roster().await;
    setup.state.start_session(&"player-alice".to_string(), None).await.unwrap();

    for _ in 0..4 {
        setup.state.increment(StatKind::Fouls, false).await.unwrap();
    }
    let outcome = setup.state.increment(StatKind::Fouls, false).await.unwrap();
    assert_eq!(outcome, IncrementOutcome::ConfirmationRequired);
    assert_eq!(setup.state.session().await.stats.fouls, 4);

    let outcome = setup.state.increment(StatKind::Fouls, true).await.unwrap();
    assert_eq!(outcome, IncrementOutcome::Applied { value: 5 });
    assert_eq!(setup.state.session().await.phase, SessionPhase::FouledOut);

    // Only corrections are allowed now
    let blocked = setup.state.increment(StatKind::Points2, false).await;
    assert_eq!(blocked, Err(ApiError::FouledOut));
    assert!(matches!(setup.state.undo().await, UndoOutcome::Restored(_)));
    assert_eq!(setup.state.session().await.phase, SessionPhase::Active);
}

#[tokio::test]
async fn test_unknown_player_cannot_start() {
    let setup = setup_with_roster().await;
    let result = setup.state.start_session(&"nobody".to_string(), None).await;
    assert_eq!(
        result,
        Err(ApiError::PlayerNotFound {
            player_id: "nobody".to_string()
        })
    );
    assert_eq!(setup.state.session().await.phase, SessionPhase::Idle);
}

#[tokio::test]
async fn test_three_pointers_unavailable_for_u11() {
    let setup = setup_with_roster().await;
    setup.state.start_session(&"player-mini".to_string(), None).await.unwrap();

    let result = setup.state.increment(StatKind::Points3, false).await;
    assert!(matches!(result, Err(ApiError::StatUnavailable { .. })));
    assert_eq!(
        setup.state.increment(StatKind::Points2, false).await,
        Ok(IncrementOutcome::Applied { value: 1 })
    );
}

#[tokio::test]
async fn test_reset_requires_confirmation() {
    let setup = setup_with_roster().await;
    setup.state.start_session(&"player-alice".to_string(), None).await.unwrap();
    setup.state.increment(StatKind::Steals, false).await.unwrap();

    let refused = setup.state.reset_session(false).await;
    assert!(matches!(refused, Err(ApiError::ConfirmationRequired { .. })));
    assert_eq!(setup.state.session().await.stats.steals, 1);

    setup.state.reset_session(true).await.unwrap();
    assert_eq!(setup.state.session().await.phase, SessionPhase::Idle);
    assert!(setup.state.history().await.is_empty());
}

#[tokio::test]
async fn test_end_without_session_is_a_no_op() {
    let setup = setup_with_roster().await;
    assert!(setup.state.end_session().await.is_none());
    assert!(setup.state.history().await.is_empty());
}

#[tokio::test]
async fn test_timer_counts_only_while_running() {
    let setup = setup_with_roster().await;

    let refused = setup.state.set_timer_running(true).await;
    assert_eq!(refused, Err(ApiError::NoActiveSession));

    setup.state.start_session(&"player-alice".to_string(), None).await.unwrap();
    setup.state.set_timer_running(true).await.unwrap();
    assert!(wait_for(setup.state.store(), |store| store.session().elapsed_seconds() >= 3).await);

    setup.state.set_timer_running(false).await.unwrap();
    assert!(!setup.state.timer_running());
    let paused_at = setup.state.session().await.elapsed_seconds;
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(setup.state.session().await.elapsed_seconds, paused_at);
}

#[tokio::test]
async fn test_end_session_records_time_played_and_stops_clock() {
    let setup = setup_with_roster().await;
    setup.state.start_session(&"player-alice".to_string(), None).await.unwrap();
    setup.state.set_timer_running(true).await.unwrap();
    assert!(wait_for(setup.state.store(), |store| store.session().elapsed_seconds() >= 2).await);

    let end = setup.state.end_session().await.unwrap();
    assert!(end.game.stats.time_played >= 2);
    assert!(!setup.state.timer_running());
    assert_eq!(setup.state.session().await.phase, SessionPhase::Idle);
}
