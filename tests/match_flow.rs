mod support;

use flick_client::domain::systems::PuckArena;
use flick_client::domain::tuning::PlayerDefaults;
use flick_client::domain::{
    Phase, PointerGesture, Position, QueuedAction, RosterEntry, SessionEvent, SetupError,
    build_players,
};
use flick_client::interface_adapters::net::FeedError;
use flick_client::use_cases::{
    GameLoop, LiveSessionStore, LoopSettings, SessionStore, ShellSignal,
};
use flick_client::{ClientConfig, ClientError, RunOutcome};
use std::f32::consts::PI;
use std::sync::{Arc, Mutex};
use std::time::Duration;

const FRAME: Duration = Duration::from_millis(100);

fn entry(id: &str, x: f32, y: f32) -> RosterEntry {
    RosterEntry {
        id: id.to_string(),
        spawn: Some(Position::new(x, y)),
        ..RosterEntry::default()
    }
}

fn run_for(game: &mut GameLoop<PuckArena>, total: Duration) -> Vec<ShellSignal> {
    let mut elapsed = Duration::ZERO;
    let mut signals = Vec::new();
    while elapsed < total {
        game.tick(FRAME);
        signals.extend(game.take_signals());
        elapsed += FRAME;
    }
    signals
}

#[test]
fn when_pucks_are_flicked_off_then_last_one_standing_wins() {
    let players = build_players(
        &[entry("p1", -200.0, 0.0), entry("p2", 0.0, 0.0), entry("p3", 200.0, 0.0)],
        PlayerDefaults::default(),
    )
    .expect("roster should be valid");

    let events = Arc::new(Mutex::new(Vec::new()));
    let mut store = LiveSessionStore::open();
    let recorded = events.clone();
    store.subscribe(Box::new(move |event| {
        recorded.lock().expect("events lock").push(event.clone());
    }));

    let mut game = GameLoop::open(
        Box::new(store),
        PuckArena::default(),
        players,
        Some("p2".to_string()),
        LoopSettings::default(),
    )
    .expect("match should open");

    // Actions before play are dropped.
    assert!(!game.enqueue(QueuedAction {
        target_id: "p3".to_string(),
        angle: 0.0,
        magnitude: 100.0,
    }));

    let signals = run_for(&mut game, Duration::from_millis(4500));
    assert_eq!(game.phase(), Phase::Playing);
    assert!(signals.contains(&ShellSignal::Countdown(
        flick_client::use_cases::CountdownCue::Go
    )));

    assert!(game.enqueue(QueuedAction {
        target_id: "p3".to_string(),
        angle: 0.0,
        magnitude: 100.0,
    }));
    let signals = run_for(&mut game, Duration::from_secs(1));
    assert!(signals.contains(&ShellSignal::Eliminated {
        player_id: "p3".to_string()
    }));
    assert_eq!(game.phase(), Phase::Playing);

    game.enqueue(QueuedAction {
        target_id: "p1".to_string(),
        angle: PI,
        magnitude: 100.0,
    });
    let signals = run_for(&mut game, Duration::from_secs(1));
    assert!(signals.contains(&ShellSignal::Finished {
        winner_id: "p2".to_string()
    }));
    assert_eq!(game.phase(), Phase::Finished);

    // Local input is closed once the match is over.
    let gesture = PointerGesture {
        start: Position::new(0.0, 0.0),
        end: Position::new(-50.0, 0.0),
    };
    assert!(game.pointer_release(gesture).is_none());

    let signals = run_for(&mut game, Duration::from_secs(3));
    assert_eq!(signals, vec![ShellSignal::RedirectToResult]);

    let state = game.store().state();
    assert_eq!(state.winner.as_deref(), Some("p2"));
    assert_eq!(state.elimination_order, ["p2", "p3", "p1"]);
    assert!(!state.players["p1"].is_alive);
    assert!(state.players["p2"].is_alive);

    let events = events.lock().expect("events lock");
    assert!(events.contains(&SessionEvent::WinnerSet {
        winner_id: "p2".to_string()
    }));
    assert!(events.contains(&SessionEvent::PhaseChanged(Phase::Finished)));

    game.close();
}

#[test]
fn when_local_player_drags_during_play_then_flick_points_away_from_drag() {
    let players = build_players(
        &[entry("p1", -100.0, 0.0), entry("p2", 100.0, 0.0)],
        PlayerDefaults::default(),
    )
    .expect("roster should be valid");
    let mut game = GameLoop::open(
        Box::new(LiveSessionStore::open()),
        PuckArena::default(),
        players,
        Some("p1".to_string()),
        LoopSettings::default(),
    )
    .expect("match should open");
    run_for(&mut game, Duration::from_millis(4500));

    let flick = game
        .pointer_release(PointerGesture {
            start: Position::new(0.0, 0.0),
            end: Position::new(-40.0, 0.0),
        })
        .expect("local player may flick");

    assert!(flick.angle.abs() < 1e-6);
    assert!(flick.pull_power > 0.0);
}

fn client_config(api: &support::MockApi, feed_url: String) -> ClientConfig {
    ClientConfig {
        api_base_url: api.base_url.clone(),
        feed_url,
        api_timeout: Duration::from_millis(1500),
        room_id: None,
        player_id: Some("p1".to_string()),
        room_name: "end to end".to_string(),
        room_capacity: 2,
        headless: false,
        frame_interval: Duration::from_millis(16),
        read_stdin: false,
    }
}

#[tokio::test]
async fn when_client_runs_a_full_match_then_it_redirects_to_results() {
    let api = support::spawn_mock_api(vec![
        support::player("p1", -250.0, 0.0),
        support::player("p2", 250.0, 0.0),
    ])
    .await;
    // Keeps pushing p2 off the right edge; frames sent before play are dropped.
    let feed_url = support::spawn_feed_repeating(
        support::action_frame("p2", 0.0, 100.0),
        Duration::from_millis(100),
    )
    .await;

    let outcome = tokio::time::timeout(
        Duration::from_secs(20),
        flick_client::run(client_config(&api, feed_url)),
    )
    .await
    .expect("match should finish in time")
    .expect("match should run");

    assert_eq!(outcome, RunOutcome::RedirectedToResult);
}

#[tokio::test]
async fn when_feed_closes_after_the_finish_then_run_still_redirects() {
    let api = support::spawn_mock_api(vec![
        support::player("p1", -250.0, 0.0),
        support::player("p2", 250.0, 0.0),
    ])
    .await;
    // Play starts about 4.5 s in and p2 is off within a few frames, so the
    // close at 6 s lands after the finish and before the 3 s redirect delay ends.
    let feed_url = support::spawn_feed_repeating_until(
        support::action_frame("p2", 0.0, 100.0),
        Duration::from_millis(100),
        Some(Duration::from_secs(6)),
    )
    .await;

    let outcome = tokio::time::timeout(
        Duration::from_secs(20),
        flick_client::run(client_config(&api, feed_url)),
    )
    .await
    .expect("match should finish in time")
    .expect("a finished match is not a failure");

    assert_eq!(outcome, RunOutcome::RedirectedToResult);
}

#[tokio::test]
async fn when_feed_closes_during_countdown_then_run_fails() {
    let api = support::spawn_mock_api(vec![
        support::player("p1", -250.0, 0.0),
        support::player("p2", 250.0, 0.0),
    ])
    .await;
    let feed_url = support::spawn_feed_repeating_until(
        support::action_frame("p2", 0.0, 100.0),
        Duration::from_millis(100),
        Some(Duration::from_millis(500)),
    )
    .await;

    let result = tokio::time::timeout(
        Duration::from_secs(10),
        flick_client::run(client_config(&api, feed_url)),
    )
    .await
    .expect("run should stop in time");

    assert!(matches!(result, Err(ClientError::FeedClosed)));
}

#[tokio::test]
async fn when_feed_is_unreachable_then_run_reports_the_connect_error() {
    let api = support::spawn_mock_api(vec![
        support::player("p1", -250.0, 0.0),
        support::player("p2", 250.0, 0.0),
    ])
    .await;

    let result = tokio::time::timeout(
        Duration::from_secs(10),
        flick_client::run(client_config(&api, "ws://127.0.0.1:9/ws".to_string())),
    )
    .await
    .expect("run should stop in time");

    assert!(matches!(
        result,
        Err(ClientError::Feed(FeedError::Connect(_)))
    ));
}

#[tokio::test]
async fn when_room_does_not_exist_then_run_fails_before_play() {
    let api = support::spawn_mock_api(Vec::new()).await;
    let mut config = client_config(&api, "ws://127.0.0.1:9/ws".to_string());
    config.room_id = Some("missing".to_string());

    let result = flick_client::run(config).await;

    assert!(matches!(result, Err(ClientError::Room(_))));
}

#[tokio::test]
async fn when_roster_lacks_spawn_then_run_reports_setup_failure() {
    let mut no_spawn = support::player("p2", 0.0, 0.0);
    no_spawn.x = None;
    let api = support::spawn_mock_api(vec![support::player("p1", -100.0, 0.0), no_spawn]).await;

    let result = flick_client::run(client_config(&api, "ws://127.0.0.1:9/ws".to_string())).await;

    assert!(matches!(
        result,
        Err(ClientError::Setup(SetupError::MissingSpawn { .. }))
    ));
}
