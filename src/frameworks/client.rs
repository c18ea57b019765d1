// Framework bootstrap for the match client runtime.

use crate::domain::systems::PuckArena;
use crate::domain::tuning::PlayerDefaults;
use crate::domain::{Phase, SetupError, build_players};
use crate::frameworks::config::{
    ACTION_CHANNEL_CAPACITY, ClientConfig, DRAIN_INTERVAL, GESTURE_CHANNEL_CAPACITY, MAX_FRAME_DT,
    RESULT_REDIRECT_DELAY,
};
use crate::interface_adapters::clients::GameApiClient;
use crate::interface_adapters::input::spawn_gesture_reader;
use crate::interface_adapters::net::{FeedError, FeedStats, run_feed};
use crate::interface_adapters::state::MatchContext;
use crate::interface_adapters::status::{emit_signal, status_listener};
use crate::use_cases::{
    GameLoop, LiveSessionStore, LoopSettings, NewRoom, NullSessionStore, RoomDetails, RoomError,
    RoomTarget, SessionStore, ShellSignal, prepare_room,
};

use std::{fmt, io, sync::Arc, time::Duration};
use tokio::sync::{Notify, mpsc};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{Instrument, debug, info, info_span, warn};

const FEED_SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

#[derive(Debug)]
pub enum ClientError {
    HttpClient(reqwest::Error),
    Room(RoomError),
    Setup(SetupError),
    Feed(FeedError),
    // The feed ended before the match did.
    FeedClosed,
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::HttpClient(err) => write!(f, "failed to initialize api client: {err}"),
            ClientError::Room(err) => write!(f, "room setup failed: {err}"),
            ClientError::Setup(err) => write!(f, "match setup failed: {err}"),
            ClientError::Feed(err) => write!(f, "{err}"),
            ClientError::FeedClosed => write!(f, "feed closed before the match finished"),
        }
    }
}

impl std::error::Error for ClientError {}

/// How a match run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    RedirectedToResult,
    Interrupted,
}

fn init_runtime() {
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

pub async fn run(config: ClientConfig) -> Result<RunOutcome, ClientError> {
    let api = GameApiClient::new(config.api_base_url.clone(), config.api_timeout)
        .map_err(ClientError::HttpClient)?;
    debug!(
        api_base_url = %api.base_url(),
        api_timeout_ms = config.api_timeout.as_millis(),
        "api client configured"
    );

    let target = match config.room_id.clone() {
        Some(room_id) => RoomTarget::Join { room_id },
        None => {
            let host_id = config.player_id.as_deref().unwrap_or_default();
            let room = NewRoom::new(host_id, &config.room_name, config.room_capacity)
                .map_err(ClientError::Room)?;
            RoomTarget::Create(room)
        }
    };

    let room = prepare_room(&api, target)
        .await
        .map_err(ClientError::Room)?;

    let span = info_span!("match", room_id = %room.room_id);
    play_match(config, api, room).instrument(span).await
}

pub async fn run_with_config() -> io::Result<()> {
    init_runtime();

    let config = ClientConfig::from_env();
    match run(config).await {
        Ok(outcome) => {
            info!(?outcome, "client finished");
            Ok(())
        }
        Err(e) => {
            tracing::error!(error = %e, "client failed");
            Err(io::Error::other(e.to_string()))
        }
    }
}

async fn play_match(
    config: ClientConfig,
    api: GameApiClient,
    room: RoomDetails,
) -> Result<RunOutcome, ClientError> {
    let players = build_players(&room.roster, PlayerDefaults::default()).map_err(setup_failed)?;

    let mut store: Box<dyn SessionStore + Send> = if config.headless {
        Box::new(NullSessionStore::new())
    } else {
        Box::new(LiveSessionStore::open())
    };
    store.subscribe(status_listener());

    let settings = LoopSettings {
        drain_interval: DRAIN_INTERVAL,
        redirect_delay: RESULT_REDIRECT_DELAY,
        ..LoopSettings::default()
    };
    let mut game = GameLoop::open(
        store,
        PuckArena::default(),
        players,
        config.player_id.clone(),
        settings,
    )
    .map_err(setup_failed)?;

    let context = MatchContext {
        api,
        room_id: room.room_id.clone(),
        local_player_id: config.player_id.clone(),
    };

    // Feed task: remote actions into the loop's queue.
    let (actions_tx, mut actions_rx) = mpsc::channel(ACTION_CHANNEL_CAPACITY);
    let shutdown = Arc::new(Notify::new());
    let mut feed_task = Some(tokio::spawn(
        run_feed(config.feed_url.clone(), actions_tx, shutdown.clone()).in_current_span(),
    ));

    let (gestures_tx, mut gestures_rx) = mpsc::channel(GESTURE_CHANNEL_CAPACITY);
    if config.read_stdin && context.local_player_id.is_some() {
        spawn_gesture_reader(io::BufReader::new(io::stdin()), gestures_tx);
    } else {
        drop(gestures_tx);
    }

    let mut interval = tokio::time::interval(config.frame_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut last_frame = Instant::now();

    let result = loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                info!("interrupted");
                break Ok(RunOutcome::Interrupted);
            }
            _ = interval.tick() => {}
        }

        let mut feed_done = false;
        loop {
            match actions_rx.try_recv() {
                Ok(action) => {
                    game.enqueue(action);
                }
                Err(mpsc::error::TryRecvError::Empty) => break,
                Err(mpsc::error::TryRecvError::Disconnected) => {
                    feed_done = true;
                    break;
                }
            }
        }
        if feed_done {
            if let Some(task) = feed_task.take() {
                match feed_loss(game.phase()) {
                    FeedLoss::KeepTicking => {
                        info!("feed closed after the finish; waiting for results");
                        stop_feed(task).await;
                    }
                    FeedLoss::Abort { setup_failed } => {
                        let error = feed_ended(task).await;
                        if setup_failed {
                            emit_signal(&ShellSignal::SetupFailed {
                                reason: error.to_string(),
                            });
                        }
                        break Err(error);
                    }
                }
            }
        }

        while let Ok(gesture) = gestures_rx.try_recv() {
            let Some(flick) = game.pointer_release(gesture) else {
                continue;
            };
            if let Some(submission) = context.submission(flick) {
                context.api.spawn_submit_action(submission);
            }
        }

        let now = Instant::now();
        let dt = now.duration_since(last_frame).min(MAX_FRAME_DT);
        last_frame = now;
        game.tick(dt);

        let mut redirected = false;
        for signal in game.take_signals() {
            emit_signal(&signal);
            redirected |= matches!(signal, ShellSignal::RedirectToResult);
        }
        if redirected {
            break Ok(RunOutcome::RedirectedToResult);
        }
    };

    shutdown.notify_one();
    if let Some(task) = feed_task {
        stop_feed(task).await;
    }
    game.close();
    result
}

/// What the frame loop does once the feed is gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FeedLoss {
    // Nothing left to receive; the redirect still has to fire.
    KeepTicking,
    Abort { setup_failed: bool },
}

fn feed_loss(phase: Phase) -> FeedLoss {
    match phase {
        Phase::Finished => FeedLoss::KeepTicking,
        // No action could ever have been applied: the match never got going.
        Phase::Countdown => FeedLoss::Abort { setup_failed: true },
        Phase::Waiting | Phase::Playing => FeedLoss::Abort {
            setup_failed: false,
        },
    }
}

// Waits for the feed task to wind down after shutdown was requested or the feed closed.
async fn stop_feed(mut task: JoinHandle<Result<FeedStats, FeedError>>) {
    // A feed still connecting only sees the shutdown once connected.
    match tokio::time::timeout(FEED_SHUTDOWN_GRACE, &mut task).await {
        Ok(Ok(Ok(stats))) => debug!(actions = stats.actions, "feed stopped"),
        Ok(Ok(Err(e))) => warn!(error = %e, "feed stopped with error"),
        Ok(Err(e)) => warn!(error = %e, "feed task failed"),
        Err(_) => {
            task.abort();
            warn!("feed did not stop in time; aborted");
        }
    }
}

// Resolves why the feed stopped before the match did.
async fn feed_ended(task: JoinHandle<Result<FeedStats, FeedError>>) -> ClientError {
    match task.await {
        Ok(Ok(stats)) => {
            warn!(actions = stats.actions, "feed ended before the match finished");
            ClientError::FeedClosed
        }
        Ok(Err(e)) => ClientError::Feed(e),
        Err(e) => {
            warn!(error = %e, "feed task failed");
            ClientError::FeedClosed
        }
    }
}

fn setup_failed(e: SetupError) -> ClientError {
    emit_signal(&ShellSignal::SetupFailed {
        reason: e.to_string(),
    });
    ClientError::Setup(e)
}
