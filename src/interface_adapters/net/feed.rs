use crate::domain::QueuedAction;
use crate::interface_adapters::protocol::{FeedMessage, decode_feed_message};
use futures_util::StreamExt;
use std::{
    fmt,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::{Notify, mpsc};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{Instrument, debug, info, info_span, warn};

const LOG_THROTTLE: Duration = Duration::from_secs(2);

#[derive(Debug)]
pub enum FeedError {
    Connect(tokio_tungstenite::tungstenite::Error),
    Read(tokio_tungstenite::tungstenite::Error),
    // The game loop dropped its receiver.
    ActionsClosed,
}

impl fmt::Display for FeedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedError::Connect(err) => write!(f, "feed connect failed: {err}"),
            FeedError::Read(err) => write!(f, "feed read failed: {err}"),
            FeedError::ActionsClosed => write!(f, "action channel closed"),
        }
    }
}

impl std::error::Error for FeedError {}

/// Counters reported when the feed stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedStats {
    pub msgs_in: u64,
    pub bytes_in: u64,
    pub actions: u64,
    pub ignored: u64,
    pub invalid: u64,
    pub dropped_full: u64,
}

/// Turns feed text frames into queued actions for the game loop.
pub struct FeedReader {
    actions_tx: mpsc::Sender<QueuedAction>,
    stats: FeedStats,
    last_invalid_log: Instant,
    last_full_log: Instant,
}

impl FeedReader {
    pub fn new(actions_tx: mpsc::Sender<QueuedAction>) -> Self {
        let now = Instant::now()
            .checked_sub(LOG_THROTTLE)
            .unwrap_or_else(Instant::now);
        Self {
            actions_tx,
            stats: FeedStats::default(),
            last_invalid_log: now,
            last_full_log: now,
        }
    }

    pub fn stats(&self) -> FeedStats {
        self.stats
    }

    /// Handles one text frame. Malformed frames are counted and dropped.
    pub fn handle_text(&mut self, text: &str) -> Result<(), FeedError> {
        self.stats.msgs_in += 1;
        self.stats.bytes_in += text.len() as u64;

        let action = match decode_feed_message(text) {
            Ok(FeedMessage::Action(action)) => action,
            Ok(FeedMessage::Ignored { kind }) => {
                self.stats.ignored += 1;
                debug!(%kind, "ignoring feed message");
                return Ok(());
            }
            Err(e) => {
                self.stats.invalid += 1;
                if should_log(&mut self.last_invalid_log) {
                    warn!(
                        bytes = text.len(),
                        error = %e,
                        invalid = self.stats.invalid,
                        "failed to decode feed message"
                    );
                }
                return Ok(());
            }
        };

        match self.actions_tx.try_send(action) {
            Ok(()) => {
                self.stats.actions += 1;
                Ok(())
            }
            Err(mpsc::error::TrySendError::Full(action)) => {
                self.stats.dropped_full += 1;
                if should_log(&mut self.last_full_log) {
                    warn!(target_id = %action.target_id, "action channel full; dropping action");
                }
                Ok(())
            }
            Err(mpsc::error::TrySendError::Closed(_)) => Err(FeedError::ActionsClosed),
        }
    }
}

fn should_log(last: &mut Instant) -> bool {
    if last.elapsed() >= LOG_THROTTLE {
        *last = Instant::now();
        true
    } else {
        false
    }
}

/// Connects to the feed and forwards actions until shutdown or disconnect.
pub async fn run_feed(
    url: String,
    actions_tx: mpsc::Sender<QueuedAction>,
    shutdown: Arc<Notify>,
) -> Result<FeedStats, FeedError> {
    let span = info_span!("feed", url = %url);
    read_feed(url, actions_tx, shutdown).instrument(span).await
}

async fn read_feed(
    url: String,
    actions_tx: mpsc::Sender<QueuedAction>,
    shutdown: Arc<Notify>,
) -> Result<FeedStats, FeedError> {
    let (mut socket, _response) = connect_async(url.as_str())
        .await
        .map_err(FeedError::Connect)?;
    info!("feed connected");

    let mut reader = FeedReader::new(actions_tx);
    let mut fatal: Option<FeedError> = None;

    loop {
        tokio::select! {
            _ = shutdown.notified() => {
                debug!("feed shutdown requested");
                break;
            }
            incoming = socket.next() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        if let Err(e) = reader.handle_text(text.as_str()) {
                            fatal = Some(e);
                            break;
                        }
                    }
                    Some(Ok(Message::Binary(bytes))) => {
                        if should_log(&mut reader.last_invalid_log) {
                            warn!(bytes = bytes.len(), "binary feed messages not supported; dropping");
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        info!("feed closed by server");
                        break;
                    }
                    // Ping/Pong are answered by tungstenite itself.
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        fatal = Some(FeedError::Read(e));
                        break;
                    }
                }
            }
        }
    }

    if let Err(e) = socket.close(None).await {
        debug!(error = %e, "feed close error");
    }

    let stats = reader.stats();
    debug!(
        msgs_in = stats.msgs_in,
        bytes_in = stats.bytes_in,
        actions = stats.actions,
        ignored = stats.ignored,
        invalid = stats.invalid,
        dropped_full = stats.dropped_full,
        "feed stats"
    );

    match fatal {
        Some(e) => Err(e),
        None => Ok(stats),
    }
}
