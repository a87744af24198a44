//! Event watcher
//!
//! Reads one [`Input`] on a blocking worker and forwards translated events
//! into a small bounded queue:
//!
//! ```text
//! device ──read_one──► translate ──try_send──► EventStream
//!                        │                        (capacity 10)
//!                        └─ sync / misc / unknown dropped
//! ```
//!
//! Publishing never blocks the reader. When the consumer falls behind and the
//! queue is full, the new event is dropped and counted. The worker stops once
//! the [`CancellationToken`] fires or the stream is dropped, closing the queue.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use super::discovery::{DeviceRole, Input};
use super::event::{ControllerEvent, Translation};
use super::device::RawInputDevice;
use crate::config::WatcherSettings;

#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    #[error("Invalid watcher settings: {0}")]
    InvalidSettings(String),
}

/// Counters shared between the worker and the stream
#[derive(Debug, Default)]
struct WatchStats {
    dropped_events: AtomicU64,
    read_failures: AtomicU64,
}

/// Receiving end of a watch, closed when the worker stops
#[derive(Debug)]
pub struct EventStream {
    receiver: mpsc::Receiver<ControllerEvent>,
    stats: Arc<WatchStats>,
    role: DeviceRole,
}

impl EventStream {
    /// Next event, `None` once the watcher has stopped
    pub async fn recv(&mut self) -> Option<ControllerEvent> {
        self.receiver.recv().await
    }

    pub fn try_recv(&mut self) -> Result<ControllerEvent, mpsc::error::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Role of the watched input
    pub fn role(&self) -> DeviceRole {
        self.role
    }

    /// Events lost because the queue was full
    pub fn dropped_events(&self) -> u64 {
        self.stats.dropped_events.load(Ordering::Relaxed)
    }

    /// Failed device reads so far
    pub fn read_failures(&self) -> u64 {
        self.stats.read_failures.load(Ordering::Relaxed)
    }
}

struct EventWatcher {
    device: Box<dyn RawInputDevice>,
    role: DeviceRole,
    sender: mpsc::Sender<ControllerEvent>,
    token: CancellationToken,
    stats: Arc<WatchStats>,
    read_error_backoff: Option<Duration>,
}

impl EventWatcher {
    fn run_watch_loop(mut self) {
        info!(
            "Running watcher for {} ({})",
            self.device.name(),
            self.device.path().display()
        );

        loop {
            if self.token.is_cancelled() {
                break;
            }

            let raw = match self.device.read_one() {
                Ok(raw) => raw,
                Err(e) => {
                    self.stats.read_failures.fetch_add(1, Ordering::Relaxed);
                    warn!("Unable to read from {}: {}", self.device.name(), e);
                    if let Some(backoff) = self.read_error_backoff {
                        std::thread::sleep(backoff);
                    }
                    continue;
                }
            };

            let event = match ControllerEvent::from_raw(raw) {
                Translation::Event(event) => event,
                Translation::Sync | Translation::Misc => continue,
                Translation::Unrecognized(raw) => {
                    warn!("Skipped: {:?}", raw);
                    continue;
                }
            };

            // A read in flight when the token fired still lands here; discard it
            if self.token.is_cancelled() {
                break;
            }

            match self.sender.try_send(event) {
                Ok(()) => trace!("Event queued"),
                Err(TrySendError::Full(event)) => {
                    self.stats.dropped_events.fetch_add(1, Ordering::Relaxed);
                    trace!("Queue full, dropped {}", event);
                }
                Err(TrySendError::Closed(_)) => {
                    debug!("Event stream dropped by consumer");
                    break;
                }
            }
        }

        info!(
            "Watcher for {} stopped ({} dropped events, {} read failures)",
            self.role,
            self.stats.dropped_events.load(Ordering::Relaxed),
            self.stats.read_failures.load(Ordering::Relaxed)
        );
    }
}

/// Watches an input with default settings
pub fn watch(token: CancellationToken, input: Input) -> Result<EventStream, WatchError> {
    watch_with(token, input, &WatcherSettings::default())
}

/// Starts a worker reading `input` until `token` is cancelled
///
/// Must be called from within a tokio runtime. The worker runs on the
/// blocking pool since device reads block; cancellation takes effect after
/// the read in flight returns.
///
/// # Errors
///
/// * [`WatchError::InvalidSettings`] - `queue_capacity` is zero
pub fn watch_with(
    token: CancellationToken,
    input: Input,
    settings: &WatcherSettings,
) -> Result<EventStream, WatchError> {
    if settings.queue_capacity == 0 {
        error!("Refusing to watch {} with a zero-sized queue", input.name());
        return Err(WatchError::InvalidSettings(
            "queue_capacity must be at least 1".to_string(),
        ));
    }

    let (sender, receiver) = mpsc::channel(settings.queue_capacity);
    debug!(
        "Created event channel with buffer capacity {}",
        settings.queue_capacity
    );

    let stats = Arc::new(WatchStats::default());
    let role = input.role;
    let watcher = EventWatcher {
        device: input.device,
        role,
        sender,
        token,
        stats: stats.clone(),
        read_error_backoff: match settings.read_error_backoff_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        },
    };

    let task_handle = tokio::task::spawn_blocking(move || watcher.run_watch_loop());
    debug!("Watcher task spawned with handle: {:?}", task_handle);

    Ok(EventStream {
        receiver,
        stats,
        role,
    })
}
