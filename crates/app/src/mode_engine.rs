//! Occupancy mode engine: the deduplicated "who is home" cell.
//!
//! The engine owns the current [`OccupancyMode`] and a tokio [`broadcast`]
//! channel of [`ModeTransition`]s. Readers get a synchronous snapshot via
//! [`current`](OccupancyModeEngine::current) and an event stream via
//! [`subscribe`](OccupancyModeEngine::subscribe) or
//! [`changes`](OccupancyModeEngine::changes). The value present at
//! subscription time is never replayed as a change.

use climatehub_domain::flag::Flag;
use climatehub_domain::mode::{ModeInputs, ModeTransition, OccupancyMode};
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::{Stream, StreamExt};

use crate::ports::{FlagStore, Notifier, SensorReader};

/// Derives and publishes the occupancy mode.
pub struct OccupancyModeEngine {
    current: OccupancyMode,
    sender: broadcast::Sender<ModeTransition>,
}

impl OccupancyModeEngine {
    /// Evaluate `inputs` once and hold the result as the starting mode.
    ///
    /// `capacity` bounds how many transitions a slow subscriber may fall
    /// behind before it starts losing them.
    #[must_use]
    pub fn new(inputs: &ModeInputs, capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            current: inputs.evaluate(),
            sender,
        }
    }

    /// The mode in effect right now.
    #[must_use]
    pub fn current(&self) -> OccupancyMode {
        self.current
    }

    /// Re-derive the mode from fresh inputs.
    ///
    /// Returns the transition and publishes it only when the mode actually
    /// changed; unchanged inputs yield `None` and publish nothing.
    pub fn reevaluate(&mut self, inputs: &ModeInputs) -> Option<ModeTransition> {
        let next = inputs.evaluate();
        if next == self.current {
            return None;
        }
        let transition = ModeTransition {
            from: self.current,
            to: next,
        };
        self.current = next;
        tracing::info!(from = %transition.from, to = %transition.to, "occupancy mode changed");
        // no receivers is fine; the snapshot is still updated
        let _ = self.sender.send(transition);
        Some(transition)
    }

    /// Receive every transition published after this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ModeTransition> {
        self.sender.subscribe()
    }

    /// Transitions published after this call, as a [`Stream`].
    ///
    /// A subscriber that lags behind loses the oldest transitions; the loss
    /// is logged and the stream continues with the newest ones.
    pub fn changes(&self) -> impl Stream<Item = ModeTransition> + Send + use<> {
        BroadcastStream::new(self.sender.subscribe()).filter_map(|received| match received {
            Ok(transition) => Some(transition),
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "mode subscriber lagged, transitions dropped");
                None
            }
        })
    }
}

/// Snapshot the three inputs the mode is derived from.
pub fn read_inputs<H>(home: &H) -> ModeInputs
where
    H: FlagStore + SensorReader + ?Sized,
{
    ModeInputs {
        zone_occupants: home.zone_occupants(),
        vacation: home.is_on(&Flag::Vacation),
        guest: home.is_on(&Flag::Guest),
    }
}

/// Human-facing announcement for a mode change.
#[must_use]
pub fn announcement(mode: OccupancyMode) -> String {
    format!("Mode set to {mode}")
}

/// Forward every transition of `changes` to `notifier` until the stream ends.
///
/// Delivery failures are logged and the transition is dropped.
pub async fn announce_changes<S, N>(changes: S, notifier: N)
where
    S: Stream<Item = ModeTransition>,
    N: Notifier,
{
    let mut changes = std::pin::pin!(changes);
    while let Some(transition) = changes.next().await {
        if let Err(err) = notifier.notify(announcement(transition.to)).await {
            tracing::warn!(%err, mode = %transition.to, "failed to announce mode change");
        }
    }
}
