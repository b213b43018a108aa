use std::{
    fmt,
    sync::{Arc, Mutex, MutexGuard},
};

use chrono::{DateTime, Utc};
use strum::Display;
use tokio::sync::broadcast;

use super::process::error::EngineProcessError;

/// Position of a [`SamplingEngine`](crate::sampler::SamplingEngine) in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum LifecycleState {
    /// Built but never activated.
    Created,
    /// Activated, with the run gate blocking the next tick.
    Paused,
    /// Activated, with the run gate open.
    Active,
    /// Terminated. The engine must be rebuilt to run again.
    Terminated,
}

/// Status of the background sampling process.
#[derive(Debug, Clone)]
pub enum EngineStatus {
    /// The process has not been started yet.
    Created,
    /// The process is running and blocked on the run gate.
    Paused,
    /// The process is running and producing ticks.
    Active,
    /// Termination was requested. A paused process stays here until it is resumed.
    StopRequested,
    /// The process observed the stop flag and exited.
    Terminated,
    /// The process exited because a tick failed.
    Crashed(Arc<EngineProcessError>),
}

impl EngineStatus {
    /// Returns `true` if the background process has exited, cleanly or not.
    pub fn is_stopped(&self) -> bool {
        matches!(self, Self::Terminated | Self::Crashed(_))
    }
}

impl fmt::Display for EngineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "Created"),
            Self::Paused => write!(f, "Paused"),
            Self::Active => write!(f, "Active"),
            Self::StopRequested => write!(f, "Stop requested"),
            Self::Terminated => write!(f, "Terminated"),
            Self::Crashed(error) => write!(f, "Crashed: {error}"),
        }
    }
}

impl From<EngineProcessError> for EngineStatus {
    fn from(value: EngineProcessError) -> Self {
        Self::Crashed(Arc::new(value))
    }
}

/// Values produced by one tick, in function registration order.
#[derive(Debug, Clone, PartialEq)]
pub struct TickSample {
    index: u64,
    time: DateTime<Utc>,
    values: Vec<f64>,
}

impl TickSample {
    pub(super) fn new(index: u64, values: Vec<f64>) -> Self {
        Self {
            index,
            time: Utc::now(),
            values,
        }
    }

    /// Returns the one-based tick counter since activation.
    pub fn index(&self) -> u64 {
        self.index
    }

    /// Returns the time at which the values were delivered to every port.
    pub fn time(&self) -> DateTime<Utc> {
        self.time
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

impl fmt::Display for TickSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tick {} at {}: {:?}", self.index, self.time, self.values)
    }
}

/// Update events emitted by the sampling engine.
#[derive(Debug, Clone)]
pub enum EngineUpdate {
    /// Engine status has changed.
    Status(EngineStatus),
    /// A tick was delivered to every port.
    Tick(TickSample),
}

impl From<EngineStatus> for EngineUpdate {
    fn from(value: EngineStatus) -> Self {
        Self::Status(value)
    }
}

pub(crate) type EngineTransmitter = broadcast::Sender<EngineUpdate>;

/// Receiver for subscribing to [`EngineUpdate`]s.
pub type EngineReceiver = broadcast::Receiver<EngineUpdate>;

/// Trait for reading engine status and subscribing to updates without being able to control the
/// engine.
pub trait EngineReader: Send + Sync + 'static {
    /// Creates a new [`EngineReceiver`] for subscribing to engine updates.
    fn update_receiver(&self) -> EngineReceiver;

    /// Returns the current [`EngineStatus`] as a snapshot.
    fn status_snapshot(&self) -> EngineStatus;
}

#[derive(Debug)]
pub(crate) struct EngineStatusManager {
    status: Mutex<EngineStatus>,
    update_tx: EngineTransmitter,
}

impl EngineStatusManager {
    pub fn new(update_tx: EngineTransmitter) -> Arc<Self> {
        let status = Mutex::new(EngineStatus::Created);

        Arc::new(Self { status, update_tx })
    }

    fn lock_status(&self) -> MutexGuard<'_, EngineStatus> {
        self.status
            .lock()
            .expect("`EngineStatusManager` mutex can't be poisoned")
    }

    pub fn update(&self, new_status: EngineStatus) {
        let mut status_guard = self.lock_status();
        *status_guard = new_status.clone();
        drop(status_guard);

        // Ignore no-receivers errors
        let _ = self.update_tx.send(new_status.into());
    }

    /// Updates the status unless the process already exited, so that lifecycle calls racing the
    /// process exit never hide a final status.
    pub fn update_unless_stopped(&self, new_status: EngineStatus) {
        let mut status_guard = self.lock_status();
        if status_guard.is_stopped() {
            return;
        }
        *status_guard = new_status.clone();

        // Sent under the lock so a concurrent final status is always broadcast last
        let _ = self.update_tx.send(new_status.into());
    }

    pub fn send_tick(&self, tick: TickSample) {
        let _ = self.update_tx.send(EngineUpdate::Tick(tick));
    }
}

impl EngineReader for EngineStatusManager {
    fn update_receiver(&self) -> EngineReceiver {
        self.update_tx.subscribe()
    }

    fn status_snapshot(&self) -> EngineStatus {
        self.lock_status().clone()
    }
}
