use std::{mem, sync::Arc};

use tokio::sync::{
    Mutex as AsyncMutex,
    broadcast::{self, error::RecvError},
};

use crate::{
    function::{SignalClock, SignalFunction},
    port::{GatedPort, OutputPort},
};

use super::{
    config::EngineConfig,
    error::{EngineError, Result},
    process::{ExecutionContext, SamplingProcess, SharedFunctions, SharedPorts, lock_functions},
    state::{
        EngineReader, EngineReceiver, EngineStatus, EngineStatusManager, EngineUpdate,
        LifecycleState,
    },
};

enum Lifecycle {
    Created,
    Running(ExecutionContext),
    /// The retired context is kept so that a blocked process can still be woken up.
    Terminated(ExecutionContext),
}

/// Periodic driver sampling a fixed set of signal functions and delivering every tick's values to
/// a fixed set of output ports.
///
/// On each tick the engine samples every function in registration order, collects the values into
/// a vector in that same order, and sends the vector to every port in registration order. The
/// work runs in one background tokio task spawned by [`activate`](Self::activate).
///
/// # Lifecycle
///
/// ```text
/// Created --activate--> Paused <--resume/pause--> Active
///                          \                        /
///                           +------terminate-------+--> Terminated
/// ```
///
/// The run gate and the stop flag are independent: [`terminate`](Self::terminate) only raises the
/// stop flag, which the background task observes once it gets past the run gate. Terminating a
/// paused engine therefore takes two steps:
///
/// ```no_run
/// # async fn example(engine: siggen::sampler::SamplingEngine) -> siggen::error::Result<()> {
/// engine.terminate().await?;
/// // Wake the blocked task so that it can observe the stop flag and exit
/// engine.resume().await?;
/// # Ok(())
/// # }
/// ```
///
/// A terminated engine cannot be activated again; build a new one instead. Dropping the engine
/// aborts its background task. The task never holds up runtime shutdown, so the process may exit
/// in the middle of a tick.
pub struct SamplingEngine {
    config: EngineConfig,
    functions: SharedFunctions,
    ports: SharedPorts,
    lifecycle: AsyncMutex<Lifecycle>,
    status_manager: Arc<EngineStatusManager>,
}

impl SamplingEngine {
    /// Creates a new engine over the given functions and ports.
    ///
    /// `config` may be a plain tick period in seconds. Every function's step is set to the tick
    /// period. Returns an error if either list is empty.
    pub fn new(
        config: impl Into<EngineConfig>,
        functions: Vec<Box<dyn SignalFunction>>,
        ports: Vec<Box<dyn OutputPort>>,
    ) -> Result<Self> {
        if functions.is_empty() {
            return Err(EngineError::EmptyFunctions);
        }

        if ports.is_empty() {
            return Err(EngineError::EmptyPorts);
        }

        let config = config.into();

        let mut functions = functions;
        for function in functions.iter_mut() {
            function.set_step(config.tick_period());
        }

        let ports: Vec<GatedPort> = ports.into_iter().map(GatedPort::new).collect();

        let (update_tx, _) = broadcast::channel::<EngineUpdate>(config.update_buffer_size().get());

        let status_manager = EngineStatusManager::new(update_tx);

        Ok(Self {
            config,
            functions: Arc::new(std::sync::Mutex::new(functions)),
            ports: Arc::new(AsyncMutex::new(ports)),
            lifecycle: AsyncMutex::new(Lifecycle::Created),
            status_manager,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns a reader interface for accessing engine status and updates.
    pub fn reader(&self) -> Arc<dyn EngineReader> {
        self.status_manager.clone()
    }

    /// Creates a new receiver for subscribing to engine status updates and delivered ticks.
    pub fn update_receiver(&self) -> EngineReceiver {
        self.status_manager.update_receiver()
    }

    /// Returns the current status of the background process as a snapshot.
    pub fn status_snapshot(&self) -> EngineStatus {
        self.status_manager.status_snapshot()
    }

    /// Returns the current position of the engine in its lifecycle.
    pub async fn lifecycle_state(&self) -> LifecycleState {
        match &*self.lifecycle.lock().await {
            Lifecycle::Created => LifecycleState::Created,
            Lifecycle::Running(context) if context.gates().is_run_gate_open() => {
                LifecycleState::Active
            }
            Lifecycle::Running(_) => LifecycleState::Paused,
            Lifecycle::Terminated(_) => LifecycleState::Terminated,
        }
    }

    /// Returns a copy of every function's clock, in registration order.
    pub fn function_clocks(&self) -> Vec<SignalClock> {
        lock_functions(&self.functions)
            .iter()
            .map(|function| *function.clock())
            .collect()
    }

    /// Opens every port in registration order and starts the background process.
    ///
    /// The run gate starts blocked; no tick is produced until [`resume`](Self::resume) is called.
    /// Returns [`EngineError::AlreadyActive`] if the engine is running and
    /// [`EngineError::AlreadyTerminated`] if it was terminated.
    pub async fn activate(&self) -> Result<()> {
        let mut lifecycle = self.lifecycle.lock().await;

        match &*lifecycle {
            Lifecycle::Created => {}
            Lifecycle::Running(_) => return Err(EngineError::AlreadyActive),
            Lifecycle::Terminated(_) => return Err(EngineError::AlreadyTerminated),
        }

        let mut ports = self.ports.lock().await;
        for port in ports.iter_mut() {
            port.open();
            tracing::debug!(port = port.name(), "port opened");
        }
        drop(ports);

        self.status_manager.update(EngineStatus::Paused);

        let context = SamplingProcess::spawn(
            &self.config,
            self.functions.clone(),
            self.ports.clone(),
            self.status_manager.clone(),
        );

        *lifecycle = Lifecycle::Running(context);

        tracing::info!(
            tick_period = self.config.tick_period(),
            pace_ticks = self.config.pace_ticks(),
            "sampling engine activated"
        );

        Ok(())
    }

    /// Opens the run gate so that the background process produces ticks.
    ///
    /// On a terminated engine this wakes the retired process so that it can observe the stop
    /// flag and exit. Returns [`EngineError::NotActivated`] if the engine was never activated.
    pub async fn resume(&self) -> Result<()> {
        match &*self.lifecycle.lock().await {
            Lifecycle::Created => Err(EngineError::NotActivated),
            Lifecycle::Running(context) => {
                context.gates().open_run_gate();
                self.status_manager
                    .update_unless_stopped(EngineStatus::Active);
                tracing::debug!("sampling engine resumed");
                Ok(())
            }
            Lifecycle::Terminated(context) => {
                context.gates().open_run_gate();
                tracing::debug!("terminated sampling engine woken up");
                Ok(())
            }
        }
    }

    /// Closes the run gate. The background process blocks before its next tick; a tick already in
    /// flight completes.
    pub async fn pause(&self) -> Result<()> {
        match &*self.lifecycle.lock().await {
            Lifecycle::Created => Err(EngineError::NotActivated),
            Lifecycle::Running(context) => {
                context.gates().close_run_gate();
                self.status_manager
                    .update_unless_stopped(EngineStatus::Paused);
                tracing::debug!("sampling engine paused");
                Ok(())
            }
            Lifecycle::Terminated(_) => Err(EngineError::AlreadyTerminated),
        }
    }

    /// Resets every signal function in registration order.
    ///
    /// Allowed in any lifecycle state. The functions share one lock with the background process,
    /// so a reset lands between two ticks and never splits the values of a single tick. The next
    /// tick after a reset reproduces the first tick of a fresh engine.
    ///
    /// A panic raised by a function's `reset` propagates to the caller. The background process
    /// then exits on its next tick with [`EngineProcessError::FunctionsPoisoned`].
    ///
    /// [`EngineProcessError::FunctionsPoisoned`]: crate::error::EngineProcessError::FunctionsPoisoned
    pub fn reset(&self) {
        let mut functions = lock_functions(&self.functions);
        for function in functions.iter_mut() {
            function.reset();
        }

        tracing::debug!(functions = functions.len(), "signal functions reset");
    }

    /// Requests the background process to stop and closes every port in registration order.
    ///
    /// Waits for any in-flight tick to finish before closing the ports. The process only observes
    /// the stop flag once it gets past the run gate: if the engine is paused, [`resume`] must be
    /// called afterwards or the process stays blocked.
    ///
    /// Returns [`EngineError::NotActivated`] if the engine was never activated and
    /// [`EngineError::AlreadyTerminated`] if it was already terminated.
    ///
    /// [`resume`]: Self::resume
    pub async fn terminate(&self) -> Result<()> {
        let mut lifecycle = self.lifecycle.lock().await;

        let context = match mem::replace(&mut *lifecycle, Lifecycle::Created) {
            Lifecycle::Running(context) => context,
            other => {
                let err = match other {
                    Lifecycle::Created => EngineError::NotActivated,
                    _ => EngineError::AlreadyTerminated,
                };
                *lifecycle = other;
                return Err(err);
            }
        };

        self.status_manager
            .update_unless_stopped(EngineStatus::StopRequested);
        context.gates().request_stop();

        let mut ports = self.ports.lock().await;
        for port in ports.iter_mut() {
            port.close();
            tracing::debug!(port = port.name(), "port closed");
        }
        drop(ports);

        let paused = !context.gates().is_run_gate_open();
        *lifecycle = Lifecycle::Terminated(context);

        if paused {
            tracing::info!("sampling engine terminated while paused, resume to release the process");
        } else {
            tracing::info!("sampling engine terminated");
        }

        Ok(())
    }

    /// Waits until the background process has exited and returns the final status.
    ///
    /// Never returns for an engine that is not activated, or that was terminated while paused and
    /// not resumed afterwards.
    pub async fn until_stopped(&self) -> EngineStatus {
        let mut engine_rx = self.update_receiver();

        let status = self.status_snapshot();
        if status.is_stopped() {
            return status;
        }

        loop {
            match engine_rx.recv().await {
                Ok(engine_update) => {
                    if let EngineUpdate::Status(status) = engine_update
                        && status.is_stopped()
                    {
                        return status;
                    }
                }
                Err(RecvError::Lagged(_)) => {
                    let status = self.status_snapshot();
                    if status.is_stopped() {
                        return status;
                    }
                }
                Err(RecvError::Closed) => return self.status_snapshot(),
            }
        }
    }
}
