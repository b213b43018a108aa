use std::{
    panic::{self, AssertUnwindSafe},
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicBool, Ordering},
    },
};

use tokio::{
    sync::{Mutex as AsyncMutex, watch},
    time::{self, Interval, MissedTickBehavior},
};

use crate::{function::SignalFunction, port::GatedPort, util::AbortOnDropHandle};

use super::{
    config::EngineConfig,
    state::{EngineStatus, EngineStatusManager, TickSample},
};

pub(crate) mod error;

use error::{EngineProcessError, ProcessResult};

/// Signal functions shared by the engine and its process, in registration order.
pub(super) type SharedFunctions = Arc<Mutex<Vec<Box<dyn SignalFunction>>>>;

/// Output ports shared by the engine and its process, in registration order.
///
/// The process holds this lock for the whole delivery phase of a tick, so acquiring it from the
/// engine waits for any in-flight tick to complete.
pub(super) type SharedPorts = Arc<AsyncMutex<Vec<GatedPort>>>;

/// Locks the functions from the engine side.
///
/// A panic raised by a user `reset` or `clock` poisons the lock. The engine keeps serving its
/// callers, while the process reports the poisoning as a crash on its next tick.
pub(super) fn lock_functions(
    functions: &Mutex<Vec<Box<dyn SignalFunction>>>,
) -> MutexGuard<'_, Vec<Box<dyn SignalFunction>>> {
    functions.lock().unwrap_or_else(PoisonError::into_inner)
}

/// The two binary signals through which the engine controls its process.
#[derive(Debug)]
pub(super) struct Gates {
    run_gate: watch::Sender<bool>,
    stop_flag: Arc<AtomicBool>,
}

impl Gates {
    fn new() -> Self {
        let (run_gate, _) = watch::channel(false);

        Self {
            run_gate,
            stop_flag: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn open_run_gate(&self) {
        self.run_gate.send_replace(true);
    }

    pub fn close_run_gate(&self) {
        self.run_gate.send_replace(false);
    }

    pub fn is_run_gate_open(&self) -> bool {
        *self.run_gate.borrow()
    }

    pub fn request_stop(&self) {
        self.stop_flag.store(true, Ordering::Release);
    }
}

/// Background execution context of an activated engine.
#[derive(Debug)]
pub(super) struct ExecutionContext {
    gates: Gates,
    // Aborts the process when the engine is dropped
    _handle: AbortOnDropHandle<()>,
}

impl ExecutionContext {
    pub fn gates(&self) -> &Gates {
        &self.gates
    }
}

pub(super) struct SamplingProcess {
    config: EngineConfig,
    functions: SharedFunctions,
    ports: SharedPorts,
    run_gate_rx: watch::Receiver<bool>,
    stop_flag: Arc<AtomicBool>,
    status_manager: Arc<EngineStatusManager>,
}

impl SamplingProcess {
    /// Spawns the tick loop with a blocked run gate and a cleared stop flag.
    pub fn spawn(
        config: &EngineConfig,
        functions: SharedFunctions,
        ports: SharedPorts,
        status_manager: Arc<EngineStatusManager>,
    ) -> ExecutionContext {
        let gates = Gates::new();

        let process = Self {
            config: config.clone(),
            functions,
            ports,
            run_gate_rx: gates.run_gate.subscribe(),
            stop_flag: gates.stop_flag.clone(),
            status_manager,
        };

        let handle = tokio::spawn(process.run_to_completion()).into();

        ExecutionContext {
            gates,
            _handle: handle,
        }
    }

    fn pacer(&self) -> Option<Interval> {
        self.config.pace_ticks().then(|| {
            let mut interval = time::interval(self.config.tick_interval());
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval
        })
    }

    fn sample_all(&self) -> ProcessResult<Vec<f64>> {
        // Panics raised by `sample` are caught while the lock is held and never poison it
        let mut functions = self
            .functions
            .lock()
            .map_err(|_| EngineProcessError::FunctionsPoisoned)?;

        functions
            .iter_mut()
            .enumerate()
            .map(|(index, function)| {
                panic::catch_unwind(AssertUnwindSafe(|| function.sample())).map_err(|e| {
                    EngineProcessError::SamplePanicked {
                        index,
                        payload: e.into(),
                    }
                })
            })
            .collect()
    }

    async fn run(&mut self) -> ProcessResult<()> {
        let mut pacer = self.pacer();
        let mut tick_index: u64 = 0;

        loop {
            if let Some(pacer) = pacer.as_mut() {
                pacer.tick().await;
            }

            let was_paused = !*self.run_gate_rx.borrow();

            let gate_open = self.run_gate_rx.wait_for(|proceed| *proceed).await.is_ok();
            if !gate_open {
                return Err(EngineProcessError::RunGateDropped);
            }

            // Deadlines missed while paused are dropped, the next tick comes one period after
            // this one
            if was_paused && let Some(pacer) = pacer.as_mut() {
                pacer.reset();
            }

            let mut ports = self.ports.lock().await;

            if self.stop_flag.load(Ordering::Acquire) {
                return Ok(());
            }

            let values = self.sample_all()?;

            for (index, port) in ports.iter_mut().enumerate() {
                port.send(&values)
                    .await
                    .map_err(|source| EngineProcessError::Port { index, source })?;
            }

            drop(ports);

            tick_index += 1;
            tracing::trace!(tick = tick_index, ?values, "tick delivered");

            self.status_manager
                .send_tick(TickSample::new(tick_index, values));
        }
    }

    async fn run_to_completion(mut self) {
        let final_status = match self.run().await {
            Ok(()) => {
                tracing::info!("sampling process observed stop flag and exited");
                EngineStatus::Terminated
            }
            Err(e) => {
                tracing::error!(error = %e, "sampling process crashed");
                e.into()
            }
        };

        self.status_manager.update(final_status);
    }
}
