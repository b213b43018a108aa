mod config;
mod engine;
pub(crate) mod error;
pub(crate) mod process;
mod state;

pub use config::{DEFAULT_TICK_PERIOD, EngineConfig};
pub use engine::SamplingEngine;
pub use state::{
    EngineReader, EngineReceiver, EngineStatus, EngineUpdate, LifecycleState, TickSample,
};
