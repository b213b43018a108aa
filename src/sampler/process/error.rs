use std::result;

use thiserror::Error;

use crate::{port::error::PortError, util::PanicPayload};

/// Errors that end the background sampling process.
#[derive(Error, Debug)]
pub enum EngineProcessError {
    #[error("Output port #{index} failed: {source}")]
    Port { index: usize, source: PortError },

    #[error("`SignalFunction::sample` of function #{index} panicked: {payload}")]
    SamplePanicked { index: usize, payload: PanicPayload },

    #[error("A signal function panicked outside of `sample`, its state can't be trusted")]
    FunctionsPoisoned,

    #[error("Run gate was dropped while the process was waiting on it")]
    RunGateDropped,
}

pub(crate) type ProcessResult<T> = result::Result<T, EngineProcessError>;
