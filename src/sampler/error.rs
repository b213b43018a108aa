use std::result;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("At least one signal function must be provided")]
    EmptyFunctions,

    #[error("At least one output port must be provided")]
    EmptyPorts,

    #[error("Engine is already active")]
    AlreadyActive,

    #[error("Engine has not been activated")]
    NotActivated,

    #[error("Engine was terminated and must be rebuilt to run again")]
    AlreadyTerminated,
}

impl EngineError {
    /// Returns `true` for errors caused by calling a lifecycle operation in the wrong state.
    pub fn is_invalid_state(&self) -> bool {
        matches!(
            self,
            Self::AlreadyActive | Self::NotActivated | Self::AlreadyTerminated
        )
    }
}

pub(super) type Result<T> = result::Result<T, EngineError>;
