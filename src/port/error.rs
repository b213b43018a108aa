use std::{io, result};

use thiserror::Error;

use crate::util::PanicPayload;

#[derive(Error, Debug)]
pub enum PortError {
    #[error("Port `{port}` is not open")]
    NotOpen { port: String },

    #[error("Port `{port}` received an empty value vector")]
    EmptyPayload { port: String },

    #[error("Port `{port}` transport error: {source}")]
    Io { port: String, source: io::Error },

    #[error("`OutputPort::wait_ready` panicked: {0}")]
    WaitReadyPanicked(PanicPayload),

    #[error("`OutputPort::write` panicked: {0}")]
    WritePanicked(PanicPayload),
}

impl PortError {
    /// Returns `true` if the error was caused by using a port in the wrong state rather than by
    /// the underlying transport.
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, Self::NotOpen { .. })
    }
}

pub(super) type Result<T> = result::Result<T, PortError>;
