use std::panic::AssertUnwindSafe;

use async_trait::async_trait;
use futures::FutureExt;

use super::error::PortError;

/// Trait for implementing output sinks that receive one value vector per tick.
///
/// Implementors own their on/off gate and the transport-specific operations. Transmission is
/// always driven through [`GatedPort::send`], which refuses to write while the port is closed and
/// cannot be overridden.
#[async_trait]
pub trait OutputPort: Send + 'static {
    /// Short name used in logs and errors.
    fn name(&self) -> &str;

    fn is_open(&self) -> bool;

    /// Opens the port. Opening an already open port is a no-op.
    fn open(&mut self);

    /// Closes the port unconditionally.
    fn close(&mut self);

    /// Waits until the transport is able to accept a write.
    async fn wait_ready(&mut self);

    /// Transmits `values`. Only called while the port is open.
    async fn write(&mut self, values: &[f64]) -> Result<(), PortError>;
}

/// Owner of an [`OutputPort`] enforcing that nothing is written while the port is closed.
///
/// Panics raised by the port's `wait_ready` or `write` are caught and returned as errors.
pub struct GatedPort(Box<dyn OutputPort>);

impl GatedPort {
    pub fn new(port: Box<dyn OutputPort>) -> Self {
        Self(port)
    }

    pub fn name(&self) -> &str {
        self.0.name()
    }

    pub fn is_open(&self) -> bool {
        self.0.is_open()
    }

    pub fn open(&mut self) {
        self.0.open();
    }

    pub fn close(&mut self) {
        self.0.close();
    }

    /// Waits for the port to become ready and writes `values` to it.
    ///
    /// Returns [`PortError::NotOpen`] without touching the transport if the port is closed.
    pub async fn send(&mut self, values: &[f64]) -> Result<(), PortError> {
        if !self.0.is_open() {
            return Err(PortError::NotOpen {
                port: self.0.name().to_string(),
            });
        }

        FutureExt::catch_unwind(AssertUnwindSafe(self.0.wait_ready()))
            .await
            .map_err(|e| PortError::WaitReadyPanicked(e.into()))?;

        FutureExt::catch_unwind(AssertUnwindSafe(self.0.write(values)))
            .await
            .map_err(|e| PortError::WritePanicked(e.into()))?
    }
}

impl From<Box<dyn OutputPort>> for GatedPort {
    fn from(port: Box<dyn OutputPort>) -> Self {
        Self::new(port)
    }
}
