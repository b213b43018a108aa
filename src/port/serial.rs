use std::io;

use async_trait::async_trait;
use tokio::{
    io::{AsyncWrite, AsyncWriteExt},
    time,
};

use super::{
    config::SerialLineConfig,
    core::OutputPort,
    error::{PortError, Result},
};

/// Byte sequence terminating every line sent by a [`SerialLinePort`].
pub const LINE_TERMINATOR: &[u8; 2] = b"\n\r";

/// Encodes `value` as an ASCII decimal followed by [`LINE_TERMINATOR`].
///
/// Integral values keep their fractional digit (`1.0`, not `1`), so that the receiving peer always
/// sees a decimal number.
pub fn encode_line(value: f64) -> Vec<u8> {
    let mut line = format!("{value:?}").into_bytes();
    line.extend_from_slice(LINE_TERMINATOR);
    line
}

/// Byte transport underneath a [`SerialLinePort`].
#[async_trait]
pub trait LineTransport: Send + 'static {
    /// Returns `true` if the transport can accept another line right now.
    fn is_writable(&self) -> bool;

    /// Transmits one already-terminated line.
    async fn transmit(&mut self, line: &[u8]) -> io::Result<()>;
}

/// [`LineTransport`] over any async byte stream, such as a serial device opened by the caller.
///
/// Streams expose no writability predicate, so the transport always reports itself writable and
/// relies on the stream's own backpressure.
#[derive(Debug)]
pub struct StreamTransport<W>(W);

impl<W> StreamTransport<W>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    pub fn new(stream: W) -> Self {
        Self(stream)
    }

    pub fn get_ref(&self) -> &W {
        &self.0
    }

    pub fn into_inner(self) -> W {
        self.0
    }
}

#[async_trait]
impl<W> LineTransport for StreamTransport<W>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    fn is_writable(&self) -> bool {
        true
    }

    async fn transmit(&mut self, line: &[u8]) -> io::Result<()> {
        self.0.write_all(line).await?;
        self.0.flush().await
    }
}

/// Line-oriented hardware sink.
///
/// Only the first element of every delivered vector is transmitted, encoded by [`encode_line`].
/// After each line the port sleeps for the configured settle time, bounding the transmission rate
/// of the peer.
pub struct SerialLinePort<T: LineTransport> {
    name: String,
    config: SerialLineConfig,
    transport: T,
    is_open: bool,
}

impl<T: LineTransport> SerialLinePort<T> {
    /// Creates a closed serial-line port over `transport`.
    pub fn new(name: impl Into<String>, config: SerialLineConfig, transport: T) -> Box<Self> {
        Box::new(Self {
            name: name.into(),
            config,
            transport,
            is_open: false,
        })
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}

#[async_trait]
impl<T: LineTransport> OutputPort for SerialLinePort<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_open(&self) -> bool {
        self.is_open
    }

    fn open(&mut self) {
        if !self.is_open {
            self.is_open = true;
        }
    }

    fn close(&mut self) {
        self.is_open = false;
    }

    async fn wait_ready(&mut self) {
        while !self.transport.is_writable() {
            time::sleep(self.config.poll_interval()).await;
        }
    }

    async fn write(&mut self, values: &[f64]) -> Result<()> {
        // Also checked by `GatedPort::send`; this port must never reach the wire while closed.
        if !self.is_open {
            return Err(PortError::NotOpen {
                port: self.name.clone(),
            });
        }

        let Some(&value) = values.first() else {
            return Err(PortError::EmptyPayload {
                port: self.name.clone(),
            });
        };

        let line = encode_line(value);

        self.transport
            .transmit(&line)
            .await
            .map_err(|source| PortError::Io {
                port: self.name.clone(),
                source,
            })?;

        tracing::trace!(port = %self.name, value, "line transmitted");

        time::sleep(self.config.settle_time()).await;

        Ok(())
    }
}

#[cfg(test)]
mod tests;
