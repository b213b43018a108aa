use std::io::{self, Write};

use async_trait::async_trait;
use chrono::Utc;
use tokio::time;

use crate::util::DateTimeExt;

use super::{
    config::ConsolePortConfig,
    core::OutputPort,
    error::{PortError, Result},
};

const CONSOLE_PORT_NAME: &str = "console";

/// Human-readable sink printing one timestamped line per delivered vector.
///
/// Each line has the form `[<local time>] Port send: [<v1>, <v2>, ...]`. It is meant for
/// inspecting the engine, not for machine parsing. Lines go to stdout unless another writer is
/// provided.
pub struct ConsolePort {
    config: ConsolePortConfig,
    is_open: bool,
    out: Box<dyn Write + Send>,
}

impl ConsolePort {
    /// Creates a closed console port writing to stdout with the default configuration.
    pub fn new() -> Box<Self> {
        Self::with_config(ConsolePortConfig::default())
    }

    /// Creates a closed console port writing to stdout.
    pub fn with_config(config: ConsolePortConfig) -> Box<Self> {
        Self::with_writer(config, io::stdout())
    }

    /// Creates a closed console port writing lines to `out`.
    pub fn with_writer(config: ConsolePortConfig, out: impl Write + Send + 'static) -> Box<Self> {
        Box::new(Self {
            config,
            is_open: false,
            out: Box::new(out),
        })
    }

    fn io_error(source: io::Error) -> PortError {
        PortError::Io {
            port: CONSOLE_PORT_NAME.to_string(),
            source,
        }
    }
}

#[async_trait]
impl OutputPort for ConsolePort {
    fn name(&self) -> &str {
        CONSOLE_PORT_NAME
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
        time::sleep(self.config.ready_delay()).await;
    }

    async fn write(&mut self, values: &[f64]) -> Result<()> {
        let line = format!(
            "[{}] Port send: {:?}",
            Utc::now().format_local_millis(),
            values
        );

        writeln!(self.out, "{line}").map_err(Self::io_error)?;
        self.out.flush().map_err(Self::io_error)?;

        tracing::debug!(port = CONSOLE_PORT_NAME, "{line}");

        Ok(())
    }
}
