use tokio::time;

/// Lower bound for [`SerialLineConfig::poll_interval`].
pub const MIN_POLL_INTERVAL: time::Duration = time::Duration::from_micros(100);

/// Configuration for the [`ConsolePort`](crate::port::ConsolePort).
#[derive(Clone, Debug)]
pub struct ConsolePortConfig {
    ready_delay: time::Duration,
}

impl Default for ConsolePortConfig {
    fn default() -> Self {
        Self {
            ready_delay: time::Duration::from_millis(500),
        }
    }
}

impl ConsolePortConfig {
    /// Returns the fixed delay awaited before every write.
    pub fn ready_delay(&self) -> time::Duration {
        self.ready_delay
    }

    /// Sets the fixed delay awaited before every write.
    ///
    /// Default: `500` milliseconds
    pub fn with_ready_delay(mut self, delay: time::Duration) -> Self {
        self.ready_delay = delay;
        self
    }
}

/// Configuration for the [`SerialLinePort`](crate::port::SerialLinePort).
#[derive(Clone, Debug)]
pub struct SerialLineConfig {
    settle_time: time::Duration,
    poll_interval: time::Duration,
}

impl Default for SerialLineConfig {
    fn default() -> Self {
        Self {
            settle_time: time::Duration::from_millis(10),
            poll_interval: time::Duration::from_millis(1),
        }
    }
}

impl SerialLineConfig {
    /// Returns the time slept after every transmitted line, bounding the transmission rate.
    pub fn settle_time(&self) -> time::Duration {
        self.settle_time
    }

    /// Returns the interval between checks of the transport's writability.
    pub fn poll_interval(&self) -> time::Duration {
        self.poll_interval
    }

    /// Sets the time slept after every transmitted line.
    ///
    /// Default: `10` milliseconds
    pub fn with_settle_time(mut self, settle_time: time::Duration) -> Self {
        self.settle_time = settle_time;
        self
    }

    /// Sets the interval between checks of the transport's writability.
    ///
    /// Values below [`MIN_POLL_INTERVAL`] are raised to it.
    ///
    /// Default: `1` millisecond
    pub fn with_poll_interval(mut self, poll_interval: time::Duration) -> Self {
        self.poll_interval = poll_interval.max(MIN_POLL_INTERVAL);
        self
    }
}
