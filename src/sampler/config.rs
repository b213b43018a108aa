use std::num::NonZeroUsize;

use tokio::time;

/// Tick period used when an unusable period is supplied, in seconds.
pub const DEFAULT_TICK_PERIOD: f64 = 0.001;

/// Configuration for the [`SamplingEngine`](crate::sampler::SamplingEngine).
///
/// The tick period must be representable as a non-zero [`Duration`](time::Duration). Besides
/// non-positive and non-finite values, this rejects positive periods below one nanosecond; all of
/// them are replaced by [`DEFAULT_TICK_PERIOD`].
#[derive(Clone, Debug)]
pub struct EngineConfig {
    tick_period: f64,
    update_buffer_size: NonZeroUsize,
    pace_ticks: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_period: DEFAULT_TICK_PERIOD,
            update_buffer_size: NonZeroUsize::new(1_000).expect("not zero"),
            pace_ticks: true,
        }
    }
}

impl EngineConfig {
    /// Returns the tick period in seconds. This is also the `step` assigned to every registered
    /// signal function.
    pub fn tick_period(&self) -> f64 {
        self.tick_period
    }

    /// Returns the tick period as a [`Duration`](time::Duration).
    pub fn tick_interval(&self) -> time::Duration {
        time::Duration::from_secs_f64(self.tick_period)
    }

    /// Returns the capacity of the broadcast channel carrying [`EngineUpdate`]s.
    ///
    /// [`EngineUpdate`]: crate::sampler::EngineUpdate
    pub fn update_buffer_size(&self) -> NonZeroUsize {
        self.update_buffer_size
    }

    /// Returns whether the engine waits for the next tick-period boundary before every tick.
    pub fn pace_ticks(&self) -> bool {
        self.pace_ticks
    }

    /// Sets the tick period in seconds.
    ///
    /// Non-positive, non-finite, sub-nanosecond or overflowing periods are replaced by
    /// [`DEFAULT_TICK_PERIOD`].
    ///
    /// Default: [`DEFAULT_TICK_PERIOD`]
    pub fn with_tick_period(mut self, secs: f64) -> Self {
        let valid = secs.is_finite()
            && secs > 0.
            && time::Duration::try_from_secs_f64(secs).is_ok_and(|period| !period.is_zero());

        self.tick_period = if valid {
            secs
        } else {
            tracing::warn!(
                secs,
                default = DEFAULT_TICK_PERIOD,
                "invalid tick period replaced by default"
            );
            DEFAULT_TICK_PERIOD
        };
        self
    }

    /// Sets the capacity of the broadcast channel carrying engine updates. Receivers that fall
    /// further behind than this skip updates.
    ///
    /// Default: `1000`
    pub fn with_update_buffer_size(mut self, size: NonZeroUsize) -> Self {
        self.update_buffer_size = size;
        self
    }

    /// Sets whether the engine paces ticks by the tick period.
    ///
    /// When disabled, ticks run back to back and wall-clock pacing comes only from the ports'
    /// own readiness and settle delays.
    ///
    /// Default: `true`
    pub fn with_pace_ticks(mut self, pace_ticks: bool) -> Self {
        self.pace_ticks = pace_ticks;
        self
    }
}

impl From<f64> for EngineConfig {
    fn from(tick_period: f64) -> Self {
        Self::default().with_tick_period(tick_period)
    }
}
