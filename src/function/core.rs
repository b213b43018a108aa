/// Internal clock carried by every [`SignalFunction`].
///
/// `elapsed_time` starts at zero and only moves forward, by exactly `step`, once per sample. The
/// most recent value produced by the owning function is cached in `last_value`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SignalClock {
    elapsed_time: f64,
    last_value: f64,
    step: f64,
}

impl SignalClock {
    /// Creates a zeroed clock advancing by `step` per sample.
    pub fn new(step: f64) -> Self {
        Self {
            elapsed_time: 0.,
            last_value: 0.,
            step,
        }
    }

    /// Returns the time accumulated since construction or the last reset.
    pub fn elapsed_time(&self) -> f64 {
        self.elapsed_time
    }

    /// Returns the value produced by the most recent sample, or `0.0` if none was produced since
    /// the last reset.
    pub fn last_value(&self) -> f64 {
        self.last_value
    }

    /// Returns the time increment applied per sample.
    pub fn step(&self) -> f64 {
        self.step
    }

    pub(crate) fn set_step(&mut self, step: f64) {
        self.step = step;
    }

    /// Caches `value` and moves the clock forward by one step.
    fn advance(&mut self, value: f64) -> f64 {
        self.last_value = value;
        self.elapsed_time += self.step;
        value
    }

    fn reset(&mut self) {
        self.elapsed_time = 0.;
        self.last_value = 0.;
    }
}

/// Trait for implementing stateful signal generators.
///
/// A signal function produces one scalar per tick as a pure function of its [`SignalClock`] (and
/// any fixed parameters). Implementors only provide [`evaluate`](Self::evaluate) plus access to
/// the clock; sampling and resetting are shared by every function. The `step` of the clock is
/// assigned by the [`SamplingEngine`](crate::sampler::SamplingEngine) when the function is
/// registered.
///
/// # Example
///
/// ```
/// use siggen::function::{SignalClock, SignalFunction};
///
/// /// Square wave with unit amplitude and the given period.
/// pub struct SquareWave {
///     clock: SignalClock,
///     period: f64,
/// }
///
/// impl SquareWave {
///     pub fn new(period: f64) -> Box<Self> {
///         Box::new(Self {
///             clock: SignalClock::default(),
///             period,
///         })
///     }
/// }
///
/// impl SignalFunction for SquareWave {
///     fn clock(&self) -> &SignalClock {
///         &self.clock
///     }
///
///     fn clock_mut(&mut self) -> &mut SignalClock {
///         &mut self.clock
///     }
///
///     fn evaluate(&self, clock: &SignalClock) -> f64 {
///         if clock.elapsed_time() % self.period < self.period / 2. {
///             1.
///         } else {
///             -1.
///         }
///     }
/// }
///
/// let mut square = SquareWave::new(4.);
/// square.set_step(1.);
///
/// let samples: Vec<f64> = (0..4).map(|_| square.sample()).collect();
/// assert_eq!(samples, vec![1., 1., -1., -1.]);
/// ```
pub trait SignalFunction: Send + 'static {
    /// Returns the function's clock.
    fn clock(&self) -> &SignalClock;

    /// Returns the function's clock for mutation.
    fn clock_mut(&mut self) -> &mut SignalClock;

    /// Computes the value for the given clock state, before the clock advances.
    fn evaluate(&self, clock: &SignalClock) -> f64;

    /// Computes the current value, advances the clock by one step, caches and returns the value.
    fn sample(&mut self) -> f64 {
        let value = self.evaluate(self.clock());
        self.clock_mut().advance(value)
    }

    /// Zeroes the elapsed time and the cached value.
    fn reset(&mut self) {
        self.clock_mut().reset();
    }

    /// Sets the time increment applied per sample.
    fn set_step(&mut self, step: f64) {
        self.clock_mut().set_step(step);
    }

    /// Returns the time accumulated by the clock since construction or the last reset.
    fn elapsed_time(&self) -> f64 {
        self.clock().elapsed_time()
    }

    /// Returns the value cached by the most recent sample.
    fn last_value(&self) -> f64 {
        self.clock().last_value()
    }
}
