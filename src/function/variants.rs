use super::core::{SignalClock, SignalFunction};

/// Echoes its own clock: `value = elapsed_time`.
#[derive(Debug, Clone, Default)]
pub struct Identity {
    clock: SignalClock,
}

impl Identity {
    pub fn new() -> Box<Self> {
        Box::default()
    }
}

impl SignalFunction for Identity {
    fn clock(&self) -> &SignalClock {
        &self.clock
    }

    fn clock_mut(&mut self) -> &mut SignalClock {
        &mut self.clock
    }

    fn evaluate(&self, clock: &SignalClock) -> f64 {
        clock.elapsed_time()
    }
}

/// Discrete-time running integral of the identity signal.
///
/// Accumulates with the rectangle rule using the time *before* the clock advances:
/// `value(n) = value(n - 1) + elapsed_time(n - 1) * step`. With `step = 1.0` the samples are
/// `0, 1, 3, 6, 10, ...`.
#[derive(Debug, Clone, Default)]
pub struct DiscreteIntegral {
    clock: SignalClock,
}

impl DiscreteIntegral {
    pub fn new() -> Box<Self> {
        Box::default()
    }
}

impl SignalFunction for DiscreteIntegral {
    fn clock(&self) -> &SignalClock {
        &self.clock
    }

    fn clock_mut(&mut self) -> &mut SignalClock {
        &mut self.clock
    }

    fn evaluate(&self, clock: &SignalClock) -> f64 {
        clock.last_value() + clock.elapsed_time() * clock.step()
    }
}

/// Continuous-time integral of the identity signal, evaluated in closed form:
/// `value = elapsed_time^2 / 2`.
#[derive(Debug, Clone, Default)]
pub struct ContinuousIntegral {
    clock: SignalClock,
}

impl ContinuousIntegral {
    pub fn new() -> Box<Self> {
        Box::default()
    }
}

impl SignalFunction for ContinuousIntegral {
    fn clock(&self) -> &SignalClock {
        &self.clock
    }

    fn clock_mut(&mut self) -> &mut SignalClock {
        &mut self.clock
    }

    fn evaluate(&self, clock: &SignalClock) -> f64 {
        clock.elapsed_time() * clock.elapsed_time() * 0.5
    }
}

/// Sinusoid `value = amplitude * sin(omega * elapsed_time + phi)`.
#[derive(Debug, Clone)]
pub struct Sinusoid {
    clock: SignalClock,
    amplitude: f64,
    omega: f64,
    phi: f64,
}

impl Sinusoid {
    /// Creates a sinusoid from its amplitude, angular frequency (rad/s) and phase (rad).
    pub fn new(amplitude: f64, omega: f64, phi: f64) -> Box<Self> {
        Box::new(Self {
            clock: SignalClock::default(),
            amplitude,
            omega,
            phi,
        })
    }

    pub fn amplitude(&self) -> f64 {
        self.amplitude
    }

    pub fn omega(&self) -> f64 {
        self.omega
    }

    pub fn phi(&self) -> f64 {
        self.phi
    }
}

impl SignalFunction for Sinusoid {
    fn clock(&self) -> &SignalClock {
        &self.clock
    }

    fn clock_mut(&mut self) -> &mut SignalClock {
        &mut self.clock
    }

    fn evaluate(&self, clock: &SignalClock) -> f64 {
        self.amplitude * (self.omega * clock.elapsed_time() + self.phi).sin()
    }
}
