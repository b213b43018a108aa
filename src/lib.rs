#![doc = include_str!("../README.md")]

/// Exports [`SignalFunction`], its [`SignalClock`] and the built-in signal generators.
///
/// [`SignalFunction`]: crate::function::SignalFunction
/// [`SignalClock`]: crate::function::SignalClock
pub mod function;
/// Exports [`OutputPort`], the [`GatedPort`] enforcing its open/closed gate, and the console and
/// serial-line sinks.
///
/// [`OutputPort`]: crate::port::OutputPort
/// [`GatedPort`]: crate::port::GatedPort
pub mod port;
/// Exports [`SamplingEngine`] and the types used to observe it.
///
/// [`SamplingEngine`]: crate::sampler::SamplingEngine
pub mod sampler;
mod util;

/// Error types returned by `siggen`.
pub mod error {
    pub use super::port::error::PortError;
    pub use super::sampler::{error::EngineError, process::error::EngineProcessError};
    pub use super::util::PanicPayload;

    /// Convenience general-purpose Result type alias.
    pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
}
