mod core;
mod variants;

pub use core::{SignalClock, SignalFunction};
pub use variants::{ContinuousIntegral, DiscreteIntegral, Identity, Sinusoid};

#[cfg(test)]
mod tests;
