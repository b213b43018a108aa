//! Example driving the sampling engine through a full lifecycle with a console port.
//!
//! Samples the identity signal and its discrete and continuous integrals every 100 ms, printing
//! one line per tick. Set `RUST_LOG=siggen=debug` to also see the engine's lifecycle events.

use tokio::time::{self, Duration};
use tracing_subscriber::EnvFilter;

use siggen::{
    error::Result,
    function::{ContinuousIntegral, DiscreteIntegral, Identity},
    port::ConsolePort,
    sampler::SamplingEngine,
};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("siggen=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    println!("Initializing `SamplingEngine`...");

    let engine = SamplingEngine::new(
        0.1,
        vec![
            Identity::new(),
            DiscreteIntegral::new(),
            ContinuousIntegral::new(),
        ],
        vec![ConsolePort::new()],
    )?;

    engine.activate().await?;
    engine.resume().await?;

    println!("Engine running for 3 seconds...");
    time::sleep(Duration::from_secs(3)).await;

    engine.pause().await?;
    println!("Engine paused for 3 seconds...");
    time::sleep(Duration::from_secs(3)).await;

    engine.resume().await?;
    println!("Engine resumed for 5 seconds...");
    time::sleep(Duration::from_secs(5)).await;

    engine.reset();
    println!("Signal functions reset, running for 2.5 more seconds...");
    time::sleep(Duration::from_millis(2_500)).await;

    engine.terminate().await?;
    // Only matters if the engine was paused, harmless otherwise
    engine.resume().await?;

    let final_status = engine.until_stopped().await;
    println!("Engine stopped with status: {final_status}");

    Ok(())
}
