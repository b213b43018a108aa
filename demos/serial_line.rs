//! Example streaming a sinusoid through a serial-line port.
//!
//! The line protocol writes the first value of each tick as an ASCII decimal terminated by
//! `"\n\r"`. Here the transport wraps stdout so the encoded stream can be inspected or piped into
//! a real device, e.g. `cargo run --example serial_line > /dev/ttyUSB0`.

use std::f64::consts::PI;

use tokio::time::{self, Duration};
use tracing_subscriber::EnvFilter;

use siggen::{
    error::Result,
    function::Sinusoid,
    port::{SerialLineConfig, SerialLinePort, StreamTransport},
    sampler::{EngineConfig, EngineStatus, EngineUpdate, SamplingEngine},
};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("siggen=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let port = SerialLinePort::new(
        "stdout",
        SerialLineConfig::default().with_settle_time(Duration::from_millis(5)),
        StreamTransport::new(tokio::io::stdout()),
    );

    // 1 Hz sine sampled every 50 ms
    let engine = SamplingEngine::new(
        EngineConfig::default().with_tick_period(0.05),
        vec![Sinusoid::new(1., 2. * PI, 0.)],
        vec![port],
    )?;

    let mut engine_rx = engine.update_receiver();

    engine.activate().await?;
    engine.resume().await?;

    let deadline = time::sleep(Duration::from_secs(5));
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            _ = &mut deadline => break,
            update = engine_rx.recv() => match update {
                Ok(EngineUpdate::Tick(tick)) if tick.index() % 20 == 0 => {
                    tracing::info!(tick = tick.index(), "one period streamed");
                }
                Ok(EngineUpdate::Status(EngineStatus::Crashed(e))) => {
                    return Err(format!("engine crashed: {e}").into());
                }
                Ok(_) => {}
                Err(e) => return Err(e.into()),
            }
        }
    }

    engine.terminate().await?;
    let final_status = engine.until_stopped().await;
    tracing::info!(%final_status, "serial line demo finished");

    Ok(())
}
