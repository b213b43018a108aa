use std::{
    io::{self, Write},
    sync::{Arc, Mutex},
};

use tokio::time::{self, Duration};

use siggen::{
    function::{ContinuousIntegral, DiscreteIntegral, Identity},
    port::{ConsolePort, ConsolePortConfig},
    sampler::{EngineStatus, LifecycleState, SamplingEngine},
};

#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    fn lines(&self) -> Vec<String> {
        let bytes = self.0.lock().unwrap();
        String::from_utf8_lossy(&bytes)
            .lines()
            .map(str::to_string)
            .collect()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn console_engine(buffer: &SharedBuffer) -> SamplingEngine {
    let config = ConsolePortConfig::default().with_ready_delay(Duration::ZERO);
    let port = ConsolePort::with_writer(config, buffer.clone());

    SamplingEngine::new(
        0.1,
        vec![
            Identity::new(),
            DiscreteIntegral::new(),
            ContinuousIntegral::new(),
        ],
        vec![port],
    )
    .expect("valid engine")
}

#[tokio::test(start_paused = true)]
async fn console_output_follows_lifecycle() {
    let buffer = SharedBuffer::default();
    let engine = console_engine(&buffer);

    engine.activate().await.expect("activation");
    time::sleep(Duration::from_millis(500)).await;
    assert!(buffer.lines().is_empty());

    engine.resume().await.expect("resume");
    time::sleep(Duration::from_millis(1_000)).await;
    engine.pause().await.expect("pause");
    time::sleep(Duration::from_millis(50)).await;

    let paused_lines = buffer.lines().len();
    assert!(paused_lines >= 5, "only {paused_lines} lines");

    time::sleep(Duration::from_millis(1_000)).await;
    assert_eq!(buffer.lines().len(), paused_lines);

    engine.resume().await.expect("resume again");
    time::sleep(Duration::from_millis(1_000)).await;
    assert!(buffer.lines().len() > paused_lines);

    engine.terminate().await.expect("termination");
    let status = time::timeout(Duration::from_secs(5), engine.until_stopped())
        .await
        .expect("active engine stops");
    assert!(matches!(status, EngineStatus::Terminated));

    let lines = buffer.lines();
    assert!(lines[0].ends_with("] Port send: [0.0, 0.0, 0.0]"), "{}", lines[0]);
    assert!(lines.iter().all(|line| line.starts_with('[')));
}

#[tokio::test(start_paused = true)]
async fn reset_restarts_console_sequence() {
    let buffer = SharedBuffer::default();
    let engine = console_engine(&buffer);

    engine.activate().await.expect("activation");
    engine.resume().await.expect("resume");
    time::sleep(Duration::from_millis(550)).await;

    engine.reset();
    time::sleep(Duration::from_millis(300)).await;
    engine.pause().await.expect("pause");
    time::sleep(Duration::from_millis(10)).await;

    let lines = buffer.lines();
    let restarts = lines
        .iter()
        .filter(|line| line.ends_with("Port send: [0.0, 0.0, 0.0]"))
        .count();
    assert_eq!(restarts, 2);
}

#[tokio::test(start_paused = true)]
async fn terminated_paused_engine_needs_resume_to_stop() {
    let buffer = SharedBuffer::default();
    let engine = console_engine(&buffer);

    engine.activate().await.expect("activation");
    engine.resume().await.expect("resume");
    time::sleep(Duration::from_millis(300)).await;
    engine.pause().await.expect("pause");

    engine.terminate().await.expect("termination");
    assert_eq!(engine.lifecycle_state().await, LifecycleState::Terminated);

    let blocked = time::timeout(Duration::from_secs(1), engine.until_stopped()).await;
    assert!(blocked.is_err());

    let lines_before_wake = buffer.lines().len();
    engine.resume().await.expect("wake retired process");

    let status = time::timeout(Duration::from_secs(5), engine.until_stopped())
        .await
        .expect("woken engine stops");
    assert!(matches!(status, EngineStatus::Terminated));
    assert_eq!(buffer.lines().len(), lines_before_wake);
}
