use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};

use super::super::core::GatedPort;
use super::*;

/// Transport recording every line, with a writability flag the test can flip.
#[derive(Clone, Default)]
struct RecordingTransport {
    lines: Arc<Mutex<Vec<Vec<u8>>>>,
    busy: Arc<AtomicBool>,
    polls: Arc<AtomicUsize>,
    fail: bool,
}

impl RecordingTransport {
    fn lines(&self) -> Vec<Vec<u8>> {
        self.lines.lock().unwrap().clone()
    }
}

#[async_trait]
impl LineTransport for RecordingTransport {
    fn is_writable(&self) -> bool {
        self.polls.fetch_add(1, Ordering::SeqCst);
        !self.busy.load(Ordering::SeqCst)
    }

    async fn transmit(&mut self, line: &[u8]) -> io::Result<()> {
        if self.fail {
            return Err(io::Error::new(io::ErrorKind::NotConnected, "device unplugged"));
        }

        self.lines.lock().unwrap().push(line.to_vec());
        Ok(())
    }
}

fn fast_config() -> SerialLineConfig {
    SerialLineConfig::default()
        .with_settle_time(time::Duration::ZERO)
        .with_poll_interval(time::Duration::from_millis(1))
}

#[test]
fn encode_line_uses_decimal_and_terminator() {
    assert_eq!(encode_line(0.), b"0.0\n\r".to_vec());
    assert_eq!(encode_line(1.), b"1.0\n\r".to_vec());
    assert_eq!(encode_line(0.1), b"0.1\n\r".to_vec());
    assert_eq!(encode_line(-2.5), b"-2.5\n\r".to_vec());
}

#[test]
fn encode_line_is_ascii() {
    for value in [0.841_470_984_807_896_5, 1e-7, 12_345.678, -0.0] {
        let line = encode_line(value);
        assert!(line.is_ascii());
        assert!(line.ends_with(LINE_TERMINATOR));
    }
}

#[tokio::test]
async fn transmits_only_first_value() {
    let transport = RecordingTransport::default();
    let mut port = GatedPort::new(SerialLinePort::new("com3", fast_config(), transport.clone()));

    port.open();
    port.send(&[0.5, 7., 9.]).await.expect("port is open");
    port.send(&[1.25]).await.expect("port is open");

    assert_eq!(
        transport.lines(),
        vec![b"0.5\n\r".to_vec(), b"1.25\n\r".to_vec()]
    );
}

#[tokio::test]
async fn closed_port_never_reaches_transport() {
    let transport = RecordingTransport::default();
    let mut port = GatedPort::new(SerialLinePort::new("com3", fast_config(), transport.clone()));

    let err = port.send(&[1.]).await.expect_err("port never opened");
    assert!(matches!(err, PortError::NotOpen { ref port } if port == "com3"));

    port.open();
    port.close();
    assert!(port.send(&[1.]).await.is_err());

    assert!(transport.lines().is_empty());
}

#[tokio::test]
async fn write_checks_open_state_itself() {
    let transport = RecordingTransport::default();
    let mut port = SerialLinePort::new("com3", fast_config(), transport.clone());

    let err = port.write(&[1.]).await.expect_err("port is closed");

    assert!(err.is_invalid_state());
    assert!(transport.lines().is_empty());
}

#[tokio::test]
async fn empty_vector_is_rejected() {
    let transport = RecordingTransport::default();
    let mut port = GatedPort::new(SerialLinePort::new("com3", fast_config(), transport.clone()));

    port.open();
    let err = port.send(&[]).await.expect_err("nothing to encode");

    assert!(matches!(err, PortError::EmptyPayload { .. }));
    assert!(transport.lines().is_empty());
}

#[tokio::test]
async fn transport_failure_is_io_error() {
    let transport = RecordingTransport {
        fail: true,
        ..Default::default()
    };
    let mut port = GatedPort::new(SerialLinePort::new("com3", fast_config(), transport));

    port.open();
    let err = port.send(&[1.]).await.expect_err("transport fails");

    assert!(matches!(
        err,
        PortError::Io { ref port, ref source }
            if port == "com3" && source.kind() == io::ErrorKind::NotConnected
    ));
}

#[tokio::test(start_paused = true)]
async fn wait_ready_polls_until_writable() {
    let transport = RecordingTransport::default();
    transport.busy.store(true, Ordering::SeqCst);

    let mut port = GatedPort::new(SerialLinePort::new("com3", fast_config(), transport.clone()));
    port.open();

    let busy = transport.busy.clone();
    tokio::spawn(async move {
        time::sleep(time::Duration::from_millis(20)).await;
        busy.store(false, Ordering::SeqCst);
    });

    let start = time::Instant::now();
    port.send(&[3.]).await.expect("transport frees up");

    assert!(start.elapsed() >= time::Duration::from_millis(20));
    assert!(transport.polls.load(Ordering::SeqCst) > 1);
    assert_eq!(transport.lines(), vec![b"3.0\n\r".to_vec()]);
}

#[tokio::test(start_paused = true)]
async fn settle_time_follows_every_write() {
    let transport = RecordingTransport::default();
    let config = SerialLineConfig::default().with_settle_time(time::Duration::from_millis(10));
    let mut port = GatedPort::new(SerialLinePort::new("com3", config, transport.clone()));
    port.open();

    let start = time::Instant::now();
    for value in [1., 2., 3.] {
        port.send(&[value]).await.expect("port is open");
    }

    assert!(start.elapsed() >= time::Duration::from_millis(30));
    assert_eq!(transport.lines().len(), 3);
}

#[tokio::test]
async fn stream_transport_writes_raw_lines() {
    let (client, mut server) = tokio::io::duplex(64);
    let mut port = GatedPort::new(SerialLinePort::new(
        "duplex",
        fast_config(),
        StreamTransport::new(client),
    ));

    port.open();
    port.send(&[2.]).await.expect("port is open");
    port.send(&[-0.25]).await.expect("port is open");

    let mut received = vec![0_u8; 12];
    tokio::io::AsyncReadExt::read_exact(&mut server, &mut received)
        .await
        .expect("both lines arrive");

    assert_eq!(received, b"2.0\n\r-0.25\n\r".to_vec());
}

#[test]
fn poll_interval_has_lower_bound() {
    let config = SerialLineConfig::default().with_poll_interval(time::Duration::ZERO);

    assert_eq!(config.poll_interval(), crate::port::MIN_POLL_INTERVAL);
}
