mod config;
mod console;
mod core;
pub(crate) mod error;
mod serial;

pub use config::{ConsolePortConfig, MIN_POLL_INTERVAL, SerialLineConfig};
pub use console::ConsolePort;
pub use core::{GatedPort, OutputPort};
pub use serial::{LINE_TERMINATOR, LineTransport, SerialLinePort, StreamTransport, encode_line};
