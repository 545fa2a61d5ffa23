mod client;
mod config;
mod diff;
mod error;
mod logger;
mod protocol;
mod state;
mod transport;
mod types;

pub use client::{WiserHub, WiserHubBuilder, load_schedule_file};
pub use config::HubConfig;
pub use error::{Error, Result};
pub use logger::MessageLogMode;
pub use state::DeviceRoom;
pub use transport::{DEFAULT_CONNECT_TIMEOUT, DEFAULT_READ_TIMEOUT, DEFAULT_RETRIES, TransportConfig};
pub use types::*;
