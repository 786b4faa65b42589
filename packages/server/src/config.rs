//! Server and connection configuration.
//!
//! Values come from the command line (see `src/bin/server.rs`), each with an
//! environment variable fallback, and are validated here.

use std::time::Duration;

use thiserror::Error;

/// Time allowed to read the next frame (data or pong) from a peer
pub const DEFAULT_PONG_WAIT: Duration = Duration::from_secs(60);
/// Time allowed to write one frame to a peer
pub const DEFAULT_WRITE_WAIT: Duration = Duration::from_secs(10);
/// Maximum inbound message size in bytes
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 512;
/// Upper bound for the read deadline and the write wait
pub const MAX_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("{name} must not exceed {max:?}")]
    TooLong { name: &'static str, max: Duration },

    #[error("read deadline {0:?} is too short to derive a keepalive period")]
    NoPingPeriod(Duration),
}

/// 9/10 of the read deadline, so a ping always lands before the peer's
/// side of the deadline expires.
fn derive_ping_period(read_deadline: Duration) -> Result<Duration, ConfigError> {
    if read_deadline > MAX_TIMEOUT {
        return Err(ConfigError::TooLong {
            name: "read deadline",
            max: MAX_TIMEOUT,
        });
    }

    match read_deadline.checked_mul(9).map(|d| d / 10) {
        Some(period) if !period.is_zero() => Ok(period),
        _ => Err(ConfigError::NoPingPeriod(read_deadline)),
    }
}

/// Timeouts and limits applied to every connection actor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionSettings {
    read_deadline: Duration,
    ping_period: Duration,
    write_wait: Duration,
    max_message_size: usize,
    outbound_capacity: usize,
}

impl ConnectionSettings {
    pub fn new(
        read_deadline: Duration,
        write_wait: Duration,
        max_message_size: usize,
    ) -> Result<Self, ConfigError> {
        if read_deadline.is_zero() {
            return Err(ConfigError::Zero("read deadline"));
        }
        let ping_period = derive_ping_period(read_deadline)?;
        if write_wait.is_zero() {
            return Err(ConfigError::Zero("write wait"));
        }
        if write_wait > MAX_TIMEOUT {
            return Err(ConfigError::TooLong {
                name: "write wait",
                max: MAX_TIMEOUT,
            });
        }
        if max_message_size == 0 {
            return Err(ConfigError::Zero("max message size"));
        }

        Ok(Self {
            read_deadline,
            ping_period,
            write_wait,
            max_message_size,
            outbound_capacity: crate::infrastructure::hub::OUTBOUND_BUFFER_CAPACITY,
        })
    }

    pub fn with_outbound_capacity(mut self, capacity: usize) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::Zero("outbound capacity"));
        }
        self.outbound_capacity = capacity;
        Ok(self)
    }

    pub fn read_deadline(&self) -> Duration {
        self.read_deadline
    }

    pub fn write_wait(&self) -> Duration {
        self.write_wait
    }

    /// Keepalive period, derived from the read deadline
    pub fn ping_period(&self) -> Duration {
        self.ping_period
    }

    pub fn max_message_size(&self) -> usize {
        self.max_message_size
    }

    pub fn outbound_capacity(&self) -> usize {
        self.outbound_capacity
    }
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            read_deadline: DEFAULT_PONG_WAIT,
            ping_period: DEFAULT_PONG_WAIT * 9 / 10,
            write_wait: DEFAULT_WRITE_WAIT,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            outbound_capacity: crate::infrastructure::hub::OUTBOUND_BUFFER_CAPACITY,
        }
    }
}

/// Everything `Server` needs to start
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Accept the `user_id` query parameter as identity (development only)
    pub allow_query_identity: bool,
    pub connection: ConnectionSettings,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            allow_query_identity: false,
            connection: ConnectionSettings::default(),
        }
    }
}
