use crate::constants::*;
use crate::types::MotorCommand;
use serde::{Deserialize, Serialize};
use std::io;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4, UdpSocket};
use tracing::{debug, error, info, warn};

#[derive(Debug, thiserror::Error)]
pub enum ReceiverError {
    #[error("Failed to bind command socket on {addr}: {source}")]
    Bind { addr: SocketAddr, source: io::Error },

    #[error("Failed to make command socket non-blocking: {0}")]
    NonBlocking(io::Error),
}

/// What to do with a field that is not a number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParsePolicy {
    /// Substitute 0.0 for the field and keep the rest of the command.
    #[default]
    Lenient,
    /// Discard the whole datagram.
    Strict,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceiverConfig {
    pub bind_addr: SocketAddr,
    pub buffer_len: usize,
    pub parse_policy: ParsePolicy,
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        ReceiverConfig {
            bind_addr: SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, COMMAND_PORT)),
            buffer_len: RECV_BUFFER_LEN,
            parse_policy: ParsePolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReceiverStats {
    pub datagrams: u64,
    pub malformed: u64,
    /// Datagrams that filled the whole buffer and may have been cut short.
    pub truncated: u64,
    pub commands: u64,
}

enum SocketState {
    Open(UdpSocket),
    /// Bind failed; stays this way for the receiver's lifetime.
    Failed,
    Closed,
}

/// Non-blocking UDP command receiver. Each `poll` reads at most one datagram.
pub struct CommandReceiver {
    state: SocketState,
    recv_buf: Vec<u8>,
    parse_policy: ParsePolicy,
    stats: ReceiverStats,
}

impl CommandReceiver {
    /// Binds the command socket. A bind failure is logged and leaves the
    /// receiver permanently inactive instead of returning an error.
    pub fn open(config: &ReceiverConfig) -> Self {
        let state = match Self::bind(config.bind_addr) {
            Ok(socket) => {
                info!("Listening for motor commands on {}", config.bind_addr);
                SocketState::Open(socket)
            }
            Err(e) => {
                error!("{}. Motor command receiver disabled", e);
                SocketState::Failed
            }
        };

        CommandReceiver {
            state,
            recv_buf: vec![0u8; config.buffer_len.max(1)],
            parse_policy: config.parse_policy,
            stats: ReceiverStats::default(),
        }
    }

    fn bind(addr: SocketAddr) -> Result<UdpSocket, ReceiverError> {
        let socket = UdpSocket::bind(addr).map_err(|source| ReceiverError::Bind { addr, source })?;
        socket.set_nonblocking(true).map_err(ReceiverError::NonBlocking)?;
        Ok(socket)
    }

    /// Releases the socket. Later polls return nothing.
    pub fn close(&mut self) {
        if let SocketState::Open(_) = self.state {
            debug!("Closing motor command socket");
            self.state = SocketState::Closed;
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, SocketState::Open(_))
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        match &self.state {
            SocketState::Open(socket) => socket.local_addr().ok(),
            _ => None,
        }
    }

    pub fn stats(&self) -> ReceiverStats {
        self.stats
    }

    pub fn poll(&mut self) -> Option<MotorCommand> {
        let SocketState::Open(socket) = &self.state else {
            return None;
        };

        let len = match socket.recv_from(&mut self.recv_buf) {
            Ok((len, _)) => len,
            Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => return None,
            Err(e) => {
                warn!("Motor command receive failed: {}", e);
                return None;
            }
        };

        self.stats.datagrams += 1;
        if len == self.recv_buf.len() {
            self.stats.truncated += 1;
            debug!("Motor command filled the {} byte buffer, may be truncated", len);
        }

        match decode_datagram(&self.recv_buf[..len], self.parse_policy) {
            Some(command) => {
                self.stats.commands += 1;
                Some(command)
            }
            None => {
                self.stats.malformed += 1;
                debug!("Discarding malformed motor command: {:?}", String::from_utf8_lossy(&self.recv_buf[..len]));
                None
            }
        }
    }
}

/// Decodes `"m1,m2,m3,m4[,...]"` into a command. Fewer than four fields
/// yields nothing; fields past the fourth are ignored.
pub fn decode_datagram(payload: &[u8], policy: ParsePolicy) -> Option<MotorCommand> {
    let text = String::from_utf8_lossy(payload);
    let mut tokens = text.split(FIELD_DELIMITER);

    let mut angles = [PARSE_FALLBACK; NUM_CHANNELS];
    for angle in angles.iter_mut() {
        let token = tokens.next()?;
        *angle = match (parse_field(token), policy) {
            (Some(value), _) => value,
            (None, ParsePolicy::Lenient) => PARSE_FALLBACK,
            (None, ParsePolicy::Strict) => return None,
        };
    }

    Some(MotorCommand { angles })
}

fn parse_field(token: &str) -> Option<f32> {
    token.trim().parse::<f32>().ok().filter(|value| !value.is_nan())
}
