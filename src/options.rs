//! Per-socket option store with uniform validation.
//!
//! This module provides the storage half of a setsockopt/getsockopt style
//! configuration API: options are addressed by a stable integer identifier
//! and carried as opaque native-endian bytes, so a single call shape covers
//! integers, wide integers and byte blobs alike. Every write is validated
//! against the option's length and range contract; a rejected write leaves
//! the store untouched.
//!
//! The store has no locking of its own. It is owned exclusively by one
//! socket object, which serializes access through its own synchronization.

use std::time::Duration;

use bytes::Bytes;
use tracing::{debug, trace};

use crate::error::{OptionError, Result};

/// Stable socket option identifiers.
///
/// The discriminants are the wire contract between the store and its caller
/// and must never change between versions. Gaps in the numbering are
/// identifiers retired from or not covered by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum SocketOption {
    /// I/O thread affinity bitmask (u64)
    Affinity = 4,

    /// Socket identity blob, 1-255 bytes, first byte non-zero
    Identity = 5,

    /// Multicast data rate in kbps (i32, > 0)
    Rate = 8,

    /// Multicast recovery interval in ms (i32, >= 0)
    RecoveryIvl = 9,

    /// Kernel send buffer size in bytes (i32, >= 0; 0 = OS default)
    SndBuf = 11,

    /// Kernel receive buffer size in bytes (i32, >= 0; 0 = OS default)
    RcvBuf = 12,

    /// Socket type (i32, read-only)
    Type = 16,

    /// Linger period for pending messages in ms (i32; -1 = infinite)
    Linger = 17,

    /// Initial reconnection interval in ms (i32, >= 0)
    ReconnectIvl = 18,

    /// Listen backlog for connection-oriented transports (i32)
    Backlog = 19,

    /// Maximum reconnection interval in ms (i32, >= 0; 0 = no backoff)
    ReconnectIvlMax = 21,

    /// Maximum inbound message size in bytes (i64; -1 = no limit)
    MaxMsgSize = 22,

    /// Send high water mark in messages (i32, >= 0)
    SndHwm = 23,

    /// Receive high water mark in messages (i32, >= 0)
    RcvHwm = 24,

    /// Multicast time-to-live in network hops (i32, > 0)
    MulticastHops = 25,

    /// Receive timeout in ms (i32; -1 = block forever)
    RcvTimeo = 27,

    /// Send timeout in ms (i32; -1 = block forever)
    SndTimeo = 28,
}

impl SocketOption {
    /// Map a raw identifier to a known option.
    ///
    /// Returns `None` for identifiers outside the closed set; `set` and
    /// `get` turn that into an invalid-argument error.
    #[must_use]
    pub const fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            4 => Some(Self::Affinity),
            5 => Some(Self::Identity),
            8 => Some(Self::Rate),
            9 => Some(Self::RecoveryIvl),
            11 => Some(Self::SndBuf),
            12 => Some(Self::RcvBuf),
            16 => Some(Self::Type),
            17 => Some(Self::Linger),
            18 => Some(Self::ReconnectIvl),
            19 => Some(Self::Backlog),
            21 => Some(Self::ReconnectIvlMax),
            22 => Some(Self::MaxMsgSize),
            23 => Some(Self::SndHwm),
            24 => Some(Self::RcvHwm),
            25 => Some(Self::MulticastHops),
            27 => Some(Self::RcvTimeo),
            28 => Some(Self::SndTimeo),
            _ => None,
        }
    }

    /// Get the stable raw identifier for this option.
    #[must_use]
    pub const fn raw(self) -> i32 {
        self as i32
    }
}

/// Per-socket option storage.
///
/// One instance per socket, created with defaults at socket construction and
/// dropped with it. `set` validates length and range before mutating; `get`
/// serializes the current value into a caller-supplied buffer. Fields are
/// private so every externally visible mutation goes through validation.
///
/// # Examples
///
/// ```
/// use tonneau::options::{OptionStore, SocketOption};
///
/// let mut opts = OptionStore::new();
/// opts.set(SocketOption::SndHwm.raw(), &500i32.to_ne_bytes()).unwrap();
/// assert_eq!(opts.send_hwm(), 500);
///
/// let mut buf = [0u8; 4];
/// let n = opts.get(SocketOption::SndHwm.raw(), &mut buf).unwrap();
/// assert_eq!(i32::from_ne_bytes(buf[..n].try_into().unwrap()), 500);
/// ```
#[derive(Debug, Clone)]
pub struct OptionStore {
    send_hwm: i32,
    recv_hwm: i32,
    affinity: u64,
    identity: Bytes,
    rate: i32,
    recovery_ivl: i32,
    multicast_hops: i32,
    send_buf: i32,
    recv_buf: i32,
    socket_type: i32,
    linger: i32,
    reconnect_ivl: i32,
    reconnect_ivl_max: i32,
    backlog: i32,
    max_msg_size: i64,
    recv_timeo: i32,
    send_timeo: i32,
    immediate_connect: bool,
    delay_on_close: bool,
    delay_on_disconnect: bool,
    filter: bool,
}

impl Default for OptionStore {
    fn default() -> Self {
        Self {
            send_hwm: 1000,
            recv_hwm: 1000,
            affinity: 0,
            identity: Bytes::new(),
            rate: 100,
            recovery_ivl: 10_000,
            multicast_hops: 1,
            send_buf: 0,
            recv_buf: 0,
            socket_type: -1,
            linger: -1,
            reconnect_ivl: 100,
            reconnect_ivl_max: 0,
            backlog: 100,
            max_msg_size: -1,
            recv_timeo: -1,
            send_timeo: -1,
            immediate_connect: true,
            delay_on_close: true,
            delay_on_disconnect: true,
            filter: false,
        }
    }
}

impl OptionStore {
    /// Create a new option store with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamp the socket type at construction.
    ///
    /// The type is fixed for the socket's lifetime and is never settable
    /// through `set`; it is only readable back through `get`.
    #[must_use]
    pub fn with_socket_type(mut self, socket_type: i32) -> Self {
        self.socket_type = socket_type;
        self
    }

    /// Set an option from its raw byte representation.
    ///
    /// Fixed-width options expect exactly the native-endian encoding of
    /// their integer type; the identity option takes 1-255 raw bytes with a
    /// non-zero first byte. Any length or range violation, and any
    /// unrecognized identifier, fails with invalid-argument and mutates
    /// nothing.
    pub fn set(&mut self, option: i32, value: &[u8]) -> Result<()> {
        let Some(option) = SocketOption::from_raw(option) else {
            debug!(option, "rejected write to unrecognized option");
            return Err(OptionError::invalid("unrecognized option identifier"));
        };

        match option {
            SocketOption::SndHwm => {
                let v = parse_i32(value)?;
                if v < 0 {
                    return Err(OptionError::invalid("send HWM must be >= 0"));
                }
                self.send_hwm = v;
            }

            SocketOption::RcvHwm => {
                let v = parse_i32(value)?;
                if v < 0 {
                    return Err(OptionError::invalid("receive HWM must be >= 0"));
                }
                self.recv_hwm = v;
            }

            SocketOption::Affinity => {
                self.affinity = parse_u64(value)?;
            }

            SocketOption::Identity => {
                // Empty identities are invalid, as are identities longer
                // than 255 bytes. A leading zero byte is reserved to mark
                // auto-generated identities.
                if value.is_empty() || value.len() > 255 {
                    return Err(OptionError::invalid("identity must be 1-255 bytes"));
                }
                if value[0] == 0 {
                    return Err(OptionError::invalid(
                        "identity must not start with a zero byte",
                    ));
                }
                self.identity = Bytes::copy_from_slice(value);
            }

            SocketOption::Rate => {
                let v = parse_i32(value)?;
                if v <= 0 {
                    return Err(OptionError::invalid("rate must be > 0"));
                }
                self.rate = v;
            }

            SocketOption::RecoveryIvl => {
                let v = parse_i32(value)?;
                if v < 0 {
                    return Err(OptionError::invalid("recovery interval must be >= 0"));
                }
                self.recovery_ivl = v;
            }

            SocketOption::SndBuf => {
                let v = parse_i32(value)?;
                if v < 0 {
                    return Err(OptionError::invalid("send buffer size must be >= 0"));
                }
                self.send_buf = v;
            }

            SocketOption::RcvBuf => {
                let v = parse_i32(value)?;
                if v < 0 {
                    return Err(OptionError::invalid("receive buffer size must be >= 0"));
                }
                self.recv_buf = v;
            }

            SocketOption::Type => {
                return Err(OptionError::invalid("socket type is read-only"));
            }

            SocketOption::Linger => {
                self.linger = parse_i32(value)?;
            }

            SocketOption::ReconnectIvl => {
                let v = parse_i32(value)?;
                if v < 0 {
                    return Err(OptionError::invalid("reconnect interval must be >= 0"));
                }
                self.reconnect_ivl = v;
            }

            SocketOption::ReconnectIvlMax => {
                let v = parse_i32(value)?;
                if v < 0 {
                    return Err(OptionError::invalid(
                        "maximum reconnect interval must be >= 0",
                    ));
                }
                self.reconnect_ivl_max = v;
            }

            SocketOption::Backlog => {
                self.backlog = parse_i32(value)?;
            }

            SocketOption::MaxMsgSize => {
                self.max_msg_size = parse_i64(value)?;
            }

            SocketOption::MulticastHops => {
                let v = parse_i32(value)?;
                if v <= 0 {
                    return Err(OptionError::invalid("multicast hops must be > 0"));
                }
                self.multicast_hops = v;
            }

            SocketOption::RcvTimeo => {
                self.recv_timeo = parse_i32(value)?;
            }

            SocketOption::SndTimeo => {
                self.send_timeo = parse_i32(value)?;
            }
        }

        trace!(?option, "option updated");
        Ok(())
    }

    /// Read an option's current value into a caller-supplied buffer.
    ///
    /// Fails with invalid-argument if the buffer is smaller than the
    /// serialized value (the identity's current length for `Identity`,
    /// which may be zero if never assigned). On success returns the number
    /// of bytes written: native-endian fixed-width integers, raw bytes for
    /// the identity. Never mutates the store.
    pub fn get(&self, option: i32, buf: &mut [u8]) -> Result<usize> {
        let Some(option) = SocketOption::from_raw(option) else {
            return Err(OptionError::invalid("unrecognized option identifier"));
        };

        match option {
            SocketOption::SndHwm => put_i32(buf, self.send_hwm),
            SocketOption::RcvHwm => put_i32(buf, self.recv_hwm),
            SocketOption::Affinity => put_u64(buf, self.affinity),
            SocketOption::Identity => {
                if buf.len() < self.identity.len() {
                    return Err(OptionError::invalid("buffer too small for identity"));
                }
                buf[..self.identity.len()].copy_from_slice(&self.identity);
                Ok(self.identity.len())
            }
            SocketOption::Rate => put_i32(buf, self.rate),
            SocketOption::RecoveryIvl => put_i32(buf, self.recovery_ivl),
            SocketOption::SndBuf => put_i32(buf, self.send_buf),
            SocketOption::RcvBuf => put_i32(buf, self.recv_buf),
            SocketOption::Type => put_i32(buf, self.socket_type),
            SocketOption::Linger => put_i32(buf, self.linger),
            SocketOption::ReconnectIvl => put_i32(buf, self.reconnect_ivl),
            SocketOption::ReconnectIvlMax => put_i32(buf, self.reconnect_ivl_max),
            SocketOption::Backlog => put_i32(buf, self.backlog),
            SocketOption::MaxMsgSize => put_i64(buf, self.max_msg_size),
            SocketOption::MulticastHops => put_i32(buf, self.multicast_hops),
            SocketOption::RcvTimeo => put_i32(buf, self.recv_timeo),
            SocketOption::SndTimeo => put_i32(buf, self.send_timeo),
        }
    }

    /// Send high water mark in messages.
    #[must_use]
    pub const fn send_hwm(&self) -> i32 {
        self.send_hwm
    }

    /// Receive high water mark in messages.
    #[must_use]
    pub const fn recv_hwm(&self) -> i32 {
        self.recv_hwm
    }

    /// I/O thread affinity bitmask.
    #[must_use]
    pub const fn affinity(&self) -> u64 {
        self.affinity
    }

    /// Socket identity blob; empty if never assigned.
    #[must_use]
    pub fn identity(&self) -> Bytes {
        self.identity.clone()
    }

    /// Multicast data rate in kbps.
    #[must_use]
    pub const fn rate(&self) -> i32 {
        self.rate
    }

    /// Multicast recovery interval in milliseconds.
    #[must_use]
    pub const fn recovery_ivl(&self) -> i32 {
        self.recovery_ivl
    }

    /// Multicast time-to-live in hops.
    #[must_use]
    pub const fn multicast_hops(&self) -> i32 {
        self.multicast_hops
    }

    /// Kernel send buffer size in bytes; 0 means OS default.
    #[must_use]
    pub const fn send_buffer_size(&self) -> i32 {
        self.send_buf
    }

    /// Kernel receive buffer size in bytes; 0 means OS default.
    #[must_use]
    pub const fn recv_buffer_size(&self) -> i32 {
        self.recv_buf
    }

    /// Socket type; -1 until stamped at construction.
    #[must_use]
    pub const fn socket_type(&self) -> i32 {
        self.socket_type
    }

    /// Linger period in milliseconds; -1 means infinite.
    #[must_use]
    pub const fn linger(&self) -> i32 {
        self.linger
    }

    /// Listen backlog for connection-oriented transports.
    #[must_use]
    pub const fn backlog(&self) -> i32 {
        self.backlog
    }

    /// Maximum inbound message size in bytes; -1 means unlimited.
    #[must_use]
    pub const fn max_msg_size(&self) -> i64 {
        self.max_msg_size
    }

    /// Receive timeout; `None` means block forever.
    #[must_use]
    pub fn recv_timeout(&self) -> Option<Duration> {
        ms_to_timeout(self.recv_timeo)
    }

    /// Send timeout; `None` means block forever.
    #[must_use]
    pub fn send_timeout(&self) -> Option<Duration> {
        ms_to_timeout(self.send_timeo)
    }

    /// Whether messages may be queued while a connection is in progress.
    #[must_use]
    pub const fn immediate_connect(&self) -> bool {
        self.immediate_connect
    }

    /// Whether pending outbound messages are flushed on close.
    #[must_use]
    pub const fn delay_on_close(&self) -> bool {
        self.delay_on_close
    }

    /// Whether half-sent inbound messages are drained on disconnect.
    #[must_use]
    pub const fn delay_on_disconnect(&self) -> bool {
        self.delay_on_disconnect
    }

    /// Whether subscription filtering is applied on the receiving side.
    #[must_use]
    pub const fn filter_enabled(&self) -> bool {
        self.filter
    }

    /// Reconnection delay for the given attempt, with exponential backoff.
    ///
    /// With `reconnect_ivl_max` at 0 the base interval is used for every
    /// attempt; otherwise the base interval doubles per attempt and is
    /// capped at the maximum.
    #[must_use]
    pub fn next_reconnect_interval(&self, attempt: u32) -> Duration {
        let base = Duration::from_millis(self.reconnect_ivl as u64);
        if self.reconnect_ivl_max <= 0 {
            return base;
        }

        let backoff = base.saturating_mul(2u32.saturating_pow(attempt));
        backoff.min(Duration::from_millis(self.reconnect_ivl_max as u64))
    }
}

/// Decode an exactly-4-byte native-endian i32 option value.
fn parse_i32(value: &[u8]) -> Result<i32> {
    let raw: [u8; 4] = value
        .try_into()
        .map_err(|_| OptionError::invalid("expected a 32-bit value"))?;
    Ok(i32::from_ne_bytes(raw))
}

/// Decode an exactly-8-byte native-endian i64 option value.
fn parse_i64(value: &[u8]) -> Result<i64> {
    let raw: [u8; 8] = value
        .try_into()
        .map_err(|_| OptionError::invalid("expected a 64-bit value"))?;
    Ok(i64::from_ne_bytes(raw))
}

/// Decode an exactly-8-byte native-endian u64 option value.
fn parse_u64(value: &[u8]) -> Result<u64> {
    let raw: [u8; 8] = value
        .try_into()
        .map_err(|_| OptionError::invalid("expected an unsigned 64-bit value"))?;
    Ok(u64::from_ne_bytes(raw))
}

fn put_i32(buf: &mut [u8], value: i32) -> Result<usize> {
    put_bytes(buf, &value.to_ne_bytes())
}

fn put_i64(buf: &mut [u8], value: i64) -> Result<usize> {
    put_bytes(buf, &value.to_ne_bytes())
}

fn put_u64(buf: &mut [u8], value: u64) -> Result<usize> {
    put_bytes(buf, &value.to_ne_bytes())
}

fn put_bytes(buf: &mut [u8], raw: &[u8]) -> Result<usize> {
    let slot = buf
        .get_mut(..raw.len())
        .ok_or(OptionError::invalid("buffer too small for option value"))?;
    slot.copy_from_slice(raw);
    Ok(raw.len())
}

fn ms_to_timeout(ms: i32) -> Option<Duration> {
    if ms < 0 {
        None
    } else {
        Some(Duration::from_millis(ms as u64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = OptionStore::default();
        assert_eq!(opts.send_hwm(), 1000);
        assert_eq!(opts.recv_hwm(), 1000);
        assert_eq!(opts.affinity(), 0);
        assert!(opts.identity().is_empty());
        assert_eq!(opts.rate(), 100);
        assert_eq!(opts.recovery_ivl(), 10_000);
        assert_eq!(opts.multicast_hops(), 1);
        assert_eq!(opts.socket_type(), -1);
        assert_eq!(opts.linger(), -1);
        assert_eq!(opts.backlog(), 100);
        assert_eq!(opts.max_msg_size(), -1);
        assert!(opts.recv_timeout().is_none());
        assert!(opts.send_timeout().is_none());
        assert!(opts.immediate_connect());
        assert!(opts.delay_on_close());
        assert!(opts.delay_on_disconnect());
        assert!(!opts.filter_enabled());
    }

    #[test]
    fn test_from_raw_round_trip() {
        for option in [
            SocketOption::Affinity,
            SocketOption::Identity,
            SocketOption::Rate,
            SocketOption::RecoveryIvl,
            SocketOption::SndBuf,
            SocketOption::RcvBuf,
            SocketOption::Type,
            SocketOption::Linger,
            SocketOption::ReconnectIvl,
            SocketOption::Backlog,
            SocketOption::ReconnectIvlMax,
            SocketOption::MaxMsgSize,
            SocketOption::SndHwm,
            SocketOption::RcvHwm,
            SocketOption::MulticastHops,
            SocketOption::RcvTimeo,
            SocketOption::SndTimeo,
        ] {
            assert_eq!(SocketOption::from_raw(option.raw()), Some(option));
        }

        assert_eq!(SocketOption::from_raw(0), None);
        assert_eq!(SocketOption::from_raw(-1), None);
        assert_eq!(SocketOption::from_raw(1000), None);
    }

    #[test]
    fn test_socket_type_stamp() {
        let opts = OptionStore::new().with_socket_type(6);
        assert_eq!(opts.socket_type(), 6);

        let mut buf = [0u8; 4];
        let n = opts.get(SocketOption::Type.raw(), &mut buf).unwrap();
        assert_eq!(n, 4);
        assert_eq!(i32::from_ne_bytes(buf), 6);
    }

    #[test]
    fn test_timeout_conversion() {
        let mut opts = OptionStore::new();
        assert!(opts.recv_timeout().is_none());

        opts.set(SocketOption::RcvTimeo.raw(), &0i32.to_ne_bytes())
            .unwrap();
        assert_eq!(opts.recv_timeout(), Some(Duration::ZERO));

        opts.set(SocketOption::SndTimeo.raw(), &250i32.to_ne_bytes())
            .unwrap();
        assert_eq!(opts.send_timeout(), Some(Duration::from_millis(250)));

        opts.set(SocketOption::SndTimeo.raw(), &(-1i32).to_ne_bytes())
            .unwrap();
        assert!(opts.send_timeout().is_none());
    }

    #[test]
    fn test_reconnect_backoff() {
        let mut opts = OptionStore::new();
        opts.set(SocketOption::ReconnectIvl.raw(), &100i32.to_ne_bytes())
            .unwrap();

        // No maximum configured: base interval on every attempt.
        assert_eq!(opts.next_reconnect_interval(0), Duration::from_millis(100));
        assert_eq!(opts.next_reconnect_interval(5), Duration::from_millis(100));

        opts.set(
            SocketOption::ReconnectIvlMax.raw(),
            &10_000i32.to_ne_bytes(),
        )
        .unwrap();
        assert_eq!(opts.next_reconnect_interval(0), Duration::from_millis(100));
        assert_eq!(opts.next_reconnect_interval(1), Duration::from_millis(200));
        assert_eq!(opts.next_reconnect_interval(2), Duration::from_millis(400));
        assert_eq!(opts.next_reconnect_interval(10), Duration::from_secs(10));
    }

    #[test]
    fn test_parse_helpers_reject_wrong_length() {
        assert!(parse_i32(&[0u8; 3]).is_err());
        assert!(parse_i32(&[0u8; 5]).is_err());
        assert!(parse_i64(&[0u8; 4]).is_err());
        assert!(parse_u64(&[0u8; 9]).is_err());
        assert_eq!(parse_i32(&7i32.to_ne_bytes()), Ok(7));
        assert_eq!(parse_u64(&u64::MAX.to_ne_bytes()), Ok(u64::MAX));
    }
}
