//! Fixed-size log record transmitted over a log channel
//!
//! Wire layout (`RECORD_SIZE` bytes):
//!
//! | offset | size | field                                   |
//! |--------|------|-----------------------------------------|
//! | 0      | 254  | payload, UTF-8, NUL padded              |
//! | 254    | 1    | subsystem id                            |
//! | 255    | 1    | level id                                |
//! | 256    | 8    | owning handle id, little endian         |

use super::error::{LoggerError, Result};
use super::log_level::LogLevel;
use super::subsystem::Subsystem;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt::{self, Write as _};
use std::sync::atomic::{AtomicU64, Ordering};

/// Size of the payload field, terminator included
pub const MAX_LOG_MSG_SIZE: usize = 254;

/// Encoded size of one record
pub const RECORD_SIZE: usize = MAX_LOG_MSG_SIZE + 1 + 1 + 8;

const SUBSYSTEM_OFFSET: usize = MAX_LOG_MSG_SIZE;
const LEVEL_OFFSET: usize = MAX_LOG_MSG_SIZE + 1;
const HANDLE_OFFSET: usize = MAX_LOG_MSG_SIZE + 2;

/// Process-unique identifier of a log handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HandleId(pub u64);

impl HandleId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        HandleId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "handle#{}", self.0)
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub struct LogRecord {
    pub subsystem: Subsystem,
    pub level: LogLevel,
    pub handle: HandleId,
    payload: [u8; MAX_LOG_MSG_SIZE],
    len: u8,
}

impl LogRecord {
    /// Longest payload text; one byte is always left for the terminator
    pub const TEXT_CAPACITY: usize = MAX_LOG_MSG_SIZE - 1;

    /// Build a record by formatting `args` straight into the payload buffer.
    ///
    /// Text beyond [`Self::TEXT_CAPACITY`] is dropped on a character boundary.
    /// Newlines, carriage returns and tabs are escaped to keep one record per
    /// rendered line. NUL is escaped so it cannot end the payload early.
    pub fn new(
        subsystem: Subsystem,
        level: LogLevel,
        handle: HandleId,
        args: fmt::Arguments<'_>,
    ) -> Self {
        let mut writer = PayloadWriter::default();
        // PayloadWriter never fails; truncation is silent
        let _ = writer.write_fmt(args);
        Self {
            subsystem,
            level,
            handle,
            payload: writer.buf,
            len: writer.len as u8,
        }
    }

    pub fn from_text(subsystem: Subsystem, level: LogLevel, handle: HandleId, text: &str) -> Self {
        Self::new(subsystem, level, handle, format_args!("{}", text))
    }

    /// Payload text
    pub fn message(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.payload[..self.len as usize])
    }

    pub fn message_len(&self) -> usize {
        self.len as usize
    }

    pub fn encode(&self) -> [u8; RECORD_SIZE] {
        let mut out = [0u8; RECORD_SIZE];
        out[..MAX_LOG_MSG_SIZE].copy_from_slice(&self.payload);
        out[SUBSYSTEM_OFFSET] = self.subsystem.id();
        out[LEVEL_OFFSET] = self.level as u8;
        out[HANDLE_OFFSET..].copy_from_slice(&self.handle.0.to_le_bytes());
        out
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != RECORD_SIZE {
            return Err(LoggerError::malformed(format!(
                "expected {} bytes, got {}",
                RECORD_SIZE,
                bytes.len()
            )));
        }

        let level_id = bytes[LEVEL_OFFSET];
        let level = LogLevel::from_u8(level_id)
            .ok_or_else(|| LoggerError::malformed(format!("level id {} out of range", level_id)))?;

        let mut payload = [0u8; MAX_LOG_MSG_SIZE];
        payload.copy_from_slice(&bytes[..MAX_LOG_MSG_SIZE]);
        let len = payload
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(Self::TEXT_CAPACITY)
            .min(Self::TEXT_CAPACITY);
        payload[len..].fill(0);

        let mut handle = [0u8; 8];
        handle.copy_from_slice(&bytes[HANDLE_OFFSET..]);

        Ok(Self {
            subsystem: Subsystem(bytes[SUBSYSTEM_OFFSET]),
            level,
            handle: HandleId(u64::from_le_bytes(handle)),
            payload,
            len: len as u8,
        })
    }
}

impl fmt::Debug for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogRecord")
            .field("subsystem", &self.subsystem)
            .field("level", &self.level)
            .field("handle", &self.handle)
            .field("message", &self.message())
            .finish()
    }
}

/// Bounded, allocation-free sink for record payloads
struct PayloadWriter {
    buf: [u8; MAX_LOG_MSG_SIZE],
    len: usize,
    full: bool,
}

impl Default for PayloadWriter {
    fn default() -> Self {
        Self {
            buf: [0u8; MAX_LOG_MSG_SIZE],
            len: 0,
            full: false,
        }
    }
}

impl PayloadWriter {
    fn push(&mut self, s: &str) -> bool {
        if self.len + s.len() > LogRecord::TEXT_CAPACITY {
            self.full = true;
            return false;
        }
        self.buf[self.len..self.len + s.len()].copy_from_slice(s.as_bytes());
        self.len += s.len();
        true
    }
}

impl fmt::Write for PayloadWriter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let mut utf8 = [0u8; 4];
        for ch in s.chars() {
            if self.full {
                break;
            }
            let piece = match ch {
                '\n' => "\\n",
                '\r' => "\\r",
                '\t' => "\\t",
                '\0' => "\\0",
                other => other.encode_utf8(&mut utf8),
            };
            if !self.push(piece) {
                break;
            }
        }
        Ok(())
    }
}
