//! Bounded in-process channel
//!
//! Behaves like a non-blocking pipe: a write is accepted whole or refused with
//! `WouldBlock` when the remaining capacity cannot hold it. An optional
//! per-call write limit splits accepted writes into partial writes.

use crate::core::{LogChannel, LogRecord, RECORD_SIZE};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::io;
use std::sync::Arc;

#[derive(Debug)]
struct Shared {
    buffer: VecDeque<u8>,
    capacity: usize,
    closed: bool,
}

/// Write side of an in-memory channel
///
/// # Example
///
/// ```
/// use cluster_logging::channels::MemoryChannel;
/// use cluster_logging::prelude::*;
///
/// let (channel, reader) = MemoryChannel::bounded(4096);
/// let handle = LogHandle::builder().channel(channel).build().unwrap();
///
/// handle.log(Subsystem::LINK, LogLevel::Warning, "link 2 flapping");
/// let records = reader.take_records();
/// assert_eq!(records[0].message(), "link 2 flapping");
/// ```
#[derive(Debug)]
pub struct MemoryChannel {
    shared: Arc<Mutex<Shared>>,
    max_write: usize,
}

/// Read side of an in-memory channel
#[derive(Debug, Clone)]
pub struct MemoryChannelReader {
    shared: Arc<Mutex<Shared>>,
}

impl MemoryChannel {
    /// Channel holding at most `capacity` unread bytes
    pub fn bounded(capacity: usize) -> (MemoryChannel, MemoryChannelReader) {
        let shared = Arc::new(Mutex::new(Shared {
            buffer: VecDeque::with_capacity(capacity.min(1 << 20)),
            capacity,
            closed: false,
        }));
        (
            MemoryChannel {
                shared: Arc::clone(&shared),
                max_write: usize::MAX,
            },
            MemoryChannelReader { shared },
        )
    }

    /// Channel sized to hold `records` unread records
    pub fn with_record_capacity(records: usize) -> (MemoryChannel, MemoryChannelReader) {
        Self::bounded(records * RECORD_SIZE)
    }

    /// Accept at most `bytes` per write call
    #[must_use]
    pub fn with_max_write(mut self, bytes: usize) -> Self {
        self.max_write = bytes.max(1);
        self
    }
}

impl LogChannel for MemoryChannel {
    fn try_write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut shared = self.shared.lock();
        if shared.closed {
            return Err(io::ErrorKind::BrokenPipe.into());
        }
        if shared.capacity - shared.buffer.len() < buf.len() {
            return Err(io::ErrorKind::WouldBlock.into());
        }
        let n = buf.len().min(self.max_write);
        shared.buffer.extend(&buf[..n]);
        Ok(n)
    }

    fn name(&self) -> &str {
        "memory"
    }
}

impl MemoryChannelReader {
    /// Drain and decode every complete record
    pub fn take_records(&self) -> Vec<LogRecord> {
        let mut shared = self.shared.lock();
        let complete = shared.buffer.len() / RECORD_SIZE * RECORD_SIZE;
        let bytes: Vec<u8> = shared.buffer.drain(..complete).collect();
        drop(shared);

        bytes
            .chunks_exact(RECORD_SIZE)
            .filter_map(|chunk| LogRecord::decode(chunk).ok())
            .collect()
    }

    /// Unread bytes currently buffered
    pub fn pending_bytes(&self) -> usize {
        self.shared.lock().buffer.len()
    }

    /// Make further writes fail with `BrokenPipe`
    pub fn close(&self) {
        self.shared.lock().closed = true;
    }
}
