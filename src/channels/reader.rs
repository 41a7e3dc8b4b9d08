//! Reference consumer for the read side of a log channel
//!
//! Reads whole records from a byte source on a dedicated thread and hands them
//! over a crossbeam channel, stamped with their receive time.

use crate::core::{LogRecord, LoggerError, Result, RECORD_SIZE};
use chrono::{DateTime, Utc};
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::io::{self, Read};
use std::thread;

/// A decoded record and the time the reader received it
#[derive(Debug, Clone)]
pub struct ReceivedRecord {
    pub record: LogRecord,
    pub received_at: DateTime<Utc>,
}

impl ReceivedRecord {
    /// Render as `[timestamp] [LEVEL] [subsystem] text`
    pub fn render(&self) -> String {
        format!(
            "[{}] [{:7}] [{}] {}",
            self.received_at.format("%Y-%m-%d %H:%M:%S%.3f"),
            self.record.level.to_str().to_uppercase(),
            self.record.subsystem.name(),
            self.record.message()
        )
    }
}

pub struct LogReader {
    receiver: Receiver<ReceivedRecord>,
    handle: Option<thread::JoinHandle<Result<u64>>>,
}

impl LogReader {
    /// Spawn the reader thread. It stops at end of input or on the first
    /// read or decode error, or once every receiver is gone.
    pub fn spawn<R: Read + Send + 'static>(source: R) -> Result<Self> {
        let (sender, receiver) = unbounded();
        let handle = thread::Builder::new()
            .name("log-reader".to_string())
            .spawn(move || Self::run(source, sender))
            .map_err(|e| LoggerError::io_operation("spawning log reader", "thread spawn failed", e))?;

        Ok(Self {
            receiver,
            handle: Some(handle),
        })
    }

    fn run<R: Read>(mut source: R, sender: Sender<ReceivedRecord>) -> Result<u64> {
        let mut buf = [0u8; RECORD_SIZE];
        let mut count = 0u64;

        loop {
            match source.read_exact(&mut buf) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(count),
                Err(e) => {
                    eprintln!("[LOG READER ERROR] Read failed after {} records: {}", count, e);
                    return Err(e.into());
                }
            }

            let record = match LogRecord::decode(&buf) {
                Ok(record) => record,
                Err(e) => {
                    eprintln!("[LOG READER ERROR] Dropping stream after {} records: {}", count, e);
                    return Err(e);
                }
            };

            count += 1;
            let received = ReceivedRecord {
                record,
                received_at: Utc::now(),
            };
            if sender.send(received).is_err() {
                return Ok(count);
            }
        }
    }

    pub fn records(&self) -> &Receiver<ReceivedRecord> {
        &self.receiver
    }

    /// Wait for the reader thread, returning the number of records read
    pub fn join(mut self) -> Result<u64> {
        match self.handle.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| LoggerError::other("log reader thread panicked"))?,
            None => Ok(0),
        }
    }
}
