//! Channel trait for log record destinations

use std::io;

/// A byte-oriented, non-blocking destination for encoded log records.
///
/// `try_write` performs one write attempt and must not block. A destination
/// that cannot accept data right now reports [`io::ErrorKind::WouldBlock`];
/// it may accept fewer bytes than offered, in which case the caller resumes
/// with the remainder.
pub trait LogChannel: Send {
    fn try_write(&mut self, buf: &[u8]) -> io::Result<usize>;
    fn name(&self) -> &str;
}

impl<C: LogChannel + ?Sized> LogChannel for Box<C> {
    fn try_write(&mut self, buf: &[u8]) -> io::Result<usize> {
        (**self).try_write(buf)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
