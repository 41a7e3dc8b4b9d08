//! OS pipe channel
//!
//! The write end is switched to `O_NONBLOCK`, so a full pipe surfaces as a
//! retry-later outcome instead of stalling the logging path. A record is
//! smaller than `PIPE_BUF`, which makes each record write atomic.

use crate::core::{LogChannel, LoggerError, Result, RECORD_SIZE};
use std::fs::File;
use std::io::{self, Write};
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd, RawFd};

const _: () = assert!(RECORD_SIZE <= 512, "records must fit the POSIX PIPE_BUF minimum");

/// Non-blocking write end of a pipe (or any descriptor behaving like one)
///
/// # Example
///
/// ```no_run
/// use cluster_logging::channels::{pipe, LogReader};
/// use cluster_logging::prelude::*;
///
/// let (channel, read_end) = pipe::channel().expect("pipe");
/// let reader = LogReader::spawn(read_end).expect("reader thread");
///
/// let handle = LogHandle::builder().channel(channel).build().unwrap();
/// handle.log(Subsystem::TRANSPORT, LogLevel::Info, "listening");
/// ```
#[derive(Debug)]
pub struct PipeChannel {
    file: File,
}

impl PipeChannel {
    /// Adopt an externally created descriptor and make it non-blocking
    pub fn from_fd(fd: OwnedFd) -> Result<Self> {
        set_nonblocking(fd.as_raw_fd()).map_err(|e| {
            LoggerError::io_operation("configuring log channel", "fcntl(O_NONBLOCK) failed", e)
        })?;
        Ok(Self { file: File::from(fd) })
    }

    pub fn as_raw_fd(&self) -> RawFd {
        self.file.as_raw_fd()
    }
}

impl LogChannel for PipeChannel {
    fn try_write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write(buf)
    }

    fn name(&self) -> &str {
        "pipe"
    }
}

/// Create a pipe: the non-blocking write end as a channel, and the blocking
/// read end for the consumer
pub fn channel() -> Result<(PipeChannel, File)> {
    let mut fds = [0 as libc::c_int; 2];
    // SAFETY: fds has room for the two descriptors pipe(2) writes
    let rc = unsafe { libc::pipe(fds.as_mut_ptr()) };
    if rc != 0 {
        return Err(LoggerError::io_operation(
            "creating log pipe",
            "pipe(2) failed",
            io::Error::last_os_error(),
        ));
    }
    // SAFETY: both descriptors were just returned by pipe(2) and are owned here
    let (read_end, write_end) = unsafe { (OwnedFd::from_raw_fd(fds[0]), OwnedFd::from_raw_fd(fds[1])) };

    for fd in [&read_end, &write_end] {
        set_cloexec(fd.as_raw_fd()).map_err(|e| {
            LoggerError::io_operation("creating log pipe", "fcntl(FD_CLOEXEC) failed", e)
        })?;
    }

    Ok((PipeChannel::from_fd(write_end)?, File::from(read_end)))
}

fn set_nonblocking(fd: RawFd) -> io::Result<()> {
    // SAFETY: fcntl on a descriptor we hold open
    let flags = unsafe { libc::fcntl(fd, libc::F_GETFL) };
    if flags < 0 {
        return Err(io::Error::last_os_error());
    }
    // SAFETY: as above
    if unsafe { libc::fcntl(fd, libc::F_SETFL, flags | libc::O_NONBLOCK) } < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

fn set_cloexec(fd: RawFd) -> io::Result<()> {
    // SAFETY: fcntl on a descriptor we hold open
    let flags = unsafe { libc::fcntl(fd, libc::F_GETFD) };
    if flags < 0 {
        return Err(io::Error::last_os_error());
    }
    // SAFETY: as above
    if unsafe { libc::fcntl(fd, libc::F_SETFD, flags | libc::FD_CLOEXEC) } < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}
