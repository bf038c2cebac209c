//! Termination channel: a single-slot wake-up shared by every wake source.
//!
//! `deliver` is safe to call from signal handlers and foreign threads. On
//! Unix it is a self-pipe guarded by a presence flag: only the delivery that
//! flips the flag writes a byte, so the pipe never holds more than one
//! pending wake-up per `receive`.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};

/// Presence-only wake-up channel.
///
/// Any number of deliveries before a `receive` collapse into one wake-up.
#[derive(Debug)]
pub struct TerminationChannel {
    pending: AtomicBool,
    #[cfg(unix)]
    read_fd: libc::c_int,
    #[cfg(unix)]
    write_fd: libc::c_int,
    #[cfg(not(unix))]
    slot: std::sync::Mutex<Option<u8>>,
    #[cfg(not(unix))]
    ready: std::sync::Condvar,
}

impl TerminationChannel {
    /// Whether a wake-up is pending.
    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }
}

#[cfg(unix)]
impl TerminationChannel {
    /// Create the channel.
    pub fn new() -> io::Result<Self> {
        let mut fds = [0 as libc::c_int; 2];
        if unsafe { libc::pipe(fds.as_mut_ptr()) } != 0 {
            return Err(io::Error::last_os_error());
        }
        let channel = Self {
            pending: AtomicBool::new(false),
            read_fd: fds[0],
            write_fd: fds[1],
        };
        // Dropping `channel` on error closes both ends.
        set_nonblocking_cloexec(channel.read_fd)?;
        set_nonblocking_cloexec(channel.write_fd)?;
        Ok(channel)
    }

    /// Ensure a wake-up is pending, carrying `token`.
    ///
    /// Never blocks and never allocates; safe from signal handlers.
    pub fn deliver(&self, token: u8) {
        if self.pending.swap(true, Ordering::AcqRel) {
            return;
        }
        let buf = [token];
        loop {
            let n = unsafe { libc::write(self.write_fd, buf.as_ptr().cast(), 1) };
            if n >= 0 || errno() != libc::EINTR {
                break;
            }
        }
    }

    /// Consume the pending wake-up and return its token.
    ///
    /// With `blocking`, waits until one exists; otherwise returns `None` when
    /// nothing is pending.
    pub fn receive(&self, blocking: bool) -> io::Result<Option<u8>> {
        loop {
            if let Some(token) = self.take()? {
                return Ok(Some(token));
            }
            if !blocking {
                return Ok(None);
            }
            self.wait_readable()?;
        }
    }

    /// Drain the pipe, then clear the flag. A delivery racing in between
    /// sees the flag still set and is folded into this wake-up.
    fn take(&self) -> io::Result<Option<u8>> {
        let mut first = None;
        let mut buf = [0u8; 16];
        loop {
            let n = unsafe { libc::read(self.read_fd, buf.as_mut_ptr().cast(), buf.len()) };
            if n > 0 {
                if first.is_none() {
                    first = Some(buf[0]);
                }
                continue;
            }
            if n == 0 {
                break;
            }
            match errno() {
                libc::EINTR => continue,
                e if e == libc::EAGAIN || e == libc::EWOULDBLOCK => break,
                e => return Err(io::Error::from_raw_os_error(e)),
            }
        }
        if first.is_some() {
            self.pending.store(false, Ordering::Release);
        }
        Ok(first)
    }

    fn wait_readable(&self) -> io::Result<()> {
        let mut pfd = libc::pollfd {
            fd: self.read_fd,
            events: libc::POLLIN,
            revents: 0,
        };
        let rc = unsafe { libc::poll(&mut pfd, 1, -1) };
        if rc < 0 && errno() != libc::EINTR {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}

#[cfg(unix)]
impl Drop for TerminationChannel {
    fn drop(&mut self) {
        unsafe {
            libc::close(self.read_fd);
            libc::close(self.write_fd);
        }
    }
}

#[cfg(unix)]
fn set_nonblocking_cloexec(fd: libc::c_int) -> io::Result<()> {
    unsafe {
        let flags = libc::fcntl(fd, libc::F_GETFL, 0);
        if flags == -1 || libc::fcntl(fd, libc::F_SETFL, flags | libc::O_NONBLOCK) == -1 {
            return Err(io::Error::last_os_error());
        }
        let fd_flags = libc::fcntl(fd, libc::F_GETFD, 0);
        if fd_flags == -1 || libc::fcntl(fd, libc::F_SETFD, fd_flags | libc::FD_CLOEXEC) == -1 {
            return Err(io::Error::last_os_error());
        }
    }
    Ok(())
}

#[cfg(unix)]
fn errno() -> libc::c_int {
    io::Error::last_os_error().raw_os_error().unwrap_or(0)
}

#[cfg(not(unix))]
impl TerminationChannel {
    /// Create the channel.
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            pending: AtomicBool::new(false),
            slot: std::sync::Mutex::new(None),
            ready: std::sync::Condvar::new(),
        })
    }

    /// Ensure a wake-up is pending, carrying `token`.
    pub fn deliver(&self, token: u8) {
        if self.pending.swap(true, Ordering::AcqRel) {
            return;
        }
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        slot.get_or_insert(token);
        self.ready.notify_one();
    }

    /// Consume the pending wake-up and return its token.
    pub fn receive(&self, blocking: bool) -> io::Result<Option<u8>> {
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        while blocking && slot.is_none() {
            slot = self.ready.wait(slot).unwrap_or_else(|e| e.into_inner());
        }
        let token = slot.take();
        if token.is_some() {
            self.pending.store(false, Ordering::Release);
        }
        Ok(token)
    }
}
