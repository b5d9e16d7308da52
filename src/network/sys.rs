//! Platform socket calls std does not expose
//!
//! - re-issuing `listen` with a caller-chosen backlog
//! - shutting down a listening socket so a blocked `accept` returns

use std::io;
use std::net::TcpListener;

#[cfg(unix)]
mod imp {
    use super::*;
    use std::os::unix::io::AsRawFd;

    pub fn listen(listener: &TcpListener, backlog: i32) -> io::Result<()> {
        // SAFETY: the fd is owned by `listener` and stays open for the call.
        let ret = unsafe { libc::listen(listener.as_raw_fd(), backlog) };
        if ret != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    pub fn shutdown_listener(listener: &TcpListener) -> io::Result<()> {
        // SAFETY: the fd is owned by `listener` and stays open for the call.
        let ret = unsafe { libc::shutdown(listener.as_raw_fd(), libc::SHUT_RDWR) };
        if ret != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}

#[cfg(not(unix))]
mod imp {
    use super::*;

    pub fn listen(_listener: &TcpListener, backlog: i32) -> io::Result<()> {
        // std already listens with its default backlog
        tracing::debug!("listen backlog {} not adjustable on this platform", backlog);
        Ok(())
    }

    pub fn shutdown_listener(_listener: &TcpListener) -> io::Result<()> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "listener shutdown not supported on this platform",
        ))
    }
}

pub use imp::{listen, shutdown_listener};
