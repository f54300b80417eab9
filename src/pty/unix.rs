//! Unix PTY implementation
//!
//! Implements PTY creation and child process management using POSIX APIs.

use std::ffi::CString;
use std::os::fd::BorrowedFd;
use std::os::unix::io::{AsRawFd, RawFd};

use nix::errno::Errno;
use nix::fcntl::{fcntl, open, FcntlArg, OFlag};
use nix::libc::{self, STDERR_FILENO, STDIN_FILENO, STDOUT_FILENO};
use nix::poll::{poll, PollFd, PollFlags};
use nix::pty::{grantpt, posix_openpt, ptsname, unlockpt, PtyMaster};
use nix::sys::signal::{kill, Signal};
use nix::sys::stat::Mode;
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::{close, dup2, execvp, fork, read, setsid, write, ForkResult, Pid};
use tracing::{debug, trace, warn};

use super::{PtyError, PtyResult, ReadOutcome, WindowSize};

/// Terminal type advertised to the child
const TERM: &str = "vt100";

/// Exit code of a child that could not exec its program
const EXEC_FAILED: i32 = 127;

/// A pseudoterminal with a spawned child process
pub struct Pty {
    /// The PTY master file descriptor
    master: PtyMaster,
    /// The child process ID
    child_pid: Pid,
    /// Exit code once the child has been reaped
    exit_code: Option<i32>,
}

impl Pty {
    /// Spawn `program` with `args` on a new PTY of the given size
    ///
    /// The child runs in its own session with the PTY slave as controlling
    /// terminal and `TERM=vt100`. The master is non-blocking.
    pub fn spawn(program: &str, args: &[&str], size: WindowSize) -> PtyResult<Self> {
        // Everything the child needs is prepared before fork
        let program_cstr =
            CString::new(program).map_err(|_| PtyError::InvalidArgument(program.to_string()))?;
        let mut argv = Vec::with_capacity(args.len() + 1);
        argv.push(program_cstr.clone());
        for arg in args {
            argv.push(CString::new(*arg).map_err(|_| PtyError::InvalidArgument(arg.to_string()))?);
        }

        let master = posix_openpt(OFlag::O_RDWR | OFlag::O_NOCTTY).map_err(PtyError::OpenMaster)?;
        grantpt(&master).map_err(PtyError::GrantPty)?;
        unlockpt(&master).map_err(PtyError::UnlockPty)?;

        // SAFETY: ptsname is not thread-safe, but we're calling it immediately
        // after unlockpt and before any other thread could interfere
        let slave_name = unsafe { ptsname(&master) }.map_err(PtyError::PtsName)?;

        set_window_size(master.as_raw_fd(), size)?;

        // SAFETY: the child only calls async-signal-safe functions (plus
        // setenv) before exec or _exit
        match unsafe { fork() }.map_err(PtyError::Fork)? {
            ForkResult::Child => {
                drop(master);
                exec_child(&slave_name, &program_cstr, &argv)
            }
            ForkResult::Parent { child } => {
                let flags = fcntl(master.as_raw_fd(), FcntlArg::F_GETFL)
                    .map_err(PtyError::SetNonBlocking)?;
                let flags = OFlag::from_bits_truncate(flags);
                fcntl(
                    master.as_raw_fd(),
                    FcntlArg::F_SETFL(flags | OFlag::O_NONBLOCK),
                )
                .map_err(PtyError::SetNonBlocking)?;

                debug!(program, pid = child.as_raw(), "spawned child on PTY");
                Ok(Pty {
                    master,
                    child_pid: child,
                    exit_code: None,
                })
            }
        }
    }

    /// Get the raw file descriptor of the PTY master
    pub fn master_fd(&self) -> RawFd {
        self.master.as_raw_fd()
    }

    /// Get the child process ID
    pub fn child_pid(&self) -> Pid {
        self.child_pid
    }

    /// Check if the child process is still running, reaping it if not
    pub fn is_alive(&mut self) -> bool {
        if self.exit_code.is_some() {
            return false;
        }

        match waitpid(self.child_pid, Some(WaitPidFlag::WNOHANG)) {
            Ok(WaitStatus::StillAlive) => true,
            Ok(status) => {
                self.exit_code = Some(exit_code(status));
                false
            }
            Err(_) => {
                self.exit_code = Some(0);
                false
            }
        }
    }

    /// Block until the child exits and return its exit code
    ///
    /// A child killed by a signal reports `128 + signal`, as shells do.
    pub fn wait(&mut self) -> PtyResult<i32> {
        if let Some(code) = self.exit_code {
            return Ok(code);
        }

        loop {
            match waitpid(self.child_pid, None) {
                Ok(status @ (WaitStatus::Exited(..) | WaitStatus::Signaled(..))) => {
                    let code = exit_code(status);
                    debug!(pid = self.child_pid.as_raw(), code, "child exited");
                    self.exit_code = Some(code);
                    return Ok(code);
                }
                Ok(_) | Err(Errno::EINTR) => continue,
                Err(Errno::ECHILD) => {
                    self.exit_code = Some(0);
                    return Ok(0);
                }
                Err(e) => return Err(PtyError::Wait(e)),
            }
        }
    }

    /// Read whatever the child has written, without blocking
    ///
    /// Linux reports a closed slave side as `EIO`; that and a zero-length
    /// read both mean the session is over.
    pub fn read_nonblocking(&self, buf: &mut [u8]) -> PtyResult<ReadOutcome> {
        match read(self.master.as_raw_fd(), buf) {
            Ok(0) => Ok(ReadOutcome::Eof),
            Ok(n) => Ok(ReadOutcome::Data(n)),
            // EAGAIN and EWOULDBLOCK are the same value on Linux
            Err(Errno::EAGAIN) | Err(Errno::EINTR) => Ok(ReadOutcome::WouldBlock),
            Err(Errno::EIO) => Ok(ReadOutcome::Eof),
            Err(e) => Err(PtyError::Read(e)),
        }
    }

    /// Write all data to the PTY master
    ///
    /// A full PTY buffer (`EAGAIN`) waits for the master to become writable;
    /// `EINTR` retries.
    pub fn write_all(&self, mut data: &[u8]) -> PtyResult<()> {
        while !data.is_empty() {
            match write(self.master.as_raw_fd(), data) {
                Ok(n) => data = &data[n..],
                Err(Errno::EINTR) => continue,
                Err(Errno::EAGAIN) => {
                    trace!(remaining = data.len(), "PTY write would block");
                    self.poll(PollFlags::POLLOUT, 100)?;
                }
                Err(e) => return Err(PtyError::Write(e)),
            }
        }
        Ok(())
    }

    /// Poll for data available to read
    ///
    /// Returns true if data is available (or the child hung up), false if
    /// the timeout expired.
    pub fn poll_read(&self, timeout_ms: i32) -> PtyResult<bool> {
        self.poll(PollFlags::POLLIN, timeout_ms)
    }

    fn poll(&self, events: PollFlags, timeout_ms: i32) -> PtyResult<bool> {
        // SAFETY: The master fd is valid for the lifetime of this Pty
        let borrowed_fd = unsafe { BorrowedFd::borrow_raw(self.master.as_raw_fd()) };
        let mut fds = [PollFd::new(&borrowed_fd, events)];
        match poll(&mut fds, timeout_ms) {
            Ok(n) => Ok(n > 0
                && fds[0]
                    .revents()
                    .is_some_and(|r| r.intersects(events | PollFlags::POLLHUP))),
            Err(Errno::EINTR) => Ok(false),
            Err(e) => Err(PtyError::Poll(e)),
        }
    }

    /// Resize the PTY
    pub fn resize(&self, size: WindowSize) -> PtyResult<()> {
        set_window_size(self.master.as_raw_fd(), size)
    }

    /// Current window size of the PTY
    pub fn window_size(&self) -> PtyResult<WindowSize> {
        get_window_size(self.master.as_raw_fd())
    }

    /// Send SIGHUP to the child, as a terminal does when it closes
    pub fn hangup(&self) -> PtyResult<()> {
        if self.exit_code.is_some() {
            return Ok(());
        }
        match kill(self.child_pid, Signal::SIGHUP) {
            Ok(()) | Err(Errno::ESRCH) => Ok(()),
            Err(e) => Err(PtyError::Signal(e)),
        }
    }
}

impl Drop for Pty {
    fn drop(&mut self) {
        // Try to reap the child process
        if self.exit_code.is_none() {
            let _ = waitpid(self.child_pid, Some(WaitPidFlag::WNOHANG));
        }
    }
}

fn exit_code(status: WaitStatus) -> i32 {
    match status {
        WaitStatus::Exited(_, code) => code,
        WaitStatus::Signaled(_, signal, _) => 128 + signal as i32,
        _ => 0,
    }
}

/// Child side of `spawn`: attach to the slave and exec, never returning
fn exec_child(slave_name: &str, program: &CString, argv: &[CString]) -> ! {
    let result = (|| -> nix::Result<()> {
        setsid()?;

        // Opening the slave after setsid makes it the controlling terminal
        let slave_fd = open(slave_name, OFlag::O_RDWR, Mode::empty())?;

        // SAFETY: TIOCSCTTY is a valid ioctl for setting controlling terminal
        unsafe {
            libc::ioctl(slave_fd, libc::TIOCSCTTY as _, 0);
        }

        dup2(slave_fd, STDIN_FILENO)?;
        dup2(slave_fd, STDOUT_FILENO)?;
        dup2(slave_fd, STDERR_FILENO)?;
        if slave_fd > STDERR_FILENO {
            let _ = close(slave_fd);
        }

        std::env::set_var("TERM", TERM);
        match execvp(program, argv)? {}
    })();

    if let Err(e) = result {
        let msg = format!("vtgrid: failed to start {:?}: {}\r\n", program, e);
        let _ = write(STDERR_FILENO, msg.as_bytes());
    }
    // SAFETY: _exit skips the parent's atexit handlers and buffered state
    unsafe { libc::_exit(EXEC_FAILED) }
}

/// Set the window size on a PTY file descriptor
fn set_window_size(fd: RawFd, size: WindowSize) -> PtyResult<()> {
    let winsize = libc::winsize {
        ws_row: size.rows,
        ws_col: size.cols,
        ws_xpixel: size.pixel_width,
        ws_ypixel: size.pixel_height,
    };

    // SAFETY: TIOCSWINSZ is a valid ioctl for setting window size
    let result = unsafe { libc::ioctl(fd, libc::TIOCSWINSZ, &winsize) };

    if result < 0 {
        Err(PtyError::SetWinsize(Errno::last()))
    } else {
        Ok(())
    }
}

/// Get the window size from a PTY file descriptor
fn get_window_size(fd: RawFd) -> PtyResult<WindowSize> {
    let mut winsize = libc::winsize {
        ws_row: 0,
        ws_col: 0,
        ws_xpixel: 0,
        ws_ypixel: 0,
    };

    // SAFETY: TIOCGWINSZ is a valid ioctl for getting window size
    let result = unsafe { libc::ioctl(fd, libc::TIOCGWINSZ, &mut winsize) };

    if result < 0 {
        let errno = Errno::last();
        warn!(fd, %errno, "TIOCGWINSZ failed");
        Err(PtyError::GetWinsize(errno))
    } else {
        Ok(WindowSize {
            rows: winsize.ws_row,
            cols: winsize.ws_col,
            pixel_width: winsize.ws_xpixel,
            pixel_height: winsize.ws_ypixel,
        })
    }
}
