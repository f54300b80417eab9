//! Host loop
//!
//! Drives one session: a child process on a PTY whose output is fed into a
//! [`Terminal`]. Single-threaded; the loop polls the PTY master (and stdin
//! when forwarding) and hands each chunk to `Terminal::append` in full.

use std::io;
use std::os::fd::{AsFd, BorrowedFd};
use std::sync::atomic::{AtomicBool, Ordering};

use nix::errno::Errno;
use nix::libc::{self, STDIN_FILENO};
use nix::poll::{poll, PollFd, PollFlags};
use nix::sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};
use tracing::{debug, info, trace};

use super::config::{Config, ConfigError};
use crate::input::{encode_key, Key};
use crate::pty::{Pty, PtyError, ReadOutcome, WindowSize};
use crate::terminal::{Terminal, TerminalError};

/// Process-wide keep-running flag, cleared by the signal handlers
static KEEP_RUNNING: AtomicBool = AtomicBool::new(true);

extern "C" fn handle_stop_signal(_: libc::c_int) {
    KEEP_RUNNING.store(false, Ordering::SeqCst);
}

/// Install SIGINT, SIGTERM and SIGHUP handlers that stop the host loop
pub fn install_signal_handlers() -> Result<(), HostError> {
    let action = SigAction::new(
        SigHandler::Handler(handle_stop_signal),
        SaFlags::empty(),
        SigSet::empty(),
    );
    for signal in [Signal::SIGINT, Signal::SIGTERM, Signal::SIGHUP] {
        // SAFETY: the handler only stores to an atomic
        unsafe { sigaction(signal, &action) }.map_err(HostError::Signal)?;
    }
    Ok(())
}

/// Whether the host loop should keep going
pub fn keep_running() -> bool {
    KEEP_RUNNING.load(Ordering::SeqCst)
}

/// Ask every host loop in the process to stop after its current iteration
pub fn request_stop() {
    KEEP_RUNNING.store(false, Ordering::SeqCst);
}

/// Errors from the host loop
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("PTY error: {0}")]
    Pty(#[from] PtyError),

    #[error("terminal error: {0}")]
    Terminal(#[from] TerminalError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("failed to install signal handler: {0}")]
    Signal(#[source] nix::Error),

    #[error("failed to poll: {0}")]
    Poll(#[source] nix::Error),
}

/// Why [`Host::run`] returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The PTY reported end of file (child side closed)
    Eof,
    /// The child exited
    ChildExited,
    /// The keep-running flag was cleared
    Interrupted,
}

/// A running session: child process, PTY and terminal state
pub struct Host {
    config: Config,
    terminal: Terminal,
    pty: Pty,
    buf: Vec<u8>,
    forward_stdin: bool,
}

impl Host {
    /// Spawn the configured program on a PTY sized to the terminal
    pub fn new(config: Config) -> Result<Self, HostError> {
        config.validate()?;

        let mut terminal = Terminal::new(config.cols, config.rows, config.max_history)?;
        terminal.set_tab_width(config.tab_width);

        let program = config.program();
        let args: Vec<&str> = config.shell_args.iter().map(String::as_str).collect();
        let pty = Pty::spawn(
            &program,
            &args,
            WindowSize::from_grid(config.cols, config.rows),
        )?;
        info!(program = %program, cols = config.cols, rows = config.rows, "session started");

        Ok(Self {
            buf: vec![0; config.read_chunk_size],
            config,
            terminal,
            pty,
            forward_stdin: false,
        })
    }

    pub fn terminal(&self) -> &Terminal {
        &self.terminal
    }

    pub fn pty(&self) -> &Pty {
        &self.pty
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Forward bytes read from our stdin to the child
    pub fn set_forward_stdin(&mut self, forward: bool) {
        self.forward_stdin = forward;
    }

    /// Send raw bytes to the child
    pub fn send(&self, bytes: &[u8]) -> Result<(), HostError> {
        Ok(self.pty.write_all(bytes)?)
    }

    /// Send a key press to the child
    pub fn send_key(&self, key: Key) -> Result<(), HostError> {
        self.send(encode_key(key))
    }

    /// Resize the terminal and tell the child
    pub fn resize(&mut self, cols: usize, rows: usize) -> Result<(), HostError> {
        self.terminal.resize(cols, rows)?;
        self.pty.resize(WindowSize::from_grid(cols, rows))?;
        Ok(())
    }

    /// Run until the session ends or the keep-running flag is cleared
    ///
    /// `on_frame` is called with the terminal after every chunk of child
    /// output has been applied.
    pub fn run<F>(&mut self, mut on_frame: F) -> Result<StopReason, HostError>
    where
        F: FnMut(&Terminal),
    {
        let stdin = io::stdin();
        let stdin_fd = stdin.as_fd();
        let mut input = [0u8; 4096];

        loop {
            if !keep_running() {
                debug!("stop requested");
                return Ok(StopReason::Interrupted);
            }

            // SAFETY: the master fd is valid for the lifetime of self.pty
            let master_fd = unsafe { BorrowedFd::borrow_raw(self.pty.master_fd()) };
            let mut fds = vec![PollFd::new(&master_fd, PollFlags::POLLIN)];
            if self.forward_stdin {
                fds.push(PollFd::new(&stdin_fd, PollFlags::POLLIN));
            }

            match poll(&mut fds, self.config.poll_timeout_ms) {
                Ok(_) => {}
                Err(Errno::EINTR) => continue,
                Err(e) => return Err(HostError::Poll(e)),
            }

            let ready = |fd: &PollFd| {
                fd.revents().is_some_and(|r| {
                    r.intersects(PollFlags::POLLIN | PollFlags::POLLHUP | PollFlags::POLLERR)
                })
            };
            let pty_ready = ready(&fds[0]);
            let stdin_ready = fds.get(1).is_some_and(ready);
            drop(fds);

            if stdin_ready {
                match nix::unistd::read(STDIN_FILENO, &mut input) {
                    Ok(0) => {
                        debug!("stdin closed, no longer forwarding");
                        self.forward_stdin = false;
                    }
                    Ok(n) => self.pty.write_all(&input[..n])?,
                    Err(Errno::EINTR) | Err(Errno::EAGAIN) => {}
                    Err(e) => return Err(HostError::Io(e.into())),
                }
            }

            if pty_ready {
                match self.pty.read_nonblocking(&mut self.buf)? {
                    ReadOutcome::Data(n) => {
                        trace!(n, "child output");
                        self.terminal.append(&self.buf[..n])?;
                        on_frame(&self.terminal);
                        continue;
                    }
                    ReadOutcome::Eof => {
                        debug!("PTY closed");
                        return Ok(StopReason::Eof);
                    }
                    ReadOutcome::WouldBlock => {}
                }
            }

            if !self.pty.is_alive() {
                debug!("child exited");
                // Output written just before exit may still be buffered
                while let ReadOutcome::Data(n) = self.pty.read_nonblocking(&mut self.buf)? {
                    self.terminal.append(&self.buf[..n])?;
                    on_frame(&self.terminal);
                }
                return Ok(StopReason::ChildExited);
            }
        }
    }

    /// Hang up the child and reap it, returning its exit code
    pub fn shutdown(mut self) -> Result<i32, HostError> {
        self.pty.hangup()?;
        let code = self.pty.wait()?;
        info!(code, "session ended");
        Ok(code)
    }
}
