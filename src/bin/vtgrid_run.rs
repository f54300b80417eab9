//! vtgrid Runner
//!
//! Runs a command on a PTY through the host loop, forwarding stdin to it and
//! feeding its output into a terminal. When the session ends the final
//! screen is printed to stderr.

use std::io;
use std::process::ExitCode;

use nix::sys::termios::{self, LocalFlags, SetArg, SpecialCharacterIndices, Termios};
use nix::unistd::isatty;
use vtgrid::app::{install_signal_handlers, Config, Host};
use vtgrid::Snapshot;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args: Vec<String> = std::env::args().collect();
    let mut config = Config::load_or_default();
    if let Some((cols, rows)) = host_terminal_size() {
        config.cols = cols;
        config.rows = rows;
    }

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-c" | "--cols" => {
                i += 1;
                if let Some(v) = args.get(i) {
                    config.cols = v.parse().unwrap_or(config.cols);
                }
            }
            "-r" | "--rows" => {
                i += 1;
                if let Some(v) = args.get(i) {
                    config.rows = v.parse().unwrap_or(config.rows);
                }
            }
            "-h" | "--help" => {
                print_help();
                return ExitCode::SUCCESS;
            }
            "--" => {
                i += 1;
                break;
            }
            _ => break,
        }
        i += 1;
    }
    if let Some(program) = args.get(i) {
        config.shell = Some(program.clone());
        config.shell_args = args[i + 1..].to_vec();
    }

    if let Err(e) = install_signal_handlers() {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    let mut host = match Host::new(config) {
        Ok(host) => host,
        Err(e) => {
            eprintln!("Error starting session: {}", e);
            return ExitCode::FAILURE;
        }
    };
    host.set_forward_stdin(true);

    let result = {
        let _raw_guard = match RawModeGuard::new() {
            Ok(guard) => guard,
            Err(e) => {
                eprintln!("Error entering raw mode: {}", e);
                return ExitCode::FAILURE;
            }
        };
        host.run(|_| {})
    };

    let snapshot = Snapshot::from_terminal(host.terminal());
    eprint!("{}", snapshot.to_text());

    match result {
        Ok(reason) => tracing::debug!(?reason, "host loop stopped"),
        Err(e) => {
            eprintln!("Error: {}", e);
            let _ = host.shutdown();
            return ExitCode::FAILURE;
        }
    }

    match host.shutdown() {
        Ok(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Size of the terminal we are running in, if stdout is one
fn host_terminal_size() -> Option<(usize, usize)> {
    use nix::libc;

    let mut ws = libc::winsize {
        ws_row: 0,
        ws_col: 0,
        ws_xpixel: 0,
        ws_ypixel: 0,
    };

    // SAFETY: TIOCGWINSZ fills the winsize struct we pass
    let result = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &mut ws) };

    if result == 0 && ws.ws_col > 0 && ws.ws_row > 0 {
        Some((usize::from(ws.ws_col), usize::from(ws.ws_row)))
    } else {
        None
    }
}

/// RAII guard for raw terminal mode; a no-op when stdin is not a terminal
struct RawModeGuard {
    original: Option<Termios>,
}

impl RawModeGuard {
    fn new() -> io::Result<Self> {
        if !isatty(nix::libc::STDIN_FILENO).unwrap_or(false) {
            return Ok(Self { original: None });
        }

        let original = termios::tcgetattr(io::stdin()).map_err(io::Error::from)?;
        let mut raw = original.clone();

        // Disable canonical mode, echo and signal keys; the child gets them
        raw.local_flags.remove(LocalFlags::ICANON);
        raw.local_flags.remove(LocalFlags::ECHO);
        raw.local_flags.remove(LocalFlags::ISIG);
        raw.local_flags.remove(LocalFlags::IEXTEN);

        raw.control_chars[SpecialCharacterIndices::VMIN as usize] = 1;
        raw.control_chars[SpecialCharacterIndices::VTIME as usize] = 0;

        termios::tcsetattr(io::stdin(), SetArg::TCSANOW, &raw).map_err(io::Error::from)?;

        Ok(Self {
            original: Some(original),
        })
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if let Some(original) = &self.original {
            let _ = termios::tcsetattr(io::stdin(), SetArg::TCSANOW, original);
        }
    }
}

fn print_help() {
    println!("vtgrid Runner");
    println!();
    println!("Usage: vtgrid-run [OPTIONS] [--] [COMMAND [ARGS...]]");
    println!();
    println!("Options:");
    println!("  -c, --cols <N>     Set terminal width (default: host terminal or 80)");
    println!("  -r, --rows <N>     Set terminal height (default: host terminal or 24)");
    println!("  -h, --help         Show this help message");
    println!();
    println!("Without a command, runs $SHELL (or /bin/sh).");
    println!("The final screen is printed to stderr when the session ends.");
}
