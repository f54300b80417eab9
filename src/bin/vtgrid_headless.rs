//! vtgrid Headless Runner
//!
//! Feeds bytes from a file or stdin into a terminal and prints the resulting
//! screen as text or JSON. Used for testing and automation.

use std::io::{self, Read};
use std::process::ExitCode;

use vtgrid::app::Config;
use vtgrid::{Snapshot, Terminal};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args: Vec<String> = std::env::args().collect();
    let config = Config::load_or_default();

    // Parse command line arguments
    let mut cols = config.cols;
    let mut rows = config.rows;
    let mut tab_width = config.tab_width;
    let mut input_file: Option<String> = None;
    let mut output_format = OutputFormat::Text;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-c" | "--cols" => {
                i += 1;
                if let Some(v) = args.get(i) {
                    cols = v.parse().unwrap_or(cols);
                }
            }
            "-r" | "--rows" => {
                i += 1;
                if let Some(v) = args.get(i) {
                    rows = v.parse().unwrap_or(rows);
                }
            }
            "--tab-width" => {
                i += 1;
                if let Some(v) = args.get(i) {
                    tab_width = v.parse().unwrap_or(tab_width);
                }
            }
            "-f" | "--file" => {
                i += 1;
                input_file = args.get(i).cloned();
            }
            "-j" | "--json" => output_format = OutputFormat::Json,
            "-t" | "--text" => output_format = OutputFormat::Text,
            "-h" | "--help" => {
                print_help();
                return ExitCode::SUCCESS;
            }
            arg => {
                // Treat as input file if no flag
                if input_file.is_none() && !arg.starts_with('-') {
                    input_file = Some(arg.to_string());
                } else {
                    eprintln!("Unknown argument: {}", arg);
                    return ExitCode::FAILURE;
                }
            }
        }
        i += 1;
    }

    let mut terminal = match Terminal::new(cols, rows, config.max_history) {
        Ok(terminal) => terminal,
        Err(e) => {
            eprintln!("Error creating terminal: {}", e);
            return ExitCode::FAILURE;
        }
    };
    terminal.set_tab_width(tab_width);

    // Read input
    let input_data = match &input_file {
        Some(path) => match std::fs::read(path) {
            Ok(data) => data,
            Err(e) => {
                eprintln!("Error reading file '{}': {}", path, e);
                return ExitCode::FAILURE;
            }
        },
        None => {
            let mut data = Vec::new();
            if let Err(e) = io::stdin().read_to_end(&mut data) {
                eprintln!("Error reading stdin: {}", e);
                return ExitCode::FAILURE;
            }
            data
        }
    };
    tracing::debug!(bytes = input_data.len(), "read input");

    if let Err(e) = terminal.append(&input_data) {
        eprintln!("Error processing input: {}", e);
        return ExitCode::FAILURE;
    }

    let snapshot = Snapshot::from_terminal(&terminal);
    match output_format {
        OutputFormat::Text => {
            println!("Terminal State ({}x{}):", terminal.cols(), terminal.rows());
            println!("Cursor: ({}, {})", snapshot.cursor.row, snapshot.cursor.col);
            println!("---");
            print!("{}", snapshot.to_text());
            println!("---");
        }
        OutputFormat::Json => match snapshot.to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing snapshot: {}", e);
                return ExitCode::FAILURE;
            }
        },
    }

    ExitCode::SUCCESS
}

#[derive(Clone, Copy)]
enum OutputFormat {
    Text,
    Json,
}

fn print_help() {
    println!("vtgrid Headless Runner");
    println!();
    println!("Usage: vtgrid-headless [OPTIONS] [INPUT_FILE]");
    println!();
    println!("Options:");
    println!("  -c, --cols <N>       Set terminal width (default: 80)");
    println!("  -r, --rows <N>       Set terminal height (default: 24)");
    println!("      --tab-width <N>  Set tab stop distance (default: 4)");
    println!("  -f, --file <PATH>    Read input from file");
    println!("  -j, --json           Output snapshot as JSON");
    println!("  -t, --text           Output snapshot as text (default)");
    println!("  -h, --help           Show this help message");
    println!();
    println!("If no input file is specified, reads from stdin.");
    println!("Defaults come from ~/.config/vtgrid/config.json when present.");
    println!();
    println!("Examples:");
    println!("  printf 'Hello\\033[31mWorld\\033[0m' | vtgrid-headless");
    println!("  vtgrid-headless -c 120 -r 40 input.txt");
    println!("  vtgrid-headless --json < test.bin > snapshot.json");
}
