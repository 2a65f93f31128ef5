//! tripmode - automatic drive mode switching over CAN
//!
//! Reads a candump stream (a recorded log, or `candump -L can0` piped in),
//! runs the drive mode controller on it and writes the button presses it
//! decides on as candump lines. `press` sends presses by hand, the only
//! way to reach SPORT or MOUNTAIN.

#![deny(unsafe_code)]

mod clock;
mod commands;
mod config;
mod logging;
mod stream;

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tripmode_core::DriveMode;

use crate::commands::{AppError, ClockSource, PressRequest};
use crate::config::{AppConfig, DEFAULT_CONFIG_PATH};

#[derive(Debug, Parser)]
#[command(name = "tripmode")]
#[command(about = "Switch to HOLD above a speed threshold and back to NORMAL below it")]
#[command(version)]
struct Cli {
    /// Config file (default: ./tripmode.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Toggle NORMAL/HOLD on every speed frame with a 30 s cooldown
    #[arg(long, global = true)]
    debug: bool,

    /// Log level when RUST_LOG is not set (overrides the config file)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the controller over a candump stream
    Run {
        /// Time base for cooldowns
        #[arg(long, value_enum, default_value_t = ClockSource::Capture)]
        clock: ClockSource,

        /// Write button presses here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// candump log, or `-` for stdin
        #[arg(default_value = "-")]
        input: String,
    },

    /// Send button presses without watching the bus
    Press {
        /// Step the menu to this mode (normal, sport, mountain, hold)
        #[arg(long, value_parser = parse_mode, conflicts_with = "count")]
        mode: Option<DriveMode>,

        /// Press this many times
        #[arg(
            short = 'n',
            long,
            default_value_t = 1,
            value_parser = clap::value_parser!(u32).range(1..=100)
        )]
        count: u32,

        /// Write button presses here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print speed and button state, then the number of presses seen
    Monitor {
        /// candump log, or `-` for stdin
        #[arg(default_value = "-")]
        input: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

fn execute(cli: Cli) -> Result<(), AppError> {
    let mut app = match &cli.config {
        Some(path) => AppConfig::load(path, true)?,
        None => AppConfig::load(Path::new(DEFAULT_CONFIG_PATH), false)?,
    };

    if cli.debug {
        app.controller = app.controller.into_debug();
        app.validate()?;
    }

    let log_file = match &app.logging.file {
        Some(path) => Some(logging::open_log_file(path).map_err(|source| AppError::Open {
            path: path.display().to_string(),
            source,
        })?),
        None => None,
    };
    let level = cli.log_level.as_deref().unwrap_or(&app.logging.level);
    logging::init(level, log_file);

    match cli.command {
        Commands::Run {
            clock,
            output,
            input,
        } => {
            let input = open_input(&input)?;
            commands::run(input, open_output(output)?, app.controller, clock)?;
        }
        Commands::Press {
            mode,
            count,
            output,
        } => {
            let request = match mode {
                Some(mode) => PressRequest::Mode(mode),
                None => PressRequest::Count(count),
            };
            commands::press(open_output(output)?, app.controller, request)?;
        }
        Commands::Monitor { input } => {
            commands::monitor(open_input(&input)?, io::stdout().lock())?;
        }
    }

    Ok(())
}

fn open_output(output: Option<PathBuf>) -> Result<Box<dyn Write>, AppError> {
    let Some(path) = output else {
        return Ok(Box::new(io::stdout().lock()));
    };

    let file = File::create(&path).map_err(|source| AppError::Open {
        path: path.display().to_string(),
        source,
    })?;
    Ok(Box::new(BufWriter::new(file)))
}

fn parse_mode(name: &str) -> Result<DriveMode, String> {
    DriveMode::from_name(name).ok_or_else(|| {
        format!("unknown drive mode `{}` (expected normal, sport, mountain or hold)", name)
    })
}

fn open_input(input: &str) -> Result<Box<dyn BufRead>, AppError> {
    if input == "-" {
        return Ok(Box::new(io::stdin().lock()));
    }

    let file = File::open(input).map_err(|source| AppError::Open {
        path: input.to_string(),
        source,
    })?;
    Ok(Box::new(BufReader::new(file)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run_defaults() {
        let cli = Cli::try_parse_from(["tripmode", "run"]).unwrap();
        assert!(!cli.debug);
        assert!(cli.config.is_none());
        match cli.command {
            Commands::Run {
                clock,
                output,
                input,
            } => {
                assert_eq!(clock, ClockSource::Capture);
                assert!(output.is_none());
                assert_eq!(input, "-");
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_parse_run_options() {
        let cli = Cli::try_parse_from([
            "tripmode",
            "run",
            "--clock",
            "monotonic",
            "-o",
            "presses.log",
            "drive.log",
            "--debug",
            "--config",
            "car.toml",
        ])
        .unwrap();

        assert!(cli.debug);
        assert_eq!(cli.config, Some(PathBuf::from("car.toml")));
        match cli.command {
            Commands::Run {
                clock,
                output,
                input,
            } => {
                assert_eq!(clock, ClockSource::Monotonic);
                assert_eq!(output, Some(PathBuf::from("presses.log")));
                assert_eq!(input, "drive.log");
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_parse_monitor() {
        let cli = Cli::try_parse_from(["tripmode", "--log-level", "debug", "monitor", "x.log"])
            .unwrap();
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        assert!(matches!(cli.command, Commands::Monitor { input } if input == "x.log"));
    }

    #[test]
    fn test_parse_press() {
        let cli = Cli::try_parse_from(["tripmode", "press", "--mode", "sport"]).unwrap();
        match cli.command {
            Commands::Press { mode, count, .. } => {
                assert_eq!(mode, Some(DriveMode::Sport));
                assert_eq!(count, 1);
            }
            _ => panic!("expected press"),
        }

        let cli = Cli::try_parse_from(["tripmode", "press", "-n", "2"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Press {
                mode: None,
                count: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_parse_press_rejects_bad_input() {
        assert!(Cli::try_parse_from(["tripmode", "press", "--mode", "eco"]).is_err());
        assert!(Cli::try_parse_from(["tripmode", "press", "-n", "0"]).is_err());
        assert!(
            Cli::try_parse_from(["tripmode", "press", "--mode", "hold", "-n", "3"]).is_err()
        );
    }

    #[test]
    fn test_parse_rejects_unknown_clock() {
        assert!(Cli::try_parse_from(["tripmode", "run", "--clock", "gps"]).is_err());
    }

    #[test]
    fn test_open_missing_input() {
        assert!(matches!(
            open_input("definitely/not/here.log"),
            Err(AppError::Open { .. })
        ));
    }
}
