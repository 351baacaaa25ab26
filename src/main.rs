// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jason Ish

mod cli;
mod commands;
mod config;
mod console;
mod editor;
mod error;
mod poller;
mod remote;
mod surface;
mod tui;

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::{Parser, Subcommand};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use config::{ConfigFile, UiMode};
use console::Console;
use error::{Error, Result};
use remote::{HttpRemote, Variant};

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

#[derive(Parser, Debug)]
#[command(name = "evalterm")]
#[command(about = "Interactive console for a remote evaluating process")]
#[command(version)]
#[command(styles = STYLES)]
struct Args {
    #[command(subcommand)]
    command: Option<Mode>,

    /// Process to attach to
    target: Option<String>,

    #[arg(long, global = true, help = "Config file (default: <config dir>/evalterm/config.toml)")]
    config: Option<PathBuf>,

    #[arg(long, global = true, default_value_t = Level::INFO)]
    log_level: Level,

    #[arg(long, global = true, help = "Log file (default: <cache dir>/evalterm/evalterm.log)")]
    log_file: Option<PathBuf>,

    #[arg(long, global = true, value_enum, help = "Cursor encoding of the result log")]
    variant: Option<Variant>,

    #[arg(long, global = true, help = "Base URL results are read from")]
    compute_url: Option<String>,

    #[arg(long, global = true, help = "Base URL evaluations are sent to")]
    relay_url: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Run inline on the terminal
    Cli {
        /// Process to attach to
        target: String,
    },
    /// Run full screen; Esc continues in line mode
    Tui {
        /// Process to attach to
        target: String,
    },
}

fn default_log_file() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("evalterm")
        .join("evalterm.log")
}

fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(OpenOptions::new().create(true).append(true).open(path)?)
}

/// Log to a file; the terminal belongs to the console.
fn init_logging(level: Level, path: &Path) -> Result<()> {
    let file = open_log_file(path)?;

    let mut subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_ansi(false)
        .with_writer(Mutex::new(file));

    if [Level::DEBUG, Level::TRACE].contains(&level) {
        subscriber = subscriber.with_file(true).with_line_number(true);
    }

    tracing::subscriber::set_global_default(subscriber.finish())
        .map_err(|e| Error::Other(format!("failed to install logger: {e}")))
}

fn required_url(flag: Option<String>, file: Option<String>, name: &str) -> Result<String> {
    flag.or(file)
        .filter(|url| !url.trim().is_empty())
        .ok_or_else(|| {
            Error::Config(format!(
                "no {name} url; pass --{name}-url or set remote.{name}_url in config.toml"
            ))
        })
}

async fn run(args: Args) -> Result<()> {
    let mut config = ConfigFile::load(args.config.as_deref())?;
    if let Some(variant) = args.variant {
        config.remote.variant = variant;
    }

    let (mode, target) = match args.command {
        Some(Mode::Cli { target }) => (UiMode::Cli, target),
        Some(Mode::Tui { target }) => (UiMode::Tui, target),
        None => match args.target {
            Some(target) => (config.ui.default, target),
            None => return Err(Error::Config("no target process given".into())),
        },
    };

    let compute_url = required_url(args.compute_url, config.remote.compute_url.clone(), "compute")?;
    let relay_url = required_url(args.relay_url, config.remote.relay_url.clone(), "relay")?;
    let remote = Arc::new(HttpRemote::new(&compute_url, &relay_url)?);
    info!(process = %target, ?mode, %compute_url, %relay_url, "Starting console");

    let mut console = Console::new(remote, target, config.console_options());
    if mode == UiMode::Tui && tui::run(&mut console).await? == tui::TuiExit::Quit {
        return Ok(());
    }
    cli::run(&mut console, 0).await
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = Args::parse();

    let log_file = args.log_file.clone().unwrap_or_else(default_log_file);
    if let Err(e) = init_logging(args.log_level, &log_file) {
        eprintln!("Warning: {e}");
    }

    if let Err(e) = run(args).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_target_and_flags() {
        let args = Args::try_parse_from([
            "evalterm",
            "--variant",
            "numeric",
            "--compute-url",
            "https://cu.example",
            "proc-1",
        ])
        .unwrap();
        assert_eq!(args.target.as_deref(), Some("proc-1"));
        assert_eq!(args.variant, Some(Variant::Numeric));
        assert_eq!(args.log_level, Level::INFO);
        assert!(args.command.is_none());
    }

    #[test]
    fn test_parse_mode_subcommand() {
        let args = Args::try_parse_from(["evalterm", "tui", "proc-1", "--log-level", "debug"])
            .unwrap();
        assert!(matches!(args.command, Some(Mode::Tui { ref target }) if target == "proc-1"));
        assert_eq!(args.log_level, Level::DEBUG);
    }

    #[test]
    fn test_flag_overrides_config_url() {
        assert_eq!(
            required_url(Some("a".into()), Some("b".into()), "compute").unwrap(),
            "a"
        );
        assert_eq!(required_url(None, Some("b".into()), "compute").unwrap(), "b");
        assert!(required_url(None, Some(" ".into()), "relay").is_err());
    }
}
