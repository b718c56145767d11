//! rig-panel - Serial control panel for a motor rig
//!
//! Buttons, switches and setpoint sliders in the terminal, translated into the
//! controller's line protocol, with the controller's echo shown in a console.

mod config;
mod core;
mod data;
mod frontend;
mod protocol;
mod serial;
mod widgets;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use config::panel_validator;
use frontend::Frontend;
use serial::{Link, LoopbackLink, SerialLink};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "rig-panel")]
#[command(about = "Serial control panel for a motor rig", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Serial port to open (overrides the config file)
    #[arg(short, long)]
    port_name: Option<String>,

    /// Baud rate (overrides the config file)
    #[arg(short, long)]
    baud: Option<u32>,

    /// Profile name for profile-specific settings and history
    #[arg(long)]
    profile: Option<String>,

    /// Custom data directory (default: ~/.rig-panel)
    /// Can also be set via RIG_PANEL_DIR environment variable
    #[arg(long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Use an in-memory echoing link instead of a serial port
    #[arg(long)]
    loopback: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List serial ports present on this machine
    ListPorts,
    /// Validate panel configuration
    ValidateConfig {
        /// Config file to validate (default: the profile's config)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    // TUI apps can't log to stdout, so we write to a file
    // (use RUST_LOG env var to control level, e.g. RUST_LOG=debug)
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open("rig-panel.log")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::sync::Mutex::new(log_file))
        .with_ansi(false) // No color codes in log file
        .init();

    let cli = Cli::parse();

    // Set custom data directory if specified (via CLI or environment variable)
    if let Some(data_dir) = &cli.data_dir {
        std::env::set_var(config::DIR_ENV_VAR, data_dir);
        tracing::info!("Using custom data directory: {:?}", data_dir);
    } else if let Ok(env_dir) = std::env::var(config::DIR_ENV_VAR) {
        tracing::info!("Using data directory from {}: {}", config::DIR_ENV_VAR, env_dir);
    }

    if let Some(command) = &cli.command {
        return match command {
            Commands::ListPorts => list_ports(),
            Commands::ValidateConfig { file } => {
                validate_config(file.as_deref(), cli.profile.as_deref())
            }
        };
    }

    let mut config = load_config(cli.config.as_deref(), cli.profile.as_deref())?;
    config.apply_overrides(cli.port_name.as_deref(), cli.baud);

    let validation = config.validate_and_fix();
    if !validation.is_valid() {
        for error in validation.errors() {
            eprintln!("✗ {}", error.message());
        }
        bail!(
            "Panel configuration has {} error(s); run `rig-panel validate-config` for details",
            validation.errors().len()
        );
    }

    // Open the link before the terminal is taken over so failures print normally
    let mut link: Box<dyn Link> = if cli.loopback {
        tracing::info!("Using loopback link");
        Box::new(LoopbackLink::new())
    } else {
        let connection = &config.connection;
        let link = SerialLink::open(
            &connection.port_name,
            connection.baud_rate,
            connection.read_timeout(),
        )
        .context("Cannot start without the device link (see `rig-panel list-ports`, or use --loopback)")?;
        Box::new(link)
    };

    run_tui(config, link.as_mut())
}

fn load_config(path: Option<&Path>, profile: Option<&str>) -> Result<config::Config> {
    match path {
        Some(path) => config::Config::load_from_path(path, profile),
        None => config::Config::load_with_options(profile),
    }
}

/// Run TUI frontend
fn run_tui(config: config::Config, link: &mut dyn Link) -> Result<()> {
    let history_path = config::Config::history_path(config.profile.as_deref())?;

    let mut frontend = frontend::TuiFrontend::new(&config)?;
    let (width, height) = frontend.size();
    tracing::info!("Terminal size {}x{}", width, height);

    if let Err(e) = frontend.load_history(&history_path) {
        tracing::warn!("Failed to load send history from {:?}: {}", history_path, e);
    }

    let mut control = core::ControlLoop::new(core::AppCore::new(config));
    let result = control.run(&mut frontend, link);

    if let Err(e) = frontend.save_history(&history_path) {
        tracing::warn!("Failed to save send history to {:?}: {}", history_path, e);
    }
    frontend.cleanup()?;

    result
}

fn list_ports() -> Result<()> {
    let ports = serial::list_ports().context("Failed to enumerate serial ports")?;
    if ports.is_empty() {
        println!("No serial ports found");
    }
    for (name, kind) in ports {
        println!("{:<24} {}", name, kind);
    }
    Ok(())
}

fn validate_config(file: Option<&Path>, profile: Option<&str>) -> Result<()> {
    match file {
        Some(path) => println!("Validating config file: {:?}", path),
        None => println!("Validating profile config"),
    }

    let config = match load_config(file, profile) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("✗ Failed to load config: {:#}", e);
            std::process::exit(1);
        }
    };

    let panel = &config.panel;
    println!("✓ Config loaded successfully");
    println!(
        "  {} buttons, {} toggles, {} sliders",
        panel.buttons.len(),
        panel.toggles.len(),
        panel.sliders.len()
    );

    let result = panel_validator::validate_panel(panel);
    for error in result.errors() {
        eprintln!("✗ Error: {}", error.message());
    }
    for warning in result.warnings() {
        println!("⚠ Warning: {}", warning.message());
    }

    if result.issues.is_empty() {
        println!("✓ Panel is valid with no issues");
    }
    if result.has_errors() {
        eprintln!("\n✗ Found {} error(s)", result.errors().len());
        std::process::exit(1);
    }
    Ok(())
}
