use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::debug;
use master::{BrewConfig, DeviceEvent, Recipe, Session, StatusLog};

#[derive(Parser)]
#[command(name = "brew", about = "Compile brewing recipes and run them on the mash/lauter controller")]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compile a recipe and print the instruction listing
    Compile {
        recipe: PathBuf,
        /// Print the instructions as JSON
        #[arg(long)]
        json: bool,
        /// Print every wire unit as hex
        #[arg(long)]
        wire: bool,
    },
    /// Send a recipe to the device and monitor it
    Run {
        recipe: PathBuf,
        /// Serial device, overrides the configuration
        #[arg(short, long)]
        device: Option<PathBuf>,
        /// Status log file, overrides the configuration
        #[arg(short, long)]
        log: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => BrewConfig::load(path)?,
        None => BrewConfig::default(),
    };

    match cli.command {
        Command::Compile { recipe, json, wire } => compile(&recipe, json, wire),
        Command::Run { recipe, device, log } => {
            if device.is_some() {
                config.serial.path = device;
            }
            if log.is_some() {
                config.log.status_log = log;
            }
            run(&recipe, &config)
        }
    }
}

fn load_recipe(path: &Path) -> Result<Recipe> {
    let text = fs::read_to_string(path).with_context(|| format!("Could not read recipe {}", path.display()))?;
    Recipe::compile(&text).with_context(|| format!("Could not compile recipe {}", path.display()))
}

fn compile(path: &Path, json: bool, wire: bool) -> Result<()> {
    let recipe = load_recipe(path)?;

    if json {
        println!("{}", serde_json::to_string_pretty(recipe.instructions())?);
    } else {
        println!("{}", recipe.to_human_readable().join("\n"));
    }

    if wire {
        for unit in recipe.to_wire_units() {
            let hex: Vec<String> = unit.as_bytes().iter().map(|b| format!("{:02x}", b)).collect();
            println!("{:<8} {}", unit.to_string(), hex.join(" "));
        }
    }
    Ok(())
}

fn run(path: &Path, config: &BrewConfig) -> Result<()> {
    // a broken recipe must never reach the device
    let recipe = load_recipe(path)?;

    let mut status_log = match &config.log.status_log {
        Some(path) => Some(StatusLog::open(path).with_context(|| format!("Could not open log {}", path.display()))?),
        None => None,
    };

    let mut session = Session::open(&config.serial)
        .context("Can't open USB serial connection. Is the microcontroller connected?")?;

    println!("Sending recipe:");
    println!("{}", recipe.to_human_readable().join("\n"));
    session.write_recipe(&recipe)?;

    let stdin = io::stdin();
    let mut had_error = false;
    loop {
        match session.next_event()? {
            DeviceEvent::Paused => {
                if let Some(log) = status_log.as_mut() {
                    log.record(mash_lauter_control::PAUSED)?;
                }
                // one bell for a planned pause, two after a device error
                print!("{}", if had_error { "\x07\x07" } else { "\x07" });
                print!("Paused. Press Enter to continue.");
                io::stdout().flush()?;
                stdin.lock().read_line(&mut String::new())?;
                session.resume()?;
                had_error = false;
            }
            DeviceEvent::Status { line, report } => {
                if let Some(log) = status_log.as_mut() {
                    log.record(&line)?;
                }
                debug!("status {:?}", report);
                had_error |= report.is_error();
                print!("\x1b[2J\x1b[H");
                println!("{}", report);
            }
        }
    }
}
