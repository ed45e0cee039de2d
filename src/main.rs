use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use tether::{restore_variables, Bridge, BridgeConfig};

/// Print the variables stored in a saved project snapshot.
#[derive(Parser, Debug)]
#[command(name = "tether", version, about)]
struct Cli {
    /// Snapshot file: a JSON object of variable name to wrapper record
    snapshot: PathBuf,

    /// Bridge configuration file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print each restored value as indented JSON instead of its label
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    // Initialize tracing if TETHER_LOG is set
    if let Ok(filter) = EnvFilter::try_from_env("TETHER_LOG") {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
        tracing::debug!("tracing initialized");
    }

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match std::fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|text| BridgeConfig::from_json_str(&text).map_err(|e| e.to_string()))
        {
            Ok(config) => config,
            Err(e) => {
                eprintln!("error: {}: {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => BridgeConfig::default(),
    };

    let text = match std::fs::read_to_string(&cli.snapshot) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("error: {}: {}", cli.snapshot.display(), e);
            return ExitCode::FAILURE;
        }
    };
    let snapshot: serde_json::Value = match serde_json::from_str(&text) {
        Ok(json) => json,
        Err(e) => {
            eprintln!("error: {}: {}", cli.snapshot.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let bridge = Bridge::with_config(config);
    let mut missing = 0;
    for (name, restored) in restore_variables(&bridge, &snapshot) {
        match restored {
            Some(wrapper) if cli.json => println!("{}: {}", name, wrapper.to_debug_string()),
            Some(wrapper) => println!("{}: {}", name, wrapper),
            None => {
                missing += 1;
                println!("{}: <unreadable>", name);
            }
        }
    }

    if missing > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
