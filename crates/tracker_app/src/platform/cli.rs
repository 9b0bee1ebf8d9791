use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};
use tracker_core::JobId;

#[derive(Parser, Debug, PartialEq)]
#[command(author, version, about = "Watch and drive remote calculation jobs")]
pub struct Cli {
    /// RON config file
    #[arg(
        short,
        long,
        env = "CALC_MONITOR_CONFIG",
        value_hint = ValueHint::FilePath
    )]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Poll and print the job list until ctrl-c
    Watch,
    /// Print the job list once
    List,
    /// Start a calculation for the base stations in a JSON file
    Submit {
        #[arg(value_hint = ValueHint::FilePath)]
        stations: PathBuf,
    },
    /// Fetch an offline calculation config
    GenerateConfig {
        #[arg(value_hint = ValueHint::FilePath)]
        stations: PathBuf,
        /// Write the config here instead of printing it
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        out: Option<PathBuf>,
    },
    /// Abort a calculation
    Abort { id: JobId },
    /// Delete a calculation and its results
    Delete { id: JobId },
    /// Export a finished calculation's links as GeoJSON
    Results {
        id: JobId,
        #[arg(value_hint = ValueHint::FilePath)]
        out: PathBuf,
    },
    /// Calculate the link from one base station to a target position
    SinglePoint {
        /// JSON file holding one base station
        #[arg(value_hint = ValueHint::FilePath)]
        station: PathBuf,
        /// Target as `x,y` in the server's projected coordinates
        #[arg(long, value_parser = parse_target)]
        target: [f64; 2],
        /// Write the profile as CSV
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        out: Option<PathBuf>,
    },
}

fn parse_target(raw: &str) -> Result<[f64; 2], String> {
    let (x, y) = raw
        .split_once(',')
        .ok_or_else(|| format!("expected x,y but got {raw:?}"))?;
    let coordinate = |part: &str| {
        part.trim()
            .parse::<f64>()
            .map_err(|err| format!("{part:?}: {err}"))
    };
    Ok([coordinate(x)?, coordinate(y)?])
}
