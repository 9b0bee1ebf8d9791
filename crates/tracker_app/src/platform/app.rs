use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde_json::Value;
use tracker_core::PanelViewModel;
use tracker_engine::{
    CalculationRequest, ReqwestRpcClient, SharedParameters, SinglePointRequest, Toggle, Tracker,
};
use tracker_logging::{tracker_info, tracker_warn};

use super::cli::Command;
use super::config::MonitorConfig;
use super::export;
use super::render::render;
use super::sink::LatestLayer;

/// How often `watch` looks at the panel for changes to print.
const REFRESH: Duration = Duration::from_millis(250);

pub async fn run(config: MonitorConfig, command: Command) -> Result<()> {
    let gate = Arc::new(SharedParameters::new(config.parameters()));
    let client = ReqwestRpcClient::new(config.rpc_settings(), gate.clone())
        .with_context(|| format!("api_url {:?}", config.api_url))?;
    let sink = Arc::new(LatestLayer::default());
    let tracker =
        Tracker::new(Arc::new(client), gate, sink.clone()).with_interval(config.poll_interval());

    match command {
        Command::Watch => watch(&tracker).await?,
        Command::List => {
            tracker.controller().reload().await?;
            print!("{}", render(&tracker.view()));
        }
        Command::Submit { stations } => {
            let request = read_stations(&stations)?;
            let job = tracker.controller().submit(&request).await?;
            println!("Submitted job {} ({})", job.id, job.status);
        }
        Command::GenerateConfig { stations, out } => {
            let request = read_stations(&stations)?;
            let document = tracker.controller().generate_config(&request).await?;
            match out {
                Some(out) => {
                    let written = export::write_json(&out, &document)?;
                    println!("Config written to {}", written.display());
                }
                None => println!("{}", serde_json::to_string_pretty(&document)?),
            }
        }
        Command::Abort { id } => {
            tracker.controller().abort(&id).await?;
            println!("Abort requested for job {}", id);
            print!("{}", render(&tracker.view()));
        }
        Command::Delete { id } => {
            tracker.controller().delete(&id).await?;
            println!("Deleted job {}", id);
            print!("{}", render(&tracker.view()));
        }
        Command::Results { id, out } => {
            if tracker.projector().toggle(&id).await? != Toggle::Shown {
                bail!("results of job {} were not loaded", id);
            }
            let Some((name, collection)) = sink.latest() else {
                bail!("no layer received for job {}", id);
            };
            let written = export::write_geojson(&out, &collection)?;
            println!(
                "{} ({} links) written to {}",
                name,
                collection.features.len(),
                written.display()
            );
        }
        Command::SinglePoint {
            station,
            target,
            out,
        } => {
            let request = SinglePointRequest::new(read_station(&station)?, target);
            let profile = tracker.single_point().calculate(&request).await?;
            match profile.final_rsrp() {
                Some(rsrp) => println!("Distance {} m, final RSRP {:.0} dB", profile.distance, rsrp),
                None => println!("Distance {} m, no RSRP samples", profile.distance),
            }
            if let Some(out) = out {
                let rows = profile.rows();
                let written = export::write_profile_csv(&out, &rows)?;
                println!("{} samples written to {}", rows.len(), written.display());
            }
        }
    }

    tracker.shutdown();
    Ok(())
}

/// Polls until ctrl-c, printing the panel whenever it changes.
async fn watch(tracker: &Tracker) -> Result<()> {
    tracker.activate();
    let mut last: Option<PanelViewModel> = None;
    let mut ticker = tokio::time::interval(REFRESH);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            result = &mut ctrl_c => {
                if let Err(err) = result {
                    tracker_warn!("Cannot listen for ctrl-c: {}", err);
                }
                break;
            }
            _ = ticker.tick() => {
                let view = tracker.view();
                if last.as_ref() != Some(&view) {
                    println!("{}", render(&view));
                    last = Some(view);
                }
            }
        }
    }

    tracker_info!("Stopping");
    tracker.deactivate().await;
    Ok(())
}

/// Reads base stations from a JSON file: either a bare array or an object
/// with a `baseStations` array.
fn read_stations(path: &Path) -> Result<CalculationRequest> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let value: Value =
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;

    let stations = match value {
        Value::Array(stations) => stations,
        Value::Object(mut map) => match map.remove("baseStations") {
            Some(Value::Array(stations)) => stations,
            _ => bail!("{}: expected a baseStations array", path.display()),
        },
        _ => bail!("{}: expected an array of base stations", path.display()),
    };
    Ok(CalculationRequest::new(stations))
}

/// Reads one base station object from a JSON file.
fn read_station(path: &Path) -> Result<Value> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let value: Value =
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;
    if !value.is_object() {
        bail!("{}: expected a base station object", path.display());
    }
    Ok(value)
}
