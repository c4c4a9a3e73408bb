//! Compute drought exposure tables for every configured crop
//!
//! Usage: compute_droughts [config.json]
//!
//! Reads region, yield and precipitation inputs from the configured data
//! directory and writes `<Crop>_Droughts.csv` per crop. Exits non-zero if
//! any crop failed; crops that succeed are written regardless.

use anyhow::Result;
use crop_drought_rust::{logging, output, DroughtData, DroughtPipeline, PipelineConfig};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;
use tracing::{error, info, warn};

fn main() -> ExitCode {
    logging::init();

    match run() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            error!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}

/// Ok(true) when every crop was written
fn run() -> Result<bool> {
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = PipelineConfig::resolve(config_path.as_deref())?;
    info!(
        "Years {}..={}, crops: {}",
        config.first_year,
        config.last_year,
        config.crops.names().join(", ")
    );

    let load_start = Instant::now();
    let mut data = DroughtData::load(&config)?;
    info!("Inputs loaded in {:.2?}", load_start.elapsed());

    let mut all_ok = data.yield_failures.is_empty();
    for (crop, err) in &data.yield_failures {
        error!("{}: no yield table: {:#}", crop, err);
    }

    let yields = std::mem::take(&mut data.yields);
    let pipeline = DroughtPipeline::from_data(config, &mut data);

    let run_start = Instant::now();
    let results = pipeline.run_all(yields.iter().map(|(crop, table)| (crop.as_str(), table)));

    for (crop, result) in results {
        let report = match result {
            Ok(report) => report,
            Err(err) => {
                error!("{}: {}", crop, err);
                all_ok = false;
                continue;
            }
        };

        for skipped in &report.skipped {
            warn!(
                "{}: skipped region {} year {} ({})",
                report.crop, skipped.region_code, skipped.year, skipped.reason
            );
        }

        let path = pipeline.config().output_path(&report.crop);
        if let Err(err) = output::write_records(&report.records, &path) {
            error!("{}: {:#}", report.crop, err);
            all_ok = false;
        }
    }

    info!("Drought calculations finished in {:.2?}", run_start.elapsed());
    Ok(all_ok)
}
