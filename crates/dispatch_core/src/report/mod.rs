//! Persisted outputs (C8, §6.3): five pipe-delimited text tables written under
//! `{output_path}/{date}/`, mirroring the teacher's per-format export submodules.

mod general_results;
mod ride_log;
mod traveller_results;
mod utility_results;
mod vehicle_log;

use std::fs;
use std::path::{Path, PathBuf};

use crate::context::SimulationContext;
use crate::errors::ReportError;

/// Writes all five report files to `{output_path}/{date}/`, creating the directory if needed.
pub fn write_reports(ctx: &SimulationContext, output_path: &Path, date: &str) -> Result<(), ReportError> {
    let dir: PathBuf = output_path.join(date);
    fs::create_dir_all(&dir)?;

    vehicle_log::write(ctx, &dir.join("vehicle_log.txt"))?;
    ride_log::write(ctx, &dir.join("ride_log.txt"))?;
    traveller_results::write(ctx, &dir.join("traveller_results.txt"))?;
    utility_results::write(ctx, &dir.join("utility_results.txt"))?;
    general_results::write(ctx, &dir.join("general_results.txt"))?;
    Ok(())
}
