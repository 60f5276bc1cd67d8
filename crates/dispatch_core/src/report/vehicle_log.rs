//! `vehicle_log.txt`: `DATE | NODE | TYPE | TRAVELLER_ID | VEHICLE_ID`, one row per event in
//! each vehicle's `path.events` log (§6.3).

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::context::SimulationContext;
use crate::errors::ReportError;

pub fn write(ctx: &SimulationContext, path: &Path) -> Result<(), ReportError> {
    let mut out = BufWriter::new(File::create(path)?);
    writeln!(out, "DATE | NODE | TYPE | TRAVELLER_ID | VEHICLE_ID")?;
    for vehicle in &ctx.vehicles {
        for (time, node, kind, traveller) in &vehicle.path.events {
            let date = ctx.timestamp_at(*time).format("%Y-%m-%d %H:%M:%S");
            writeln!(out, "{date} | {node} | {} | {traveller} | {}", kind.tag(), vehicle.id)?;
        }
    }
    Ok(())
}
