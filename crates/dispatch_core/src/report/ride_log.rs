//! `ride_log.txt`: `DATE | NODE | TYPE | TRAVELLER_ID | VEHICLE_ID`, one row per event in each
//! ride's own event log (§6.3). Distinct from `vehicle_log.txt`: a vehicle may serve several
//! rides over its lifetime, so the ride log groups events by ride rather than by vehicle.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::context::SimulationContext;
use crate::errors::ReportError;

pub fn write(ctx: &SimulationContext, path: &Path) -> Result<(), ReportError> {
    let mut out = BufWriter::new(File::create(path)?);
    writeln!(out, "DATE | NODE | TYPE | TRAVELLER_ID | VEHICLE_ID")?;
    for ride in &ctx.rides {
        let common = ride.common();
        for (time, node, kind, traveller) in &common.events {
            let date = ctx.timestamp_at(*time).format("%Y-%m-%d %H:%M:%S");
            writeln!(out, "{date} | {node} | {} | {traveller} | {}", kind.tag(), common.serving_vehicle)?;
        }
    }
    Ok(())
}
