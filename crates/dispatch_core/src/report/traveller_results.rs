//! `traveller_results.txt`: per-traveller requested trip length vs. actual per-mode distance
//! travelled (§6.3).

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::context::SimulationContext;
use crate::errors::ReportError;

pub fn write(ctx: &SimulationContext, path: &Path) -> Result<(), ReportError> {
    let mut out = BufWriter::new(File::create(path)?);
    writeln!(out, "TRAVELLER_ID | REQUESTED | TAXI_ACTUAL | POOL_ACTUAL | RESIGNED")?;
    for traveller in &ctx.travellers {
        let requested = traveller.request.trip_length.unwrap_or(0.0);
        writeln!(
            out,
            "{} | {requested} | {} | {} | {}",
            traveller.id, traveller.distances.taxi_distance, traveller.distances.pool_distance, traveller.is_resigned()
        )?;
    }
    Ok(())
}
