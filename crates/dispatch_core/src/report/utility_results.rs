//! `utility_results.txt`: per-traveller per-mode utility (§6.3).

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::context::SimulationContext;
use crate::errors::ReportError;

pub fn write(ctx: &SimulationContext, path: &Path) -> Result<(), ReportError> {
    let mut out = BufWriter::new(File::create(path)?);
    writeln!(out, "TRAVELLER_ID | TAXI_UTILITY | POOL_UTILITY")?;
    for traveller in &ctx.travellers {
        let taxi = traveller.utilities.get("taxi").map(|u| u.to_string()).unwrap_or_default();
        let pool = traveller.utilities.get("pool").map(|u| u.to_string()).unwrap_or_default();
        writeln!(out, "{} | {taxi} | {pool}", traveller.id)?;
    }
    Ok(())
}
