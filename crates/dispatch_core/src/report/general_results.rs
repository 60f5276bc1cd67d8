//! `general_results.txt`: fleet-wide totals — vehicle mileage, ride mileage, requested
//! mileage, mileage reduction (absolute and percent), and profit/cost (§6.3).

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::context::SimulationContext;
use crate::errors::ReportError;
use crate::ride::Ride;

pub fn write(ctx: &SimulationContext, path: &Path) -> Result<(), ReportError> {
    let vehicle_mileage: f64 = ctx.vehicles.iter().map(|v| v.path.mileage).sum();
    let requested_mileage: f64 = ctx.travellers.iter().filter_map(|t| t.request.trip_length).sum();
    let ride_mileage: f64 = ctx
        .travellers
        .iter()
        .map(|t| t.distances.taxi_distance + t.distances.pool_distance)
        .sum();

    let (revenue, cost, profit) = ctx.rides.iter().fold((0.0, 0.0, 0.0), |(r, c, p), ride| {
        let profitability = ride.common().profitability;
        (r + profitability.revenue, c + profitability.cost, p + profitability.profit)
    });

    let (taxi_rides, pool_rides) = ctx
        .rides
        .iter()
        .fold((0usize, 0usize), |(taxi, pool), ride| match ride {
            Ride::Taxi(_) => (taxi + 1, pool),
            Ride::Pool(_) => (taxi, pool + 1),
        });

    let reduction_abs = requested_mileage - ride_mileage;
    let reduction_pct = if requested_mileage > 0.0 { reduction_abs / requested_mileage * 100.0 } else { 0.0 };

    let mut out = BufWriter::new(File::create(path)?);
    writeln!(out, "METRIC | VALUE")?;
    writeln!(out, "vehicle_mileage | {vehicle_mileage}")?;
    writeln!(out, "ride_mileage | {ride_mileage}")?;
    writeln!(out, "requested_mileage | {requested_mileage}")?;
    writeln!(out, "mileage_reduction_abs | {reduction_abs}")?;
    writeln!(out, "mileage_reduction_pct | {reduction_pct}")?;
    writeln!(out, "taxi_rides | {taxi_rides}")?;
    writeln!(out, "pool_rides | {pool_rides}")?;
    writeln!(out, "total_revenue | {revenue}")?;
    writeln!(out, "total_cost | {cost}")?;
    writeln!(out, "total_profit | {profit}")?;
    Ok(())
}
