//! Tabular input (§6): the requests and vehicles tables, loaded with the `csv` crate and
//! `chrono` for the requests table's timestamp column.

use std::path::Path;

use chrono::NaiveDateTime;

use crate::errors::ConfigError;
use crate::ids::{Node, OperatorId};
use crate::traveller::ServiceKind;

/// One row of the requests table (§6: `id, origin, destination, request_time, type, operator`).
#[derive(Debug, Clone, serde::Deserialize)]
pub struct RequestRow {
    pub id: String,
    pub origin: u64,
    pub destination: u64,
    pub request_time: String,
    #[serde(rename = "type")]
    pub service_kind: ServiceKindField,
    pub operator: OperatorId,
}

#[derive(Debug, Clone, Copy, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceKindField {
    Taxi,
    Pool,
}

impl From<ServiceKindField> for ServiceKind {
    fn from(value: ServiceKindField) -> Self {
        match value {
            ServiceKindField::Taxi => ServiceKind::Taxi,
            ServiceKindField::Pool => ServiceKind::Pool,
        }
    }
}

/// One row of the vehicles table (§6: `id, origin, start_time, end_time, type, capacity, speed,
/// operator`).
#[derive(Debug, Clone, serde::Deserialize)]
pub struct VehicleRow {
    pub id: String,
    pub origin: u64,
    pub start_time: String,
    pub end_time: String,
    #[serde(rename = "type")]
    pub vehicle_type: String,
    pub capacity: usize,
    pub speed: f64,
    pub operator: OperatorId,
}

/// A resolved request row: raw node ids validated and timestamps converted to simulation
/// seconds relative to `epoch`.
#[derive(Debug, Clone)]
pub struct ResolvedRequest {
    pub origin: Node,
    pub destination: Node,
    pub request_time_secs: f64,
    pub service_kind: ServiceKind,
    pub operator: OperatorId,
}

#[derive(Debug, Clone)]
pub struct ResolvedVehicle {
    pub origin: Node,
    pub start_time_secs: f64,
    pub end_time_secs: f64,
    pub vehicle_type: String,
    pub capacity: usize,
    pub speed: f64,
    pub operator: OperatorId,
}

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parses a `YYYY-MM-DD HH:MM:SS` timestamp into seconds since `epoch` (§6).
fn parse_timestamp(raw: &str, epoch: NaiveDateTime) -> Result<f64, ConfigError> {
    let parsed = NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .map_err(|_| ConfigError::InvalidTimestamp(raw.to_string()))?;
    Ok((parsed - epoch).num_milliseconds() as f64 / 1000.0)
}

pub fn load_requests(path: &Path, epoch: NaiveDateTime) -> Result<Vec<ResolvedRequest>, ConfigError> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut out = Vec::new();
    for row in reader.deserialize() {
        let row: RequestRow = row?;
        out.push(ResolvedRequest {
            origin: Node(row.origin),
            destination: Node(row.destination),
            request_time_secs: parse_timestamp(&row.request_time, epoch)?,
            service_kind: row.service_kind.into(),
            operator: row.operator,
        });
    }
    out.sort_by(|a, b| a.request_time_secs.partial_cmp(&b.request_time_secs).unwrap());
    Ok(out)
}

pub fn load_vehicles(path: &Path, epoch: NaiveDateTime) -> Result<Vec<ResolvedVehicle>, ConfigError> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut out = Vec::new();
    for row in reader.deserialize() {
        let row: VehicleRow = row?;
        out.push(ResolvedVehicle {
            origin: Node(row.origin),
            start_time_secs: parse_timestamp(&row.start_time, epoch)?,
            end_time_secs: parse_timestamp(&row.end_time, epoch)?,
            vehicle_type: row.vehicle_type,
            capacity: row.capacity,
            speed: row.speed,
            operator: row.operator,
        });
    }
    out.sort_by(|a, b| a.start_time_secs.partial_cmp(&b.start_time_secs).unwrap());
    Ok(out)
}

/// The earliest timestamp across both tables becomes simulation time zero, so `request_time`/
/// `start_time` convert to non-negative seconds-from-epoch offsets.
pub fn earliest_epoch(requests_path: &Path, vehicles_path: &Path) -> Result<NaiveDateTime, ConfigError> {
    let mut earliest: Option<NaiveDateTime> = None;
    let mut consider = |raw: &str| -> Result<(), ConfigError> {
        let parsed =
            NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT).map_err(|_| ConfigError::InvalidTimestamp(raw.to_string()))?;
        if earliest.is_none_or(|e| parsed < e) {
            earliest = Some(parsed);
        }
        Ok(())
    };

    let mut reader = csv::Reader::from_path(requests_path)?;
    for row in reader.deserialize() {
        let row: RequestRow = row?;
        consider(&row.request_time)?;
    }
    let mut reader = csv::Reader::from_path(vehicles_path)?;
    for row in reader.deserialize() {
        let row: VehicleRow = row?;
        consider(&row.start_time)?;
    }

    earliest.ok_or(ConfigError::MissingKey("requests/vehicles table has no rows to derive an epoch from"))
}
