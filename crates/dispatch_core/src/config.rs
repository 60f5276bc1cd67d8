//! Configuration (C7, §6): the four JSON config documents that parameterize a run, loaded with
//! `serde_json` the way the teacher's preset store loads its JSON documents.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::dispatcher::{Fares, OperatingCosts};
use crate::errors::ConfigError;
use crate::ids::{Node, OperatorId};
use crate::traveller::Behaviour;

/// Top-level `simulation_config` document (§6).
#[derive(Debug, Clone, serde::Deserialize)]
pub struct SimulationConfig {
    pub requests: String,
    pub vehicles: String,
    pub city_config: String,
    pub behavioural_config: String,
    pub fares_config: String,
    #[serde(default)]
    pub taxi_operators: Vec<OperatorId>,
    pub refresh_density: f64,
    pub output_path: String,
}

/// `city_config`: `{city, paths: {city_graph, skim_matrix}}` (§6).
#[derive(Debug, Clone, serde::Deserialize)]
pub struct CityConfig {
    pub city: String,
    pub paths: CityPaths,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct CityPaths {
    pub city_graph: String,
    #[serde(default)]
    pub skim_matrix: Option<String>,
}

/// A single edge row of the city graph CSV (`from, to, meters`).
#[derive(Debug, Clone, serde::Deserialize)]
pub struct GraphEdgeRow {
    pub from: u64,
    pub to: u64,
    pub meters: f64,
}

/// `behavioural_config` (§6): `{VoT, pickup_delay_sensitivity, maximal_pickup, maximal_waiting,
/// pool_rides: {PfS, PfS_const}}`.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct BehaviouralConfig {
    #[serde(rename = "VoT")]
    pub vot: f64,
    pub pickup_delay_sensitivity: f64,
    pub maximal_pickup: f64,
    pub maximal_waiting: f64,
    pub pool_rides: PoolRidesBehaviour,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct PoolRidesBehaviour {
    #[serde(rename = "PfS")]
    pub pfs: HashMap<u32, f64>,
    #[serde(rename = "PfS_const")]
    pub pfs_const: f64,
}

impl BehaviouralConfig {
    pub fn to_behaviour(&self) -> Behaviour {
        Behaviour {
            value_of_time: self.vot,
            pickup_delay_sensitivity: self.pickup_delay_sensitivity,
            max_pickup_secs: self.maximal_pickup,
            max_waiting_secs: self.maximal_waiting,
            penalty_for_sharing: self.pool_rides.pfs.clone(),
            penalty_for_sharing_const: self.pool_rides.pfs_const,
        }
    }
}

/// `fares_config`: `{fares: {operatorId: {taxi, pool, pool_discount}}, operating_costs: {...}}`
/// (§6).
#[derive(Debug, Clone, serde::Deserialize)]
pub struct FaresConfig {
    pub fares: HashMap<OperatorId, FaresRow>,
    pub operating_costs: HashMap<OperatorId, OperatingCostsRow>,
}

#[derive(Debug, Clone, Copy, serde::Deserialize)]
pub struct FaresRow {
    pub taxi: f64,
    pub pool: f64,
    pub pool_discount: f64,
}

#[derive(Debug, Clone, Copy, serde::Deserialize)]
pub struct OperatingCostsRow {
    pub taxi: f64,
    pub pool: f64,
}

impl FaresConfig {
    pub fn fares_for(&self, operator: &str) -> Result<Fares, ConfigError> {
        let row = self
            .fares
            .get(operator)
            .ok_or(ConfigError::MissingKey("fares_config.fares[operator]"))?;
        Ok(Fares {
            taxi: row.taxi,
            pool: row.pool,
            pool_discount: row.pool_discount,
        })
    }

    pub fn operating_costs_for(&self, operator: &str) -> Result<OperatingCosts, ConfigError> {
        let row = self
            .operating_costs
            .get(operator)
            .ok_or(ConfigError::MissingKey("fares_config.operating_costs[operator]"))?;
        Ok(OperatingCosts { taxi: row.taxi, pool: row.pool })
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

pub fn load_simulation_config(path: &Path) -> Result<SimulationConfig, ConfigError> {
    read_json(path)
}

pub fn load_city_config(path: &Path) -> Result<CityConfig, ConfigError> {
    read_json(path)
}

pub fn load_behavioural_config(path: &Path) -> Result<BehaviouralConfig, ConfigError> {
    read_json(path)
}

pub fn load_fares_config(path: &Path) -> Result<FaresConfig, ConfigError> {
    read_json(path)
}

/// Loads a city graph from a CSV edge list (§6 `city_graph`) into a [`crate::skim::RoadGraph`].
/// Each row is a one-way edge; the caller adds the reverse edge too when the source street is
/// two-way, which this loader does unconditionally since the tabular input carries no
/// directionality flag.
pub fn load_road_graph(path: &Path) -> Result<crate::skim::RoadGraph, ConfigError> {
    let mut graph = crate::skim::RoadGraph::new();
    let mut reader = csv::Reader::from_path(path)?;
    for row in reader.deserialize() {
        let row: GraphEdgeRow = row?;
        let (from, to) = (Node(row.from), Node(row.to));
        graph.add_edge(from, to, row.meters);
        graph.add_edge(to, from, row.meters);
    }
    Ok(graph)
}
