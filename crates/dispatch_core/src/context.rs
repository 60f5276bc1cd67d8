//! Simulation state (§9 redesign: the arena the source's global registries collapse into).
//!
//! A [`SimulationContext`] owns every [`Vehicle`], [`Ride`] and [`Traveller`] in flat arenas
//! indexed by their arena ids, plus the per-operator [`Dispatcher`]s and the simulation-wide
//! [`Skim`]. It is created at `initialise` and consumed by the report writers at `finalize`,
//! mirroring the teacher's `World`-is-the-simulation-state convention without pulling in
//! `bevy_ecs` for a model with no true entity relationships.

use std::collections::HashMap;

use chrono::NaiveDateTime;

use crate::dispatcher::Dispatcher;
use crate::ids::{OperatorId, RideId, TravellerId, VehicleId};
use crate::ride::Ride;
use crate::skim::Skim;
use crate::traveller::Traveller;
use crate::vehicle::Vehicle;

#[derive(Debug)]
pub struct SimulationContext {
    pub skim: Skim,
    pub vehicles: Vec<Vehicle>,
    pub rides: Vec<Ride>,
    pub travellers: Vec<Traveller>,
    pub dispatchers: HashMap<OperatorId, Dispatcher>,
    /// Global refresh interval `R` (§4.6) used both for deferred-request re-enqueue and for the
    /// synthetic tick that keeps vehicles advancing once the event queue empties.
    pub refresh_secs: f64,
    /// Simulation time zero, so a ride/vehicle log's elapsed-seconds timestamps can be rendered
    /// back to a calendar date (§6, `DATE` column).
    pub epoch: NaiveDateTime,
}

impl SimulationContext {
    pub fn new(skim: Skim, refresh_secs: f64, epoch: NaiveDateTime) -> Self {
        Self {
            skim,
            vehicles: Vec::new(),
            rides: Vec::new(),
            travellers: Vec::new(),
            dispatchers: HashMap::new(),
            refresh_secs,
            epoch,
        }
    }

    pub fn register_dispatcher(&mut self, dispatcher: Dispatcher) {
        self.dispatchers.insert(dispatcher.id.clone(), dispatcher);
    }

    /// Allocates a vehicle in the arena and registers it with its operator's fleet.
    pub fn spawn_vehicle(&mut self, mut vehicle: Vehicle) -> VehicleId {
        let id = VehicleId(self.vehicles.len());
        vehicle.id = id;
        let operator = vehicle.operator.clone();
        let vehicle_type = vehicle.vehicle_type.clone();
        self.vehicles.push(vehicle);
        if let Some(dispatcher) = self.dispatchers.get_mut(&operator) {
            dispatcher.register_vehicle(&vehicle_type, id);
        }
        id
    }

    /// Allocates a traveller in the arena.
    pub fn spawn_traveller(&mut self, mut traveller: Traveller) -> TravellerId {
        let id = TravellerId(self.travellers.len());
        traveller.id = id;
        self.travellers.push(traveller);
        id
    }

    pub fn vehicle(&self, id: VehicleId) -> &Vehicle {
        &self.vehicles[id.0]
    }

    pub fn vehicle_mut(&mut self, id: VehicleId) -> &mut Vehicle {
        &mut self.vehicles[id.0]
    }

    pub fn traveller(&self, id: TravellerId) -> &Traveller {
        &self.travellers[id.0]
    }

    pub fn traveller_mut(&mut self, id: TravellerId) -> &mut Traveller {
        &mut self.travellers[id.0]
    }

    pub fn ride(&self, id: RideId) -> &Ride {
        &self.rides[id.0]
    }

    pub fn ride_mut(&mut self, id: RideId) -> &mut Ride {
        &mut self.rides[id.0]
    }

    /// Indices of every ride currently `active` (§4.6 step 2/5).
    pub fn active_ride_ids(&self) -> Vec<RideId> {
        self.rides
            .iter()
            .enumerate()
            .filter(|(_, r)| r.is_active())
            .map(|(i, _)| RideId(i))
            .collect()
    }

    pub fn any_ride_active(&self) -> bool {
        self.rides.iter().any(|r| r.is_active())
    }

    /// Renders an elapsed-seconds-from-epoch offset back to a calendar timestamp for the
    /// `DATE` columns of `vehicle_log`/`ride_log` (§6).
    pub fn timestamp_at(&self, elapsed_secs: f64) -> NaiveDateTime {
        self.epoch + chrono::Duration::milliseconds((elapsed_secs * 1000.0).round() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::{Fares, OperatingCosts};
    use crate::ids::Node;
    use crate::skim::{RoadGraph, Skim};

    fn context() -> SimulationContext {
        let mut g = RoadGraph::new();
        g.add_edge(Node(1), Node(2), 1000.0);
        g.add_edge(Node(2), Node(1), 1000.0);
        let epoch = NaiveDateTime::parse_from_str("2024-01-01 00:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
        SimulationContext::new(Skim::from_graph(g), 60.0, epoch)
    }

    #[test]
    fn spawning_a_vehicle_registers_it_with_its_operator() {
        let mut ctx = context();
        ctx.register_dispatcher(Dispatcher::new(
            "op".to_string(),
            Fares {
                taxi: 1.0,
                pool: 0.8,
                pool_discount: 0.2,
            },
            OperatingCosts { taxi: 0.3, pool: 0.25 },
            false,
        ));
        let vid = ctx.spawn_vehicle(Vehicle::new(
            VehicleId(0),
            "op".to_string(),
            "taxi".to_string(),
            Node(1),
            0.0,
            3600.0,
            10.0,
            1,
        ));
        assert_eq!(ctx.dispatchers["op"].fleet["taxi"], vec![vid]);
    }
}
