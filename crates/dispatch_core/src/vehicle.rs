//! Vehicle (§3): constant speed/capacity, availability, onboard/scheduled travellers, and the
//! `Path` sub-record the mover (C4) advances.

use crate::ids::{Node, OperatorId, TravellerId, VehicleId};
use crate::stop::StopKind;

/// `(time, node, eventKind, travellerId)` entries appended as the vehicle crosses stops.
pub type VehicleEvent = (f64, Node, StopKind, TravellerId);

/// The vehicle's position on its planned path between discrete-event ticks (§3).
#[derive(Debug, Clone)]
pub struct Path {
    pub current_position: Node,
    /// Next node on the planned path, or `None` if idle.
    pub closest_crossroad: Option<Node>,
    /// Remaining node list to traverse, or `None` if idle.
    pub current_path: Option<Vec<Node>>,
    /// Seconds already spent on the current edge.
    pub time_between_crossroads: f64,
    /// Seconds remaining on the current edge, or `None` if idle.
    pub to_closest_crossroads: Option<f64>,
    pub current_time: f64,
    pub stationary: bool,
    pub mileage: f64,
    pub events: Vec<VehicleEvent>,
}

impl Path {
    pub fn idle_at(node: Node, at_time: f64) -> Self {
        Self {
            current_position: node,
            closest_crossroad: None,
            current_path: None,
            time_between_crossroads: 0.0,
            to_closest_crossroads: None,
            current_time: at_time,
            stationary: true,
            mileage: 0.0,
            events: Vec::new(),
        }
    }

    /// `stationary ⇔ currentPath == null`; `closestCrossroad` non-null iff `currentPath`
    /// non-null (§3, §8 universal invariant).
    pub fn invariant_holds(&self) -> bool {
        (self.stationary == self.current_path.is_none())
            && (self.closest_crossroad.is_some() == self.current_path.is_some())
    }

    /// The ordered node trail the vehicle has actually crossed, reconstructed from its event
    /// log (`vehicleEventTrail`, §4.3's pool profitability cost formula).
    pub fn event_trail(&self) -> Vec<Node> {
        let mut trail = vec![self.current_position];
        trail.extend(self.events.iter().map(|(_, node, _, _)| *node));
        trail
    }
}

#[derive(Debug, Clone)]
pub struct Vehicle {
    pub id: VehicleId,
    pub operator: OperatorId,
    /// Fleet type tag (e.g. `"taxi"`, `"pool"`), matching the tabular input's `type` column.
    pub vehicle_type: String,
    pub speed: f64,
    pub capacity: usize,
    pub start_time: f64,
    pub end_time: f64,
    pub available: bool,
    pub travellers: Vec<TravellerId>,
    pub scheduled_travellers: Vec<TravellerId>,
    pub path: Path,
}

impl Vehicle {
    pub fn new(
        id: VehicleId,
        operator: OperatorId,
        vehicle_type: String,
        origin: Node,
        start_time: f64,
        end_time: f64,
        speed: f64,
        capacity: usize,
    ) -> Self {
        Self {
            id,
            operator,
            vehicle_type,
            speed,
            capacity,
            start_time,
            end_time,
            available: true,
            travellers: Vec::new(),
            scheduled_travellers: Vec::new(),
            path: Path::idle_at(origin, start_time),
        }
    }

    /// `|travellers| + |scheduledTravellers| ≤ capacity` (§3, §8 universal invariant).
    pub fn occupancy(&self) -> usize {
        self.travellers.len() + self.scheduled_travellers.len()
    }

    pub fn has_spare_capacity(&self) -> bool {
        self.occupancy() < self.capacity
    }

    pub fn is_idle_pool(&self) -> bool {
        self.travellers.is_empty() && self.scheduled_travellers.is_empty()
    }

    /// Replaces the planned path with `nodes` (vehicle position first). Becomes stationary
    /// if the resulting path has fewer than two nodes.
    pub fn set_path(&mut self, nodes: Vec<Node>) {
        if nodes.len() < 2 {
            self.path.current_path = None;
            self.path.closest_crossroad = None;
            self.path.stationary = true;
            return;
        }
        self.path.closest_crossroad = Some(nodes[1]);
        self.path.current_path = Some(nodes);
        self.path.stationary = false;
        self.path.time_between_crossroads = 0.0;
        self.path.to_closest_crossroads = None;
    }
}
