//! Ride (C3, §4.3): the closed sum type `Taxi | Pool`, each computing its own utility and
//! profitability, sharing the `destinationPoints`/`pastDestinationPoints`/event-log fields
//! common to both (§9 redesign: collapses the source's subclass-registration hierarchy into a
//! tagged enum).

use std::collections::HashMap;

use crate::errors::SkimError;
use crate::ids::{Node, RideId, TravellerId, VehicleId};
use crate::skim::Skim;
use crate::stop::{Stop, StopKind};
use crate::traveller::{Behaviour, Traveller};
use crate::vehicle::{Vehicle, VehicleEvent};

/// `(revenue, cost, profit)` (§3, §9: field order is binding per the source reconciliation).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Profitability {
    pub revenue: f64,
    pub cost: f64,
    pub profit: f64,
}

impl Profitability {
    pub fn new(revenue: f64, cost: f64) -> Self {
        Self {
            revenue,
            cost,
            profit: revenue - cost,
        }
    }
}

/// Fields shared by [`TaxiRide`] and [`PoolRide`] (§3).
#[derive(Debug, Clone)]
pub struct RideCommon {
    pub id: RideId,
    pub travellers: Vec<TravellerId>,
    pub destination_points: Vec<Stop>,
    pub past_destination_points: Vec<Stop>,
    pub serving_vehicle: VehicleId,
    pub active: bool,
    pub profitability: Profitability,
    pub events: Vec<VehicleEvent>,
}

impl RideCommon {
    fn new(id: RideId, vehicle: VehicleId, stops: Vec<Stop>, travellers: Vec<TravellerId>) -> Self {
        Self {
            id,
            travellers,
            destination_points: stops,
            past_destination_points: Vec::new(),
            serving_vehicle: vehicle,
            active: true,
            profitability: Profitability::default(),
            events: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TaxiRide {
    pub common: RideCommon,
}

#[derive(Debug, Clone)]
pub struct PoolRide {
    pub common: RideCommon,
    /// The current set of orderings of remaining stops the ride could still execute.
    pub admissible_combinations: Vec<Vec<Stop>>,
    pub shared: bool,
}

/// `Ride = Taxi | Pool` (§9 redesign flag).
#[derive(Debug, Clone)]
pub enum Ride {
    Taxi(TaxiRide),
    Pool(PoolRide),
}

impl Ride {
    pub fn common(&self) -> &RideCommon {
        match self {
            Ride::Taxi(t) => &t.common,
            Ride::Pool(p) => &p.common,
        }
    }

    pub fn common_mut(&mut self) -> &mut RideCommon {
        match self {
            Ride::Taxi(t) => &mut t.common,
            Ride::Pool(p) => &mut p.common,
        }
    }

    pub fn is_active(&self) -> bool {
        self.common().active
    }
}

/// Computes `pickupDelay = deadheadDistance/speed` when not supplied explicitly (§4.3).
fn resolve_pickup_delay(
    explicit: Option<f64>,
    vehicle_position: Node,
    origin: Node,
    speed: f64,
    skim: &Skim,
) -> Result<f64, SkimError> {
    if let Some(delay) = explicit {
        return Ok(delay);
    }
    let deadhead = skim.deadhead(vehicle_position, origin)?;
    Ok(deadhead / speed)
}

impl TaxiRide {
    pub fn new(id: RideId, vehicle: VehicleId, traveller: TravellerId, origin: Node, destination: Node) -> Self {
        let stops = vec![
            Stop::origin(origin, traveller),
            Stop::destination(destination, traveller),
        ];
        Self {
            common: RideCommon::new(id, vehicle, stops, vec![traveller]),
        }
    }

    /// `revenue = tripLength · fare`; `cost = (deadhead + tripLength) · opCost`;
    /// `profit = revenue − cost` (§4.3).
    pub fn profitability(
        vehicle_position: Node,
        origin: Node,
        trip_length: f64,
        fare: f64,
        op_cost: f64,
        skim: &Skim,
    ) -> Result<Profitability, SkimError> {
        let deadhead = skim.deadhead(vehicle_position, origin)?;
        let revenue = trip_length * fare;
        let cost = (deadhead + trip_length) * op_cost;
        Ok(Profitability::new(revenue, cost))
    }

    /// `U = −tripLength·fare − (tripLength/speed)·VoT − pickupDelay·VoT·pickupDelaySensitivity`
    /// (§4.3). Solo taxi utility is always negative and monotonically worse as any cost/delay
    /// term grows, per §9's "utility signs" open question.
    pub fn utility(
        vehicle_position: Node,
        speed: f64,
        origin: Node,
        trip_length: f64,
        fare: f64,
        behaviour: &Behaviour,
        pickup_delay: Option<f64>,
        skim: &Skim,
    ) -> Result<f64, SkimError> {
        let pickup_delay = resolve_pickup_delay(pickup_delay, vehicle_position, origin, speed, skim)?;
        let u = -trip_length * fare
            - (trip_length / speed) * behaviour.value_of_time
            - pickup_delay * behaviour.value_of_time * behaviour.pickup_delay_sensitivity;
        Ok(u)
    }
}

/// Reconstructs the effective in-vehicle distance for `traveller` within `stop_seq`, used by
/// [`PoolRide::utility`] (§4.3).
fn effective_ride_distance(
    vehicle_position: Node,
    stop_seq: &[Stop],
    traveller: TravellerId,
    already_picked_up: bool,
    skim: &Skim,
) -> Result<f64, SkimError> {
    let dropoff_index = stop_seq
        .iter()
        .position(|s| s.traveller == traveller && s.kind == StopKind::Destination);
    let Some(dropoff_index) = dropoff_index else {
        return Ok(0.0);
    };
    let start_index = if already_picked_up {
        0
    } else {
        stop_seq
            .iter()
            .position(|s| s.traveller == traveller && s.kind != StopKind::Destination)
            .unwrap_or(0)
    };
    let mut nodes = vec![vehicle_position];
    nodes.extend(
        stop_seq[start_index..=dropoff_index]
            .iter()
            .map(|s| s.node),
    );
    skim.distance(&nodes)
}

impl PoolRide {
    pub fn new(id: RideId, vehicle: VehicleId, traveller: TravellerId, origin: Node, destination: Node) -> Self {
        let stops = vec![
            Stop::origin(origin, traveller),
            Stop::destination(destination, traveller),
        ];
        Self {
            admissible_combinations: vec![stops.clone()],
            common: RideCommon::new(id, vehicle, stops, vec![traveller]),
            shared: false,
        }
    }

    /// `U = −tripLength·fare·(1−poolDiscount) − (tripLength/speed)·VoT·PfS[N]
    ///     − pickupDelay·VoT·pickupDelaySensitivity − PfSconst` (§4.3).
    #[allow(clippy::too_many_arguments)]
    pub fn utility(
        vehicle_position: Node,
        speed: f64,
        stop_seq: &[Stop],
        traveller: TravellerId,
        fare: f64,
        pool_discount: f64,
        co_riders: u32,
        behaviour: &Behaviour,
        already_picked_up: bool,
        pickup_delay: Option<f64>,
        origin: Node,
        skim: &Skim,
    ) -> Result<f64, SkimError> {
        let trip_length = effective_ride_distance(vehicle_position, stop_seq, traveller, already_picked_up, skim)?;
        let pickup_delay = resolve_pickup_delay(pickup_delay, vehicle_position, origin, speed, skim)?;
        let u = -trip_length * fare * (1.0 - pool_discount)
            - (trip_length / speed) * behaviour.value_of_time * behaviour.penalty_for_sharing(co_riders)
            - pickup_delay * behaviour.value_of_time * behaviour.pickup_delay_sensitivity
            - behaviour.penalty_for_sharing_const;
        Ok(u)
    }

    /// `revenue = (1−sharingDiscount)·fare·Σ tripLength_t` if shared, else `fare·tripLength`
    /// for the sole traveller; `cost = opCost · distance(vehicleEventTrail ⧺ newStops)` (§4.3).
    pub fn profitability(
        &self,
        vehicle: &Vehicle,
        fare: f64,
        op_cost: f64,
        sharing_discount: f64,
        new_stops: Option<&[Stop]>,
        trip_lengths: &HashMap<TravellerId, f64>,
        skim: &Skim,
    ) -> Result<Profitability, SkimError> {
        let is_shared = self.shared || self.common.travellers.len() > 1 || new_stops.is_some();
        let revenue = if is_shared {
            let total_trip_length: f64 = self
                .common
                .travellers
                .iter()
                .filter_map(|t| trip_lengths.get(t))
                .sum();
            (1.0 - sharing_discount) * fare * total_trip_length
        } else {
            let only = self.common.travellers.first().and_then(|t| trip_lengths.get(t)).copied().unwrap_or(0.0);
            fare * only
        };

        let mut trail = vehicle.path.event_trail();
        if let Some(stops) = new_stops {
            trail.extend(stops.iter().map(|s| s.node));
        } else {
            trail.extend(self.common.destination_points.iter().map(|s| s.node));
        }
        let cost = op_cost * skim.distance(&trail)?;
        Ok(Profitability::new(revenue, cost))
    }

    /// Appends `traveller` to the vehicle's scheduled travellers, rebuilds the vehicle's
    /// planned path, and overwrites the ride's stop sequence / admissible set / profitability
    /// (§4.3). The vehicle becomes unavailable once capacity is reached.
    pub fn add_traveller(
        &mut self,
        vehicle: &mut Vehicle,
        traveller: TravellerId,
        profitability: Profitability,
        new_stop_seq: Vec<Stop>,
        admissible_combinations: Vec<Vec<Stop>>,
        skim: &Skim,
    ) -> Result<(), SkimError> {
        vehicle.scheduled_travellers.push(traveller);
        if !vehicle.has_spare_capacity() {
            vehicle.available = false;
        }

        let mut nodes = vec![vehicle.path.current_position];
        if let Some(crossroad) = vehicle.path.closest_crossroad {
            nodes.push(crossroad);
        }
        nodes.extend(new_stop_seq.iter().map(|s| s.node));
        let route = skim.path(&nodes)?;
        vehicle.set_path(route);

        if !self.common.travellers.contains(&traveller) {
            self.common.travellers.push(traveller);
        }
        self.common.destination_points = new_stop_seq;
        self.admissible_combinations = admissible_combinations;
        self.common.profitability = profitability;
        self.shared = true;
        Ok(())
    }
}

/// Fetches each of `travellers`' recorded taxi utility, for the attractiveness filter (§4.5
/// Filter A). Missing entries are dropped silently by the caller, which is appropriate: a
/// traveller with no recorded solo baseline (e.g. a pre-seeded pool traveller) cannot be
/// compared and is treated as having no baseline to beat.
pub fn taxi_baseline(traveller: &Traveller) -> Option<f64> {
    traveller.utilities.get("taxi").copied()
}
