//! Dispatcher (C5, §4.5): per-operator matcher. Finds nearest eligible vehicles, computes taxi
//! and pool assignment candidates, and commits a chosen assignment.
//!
//! §9's redesign flag turns the source's keyword-argument flags (`empty_pool`,
//! `attractive_only`, `profitable_only`, `only_taxi`) into explicit option records
//! ([`FindVehicleOptions`], [`TaxiUtilityOptions`], [`PoolUtilityOptions`]).

use std::collections::HashMap;

use crate::combo::enumerate_insertions;
use crate::errors::SkimError;
use crate::ids::{Node, OperatorId, RideId, TravellerId, VehicleId};
use crate::ride::{PoolRide, Profitability, Ride, TaxiRide};
use crate::skim::Skim;
use crate::stop::Stop;
use crate::traveller::Traveller;
use crate::vehicle::Vehicle;

/// `{taxi, pool, pool_discount}` fare table for one operator (§6 `fares_config`).
#[derive(Debug, Clone, Copy)]
pub struct Fares {
    pub taxi: f64,
    pub pool: f64,
    pub pool_discount: f64,
}

/// `{taxi, pool}` operating-cost table for one operator (§6 `fares_config.operating_costs`).
#[derive(Debug, Clone, Copy)]
pub struct OperatingCosts {
    pub taxi: f64,
    pub pool: f64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FindVehicleOptions {
    /// Restrict to pool vehicles carrying nobody and scheduled for nobody.
    pub empty_pool_only: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct TaxiUtilityOptions {
    /// Restrict the search to taxi-type vehicles only; otherwise taxi + empty-pool vehicles
    /// are both eligible (§4.5 `taxiUtility`).
    pub only_taxi: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct PoolUtilityOptions {
    pub attractive_only: bool,
    pub profitable_only: bool,
}

impl Default for PoolUtilityOptions {
    fn default() -> Self {
        Self {
            attractive_only: true,
            profitable_only: true,
        }
    }
}

/// A feasible taxi (or pool-fallback) assignment, computed but not yet committed (§4.5
/// `taxiUtility`/the pool-fallback branch of `poolUtility`).
#[derive(Debug, Clone)]
pub struct TaxiCandidate {
    pub vehicle: VehicleId,
    pub origin: Node,
    pub destination: Node,
    pub profitability: Profitability,
    pub utility: f64,
}

/// A feasible insertion into an ongoing pool ride (§4.5 `poolUtility` step 2).
#[derive(Debug, Clone)]
pub struct PoolCandidate {
    pub ride: RideId,
    pub sequence: Vec<Stop>,
    pub profitability: Profitability,
    /// Utility of every participant (existing + new) under this sequence.
    pub utilities: HashMap<TravellerId, f64>,
    pub admissible: Vec<Vec<Stop>>,
}

#[derive(Debug, Clone)]
pub struct PoolUtilityResult {
    /// Sorted ascending by profit, so the best candidate is last (§4.5).
    pub candidates: Vec<PoolCandidate>,
    pub taxi_fallback: Option<TaxiCandidate>,
}

/// Per-operator fleet/ride ownership and pricing (§3 `Dispatcher`).
#[derive(Debug, Clone)]
pub struct Dispatcher {
    pub id: OperatorId,
    pub fleet: HashMap<String, Vec<VehicleId>>,
    pub taxi_rides: Vec<RideId>,
    pub pool_rides: Vec<RideId>,
    pub fares: Fares,
    pub operating_costs: OperatingCosts,
    /// Operators listed in `taxi_operators[]` (§6) never pool: every request they serve is a
    /// private taxi ride.
    pub taxi_only: bool,
}

impl Dispatcher {
    pub fn new(id: OperatorId, fares: Fares, operating_costs: OperatingCosts, taxi_only: bool) -> Self {
        Self {
            id,
            fleet: HashMap::new(),
            taxi_rides: Vec::new(),
            pool_rides: Vec::new(),
            fares,
            operating_costs,
            taxi_only,
        }
    }

    pub fn register_vehicle(&mut self, vehicle_type: &str, vehicle: VehicleId) {
        self.fleet.entry(vehicle_type.to_string()).or_default().push(vehicle);
    }

    fn fleet_of<'a>(&'a self, vehicle_types: &'a [&'a str]) -> impl Iterator<Item = VehicleId> + 'a {
        vehicle_types
            .iter()
            .flat_map(move |vt| self.fleet.get(*vt).into_iter().flatten().copied())
    }

    /// Scans all vehicles of `allowed_types`, skipping unavailable ones (and, if
    /// `empty_pool_only`, non-empty pool vehicles), and returns the minimum approach time, ties
    /// broken by scan order (§4.5 `findClosestVehicle`).
    pub fn find_closest_vehicle(
        &self,
        vehicles: &[Vehicle],
        allowed_types: &[&str],
        origin: Node,
        skim: &Skim,
        options: FindVehicleOptions,
    ) -> Result<Option<(f64, VehicleId)>, SkimError> {
        let mut best: Option<(f64, VehicleId)> = None;
        for vid in self.fleet_of(allowed_types) {
            let vehicle = &vehicles[vid.0];
            if !vehicle.available {
                continue;
            }
            if options.empty_pool_only && !vehicle.is_idle_pool() {
                continue;
            }
            let distance = skim.distance(&[origin, vehicle.path.current_position])?;
            let time_to_arrival = distance / vehicle.speed;
            if best.map(|(best_time, _)| time_to_arrival < best_time).unwrap_or(true) {
                best = Some((time_to_arrival, vid));
            }
        }
        Ok(best)
    }

    /// Finds the closest eligible vehicle and computes the taxi profitability/utility of
    /// serving `traveller` with it (§4.5 `taxiUtility`).
    pub fn taxi_utility(
        &self,
        vehicles: &[Vehicle],
        traveller: &Traveller,
        skim: &Skim,
        options: TaxiUtilityOptions,
    ) -> Result<Option<TaxiCandidate>, SkimError> {
        let allowed: &[&str] = if options.only_taxi { &["taxi"] } else { &["taxi", "pool"] };
        let find_options = FindVehicleOptions {
            empty_pool_only: !options.only_taxi,
        };
        let Some((_, vehicle_id)) =
            self.find_closest_vehicle(vehicles, allowed, traveller.request.origin, skim, find_options)?
        else {
            return Ok(None);
        };
        let vehicle = &vehicles[vehicle_id.0];
        let origin = traveller.request.origin;
        let destination = traveller.request.destination;
        let trip_length = traveller
            .request
            .trip_length
            .unwrap_or(skim.distance(&[origin, destination])?);

        let profitability = TaxiRide::profitability(
            vehicle.path.current_position,
            origin,
            trip_length,
            self.fares.taxi,
            self.operating_costs.taxi,
            skim,
        )?;
        let utility = TaxiRide::utility(
            vehicle.path.current_position,
            vehicle.speed,
            origin,
            trip_length,
            self.fares.taxi,
            &traveller.behaviour,
            traveller.service.pickup_delay,
            skim,
        )?;

        Ok(Some(TaxiCandidate {
            vehicle: vehicle_id,
            origin,
            destination,
            profitability,
            utility,
        }))
    }

    /// Computes the taxi fallback and every feasible pool insertion for `traveller`, filtered
    /// by attractiveness and profitability and sorted ascending by profit (§4.5 `poolUtility`).
    #[allow(clippy::too_many_arguments)]
    pub fn pool_utility(
        &self,
        vehicles: &[Vehicle],
        rides: &[Ride],
        travellers: &[Traveller],
        traveller: &Traveller,
        skim: &Skim,
        options: PoolUtilityOptions,
    ) -> Result<PoolUtilityResult, SkimError> {
        let max_pickup_secs = traveller.behaviour.max_pickup_secs;
        let origin = traveller.request.origin;
        let destination = traveller.request.destination;
        let trip_length = traveller
            .request
            .trip_length
            .unwrap_or(skim.distance(&[origin, destination])?);

        // 1. Taxi fallback: closest empty-pool vehicle, admitted only within the pickup bound.
        let taxi_fallback = match self.find_closest_vehicle(
            vehicles,
            &["pool"],
            origin,
            skim,
            FindVehicleOptions { empty_pool_only: true },
        )? {
            Some((time_to_arrival, vehicle_id)) if time_to_arrival <= max_pickup_secs => {
                let vehicle = &vehicles[vehicle_id.0];
                let profitability = TaxiRide::profitability(
                    vehicle.path.current_position,
                    origin,
                    trip_length,
                    self.fares.taxi,
                    self.operating_costs.pool,
                    skim,
                )?;
                let utility = TaxiRide::utility(
                    vehicle.path.current_position,
                    vehicle.speed,
                    origin,
                    trip_length,
                    self.fares.taxi,
                    &traveller.behaviour,
                    traveller.service.pickup_delay,
                    skim,
                )?;
                Some(TaxiCandidate {
                    vehicle: vehicle_id,
                    origin,
                    destination,
                    profitability,
                    utility,
                })
            }
            _ => None,
        };

        // 2. Enumerate insertions into every currently-shared pool ride.
        let mut candidates = Vec::new();

        for &ride_id in &self.pool_rides {
            let Ride::Pool(pool) = &rides[ride_id.0] else {
                continue;
            };
            if !pool.common.active || pool.common.travellers.is_empty() {
                continue;
            }
            let vehicle = &vehicles[pool.common.serving_vehicle.0];
            let max_distance_pickup = max_pickup_secs * vehicle.speed;
            let max_trip_length = skim.distance(
                &std::iter::once(vehicle.path.current_position)
                    .chain(pool.common.destination_points.iter().map(|s| s.node))
                    .collect::<Vec<_>>(),
            )? + trip_length;

            let sequences = enumerate_insertions(
                &pool.admissible_combinations,
                vehicle.path.current_position,
                traveller.id,
                origin,
                destination,
                max_distance_pickup,
                max_trip_length,
                skim,
            )?;

            for sequence in sequences {
                // Filter A: every participant's shared utility must beat their solo baseline.
                let mut utilities = HashMap::new();
                let mut attractive = true;
                let co_riders = (pool.common.travellers.len() + 1) as u32;

                for &participant in pool.common.travellers.iter().chain(std::iter::once(&traveller.id)) {
                    let participant_traveller = if participant == traveller.id {
                        traveller
                    } else {
                        &travellers[participant.0]
                    };
                    let already_picked_up = vehicle.travellers.contains(&participant);
                    let shared_utility = PoolRide::utility(
                        vehicle.path.current_position,
                        vehicle.speed,
                        &sequence,
                        participant,
                        self.fares.pool,
                        self.fares.pool_discount,
                        co_riders,
                        &participant_traveller.behaviour,
                        already_picked_up,
                        participant_traveller.service.pickup_delay,
                        participant_traveller.request.origin,
                        skim,
                    )?;
                    utilities.insert(participant, shared_utility);

                    if options.attractive_only {
                        if let Some(baseline) = participant_traveller.utilities.get("taxi") {
                            if shared_utility <= *baseline {
                                attractive = false;
                            }
                        }
                    }
                }
                if options.attractive_only && !attractive {
                    continue;
                }

                let mut trip_lengths = HashMap::new();
                for &participant in &pool.common.travellers {
                    let participant_traveller = &travellers[participant.0];
                    trip_lengths.insert(
                        participant,
                        participant_traveller.request.trip_length.unwrap_or(0.0),
                    );
                }
                trip_lengths.insert(traveller.id, trip_length);

                let profitability = pool.profitability(
                    vehicle,
                    self.fares.pool,
                    self.operating_costs.pool,
                    self.fares.pool_discount,
                    Some(&sequence),
                    &trip_lengths,
                    skim,
                )?;

                if options.profitable_only && profitability.profit <= pool.common.profitability.profit {
                    continue;
                }

                candidates.push(PoolCandidate {
                    ride: ride_id,
                    admissible: vec![sequence.clone()],
                    sequence,
                    profitability,
                    utilities,
                });
            }
        }

        candidates.sort_by(|a, b| a.profitability.profit.partial_cmp(&b.profitability.profit).unwrap());

        Ok(PoolUtilityResult { candidates, taxi_fallback })
    }

    /// Commits `candidate` as a private ride (taxi dispatch, or a brand-new solo pool ride used
    /// as the pool-fallback) (§4.5 `assignTaxi`).
    pub fn assign_taxi(
        &mut self,
        vehicles: &mut [Vehicle],
        rides: &mut Vec<Ride>,
        traveller: &mut Traveller,
        candidate: &TaxiCandidate,
        as_pool_ride: bool,
        skim: &Skim,
    ) -> Result<RideId, SkimError> {
        let ride_id = RideId(rides.len());
        let vehicle = &mut vehicles[candidate.vehicle.0];

        let mut ride = if as_pool_ride {
            Ride::Pool(PoolRide::new(ride_id, candidate.vehicle, traveller.id, candidate.origin, candidate.destination))
        } else {
            Ride::Taxi(TaxiRide::new(ride_id, candidate.vehicle, traveller.id, candidate.origin, candidate.destination))
        };
        ride.common_mut().profitability = candidate.profitability;
        ride.common_mut().serving_vehicle = candidate.vehicle;
        ride.common_mut().events.push((
            vehicle.path.current_time,
            vehicle.path.current_position,
            crate::stop::StopKind::Assignment,
            traveller.id,
        ));

        vehicle.available = false;
        vehicle.scheduled_travellers = vec![traveller.id];
        let mut route_nodes = vec![vehicle.path.current_position];
        route_nodes.extend(ride.common().destination_points.iter().map(|s| s.node));
        vehicle.set_path(skim.path(&route_nodes)?);

        rides.push(ride);
        if as_pool_ride {
            self.pool_rides.push(ride_id);
        } else {
            self.taxi_rides.push(ride_id);
        }

        let mode = if as_pool_ride { "pool" } else { "taxi" };
        traveller.utilities.insert(mode, candidate.utility);

        Ok(ride_id)
    }

    /// Selects the highest-profit pool candidate (last after the ascending sort; ties broken
    /// by ride id per §9's open question) and commits it (§4.5 `assignPool`).
    pub fn assign_pool(
        &mut self,
        vehicles: &mut [Vehicle],
        rides: &mut [Ride],
        travellers: &mut [Traveller],
        new_traveller: TravellerId,
        mut result: PoolUtilityResult,
        skim: &Skim,
    ) -> Result<RideId, SkimError> {
        let best = result.candidates.pop().expect("assign_pool called with no candidates");

        for (&participant, &utility) in &best.utilities {
            travellers[participant.0].utilities.insert("pool", utility);
        }

        let Ride::Pool(pool) = &mut rides[best.ride.0] else {
            unreachable!("pool candidates only ever reference pool rides")
        };
        let vehicle_id = pool.common.serving_vehicle;
        let vehicle = &mut vehicles[vehicle_id.0];
        pool.add_traveller(vehicle, new_traveller, best.profitability, best.sequence, best.admissible, skim)?;

        Ok(best.ride)
    }
}
