//! Event Loop (C6, §4.6): chronological driver interleaving vehicle arrivals, requests, and
//! forced refresh ticks. Grounded on the teacher's `runner.rs` "pop next event, dispatch by
//! kind" pattern, adapted from ECS-schedule dispatch to a direct match over [`EventKind`].

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::clock::{EventKind, EventQueue};
use crate::context::SimulationContext;
use crate::dispatcher::{PoolUtilityOptions, TaxiUtilityOptions};
use crate::errors::SkimError;
use crate::ids::{OperatorId, TravellerId, VehicleId};
use crate::input::{ResolvedRequest, ResolvedVehicle};
use crate::mover::{self, MoverOptions};
use crate::traveller::{Behaviour, RequestDetails, ServiceKind, Traveller};
use crate::vehicle::Vehicle;

/// Drives a loaded [`SimulationContext`] through every vehicle/request event to completion.
pub struct Runner {
    vehicles: Vec<ResolvedVehicle>,
    requests: Vec<ResolvedRequest>,
    behaviour_template: Behaviour,
    queue: EventQueue,
    last_event_time: f64,
    /// Maps a request row to the [`TravellerId`] instantiated for it on its first event, so a
    /// re-enqueued (deferred) request reuses the same traveller instead of duplicating it.
    traveller_for_request: HashMap<usize, TravellerId>,
}

impl Runner {
    pub fn new(vehicles: Vec<ResolvedVehicle>, requests: Vec<ResolvedRequest>, behaviour_template: Behaviour) -> Self {
        let mut queue = EventQueue::new();
        for (row, vehicle) in vehicles.iter().enumerate() {
            queue.push_new_vehicle(vehicle.start_time_secs, row);
        }
        for (row, request) in requests.iter().enumerate() {
            queue.push_request(request.request_time_secs, row);
        }
        Self {
            vehicles,
            requests,
            behaviour_template,
            queue,
            last_event_time: 0.0,
            traveller_for_request: HashMap::new(),
        }
    }

    /// Runs every event to exhaustion (§4.6 steps 1-6).
    pub fn run(&mut self, ctx: &mut SimulationContext) -> Result<(), SkimError> {
        loop {
            let Some(t) = self.queue.peek_time() else {
                if ctx.any_ride_active() {
                    self.queue.push_tick(self.last_event_time + ctx.refresh_secs);
                    continue;
                }
                break;
            };

            let dt = t - self.last_event_time;
            if dt > 0.0 {
                advance_all(ctx, dt)?;
                self.last_event_time = t;
            }

            let event = self.queue.pop().expect("peeked event must still be present");
            match event.kind {
                EventKind::NewVehicle => {
                    self.handle_new_vehicle(ctx, event.vehicle_row.expect("NewVehicle carries a vehicle_row"));
                }
                EventKind::Request => {
                    self.handle_request(ctx, event.request_row.expect("Request carries a request_row"), t)?;
                }
                EventKind::Tick => {}
            }

            for vehicle in ctx.vehicles.iter_mut() {
                if vehicle.end_time <= t {
                    vehicle.available = false;
                }
            }

            if self.queue.is_empty() && !ctx.any_ride_active() {
                break;
            }
        }
        Ok(())
    }

    fn handle_new_vehicle(&mut self, ctx: &mut SimulationContext, row: usize) {
        let spec = &self.vehicles[row];
        let vehicle = Vehicle::new(
            VehicleId(0),
            spec.operator.clone(),
            spec.vehicle_type.clone(),
            spec.origin,
            spec.start_time_secs,
            spec.end_time_secs,
            spec.speed,
            spec.capacity,
        );
        ctx.spawn_vehicle(vehicle);
    }

    fn handle_request(&mut self, ctx: &mut SimulationContext, row: usize, now: f64) -> Result<(), SkimError> {
        let spec = self.requests[row].clone_for_event();
        let traveller_id = match self.traveller_for_request.get(&row) {
            Some(&id) => id,
            None => {
                // §7 UnknownNode: a request naming a node absent from the skim is fatal only for
                // that request, never for the whole run.
                let trip_length = match ctx.skim.distance(&[spec.origin, spec.destination]) {
                    Ok(length) => length,
                    Err(SkimError::UnknownNode(node)) => {
                        warn!(row, node = %node, "request references an unknown node, discarding");
                        return Ok(());
                    }
                    Err(err) => return Err(err),
                };
                let taxi_only_operator = ctx.dispatchers.get(&spec.operator).map(|d| d.taxi_only).unwrap_or(false);
                let service_kind = if taxi_only_operator { ServiceKind::Taxi } else { spec.service_kind };
                let traveller = Traveller::new(
                    TravellerId(0),
                    RequestDetails {
                        origin: spec.origin,
                        destination: spec.destination,
                        request_time: spec.request_time_secs,
                        service_kind,
                        trip_length: Some(trip_length),
                    },
                    self.behaviour_template.clone(),
                );
                let id = ctx.spawn_traveller(traveller);
                self.traveller_for_request.insert(row, id);
                id
            }
        };

        if ctx.traveller(traveller_id).is_resigned() {
            return Ok(());
        }

        let operator = spec.operator.clone();
        let assigned = {
            let SimulationContext {
                skim,
                vehicles,
                rides,
                travellers,
                dispatchers,
                ..
            } = ctx;
            let Some(dispatcher) = dispatchers.get_mut(&operator) else {
                return Ok(());
            };
            let service_kind = travellers[traveller_id.0].request.service_kind;

            match service_kind {
                ServiceKind::Taxi => {
                    let candidate = dispatcher.taxi_utility(
                        vehicles,
                        &travellers[traveller_id.0],
                        skim,
                        TaxiUtilityOptions { only_taxi: true },
                    )?;
                    match candidate {
                        Some(candidate) => {
                            let ride = dispatcher.assign_taxi(vehicles, rides, &mut travellers[traveller_id.0], &candidate, false, skim)?;
                            info!(traveller = %traveller_id, ride = %ride, operator = %operator, "assigned taxi ride");
                            true
                        }
                        None => false,
                    }
                }
                ServiceKind::Pool => {
                    let result = dispatcher.pool_utility(
                        vehicles,
                        rides,
                        travellers,
                        &travellers[traveller_id.0],
                        skim,
                        PoolUtilityOptions::default(),
                    )?;
                    if !result.candidates.is_empty() {
                        let ride = dispatcher.assign_pool(vehicles, rides, travellers, traveller_id, result, skim)?;
                        info!(traveller = %traveller_id, ride = %ride, operator = %operator, "assigned pool ride");
                        true
                    } else if let Some(fallback) = result.taxi_fallback {
                        let ride = dispatcher.assign_taxi(vehicles, rides, &mut travellers[traveller_id.0], &fallback, true, skim)?;
                        info!(traveller = %traveller_id, ride = %ride, operator = %operator, "assigned pool fallback as solo ride");
                        true
                    } else {
                        false
                    }
                }
            }
        };

        if !assigned {
            self.defer_or_resign(ctx, traveller_id, row, now);
        }
        Ok(())
    }

    /// Adds `refresh_secs` to the traveller's accumulated waiting; resigns them if that exceeds
    /// their tolerance, otherwise re-enqueues the same request row `refresh_secs` later (§4.6
    /// deferral rule).
    fn defer_or_resign(&mut self, ctx: &mut SimulationContext, traveller_id: TravellerId, row: usize, now: f64) {
        let refresh = ctx.refresh_secs;
        let traveller = ctx.traveller_mut(traveller_id);
        traveller.service.accumulated_waiting += refresh;
        if traveller.service.accumulated_waiting > traveller.behaviour.max_waiting_secs {
            traveller.resign();
            info!(traveller = %traveller_id, waited = traveller.service.accumulated_waiting, "traveller resigned");
        } else {
            debug!(traveller = %traveller_id, retry_at = now + refresh, "deferring request");
            self.queue.push_request(now + refresh, row);
        }
    }
}

/// Advances every active ride's vehicle by `dt` (§4.6 step 2).
fn advance_all(ctx: &mut SimulationContext, dt: f64) -> Result<(), SkimError> {
    let ride_ids = ctx.active_ride_ids();
    let SimulationContext {
        skim,
        vehicles,
        rides,
        travellers,
        ..
    } = ctx;
    for ride_id in ride_ids {
        let ride = &mut rides[ride_id.0];
        let vehicle_id = ride.common().serving_vehicle;
        let vehicle = &mut vehicles[vehicle_id.0];
        mover::advance(vehicle, ride, skim, dt, MoverOptions::default(), travellers)?;
    }
    Ok(())
}

impl ResolvedRequest {
    /// Cheap clone of the fields needed once a request event fires; avoids holding a borrow of
    /// `self.requests` across the mutable `ctx` operations below.
    fn clone_for_event(&self) -> RequestEventSpec {
        RequestEventSpec {
            origin: self.origin,
            destination: self.destination,
            request_time_secs: self.request_time_secs,
            service_kind: self.service_kind,
            operator: self.operator.clone(),
        }
    }
}

struct RequestEventSpec {
    origin: crate::ids::Node,
    destination: crate::ids::Node,
    request_time_secs: f64,
    service_kind: ServiceKind,
    operator: OperatorId,
}
