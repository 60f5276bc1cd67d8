//! Vehicle Mover (C4, §4.4): advances one (vehicle, ride) pair by a time budget, firing
//! pickup/dropoff/assignment events at node boundaries.

use crate::errors::SkimError;
use crate::ride::Ride;
use crate::skim::Skim;
use crate::stop::StopKind;
use crate::traveller::Traveller;
use crate::vehicle::Vehicle;

/// Whether a pool vehicle frees a seat per dropoff, or only once every onboard traveller has
/// been dropped off (§4.4, §9 open question: default is "freed per dropoff").
#[derive(Debug, Clone, Copy)]
pub struct MoverOptions {
    pub pool_capacity_freed_per_dropoff: bool,
}

impl Default for MoverOptions {
    fn default() -> Self {
        Self {
            pool_capacity_freed_per_dropoff: true,
        }
    }
}

/// Advances `vehicle`/`ride` by `dt` seconds, mutating both plus the travellers named in the
/// ride's stop sequence. `travellers` is the simulation-wide traveller arena, indexed by
/// [`crate::ids::TravellerId`], for distance bookkeeping during `checkEvents`.
pub fn advance(
    vehicle: &mut Vehicle,
    ride: &mut Ride,
    skim: &Skim,
    dt: f64,
    options: MoverOptions,
    travellers: &mut [Traveller],
) -> Result<(), SkimError> {
    let mut remaining = dt;

    while vehicle.path.current_path.is_some() {
        let closest = vehicle.path.closest_crossroad.expect("invariant: path implies crossroad");
        let segment_len = skim.deadhead(vehicle.path.current_position, closest)?;
        let tau = segment_len / vehicle.speed - vehicle.path.time_between_crossroads;

        if remaining < tau {
            vehicle.path.time_between_crossroads += remaining;
            vehicle.path.current_time += remaining;
            vehicle.path.to_closest_crossroads = Some(tau - remaining);
            check_events(vehicle, ride, options);
            break;
        }

        check_events(vehicle, ride, options);

        vehicle.path.mileage += segment_len;
        remaining -= tau;
        vehicle.path.current_time += tau;

        if let Some(path) = vehicle.path.current_path.as_mut() {
            path.remove(0);
        }
        vehicle.path.current_position = closest;
        vehicle.path.time_between_crossroads = 0.0;

        for traveller_id in &vehicle.travellers {
            if let Some(traveller) = travellers.get_mut(traveller_id.0) {
                match ride {
                    Ride::Taxi(_) => traveller.distances.taxi_distance += segment_len,
                    Ride::Pool(_) => traveller.distances.pool_distance += segment_len,
                }
            }
        }

        check_events(vehicle, ride, options);

        let remaining_path_len = vehicle.path.current_path.as_ref().map(|p| p.len()).unwrap_or(0);
        if remaining_path_len <= 1 {
            vehicle.path.current_path = None;
            vehicle.path.closest_crossroad = None;
            vehicle.path.stationary = true;
            vehicle.path.to_closest_crossroads = None;
            vehicle.available = true;
            ride.common_mut().active = false;
        } else {
            vehicle.path.closest_crossroad = vehicle.path.current_path.as_ref().map(|p| p[1]);
        }

        check_events(vehicle, ride, options);
    }

    if vehicle.path.current_time >= vehicle.end_time {
        vehicle.available = false;
    }

    Ok(())
}

/// Fires pickup/dropoff/assignment side-effects for every stop whose node equals the
/// vehicle's current position (§4.4). Invoked before, during, and after every node-boundary
/// crossing, so a stop coincident with any of those moments is processed in the right order.
fn check_events(vehicle: &mut Vehicle, ride: &mut Ride, options: MoverOptions) {
    let here = vehicle.path.current_position;

    while let Some(idx) = ride.common().destination_points.iter().position(|stop| stop.node == here) {
        let stop = ride.common_mut().destination_points.remove(idx);
        let time = vehicle.path.current_time;

        match stop.kind {
            StopKind::Origin => {
                if let Some(pos) = vehicle.scheduled_travellers.iter().position(|t| *t == stop.traveller) {
                    vehicle.scheduled_travellers.remove(pos);
                }
                vehicle.travellers.push(stop.traveller);
                vehicle.path.events.push((time, here, stop.kind, stop.traveller));
                ride.common_mut().events.push((time, here, stop.kind, stop.traveller));
            }
            StopKind::Destination => {
                if let Some(pos) = vehicle.travellers.iter().position(|t| *t == stop.traveller) {
                    vehicle.travellers.remove(pos);
                }
                vehicle.path.events.push((time, here, stop.kind, stop.traveller));
                let common = ride.common_mut();
                common.events.push((time, here, stop.kind, stop.traveller));
                if let Some(pos) = common.travellers.iter().position(|t| *t == stop.traveller) {
                    common.travellers.remove(pos);
                }
                if options.pool_capacity_freed_per_dropoff {
                    vehicle.available = true;
                }
            }
            StopKind::Assignment => {
                vehicle.scheduled_travellers.push(stop.traveller);
            }
        }

        for combination in ride_admissible_combinations_mut(ride) {
            combination.retain(|s| !(s.node == here && s.traveller == stop.traveller && s.kind == stop.kind));
        }

        let common = ride.common_mut();
        common.past_destination_points.push(stop);
        if common.destination_points.is_empty() {
            common.active = false;
        }
    }
}

fn ride_admissible_combinations_mut(ride: &mut Ride) -> &mut [Vec<crate::stop::Stop>] {
    match ride {
        Ride::Taxi(_) => &mut [],
        Ride::Pool(p) => &mut p.admissible_combinations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{RideId, TravellerId, VehicleId};
    use crate::skim::RoadGraph;
    use crate::stop::Stop;
    use crate::ids::Node;
    use crate::traveller::{Behaviour, RequestDetails, ServiceKind};
    use std::collections::HashMap;

    fn line_skim() -> Skim {
        let mut g = RoadGraph::new();
        g.add_edge(Node(1), Node(2), 1000.0);
        g.add_edge(Node(2), Node(1), 1000.0);
        g.add_edge(Node(2), Node(3), 1000.0);
        g.add_edge(Node(3), Node(2), 1000.0);
        Skim::from_graph(g)
    }

    fn behaviour() -> Behaviour {
        Behaviour {
            value_of_time: 0.1,
            pickup_delay_sensitivity: 1.0,
            max_pickup_secs: 600.0,
            max_waiting_secs: 600.0,
            penalty_for_sharing: HashMap::new(),
            penalty_for_sharing_const: 0.0,
        }
    }

    #[test]
    fn scenario_1_single_taxi_moves_and_drops_off() {
        let skim = line_skim();
        let mut vehicle = Vehicle::new(
            VehicleId(0),
            "op".into(),
            "taxi".into(),
            Node(1),
            0.0,
            3600.0,
            1.0,
            1,
        );
        let traveller_id = TravellerId(0);
        let mut ride = Ride::Taxi(crate::ride::TaxiRide::new(RideId(0), vehicle.id, traveller_id, Node(1), Node(3)));
        ride.common_mut().destination_points = vec![Stop::origin(Node(1), traveller_id), Stop::destination(Node(3), traveller_id)];
        vehicle.scheduled_travellers.push(traveller_id);
        vehicle.set_path(skim.path(&[Node(1), Node(3)]).unwrap());

        let mut traveller = Traveller::new(
            traveller_id,
            RequestDetails {
                origin: Node(1),
                destination: Node(3),
                request_time: 5.0,
                service_kind: ServiceKind::Taxi,
                trip_length: Some(2000.0),
            },
            behaviour(),
        );

        advance(&mut vehicle, &mut ride, &skim, 2000.0, MoverOptions::default(), std::slice::from_mut(&mut traveller)).unwrap();

        assert_eq!(vehicle.path.mileage, 2000.0);
        assert!(!ride.is_active());
        assert!(vehicle.travellers.is_empty());
        assert!(vehicle.path.stationary);
    }

    #[test]
    fn move_then_move_equals_single_move() {
        let skim = line_skim();
        let make_vehicle = || {
            let mut v = Vehicle::new(VehicleId(0), "op".into(), "taxi".into(), Node(1), 0.0, 3600.0, 1.0, 1);
            v.set_path(skim.path(&[Node(1), Node(3)]).unwrap());
            v
        };
        let traveller_id = TravellerId(0);
        let make_ride = || {
            let mut r = Ride::Taxi(crate::ride::TaxiRide::new(RideId(0), VehicleId(0), traveller_id, Node(1), Node(3)));
            r.common_mut().destination_points = vec![Stop::destination(Node(3), traveller_id)];
            r
        };

        let mut v1 = make_vehicle();
        let mut r1 = make_ride();
        let mut t1 = Traveller::new(
            traveller_id,
            RequestDetails { origin: Node(1), destination: Node(3), request_time: 0.0, service_kind: ServiceKind::Taxi, trip_length: Some(2000.0) },
            behaviour(),
        );
        advance(&mut v1, &mut r1, &skim, 700.0, MoverOptions::default(), std::slice::from_mut(&mut t1)).unwrap();
        advance(&mut v1, &mut r1, &skim, 300.0, MoverOptions::default(), std::slice::from_mut(&mut t1)).unwrap();

        let mut v2 = make_vehicle();
        let mut r2 = make_ride();
        let mut t2 = Traveller::new(
            traveller_id,
            RequestDetails { origin: Node(1), destination: Node(3), request_time: 0.0, service_kind: ServiceKind::Taxi, trip_length: Some(2000.0) },
            behaviour(),
        );
        advance(&mut v2, &mut r2, &skim, 1000.0, MoverOptions::default(), std::slice::from_mut(&mut t2)).unwrap();

        assert_eq!(v1.path.mileage, v2.path.mileage);
        assert_eq!(v1.path.current_position, v2.path.current_position);
        assert_eq!(v1.path.current_time, v2.path.current_time);
    }
}
