//! Combination Enumerator (C2, §4.2): feasible insertions of a new traveller's origin/
//! destination into an existing pool ride's admissible stop orderings.

use crate::errors::SkimError;
use crate::ids::{Node, TravellerId};
use crate::skim::Skim;
use crate::stop::{Stop, StopKind};

/// Inserts `(new_origin, new_destination)` for `traveller` at every position `i < j` into each
/// of `admissible_combinations`, subject to the precedence/pickup-bound/detour-bound
/// constraints of §4.2. Returns every surviving ordering; empty if none.
///
/// `vehicle_position` anchors the pickup-bound distance (distance from the vehicle's current
/// position through the sequence prefix up to the new origin). `max_distance_pickup` and
/// `max_trip_length` are as computed by the caller per §4.2/§4.5.
pub fn enumerate_insertions(
    admissible_combinations: &[Vec<Stop>],
    vehicle_position: Node,
    traveller: TravellerId,
    new_origin: Node,
    new_destination: Node,
    max_distance_pickup: f64,
    max_trip_length: f64,
    skim: &Skim,
) -> Result<Vec<Vec<Stop>>, SkimError> {
    let mut feasible = Vec::new();
    let origin_stop = Stop::new(new_origin, StopKind::Origin, traveller);
    let destination_stop = Stop::new(new_destination, StopKind::Destination, traveller);

    for base in admissible_combinations {
        let n = base.len();
        for i in 0..=n {
            // Pickup bound only depends on the prefix up to and including the new origin, so
            // it is checked once per `i` rather than recomputed for every `j`.
            let prefix_nodes: Vec<Node> = std::iter::once(vehicle_position)
                .chain(base[..i].iter().map(|s| s.node))
                .chain(std::iter::once(new_origin))
                .collect();
            let pickup_distance = skim.distance(&prefix_nodes)?;
            if pickup_distance > max_distance_pickup {
                continue;
            }

            for j in (i + 1)..=(n + 1) {
                let mut sequence = base.clone();
                sequence.insert(i, origin_stop);
                sequence.insert(j, destination_stop);

                let full_nodes: Vec<Node> = std::iter::once(vehicle_position)
                    .chain(sequence.iter().map(|s| s.node))
                    .collect();
                let total_distance = skim.distance(&full_nodes)?;
                if total_distance > max_trip_length {
                    continue;
                }

                feasible.push(sequence);
            }
        }
    }

    Ok(feasible)
}

/// Every origin precedes its paired destination (§3, §4.2 precedence, §8 universal invariant).
/// A destination with no origin in `sequence` is not a violation: it means the traveller was
/// already picked up, so only `(d, t)` remains in the admissible combination.
pub fn respects_precedence(sequence: &[Stop]) -> bool {
    use std::collections::HashMap;
    let mut origin_index: HashMap<TravellerId, usize> = HashMap::new();
    for (i, stop) in sequence.iter().enumerate() {
        if matches!(stop.kind, StopKind::Origin | StopKind::Assignment) {
            origin_index.insert(stop.traveller, i);
        }
    }
    for (i, stop) in sequence.iter().enumerate() {
        if stop.kind == StopKind::Destination {
            if let Some(&origin_i) = origin_index.get(&stop.traveller) {
                if origin_i > i {
                    return false;
                }
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::TravellerId;
    use crate::skim::RoadGraph;

    fn line_skim() -> Skim {
        // A -- B -- C -- D, 1000m per segment
        let mut g = RoadGraph::new();
        let nodes = [Node(1), Node(2), Node(3), Node(4)];
        for w in nodes.windows(2) {
            g.add_edge(w[0], w[1], 1000.0);
            g.add_edge(w[1], w[0], 1000.0);
        }
        Skim::from_graph(g)
    }

    #[test]
    fn scenario_3_pool_insertion_produces_expected_sequence() {
        // Vehicle between A(1) and B(2), carrying T1 A->D with remaining stop [(D,d,T1)].
        // New request T2 B->C. Expect sequence [(B,o,T2),(C,d,T2),(D,d,T1)].
        let skim = line_skim();
        let t1 = TravellerId(1);
        let t2 = TravellerId(2);
        let base = vec![Stop::destination(Node(4), t1)];
        let result = enumerate_insertions(
            &[base],
            Node(2), // vehicle's next crossroad, used here as its effective position
            t2,
            Node(2),
            Node(3),
            5000.0,
            10_000.0,
            &skim,
        )
        .unwrap();

        let expected = vec![
            Stop::origin(Node(2), t2),
            Stop::destination(Node(3), t2),
            Stop::destination(Node(4), t1),
        ];
        assert!(result.contains(&expected));
        for seq in &result {
            assert!(respects_precedence(seq));
        }
    }

    #[test]
    fn pickup_bound_rejects_far_insertions() {
        let skim = line_skim();
        let t1 = TravellerId(1);
        let result = enumerate_insertions(&[vec![]], Node(1), t1, Node(4), Node(4), 500.0, 10_000.0, &skim)
            .unwrap();
        assert!(result.is_empty());
    }
}
