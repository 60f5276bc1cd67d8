//! Arena indices. Vehicles, rides and travellers live in flat `Vec`s owned by
//! [`crate::context::SimulationContext`]; dispatchers and rides hold these indices rather than
//! owning references, matching spec.md §9's "arena+index" guidance.

use std::fmt;

macro_rules! arena_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(pub usize);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

arena_id!(VehicleId);
arena_id!(RideId);
arena_id!(TravellerId);

/// An operator (dispatcher) is identified by the string id used in `fares_config` /
/// `operating_costs` / the `operator` columns of the tabular input.
pub type OperatorId = String;

/// A road-graph node identifier (spec.md §3). Newtype over the raw id so it can't be
/// confused with a [`VehicleId`]/[`RideId`]/[`TravellerId`] at call sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct Node(pub u64);

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
