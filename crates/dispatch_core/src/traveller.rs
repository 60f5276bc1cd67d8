//! Traveller (§3): a per-request agent with behavioural preferences, service state, and
//! per-mode utility/distance bookkeeping.

use std::collections::HashMap;

use crate::ids::{Node, TravellerId};

/// `taxi` or `pool`, as requested (`serviceKind`, §3) and as configured per-operator
/// (`taxi_operators`, §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceKind {
    Taxi,
    Pool,
}

impl ServiceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ServiceKind::Taxi => "taxi",
            ServiceKind::Pool => "pool",
        }
    }
}

/// `(origin, destination, requestTime, serviceKind, tripLength?)` (§3).
#[derive(Debug, Clone)]
pub struct RequestDetails {
    pub origin: Node,
    pub destination: Node,
    pub request_time: f64,
    pub service_kind: ServiceKind,
    /// Computed once, at arrival, from origin->destination over the Skim (§3 invariant).
    pub trip_length: Option<f64>,
}

/// `behavioural_config` per traveller (§6): value-of-time, pickup-delay sensitivity, pool
/// sharing-penalty table, and waiting/pickup tolerances.
#[derive(Debug, Clone)]
pub struct Behaviour {
    /// Money-per-second conversion of delay into disutility.
    pub value_of_time: f64,
    pub pickup_delay_sensitivity: f64,
    pub max_pickup_secs: f64,
    pub max_waiting_secs: f64,
    /// Penalty-for-sharing multiplier keyed by co-rider count `N` (including self).
    pub penalty_for_sharing: HashMap<u32, f64>,
    pub penalty_for_sharing_const: f64,
}

impl Behaviour {
    /// `PfS[N]`, defaulting to `1.0` (no extra penalty) for `N` outside the configured table,
    /// so a pool ride larger than the configured table still produces a (conservative) utility
    /// rather than a lookup failure.
    pub fn penalty_for_sharing(&self, co_riders: u32) -> f64 {
        self.penalty_for_sharing
            .get(&co_riders)
            .copied()
            .unwrap_or(1.0)
    }
}

/// `(resigned, accumulatedWaiting, pickupDelay?)` (§3).
#[derive(Debug, Clone, Default)]
pub struct ServiceDetails {
    pub resigned: bool,
    pub accumulated_waiting: f64,
    pub pickup_delay: Option<f64>,
}

/// A traveller's per-mode distance travelled accumulates as they ride (used for
/// `traveller_results.txt`'s requested-vs-actual comparison).
#[derive(Debug, Clone, Default)]
pub struct ModeCounters {
    pub taxi_distance: f64,
    pub pool_distance: f64,
}

#[derive(Debug, Clone)]
pub struct Traveller {
    pub id: TravellerId,
    pub request: RequestDetails,
    pub behaviour: Behaviour,
    pub service: ServiceDetails,
    /// Per-mode utility (§3), keyed by `"taxi"`/`"pool"`.
    pub utilities: HashMap<&'static str, f64>,
    pub distances: ModeCounters,
}

impl Traveller {
    pub fn new(id: TravellerId, request: RequestDetails, behaviour: Behaviour) -> Self {
        Self {
            id,
            request,
            behaviour,
            service: ServiceDetails::default(),
            utilities: HashMap::new(),
            distances: ModeCounters::default(),
        }
    }

    /// Marks the traveller withdrawn after their accumulated waiting exceeds `maxWaiting`
    /// (§7 `Resigned`).
    pub fn resign(&mut self) {
        self.service.resigned = true;
    }

    pub fn is_resigned(&self) -> bool {
        self.service.resigned
    }
}
