//! A planned stop on a ride's remaining sequence (§3 `Stop`).

use crate::ids::{Node, TravellerId};

/// What a [`Stop`] does when the vehicle reaches its node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopKind {
    /// Pickup.
    Origin,
    /// Dropoff.
    Destination,
    /// Assignment marker: a traveller has been assigned to the vehicle but has not yet been
    /// physically picked up (recorded so ride event logs capture the commit moment itself).
    Assignment,
}

impl StopKind {
    /// The single-letter event-kind tag used in event logs and reports (`o`/`d`/`a`, §4.4,
    /// §9's reconciliation of event-kind naming).
    pub fn tag(self) -> char {
        match self {
            StopKind::Origin => 'o',
            StopKind::Destination => 'd',
            StopKind::Assignment => 'a',
        }
    }
}

/// `(node, kind, travellerId)` triple (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stop {
    pub node: Node,
    pub kind: StopKind,
    pub traveller: TravellerId,
}

impl Stop {
    pub fn new(node: Node, kind: StopKind, traveller: TravellerId) -> Self {
        Self {
            node,
            kind,
            traveller,
        }
    }

    pub fn origin(node: Node, traveller: TravellerId) -> Self {
        Self::new(node, StopKind::Origin, traveller)
    }

    pub fn destination(node: Node, traveller: TravellerId) -> Self {
        Self::new(node, StopKind::Destination, traveller)
    }
}
