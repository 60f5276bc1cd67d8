//! Discrete-event scheduler (C6 support, §4.6): a min-heap ordered by `(time, kind)`, kind
//! order breaking same-timestamp ties (`NewVehicle < Request < Tick`). Grounded on the
//! teacher's `clock.rs` `BinaryHeap`-of-`Event` pattern, specialized to spec.md §4.6's three
//! event kinds instead of the teacher's twelve.

use std::cmp::Ordering;
use std::collections::BinaryHeap;


#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EventKind {
    NewVehicle,
    Request,
    Tick,
}

/// The row index this event was built from, so original input order is preserved among
/// same-kind, same-timestamp events (§4.6 determinism rule).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Event {
    pub time_secs: f64,
    pub kind: EventKind,
    pub sequence: u64,
    pub vehicle_row: Option<usize>,
    pub request_row: Option<usize>,
}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Eq for Event {}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap by (time, kind, original order): BinaryHeap is a max-heap, so reverse.
        other
            .time_secs
            .partial_cmp(&self.time_secs)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.kind.cmp(&self.kind))
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

/// Min-heap of scheduled [`Event`]s plus a monotonically increasing sequence counter used to
/// preserve original input order among equal `(time, kind)` events.
#[derive(Debug, Default)]
pub struct EventQueue {
    heap: BinaryHeap<Event>,
    next_sequence: u64,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_new_vehicle(&mut self, time_secs: f64, row: usize) {
        self.push(time_secs, EventKind::NewVehicle, Some(row), None);
    }

    pub fn push_request(&mut self, time_secs: f64, row: usize) {
        self.push(time_secs, EventKind::Request, None, Some(row));
    }

    pub fn push_tick(&mut self, time_secs: f64) {
        self.push(time_secs, EventKind::Tick, None, None);
    }

    fn push(&mut self, time_secs: f64, kind: EventKind, vehicle_row: Option<usize>, request_row: Option<usize>) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.heap.push(Event {
            time_secs,
            kind,
            sequence,
            vehicle_row,
            request_row,
        });
    }

    pub fn peek_time(&self) -> Option<f64> {
        self.heap.peek().map(|e| e.time_secs)
    }

    pub fn pop(&mut self) -> Option<Event> {
        self.heap.pop()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_timestamp_orders_new_vehicle_before_request_before_tick() {
        let mut q = EventQueue::new();
        q.push_tick(10.0);
        q.push_request(10.0, 0);
        q.push_new_vehicle(10.0, 0);

        assert_eq!(q.pop().unwrap().kind, EventKind::NewVehicle);
        assert_eq!(q.pop().unwrap().kind, EventKind::Request);
        assert_eq!(q.pop().unwrap().kind, EventKind::Tick);
    }

    #[test]
    fn same_kind_preserves_input_order() {
        let mut q = EventQueue::new();
        q.push_request(5.0, 3);
        q.push_request(5.0, 1);
        q.push_request(5.0, 2);

        assert_eq!(q.pop().unwrap().request_row, Some(3));
        assert_eq!(q.pop().unwrap().request_row, Some(1));
        assert_eq!(q.pop().unwrap().request_row, Some(2));
    }
}
