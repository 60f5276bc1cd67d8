//! `dispatch_core`: a discrete-event ride-hailing dispatch and pooling simulation.
//!
//! The simulation advances a single chronological event queue (vehicle arrivals, ride
//! requests, and forced refresh ticks; see [`runner`]) that drives vehicles along shortest
//! paths over a static road-network [`skim::Skim`], matched by per-operator [`dispatcher`]s
//! that weigh taxi dispatch against inserting a new traveller into an ongoing pool ride.

pub mod clock;
pub mod combo;
pub mod config;
pub mod context;
pub mod dispatcher;
pub mod errors;
pub mod ids;
pub mod input;
pub mod mover;
pub mod report;
pub mod ride;
pub mod runner;
pub mod skim;
pub mod stop;
pub mod traveller;
pub mod vehicle;
