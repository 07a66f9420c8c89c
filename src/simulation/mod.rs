//! Standalone one-lane bridge simulation
//!
//! This module contains the concurrency core: the arrival queue, the bridge
//! controller, the vehicle agents and the state reporter. It runs without any
//! console front-end so it can be driven directly from tests.

mod agent;
mod bridge;
mod config;
mod queue;
mod reporter;
mod types;
mod world;

pub use agent::{SimContext, VehicleAgent};
pub use bridge::{Bridge, BridgeState, Crossing, CrossingEvent, CrossingStats};
pub use config::SimConfig;
pub use queue::{ArrivalQueue, QueueView};
pub use reporter::{BridgeSnapshot, Reporter};
pub use types::{
    City, Direction, Vehicle, VehicleId, CROSSING_TIME, DEFAULT_VEHICLES, MAX_VEHICLES,
    MAX_WANDER_TIME, MIN_WANDER_TIME,
};
pub use world::{BridgeWorld, RunningWorld, SimSummary};
