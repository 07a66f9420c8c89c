//! One-Lane Bridge Simulation Library
//!
//! Vehicles shuttle between two cities over a bridge that fits one vehicle
//! at a time, served in arrival order.

pub mod simulation;
