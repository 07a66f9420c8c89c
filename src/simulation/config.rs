//! Simulation configuration

use anyhow::{bail, Result};
use std::time::Duration;

use super::types::{
    CROSSING_TIME, DEFAULT_VEHICLES, MAX_VEHICLES, MAX_WANDER_TIME, MIN_WANDER_TIME,
};

/// Everything needed to start a bridge simulation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimConfig {
    /// Number of vehicles, fixed for the lifetime of the simulation
    pub vehicles: usize,
    /// List the queued ids per direction under every report line
    pub verbose: bool,
    /// Time spent on the bridge
    pub crossing_time: Duration,
    /// Bounds (inclusive) of the time spent driving around a city
    pub min_wander: Duration,
    pub max_wander: Duration,
    /// Seed for reproducible home cities and wander times
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            vehicles: DEFAULT_VEHICLES,
            verbose: false,
            crossing_time: CROSSING_TIME,
            min_wander: MIN_WANDER_TIME,
            max_wander: MAX_WANDER_TIME,
            seed: None,
        }
    }
}

impl SimConfig {
    pub fn with_vehicles(vehicles: usize) -> Self {
        Self {
            vehicles,
            ..Self::default()
        }
    }

    /// Check the configuration before any vehicle is created
    pub fn validate(&self) -> Result<()> {
        if self.vehicles < 1 {
            bail!("there must be at least one vehicle");
        }
        if self.vehicles > MAX_VEHICLES {
            bail!(
                "too many vehicles: {} (at most {} are supported)",
                self.vehicles,
                MAX_VEHICLES
            );
        }
        if self.min_wander > self.max_wander {
            bail!(
                "minimum wander time {:?} exceeds maximum {:?}",
                self.min_wander,
                self.max_wander
            );
        }
        Ok(())
    }
}
