//! Vehicle agents
//!
//! Each vehicle is driven by its own thread running an endless cycle:
//! wander around the home city, join the arrival queue, take the bridge,
//! cross, release, repeat. The agent that takes the bridge drives whichever
//! vehicle was at the head of the queue, which may not be its own.

use anyhow::Result;
use crossbeam_channel::{Receiver, RecvTimeoutError};
use log::debug;
use rand::rngs::StdRng;
use rand::Rng;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use super::bridge::{Bridge, Crossing};
use super::config::SimConfig;
use super::reporter::Reporter;
use super::types::Vehicle;

/// State shared by every agent, created once at startup
///
/// `fleet` is read-only apart from each vehicle's home city, which only the
/// agent currently driving that vehicle over the bridge writes. The queue and
/// the bridge slot are guarded by their own locks.
#[derive(Debug)]
pub struct SimContext {
    pub config: SimConfig,
    pub fleet: Vec<Arc<Vehicle>>,
    pub bridge: Bridge,
    pub reporter: Reporter,
}

impl SimContext {
    pub fn report(&self) -> Result<()> {
        self.reporter.report(&self.bridge, &self.fleet)
    }
}

/// The thread of control for one vehicle
pub struct VehicleAgent {
    vehicle: Arc<Vehicle>,
    context: Arc<SimContext>,
    rng: StdRng,
    shutdown: Receiver<()>,
    driven: u64,
}

impl VehicleAgent {
    pub fn new(
        vehicle: Arc<Vehicle>,
        context: Arc<SimContext>,
        rng: StdRng,
        shutdown: Receiver<()>,
    ) -> Self {
        Self {
            vehicle,
            context,
            rng,
            shutdown,
            driven: 0,
        }
    }

    /// Run cycles until shutdown is requested
    ///
    /// Returns how many crossings this agent drove.
    pub fn run(mut self) -> Result<u64> {
        debug!("Agent for vehicle {} started", self.vehicle.id);
        while self.cycle()? {}
        debug!(
            "Agent for vehicle {} stopped after driving {} crossings",
            self.vehicle.id, self.driven
        );
        Ok(self.driven)
    }

    /// One full trip; returns `false` once shutdown was requested
    pub fn cycle(&mut self) -> Result<bool> {
        self.context.bridge.wait_until_in_city(self.vehicle.id)?;

        if !self.wander() {
            return Ok(false);
        }

        self.context.bridge.queue().push(Arc::clone(&self.vehicle))?;
        debug!(
            "Vehicle {} queued in city {}",
            self.vehicle.id,
            self.vehicle.home()
        );
        self.context.report()?;

        let crossing = self.context.bridge.acquire_next()?;
        self.context.report()?;
        self.drive(&crossing)?;

        self.context.bridge.release()?;
        debug!(
            "Vehicle {} left the bridge into city {}",
            crossing.vehicle.id,
            crossing.direction.destination()
        );
        Ok(true)
    }

    /// Drive the granted vehicle over the bridge
    ///
    /// Not interruptible by shutdown, so the bridge is always released.
    fn drive(&mut self, crossing: &Crossing) -> Result<()> {
        debug!(
            "Agent {} driving vehicle {} {}",
            self.vehicle.id, crossing.vehicle.id, crossing.direction
        );
        thread::sleep(self.context.config.crossing_time);
        crossing.vehicle.flip_home();
        self.driven += 1;
        self.context.report()
    }

    /// Drive around the home city; returns `false` if shutdown interrupted it
    fn wander(&mut self) -> bool {
        let interval = self.wander_interval();
        debug!(
            "Vehicle {} wandering in city {} for {:?}",
            self.vehicle.id,
            self.vehicle.home(),
            interval
        );
        match self.shutdown.recv_timeout(interval) {
            Err(RecvTimeoutError::Timeout) => true,
            Ok(()) | Err(RecvTimeoutError::Disconnected) => false,
        }
    }

    fn wander_interval(&mut self) -> Duration {
        let min = self.context.config.min_wander.as_millis() as u64;
        let max = self.context.config.max_wander.as_millis() as u64;
        Duration::from_millis(self.rng.random_range(min..=max))
    }
}
