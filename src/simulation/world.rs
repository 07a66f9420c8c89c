//! Simulation world that ties everything together
//!
//! Builds the fleet, the arrival queue and the bridge, starts one agent
//! thread per vehicle and supervises them until shutdown.

use anyhow::{anyhow, bail, Context, Result};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use log::{error, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use super::agent::{SimContext, VehicleAgent};
use super::bridge::{Bridge, CrossingEvent};
use super::config::SimConfig;
use super::queue::ArrivalQueue;
use super::reporter::Reporter;
use super::types::{City, Direction, Vehicle, VehicleId};

/// Totals gathered when the simulation shuts down cleanly
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimSummary {
    pub vehicles: usize,
    pub crossings_a_to_b: u64,
    pub crossings_b_to_a: u64,
}

impl SimSummary {
    pub fn total_crossings(&self) -> u64 {
        self.crossings_a_to_b + self.crossings_b_to_a
    }

    pub fn log(&self) {
        info!("=== SIMULATION COMPLETE ===");
        info!("Vehicles: {}", self.vehicles);
        info!("Crossings A->B: {}", self.crossings_a_to_b);
        info!("Crossings B->A: {}", self.crossings_b_to_a);
        info!("Total crossings: {}", self.total_crossings());
    }
}

/// The bridge simulation before its agents are started
pub struct BridgeWorld {
    context: Arc<SimContext>,
    rng: StdRng,
}

impl BridgeWorld {
    fn new_internal(
        config: SimConfig,
        reporter: Reporter,
        homes: Option<Vec<City>>,
        events: Option<Sender<CrossingEvent>>,
    ) -> Result<Self> {
        config.validate()?;

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let homes = match homes {
            Some(homes) => {
                if homes.len() != config.vehicles {
                    bail!(
                        "{} home cities given for {} vehicles",
                        homes.len(),
                        config.vehicles
                    );
                }
                homes
            }
            None => (0..config.vehicles)
                .map(|_| if rng.random_bool(0.5) { City::A } else { City::B })
                .collect(),
        };

        let fleet: Vec<Arc<Vehicle>> = homes
            .into_iter()
            .enumerate()
            .map(|(index, home)| Arc::new(Vehicle::new(VehicleId(index), home)))
            .collect();

        let queue = Arc::new(ArrivalQueue::with_capacity(config.vehicles));
        let bridge = match events {
            Some(events) => Bridge::with_events(queue, events),
            None => Bridge::new(queue),
        };

        Ok(Self {
            context: Arc::new(SimContext {
                config,
                fleet,
                bridge,
                reporter,
            }),
            rng,
        })
    }

    pub fn new(config: SimConfig, reporter: Reporter) -> Result<Self> {
        Self::new_internal(config, reporter, None, None)
    }

    /// Create a world whose bridge publishes every transition on `events`
    pub fn with_events(
        config: SimConfig,
        reporter: Reporter,
        events: Sender<CrossingEvent>,
    ) -> Result<Self> {
        Self::new_internal(config, reporter, None, Some(events))
    }

    /// Create a world with the given home city for each vehicle, in id order
    pub fn with_homes(
        config: SimConfig,
        reporter: Reporter,
        homes: Vec<City>,
        events: Option<Sender<CrossingEvent>>,
    ) -> Result<Self> {
        Self::new_internal(config, reporter, Some(homes), events)
    }

    pub fn context(&self) -> &Arc<SimContext> {
        &self.context
    }

    /// Print one line per vehicle as the fleet fills the two cities
    pub fn report_fleet(&self) -> Result<()> {
        let fleet = &self.context.fleet;
        for created in 1..=fleet.len() {
            self.context
                .reporter
                .report(&self.context.bridge, &fleet[..created])?;
        }
        Ok(())
    }

    /// Spawn one agent thread per vehicle
    pub fn start(mut self) -> Result<RunningWorld> {
        let (shutdown_tx, shutdown_rx) = crossbeam_channel::bounded::<()>(0);
        let (finished_tx, finished_rx) = crossbeam_channel::unbounded();
        let mut handles = Vec::with_capacity(self.context.fleet.len());

        for vehicle in &self.context.fleet {
            let id = vehicle.id;
            let agent = VehicleAgent::new(
                Arc::clone(vehicle),
                Arc::clone(&self.context),
                StdRng::seed_from_u64(self.rng.random()),
                shutdown_rx.clone(),
            );
            let finished = finished_tx.clone();

            let handle = thread::Builder::new()
                .name(format!("vehicle-{}", id))
                .spawn(move || {
                    let result = agent.run();
                    if let Err(err) = &result {
                        error!("Agent for vehicle {} failed: {:#}", id, err);
                    }
                    // The supervisor may already be gone after a failure
                    let _ = finished.send((id, result));
                })
                .with_context(|| format!("failed to spawn agent thread for vehicle {}", id))?;
            handles.push(handle);
        }

        info!("Started {} vehicle agents", handles.len());

        Ok(RunningWorld {
            context: self.context,
            shutdown: Some(shutdown_tx),
            finished: finished_rx,
            handles,
        })
    }
}

/// A simulation whose agents are running
pub struct RunningWorld {
    context: Arc<SimContext>,
    /// Dropping this sender asks every agent to stop
    shutdown: Option<Sender<()>>,
    finished: Receiver<(VehicleId, Result<u64>)>,
    handles: Vec<JoinHandle<()>>,
}

impl RunningWorld {
    pub fn context(&self) -> &Arc<SimContext> {
        &self.context
    }

    /// Supervise the agents, forever or for `limit`, then shut down
    ///
    /// Agents never stop on their own, so any agent finishing early is an
    /// error and is returned immediately.
    pub fn run_for(self, limit: Option<Duration>) -> Result<SimSummary> {
        let deadline = limit.map(|limit| Instant::now() + limit);
        let (id, result) = match deadline {
            Some(deadline) => match self.finished.recv_deadline(deadline) {
                Ok(message) => message,
                Err(RecvTimeoutError::Timeout) => return self.shutdown(),
                Err(RecvTimeoutError::Disconnected) => bail!("all vehicle agents are gone"),
            },
            None => self
                .finished
                .recv()
                .map_err(|_| anyhow!("all vehicle agents are gone"))?,
        };

        result.with_context(|| format!("agent for vehicle {} failed", id))?;
        bail!("agent for vehicle {} stopped unexpectedly", id)
    }

    /// Ask every agent to stop and wait for them
    ///
    /// Crossings in progress complete first, so the bridge ends up free.
    pub fn shutdown(mut self) -> Result<SimSummary> {
        info!("Shutting down {} vehicle agents", self.handles.len());
        drop(self.shutdown.take());

        for _ in 0..self.handles.len() {
            let (id, result) = self
                .finished
                .recv()
                .map_err(|_| anyhow!("vehicle agent exited without reporting"))?;
            result.with_context(|| format!("agent for vehicle {} failed", id))?;
        }

        for handle in self.handles.drain(..) {
            handle
                .join()
                .map_err(|_| anyhow!("vehicle agent thread panicked"))?;
        }

        let stats = self.context.bridge.stats();
        Ok(SimSummary {
            vehicles: self.context.fleet.len(),
            crossings_a_to_b: stats.completed(Direction::AToB),
            crossings_b_to_a: stats.completed(Direction::BToA),
        })
    }
}
