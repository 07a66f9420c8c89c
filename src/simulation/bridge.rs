//! Bridge controller for the simulation
//!
//! The bridge is a single exclusive slot guarded by one lock and a condition
//! variable. The lock is only held while the slot changes hands, never for the
//! crossing itself. Whenever both locks are needed the bridge lock is taken
//! first and the arrival queue lock second.

use anyhow::{anyhow, bail, Context, Result};
use crossbeam_channel::Sender;
use log::trace;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::Instant;

use super::queue::ArrivalQueue;
use super::types::{Direction, Vehicle, VehicleId};

/// A vehicle holding the bridge, with the direction it was granted
#[derive(Debug, Clone)]
pub struct Crossing {
    pub vehicle: Arc<Vehicle>,
    pub direction: Direction,
}

/// Occupancy of the bridge slot
#[derive(Debug, Clone, Default)]
pub enum BridgeState {
    #[default]
    Free,
    Occupied(Crossing),
}

impl BridgeState {
    pub fn crossing(&self) -> Option<&Crossing> {
        match self {
            BridgeState::Free => None,
            BridgeState::Occupied(crossing) => Some(crossing),
        }
    }

    fn is_held_by(&self, id: VehicleId) -> bool {
        self.crossing()
            .is_some_and(|crossing| crossing.vehicle.id == id)
    }
}

/// A bridge transition, published while the bridge lock is held
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossingEvent {
    Acquired {
        vehicle: VehicleId,
        direction: Direction,
        at: Instant,
    },
    Released {
        vehicle: VehicleId,
        direction: Direction,
        at: Instant,
    },
}

impl CrossingEvent {
    pub fn vehicle(&self) -> VehicleId {
        match self {
            CrossingEvent::Acquired { vehicle, .. } | CrossingEvent::Released { vehicle, .. } => {
                *vehicle
            }
        }
    }

    pub fn direction(&self) -> Direction {
        match self {
            CrossingEvent::Acquired { direction, .. }
            | CrossingEvent::Released { direction, .. } => *direction,
        }
    }
}

/// Completed crossings per direction
#[derive(Debug, Default)]
pub struct CrossingStats {
    a_to_b: AtomicU64,
    b_to_a: AtomicU64,
}

impl CrossingStats {
    fn record(&self, direction: Direction) {
        let counter = match direction {
            Direction::AToB => &self.a_to_b,
            Direction::BToA => &self.b_to_a,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn completed(&self, direction: Direction) -> u64 {
        match direction {
            Direction::AToB => self.a_to_b.load(Ordering::Relaxed),
            Direction::BToA => self.b_to_a.load(Ordering::Relaxed),
        }
    }

    pub fn total(&self) -> u64 {
        self.completed(Direction::AToB) + self.completed(Direction::BToA)
    }
}

/// The one-lane bridge
#[derive(Debug)]
pub struct Bridge {
    state: Mutex<BridgeState>,
    /// Signalled on every release
    freed: Condvar,
    queue: Arc<ArrivalQueue>,
    events: Option<Sender<CrossingEvent>>,
    stats: CrossingStats,
}

impl Bridge {
    pub fn new(queue: Arc<ArrivalQueue>) -> Self {
        Self {
            state: Mutex::new(BridgeState::Free),
            freed: Condvar::new(),
            queue,
            events: None,
            stats: CrossingStats::default(),
        }
    }

    /// Create a bridge that publishes every transition on `events`
    pub fn with_events(queue: Arc<ArrivalQueue>, events: Sender<CrossingEvent>) -> Self {
        Self {
            events: Some(events),
            ..Self::new(queue)
        }
    }

    pub fn queue(&self) -> &Arc<ArrivalQueue> {
        &self.queue
    }

    pub fn stats(&self) -> &CrossingStats {
        &self.stats
    }

    fn lock(&self) -> Result<MutexGuard<'_, BridgeState>> {
        self.state
            .lock()
            .map_err(|_| anyhow!("bridge lock poisoned"))
    }

    fn wait<'a>(&self, guard: MutexGuard<'a, BridgeState>) -> Result<MutexGuard<'a, BridgeState>> {
        self.freed
            .wait(guard)
            .map_err(|_| anyhow!("bridge lock poisoned"))
    }

    fn publish(&self, event: CrossingEvent) {
        if let Some(events) = &self.events {
            if events.send(event).is_err() {
                trace!("crossing event dropped, no listener: {:?}", event);
            }
        }
    }

    /// Wait for the bridge to be free, then hand it to the head of the queue
    ///
    /// The vehicle returned is whoever was at the head, which is not
    /// necessarily the caller's own vehicle. The caller drives the returned
    /// vehicle across and must call [`Bridge::release`] afterwards.
    pub fn acquire_next(&self) -> Result<Crossing> {
        let mut state = self.lock()?;
        while matches!(*state, BridgeState::Occupied(_)) {
            state = self.wait(state)?;
        }

        let vehicle = self
            .queue
            .pop()?
            .context("bridge is free but no vehicle is waiting; callers must enqueue before acquiring")?;

        let crossing = Crossing {
            direction: vehicle.home().outbound(),
            vehicle,
        };
        *state = BridgeState::Occupied(crossing.clone());

        self.publish(CrossingEvent::Acquired {
            vehicle: crossing.vehicle.id,
            direction: crossing.direction,
            at: Instant::now(),
        });

        Ok(crossing)
    }

    /// Free the bridge and wake every waiting agent
    ///
    /// Returns the crossing that just finished.
    pub fn release(&self) -> Result<Crossing> {
        let finished = {
            let mut state = self.lock()?;
            let finished = match std::mem::take(&mut *state) {
                BridgeState::Occupied(crossing) => crossing,
                BridgeState::Free => bail!("release called on a free bridge"),
            };
            self.stats.record(finished.direction);
            self.publish(CrossingEvent::Released {
                vehicle: finished.vehicle.id,
                direction: finished.direction,
                at: Instant::now(),
            });
            finished
        };

        self.freed.notify_all();
        Ok(finished)
    }

    /// Current occupant and its direction, if any
    pub fn occupant(&self) -> Result<Option<(VehicleId, Direction)>> {
        let state = self.lock()?;
        Ok(state
            .crossing()
            .map(|crossing| (crossing.vehicle.id, crossing.direction)))
    }

    /// Block until the vehicle is back in a city: neither queued nor on the bridge
    ///
    /// Another agent may still be driving this vehicle when its own agent
    /// finishes a cycle. Pops and releases both happen under the bridge lock,
    /// and every release broadcasts, so no wakeup is missed.
    pub fn wait_until_in_city(&self, id: VehicleId) -> Result<()> {
        let mut state = self.lock()?;
        while state.is_held_by(id) || self.queue.contains(id)? {
            state = self.wait(state)?;
        }
        Ok(())
    }

    /// Run `inspect` with the bridge lock held
    ///
    /// The queue lock may be taken inside `inspect`, never the other way round.
    pub fn inspect<T>(&self, inspect: impl FnOnce(&BridgeState) -> Result<T>) -> Result<T> {
        let state = self.lock()?;
        inspect(&state)
    }
}
