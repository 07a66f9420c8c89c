//! Arrival queue for the bridge
//!
//! A FIFO of vehicles waiting to cross. The membership table lives behind the
//! same lock as the queue itself so "currently enqueued" is true exactly while
//! the vehicle sits in the queue.

use anyhow::{anyhow, bail, Result};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use super::types::{City, Vehicle, VehicleId};

#[derive(Debug, Default)]
struct QueueState {
    waiting: VecDeque<Arc<Vehicle>>,
    /// Indexed by vehicle id
    enqueued: Vec<bool>,
}

impl QueueState {
    fn is_enqueued(&self, id: VehicleId) -> bool {
        self.enqueued.get(id.0).copied().unwrap_or(false)
    }

    fn set_enqueued(&mut self, id: VehicleId, value: bool) {
        if id.0 >= self.enqueued.len() {
            self.enqueued.resize(id.0 + 1, false);
        }
        self.enqueued[id.0] = value;
    }
}

/// The queue as seen at one instant
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueueView {
    /// Membership flag for each id asked about, in the order asked
    pub enqueued: Vec<bool>,
    /// Queued vehicles living in city A, in queue order
    pub from_a: Vec<VehicleId>,
    /// Queued vehicles living in city B, in queue order
    pub from_b: Vec<VehicleId>,
}

/// Thread-safe FIFO of vehicles waiting for the bridge
#[derive(Debug, Default)]
pub struct ArrivalQueue {
    state: Mutex<QueueState>,
}

impl ArrivalQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a queue whose membership table is pre-sized for `vehicles` ids
    pub fn with_capacity(vehicles: usize) -> Self {
        Self {
            state: Mutex::new(QueueState {
                waiting: VecDeque::with_capacity(vehicles),
                enqueued: vec![false; vehicles],
            }),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, QueueState>> {
        self.state
            .lock()
            .map_err(|_| anyhow!("arrival queue lock poisoned"))
    }

    /// Append a vehicle to the tail and mark it as enqueued
    ///
    /// A vehicle may sit in the queue only once; pushing it again is a broken
    /// contract between components and is reported as an error.
    pub fn push(&self, vehicle: Arc<Vehicle>) -> Result<()> {
        let mut state = self.lock()?;
        if state.is_enqueued(vehicle.id) {
            bail!("vehicle {} is already waiting for the bridge", vehicle.id);
        }
        state.set_enqueued(vehicle.id, true);
        state.waiting.push_back(vehicle);
        Ok(())
    }

    /// Remove and return the head, or `None` if nobody is waiting
    pub fn pop(&self) -> Result<Option<Arc<Vehicle>>> {
        let mut state = self.lock()?;
        let head = state.waiting.pop_front();
        if let Some(vehicle) = &head {
            state.set_enqueued(vehicle.id, false);
        }
        Ok(head)
    }

    /// Whether the vehicle is currently waiting in the queue
    pub fn contains(&self, id: VehicleId) -> Result<bool> {
        Ok(self.lock()?.is_enqueued(id))
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.waiting.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Ids of queued vehicles whose home city is `city`, in queue order
    pub fn snapshot_by_city(&self, city: City) -> Result<Vec<VehicleId>> {
        let state = self.lock()?;
        Ok(state
            .waiting
            .iter()
            .filter(|vehicle| vehicle.home() == city)
            .map(|vehicle| vehicle.id)
            .collect())
    }

    /// Membership flags for `ids` plus the queued ids per home city, all read
    /// in one critical section
    pub fn view(&self, ids: impl IntoIterator<Item = VehicleId>) -> Result<QueueView> {
        let state = self.lock()?;
        let mut view = QueueView {
            enqueued: ids.into_iter().map(|id| state.is_enqueued(id)).collect(),
            ..QueueView::default()
        };
        for vehicle in &state.waiting {
            match vehicle.home() {
                City::A => view.from_a.push(vehicle.id),
                City::B => view.from_b.push(vehicle.id),
            }
        }
        Ok(view)
    }
}
