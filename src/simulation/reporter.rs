//! State reporter
//!
//! Prints one line per event summarising where every vehicle is:
//!
//! ```text
//! A-2 1 [>> 4 >>] 0 1-B
//! ```
//!
//! Left to right: idle in A, queued in A, the bridge (arrows and occupant, or
//! `x` when empty), queued in B, idle in B.

use anyhow::{anyhow, Context, Result};
use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use super::bridge::Bridge;
use super::types::{City, Direction, Vehicle, VehicleId};

/// Where every vehicle was at one instant
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BridgeSnapshot {
    pub idle_a: usize,
    pub idle_b: usize,
    /// Waiting in A to go to B
    pub queued_a: usize,
    /// Waiting in B to go to A
    pub queued_b: usize,
    pub occupant: Option<(VehicleId, Direction)>,
    /// Queued ids per direction, in queue order
    pub waiting_a_to_b: Vec<VehicleId>,
    pub waiting_b_to_a: Vec<VehicleId>,
}

impl BridgeSnapshot {
    /// Every vehicle counted exactly once
    pub fn total(&self) -> usize {
        self.idle_a + self.idle_b + self.queued_a + self.queued_b + usize::from(self.occupant.is_some())
    }

    /// The report line, followed by the per-direction queue listing when verbose
    pub fn render(&self, verbose: bool) -> String {
        let mut out = format!("{}\n", self);
        if verbose {
            out.push_str(&format!("A->B: {}\n", join_ids(&self.waiting_a_to_b)));
            out.push_str(&format!("B->A: {}\n", join_ids(&self.waiting_b_to_a)));
        }
        out
    }
}

fn join_ids(ids: &[VehicleId]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

impl fmt::Display for BridgeSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (arrows, occupant) = match self.occupant {
            Some((id, direction)) => (direction.arrows(), id.to_string()),
            None => ("<>", "x".to_string()),
        };
        write!(
            f,
            "A-{} {} [{} {} {}] {} {}-B",
            self.idle_a, self.queued_a, arrows, occupant, arrows, self.queued_b, self.idle_b
        )
    }
}

/// Writes snapshots of the simulation to an output stream
pub struct Reporter {
    sink: Mutex<Box<dyn Write + Send>>,
    verbose: bool,
}

impl fmt::Debug for Reporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reporter")
            .field("verbose", &self.verbose)
            .finish_non_exhaustive()
    }
}

impl Reporter {
    pub fn new(sink: Box<dyn Write + Send>, verbose: bool) -> Self {
        Self {
            sink: Mutex::new(sink),
            verbose,
        }
    }

    pub fn stdout(verbose: bool) -> Self {
        Self::new(Box::new(io::stdout()), verbose)
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Take a consistent snapshot of `fleet`, the queue and the bridge
    ///
    /// Holds the bridge lock, then the queue lock, only while counting.
    pub fn snapshot(&self, bridge: &Bridge, fleet: &[Arc<Vehicle>]) -> Result<BridgeSnapshot> {
        bridge.inspect(|state| {
            let occupant = state
                .crossing()
                .map(|crossing| (crossing.vehicle.id, crossing.direction));
            let view = bridge
                .queue()
                .view(fleet.iter().map(|vehicle| vehicle.id))?;

            let mut snapshot = BridgeSnapshot {
                occupant,
                waiting_a_to_b: view.from_a,
                waiting_b_to_a: view.from_b,
                ..BridgeSnapshot::default()
            };
            for (vehicle, enqueued) in fleet.iter().zip(view.enqueued) {
                if occupant.is_some_and(|(id, _)| id == vehicle.id) {
                    continue;
                }
                match (vehicle.home(), enqueued) {
                    (City::A, false) => snapshot.idle_a += 1,
                    (City::B, false) => snapshot.idle_b += 1,
                    (City::A, true) => snapshot.queued_a += 1,
                    (City::B, true) => snapshot.queued_b += 1,
                }
            }
            Ok(snapshot)
        })
    }

    /// Snapshot the simulation and write it out
    pub fn report(&self, bridge: &Bridge, fleet: &[Arc<Vehicle>]) -> Result<()> {
        let snapshot = self.snapshot(bridge, fleet)?;
        let text = snapshot.render(self.verbose);

        let mut sink = self
            .sink
            .lock()
            .map_err(|_| anyhow!("report output lock poisoned"))?;
        sink.write_all(text.as_bytes())
            .and_then(|()| sink.flush())
            .context("failed to write report line")
    }
}
