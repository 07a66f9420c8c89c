//! Core types for the bridge simulation
//!
//! Vehicles, cities and crossing directions shared by every component.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

/// A unique identifier for a vehicle
/// This is a simple wrapper around a usize for type safety
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VehicleId(pub usize);

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One of the two cities joined by the bridge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum City {
    A,
    B,
}

impl City {
    pub fn opposite(self) -> City {
        match self {
            City::A => City::B,
            City::B => City::A,
        }
    }

    /// Direction a vehicle living in this city travels when it crosses
    pub fn outbound(self) -> Direction {
        match self {
            City::A => Direction::AToB,
            City::B => Direction::BToA,
        }
    }

    fn to_bits(self) -> u8 {
        match self {
            City::A => 0,
            City::B => 1,
        }
    }

    fn from_bits(bits: u8) -> City {
        if bits == 0 {
            City::A
        } else {
            City::B
        }
    }
}

impl fmt::Display for City {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            City::A => write!(f, "A"),
            City::B => write!(f, "B"),
        }
    }
}

/// Direction of travel over the bridge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    AToB,
    BToA,
}

impl Direction {
    pub fn origin(self) -> City {
        match self {
            Direction::AToB => City::A,
            Direction::BToA => City::B,
        }
    }

    pub fn destination(self) -> City {
        self.origin().opposite()
    }

    /// Arrow pair used by the report line
    pub fn arrows(self) -> &'static str {
        match self {
            Direction::AToB => ">>",
            Direction::BToA => "<<",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}", self.origin(), self.destination())
    }
}

/// A vehicle shuttling between the two cities
///
/// The id never changes. The home city is written only by the agent driving
/// the vehicle over the bridge, while it is still the recognised occupant, and
/// read by anyone taking a snapshot.
#[derive(Debug)]
pub struct Vehicle {
    pub id: VehicleId,
    home: AtomicU8,
}

impl Vehicle {
    pub fn new(id: VehicleId, home: City) -> Self {
        Self {
            id,
            home: AtomicU8::new(home.to_bits()),
        }
    }

    pub fn home(&self) -> City {
        City::from_bits(self.home.load(Ordering::Acquire))
    }

    /// Move the vehicle to the other city, returning where it now lives
    pub fn flip_home(&self) -> City {
        let arrived = self.home().opposite();
        self.home.store(arrived.to_bits(), Ordering::Release);
        arrived
    }
}

/// Default number of vehicles when none is given
pub const DEFAULT_VEHICLES: usize = 5;

/// Upper bound on the fleet size; every vehicle gets its own thread
pub const MAX_VEHICLES: usize = 10_000;

/// Time a vehicle spends on the bridge
pub const CROSSING_TIME: Duration = Duration::from_secs(1);

/// Shortest time a vehicle drives around its city between crossings
pub const MIN_WANDER_TIME: Duration = Duration::from_secs(1);

/// Longest time a vehicle drives around its city between crossings
pub const MAX_WANDER_TIME: Duration = Duration::from_secs(7);
