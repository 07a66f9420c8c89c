//! Arrival queue behaviour

use std::sync::Arc;
use std::thread;

use one_lane_bridge::simulation::{ArrivalQueue, City, Vehicle, VehicleId};

fn vehicle(id: usize, home: City) -> Arc<Vehicle> {
    Arc::new(Vehicle::new(VehicleId(id), home))
}

#[test]
fn test_queue_is_fifo_and_tracks_membership() {
    let queue = ArrivalQueue::with_capacity(5);
    let ids = [3, 1, 4];

    for id in ids {
        queue.push(vehicle(id, City::A)).unwrap();
        assert!(
            queue.contains(VehicleId(id)).unwrap(),
            "vehicle {} should be marked as queued right after its push",
            id
        );
    }

    let mut popped = Vec::new();
    while let Some(vehicle) = queue.pop().unwrap() {
        assert!(
            !queue.contains(vehicle.id).unwrap(),
            "vehicle {} should be marked absent right after its pop",
            vehicle.id
        );
        popped.push(vehicle.id.0);
    }

    assert_eq!(popped, vec![3, 1, 4]);
    assert!(queue.is_empty().unwrap());
}

#[test]
fn test_pop_on_empty_queue_returns_none() {
    let queue = ArrivalQueue::new();
    assert!(queue.pop().unwrap().is_none());
}

#[test]
fn test_duplicate_push_is_rejected() {
    let queue = ArrivalQueue::new();
    let car = vehicle(2, City::B);

    queue.push(Arc::clone(&car)).unwrap();
    let err = queue.push(Arc::clone(&car)).unwrap_err();
    assert!(
        err.to_string().contains("already waiting"),
        "unexpected error: {}",
        err
    );
    assert_eq!(queue.len().unwrap(), 1);

    // Once popped it may queue again
    queue.pop().unwrap();
    queue.push(car).unwrap();
    assert_eq!(queue.len().unwrap(), 1);
}

#[test]
fn test_membership_grows_past_initial_capacity() {
    let queue = ArrivalQueue::with_capacity(1);
    queue.push(vehicle(7, City::A)).unwrap();
    assert!(queue.contains(VehicleId(7)).unwrap());
    assert!(!queue.contains(VehicleId(6)).unwrap());
}

#[test]
fn test_snapshot_by_city_keeps_queue_order() {
    let queue = ArrivalQueue::new();
    queue.push(vehicle(0, City::A)).unwrap();
    queue.push(vehicle(1, City::B)).unwrap();
    queue.push(vehicle(2, City::A)).unwrap();
    queue.push(vehicle(3, City::B)).unwrap();
    queue.push(vehicle(4, City::A)).unwrap();

    assert_eq!(
        queue.snapshot_by_city(City::A).unwrap(),
        vec![VehicleId(0), VehicleId(2), VehicleId(4)]
    );
    assert_eq!(
        queue.snapshot_by_city(City::B).unwrap(),
        vec![VehicleId(1), VehicleId(3)]
    );
}

#[test]
fn test_view_reports_membership_and_directions_together() {
    let queue = ArrivalQueue::new();
    queue.push(vehicle(1, City::B)).unwrap();
    queue.push(vehicle(0, City::A)).unwrap();

    let view = queue
        .view([VehicleId(0), VehicleId(1), VehicleId(2)])
        .unwrap();
    assert_eq!(view.enqueued, vec![true, true, false]);
    assert_eq!(view.from_a, vec![VehicleId(0)]);
    assert_eq!(view.from_b, vec![VehicleId(1)]);
}

#[test]
fn test_concurrent_pushes_are_all_kept() {
    let queue = Arc::new(ArrivalQueue::new());

    let handles: Vec<_> = (0..8)
        .map(|id| {
            let queue = Arc::clone(&queue);
            thread::spawn(move || queue.push(vehicle(id, City::A)).unwrap())
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(queue.len().unwrap(), 8);
    let mut popped = Vec::new();
    while let Some(vehicle) = queue.pop().unwrap() {
        popped.push(vehicle.id.0);
    }
    popped.sort_unstable();
    assert_eq!(popped, (0..8).collect::<Vec<_>>());
}
