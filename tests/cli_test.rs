//! Command-line behaviour of the simulation binary

mod common;

use std::process::{Command, Output};

use common::parse_report_line;

fn run_bridge(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_one_lane_bridge"))
        .args(args)
        .env("RUST_LOG", "warn,one_lane_bridge=info")
        .output()
        .expect("Failed to execute simulation")
}

const FAST: &[&str] = &[
    "--crossing-ms",
    "5",
    "--min-wander-ms",
    "0",
    "--max-wander-ms",
    "10",
    "--duration-secs",
    "1",
    "--seed",
    "11",
];

fn with_fast<'a>(args: &[&'a str]) -> Vec<&'a str> {
    let mut all = args.to_vec();
    all.extend_from_slice(FAST);
    all
}

/// Test that a bounded run shuts down cleanly and logs its summary
#[test]
fn test_bounded_run_completes() {
    let output = run_bridge(&with_fast(&["3"]));

    assert!(
        output.status.success(),
        "Simulation failed. stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("SIMULATION COMPLETE"),
        "Simulation did not complete properly. stderr: {}",
        stderr
    );
    assert!(stderr.contains("Vehicles: 3"), "Missing vehicle count");
    assert!(stderr.contains("Total crossings:"), "Missing crossing total");

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert!(lines.len() > 3, "Expected report lines after startup");
    for line in &lines {
        let parsed = parse_report_line(line)
            .unwrap_or_else(|| panic!("Could not parse report line '{}'", line));
        assert!(parsed.total() <= 3);
    }
    for line in &lines[3..] {
        assert_eq!(parse_report_line(line).map(|p| p.total()), Some(3));
    }
}

/// Test that the legacy `-debug` flag adds queue listings in any position
#[test]
fn test_debug_flag_lists_queues() {
    let output = run_bridge(&with_fast(&["-debug", "2"]));
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("A->B:"), "Missing A->B listing");
    assert!(stdout.contains("B->A:"), "Missing B->A listing");

    let output = run_bridge(&with_fast(&["2", "--debug"]));
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("A->B:"));
}

/// Test that the default fleet size is used when no count is given
#[test]
fn test_default_vehicle_count() {
    let output = run_bridge(FAST);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Vehicles: 5"));
}

/// Test that bad vehicle counts are fatal
#[test]
fn test_invalid_vehicle_counts_fail() {
    for bad in ["0", "abc", "99999999999999999999999", "10001"] {
        let output = run_bridge(&[bad, "--duration-secs", "1"]);
        assert!(
            !output.status.success(),
            "Count '{}' should have been rejected",
            bad
        );
        assert!(
            !output.stderr.is_empty(),
            "Count '{}' was rejected without a message",
            bad
        );
        assert!(output.stdout.is_empty());
    }
}
