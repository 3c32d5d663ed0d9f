//! Integration tests: ledger + analysis engine
//!
//! Round-trips measurements through the on-disk ledger and verifies the
//! derived scaling numbers end to end.

mod common;

use common::test_helpers::assert_close;
use wavebench_rs::analysis::{analyze_ledger, write_scaling_csv};
use wavebench_rs::experiment::{Chunk, GridSize, Schedule, Topology};
use wavebench_rs::ledger::{Ledger, Measurement};

// =================================================================================================
// Helpers
// =================================================================================================

fn measurement(chunk: Chunk, threads: u32, time_sec: f64) -> Measurement {
    Measurement {
        label: "2d_static_case".to_string(),
        topology: Topology::TwoD,
        size: GridSize::Plane { lx: 256, ly: 256 },
        steps: 1000,
        schedule: Schedule::Static,
        chunk,
        threads,
        time_sec,
        time_mean: time_sec,
        time_std: 0.0,
        energy_first: Some(12.0),
        energy_last: Some(4.0),
        energy_lines: 1000,
        stdout_last: "OK".to_string(),
        stderr_last: String::new(),
    }
}

// =================================================================================================
// Tests
// =================================================================================================

#[test]
fn test_ledger_to_scaling_numbers_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = Ledger::new(dir.path().join("matrix_results.csv"));

    for (threads, time) in [(1, 10.0), (2, 5.5), (4, 3.2)] {
        ledger
            .append(&measurement(Chunk::Fixed(512), threads, time))
            .unwrap();
    }

    let rows = ledger.load().unwrap();
    let results = analyze_ledger(&rows);
    assert_eq!(results.len(), 1);
    let analysis = results[0].as_ref().unwrap();
    assert_eq!(analysis.topology, Topology::TwoD);
    assert_eq!(analysis.schedule, Schedule::Static);

    let points = &analysis.curve.points;
    assert_eq!(points.len(), 3);
    assert_eq!(points[0].speedup, 1.0, "baseline normalises to itself");
    assert_close(points[1].speedup, 1.818_181_8, 1e-6, "speedup at p=2");
    assert_close(points[2].speedup, 3.125, 1e-12, "speedup at p=4");
    assert_close(points[1].efficiency, 0.909_090_9, 1e-6, "efficiency at p=2");
    assert_close(points[2].efficiency, 0.781_25, 1e-12, "efficiency at p=4");

    let fit = analysis.amdahl.as_ref().unwrap();
    assert_close(fit.serial_fraction, 0.096_666_7, 1e-4, "serial fraction");
}

#[test]
fn test_best_chunk_selection_survives_disk_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = Ledger::new(dir.path().join("matrix_results.csv"));

    ledger.append(&measurement(Chunk::Fixed(512), 1, 10.0)).unwrap();
    // Three chunk candidates at threads=4; chunk 512 is fastest.
    ledger.append(&measurement(Chunk::Fixed(256), 4, 4.0)).unwrap();
    ledger.append(&measurement(Chunk::Fixed(512), 4, 3.2)).unwrap();
    ledger.append(&measurement(Chunk::Auto, 4, 5.0)).unwrap();

    let rows = ledger.load().unwrap();
    let results = analyze_ledger(&rows);
    let analysis = results[0].as_ref().unwrap();

    let p4 = analysis
        .curve
        .points
        .iter()
        .find(|p| p.threads == 4)
        .unwrap();
    assert_eq!(p4.chunk, Chunk::Fixed(512));
    assert_close(p4.time, 3.2, 1e-12, "winning chunk time");
}

#[test]
fn test_scaling_export_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = Ledger::new(dir.path().join("matrix_results.csv"));
    for (threads, time) in [(1, 10.0), (2, 5.5), (4, 3.2)] {
        ledger
            .append(&measurement(Chunk::Fixed(512), threads, time))
            .unwrap();
    }

    let rows = ledger.load().unwrap();
    let results = analyze_ledger(&rows);
    let analysis = results[0].as_ref().unwrap();

    let path = write_scaling_csv(analysis, dir.path()).unwrap();
    let contents = std::fs::read_to_string(&path).unwrap();
    assert_eq!(contents.lines().count(), 4);
    assert!(contents.lines().nth(2).unwrap().starts_with("2,512,5.500000"));
}

#[test]
fn test_missing_ledger_names_file_and_remedy() {
    let ledger = Ledger::new("results/never_ran.csv");
    let err = ledger.load().unwrap_err();
    let text = err.to_string();
    assert!(text.contains("never_ran.csv"));
    assert!(text.contains("sweep"));
}
