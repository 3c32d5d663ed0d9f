//! Grouping and best-configuration selection
//!
//! Measurements partition by `(topology, schedule, chunk)`; the
//! best-configuration series for a `(topology, schedule)` pair takes,
//! at every thread count, the chunk with the minimal elapsed time. The
//! optimal chunk may vary with the thread count, which is why selection
//! happens per thread count rather than once per group.

use std::collections::{BTreeMap, HashMap};

use crate::experiment::{Chunk, Schedule, Topology};
use crate::ledger::Measurement;

// =================================================================================================
// Duplicate Resolution
// =================================================================================================

/// Resolve duplicate configuration keys, keeping the most recent row.
///
/// Row order is write order, so "most recent" is "last in the ledger".
/// Earlier positions are kept stable — a superseded row is replaced in
/// place, not reordered.
pub fn dedup_latest(rows: &[Measurement]) -> Vec<Measurement> {
    let mut index: HashMap<(String, Schedule, Chunk, u32), usize> = HashMap::new();
    let mut resolved: Vec<Measurement> = Vec::new();

    for row in rows {
        match index.get(&row.key()) {
            Some(&position) => resolved[position] = row.clone(),
            None => {
                index.insert(row.key(), resolved.len());
                resolved.push(row.clone());
            }
        }
    }
    resolved
}

// =================================================================================================
// Partitioning
// =================================================================================================

/// Partition rows by `(topology, schedule)`, the unit of scaling
/// analysis. `BTreeMap` keeps report order deterministic.
pub fn group_by_schedule(
    rows: &[Measurement],
) -> BTreeMap<(Topology, Schedule), Vec<Measurement>> {
    let mut groups: BTreeMap<(Topology, Schedule), Vec<Measurement>> = BTreeMap::new();
    for row in rows {
        groups
            .entry((row.topology, row.schedule))
            .or_default()
            .push(row.clone());
    }
    groups
}

/// Partition rows by `(topology, schedule, chunk)`, each group sorted by
/// thread count ascending. This is the per-chunk view behind fixed-chunk
/// scaling curves.
pub fn group_by_chunk(
    rows: &[Measurement],
) -> BTreeMap<(Topology, Schedule, Chunk), Vec<Measurement>> {
    let mut groups: BTreeMap<(Topology, Schedule, Chunk), Vec<Measurement>> = BTreeMap::new();
    for row in rows {
        groups
            .entry((row.topology, row.schedule, row.chunk))
            .or_default()
            .push(row.clone());
    }
    for group in groups.values_mut() {
        group.sort_by_key(|row| row.threads);
    }
    groups
}

// =================================================================================================
// Best-Configuration Selection
// =================================================================================================

/// For each thread count in the group, the measurement with minimal
/// elapsed time over all chunk values tried there. Sorted by thread
/// count ascending.
pub fn best_per_thread(rows: &[Measurement]) -> Vec<Measurement> {
    let mut best: BTreeMap<u32, &Measurement> = BTreeMap::new();
    for row in rows {
        best.entry(row.threads)
            .and_modify(|current| {
                if row.time_sec < current.time_sec {
                    *current = row;
                }
            })
            .or_insert(row);
    }
    best.into_values().cloned().collect()
}

// =================================================================================================
// Chunk Profile
// =================================================================================================

/// Time-versus-chunk profile of one group at its highest measured
/// thread count, sorted by chunk (`auto` last).
///
/// Returns `None` when the group is empty. This is the data behind
/// "time vs chunk" tables; the thread count the profile was taken at is
/// returned alongside.
pub fn chunk_profile(rows: &[Measurement]) -> Option<(u32, Vec<(Chunk, f64)>)> {
    let max_threads = rows.iter().map(|row| row.threads).max()?;
    let mut profile: Vec<(Chunk, f64)> = rows
        .iter()
        .filter(|row| row.threads == max_threads)
        .map(|row| (row.chunk, row.time_sec))
        .collect();
    profile.sort_by(|a, b| a.0.cmp(&b.0));
    Some((max_threads, profile))
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::experiment::GridSize;

    fn row(label: &str, chunk: Chunk, threads: u32, time_sec: f64) -> Measurement {
        Measurement {
            label: label.to_string(),
            topology: Topology::TwoD,
            size: GridSize::Plane { lx: 256, ly: 256 },
            steps: 1000,
            schedule: Schedule::Dynamic,
            chunk,
            threads,
            time_sec,
            time_mean: time_sec,
            time_std: 0.0,
            energy_first: None,
            energy_last: None,
            energy_lines: 0,
            stdout_last: String::new(),
            stderr_last: String::new(),
        }
    }

    #[test]
    fn test_dedup_keeps_most_recent_row() {
        let rows = vec![
            row("sweep", Chunk::Fixed(512), 4, 9.9),
            row("sweep", Chunk::Fixed(256), 4, 4.0),
            // Re-measured cell from a resumed run: supersedes the 9.9 row.
            row("sweep", Chunk::Fixed(512), 4, 3.2),
        ];
        let resolved = dedup_latest(&rows);
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0].time_sec, 3.2, "latest row wins, position stable");
        assert_eq!(resolved[1].time_sec, 4.0);
    }

    #[test]
    fn test_best_per_thread_picks_minimum_over_chunks() {
        // Spec end-to-end: chunks {256: 4.0 s, 512: 3.2 s, auto: 5.0 s}
        // at threads=4 must pick chunk 512.
        let rows = vec![
            row("sweep", Chunk::Fixed(256), 4, 4.0),
            row("sweep", Chunk::Fixed(512), 4, 3.2),
            row("sweep", Chunk::Auto, 4, 5.0),
            row("sweep", Chunk::Fixed(512), 1, 10.0),
        ];
        let best = best_per_thread(&rows);
        assert_eq!(best.len(), 2);
        assert_eq!(best[0].threads, 1);
        assert_eq!(best[1].threads, 4);
        assert_eq!(best[1].chunk, Chunk::Fixed(512));
        assert_eq!(best[1].time_sec, 3.2);
    }

    #[test]
    fn test_group_by_schedule_separates_topologies() {
        let mut one_d = row("1d", Chunk::Fixed(256), 2, 1.0);
        one_d.topology = Topology::OneD;
        one_d.size = GridSize::Line { n: 20000 };
        let rows = vec![one_d, row("2d", Chunk::Fixed(256), 2, 1.0)];

        let groups = group_by_schedule(&rows);
        assert_eq!(groups.len(), 2);
        assert!(groups.contains_key(&(Topology::OneD, Schedule::Dynamic)));
        assert!(groups.contains_key(&(Topology::TwoD, Schedule::Dynamic)));
    }

    #[test]
    fn test_chunk_profile_at_max_threads_sorts_auto_last() {
        let rows = vec![
            row("sweep", Chunk::Auto, 8, 5.0),
            row("sweep", Chunk::Fixed(512), 8, 3.2),
            row("sweep", Chunk::Fixed(128), 8, 4.5),
            row("sweep", Chunk::Fixed(128), 1, 20.0),
        ];
        let (threads, profile) = chunk_profile(&rows).unwrap();
        assert_eq!(threads, 8);
        assert_eq!(
            profile.iter().map(|(c, _)| *c).collect::<Vec<_>>(),
            vec![Chunk::Fixed(128), Chunk::Fixed(512), Chunk::Auto]
        );
    }

    #[test]
    fn test_chunk_profile_of_empty_group() {
        assert!(chunk_profile(&[]).is_none());
    }

    #[test]
    fn test_group_by_chunk_sorts_threads_ascending() {
        let rows = vec![
            row("sweep", Chunk::Fixed(512), 8, 2.0),
            row("sweep", Chunk::Fixed(512), 1, 10.0),
            row("sweep", Chunk::Fixed(512), 4, 3.2),
            row("sweep", Chunk::Auto, 8, 5.0),
        ];
        let groups = group_by_chunk(&rows);
        assert_eq!(groups.len(), 2);

        let fixed = &groups[&(Topology::TwoD, Schedule::Dynamic, Chunk::Fixed(512))];
        assert_eq!(
            fixed.iter().map(|r| r.threads).collect::<Vec<_>>(),
            vec![1, 4, 8]
        );
    }
}
