//! Integration tests for ka-output.

use ka_agent::Agent;
use ka_core::{AgentId, EngineConfig, SimConfig, SimTime, Tick, WorldPos};
use ka_sim::{Scenario, Sim};

use crate::row::{AgentSnapshotRow, TickSummaryRow};

fn snap_row(agent_id: u32, tick: u64) -> AgentSnapshotRow {
    let agent = Agent::new(AgentId(agent_id), WorldPos::new(48.0 + agent_id as f32, 16.0), 32.0);
    AgentSnapshotRow::from_agent(Tick(tick), SimTime(tick * 16), &agent)
}

fn summary_row(tick: u64) -> TickSummaryRow {
    TickSummaryRow {
        tick,
        time_ms:           tick * 16,
        living:            3,
        interrupts:        1,
        forced_resets:     0,
        moved:             2,
        blocked:           1,
        enemies_slain:     0,
        agents_lost:       0,
        objectives_closed: 0,
    }
}

fn village(seed: u64, total_ticks: u64) -> Sim {
    let config = SimConfig { seed, tick_hz: 60, total_ticks, output_interval_ticks: 60 };
    Scenario::village(4).into_builder(config, EngineConfig::default()).build().unwrap()
}

// ── CSV ───────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod csv_tests {
    use tempfile::TempDir;

    use super::*;
    use crate::csv::{CsvWriter, SNAPSHOT_FILE, SNAPSHOT_HEADERS, SUMMARY_FILE, SUMMARY_HEADERS};
    use crate::observer::SimOutputObserver;
    use crate::writer::OutputWriter;
    use crate::OutputError;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    #[test]
    fn csv_files_created() {
        let dir = tmp();
        let _w = CsvWriter::new(dir.path()).unwrap();
        assert!(dir.path().join("agent_snapshots.csv").exists());
        assert!(dir.path().join("tick_summaries.csv").exists());
    }

    #[test]
    fn csv_headers_correct() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();

        let mut rdr = csv::Reader::from_path(dir.path().join(SNAPSHOT_FILE)).unwrap();
        let headers: Vec<_> = rdr.headers().unwrap().iter().map(str::to_owned).collect();
        assert_eq!(headers, SNAPSHOT_HEADERS);
        assert_eq!(headers[0], "agent_id");

        let mut rdr2 = csv::Reader::from_path(dir.path().join(SUMMARY_FILE)).unwrap();
        let headers2: Vec<_> = rdr2.headers().unwrap().iter().map(str::to_owned).collect();
        assert_eq!(headers2, SUMMARY_HEADERS);
    }

    #[test]
    fn csv_snapshot_rows_written() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        let rows = vec![snap_row(0, 5), snap_row(1, 5), snap_row(2, 5)];
        w.write_snapshots(&rows).unwrap();
        w.finish().unwrap();

        let mut rdr = csv::Reader::from_path(dir.path().join(SNAPSHOT_FILE)).unwrap();
        let read_rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(read_rows.len(), 3);
        assert_eq!(&read_rows[0][0], "0"); // agent_id
        assert_eq!(&read_rows[0][1], "5"); // tick
        assert_eq!(&read_rows[0][2], "80"); // time_ms
        assert_eq!(&read_rows[1][3], "49.000"); // x
        assert_eq!(&read_rows[2][0], "2");
        assert_eq!(&read_rows[0][5], "idle"); // state
        assert_eq!(&read_rows[0][12], ""); // no decision yet
    }

    #[test]
    fn csv_tick_summary_written() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_tick_summary(&summary_row(3)).unwrap();
        w.finish().unwrap();

        let mut rdr = csv::Reader::from_path(dir.path().join(SUMMARY_FILE)).unwrap();
        let read_rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(read_rows.len(), 1);
        assert_eq!(&read_rows[0][0], "3"); // tick
        assert_eq!(&read_rows[0][1], "48"); // time_ms
        assert_eq!(&read_rows[0][2], "3"); // living
        assert_eq!(&read_rows[0][6], "1"); // blocked
    }

    #[test]
    fn csv_finish_idempotent() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();
        w.finish().unwrap(); // second call should not panic
    }

    #[test]
    fn csv_empty_snapshot_ok() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_snapshots(&[]).unwrap();
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tmp();
        let result = CsvWriter::new(&dir.path().join("nope"));
        assert!(matches!(result, Err(OutputError::NotADirectory(_))));
    }

    #[test]
    fn writes_after_finish_are_rejected() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();
        assert!(matches!(w.write_tick_summary(&summary_row(1)), Err(OutputError::Finished)));
        assert!(matches!(w.write_snapshots(&[snap_row(0, 1)]), Err(OutputError::Finished)));
    }

    #[test]
    fn integration_csv() {
        // 121 ticks, interval 60 → snapshots at ticks 0, 60 and 120.
        let mut sim = village(1, 121);
        let dir = tmp();
        let writer = CsvWriter::new(dir.path()).unwrap();
        let mut obs = SimOutputObserver::new(writer);
        sim.run(&mut obs).unwrap();
        assert!(obs.take_error().is_none(), "no write errors expected");
        assert_eq!(obs.snapshot_rows(), 12);
        assert_eq!(obs.summary_rows(), 121);

        let mut rdr = csv::Reader::from_path(dir.path().join(SNAPSHOT_FILE)).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 12, "expected 3 snapshots × 4 agents = 12 rows, got {}", rows.len());
        assert_eq!(&rows[4][1], "60");

        let mut rdr = csv::Reader::from_path(dir.path().join(SUMMARY_FILE)).unwrap();
        assert_eq!(rdr.records().count(), 121);
    }
}

// ── Observer error handling ───────────────────────────────────────────────────

#[cfg(test)]
mod observer_tests {
    use super::*;
    use crate::{OutputError, OutputResult, OutputWriter, SimOutputObserver};

    /// Fails every write and counts the attempts.
    #[derive(Default)]
    struct BrokenWriter {
        attempts: usize,
    }

    impl OutputWriter for BrokenWriter {
        fn write_snapshots(&mut self, _: &[AgentSnapshotRow]) -> OutputResult<()> {
            self.attempts += 1;
            Err(OutputError::Io(std::io::Error::other("disk full")))
        }

        fn write_tick_summary(&mut self, _: &TickSummaryRow) -> OutputResult<()> {
            self.attempts += 1;
            Err(OutputError::Io(std::io::Error::other("disk full")))
        }

        fn finish(&mut self) -> OutputResult<()> {
            Ok(())
        }
    }

    #[test]
    fn first_error_is_kept_and_the_run_continues() {
        let mut sim = village(1, 10);
        let mut obs = SimOutputObserver::new(BrokenWriter::default());
        sim.run(&mut obs).unwrap();

        let err = obs.take_error().expect("error stored");
        assert!(err.to_string().contains("disk full"));
        assert!(obs.take_error().is_none(), "taken once");
        assert_eq!(obs.dropped_errors(), 10);
        assert_eq!(obs.summary_rows(), 0);
        // Ten summaries plus one snapshot, all attempted.
        assert_eq!(obs.into_writer().attempts, 11);
    }
}

// ── TraceDigest ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod digest_tests {
    use super::*;
    use crate::TraceDigest;

    fn digest_of(seed: u64, ticks: u64) -> TraceDigest {
        let mut sim = village(seed, ticks);
        let mut digest = TraceDigest::new();
        sim.run(&mut digest).unwrap();
        digest
    }

    #[test]
    fn same_seed_same_digest() {
        let a = digest_of(5, 600);
        let b = digest_of(5, 600);
        assert_eq!(a, b);
        assert_eq!(a.ticks(), 600);
        assert_eq!(a.snapshots(), 10);
    }

    #[test]
    fn different_seed_different_digest() {
        assert_ne!(digest_of(5, 900).value(), digest_of(6, 900).value());
    }

    #[test]
    fn one_bit_of_position_changes_the_digest() {
        let row = snap_row(0, 1);
        let mut nudged = row.clone();
        nudged.x = f32::from_bits(row.x.to_bits() + 1);

        let mut a = TraceDigest::new();
        let mut b = TraceDigest::new();
        a.fold_snapshot_row(&row);
        b.fold_snapshot_row(&nudged);
        assert_ne!(a.value(), b.value());
    }

    #[test]
    fn fold_order_matters() {
        let mut a = TraceDigest::new();
        let mut b = TraceDigest::new();
        a.fold_summary_row(&summary_row(1));
        a.fold_summary_row(&summary_row(2));
        b.fold_summary_row(&summary_row(2));
        b.fold_summary_row(&summary_row(1));
        assert_ne!(a.value(), b.value());
        assert_eq!(a.ticks(), 2);
    }

    #[test]
    fn display_is_sixteen_hex_digits() {
        let d = TraceDigest::new();
        let s = d.to_string();
        assert_eq!(s.len(), 16);
        assert_eq!(u64::from_str_radix(&s, 16).unwrap(), d.value());
    }
}
