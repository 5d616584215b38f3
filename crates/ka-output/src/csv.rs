//! CSV output backend.
//!
//! Creates two files in the configured output directory:
//! - `agent_snapshots.csv`
//! - `tick_summaries.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::OutputWriter;
use crate::{AgentSnapshotRow, OutputError, OutputResult, TickSummaryRow};

pub const SNAPSHOT_FILE: &str = "agent_snapshots.csv";
pub const SUMMARY_FILE: &str = "tick_summaries.csv";

pub const SNAPSHOT_HEADERS: [&str; 14] = [
    "agent_id", "tick", "time_ms", "x", "y", "state", "target", "intent", "hp", "gold", "potions",
    "stuck_events", "decision", "decision_origin",
];

pub const SUMMARY_HEADERS: [&str; 10] = [
    "tick", "time_ms", "living", "interrupts", "forced_resets", "moved", "blocked", "enemies_slain",
    "agents_lost", "objectives_closed",
];

/// Two CSV files side by side: one row per agent per snapshot, one row per
/// tick.  Positions are written with three decimals.
pub struct CsvWriter {
    snapshots: Writer<File>,
    summaries: Writer<File>,
    finished:  bool,
}

impl CsvWriter {
    /// Create (or truncate) both files in `dir` and write their headers.
    /// `dir` must already exist.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        if !dir.is_dir() {
            return Err(OutputError::NotADirectory(dir.to_path_buf()));
        }
        let mut snapshots = Writer::from_path(dir.join(SNAPSHOT_FILE))?;
        snapshots.write_record(SNAPSHOT_HEADERS)?;

        let mut summaries = Writer::from_path(dir.join(SUMMARY_FILE))?;
        summaries.write_record(SUMMARY_HEADERS)?;

        Ok(Self { snapshots, summaries, finished: false })
    }

    fn check_open(&self) -> OutputResult<()> {
        if self.finished { Err(OutputError::Finished) } else { Ok(()) }
    }
}

impl OutputWriter for CsvWriter {
    fn backend(&self) -> &'static str {
        "csv"
    }

    fn write_snapshots(&mut self, rows: &[AgentSnapshotRow]) -> OutputResult<()> {
        self.check_open()?;
        for row in rows {
            self.snapshots.write_record(&[
                row.agent_id.to_string(),
                row.tick.to_string(),
                row.time_ms.to_string(),
                format!("{:.3}", row.x),
                format!("{:.3}", row.y),
                row.state.to_owned(),
                row.target.to_owned(),
                row.intent.to_owned(),
                row.hp.to_string(),
                row.gold.to_string(),
                row.potions.to_string(),
                row.stuck_events.to_string(),
                row.decision.to_owned(),
                row.decision_origin.to_owned(),
            ])?;
        }
        Ok(())
    }

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        self.check_open()?;
        self.summaries.write_record(&[
            row.tick.to_string(),
            row.time_ms.to_string(),
            row.living.to_string(),
            row.interrupts.to_string(),
            row.forced_resets.to_string(),
            row.moved.to_string(),
            row.blocked.to_string(),
            row.enemies_slain.to_string(),
            row.agents_lost.to_string(),
            row.objectives_closed.to_string(),
        ])?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.snapshots.flush()?;
        self.summaries.flush()?;
        Ok(())
    }
}
