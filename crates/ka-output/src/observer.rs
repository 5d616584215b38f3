//! `SimOutputObserver<W>`: feeds tick summaries and agent snapshots to an
//! `OutputWriter`.

use tracing::{debug, warn};

use ka_agent::AgentStore;
use ka_core::{SimTime, Tick};
use ka_sim::{SimObserver, TickSummary};
use ka_world::{ObjectiveBoard, World};

use crate::row::{AgentSnapshotRow, TickSummaryRow};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// Writes one summary row per tick and one row per agent per snapshot.
///
/// Observer hooks cannot fail, so the first writer error is held until
/// [`take_error`](Self::take_error); later errors are counted and dropped.
pub struct SimOutputObserver<W: OutputWriter> {
    writer:        W,
    first_error:   Option<OutputError>,
    dropped:       u64,
    snapshot_rows: u64,
    summary_rows:  u64,
}

impl<W: OutputWriter> SimOutputObserver<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, first_error: None, dropped: 0, snapshot_rows: 0, summary_rows: 0 }
    }

    /// The first write error, if any.  `None` on a second call.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.first_error.take()
    }

    /// Errors seen after the first one.
    pub fn dropped_errors(&self) -> u64 {
        self.dropped
    }

    /// Snapshot rows accepted by the writer.
    pub fn snapshot_rows(&self) -> u64 {
        self.snapshot_rows
    }

    /// Summary rows accepted by the writer.
    pub fn summary_rows(&self) -> u64 {
        self.summary_rows
    }

    pub fn into_writer(self) -> W {
        self.writer
    }

    /// Whether `result` succeeded; the first failure is kept.
    fn record(&mut self, result: OutputResult<()>) -> bool {
        let Err(e) = result else {
            return true;
        };
        if self.first_error.is_none() {
            warn!(backend = self.writer.backend(), error = %e, "output write failed");
            self.first_error = Some(e);
        } else {
            self.dropped += 1;
        }
        false
    }
}

impl<W: OutputWriter> SimObserver for SimOutputObserver<W> {
    fn on_tick_end(&mut self, _tick: Tick, summary: &TickSummary) {
        let result = self.writer.write_tick_summary(&TickSummaryRow::from(summary));
        if self.record(result) {
            self.summary_rows += 1;
        }
    }

    fn on_snapshot(&mut self, tick: Tick, now: SimTime, agents: &AgentStore, _world: &World, _board: &ObjectiveBoard) {
        let rows: Vec<AgentSnapshotRow> =
            agents.iter().map(|a| AgentSnapshotRow::from_agent(tick, now, a)).collect();
        if rows.is_empty() {
            return;
        }
        let result = self.writer.write_snapshots(&rows);
        if self.record(result) {
            self.snapshot_rows += rows.len() as u64;
        }
    }

    fn on_sim_end(&mut self, final_tick: Tick) {
        let result = self.writer.finish();
        self.record(result);
        debug!(
            backend   = self.writer.backend(),
            %final_tick,
            snapshots = self.snapshot_rows,
            summaries = self.summary_rows,
            dropped   = self.dropped,
            "output finished"
        );
    }
}
