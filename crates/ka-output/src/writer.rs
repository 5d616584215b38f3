//! The backend seam between the observer and whatever stores the trace.

use crate::{AgentSnapshotRow, OutputResult, TickSummaryRow};

/// A destination for snapshot and summary rows.
///
/// [`SimOutputObserver`](crate::SimOutputObserver) calls these from inside
/// the tick loop and keeps the first error it sees; a failing backend never
/// stops the run.
pub trait OutputWriter {
    /// Short name for log lines.
    fn backend(&self) -> &'static str {
        "writer"
    }

    /// One snapshot's rows, ascending `agent_id`.
    fn write_snapshots(&mut self, rows: &[AgentSnapshotRow]) -> OutputResult<()>;

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()>;

    /// Flush everything.  A second call is a no-op; writes after the first
    /// call fail with [`OutputError::Finished`](crate::OutputError::Finished).
    fn finish(&mut self) -> OutputResult<()>;
}
