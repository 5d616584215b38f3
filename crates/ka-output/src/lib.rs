//! `ka-output` — simulation output writers and the run digest.
//!
//! | Type                  | What it does                                            |
//! |-----------------------|---------------------------------------------------------|
//! | [`CsvWriter`]         | `agent_snapshots.csv`, `tick_summaries.csv`             |
//! | [`SimOutputObserver`] | drives any [`OutputWriter`] from `ka_sim::SimObserver`  |
//! | [`TraceDigest`]       | folds every summary and snapshot into one `u64`         |
//!
//! # Usage
//!
//! ```rust,ignore
//! use ka_output::{CsvWriter, SimOutputObserver, TraceDigest};
//!
//! let writer = CsvWriter::new(Path::new("./output"))?;
//! let mut obs = (SimOutputObserver::new(writer), TraceDigest::new());
//! sim.run(&mut obs)?;
//! if let Some(e) = obs.0.take_error() {
//!     eprintln!("output error: {e}");
//! }
//! println!("digest {}", obs.1);
//! ```

pub mod csv;
pub mod digest;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;

#[cfg(test)]
mod tests;

pub use csv::CsvWriter;
pub use digest::TraceDigest;
pub use error::{OutputError, OutputResult};
pub use observer::SimOutputObserver;
pub use row::{AgentSnapshotRow, TickSummaryRow};
pub use writer::OutputWriter;
