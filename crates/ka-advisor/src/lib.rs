//! `ka-advisor` — the optional external decision source.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                   |
//! |----------------|------------------------------------------------------------|
//! | [`decision`]   | `AdvisorAction`, `Decision`, `Advice`, `DecisionOrigin`, `parse_decision` |
//! | [`context`]    | `AdvisorContext`, the situation snapshot sent with a request |
//! | [`fallback`]   | `fallback_decision`, the local decision table              |
//! | [`provider`]   | `DecisionProvider`, `MockProvider`, `ScriptedProvider`     |
//! | [`advisor`]    | `Advisor` trait, `ChannelAdvisor`, `InlineAdvisor`         |
//! | [`error`]      | `AdvisorError`, `AdvisorResult<T>`                         |
//!
//! Nothing on this path can stop the simulation.  An absent advisor means the
//! fallback table; a failing provider means the fallback table, and the
//! decision is recorded as a fallback; an unreadable reply means an
//! `unknown` decision that is logged and dropped.

pub mod advisor;
pub mod context;
pub mod decision;
pub mod error;
pub mod fallback;
pub mod provider;

#[cfg(test)]
mod tests;

pub use advisor::{Advisor, ChannelAdvisor, InlineAdvisor};
pub use context::AdvisorContext;
pub use decision::{Advice, AdvisorAction, Decision, DecisionOrigin, parse_decision};
pub use error::{AdvisorError, AdvisorResult};
pub use fallback::fallback_decision;
pub use provider::{DecisionProvider, MockProvider, ScriptedProvider, resolve};
