//! The `Advisor` protocol and its two implementations.
//!
//! # Protocol
//!
//! `submit` is fire-and-forget; `poll` returns a ready decision at most once.
//! The tick loop never waits on either.
//!
//! # Implementations
//!
//! - [`ChannelAdvisor`] owns a worker thread.  Requests go over one channel,
//!   decisions come back over another and land in a table keyed by agent
//!   when the engine polls.  Arrival timing depends on the worker, so runs
//!   using it are only reproducible if the provider is.
//! - [`InlineAdvisor`] resolves on `submit` and hands the decision out on
//!   the next `poll`.  Same protocol, no thread, fully deterministic.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use ka_core::AgentId;

use crate::{Advice, AdvisorContext, AdvisorError, AdvisorResult, DecisionProvider, resolve};

/// An optional, possibly slow, external source of decisions.
pub trait Advisor: Send {
    fn name(&self) -> &str;

    /// Queue a request for `agent`.  Never blocks.
    fn submit(&mut self, agent: AgentId, ctx: AdvisorContext) -> AdvisorResult<()>;

    /// Take `agent`'s ready decision, if any, with its origin.
    fn poll(&mut self, agent: AgentId) -> Option<Advice>;
}

// ── ChannelAdvisor ────────────────────────────────────────────────────────────

struct Request {
    agent: AgentId,
    ctx:   AdvisorContext,
}

/// Off-thread advisor.  Dropping it closes the request channel and joins the
/// worker.
pub struct ChannelAdvisor {
    name:      String,
    requests:  Option<Sender<Request>>,
    responses: Receiver<(AgentId, Advice)>,
    ready:     FxHashMap<AgentId, Advice>,
    worker:    Option<JoinHandle<()>>,
}

impl ChannelAdvisor {
    /// Spawn a worker that serves requests with `provider`.
    pub fn spawn<P: DecisionProvider + 'static>(provider: P) -> Self {
        let name = provider.name().to_owned();
        let (req_tx, req_rx) = mpsc::channel::<Request>();
        let (resp_tx, resp_rx) = mpsc::channel();

        let worker = thread::Builder::new()
            .name(format!("advisor-{name}"))
            .spawn(move || worker_main(provider, req_rx, resp_tx))
            .ok();
        if worker.is_none() {
            warn!(provider = %name, "could not start advisor worker; requests will fail");
        }

        Self { name, requests: Some(req_tx), responses: resp_rx, ready: FxHashMap::default(), worker }
    }

    /// Move everything the worker has finished into the ready table.
    fn drain(&mut self) {
        while let Ok((agent, advice)) = self.responses.try_recv() {
            // A newer reply replaces an unread older one.
            self.ready.insert(agent, advice);
        }
    }

    /// Decisions ready but not yet polled.
    pub fn ready_len(&mut self) -> usize {
        self.drain();
        self.ready.len()
    }
}

fn worker_main<P: DecisionProvider>(
    mut provider: P,
    requests:     Receiver<Request>,
    responses:    Sender<(AgentId, Advice)>,
) {
    // Ends when the advisor is dropped and the request channel closes.
    while let Ok(Request { agent, ctx }) = requests.recv() {
        let advice = resolve(&mut provider, agent, &ctx);
        if responses.send((agent, advice)).is_err() {
            break;
        }
    }
    debug!(provider = provider.name(), "advisor worker stopped");
}

impl Advisor for ChannelAdvisor {
    fn name(&self) -> &str {
        &self.name
    }

    fn submit(&mut self, agent: AgentId, ctx: AdvisorContext) -> AdvisorResult<()> {
        let tx = self.requests.as_ref().ok_or(AdvisorError::Disconnected)?;
        tx.send(Request { agent, ctx }).map_err(|_| AdvisorError::Disconnected)
    }

    fn poll(&mut self, agent: AgentId) -> Option<Advice> {
        self.drain();
        self.ready.remove(&agent)
    }
}

impl Drop for ChannelAdvisor {
    fn drop(&mut self) {
        self.requests.take();
        if let Some(handle) = self.worker.take() {
            if handle.join().is_err() {
                warn!(provider = %self.name, "advisor worker panicked");
            }
        }
    }
}

impl std::fmt::Debug for ChannelAdvisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelAdvisor")
            .field("name", &self.name)
            .field("ready", &self.ready.len())
            .finish()
    }
}

// ── InlineAdvisor ─────────────────────────────────────────────────────────────

/// Resolves on submit; the decision becomes visible on the next poll.
#[derive(Debug)]
pub struct InlineAdvisor<P> {
    provider: P,
    ready:    FxHashMap<AgentId, Advice>,
}

impl<P: DecisionProvider> InlineAdvisor<P> {
    pub fn new(provider: P) -> Self {
        Self { provider, ready: FxHashMap::default() }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }
}

impl<P: DecisionProvider> Advisor for InlineAdvisor<P> {
    fn name(&self) -> &str {
        self.provider.name()
    }

    fn submit(&mut self, agent: AgentId, ctx: AdvisorContext) -> AdvisorResult<()> {
        let advice = resolve(&mut self.provider, agent, &ctx);
        self.ready.insert(agent, advice);
        Ok(())
    }

    fn poll(&mut self, agent: AgentId) -> Option<Advice> {
        self.ready.remove(&agent)
    }
}
