//! Capability interface implemented by anything that plays the game.
//!
//! Agents are ordinary synchronous code: the runtime gives each one its own
//! worker thread and enforces time budgets from the outside, so a callback
//! is free to block or spin. Long-running agents should poll
//! [`CallContext::is_cancelled`] and give up once their deadline has passed.
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use bitflags::bitflags;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use pacman_core::{Direction, GameState};

bitflags! {
    /// Optional callbacks an agent implements, read once at registration.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Capabilities: u8 {
        const REGISTER_INITIAL_STATE = 1 << 0;
        const OBSERVE = 1 << 1;
        const FINAL = 1 << 2;
    }
}

/// Per-call information handed to every agent callback.
#[derive(Clone, Debug)]
pub struct CallContext {
    agent: usize,
    deadline: Option<Instant>,
    cancelled: Arc<AtomicBool>,
}

impl CallContext {
    pub(crate) fn new(agent: usize, budget: Duration) -> Self {
        Self {
            agent,
            deadline: Instant::now().checked_add(budget),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Index of the agent being called.
    pub fn agent(&self) -> usize {
        self.agent
    }

    /// Instant after which the result will be discarded, if bounded.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn remaining(&self) -> Duration {
        self.deadline
            .map_or(Duration::MAX, |deadline| {
                deadline.saturating_duration_since(Instant::now())
            })
    }

    /// Set once the controller has stopped waiting for this call.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    pub(crate) fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }
}

/// A game participant.
///
/// Only [`Agent::get_action`] is required. The optional hooks default to
/// no-ops and are only invoked when [`Agent::capabilities`] lists them.
pub trait Agent: Send {
    fn capabilities(&self) -> Capabilities {
        Capabilities::empty()
    }

    /// Called once before the first turn with a private copy of the initial state.
    fn register_initial_state(
        &mut self,
        _state: &GameState,
        _ctx: &CallContext,
    ) -> anyhow::Result<()> {
        Ok(())
    }

    /// Filters the state this agent gets to see before choosing an action.
    fn observe(&mut self, state: GameState, _ctx: &CallContext) -> anyhow::Result<GameState> {
        Ok(state)
    }

    /// Chooses one of `state.legal_actions(ctx.agent())`.
    fn get_action(&mut self, state: &GameState, ctx: &CallContext) -> anyhow::Result<Direction>;

    /// Called once with the final state after the run ends.
    fn final_state(&mut self, _state: &GameState) -> anyhow::Result<()> {
        Ok(())
    }
}

impl<A: Agent + ?Sized> Agent for Box<A> {
    fn capabilities(&self) -> Capabilities {
        (**self).capabilities()
    }

    fn register_initial_state(
        &mut self,
        state: &GameState,
        ctx: &CallContext,
    ) -> anyhow::Result<()> {
        (**self).register_initial_state(state, ctx)
    }

    fn observe(&mut self, state: GameState, ctx: &CallContext) -> anyhow::Result<GameState> {
        (**self).observe(state, ctx)
    }

    fn get_action(&mut self, state: &GameState, ctx: &CallContext) -> anyhow::Result<Direction> {
        (**self).get_action(state, ctx)
    }

    fn final_state(&mut self, state: &GameState) -> anyhow::Result<()> {
        (**self).final_state(state)
    }
}

/// Picks uniformly among the legal actions using a seeded generator.
/// Useful for demos, batch smoke runs and as a stand-in opponent.
pub struct RandomAgent {
    rng: StdRng,
}

impl RandomAgent {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Agent for RandomAgent {
    fn get_action(&mut self, state: &GameState, ctx: &CallContext) -> anyhow::Result<Direction> {
        let legal = state.legal_actions(ctx.agent());
        legal
            .choose(&mut self.rng)
            .copied()
            .ok_or_else(|| anyhow::anyhow!("agent {} has no legal actions", ctx.agent()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancellation_is_shared_between_clones() {
        let ctx = CallContext::new(2, Duration::from_secs(1));
        let observer = ctx.clone();

        assert!(!observer.is_cancelled());
        ctx.cancel();
        assert!(observer.is_cancelled());
        assert_eq!(observer.agent(), 2);
    }

    #[test]
    fn unbounded_budget_has_no_deadline() {
        let ctx = CallContext::new(0, Duration::MAX);
        assert!(ctx.deadline().is_none());
        assert_eq!(ctx.remaining(), Duration::MAX);
    }
}
