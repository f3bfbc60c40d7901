//! Worker threads that isolate agent code from the controller.
//!
//! Each agent runs on its own thread; the controller talks to it through an
//! [`AgentHandle`] and never waits longer than the call's budget.

mod agent;
mod output;

pub(crate) use agent::AgentHandle;
