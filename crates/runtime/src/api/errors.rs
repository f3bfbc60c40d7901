//! Unified error types surfaced by the runtime API.
//!
//! Agent misbehaviour is reported as an [`AgentFault`]: which agent, during
//! which call, and what went wrong. With fault isolation on the controller
//! records the fault and ends the run; with it off the fault is returned as
//! [`RuntimeError::Agent`].
use std::fmt;
use std::time::Duration;

use thiserror::Error;

use pacman_core::ExecuteError;

pub use crate::repository::RepositoryError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("controller requires an initial state before building")]
    MissingInitialState,

    #[error("initial state has {expected} agents but {provided} were supplied")]
    AgentCountMismatch { expected: usize, provided: usize },

    #[error("failed to spawn worker thread for agent {agent}")]
    WorkerSpawn {
        agent: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("game has already been run")]
    AlreadyRun,

    #[error(transparent)]
    Agent(#[from] AgentFault),

    #[error("rule engine refused to advance the game")]
    Engine(#[source] ExecuteError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Which agent callback was running when a fault occurred.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CallPhase {
    Startup,
    Observation,
    Action,
    Final,
}

impl fmt::Display for CallPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CallPhase::Startup => "startup",
            CallPhase::Observation => "observation",
            CallPhase::Action => "action",
            CallPhase::Final => "final",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Clone, Error)]
pub enum FaultKind {
    #[error("call exceeded its {budget:?} budget")]
    Timeout { budget: Duration },

    #[error("total time {total:?} exceeded the {budget:?} budget")]
    TotalTimeExceeded { total: Duration, budget: Duration },

    #[error("{warnings} slow moves exceeded the limit of {limit}")]
    TooManyWarnings { warnings: u32, limit: u32 },

    #[error("illegal action: {0}")]
    IllegalAction(#[source] ExecuteError),

    #[error("agent returned an error: {0}")]
    Error(String),

    #[error("agent panicked: {0}")]
    Panic(String),

    #[error("agent worker is no longer running")]
    WorkerGone,
}

impl FaultKind {
    /// A single call ran past its deadline.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Cumulative time or slow-move limits were exceeded.
    pub fn is_over_budget(&self) -> bool {
        matches!(
            self,
            Self::TotalTimeExceeded { .. } | Self::TooManyWarnings { .. }
        )
    }
}

/// A fault attributed to one agent.
#[derive(Debug, Clone, Error)]
#[error("agent {agent} faulted during {phase}: {kind}")]
pub struct AgentFault {
    pub agent: usize,
    pub phase: CallPhase,
    #[source]
    pub kind: FaultKind,
}

impl AgentFault {
    pub fn new(agent: usize, phase: CallPhase, kind: FaultKind) -> Self {
        Self { agent, phase, kind }
    }
}
