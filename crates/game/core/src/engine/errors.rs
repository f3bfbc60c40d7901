//! Error types for the transition pipeline.

use crate::action::{ActionTransition, GhostMove, MoveError, PacmanMove};
use crate::error::{ErrorSeverity, GameError};

/// Identifies which stage of the transition pipeline produced an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TransitionPhase {
    PreValidate,
    Apply,
    PostValidate,
}

impl TransitionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransitionPhase::PreValidate => "pre_validate",
            TransitionPhase::Apply => "apply",
            TransitionPhase::PostValidate => "post_validate",
        }
    }
}

/// Associates a transition phase with the underlying error.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransitionPhaseError<E> {
    pub phase: TransitionPhase,
    pub error: E,
}

impl<E> TransitionPhaseError<E> {
    pub fn new(phase: TransitionPhase, error: E) -> Self {
        Self { phase, error }
    }
}

impl<E: std::fmt::Display> std::fmt::Display for TransitionPhaseError<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} failed: {}", self.phase.as_str(), self.error)
    }
}

impl<E: std::fmt::Display + std::fmt::Debug> std::error::Error for TransitionPhaseError<E> {}

/// Errors surfaced while producing a successor snapshot.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExecuteError {
    #[error("cannot generate a successor of a terminal state (agent {agent} asked to move)")]
    TerminalState { agent: usize },

    #[error("agent index {agent} out of range for {num_agents} agents")]
    UnknownAgent { agent: usize, num_agents: usize },

    #[error("pacman move failed: {0}")]
    Pacman(TransitionPhaseError<<PacmanMove as ActionTransition>::Error>),

    #[error("ghost move failed: {0}")]
    Ghost(TransitionPhaseError<<GhostMove as ActionTransition>::Error>),
}

impl ExecuteError {
    fn move_error(&self) -> Option<&MoveError> {
        match self {
            Self::Pacman(phase_error) | Self::Ghost(phase_error) => Some(&phase_error.error),
            _ => None,
        }
    }

    /// True when an agent asked for an action outside its legal set.
    pub fn is_illegal_action(&self) -> bool {
        matches!(self.move_error(), Some(MoveError::IllegalAction { .. }))
    }

    pub fn is_terminal_state(&self) -> bool {
        matches!(self, Self::TerminalState { .. })
    }
}

impl GameError for ExecuteError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::TerminalState { .. } => ErrorSeverity::Internal,
            Self::UnknownAgent { .. } => ErrorSeverity::Validation,
            Self::Pacman(phase_error) | Self::Ghost(phase_error) => phase_error.error.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::TerminalState { .. } => "EXECUTE_TERMINAL_STATE",
            Self::UnknownAgent { .. } => "EXECUTE_UNKNOWN_AGENT",
            Self::Pacman(phase_error) | Self::Ghost(phase_error) => phase_error.error.error_code(),
        }
    }
}
