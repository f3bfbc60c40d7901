use crate::action::ActionTransition;
use crate::config::GameConfig;
use crate::engine::rules;
use crate::error::{ErrorSeverity, GameError};
use crate::state::{Cell, GameStateData, Position};

use super::{Direction, ghost_legal_actions, pacman_legal_actions};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MoveError {
    #[error("agent {agent} is not part of this game")]
    UnknownAgent { agent: usize },

    #[error("agent {agent} cannot move {action}; legal actions are {legal:?}")]
    IllegalAction {
        agent: usize,
        action: Direction,
        legal: Vec<Direction>,
    },

    #[error("agent {agent} ended its move inside a wall at {cell}")]
    EnteredWall { agent: usize, cell: Cell },
}

impl GameError for MoveError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::UnknownAgent { .. } | Self::IllegalAction { .. } => ErrorSeverity::Validation,
            Self::EnteredWall { .. } => ErrorSeverity::Fatal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownAgent { .. } => "MOVE_UNKNOWN_AGENT",
            Self::IllegalAction { .. } => "MOVE_ILLEGAL_ACTION",
            Self::EnteredWall { .. } => "MOVE_ENTERED_WALL",
        }
    }
}

fn ensure_legal(agent: usize, action: Direction, legal: Vec<Direction>) -> Result<(), MoveError> {
    if legal.contains(&action) {
        Ok(())
    } else {
        Err(MoveError::IllegalAction {
            agent,
            action,
            legal,
        })
    }
}

fn ensure_open(state: &GameStateData, agent: usize) -> Result<(), MoveError> {
    let cell = state
        .agent(agent)
        .ok_or(MoveError::UnknownAgent { agent })?
        .position()
        .nearest_cell();
    if state.layout().is_wall(cell) {
        return Err(MoveError::EnteredWall { agent, cell });
    }
    Ok(())
}

/// Moves an agent one step at `speed` and returns where it ended up.
fn step(
    state: &mut GameStateData,
    agent: usize,
    direction: Direction,
    speed: f64,
) -> Result<Position, MoveError> {
    let agent_state = state
        .agent_mut(agent)
        .ok_or(MoveError::UnknownAgent { agent })?;
    let (dx, dy) = direction.vector(speed);
    agent_state.configuration = agent_state.configuration.successor(dx, dy);
    Ok(agent_state.position())
}

/// One step of the primary mover, followed by eating whatever it lands on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PacmanMove {
    pub agent: usize,
    pub direction: Direction,
}

impl PacmanMove {
    pub fn new(agent: usize, direction: Direction) -> Self {
        Self { agent, direction }
    }
}

impl ActionTransition for PacmanMove {
    type Error = MoveError;
    type Result = ();

    fn agent(&self) -> usize {
        self.agent
    }

    fn pre_validate(&self, state: &GameStateData) -> Result<(), Self::Error> {
        ensure_legal(self.agent, self.direction, pacman_legal_actions(state))
    }

    fn apply(&self, state: &mut GameStateData) -> Result<(), Self::Error> {
        let position = step(state, self.agent, self.direction, GameConfig::PACMAN_SPEED)?;

        let nearest = position.nearest_cell();
        if position.manhattan(nearest.to_position()) <= GameConfig::CONSUME_RADIUS {
            rules::consume(state, nearest);
        }
        Ok(())
    }

    fn post_validate(&self, state: &GameStateData) -> Result<(), Self::Error> {
        ensure_open(state, self.agent)
    }
}

/// One step of a pursuer; scared pursuers move at half speed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GhostMove {
    pub agent: usize,
    pub direction: Direction,
}

impl GhostMove {
    pub fn new(agent: usize, direction: Direction) -> Self {
        Self { agent, direction }
    }
}

impl ActionTransition for GhostMove {
    type Error = MoveError;
    type Result = ();

    fn agent(&self) -> usize {
        self.agent
    }

    fn pre_validate(&self, state: &GameStateData) -> Result<(), Self::Error> {
        ensure_legal(
            self.agent,
            self.direction,
            ghost_legal_actions(state, self.agent),
        )
    }

    fn apply(&self, state: &mut GameStateData) -> Result<(), Self::Error> {
        let scared = state
            .agent(self.agent)
            .ok_or(MoveError::UnknownAgent { agent: self.agent })?
            .is_scared();
        let speed = if scared {
            GameConfig::GHOST_SPEED / 2.0
        } else {
            GameConfig::GHOST_SPEED
        };
        step(state, self.agent, self.direction, speed)?;
        Ok(())
    }

    fn post_validate(&self, state: &GameStateData) -> Result<(), Self::Error> {
        ensure_open(state, self.agent)
    }
}
