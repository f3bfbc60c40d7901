//! Per-agent pose and status.

use std::hash::{Hash, Hasher};

use crate::action::Direction;

use super::common::{Cell, Position};

/// An agent's pose: continuous position plus facing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Configuration {
    pub position: Position,
    pub direction: Direction,
}

impl Configuration {
    pub const fn new(position: Position, direction: Direction) -> Self {
        Self {
            position,
            direction,
        }
    }

    /// Pose at a start cell, facing `Stop`.
    pub fn at_cell(cell: Cell) -> Self {
        Self::new(cell.to_position(), Direction::Stop)
    }

    /// Pose after moving by `(dx, dy)`.
    ///
    /// The new facing is the direction implied by the vector; a zero vector
    /// keeps the current facing.
    #[must_use]
    pub fn successor(&self, dx: f64, dy: f64) -> Self {
        let direction = match Direction::from_vector(dx, dy) {
            Direction::Stop => self.direction,
            moved => moved,
        };
        Self::new(self.position.offset(dx, dy), direction)
    }

    pub fn is_grid_aligned(&self, tolerance: f64) -> bool {
        self.position.is_grid_aligned(tolerance)
    }
}

/// Whether an agent collects food or chases the one that does.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AgentRole {
    Pacman,
    Ghost,
}

/// Mutable status of one agent inside a snapshot.
///
/// Two agent states compare equal when their pose and scared timer match;
/// the start pose and carry counters are bookkeeping and do not
/// distinguish otherwise interchangeable states.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AgentState {
    pub start: Configuration,
    pub configuration: Configuration,
    pub role: AgentRole,
    /// Remaining pursuer turns during which this agent is vulnerable.
    pub scared_timer: u32,
    pub num_carrying: u32,
    pub num_returned: u32,
}

impl AgentState {
    pub fn new(start: Configuration, role: AgentRole) -> Self {
        Self {
            start,
            configuration: start,
            role,
            scared_timer: 0,
            num_carrying: 0,
            num_returned: 0,
        }
    }

    pub fn is_pacman(&self) -> bool {
        self.role == AgentRole::Pacman
    }

    pub fn is_scared(&self) -> bool {
        self.scared_timer > 0
    }

    pub fn position(&self) -> Position {
        self.configuration.position
    }

    pub fn direction(&self) -> Direction {
        self.configuration.direction
    }

    /// Puts the agent back on its start pose.
    pub fn reset_to_start(&mut self) {
        self.configuration = self.start;
    }
}

impl PartialEq for AgentState {
    fn eq(&self, other: &Self) -> bool {
        self.configuration == other.configuration && self.scared_timer == other.scared_timer
    }
}

impl Eq for AgentState {}

impl Hash for AgentState {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.configuration.hash(state);
        self.scared_timer.hash(state);
    }
}
