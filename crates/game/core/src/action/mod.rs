//! Agent actions and the transitions that apply them.
//!
//! - `direction`: the action vocabulary ([`Direction`])
//! - `available`: legal-action enumeration per role
//! - `movement`: [`PacmanMove`] / [`GhostMove`] transitions
mod available;
mod direction;
mod movement;

pub use available::{
    ghost_legal_actions, legal_actions, legal_neighbors, pacman_legal_actions, possible_actions,
    successor,
};
pub use direction::Direction;
pub use movement::{GhostMove, MoveError, PacmanMove};

use crate::state::GameStateData;

/// Defines how a concrete action variant mutates a snapshot.
pub trait ActionTransition {
    type Error;
    type Result;

    /// Index of the agent performing this action.
    fn agent(&self) -> usize;

    /// Validates pre-conditions using the snapshot **before** mutation.
    fn pre_validate(&self, _state: &GameStateData) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Applies the action by mutating the (freshly copied) snapshot.
    fn apply(&self, state: &mut GameStateData) -> Result<Self::Result, Self::Error>;

    /// Validates post-conditions using the snapshot **after** mutation.
    fn post_validate(&self, _state: &GameStateData) -> Result<(), Self::Error> {
        Ok(())
    }
}
