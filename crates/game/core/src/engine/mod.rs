//! Successor generation.
//!
//! The [`GameEngine`] is the only code that mutates a [`GameStateData`]. It
//! routes the acting agent's move through the three-phase transition
//! pipeline, then applies the role-specific bookkeeping (time penalty or
//! scared-timer countdown), resolves collisions and folds the step's score
//! change into the running score.

mod errors;
pub mod rules;
mod transition;

pub use errors::{ExecuteError, TransitionPhase, TransitionPhaseError};

use crate::action::{Direction, GhostMove, PacmanMove};
use crate::state::{AgentRole, GameStateData};

use transition::drive_transition;

/// Applies one agent action to a snapshot in place.
///
/// Callers hand the engine a fresh copy (see [`crate::GameState::generate_successor`]);
/// on error the copy is left half-updated and must be discarded.
pub struct GameEngine<'a> {
    state: &'a mut GameStateData,
}

impl<'a> GameEngine<'a> {
    pub fn new(state: &'a mut GameStateData) -> Self {
        Self { state }
    }

    pub fn execute(&mut self, agent: usize, action: Direction) -> Result<(), ExecuteError> {
        if self.state.is_terminal() {
            return Err(ExecuteError::TerminalState { agent });
        }
        let role = self
            .state
            .agent(agent)
            .map(|agent_state| agent_state.role)
            .ok_or(ExecuteError::UnknownAgent {
                agent,
                num_agents: self.state.num_agents(),
            })?;

        match role {
            AgentRole::Pacman => {
                self.state.reset_eaten();
                drive_transition(&PacmanMove::new(agent, action), self.state)
                    .map_err(ExecuteError::Pacman)?;
                self.state.score_change -= self.state.config.time_penalty;
            }
            AgentRole::Ghost => {
                drive_transition(&GhostMove::new(agent, action), self.state)
                    .map_err(ExecuteError::Ghost)?;
                rules::decrement_timer(self.state, agent);
            }
        }

        rules::check_death(self.state, agent);

        self.state.agent_moved = Some(agent);
        self.state.score += self.state.score_change;
        Ok(())
    }
}
