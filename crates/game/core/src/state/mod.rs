//! Snapshots of a running game.
//!
//! [`GameStateData`] is the raw snapshot; [`GameState`] is the public view
//! agents and the runtime pass around. Successors are built copy-on-write:
//! the food grid, capsule list and every agent sit behind `Arc`s and a
//! transition only clones the pieces it mutates.
mod digest;
mod explored;
mod game_state;
mod render;
pub mod types;

use std::hash::{Hash, Hasher};
use std::sync::Arc;

pub use explored::ExploredStates;
pub use game_state::GameState;
pub use types::{AgentRole, AgentState, Cell, Configuration, Grid, GridError, Position};

use crate::config::GameConfig;
use crate::env::Layout;

/// Index of the primary mover in every agent list.
pub const PACMAN_INDEX: usize = 0;

/// One simulation snapshot plus the annotations describing the step that
/// produced it.
///
/// Equality and hashing cover agents, food, capsules and score; the step
/// annotations, layout and rule configuration are not part of a snapshot's
/// identity.
#[derive(Clone, Debug)]
pub struct GameStateData {
    pub(crate) layout: Arc<Layout>,
    pub(crate) config: GameConfig,
    pub(crate) food: Arc<Grid>,
    pub(crate) capsules: Arc<Vec<Cell>>,
    pub(crate) agents: Vec<Arc<AgentState>>,
    /// Pursuers sent home during the current round, for presentation.
    pub(crate) eaten: Vec<bool>,
    pub(crate) score: i64,
    pub(crate) score_change: i64,
    pub(crate) food_eaten: Option<Cell>,
    pub(crate) capsule_eaten: Option<Cell>,
    pub(crate) agent_moved: Option<usize>,
    pub(crate) win: bool,
    pub(crate) lose: bool,
}

impl GameStateData {
    /// Initial snapshot for `layout` with at most `num_ghost_agents` pursuers.
    pub fn initial(layout: Arc<Layout>, num_ghost_agents: usize, config: GameConfig) -> Self {
        let mut ghosts = 0;
        let agents: Vec<Arc<AgentState>> = layout
            .agent_starts()
            .iter()
            .filter(|start| match start.role {
                AgentRole::Pacman => true,
                AgentRole::Ghost => {
                    ghosts += 1;
                    ghosts <= num_ghost_agents
                }
            })
            .map(|start| Arc::new(AgentState::new(Configuration::at_cell(start.cell), start.role)))
            .collect();

        Self {
            food: Arc::new(layout.food().clone()),
            capsules: Arc::new(layout.capsules().to_vec()),
            eaten: vec![false; agents.len()],
            agents,
            layout,
            config,
            score: 0,
            score_change: 0,
            food_eaten: None,
            capsule_eaten: None,
            agent_moved: None,
            win: false,
            lose: false,
        }
    }

    /// Copy that shares every substructure and clears the per-step annotations.
    pub(crate) fn successor(&self) -> Self {
        Self {
            score_change: 0,
            food_eaten: None,
            capsule_eaten: None,
            agent_moved: None,
            ..self.clone()
        }
    }

    pub fn layout(&self) -> &Arc<Layout> {
        &self.layout
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn food(&self) -> &Grid {
        &self.food
    }

    pub fn capsules(&self) -> &[Cell] {
        &self.capsules
    }

    pub fn num_agents(&self) -> usize {
        self.agents.len()
    }

    pub fn agent(&self, index: usize) -> Option<&AgentState> {
        self.agents.get(index).map(Arc::as_ref)
    }

    pub fn agents(&self) -> impl Iterator<Item = &AgentState> {
        self.agents.iter().map(Arc::as_ref)
    }

    /// Mutable access to one agent, cloning it first if another snapshot
    /// still shares it.
    pub fn agent_mut(&mut self, index: usize) -> Option<&mut AgentState> {
        self.agents.get_mut(index).map(Arc::make_mut)
    }

    pub fn eaten(&self) -> &[bool] {
        &self.eaten
    }

    pub fn score(&self) -> i64 {
        self.score
    }

    pub fn set_score(&mut self, score: i64) {
        self.score = score;
    }

    /// Points gained or lost by the step that produced this snapshot.
    pub fn score_change(&self) -> i64 {
        self.score_change
    }

    pub fn food_eaten(&self) -> Option<Cell> {
        self.food_eaten
    }

    pub fn capsule_eaten(&self) -> Option<Cell> {
        self.capsule_eaten
    }

    pub fn agent_moved(&self) -> Option<usize> {
        self.agent_moved
    }

    pub fn is_win(&self) -> bool {
        self.win
    }

    pub fn is_lose(&self) -> bool {
        self.lose
    }

    pub fn is_terminal(&self) -> bool {
        self.win || self.lose
    }

    pub(crate) fn clear_food(&mut self, cell: Cell) -> bool {
        if !self.food.get(cell) {
            return false;
        }
        Arc::make_mut(&mut self.food).set(cell, false)
    }

    pub(crate) fn remove_capsule(&mut self, cell: Cell) -> bool {
        if !self.capsules.contains(&cell) {
            return false;
        }
        Arc::make_mut(&mut self.capsules).retain(|&capsule| capsule != cell);
        true
    }

    pub(crate) fn reset_eaten(&mut self) {
        self.eaten.iter_mut().for_each(|eaten| *eaten = false);
    }
}

impl PartialEq for GameStateData {
    fn eq(&self, other: &Self) -> bool {
        self.agents == other.agents
            && self.food == other.food
            && self.capsules == other.capsules
            && self.score == other.score
    }
}

impl Eq for GameStateData {}

impl Hash for GameStateData {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.agents.hash(state);
        self.food.hash(state);
        self.capsules.hash(state);
        self.score.hash(state);
    }
}
