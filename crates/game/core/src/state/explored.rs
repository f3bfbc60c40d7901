use std::collections::HashSet;

use super::GameState;

/// Set of snapshots visited while auditing agent behaviour.
///
/// Owned by whoever drives the game (usually the runtime controller) and
/// passed explicitly to [`GameState::generate_successor_tracked`]; it has
/// no effect on gameplay.
#[derive(Clone, Debug, Default)]
pub struct ExploredStates {
    states: HashSet<GameState>,
}

impl ExploredStates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the state was not seen before.
    pub fn record(&mut self, state: GameState) -> bool {
        self.states.insert(state)
    }

    pub fn contains(&self, state: &GameState) -> bool {
        self.states.contains(state)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn snapshot(&self) -> HashSet<GameState> {
        self.states.clone()
    }

    /// Returns everything recorded so far and starts over with an empty set.
    pub fn reset(&mut self) -> HashSet<GameState> {
        std::mem::take(&mut self.states)
    }
}
