//! Scoring and collision rules applied around each move.

use crate::config::GameConfig;
use crate::state::{Cell, GameStateData, PACMAN_INDEX, Position};

/// Eats the food or capsule on `cell`, if any.
///
/// Clearing the last food cell wins the game unless it is already lost.
/// A capsule scares every pursuer for [`GameConfig::scared_time`] turns.
pub fn consume(state: &mut GameStateData, cell: Cell) {
    if state.clear_food(cell) {
        state.score_change += GameConfig::FOOD_REWARD;
        state.food_eaten = Some(cell);
        if state.food.count(true) == 0 && !state.lose {
            state.score_change += GameConfig::WIN_BONUS;
            state.win = true;
        }
    }

    if state.remove_capsule(cell) {
        state.capsule_eaten = Some(cell);
        let scared_time = state.config.scared_time;
        for index in 0..state.num_agents() {
            if index == PACMAN_INDEX {
                continue;
            }
            if let Some(ghost) = state.agent_mut(index) {
                ghost.scared_timer = scared_time;
            }
        }
    }
}

/// Counts down a pursuer's scared timer, snapping it back onto the grid on
/// the turn it stops being scared.
pub fn decrement_timer(state: &mut GameStateData, agent: usize) {
    if !state.agent(agent).is_some_and(|ghost| ghost.is_scared()) {
        return;
    }
    if let Some(ghost) = state.agent_mut(agent) {
        if ghost.scared_timer == 1 {
            ghost.configuration.position = ghost.position().nearest_cell().to_position();
        }
        ghost.scared_timer -= 1;
    }
}

/// Whether the mover at `pacman` and a pursuer at `ghost` are close enough to collide.
pub fn can_kill(pacman: Position, ghost: Position, tolerance: f64) -> bool {
    ghost.manhattan(pacman) <= tolerance
}

/// Resolves collisions caused by `agent`'s move.
///
/// After the mover's own move every pursuer is checked; after a pursuer's
/// move only that pursuer is.
pub fn check_death(state: &mut GameStateData, agent: usize) {
    let Some(pacman) = state.agent(PACMAN_INDEX).map(|pacman| pacman.position()) else {
        return;
    };
    let tolerance = state.config.collision_tolerance;

    let candidates = if agent == PACMAN_INDEX {
        1..state.num_agents()
    } else {
        agent..agent + 1
    };
    for index in candidates {
        let touching = state
            .agent(index)
            .is_some_and(|ghost| can_kill(pacman, ghost.position(), tolerance));
        if touching {
            collide(state, index);
        }
    }
}

/// Applies the outcome of the mover touching pursuer `ghost`.
pub fn collide(state: &mut GameStateData, ghost: usize) {
    let scared = state.agent(ghost).is_some_and(|agent| agent.is_scared());
    if scared {
        state.score_change += GameConfig::GHOST_EATEN_BONUS;
        if let Some(agent) = state.agent_mut(ghost) {
            agent.reset_to_start();
            agent.scared_timer = 0;
        }
        if let Some(eaten) = state.eaten.get_mut(ghost) {
            *eaten = true;
        }
    } else if !state.win {
        state.score_change -= GameConfig::DEATH_PENALTY;
        state.lose = true;
    }
}
