//! Legal-action enumeration.

use crate::config::GameConfig;
use crate::env::Layout;
use crate::state::{AgentRole, Cell, Configuration, GameStateData, PACMAN_INDEX, Position};

use super::Direction;

/// Actions a pose allows, before role-specific restrictions.
///
/// Mid-transit the only option is to keep going; on a cell every cardinal
/// direction not blocked by a wall is allowed, plus `Stop`. Cells outside
/// the board count as walls.
pub fn possible_actions(configuration: &Configuration, layout: &Layout) -> Vec<Direction> {
    if !configuration.is_grid_aligned(GameConfig::GRID_TOLERANCE) {
        return vec![configuration.direction];
    }

    let cell = configuration.position.nearest_cell();
    Direction::ALL
        .into_iter()
        .filter(|&direction| {
            let (dx, dy) = direction.delta();
            !layout.is_wall(Cell::new(cell.x + dx, cell.y + dy))
        })
        .collect()
}

/// Open cells one step away from the cell nearest `position`, in
/// [`Direction::ALL`] order. `Stop` contributes the cell itself when open.
pub fn legal_neighbors(position: Position, layout: &Layout) -> Vec<Cell> {
    let cell = position.nearest_cell();
    Direction::ALL
        .into_iter()
        .map(|direction| {
            let (dx, dy) = direction.delta();
            Cell::new(cell.x + dx, cell.y + dy)
        })
        .filter(|&neighbor| !layout.is_wall(neighbor))
        .collect()
}

/// Position one full step from `position` in `action`'s direction, ignoring walls.
pub fn successor(position: Position, action: Direction) -> Position {
    let (dx, dy) = action.vector(1.0);
    position.offset(dx, dy)
}

/// Legal actions of the primary mover.
pub fn pacman_legal_actions(state: &GameStateData) -> Vec<Direction> {
    state
        .agent(PACMAN_INDEX)
        .map(|pacman| possible_actions(&pacman.configuration, state.layout()))
        .unwrap_or_default()
}

/// Legal actions of a pursuer: never `Stop`, and no reversal unless the
/// reverse is the only way out.
pub fn ghost_legal_actions(state: &GameStateData, agent: usize) -> Vec<Direction> {
    let Some(ghost) = state.agent(agent) else {
        return Vec::new();
    };
    let configuration = &ghost.configuration;
    let mut actions = possible_actions(configuration, state.layout());
    actions.retain(|&action| action != Direction::Stop);

    let reverse = configuration.direction.reverse();
    if actions.len() > 1 {
        actions.retain(|&action| action != reverse);
    }
    actions
}

/// Legal actions for any agent; empty once the game is over.
pub fn legal_actions(state: &GameStateData, agent: usize) -> Vec<Direction> {
    if state.is_terminal() {
        return Vec::new();
    }
    match state.agent(agent).map(|agent| agent.role) {
        Some(AgentRole::Pacman) => pacman_legal_actions(state),
        Some(AgentRole::Ghost) => ghost_legal_actions(state, agent),
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> Layout {
        Layout::from_text(
            "%%%%%\n\
             %P..%\n\
             %.%G%\n\
             %%%%%",
        )
        .unwrap()
    }

    #[test]
    fn neighbors_include_own_cell_and_skip_walls() {
        let neighbors = legal_neighbors(Position::new(1.0, 2.0), &layout());
        assert_eq!(neighbors, vec![Cell::new(1, 1), Cell::new(2, 2), Cell::new(1, 2)]);
    }

    #[test]
    fn neighbors_round_to_the_nearest_cell() {
        let neighbors = legal_neighbors(Position::new(2.6, 2.0), &layout());
        assert_eq!(neighbors, vec![Cell::new(3, 1), Cell::new(2, 2), Cell::new(3, 2)]);
    }

    #[test]
    fn successor_moves_one_step_regardless_of_walls() {
        let start = Position::new(1.0, 2.0);
        assert_eq!(successor(start, Direction::North), Position::new(1.0, 3.0));
        assert_eq!(successor(start, Direction::West), Position::new(0.0, 2.0));
        assert_eq!(successor(start, Direction::Stop), start);
    }
}
