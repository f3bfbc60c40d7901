//! Plain-text board rendering.

use std::fmt;

use crate::action::Direction;

use super::{AgentRole, Cell, GameStateData};

const FOOD: char = '.';
const WALL: char = '%';
const CAPSULE: char = 'o';
const GHOST: char = 'G';

/// Mouth opens away from the direction of travel.
fn pacman_glyph(direction: Direction) -> char {
    match direction {
        Direction::North => 'v',
        Direction::South => '^',
        Direction::West => '>',
        _ => '<',
    }
}

impl fmt::Display for GameStateData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let walls = self.layout.walls();
        let (width, height) = (walls.width(), walls.height());
        let mut board = vec![vec![' '; width]; height];

        for (y, row) in board.iter_mut().enumerate() {
            for (x, glyph) in row.iter_mut().enumerate() {
                let cell = Cell::new(x as i32, y as i32);
                if self.food.get(cell) {
                    *glyph = FOOD;
                } else if walls.get(cell) {
                    *glyph = WALL;
                }
            }
        }

        let mut put = |cell: Cell, glyph: char| {
            if let (Ok(x), Ok(y)) = (usize::try_from(cell.x), usize::try_from(cell.y)) {
                if let Some(slot) = board.get_mut(y).and_then(|row| row.get_mut(x)) {
                    *slot = glyph;
                }
            }
        };
        for agent in self.agents() {
            let glyph = match agent.role {
                AgentRole::Pacman => pacman_glyph(agent.direction()),
                AgentRole::Ghost => GHOST,
            };
            put(agent.position().nearest_cell(), glyph);
        }
        for &capsule in self.capsules.iter() {
            put(capsule, CAPSULE);
        }

        for row in board.iter().rev() {
            let line: String = row.iter().collect();
            writeln!(f, "{line}")?;
        }
        write!(f, "Score: {}", self.score)
    }
}
