//! Text boards for tests and demos.
//!
//! ```text
//! %%%%%
//! %P.G%
//! %o  %
//! %%%%%
//! ```
//!
//! `%` wall, `.` food, `o` capsule, `P` pacman, `G` pursuer, space empty.
//! The first line is the top row.

use crate::state::{AgentRole, Cell, Grid};

use super::{AgentStart, Layout, LayoutError};

impl Layout {
    pub fn from_text(text: &str) -> Result<Self, LayoutError> {
        let rows: Vec<&str> = text
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.is_empty())
            .collect();
        let height = rows.len();
        let width = rows.first().map_or(0, |row| row.chars().count());

        let mut walls = Grid::new(width, height, false);
        let mut food = Grid::new(width, height, false);
        let mut capsules = Vec::new();
        let mut agent_starts = Vec::new();

        for (row, line) in rows.iter().enumerate() {
            let len = line.chars().count();
            if len != width {
                return Err(LayoutError::RaggedRows {
                    row,
                    len,
                    expected: width,
                });
            }
            let y = (height - 1 - row) as i32;
            for (column, symbol) in line.chars().enumerate() {
                let cell = Cell::new(column as i32, y);
                match symbol {
                    '%' => {
                        walls.set(cell, true);
                    }
                    '.' => {
                        food.set(cell, true);
                    }
                    'o' => capsules.push(cell),
                    'P' => agent_starts.push(AgentStart {
                        role: AgentRole::Pacman,
                        cell,
                    }),
                    'G' => agent_starts.push(AgentStart {
                        role: AgentRole::Ghost,
                        cell,
                    }),
                    ' ' => {}
                    symbol => {
                        return Err(LayoutError::UnknownSymbol {
                            symbol,
                            row,
                            column,
                        });
                    }
                }
            }
        }

        Layout::new(walls, food, capsules, agent_starts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_board_with_origin_bottom_left() {
        let layout = Layout::from_text(
            "%%%%%\n\
             %G.P%\n\
             %o  %\n\
             %%%%%",
        )
        .unwrap();

        assert_eq!((layout.width(), layout.height()), (5, 4));
        assert!(layout.food().get(Cell::new(2, 2)));
        assert_eq!(layout.capsules(), &[Cell::new(1, 1)]);
        assert_eq!(layout.agent_starts()[0].cell, Cell::new(3, 2));
        assert_eq!(layout.agent_starts()[1].role, AgentRole::Ghost);
        assert_eq!(layout.num_ghosts(), 1);
        assert!(layout.is_wall(Cell::new(0, 0)));
        assert!(layout.is_wall(Cell::new(-1, 2)));
    }

    #[test]
    fn rejects_board_without_pacman() {
        assert_eq!(
            Layout::from_text("%%%\n%.%\n%%%").unwrap_err(),
            LayoutError::MissingPacman
        );
    }

    #[test]
    fn rejects_ragged_rows() {
        let error = Layout::from_text("%%%\n%P\n%%%").unwrap_err();
        assert!(matches!(error, LayoutError::RaggedRows { row: 1, .. }));
    }
}
