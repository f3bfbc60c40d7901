use crate::state::{AgentRole, Cell, Grid};

/// Errors raised when assembling a [`Layout`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("food grid is {food_width}x{food_height} but walls are {width}x{height}")]
    DimensionMismatch {
        width: usize,
        height: usize,
        food_width: usize,
        food_height: usize,
    },

    #[error("layout has no pacman start")]
    MissingPacman,

    #[error("layout has {count} pacman starts")]
    MultiplePacmen { count: usize },

    #[error("{what} at {cell} is outside the board or inside a wall")]
    Blocked { what: &'static str, cell: Cell },

    #[error("layout rows have different lengths (row {row} has {len}, expected {expected})")]
    RaggedRows {
        row: usize,
        len: usize,
        expected: usize,
    },

    #[error("unknown layout symbol {symbol:?} at row {row}, column {column}")]
    UnknownSymbol {
        symbol: char,
        row: usize,
        column: usize,
    },
}

impl crate::error::GameError for LayoutError {
    fn severity(&self) -> crate::error::ErrorSeverity {
        crate::error::ErrorSeverity::Validation
    }
}

/// Where an agent enters the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AgentStart {
    pub role: AgentRole,
    pub cell: Cell,
}

/// Walls, initial food, capsules and agent start cells of one board.
///
/// The pacman start is always first in [`Layout::agent_starts`]; pursuers
/// follow in the order they were supplied.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "LayoutParts")
)]
pub struct Layout {
    walls: Grid,
    food: Grid,
    capsules: Vec<Cell>,
    agent_starts: Vec<AgentStart>,
}

impl Layout {
    pub fn new(
        walls: Grid,
        food: Grid,
        capsules: Vec<Cell>,
        agent_starts: Vec<AgentStart>,
    ) -> Result<Self, LayoutError> {
        if walls.width() != food.width() || walls.height() != food.height() {
            return Err(LayoutError::DimensionMismatch {
                width: walls.width(),
                height: walls.height(),
                food_width: food.width(),
                food_height: food.height(),
            });
        }

        let open = |cell: Cell| walls.contains(cell) && !walls.get(cell);
        if let Some(&cell) = capsules.iter().find(|&&cell| !open(cell)) {
            return Err(LayoutError::Blocked {
                what: "capsule",
                cell,
            });
        }
        if let Some(start) = agent_starts.iter().find(|start| !open(start.cell)) {
            return Err(LayoutError::Blocked {
                what: "agent start",
                cell: start.cell,
            });
        }

        let (mut ordered, ghosts): (Vec<_>, Vec<_>) = agent_starts
            .into_iter()
            .partition(|start| start.role == AgentRole::Pacman);
        match ordered.len() {
            0 => return Err(LayoutError::MissingPacman),
            1 => {}
            count => return Err(LayoutError::MultiplePacmen { count }),
        }
        ordered.extend(ghosts);

        Ok(Self {
            walls,
            food,
            capsules,
            agent_starts: ordered,
        })
    }

    pub fn width(&self) -> usize {
        self.walls.width()
    }

    pub fn height(&self) -> usize {
        self.walls.height()
    }

    pub fn walls(&self) -> &Grid {
        &self.walls
    }

    pub fn food(&self) -> &Grid {
        &self.food
    }

    pub fn capsules(&self) -> &[Cell] {
        &self.capsules
    }

    pub fn agent_starts(&self) -> &[AgentStart] {
        &self.agent_starts
    }

    pub fn num_ghosts(&self) -> usize {
        self.agent_starts.len().saturating_sub(1)
    }

    /// Walls-and-start check used by movement rules; cells off the board count as walls.
    pub fn is_wall(&self, cell: Cell) -> bool {
        self.walls.get_or(cell, true)
    }
}

/// Unvalidated wire form; deserialized layouts go through [`Layout::new`].
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct LayoutParts {
    walls: Grid,
    food: Grid,
    capsules: Vec<Cell>,
    agent_starts: Vec<AgentStart>,
}

#[cfg(feature = "serde")]
impl TryFrom<LayoutParts> for Layout {
    type Error = LayoutError;

    fn try_from(parts: LayoutParts) -> Result<Self, Self::Error> {
        Layout::new(parts.walls, parts.food, parts.capsules, parts.agent_starts)
    }
}
