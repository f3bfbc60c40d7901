use std::fmt;
use std::hash::{Hash, Hasher};

/// Integer grid coordinate, origin at the bottom-left corner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn to_position(self) -> Position {
        Position::new(f64::from(self.x), f64::from(self.y))
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<Cell> for Position {
    fn from(cell: Cell) -> Self {
        cell.to_position()
    }
}

/// Continuous agent position.
///
/// Agents sit on integer coordinates except while a slowed pursuer is halfway
/// between two cells. Equality and hashing compare bit patterns so positions
/// can key hash sets; `-0.0` is folded into `0.0` first.
#[derive(Clone, Copy, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Cell reached by rounding each coordinate half-up.
    pub fn nearest_cell(self) -> Cell {
        Cell::new(round_half_up(self.x), round_half_up(self.y))
    }

    pub fn manhattan(self, other: Position) -> f64 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    /// True when the position lies within `tolerance` (Manhattan) of its nearest cell.
    pub fn is_grid_aligned(self, tolerance: f64) -> bool {
        self.manhattan(self.nearest_cell().to_position()) <= tolerance
    }

    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    fn key(self) -> (u64, u64) {
        // Adding 0.0 maps -0.0 to +0.0 and leaves every other value untouched.
        ((self.x + 0.0).to_bits(), (self.y + 0.0).to_bits())
    }
}

impl PartialEq for Position {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Position {}

impl Hash for Position {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

fn round_half_up(value: f64) -> i32 {
    (value + 0.5).floor() as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearest_cell_rounds_half_up() {
        assert_eq!(Position::new(2.5, 3.0).nearest_cell(), Cell::new(3, 3));
        assert_eq!(Position::new(2.4, 0.6).nearest_cell(), Cell::new(2, 1));
    }

    #[test]
    fn negative_zero_is_equal_to_zero() {
        use std::collections::HashSet;

        let mut set = HashSet::new();
        set.insert(Position::new(0.0, 1.0));
        assert!(set.contains(&Position::new(-0.0, 1.0)));
    }

    #[test]
    fn half_cell_is_not_grid_aligned() {
        assert!(Position::new(4.0, 2.0).is_grid_aligned(0.001));
        assert!(!Position::new(4.5, 2.0).is_grid_aligned(0.001));
    }
}
