//! Dense boolean field used for walls and food.

use std::fmt;

use super::common::Cell;

/// Errors raised while decoding a packed grid.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("packed grid is missing its width/height header")]
    MissingHeader,

    #[error("invalid grid dimensions {width}x{height}")]
    InvalidDimensions { width: i64, height: i64 },

    #[error("packed word {index} is negative ({value})")]
    NegativeWord { index: usize, value: i64 },

    #[error(
        "packed word {index} does not fit in {bits} bits ({value})",
        bits = Grid::CELLS_PER_WORD
    )]
    WordOutOfRange { index: usize, value: i64 },

    #[error("packed grid needs {expected} words, found {actual}")]
    Truncated { expected: usize, actual: usize },
}

impl crate::error::GameError for GridError {
    fn severity(&self) -> crate::error::ErrorSeverity {
        crate::error::ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::MissingHeader => "GRID_MISSING_HEADER",
            Self::InvalidDimensions { .. } => "GRID_INVALID_DIMENSIONS",
            Self::NegativeWord { .. } => "GRID_NEGATIVE_WORD",
            Self::WordOutOfRange { .. } => "GRID_WORD_OUT_OF_RANGE",
            Self::Truncated { .. } => "GRID_TRUNCATED",
        }
    }
}

/// A `width` x `height` boolean field indexed `[x][y]` with the origin at the
/// bottom-left corner.
///
/// Cells are stored column-major (all `y` for `x = 0`, then `x = 1`, ...), the
/// same order the packed form enumerates them in.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "Vec<i64>", into = "Vec<i64>")
)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<bool>,
}

impl Grid {
    pub const CELLS_PER_WORD: usize = 30;

    pub fn new(width: usize, height: usize, initial: bool) -> Self {
        Self {
            width,
            height,
            cells: vec![initial; width * height],
        }
    }

    /// Builds a grid with exactly `cells` set; coordinates outside the grid are ignored.
    pub fn from_cells(width: usize, height: usize, cells: impl IntoIterator<Item = Cell>) -> Self {
        let mut grid = Self::new(width, height, false);
        for cell in cells {
            grid.set(cell, true);
        }
        grid
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn contains(&self, cell: Cell) -> bool {
        self.index(cell).is_some()
    }

    /// Cell value; `false` outside the grid.
    pub fn get(&self, cell: Cell) -> bool {
        self.get_or(cell, false)
    }

    /// Cell value, or `default` when `cell` lies outside the grid.
    pub fn get_or(&self, cell: Cell, default: bool) -> bool {
        self.index(cell).map_or(default, |index| self.cells[index])
    }

    /// Sets a cell and returns whether it was inside the grid.
    pub fn set(&mut self, cell: Cell, value: bool) -> bool {
        match self.index(cell) {
            Some(index) => {
                self.cells[index] = value;
                true
            }
            None => false,
        }
    }

    pub fn count(&self, value: bool) -> usize {
        self.cells.iter().filter(|&&cell| cell == value).count()
    }

    /// Coordinates holding `value`, in column-major order.
    pub fn as_list(&self, value: bool) -> Vec<Cell> {
        self.cells
            .iter()
            .enumerate()
            .filter(|&(_, &cell)| cell == value)
            .map(|(index, _)| self.cell_at(index))
            .collect()
    }

    /// Serializes to `[width, height, word...]` with exactly
    /// `ceil(width * height / 30)` words, most-significant bit first.
    pub fn pack(&self) -> Vec<i64> {
        let words = self.cells.len().div_ceil(Self::CELLS_PER_WORD);
        let mut packed = Vec::with_capacity(2 + words);
        packed.push(self.width as i64);
        packed.push(self.height as i64);

        for chunk in self.cells.chunks(Self::CELLS_PER_WORD) {
            let word = chunk.iter().enumerate().fold(0i64, |word, (offset, &cell)| {
                if cell {
                    word | (1 << (Self::CELLS_PER_WORD - 1 - offset))
                } else {
                    word
                }
            });
            packed.push(word);
        }
        packed
    }

    /// Reverses [`Grid::pack`]. Trailing words beyond the ones the field needs
    /// are validated but otherwise ignored.
    pub fn unpack(packed: &[i64]) -> Result<Self, GridError> {
        let [width, height, words @ ..] = packed else {
            return Err(GridError::MissingHeader);
        };
        let (width, height) = match (usize::try_from(*width), usize::try_from(*height)) {
            (Ok(w), Ok(h)) => (w, h),
            _ => {
                return Err(GridError::InvalidDimensions {
                    width: *width,
                    height: *height,
                });
            }
        };

        let total = width
            .checked_mul(height)
            .ok_or(GridError::InvalidDimensions {
                width: width as i64,
                height: height as i64,
            })?;
        let expected = total.div_ceil(Self::CELLS_PER_WORD);
        if words.len() < expected {
            return Err(GridError::Truncated {
                expected,
                actual: words.len(),
            });
        }

        let mut cells = Vec::with_capacity(total);
        for (index, &word) in words.iter().enumerate() {
            if word < 0 {
                return Err(GridError::NegativeWord { index, value: word });
            }
            if word >> Self::CELLS_PER_WORD != 0 {
                return Err(GridError::WordOutOfRange { index, value: word });
            }
            for offset in 0..Self::CELLS_PER_WORD {
                if cells.len() == total {
                    break;
                }
                cells.push(word & (1 << (Self::CELLS_PER_WORD - 1 - offset)) != 0);
            }
        }

        Ok(Self {
            width,
            height,
            cells,
        })
    }

    fn index(&self, cell: Cell) -> Option<usize> {
        let x = usize::try_from(cell.x).ok()?;
        let y = usize::try_from(cell.y).ok()?;
        (x < self.width && y < self.height).then_some(x * self.height + y)
    }

    fn cell_at(&self, index: usize) -> Cell {
        Cell::new((index / self.height) as i32, (index % self.height) as i32)
    }
}

impl From<Grid> for Vec<i64> {
    fn from(grid: Grid) -> Self {
        grid.pack()
    }
}

impl TryFrom<Vec<i64>> for Grid {
    type Error = GridError;

    fn try_from(packed: Vec<i64>) -> Result<Self, Self::Error> {
        Grid::unpack(&packed)
    }
}

/// Rows are printed top-down so the output reads like the board.
impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in (0..self.height).rev() {
            for x in 0..self.width {
                let cell = Cell::new(x as i32, y as i32);
                f.write_str(if self.get(cell) { "T" } else { "F" })?;
            }
            if y > 0 {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_unpack_preserves_cells() {
        let grid = Grid::from_cells(3, 2, [Cell::new(0, 0), Cell::new(2, 1)]);
        let restored = Grid::unpack(&grid.pack()).unwrap();

        assert_eq!(restored, grid);
        assert_eq!(restored.as_list(true), vec![Cell::new(0, 0), Cell::new(2, 1)]);
    }

    #[test]
    fn pack_uses_exact_word_count() {
        for (width, height, words) in [(0, 4, 0), (5, 6, 1), (6, 6, 2), (10, 9, 3), (7, 13, 4)] {
            let grid = Grid::new(width, height, true);
            assert_eq!(grid.pack().len(), 2 + words, "{width}x{height}");
        }
    }

    #[test]
    fn pack_is_most_significant_bit_first() {
        let grid = Grid::from_cells(2, 2, [Cell::new(0, 0)]);
        assert_eq!(grid.pack(), vec![2, 2, 1 << 29]);

        let grid = Grid::from_cells(2, 2, [Cell::new(1, 1)]);
        assert_eq!(grid.pack(), vec![2, 2, 1 << 26]);
    }

    #[test]
    fn unpack_round_trips_patterned_fields() {
        for (width, height) in [(1, 1), (3, 10), (7, 9), (20, 11)] {
            let mut grid = Grid::new(width, height, false);
            for x in 0..width {
                for y in 0..height {
                    grid.set(Cell::new(x as i32, y as i32), (x * 7 + y * 3) % 5 < 2);
                }
            }
            assert_eq!(Grid::unpack(&grid.pack()).unwrap(), grid);
        }
    }

    #[test]
    fn unpack_rejects_negative_words() {
        let error = Grid::unpack(&[2, 2, -4]).unwrap_err();
        assert_eq!(error, GridError::NegativeWord { index: 0, value: -4 });
    }

    #[test]
    fn unpack_rejects_truncated_input() {
        let error = Grid::unpack(&[6, 6, 0]).unwrap_err();
        assert_eq!(
            error,
            GridError::Truncated {
                expected: 2,
                actual: 1
            }
        );
        assert_eq!(Grid::unpack(&[3]).unwrap_err(), GridError::MissingHeader);
    }

    #[test]
    fn out_of_bounds_reads_fall_back() {
        let grid = Grid::new(2, 2, true);
        assert!(!grid.get(Cell::new(-1, 0)));
        assert!(grid.get_or(Cell::new(5, 5), true));
        assert!(!grid.get_or(Cell::new(5, 5), false));
    }

    #[test]
    fn display_prints_top_row_first() {
        let grid = Grid::from_cells(2, 2, [Cell::new(0, 1)]);
        assert_eq!(grid.to_string(), "TF\nFF");
    }
}
