use serde::{Deserialize, Serialize};

use crate::{GameError, Pos, Result};

/// Named board presets offered to the player.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Expert,
}

impl Difficulty {
    pub const ALL: [Self; 3] = [Self::Beginner, Self::Intermediate, Self::Expert];

    /// Board layout for this preset. Every preset keeps the mine count
    /// strictly below the cell count.
    pub const fn board_spec(self) -> BoardSpec {
        match self {
            Self::Beginner => BoardSpec::new_unchecked(9, 9, 10),
            Self::Intermediate => BoardSpec::new_unchecked(16, 16, 40),
            Self::Expert => BoardSpec::new_unchecked(16, 30, 99),
        }
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Self::Intermediate
    }
}

/// Validated board configuration: dimensions plus mine count.
///
/// Construction is the single place where a playable board is enforced; with
/// `mines < rows * cols` guaranteed, uniform mine placement always
/// terminates and at least one safe cell exists.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSpec {
    rows: usize,
    cols: usize,
    mines: usize,
}

impl BoardSpec {
    pub fn new(rows: usize, cols: usize, mines: usize) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(GameError::EmptyBoard);
        }
        if mines >= rows * cols {
            return Err(GameError::TooManyMines);
        }
        Ok(Self::new_unchecked(rows, cols, mines))
    }

    pub(crate) const fn new_unchecked(rows: usize, cols: usize, mines: usize) -> Self {
        Self { rows, cols, mines }
    }

    pub const fn rows(&self) -> usize {
        self.rows
    }

    pub const fn cols(&self) -> usize {
        self.cols
    }

    pub const fn mines(&self) -> usize {
        self.mines
    }

    pub const fn size(&self) -> Pos {
        (self.rows, self.cols)
    }

    pub const fn total_cells(&self) -> usize {
        self.rows * self.cols
    }

    pub const fn safe_cells(&self) -> usize {
        self.total_cells() - self.mines
    }
}
