use serde::{Deserialize, Serialize};

/// Player-visible state of a single board cell.
///
/// A cell is never both open and flagged; the representation has no such
/// value. Whether a cell hides a mine lives in the minefield, not here, so
/// rendering a mid-game board cannot leak mine positions. The last three
/// variants only appear once a game is lost, when the board is annotated
/// for the end-of-game display.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cell {
    Closed,
    /// Open safe cell; the payload is its neighbor-mine count (0 to 8).
    Open(u8),
    Flagged,
    /// The mine that was opened and ended the game.
    Exploded,
    /// Any other mine, revealed after a loss.
    Mine,
    /// A flag that turned out to sit on a safe cell.
    WrongFlag,
}

impl Cell {
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Open(_))
    }

    pub const fn is_flag(self) -> bool {
        matches!(self, Self::Flagged)
    }

    /// Whether the cell still renders face-down.
    pub const fn is_closed(self) -> bool {
        use Cell::*;
        match self {
            Closed => true,
            Open(_) => false,
            Flagged => true,
            Exploded => false,
            Mine => false,
            WrongFlag => true,
        }
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::Closed
    }
}
