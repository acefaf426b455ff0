use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("invalid coordinates")]
    InvalidCoords,
    #[error("mine count must stay below the cell count")]
    TooManyMines,
    #[error("board dimensions must be non-zero")]
    EmptyBoard,
}

pub type Result<T> = core::result::Result<T, GameError>;
