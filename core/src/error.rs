use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("Too many mines")]
    TooManyMines,
    #[error("Board shape does not match declared size")]
    InvalidBoardShape,
    #[error("Minefield has no mines")]
    NoMines,
    #[error("Declared mine count does not match the mine mask")]
    MineCountMismatch,
}

pub type Result<T> = core::result::Result<T, GameError>;
