use thiserror::Error;

use crate::board::{ExitSide, Orientation};

/// Reasons a board, a state, or a grid literal is rejected before any search
/// starts.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PuzzleError {
    #[error("Board must be at least 2x2, got {rows}x{cols}")]
    BoardTooSmall { rows: i32, cols: i32 },
    #[error("Exit lane {lane} does not lie along the {side} edge")]
    ExitOutOfRange { side: ExitSide, lane: i32 },
    #[error("No exit marker 'K' found")]
    MissingExit,
    #[error("Found {0} exit markers, only one exit is allowed")]
    MultipleExits(usize),
    #[error("Exit marker must lie outside the board, found at row {row}, column {col}")]
    ExitInsideBoard { row: usize, col: usize },
    #[error("Left exit needs every other row to start with a one-cell margin (row {0})")]
    MissingLeftMargin(usize),
    #[error("Label {0:?} is reserved")]
    ReservedLabel(char),
    #[error("Label {0:?} is used by more than one piece")]
    DuplicateLabel(char),
    #[error("Piece {label:?} has length {length}, pieces must be at least 2 cells long")]
    PieceTooShort { label: char, length: usize },
    #[error("Piece {0:?} is not a single contiguous straight run of cells")]
    DisconnectedPiece(char),
    #[error("Expected exactly one primary piece, found {0}")]
    PrimaryCount(usize),
    #[error("Primary piece is {orientation} but the exit is on the {side} side")]
    IncompatiblePrimary {
        orientation: Orientation,
        side: ExitSide,
    },
    #[error("Piece {0:?} does not fit on the board")]
    OutOfBounds(char),
    #[error("Pieces {0:?} and {1:?} overlap")]
    Overlap(char, char),
    #[error("Expected the number of non-primary pieces after the board size, found {0:?}")]
    MalformedHeader(String),
    #[error("Number of non-primary pieces cannot be negative, got {0}")]
    NegativePieceCount(i64),
    #[error("Header declares a {rows}x{cols} board but the grid is {found_rows}x{found_cols}")]
    DimensionMismatch {
        rows: i32,
        cols: i32,
        found_rows: i32,
        found_cols: i32,
    },
    #[error("Header declares {expected} non-primary pieces but the grid has {found}")]
    PieceCountMismatch { expected: usize, found: usize },
}

/// A name that does not match any known algorithm or heuristic.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown {kind} {name:?}, expected one of: {expected}")]
pub struct UnknownName {
    pub kind: &'static str,
    pub name: String,
    pub expected: String,
}
