pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

/// Rejected construction-time configuration.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display(
        "grid size {width}x{height} out of range [{}-{}]",
        BitGrid::MIN_SIZE,
        BitGrid::MAX_SIZE
    )]
    GridSize { width: usize, height: usize },
    #[display("polyomino cell count {cells} out of range [1-{}]", Polyomino::MAX_CELLS)]
    CellCount { cells: usize },
    #[display("lookahead depth {depth} out of range [1-{max}]")]
    LookaheadDepth { depth: usize, max: usize },
    #[display("known piece count {count} out of range [0-{}]", GameConfig::MAX_KNOWN_AHEAD)]
    KnownAhead { count: usize },
}

/// Invalid polyomino definition.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ShapeError {
    #[display("polyomino has no rows")]
    Empty,
    #[display("polyomino row {row} is empty")]
    EmptyRow { row: usize },
    #[display("polyomino does not occupy the lowest-order column")]
    Unaligned,
    #[display("polyomino extent {extent} exceeds {}", Polyomino::MAX_EXTENT)]
    TooLarge { extent: usize },
    #[display("rotations of the polyomino do not return to the base state")]
    OpenRotationCycle,
}

/// Transformed piece does not lie within the grid's side walls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display(
    "piece at translation {translation} rotation {rotation} exceeds grid width {width}"
)]
pub struct FitPieceError {
    pub translation: i32,
    pub rotation: usize,
    pub width: usize,
}

/// Move rejected by a [`GameSession`].
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum PlayError {
    #[display("no piece has been revealed")]
    NoPendingPiece,
    #[display("game is already over")]
    GameOver,
    #[display("invalid move: {_0}")]
    Fit(FitPieceError),
}
