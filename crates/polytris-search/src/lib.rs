//! Lookahead move search for polyomino games.
//!
//! The search keeps a tree of reachable board states between turns:
//!
//! - [`search_tree`] - State and uncertainty nodes, incremental update and
//!   best-move extraction
//! - [`move_selector`] - Owns the tree across turns and answers "which move now?"
//! - [`greedy`] - One-ply strategy without a tree, useful as a baseline
//!
//! Both strategies implement [`MoveStrategy`], so a game loop can drive either.
//!
//! # Example
//!
//! ```
//! use polytris_engine::{GameConfig, GameSession};
//! use polytris_evaluator::dellacherie::DellacherieEvaluator;
//! use polytris_search::{MoveStrategy, move_selector::{MoveSelector, SearchConfig}};
//!
//! let config = GameConfig {
//!     width: 6,
//!     height: 6,
//!     cell_count: 3,
//!     known_ahead: 0,
//! };
//! let mut session = GameSession::new(config, 1).unwrap();
//! let mut selector = MoveSelector::new(
//!     SearchConfig::new(1, false).unwrap(),
//!     Box::new(DellacherieEvaluator),
//! );
//!
//! for _ in 0..5 {
//!     session.reveal_next_piece();
//!     let transformation = selector
//!         .decide_move(session.state(), session.catalog())
//!         .unwrap();
//!     session.play(transformation).unwrap();
//! }
//! ```

use polytris_engine::{BoardState, FitPieceError, PieceCatalog, Transformation};

pub use self::split_range::split_range;

pub mod greedy;
pub mod move_selector;
pub mod search_tree;
mod split_range;

/// Broken tree invariant found while updating the search tree.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum SearchError {
    #[display("no uncertainty branch matches the revealed piece")]
    MissingBranch,
    #[display("an uncertainty branch was handed a known piece")]
    UnexpectedPiece,
    #[display("tree expansion played an invalid move: {_0}")]
    #[from]
    Fit(FitPieceError),
}

/// Failure to pick a move for a board state.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum DecideMoveError {
    #[display("the board state has no piece to play")]
    NoPendingPiece,
    #[display("expected {expected} queued pieces, got {actual}")]
    StaleState { expected: usize, actual: usize },
    #[display("the board state differs from the searched one")]
    Diverged,
    #[display("the best branch still waits for a piece to be revealed")]
    UnresolvedBranch,
    #[display("search failed: {_0}")]
    #[from]
    Search(SearchError),
}

/// Something that picks the transformation of the next piece.
pub trait MoveStrategy {
    /// Chooses a transformation for the head of `state`'s piece queue.
    ///
    /// Returns [`Transformation::GAME_OVER`] when no move keeps the game going.
    fn decide_move(
        &mut self,
        state: &BoardState,
        catalog: &PieceCatalog,
    ) -> Result<Transformation, DecideMoveError>;
}
