//! Static evaluation of board states for the move search.
//!
//! An [`Evaluator`] scores the states the search reaches in two ways:
//!
//! 1. **Leaf evaluation** ([`Evaluator::evaluate`]) - Scores a state with no
//!    children from its board features and the move that produced it.
//! 2. **Branch evaluation** ([`Evaluator::evaluate_branch`]) - Combines the
//!    reward of a state's own move with the value already aggregated from its
//!    children.
//!
//! The search calls both from several threads at once, so implementations
//! must be free of side effects.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use polytris_engine::{BoardState, Polyomino, Transformation};
//! use polytris_evaluator::{Evaluator, GAME_OVER_EVALUATION, dellacherie::DellacherieEvaluator};
//!
//! let evaluator = DellacherieEvaluator;
//! let mut state = BoardState::new(6, 6).unwrap();
//! assert_eq!(evaluator.evaluate(&state), GAME_OVER_EVALUATION);
//!
//! let i = Arc::new(Polyomino::new(&[0b111]).unwrap());
//! state.play(&i, Transformation::new(0, 0)).unwrap();
//! assert!(evaluator.evaluate(&state) > GAME_OVER_EVALUATION);
//! ```

use std::fmt;

use polytris_engine::BoardState;

pub mod dellacherie;

/// Score of a state that ends the game.
///
/// Lower than any score a playable state can get.
pub const GAME_OVER_EVALUATION: f32 = -100_000.0;

/// Scoring function used by the search.
pub trait Evaluator: fmt::Debug + Send + Sync {
    /// Scores a leaf state.
    ///
    /// Must return [`GAME_OVER_EVALUATION`] when `state` is a game over.
    fn evaluate(&self, state: &BoardState) -> f32;

    /// Scores a state whose children aggregate to `children_evaluation`.
    fn evaluate_branch(&self, state: &BoardState, children_evaluation: f32) -> f32;
}
