//! Hand-tuned evaluation after Pierre Dellacherie's one-piece player.
//!
//! A leaf state is scored as
//!
//! ```text
//!   landing margin
//! + 2 * lines cleared * cells of the piece cleared
//! - 2 * stack height
//! - column transitions
//! - row transitions
//! - 4 * cellars
//! - wells
//! ```
//!
//! The landing margin is the mean distance between the grid ceiling and the
//! bottom and top rows of the piece just played, so lower placements score
//! higher.

use polytris_engine::{BoardState, MoveResult};

use crate::{Evaluator, GAME_OVER_EVALUATION};

#[derive(Debug, Default, Clone, Copy)]
pub struct DellacherieEvaluator;

impl DellacherieEvaluator {
    #[expect(clippy::cast_precision_loss)]
    fn line_clear_bonus(result: &MoveResult) -> f32 {
        (2 * result.lines_cleared * result.piece_vanished_blocks) as f32
    }
}

impl Evaluator for DellacherieEvaluator {
    #[expect(clippy::cast_precision_loss)]
    fn evaluate(&self, state: &BoardState) -> f32 {
        let result = state.move_result();
        let (Some(piece), Some(transformation), Some(landing_row)) = (
            state.played_piece(),
            state.transformation(),
            result.landing_row,
        ) else {
            return GAME_OVER_EVALUATION;
        };
        if result.game_over {
            return GAME_OVER_EVALUATION;
        }

        let grid = state.grid();
        let ceiling = (grid.height() + 1) as f32;
        let piece_height = piece.variant(transformation.rotation).height();
        let margin_bottom = ceiling - landing_row as f32;
        let margin_top = ceiling - (landing_row + piece_height - 1) as f32;

        let mut output = (margin_bottom + margin_top) / 2.0;
        output += Self::line_clear_bonus(result);
        output -= 2.0 * grid.top_height() as f32;
        output -= grid.column_transitions() as f32;
        output -= grid.row_transitions() as f32;
        output -= 4.0 * grid.cellars() as f32;
        output -= grid.wells() as f32;
        output
    }

    fn evaluate_branch(&self, state: &BoardState, children_evaluation: f32) -> f32 {
        children_evaluation + Self::line_clear_bonus(state.move_result())
    }
}
