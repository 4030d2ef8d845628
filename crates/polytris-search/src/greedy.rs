use polytris_engine::{BoardState, PieceCatalog, Transformation};
use polytris_evaluator::{Evaluator, GAME_OVER_EVALUATION};

use crate::{DecideMoveError, MoveStrategy};

/// Picks the placement of the queue head that evaluates best right away.
///
/// Keeps no state between turns and ignores the other known pieces. Only a
/// placement scoring above [`GAME_OVER_EVALUATION`] is ever returned.
#[derive(Debug)]
pub struct GreedyStrategy {
    evaluator: Box<dyn Evaluator>,
}

impl GreedyStrategy {
    #[must_use]
    pub fn new(evaluator: Box<dyn Evaluator>) -> Self {
        Self { evaluator }
    }
}

impl MoveStrategy for GreedyStrategy {
    fn decide_move(
        &mut self,
        state: &BoardState,
        _catalog: &PieceCatalog,
    ) -> Result<Transformation, DecideMoveError> {
        let mut base = state.clone();
        let piece = base.pop_piece().ok_or(DecideMoveError::NoPendingPiece)?;
        if base.is_game_over() {
            return Ok(Transformation::GAME_OVER);
        }

        let mut best = (GAME_OVER_EVALUATION, Transformation::GAME_OVER);
        for transformation in piece.transformations(base.grid().width()) {
            let mut after = base.clone();
            after
                .play(&piece, transformation)
                .map_err(|e| DecideMoveError::Search(e.into()))?;
            let evaluation = self.evaluator.evaluate(&after);
            if evaluation > best.0 {
                best = (evaluation, transformation);
            }
        }
        Ok(best.1)
    }
}
