use std::collections::VecDeque;

use crate::{
    ConfigError, FitPieceError,
    core::{
        bit_grid::{BitGrid, MoveResult},
        polyomino::{PieceRef, Transformation},
    },
};

/// A grid snapshot together with the move that produced it and the pieces
/// known in advance.
///
/// Cloning is cheap enough to be done once per search node: the grid is a
/// fixed-capacity array and pieces are shared handles into the catalog.
#[derive(Debug, Clone)]
pub struct BoardState {
    grid: BitGrid,
    last_move: Option<(PieceRef, Transformation)>,
    move_result: MoveResult,
    queue: VecDeque<PieceRef>,
}

impl BoardState {
    pub fn new(width: usize, height: usize) -> Result<Self, ConfigError> {
        Ok(Self {
            grid: BitGrid::new(width, height)?,
            last_move: None,
            move_result: MoveResult::default(),
            queue: VecDeque::new(),
        })
    }

    #[must_use]
    pub fn grid(&self) -> &BitGrid {
        &self.grid
    }

    /// Returns the result of the last move, or the default result if nothing
    /// has been played yet.
    #[must_use]
    pub fn move_result(&self) -> &MoveResult {
        &self.move_result
    }

    #[must_use]
    pub fn played_piece(&self) -> Option<&PieceRef> {
        self.last_move.as_ref().map(|(piece, _)| piece)
    }

    #[must_use]
    pub fn transformation(&self) -> Option<Transformation> {
        self.last_move.as_ref().map(|(_, transformation)| *transformation)
    }

    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.move_result.game_over
    }

    /// Plays `piece` and returns `true` if it fitted inside the grid.
    ///
    /// On a geometry error nothing is recorded.
    pub fn play(
        &mut self,
        piece: &PieceRef,
        transformation: Transformation,
    ) -> Result<bool, FitPieceError> {
        let result = self.grid.fit_piece(piece, transformation)?;
        self.last_move = Some((PieceRef::clone(piece), transformation));
        self.move_result = result;
        Ok(!result.game_over)
    }

    /// Appends a piece that became known in advance.
    pub fn push_piece(&mut self, piece: PieceRef) {
        self.queue.push_back(piece);
    }

    /// Removes and returns the next known piece.
    pub fn pop_piece(&mut self) -> Option<PieceRef> {
        self.queue.pop_front()
    }

    /// Returns the piece to be played next, if known.
    #[must_use]
    pub fn next_piece(&self) -> Option<&PieceRef> {
        self.queue.front()
    }

    /// Returns the most recently revealed piece.
    #[must_use]
    pub fn newest_piece(&self) -> Option<&PieceRef> {
        self.queue.back()
    }

    #[must_use]
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn queued_pieces(&self) -> impl Iterator<Item = &PieceRef> + '_ {
        self.queue.iter()
    }
}
