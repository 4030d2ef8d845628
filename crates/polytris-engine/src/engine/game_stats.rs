use serde::{Deserialize, Serialize};

use crate::core::bit_grid::MoveResult;

/// Statistics of a game, updated after each accepted move.
///
/// Tracks:
///
/// - **Moves**: Number of pieces played
/// - **Cleared lines**: Total number of removed rows
/// - **Piece counts**: How many times each catalog entry was played
/// - **Line clear distribution**: How many moves cleared 1, 2, ... rows at once
///
/// # Example
///
/// ```
/// use polytris_engine::{GameStats, MoveResult};
///
/// let mut stats = GameStats::new(7, 4);
/// let result = MoveResult {
///     lines_cleared: 2,
///     piece_vanished_blocks: 2,
///     landing_row: Some(0),
///     ..MoveResult::default()
/// };
/// stats.record_move(3, &result);
///
/// assert_eq!(stats.moves(), 1);
/// assert_eq!(stats.total_cleared_lines(), 2);
/// assert_eq!(stats.piece_counts()[3], 1);
/// assert_eq!(stats.line_cleared_counter(), &[0, 1, 0, 0]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStats {
    moves: usize,
    total_cleared_lines: usize,
    piece_counts: Vec<usize>,
    line_cleared_counter: Vec<usize>,
}

impl GameStats {
    /// Creates zeroed statistics for a catalog of `piece_kinds` pieces made of
    /// `cell_count` cells.
    ///
    /// A piece can never clear more rows than it has cells, so the histogram
    /// has one slot per cell.
    #[must_use]
    pub fn new(piece_kinds: usize, cell_count: usize) -> Self {
        Self {
            moves: 0,
            total_cleared_lines: 0,
            piece_counts: vec![0; piece_kinds],
            line_cleared_counter: vec![0; cell_count],
        }
    }

    #[must_use]
    pub fn moves(&self) -> usize {
        self.moves
    }

    #[must_use]
    pub fn total_cleared_lines(&self) -> usize {
        self.total_cleared_lines
    }

    /// Returns the number of times each piece was played, indexed by catalog
    /// position.
    #[must_use]
    pub fn piece_counts(&self) -> &[usize] {
        &self.piece_counts
    }

    /// Returns a histogram of line clears; index `n` counts the moves that
    /// cleared `n + 1` rows.
    #[must_use]
    pub fn line_cleared_counter(&self) -> &[usize] {
        &self.line_cleared_counter
    }

    /// Updates statistics after an accepted move of the piece at catalog
    /// position `piece_index`.
    pub fn record_move(&mut self, piece_index: usize, result: &MoveResult) {
        self.moves += 1;
        self.total_cleared_lines += result.lines_cleared;
        if let Some(count) = self.piece_counts.get_mut(piece_index) {
            *count += 1;
        }
        if let Some(count) = result
            .lines_cleared
            .checked_sub(1)
            .and_then(|slot| self.line_cleared_counter.get_mut(slot))
        {
            *count += 1;
        }
    }
}
