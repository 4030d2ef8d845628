//! Tree search kept alive across turns.
//!
//! [`MoveSelector`] builds the search tree on its first call. On every later
//! call the tree root is the state reached by the previously returned move,
//! and the only new information is the piece revealed since then: the tree
//! is updated with that piece, the best child becomes the new root, and its
//! move is returned.

use polytris_engine::{BoardState, ConfigError, PieceCatalog, Transformation};
use polytris_evaluator::Evaluator;

use crate::{
    DecideMoveError, MoveStrategy,
    search_tree::{SearchNode, StateNode},
};

/// Validated search settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchConfig {
    depth: usize,
    multithreading: bool,
}

impl SearchConfig {
    pub const MAX_DEPTH: usize = 4;

    /// Accepts a lookahead `depth` in `1..=MAX_DEPTH` moves.
    pub fn new(depth: usize, multithreading: bool) -> Result<Self, ConfigError> {
        if !(1..=Self::MAX_DEPTH).contains(&depth) {
            return Err(ConfigError::LookaheadDepth {
                depth,
                max: Self::MAX_DEPTH,
            });
        }
        Ok(Self {
            depth,
            multithreading,
        })
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    #[must_use]
    pub fn multithreading(&self) -> bool {
        self.multithreading
    }
}

#[derive(Debug)]
pub struct MoveSelector {
    config: SearchConfig,
    evaluator: Box<dyn Evaluator>,
    root: Option<StateNode>,
}

impl MoveSelector {
    #[must_use]
    pub fn new(config: SearchConfig, evaluator: Box<dyn Evaluator>) -> Self {
        Self {
            config,
            evaluator,
            root: None,
        }
    }

    #[must_use]
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Returns the current tree root, the state reached by the last returned
    /// move.
    #[must_use]
    pub fn root(&self) -> Option<&StateNode> {
        self.root.as_ref()
    }

    /// Chooses the transformation of the queue head of `state`.
    ///
    /// After the first call, `state` must be the state reached by playing the
    /// previously returned move, with exactly one more piece revealed.
    pub fn decide_move(
        &mut self,
        state: &BoardState,
        catalog: &PieceCatalog,
    ) -> Result<Transformation, DecideMoveError> {
        let Some(newest) = state.newest_piece() else {
            return Err(DecideMoveError::NoPendingPiece);
        };
        let depth = self.config.depth;
        let parallel = self.config.multithreading;
        let evaluator = &*self.evaluator;

        let mut root = match self.root.take() {
            None => {
                let mut root = StateNode::new(state.clone());
                root.update_tree(None, depth, catalog, evaluator, parallel)?;
                root
            }
            Some(mut root) => {
                let expected = root.state().queue_len() + 1;
                if expected != state.queue_len() {
                    let actual = state.queue_len();
                    self.root = Some(root);
                    return Err(DecideMoveError::StaleState { expected, actual });
                }
                if root.state().grid() != state.grid() {
                    self.root = Some(root);
                    return Err(DecideMoveError::Diverged);
                }
                root.update_tree(Some(newest), depth, catalog, evaluator, parallel)?;
                root
            }
        };

        match root.extract_best_child() {
            None => Ok(Transformation::GAME_OVER),
            Some(SearchNode::State(child)) => {
                let transformation = if child.is_game_over() {
                    Transformation::GAME_OVER
                } else {
                    child.last_move().unwrap_or(Transformation::GAME_OVER)
                };
                self.root = Some(child);
                Ok(transformation)
            }
            Some(SearchNode::Uncertainty(_)) => Err(DecideMoveError::UnresolvedBranch),
        }
    }
}

impl MoveStrategy for MoveSelector {
    fn decide_move(
        &mut self,
        state: &BoardState,
        catalog: &PieceCatalog,
    ) -> Result<Transformation, DecideMoveError> {
        MoveSelector::decide_move(self, state, catalog)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use polytris_engine::{GameConfig, GameSession};
    use polytris_evaluator::dellacherie::DellacherieEvaluator;

    use super::*;

    fn selector(depth: usize, multithreading: bool) -> MoveSelector {
        MoveSelector::new(
            SearchConfig::new(depth, multithreading).unwrap(),
            Box::new(DellacherieEvaluator),
        )
    }

    fn session(width: usize, height: usize, cell_count: usize, known_ahead: usize) -> GameSession {
        let config = GameConfig {
            width,
            height,
            cell_count,
            known_ahead,
        };
        GameSession::new(config, 2024).unwrap()
    }

    #[test]
    fn test_search_config_limits() {
        assert!(SearchConfig::new(1, false).is_ok());
        assert!(SearchConfig::new(4, true).is_ok());
        assert_eq!(
            SearchConfig::new(0, false),
            Err(ConfigError::LookaheadDepth { depth: 0, max: 4 })
        );
        assert!(SearchConfig::new(5, false).is_err());
    }

    #[test]
    fn test_requires_pending_piece() {
        let catalog = PieceCatalog::new(3).unwrap();
        let state = BoardState::new(6, 6).unwrap();
        assert_eq!(
            selector(1, false).decide_move(&state, &catalog),
            Err(DecideMoveError::NoPendingPiece)
        );
    }

    #[test]
    fn test_first_move_is_legal() {
        let catalog = PieceCatalog::new(3).unwrap();
        let mut state = BoardState::new(6, 6).unwrap();
        state.push_piece(Arc::clone(catalog.get(0).unwrap()));

        let mut selector = selector(2, false);
        let transformation = selector.decide_move(&state, &catalog).unwrap();
        assert!(!transformation.is_game_over());

        let mut next = state.clone();
        let piece = next.pop_piece().unwrap();
        assert_eq!(next.play(&piece, transformation), Ok(true));
        assert_eq!(selector.root().unwrap().state().grid(), next.grid());
    }

    #[test]
    fn test_rejects_state_without_new_piece() {
        let catalog = PieceCatalog::new(3).unwrap();
        let mut state = BoardState::new(6, 6).unwrap();
        state.push_piece(Arc::clone(catalog.get(0).unwrap()));

        let mut selector = selector(1, false);
        let transformation = selector.decide_move(&state, &catalog).unwrap();
        let piece = state.pop_piece().unwrap();
        state.play(&piece, transformation).unwrap();

        assert_eq!(
            selector.decide_move(&state, &catalog),
            Err(DecideMoveError::NoPendingPiece)
        );

        state.push_piece(Arc::clone(catalog.get(1).unwrap()));
        state.push_piece(Arc::clone(catalog.get(1).unwrap()));
        assert_eq!(
            selector.decide_move(&state, &catalog),
            Err(DecideMoveError::StaleState {
                expected: 1,
                actual: 2
            })
        );
        // The tree survives a rejected call.
        assert!(selector.root().is_some());
    }

    #[test]
    fn test_rejects_diverged_board() {
        let catalog = PieceCatalog::new(3).unwrap();
        let mut state = BoardState::new(6, 6).unwrap();
        state.push_piece(Arc::clone(catalog.get(0).unwrap()));

        let mut selector = selector(1, false);
        selector.decide_move(&state, &catalog).unwrap();

        // Play somewhere else than advised.
        let piece = state.pop_piece().unwrap();
        state.play(&piece, Transformation::new(5, 1)).unwrap();
        state.push_piece(Arc::clone(catalog.get(1).unwrap()));
        let advised = selector.root().unwrap().last_move();
        if advised != Some(Transformation::new(5, 1)) {
            assert_eq!(
                selector.decide_move(&state, &catalog),
                Err(DecideMoveError::Diverged)
            );
        }
    }

    #[test]
    fn test_plays_full_game_with_unknown_pieces() {
        let mut session = session(6, 8, 3, 0);
        let mut selector = selector(2, false);
        for _ in 0..30 {
            session.reveal_next_piece();
            let transformation = selector
                .decide_move(session.state(), session.catalog())
                .unwrap();
            let result = session.play(transformation).unwrap();
            if result.game_over {
                break;
            }
            assert_eq!(
                selector.root().unwrap().state().grid(),
                session.state().grid()
            );
        }
        assert!(session.stats().total_cleared_lines() > 0);
    }

    #[test]
    fn test_plays_with_known_pieces() {
        let mut session = session(8, 12, 4, 2);
        let mut selector = selector(2, false);
        for _ in 0..15 {
            session.reveal_next_piece();
            let transformation = selector
                .decide_move(session.state(), session.catalog())
                .unwrap();
            if session.play(transformation).unwrap().game_over {
                break;
            }
            assert_eq!(
                selector.root().unwrap().state().queue_len(),
                session.state().queue_len()
            );
        }
        assert!(session.stats().moves() > 0);
    }

    #[test]
    fn test_multithreading_picks_same_moves() {
        let mut session = session(8, 10, 4, 1);
        let mut sequential = selector(2, false);
        let mut parallel = selector(2, true);
        for _ in 0..10 {
            session.reveal_next_piece();
            let expected = sequential
                .decide_move(session.state(), session.catalog())
                .unwrap();
            let actual = parallel
                .decide_move(session.state(), session.catalog())
                .unwrap();
            assert_eq!(actual, expected);
            if session.play(expected).unwrap().game_over {
                break;
            }
        }
    }

    #[test]
    fn test_game_over_sentinel() {
        let catalog = PieceCatalog::new(3).unwrap();
        let i = Arc::clone(catalog.get(0).unwrap());
        let mut state = BoardState::new(6, 6).unwrap();
        while state.play(&i, Transformation::new(0, 1)).unwrap() {}
        state.push_piece(Arc::clone(&i));

        let mut selector = selector(1, false);
        let transformation = selector.decide_move(&state, &catalog).unwrap();
        assert_eq!(transformation, Transformation::GAME_OVER);
        assert!(selector.root().is_none());
    }
}
