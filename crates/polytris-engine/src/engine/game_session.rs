use std::{collections::VecDeque, sync::Arc};

use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::{
    ConfigError, PlayError,
    core::{
        bit_grid::{BitGrid, MoveResult},
        catalog::PieceCatalog,
        polyomino::{PieceRef, Polyomino, Transformation},
    },
};

use super::{board_state::BoardState, game_stats::GameStats};

/// Settings of a game, checked by [`GameConfig::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub width: usize,
    pub height: usize,
    /// Number of cells of every piece.
    pub cell_count: usize,
    /// Number of pieces revealed before the one being played.
    pub known_ahead: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: 10,
            height: 20,
            cell_count: 4,
            known_ahead: 0,
        }
    }
}

impl GameConfig {
    pub const MAX_KNOWN_AHEAD: usize = 5;

    pub fn validate(&self) -> Result<(), ConfigError> {
        let sizes = BitGrid::MIN_SIZE..=BitGrid::MAX_SIZE;
        if !sizes.contains(&self.width) || !sizes.contains(&self.height) {
            return Err(ConfigError::GridSize {
                width: self.width,
                height: self.height,
            });
        }
        if !(1..=Polyomino::MAX_CELLS).contains(&self.cell_count) {
            return Err(ConfigError::CellCount {
                cells: self.cell_count,
            });
        }
        if self.known_ahead > Self::MAX_KNOWN_AHEAD {
            return Err(ConfigError::KnownAhead {
                count: self.known_ahead,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum SessionState {
    Playing,
    GameOver,
}

/// A game played move by move with randomly drawn pieces.
///
/// Pieces are drawn uniformly from the catalog with a seeded [`Pcg32`], so a
/// session is reproducible from its configuration and seed.
#[derive(Debug, Clone)]
pub struct GameSession {
    config: GameConfig,
    catalog: PieceCatalog,
    state: BoardState,
    stats: GameStats,
    rng: Pcg32,
    // Catalog positions of the pieces queued in `state`.
    upcoming: VecDeque<usize>,
    session_state: SessionState,
}

impl GameSession {
    /// Starts a session and reveals the pieces known in advance.
    pub fn new(config: GameConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        let catalog = PieceCatalog::new(config.cell_count)?;
        let state = BoardState::new(config.width, config.height)?;
        let stats = GameStats::new(catalog.len(), config.cell_count);
        let mut this = Self {
            config,
            catalog,
            state,
            stats,
            rng: Pcg32::seed_from_u64(seed),
            upcoming: VecDeque::with_capacity(config.known_ahead + 1),
            session_state: SessionState::Playing,
        };
        for _ in 0..config.known_ahead {
            this.reveal_next_piece();
        }
        Ok(this)
    }

    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    #[must_use]
    pub fn catalog(&self) -> &PieceCatalog {
        &self.catalog
    }

    #[must_use]
    pub fn state(&self) -> &BoardState {
        &self.state
    }

    #[must_use]
    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    #[must_use]
    pub fn session_state(&self) -> SessionState {
        self.session_state
    }

    /// Draws a piece and appends it to the queue of known pieces.
    pub fn reveal_next_piece(&mut self) -> &PieceRef {
        let index = self.rng.random_range(0..self.catalog.len());
        self.state.push_piece(Arc::clone(&self.catalog.pieces()[index]));
        self.upcoming.push_back(index);
        &self.catalog.pieces()[index]
    }

    /// Plays the queue head with `transformation`.
    ///
    /// [`Transformation::GAME_OVER`] or a piece that no longer fits ends the
    /// session; in both cases the returned result has `game_over` set.
    pub fn play(&mut self, transformation: Transformation) -> Result<MoveResult, PlayError> {
        if self.session_state.is_game_over() {
            return Err(PlayError::GameOver);
        }
        let (Some(piece), Some(&index)) = (self.state.next_piece(), self.upcoming.front()) else {
            return Err(PlayError::NoPendingPiece);
        };

        if transformation.is_game_over() {
            self.session_state = SessionState::GameOver;
            return Ok(MoveResult {
                game_over: true,
                ..MoveResult::default()
            });
        }

        let piece = Arc::clone(piece);
        let alive = self
            .state
            .play(&piece, transformation)
            .map_err(PlayError::Fit)?;
        self.state.pop_piece();
        self.upcoming.pop_front();

        let result = *self.state.move_result();
        if alive {
            self.stats.record_move(index, &result);
        } else {
            self.session_state = SessionState::GameOver;
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(known_ahead: usize) -> GameConfig {
        GameConfig {
            width: 6,
            height: 6,
            cell_count: 3,
            known_ahead,
        }
    }

    #[test]
    fn test_config_validation() {
        assert!(GameConfig::default().validate().is_ok());
        assert!(config(5).validate().is_ok());
        assert_eq!(
            config(6).validate(),
            Err(ConfigError::KnownAhead { count: 6 })
        );
        assert_eq!(
            GameConfig {
                width: 3,
                ..config(0)
            }
            .validate(),
            Err(ConfigError::GridSize {
                width: 3,
                height: 6
            })
        );
        assert_eq!(
            GameConfig {
                cell_count: 0,
                ..config(0)
            }
            .validate(),
            Err(ConfigError::CellCount { cells: 0 })
        );
        assert!(
            GameConfig {
                height: 33,
                ..config(0)
            }
            .validate()
            .is_err()
        );
    }

    #[test]
    fn test_pre_draws_known_pieces() {
        let session = GameSession::new(config(3), 0).unwrap();
        assert_eq!(session.state().queue_len(), 3);
        assert_eq!(session.catalog().len(), 2);
        assert!(session.session_state().is_playing());
    }

    #[test]
    fn test_same_seed_same_pieces() {
        let draw = |seed| {
            let mut session = GameSession::new(config(0), seed).unwrap();
            (0..20)
                .map(|_| {
                    let piece = Arc::clone(session.reveal_next_piece());
                    session.catalog().position(&piece).unwrap()
                })
                .collect::<Vec<_>>()
        };
        assert_eq!(draw(7), draw(7));
        assert!(draw(7).iter().all(|&index| index < 2));
    }

    #[test]
    fn test_play_requires_revealed_piece() {
        let mut session = GameSession::new(config(0), 0).unwrap();
        assert_eq!(
            session.play(Transformation::new(0, 0)),
            Err(PlayError::NoPendingPiece)
        );

        session.reveal_next_piece();
        let result = session.play(Transformation::new(0, 0)).unwrap();
        assert_eq!(result.landing_row, Some(0));
        assert_eq!(session.state().queue_len(), 0);
        assert_eq!(session.stats().moves(), 1);
        assert_eq!(session.stats().piece_counts().iter().sum::<usize>(), 1);
    }

    #[test]
    fn test_geometry_error_keeps_piece() {
        let mut session = GameSession::new(config(0), 0).unwrap();
        session.reveal_next_piece();
        assert!(matches!(
            session.play(Transformation::new(10, 0)),
            Err(PlayError::Fit(_))
        ));
        assert_eq!(session.state().queue_len(), 1);
        assert_eq!(session.stats().moves(), 0);
    }

    #[test]
    fn test_game_over_transformation_ends_session() {
        let mut session = GameSession::new(config(0), 0).unwrap();
        session.reveal_next_piece();
        let result = session.play(Transformation::GAME_OVER).unwrap();
        assert!(result.game_over);
        assert!(session.session_state().is_game_over());

        session.reveal_next_piece();
        assert_eq!(
            session.play(Transformation::new(0, 0)),
            Err(PlayError::GameOver)
        );
    }

    #[test]
    fn test_stacking_ends_session() {
        let mut session = GameSession::new(config(0), 0).unwrap();
        let mut moves = 0;
        loop {
            session.reveal_next_piece();
            // Everything lands against the right wall.
            let result = session.play(Transformation::new(0, 1)).unwrap();
            if result.game_over {
                break;
            }
            moves += 1;
            assert!(moves < 10);
        }
        assert!(session.session_state().is_game_over());
        assert_eq!(session.stats().moves(), moves);
    }
}
