//! Game state built on top of the core data structures.
//!
//! - [`BoardState`] - Grid snapshot, last played move and the queue of pieces known in advance
//! - [`GameSession`] - Multi-turn driver that draws pieces and tracks statistics
//! - [`GameStats`] - Move counts, per-piece counts and cleared-lines histogram
//! - [`GameConfig`] - Validated dimensions and piece settings of a session
//!
//! # Game Flow
//!
//! 1. Create a [`GameSession`] from a [`GameConfig`] and a seed
//! 2. Reveal the next piece, which joins the queue of known pieces
//! 3. Choose a [`Transformation`](crate::Transformation) for the queue head
//! 4. Play it; lines are cleared and statistics are updated
//! 5. Repeat until a piece no longer fits
//!
//! # Example
//!
//! ```
//! use polytris_engine::{GameConfig, GameSession, Transformation};
//!
//! let config = GameConfig {
//!     width: 6,
//!     height: 6,
//!     cell_count: 3,
//!     known_ahead: 0,
//! };
//! let mut session = GameSession::new(config, 42).unwrap();
//!
//! session.reveal_next_piece();
//! let result = session.play(Transformation::new(0, 0)).unwrap();
//! assert!(!result.game_over);
//! assert_eq!(session.stats().moves(), 1);
//! ```

pub use self::{board_state::*, game_session::*, game_stats::*};

mod board_state;
mod game_session;
mod game_stats;
