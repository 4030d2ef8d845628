//! Persistent lookahead tree of reachable board states.
//!
//! A [`StateNode`] holds one board state and one child per candidate move of
//! the next known piece. When the next piece is not known yet, the children
//! are [`UncertaintyNode`]s instead, one per catalog piece, each owning the
//! subtree built as if that piece came next. A layer of children is always
//! homogeneous.
//!
//! # Evaluation
//!
//! A childless node is scored by [`Evaluator::evaluate`]. Otherwise the
//! children are aggregated left to right and the result goes through
//! [`Evaluator::evaluate_branch`]:
//!
//! - moves of the same piece keep the running maximum (the first of equal
//!   values wins),
//! - candidate pieces keep the running mean, every piece being equally likely.
//!
//! # Depth
//!
//! Depth counts the moves still to look ahead. State children consume one
//! level; uncertainty children do not, they only stand for a piece that is
//! not known yet.
//!
//! # Reuse across turns
//!
//! After the best child has been extracted as the new root, the next turn
//! calls [`StateNode::update_tree`] with the newly revealed piece. Every
//! state on the known-piece chain appends it to its queue, and the first
//! state whose queue was empty replaces its uncertainty children with the
//! children of the matching branch. Leaves that gained lookahead are
//! expanded, then evaluations are refreshed bottom-up.

use std::{mem, num::NonZeroUsize, panic, sync::Arc, thread};

use polytris_engine::{BoardState, PieceCatalog, PieceRef, Transformation};
use polytris_evaluator::Evaluator;

use crate::{SearchError, split_range};

/// Node of the search tree.
#[derive(Debug, derive_more::IsVariant)]
pub enum SearchNode {
    State(StateNode),
    Uncertainty(UncertaintyNode),
}

/// Number of nodes of each kind found at one depth level.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LayerCount {
    pub state_nodes: usize,
    pub uncertainty_nodes: usize,
}

impl SearchNode {
    #[must_use]
    pub fn evaluation(&self) -> f32 {
        match self {
            Self::State(node) => node.evaluation,
            Self::Uncertainty(node) => node.sub_root.evaluation,
        }
    }

    /// Returns the state of the node, or of the subtree root for an
    /// uncertainty node.
    #[must_use]
    pub fn state(&self) -> &BoardState {
        match self {
            Self::State(node) => &node.state,
            Self::Uncertainty(node) => &node.sub_root.state,
        }
    }

    /// Returns the transformation that led to this node.
    #[must_use]
    pub fn last_move(&self) -> Option<Transformation> {
        self.state().transformation()
    }

    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.state().is_game_over()
    }

    /// Returns `true` for the uncertainty node standing for `piece`.
    #[must_use]
    pub fn match_piece(&self, piece: &PieceRef) -> bool {
        match self {
            Self::State(_) => false,
            Self::Uncertainty(node) => Arc::ptr_eq(&node.piece, piece),
        }
    }

    #[must_use]
    pub fn children(&self) -> &[SearchNode] {
        match self {
            Self::State(node) => &node.children,
            Self::Uncertainty(node) => &node.sub_root.children,
        }
    }

    /// Moves all children into `destination`, leaving this node childless.
    pub fn moving_children_ownership(&mut self, destination: &mut Vec<SearchNode>) {
        match self {
            Self::State(node) => node.moving_children_ownership(destination),
            Self::Uncertainty(node) => node.sub_root.moving_children_ownership(destination),
        }
    }

    /// Takes the child with the highest evaluation, dropping its siblings.
    pub fn extract_best_child(&mut self) -> Option<SearchNode> {
        match self {
            Self::State(node) => node.extract_best_child(),
            Self::Uncertainty(node) => node.sub_root.extract_best_child(),
        }
    }

    /// Updates the subtree, see [`StateNode::update_tree`].
    ///
    /// An uncertainty node stands for a piece nobody knows yet, so handing it
    /// a revealed piece is an error.
    pub fn update_tree(
        &mut self,
        piece: Option<&PieceRef>,
        depth: usize,
        catalog: &PieceCatalog,
        evaluator: &dyn Evaluator,
        parallel: bool,
    ) -> Result<(), SearchError> {
        match self {
            Self::State(node) => node.update_tree(piece, depth, catalog, evaluator, parallel),
            Self::Uncertainty(node) => {
                if piece.is_some() {
                    return Err(SearchError::UnexpectedPiece);
                }
                node.sub_root
                    .update_tree(None, depth, catalog, evaluator, parallel)
            }
        }
    }

    /// Counts nodes per depth level, this node being level 0.
    ///
    /// An uncertainty node is counted in place of its subtree root.
    #[must_use]
    pub fn layer_counts(&self) -> Vec<LayerCount> {
        match self {
            Self::State(node) => node.layer_counts(),
            Self::Uncertainty(node) => {
                let mut counts = node.sub_root.layer_counts();
                counts[0] = LayerCount {
                    state_nodes: 0,
                    uncertainty_nodes: 1,
                };
                counts
            }
        }
    }

    fn child_depth(&self, depth: usize) -> usize {
        match self {
            Self::State(_) => depth - 1,
            Self::Uncertainty(_) => depth,
        }
    }

    // Folds this node into the aggregate of its preceding siblings.
    #[expect(clippy::cast_precision_loss)]
    fn aggregate_with_siblings(&self, siblings: f32, position: usize) -> f32 {
        let own = self.evaluation();
        match self {
            Self::State(_) => {
                if position > 0 && siblings > own {
                    siblings
                } else {
                    own
                }
            }
            Self::Uncertainty(_) => {
                let position = position as f32;
                (position * siblings + own) / (position + 1.0)
            }
        }
    }
}

/// Tree node owning one board state.
#[derive(Debug)]
pub struct StateNode {
    state: BoardState,
    evaluation: f32,
    children: Vec<SearchNode>,
}

impl StateNode {
    /// Creates an unexpanded node; it is expanded by the first
    /// [`update_tree`](Self::update_tree).
    #[must_use]
    pub fn new(state: BoardState) -> Self {
        Self {
            state,
            evaluation: 0.0,
            children: Vec::new(),
        }
    }

    /// Builds the tree of `state` `depth` moves deep and evaluates it.
    pub fn build(
        state: BoardState,
        depth: usize,
        catalog: &PieceCatalog,
        evaluator: &dyn Evaluator,
    ) -> Result<Self, SearchError> {
        let mut node = Self::new(state);
        node.build_children(depth, catalog, evaluator)?;
        node.update_evaluation(evaluator);
        Ok(node)
    }

    fn build_children(
        &mut self,
        depth: usize,
        catalog: &PieceCatalog,
        evaluator: &dyn Evaluator,
    ) -> Result<(), SearchError> {
        if depth == 0 || self.state.is_game_over() {
            return Ok(());
        }
        self.children.clear();

        let mut base = self.state.clone();
        match base.pop_piece() {
            None => {
                for piece in catalog.pieces() {
                    let node = UncertaintyNode::build(piece, &base, depth, catalog, evaluator)?;
                    self.children.push(SearchNode::Uncertainty(node));
                }
            }
            Some(piece) => {
                let width = base.grid().width();
                for transformation in piece.transformations(width) {
                    let mut state = base.clone();
                    state.play(&piece, transformation)?;
                    let node = Self::build(state, depth - 1, catalog, evaluator)?;
                    self.children.push(SearchNode::State(node));
                }
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn state(&self) -> &BoardState {
        &self.state
    }

    #[must_use]
    pub fn evaluation(&self) -> f32 {
        self.evaluation
    }

    #[must_use]
    pub fn children(&self) -> &[SearchNode] {
        &self.children
    }

    #[must_use]
    pub fn last_move(&self) -> Option<Transformation> {
        self.state.transformation()
    }

    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.state.is_game_over()
    }

    /// Brings the tree up to date with a newly revealed piece and `depth`
    /// moves of lookahead.
    ///
    /// Does nothing when `depth` is 0. When `parallel` is set, the direct
    /// children are updated on scoped threads, each thread owning a
    /// contiguous span of them; deeper levels are always updated on the
    /// calling thread of their span.
    pub fn update_tree(
        &mut self,
        piece: Option<&PieceRef>,
        depth: usize,
        catalog: &PieceCatalog,
        evaluator: &dyn Evaluator,
        parallel: bool,
    ) -> Result<(), SearchError> {
        if depth == 0 {
            return Ok(());
        }

        let mut piece = piece;
        let queue_was_empty = self.state.queue_len() == 0;
        if let Some(piece) = piece {
            self.state.push_piece(Arc::clone(piece));
        }

        if self.children.is_empty() {
            self.build_children(depth, catalog, evaluator)?;
        } else {
            if queue_was_empty && let Some(revealed) = piece {
                self.trim_branches(revealed)?;
                piece = None;
            }
            if parallel {
                self.update_children_parallel(piece, depth, catalog, evaluator)?;
            } else {
                for child in &mut self.children {
                    let child_depth = child.child_depth(depth);
                    child.update_tree(piece, child_depth, catalog, evaluator, false)?;
                }
            }
        }

        self.update_evaluation(evaluator);
        Ok(())
    }

    // Keeps only the subtree built for `revealed`, splicing its children up.
    fn trim_branches(&mut self, revealed: &PieceRef) -> Result<(), SearchError> {
        let mut matching = mem::take(&mut self.children)
            .into_iter()
            .find(|child| child.match_piece(revealed))
            .ok_or(SearchError::MissingBranch)?;
        matching.moving_children_ownership(&mut self.children);
        Ok(())
    }

    fn update_children_parallel(
        &mut self,
        piece: Option<&PieceRef>,
        depth: usize,
        catalog: &PieceCatalog,
        evaluator: &dyn Evaluator,
    ) -> Result<(), SearchError> {
        let threads = thread::available_parallelism().map_or(1, NonZeroUsize::get);
        let spans = split_range(0..self.children.len(), threads);

        thread::scope(|s| {
            let mut rest = self.children.as_mut_slice();
            let handles = spans
                .iter()
                .map(|span| {
                    let (chunk, tail) = mem::take(&mut rest).split_at_mut(span.len());
                    rest = tail;
                    s.spawn(move || {
                        chunk.iter_mut().try_for_each(|child| {
                            let child_depth = child.child_depth(depth);
                            child.update_tree(piece, child_depth, catalog, evaluator, false)
                        })
                    })
                })
                .collect::<Vec<_>>();

            handles.into_iter().try_for_each(|handle| {
                handle
                    .join()
                    .unwrap_or_else(|payload| panic::resume_unwind(payload))
            })
        })
    }

    fn update_evaluation(&mut self, evaluator: &dyn Evaluator) {
        if self.children.is_empty() {
            self.evaluation = evaluator.evaluate(&self.state);
            return;
        }
        let aggregate = self
            .children
            .iter()
            .enumerate()
            .fold(0.0, |siblings, (position, child)| {
                child.aggregate_with_siblings(siblings, position)
            });
        self.evaluation = evaluator.evaluate_branch(&self.state, aggregate);
    }

    /// Moves all children into `destination`, leaving this node childless.
    pub fn moving_children_ownership(&mut self, destination: &mut Vec<SearchNode>) {
        destination.append(&mut self.children);
    }

    /// Takes the child with the strictly highest evaluation, the first one
    /// winning ties, and drops its siblings.
    ///
    /// Returns `None` for a childless node.
    pub fn extract_best_child(&mut self) -> Option<SearchNode> {
        let mut children = mem::take(&mut self.children);
        let mut best: Option<(usize, f32)> = None;
        for (index, child) in children.iter().enumerate() {
            let evaluation = child.evaluation();
            if best.is_none_or(|(_, best)| evaluation > best) {
                best = Some((index, evaluation));
            }
        }
        let (index, _) = best?;
        Some(children.swap_remove(index))
    }

    /// Counts nodes per depth level, this node being level 0.
    #[must_use]
    pub fn layer_counts(&self) -> Vec<LayerCount> {
        let mut counts = vec![LayerCount {
            state_nodes: 1,
            uncertainty_nodes: 0,
        }];
        for child in &self.children {
            for (level, count) in child.layer_counts().into_iter().enumerate() {
                if counts.len() <= level + 1 {
                    counts.push(LayerCount::default());
                }
                counts[level + 1].state_nodes += count.state_nodes;
                counts[level + 1].uncertainty_nodes += count.uncertainty_nodes;
            }
        }
        counts
    }
}

/// Tree node standing for a piece that has not been revealed yet.
#[derive(Debug)]
pub struct UncertaintyNode {
    piece: PieceRef,
    sub_root: Box<StateNode>,
}

impl UncertaintyNode {
    fn build(
        piece: &PieceRef,
        base: &BoardState,
        depth: usize,
        catalog: &PieceCatalog,
        evaluator: &dyn Evaluator,
    ) -> Result<Self, SearchError> {
        let mut state = base.clone();
        state.push_piece(Arc::clone(piece));
        Ok(Self {
            piece: Arc::clone(piece),
            sub_root: Box::new(StateNode::build(state, depth, catalog, evaluator)?),
        })
    }

    #[must_use]
    pub fn piece(&self) -> &PieceRef {
        &self.piece
    }

    #[must_use]
    pub fn sub_root(&self) -> &StateNode {
        &self.sub_root
    }
}
