use std::{
    fmt::{self, Write as _},
    sync::Arc,
};

use arrayvec::ArrayVec;

use crate::ShapeError;

/// Shared handle to an immutable polyomino.
///
/// Pieces are owned by a [`PieceCatalog`](crate::PieceCatalog) and aliased by
/// every board state and search node that refers to them. Two handles denote
/// the same piece when they point to the same allocation
/// ([`Arc::ptr_eq`]).
pub type PieceRef = Arc<Polyomino>;

/// Row bitmasks of one rotation variant, bottom row first.
pub type PieceRows = ArrayVec<u32, { Polyomino::MAX_EXTENT }>;

/// Placement of a piece: rotation index and left shift of its rows.
///
/// The rotation index is taken modulo the piece's rotation count.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Transformation {
    pub translation: i32,
    pub rotation: usize,
}

impl Transformation {
    /// Sentinel returned by move strategies when no move avoids game over.
    pub const GAME_OVER: Self = Self {
        translation: -1,
        rotation: 0,
    };

    #[must_use]
    pub const fn new(translation: i32, rotation: usize) -> Self {
        Self {
            translation,
            rotation,
        }
    }

    #[must_use]
    pub const fn is_game_over(self) -> bool {
        self.translation < 0
    }
}

/// One rotation of a polyomino, trimmed to its bounding box.
///
/// Row `0` is the bottom of the piece. Bit `i` of a row is column `i`
/// counted from the low-order side; every variant occupies bit `0` in at
/// least one row and has no empty row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolyominoVariant {
    rows: PieceRows,
    width: usize,
}

impl PolyominoVariant {
    /// Creates a variant from row bitmasks, bottom row first.
    pub fn new(rows: &[u32]) -> Result<Self, ShapeError> {
        if rows.is_empty() {
            return Err(ShapeError::Empty);
        }
        if rows.len() > Polyomino::MAX_EXTENT {
            return Err(ShapeError::TooLarge { extent: rows.len() });
        }
        if let Some(row) = rows.iter().position(|&bits| bits == 0) {
            return Err(ShapeError::EmptyRow { row });
        }

        let union = rows.iter().fold(0, |acc, &bits| acc | bits);
        if union & 1 == 0 {
            return Err(ShapeError::Unaligned);
        }
        let width = bit_width(union);
        if width > Polyomino::MAX_EXTENT {
            return Err(ShapeError::TooLarge { extent: width });
        }

        Ok(Self {
            rows: rows.iter().copied().collect(),
            width,
        })
    }

    #[must_use]
    pub fn rows(&self) -> &[u32] {
        &self.rows
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.rows.iter().map(|bits| bits.count_ones() as usize).sum()
    }

    /// Returns this variant turned by a quarter.
    ///
    /// The rows are transposed, then every row is bit-reversed within the new
    /// width (the old height).
    #[must_use]
    pub fn rotated(&self) -> Self {
        let height = self.height();
        let rows = (0..self.width)
            .map(|col| {
                self.rows
                    .iter()
                    .enumerate()
                    .filter(|&(_, bits)| (bits >> col) & 1 != 0)
                    .fold(0, |acc, (row, _)| acc | 1 << (height - 1 - row))
            })
            .collect();
        Self {
            rows,
            width: height,
        }
    }

    /// Shifts every row `translation` columns towards the high-order side.
    ///
    /// Returns `None` for a negative translation or when a cell would be
    /// shifted out of the 32-bit row.
    #[must_use]
    pub fn translated(&self, translation: i32) -> Option<PieceRows> {
        let shift = u32::try_from(translation).ok()?;
        self.rows
            .iter()
            .map(|&bits| (bits.leading_zeros() >= shift).then(|| bits << shift))
            .collect()
    }
}

impl fmt::Display for PolyominoVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &bits in self.rows.iter().rev() {
            for col in (0..self.width).rev() {
                f.write_char(if (bits >> col) & 1 != 0 { '#' } else { '.' })?;
            }
            f.write_char('\n')?;
        }
        Ok(())
    }
}

/// A polyomino with all its distinct rotation variants.
///
/// Variants are generated by rotating the base variant until the base state
/// comes back, so a piece has 1, 2 or 4 of them depending on its symmetry.
///
/// # Example
///
/// ```
/// use polytris_engine::{Polyomino, Transformation};
///
/// // Bottom row `111`, top row `010`.
/// let t = Polyomino::new(&[0b111, 0b010]).unwrap();
/// assert_eq!(t.rotation_count(), 4);
/// assert_eq!(t.variant(1).rows(), &[0b10, 0b11, 0b10]);
///
/// let rows = t.transformed_rows(Transformation::new(2, 0)).unwrap();
/// assert_eq!(rows.as_slice(), &[0b11100, 0b01000]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Polyomino {
    variants: ArrayVec<PolyominoVariant, 4>,
}

impl Polyomino {
    /// Largest number of cells a catalog piece may have.
    pub const MAX_CELLS: usize = 5;
    /// Largest width or height of a piece.
    pub const MAX_EXTENT: usize = 5;

    /// Builds the rotation family of a piece from its base rows.
    pub fn new(base_rows: &[u32]) -> Result<Self, ShapeError> {
        let base = PolyominoVariant::new(base_rows)?;
        let mut variants = ArrayVec::<_, 4>::new();
        let mut rotated = base.rotated();
        variants.push(base);

        while rotated != variants[0] {
            if variants.is_full() {
                return Err(ShapeError::OpenRotationCycle);
            }
            let next = rotated.rotated();
            variants.push(rotated);
            rotated = next;
        }

        Ok(Self { variants })
    }

    /// Returns the variant for `rotation`, taken modulo the rotation count.
    #[must_use]
    pub fn variant(&self, rotation: usize) -> &PolyominoVariant {
        &self.variants[rotation % self.variants.len()]
    }

    pub fn variants(&self) -> impl Iterator<Item = &PolyominoVariant> + '_ {
        self.variants.iter()
    }

    #[must_use]
    pub fn rotation_count(&self) -> usize {
        self.variants.len()
    }

    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.variants[0].cell_count()
    }

    /// Rotates then translates the piece.
    ///
    /// Returns `None` when the translation is negative or pushes cells out of
    /// a 32-bit row. Whether the rows fit a particular grid is checked by
    /// [`BitGrid::fit_piece`](crate::BitGrid::fit_piece).
    #[must_use]
    pub fn transformed_rows(&self, transformation: Transformation) -> Option<PieceRows> {
        self.variant(transformation.rotation)
            .translated(transformation.translation)
    }

    /// Enumerates every placement that keeps the piece inside `grid_width`
    /// columns, rotation-major.
    pub fn transformations(&self, grid_width: usize) -> impl Iterator<Item = Transformation> + '_ {
        self.variants
            .iter()
            .enumerate()
            .flat_map(move |(rotation, variant)| {
                let max_translation = grid_width.checked_sub(variant.width());
                max_translation
                    .into_iter()
                    .flat_map(|max| 0..=max)
                    .filter_map(move |translation| {
                        let translation = i32::try_from(translation).ok()?;
                        Some(Transformation::new(translation, rotation))
                    })
            })
    }
}

fn bit_width(bits: u32) -> usize {
    (u32::BITS - bits.leading_zeros()) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variant(rows: &[u32]) -> PolyominoVariant {
        PolyominoVariant::new(rows).unwrap()
    }

    #[test]
    fn test_variant_dimensions() {
        let v = variant(&[2, 7]);
        assert_eq!(v.height(), 2);
        assert_eq!(v.width(), 3);
        assert_eq!(v.rows(), &[2, 7]);
        assert_eq!(v.cell_count(), 4);
    }

    #[test]
    fn test_variant_rejects_invalid_rows() {
        assert_eq!(PolyominoVariant::new(&[]), Err(ShapeError::Empty));
        assert_eq!(
            PolyominoVariant::new(&[1, 0]),
            Err(ShapeError::EmptyRow { row: 1 })
        );
        assert_eq!(PolyominoVariant::new(&[2, 6]), Err(ShapeError::Unaligned));
        assert_eq!(
            PolyominoVariant::new(&[0b11_1111]),
            Err(ShapeError::TooLarge { extent: 6 })
        );
        assert_eq!(
            PolyominoVariant::new(&[1; 6]),
            Err(ShapeError::TooLarge { extent: 6 })
        );
    }

    #[test]
    fn test_variant_display() {
        // L triomino: bottom row `11`, top row `01`.
        assert_eq!(variant(&[0b11, 0b01]).to_string(), ".#\n##\n");
    }

    #[test]
    fn test_translation() {
        let v = variant(&[2, 7, 1]);
        assert_eq!(v.translated(0).unwrap().as_slice(), &[2, 7, 1]);
        assert_eq!(v.translated(1).unwrap().as_slice(), &[4, 14, 2]);
        assert_eq!(v.translated(2).unwrap().as_slice(), &[8, 28, 4]);
        assert_eq!(v.translated(5).unwrap().as_slice(), &[64, 224, 32]);
    }

    #[test]
    fn test_translation_out_of_range() {
        let v = variant(&[2, 7, 1]);
        assert!(v.translated(-1).is_none());
        assert!(v.translated(29).is_some());
        assert!(v.translated(30).is_none());
    }

    #[test]
    fn test_translation_composes() {
        let v = variant(&[3, 6]);
        for t1 in 0..6 {
            let once = v.translated(t1).unwrap();
            for t2 in 0..6 {
                let shifted: Vec<u32> = once.iter().map(|bits| bits << t2).collect();
                let direct = v.translated(t1 + t2).unwrap();
                assert_eq!(shifted.as_slice(), direct.as_slice());
            }
            let restored: Vec<u32> = once.iter().map(|bits| bits >> t1).collect();
            assert_eq!(restored.as_slice(), v.rows());
        }
    }

    #[test]
    fn test_tetromino_rotations() {
        let tetrominoes: [&[&[u32]]; 7] = [
            &[&[2, 7], &[1, 3, 1], &[7, 2], &[2, 3, 2]], // T
            &[&[15], &[1, 1, 1, 1]],                     // I
            &[&[4, 7], &[1, 1, 3], &[7, 1], &[3, 2, 2]], // L
            &[&[1, 7], &[3, 1, 1], &[7, 4], &[2, 2, 3]], // J
            &[&[3, 3]],                                  // O
            &[&[6, 3], &[1, 3, 2]],                      // S
            &[&[3, 6], &[2, 3, 1]],                      // Z
        ];

        for expected in tetrominoes {
            let piece = Polyomino::new(expected[0]).unwrap();
            assert_eq!(piece.rotation_count(), expected.len());
            for (rotation, rows) in expected.iter().enumerate() {
                assert_eq!(piece.variant(rotation).rows(), *rows);
            }
            // Rotation index wraps around.
            assert_eq!(piece.variant(expected.len()), piece.variant(0));
        }
    }

    #[test]
    fn test_full_rotation_restores_base() {
        for base in [&[2, 7][..], &[15], &[3, 3], &[1, 3, 2], &[2, 6, 3]] {
            let piece = Polyomino::new(base).unwrap();
            assert!(matches!(piece.rotation_count(), 1 | 2 | 4));

            let start = piece.variant(0).clone();
            let mut current = start.clone();
            for _ in 0..piece.rotation_count() {
                current = current.rotated();
            }
            assert_eq!(current, start);
        }
    }

    #[test]
    fn test_transformed_rows() {
        let piece = Polyomino::new(&[7]).unwrap();
        assert_eq!(
            piece
                .transformed_rows(Transformation::new(2, 1))
                .unwrap()
                .as_slice(),
            &[4, 4, 4]
        );
        assert_eq!(
            piece
                .transformed_rows(Transformation::new(3, 2))
                .unwrap()
                .as_slice(),
            &[56]
        );
    }

    #[test]
    fn test_transformations_cover_grid_width() {
        let i = Polyomino::new(&[7]).unwrap();
        let l = Polyomino::new(&[3, 1]).unwrap();
        assert_eq!(i.transformations(6).count(), 10);
        assert_eq!(l.transformations(6).count(), 20);

        let moves: Vec<_> = i.transformations(4).collect();
        assert_eq!(
            moves,
            [
                Transformation::new(0, 0),
                Transformation::new(1, 0),
                Transformation::new(0, 1),
                Transformation::new(1, 1),
                Transformation::new(2, 1),
                Transformation::new(3, 1),
            ]
        );

        // Horizontal I pentomino does not fit a 4-wide grid.
        let long = Polyomino::new(&[31]).unwrap();
        assert_eq!(long.transformations(4).count(), 4);
    }

    #[test]
    fn test_game_over_transformation() {
        assert!(Transformation::GAME_OVER.is_game_over());
        assert!(!Transformation::new(0, 3).is_game_over());
    }
}
