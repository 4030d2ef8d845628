use std::fmt::{self, Write as _};

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use crate::{
    ConfigError, FitPieceError,
    core::polyomino::{Polyomino, Transformation},
};

/// Outcome of dropping one piece into a [`BitGrid`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveResult {
    /// The piece could not enter the grid.
    pub game_over: bool,
    /// Number of rows removed by the move.
    pub lines_cleared: usize,
    /// Number of cells of the played piece that disappeared with the cleared rows.
    pub piece_vanished_blocks: usize,
    /// Row where the bottom of the piece settled, `None` if the move failed.
    pub landing_row: Option<usize>,
}

/// Bit-packed playing field.
///
/// Row `0` is the bottom of the grid. Each row is stored as a `u32` whose low
/// `width` bits are the cells of the row; bit `width - 1` is the leftmost
/// column and bit `0` the rightmost, matching the bit layout of
/// [`Polyomino`] rows, so a translation moves a piece towards the left wall.
///
/// # Example
///
/// ```
/// use polytris_engine::{BitGrid, Polyomino, Transformation};
///
/// let mut grid = BitGrid::new(6, 6).unwrap();
/// let l = Polyomino::new(&[3, 1]).unwrap();
/// let i = Polyomino::new(&[7]).unwrap();
///
/// grid.fit_piece(&l, Transformation::new(0, 0)).unwrap();
/// grid.fit_piece(&i, Transformation::new(2, 1)).unwrap();
/// assert_eq!(grid.rows(), &[7, 5, 4, 0, 0, 0]);
///
/// let result = grid.fit_piece(&i, Transformation::new(3, 0)).unwrap();
/// assert_eq!(result.lines_cleared, 1);
/// assert_eq!(result.piece_vanished_blocks, 3);
/// assert_eq!(grid.rows(), &[5, 4, 0, 0, 0, 0]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitGrid {
    rows: ArrayVec<u32, { BitGrid::MAX_SIZE }>,
    width: usize,
    top_height: usize,
}

impl BitGrid {
    pub const MIN_SIZE: usize = 4;
    pub const MAX_SIZE: usize = 32;

    /// Creates an empty grid, rejecting dimensions outside
    /// [`MIN_SIZE`](Self::MIN_SIZE)..=[`MAX_SIZE`](Self::MAX_SIZE).
    pub fn new(width: usize, height: usize) -> Result<Self, ConfigError> {
        let range = Self::MIN_SIZE..=Self::MAX_SIZE;
        if !range.contains(&width) || !range.contains(&height) {
            return Err(ConfigError::GridSize { width, height });
        }
        let mut rows = ArrayVec::new();
        rows.extend((0..height).map(|_| 0));
        Ok(Self {
            rows,
            width,
            top_height: 0,
        })
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Returns all rows, bottom row first.
    #[must_use]
    pub fn rows(&self) -> &[u32] {
        &self.rows
    }

    /// Returns one more than the index of the highest non-empty row.
    #[must_use]
    pub fn top_height(&self) -> usize {
        self.top_height
    }

    /// Returns the value of a row with every cell occupied.
    #[must_use]
    pub fn full_row(&self) -> u32 {
        u32::MAX >> (u32::BITS as usize - self.width)
    }

    /// Drops a transformed piece from the top of the grid and merges it.
    ///
    /// The piece falls straight down from above [`top_height`](Self::top_height)
    /// and stops at the first collision or at the floor. Completed rows are
    /// removed immediately. When the piece would stick out of the top, the
    /// move is a game over and the grid is left untouched.
    pub fn fit_piece(
        &mut self,
        piece: &Polyomino,
        transformation: Transformation,
    ) -> Result<MoveResult, FitPieceError> {
        let full_row = self.full_row();
        let rows = piece
            .transformed_rows(transformation)
            .filter(|rows| rows.iter().all(|&bits| bits <= full_row))
            .ok_or(FitPieceError {
                translation: transformation.translation,
                rotation: transformation.rotation,
                width: self.width,
            })?;

        let Some(landing_row) = self.find_landing_row(&rows) else {
            return Ok(MoveResult {
                game_over: true,
                ..MoveResult::default()
            });
        };

        let mut result = MoveResult {
            landing_row: Some(landing_row),
            ..MoveResult::default()
        };
        self.top_height = usize::max(self.top_height, landing_row + rows.len());

        for (h, &bits) in rows.iter().enumerate() {
            // Rows cleared earlier in this loop shifted the remaining ones down.
            let y = landing_row + h - result.lines_cleared;
            self.rows[y] |= bits;
            if self.rows[y] == full_row {
                result.piece_vanished_blocks += bits.count_ones() as usize;
                result.lines_cleared += 1;
                self.remove_row(y);
            }
        }

        Ok(result)
    }

    fn find_landing_row(&self, piece: &[u32]) -> Option<usize> {
        let mut row = self.top_height;
        while row > 0 && !self.is_colliding(piece, row - 1) {
            row -= 1;
        }
        (row + piece.len() <= self.height()).then_some(row)
    }

    fn is_colliding(&self, piece: &[u32], row: usize) -> bool {
        piece
            .iter()
            .zip(&self.rows[row..])
            .any(|(piece_bits, grid_bits)| piece_bits & grid_bits != 0)
    }

    fn remove_row(&mut self, y: usize) {
        self.rows.remove(y);
        self.rows.push(0);
        self.top_height -= 1;
    }

    fn filled_rows(&self) -> &[u32] {
        &self.rows[..self.top_height]
    }

    /// Counts vertical 0/1 changes, with a full floor below row `0` and an
    /// empty ceiling above the highest filled row.
    #[must_use]
    pub fn column_transitions(&self) -> usize {
        let rows = self.filled_rows();
        let floor = (self.full_row() ^ self.rows[0]).count_ones();
        let ceiling = rows.last().map_or(0, |bits| bits.count_ones());
        let inner: u32 = rows
            .windows(2)
            .map(|pair| (pair[0] ^ pair[1]).count_ones())
            .sum();
        (floor + ceiling + inner) as usize
    }

    /// Counts horizontal 0/1 changes, treating both side walls as filled.
    #[must_use]
    pub fn row_transitions(&self) -> usize {
        let leftmost = 1 << (self.width - 1);
        let inner_mask = self.full_row() >> 1;
        self.filled_rows()
            .iter()
            .map(|&bits| {
                let left_wall = u32::from(bits & leftmost == 0);
                let right_wall = u32::from(bits & 1 == 0);
                let inner = ((bits ^ (bits >> 1)) & inner_mask).count_ones();
                (left_wall + right_wall + inner) as usize
            })
            .sum()
    }

    /// Counts empty cells that have an occupied cell somewhere above them in
    /// the same column.
    #[must_use]
    pub fn cellars(&self) -> usize {
        let mut roof = 0;
        let mut count = 0;
        for &bits in self.filled_rows().iter().rev() {
            roof &= !bits;
            count += roof.count_ones() as usize;
            roof |= bits;
        }
        count
    }

    /// Sums the depth of every well top found in the grid.
    ///
    /// A well top is an empty cell whose left and right neighbours are filled
    /// (walls count as filled). Each top contributes one plus the number of
    /// empty cells directly below it, so a perfect well of depth `n`
    /// contributes `n(n+1)/2`.
    #[must_use]
    pub fn wells(&self) -> usize {
        let width = self.width;
        let mut count = 0;
        for col in 0..width {
            let (mask, pattern) = if col == 0 {
                (0b11, 0b10)
            } else if col == width - 1 {
                (0b11 << (width - 2), 1 << (width - 2))
            } else {
                (0b111 << (col - 1), 0b101 << (col - 1))
            };
            for (row, &bits) in self.filled_rows().iter().enumerate().rev() {
                if bits & mask == pattern {
                    let below = row
                        .checked_sub(1)
                        .map_or(0, |below| self.empty_blocks_down(below, col));
                    count += 1 + below;
                }
            }
        }
        count
    }

    /// Counts consecutive empty cells in column `col`, from `row` downwards.
    #[must_use]
    pub fn empty_blocks_down(&self, row: usize, col: usize) -> usize {
        self.rows[..=row]
            .iter()
            .rev()
            .take_while(|&&bits| (bits >> col) & 1 == 0)
            .count()
    }

    /// Creates a grid from ASCII art for testing.
    ///
    /// `#` is an occupied cell and `.` an empty one. Lines are given top to
    /// bottom and the last line is row `0`; missing upper rows are empty.
    #[must_use]
    pub fn from_ascii(width: usize, height: usize, art: &str) -> Self {
        let mut grid = Self::new(width, height).unwrap();
        let lines: Vec<&str> = art.lines().filter(|line| !line.trim().is_empty()).collect();
        assert!(lines.len() <= height, "too many rows in ASCII grid");

        for (y, line) in lines.iter().rev().enumerate() {
            let cells: Vec<char> = line.chars().filter(|c| *c == '#' || *c == '.').collect();
            assert_eq!(
                cells.len(),
                width,
                "Each row must have exactly {width} cells, got {} at row {y}",
                cells.len()
            );
            grid.rows[y] = cells
                .iter()
                .fold(0, |acc, &c| (acc << 1) | u32::from(c == '#'));
        }
        grid.top_height = grid.rows.iter().rposition(|&bits| bits != 0).map_or(0, |y| y + 1);
        grid
    }
}

impl fmt::Display for BitGrid {
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

impl Serialize for BitGrid {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        // Format: "6x6:7,5,4,0,0,0" (hex rows, bottom first)
        let mut s = format!("{}x{}:", self.width, self.height());
        for (i, bits) in self.rows.iter().enumerate() {
            if i > 0 {
                s.push(',');
            }
            write!(&mut s, "{bits:x}").map_err(serde::ser::Error::custom)?;
        }
        serializer.serialize_str(&s)
    }
}

impl<'de> Deserialize<'de> for BitGrid {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;

        let (size, rows) = s.split_once(':').ok_or_else(|| {
            serde::de::Error::custom(format!("expected format '<w>x<h>:<rows>', got '{s}'"))
        })?;
        let (width, height) = size
            .split_once('x')
            .and_then(|(w, h)| Some((w.parse::<usize>().ok()?, h.parse::<usize>().ok()?)))
            .ok_or_else(|| serde::de::Error::custom(format!("invalid grid size: '{size}'")))?;

        let mut grid = Self::new(width, height).map_err(serde::de::Error::custom)?;
        let parts: Vec<&str> = rows.split(',').collect();
        if parts.len() != height {
            return Err(serde::de::Error::custom(format!(
                "expected {height} comma-separated hex values, got {}",
                parts.len()
            )));
        }

        let full_row = grid.full_row();
        for (i, hex_str) in parts.iter().enumerate() {
            let bits = u32::from_str_radix(hex_str, 16).map_err(|e| {
                serde::de::Error::custom(format!("invalid hex at row {i}: {hex_str} ({e})"))
            })?;
            if bits > full_row {
                return Err(serde::de::Error::custom(format!(
                    "row {i} exceeds grid width {width}: {hex_str}"
                )));
            }
            grid.rows[i] = bits;
        }
        grid.top_height = grid.rows.iter().rposition(|&bits| bits != 0).map_or(0, |y| y + 1);

        Ok(grid)
    }
}
