use std::sync::Arc;

use crate::{
    ConfigError,
    core::polyomino::{PieceRef, Polyomino},
};

// Rows are listed bottom first; bit 0 is the rightmost column.
const MONOMINOES: &[&[u32]] = &[&[0b1]];
const DOMINOES: &[&[u32]] = &[&[0b11]];
const TRIOMINOES: &[&[u32]] = &[
    &[0b111],      // I
    &[0b11, 0b01], // L
];
const TETROMINOES: &[&[u32]] = &[
    &[0b1111],       // I
    &[0b11, 0b11],   // O
    &[0b111, 0b010], // T
    &[0b110, 0b011], // S
    &[0b011, 0b110], // Z
    &[0b111, 0b100], // J
    &[0b111, 0b001], // L
];
const PENTOMINOES: &[&[u32]] = &[
    &[0b010, 0b110, 0b011],     // F
    &[0b010, 0b011, 0b110],     // F'
    &[0b11111],                 // I
    &[0b11, 0b10, 0b10, 0b10],  // L
    &[0b11, 0b01, 0b01, 0b01],  // L'
    &[0b10, 0b11, 0b01, 0b01],  // N
    &[0b01, 0b11, 0b10, 0b10],  // N'
    &[0b10, 0b11, 0b11],        // P
    &[0b01, 0b11, 0b11],        // P'
    &[0b010, 0b010, 0b111],     // T
    &[0b111, 0b101],            // U
    &[0b111, 0b100, 0b100],     // V
    &[0b011, 0b110, 0b100],     // W
    &[0b010, 0b111, 0b010],     // X
    &[0b01, 0b01, 0b11, 0b01],  // Y
    &[0b10, 0b10, 0b11, 0b10],  // Y'
    &[0b011, 0b010, 0b110],     // Z
    &[0b110, 0b010, 0b011],     // Z'
];

/// Every one-sided polyomino of a given cell count, in a fixed order.
///
/// A piece is identified by its position in the catalog; search and game
/// statistics both rely on that order being stable.
#[derive(Debug, Clone)]
pub struct PieceCatalog {
    cell_count: usize,
    pieces: Vec<PieceRef>,
}

impl PieceCatalog {
    /// Builds the catalog of pieces made of `cell_count` cells.
    ///
    /// # Example
    ///
    /// ```
    /// use polytris_engine::PieceCatalog;
    ///
    /// assert_eq!(PieceCatalog::new(3).unwrap().len(), 2);
    /// assert_eq!(PieceCatalog::new(4).unwrap().len(), 7);
    /// assert_eq!(PieceCatalog::new(5).unwrap().len(), 18);
    /// assert!(PieceCatalog::new(6).is_err());
    /// ```
    pub fn new(cell_count: usize) -> Result<Self, ConfigError> {
        let shapes = match cell_count {
            1 => MONOMINOES,
            2 => DOMINOES,
            3 => TRIOMINOES,
            4 => TETROMINOES,
            5 => PENTOMINOES,
            _ => return Err(ConfigError::CellCount { cells: cell_count }),
        };
        let pieces = shapes
            .iter()
            .map(|rows| Polyomino::new(rows).map(Arc::new))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| ConfigError::CellCount { cells: cell_count })?;
        Ok(Self { cell_count, pieces })
    }

    /// Builds a catalog from explicit pieces, all made of `cell_count` cells.
    pub fn from_pieces(cell_count: usize, pieces: Vec<PieceRef>) -> Result<Self, ConfigError> {
        if cell_count == 0
            || cell_count > Polyomino::MAX_CELLS
            || pieces.is_empty()
            || pieces.iter().any(|piece| piece.cell_count() != cell_count)
        {
            return Err(ConfigError::CellCount { cells: cell_count });
        }
        Ok(Self { cell_count, pieces })
    }

    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.cell_count
    }

    #[must_use]
    pub fn pieces(&self) -> &[PieceRef] {
        &self.pieces
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&PieceRef> {
        self.pieces.get(index)
    }

    /// Returns the index of `piece`, compared by identity.
    #[must_use]
    pub fn position(&self, piece: &PieceRef) -> Option<usize> {
        self.pieces.iter().position(|p| Arc::ptr_eq(p, piece))
    }
}
