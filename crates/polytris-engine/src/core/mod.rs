pub use self::{bit_grid::*, catalog::*, polyomino::*};

pub(crate) mod bit_grid;
pub(crate) mod catalog;
pub(crate) mod polyomino;
