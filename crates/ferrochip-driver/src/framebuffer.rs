use crate::constants::{GRID_SIZE, GRID_WIDTH, PIXEL_OFF};

/// One decoded pixel of the guest grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub row: usize,
    pub column: usize,
    pub on: bool,
}

/// Walks a row-major pixel grid. Bytes past the grid are never looked at.
pub fn decode(pixels: &[u8]) -> impl Iterator<Item = Cell> + '_ {
    pixels
        .iter()
        .take(GRID_SIZE)
        .enumerate()
        .map(|(index, &value)| Cell {
            row: index / GRID_WIDTH,
            column: index % GRID_WIDTH,
            on: value != PIXEL_OFF,
        })
}
