/// Columns of the guest pixel grid
pub const GRID_WIDTH: usize = 64;
/// Rows of the guest pixel grid
pub const GRID_HEIGHT: usize = 32;
/// Bytes in the pixel grid, one per pixel, row-major
pub const GRID_SIZE: usize = GRID_WIDTH * GRID_HEIGHT;
/// The only pixel value drawn with the off color, everything else is on
pub const PIXEL_OFF: u8 = 0;
/// How many guest instructions run for every host frame
pub const STEPS_PER_FRAME: usize = 10;
/// Rate the guest timers are defined against
pub const TIMER_HZ: u64 = 60;
/// Side of one pixel cell on the host surface, in host pixels
pub const CELL_SIZE: u32 = 8;
/// Largest cell side accepted, anything bigger is clamped
pub const MAX_CELL_SIZE: u32 = 64;
/// Number of general purpose registers shown in the snapshot
pub const NUM_REGISTERS: usize = 16;
