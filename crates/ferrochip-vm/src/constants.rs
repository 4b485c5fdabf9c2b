/// The width of the display in pixels
pub const DISPLAY_WIDTH: usize = 64;
/// The height of the display in pixels
pub const DISPLAY_HEIGHT: usize = 32;
/// One byte per pixel, row-major
pub const DISPLAY_SIZE: usize = DISPLAY_WIDTH * DISPLAY_HEIGHT;
/// The size of addressable ram in bytes
pub const RAM_SIZE: usize = 4096;
/// The display plane is laid out directly after ram in linear memory
pub const DISPLAY_OFFSET: usize = RAM_SIZE;
/// Total size of the linear memory the host can read
pub const MEMORY_SIZE: usize = RAM_SIZE + DISPLAY_SIZE;
/// For the regular chip 8 roms
pub const ROM_START_ADDRESS: u16 = 0x200;
/// Largest image that still fits between the program start and the end of ram
pub const MAX_ROM_SIZE: usize = RAM_SIZE - ROM_START_ADDRESS as usize;
/// Where the hexadecimal font sprites are stored
pub const FONT_ADDRESS: u16 = 0x050;
/// Amount of registers CHIP-8 has
pub const NUM_REGISTERS: u8 = 16;
/// Amount of keys on the hex keypad
pub const NUM_KEYS: u8 = 16;
/// Nesting depth of subroutine calls
pub const STACK_DEPTH: usize = 16;
/// Value of a pixel that is turned off
pub const PIXEL_OFF: u8 = 0;
/// Value of a pixel that is turned on
pub const PIXEL_ON: u8 = 1;
