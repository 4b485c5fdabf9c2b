//! # ferrochip-vm
//!
//! A CHIP-8 machine whose display plane lives inside its own linear memory,
//! so a host can read the pixels by offset instead of asking for a copy.

///This holds all of the constants (written in capital letters in the code)
pub mod constants;
mod error;
///Decoding of raw opcodes
mod instruction;
///The fetch, decode, execute loop
mod machine;
///Linear memory: ram, font and the display plane
mod memory;
///The registers and both timers
mod registers;
///Return addresses for subroutine calls
mod stack;

pub use constants::{DISPLAY_HEIGHT, DISPLAY_WIDTH, NUM_KEYS, NUM_REGISTERS, PIXEL_OFF, PIXEL_ON};
pub use error::{Fault, RomError};
pub use instruction::Instruction;
pub use machine::{Cycle, Machine};
