use thiserror::Error;

/// Reasons a rom image is refused before the machine is created
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RomError {
    #[error("ROM is empty")]
    Empty,

    #[error("ROM is too large ({size} bytes), max size is {max} bytes")]
    TooLarge { size: usize, max: usize },
}

/// Faults raised while executing an instruction. The machine state is not
/// trustworthy after any of these.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    #[error("unknown opcode {opcode:#06X} at {address:#05X}")]
    UnknownOpcode { opcode: u16, address: u16 },

    #[error("stack overflow while calling {target:#05X}")]
    StackOverflow { target: u16 },

    #[error("stack underflow: returned with an empty call stack")]
    StackUnderflow,

    #[error("memory access out of range at {address:#06X}")]
    AddressOutOfRange { address: usize },
}
