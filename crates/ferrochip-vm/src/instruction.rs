/// # Every instruction of the chip8 language
/// ## nnn
/// a 12 bit memory address
/// ## kk
/// an 8 bit immediate
/// ## n
/// a nibble, 4 bits
/// ## x and y
/// register numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// 0nnn, machine code routines are not supported and do nothing
    Sys,
    /// 00e0
    ClearScreen,
    /// 00ee
    Return,
    /// 1nnn
    Jump { nnn: u16 },
    /// 2nnn
    Call { nnn: u16 },
    /// 3xkk
    SkipIfEqual { x: u8, kk: u8 },
    /// 4xkk
    SkipIfNotEqual { x: u8, kk: u8 },
    /// 5xy0
    SkipIfRegistersEqual { x: u8, y: u8 },
    /// 6xkk
    Load { x: u8, kk: u8 },
    /// 7xkk, no carry flag
    Add { x: u8, kk: u8 },
    /// 8xy0
    Copy { x: u8, y: u8 },
    /// 8xy1
    Or { x: u8, y: u8 },
    /// 8xy2
    And { x: u8, y: u8 },
    /// 8xy3
    Xor { x: u8, y: u8 },
    /// 8xy4, vf is the carry
    AddRegisters { x: u8, y: u8 },
    /// 8xy5, vx - vy, vf is set when there was no borrow
    Sub { x: u8, y: u8 },
    /// 8xy6
    ShiftRight { x: u8 },
    /// 8xy7, vy - vx, vf is set when there was no borrow
    SubReversed { x: u8, y: u8 },
    /// 8xye
    ShiftLeft { x: u8 },
    /// 9xy0
    SkipIfRegistersNotEqual { x: u8, y: u8 },
    /// annn
    LoadIndex { nnn: u16 },
    /// bnnn
    JumpPlusV0 { nnn: u16 },
    /// cxkk
    Random { x: u8, kk: u8 },
    /// dxyn, draws an 8 pixel wide sprite of n rows at (vx, vy)
    Draw { x: u8, y: u8, n: u8 },
    /// ex9e
    SkipIfKeyPressed { x: u8 },
    /// exa1
    SkipIfKeyNotPressed { x: u8 },
    /// fx07
    LoadDelayTimer { x: u8 },
    /// fx0a
    WaitForKey { x: u8 },
    /// fx15
    SetDelayTimer { x: u8 },
    /// fx18
    SetSoundTimer { x: u8 },
    /// fx1e
    AddToIndex { x: u8 },
    /// fx29
    LoadFontSprite { x: u8 },
    /// fx33
    StoreBcd { x: u8 },
    /// fx55
    StoreRegisters { x: u8 },
    /// fx65
    LoadRegisters { x: u8 },
}

impl Instruction {
    /// Decodes two bytes into an instruction, `None` when the opcode is not part of the set
    pub fn decode(opcode: u16) -> Option<Self> {
        let x = nibble(opcode, 1);
        let y = nibble(opcode, 2);
        let n = nibble(opcode, 3);
        let kk = (opcode & 0xff) as u8;
        let nnn = opcode & 0xfff;

        let instruction = match nibble(opcode, 0) {
            0x0 => match opcode {
                0x00e0 => Self::ClearScreen,
                0x00ee => Self::Return,
                _ => Self::Sys,
            },
            0x1 => Self::Jump { nnn },
            0x2 => Self::Call { nnn },
            0x3 => Self::SkipIfEqual { x, kk },
            0x4 => Self::SkipIfNotEqual { x, kk },
            0x5 if n == 0 => Self::SkipIfRegistersEqual { x, y },
            0x6 => Self::Load { x, kk },
            0x7 => Self::Add { x, kk },
            0x8 => match n {
                0x0 => Self::Copy { x, y },
                0x1 => Self::Or { x, y },
                0x2 => Self::And { x, y },
                0x3 => Self::Xor { x, y },
                0x4 => Self::AddRegisters { x, y },
                0x5 => Self::Sub { x, y },
                0x6 => Self::ShiftRight { x },
                0x7 => Self::SubReversed { x, y },
                0xe => Self::ShiftLeft { x },
                _ => return None,
            },
            0x9 if n == 0 => Self::SkipIfRegistersNotEqual { x, y },
            0xa => Self::LoadIndex { nnn },
            0xb => Self::JumpPlusV0 { nnn },
            0xc => Self::Random { x, kk },
            0xd => Self::Draw { x, y, n },
            0xe => match kk {
                0x9e => Self::SkipIfKeyPressed { x },
                0xa1 => Self::SkipIfKeyNotPressed { x },
                _ => return None,
            },
            0xf => match kk {
                0x07 => Self::LoadDelayTimer { x },
                0x0a => Self::WaitForKey { x },
                0x15 => Self::SetDelayTimer { x },
                0x18 => Self::SetSoundTimer { x },
                0x1e => Self::AddToIndex { x },
                0x29 => Self::LoadFontSprite { x },
                0x33 => Self::StoreBcd { x },
                0x55 => Self::StoreRegisters { x },
                0x65 => Self::LoadRegisters { x },
                _ => return None,
            },
            _ => return None,
        };
        Some(instruction)
    }
}

/// Returns the nth nibble of an opcode, counted from the most significant one
fn nibble(opcode: u16, nth: u8) -> u8 {
    debug_assert!(nth < 4);
    ((opcode >> (12 - 4 * nth)) & 0xf) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_operands() {
        assert_eq!(
            Instruction::decode(0xd12f),
            Some(Instruction::Draw { x: 1, y: 2, n: 0xf })
        );
        assert_eq!(
            Instruction::decode(0x7a42),
            Some(Instruction::Add { x: 0xa, kk: 0x42 })
        );
        assert_eq!(
            Instruction::decode(0xa123),
            Some(Instruction::LoadIndex { nnn: 0x123 })
        );
    }

    #[test]
    fn machine_routines_are_ignored() {
        assert_eq!(Instruction::decode(0x0123), Some(Instruction::Sys));
        assert_eq!(Instruction::decode(0x00e0), Some(Instruction::ClearScreen));
        assert_eq!(Instruction::decode(0x00ee), Some(Instruction::Return));
    }

    #[test]
    fn rejects_holes_in_the_opcode_table() {
        for opcode in [0x5121, 0x8008, 0x900f, 0xe000, 0xf0ff] {
            assert_eq!(Instruction::decode(opcode), None, "{opcode:#06x}");
        }
    }
}
