use crate::constants::{
    DISPLAY_OFFSET, DISPLAY_SIZE, FONT_ADDRESS, MAX_ROM_SIZE, MEMORY_SIZE, PIXEL_OFF, RAM_SIZE,
    ROM_START_ADDRESS,
};
use crate::error::{Fault, RomError};

/// Each digit is five rows of four pixels, written as the high nibble of a byte.
/// The first one, F0 90 90 90 F0, stacked up reads
///
/// 1111
/// 1  1
/// 1  1
/// 1  1
/// 1111
const FONTSET: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // a
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // b
    0xF0, 0x80, 0x80, 0x80, 0xF0, // c
    0xE0, 0x90, 0x90, 0x90, 0xE0, // d
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // e
    0xF0, 0x80, 0xF0, 0x80, 0x80, // f
];

/// Linear memory of the machine, laid out as
///
/// ```text
/// 0x0000..0x0050  unused
/// 0x0050..0x00a0  font
/// 0x0200..0x1000  program and data
/// 0x1000..0x1800  display plane, one byte per pixel
/// ```
///
/// Programs can only address the first 4K, the display plane is written by
/// the draw instructions and read by the host.
pub struct Memory {
    bytes: Box<[u8]>,
}

impl Memory {
    /// Returns memory with the font loaded and `rom` copied to the program start
    pub fn with_rom(rom: &[u8]) -> Result<Self, RomError> {
        if rom.is_empty() {
            return Err(RomError::Empty);
        }
        if rom.len() > MAX_ROM_SIZE {
            return Err(RomError::TooLarge {
                size: rom.len(),
                max: MAX_ROM_SIZE,
            });
        }

        let mut bytes = vec![0u8; MEMORY_SIZE].into_boxed_slice();
        let font = FONT_ADDRESS as usize;
        bytes[font..font + FONTSET.len()].copy_from_slice(&FONTSET);
        let start = ROM_START_ADDRESS as usize;
        bytes[start..start + rom.len()].copy_from_slice(rom);

        Ok(Self { bytes })
    }

    /// Reads a big endian opcode
    pub fn opcode(&self, address: u16) -> Result<u16, Fault> {
        let high = self.byte(address)?;
        let low = self.byte(address.wrapping_add(1))?;
        Ok(u16::from_be_bytes([high, low]))
    }

    pub fn byte(&self, address: u16) -> Result<u8, Fault> {
        let address = ram_address(address)?;
        Ok(self.bytes[address])
    }

    pub fn set_byte(&mut self, address: u16, value: u8) -> Result<(), Fault> {
        let address = ram_address(address)?;
        self.bytes[address] = value;
        Ok(())
    }

    pub fn display(&self) -> &[u8] {
        &self.bytes[DISPLAY_OFFSET..DISPLAY_OFFSET + DISPLAY_SIZE]
    }

    pub fn display_mut(&mut self) -> &mut [u8] {
        &mut self.bytes[DISPLAY_OFFSET..DISPLAY_OFFSET + DISPLAY_SIZE]
    }

    pub fn clear_display(&mut self) {
        self.display_mut().fill(PIXEL_OFF);
    }

    /// The whole linear memory, display plane included
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }
}

fn ram_address(address: u16) -> Result<usize, Fault> {
    let address = address as usize;
    if address < RAM_SIZE {
        Ok(address)
    } else {
        Err(Fault::AddressOutOfRange { address })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::PIXEL_ON;

    #[test]
    fn loads_rom_after_the_font() {
        let memory = Memory::with_rom(&[0x12, 0x34]).unwrap();
        assert_eq!(memory.opcode(ROM_START_ADDRESS).unwrap(), 0x1234);
        assert_eq!(memory.byte(FONT_ADDRESS).unwrap(), 0xF0);
        assert_eq!(memory.as_slice().len(), MEMORY_SIZE);
    }

    #[test]
    fn refuses_empty_and_oversized_roms() {
        assert!(matches!(Memory::with_rom(&[]), Err(RomError::Empty)));
        let rom = vec![0; MAX_ROM_SIZE + 1];
        assert_eq!(
            Memory::with_rom(&rom).err(),
            Some(RomError::TooLarge {
                size: MAX_ROM_SIZE + 1,
                max: MAX_ROM_SIZE
            })
        );
        assert!(Memory::with_rom(&vec![0; MAX_ROM_SIZE]).is_ok());
    }

    #[test]
    fn programs_cannot_reach_the_display_plane() {
        let mut memory = Memory::with_rom(&[0]).unwrap();
        assert_eq!(
            memory.set_byte(0x1000, 1),
            Err(Fault::AddressOutOfRange { address: 0x1000 })
        );
        assert!(memory.opcode(0x0fff).is_err());
    }

    #[test]
    fn display_plane_is_a_window_into_linear_memory() {
        let mut memory = Memory::with_rom(&[0]).unwrap();
        memory.display_mut()[3] = PIXEL_ON;
        assert_eq!(memory.as_slice()[DISPLAY_OFFSET + 3], PIXEL_ON);
        memory.clear_display();
        assert!(memory.display().iter().all(|&pixel| pixel == PIXEL_OFF));
    }
}
