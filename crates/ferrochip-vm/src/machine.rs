use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::constants::{
    DISPLAY_HEIGHT, DISPLAY_OFFSET, DISPLAY_WIDTH, FONT_ADDRESS, NUM_KEYS, PIXEL_OFF, PIXEL_ON,
    ROM_START_ADDRESS,
};
use crate::error::{Fault, RomError};
use crate::instruction::Instruction;
use crate::memory::Memory;
use crate::registers::Registers;
use crate::stack::Stack;

/// What a single cycle asks of the host besides advancing the machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cycle {
    Continue,
    /// The sound timer was armed, the host should beep for this many timer ticks
    Beep { frames: u8 },
}

/// The chip8 machine
pub struct Machine {
    /// Linear memory, the display plane included
    memory: Memory,
    registers: Registers,
    stack: Stack,
    /// Points at the next opcode, starts at 0x200
    program_counter: u16,
    /// The hex keypad, true while a key is held down
    keys: [bool; NUM_KEYS as usize],
    /// Seedable so `cxkk` can be tested
    rng: ChaCha8Rng,
}

impl Machine {
    /// Creates a machine with `rom` loaded at 0x200 and a random seed
    pub fn new(rom: &[u8]) -> Result<Self, RomError> {
        Self::with_seed(rom, rand::random())
    }

    pub fn with_seed(rom: &[u8], seed: u64) -> Result<Self, RomError> {
        Ok(Self {
            memory: Memory::with_rom(rom)?,
            registers: Registers::default(),
            stack: Stack::default(),
            program_counter: ROM_START_ADDRESS,
            keys: [false; NUM_KEYS as usize],
            rng: ChaCha8Rng::seed_from_u64(seed),
        })
    }

    /// Fetches, decodes and executes one instruction. Timers are left alone,
    /// see [`Machine::tick_timers`].
    pub fn cycle(&mut self) -> Result<Cycle, Fault> {
        let address = self.program_counter;
        let opcode = self.memory.opcode(address)?;
        let instruction =
            Instruction::decode(opcode).ok_or(Fault::UnknownOpcode { opcode, address })?;
        self.program_counter = address.wrapping_add(2);
        self.execute(instruction)
    }

    /// Decrements the delay and sound timers by one
    pub fn tick_timers(&mut self) {
        self.registers.decrement_timers();
    }

    /// Set key's state, keys outside the keypad are ignored
    pub fn set_key(&mut self, key: u8, pressed: bool) {
        if let Some(slot) = self.keys.get_mut(key as usize) {
            *slot = pressed;
        }
    }

    pub fn is_key_pressed(&self, key: u8) -> bool {
        self.keys.get(key as usize).copied().unwrap_or(false)
    }

    /// Offset of the display plane inside [`Machine::memory`]
    pub fn display_offset(&self) -> usize {
        DISPLAY_OFFSET
    }

    pub fn memory(&self) -> &[u8] {
        self.memory.as_slice()
    }

    pub fn register(&self, register: u8) -> u8 {
        self.registers.v(register)
    }

    pub fn index(&self) -> u16 {
        self.registers.index()
    }

    pub fn program_counter(&self) -> u16 {
        self.program_counter
    }

    pub fn delay_timer(&self) -> u8 {
        self.registers.delay_timer()
    }

    pub fn sound_timer(&self) -> u8 {
        self.registers.sound_timer()
    }

    fn skip_if(&mut self, condition: bool) {
        if condition {
            self.program_counter = self.program_counter.wrapping_add(2);
        }
    }

    fn execute(&mut self, instruction: Instruction) -> Result<Cycle, Fault> {
        let r = &mut self.registers;
        match instruction {
            Instruction::Sys => {}
            Instruction::ClearScreen => self.memory.clear_display(),
            Instruction::Return => self.program_counter = self.stack.pop()?,
            Instruction::Jump { nnn } => self.program_counter = nnn,
            Instruction::Call { nnn } => {
                self.stack.push(self.program_counter, nnn)?;
                self.program_counter = nnn;
            }
            Instruction::SkipIfEqual { x, kk } => {
                let equal = r.v(x) == kk;
                self.skip_if(equal);
            }
            Instruction::SkipIfNotEqual { x, kk } => {
                let different = r.v(x) != kk;
                self.skip_if(different);
            }
            Instruction::SkipIfRegistersEqual { x, y } => {
                let equal = r.v(x) == r.v(y);
                self.skip_if(equal);
            }
            Instruction::SkipIfRegistersNotEqual { x, y } => {
                let different = r.v(x) != r.v(y);
                self.skip_if(different);
            }
            Instruction::Load { x, kk } => r.set_v(x, kk),
            Instruction::Add { x, kk } => r.set_v(x, r.v(x).wrapping_add(kk)),
            Instruction::Copy { x, y } => r.set_v(x, r.v(y)),
            Instruction::Or { x, y } => r.set_v(x, r.v(x) | r.v(y)),
            Instruction::And { x, y } => r.set_v(x, r.v(x) & r.v(y)),
            Instruction::Xor { x, y } => r.set_v(x, r.v(x) ^ r.v(y)),
            Instruction::AddRegisters { x, y } => {
                let (sum, carry) = r.v(x).overflowing_add(r.v(y));
                r.set_v(x, sum);
                r.set_flag(carry);
            }
            Instruction::Sub { x, y } => {
                let (difference, borrow) = r.v(x).overflowing_sub(r.v(y));
                r.set_v(x, difference);
                r.set_flag(!borrow);
            }
            Instruction::SubReversed { x, y } => {
                let (difference, borrow) = r.v(y).overflowing_sub(r.v(x));
                r.set_v(x, difference);
                r.set_flag(!borrow);
            }
            Instruction::ShiftRight { x } => {
                let vx = r.v(x);
                r.set_v(x, vx >> 1);
                r.set_flag(vx & 1 == 1);
            }
            Instruction::ShiftLeft { x } => {
                let vx = r.v(x);
                r.set_v(x, vx << 1);
                r.set_flag(vx & 0x80 != 0);
            }
            Instruction::LoadIndex { nnn } => r.set_index(nnn),
            Instruction::JumpPlusV0 { nnn } => {
                self.program_counter = nnn.wrapping_add(u16::from(r.v(0)));
            }
            Instruction::Random { x, kk } => {
                let byte: u8 = self.rng.random();
                r.set_v(x, byte & kk);
            }
            Instruction::Draw { x, y, n } => self.draw(x, y, n)?,
            Instruction::SkipIfKeyPressed { x } => {
                let key = r.v(x) & 0xf;
                let pressed = self.is_key_pressed(key);
                self.skip_if(pressed);
            }
            Instruction::SkipIfKeyNotPressed { x } => {
                let key = r.v(x) & 0xf;
                let pressed = self.is_key_pressed(key);
                self.skip_if(!pressed);
            }
            Instruction::WaitForKey { x } => match self.keys.iter().position(|&held| held) {
                Some(key) => r.set_v(x, key as u8),
                // run this instruction again until something is held down
                None => self.program_counter = self.program_counter.wrapping_sub(2),
            },
            Instruction::LoadDelayTimer { x } => r.set_v(x, r.delay_timer()),
            Instruction::SetDelayTimer { x } => r.set_delay_timer(r.v(x)),
            Instruction::SetSoundTimer { x } => {
                let frames = r.v(x);
                r.set_sound_timer(frames);
                if frames > 0 {
                    return Ok(Cycle::Beep { frames });
                }
            }
            Instruction::AddToIndex { x } => {
                r.set_index(r.index().wrapping_add(u16::from(r.v(x))));
            }
            Instruction::LoadFontSprite { x } => {
                r.set_index(FONT_ADDRESS + u16::from(r.v(x) & 0xf) * 5);
            }
            Instruction::StoreBcd { x } => {
                let vx = r.v(x);
                let index = r.index();
                self.memory.set_byte(index, vx / 100)?;
                self.memory.set_byte(index.wrapping_add(1), vx / 10 % 10)?;
                self.memory.set_byte(index.wrapping_add(2), vx % 10)?;
            }
            Instruction::StoreRegisters { x } => {
                for register in 0..=x {
                    let address = r.index().wrapping_add(u16::from(register));
                    self.memory.set_byte(address, r.v(register))?;
                }
            }
            Instruction::LoadRegisters { x } => {
                for register in 0..=x {
                    let address = r.index().wrapping_add(u16::from(register));
                    r.set_v(register, self.memory.byte(address)?);
                }
            }
        }
        Ok(Cycle::Continue)
    }

    /// XORs an n row sprite from `i` onto the display at (vx, vy). The start
    /// position wraps around the screen, the sprite itself is clipped at the
    /// edges. vf reports whether any pixel got erased.
    fn draw(&mut self, x: u8, y: u8, n: u8) -> Result<(), Fault> {
        let start_x = self.registers.v(x) as usize % DISPLAY_WIDTH;
        let start_y = self.registers.v(y) as usize % DISPLAY_HEIGHT;
        let sprite_start = self.registers.index();
        let mut erased = false;

        for row in 0..n {
            let pixel_y = start_y + row as usize;
            if pixel_y >= DISPLAY_HEIGHT {
                break;
            }
            let sprite = self.memory.byte(sprite_start.wrapping_add(u16::from(row)))?;
            let display = self.memory.display_mut();
            for column in 0..8 {
                let pixel_x = start_x + column;
                if pixel_x >= DISPLAY_WIDTH {
                    break;
                }
                if sprite >> (7 - column) & 1 == 0 {
                    continue;
                }
                let pixel = &mut display[pixel_y * DISPLAY_WIDTH + pixel_x];
                if *pixel == PIXEL_ON {
                    *pixel = PIXEL_OFF;
                    erased = true;
                } else {
                    *pixel = PIXEL_ON;
                }
            }
        }

        self.registers.set_flag(erased);
        Ok(())
    }
}
