use crate::constants::NUM_REGISTERS;

#[derive(Clone, Copy, Default)]
///# Holds the general purpose registers, the index register and both timers
pub struct Registers {
    v: [u8; NUM_REGISTERS as usize],
    index: u16,
    /// Counts down once per timer tick while it is non-zero
    delay_timer: u8,
    /// Counts down like the delay timer, the machine beeps while it is non-zero
    sound_timer: u8,
}

impl Registers {
    pub fn v(&self, register: u8) -> u8 {
        self.v[register as usize & 0xf]
    }

    pub fn set_v(&mut self, register: u8, value: u8) {
        self.v[register as usize & 0xf] = value;
    }

    /// Writes the flag register, always after the result so `vf` as a
    /// destination ends up holding the flag
    pub fn set_flag(&mut self, set: bool) {
        self.v[0xf] = u8::from(set);
    }

    pub fn index(&self) -> u16 {
        self.index
    }

    pub fn set_index(&mut self, value: u16) {
        self.index = value;
    }

    pub fn delay_timer(&self) -> u8 {
        self.delay_timer
    }

    pub fn set_delay_timer(&mut self, value: u8) {
        self.delay_timer = value;
    }

    pub fn sound_timer(&self) -> u8 {
        self.sound_timer
    }

    pub fn set_sound_timer(&mut self, value: u8) {
        self.sound_timer = value;
    }

    pub fn decrement_timers(&mut self) {
        self.delay_timer = self.delay_timer.saturating_sub(1);
        self.sound_timer = self.sound_timer.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timers_stop_at_zero() {
        let mut registers = Registers::default();
        registers.set_delay_timer(1);
        registers.set_sound_timer(2);
        registers.decrement_timers();
        registers.decrement_timers();
        registers.decrement_timers();
        assert_eq!(registers.delay_timer(), 0);
        assert_eq!(registers.sound_timer(), 0);
    }

    #[test]
    fn flag_overwrites_vf() {
        let mut registers = Registers::default();
        registers.set_v(0xf, 0x80);
        registers.set_flag(true);
        assert_eq!(registers.v(0xf), 1);
    }
}
