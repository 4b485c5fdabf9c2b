use std::time::Duration;

use ferrochip_vm::{Cycle, Machine};

use crate::audio::{AudioTrigger, ToneRequest};
use crate::constants::TIMER_HZ;
use crate::error::GuestError;

/// State of one key as seen by the guest
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyState {
    On,
    Off,
}

impl From<bool> for KeyState {
    fn from(pressed: bool) -> Self {
        if pressed { KeyState::On } else { KeyState::Off }
    }
}

/// The capabilities a guest machine offers to the driver.
///
/// A guest owns its linear memory; the driver only reads it through
/// [`Guest::memory`] at offsets the guest hands out, and never keeps a
/// reference past the current frame.
pub trait Guest: Sized {
    /// Creates a machine running `rom`
    fn boot(rom: &[u8]) -> Result<Self, GuestError>;

    /// Executes one instruction. Tones requested by the instruction go to `audio`.
    fn tick(&mut self, audio: &dyn AudioTrigger) -> Result<(), GuestError>;

    /// Decrements the delay and sound timers by one unit
    fn tick_timers(&mut self) -> Result<(), GuestError>;

    /// Offset of the pixel grid inside [`Guest::memory`]
    fn display_offset(&self) -> usize;

    fn register(&self, index: u8) -> u8;

    fn set_key_state(&mut self, key: u8, state: KeyState);

    /// The guest's linear memory
    fn memory(&self) -> &[u8];
}

impl Guest for Machine {
    fn boot(rom: &[u8]) -> Result<Self, GuestError> {
        Machine::new(rom).map_err(|error| GuestError::InvalidRom(Box::new(error)))
    }

    fn tick(&mut self, audio: &dyn AudioTrigger) -> Result<(), GuestError> {
        match self.cycle().map_err(|fault| GuestError::Fault(Box::new(fault)))? {
            Cycle::Continue => {}
            Cycle::Beep { frames } => audio.play(ToneRequest::lasting(timer_duration(frames))),
        }
        Ok(())
    }

    fn tick_timers(&mut self) -> Result<(), GuestError> {
        Machine::tick_timers(self);
        Ok(())
    }

    fn display_offset(&self) -> usize {
        Machine::display_offset(self)
    }

    fn register(&self, index: u8) -> u8 {
        Machine::register(self, index)
    }

    fn set_key_state(&mut self, key: u8, state: KeyState) {
        self.set_key(key, state == KeyState::On);
    }

    fn memory(&self) -> &[u8] {
        Machine::memory(self)
    }
}

/// Wall clock length of `frames` timer ticks
fn timer_duration(frames: u8) -> Duration {
    Duration::from_millis(u64::from(frames) * 1000 / TIMER_HZ)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    #[derive(Default)]
    struct Tones(RefCell<Vec<ToneRequest>>);

    impl AudioTrigger for Tones {
        fn play(&self, tone: ToneRequest) {
            self.0.borrow_mut().push(tone);
        }
    }

    #[test]
    fn sound_timer_becomes_a_tone() {
        // v0 = 30, sound timer = v0
        let mut machine = <Machine as Guest>::boot(&[0x60, 0x1e, 0xf0, 0x18]).unwrap();
        let tones = Tones::default();
        machine.tick(&tones).unwrap();
        assert!(tones.0.borrow().is_empty());
        machine.tick(&tones).unwrap();

        let tones = tones.0.into_inner();
        assert_eq!(tones.len(), 1);
        assert_eq!(tones[0].frequency, None);
        assert_eq!(tones[0].duration, Some(Duration::from_millis(500)));
    }

    #[test]
    fn faults_are_reported_as_guest_errors() {
        let mut machine = <Machine as Guest>::boot(&[0xff, 0xff]).unwrap();
        let error = machine.tick(&Tones::default()).unwrap_err();
        assert!(matches!(error, GuestError::Fault(_)));
        assert!(error.to_string().contains("0xFFFF"));
    }

    #[test]
    fn empty_rom_is_invalid() {
        assert!(matches!(
            <Machine as Guest>::boot(&[]),
            Err(GuestError::InvalidRom(_))
        ));
    }

    #[test]
    fn key_state_reaches_the_keypad() {
        let mut machine = <Machine as Guest>::boot(&[0x00, 0xe0]).unwrap();
        machine.set_key_state(0xf, KeyState::On);
        assert!(machine.is_key_pressed(0xf));
        machine.set_key_state(0xf, KeyState::Off);
        assert!(!machine.is_key_pressed(0xf));
    }
}
