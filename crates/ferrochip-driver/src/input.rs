use std::collections::HashMap;

use log::debug;

use crate::error::DriverError;
use crate::guest::{Guest, KeyState};

/// Host key codes (DOM `KeyboardEvent.code` names) and the keypad index they press.
///
/// ```text
/// Q W E R T    0 1 2 3 4
/// A S D F G    5 6 7 8 9
/// Z X C V B    A B C D E
///   Space        F
/// ```
pub const DEFAULT_KEYMAP: [(&str, u8); 16] = [
    ("KeyQ", 0x0),
    ("KeyW", 0x1),
    ("KeyE", 0x2),
    ("KeyR", 0x3),
    ("KeyT", 0x4),
    ("KeyA", 0x5),
    ("KeyS", 0x6),
    ("KeyD", 0x7),
    ("KeyF", 0x8),
    ("KeyG", 0x9),
    ("KeyZ", 0xa),
    ("KeyX", 0xb),
    ("KeyC", 0xc),
    ("KeyV", 0xd),
    ("KeyB", 0xe),
    ("Space", 0xf),
];

/// Maps host key codes to guest key indices
#[derive(Debug, Clone)]
pub struct KeyTable {
    map: HashMap<String, u8>,
}

impl KeyTable {
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    /// Bind a host key code to a guest key. Rebinding a code replaces its old key.
    pub fn bind(&mut self, code: impl Into<String>, key: u8) {
        self.map.insert(code.into(), key & 0xf);
    }

    pub fn get(&self, code: &str) -> Option<u8> {
        self.map.get(code).copied()
    }
}

impl Default for KeyTable {
    fn default() -> Self {
        let mut table = Self::new();
        for (code, key) in DEFAULT_KEYMAP {
            table.bind(code, key);
        }
        table
    }
}

/// Forwards host key transitions to the guest, one call per event
#[derive(Debug, Clone, Default)]
pub struct InputTranslator {
    table: KeyTable,
}

impl InputTranslator {
    pub fn new(table: KeyTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &KeyTable {
        &self.table
    }

    /// Returns the guest key that received the transition
    pub fn on_key_transition<G: Guest>(
        &self,
        guest: &mut G,
        code: &str,
        pressed: bool,
    ) -> Result<u8, DriverError> {
        let key = self
            .table
            .get(code)
            .ok_or_else(|| DriverError::UnrecognizedInput {
                code: code.to_owned(),
            })?;

        let state = KeyState::from(pressed);
        debug!("{code} -> key {key:X} {state:?}");
        guest.set_key_state(key, state);
        Ok(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::AudioTrigger;
    use crate::error::GuestError;

    /// Records key state calls and nothing else
    #[derive(Default)]
    struct Keypad {
        calls: Vec<(u8, KeyState)>,
    }

    impl Guest for Keypad {
        fn boot(_rom: &[u8]) -> Result<Self, GuestError> {
            Ok(Self::default())
        }

        fn tick(&mut self, _audio: &dyn AudioTrigger) -> Result<(), GuestError> {
            Ok(())
        }

        fn tick_timers(&mut self) -> Result<(), GuestError> {
            Ok(())
        }

        fn display_offset(&self) -> usize {
            0
        }

        fn register(&self, _index: u8) -> u8 {
            0
        }

        fn set_key_state(&mut self, key: u8, state: KeyState) {
            self.calls.push((key, state));
        }

        fn memory(&self) -> &[u8] {
            &[]
        }
    }

    #[test]
    fn every_mapped_key_goes_on_then_off() {
        let translator = InputTranslator::default();
        for (code, key) in DEFAULT_KEYMAP {
            let mut keypad = Keypad::default();
            translator.on_key_transition(&mut keypad, code, true).unwrap();
            translator.on_key_transition(&mut keypad, code, false).unwrap();
            assert_eq!(keypad.calls, vec![(key, KeyState::On), (key, KeyState::Off)]);
        }
    }

    #[test]
    fn unmapped_keys_never_reach_the_guest() {
        let translator = InputTranslator::default();
        let mut keypad = Keypad::default();

        for pressed in [true, false] {
            match translator.on_key_transition(&mut keypad, "KeyP", pressed) {
                Err(DriverError::UnrecognizedInput { code }) => assert_eq!(code, "KeyP"),
                other => panic!("expected unrecognized input, got {other:?}"),
            }
        }
        assert!(keypad.calls.is_empty());
    }

    #[test]
    fn repeated_presses_are_all_forwarded() {
        let translator = InputTranslator::default();
        let mut keypad = Keypad::default();
        for _ in 0..3 {
            translator.on_key_transition(&mut keypad, "Space", true).unwrap();
        }
        assert_eq!(keypad.calls, vec![(0xf, KeyState::On); 3]);
    }

    #[test]
    fn default_table_covers_the_whole_keypad() {
        let table = KeyTable::default();
        let mut keys: Vec<u8> = DEFAULT_KEYMAP
            .iter()
            .filter_map(|(code, _)| table.get(code))
            .collect();
        keys.sort_unstable();
        assert_eq!(keys, (0..16).collect::<Vec<u8>>());
    }

    #[test]
    fn custom_bindings() {
        let mut table = KeyTable::new();
        table.bind("ArrowUp", 0x5);
        table.bind("ArrowUp", 0x2);
        assert_eq!(table.get("ArrowUp"), Some(0x2));
        assert_eq!(table.get("KeyQ"), None);
    }
}
