use std::fmt;

use log::info;

use crate::constants::GRID_SIZE;
use crate::error::{DriverError, RomLoadError};
use crate::guest::Guest;

/// Tags everything derived from one guest instance. A reload always gets a
/// newer generation than the session it replaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Generation(u64);

impl Generation {
    pub fn next(self) -> Self {
        Generation(self.0 + 1)
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where the pixel grid of one generation lives. Holds no reference into
/// guest memory; bytes are only reachable through [`Session::read`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryView {
    pub generation: Generation,
    pub offset: usize,
    pub len: usize,
}

/// One running guest and the generation it belongs to
pub struct Session<G> {
    guest: G,
    generation: Generation,
}

impl<G: Guest> Session<G> {
    pub fn boot(rom: &[u8], generation: Generation) -> Result<Self, RomLoadError> {
        let guest = G::boot(rom).map_err(RomLoadError::Rejected)?;
        info!("session {generation} started with a {} byte ROM", rom.len());
        Ok(Self { guest, generation })
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn guest(&self) -> &G {
        &self.guest
    }

    pub fn guest_mut(&mut self) -> &mut G {
        &mut self.guest
    }

    /// Resolves the pixel grid of this session. Must be called again every frame.
    pub fn pixel_view(&self) -> MemoryView {
        MemoryView {
            generation: self.generation,
            offset: self.guest.display_offset(),
            len: GRID_SIZE,
        }
    }

    /// Borrows the bytes behind `view` from the guest's memory
    pub fn read(&self, view: &MemoryView) -> Result<&[u8], DriverError> {
        if view.generation != self.generation {
            return Err(DriverError::MemoryViewInvalidated {
                view: view.generation,
                current: self.generation,
            });
        }

        let memory = self.guest.memory();
        view.offset
            .checked_add(view.len)
            .and_then(|end| memory.get(view.offset..end))
            .ok_or(DriverError::PixelGridOutOfBounds {
                offset: view.offset,
                len: view.len,
                region: memory.len(),
            })
    }
}

#[cfg(test)]
mod tests {
    use ferrochip_vm::Machine;
    use ferrochip_vm::constants::{DISPLAY_OFFSET, MEMORY_SIZE};

    use super::*;
    use crate::error::GuestError;

    // clear screen
    const ROM: [u8; 2] = [0x00, 0xe0];

    #[test]
    fn view_covers_the_display_plane() {
        let session = Session::<Machine>::boot(&ROM, Generation::default()).unwrap();
        let view = session.pixel_view();
        assert_eq!(view.offset, DISPLAY_OFFSET);
        assert_eq!(view.len, GRID_SIZE);

        let pixels = session.read(&view).unwrap();
        assert_eq!(pixels.len(), GRID_SIZE);
        assert!(pixels.iter().all(|&pixel| pixel == 0));
    }

    #[test]
    fn views_from_another_generation_are_rejected() {
        let old = Session::<Machine>::boot(&ROM, Generation::default()).unwrap();
        let stale = old.pixel_view();
        let new = Session::<Machine>::boot(&ROM, old.generation().next()).unwrap();

        match new.read(&stale) {
            Err(DriverError::MemoryViewInvalidated { view, current }) => {
                assert!(view < current);
            }
            other => panic!("expected invalidated view, got {other:?}"),
        }
    }

    #[test]
    fn reads_never_leave_the_region() {
        let session = Session::<Machine>::boot(&ROM, Generation::default()).unwrap();
        let mut view = session.pixel_view();
        view.offset = MEMORY_SIZE - 10;
        assert!(matches!(
            session.read(&view),
            Err(DriverError::PixelGridOutOfBounds { region: MEMORY_SIZE, .. })
        ));

        view.offset = usize::MAX;
        assert!(session.read(&view).is_err());
    }

    #[test]
    fn rejected_roms_never_become_sessions() {
        let error = Session::<Machine>::boot(&[], Generation::default())
            .err()
            .unwrap();
        assert!(matches!(
            error,
            RomLoadError::Rejected(GuestError::InvalidRom(_))
        ));
    }
}
