//! The frame loop.
//!
//! The host calls [`FrameScheduler::run_frame`] once per display refresh. A
//! frame runs a fixed number of guest steps, then one timer tick, then a full
//! repaint, in that order. Key transitions arrive between frames through
//! [`FrameScheduler::key_transition`]. There is no re-arming inside the
//! driver: the host keeps asking for frames while [`FrameScheduler::is_running`]
//! holds.

use log::{error, info, warn};
use serde::Deserialize;

use crate::audio::{AudioTrigger, Mute};
use crate::constants::{NUM_REGISTERS, STEPS_PER_FRAME};
use crate::error::{DriverError, GuestError};
use crate::guest::Guest;
use crate::input::InputTranslator;
use crate::render::{Raster, Surface};
use crate::rom::RomSource;
use crate::session::{Generation, MemoryView, Session};

/// What a frame does besides stepping the guest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub steps_per_frame: usize,
    /// Decrement the guest timers once per frame
    pub tick_timers: bool,
    /// Forward host keys to the guest
    pub input: bool,
    /// Play the tones the guest asks for
    pub audio: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            steps_per_frame: STEPS_PER_FRAME,
            tick_timers: true,
            input: true,
            audio: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerState {
    /// No ROM loaded yet, or stopped
    Idle,
    Running,
    /// The guest faulted; the session is gone
    Halted { reason: String },
}

/// Counters for conditions that never interrupt a frame
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    pub frames: u64,
    pub unrecognized_keys: u64,
    pub last_unrecognized: Option<String>,
    pub skipped_repaints: u64,
}

/// General purpose registers as of the last guest step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegisterSnapshot {
    values: [u8; NUM_REGISTERS],
}

impl RegisterSnapshot {
    fn capture<G: Guest>(&mut self, guest: &G) {
        for (index, value) in self.values.iter_mut().enumerate() {
            *value = guest.register(index as u8);
        }
    }

    pub fn values(&self) -> &[u8; NUM_REGISTERS] {
        &self.values
    }

    pub fn get(&self, index: usize) -> Option<u8> {
        self.values.get(index).copied()
    }
}

/// What happened during one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    pub steps: usize,
    pub timers_ticked: bool,
    pub repainted: bool,
}

/// Owns the current session and drives it frame by frame
pub struct FrameScheduler<G> {
    config: SchedulerConfig,
    raster: Raster,
    translator: InputTranslator,
    audio: Box<dyn AudioTrigger>,
    session: Option<Session<G>>,
    generation: Generation,
    state: SchedulerState,
    registers: RegisterSnapshot,
    diagnostics: Diagnostics,
}

impl<G: Guest> FrameScheduler<G> {
    pub fn new(
        config: SchedulerConfig,
        raster: Raster,
        translator: InputTranslator,
        audio: Box<dyn AudioTrigger>,
    ) -> Self {
        Self {
            config,
            raster,
            translator,
            audio,
            session: None,
            generation: Generation::default(),
            state: SchedulerState::Idle,
            registers: RegisterSnapshot::default(),
            diagnostics: Diagnostics::default(),
        }
    }

    /// Boots `rom` in a new session, replacing the current one. If the guest
    /// refuses the image, whatever was running before keeps running.
    pub fn start(&mut self, rom: &[u8]) -> Result<Generation, DriverError> {
        let generation = self.generation.next();
        let session = Session::<G>::boot(rom, generation).inspect_err(|error| {
            error!("failed to start session {generation}: {error}");
        })?;

        if let Some(previous) = self.session.replace(session) {
            info!("session {} replaced by {generation}", previous.generation());
        }
        self.generation = generation;
        self.state = SchedulerState::Running;
        self.registers = RegisterSnapshot::default();
        Ok(generation)
    }

    /// Fetches the ROM first; a failed fetch never boots a guest
    pub fn start_from(&mut self, source: &dyn RomSource) -> Result<Generation, DriverError> {
        let rom = source.fetch().inspect_err(|error| {
            error!("{error}");
        })?;
        self.start(&rom)
    }

    /// Drops the current session. Tones already playing run out on their own.
    pub fn stop(&mut self) {
        if let Some(session) = self.session.take() {
            info!("session {} stopped", session.generation());
        }
        self.state = SchedulerState::Idle;
    }

    pub fn is_running(&self) -> bool {
        self.state == SchedulerState::Running
    }

    /// Runs one frame and paints it onto `surface`.
    ///
    /// A guest fault ends the session and is returned; a repaint that can't
    /// read the pixel grid is skipped and counted.
    pub fn run_frame(&mut self, surface: &mut dyn Surface) -> Result<FrameReport, DriverError> {
        let Some(session) = self.session.as_mut() else {
            return Err(DriverError::NotRunning);
        };
        let audio: &dyn AudioTrigger = if self.config.audio {
            self.audio.as_ref()
        } else {
            &Mute
        };

        let mut report = FrameReport::default();
        for _ in 0..self.config.steps_per_frame {
            if let Err(fault) = session.guest_mut().tick(audio) {
                return Err(self.halt(fault));
            }
            self.registers.capture(session.guest());
            report.steps += 1;
        }

        if self.config.tick_timers {
            if let Err(fault) = session.guest_mut().tick_timers() {
                return Err(self.halt(fault));
            }
            report.timers_ticked = true;
        }

        let view = session.pixel_view();
        match self.repaint(&view, surface) {
            Ok(()) => report.repainted = true,
            Err(error) => {
                warn!("repaint skipped: {error}");
                self.diagnostics.skipped_repaints += 1;
            }
        }

        self.diagnostics.frames += 1;
        Ok(report)
    }

    /// Draws the grid overlay and the pixels behind `view`. Nothing is drawn
    /// unless the view belongs to the current session and fits its memory.
    pub fn repaint(&self, view: &MemoryView, surface: &mut dyn Surface) -> Result<(), DriverError> {
        let session = self.session.as_ref().ok_or(DriverError::NotRunning)?;
        let pixels = session.read(view)?;
        self.raster.draw_frame(pixels, surface);
        Ok(())
    }

    /// Forwards a host key transition. `Ok(None)` when input is switched off.
    pub fn key_transition(&mut self, code: &str, pressed: bool) -> Result<Option<u8>, DriverError> {
        if !self.config.input {
            return Ok(None);
        }
        let session = self.session.as_mut().ok_or(DriverError::NotRunning)?;

        match self
            .translator
            .on_key_transition(session.guest_mut(), code, pressed)
        {
            Ok(key) => Ok(Some(key)),
            Err(error) => {
                warn!("{error}");
                self.diagnostics.unrecognized_keys += 1;
                self.diagnostics.last_unrecognized = Some(code.to_owned());
                Err(error)
            }
        }
    }

    fn halt(&mut self, fault: GuestError) -> DriverError {
        let generation = self.generation;
        error!("session {generation} halted: {fault}");
        self.session = None;
        self.state = SchedulerState::Halted {
            reason: fault.to_string(),
        };
        DriverError::GuestStepFault(fault)
    }

    pub fn state(&self) -> &SchedulerState {
        &self.state
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn raster(&self) -> &Raster {
        &self.raster
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn registers(&self) -> &RegisterSnapshot {
        &self.registers
    }

    pub fn session(&self) -> Option<&Session<G>> {
        self.session.as_ref()
    }

    /// The pixel grid of the current session, resolved now
    pub fn pixel_view(&self) -> Option<MemoryView> {
        self.session.as_ref().map(Session::pixel_view)
    }
}
