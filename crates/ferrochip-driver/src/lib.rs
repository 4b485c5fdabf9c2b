//! # ferrochip-driver
//!
//! Drives a guest machine from the host side: steps it at a fixed cadence,
//! paints its pixel grid straight out of guest memory, forwards key
//! transitions and plays the tones it asks for.

///Tones: the trigger the guest plays through and the backends behind it
pub mod audio;
///Settings from a TOML file
pub mod config;
///This holds all of the constants (written in capital letters in the code)
pub mod constants;
mod error;
///Decoding of the pixel grid
pub mod framebuffer;
///What a guest machine offers to the driver
mod guest;
///Host keys to guest keys
mod input;
///Drawing onto a host surface
pub mod render;
///Where ROM images come from
pub mod rom;
///The frame loop
mod scheduler;
///One guest and its generation
mod session;

pub use audio::{AudioTrigger, Mute, PcSpeaker, ToneAudio, ToneBackend, ToneRequest};
pub use config::Config;
pub use error::{BoxError, ConfigError, DriverError, GuestError, RomLoadError};
pub use guest::{Guest, KeyState};
pub use input::{DEFAULT_KEYMAP, InputTranslator, KeyTable};
pub use render::{Color, DrawCommand, DrawList, Palette, Point, Raster, Surface};
pub use rom::{RomBytes, RomFile, RomLibrary, RomSource};
pub use scheduler::{
    Diagnostics, FrameReport, FrameScheduler, RegisterSnapshot, SchedulerConfig, SchedulerState,
};
pub use session::{Generation, MemoryView, Session};
