//! # ferrochip
//!
//! Runs a CHIP-8 ROM in a window.
//!
//! ```bash
//! ferrochip roms/pong.ch8
//! ferrochip --rom-dir roms pong --steps-per-frame 15
//! ```
//!
//! The keypad is mapped by key position:
//!
//! ```text
//! CHIP-8 Keypad    Keyboard
//! 0 1 2 3 4        Q W E R T
//! 5 6 7 8 9        A S D F G
//! A B C D E        Z X C V B
//!     F              Space
//! ```
//!
//! Set `RUST_LOG=debug` to see every key that reaches the guest.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use log::info;

use ferrochip_driver::{Config, RomFile, RomLibrary, RomLoadError, RomSource};

#[doc(hidden)]
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[arg(help = "ROM file, or the name of a ROM in the ROM directory")]
    rom: Option<String>,

    #[arg(short, long, help = "TOML file with settings")]
    config: Option<PathBuf>,

    #[arg(long, help = "Directory searched for ROMs given by name")]
    rom_dir: Option<PathBuf>,

    #[arg(short, long, help = "Guest instructions run per displayed frame")]
    steps_per_frame: Option<usize>,

    #[arg(long, help = "Don't decrement the guest timers")]
    no_timers: bool,

    #[arg(short, long, help = "Don't play any sound")]
    mute: bool,

    #[arg(long, help = "Don't forward the keyboard to the guest")]
    no_input: bool,

    #[arg(long, help = "Size of one guest pixel in screen pixels")]
    cell_size: Option<u32>,
}

impl Args {
    /// Command line flags win over the config file
    fn apply(&self, config: &mut Config) {
        if let Some(dir) = &self.rom_dir {
            config.rom_dir = Some(dir.clone());
        }
        if let Some(steps) = self.steps_per_frame {
            config.scheduler.steps_per_frame = steps;
        }
        if let Some(cell_size) = self.cell_size {
            config.display.cell_size = cell_size;
        }
        config.scheduler.tick_timers &= !self.no_timers;
        config.scheduler.audio &= !self.mute;
        config.scheduler.input &= !self.no_input;
    }
}

/// A path to an existing file is read as is, anything else is looked up by
/// name in `rom_dir`
fn open_rom(rom: &str, rom_dir: Option<&Path>) -> Result<(PathBuf, Vec<u8>), RomLoadError> {
    let file = match rom_dir {
        Some(dir) if !Path::new(rom).is_file() => RomLibrary::new(dir).find(rom)?,
        _ => RomFile::new(rom),
    };
    let bytes = file.fetch()?;
    Ok((file.path().to_path_buf(), bytes))
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    args.apply(&mut config);

    let rom = args
        .rom
        .as_deref()
        .map(|rom| open_rom(rom, config.rom_dir.as_deref()))
        .transpose()
        .context("could not load the ROM")?;
    if let Some((path, bytes)) = &rom {
        info!("loaded {} ({} bytes)", path.display(), bytes.len());
    }

    ferrochip_gui::run(&config, rom)?;
    Ok(())
}
