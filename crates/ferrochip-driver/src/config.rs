//! Settings read from an optional TOML file. Every field has a default, so an
//! empty file (or none at all) is a valid configuration.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::audio::DEFAULT_FREQUENCY;
use crate::constants::CELL_SIZE;
use crate::error::ConfigError;
use crate::render::{Color, Palette, Raster};
use crate::scheduler::SchedulerConfig;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scheduler: SchedulerConfig,
    pub display: DisplayConfig,
    pub audio: AudioConfig,
    /// Directory ROMs are looked up in by name
    pub rom_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub cell_size: u32,
    pub on_color: Color,
    pub off_color: Color,
    pub grid_color: Color,
    pub show_registers: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        let palette = Palette::default();
        Self {
            cell_size: CELL_SIZE,
            on_color: palette.on,
            off_color: palette.off,
            grid_color: palette.grid,
            show_registers: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Tone frequency in Hz
    pub frequency: u32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            frequency: DEFAULT_FREQUENCY,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn raster(&self) -> Raster {
        Raster::new(
            self.display.cell_size,
            Palette {
                on: self.display.on_color,
                off: self.display.off_color,
                grid: self.display.grid_color,
            },
        )
    }
}
