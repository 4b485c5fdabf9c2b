use std::path::PathBuf;

use thiserror::Error;

use crate::session::Generation;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors reported by a guest machine through the [`crate::Guest`] contract
#[derive(Debug, Error)]
pub enum GuestError {
    #[error("invalid ROM image: {0}")]
    InvalidRom(#[source] BoxError),

    #[error("{0}")]
    Fault(#[source] BoxError),
}

/// The ROM could not be fetched, or the guest refused it
#[derive(Debug, Error)]
pub enum RomLoadError {
    #[error("failed to read ROM {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no ROM named {name:?} in {}", dir.display())]
    NotFound { name: String, dir: PathBuf },

    #[error("ROM rejected: {0}")]
    Rejected(#[source] GuestError),
}

#[derive(Debug, Error)]
pub enum DriverError {
    #[error(transparent)]
    RomLoad(#[from] RomLoadError),

    #[error("unrecognized host key {code:?}")]
    UnrecognizedInput { code: String },

    #[error("pixel grid view of generation {view} used after reload (current generation {current})")]
    MemoryViewInvalidated { view: Generation, current: Generation },

    #[error("pixel grid {offset:#x}+{len} does not fit in a {region} byte memory region")]
    PixelGridOutOfBounds {
        offset: usize,
        len: usize,
        region: usize,
    },

    #[error("guest fault: {0}")]
    GuestStepFault(#[source] GuestError),

    #[error("no session is running")]
    NotRunning,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
