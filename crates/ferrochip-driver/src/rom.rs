//! Where ROM images come from. Fetching only moves bytes; whether an image is
//! acceptable is decided by the guest when a session boots.

use std::path::{Path, PathBuf};

use log::debug;

use crate::error::RomLoadError;

/// Extensions tried, in order, when a ROM is looked up by name
pub const ROM_EXTENSIONS: [&str; 2] = ["ch8", "8o"];

pub trait RomSource {
    fn fetch(&self) -> Result<Vec<u8>, RomLoadError>;
}

/// A ROM file on disk
#[derive(Debug, Clone)]
pub struct RomFile {
    path: PathBuf,
}

impl RomFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RomSource for RomFile {
    fn fetch(&self) -> Result<Vec<u8>, RomLoadError> {
        let bytes = std::fs::read(&self.path).map_err(|source| RomLoadError::Io {
            path: self.path.clone(),
            source,
        })?;
        debug!("read {} bytes from {}", bytes.len(), self.path.display());
        Ok(bytes)
    }
}

/// A directory of ROMs, addressed by name
#[derive(Debug, Clone)]
pub struct RomLibrary {
    dir: PathBuf,
}

impl RomLibrary {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Resolves `name` as given, then with each of [`ROM_EXTENSIONS`] appended
    pub fn find(&self, name: &str) -> Result<RomFile, RomLoadError> {
        std::iter::once(self.dir.join(name))
            .chain(
                ROM_EXTENSIONS
                    .iter()
                    .map(|extension| self.dir.join(format!("{name}.{extension}"))),
            )
            .find(|candidate| candidate.is_file())
            .map(RomFile::new)
            .ok_or_else(|| RomLoadError::NotFound {
                name: name.to_owned(),
                dir: self.dir.clone(),
            })
    }

    /// Looks `name` up and reads it
    pub fn fetch(&self, name: &str) -> Result<Vec<u8>, RomLoadError> {
        self.find(name)?.fetch()
    }

    /// Names of the ROM files in the library, sorted
    pub fn list(&self) -> Result<Vec<String>, RomLoadError> {
        let entries = std::fs::read_dir(&self.dir).map_err(|source| RomLoadError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let mut names: Vec<String> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| {
                path.extension()
                    .and_then(|extension| extension.to_str())
                    .is_some_and(|extension| {
                        ROM_EXTENSIONS
                            .iter()
                            .any(|known| extension.eq_ignore_ascii_case(known))
                    })
            })
            .filter_map(|path| path.file_name()?.to_str().map(str::to_owned))
            .collect();
        names.sort();
        Ok(names)
    }
}

/// A ROM that is already in memory, e.g. picked through a file dialog
#[derive(Debug, Clone)]
pub struct RomBytes(pub Vec<u8>);

impl RomSource for RomBytes {
    fn fetch(&self) -> Result<Vec<u8>, RomLoadError> {
        Ok(self.0.clone())
    }
}
