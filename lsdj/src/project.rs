//! A named, versioned song

use crate::{
    fs::{DecompressFileError, File},
    lsdsng::{self, LsdSng},
    name::Name,
    serde::CompressBlockError,
    song::SongMemory,
};
use std::{
    io::{self, Read, Write},
    path::Path,
};
use thiserror::Error;

/// A decompressed song, along with its name and version
///
/// This is what the slots in [`SRam`](crate::sram::SRam) hold, and what an `.lsdsng` contains
/// once decompressed.
///
/// ```no_run
/// # use lsdj::project::Project;
/// let mut project = Project::from_path("banger.lsdsng")?;
/// project.version += 1;
/// project.to_path("banger.lsdsng")?;
/// # Ok::<(), anyhow::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    /// The name of the project
    pub name: Name<8>,

    /// The version (increased with every save)
    pub version: u8,

    /// The (decompressed) song
    pub song: SongMemory,
}

impl Project {
    /// A project without a name, at version 0, containing the empty song
    pub fn new() -> Self {
        Self {
            name: Name::default(),
            version: 0,
            song: SongMemory::new(),
        }
    }

    /// Decompress an [`LsdSng`] into a project
    pub fn from_lsdsng(lsdsng: &LsdSng) -> Result<Self, DecompressFileError> {
        Self::from_file(lsdsng)
    }

    /// Decompress any [`File`] into a project
    pub fn from_file<F>(file: &F) -> Result<Self, DecompressFileError>
    where
        F: File + ?Sized,
    {
        Ok(Self {
            name: file.name(),
            version: file.version(),
            song: file.decompress()?,
        })
    }

    /// Read and decompress a project from `.lsdsng` data
    pub fn from_reader<R>(reader: R) -> Result<Self, FromReaderError>
    where
        R: Read,
    {
        let lsdsng = LsdSng::from_reader(reader)?;
        Ok(Self::from_lsdsng(&lsdsng)?)
    }

    /// Read and decompress a project from a path on disk (.lsdsng)
    pub fn from_path<P>(path: P) -> Result<Self, FromPathError>
    where
        P: AsRef<Path>,
    {
        let file = std::fs::File::open(path)?;
        Ok(Self::from_reader(file)?)
    }

    /// Compress the project into an [`LsdSng`]
    pub fn to_lsdsng(&self) -> Result<LsdSng, CompressBlockError> {
        LsdSng::from_song(self.name.clone(), self.version, &self.song)
    }

    /// Compress the project and write it as `.lsdsng` data
    pub fn to_writer<W>(&self, writer: W) -> Result<(), ToWriterError>
    where
        W: Write,
    {
        self.to_lsdsng()?.to_writer(writer)?;
        Ok(())
    }

    /// Compress the project and write it to a path on disk (.lsdsng)
    pub fn to_path<P>(&self, path: P) -> Result<(), ToWriterError>
    where
        P: AsRef<Path>,
    {
        let lsdsng = self.to_lsdsng()?;
        lsdsng.to_path(path)?;
        Ok(())
    }
}

impl Default for Project {
    fn default() -> Self {
        Self::new()
    }
}

impl File for Project {
    fn name(&self) -> Name<8> {
        self.name.clone()
    }

    fn version(&self) -> u8 {
        self.version
    }

    fn decompress(&self) -> Result<SongMemory, DecompressFileError> {
        Ok(self.song.clone())
    }
}

/// Errors that might be returned from [`Project::from_reader()`]
#[derive(Debug, Error)]
pub enum FromReaderError {
    /// Reading the compressed data failed
    #[error("Reading the LsdSng failed")]
    Read(#[from] lsdsng::FromReaderError),

    /// The compressed data could not be turned into a song
    #[error("Decompressing the song failed")]
    Decompress(#[from] DecompressFileError),
}

/// Errors that might be returned from [`Project::from_path()`]
#[derive(Debug, Error)]
pub enum FromPathError {
    /// Could not open the file for reading
    #[error("Could not open the file for reading")]
    FileOpen(#[from] io::Error),

    /// Deserialization from the file failed
    #[error("Reading the project from file failed")]
    Read(#[from] FromReaderError),
}

/// Errors that might be returned from [`Project::to_writer()`] and [`Project::to_path()`]
#[derive(Debug, Error)]
pub enum ToWriterError {
    /// The song did not fit in the maximum number of blocks
    #[error("Compressing the song failed")]
    Compress(#[from] CompressBlockError),

    /// Any failure that has to do with I/O
    #[error("Something failed with I/O")]
    Io(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{serde::DecompressError, u4, u7};
    use std::str::FromStr;

    #[test]
    fn new() {
        let project = Project::new();

        assert!(project.name.is_empty());
        assert_eq!(project.version, 0);
        assert_eq!(project.song, SongMemory::new());
    }

    #[test]
    fn happy_bd() {
        let mut project = Project::new();
        project.name = Name::from_str("HAPPY BD").unwrap();
        project.version = 4;
        project.song.settings_mut().set_tempo(160).unwrap();
        project
            .song
            .chain_mut(u7::new(2))
            .set_transposition(u4::new(1), 0x0C);

        let mut bytes = Vec::new();
        project.to_writer(&mut bytes).unwrap();

        assert_eq!(&bytes[..9], b"HAPPY BD\x04");
        assert!(lsdsng::is_likely_valid_lsdsng(&bytes));

        let read = Project::from_reader(bytes.as_slice()).unwrap();
        assert_eq!(read, project);
        assert_eq!(read.song.settings().tempo(), 160);
    }

    #[test]
    fn corrupt() {
        let mut bytes = Vec::new();
        Project::new().to_writer(&mut bytes).unwrap();
        bytes.truncate(bytes.len() - 0x200);

        assert!(matches!(
            Project::from_reader(bytes.as_slice()),
            Err(FromReaderError::Decompress(DecompressFileError::Decompress(
                DecompressError::TruncatedStream
            )))
        ));
    }

    #[test]
    fn lsdsng() {
        let project = Project {
            name: Name::from_str("LSDSNG").unwrap(),
            version: 0xFF,
            song: SongMemory::new(),
        };

        let lsdsng = project.to_lsdsng().unwrap();
        assert_eq!(project.lsdsng().unwrap(), lsdsng);
        assert_eq!(Project::from_lsdsng(&lsdsng).unwrap(), project);
    }
}
