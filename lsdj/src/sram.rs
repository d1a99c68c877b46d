//! LittleSoundDJ SRAM/`.sav` file handling
//!
//! This module contains functionality for reading, writing and manipulating SRAM, which
//! is where LSDJ stores its songs. Usually people work with `.sav` files, which gameboy
//! emulators use to store the SRAM tied to a ROM. You can also download/upload `.sav`
//! files to flashcarts for playback on real hardware.

use crate::{
    fs::{self, DecompressFileError, Filesystem, Index},
    project::Project,
    serde::CompressBlockError,
    song::{self, SongMemory},
    vio::MemoryStream,
};
use std::{
    fs::create_dir_all,
    io::{self, Read, Write},
    path::Path,
};
use thiserror::Error;

/// A full representation of LittleSoundDJ SRAM
///
/// Every LSDJ save file consists of the same amount of bytes, in which both the song you're
/// currently working on is stored (uncompressed), as well as a filesystem containing at max
/// 32 (compressed) songs.
///
/// Unlike the [`Filesystem`], [`SRam`] keeps every project decompressed. Reading decompresses
/// all of them, and writing compresses them into a fresh filesystem, slot by slot.
///
/// ```no_run
/// # use lsdj::sram::SRam;
/// # use std::fs::File;
/// // Construct valid SRAM with the default/empty song and an empty filesystem
/// let sram = SRam::new();
///
/// // Load SRAM from a path on disk
/// let sram = SRam::from_path("bangers.sav")?;
///
/// // Load SRAM from an arbitrary reader
/// let sram = SRam::from_reader(File::open("bangers.sav")?)?;
/// # Ok::<(), anyhow::Error>(())
/// ```
///
/// In the same way, SRAM can be serialized back to the underlying byte structure:
///
/// ```no_run
/// # use lsdj::sram::SRam;
/// # use std::fs::File;
/// # let sram = SRam::new();
/// sram.to_path("bangers.sav")?;
/// sram.to_writer(File::create("bangers.sav")?)?;
/// # Ok::<(), anyhow::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SRam {
    /// The song that's currently being worked on in LSDJ
    pub working_memory_song: Box<SongMemory>,

    /// The project slot the working memory song belongs to
    active_project: Option<Index>,

    /// The (decompressed) projects in the filesystem
    projects: [Option<Box<Project>>; Filesystem::FILES_CAPACITY],

    /// Bytes LSDJ reserves in the filesystem header, kept intact
    reserved: [u8; Filesystem::RESERVED_LEN],
}

impl SRam {
    /// The number of bytes in an LSDJ `.sav`
    pub const LEN: usize = SongMemory::LEN + Filesystem::LEN;

    /// Construct a new SRAM, with a default song and no projects
    pub fn new() -> Self {
        Self {
            working_memory_song: Box::new(SongMemory::new()),
            active_project: None,
            projects: Default::default(),
            reserved: [0; Filesystem::RESERVED_LEN],
        }
    }

    /// Deserialize SRAM from an arbitrary I/O reader
    ///
    /// Every project in the filesystem is decompressed. If any of them fails to, so does this.
    pub fn from_reader<R>(mut reader: R) -> Result<Self, FromReaderError>
    where
        R: Read,
    {
        let working_memory_song = Box::new(SongMemory::from_reader(&mut reader)?);
        let filesystem = Filesystem::from_reader(reader)?;

        let mut sram = Self {
            working_memory_song,
            active_project: filesystem.active_file(),
            projects: Default::default(),
            reserved: [0; Filesystem::RESERVED_LEN],
        };

        sram.reserved.copy_from_slice(filesystem.reserved());

        for entry in filesystem.files().flatten() {
            let index = entry.index();
            let project = Project::from_file(&entry)
                .map_err(|source| FromReaderError::Project { index, source })?;

            sram.projects[Self::slot(index)] = Some(Box::new(project));
        }

        let dangling = sram
            .active_project
            .filter(|index| sram.project(*index).is_none());

        if let Some(index) = dangling {
            tracing::warn!(index = u8::from(index), "active project slot is empty");
        }

        tracing::debug!(
            projects = sram.projects().flatten().count(),
            blocks = filesystem.blocks_used_count(),
            "read sram"
        );

        Ok(sram)
    }

    /// Deserialize SRAM from its bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, FromBytesError> {
        if bytes.len() != Self::LEN {
            return Err(FromBytesError::IncorrectSize { size: bytes.len() });
        }

        Ok(Self::from_reader(MemoryStream::new(bytes))?)
    }

    /// Deserialize SRAM from a path on disk (.sav)
    pub fn from_path<P>(path: P) -> Result<Self, FromPathError>
    where
        P: AsRef<Path>,
    {
        let file = std::fs::File::open(path)?;
        let sram = Self::from_reader(file)?;

        Ok(sram)
    }

    /// Serialize SRAM to an arbitrary I/O writer
    ///
    /// Projects are compressed in slot order. If they don't all fit, nothing is written.
    pub fn to_writer<W>(&self, mut writer: W) -> Result<(), ToWriterError>
    where
        W: Write,
    {
        let filesystem = self.filesystem()?;

        self.working_memory_song.to_writer(&mut writer)?;
        filesystem.to_writer(writer)?;

        tracing::debug!(blocks = filesystem.blocks_used_count(), "wrote sram");

        Ok(())
    }

    /// Serialize SRAM to bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>, ToWriterError> {
        let mut bytes = Vec::with_capacity(Self::LEN);
        self.to_writer(&mut bytes)?;
        Ok(bytes)
    }

    /// Serialize SRAM to a path on disk (.sav)
    pub fn to_path<P>(&self, path: P) -> Result<(), ToWriterError>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            create_dir_all(parent)?;
        }

        // Compress before creating the file, so a full filesystem doesn't truncate it
        let bytes = self.to_bytes()?;
        std::fs::write(path, bytes)?;

        Ok(())
    }

    /// The project stored in a slot
    pub fn project(&self, index: Index) -> Option<&Project> {
        self.projects[Self::slot(index)].as_deref()
    }

    /// The project stored in a slot, for modification
    pub fn project_mut(&mut self, index: Index) -> Option<&mut Project> {
        self.projects[Self::slot(index)].as_deref_mut()
    }

    /// Iterate over all slots, yielding [`None`] for the empty ones
    pub fn projects(&self) -> impl Iterator<Item = Option<&Project>> {
        self.projects.iter().map(|project| project.as_deref())
    }

    /// Move a project into a slot, returning whatever was there before
    pub fn set_project(&mut self, index: Index, project: Project) -> Option<Project> {
        self.projects[Self::slot(index)]
            .replace(Box::new(project))
            .map(|old| *old)
    }

    /// Copy a project into a slot, returning whatever was there before
    pub fn set_project_copy(&mut self, index: Index, project: &Project) -> Option<Project> {
        self.set_project(index, project.clone())
    }

    /// Empty a slot, returning whatever was there before
    ///
    /// This doesn't touch the [active project](Self::active_project()). If you erase the
    /// active project, it's up to you to change it.
    pub fn erase_project(&mut self, index: Index) -> Option<Project> {
        self.projects[Self::slot(index)].take().map(|old| *old)
    }

    /// Load the song of a project into working memory, making it the active project
    pub fn set_working_memory_song_from_project(
        &mut self,
        index: Index,
    ) -> Result<(), NoProjectAtIndex> {
        let song = self
            .project(index)
            .ok_or(NoProjectAtIndex { index })?
            .song
            .clone();

        *self.working_memory_song = song;
        self.active_project = Some(index);

        Ok(())
    }

    /// Create a project from the song in working memory
    ///
    /// The project takes its name and version from the active project, if there is one.
    pub fn project_from_working_memory_song(&self) -> Project {
        let active = self.active_project.and_then(|index| self.project(index));

        Project {
            name: active.map(|project| project.name.clone()).unwrap_or_default(),
            version: active.map(|project| project.version).unwrap_or(0),
            song: (*self.working_memory_song).clone(),
        }
    }

    /// The project slot the working memory song belongs to
    pub fn active_project(&self) -> Option<Index> {
        self.active_project
    }

    /// Change the project slot the working memory song belongs to
    pub fn set_active_project(&mut self, index: Option<Index>) {
        self.active_project = index;
    }

    /// Compress all projects into a fresh filesystem
    fn filesystem(&self) -> Result<Filesystem, ToWriterError> {
        let mut filesystem = Filesystem::new();
        filesystem.set_active_file(self.active_project);
        filesystem.set_reserved(&self.reserved);

        for (slot, project) in self.projects.iter().enumerate() {
            let Some(project) = project else {
                continue;
            };

            let index = Index::new(slot as u8);
            filesystem
                .insert_file(index, &project.name, project.version, &project.song)
                .map_err(|error| match error {
                    CompressBlockError::CapacityExceeded => {
                        ToWriterError::CapacityExceeded { index }
                    }
                    CompressBlockError::Io(error) => ToWriterError::Io(error),
                })?;
        }

        Ok(filesystem)
    }

    fn slot(index: Index) -> usize {
        u8::from(index) as usize
    }
}

impl Default for SRam {
    fn default() -> Self {
        Self::new()
    }
}

/// Do these bytes look like an LSDJ `.sav`?
///
/// This checks the size, the filesystem initialization bytes and the verification markers of
/// the working memory song. Projects aren't decompressed. It never fails, only answers.
pub fn is_likely_valid_sav(bytes: &[u8]) -> bool {
    if bytes.len() != SRam::LEN {
        return false;
    }

    let (song, filesystem) = bytes.split_at(SongMemory::LEN);
    SongMemory::is_likely_valid(song) && Filesystem::has_initialization_check(filesystem)
}

/// Errors that might be returned from [`SRam::from_reader()`]
#[derive(Debug, Error)]
pub enum FromReaderError {
    /// Deserializing the working memory song from I/O failed
    #[error("Reading the working memory song failed")]
    WorkingSong(#[from] song::FromReaderError),

    /// Deserializing the file system from I/O failed
    #[error("Reading the filesystem failed")]
    Filesystem(#[from] fs::FromReaderError),

    /// One of the projects could not be decompressed
    #[error("Decompressing project {index} failed")]
    Project {
        index: Index,
        #[source]
        source: DecompressFileError,
    },
}

/// Errors that might be returned from [`SRam::from_bytes()`]
#[derive(Debug, Error)]
pub enum FromBytesError {
    /// The number of bytes isn't that of a `.sav`
    #[error("Expected {:#x} bytes, got {size:#x}", SRam::LEN)]
    IncorrectSize { size: usize },

    /// Deserialization failed
    #[error("Reading the SRAM failed")]
    Read(#[from] FromReaderError),
}

/// Errors that might be returned from [`SRam::from_path()`]
#[derive(Debug, Error)]
pub enum FromPathError {
    /// Opening the file itself failed
    #[error("Opening the file failed")]
    FileOpen(#[from] io::Error),

    /// Deserialization failed
    #[error("Reading the SRAM from file failed")]
    Read(#[from] FromReaderError),
}

/// Errors that might be returned from [`SRam::to_writer()`] and friends
#[derive(Debug, Error)]
pub enum ToWriterError {
    /// The projects didn't all fit in the filesystem
    #[error("Project {index} did not fit in the filesystem")]
    CapacityExceeded { index: Index },

    /// Any failure that has to do with I/O
    #[error("Something failed with I/O")]
    Io(#[from] io::Error),
}

/// The error returned when a project slot is empty
#[derive(Debug, Error, PartialEq, Eq)]
#[error("There is no project at index {index}")]
pub struct NoProjectAtIndex {
    pub index: Index,
}
