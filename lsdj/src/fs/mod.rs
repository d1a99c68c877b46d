//! The LSDJ filesystem.
//!
//! Every SRAM comes with a filesystem to store (compressed) songs you're currently not working
//! on. This module contains the block-level view of that storage, though you usually do not
//! have to use it yourself: [`SRam`](crate::sram::SRam) decompresses every file up front.

mod filesystem;

pub use filesystem::{Entries, Entry, Filesystem, FromReaderError, Index};

use crate::{
    lsdsng::LsdSng,
    name::Name,
    serde::{CompressBlockError, DecompressError},
    song::{self, SongMemory},
};
use thiserror::Error;

/// Something that consists of a [`Name`], version and _compressed_ [`SongMemory`].
///
/// LSDJ's [`SRam`](crate::sram) comes with a [`Filesystem`] for storing compressed
/// files. This trait represents their interface, where every file in the filesystem
/// has a name, a version number (which increases with every save) and compressed
/// song data.
///
/// Artists often export their files to actual OS-level files with the [`LsdSng`] format,
/// which represents just a single LSDJ song. This is why [`File`] is a trait, because
/// an [`LsdSng`] is technically also a [`File`].
pub trait File {
    /// The name of the song stored in the file
    fn name(&self) -> Name<8>;

    /// The version (increased with every save) of the song
    fn version(&self) -> u8;

    /// Decompress the song stored in the file
    fn decompress(&self) -> Result<SongMemory, DecompressFileError>;

    /// Decompress and combine all fields into an [`LsdSng`]
    fn lsdsng(&self) -> Result<LsdSng, FileToLsdSngError> {
        let song = self.decompress()?;
        Ok(LsdSng::from_song(self.name(), self.version(), &song)?)
    }
}

/// Errors that might occur decompressing a [`File`]
#[derive(Debug, Error)]
pub enum DecompressFileError {
    /// The compressed data is broken
    #[error("Decompressing the blocks failed")]
    Decompress(#[from] DecompressError),

    /// The data decompressed fine, but doesn't look like a song
    #[error("The decompressed data is not a valid song")]
    Song(#[from] song::FromBytesError),
}

/// Errors that might occur converting a [`File`] to an [`LsdSng`]
#[derive(Debug, Error)]
pub enum FileToLsdSngError {
    /// Decompressing the song failed
    #[error("Decompessing the song failed")]
    Decompress(#[from] DecompressFileError),

    /// (Re)compressing the song failed
    #[error("(Re)compressing the song failed")]
    Compress(#[from] CompressBlockError),
}

