//! The `.lsdsng` format

use crate::{
    fs::{DecompressFileError, File, FileToLsdSngError},
    name::Name,
    serde::{self, BLOCK_LEN, CompressBlockError},
    song::SongMemory,
    vio::MemoryStream,
};
use std::{
    io::{self, Read, Write},
    path::Path,
    slice,
};
use thiserror::Error;

/// The number of bytes preceding the blocks: an 8-byte name and a version
const HEADER_LEN: usize = 9;

/// A [`Name`], version and compressed [`SongMemory`]
///
/// Because [`SRam`](crate::sram::SRam) consists of multiple songs, artists often export/import
/// them to/from a format called `.lsdsng`. It's a simple "dumbed-down" version of the SRAM
/// filesystem, containing the song name and version along with compressed data for just _one_
/// song.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LsdSng {
    /// The name of the song stored in the [`LsdSng`]
    pub name: Name<8>,

    /// The song version (increased with every save)
    pub version: u8,

    /// The blocks that make up the compressed [`SongMemory`]
    ///
    /// The `.lsdsng` format is weird in the sense that any block jumps in the decompression algorithm
    /// are to be discarded, because the blocks are just linearly copied over from the filesystem (which
    /// might have had blocks from other songs interleaved).
    blocks: Vec<u8>,
}

impl LsdSng {
    /// The most blocks a single song can take up in a filesystem
    pub const MAX_BLOCKS: usize = 0xBF;

    /// Create a new [`LsdSng`] from its parts
    pub(crate) fn new(name: Name<8>, version: u8, blocks: Vec<u8>) -> Self {
        Self {
            name,
            version,
            blocks,
        }
    }

    /// Create an [`LsdSng`] by compressing [`SongMemory`]
    pub fn from_song(
        name: Name<8>,
        version: u8,
        song: &SongMemory,
    ) -> Result<Self, CompressBlockError> {
        let blocks = serde::compress(song.as_slice(), Self::MAX_BLOCKS)?;
        Ok(Self::new(name, version, blocks))
    }

    /// Read an [`LsdSng`] from an arbitrary I/O reader
    ///
    /// This only reads the bytes; nothing is decompressed until [`File::decompress()`] is called.
    pub fn from_reader<R>(mut reader: R) -> Result<Self, FromReaderError>
    where
        R: Read,
    {
        let name = {
            let mut bytes = [0; 8];
            reader.read_exact(&mut bytes)?;
            Name::from_bytes(&bytes).unwrap_or_default()
        };

        let mut version = 0;
        reader.read_exact(slice::from_mut(&mut version))?;

        let mut blocks = Vec::new();
        reader.read_to_end(&mut blocks)?;

        Ok(Self::new(name, version, blocks))
    }

    /// Read an [`LsdSng`] from its serialized bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, FromReaderError> {
        Self::from_reader(MemoryStream::new(bytes))
    }

    /// Deserialize an [`LsdSng`] from a path on disk (.lsdsng)
    pub fn from_path<P>(path: P) -> Result<Self, FromPathError>
    where
        P: AsRef<Path>,
    {
        let file = std::fs::File::open(path)?;
        Ok(Self::from_reader(file)?)
    }

    /// Serialize the [`LsdSng`] to an arbitrary I/O writer
    pub fn to_writer<W>(&self, mut writer: W) -> Result<(), io::Error>
    where
        W: Write,
    {
        writer.write_all(self.name.bytes())?;
        writer.write_all(slice::from_ref(&self.version))?;
        writer.write_all(&self.blocks)?;

        Ok(())
    }

    /// Serialize the [`LsdSng`] to a path on disk (.lsdsng)
    pub fn to_path<P>(&self, path: P) -> Result<(), io::Error>
    where
        P: AsRef<Path>,
    {
        self.to_writer(std::fs::File::create(path)?)
    }

    /// The compressed blocks, back to back
    pub fn blocks(&self) -> &[u8] {
        &self.blocks
    }

    /// The number of compression blocks this song takes up
    pub fn block_count(&self) -> usize {
        self.blocks.len().div_ceil(BLOCK_LEN)
    }
}

impl File for LsdSng {
    fn name(&self) -> Name<8> {
        self.name.clone()
    }

    fn version(&self) -> u8 {
        self.version
    }

    fn decompress(&self) -> Result<SongMemory, DecompressFileError> {
        let bytes = serde::decompress(&self.blocks)?;
        Ok(SongMemory::try_from(bytes.as_slice())?)
    }

    fn lsdsng(&self) -> Result<LsdSng, FileToLsdSngError> {
        Ok(self.clone())
    }
}

/// Do these bytes look like an `.lsdsng` file?
///
/// This checks that the size is a header followed by a whole number of blocks, and does a
/// trial decompression. It never fails, only answers.
pub fn is_likely_valid_lsdsng(bytes: &[u8]) -> bool {
    let Some(blocks) = bytes.len().checked_sub(HEADER_LEN) else {
        return false;
    };

    if blocks == 0 || blocks % BLOCK_LEN != 0 || blocks / BLOCK_LEN > LsdSng::MAX_BLOCKS {
        return false;
    }

    LsdSng::from_bytes(bytes)
        .map(|lsdsng| lsdsng.decompress().is_ok())
        .unwrap_or(false)
}

/// Errors that might be returned from [`LsdSng::from_reader()`]
#[derive(Debug, Error)]
pub enum FromReaderError {
    /// Any failure that has to do with I/O
    #[error("Something failed with I/O")]
    Read(#[from] io::Error),
}

/// Errors that might be returned from [`LsdSng::from_path()`]
#[derive(Debug, Error)]
pub enum FromPathError {
    /// Could not open the file for reading
    #[error("Could not open the file for reading")]
    FileOpen(#[from] io::Error),

    /// Deserialization from the file failed
    #[error("Reading the LsdSng from file failed")]
    Read(#[from] FromReaderError),
}
