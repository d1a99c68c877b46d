use super::{DecompressFileError, File};
use crate::{
    lsdsng::LsdSng,
    name::Name,
    serde::{self, CompressBlockError, End, compress_block},
    song::SongMemory,
};
use std::{
    io::{self, Cursor, Read, Write},
    mem::replace,
    ops::Range,
};
use thiserror::Error;

/// A 5-bit (0 - 32) index into the [`Filesystem`]
pub type Index = ux::u5;

const NAMES_OFFSET: usize = 0x0000;
const NAME_LEN: usize = 8;
const FILE_VERSIONS_RANGE: Range<usize> = 0x0100..0x0120;
const RESERVED_RANGE: Range<usize> = 0x0120..0x013E;
const CHECK_RANGE: Range<usize> = 0x013E..0x0140;
const CHECK_VALUE: [u8; 2] = [0x6A, 0x6B];
const ACTIVE_FILE_INDEX: usize = 0x0140;
const NO_ACTIVE_FILE: u8 = 0xFF;
const ALLOC_TABLE_RANGE: Range<usize> = 0x0141..0x0200;
const UNUSED_BLOCK: u8 = 0xFF;

/// A filesystem for storing compressed [`File`]'s
///
/// LSDJ [`SRam`](crate::sram::SRam) consists of one uncompressed song, and a filesystem
/// storage where songs not currently being worked on can be compressed and stored.
/// [`Filesystem`] presents an interface for retrieving and saving files into the storage.
/// The actual compression algorithm is implemented in [`serde`](crate::serde).
///
/// The LSDJ filesystem has a maximum capacity of 32 files, no matter how much space they take
/// up. There is space allocated for the name and version number of each file regardless. Whether
/// a file entry slot is actually in use solely depends on whether any compressed data blocks can
/// be found for that file index.
///
/// The first block holds all of that bookkeeping. Entry `i` of its allocation table tells which
/// file owns block `i + 1`, which is also the number block jump commands use to refer to it.
pub struct Filesystem {
    bytes: Box<[u8; Self::LEN]>,
}

impl Filesystem {
    /// The maximal number of files that can be stored in the filesystem
    pub const FILES_CAPACITY: usize = 0x20;

    /// The amount of blocks in the filesystem, including the bookkeeping block
    pub const BLOCKS_CAPACITY: usize = 0xC0;

    /// The length in bytes of a compression block
    pub const BLOCK_LEN: usize = serde::BLOCK_LEN;

    /// The length in bytes of the entire filesystem
    pub const LEN: usize = Self::BLOCK_LEN * Self::BLOCKS_CAPACITY;

    /// The number of reserved bytes between the file versions and the initialization check
    pub const RESERVED_LEN: usize = RESERVED_RANGE.end - RESERVED_RANGE.start;

    /// Construct a valid, but empty filesystem
    ///
    /// When LSDJ initializes SRAM, it sets some bytes for later verification against
    /// memory corruption. This function does so too, resulting in an empty, but valid
    /// filesystem
    pub fn new() -> Self {
        let mut bytes = Box::new([0; Self::LEN]);

        bytes[CHECK_RANGE].copy_from_slice(&CHECK_VALUE);
        bytes[ACTIVE_FILE_INDEX] = NO_ACTIVE_FILE;
        bytes[ALLOC_TABLE_RANGE].fill(UNUSED_BLOCK);

        Self { bytes }
    }

    /// Deserialize a [`Filesystem`] from an arbitrary I/O reader
    pub fn from_reader<R>(mut reader: R) -> Result<Self, FromReaderError>
    where
        R: Read,
    {
        let mut bytes = Box::new([0; Self::LEN]);
        reader.read_exact(bytes.as_mut_slice())?;

        if bytes[CHECK_RANGE] != CHECK_VALUE {
            return Err(FromReaderError::InitializationCheckIncorrect);
        }

        Ok(Self { bytes })
    }

    /// Serialize the [`Filesystem`] to an arbitrary I/O writer
    pub fn to_writer<W>(&self, mut writer: W) -> Result<(), io::Error>
    where
        W: Write,
    {
        writer.write_all(self.bytes.as_slice())
    }

    /// Do these bytes start with the initialization check of a filesystem?
    pub(crate) fn has_initialization_check(bytes: &[u8]) -> bool {
        bytes.get(CHECK_RANGE) == Some(CHECK_VALUE.as_slice())
    }

    /// Is any compessed song data stored for the file slot at this index?
    fn is_file_in_use(&self, index: Index) -> bool {
        self.first_block(index).is_some()
    }

    /// Retrieve a [`File`] [`Entry`] from the filesystem
    ///
    /// This function either returns an actual file entry in the filesystem if it
    /// can find compressed song data for the index, or [`None`] if the file slot
    /// is empty.
    ///
    /// The resulting [`Entry`] can be queried for [`Name`], version and [`SongMemory`].
    pub fn file(&self, index: Index) -> Option<Entry<'_>> {
        self.is_file_in_use(index).then_some(Entry { fs: self, index })
    }

    /// Iterate over all the [`File`]'s in the filesystem
    pub fn files(&self) -> Entries<'_> {
        Entries { fs: self, index: 0 }
    }

    /// Insert a new file into the filesystem
    ///
    /// This function tries to compress the provided song memory into the filesystem, using
    /// the free blocks and the ones already owned by the file at this index. It can fail if
    /// there is not enough space for the resulting compression blocks, at which point it
    /// won't change anything at all.
    ///
    /// If a file already existed at this index, the old file is returned as an [`LsdSng`].
    pub fn insert_file(
        &mut self,
        file: Index,
        name: &Name<8>,
        version: u8,
        song: &SongMemory,
    ) -> Result<Option<LsdSng>, CompressBlockError> {
        let owner = u8::from(file);

        // Compress into temporary blocks first, so nothing changes when we run out of space
        let blocks = {
            let mut available = self
                .alloc_table()
                .iter()
                .enumerate()
                .filter(|(_, f)| **f == UNUSED_BLOCK || **f == owner)
                .map(|(index, _)| index as u8 + 1)
                .peekable();

            let mut reader = Cursor::new(song.as_slice());
            let mut blocks = Vec::new();

            loop {
                let mut block = [0; Self::BLOCK_LEN];
                let index = available
                    .next()
                    .ok_or(CompressBlockError::CapacityExceeded)?;

                let end = compress_block(&mut reader, Cursor::new(block.as_mut_slice()), || {
                    available.peek().copied()
                })?;

                blocks.push((index, block));

                if end == End::EndOfFile {
                    break blocks;
                }
            }
        };

        let old = self.remove_file(file);

        self.file_name_mut(file).copy_from_slice(name.bytes());
        *self.file_version_mut(file) = version;

        for (index, block) in &blocks {
            self.alloc_table_mut()[*index as usize - 1] = owner;
            self.block_mut(*index).copy_from_slice(block);
        }

        tracing::debug!(
            file = owner,
            name = %name,
            version,
            blocks = blocks.len(),
            "inserted file"
        );

        Ok(old)
    }

    /// Remove a file from the filesystem
    ///
    /// Returns either the file, or [`None`] if no file at that index existed
    pub fn remove_file(&mut self, index: Index) -> Option<LsdSng> {
        if !self.is_file_in_use(index) {
            return None;
        }

        let name = {
            let bytes = self.file_name_mut(index);
            let name = Name::from_bytes(bytes).unwrap_or_default();
            bytes.fill(0);
            name
        };

        let version = replace(self.file_version_mut(index), 0);

        let indices = self.file_blocks(index);
        let mut blocks = Vec::with_capacity(indices.len() * Self::BLOCK_LEN);

        for block in &indices {
            let bytes = self.block_mut(*block);
            blocks.extend_from_slice(bytes);
            bytes.fill(0);
            self.alloc_table_mut()[*block as usize - 1] = UNUSED_BLOCK;
        }

        tracing::debug!(file = u8::from(index), blocks = indices.len(), "removed file");

        Some(LsdSng::new(name, version, blocks))
    }

    /// The index of the file currently being worked on
    ///
    /// LSDJ's [`SRam`](crate::sram::SRam) has working memory for one uncompressed song. Usually
    /// this song represents an actively edited verson of one of the files in the filesystem.
    pub fn active_file(&self) -> Option<Index> {
        match self.bytes[ACTIVE_FILE_INDEX] {
            index if (index as usize) < Self::FILES_CAPACITY => Some(Index::new(index)),
            _ => None,
        }
    }

    /// Change which file is being worked on
    pub fn set_active_file(&mut self, index: Option<Index>) {
        self.bytes[ACTIVE_FILE_INDEX] = index.map(u8::from).unwrap_or(NO_ACTIVE_FILE);
    }

    /// The bytes LSDJ reserves but doesn't use
    pub fn reserved(&self) -> &[u8] {
        &self.bytes[RESERVED_RANGE]
    }

    /// Overwrite the reserved bytes
    pub fn set_reserved(&mut self, reserved: &[u8; Self::RESERVED_LEN]) {
        self.bytes[RESERVED_RANGE].copy_from_slice(reserved);
    }

    /// Return the number of blocks in use
    pub fn blocks_used_count(&self) -> usize {
        self.alloc_table()
            .iter()
            .filter(|block| **block != UNUSED_BLOCK)
            .count()
    }

    /// Return the number of blocks still available for compressed data
    pub fn blocks_free_count(&self) -> usize {
        self.alloc_table().len() - self.blocks_used_count()
    }

    /// The 1-based number of the block a file's data starts in
    fn first_block(&self, file: Index) -> Option<u8> {
        let file = u8::from(file);
        self.alloc_table()
            .iter()
            .position(|owner| *owner == file)
            .map(|index| index as u8 + 1)
    }

    /// What's the byte range for a given block in the filesystem?
    fn block_range(block: u8) -> Range<usize> {
        let offset = Self::BLOCK_LEN * block as usize;
        offset..offset + Self::BLOCK_LEN
    }

    fn block_mut(&mut self, block: u8) -> &mut [u8] {
        &mut self.bytes[Self::block_range(block)]
    }

    /// Access the part of block 0 that represents the block allocation table
    fn alloc_table(&self) -> &[u8] {
        &self.bytes[ALLOC_TABLE_RANGE]
    }

    fn alloc_table_mut(&mut self) -> &mut [u8] {
        &mut self.bytes[ALLOC_TABLE_RANGE]
    }

    fn file_name_range(file: Index) -> Range<usize> {
        let offset = NAMES_OFFSET + u8::from(file) as usize * NAME_LEN;
        offset..offset + NAME_LEN
    }

    fn file_name_mut(&mut self, file: Index) -> &mut [u8] {
        &mut self.bytes[Self::file_name_range(file)]
    }

    fn file_version_mut(&mut self, file: Index) -> &mut u8 {
        &mut self.bytes[FILE_VERSIONS_RANGE.start + u8::from(file) as usize]
    }

    /// Retrieve the (1-based) indices of the blocks for a specific file
    fn file_blocks(&self, file: Index) -> Vec<u8> {
        let file = u8::from(file);
        self.alloc_table()
            .iter()
            .enumerate()
            .filter(|(_, owner)| **owner == file)
            .map(|(index, _)| index as u8 + 1)
            .collect()
    }
}

/// Errors that might occur deserializing a [`Filesystem`] from I/O
#[derive(Debug, Error)]
pub enum FromReaderError {
    /// All correctly initialized filesystem memory has certain bytes set for
    /// verification against memory corruption.
    ///
    /// This error is returned when that those bytes are faulty during a read.
    #[error("The initialization check failed")]
    InitializationCheckIncorrect,

    /// Any failure that has to do with I/O
    #[error("Something failed with I/O")]
    Io(#[from] io::Error),
}

impl Default for Filesystem {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over all the file [`Entry`]'s in a [`Filesystem`]
///
/// Yields one item per slot, [`None`] for the empty ones.
pub struct Entries<'a> {
    fs: &'a Filesystem,
    index: u8,
}

impl<'a> Iterator for Entries<'a> {
    type Item = Option<Entry<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if (self.index as usize) < Filesystem::FILES_CAPACITY {
            let file = self.fs.file(Index::new(self.index));
            self.index += 1;
            Some(file)
        } else {
            None
        }
    }
}

/// Immutable reference to a single [`File`] in the [`Filesystem`]
pub struct Entry<'a> {
    fs: &'a Filesystem,
    index: Index,
}

impl Entry<'_> {
    /// The slot this file is stored in
    pub fn index(&self) -> Index {
        self.index
    }
}

impl File for Entry<'_> {
    fn name(&self) -> Name<8> {
        let bytes = &self.fs.bytes[Filesystem::file_name_range(self.index)];
        Name::from_bytes(bytes).unwrap_or_default()
    }

    fn version(&self) -> u8 {
        self.fs.bytes[FILE_VERSIONS_RANGE.start + u8::from(self.index) as usize]
    }

    fn decompress(&self) -> Result<SongMemory, DecompressFileError> {
        // Entries only exist for files that own at least one block, but block 0 is never
        // valid to start from, so a missing first block would fail to decompress anyway
        let first_block = self.fs.first_block(self.index).unwrap_or(0);
        let bytes = serde::decompress_linked(self.fs.bytes.as_slice(), first_block)?;

        Ok(SongMemory::try_from(bytes.as_slice())?)
    }
}
