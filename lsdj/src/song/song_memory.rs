use crate::vio::MemoryStream;
use std::{
    fmt,
    io::{self, Read, Write},
};
use thiserror::Error;

/// The offsets of the `"rb"` verification markers
const MARKER_OFFSETS: [usize; 3] = [0x1E78, 0x3E80, 0x7FF0];
const MARKER: [u8; 2] = [0x72, 0x62];
const FORMAT_VERSION_OFFSET: usize = 0x7FFF;

/// A contiguous block of memory that represents song data
///
/// All the musical entities (chains, phrases, instruments, etc.) live at fixed offsets in this
/// buffer. Rather than parsing them into separate structures, the [`song`](crate::song) module
/// exposes views that read and write their fields in place.
#[derive(Clone, PartialEq, Eq)]
pub struct SongMemory {
    /// The bytes that make up the song
    bytes: [u8; Self::LEN],
}

impl SongMemory {
    /// The number of bytes taken up by a single LSDJ song
    pub const LEN: usize = 0x8000;

    /// Initialize a new song, creating a buffer containing necessary verification bytes.
    pub fn new() -> Self {
        let bytes = Self::make_empty_song();
        Self { bytes }
    }

    /// Construct a new, empty song, ready for use
    ///
    /// This is the song LSDJ 9.2.L creates (format version 0x16), including all the necessary
    /// verification bytes that LSDJ uses to check for memory corruption.
    pub fn make_empty_song() -> [u8; Self::LEN] {
        let mut bytes = [0; Self::LEN];
        bytes[0x0ff0..0x1030].fill(0xFF);
        for i in (0x1090..0x1290).step_by(16) {
            bytes[i..i + 2].fill(0x06);
        }
        bytes[0x1290..0x1690].fill(0xFF);
        let mut loops = 0;
        for i in (0x1dd0..0x1df9).step_by(6) {
            bytes[i..i + 6].copy_from_slice(&[0x57, 0x2d, 0x30 + loops, 0x57, 0x2d, 0x31 + loops]);
            loops += 2;
            if loops == 10 {
                loops += 7;
            }
        }
        bytes[0x1e78..0x1e7a].copy_from_slice(&MARKER);
        bytes[0x2080..0x2880].fill(0xFF);
        bytes[0x3e80..0x3e82].copy_from_slice(&MARKER);
        for i in (0x3eb0..0x3fb0).step_by(16) {
            bytes[i + 7] = 0x10;
            bytes[i + 8] = 0xff;
            bytes[i + 11] = 0x10;
            bytes[i + 12] = 0xff;
        }
        bytes[0x3fb4] = 0x80;
        bytes[0x3fba..0x3fbc].copy_from_slice(&[0x07, 0x02]);
        bytes[0x3fc0..0x3fc4].copy_from_slice(&[0x00, 0x20, 0x00, 0x01]);
        bytes[0x3fc6..0x3fca].fill(0xFF);
        for i in (0x6000..0x7000).step_by(16) {
            bytes[i..i + 16].copy_from_slice(&[
                0x71, 0x32, 0x33, 0x44, 0x45, 0x55, 0x66, 0x77, 0x78, 0x89, 0x99, 0xaa, 0xab, 0xbc,
                0xcd, 0xce,
            ]);
        }
        bytes[0x7000..0x7ff0].fill(0xFF);
        bytes[0x7ff0..0x7ff2].copy_from_slice(&MARKER);
        bytes[FORMAT_VERSION_OFFSET] = 0x16;
        bytes
    }

    /// Deserialize [`SongMemory`] from an arbitrary I/O reader
    pub fn from_reader<R>(mut reader: R) -> Result<Self, FromReaderError>
    where
        R: Read,
    {
        let mut bytes = [0; Self::LEN];
        reader.read_exact(bytes.as_mut_slice())?;

        Ok(Self::try_from(bytes.as_slice())?)
    }

    /// Serialize [`SongMemory`] to an arbitrary I/O writer
    pub fn to_writer<W>(&self, mut writer: W) -> Result<(), io::Error>
    where
        W: Write,
    {
        writer.write_all(&self.bytes)
    }

    /// Does a raw song dump look like LSDJ song memory?
    ///
    /// This checks the size and the verification markers. It never fails, only answers.
    pub fn is_likely_valid(bytes: &[u8]) -> bool {
        bytes.len() == Self::LEN && Self::from_reader(MemoryStream::new(bytes)).is_ok()
    }

    /// The version of the format the song is encoded in
    ///
    /// Several fields moved around or changed encoding between versions. The views in
    /// [`song`](crate::song) take this into account.
    pub fn format_version(&self) -> u8 {
        self.bytes[FORMAT_VERSION_OFFSET]
    }

    /// Change the version of the format the song is encoded in
    ///
    /// This only changes the version byte, it does not convert any data.
    pub fn set_format_version(&mut self, version: u8) {
        self.bytes[FORMAT_VERSION_OFFSET] = version;
    }

    /// Access the bytes that make up the song
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Access the bytes that make up the song
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    /// Read a single byte
    pub(crate) fn byte(&self, offset: usize) -> u8 {
        self.bytes[offset]
    }

    /// Overwrite a single byte
    pub(crate) fn set_byte(&mut self, offset: usize, value: u8) {
        self.bytes[offset] = value;
    }

    /// Read `width` bits from a byte, starting at bit `bit` (0 being the least significant)
    pub(crate) fn bits(&self, offset: usize, bit: u8, width: u8) -> u8 {
        (self.bytes[offset] >> bit) & mask(width)
    }

    /// Overwrite `width` bits in a byte, starting at bit `bit`, leaving the others alone
    pub(crate) fn set_bits(&mut self, offset: usize, bit: u8, width: u8, value: u8) {
        let mask = mask(width) << bit;
        let byte = &mut self.bytes[offset];
        *byte = (*byte & !mask) | ((value << bit) & mask);
    }

    /// Read a single bit
    pub(crate) fn bit(&self, offset: usize, bit: u8) -> bool {
        self.bits(offset, bit, 1) != 0
    }

    /// Overwrite a single bit
    pub(crate) fn set_bit(&mut self, offset: usize, bit: u8, value: bool) {
        self.set_bits(offset, bit, 1, value as u8);
    }
}

fn mask(width: u8) -> u8 {
    ((1_u16 << width) - 1) as u8
}

/// Deserialize [`SongMemory`] from bytes
///
/// At least one of the three `"rb"` verification markers needs to be present. LSDJ itself
/// doesn't always restore all three, so checking for all of them would reject real songs.
impl TryFrom<&[u8]> for SongMemory {
    type Error = FromBytesError;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        let bytes: [u8; Self::LEN] = value
            .try_into()
            .map_err(|_| FromBytesError::IncorrectSize)?;

        let check = |offset: usize| bytes[offset..offset + 2] == MARKER;

        if MARKER_OFFSETS.into_iter().any(check) {
            Ok(Self { bytes })
        } else {
            Err(FromBytesError::InitializationCheckIncorrect)
        }
    }
}

impl Default for SongMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SongMemory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SongMemory")
            .field("format_version", &self.format_version())
            .finish_non_exhaustive()
    }
}

/// Errors that might be returned from [`SongMemory::try_from()`]
#[derive(Debug, Error)]
pub enum FromBytesError {
    /// The passed in number of bytes isn't correct
    #[error("The slice isn't of the correct size")]
    IncorrectSize,

    /// All correctly initialized song memory has certain bytes set for
    /// verification against memory corruption.
    ///
    /// This error is returned when that those bytes are faulty during a read.
    #[error("The initialization check failed")]
    InitializationCheckIncorrect,
}

/// Errors that might be returned from [`SongMemory::from_reader()`]
#[derive(Debug, Error)]
pub enum FromReaderError {
    /// Reading the bytes failed
    #[error("Something failed with I/O")]
    Read(#[from] io::Error),

    /// Deserialization from the read bytes failed
    #[error("Deserialization from the read bytes failed")]
    FromBytes(#[from] FromBytesError),
}
