use super::{
    End,
    utils::{
        CMD_BYTE, DEFAULT_INSTRUMENT, DEFAULT_INSTRUMENT_BYTE, DEFAULT_WAVE_BYTE, EOF_BYTE,
        RLE_BYTE, read_byte,
    },
};
use crate::song::wave::DEFAULT_WAVE;
use std::{
    io::{self, ErrorKind, Read, Seek, SeekFrom, Write},
    slice,
};
use thiserror::Error;

/// Compress data from an I/O reader into an LSDJ block
///
/// This function reads bytes and compresses them as described [here](https://littlesounddj.fandom.com/wiki/File_Management_Structure). The call
/// returns when either:
///
///  * The end of the reader has been reached, which returns [`End::EndOfFile`]
///  * The block is full. `next_block()` is called to retrieve the index of the next block, and [`End::JumpToBlock`] is returned.
///
/// The writer is expected to span exactly one block. Whatever room is left after the final
/// jump/EOF command gets padded with zeroes.
pub fn compress_block<R, W, F>(
    mut reader: R,
    mut writer: W,
    next_block: F,
) -> Result<End, CompressBlockError>
where
    R: Read + Seek,
    W: Write + Seek,
    F: FnOnce() -> Option<u8>,
{
    let read_end = end(&mut reader)?;
    let write_end = end(&mut writer)?;

    loop {
        let write_pos = writer.stream_position()?;
        let left = write_end - write_pos;

        // Check if we've reached the end-of-file
        if reader.stream_position()? == read_end {
            writer.write_all(&[CMD_BYTE, EOF_BYTE])?;
            writer.write_all(&vec![0; (left - 2) as usize])?;
            return Ok(End::EndOfFile);
        }

        // The largest step takes 3 bytes, and 2 are needed for the trailing command
        if left >= 5 {
            let compression = compress_step(&mut reader)?;
            compression.write(&mut writer)?;
        } else {
            let index = next_block().ok_or(CompressBlockError::CapacityExceeded)?;
            writer.write_all(&[CMD_BYTE, index])?;
            writer.write_all(&vec![0; (left - 2) as usize])?;
            return Ok(End::JumpToBlock(index));
        }
    }
}

/// Compress an entire buffer into a sequence of blocks
///
/// Blocks are laid out in order and numbered from 1, so every block jumps to the one
/// physically following it. This is the layout used by `.lsdsng` files.
///
/// Fails with [`CompressBlockError::CapacityExceeded`] when more than `max_blocks` would
/// be needed.
pub fn compress(bytes: &[u8], max_blocks: usize) -> Result<Vec<u8>, CompressBlockError> {
    let mut reader = io::Cursor::new(bytes);
    let mut blocks = Vec::new();

    for block in 1..=max_blocks {
        let mut dest = [0; BLOCK_LEN];
        let end = compress_block(&mut reader, io::Cursor::new(dest.as_mut_slice()), || {
            (block < max_blocks)
                .then(|| u8::try_from(block + 1).ok())
                .flatten()
        })?;

        blocks.extend_from_slice(&dest);

        if end == End::EndOfFile {
            tracing::trace!(blocks = block, "compressed buffer");
            return Ok(blocks);
        }
    }

    Err(CompressBlockError::CapacityExceeded)
}

/// The length in bytes of a compression block
pub const BLOCK_LEN: usize = 0x200;

/// Errors that might be returned from [`compress_block()`]
#[derive(Debug, Error)]
pub enum CompressBlockError {
    /// Something went wrong with reading or writing from I/O
    #[error("Reading/writing from I/O failed")]
    Io(#[from] io::Error),

    /// There are no more empty blocks left to continue to
    #[error("Ran out of blocks to compress into")]
    CapacityExceeded,
}

fn end<S>(mut seeker: S) -> io::Result<u64>
where
    S: Seek,
{
    let pos = seeker.stream_position()?;
    let end = seeker.seek(SeekFrom::End(0))?;
    seeker.seek(SeekFrom::Start(pos))?;
    Ok(end)
}

fn compress_step<R>(mut reader: R) -> io::Result<Compression>
where
    R: Read + Seek,
{
    if let count @ 1.. = count_matches(&mut reader, 0, &DEFAULT_INSTRUMENT)? {
        return Ok(Compression::DefaultInstrument { count });
    }

    if let count @ 1.. = count_matches(&mut reader, 0, &DEFAULT_WAVE)? {
        return Ok(Compression::DefaultWave { count });
    }

    match read_byte(&mut reader)? {
        CMD_BYTE => Ok(Compression::CmdLiteral),
        RLE_BYTE => Ok(Compression::RleLiteral),
        value => {
            if let count @ 2.. = count_matches(&mut reader, 1, slice::from_ref(&value))? {
                Ok(Compression::RunLengthEncoding { value, count })
            } else {
                Ok(Compression::Literal { value })
            }
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Compression {
    RunLengthEncoding { value: u8, count: u8 },
    DefaultInstrument { count: u8 },
    DefaultWave { count: u8 },
    RleLiteral,
    CmdLiteral,
    Literal { value: u8 },
}

impl Compression {
    pub fn write<W>(self, mut writer: W) -> io::Result<()>
    where
        W: Write,
    {
        match self {
            Self::RunLengthEncoding { value, count } => writer.write_all(&[RLE_BYTE, value, count]),
            Self::DefaultInstrument { count } => {
                writer.write_all(&[CMD_BYTE, DEFAULT_INSTRUMENT_BYTE, count])
            }
            Self::DefaultWave { count } => writer.write_all(&[CMD_BYTE, DEFAULT_WAVE_BYTE, count]),
            Self::RleLiteral => writer.write_all(&[RLE_BYTE, RLE_BYTE]),
            Self::CmdLiteral => writer.write_all(&[CMD_BYTE, CMD_BYTE]),
            Self::Literal { value } => writer.write_all(&[value]),
        }
    }
}

fn count_matches<R>(mut reader: R, init: u8, slice: &[u8]) -> io::Result<u8>
where
    R: Read + Seek,
{
    let mut count = init;
    while count < u8::MAX && consume_if_matches(&mut reader, slice)? {
        count += 1;
    }
    Ok(count)
}

/// Advance past `slice` if the reader continues with it, otherwise leave the reader untouched
fn consume_if_matches<R>(mut reader: R, slice: &[u8]) -> io::Result<bool>
where
    R: Read + Seek,
{
    let pos = reader.stream_position()?;

    let mut dest = vec![0; slice.len()];
    let matches = match reader.read_exact(&mut dest) {
        Ok(()) => dest == slice,
        Err(error) if error.kind() == ErrorKind::UnexpectedEof => false,
        Err(error) => return Err(error),
    };

    if !matches {
        reader.seek(SeekFrom::Start(pos))?;
    }

    Ok(matches)
}
