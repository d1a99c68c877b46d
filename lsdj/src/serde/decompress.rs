use super::{
    BLOCK_LEN, End,
    utils::{
        CMD_BYTE, DEFAULT_INSTRUMENT, DEFAULT_INSTRUMENT_BYTE, DEFAULT_WAVE_BYTE, EOF_BYTE,
        RLE_BYTE, read_byte, write_repeated_byte, write_repeated_bytes,
    },
};
use crate::{song::wave::DEFAULT_WAVE, vio::MemoryStream};
use std::{
    io::{self, ErrorKind, Read, Result, Seek, SeekFrom, Write},
    slice,
};
use thiserror::Error;

/// The number of bytes a fully decompressed stream must produce
const DECOMPRESSED_LEN: usize = 0x8000;

/// Decompress data from an LSDJ block reader to an arbitrary I/O writer
///
/// This function reads bytes and decompresses them as described [here](https://littlesounddj.fandom.com/wiki/File_Management_Structure). The call
/// returns when either:
///
///  * An EOF byte has been read, ending the decompression algorithm. This returns [`End::EndOfFile`]
///  * A block jump command has been read, returning [`End::JumpToBlock`]
pub fn decompress_block<R, W>(mut reader: R, mut writer: W) -> Result<End>
where
    R: Read,
    W: Write,
{
    loop {
        match read_byte(&mut reader)? {
            RLE_BYTE => decompress_rle_byte(&mut reader, &mut writer)?,
            CMD_BYTE => match decompress_cmd_byte(&mut reader, &mut writer)? {
                CmdContinuation::Continue => (),
                CmdContinuation::End(continuation) => return Ok(continuation),
            },
            value => writer.write_all(slice::from_ref(&value))?,
        }
    }
}

/// Decompress a sequence of blocks, as found in an `.lsdsng`
///
/// Block jump values are disregarded: after every jump, decompression continues at the
/// start of the block physically following the current one.
pub fn decompress(bytes: &[u8]) -> std::result::Result<[u8; DECOMPRESSED_LEN], DecompressError> {
    let mut block = 0;

    decompress_with(bytes, 0, |_| {
        block += 1;
        let offset = block * BLOCK_LEN;

        if offset > bytes.len() {
            Err(DecompressError::TruncatedStream)
        } else {
            Ok(offset as u64)
        }
    })
}

/// Decompress a chain of blocks within a filesystem, following the block jumps
///
/// `bytes` spans the entire filesystem (block 0 included), and `first_block` is the 1-based
/// index of the block the chain starts in.
pub fn decompress_linked(
    bytes: &[u8],
    first_block: u8,
) -> std::result::Result<[u8; DECOMPRESSED_LEN], DecompressError> {
    let block_count = bytes.len() / BLOCK_LEN;
    if first_block == 0 || first_block as usize >= block_count {
        return Err(DecompressError::InvalidBlock { block: first_block });
    }

    let mut jumps = 0;

    decompress_with(bytes, first_block as usize * BLOCK_LEN, |block| {
        if block == 0 || block as usize >= block_count {
            return Err(DecompressError::InvalidBlock { block });
        }

        // A chain can't be longer than the number of blocks, unless it loops back onto itself
        jumps += 1;
        if jumps > block_count {
            return Err(DecompressError::BlockLoop);
        }

        Ok((block as usize * BLOCK_LEN) as u64)
    })
}

/// Errors that might be returned from [`decompress()`] and friends
#[derive(Debug, Error)]
pub enum DecompressError {
    /// The compressed stream ended in the middle of a command, or before an EOF command
    #[error("The compressed stream ended prematurely")]
    TruncatedStream,

    /// The compressed stream expanded to more bytes than fit in a song
    #[error("The compressed stream expands to more than {DECOMPRESSED_LEN:#x} bytes")]
    OversizedOutput,

    /// The compressed stream ended (with an EOF command) before producing a full song
    #[error("Decompression resulted in {size:#x} bytes instead of {DECOMPRESSED_LEN:#x}")]
    SizeMismatch { size: usize },

    /// A block jump command pointed outside of the block pool
    #[error("Block {block} does not exist")]
    InvalidBlock { block: u8 },

    /// The chain of block jumps never ended
    #[error("The block jumps form a loop")]
    BlockLoop,

    /// Any other failure that has to do with I/O
    #[error("Something failed with I/O")]
    Io(#[source] io::Error),
}

impl From<io::Error> for DecompressError {
    fn from(error: io::Error) -> Self {
        // Readers and writers are all bounded memory streams, so running into their ends
        // says something about the compressed data
        match error.kind() {
            ErrorKind::UnexpectedEof => Self::TruncatedStream,
            ErrorKind::WriteZero => Self::OversizedOutput,
            _ => Self::Io(error),
        }
    }
}

fn decompress_with<F>(
    bytes: &[u8],
    start: usize,
    mut jump: F,
) -> std::result::Result<[u8; DECOMPRESSED_LEN], DecompressError>
where
    F: FnMut(u8) -> std::result::Result<u64, DecompressError>,
{
    let mut reader = MemoryStream::new(bytes);
    reader.seek(SeekFrom::Start(start as u64))?;

    let mut memory = [0; DECOMPRESSED_LEN];
    let mut writer = MemoryStream::new(memory.as_mut_slice());

    while let End::JumpToBlock(block) = decompress_block(&mut reader, &mut writer)? {
        let offset = jump(block)?;
        tracing::trace!(block, offset, "following block jump");
        reader.seek(SeekFrom::Start(offset))?;
    }

    let size = writer.position() as usize;
    if size != DECOMPRESSED_LEN {
        return Err(DecompressError::SizeMismatch { size });
    }

    Ok(memory)
}

#[derive(Debug, PartialEq, Eq)]
enum CmdContinuation {
    Continue,
    End(End),
}

fn decompress_rle_byte<R, W>(mut reader: R, mut writer: W) -> Result<()>
where
    R: Read,
    W: Write,
{
    match read_byte(&mut reader)? {
        RLE_BYTE => writer.write_all(&[RLE_BYTE])?,
        value => {
            let count = read_byte(reader)?;
            write_repeated_byte(value, count as usize, &mut writer)?
        }
    }

    Ok(())
}

fn decompress_cmd_byte<R, W>(mut reader: R, mut writer: W) -> Result<CmdContinuation>
where
    R: Read,
    W: Write,
{
    match read_byte(&mut reader)? {
        CMD_BYTE => writer.write_all(&[CMD_BYTE])?,
        DEFAULT_WAVE_BYTE => {
            let count = read_byte(&mut reader)?;
            write_repeated_bytes(&DEFAULT_WAVE, count as usize, &mut writer)?
        }
        DEFAULT_INSTRUMENT_BYTE => {
            let count = read_byte(&mut reader)?;
            write_repeated_bytes(&DEFAULT_INSTRUMENT, count as usize, &mut writer)?
        }
        EOF_BYTE => return Ok(CmdContinuation::End(End::EndOfFile)),
        block => return Ok(CmdContinuation::End(End::JumpToBlock(block))),
    }

    Ok(CmdContinuation::Continue)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn rle() {
        let mut plain = [0_u8; 4];

        assert!(
            decompress_rle_byte(Cursor::new([0x11, 4]), Cursor::new(plain.as_mut_slice())).is_ok()
        );

        assert_eq!(plain, [0x11, 0x11, 0x11, 0x11]);
    }

    #[test]
    fn rle_literal() {
        let mut plain = [0_u8; 1];

        assert!(
            decompress_rle_byte(Cursor::new([RLE_BYTE]), Cursor::new(plain.as_mut_slice())).is_ok()
        );

        assert_eq!(plain, [0xC0]);
    }

    #[test]
    fn cmd_literal() {
        let mut plain = [0_u8; 1];

        assert_eq!(
            decompress_cmd_byte(Cursor::new([CMD_BYTE]), Cursor::new(plain.as_mut_slice()))
                .unwrap(),
            CmdContinuation::Continue
        );

        assert_eq!(plain, [0xE0]);
    }

    #[test]
    fn default_wave() {
        let mut plain = [0_u8; 32];

        assert_eq!(
            decompress_cmd_byte(
                Cursor::new([DEFAULT_WAVE_BYTE, 2]),
                Cursor::new(plain.as_mut_slice())
            )
            .unwrap(),
            CmdContinuation::Continue
        );

        assert_eq!(
            plain,
            [
                0x8E, 0xCD, 0xCC, 0xBB, 0xAA, 0xA9, 0x99, 0x88, 0x87, 0x76, 0x66, 0x55, 0x54, 0x43,
                0x32, 0x31, 0x8E, 0xCD, 0xCC, 0xBB, 0xAA, 0xA9, 0x99, 0x88, 0x87, 0x76, 0x66, 0x55,
                0x54, 0x43, 0x32, 0x31
            ]
        );
    }

    #[test]
    fn default_instrument() {
        let mut plain = [0_u8; 32];

        assert_eq!(
            decompress_cmd_byte(
                Cursor::new([DEFAULT_INSTRUMENT_BYTE, 2]),
                Cursor::new(plain.as_mut_slice())
            )
            .unwrap(),
            CmdContinuation::Continue
        );

        assert_eq!(
            plain,
            [
                0xA8, 0x0, 0x0, 0xFF, 0x0, 0x0, 0x3, 0x0, 0x0, 0xD0, 0x0, 0x0, 0x0, 0xF3, 0x0, 0x0,
                0xA8, 0x0, 0x0, 0xFF, 0x0, 0x0, 0x3, 0x0, 0x0, 0xD0, 0x0, 0x0, 0x0, 0xF3, 0x0, 0x0,
            ]
        );
    }

    #[test]
    fn block_jump() {
        let mut plain = [0_u8; 1];

        assert_eq!(
            decompress_cmd_byte(Cursor::new([4]), Cursor::new(plain.as_mut_slice())).unwrap(),
            CmdContinuation::End(End::JumpToBlock(4)),
        );
    }

    #[test]
    fn eof() {
        let mut plain = [0_u8; 1];

        assert_eq!(
            decompress_cmd_byte(Cursor::new([EOF_BYTE]), Cursor::new(plain.as_mut_slice()))
                .unwrap(),
            CmdContinuation::End(End::EndOfFile)
        );
    }

    /// A single block holding 0x8000 zeroes, spelled out as 128 full RLE runs and a partial one
    fn zeroes_block() -> Vec<u8> {
        let mut block = Vec::new();
        for _ in 0..128 {
            block.extend_from_slice(&[RLE_BYTE, 0, 255]);
        }
        block.extend_from_slice(&[RLE_BYTE, 0, 128]);
        block.extend_from_slice(&[CMD_BYTE, EOF_BYTE]);
        block.resize(BLOCK_LEN, 0);
        block
    }

    #[test]
    fn sequential() {
        let song = decompress(&zeroes_block()).unwrap();
        assert!(song.iter().all(|byte| *byte == 0));
    }

    #[test]
    fn sequential_ignores_jump_values() {
        // Jump to "block 9" halfway, which for sequential decoding simply means the next block
        let mut bytes = vec![RLE_BYTE, 0x11, 0x80, CMD_BYTE, 9];
        bytes.resize(BLOCK_LEN, 0);
        for _ in 0..128 {
            bytes.extend_from_slice(&[RLE_BYTE, 0x22, 0xFF]);
        }
        bytes.extend_from_slice(&[CMD_BYTE, EOF_BYTE]);
        bytes.resize(2 * BLOCK_LEN, 0);

        let song = decompress(&bytes).unwrap();
        assert!(song[..0x80].iter().all(|byte| *byte == 0x11));
        assert!(song[0x80..].iter().all(|byte| *byte == 0x22));
    }

    #[test]
    fn size_mismatch() {
        let mut block = vec![RLE_BYTE, 0, 16, CMD_BYTE, EOF_BYTE];
        block.resize(BLOCK_LEN, 0);

        assert!(matches!(
            decompress(&block),
            Err(DecompressError::SizeMismatch { size: 16 })
        ));
    }

    #[test]
    fn oversized() {
        let mut block = Vec::new();
        for _ in 0..130 {
            block.extend_from_slice(&[RLE_BYTE, 0, 255]);
        }
        block.extend_from_slice(&[CMD_BYTE, EOF_BYTE]);
        block.resize(BLOCK_LEN, 0);

        assert!(matches!(
            decompress(&block),
            Err(DecompressError::OversizedOutput)
        ));
    }

    #[test]
    fn truncated() {
        let block = zeroes_block();

        for len in [0, 1, 2, 100, 3 * 129 - 1, 3 * 129 + 1] {
            assert!(
                matches!(
                    decompress(&block[..len]),
                    Err(DecompressError::TruncatedStream)
                ),
                "prefix of {len} bytes"
            );
        }
    }

    #[test]
    fn linked() {
        // Block 0 is a header, block 1 jumps to 3, block 2 is garbage
        let mut bytes = vec![0; 4 * BLOCK_LEN];
        bytes[BLOCK_LEN..BLOCK_LEN + 5].copy_from_slice(&[RLE_BYTE, 0x33, 0x10, CMD_BYTE, 3]);
        bytes[2 * BLOCK_LEN..3 * BLOCK_LEN].fill(0x44);

        let mut tail = Vec::new();
        for _ in 0..128 {
            tail.extend_from_slice(&[RLE_BYTE, 0x55, 0xFF]);
        }
        tail.extend_from_slice(&[RLE_BYTE, 0x55, 0x70, CMD_BYTE, EOF_BYTE]);
        bytes[3 * BLOCK_LEN..3 * BLOCK_LEN + tail.len()].copy_from_slice(&tail);

        let song = decompress_linked(&bytes, 1).unwrap();
        assert!(song[..0x10].iter().all(|byte| *byte == 0x33));
        assert!(song[0x10..].iter().all(|byte| *byte == 0x55));
    }

    #[test]
    fn linked_invalid_block() {
        let mut bytes = vec![0; 4 * BLOCK_LEN];
        bytes[BLOCK_LEN..BLOCK_LEN + 2].copy_from_slice(&[CMD_BYTE, 7]);

        assert!(matches!(
            decompress_linked(&bytes, 1),
            Err(DecompressError::InvalidBlock { block: 7 })
        ));

        assert!(matches!(
            decompress_linked(&bytes, 0),
            Err(DecompressError::InvalidBlock { block: 0 })
        ));
    }

    #[test]
    fn linked_loop() {
        let mut bytes = vec![0; 4 * BLOCK_LEN];
        bytes[BLOCK_LEN..BLOCK_LEN + 2].copy_from_slice(&[CMD_BYTE, 2]);
        bytes[2 * BLOCK_LEN..2 * BLOCK_LEN + 2].copy_from_slice(&[CMD_BYTE, 1]);

        assert!(matches!(
            decompress_linked(&bytes, 1),
            Err(DecompressError::BlockLoop)
        ));
    }
}
