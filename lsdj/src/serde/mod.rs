//! Implementation of the [LSDJ compression algorithm](https://littlesounddj.fandom.com/wiki/File_Management_Structure)
//!
//! Songs are compressed into blocks of 512 bytes. Each block ends with either a command to
//! jump to another block, or an end-of-file command. The remainder of a block is padded
//! with zeroes.

mod compress;
mod decompress;
mod utils;

pub use compress::{BLOCK_LEN, CompressBlockError, compress, compress_block};
pub use decompress::{DecompressError, decompress, decompress_block, decompress_linked};

/// The result of block compression/decompression
///
/// See [`compress_block`] and [`decompress_block`] for more information on when this is returned
#[derive(Debug, PartialEq, Eq)]
pub enum End {
    /// A block-jump command has been written/read
    JumpToBlock(u8),

    /// An EOF command has been written/read
    EndOfFile,
}
