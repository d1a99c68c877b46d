//! LSDJ song memory, and typed views onto the data inside it
//!
//! [`SongMemory`] is the raw 32KiB block LSDJ keeps a song in. Rather than parsing it into a
//! separate structure (and having to write it back), every musical entity is accessed through
//! a lightweight view that borrows the memory:
//!
//! ```
//! use lsdj::{song::{SongMemory, row::Channel}, u4, u7};
//!
//! let mut song = SongMemory::new();
//!
//! let mut chain = song.chain_mut(u7::new(0));
//! chain.set_allocated(true);
//! chain.set_phrase(u4::new(0), Some(0));
//!
//! song.row_mut(0).set_chain(Channel::Pulse1, Some(0));
//! assert_eq!(song.row(0).chain(Channel::Pulse1), Some(0));
//! ```
//!
//! Views obtained through `&SongMemory` only have getters, the ones obtained through
//! `&mut SongMemory` have setters as well. Fields whose layout changed between LSDJ versions
//! look at [`SongMemory::format_version()`] to decide where to read and write.

pub mod chain;
pub mod command;
pub mod groove;
pub mod instrument;
pub mod phrase;
pub mod row;
pub mod settings;
pub mod synth;
pub mod table;
pub mod wave;
pub mod word;

mod song_memory;

pub use song_memory::{FromBytesError, FromReaderError, SongMemory};
