//! Words for the speech synthesizer
//!
//! LSDJ can make the wave channel speak, using words built from allophones (the smallest units
//! of speech sound). Every word is stored as 16 allophones, followed by the duration of each.

use super::SongMemory;
use crate::name::Name;
use std::borrow::{Borrow, BorrowMut};
use ux::u4;

const WORDS_OFFSET: usize = 0x1890;
const NAMES_OFFSET: usize = 0x1DD0;

/// The number of bytes a word takes up
const WORD_LEN: usize = 32;

/// The number of characters in a word name
pub const NAME_LEN: usize = 4;

/// The allophone value meaning "nothing"
const NO_ALLOPHONE: u8 = 0;

/// A view onto a single speech word in a song
#[derive(Debug)]
pub struct Word<S> {
    song: S,
    index: u8,
}

impl SongMemory {
    /// The number of speech words in a song
    pub const WORD_COUNT: usize = 42;

    /// Access a word, or [`None`] if the index is out of range
    pub fn word(&self, index: u8) -> Option<Word<&Self>> {
        ((index as usize) < Self::WORD_COUNT).then_some(Word { song: self, index })
    }

    /// Access a word for modification, or [`None`] if the index is out of range
    pub fn word_mut(&mut self, index: u8) -> Option<Word<&mut Self>> {
        ((index as usize) < Self::WORD_COUNT).then_some(Word { song: self, index })
    }
}

impl<S> Word<S>
where
    S: Borrow<SongMemory>,
{
    /// The number of allophones in a word
    pub const LEN: usize = 16;

    pub fn index(&self) -> u8 {
        self.index
    }

    pub fn name(&self) -> Name<NAME_LEN> {
        let offset = self.name_offset();
        let bytes = &self.song.borrow().as_slice()[offset..offset + NAME_LEN];

        Name::from_bytes(bytes).unwrap_or_default()
    }

    /// The allophone at a position, or [`None`] if it's empty
    pub fn allophone(&self, position: u4) -> Option<u8> {
        match self.song.borrow().byte(self.allophone_offset(position)) {
            NO_ALLOPHONE => None,
            allophone => Some(allophone),
        }
    }

    /// How long the allophone at a position lasts
    pub fn duration(&self, position: u4) -> u8 {
        self.song.borrow().byte(self.duration_offset(position))
    }

    fn allophone_offset(&self, position: u4) -> usize {
        WORDS_OFFSET + self.index as usize * WORD_LEN + u8::from(position) as usize
    }

    fn duration_offset(&self, position: u4) -> usize {
        self.allophone_offset(position) + Self::LEN
    }

    fn name_offset(&self) -> usize {
        NAMES_OFFSET + self.index as usize * NAME_LEN
    }
}

impl<S> Word<S>
where
    S: BorrowMut<SongMemory>,
{
    pub fn set_name(&mut self, name: &Name<NAME_LEN>) {
        let offset = self.name_offset();
        self.song.borrow_mut().as_mut_slice()[offset..offset + NAME_LEN]
            .copy_from_slice(name.bytes());
    }

    pub fn set_allophone(&mut self, position: u4, allophone: Option<u8>) {
        let offset = self.allophone_offset(position);
        self.song
            .borrow_mut()
            .set_byte(offset, allophone.unwrap_or(NO_ALLOPHONE));
    }

    pub fn set_duration(&mut self, position: u4, duration: u8) {
        let offset = self.duration_offset(position);
        self.song.borrow_mut().set_byte(offset, duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn range() {
        let song = SongMemory::new();
        assert!(song.word(41).is_some());
        assert!(song.word(42).is_none());
    }

    #[test]
    fn edit() {
        let mut song = SongMemory::new();

        {
            let mut word = song.word_mut(41).unwrap();
            word.set_name(&Name::from_str("HEY").unwrap());
            word.set_allophone(u4::new(0), Some(0x1B));
            word.set_duration(u4::new(0), 0x04);
            word.set_allophone(u4::new(15), Some(0x3F));
        }

        let word = song.word(41).unwrap();
        assert_eq!(word.name().as_str(), "HEY");
        assert_eq!(word.allophone(u4::new(0)), Some(0x1B));
        assert_eq!(word.duration(u4::new(0)), 0x04);
        assert_eq!(word.allophone(u4::new(1)), None);
        assert_eq!(word.allophone(u4::new(15)), Some(0x3F));

        // The last name ends right before the first "rb" marker
        assert_eq!(&song.as_slice()[0x1E74..0x1E78], b"HEY\0");
        assert_eq!(song.as_slice()[WORDS_OFFSET + 41 * WORD_LEN + 16], 0x04);
    }
}
