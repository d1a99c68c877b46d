//! Chains: sequences of up to 16 phrases

use super::SongMemory;
use std::borrow::{Borrow, BorrowMut};
use ux::{u4, u7};

const PHRASES_OFFSET: usize = 0x2080;
const TRANSPOSITIONS_OFFSET: usize = 0x2880;
const ALLOCATIONS_OFFSET: usize = 0x3EA2;

/// The value of a chain step that doesn't refer to a phrase
const NO_PHRASE: u8 = 0xFF;

/// A view onto a single chain in a song
///
/// Obtain one through [`SongMemory::chain()`] or [`SongMemory::chain_mut()`].
#[derive(Debug)]
pub struct Chain<S> {
    song: S,
    index: u7,
}

impl SongMemory {
    /// The number of chains in a song
    pub const CHAIN_COUNT: usize = 0x80;

    /// Access a chain
    pub fn chain(&self, index: u7) -> Chain<&Self> {
        Chain { song: self, index }
    }

    /// Access a chain for modification
    pub fn chain_mut(&mut self, index: u7) -> Chain<&mut Self> {
        Chain { song: self, index }
    }
}

impl<S> Chain<S>
where
    S: Borrow<SongMemory>,
{
    /// The number of steps in a chain
    pub const LEN: usize = 16;

    /// The index of this chain in the song
    pub fn index(&self) -> u7 {
        self.index
    }

    /// Is this chain in use?
    pub fn is_allocated(&self) -> bool {
        let (offset, bit) = self.allocation_bit();
        self.song.borrow().bit(offset, bit)
    }

    /// The phrase played at a step, or [`None`] for an empty step
    pub fn phrase(&self, step: u4) -> Option<u8> {
        match self.song.borrow().byte(self.offset(PHRASES_OFFSET, step)) {
            NO_PHRASE => None,
            phrase => Some(phrase),
        }
    }

    /// The transposition (in semitones) applied at a step
    pub fn transposition(&self, step: u4) -> u8 {
        self.song
            .borrow()
            .byte(self.offset(TRANSPOSITIONS_OFFSET, step))
    }

    fn offset(&self, base: usize, step: u4) -> usize {
        base + u8::from(self.index) as usize * Self::LEN + u8::from(step) as usize
    }

    fn allocation_bit(&self) -> (usize, u8) {
        let index = u8::from(self.index);
        (ALLOCATIONS_OFFSET + index as usize / 8, index % 8)
    }
}

impl<S> Chain<S>
where
    S: BorrowMut<SongMemory>,
{
    /// Mark the chain as (not) in use
    pub fn set_allocated(&mut self, allocated: bool) {
        let (offset, bit) = self.allocation_bit();
        self.song.borrow_mut().set_bit(offset, bit, allocated);
    }

    /// Change the phrase played at a step
    ///
    /// Phrase indices run up to `0xFE`, `Some(0xFF)` is the same as [`None`].
    pub fn set_phrase(&mut self, step: u4, phrase: Option<u8>) {
        let offset = self.offset(PHRASES_OFFSET, step);
        self.song
            .borrow_mut()
            .set_byte(offset, phrase.unwrap_or(NO_PHRASE));
    }

    /// Change the transposition (in semitones) applied at a step
    pub fn set_transposition(&mut self, step: u4, transposition: u8) {
        let offset = self.offset(TRANSPOSITIONS_OFFSET, step);
        self.song.borrow_mut().set_byte(offset, transposition);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty() {
        let song = SongMemory::new();
        let chain = song.chain(u7::new(0x7F));

        assert_eq!(chain.index(), u7::new(0x7F));
        assert!(!chain.is_allocated());
        assert_eq!(chain.phrase(u4::new(0)), None);
        assert_eq!(chain.transposition(u4::new(15)), 0);
    }

    #[test]
    fn edit() {
        let mut song = SongMemory::new();

        let mut chain = song.chain_mut(u7::new(9));
        chain.set_allocated(true);
        chain.set_phrase(u4::new(3), Some(0x20));
        chain.set_transposition(u4::new(3), 0x0C);

        let chain = song.chain(u7::new(9));
        assert!(chain.is_allocated());
        assert_eq!(chain.phrase(u4::new(3)), Some(0x20));
        assert_eq!(chain.phrase(u4::new(4)), None);
        assert_eq!(chain.transposition(u4::new(3)), 0x0C);

        // Chain 9 is bit 1 of the second allocation byte
        assert_eq!(song.as_slice()[ALLOCATIONS_OFFSET + 1], 0b10);
        assert_eq!(song.as_slice()[PHRASES_OFFSET + 9 * 16 + 3], 0x20);

        // Neighbours are untouched
        assert!(!song.chain(u7::new(8)).is_allocated());
        assert_eq!(song.chain(u7::new(8)).phrase(u4::new(3)), None);

        song.chain_mut(u7::new(9)).set_phrase(u4::new(3), None);
        assert_eq!(song.chain(u7::new(9)).phrase(u4::new(3)), None);
    }
}
