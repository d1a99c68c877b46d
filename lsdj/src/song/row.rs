//! The song screen: which chain each channel plays on each row, and bookmarks

use super::SongMemory;
use std::borrow::{Borrow, BorrowMut};

const CHAINS_OFFSET: usize = 0x1290;
const BOOKMARKS_OFFSET: usize = 0x0FF0;

const NO_CHAIN: u8 = 0xFF;
const NO_BOOKMARK: u8 = 0xFF;

/// The number of bookmarks each channel can hold
pub const BOOKMARKS_PER_CHANNEL: usize = 16;

/// The four Game Boy sound channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Pulse1,
    Pulse2,
    Wave,
    Noise,
}

impl Channel {
    /// Every channel, in the order LSDJ stores them
    pub const ALL: [Self; 4] = [Self::Pulse1, Self::Pulse2, Self::Wave, Self::Noise];

    fn index(self) -> usize {
        match self {
            Self::Pulse1 => 0,
            Self::Pulse2 => 1,
            Self::Wave => 2,
            Self::Noise => 3,
        }
    }
}

/// A view onto a single row of the song screen
#[derive(Debug)]
pub struct Row<S> {
    song: S,
    index: u8,
}

impl SongMemory {
    /// The number of rows in the song screen
    pub const ROW_COUNT: usize = 0x100;

    pub fn row(&self, index: u8) -> Row<&Self> {
        Row { song: self, index }
    }

    pub fn row_mut(&mut self, index: u8) -> Row<&mut Self> {
        Row { song: self, index }
    }
}

impl<S> Row<S>
where
    S: Borrow<SongMemory>,
{
    pub fn index(&self) -> u8 {
        self.index
    }

    /// The chain a channel plays on this row, or [`None`] if it's empty
    pub fn chain(&self, channel: Channel) -> Option<u8> {
        match self.song.borrow().byte(self.offset(channel)) {
            NO_CHAIN => None,
            chain => Some(chain),
        }
    }

    /// Has this row been bookmarked for a channel?
    pub fn is_bookmarked(&self, channel: Channel) -> bool {
        let song = self.song.borrow();
        bookmark_offsets(channel).any(|offset| song.byte(offset) == self.index)
    }

    fn offset(&self, channel: Channel) -> usize {
        CHAINS_OFFSET + self.index as usize * Channel::ALL.len() + channel.index()
    }
}

impl<S> Row<S>
where
    S: BorrowMut<SongMemory>,
{
    pub fn set_chain(&mut self, channel: Channel, chain: Option<u8>) {
        let offset = self.offset(channel);
        self.song
            .borrow_mut()
            .set_byte(offset, chain.unwrap_or(NO_CHAIN));
    }

    /// Add or remove a bookmark on this row for a channel
    ///
    /// Returns `false` if the bookmark couldn't be added because all of the channel's
    /// bookmark slots are in use.
    pub fn set_bookmarked(&mut self, channel: Channel, bookmarked: bool) -> bool {
        if self.is_bookmarked(channel) == bookmarked {
            return true;
        }

        let (from, to) = if bookmarked {
            (NO_BOOKMARK, self.index)
        } else {
            (self.index, NO_BOOKMARK)
        };

        let song = self.song.borrow_mut();
        match bookmark_offsets(channel).find(|offset| song.byte(*offset) == from) {
            Some(offset) => {
                song.set_byte(offset, to);
                true
            }
            None => false,
        }
    }
}

fn bookmark_offsets(channel: Channel) -> impl Iterator<Item = usize> {
    let start = BOOKMARKS_OFFSET + channel.index() * BOOKMARKS_PER_CHANNEL;
    start..start + BOOKMARKS_PER_CHANNEL
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chains() {
        let mut song = SongMemory::new();
        assert_eq!(song.row(0).chain(Channel::Pulse1), None);

        song.row_mut(0xFF).set_chain(Channel::Noise, Some(0x7F));
        song.row_mut(0x10).set_chain(Channel::Wave, Some(0));

        assert_eq!(song.row(0xFF).chain(Channel::Noise), Some(0x7F));
        assert_eq!(song.row(0xFF).chain(Channel::Wave), None);
        assert_eq!(song.row(0x10).chain(Channel::Wave), Some(0));
        assert_eq!(song.as_slice()[0x168F], 0x7F);
        assert_eq!(song.as_slice()[CHAINS_OFFSET + 0x42], 0);
    }

    #[test]
    fn no_bookmarks_in_empty_song() {
        let song = SongMemory::new();

        for channel in Channel::ALL {
            assert!(!song.row(0).is_bookmarked(channel));
            assert!(bookmark_offsets(channel).all(|offset| song.byte(offset) == NO_BOOKMARK));
        }
    }

    #[test]
    fn bookmarks() {
        let mut song = SongMemory::new();
        assert!(!song.row(3).is_bookmarked(Channel::Pulse2));

        assert!(song.row_mut(3).set_bookmarked(Channel::Pulse2, true));
        assert!(song.row(3).is_bookmarked(Channel::Pulse2));
        assert!(!song.row(3).is_bookmarked(Channel::Pulse1));
        assert_eq!(song.as_slice()[BOOKMARKS_OFFSET + 16], 3);

        // Bookmarking twice doesn't take a second slot
        assert!(song.row_mut(3).set_bookmarked(Channel::Pulse2, true));
        assert_eq!(song.as_slice()[BOOKMARKS_OFFSET + 17], NO_BOOKMARK);

        assert!(song.row_mut(3).set_bookmarked(Channel::Pulse2, false));
        assert!(!song.row(3).is_bookmarked(Channel::Pulse2));
    }

    #[test]
    fn bookmarks_full() {
        let mut song = SongMemory::new();

        for row in 0..BOOKMARKS_PER_CHANNEL as u8 {
            assert!(song.row_mut(row).set_bookmarked(Channel::Noise, true));
        }

        assert!(!song.row_mut(0x20).set_bookmarked(Channel::Noise, true));
        assert!(!song.row(0x20).is_bookmarked(Channel::Noise));
        assert!(song.row_mut(0x20).set_bookmarked(Channel::Wave, true));
    }
}
