//! Phrases: 16 steps of notes, instruments and commands

use super::{
    SongMemory,
    command::{Command, UnsupportedCommandError},
};
use std::borrow::{Borrow, BorrowMut};
use ux::u4;

const NOTES_OFFSET: usize = 0x0000;
const ALLOCATIONS_OFFSET: usize = 0x3E82;
const COMMANDS_OFFSET: usize = 0x4000;
const COMMAND_VALUES_OFFSET: usize = 0x4FF0;
const INSTRUMENTS_OFFSET: usize = 0x7000;

const NO_NOTE: u8 = 0;
const NO_INSTRUMENT: u8 = 0xFF;

/// A view onto a single phrase in a song
///
/// Obtain one through [`SongMemory::phrase()`] or [`SongMemory::phrase_mut()`].
#[derive(Debug)]
pub struct Phrase<S> {
    song: S,
    index: u8,
}

impl SongMemory {
    /// The number of phrases in a song
    ///
    /// Phrase indices run from 0 to `0xFE`, because `0xFF` means "no phrase" in a chain.
    pub const PHRASE_COUNT: usize = 0xFF;

    /// Access a phrase, or [`None`] if the index is out of range
    pub fn phrase(&self, index: u8) -> Option<Phrase<&Self>> {
        ((index as usize) < Self::PHRASE_COUNT).then_some(Phrase { song: self, index })
    }

    /// Access a phrase for modification, or [`None`] if the index is out of range
    pub fn phrase_mut(&mut self, index: u8) -> Option<Phrase<&mut Self>> {
        ((index as usize) < Self::PHRASE_COUNT).then_some(Phrase { song: self, index })
    }
}

impl<S> Phrase<S>
where
    S: Borrow<SongMemory>,
{
    /// The number of steps in a phrase
    pub const LEN: usize = 16;

    /// The index of this phrase in the song
    pub fn index(&self) -> u8 {
        self.index
    }

    /// Is this phrase in use?
    pub fn is_allocated(&self) -> bool {
        let (offset, bit) = self.allocation_bit();
        self.song.borrow().bit(offset, bit)
    }

    /// The note played at a step, or [`None`] for an empty step
    pub fn note(&self, step: u4) -> Option<u8> {
        match self.song.borrow().byte(self.offset(NOTES_OFFSET, step)) {
            NO_NOTE => None,
            note => Some(note),
        }
    }

    /// The instrument used at a step, or [`None`] if no instrument is set
    pub fn instrument(&self, step: u4) -> Option<u8> {
        match self.song.borrow().byte(self.offset(INSTRUMENTS_OFFSET, step)) {
            NO_INSTRUMENT => None,
            instrument => Some(instrument),
        }
    }

    /// The command at a step, or [`None`] if there is none
    pub fn command(&self, step: u4) -> Option<Command> {
        let song = self.song.borrow();
        Command::from_byte(
            song.byte(self.offset(COMMANDS_OFFSET, step)),
            song.format_version(),
        )
    }

    /// The value belonging to the command at a step
    pub fn command_value(&self, step: u4) -> u8 {
        self.song
            .borrow()
            .byte(self.offset(COMMAND_VALUES_OFFSET, step))
    }

    fn offset(&self, base: usize, step: u4) -> usize {
        base + self.index as usize * Self::LEN + u8::from(step) as usize
    }

    fn allocation_bit(&self) -> (usize, u8) {
        (ALLOCATIONS_OFFSET + self.index as usize / 8, self.index % 8)
    }
}

impl<S> Phrase<S>
where
    S: BorrowMut<SongMemory>,
{
    /// Mark the phrase as (not) in use
    pub fn set_allocated(&mut self, allocated: bool) {
        let (offset, bit) = self.allocation_bit();
        self.song.borrow_mut().set_bit(offset, bit, allocated);
    }

    /// Change the note played at a step
    pub fn set_note(&mut self, step: u4, note: Option<u8>) {
        let offset = self.offset(NOTES_OFFSET, step);
        self.song
            .borrow_mut()
            .set_byte(offset, note.unwrap_or(NO_NOTE));
    }

    /// Change the instrument used at a step
    pub fn set_instrument(&mut self, step: u4, instrument: Option<u8>) {
        let offset = self.offset(INSTRUMENTS_OFFSET, step);
        self.song
            .borrow_mut()
            .set_byte(offset, instrument.unwrap_or(NO_INSTRUMENT));
    }

    /// Change the command at a step
    ///
    /// This fails if the command doesn't exist in the song's format version.
    pub fn set_command(
        &mut self,
        step: u4,
        command: Option<Command>,
    ) -> Result<(), UnsupportedCommandError> {
        let offset = self.offset(COMMANDS_OFFSET, step);
        let song = self.song.borrow_mut();
        let byte = Command::option_to_byte(command, song.format_version())?;
        song.set_byte(offset, byte);
        Ok(())
    }

    /// Change the value belonging to the command at a step
    pub fn set_command_value(&mut self, step: u4, value: u8) {
        let offset = self.offset(COMMAND_VALUES_OFFSET, step);
        self.song.borrow_mut().set_byte(offset, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range() {
        let mut song = SongMemory::new();
        assert!(song.phrase(0xFE).is_some());
        assert!(song.phrase(0xFF).is_none());
        assert!(song.phrase_mut(0xFF).is_none());
    }

    #[test]
    fn empty() {
        let song = SongMemory::new();
        let phrase = song.phrase(0).unwrap();

        assert!(!phrase.is_allocated());
        assert_eq!(phrase.note(u4::new(0)), None);
        assert_eq!(phrase.instrument(u4::new(0)), None);
        assert_eq!(phrase.command(u4::new(0)), None);
        assert_eq!(phrase.command_value(u4::new(0)), 0);
    }

    #[test]
    fn edit() {
        let mut song = SongMemory::new();

        {
            let mut phrase = song.phrase_mut(0xFE).unwrap();
            phrase.set_allocated(true);
            phrase.set_note(u4::new(15), Some(0x30));
            phrase.set_instrument(u4::new(15), Some(0));
            phrase.set_command(u4::new(15), Some(Command::B)).unwrap();
            phrase.set_command_value(u4::new(15), 0x42);
        }

        let phrase = song.phrase(0xFE).unwrap();
        assert!(phrase.is_allocated());
        assert_eq!(phrase.note(u4::new(15)), Some(0x30));
        assert_eq!(phrase.instrument(u4::new(15)), Some(0));
        assert_eq!(phrase.command(u4::new(15)), Some(Command::B));
        assert_eq!(phrase.command_value(u4::new(15)), 0x42);

        // The last phrase's last step is right before the next region
        assert_eq!(song.as_slice()[COMMAND_VALUES_OFFSET - 1], 1);
        assert_eq!(song.as_slice()[ALLOCATIONS_OFFSET + 31], 0b0100_0000);
    }

    #[test]
    fn command_needs_version() {
        let mut song = SongMemory::new();
        song.set_format_version(7);

        let mut phrase = song.phrase_mut(1).unwrap();
        assert!(phrase.set_command(u4::new(0), Some(Command::B)).is_err());
        assert!(phrase.set_command(u4::new(0), Some(Command::A)).is_ok());
        assert_eq!(phrase.command(u4::new(0)), Some(Command::A));
    }
}
