//! Tables: 16 steps of envelopes, transpositions and two command columns

use super::{
    SongMemory,
    command::{Command, UnsupportedCommandError},
};
use std::borrow::{Borrow, BorrowMut};
use ux::{u4, u5};

const ENVELOPES_OFFSET: usize = 0x1690;
const ALLOCATIONS_OFFSET: usize = 0x2020;
const TRANSPOSITIONS_OFFSET: usize = 0x3480;

/// The offsets of the command and command value regions, for both columns
const COLUMN_OFFSETS: [(usize, usize); 2] = [(0x3680, 0x3880), (0x3A80, 0x3C80)];

/// One of the two command columns in a table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    First,
    Second,
}

impl Column {
    fn offsets(self) -> (usize, usize) {
        match self {
            Self::First => COLUMN_OFFSETS[0],
            Self::Second => COLUMN_OFFSETS[1],
        }
    }
}

/// A view onto a single table in a song
#[derive(Debug)]
pub struct Table<S> {
    song: S,
    index: u5,
}

impl SongMemory {
    /// The number of tables in a song
    pub const TABLE_COUNT: usize = 0x20;

    pub fn table(&self, index: u5) -> Table<&Self> {
        Table { song: self, index }
    }

    pub fn table_mut(&mut self, index: u5) -> Table<&mut Self> {
        Table { song: self, index }
    }
}

impl<S> Table<S>
where
    S: Borrow<SongMemory>,
{
    /// The number of steps in a table
    pub const LEN: usize = 16;

    pub fn index(&self) -> u5 {
        self.index
    }

    pub fn is_allocated(&self) -> bool {
        self.song.borrow().byte(self.allocation_offset()) != 0
    }

    /// The volume envelope at a step
    pub fn envelope(&self, step: u4) -> u8 {
        self.song.borrow().byte(self.offset(ENVELOPES_OFFSET, step))
    }

    /// The transposition (in semitones) at a step
    pub fn transposition(&self, step: u4) -> u8 {
        self.song
            .borrow()
            .byte(self.offset(TRANSPOSITIONS_OFFSET, step))
    }

    /// The command in one of the columns, or [`None`] if there is none
    pub fn command(&self, column: Column, step: u4) -> Option<Command> {
        let song = self.song.borrow();
        let (commands, _) = column.offsets();

        Command::from_byte(
            song.byte(self.offset(commands, step)),
            song.format_version(),
        )
    }

    /// The value belonging to the command in one of the columns
    pub fn command_value(&self, column: Column, step: u4) -> u8 {
        let (_, values) = column.offsets();
        self.song.borrow().byte(self.offset(values, step))
    }

    fn offset(&self, base: usize, step: u4) -> usize {
        base + u8::from(self.index) as usize * Self::LEN + u8::from(step) as usize
    }

    fn allocation_offset(&self) -> usize {
        ALLOCATIONS_OFFSET + u8::from(self.index) as usize
    }
}

impl<S> Table<S>
where
    S: BorrowMut<SongMemory>,
{
    pub fn set_allocated(&mut self, allocated: bool) {
        let offset = self.allocation_offset();
        self.song.borrow_mut().set_byte(offset, allocated as u8);
    }

    pub fn set_envelope(&mut self, step: u4, envelope: u8) {
        let offset = self.offset(ENVELOPES_OFFSET, step);
        self.song.borrow_mut().set_byte(offset, envelope);
    }

    pub fn set_transposition(&mut self, step: u4, transposition: u8) {
        let offset = self.offset(TRANSPOSITIONS_OFFSET, step);
        self.song.borrow_mut().set_byte(offset, transposition);
    }

    /// Change the command in one of the columns
    ///
    /// This fails if the command doesn't exist in the song's format version.
    pub fn set_command(
        &mut self,
        column: Column,
        step: u4,
        command: Option<Command>,
    ) -> Result<(), UnsupportedCommandError> {
        let (commands, _) = column.offsets();
        let offset = self.offset(commands, step);

        let song = self.song.borrow_mut();
        let byte = Command::option_to_byte(command, song.format_version())?;
        song.set_byte(offset, byte);
        Ok(())
    }

    pub fn set_command_value(&mut self, column: Column, step: u4, value: u8) {
        let (_, values) = column.offsets();
        let offset = self.offset(values, step);
        self.song.borrow_mut().set_byte(offset, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty() {
        let song = SongMemory::new();
        let table = song.table(u5::new(0));

        assert!(!table.is_allocated());
        assert_eq!(table.envelope(u4::new(0)), 0);
        assert_eq!(table.command(Column::First, u4::new(0)), None);
        assert_eq!(table.command(Column::Second, u4::new(0)), None);
    }

    #[test]
    fn edit() {
        let mut song = SongMemory::new();

        {
            let mut table = song.table_mut(u5::new(0x1F));
            table.set_allocated(true);
            table.set_envelope(u4::new(1), 0xA3);
            table.set_transposition(u4::new(1), 0xF4);
            table
                .set_command(Column::First, u4::new(1), Some(Command::H))
                .unwrap();
            table.set_command_value(Column::First, u4::new(1), 0x01);
            table
                .set_command(Column::Second, u4::new(15), Some(Command::B))
                .unwrap();
            table.set_command_value(Column::Second, u4::new(15), 0x20);
        }

        let table = song.table(u5::new(0x1F));
        assert!(table.is_allocated());
        assert_eq!(table.envelope(u4::new(1)), 0xA3);
        assert_eq!(table.transposition(u4::new(1)), 0xF4);
        assert_eq!(table.command(Column::First, u4::new(1)), Some(Command::H));
        assert_eq!(table.command_value(Column::First, u4::new(1)), 0x01);
        assert_eq!(table.command(Column::Second, u4::new(1)), None);
        assert_eq!(table.command(Column::Second, u4::new(15)), Some(Command::B));
        assert_eq!(table.command_value(Column::Second, u4::new(15)), 0x20);

        // The second column's last value is the last byte before the second "rb" marker
        assert_eq!(song.as_slice()[0x3E7F], 0x20);
        assert_eq!(song.as_slice()[ALLOCATIONS_OFFSET + 0x1F], 1);
    }

    #[test]
    fn unsupported_command() {
        let mut song = SongMemory::new();
        song.set_format_version(3);

        let mut table = song.table_mut(u5::new(2));
        assert!(
            table
                .set_command(Column::Second, u4::new(0), Some(Command::B))
                .is_err()
        );
        assert_eq!(table.command(Column::Second, u4::new(0)), None);
    }
}
