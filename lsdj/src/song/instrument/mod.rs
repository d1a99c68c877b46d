//! Instruments: pulse, wave, kit and noise
//!
//! Every instrument takes up a 16-byte record, the meaning of which depends on the kind of
//! instrument (stored in byte 0). [`Instrument`] gives access to the fields all kinds share,
//! while [`Instrument::variant()`] turns it into a view with the kind-specific fields.

mod adsr;
mod kit;
mod noise;
mod pulse;
mod vibrato;
mod wave;

pub use adsr::{ADSR_FORMAT_VERSION, Adsr, attack_speed_field};
pub use kit::{Kit, KitDistortion, KitLoop};
pub use noise::{Noise, SCommand};
pub use pulse::{Pulse, PulseWidth};
pub use vibrato::{PlvSpeed, VibratoDirection, VibratoShape, vibrato_from_byte, vibrato_to_byte};
pub use wave::{
    PlaybackMode, Wave, playback_mode_field, wave_length_field, wave_loop_pos_field,
    wave_repeat_field, wave_speed_field, wave_synth_field,
};

use super::SongMemory;
use crate::name::Name;
use std::{
    borrow::{Borrow, BorrowMut},
    ops::Range,
};
use ux::{u5, u6};

const PARAMS_OFFSET: usize = 0x3080;
const NAMES_OFFSET: usize = 0x1E7A;
const ALLOCATIONS_OFFSET: usize = 0x2040;

/// The number of bytes in a single instrument record
pub const RECORD_LEN: usize = 16;

/// The number of characters in an instrument name
pub const NAME_LEN: usize = 5;

const TABLE_BYTE: usize = 6;
const TABLE_ENABLED_BIT: u8 = 5;
const PANNING_BYTE: usize = 7;
const AUTOMATE_BYTE: usize = 5;
const AUTOMATE_BIT: u8 = 3;
const COMMAND_RATE_BYTE: usize = 8;

/// The kinds of instrument LSDJ supports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstrumentKind {
    Pulse,
    Wave,
    Kit,
    Noise,
}

impl InstrumentKind {
    /// Decode the kind byte of an instrument record
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Self::Pulse),
            1 => Some(Self::Wave),
            2 => Some(Self::Kit),
            3 => Some(Self::Noise),
            _ => None,
        }
    }

    /// The kind byte of an instrument record
    pub fn to_byte(self) -> u8 {
        match self {
            Self::Pulse => 0,
            Self::Wave => 1,
            Self::Kit => 2,
            Self::Noise => 3,
        }
    }

    /// The record LSDJ creates for a fresh instrument of this kind
    pub fn default_record(self) -> [u8; RECORD_LEN] {
        match self {
            Self::Pulse => [
                0, 0xA8, 0, 0, 0xFF, 0, 0, 3, 0, 0, 0xD0, 0, 0, 0, 0xF3, 0,
            ],
            Self::Wave => [1, 3, 0, 0, 0xFF, 0, 0, 3, 0, 0, 0, 0, 0, 0, 0, 0],
            Self::Kit => [2, 3, 0, 0, 0xFF, 0, 0, 3, 0, 0, 0xD0, 0, 0, 0, 0xF3, 0],
            Self::Noise => [
                3, 0xA8, 0, 0, 0xFF, 0, 0, 3, 0, 0, 0xD0, 0, 0, 0, 0xF3, 0,
            ],
        }
    }
}

/// Stereo panning of an instrument
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Panning {
    None,
    Right,
    Left,
    LeftRight,
}

impl Panning {
    fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0 => Self::None,
            1 => Self::Right,
            2 => Self::Left,
            _ => Self::LeftRight,
        }
    }

    fn to_bits(self) -> u8 {
        match self {
            Self::None => 0,
            Self::Right => 1,
            Self::Left => 2,
            Self::LeftRight => 3,
        }
    }
}

/// A view onto a single instrument in a song
///
/// Obtain one through [`SongMemory::instrument()`] or [`SongMemory::instrument_mut()`].
#[derive(Debug)]
pub struct Instrument<S> {
    song: S,
    index: u6,
}

/// An [`Instrument`] view resolved to its kind
#[derive(Debug)]
pub enum InstrumentVariant<S> {
    Pulse(Pulse<S>),
    Wave(Wave<S>),
    Kit(Kit<S>),
    Noise(Noise<S>),
}

impl SongMemory {
    /// The number of instruments in a song
    pub const INSTRUMENT_COUNT: usize = 0x40;

    /// Access an instrument
    pub fn instrument(&self, index: u6) -> Instrument<&Self> {
        Instrument { song: self, index }
    }

    /// Access an instrument for modification
    pub fn instrument_mut(&mut self, index: u6) -> Instrument<&mut Self> {
        Instrument { song: self, index }
    }
}

impl<S> Instrument<S>
where
    S: Borrow<SongMemory>,
{
    /// The index of this instrument in the song
    pub fn index(&self) -> u6 {
        self.index
    }

    /// The raw 16-byte record
    pub fn bytes(&self) -> &[u8] {
        &self.song.borrow().as_slice()[self.record_range()]
    }

    /// The kind of instrument, or [`None`] if the kind byte isn't recognized
    pub fn kind(&self) -> Option<InstrumentKind> {
        InstrumentKind::from_byte(self.byte(0))
    }

    /// Resolve the view to one that exposes the kind-specific fields
    pub fn variant(self) -> Option<InstrumentVariant<S>> {
        let variant = match self.kind()? {
            InstrumentKind::Pulse => InstrumentVariant::Pulse(Pulse(self)),
            InstrumentKind::Wave => InstrumentVariant::Wave(Wave(self)),
            InstrumentKind::Kit => InstrumentVariant::Kit(Kit(self)),
            InstrumentKind::Noise => InstrumentVariant::Noise(Noise(self)),
        };

        Some(variant)
    }

    /// Is this instrument in use?
    pub fn is_allocated(&self) -> bool {
        self.song.borrow().byte(self.allocation_offset()) != 0
    }

    /// The name of the instrument
    pub fn name(&self) -> Name<NAME_LEN> {
        let offset = self.name_offset();
        let bytes = &self.song.borrow().as_slice()[offset..offset + NAME_LEN];

        // The slice is exactly NAME_LEN long, so this can't be too long
        Name::from_bytes(bytes).unwrap_or_default()
    }

    /// Stereo panning
    pub fn panning(&self) -> Panning {
        Panning::from_bits(self.bits(PANNING_BYTE, 0, 2))
    }

    /// The table linked to this instrument, if any
    pub fn table(&self) -> Option<u5> {
        if self.bit(TABLE_BYTE, TABLE_ENABLED_BIT) {
            Some(u5::new(self.bits(TABLE_BYTE, 0, 5)))
        } else {
            None
        }
    }

    /// Does the linked table step along with the notes (instead of running freely)?
    pub fn automate(&self) -> bool {
        self.bit(AUTOMATE_BYTE, AUTOMATE_BIT)
    }

    /// The rate at which table and phrase commands are applied
    pub fn command_rate(&self) -> u8 {
        self.byte(COMMAND_RATE_BYTE)
    }

    fn record_range(&self) -> Range<usize> {
        let offset = PARAMS_OFFSET + u8::from(self.index) as usize * RECORD_LEN;
        offset..offset + RECORD_LEN
    }

    fn name_offset(&self) -> usize {
        NAMES_OFFSET + u8::from(self.index) as usize * NAME_LEN
    }

    fn allocation_offset(&self) -> usize {
        ALLOCATIONS_OFFSET + u8::from(self.index) as usize
    }

    fn field(&self, field: Field) -> u8 {
        field.decode(self.bits(field.byte, field.bit, field.width))
    }

    fn drum_mode(&self) -> bool {
        drum_mode_field(self.format_version()).is_some_and(|field| self.field(field) != 0)
    }

    fn transpose(&self) -> bool {
        transpose_field(self.format_version()).is_some_and(|field| self.field(field) != 0)
    }

    fn format_version(&self) -> u8 {
        self.song.borrow().format_version()
    }

    fn byte(&self, byte: usize) -> u8 {
        self.song.borrow().byte(self.record_range().start + byte)
    }

    fn bits(&self, byte: usize, bit: u8, width: u8) -> u8 {
        self.song
            .borrow()
            .bits(self.record_range().start + byte, bit, width)
    }

    fn bit(&self, byte: usize, bit: u8) -> bool {
        self.song.borrow().bit(self.record_range().start + byte, bit)
    }
}

impl<S> Instrument<S>
where
    S: BorrowMut<SongMemory>,
{
    /// Mark the instrument as (not) in use
    pub fn set_allocated(&mut self, allocated: bool) {
        let offset = self.allocation_offset();
        self.song.borrow_mut().set_byte(offset, allocated as u8);
    }

    /// Change the kind of instrument
    ///
    /// This resets the whole record to LSDJ's defaults for that kind. The name is kept.
    pub fn set_kind(&mut self, kind: InstrumentKind) {
        let range = self.record_range();
        self.song.borrow_mut().as_mut_slice()[range].copy_from_slice(&kind.default_record());
    }

    /// Change the name of the instrument
    pub fn set_name(&mut self, name: &Name<NAME_LEN>) {
        let offset = self.name_offset();
        self.song.borrow_mut().as_mut_slice()[offset..offset + NAME_LEN]
            .copy_from_slice(name.bytes());
    }

    /// Change the stereo panning
    pub fn set_panning(&mut self, panning: Panning) {
        self.set_bits(PANNING_BYTE, 0, 2, panning.to_bits());
    }

    /// Link a table to this instrument, or unlink it with [`None`]
    pub fn set_table(&mut self, table: Option<u5>) {
        match table {
            Some(table) => {
                self.set_bits(TABLE_BYTE, 0, 5, u8::from(table));
                self.set_bit(TABLE_BYTE, TABLE_ENABLED_BIT, true);
            }
            None => self.set_byte(TABLE_BYTE, 0),
        }
    }

    /// Change whether the linked table steps along with the notes
    pub fn set_automate(&mut self, automate: bool) {
        self.set_bit(AUTOMATE_BYTE, AUTOMATE_BIT, automate);
    }

    pub fn set_command_rate(&mut self, rate: u8) {
        self.set_byte(COMMAND_RATE_BYTE, rate);
    }

    fn set_field(&mut self, field: Field, value: u8) {
        self.set_bits(field.byte, field.bit, field.width, field.encode(value));
    }

    fn set_drum_mode(&mut self, enabled: bool) {
        if let Some(field) = drum_mode_field(self.format_version()) {
            self.set_field(field, enabled as u8);
        }
    }

    fn set_transpose(&mut self, enabled: bool) {
        if let Some(field) = transpose_field(self.format_version()) {
            self.set_field(field, enabled as u8);
        }
    }

    fn set_byte(&mut self, byte: usize, value: u8) {
        let offset = self.record_range().start + byte;
        self.song.borrow_mut().set_byte(offset, value);
    }

    fn set_bits(&mut self, byte: usize, bit: u8, width: u8, value: u8) {
        let offset = self.record_range().start + byte;
        self.song.borrow_mut().set_bits(offset, bit, width, value);
    }

    fn set_bit(&mut self, byte: usize, bit: u8, value: bool) {
        let offset = self.record_range().start + byte;
        self.song.borrow_mut().set_bit(offset, bit, value);
    }
}

/// The location and storage of an instrument field whose layout depends on the format version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    /// The byte inside the 16-byte record
    pub byte: usize,

    /// The least significant bit of the field
    pub bit: u8,

    /// The number of bits
    pub width: u8,

    /// How the value is transformed before being stored
    pub encoding: Encoding,
}

/// The transform between a field's value and its stored bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// Stored as-is
    Raw,

    /// Stored as the maximum value minus the value
    Inverted,

    /// Stored as the value minus an offset
    Offset(u8),
}

impl Field {
    const fn new(byte: usize, bit: u8, width: u8, encoding: Encoding) -> Self {
        Self {
            byte,
            bit,
            width,
            encoding,
        }
    }

    /// Turn the stored bits into a value
    pub fn decode(&self, raw: u8) -> u8 {
        match self.encoding {
            Encoding::Raw => raw,
            Encoding::Inverted => self.max() - raw,
            Encoding::Offset(offset) => raw.wrapping_add(offset),
        }
    }

    /// Turn a value into the bits to store
    pub fn encode(&self, value: u8) -> u8 {
        let raw = match self.encoding {
            Encoding::Raw => value,
            Encoding::Inverted => self.max() - (value & self.max()),
            Encoding::Offset(offset) => value.wrapping_sub(offset),
        };

        raw & self.max()
    }

    fn max(&self) -> u8 {
        ((1_u16 << self.width) - 1) as u8
    }
}

/// Drum mode only exists from format version 3 onwards
pub fn drum_mode_field(format_version: u8) -> Option<Field> {
    (format_version >= 3).then_some(Field::new(5, 6, 1, Encoding::Raw))
}

/// Transpose only exists from format version 3 onwards, where a cleared bit means "on"
pub fn transpose_field(format_version: u8) -> Option<Field> {
    (format_version >= 3).then_some(Field::new(5, 5, 1, Encoding::Inverted))
}

/// Length of a pulse or noise sound: stored inverted in 6 bits, with bit 6 meaning "limited"
fn length_from_byte(byte: u8) -> Option<u8> {
    if byte & 0x40 != 0 {
        Some(!byte & 0x3F)
    } else {
        None
    }
}

fn length_to_byte(length: Option<u8>) -> u8 {
    match length {
        Some(length) => (!length & 0x3F) | 0x40,
        None => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn pulse_song() -> SongMemory {
        let mut song = SongMemory::new();
        song.instrument_mut(u6::new(2))
            .set_kind(InstrumentKind::Pulse);
        song
    }

    #[test]
    fn shared_fields() {
        let mut song = pulse_song();

        {
            let mut instrument = song.instrument_mut(u6::new(2));
            instrument.set_allocated(true);
            instrument.set_panning(Panning::Left);
            instrument.set_table(Some(u5::new(0x1F)));
            instrument.set_automate(true);
            instrument.set_command_rate(0x21);
            instrument.set_name(&Name::from_str("LEAD").unwrap());
        }

        let instrument = song.instrument(u6::new(2));
        assert!(instrument.is_allocated());
        assert_eq!(instrument.kind(), Some(InstrumentKind::Pulse));
        assert_eq!(instrument.panning(), Panning::Left);
        assert_eq!(instrument.table(), Some(u5::new(0x1F)));
        assert!(instrument.automate());
        assert_eq!(instrument.command_rate(), 0x21);
        assert_eq!(instrument.name().as_str(), "LEAD");

        assert_eq!(instrument.bytes()[TABLE_BYTE], 0x3F);
        assert_eq!(instrument.bytes()[PANNING_BYTE], 0x02);
        assert_eq!(instrument.bytes()[COMMAND_RATE_BYTE], 0x21);

        song.instrument_mut(u6::new(2)).set_table(None);
        assert_eq!(song.instrument(u6::new(2)).table(), None);

        // The neighbouring records are untouched
        assert!(song.instrument(u6::new(1)).bytes().iter().all(|b| *b == 0));
        assert!(song.instrument(u6::new(3)).bytes().iter().all(|b| *b == 0));
    }

    #[test]
    fn set_kind_resets_record_keeps_name() {
        let mut song = pulse_song();
        let name = Name::from_str("KICK").unwrap();

        {
            let mut instrument = song.instrument_mut(u6::new(2));
            instrument.set_name(&name);
            instrument.set_panning(Panning::None);
            instrument.set_kind(InstrumentKind::Kit);
        }

        let instrument = song.instrument(u6::new(2));
        assert_eq!(instrument.bytes(), &InstrumentKind::Kit.default_record());
        assert_eq!(instrument.panning(), Panning::LeftRight);
        assert_eq!(instrument.name(), name);
        assert!(matches!(
            instrument.variant(),
            Some(InstrumentVariant::Kit(_))
        ));
    }

    #[test]
    fn unknown_kind() {
        let mut song = SongMemory::new();
        song.instrument_mut(u6::new(0)).set_byte(0, 7);

        assert_eq!(song.instrument(u6::new(0)).kind(), None);
        assert!(song.instrument(u6::new(0)).variant().is_none());
    }

    #[test]
    fn fields() {
        let inverted = Field::new(10, 0, 4, Encoding::Inverted);
        assert_eq!(inverted.decode(0x0), 0xF);
        assert_eq!(inverted.encode(0x3), 0xC);

        let offset = Field::new(11, 0, 8, Encoding::Offset(4));
        assert_eq!(offset.decode(0), 4);
        assert_eq!(offset.encode(5), 1);

        assert_eq!(drum_mode_field(2), None);
        assert!(drum_mode_field(3).is_some());
    }

    #[test]
    fn drum_mode_and_transpose() {
        let mut song = pulse_song();
        let mut instrument = song.instrument_mut(u6::new(2));

        // Default pulse records have transpose on and drum mode off
        assert!(instrument.transpose());
        assert!(!instrument.drum_mode());

        instrument.set_transpose(false);
        instrument.set_drum_mode(true);
        assert_eq!(instrument.bytes()[5], 0b0110_0000);
        assert!(!instrument.transpose());
        assert!(instrument.drum_mode());

        instrument.song.set_format_version(2);
        assert!(!instrument.transpose());
        assert!(!instrument.drum_mode());

        instrument.set_drum_mode(false);
        assert_eq!(instrument.bytes()[5], 0b0110_0000);
    }

    #[test]
    fn length() {
        assert_eq!(length_from_byte(0), None);
        assert_eq!(length_from_byte(0x40), Some(0x3F));
        assert_eq!(length_from_byte(0x7F), Some(0));

        for length in 0..0x40 {
            assert_eq!(length_from_byte(length_to_byte(Some(length))), Some(length));
        }
        assert_eq!(length_to_byte(None), 0);
    }
}
