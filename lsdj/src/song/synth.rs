//! Soft synths, which generate the wave frames used by wave instruments

use super::{
    SongMemory,
    wave::{FRAMES_PER_SYNTH, WaveFrame},
};
use std::{
    borrow::{Borrow, BorrowMut},
    ops::RangeInclusive,
};
use ux::u4;

const PARAMS_OFFSET: usize = 0x3EB2;
const PARAMS_LEN: usize = 16;
const OVERWRITTEN_OFFSET: usize = 0x3FC4;

const WAVEFORM_BYTE: usize = 0;
const FILTER_BYTE: usize = 1;
const RESONANCE_BYTE: usize = 2;
const DISTORTION_BYTE: usize = 3;
const PHASE_TYPE_BYTE: usize = 4;
const LIMIT_BYTE: usize = 13;

/// The first format version that stores a separate resonance end value
const RESONANCE_END_VERSION: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Waveform {
    Sawtooth,
    Square,
    Triangle,
    Unknown(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Filter {
    LowPass,
    HighPass,
    BandPass,
    AllPass,
    Unknown(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Distortion {
    Clip,
    Wrap,
    Fold,
    Unknown(u8),
}

/// How the phase of the waveform is compressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhaseType {
    Normal,
    Resync,
    Resync2,
    Unknown(u8),
}

/// A parameter that sweeps from a start value to an end value over the synth's frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sweep {
    Volume,
    Cutoff,
    Phase,
    VShift,
}

impl Sweep {
    fn start_byte(self) -> usize {
        match self {
            Self::Volume => 5,
            Self::Cutoff => 6,
            Self::Phase => 7,
            Self::VShift => 8,
        }
    }

    fn end_byte(self) -> usize {
        self.start_byte() + 4
    }
}

macro_rules! byte_enum {
    ($name:ident { $($variant:ident = $value:literal),* $(,)? }) => {
        impl $name {
            fn from_byte(byte: u8) -> Self {
                match byte {
                    $($value => Self::$variant,)*
                    byte => Self::Unknown(byte),
                }
            }

            fn to_byte(self) -> u8 {
                match self {
                    $(Self::$variant => $value,)*
                    Self::Unknown(byte) => byte,
                }
            }
        }
    };
}

byte_enum!(Waveform { Sawtooth = 0, Square = 1, Triangle = 2 });
byte_enum!(Filter { LowPass = 0, HighPass = 1, BandPass = 2, AllPass = 3 });
byte_enum!(Distortion { Clip = 0, Wrap = 1, Fold = 2 });
byte_enum!(PhaseType { Normal = 0, Resync = 1, Resync2 = 2 });

/// A view onto one of the 16 soft synths in a song
#[derive(Debug)]
pub struct Synth<S> {
    song: S,
    index: u4,
}

impl SongMemory {
    /// The number of synths in a song
    pub const SYNTH_COUNT: usize = 16;

    pub fn synth(&self, index: u4) -> Synth<&Self> {
        Synth { song: self, index }
    }

    pub fn synth_mut(&mut self, index: u4) -> Synth<&mut Self> {
        Synth { song: self, index }
    }
}

impl<S> Synth<S>
where
    S: Borrow<SongMemory>,
{
    pub fn index(&self) -> u4 {
        self.index
    }

    pub fn waveform(&self) -> Waveform {
        Waveform::from_byte(self.byte(WAVEFORM_BYTE))
    }

    pub fn filter(&self) -> Filter {
        Filter::from_byte(self.byte(FILTER_BYTE))
    }

    pub fn distortion(&self) -> Distortion {
        Distortion::from_byte(self.byte(DISTORTION_BYTE))
    }

    pub fn phase_type(&self) -> PhaseType {
        PhaseType::from_byte(self.byte(PHASE_TYPE_BYTE))
    }

    /// The filter resonance on the first frame
    pub fn resonance_start(&self) -> u4 {
        let bit = if self.song.borrow().format_version() >= RESONANCE_END_VERSION {
            4
        } else {
            0
        };

        u4::new(self.song.borrow().bits(self.offset(RESONANCE_BYTE), bit, 4))
    }

    /// The filter resonance on the last frame, or [`None`] for format versions that have a
    /// single resonance value
    pub fn resonance_end(&self) -> Option<u4> {
        let song = self.song.borrow();
        (song.format_version() >= RESONANCE_END_VERSION)
            .then(|| u4::new(song.bits(self.offset(RESONANCE_BYTE), 0, 4)))
    }

    /// The value of a sweeping parameter on the first frame
    pub fn start(&self, sweep: Sweep) -> u8 {
        self.byte(sweep.start_byte())
    }

    /// The value of a sweeping parameter on the last frame
    pub fn end(&self, sweep: Sweep) -> u8 {
        self.byte(sweep.end_byte())
    }

    /// The amplitude limit on the first frame
    pub fn limit_start(&self) -> u4 {
        let raw = self.song.borrow().bits(self.offset(LIMIT_BYTE), 4, 4);
        u4::new(0xF - raw)
    }

    /// The amplitude limit on the last frame
    pub fn limit_end(&self) -> u4 {
        let raw = self.song.borrow().bits(self.offset(LIMIT_BYTE), 0, 4);
        u4::new(0xF - raw)
    }

    /// Have this synth's wave frames been edited by hand (instead of generated)?
    pub fn is_overwritten(&self) -> bool {
        let (offset, bit) = self.overwritten_bit();
        self.song.borrow().bit(offset, bit)
    }

    /// The raw 16 parameter bytes
    pub fn bytes(&self) -> &[u8] {
        let offset = self.offset(0);
        &self.song.borrow().as_slice()[offset..offset + PARAMS_LEN]
    }

    /// The indices of the wave frames generated by this synth
    pub fn wave_indices(&self) -> RangeInclusive<u8> {
        let first = u8::from(self.index) * FRAMES_PER_SYNTH as u8;
        first..=first + (FRAMES_PER_SYNTH as u8 - 1)
    }

    /// Access one of the wave frames generated by this synth
    pub fn wave(&self, frame: u4) -> WaveFrame<&SongMemory> {
        self.song.borrow().wave(self.wave_index(frame))
    }

    fn wave_index(&self, frame: u4) -> u8 {
        u8::from(self.index) * FRAMES_PER_SYNTH as u8 + u8::from(frame)
    }

    fn byte(&self, byte: usize) -> u8 {
        self.song.borrow().byte(self.offset(byte))
    }

    fn offset(&self, byte: usize) -> usize {
        PARAMS_OFFSET + u8::from(self.index) as usize * PARAMS_LEN + byte
    }

    fn overwritten_bit(&self) -> (usize, u8) {
        // Synths 8-15 are flagged in the first byte, 0-7 in the second
        let index = u8::from(self.index);
        (OVERWRITTEN_OFFSET + 1 - (index / 8) as usize, index % 8)
    }
}

impl<S> Synth<S>
where
    S: BorrowMut<SongMemory>,
{
    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.set_byte(WAVEFORM_BYTE, waveform.to_byte());
    }

    pub fn set_filter(&mut self, filter: Filter) {
        self.set_byte(FILTER_BYTE, filter.to_byte());
    }

    pub fn set_distortion(&mut self, distortion: Distortion) {
        self.set_byte(DISTORTION_BYTE, distortion.to_byte());
    }

    pub fn set_phase_type(&mut self, phase_type: PhaseType) {
        self.set_byte(PHASE_TYPE_BYTE, phase_type.to_byte());
    }

    /// Change the filter resonance on the first frame
    ///
    /// Before format version 5 this is the only resonance value.
    pub fn set_resonance_start(&mut self, resonance: u4) {
        let offset = self.offset(RESONANCE_BYTE);
        let song = self.song.borrow_mut();

        if song.format_version() >= RESONANCE_END_VERSION {
            song.set_bits(offset, 4, 4, u8::from(resonance));
        } else {
            song.set_byte(offset, u8::from(resonance));
        }
    }

    /// Change the filter resonance on the last frame
    ///
    /// Returns `false` (and changes nothing) for format versions without a separate end value.
    pub fn set_resonance_end(&mut self, resonance: u4) -> bool {
        let offset = self.offset(RESONANCE_BYTE);
        let song = self.song.borrow_mut();

        if song.format_version() >= RESONANCE_END_VERSION {
            song.set_bits(offset, 0, 4, u8::from(resonance));
            true
        } else {
            false
        }
    }

    pub fn set_start(&mut self, sweep: Sweep, value: u8) {
        self.set_byte(sweep.start_byte(), value);
    }

    pub fn set_end(&mut self, sweep: Sweep, value: u8) {
        self.set_byte(sweep.end_byte(), value);
    }

    pub fn set_limit_start(&mut self, limit: u4) {
        let offset = self.offset(LIMIT_BYTE);
        self.song
            .borrow_mut()
            .set_bits(offset, 4, 4, 0xF - u8::from(limit));
    }

    pub fn set_limit_end(&mut self, limit: u4) {
        let offset = self.offset(LIMIT_BYTE);
        self.song
            .borrow_mut()
            .set_bits(offset, 0, 4, 0xF - u8::from(limit));
    }

    /// Mark this synth's wave frames as edited by hand (or not)
    pub fn set_overwritten(&mut self, overwritten: bool) {
        let (offset, bit) = self.overwritten_bit();
        self.song.borrow_mut().set_bit(offset, bit, overwritten);
    }

    /// Access one of the wave frames generated by this synth, for modification
    pub fn wave_mut(&mut self, frame: u4) -> WaveFrame<&mut SongMemory> {
        let index = self.wave_index(frame);
        self.song.borrow_mut().wave_mut(index)
    }

    fn set_byte(&mut self, byte: usize, value: u8) {
        let offset = self.offset(byte);
        self.song.borrow_mut().set_byte(offset, value);
    }
}
