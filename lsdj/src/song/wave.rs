//! Wavetable frames, as played by wave instruments and generated by the synths

use super::SongMemory;
use std::borrow::{Borrow, BorrowMut};
use ux::u4;

const FRAMES_OFFSET: usize = 0x6000;

/// The number of bytes in a single wave frame
pub const FRAME_LEN: usize = 16;

/// The number of values in a frame
pub const VALUE_COUNT: usize = FRAME_LEN * 2;

/// The number of frames belonging to each synth
pub const FRAMES_PER_SYNTH: usize = 16;

/// The frame LSDJ fills unused wave memory with (and compression knows a shorthand for)
pub const DEFAULT_WAVE: [u8; FRAME_LEN] = [
    0x8E, 0xCD, 0xCC, 0xBB, 0xAA, 0xA9, 0x99, 0x88, 0x87, 0x76, 0x66, 0x55, 0x54, 0x43, 0x32, 0x31,
];

/// A frame that produces no sound
pub const SILENT_WAVE: [u8; FRAME_LEN] = [0x88; FRAME_LEN];

/// A single value in a wavetable frame
///
/// Wavetable values are 4-bit integers, where:
///  - 0b0000 means full negative
///  - 0b1000 (8) is equilibrium (no amplitude).
///  - 0b1111 means full positive
///
/// This means the positive side has 1 value less available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WaveValue(u4);

impl WaveValue {
    /// The minimum wave value
    pub const MIN: Self = Self(u4::new(0x0));

    /// The wave value representing silence (no amplitude)
    pub const SILENCE: Self = Self(u4::new(0x8));

    /// The maximum wave value
    pub const MAX: Self = Self(u4::new(0xF));

    pub const fn new(value: u4) -> Self {
        Self(value)
    }

    pub fn value(self) -> u4 {
        self.0
    }
}

/// A view onto a single wave frame in a song
///
/// Each frame consists of 32 4-bit values, packed two per byte (high nibble first).
#[derive(Debug)]
pub struct WaveFrame<S> {
    song: S,
    index: u8,
}

impl SongMemory {
    /// The number of wave frames in a song
    pub const WAVE_COUNT: usize = 0x100;

    /// Access a wave frame
    pub fn wave(&self, index: u8) -> WaveFrame<&Self> {
        WaveFrame { song: self, index }
    }

    /// Access a wave frame for modification
    pub fn wave_mut(&mut self, index: u8) -> WaveFrame<&mut Self> {
        WaveFrame { song: self, index }
    }
}

impl<S> WaveFrame<S>
where
    S: Borrow<SongMemory>,
{
    pub fn index(&self) -> u8 {
        self.index
    }

    /// The synth this frame belongs to
    pub fn synth(&self) -> u4 {
        u4::new(self.index / FRAMES_PER_SYNTH as u8)
    }

    /// The packed bytes of the frame
    pub fn bytes(&self) -> &[u8; FRAME_LEN] {
        let offset = self.offset();
        let bytes = &self.song.borrow().as_slice()[offset..offset + FRAME_LEN];

        bytes.try_into().unwrap_or(&SILENT_WAVE)
    }

    /// The 32 unpacked values of the frame
    pub fn values(&self) -> [WaveValue; VALUE_COUNT] {
        let bytes = self.bytes();
        std::array::from_fn(|index| {
            let byte = bytes[index / 2];
            let nibble = if index % 2 == 0 { byte >> 4 } else { byte & 0xF };
            WaveValue(u4::new(nibble))
        })
    }

    /// Does this frame still hold the default wave?
    ///
    /// Wavetable importers use this to avoid overwriting frames somebody drew by hand.
    pub fn is_default(&self) -> bool {
        *self.bytes() == DEFAULT_WAVE
    }

    /// Is this frame flat, producing no sound?
    pub fn is_silent(&self) -> bool {
        *self.bytes() == SILENT_WAVE
    }

    fn offset(&self) -> usize {
        FRAMES_OFFSET + self.index as usize * FRAME_LEN
    }
}

impl<S> WaveFrame<S>
where
    S: BorrowMut<SongMemory>,
{
    /// Overwrite the packed bytes of the frame
    ///
    /// This marks the owning synth's waves as overwritten, so that LSDJ won't regenerate
    /// them from the synth parameters.
    pub fn set_bytes(&mut self, bytes: &[u8; FRAME_LEN]) {
        let offset = self.offset();
        let synth = self.synth();

        let song = self.song.borrow_mut();
        song.as_mut_slice()[offset..offset + FRAME_LEN].copy_from_slice(bytes);
        song.synth_mut(synth).set_overwritten(true);
    }

    /// Overwrite the frame from 32 unpacked values
    pub fn set_values(&mut self, values: &[WaveValue; VALUE_COUNT]) {
        let bytes = std::array::from_fn(|index| {
            (u8::from(values[index * 2].0) << 4) | u8::from(values[index * 2 + 1].0)
        });

        self.set_bytes(&bytes);
    }
}
