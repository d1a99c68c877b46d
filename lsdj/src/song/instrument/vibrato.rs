use super::{Instrument, InstrumentKind};
use crate::song::SongMemory;
use std::borrow::{Borrow, BorrowMut};

const BYTE: usize = 5;
const DIRECTION_BIT: u8 = 0;
const SHAPE_BIT: u8 = 1;
const TICK_BIT: u8 = 4;
const STEP_BIT: u8 = 7;

/// The first format version that stores the speed and shape as separate bits
const SPLIT_VERSION: u8 = 4;

/// The rate at which pitch, lfo and vibrato effects update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlvSpeed {
    /// Every frame (360 Hz)
    Fast,

    /// Every tick
    Tick,

    /// Every step
    Step,
}

/// The waveform used for vibrato
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VibratoShape {
    Triangle,
    Sawtooth,
    Square,
}

/// The direction vibrato starts in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VibratoDirection {
    Down,
    Up,
}

/// Decode the vibrato speed and shape from byte 5 of an instrument record
pub fn vibrato_from_byte(
    byte: u8,
    format_version: u8,
    kind: InstrumentKind,
) -> (PlvSpeed, VibratoShape) {
    let code = (byte >> SHAPE_BIT) & 0b11;

    if format_version >= SPLIT_VERSION {
        let speed = if byte & (1 << STEP_BIT) != 0 {
            PlvSpeed::Step
        } else if byte & (1 << TICK_BIT) != 0 {
            PlvSpeed::Tick
        } else {
            PlvSpeed::Fast
        };

        let shape = match code {
            0 => VibratoShape::Triangle,
            1 => VibratoShape::Sawtooth,
            _ => VibratoShape::Square,
        };

        return (speed, shape);
    }

    match (kind, code) {
        (InstrumentKind::Kit, 0) => (PlvSpeed::Fast, VibratoShape::Triangle),
        (InstrumentKind::Kit, 1) => (PlvSpeed::Tick, VibratoShape::Triangle),
        (InstrumentKind::Kit, _) => (PlvSpeed::Step, VibratoShape::Triangle),
        (_, 0) => (PlvSpeed::Fast, VibratoShape::Triangle),
        (_, 1) => (PlvSpeed::Tick, VibratoShape::Sawtooth),
        (_, 2) => (PlvSpeed::Tick, VibratoShape::Triangle),
        (_, _) => (PlvSpeed::Tick, VibratoShape::Square),
    }
}

/// Encode the vibrato speed and shape into byte 5 of an instrument record
///
/// Bits that don't belong to the vibrato are kept. Older format versions can't represent
/// every combination, in which case the closest one is stored.
pub fn vibrato_to_byte(
    byte: u8,
    speed: PlvSpeed,
    shape: VibratoShape,
    format_version: u8,
    kind: InstrumentKind,
) -> u8 {
    if format_version >= SPLIT_VERSION {
        let shape = match shape {
            VibratoShape::Triangle => 0,
            VibratoShape::Sawtooth => 1,
            VibratoShape::Square => 2,
        };

        let speed = match speed {
            PlvSpeed::Fast => 0,
            PlvSpeed::Tick => 1 << TICK_BIT,
            PlvSpeed::Step => 1 << STEP_BIT,
        };

        let mask = (1 << STEP_BIT) | (1 << TICK_BIT) | (0b11 << SHAPE_BIT);
        return (byte & !mask) | speed | (shape << SHAPE_BIT);
    }

    let code = match kind {
        InstrumentKind::Kit => match speed {
            PlvSpeed::Fast => 0,
            PlvSpeed::Tick => 1,
            PlvSpeed::Step => 2,
        },
        _ => match shape {
            VibratoShape::Sawtooth => 1,
            VibratoShape::Square => 3,
            VibratoShape::Triangle if speed == PlvSpeed::Fast => 0,
            VibratoShape::Triangle => 2,
        },
    };

    (byte & !(0b11 << SHAPE_BIT)) | (code << SHAPE_BIT)
}

impl<S> Instrument<S>
where
    S: Borrow<SongMemory>,
{
    pub(super) fn vibrato(&self) -> (PlvSpeed, VibratoShape) {
        let kind = self.kind().unwrap_or(InstrumentKind::Pulse);
        vibrato_from_byte(self.byte(BYTE), self.format_version(), kind)
    }

    pub(super) fn vibrato_direction(&self) -> VibratoDirection {
        if self.bit(BYTE, DIRECTION_BIT) {
            VibratoDirection::Up
        } else {
            VibratoDirection::Down
        }
    }
}

impl<S> Instrument<S>
where
    S: BorrowMut<SongMemory>,
{
    pub(super) fn set_vibrato(&mut self, speed: PlvSpeed, shape: VibratoShape) {
        let kind = self.kind().unwrap_or(InstrumentKind::Pulse);
        let byte = vibrato_to_byte(self.byte(BYTE), speed, shape, self.format_version(), kind);
        self.set_byte(BYTE, byte);
    }

    pub(super) fn set_vibrato_direction(&mut self, direction: VibratoDirection) {
        self.set_bit(BYTE, DIRECTION_BIT, direction == VibratoDirection::Up);
    }
}
