use super::{
    Adsr, Instrument, PlvSpeed, VibratoDirection, VibratoShape, length_from_byte, length_to_byte,
};
use crate::song::SongMemory;
use std::{
    borrow::{Borrow, BorrowMut},
    ops::{Deref, DerefMut},
};
use ux::u4;

const ENVELOPE_BYTE: usize = 1;
const PULSE2_TUNE_BYTE: usize = 2;
const LENGTH_BYTE: usize = 3;
const SWEEP_BYTE: usize = 4;
const WIDTH_FINETUNE_BYTE: usize = 7;

/// The duty cycle of a pulse wave
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PulseWidth {
    /// 12.5%
    Eighth,

    /// 25%
    Quarter,

    /// 50%
    Half,

    /// 75%
    ThreeQuarters,
}

/// A pulse instrument
#[derive(Debug)]
pub struct Pulse<S>(pub(super) Instrument<S>);

impl<S> Pulse<S>
where
    S: Borrow<SongMemory>,
{
    /// The volume envelope
    pub fn envelope(&self) -> u8 {
        self.byte(ENVELOPE_BYTE)
    }

    /// The ADSR envelope, or [`None`] before format version 11
    pub fn adsr(&self) -> Option<Adsr> {
        self.0.adsr()
    }

    /// The duty cycle
    pub fn pulse_width(&self) -> PulseWidth {
        match self.bits(WIDTH_FINETUNE_BYTE, 6, 2) {
            0 => PulseWidth::Eighth,
            1 => PulseWidth::Quarter,
            2 => PulseWidth::Half,
            _ => PulseWidth::ThreeQuarters,
        }
    }

    /// Fine-tuning of the pitch
    pub fn finetune(&self) -> u4 {
        u4::new(self.bits(WIDTH_FINETUNE_BYTE, 2, 4))
    }

    /// Detuning of the second pulse channel, when the instrument plays on both
    pub fn pulse2_tune(&self) -> u8 {
        self.byte(PULSE2_TUNE_BYTE)
    }

    /// The length of the sound, or [`None`] if it plays until the next note
    pub fn length(&self) -> Option<u8> {
        length_from_byte(self.byte(LENGTH_BYTE))
    }

    /// The frequency sweep
    pub fn sweep(&self) -> u8 {
        self.byte(SWEEP_BYTE)
    }

    /// Is drum mode on? Always off before format version 3
    pub fn drum_mode(&self) -> bool {
        self.0.drum_mode()
    }

    /// Does the instrument follow transposition? Always off before format version 3
    pub fn transpose(&self) -> bool {
        self.0.transpose()
    }

    pub fn plv_speed(&self) -> PlvSpeed {
        self.vibrato().0
    }

    pub fn vibrato_shape(&self) -> VibratoShape {
        self.vibrato().1
    }

    pub fn vibrato_direction(&self) -> VibratoDirection {
        self.0.vibrato_direction()
    }
}

impl<S> Pulse<S>
where
    S: BorrowMut<SongMemory>,
{
    pub fn set_envelope(&mut self, envelope: u8) {
        self.set_byte(ENVELOPE_BYTE, envelope);
    }

    /// Change the ADSR envelope. Does nothing and returns `false` before format version 11
    pub fn set_adsr(&mut self, adsr: Adsr) -> bool {
        self.0.set_adsr(adsr)
    }

    pub fn set_pulse_width(&mut self, width: PulseWidth) {
        let bits = match width {
            PulseWidth::Eighth => 0,
            PulseWidth::Quarter => 1,
            PulseWidth::Half => 2,
            PulseWidth::ThreeQuarters => 3,
        };

        self.set_bits(WIDTH_FINETUNE_BYTE, 6, 2, bits);
    }

    pub fn set_finetune(&mut self, finetune: u4) {
        self.set_bits(WIDTH_FINETUNE_BYTE, 2, 4, u8::from(finetune));
    }

    pub fn set_pulse2_tune(&mut self, tune: u8) {
        self.set_byte(PULSE2_TUNE_BYTE, tune);
    }

    /// Change the length of the sound (up to `0x3F`), or make it unlimited with [`None`]
    pub fn set_length(&mut self, length: Option<u8>) {
        self.set_byte(LENGTH_BYTE, length_to_byte(length));
    }

    pub fn set_sweep(&mut self, sweep: u8) {
        self.set_byte(SWEEP_BYTE, sweep);
    }

    /// Turn drum mode on or off. Does nothing before format version 3
    pub fn set_drum_mode(&mut self, enabled: bool) {
        self.0.set_drum_mode(enabled);
    }

    /// Turn transposition on or off. Does nothing before format version 3
    pub fn set_transpose(&mut self, enabled: bool) {
        self.0.set_transpose(enabled);
    }

    pub fn set_plv_speed(&mut self, speed: PlvSpeed) {
        let shape = self.vibrato_shape();
        self.set_vibrato(speed, shape);
    }

    pub fn set_vibrato_shape(&mut self, shape: VibratoShape) {
        let speed = self.plv_speed();
        self.set_vibrato(speed, shape);
    }

    pub fn set_vibrato_direction(&mut self, direction: VibratoDirection) {
        self.0.set_vibrato_direction(direction);
    }
}

impl<S> Deref for Pulse<S> {
    type Target = Instrument<S>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S> DerefMut for Pulse<S> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}
