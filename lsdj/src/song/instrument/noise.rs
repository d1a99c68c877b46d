use super::{Adsr, Instrument, length_from_byte, length_to_byte};
use crate::song::SongMemory;
use std::{
    borrow::{Borrow, BorrowMut},
    ops::{Deref, DerefMut},
};

const ENVELOPE_BYTE: usize = 1;
const S_COMMAND_BYTE: usize = 2;
const LENGTH_BYTE: usize = 3;
const SHAPE_BYTE: usize = 4;

/// How the `S` command behaves on a noise instrument
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SCommand {
    Free,
    Stable,
}

/// A noise instrument
#[derive(Debug)]
pub struct Noise<S>(pub(super) Instrument<S>);

impl<S> Noise<S>
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

    pub fn s_command(&self) -> SCommand {
        if self.bit(S_COMMAND_BYTE, 0) {
            SCommand::Stable
        } else {
            SCommand::Free
        }
    }

    /// The length of the sound, or [`None`] if it plays until the next note
    pub fn length(&self) -> Option<u8> {
        length_from_byte(self.byte(LENGTH_BYTE))
    }

    /// The shape of the noise
    pub fn shape(&self) -> u8 {
        self.byte(SHAPE_BYTE)
    }
}

impl<S> Noise<S>
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

    pub fn set_s_command(&mut self, command: SCommand) {
        self.set_bit(S_COMMAND_BYTE, 0, command == SCommand::Stable);
    }

    /// Change the length of the sound (up to `0x3F`), or make it unlimited with [`None`]
    pub fn set_length(&mut self, length: Option<u8>) {
        self.set_byte(LENGTH_BYTE, length_to_byte(length));
    }

    pub fn set_shape(&mut self, shape: u8) {
        self.set_byte(SHAPE_BYTE, shape);
    }
}

impl<S> Deref for Noise<S> {
    type Target = Instrument<S>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S> DerefMut for Noise<S> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}
