use super::{Encoding, Field, Instrument};
use crate::song::SongMemory;
use std::borrow::{Borrow, BorrowMut};
use ux::{u3, u4};

/// The first format version with ADSR envelopes on pulse and noise instruments
pub const ADSR_FORMAT_VERSION: u8 = 11;

const INITIAL_LEVEL: Field = Field::new(1, 4, 4, Encoding::Raw);
const ATTACK_LEVEL: Field = Field::new(9, 4, 4, Encoding::Raw);
const DECAY_SPEED: Field = Field::new(9, 0, 3, Encoding::Raw);
const SUSTAIN_LEVEL: Field = Field::new(10, 4, 4, Encoding::Raw);
const RELEASE_SPEED: Field = Field::new(10, 0, 3, Encoding::Raw);

/// An attack-decay-sustain-release volume envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Adsr {
    pub initial_level: u4,
    pub attack_speed: u4,
    pub attack_level: u4,
    pub decay_speed: u3,
    pub sustain_level: u4,
    pub release_speed: u3,
}

/// Where the attack speed lives, per format version
///
/// It takes up the lower three bits of the envelope byte, and the fourth from version 13 on.
pub fn attack_speed_field(format_version: u8) -> Field {
    match format_version {
        13.. => Field::new(1, 0, 4, Encoding::Raw),
        _ => Field::new(1, 0, 3, Encoding::Raw),
    }
}

impl<S> Instrument<S>
where
    S: Borrow<SongMemory>,
{
    pub(super) fn adsr(&self) -> Option<Adsr> {
        let version = self.format_version();
        if version < ADSR_FORMAT_VERSION {
            return None;
        }

        Some(Adsr {
            initial_level: u4::new(self.field(INITIAL_LEVEL)),
            attack_speed: u4::new(self.field(attack_speed_field(version))),
            attack_level: u4::new(self.field(ATTACK_LEVEL)),
            decay_speed: u3::new(self.field(DECAY_SPEED)),
            sustain_level: u4::new(self.field(SUSTAIN_LEVEL)),
            release_speed: u3::new(self.field(RELEASE_SPEED)),
        })
    }
}

impl<S> Instrument<S>
where
    S: BorrowMut<SongMemory>,
{
    pub(super) fn set_adsr(&mut self, adsr: Adsr) -> bool {
        let version = self.format_version();
        if version < ADSR_FORMAT_VERSION {
            return false;
        }

        self.set_field(INITIAL_LEVEL, u8::from(adsr.initial_level));
        self.set_field(attack_speed_field(version), u8::from(adsr.attack_speed));
        self.set_field(ATTACK_LEVEL, u8::from(adsr.attack_level));
        self.set_field(DECAY_SPEED, u8::from(adsr.decay_speed));
        self.set_field(SUSTAIN_LEVEL, u8::from(adsr.sustain_level));
        self.set_field(RELEASE_SPEED, u8::from(adsr.release_speed));

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::song::instrument::InstrumentKind;
    use ux::u6;

    fn song(version: u8) -> SongMemory {
        let mut song = SongMemory::new();
        song.set_format_version(version);
        song.instrument_mut(u6::new(1)).set_kind(InstrumentKind::Pulse);
        song
    }

    #[test]
    fn layout() {
        let mut song = song(0x16);
        let mut instrument = song.instrument_mut(u6::new(1));
        instrument.set_byte(1, 0x9B);
        instrument.set_byte(9, 0x7D);
        instrument.set_byte(10, 0x42);

        let adsr = instrument.adsr().unwrap();
        assert_eq!(adsr.initial_level, u4::new(0x9));
        assert_eq!(adsr.attack_speed, u4::new(0xB));
        assert_eq!(adsr.attack_level, u4::new(0x7));
        assert_eq!(adsr.decay_speed, u3::new(0x5));
        assert_eq!(adsr.sustain_level, u4::new(0x4));
        assert_eq!(adsr.release_speed, u3::new(0x2));
    }

    #[test]
    fn attack_speed_gate() {
        let mut song = song(13);
        song.instrument_mut(u6::new(1)).set_byte(1, 0x0B);
        assert_eq!(
            song.instrument(u6::new(1)).adsr().unwrap().attack_speed,
            u4::new(0xB)
        );

        song.set_format_version(12);
        assert_eq!(
            song.instrument(u6::new(1)).adsr().unwrap().attack_speed,
            u4::new(0x3)
        );
    }

    #[test]
    fn unsupported_before_version_11() {
        let mut song = song(10);
        let before = song.instrument(u6::new(1)).bytes().to_vec();

        let mut instrument = song.instrument_mut(u6::new(1));
        assert_eq!(instrument.adsr(), None);

        let adsr = Adsr {
            initial_level: u4::new(1),
            attack_speed: u4::new(2),
            attack_level: u4::new(3),
            decay_speed: u3::new(4),
            sustain_level: u4::new(5),
            release_speed: u3::new(6),
        };
        assert!(!instrument.set_adsr(adsr));
        assert_eq!(instrument.bytes(), before.as_slice());

        song.set_format_version(11);
        let mut instrument = song.instrument_mut(u6::new(1));
        assert!(instrument.set_adsr(adsr));
        assert_eq!(instrument.adsr(), Some(adsr));
        // The fourth attack speed bit only joins in at version 13
        assert_eq!(instrument.bytes()[1], 0x1A);
        assert_eq!(instrument.bytes()[9], 0x34);
        assert_eq!(instrument.bytes()[10], 0x56);
    }
}
