//! Song-wide settings, clocks and flags

use super::SongMemory;
use std::{
    borrow::{Borrow, BorrowMut},
    ops::RangeInclusive,
};
use thiserror::Error;

const WORK_HOURS_OFFSET: usize = 0x3FB2;
const WORK_MINUTES_OFFSET: usize = 0x3FB3;
const TEMPO_OFFSET: usize = 0x3FB4;
const TUNE_OFFSET: usize = 0x3FB5;
const TOTAL_DAYS_OFFSET: usize = 0x3FB6;
const TOTAL_HOURS_OFFSET: usize = 0x3FB7;
const TOTAL_MINUTES_OFFSET: usize = 0x3FB8;
const KEY_DELAY_OFFSET: usize = 0x3FBA;
const KEY_REPEAT_OFFSET: usize = 0x3FBB;
const FONT_OFFSET: usize = 0x3FBC;
const SYNC_OFFSET: usize = 0x3FBD;
const COLOR_SET_OFFSET: usize = 0x3FBE;
const CLONE_OFFSET: usize = 0x3FC0;
const FILE_CHANGED_OFFSET: usize = 0x3FC1;
const POWER_SAVE_OFFSET: usize = 0x3FC2;
const PRELISTEN_OFFSET: usize = 0x3FC3;
const DRUM_MAX_OFFSET: usize = 0x3FD0;

/// Tempo bytes below this value wrap around past 255 BPM
const TEMPO_WRAP: u8 = 40;

/// How LSDJ synchronizes with other devices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncMode {
    None,
    Lsdj,
    Midi,
    Keyboard,
    AnalogIn,
    AnalogOut,
    Unknown(u8),
}

impl SyncMode {
    fn from_byte(byte: u8) -> Self {
        match byte {
            0 => Self::None,
            1 => Self::Lsdj,
            2 => Self::Midi,
            3 => Self::Keyboard,
            4 => Self::AnalogIn,
            5 => Self::AnalogOut,
            byte => Self::Unknown(byte),
        }
    }

    fn to_byte(self) -> u8 {
        match self {
            Self::None => 0,
            Self::Lsdj => 1,
            Self::Midi => 2,
            Self::Keyboard => 3,
            Self::AnalogIn => 4,
            Self::AnalogOut => 5,
            Self::Unknown(byte) => byte,
        }
    }
}

/// What happens when cloning a chain or phrase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CloneMode {
    /// Clone everything it refers to as well
    Deep,

    /// Only clone the chain itself
    Slim,
}

/// Time spent on a song, as shown in LSDJ's project screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct WorkTime {
    pub hours: u8,
    pub minutes: u8,
}

/// Time spent in LSDJ in total
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TotalTime {
    pub days: u8,
    pub hours: u8,
    pub minutes: u8,
}

/// A view onto the settings of a song
#[derive(Debug)]
pub struct Settings<S> {
    song: S,
}

impl SongMemory {
    pub fn settings(&self) -> Settings<&Self> {
        Settings { song: self }
    }

    pub fn settings_mut(&mut self) -> Settings<&mut Self> {
        Settings { song: self }
    }
}

impl<S> Settings<S>
where
    S: Borrow<SongMemory>,
{
    /// The range of tempos (in BPM) LSDJ supports
    pub const TEMPO_RANGE: RangeInclusive<u16> = 40..=295;

    /// The tempo in beats per minute
    pub fn tempo(&self) -> u16 {
        match self.byte(TEMPO_OFFSET) {
            byte if byte < TEMPO_WRAP => byte as u16 + 256,
            byte => byte as u16,
        }
    }

    /// The global transposition, in semitones
    pub fn tune(&self) -> u8 {
        self.byte(TUNE_OFFSET)
    }

    pub fn key_delay(&self) -> u8 {
        self.byte(KEY_DELAY_OFFSET)
    }

    pub fn key_repeat(&self) -> u8 {
        self.byte(KEY_REPEAT_OFFSET)
    }

    pub fn font(&self) -> u8 {
        self.byte(FONT_OFFSET)
    }

    pub fn sync_mode(&self) -> SyncMode {
        SyncMode::from_byte(self.byte(SYNC_OFFSET))
    }

    pub fn color_set(&self) -> u8 {
        self.byte(COLOR_SET_OFFSET)
    }

    pub fn clone_mode(&self) -> CloneMode {
        match self.byte(CLONE_OFFSET) {
            0 => CloneMode::Deep,
            _ => CloneMode::Slim,
        }
    }

    /// Has the song been changed since it was last saved (in LSDJ)?
    pub fn has_changed(&self) -> bool {
        self.byte(FILE_CHANGED_OFFSET) == 1
    }

    pub fn power_save(&self) -> bool {
        self.byte(POWER_SAVE_OFFSET) == 1
    }

    /// Are notes played while entering them?
    pub fn prelisten(&self) -> bool {
        self.byte(PRELISTEN_OFFSET) == 1
    }

    /// Only used by LSDJ versions up to 6.3.3
    pub fn drum_max(&self) -> u8 {
        self.byte(DRUM_MAX_OFFSET)
    }

    pub fn work_time(&self) -> WorkTime {
        WorkTime {
            hours: self.byte(WORK_HOURS_OFFSET),
            minutes: self.byte(WORK_MINUTES_OFFSET),
        }
    }

    pub fn total_time(&self) -> TotalTime {
        TotalTime {
            days: self.byte(TOTAL_DAYS_OFFSET),
            hours: self.byte(TOTAL_HOURS_OFFSET),
            minutes: self.byte(TOTAL_MINUTES_OFFSET),
        }
    }

    fn byte(&self, offset: usize) -> u8 {
        self.song.borrow().byte(offset)
    }
}

impl<S> Settings<S>
where
    S: BorrowMut<SongMemory>,
{
    /// Change the tempo, in beats per minute
    pub fn set_tempo(&mut self, bpm: u16) -> Result<(), TempoOutOfRangeError> {
        if !Self::TEMPO_RANGE.contains(&bpm) {
            return Err(TempoOutOfRangeError { bpm });
        }

        // Wraps 256..=295 to 0..=39
        self.set_byte(TEMPO_OFFSET, bpm as u8);
        Ok(())
    }

    pub fn set_tune(&mut self, semitones: u8) {
        self.set_byte(TUNE_OFFSET, semitones);
    }

    pub fn set_key_delay(&mut self, delay: u8) {
        self.set_byte(KEY_DELAY_OFFSET, delay);
    }

    pub fn set_key_repeat(&mut self, repeat: u8) {
        self.set_byte(KEY_REPEAT_OFFSET, repeat);
    }

    pub fn set_font(&mut self, font: u8) {
        self.set_byte(FONT_OFFSET, font);
    }

    pub fn set_sync_mode(&mut self, mode: SyncMode) {
        self.set_byte(SYNC_OFFSET, mode.to_byte());
    }

    pub fn set_color_set(&mut self, color_set: u8) {
        self.set_byte(COLOR_SET_OFFSET, color_set);
    }

    pub fn set_clone_mode(&mut self, mode: CloneMode) {
        let byte = match mode {
            CloneMode::Deep => 0,
            CloneMode::Slim => 1,
        };

        self.set_byte(CLONE_OFFSET, byte);
    }

    pub fn set_changed(&mut self, changed: bool) {
        self.set_byte(FILE_CHANGED_OFFSET, changed as u8);
    }

    pub fn set_power_save(&mut self, power_save: bool) {
        self.set_byte(POWER_SAVE_OFFSET, power_save as u8);
    }

    pub fn set_prelisten(&mut self, prelisten: bool) {
        self.set_byte(PRELISTEN_OFFSET, prelisten as u8);
    }

    pub fn set_drum_max(&mut self, max: u8) {
        self.set_byte(DRUM_MAX_OFFSET, max);
    }

    pub fn set_work_time(&mut self, time: WorkTime) {
        self.set_byte(WORK_HOURS_OFFSET, time.hours);
        self.set_byte(WORK_MINUTES_OFFSET, time.minutes);
    }

    pub fn set_total_time(&mut self, time: TotalTime) {
        self.set_byte(TOTAL_DAYS_OFFSET, time.days);
        self.set_byte(TOTAL_HOURS_OFFSET, time.hours);
        self.set_byte(TOTAL_MINUTES_OFFSET, time.minutes);
    }

    fn set_byte(&mut self, offset: usize, value: u8) {
        self.song.borrow_mut().set_byte(offset, value);
    }
}

/// A tempo LSDJ can't represent
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Tempo {bpm} is outside of the supported 40-295 BPM range")]
pub struct TempoOutOfRangeError {
    pub bpm: u16,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factory() {
        let song = SongMemory::new();
        let settings = song.settings();

        assert_eq!(settings.tempo(), 128);
        assert_eq!(settings.key_delay(), 7);
        assert_eq!(settings.key_repeat(), 2);
        assert_eq!(settings.sync_mode(), SyncMode::None);
        assert_eq!(settings.clone_mode(), CloneMode::Deep);
        assert!(settings.prelisten());
        assert!(!settings.has_changed());
        assert_eq!(settings.work_time(), WorkTime::default());
    }

    #[test]
    fn tempo() {
        let mut song = SongMemory::new();
        let mut settings = song.settings_mut();

        settings.set_tempo(295).unwrap();
        assert_eq!(settings.tempo(), 295);
        assert_eq!(settings.song.as_slice()[TEMPO_OFFSET], 39);

        settings.set_tempo(40).unwrap();
        assert_eq!(settings.tempo(), 40);

        assert_eq!(
            settings.set_tempo(39),
            Err(TempoOutOfRangeError { bpm: 39 })
        );
        assert!(settings.set_tempo(296).is_err());
        assert_eq!(settings.tempo(), 40);
    }

    #[test]
    fn edit() {
        let mut song = SongMemory::new();

        {
            let mut settings = song.settings_mut();
            settings.set_tune(0xF4);
            settings.set_sync_mode(SyncMode::Midi);
            settings.set_clone_mode(CloneMode::Slim);
            settings.set_prelisten(true);
            settings.set_power_save(true);
            settings.set_changed(true);
            settings.set_drum_max(0x6C);
            settings.set_font(1);
            settings.set_color_set(2);
            settings.set_work_time(WorkTime {
                hours: 3,
                minutes: 15,
            });
            settings.set_total_time(TotalTime {
                days: 1,
                hours: 2,
                minutes: 3,
            });
        }

        let settings = song.settings();
        assert_eq!(settings.tune(), 0xF4);
        assert_eq!(settings.sync_mode(), SyncMode::Midi);
        assert_eq!(settings.clone_mode(), CloneMode::Slim);
        assert!(settings.prelisten());
        assert!(settings.power_save());
        assert!(settings.has_changed());
        assert_eq!(settings.drum_max(), 0x6C);
        assert_eq!(settings.font(), 1);
        assert_eq!(settings.color_set(), 2);
        assert_eq!(settings.work_time().minutes, 15);
        assert_eq!(
            settings.total_time(),
            TotalTime {
                days: 1,
                hours: 2,
                minutes: 3
            }
        );
        assert_eq!(song.as_slice()[SYNC_OFFSET], 2);
    }
}
