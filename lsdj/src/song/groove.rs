//! Grooves: the number of ticks each step of a phrase lasts

use super::SongMemory;
use std::borrow::{Borrow, BorrowMut};
use ux::{u4, u5};

const OFFSET: usize = 0x1090;

/// The step length meaning "this step isn't used"
const NO_VALUE: u8 = 0;

/// A view onto a single groove in a song
#[derive(Debug)]
pub struct Groove<S> {
    song: S,
    index: u5,
}

impl SongMemory {
    /// The number of grooves in a song
    pub const GROOVE_COUNT: usize = 0x20;

    pub fn groove(&self, index: u5) -> Groove<&Self> {
        Groove { song: self, index }
    }

    pub fn groove_mut(&mut self, index: u5) -> Groove<&mut Self> {
        Groove { song: self, index }
    }
}

impl<S> Groove<S>
where
    S: Borrow<SongMemory>,
{
    /// The number of steps in a groove
    pub const LEN: usize = 16;

    pub fn index(&self) -> u5 {
        self.index
    }

    /// The number of ticks a step lasts, or [`None`] if the step isn't used
    pub fn step(&self, step: u4) -> Option<u8> {
        match self.song.borrow().byte(self.offset(step)) {
            NO_VALUE => None,
            ticks => Some(ticks),
        }
    }

    /// The ticks of every used step, up to the first unused one
    pub fn steps(&self) -> impl Iterator<Item = u8> + '_ {
        (0..Self::LEN as u8).map_while(|step| self.step(u4::new(step)))
    }

    fn offset(&self, step: u4) -> usize {
        OFFSET + u8::from(self.index) as usize * Self::LEN + u8::from(step) as usize
    }
}

impl<S> Groove<S>
where
    S: BorrowMut<SongMemory>,
{
    pub fn set_step(&mut self, step: u4, ticks: Option<u8>) {
        let offset = self.offset(step);
        self.song
            .borrow_mut()
            .set_byte(offset, ticks.unwrap_or(NO_VALUE));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factory() {
        let song = SongMemory::new();
        let groove = song.groove(u5::new(0));

        assert_eq!(groove.step(u4::new(0)), Some(6));
        assert_eq!(groove.step(u4::new(1)), Some(6));
        assert_eq!(groove.step(u4::new(2)), None);
        assert_eq!(groove.steps().collect::<Vec<_>>(), [6, 6]);
    }

    #[test]
    fn edit() {
        let mut song = SongMemory::new();

        {
            let mut groove = song.groove_mut(u5::new(0x1F));
            groove.set_step(u4::new(1), Some(5));
            groove.set_step(u4::new(2), Some(7));
            groove.set_step(u4::new(15), Some(1));
        }

        let groove = song.groove(u5::new(0x1F));
        assert_eq!(groove.steps().collect::<Vec<_>>(), [6, 5, 7]);
        assert_eq!(groove.step(u4::new(15)), Some(1));

        song.groove_mut(u5::new(0x1F)).set_step(u4::new(0), None);
        assert_eq!(song.groove(u5::new(0x1F)).steps().count(), 0);
    }
}
