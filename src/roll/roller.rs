use crate::common::UInt;
use rand::{
    distributions::{DistIter, Distribution, Uniform},
    Rng,
};
use std::num::NonZeroU64;

/// Source of die faces. Implemented for every [`rand::Rng`].
pub trait Roller {
    type RollIter<'a>: Iterator<Item = UInt> + 'a
    where
        Self: 'a;

    fn roll(&mut self, sides: NonZeroU64) -> UInt;

    fn roll_iter(&mut self, num: usize, sides: NonZeroU64) -> Self::RollIter<'_>;
}

impl<R: Rng> Roller for R {
    type RollIter<'a> = std::iter::Take<DistIter<Uniform<UInt>, &'a mut Self, UInt>>
    where
        Self: 'a;

    fn roll(&mut self, sides: NonZeroU64) -> UInt {
        self.gen_range(1..=sides.get())
    }

    fn roll_iter(&mut self, num: usize, sides: NonZeroU64) -> Self::RollIter<'_> {
        Uniform::new_inclusive(1, sides.get())
            .sample_iter(self)
            .take(num)
    }
}

#[cfg(test)]
pub(crate) use step::StepRoller;
