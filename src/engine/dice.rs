//! Random source for the engine.
//!
//! Every draw the engine makes goes through [`Dice`], so a seeded `StdRng`
//! or a [`ScriptedDice`] makes a deal fully reproducible.

use rand::Rng;

/// A source of uniform draws in `[0, 1)`.
#[cfg_attr(test, mockall::automock)]
pub trait Dice {
    fn roll(&mut self) -> f64;
}

impl<R: Rng + ?Sized> Dice for R {
    fn roll(&mut self) -> f64 {
        self.gen::<f64>()
    }
}

/// Uniform integer in `[low, high]` from a single draw.
pub fn roll_between<D: Dice + ?Sized>(dice: &mut D, low: u32, high: u32) -> u32 {
    if high <= low {
        return low;
    }
    let span = (high - low + 1) as f64;
    let offset = (dice.roll() * span).floor() as u32;
    low + offset.min(high - low)
}

/// Replays a fixed sequence of draws, cycling when it runs out.
///
/// An empty script always rolls `0.0`.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDice {
    values: Vec<f64>,
    cursor: usize,
}

impl ScriptedDice {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values, cursor: 0 }
    }

    /// Number of draws consumed so far.
    pub fn draws(&self) -> usize {
        self.cursor
    }
}

impl Dice for ScriptedDice {
    fn roll(&mut self) -> f64 {
        if self.values.is_empty() {
            self.cursor += 1;
            return 0.0;
        }
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value
    }
}
