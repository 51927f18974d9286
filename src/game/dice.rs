//! Random source abstraction. Every roll the game makes (monster pick, damage, crit,
//! experience, loot) goes through [`Roller`] so tests can replay exact sequences.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub trait Roller: Send {
    /// Uniform integer in `[low, high]` (inclusive).
    fn roll_range(&mut self, low: u32, high: u32) -> u32;
    /// `true` with the given probability.
    fn roll_chance(&mut self, probability: f64) -> bool;
    /// Uniform index in `0..len`. `len` must be non-zero.
    fn roll_index(&mut self, len: usize) -> usize;
}

impl Roller for StdRng {
    fn roll_range(&mut self, low: u32, high: u32) -> u32 {
        self.gen_range(low..=high)
    }

    fn roll_chance(&mut self, probability: f64) -> bool {
        self.gen::<f64>() < probability
    }

    fn roll_index(&mut self, len: usize) -> usize {
        self.gen_range(0..len)
    }
}

/// Production roller seeded from OS entropy.
pub fn entropy_roller() -> Box<dyn Roller> {
    Box::new(StdRng::from_entropy())
}

/// Deterministic roller for reproducible runs.
pub fn seeded_roller(seed: u64) -> Box<dyn Roller> {
    Box::new(StdRng::seed_from_u64(seed))
}

/// One scripted outcome for [`ScriptedRolls`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Roll {
    /// Answer to [`Roller::roll_range`]; clamped into the requested range.
    Value(u32),
    /// Answer to [`Roller::roll_chance`].
    Hit(bool),
    /// Answer to [`Roller::roll_index`]; wrapped into the requested length.
    Index(usize),
}

/// Replays a fixed list of outcomes in order. Once the script runs out, or a roll
/// of the wrong kind is next, the lowest outcome is used (range low bound, miss,
/// index 0).
#[derive(Debug, Default)]
pub struct ScriptedRolls {
    script: VecDeque<Roll>,
}

impl ScriptedRolls {
    pub fn new(script: impl IntoIterator<Item = Roll>) -> Self {
        Self {
            script: script.into_iter().collect(),
        }
    }

    /// Outcomes not consumed yet.
    pub fn remaining(&self) -> usize {
        self.script.len()
    }

    fn next(&mut self, wanted: &str) -> Option<Roll> {
        let roll = self.script.pop_front();
        if roll.is_none() {
            log::trace!("scripted rolls exhausted on {}", wanted);
        }
        roll
    }
}

impl Roller for ScriptedRolls {
    fn roll_range(&mut self, low: u32, high: u32) -> u32 {
        match self.next("range") {
            Some(Roll::Value(v)) => v.clamp(low, high),
            Some(other) => {
                log::warn!("scripted roll mismatch: wanted range, got {:?}", other);
                low
            }
            None => low,
        }
    }

    fn roll_chance(&mut self, _probability: f64) -> bool {
        match self.next("chance") {
            Some(Roll::Hit(hit)) => hit,
            Some(other) => {
                log::warn!("scripted roll mismatch: wanted chance, got {:?}", other);
                false
            }
            None => false,
        }
    }

    fn roll_index(&mut self, len: usize) -> usize {
        match self.next("index") {
            Some(Roll::Index(i)) if len > 0 => i % len,
            Some(Roll::Index(_)) => 0,
            Some(other) => {
                log::warn!("scripted roll mismatch: wanted index, got {:?}", other);
                0
            }
            None => 0,
        }
    }
}
