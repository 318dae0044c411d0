//! Defines the source of randomness used to pick keys and generate questions. Exercises never call
//! the random number generator directly so that tests can supply deterministic choices.

use anyhow::{Result, anyhow};
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::collections::VecDeque;

/// A source of random choices.
pub trait RandomSource {
    /// Returns an index in the range `0..len`. The length is never zero.
    fn choose_index(&mut self, len: usize) -> usize;
}

/// A random source backed by the thread-local generator.
#[derive(Clone, Copy, Debug, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn choose_index(&mut self, len: usize) -> usize {
        rand::rng().random_range(0..len)
    }
}

/// A random source backed by a seeded generator, which produces the same choices for the same
/// seed.
#[derive(Clone, Debug)]
pub struct SeededRandom(StdRng);

impl SeededRandom {
    /// Creates a new source from the given seed.
    #[must_use]
    pub fn new(seed: u64) -> SeededRandom {
        SeededRandom(StdRng::seed_from_u64(seed))
    }
}

impl RandomSource for SeededRandom {
    fn choose_index(&mut self, len: usize) -> usize {
        self.0.random_range(0..len)
    }
}

/// A random source which replays a fixed sequence of indices, wrapped to the length of each
/// choice. Once the sequence is exhausted it always returns the first index.
#[derive(Clone, Debug, Default)]
pub struct SequenceRandom(VecDeque<usize>);

impl SequenceRandom {
    /// Creates a new source replaying the given indices.
    pub fn new(indices: impl IntoIterator<Item = usize>) -> SequenceRandom {
        SequenceRandom(indices.into_iter().collect())
    }
}

impl RandomSource for SequenceRandom {
    fn choose_index(&mut self, len: usize) -> usize {
        self.0.pop_front().unwrap_or_default() % len
    }
}

/// Returns a random element of the list.
pub fn random_from_list<'a, T>(random: &mut dyn RandomSource, list: &'a [T]) -> Result<&'a T> {
    if list.is_empty() {
        return Err(anyhow!("cannot pick a random element from an empty list"));
    }
    Ok(&list[random.choose_index(list.len())])
}
