//! Defines the diatonic scales used to spell keys and to resolve scale degrees.

use strum::Display;

use crate::{
    data::music::{
        intervals::Interval,
        notes::{Accidental, NoteClass},
        scale_degrees::ScaleDegree,
    },
    transpose::Transpose,
};

/// Defines a type of scale.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum ScaleType {
    Major,
    Minor,
}

impl ScaleType {
    /// Returns the intervals from the tonic to each note of the scale.
    #[must_use]
    pub fn intervals(&self) -> Vec<Interval> {
        match self {
            ScaleType::Major => vec![
                Interval::UNISON,
                Interval::MAJOR_SECOND,
                Interval::MAJOR_THIRD,
                Interval::PERFECT_FOURTH,
                Interval::PERFECT_FIFTH,
                Interval::MAJOR_SIXTH,
                Interval::MAJOR_SEVENTH,
            ],
            ScaleType::Minor => vec![
                Interval::UNISON,
                Interval::MAJOR_SECOND,
                Interval::MINOR_THIRD,
                Interval::PERFECT_FOURTH,
                Interval::PERFECT_FIFTH,
                Interval::MINOR_SIXTH,
                Interval::MINOR_SEVENTH,
            ],
        }
    }

    /// Returns the notes of the scale with the given tonic. The notes are spelled so that each
    /// letter appears exactly once.
    #[must_use]
    pub fn notes(&self, tonic: NoteClass) -> Vec<NoteClass> {
        self.intervals()
            .into_iter()
            .map(|interval| tonic.transpose(interval))
            .collect()
    }

    /// Returns the scale degrees of the scale relative to the major scale with the same tonic.
    #[must_use]
    pub fn degrees(&self) -> Vec<ScaleDegree> {
        let flat = |degree| ScaleDegree::altered(degree, Accidental::Flat);
        match self {
            ScaleType::Major => (1..=7).map(ScaleDegree::diatonic).collect(),
            ScaleType::Minor => vec![
                ScaleDegree::diatonic(1),
                ScaleDegree::diatonic(2),
                flat(3),
                ScaleDegree::diatonic(4),
                ScaleDegree::diatonic(5),
                flat(6),
                flat(7),
            ],
        }
    }
}
