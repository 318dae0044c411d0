//! Defines the musical intervals.

use std::{
    fmt::{Display, Formatter, Result},
    ops::Neg,
};

use serde::{Deserialize, Serialize};

/// A signed distance between two pitches. The number of semitones determines the sounding
/// result, while the optional number of diatonic steps determines how the result is spelled. For
/// example, a minor third and an augmented second are both three semitones wide, but the former
/// moves two letters (C to Eb) and the latter only one (C to D#).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct Interval {
    /// The number of semitones. Negative values move downwards.
    pub semitones: i32,

    /// The number of letter names the interval moves, if known. Negative values move downwards.
    pub steps: Option<i32>,
}

#[allow(missing_docs)]
impl Interval {
    pub const UNISON: Interval = Interval::new(0, 0);
    pub const MINOR_SECOND: Interval = Interval::new(1, 1);
    pub const MAJOR_SECOND: Interval = Interval::new(2, 1);
    pub const MINOR_THIRD: Interval = Interval::new(3, 2);
    pub const MAJOR_THIRD: Interval = Interval::new(4, 2);
    pub const PERFECT_FOURTH: Interval = Interval::new(5, 3);
    pub const TRITONE: Interval = Interval::new(6, 3);
    pub const DIMINISHED_FIFTH: Interval = Interval::new(6, 4);
    pub const PERFECT_FIFTH: Interval = Interval::new(7, 4);
    pub const AUGMENTED_FIFTH: Interval = Interval::new(8, 4);
    pub const MINOR_SIXTH: Interval = Interval::new(8, 5);
    pub const MAJOR_SIXTH: Interval = Interval::new(9, 5);
    pub const MINOR_SEVENTH: Interval = Interval::new(10, 6);
    pub const MAJOR_SEVENTH: Interval = Interval::new(11, 6);
    pub const OCTAVE: Interval = Interval::new(12, 7);

    /// Creates an interval with a known diatonic size.
    #[must_use]
    pub const fn new(semitones: i32, steps: i32) -> Interval {
        Interval {
            semitones,
            steps: Some(steps),
        }
    }

    /// Creates an interval that only specifies the number of semitones. Transposing by it spells
    /// the result with the conventional accidentals.
    #[must_use]
    pub const fn chromatic(semitones: i32) -> Interval {
        Interval {
            semitones,
            steps: None,
        }
    }

    /// Creates the interval usually written for the given number of semitones: a perfect, major,
    /// or minor interval, with six semitones written as an augmented fourth. Negative values give
    /// the same interval downwards.
    #[must_use]
    pub const fn standard(semitones: i32) -> Interval {
        const STEPS: [i32; 12] = [0, 1, 1, 2, 2, 3, 3, 4, 5, 5, 6, 6];
        let size = semitones.abs();
        let steps = size / 12 * 7 + STEPS[(size % 12) as usize];
        Interval::new(semitones, if semitones < 0 { -steps } else { steps })
    }

    fn name(&self) -> Option<&'static str> {
        let steps = self.steps?;
        let name = match (self.semitones.abs(), steps.abs()) {
            (0, 0) => "Unison",
            (1, 0) => "Augmented Unison",
            (1, 1) => "Minor Second",
            (2, 1) => "Major Second",
            (3, 1) => "Augmented Second",
            (3, 2) => "Minor Third",
            (4, 2) => "Major Third",
            (5, 3) => "Perfect Fourth",
            (6, 3) => "Tritone",
            (6, 4) => "Diminished Fifth",
            (7, 4) => "Perfect Fifth",
            (8, 4) => "Augmented Fifth",
            (8, 5) => "Minor Sixth",
            (9, 5) => "Major Sixth",
            (10, 6) => "Minor Seventh",
            (11, 6) => "Major Seventh",
            (11, 7) => "Diminished Octave",
            (12, 7) => "Octave",
            _ => return None,
        };
        Some(name)
    }
}

impl Neg for Interval {
    type Output = Interval;

    fn neg(self) -> Self::Output {
        Interval {
            semitones: -self.semitones,
            steps: self.steps.map(|steps| -steps),
        }
    }
}

impl Display for Interval {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self.name() {
            Some(name) if self.semitones < 0 => write!(f, "{name} Down"),
            Some(name) => write!(f, "{name}"),
            None => write!(f, "{} Semitones", self.semitones),
        }
    }
}
