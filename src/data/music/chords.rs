//! Defines chords, their qualities, and the algorithms used to place their notes in concrete
//! voicings.

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};
use strum::{Display as StrumDisplay, EnumIter};

use crate::{
    data::music::{
        intervals::Interval,
        notes::{Note, NoteClass},
    },
    error::MusicError,
    transpose::Transpose,
};

/// The octave around which the voicings of a chord progression are placed.
const PROGRESSION_OCTAVE: i8 = 4;

/// The octave in which the bass of a chord progression is played.
const PROGRESSION_BASS_OCTAVE: i8 = 2;

/// The range of MIDI pitches a voicing can use.
const MIDI_RANGE: std::ops::RangeInclusive<i32> = 0..=127;

/// The quality of a chord, defined by the intervals between its root and the rest of its notes.
#[derive(Clone, Copy, Debug, EnumIter, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum ChordType {
    Major,
    Minor,
    Diminished,
    Augmented,
    Sus2,
    Sus4,
    Dominant7,
    Major7,
    Minor7,
}

impl ChordType {
    /// Returns the intervals from the root to each note of the chord, including the root itself.
    #[must_use]
    pub fn intervals(&self) -> Vec<Interval> {
        let third_and_fifth = |third, fifth| vec![Interval::UNISON, third, fifth];
        match self {
            ChordType::Major => third_and_fifth(Interval::MAJOR_THIRD, Interval::PERFECT_FIFTH),
            ChordType::Minor => third_and_fifth(Interval::MINOR_THIRD, Interval::PERFECT_FIFTH),
            ChordType::Diminished => {
                third_and_fifth(Interval::MINOR_THIRD, Interval::DIMINISHED_FIFTH)
            }
            ChordType::Augmented => {
                third_and_fifth(Interval::MAJOR_THIRD, Interval::AUGMENTED_FIFTH)
            }
            ChordType::Sus2 => third_and_fifth(Interval::MAJOR_SECOND, Interval::PERFECT_FIFTH),
            ChordType::Sus4 => third_and_fifth(Interval::PERFECT_FOURTH, Interval::PERFECT_FIFTH),
            ChordType::Dominant7 => vec![
                Interval::UNISON,
                Interval::MAJOR_THIRD,
                Interval::PERFECT_FIFTH,
                Interval::MINOR_SEVENTH,
            ],
            ChordType::Major7 => vec![
                Interval::UNISON,
                Interval::MAJOR_THIRD,
                Interval::PERFECT_FIFTH,
                Interval::MAJOR_SEVENTH,
            ],
            ChordType::Minor7 => vec![
                Interval::UNISON,
                Interval::MINOR_THIRD,
                Interval::PERFECT_FIFTH,
                Interval::MINOR_SEVENTH,
            ],
        }
    }

    /// Returns the canonical suffix used to write the chord type after the root.
    #[must_use]
    pub fn suffix(&self) -> &'static str {
        match self {
            ChordType::Major => "",
            ChordType::Minor => "m",
            ChordType::Diminished => "dim",
            ChordType::Augmented => "aug",
            ChordType::Sus2 => "sus2",
            ChordType::Sus4 => "sus4",
            ChordType::Dominant7 => "7",
            ChordType::Major7 => "maj7",
            ChordType::Minor7 => "m7",
        }
    }

    /// Parses a chord suffix, accepting the common alternative spellings.
    fn from_suffix(suffix: &str) -> Option<ChordType> {
        match suffix {
            "" | "M" | "maj" => Some(ChordType::Major),
            "m" | "min" | "-" => Some(ChordType::Minor),
            "dim" | "°" | "ᵒ" => Some(ChordType::Diminished),
            "aug" | "+" => Some(ChordType::Augmented),
            "sus2" => Some(ChordType::Sus2),
            "sus4" | "sus" => Some(ChordType::Sus4),
            "7" => Some(ChordType::Dominant7),
            "maj7" | "M7" => Some(ChordType::Major7),
            "m7" | "min7" | "-7" => Some(ChordType::Minor7),
            _ => None,
        }
    }
}

/// The inversion of a triad, identified by the chord member in the bass.
#[derive(Clone, Copy, Debug, EnumIter, PartialEq, Eq, Hash, StrumDisplay)]
pub enum TriadInversion {
    /// The root is the lowest note.
    #[strum(serialize = "Root Position")]
    Root,

    /// The third is the lowest note.
    #[strum(serialize = "1st Inversion")]
    First,

    /// The fifth is the lowest note.
    #[strum(serialize = "2nd Inversion")]
    Second,
}

impl TriadInversion {
    /// Returns the number of rotations of the root position needed to reach this inversion.
    #[must_use]
    pub fn index(&self) -> usize {
        match self {
            TriadInversion::Root => 0,
            TriadInversion::First => 1,
            TriadInversion::Second => 2,
        }
    }
}

/// The options used to compute the voicing of a chord.
#[derive(Builder, Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct VoicingOptions {
    /// The number of times the root position is rotated. Zero means root position.
    #[builder(default)]
    pub inversion: usize,

    /// The octave of the root in root position.
    #[builder(default = "4")]
    pub octave: i8,

    /// Whether the root is doubled an octave below the voicing.
    #[builder(default)]
    pub with_bass: bool,
}

impl Default for VoicingOptions {
    fn default() -> Self {
        VoicingOptions {
            inversion: 0,
            octave: 4,
            with_bass: false,
        }
    }
}

/// A chord, described by its root and its quality.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Chord {
    /// The root of the chord.
    pub root: NoteClass,

    /// The quality of the chord.
    pub chord_type: ChordType,
}

impl Chord {
    /// Creates a chord from its root and quality.
    #[must_use]
    pub fn new(root: NoteClass, chord_type: ChordType) -> Chord {
        Chord { root, chord_type }
    }

    /// Returns the note classes of the chord in root position.
    #[must_use]
    pub fn note_classes(&self) -> Vec<NoteClass> {
        self.chord_type
            .intervals()
            .into_iter()
            .map(|interval| self.root.transpose(interval))
            .collect()
    }

    /// Returns the notes of the chord in close position with the given options. The voicing
    /// starts in root position at the requested octave, and each inversion moves the lowest note
    /// above the current top note, so the pitches are always strictly ascending.
    pub fn voicing(&self, options: &VoicingOptions) -> Result<Vec<Note>, MusicError> {
        let intervals = self.chord_type.intervals();
        if options.inversion >= intervals.len() {
            return Err(MusicError::InvalidVoicing(
                self.to_string(),
                format!(
                    "inversion {} is not valid for a chord with {} notes",
                    options.inversion,
                    intervals.len()
                ),
            ));
        }

        let root = Note::new(self.root, options.octave);
        let mut notes: Vec<Note> = intervals
            .into_iter()
            .map(|interval| root.transpose(interval))
            .collect();
        for _ in 0..options.inversion {
            let mut moved = notes.remove(0);
            if let Some(top) = notes.last() {
                while moved.pitch() <= top.pitch() {
                    moved = moved.transpose(Interval::OCTAVE);
                }
            }
            notes.push(moved);
        }
        if options.with_bass {
            notes.insert(0, root.transpose(-Interval::OCTAVE));
        }

        if notes.iter().any(|note| !MIDI_RANGE.contains(&note.pitch())) {
            return Err(MusicError::InvalidVoicing(
                self.to_string(),
                format!("octave {} is out of range", options.octave),
            ));
        }
        Ok(notes)
    }
}

/// Returns the total distance between the notes of a candidate voicing and the closest notes of
/// the previous voicing.
fn movement(previous: &[Note], candidate: &[Note]) -> i32 {
    candidate
        .iter()
        .map(|note| {
            previous
                .iter()
                .map(|other| (note.pitch() - other.pitch()).abs())
                .min()
                .unwrap_or_default()
        })
        .sum()
}

/// Returns one voicing for each of the given chords, chosen so the upper voices move as little as
/// possible between consecutive chords. The seed selects the inversion of the first chord. Every
/// voicing has the root of its chord in the bass.
pub fn voice_chord_progression(
    chords: &[Chord],
    seed: usize,
) -> Result<Vec<Vec<Note>>, MusicError> {
    let mut voicings: Vec<Vec<Note>> = Vec::with_capacity(chords.len());
    let mut previous: Option<Vec<Note>> = None;
    for chord in chords {
        let size = chord.chord_type.intervals().len();
        let upper = match &previous {
            None => chord.voicing(&VoicingOptions {
                inversion: seed % size,
                octave: PROGRESSION_OCTAVE,
                with_bass: false,
            })?,
            Some(previous) => {
                let mut candidates = Vec::with_capacity(3 * size);
                for octave in PROGRESSION_OCTAVE - 1..=PROGRESSION_OCTAVE + 1 {
                    for inversion in 0..size {
                        candidates.push(chord.voicing(&VoicingOptions {
                            inversion,
                            octave,
                            with_bass: false,
                        })?);
                    }
                }

                // Ties are resolved in favor of the first candidate.
                candidates
                    .into_iter()
                    .min_by_key(|candidate| movement(previous, candidate))
                    .ok_or_else(|| {
                        MusicError::InvalidVoicing(chord.to_string(), "no candidates".to_string())
                    })?
            }
        };

        let mut voicing = Vec::with_capacity(upper.len() + 1);
        voicing.push(Note::new(chord.root, PROGRESSION_BASS_OCTAVE));
        voicing.extend(upper.iter().copied());
        voicings.push(voicing);
        previous = Some(upper);
    }
    Ok(voicings)
}

impl Transpose for Chord {
    fn transpose(&self, interval: Interval) -> Self {
        Chord {
            root: self.root.transpose(interval),
            chord_type: self.chord_type,
        }
    }
}

impl Display for Chord {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}{}", self.root, self.chord_type.suffix())
    }
}

impl FromStr for Chord {
    type Err = MusicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (root, suffix) = NoteClass::parse_prefix(s.trim())
            .ok_or_else(|| MusicError::InvalidChord(s.to_string()))?;
        let chord_type =
            ChordType::from_suffix(suffix).ok_or_else(|| MusicError::InvalidChord(s.to_string()))?;
        Ok(Chord { root, chord_type })
    }
}
