//! Defines scale degrees, their solfege names, and the conversion between scale degrees and the
//! notes of a key.
//!
//! Scale degrees are always measured against the major scale of the key, so the third of a minor
//! key is the degree `b3`. Notes that do not belong to the major scale map to an altered degree.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use strum::{Display as StrumDisplay, EnumIter, IntoEnumIterator};

use crate::{
    data::music::{
        cadences::CadenceType,
        intervals::Interval,
        keys::Key,
        notes::{Accidental, Note, NoteClass},
        scales::ScaleType,
    },
    error::MusicError,
    transpose::Transpose,
};

/// The position of a note within the major scale of a key, optionally altered by an accidental.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub struct ScaleDegree {
    degree: u8,
    accidental: Accidental,
}

impl ScaleDegree {
    /// Creates a new scale degree. The degree must be between 1 and 7.
    pub fn new(degree: u8, accidental: Accidental) -> Result<ScaleDegree, MusicError> {
        if !(1..=7).contains(&degree) {
            return Err(MusicError::InvalidScaleDegree(format!(
                "{accidental}{degree}"
            )));
        }
        Ok(ScaleDegree { degree, accidental })
    }

    /// Creates an unaltered scale degree. Callers guarantee the degree is between 1 and 7.
    pub(crate) fn diatonic(degree: u8) -> ScaleDegree {
        Self::altered(degree, Accidental::Natural)
    }

    /// Creates an altered scale degree. Callers guarantee the degree is between 1 and 7.
    pub(crate) fn altered(degree: u8, accidental: Accidental) -> ScaleDegree {
        debug_assert!((1..=7).contains(&degree));
        ScaleDegree { degree, accidental }
    }

    /// Returns the diatonic degree, between 1 and 7, ignoring the accidental.
    #[must_use]
    pub fn degree(&self) -> u8 {
        self.degree
    }

    /// Returns the accidental applied to the degree.
    #[must_use]
    pub fn accidental(&self) -> Accidental {
        self.accidental
    }

    /// Returns the number of semitones between the tonic and this degree.
    #[must_use]
    pub fn semitones(&self) -> i32 {
        MAJOR_SCALE_SEMITONES[usize::from(self.degree - 1)] + self.accidental.offset()
    }
}

/// The number of semitones between the tonic and each degree of the major scale.
const MAJOR_SCALE_SEMITONES: [i32; 7] = [0, 2, 4, 5, 7, 9, 11];

/// The scale degree used for each pitch class when a note cannot be named relative to its letter.
const CHROMATIC_DEGREES: [(u8, Accidental); 12] = [
    (1, Accidental::Natural),
    (2, Accidental::Flat),
    (2, Accidental::Natural),
    (3, Accidental::Flat),
    (3, Accidental::Natural),
    (4, Accidental::Natural),
    (4, Accidental::Sharp),
    (5, Accidental::Natural),
    (6, Accidental::Flat),
    (6, Accidental::Natural),
    (7, Accidental::Flat),
    (7, Accidental::Natural),
];

impl Display for ScaleDegree {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}{}", self.accidental, self.degree)
    }
}

impl FromStr for ScaleDegree {
    type Err = MusicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || MusicError::InvalidScaleDegree(s.to_string());
        let trimmed = s.trim();
        let digits = trimmed.trim_start_matches(['#', 'b', '♯', '♭']);
        let prefix = &trimmed[..trimmed.len() - digits.len()];

        let offset: i32 = prefix
            .chars()
            .map(|c| if c == '#' || c == '♯' { 1 } else { -1 })
            .sum();
        let mixed = prefix.chars().any(|c| c == '#' || c == '♯')
            && prefix.chars().any(|c| c == 'b' || c == '♭');
        if mixed {
            return Err(invalid());
        }

        let accidental = Accidental::from_offset(offset).ok_or_else(invalid)?;
        let degree = digits.parse::<u8>().map_err(|_| invalid())?;
        ScaleDegree::new(degree, accidental).map_err(|_| invalid())
    }
}

impl TryFrom<String> for ScaleDegree {
    type Error = MusicError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ScaleDegree> for String {
    fn from(degree: ScaleDegree) -> Self {
        degree.to_string()
    }
}

/// Returns the scale degree of the note class in the given key. The degree is chosen from the
/// letter of the note, so `D#` and `Eb` in C map to `#2` and `b3` respectively.
#[must_use]
pub fn note_class_to_scale_degree(note_class: NoteClass, key: Key) -> ScaleDegree {
    let tonic = key.tonic();
    let steps = (note_class.0.index() - tonic.0.index()).rem_euclid(7);
    let scale = ScaleType::Major.notes(tonic);
    let expected = scale[steps as usize];
    let offset = (note_class.pitch_class() - expected.pitch_class() + 6).rem_euclid(12) - 6;

    match Accidental::from_offset(offset) {
        Some(accidental) => ScaleDegree::altered(steps as u8 + 1, accidental),
        None => {
            // Spellings too far from the key are named after their pitch instead.
            let distance = (note_class.pitch_class() - tonic.pitch_class()).rem_euclid(12);
            let (degree, accidental) = CHROMATIC_DEGREES[distance as usize];
            ScaleDegree::altered(degree, accidental)
        }
    }
}

/// Returns the note class of the scale degree in the given key.
#[must_use]
pub fn scale_degree_to_note_class(scale_degree: ScaleDegree, key: Key) -> NoteClass {
    let scale = ScaleType::Major.notes(key.tonic());
    scale[usize::from(scale_degree.degree - 1)]
        .transpose(Interval::new(scale_degree.accidental.offset(), 0))
}

/// The movable-do solfege names. Each diatonic degree has one name, and the chromatic degrees use
/// the raised (Di, Ri, ...) or lowered (Ra, Me, ...) names.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, StrumDisplay, EnumIter, Deserialize, Serialize,
)]
#[allow(missing_docs)]
pub enum Solfege {
    Do,
    Di,
    Ra,
    Re,
    Ri,
    Me,
    Mi,
    Fa,
    Fi,
    Se,
    Sol,
    Si,
    Le,
    La,
    Li,
    Te,
    Ti,
}

impl Solfege {
    /// The names of the seven diatonic degrees, in order.
    pub const DIATONIC: [Solfege; 7] = [
        Solfege::Do,
        Solfege::Re,
        Solfege::Mi,
        Solfege::Fa,
        Solfege::Sol,
        Solfege::La,
        Solfege::Ti,
    ];

    /// Parses a solfege name.
    pub fn parse(name: &str) -> Result<Solfege, MusicError> {
        Solfege::iter()
            .find(|solfege| solfege.to_string() == name.trim())
            .ok_or_else(|| MusicError::InvalidSolfege(name.to_string()))
    }
}

/// Returns the scale degree named by the solfege syllable.
#[must_use]
pub fn solfege_to_scale_degree(solfege: Solfege) -> ScaleDegree {
    let (degree, accidental) = match solfege {
        Solfege::Do => (1, Accidental::Natural),
        Solfege::Di => (1, Accidental::Sharp),
        Solfege::Ra => (2, Accidental::Flat),
        Solfege::Re => (2, Accidental::Natural),
        Solfege::Ri => (2, Accidental::Sharp),
        Solfege::Me => (3, Accidental::Flat),
        Solfege::Mi => (3, Accidental::Natural),
        Solfege::Fa => (4, Accidental::Natural),
        Solfege::Fi => (4, Accidental::Sharp),
        Solfege::Se => (5, Accidental::Flat),
        Solfege::Sol => (5, Accidental::Natural),
        Solfege::Si => (5, Accidental::Sharp),
        Solfege::Le => (6, Accidental::Flat),
        Solfege::La => (6, Accidental::Natural),
        Solfege::Li => (6, Accidental::Sharp),
        Solfege::Te => (7, Accidental::Flat),
        Solfege::Ti => (7, Accidental::Natural),
    };
    ScaleDegree::altered(degree, accidental)
}

/// Returns the solfege syllable of the scale degree, if it has one.
#[must_use]
pub fn scale_degree_to_solfege(scale_degree: ScaleDegree) -> Option<Solfege> {
    Solfege::iter().find(|solfege| solfege_to_scale_degree(*solfege) == scale_degree)
}

/// Returns the line that leads from the given degree back to the tonic. Degrees from the fifth
/// upwards ascend to the upper tonic, and the rest descend. Every degree of the scale implied by
/// the cadence type that lies between the start and the tonic is included if it is allowed, and
/// skipped otherwise. The line always starts with the given degree and ends on the tonic.
#[must_use]
pub fn resolution_from_scale_degree(
    from: ScaleDegree,
    allowed: &[ScaleDegree],
    cadence_type: CadenceType,
) -> Vec<ScaleDegree> {
    let tonic = ScaleDegree::diatonic(1);
    let mut resolution = vec![from];
    if from == tonic {
        return resolution;
    }

    let scale = cadence_type.scale_type().degrees();
    let passing: Vec<u8> = if from.degree >= 5 {
        (from.degree + 1..=7).collect()
    } else {
        (2..from.degree).rev().collect()
    };
    resolution.extend(
        passing
            .into_iter()
            .map(|degree| scale[usize::from(degree - 1)])
            .filter(|degree| allowed.contains(degree)),
    );
    resolution.push(tonic);
    resolution
}

/// Returns the notes of the resolution that starts on the given note. The notes are placed in the
/// octave of the tonic at or below the starting note. When the resolution starts on the fifth
/// degree or above, the final tonic is moved up an octave so the line ascends.
#[must_use]
pub fn resolution_notes(
    from: Note,
    key: Key,
    allowed: &[ScaleDegree],
    cadence_type: CadenceType,
) -> Vec<Note> {
    let from_degree = note_class_to_scale_degree(from.class, key);
    let tonic_pitch = from.pitch() - from_degree.semitones();

    let mut notes: Vec<Note> = resolution_from_scale_degree(from_degree, allowed, cadence_type)
        .into_iter()
        .map(|degree| {
            let class = scale_degree_to_note_class(degree, key);
            let pitch = tonic_pitch + degree.semitones();
            Note::from_pitch_with_letter(pitch, class.0)
                .unwrap_or_else(|| Note::from_pitch(pitch, key.prefers_flats()))
        })
        .collect();

    if from_degree.degree >= 5 {
        if let Some(last) = notes.last_mut() {
            *last = last.transpose(Interval::OCTAVE);
        }
    }
    notes
}
