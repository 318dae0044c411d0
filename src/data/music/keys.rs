//! Defines the twelve keys in which exercises are played and their arrangement in the circle of
//! fifths.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::{
    data::music::{intervals::Interval, notes::NoteClass, scales::ScaleType},
    error::MusicError,
};

/// One of the twelve major keys supported by the exercises. Each pitch class has exactly one key,
/// using the spelling with the fewest accidentals (e.g. Db instead of C#).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
#[allow(missing_docs)]
pub enum Key {
    C,
    G,
    D,
    A,
    E,
    B,
    FSharp,
    DFlat,
    AFlat,
    EFlat,
    BFlat,
    F,
}

impl Key {
    /// The key in which all the questions are written before being transposed.
    pub const REFERENCE: Key = Key::C;

    /// All the keys, in the order obtained by moving clockwise through the circle of fifths.
    pub const ALL: [Key; 12] = [
        Key::C,
        Key::G,
        Key::D,
        Key::A,
        Key::E,
        Key::B,
        Key::FSharp,
        Key::DFlat,
        Key::AFlat,
        Key::EFlat,
        Key::BFlat,
        Key::F,
    ];

    /// Returns the tonic of the key.
    #[must_use]
    pub fn tonic(&self) -> NoteClass {
        match self {
            Key::C => NoteClass::C,
            Key::G => NoteClass::G,
            Key::D => NoteClass::D,
            Key::A => NoteClass::A,
            Key::E => NoteClass::E,
            Key::B => NoteClass::B,
            Key::FSharp => NoteClass::F_SHARP,
            Key::DFlat => NoteClass::D_FLAT,
            Key::AFlat => NoteClass::A_FLAT,
            Key::EFlat => NoteClass::E_FLAT,
            Key::BFlat => NoteClass::B_FLAT,
            Key::F => NoteClass::F,
        }
    }

    /// Returns the key whose tonic is spelled exactly like the given note class.
    #[must_use]
    pub fn from_tonic(tonic: NoteClass) -> Option<Key> {
        Key::ALL.into_iter().find(|key| key.tonic() == tonic)
    }

    /// Returns whether the key signature uses flats. The key of C has no preference, and its
    /// chromatic notes are spelled with sharps.
    #[must_use]
    pub fn prefers_flats(&self) -> bool {
        matches!(
            self,
            Key::F | Key::BFlat | Key::EFlat | Key::AFlat | Key::DFlat
        )
    }

    /// Returns the key obtained by moving clockwise through the circle of fifths.
    #[must_use]
    pub fn clockwise(&self) -> Key {
        Key::ALL[(self.position() + 1) % Key::ALL.len()]
    }

    /// Returns the key obtained by moving counter-clockwise through the circle of fifths.
    #[must_use]
    pub fn counter_clockwise(&self) -> Key {
        Key::ALL[(self.position() + Key::ALL.len() - 1) % Key::ALL.len()]
    }

    /// Returns the spelling of the pitch class in this key. Pitch classes that belong to the
    /// major scale are spelled as in the scale, and the rest use the accidental preferred by the
    /// key.
    #[must_use]
    pub fn spell(&self, pitch_class: i32) -> NoteClass {
        ScaleType::Major
            .notes(self.tonic())
            .into_iter()
            .find(|note| note.pitch_class() == pitch_class.rem_euclid(12))
            .unwrap_or_else(|| NoteClass::from_pitch_class(pitch_class, self.prefers_flats()))
    }

    fn position(&self) -> usize {
        Key::ALL
            .iter()
            .position(|key| key == self)
            .unwrap_or_default()
    }
}

/// Returns the interval needed to move material written in the key `from` into the key `to`. The
/// result is antisymmetric, so moving back uses the negated interval.
///
/// The interval is always the standard one for its size (see [`Interval::standard`]). Moving from
/// C lands on the tonic of every key as it is spelled in [`Key::ALL`]. Between two other keys the
/// tonic may come out enharmonically (Db to F# gives Gb), but no note with up to two accidentals
/// ever needs more than three, so every move can be undone exactly.
#[must_use]
pub fn distance_between_keys(from: Key, to: Key) -> Interval {
    Interval::standard(to.tonic().pitch_class() - from.tonic().pitch_class())
}

impl Display for Key {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.tonic())
    }
}

impl FromStr for Key {
    type Err = MusicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<NoteClass>()
            .ok()
            .and_then(Key::from_tonic)
            .ok_or_else(|| MusicError::InvalidKey(s.to_string()))
    }
}

impl TryFrom<String> for Key {
    type Error = MusicError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Key> for String {
    fn from(key: Key) -> Self {
        key.to_string()
    }
}
