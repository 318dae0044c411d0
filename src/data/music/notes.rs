//! Defines the notes, note classes, and accidentals used to generate exercises.
//!
//! A [NoteClass] is a pitch name without an octave (e.g. `F#`), while a [Note] places a note class
//! in a specific octave using scientific pitch notation (e.g. `F#4`). Notes are ordered by their
//! absolute pitch, so `B#3` and `C4` sound the same but are still distinct values.

use std::{
    cmp::Ordering,
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::{
    data::music::intervals::Interval,
    error::MusicError,
    transpose::Transpose,
};

/// Defines the names of the natural notes, in the order in which they appear starting from C.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(missing_docs)]
pub enum NaturalNote {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl NaturalNote {
    /// All the natural notes, starting from C.
    pub const ALL: [NaturalNote; 7] = [
        NaturalNote::C,
        NaturalNote::D,
        NaturalNote::E,
        NaturalNote::F,
        NaturalNote::G,
        NaturalNote::A,
        NaturalNote::B,
    ];

    /// Returns the position of the letter counting from C (C = 0, B = 6).
    #[must_use]
    pub fn index(self) -> i32 {
        self as i32
    }

    /// Returns the natural note at the given position, wrapping around after B.
    #[must_use]
    pub fn from_index(index: i32) -> NaturalNote {
        Self::ALL[index.rem_euclid(7) as usize]
    }

    /// Returns the number of semitones between C and this note.
    #[must_use]
    pub fn semitones(self) -> i32 {
        match self {
            NaturalNote::C => 0,
            NaturalNote::D => 2,
            NaturalNote::E => 4,
            NaturalNote::F => 5,
            NaturalNote::G => 7,
            NaturalNote::A => 9,
            NaturalNote::B => 11,
        }
    }

    fn from_char(c: char) -> Option<NaturalNote> {
        match c {
            'C' => Some(NaturalNote::C),
            'D' => Some(NaturalNote::D),
            'E' => Some(NaturalNote::E),
            'F' => Some(NaturalNote::F),
            'G' => Some(NaturalNote::G),
            'A' => Some(NaturalNote::A),
            'B' => Some(NaturalNote::B),
            _ => None,
        }
    }
}

impl Display for NaturalNote {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let letter = match self {
            NaturalNote::C => "C",
            NaturalNote::D => "D",
            NaturalNote::E => "E",
            NaturalNote::F => "F",
            NaturalNote::G => "G",
            NaturalNote::A => "A",
            NaturalNote::B => "B",
        };
        write!(f, "{letter}")
    }
}

/// Defines the pitch accidentals that can be applied to a note.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(missing_docs)]
pub enum Accidental {
    TripleFlat,
    DoubleFlat,
    Flat,
    Natural,
    Sharp,
    DoubleSharp,
    TripleSharp,
}

impl Accidental {
    /// Returns the number of semitones by which the accidental alters a natural note.
    #[must_use]
    pub fn offset(self) -> i32 {
        match self {
            Accidental::TripleFlat => -3,
            Accidental::DoubleFlat => -2,
            Accidental::Flat => -1,
            Accidental::Natural => 0,
            Accidental::Sharp => 1,
            Accidental::DoubleSharp => 2,
            Accidental::TripleSharp => 3,
        }
    }

    /// Returns the accidental that alters a natural note by the given number of semitones, if any.
    #[must_use]
    pub fn from_offset(offset: i32) -> Option<Accidental> {
        match offset {
            -3 => Some(Accidental::TripleFlat),
            -2 => Some(Accidental::DoubleFlat),
            -1 => Some(Accidental::Flat),
            0 => Some(Accidental::Natural),
            1 => Some(Accidental::Sharp),
            2 => Some(Accidental::DoubleSharp),
            3 => Some(Accidental::TripleSharp),
            _ => None,
        }
    }

    /// Returns a representation of the accidental using the Unicode music symbols.
    #[must_use]
    pub fn to_unicode_string(self) -> String {
        match self {
            Accidental::TripleFlat => "♭𝄫".to_string(),
            Accidental::DoubleFlat => "𝄫".to_string(),
            Accidental::Flat => "♭".to_string(),
            Accidental::Natural => String::new(),
            Accidental::Sharp => "♯".to_string(),
            Accidental::DoubleSharp => "𝄪".to_string(),
            Accidental::TripleSharp => "♯𝄪".to_string(),
        }
    }
}

impl Display for Accidental {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let symbol = match self {
            Accidental::TripleFlat => "bbb",
            Accidental::DoubleFlat => "bb",
            Accidental::Flat => "b",
            Accidental::Natural => "",
            Accidental::Sharp => "#",
            Accidental::DoubleSharp => "##",
            Accidental::TripleSharp => "###",
        };
        write!(f, "{symbol}")
    }
}

/// Defines the union of a natural note and an accidental that describes a pitch without an octave.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NoteClass(pub NaturalNote, pub Accidental);

#[allow(missing_docs)]
impl NoteClass {
    pub const A: NoteClass = NoteClass(NaturalNote::A, Accidental::Natural);
    pub const A_FLAT: NoteClass = NoteClass(NaturalNote::A, Accidental::Flat);
    pub const A_SHARP: NoteClass = NoteClass(NaturalNote::A, Accidental::Sharp);
    pub const B: NoteClass = NoteClass(NaturalNote::B, Accidental::Natural);
    pub const B_FLAT: NoteClass = NoteClass(NaturalNote::B, Accidental::Flat);
    pub const C: NoteClass = NoteClass(NaturalNote::C, Accidental::Natural);
    pub const C_SHARP: NoteClass = NoteClass(NaturalNote::C, Accidental::Sharp);
    pub const D: NoteClass = NoteClass(NaturalNote::D, Accidental::Natural);
    pub const D_FLAT: NoteClass = NoteClass(NaturalNote::D, Accidental::Flat);
    pub const D_SHARP: NoteClass = NoteClass(NaturalNote::D, Accidental::Sharp);
    pub const E: NoteClass = NoteClass(NaturalNote::E, Accidental::Natural);
    pub const E_FLAT: NoteClass = NoteClass(NaturalNote::E, Accidental::Flat);
    pub const E_SHARP: NoteClass = NoteClass(NaturalNote::E, Accidental::Sharp);
    pub const F: NoteClass = NoteClass(NaturalNote::F, Accidental::Natural);
    pub const F_SHARP: NoteClass = NoteClass(NaturalNote::F, Accidental::Sharp);
    pub const G: NoteClass = NoteClass(NaturalNote::G, Accidental::Natural);
    pub const G_FLAT: NoteClass = NoteClass(NaturalNote::G, Accidental::Flat);
    pub const G_SHARP: NoteClass = NoteClass(NaturalNote::G, Accidental::Sharp);

    /// Returns the pitch class of the note in the range 0 (C) to 11 (B).
    #[must_use]
    pub fn pitch_class(&self) -> i32 {
        (self.0.semitones() + self.1.offset()).rem_euclid(12)
    }

    /// Returns the conventional spelling of the given pitch class, using a single flat or a single
    /// sharp for the black keys.
    #[must_use]
    pub fn from_pitch_class(pitch_class: i32, prefer_flats: bool) -> NoteClass {
        match (pitch_class.rem_euclid(12), prefer_flats) {
            (0, _) => NoteClass::C,
            (1, false) => NoteClass::C_SHARP,
            (1, true) => NoteClass::D_FLAT,
            (2, _) => NoteClass::D,
            (3, false) => NoteClass::D_SHARP,
            (3, true) => NoteClass::E_FLAT,
            (4, _) => NoteClass::E,
            (5, _) => NoteClass::F,
            (6, false) => NoteClass::F_SHARP,
            (6, true) => NoteClass::G_FLAT,
            (7, _) => NoteClass::G,
            (8, false) => NoteClass::G_SHARP,
            (8, true) => NoteClass::A_FLAT,
            (9, _) => NoteClass::A,
            (10, false) => NoteClass::A_SHARP,
            (10, true) => NoteClass::B_FLAT,
            _ => NoteClass::B,
        }
    }

    /// Returns the note class spelled with the given letter that has the same pitch class as
    /// this one, if it can be written with at most three accidentals.
    #[must_use]
    pub fn with_letter(&self, letter: NaturalNote) -> Option<NoteClass> {
        let offset = (self.pitch_class() - letter.semitones() + 6).rem_euclid(12) - 6;
        Accidental::from_offset(offset).map(|accidental| NoteClass(letter, accidental))
    }

    /// Returns the conventional spelling of this note class. Natural notes and notes which are
    /// already spelled in the preferred direction are left untouched.
    #[must_use]
    pub fn respell(&self, prefer_flats: bool) -> NoteClass {
        match self.1 {
            Accidental::Natural => *self,
            Accidental::Flat if prefer_flats => *self,
            Accidental::Sharp if !prefer_flats => *self,
            _ => NoteClass::from_pitch_class(self.pitch_class(), prefer_flats),
        }
    }

    /// Returns whether both note classes refer to the same pitch class.
    #[must_use]
    pub fn is_enharmonic(&self, other: &NoteClass) -> bool {
        self.pitch_class() == other.pitch_class()
    }

    /// Returns a representation of the note class using the Unicode music symbols.
    #[must_use]
    pub fn to_unicode_string(&self) -> String {
        format!("{}{}", self.0, self.1.to_unicode_string())
    }

    /// Parses a note class at the start of the given string and returns it together with the
    /// unparsed remainder.
    pub(crate) fn parse_prefix(input: &str) -> Option<(NoteClass, &str)> {
        let mut chars = input.char_indices();
        let (_, letter) = chars.next()?;
        let natural = NaturalNote::from_char(letter)?;

        let mut offset: i32 = 0;
        let mut rest = &input[letter.len_utf8()..];
        for (index, c) in chars {
            let step = match c {
                '#' | '♯' => 1,
                'b' | '♭' => -1,
                _ => break,
            };
            // Mixing sharps and flats is not allowed.
            if offset != 0 && offset.signum() != step {
                return None;
            }
            offset += step;
            rest = &input[index + c.len_utf8()..];
        }

        let accidental = Accidental::from_offset(offset)?;
        Some((NoteClass(natural, accidental), rest))
    }
}

impl Display for NoteClass {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}{}", self.0, self.1)
    }
}

impl FromStr for NoteClass {
    type Err = MusicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match NoteClass::parse_prefix(s.trim()) {
            Some((note_class, "")) => Ok(note_class),
            _ => Err(MusicError::InvalidNoteClass(s.to_string())),
        }
    }
}

/// A note class placed in a specific octave. Octaves follow scientific pitch notation, so `C4` is
/// middle C and the octave number changes between B and C.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub struct Note {
    /// The name of the note without the octave.
    pub class: NoteClass,

    /// The octave in which the note is placed.
    pub octave: i8,
}

impl Note {
    /// Creates a new note.
    #[must_use]
    pub const fn new(class: NoteClass, octave: i8) -> Note {
        Note { class, octave }
    }

    /// Returns the absolute pitch of the note as a MIDI note number (`C4` = 60).
    #[must_use]
    pub fn pitch(&self) -> i32 {
        (i32::from(self.octave) + 1) * 12 + self.class.0.semitones() + self.class.1.offset()
    }

    /// Returns the note with the given absolute pitch using the conventional spelling.
    #[must_use]
    pub fn from_pitch(pitch: i32, prefer_flats: bool) -> Note {
        let class = NoteClass::from_pitch_class(pitch, prefer_flats);
        Self::spelled(class, pitch)
    }

    /// Returns the note with the given absolute pitch spelled with the given letter, if it can be
    /// written with at most three accidentals.
    #[must_use]
    pub fn from_pitch_with_letter(pitch: i32, letter: NaturalNote) -> Option<Note> {
        let class = NoteClass::from_pitch_class(pitch, false).with_letter(letter)?;
        Some(Self::spelled(class, pitch))
    }

    /// Places the note class in the octave that gives it the requested absolute pitch. The class
    /// must have the same pitch class as the pitch. Octaves outside the range of `i8` are clamped
    /// to its bounds.
    fn spelled(class: NoteClass, pitch: i32) -> Note {
        let octave = (pitch - class.0.semitones() - class.1.offset()).div_euclid(12) - 1;
        Note {
            class,
            octave: i8::try_from(octave).unwrap_or(if octave < 0 { i8::MIN } else { i8::MAX }),
        }
    }
}

impl Ord for Note {
    fn cmp(&self, other: &Self) -> Ordering {
        self.pitch()
            .cmp(&other.pitch())
            .then_with(|| self.class.0.cmp(&other.class.0))
            .then_with(|| self.class.1.cmp(&other.class.1))
    }
}

impl PartialOrd for Note {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Display for Note {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}{}", self.class, self.octave)
    }
}

impl FromStr for Note {
    type Err = MusicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (class, octave) = NoteClass::parse_prefix(s.trim())
            .ok_or_else(|| MusicError::InvalidNote(s.to_string()))?;
        let octave = octave
            .parse::<i8>()
            .map_err(|_| MusicError::InvalidNote(s.to_string()))?;
        Ok(Note::new(class, octave))
    }
}

impl TryFrom<String> for Note {
    type Error = MusicError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Note> for String {
    fn from(note: Note) -> Self {
        note.to_string()
    }
}

/// An inclusive range of notes, used to limit the register in which questions are played.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NotesRange {
    lowest: Note,
    highest: Note,
}

impl NotesRange {
    /// Creates a new range. The lowest note cannot be higher than the highest note.
    pub fn new(lowest: Note, highest: Note) -> Result<NotesRange, MusicError> {
        if lowest.pitch() > highest.pitch() {
            return Err(MusicError::InvalidRange(
                lowest.to_string(),
                highest.to_string(),
            ));
        }
        Ok(NotesRange { lowest, highest })
    }

    /// Parses both ends of the range and creates it.
    pub fn parse(lowest: &str, highest: &str) -> Result<NotesRange, MusicError> {
        NotesRange::new(lowest.parse()?, highest.parse()?)
    }

    /// Returns the lowest note in the range.
    #[must_use]
    pub fn lowest(&self) -> Note {
        self.lowest
    }

    /// Returns the highest note in the range.
    #[must_use]
    pub fn highest(&self) -> Note {
        self.highest
    }

    /// Returns whether the note sounds within the range.
    #[must_use]
    pub fn contains(&self, note: &Note) -> bool {
        (self.lowest.pitch()..=self.highest.pitch()).contains(&note.pitch())
    }

    /// Returns every chromatic note in the range in ascending order. Both ends keep their
    /// spelling and the notes in between are spelled with sharps.
    #[must_use]
    pub fn all_notes(&self) -> Vec<Note> {
        let (low, high) = (self.lowest.pitch(), self.highest.pitch());
        (low..=high)
            .map(|pitch| match pitch {
                p if p == low => self.lowest,
                p if p == high => self.highest,
                p => Note::from_pitch(p, false),
            })
            .collect()
    }
}

impl Transpose for NotesRange {
    fn transpose(&self, interval: Interval) -> Self {
        NotesRange {
            lowest: self.lowest.transpose(interval),
            highest: self.highest.transpose(interval),
        }
    }
}
