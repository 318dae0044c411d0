//! Defines the transposition of pitch-bearing structures by an interval.
//!
//! Transposition only touches the pitches of a structure. Timing, velocity, labels, and the order
//! of the elements are preserved exactly, and the result has the same shape as the input. Notes are
//! spelled using the diatonic size of the interval when it is known, so transposing the notes of C
//! major by a major second yields the notes of D major (F becomes F#, not Gb).

use crate::data::music::{
    intervals::Interval,
    notes::{Accidental, NaturalNote, Note, NoteClass},
};

/// Trait implemented by every structure that carries pitches and can be moved to another key.
pub trait Transpose: Sized {
    /// Returns a copy of the structure with every pitch moved by the given interval.
    fn transpose(&self, interval: Interval) -> Self;
}

/// Returns whether a note with the given accidental moved by the given number of semitones should
/// be spelled with flats when the interval does not specify the spelling.
fn prefers_flats(accidental: Accidental, semitones: i32) -> bool {
    match accidental {
        Accidental::Flat | Accidental::DoubleFlat | Accidental::TripleFlat => true,
        Accidental::Sharp | Accidental::DoubleSharp | Accidental::TripleSharp => false,
        Accidental::Natural => semitones < 0,
    }
}

impl Transpose for NoteClass {
    fn transpose(&self, interval: Interval) -> Self {
        let pitch_class = self.pitch_class() + interval.semitones;
        let conventional =
            || NoteClass::from_pitch_class(pitch_class, prefers_flats(self.1, interval.semitones));
        match interval.steps {
            Some(steps) => {
                let letter = NaturalNote::from_index(self.0.index() + steps);
                NoteClass::from_pitch_class(pitch_class, false)
                    .with_letter(letter)
                    .unwrap_or_else(conventional)
            }
            None => conventional(),
        }
    }
}

impl Transpose for Note {
    fn transpose(&self, interval: Interval) -> Self {
        let pitch = self.pitch() + interval.semitones;
        let conventional =
            || Note::from_pitch(pitch, prefers_flats(self.class.1, interval.semitones));
        match interval.steps {
            Some(steps) => {
                let letter = NaturalNote::from_index(self.class.0.index() + steps);
                Note::from_pitch_with_letter(pitch, letter).unwrap_or_else(conventional)
            }
            None => conventional(),
        }
    }
}

impl<T: Transpose> Transpose for Vec<T> {
    fn transpose(&self, interval: Interval) -> Self {
        self.iter().map(|item| item.transpose(interval)).collect()
    }
}

impl<T: Transpose> Transpose for Option<T> {
    fn transpose(&self, interval: Interval) -> Self {
        self.as_ref().map(|item| item.transpose(interval))
    }
}

#[cfg(test)]
mod test {
    use anyhow::Result;

    use super::*;

    fn note(s: &str) -> Note {
        s.parse().unwrap()
    }

    /// Verifies transposing single notes, including across octave boundaries.
    #[test]
    fn transpose_note() {
        assert_eq!(note("C4").transpose(Interval::PERFECT_FIFTH), note("G4"));
        assert_eq!(note("B3").transpose(Interval::MINOR_SECOND), note("C4"));
        assert_eq!(note("C4").transpose(-Interval::MINOR_SECOND), note("B3"));
        assert_eq!(note("E4").transpose(Interval::OCTAVE), note("E5"));
        assert_eq!(note("A4").transpose(Interval::new(-9, -5)), note("C4"));
    }

    /// Verifies that diatonic intervals keep the spelling of the target key.
    #[test]
    fn diatonic_spelling() {
        // The fourth degree of C becomes the fourth degree of D.
        assert_eq!(note("F4").transpose(Interval::MAJOR_SECOND), note("G4"));
        assert_eq!(note("B4").transpose(Interval::MAJOR_SECOND), note("C#5"));
        assert_eq!(note("E4").transpose(Interval::MINOR_SECOND), note("F4"));
        assert_eq!(NoteClass::E.transpose(Interval::TRITONE), NoteClass::A_SHARP);
        assert_eq!(NoteClass::A.transpose(Interval::MINOR_SECOND), NoteClass::B_FLAT);
        assert_eq!(
            NoteClass::B.transpose(Interval::TRITONE),
            NoteClass(NaturalNote::E, Accidental::Sharp)
        );
    }

    /// Verifies the spelling used when the interval does not specify one, or when the diatonic
    /// spelling would need more than three accidentals.
    #[test]
    fn conventional_spelling() {
        assert_eq!(note("C4").transpose(Interval::chromatic(1)), note("C#4"));
        assert_eq!(note("C4").transpose(Interval::chromatic(-1)), note("B3"));
        assert_eq!(note("Eb4").transpose(Interval::chromatic(1)), note("E4"));
        assert_eq!(note("Eb4").transpose(Interval::chromatic(3)), note("Gb4"));
        assert_eq!(
            NoteClass::D_SHARP.transpose(Interval::chromatic(-2)),
            NoteClass::C_SHARP
        );
        let f_double_sharp = Note::new(NoteClass(NaturalNote::F, Accidental::DoubleSharp), 4);
        assert_eq!(
            f_double_sharp.transpose(Interval::TRITONE),
            Note::new(NoteClass(NaturalNote::B, Accidental::DoubleSharp), 4)
        );
        assert_eq!(
            f_double_sharp.transpose(Interval::AUGMENTED_FIFTH),
            Note::new(NoteClass(NaturalNote::C, Accidental::TripleSharp), 5)
        );
        // A C spelling of E would need four sharps.
        assert_eq!(f_double_sharp.transpose(Interval::new(9, 4)), note("E5"));
    }

    /// Verifies that collections are transposed element by element.
    #[test]
    fn transpose_collections() -> Result<()> {
        let notes = vec![note("C4"), note("E4"), note("G4")];
        assert_eq!(
            notes.transpose(Interval::MAJOR_THIRD),
            vec![note("E4"), note("G#4"), note("B4")]
        );
        assert_eq!(Some(note("C4")).transpose(Interval::OCTAVE), Some(note("C5")));
        assert_eq!(None::<Note>.transpose(Interval::OCTAVE), None);
        Ok(())
    }
}
