//! Contains the cadences played before a question to establish the key. All cadences are written
//! in C and transposed by the caller.

use std::sync::LazyLock;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoEnumIterator};

use crate::{
    data::music::{
        events::{Duration, NoteEvent},
        notes::{Note, NoteClass},
        scales::ScaleType,
    },
    error::MusicError,
};

/// The progressions that can be used to establish the key of an exercise.
#[derive(Clone, Copy, Debug, Display, EnumIter, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum CadenceType {
    /// The major cadence I IV V I.
    #[strum(serialize = "I IV V I")]
    #[serde(rename = "I IV V I")]
    Major,

    /// The minor cadence i iv V i.
    #[strum(serialize = "i iv V i")]
    #[serde(rename = "i iv V i")]
    Minor,
}

impl CadenceType {
    /// Parses the name of a cadence type (e.g. `I IV V I`).
    pub fn parse(name: &str) -> Result<CadenceType, MusicError> {
        CadenceType::iter()
            .find(|cadence_type| cadence_type.to_string() == name.trim())
            .ok_or_else(|| MusicError::InvalidCadenceType(name.to_string()))
    }

    /// Returns the scale whose tendencies are used when resolving notes after this cadence.
    #[must_use]
    pub fn scale_type(&self) -> ScaleType {
        match self {
            CadenceType::Major => ScaleType::Major,
            CadenceType::Minor => ScaleType::Minor,
        }
    }
}

/// Builds a four chord cadence. Each chord lasts a half note at the default tempo and the last one
/// a whole note.
fn build_cadence(chords: [[Note; 4]; 4]) -> Vec<NoteEvent> {
    let last = chords.len() - 1;
    chords
        .into_iter()
        .enumerate()
        .map(|(index, chord)| {
            let duration = if index == last {
                Duration::Whole
            } else {
                Duration::Half
            };
            NoteEvent::new(chord.to_vec(), duration).at(index as f64)
        })
        .collect()
}

const C3: Note = Note::new(NoteClass::C, 3);
const F3: Note = Note::new(NoteClass::F, 3);
const G3: Note = Note::new(NoteClass::G, 3);
const D4: Note = Note::new(NoteClass::D, 4);
const E4: Note = Note::new(NoteClass::E, 4);
const E_FLAT4: Note = Note::new(NoteClass::E_FLAT, 4);
const F4: Note = Note::new(NoteClass::F, 4);
const G4: Note = Note::new(NoteClass::G, 4);
const A4: Note = Note::new(NoteClass::A, 4);
const A_FLAT4: Note = Note::new(NoteClass::A_FLAT, 4);
const B4: Note = Note::new(NoteClass::B, 4);
const C5: Note = Note::new(NoteClass::C, 5);

/// The cadence I IV V I in C.
static MAJOR_CADENCE_IN_C: LazyLock<Vec<NoteEvent>> = LazyLock::new(|| {
    build_cadence([
        [C3, E4, G4, C5],
        [F3, F4, A4, C5],
        [G3, D4, G4, B4],
        [C3, E4, G4, C5],
    ])
});

/// The cadence i iv V i in C minor.
static MINOR_CADENCE_IN_C: LazyLock<Vec<NoteEvent>> = LazyLock::new(|| {
    build_cadence([
        [C3, E_FLAT4, G4, C5],
        [F3, F4, A_FLAT4, C5],
        [G3, D4, G4, B4],
        [C3, E_FLAT4, G4, C5],
    ])
});

/// Returns the cadence of the given type in C.
#[must_use]
pub fn cadence_in_c(cadence_type: CadenceType) -> &'static [NoteEvent] {
    match cadence_type {
        CadenceType::Major => MAJOR_CADENCE_IN_C.as_slice(),
        CadenceType::Minor => MINOR_CADENCE_IN_C.as_slice(),
    }
}

#[cfg(test)]
mod test {
    use anyhow::Result;

    use super::*;

    /// Verifies parsing and printing cadence types.
    #[test]
    fn parse_and_print() -> Result<()> {
        assert_eq!(CadenceType::Major.to_string(), "I IV V I");
        assert_eq!(CadenceType::parse("i iv V i")?, CadenceType::Minor);
        assert!(CadenceType::parse("ii V I").is_err());
        assert_eq!(serde_json::to_string(&CadenceType::Minor)?, "\"i iv V i\"");
        Ok(())
    }

    /// Verifies the shape of the cadences.
    #[test]
    fn cadences() {
        for cadence_type in CadenceType::iter() {
            let cadence = cadence_in_c(cadence_type);
            assert_eq!(cadence.len(), 4);
            assert!(cadence.iter().all(|event| event.notes.len() == 4));

            // Events are scheduled in order.
            let times: Vec<f64> = cadence.iter().filter_map(|event| event.time).collect();
            assert_eq!(times, vec![0.0, 1.0, 2.0, 3.0]);

            // Both cadences start and end on the tonic chord.
            assert_eq!(cadence[0].notes, cadence[3].notes);
            assert_eq!(cadence[0].notes[0], C3);
        }
        assert!(cadence_in_c(CadenceType::Minor)[1].notes.contains(&A_FLAT4));
        assert!(cadence_in_c(CadenceType::Major)[1].notes.contains(&A4));
    }
}
