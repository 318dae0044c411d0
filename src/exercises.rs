//! Contains the definitions of the exercises built with the library. Each module exposes the ID of
//! its exercise, a `definition` function returning the composed definition in the key of C, and an
//! `exercise` function wrapping it in a [TonalExercise](crate::exercise::tonal::TonalExercise).

pub mod chords_in_key;
pub mod notes_in_key;
pub mod triad_inversion;
