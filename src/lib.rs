//! Solfa is an engine for tonal ear-training exercises. Every question is heard in a key that is
//! first established by a cadence, and the student answers by naming what they heard relative to
//! that key: the scale degree of a note, the function of a chord, or the inversion of a triad.
//!
//! Exercises are written once in the key of C as an [exercise::ExerciseDefinition] containing a
//! question generator and an answer list. Augmentations add the settings shared by many exercises,
//! such as the cadence type or the answers included in the questions, and the tonal exercise in
//! [exercise::tonal] moves every question and preview into a randomly chosen key before handing
//! it to the host.
//!
//! The crate produces only data. Playing the notes, rendering the settings controls, and storing
//! the settings are left to the application hosting the exercises.

//! The name comes from tonic sol-fa, the system of naming notes by their position in the key (Do,
//! Re, Mi...) on which these exercises are built.

pub mod data;
pub mod error;
pub mod exercise;
pub mod exercises;
pub mod random;
pub mod transpose;
