//! Contains the music theory model used to generate and transpose exercises.

pub mod cadences;
pub mod chords;
pub mod events;
pub mod intervals;
pub mod keys;
pub mod notes;
pub mod scale_degrees;
pub mod scales;
