//! Defines the data structures shared between the music theory model and the exercises built on
//! top of it.

pub mod exercise;
pub mod music;
