//! Defines the timed note events handed to the playback collaborator.

use serde::{Deserialize, Serialize};

use crate::{
    data::music::{intervals::Interval, notes::Note},
    transpose::Transpose,
};

/// The tempo used to convert note values to seconds when none is given.
pub const DEFAULT_BPM: f64 = 120.0;

/// The length of an event, either as a note value relative to the tempo or as an absolute number
/// of seconds.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
#[allow(missing_docs)]
pub enum Duration {
    Whole,
    Half,
    Quarter,
    Eighth,
    Seconds(f64),
}

impl Duration {
    /// Returns the length of the duration in seconds at the given tempo, in quarter notes per
    /// minute.
    #[must_use]
    pub fn as_seconds(&self, bpm: f64) -> f64 {
        let quarter = 60.0 / bpm;
        match self {
            Duration::Whole => 4.0 * quarter,
            Duration::Half => 2.0 * quarter,
            Duration::Quarter => quarter,
            Duration::Eighth => quarter / 2.0,
            Duration::Seconds(seconds) => *seconds,
        }
    }
}

/// A group of notes played together.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct NoteEvent {
    /// The notes played by the event.
    pub notes: Vec<Note>,

    /// How long the notes sound.
    pub duration: Duration,

    /// The velocity of the notes between 0 and 1. The player decides the velocity if missing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub velocity: Option<f64>,

    /// The offset in seconds from the start of the part. Events without a time are played after
    /// the previous event ends.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<f64>,
}

impl NoteEvent {
    /// Creates an event without a velocity or start time.
    #[must_use]
    pub fn new(notes: Vec<Note>, duration: Duration) -> NoteEvent {
        NoteEvent {
            notes,
            duration,
            velocity: None,
            time: None,
        }
    }

    /// Returns the event with the given velocity.
    #[must_use]
    pub fn with_velocity(mut self, velocity: f64) -> NoteEvent {
        self.velocity = Some(velocity);
        self
    }

    /// Returns the event starting at the given offset in seconds.
    #[must_use]
    pub fn at(mut self, time: f64) -> NoteEvent {
        self.time = Some(time);
        self
    }
}

impl Transpose for NoteEvent {
    fn transpose(&self, interval: Interval) -> Self {
        NoteEvent {
            notes: self.notes.transpose(interval),
            ..self.clone()
        }
    }
}

/// The musical material of a segment. Exercises may describe it as a single note, a group of notes
/// played together, or a list of timed events.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
#[allow(missing_docs)]
pub enum PartToPlay {
    Note(Note),
    Notes(Vec<Note>),
    Events(Vec<NoteEvent>),
}

impl PartToPlay {
    /// Returns every note in the part, in the order in which they appear.
    #[must_use]
    pub fn notes(&self) -> Vec<Note> {
        match self {
            PartToPlay::Note(note) => vec![*note],
            PartToPlay::Notes(notes) => notes.clone(),
            PartToPlay::Events(events) => events
                .iter()
                .flat_map(|event| event.notes.iter().copied())
                .collect(),
        }
    }
}

impl Transpose for PartToPlay {
    fn transpose(&self, interval: Interval) -> Self {
        match self {
            PartToPlay::Note(note) => PartToPlay::Note(note.transpose(interval)),
            PartToPlay::Notes(notes) => PartToPlay::Notes(notes.transpose(interval)),
            PartToPlay::Events(events) => PartToPlay::Events(events.transpose(interval)),
        }
    }
}

impl From<Note> for PartToPlay {
    fn from(note: Note) -> Self {
        PartToPlay::Note(note)
    }
}

impl From<Vec<NoteEvent>> for PartToPlay {
    fn from(events: Vec<NoteEvent>) -> Self {
        PartToPlay::Events(events)
    }
}

/// Returns a part in which all the notes are played together once.
#[must_use]
pub fn to_steady_part(notes: Vec<Note>, duration: Duration, velocity: Option<f64>) -> PartToPlay {
    let mut event = NoteEvent::new(notes, duration);
    event.velocity = velocity;
    PartToPlay::Events(vec![event])
}
