//! Contains the errors returned by solfa.

use thiserror::Error;
use ustr::Ustr;

/// An error returned when parsing or constructing music theory objects.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum MusicError {
    #[error("invalid note {0}")]
    InvalidNote(String),

    #[error("invalid note class {0}")]
    InvalidNoteClass(String),

    #[error("invalid key {0}")]
    InvalidKey(String),

    #[error("invalid chord symbol {0}")]
    InvalidChord(String),

    #[error("invalid scale degree {0}")]
    InvalidScaleDegree(String),

    #[error("invalid solfege name {0}")]
    InvalidSolfege(String),

    #[error("invalid cadence type {0}")]
    InvalidCadenceType(String),

    #[error("invalid voicing for chord {0}: {1}")]
    InvalidVoicing(String, String),

    #[error("invalid notes range {0} - {1}")]
    InvalidRange(String, String),
}

/// An error returned when defining or running an exercise.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum ExerciseError {
    #[error("invalid configuration for exercise {0}: {1}")]
    Configuration(Ustr, String),

    #[error("cannot generate a question for exercise {0}: {1}")]
    GetQuestion(Ustr, #[source] anyhow::Error),

    #[error("cannot generate the answer list for exercise {0}: {1}")]
    GetAnswerList(Ustr, #[source] anyhow::Error),

    #[error("cannot update the settings of exercise {0}: {1}")]
    UpdateSettings(Ustr, #[source] anyhow::Error),
}
