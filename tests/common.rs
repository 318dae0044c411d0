//! Helpers shared by the integration tests.

use anyhow::Result;
use solfa::{
    data::{
        exercise::Question,
        music::{keys::Key, notes::Note},
    },
    error::ExerciseError,
    exercise::{
        Exercise,
        tonal::{TonalExercise, TonalExerciseOptions},
    },
    exercises::{chords_in_key, notes_in_key, triad_inversion},
};

/// Parses a note, panicking if the string is not a valid note.
#[allow(dead_code)]
pub fn note(note: &str) -> Note {
    note.parse().unwrap()
}

/// Parses a list of notes.
#[allow(dead_code)]
pub fn notes(notes: &[&str]) -> Vec<Note> {
    notes.iter().map(|s| note(s)).collect()
}

/// Creates every reference exercise with the given options.
#[allow(dead_code)]
pub fn all_exercises(options: &TonalExerciseOptions) -> Result<Vec<TonalExercise>, ExerciseError> {
    Ok(vec![
        notes_in_key::exercise(options)?,
        triad_inversion::exercise(options)?,
        chords_in_key::exercise(options)?,
    ])
}

/// Creates every reference exercise in the given key.
#[allow(dead_code)]
pub fn all_exercises_in_key(key: Key) -> Result<Vec<TonalExercise>, ExerciseError> {
    all_exercises(&TonalExerciseOptions {
        key: Some(key),
        seed: None,
    })
}

/// Simulates a student going through the given number of questions. Each question is checked
/// against the answers offered to the student before it is passed to `check`.
#[allow(dead_code)]
pub fn simulate(
    exercise: &mut dyn Exercise,
    num_questions: usize,
    check: impl Fn(&Question) -> Result<()>,
) -> Result<()> {
    for _ in 0..num_questions {
        let question = exercise.get_question()?;
        let answers = exercise.get_answer_list()?.answers();
        assert!(!question.segments.is_empty());
        for segment in &question.segments {
            assert!(
                answers.contains(&segment.right_answer),
                "answer {} of exercise {} is not offered",
                segment.right_answer,
                exercise.id()
            );
        }
        check(&question)?;
    }
    Ok(())
}
