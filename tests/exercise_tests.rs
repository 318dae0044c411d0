//! End-to-end tests of the reference exercises.
//!
//! Questions are random, so instead of checking the exact output of `get_question` these tests run
//! simulated sessions in every key and verify properties that must hold for every question: the
//! right answers are offered to the student, the cadence establishes the key of the exercise, and
//! the music stays inside the requested limits.

mod common;

use anyhow::Result;
use pretty_assertions::assert_eq;
use solfa::{
    data::{
        exercise::{Question, Settings},
        music::{
            events::PartToPlay,
            keys::Key,
            notes::{Note, NotesRange},
        },
    },
    error::ExerciseError,
    exercise::{
        Exercise,
        augmentations::{
            CADENCE_TYPE, INCLUDED_ANSWERS, NUMBER_OF_SEGMENTS, PLAY_AFTER_CORRECT_ANSWER,
        },
        tonal::{TonalExercise, TonalExerciseOptions, TonalExerciseOptionsBuilder},
    },
    exercises::{chords_in_key, notes_in_key, triad_inversion},
    random::SequenceRandom,
};
use ustr::Ustr;

use common::*;

/// Returns the lowest note of the first chord of the cadence.
fn cadence_bass(question: &Question) -> Option<Note> {
    let cadence = question.cadence.as_ref()?;
    cadence.first()?.notes.iter().min().copied()
}

/// Verifies that every exercise in every key asks questions whose answers are offered and whose
/// cadence starts on the tonic of the key.
#[test]
fn questions_in_every_key() -> Result<()> {
    for key in Key::ALL {
        for mut exercise in all_exercises_in_key(key)? {
            simulate(&mut exercise, 10, |question| {
                let bass = cadence_bass(question).map(|note| note.class);
                assert_eq!(bass, Some(key.tonic()));
                assert!(question.info.starts_with(&format!("Key: {key}")));
                Ok(())
            })?;
        }
    }
    Ok(())
}

/// Verifies that the minor cadence is played when selected.
#[test]
fn minor_cadence() -> Result<()> {
    for mut exercise in all_exercises_in_key(Key::A)? {
        let settings = exercise
            .get_default_settings()
            .with(CADENCE_TYPE, "i iv V i");
        exercise.update_settings(settings)?;
        simulate(&mut exercise, 3, |question| {
            // The second chord of the cadence is D minor in A.
            let cadence = question.cadence.clone().unwrap_or_default();
            let classes: Vec<String> = cadence[1]
                .notes
                .iter()
                .map(|note| note.class.to_string())
                .collect();
            assert!(classes.contains(&"F".to_string()));
            Ok(())
        })?;
    }
    Ok(())
}

/// Verifies that the default settings do not change between calls or after updating the settings.
#[test]
fn default_settings_are_stable() -> Result<()> {
    for mut exercise in all_exercises(&TonalExerciseOptions::default())? {
        let defaults = exercise.get_default_settings();
        assert_eq!(defaults, exercise.get_default_settings());

        let changed = defaults.clone().with(CADENCE_TYPE, "i iv V i");
        exercise.update_settings(changed.clone())?;
        assert_eq!(exercise.current_settings(), &changed);
        assert_eq!(exercise.get_default_settings(), defaults);
    }
    Ok(())
}

/// Verifies that every descriptor refers to a default setting and that the settings can be stored
/// as JSON and restored.
#[test]
fn settings_round_trip() -> Result<()> {
    for mut exercise in all_exercises(&TonalExerciseOptions::default())? {
        let defaults = exercise.get_default_settings();
        for descriptor in exercise.get_settings_descriptors() {
            assert!(
                defaults.contains_key(&descriptor.key),
                "{} has no default",
                descriptor.key
            );
        }
        let descriptors = serde_json::to_string(exercise.get_settings_descriptors())?;
        assert!(descriptors.contains("\"type\""));

        let restored = Settings::from_json(&defaults.to_json()?)?;
        assert_eq!(restored, defaults);
        exercise.update_settings(restored)?;
    }
    Ok(())
}

/// Verifies that incomplete or invalid settings are rejected and leave the settings untouched.
#[test]
fn invalid_settings() -> Result<()> {
    let mut exercise = notes_in_key::exercise(&TonalExerciseOptions::default())?;
    let defaults = exercise.get_default_settings();

    let result = exercise.update_settings(Settings::new().with(CADENCE_TYPE, "I IV V I"));
    assert!(matches!(result, Err(ExerciseError::UpdateSettings(_, _))));

    let result = exercise.update_settings(defaults.clone().with(CADENCE_TYPE, "I V I"));
    assert!(matches!(result, Err(ExerciseError::UpdateSettings(_, _))));
    assert_eq!(exercise.current_settings(), &defaults);
    Ok(())
}

/// Verifies that excluding every answer fails instead of producing an empty question.
#[test]
fn no_included_answers() -> Result<()> {
    for mut exercise in all_exercises(&TonalExerciseOptions::default())? {
        let settings = exercise
            .get_default_settings()
            .with(INCLUDED_ANSWERS, Vec::<String>::new());
        exercise.update_settings(settings)?;
        assert!(matches!(
            exercise.get_question(),
            Err(ExerciseError::GetQuestion(_, _))
        ));
        assert!(matches!(
            exercise.get_answer_list(),
            Err(ExerciseError::GetAnswerList(_, _))
        ));
    }
    Ok(())
}

/// Verifies that the notes of the scale degrees exercise stay inside each range in every key.
#[test]
fn notes_in_range() -> Result<()> {
    let ranges = [
        ("high", "C4", "G6"),
        ("middle", "G2", "E4"),
        ("bass", "A1", "C3"),
        ("contrabass", "Eb1", "Eb2"),
    ];
    for key in Key::ALL {
        let mut exercise = notes_in_key::exercise(&TonalExerciseOptions {
            key: Some(key),
            seed: Some(key.tonic().pitch_class() as u64),
        })?;
        for (name, lowest, highest) in ranges {
            let range = NotesRange::parse(lowest, highest)?;
            let settings = exercise
                .get_default_settings()
                .with(notes_in_key::NOTES_RANGE, name)
                .with(NUMBER_OF_SEGMENTS, 8_usize);
            exercise.update_settings(settings)?;
            simulate(&mut exercise, 5, |question| {
                for segment in &question.segments {
                    for note in segment.part_to_play.notes() {
                        assert!(range.contains(&note), "{note} is not in {name} in {key}");
                    }
                }
                Ok(())
            })?;
        }
    }
    Ok(())
}

/// Verifies that a single note is followed by its resolution to the tonic in the key.
#[test]
fn resolution_in_key() -> Result<()> {
    // Picks the key of E. In C the middle range becomes Eb2 to C4, whose second option is G2.
    let definition = notes_in_key::definition()?;
    let random = SequenceRandom::new([4, 1]);
    let mut exercise = TonalExercise::with_random(definition, None, Box::new(random))?;
    assert_eq!(exercise.key(), Key::E);
    let settings = exercise.get_default_settings().with(
        INCLUDED_ANSWERS,
        vec!["Do".to_string(), "Mi".to_string(), "Sol".to_string()],
    );
    exercise.update_settings(settings)?;

    let question = exercise.get_question()?;
    assert_eq!(question.segments[0].right_answer, Ustr::from("Sol"));
    assert_eq!(question.segments[0].part_to_play, PartToPlay::Note(note("B2")));
    let resolution: Vec<Note> = question
        .after_correct_answer
        .unwrap_or_default()
        .iter()
        .flat_map(|after| after.part_to_play.notes())
        .collect();
    assert_eq!(resolution, notes(&["B2", "E3"]));
    Ok(())
}

/// Verifies that the resolution can be turned off.
#[test]
fn resolution_disabled() -> Result<()> {
    let mut exercise = notes_in_key::exercise(&TonalExerciseOptions::default())?;
    let settings = exercise
        .get_default_settings()
        .with(PLAY_AFTER_CORRECT_ANSWER, false);
    exercise.update_settings(settings)?;
    simulate(&mut exercise, 10, |question| {
        assert!(question.after_correct_answer.is_none());
        Ok(())
    })
}

/// Verifies that the triads of the inversion exercise have three notes in ascending order.
#[test]
fn triads_ascend() -> Result<()> {
    let options = TonalExerciseOptionsBuilder::default().seed(11).build()?;
    let mut exercise = triad_inversion::exercise(&options)?;
    for _ in 0..12 {
        exercise.reset_key();
        simulate(&mut exercise, 5, |question| {
            let notes = question.segments[0].part_to_play.notes();
            assert_eq!(notes.len(), 3);
            assert!(notes.windows(2).all(|pair| pair[0].pitch() < pair[1].pitch()));
            Ok(())
        })?;
    }
    Ok(())
}

/// Verifies that the chords of the progression exercise move smoothly.
#[test]
fn progression_moves_smoothly() -> Result<()> {
    let options = TonalExerciseOptionsBuilder::default()
        .key(Key::B)
        .seed(3)
        .build()?;
    let mut exercise = chords_in_key::exercise(&options)?;
    let settings = exercise
        .get_default_settings()
        .with(NUMBER_OF_SEGMENTS, 8_usize);
    exercise.update_settings(settings)?;
    simulate(&mut exercise, 10, |question| {
        let upper_voices: Vec<Vec<i32>> = question
            .segments
            .iter()
            .map(|segment| {
                segment.part_to_play.notes()[1..]
                    .iter()
                    .map(Note::pitch)
                    .collect()
            })
            .collect();
        for pair in upper_voices.windows(2) {
            // Moving between any two of I, IV and V never needs a leap larger than a fifth.
            for pitch in &pair[1] {
                let closest = pair[0]
                    .iter()
                    .map(|previous| (previous - pitch).abs())
                    .min()
                    .unwrap_or_default();
                assert!(closest <= 7);
            }
        }
        Ok(())
    })
}

/// Verifies that equal seeds produce equal sessions.
#[test]
fn seeded_sessions() -> Result<()> {
    let options = TonalExerciseOptionsBuilder::default().seed(42).build()?;
    let mut first = chords_in_key::exercise(&options)?;
    let mut second = chords_in_key::exercise(&options)?;
    assert_eq!(first.key(), second.key());
    for _ in 0..5 {
        assert_eq!(first.get_question()?, second.get_question()?);
    }
    Ok(())
}
