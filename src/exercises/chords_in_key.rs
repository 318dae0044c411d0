//! Contains the exercise in which the student identifies the roman numeral of each chord in a
//! progression heard after the cadence.

use anyhow::Result;
use ustr::Ustr;

use crate::{
    data::{
        exercise::{AnswerConfig, AnswerList, Question, Segment, Settings},
        music::{
            chords::{Chord, ChordType, VoicingOptionsBuilder, voice_chord_progression},
            events::{Duration, NoteEvent, PartToPlay, to_steady_part},
            notes::NoteClass,
        },
    },
    error::ExerciseError,
    exercise::{
        ExerciseDefinition, QuestionContext,
        augmentations::{
            NUMBER_OF_SEGMENTS, cadence_type_setting, included_answers, included_answers_setting,
            number_of_segments, number_of_segments_setting,
        },
        compose,
        tonal::{TonalExercise, TonalExerciseOptions},
    },
};

/// The unique ID of the exercise.
pub const ID: &str = "chords_in_key";

/// The primary chords of C major and their roman numerals.
const CHORDS_IN_C: [(&str, Chord); 3] = [
    (
        "I",
        Chord {
            root: NoteClass::C,
            chord_type: ChordType::Major,
        },
    ),
    (
        "IV",
        Chord {
            root: NoteClass::F,
            chord_type: ChordType::Major,
        },
    ),
    (
        "V",
        Chord {
            root: NoteClass::G,
            chord_type: ChordType::Major,
        },
    ),
];

const VELOCITY: f64 = 0.3;

/// The seeds from which the inversion of the first chord in the progression is chosen.
const FIRST_VOICINGS: [usize; 3] = [0, 1, 2];

fn question(settings: &Settings, context: &mut QuestionContext<'_>) -> Result<Question> {
    let included = included_answers(settings)?;
    let available: Vec<(&str, Chord)> = CHORDS_IN_C
        .into_iter()
        .filter(|(numeral, _)| included.contains(&Ustr::from(*numeral)))
        .collect();

    // A chord is never repeated immediately unless it is the only one available.
    let mut progression: Vec<(&str, Chord)> = vec![];
    for _ in 0..number_of_segments(settings)? {
        let candidates: Vec<(&str, Chord)> = match progression.last() {
            Some((last, _)) if available.len() > 1 => available
                .iter()
                .filter(|(numeral, _)| numeral != last)
                .copied()
                .collect(),
            _ => available.clone(),
        };
        progression.push(*context.choose(&candidates)?);
    }

    let chords: Vec<Chord> = progression.iter().map(|(_, chord)| *chord).collect();
    let seed = *context.choose(&FIRST_VOICINGS)?;
    let voicings = voice_chord_progression(&chords, seed)?;
    Ok(Question {
        segments: progression
            .iter()
            .zip(voicings)
            .map(|((numeral, _), voicing)| Segment {
                right_answer: Ustr::from(*numeral),
                part_to_play: PartToPlay::Events(vec![
                    NoteEvent::new(voicing, Duration::Half).with_velocity(VELOCITY),
                ]),
            })
            .collect(),
        ..Question::default()
    })
}

/// Returns the answer for the chord, previewed by playing it in root position.
fn answer(numeral: &str, chord: Chord) -> AnswerConfig {
    AnswerConfig::new(numeral).with_preview(move |_| {
        let options = VoicingOptionsBuilder::default().with_bass(true).build().ok()?;
        let voicing = chord.voicing(&options).ok()?;
        Some(to_steady_part(voicing, Duration::Half, Some(VELOCITY)))
    })
}

fn answer_list(_: &Settings) -> Result<AnswerList> {
    Ok(AnswerList::flat(
        CHORDS_IN_C
            .iter()
            .map(|(numeral, chord)| answer(numeral, *chord)),
    ))
}

/// Returns the definition of the exercise.
pub fn definition() -> Result<ExerciseDefinition, ExerciseError> {
    let base = ExerciseDefinition::new(
        ID,
        "Chord Functions",
        "Identify chords based on their tonal context in a particular key",
        question,
        answer_list,
    )
    .with_defaults(&Settings::new().with(NUMBER_OF_SEGMENTS, 3_usize));

    compose(
        base,
        [
            included_answers_setting(&["I", "IV", "V"], "Chords"),
            number_of_segments_setting("chords"),
            cadence_type_setting(),
        ],
    )
}

/// Creates the exercise with the given options.
pub fn exercise(options: &TonalExerciseOptions) -> Result<TonalExercise, ExerciseError> {
    TonalExercise::new(definition()?, options)
}

#[cfg(test)]
mod test {
    use anyhow::Result;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        data::music::{keys::Key, notes::Note},
        exercise::{Exercise, augmentations::INCLUDED_ANSWERS},
        random::SequenceRandom,
    };

    fn question_with(settings: &Settings, indices: &[usize]) -> Result<Question> {
        let definition = definition()?;
        let mut random = SequenceRandom::new(indices.iter().copied());
        let mut context = QuestionContext {
            key: Key::C,
            random: &mut random,
        };
        (definition.question)(settings, &mut context)
    }

    fn answers(question: &Question) -> Vec<&str> {
        question
            .segments
            .iter()
            .map(|segment| segment.right_answer.as_str())
            .collect()
    }

    /// Verifies the defaults of the exercise.
    #[test]
    fn defaults() -> Result<()> {
        let defaults = definition()?.default_settings;
        assert_eq!(number_of_segments(&defaults)?, 3);
        assert_eq!(included_answers(&defaults)?.len(), 3);
        Ok(())
    }

    /// Verifies the progression and its voicings.
    #[test]
    fn progression() -> Result<()> {
        let settings = definition()?.default_settings;

        // I, then V from [IV, V], then I from [I, IV], and the first voicing in root position.
        let question = question_with(&settings, &[0, 1, 0, 0])?;
        assert_eq!(answers(&question), vec!["I", "V", "I"]);

        let voicings: Vec<Vec<Note>> = question
            .segments
            .iter()
            .map(|segment| segment.part_to_play.notes())
            .collect();
        let expected: Vec<Vec<Note>> = vec![
            vec!["C2".parse()?, "C4".parse()?, "E4".parse()?, "G4".parse()?],
            vec!["G2".parse()?, "B3".parse()?, "D4".parse()?, "G4".parse()?],
            vec!["C2".parse()?, "C4".parse()?, "E4".parse()?, "G4".parse()?],
        ];
        assert_eq!(voicings, expected);

        let PartToPlay::Events(events) = &question.segments[0].part_to_play else {
            panic!("expected events");
        };
        assert_eq!(events[0].duration, Duration::Half);
        assert_eq!(events[0].velocity, Some(VELOCITY));
        Ok(())
    }

    /// Verifies that no chord is repeated immediately.
    #[test]
    fn no_repeats() -> Result<()> {
        let settings = definition()?
            .default_settings
            .with(NUMBER_OF_SEGMENTS, 8_usize);
        let mut exercise = exercise(&TonalExerciseOptions::default())?;
        exercise.update_settings(settings)?;
        for _ in 0..20 {
            let question = exercise.get_question()?;
            let answers = answers(&question);
            assert_eq!(answers.len(), 8);
            assert!(answers.windows(2).all(|pair| pair[0] != pair[1]));
        }
        Ok(())
    }

    /// Verifies that a single included chord is repeated.
    #[test]
    fn single_chord() -> Result<()> {
        let settings = definition()?
            .default_settings
            .with(INCLUDED_ANSWERS, vec!["IV".to_string()]);
        let question = question_with(&settings, &[])?;
        assert_eq!(answers(&question), vec!["IV", "IV", "IV"]);
        Ok(())
    }

    /// Verifies that previews follow the key of the exercise.
    #[test]
    fn previews() -> Result<()> {
        let options = TonalExerciseOptions {
            key: Some(Key::D),
            seed: None,
        };
        let exercise = exercise(&options)?;
        let list = exercise.get_answer_list()?;
        let preview = list
            .find("V")
            .and_then(|config| config.play_preview(&Question::default()));
        let notes = preview.map(|part| part.notes()).unwrap_or_default();
        assert_eq!(
            notes,
            vec![
                "A3".parse::<Note>()?,
                "A4".parse()?,
                "C#5".parse()?,
                "E5".parse()?
            ]
        );
        Ok(())
    }
}
