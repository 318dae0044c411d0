//! Contains the exercise in which the student identifies the inversion of a triad from the key.

use anyhow::{Result, anyhow};
use indoc::indoc;
use strum::IntoEnumIterator;
use ustr::Ustr;

use crate::{
    data::{
        exercise::{
            AfterCorrectAnswer, AnswerConfig, AnswerList, ControlDescriptor, Question, Segment,
            Settings, SettingsDescriptor,
        },
        music::{
            chords::{Chord, ChordType, TriadInversion, VoicingOptionsBuilder},
            events::{DEFAULT_BPM, Duration, NoteEvent, PartToPlay, to_steady_part},
            notes::{Note, NoteClass},
        },
    },
    error::ExerciseError,
    exercise::{
        ExerciseDefinition, QuestionContext,
        augmentations::{cadence_type_setting, included_answers, included_answers_setting},
        compose,
        tonal::{TonalExercise, TonalExerciseOptions},
    },
};

/// The unique ID of the exercise.
pub const ID: &str = "triad_inversion";

/// The key of the setting with the delay between the notes of the triad, as a percentage of a
/// second.
pub const ARPEGGIATE_SPEED: &str = "arpeggiate_speed";

/// The key of the setting controlling whether the root is played after a correct answer.
pub const PLAY_ROOT_AFTER_ANSWER: &str = "play_root_after_answer";

/// The diatonic triads of C major, excluding the diminished triad.
const TRIADS_IN_C: [Chord; 6] = [
    Chord {
        root: NoteClass::C,
        chord_type: ChordType::Major,
    },
    Chord {
        root: NoteClass::D,
        chord_type: ChordType::Minor,
    },
    Chord {
        root: NoteClass::E,
        chord_type: ChordType::Minor,
    },
    Chord {
        root: NoteClass::F,
        chord_type: ChordType::Major,
    },
    Chord {
        root: NoteClass::G,
        chord_type: ChordType::Major,
    },
    Chord {
        root: NoteClass::A,
        chord_type: ChordType::Minor,
    },
];

/// The octave in which the triads are voiced.
const TRIAD_OCTAVE: i8 = 3;

/// The velocity of the triads and of the root played after the answer.
const VELOCITY: f64 = 0.3;

/// Returns the notes of the triad, starting each one after the previous by the given delay in
/// seconds. All the notes stop together.
fn arpeggiate(voicing: &[Note], delay: f64) -> Vec<NoteEvent> {
    let whole = Duration::Whole.as_seconds(DEFAULT_BPM);
    let last_start = (voicing.len().saturating_sub(1)) as f64 * delay;
    voicing
        .iter()
        .enumerate()
        .map(|(index, note)| {
            let start = index as f64 * delay;
            NoteEvent::new(vec![*note], Duration::Seconds(whole + last_start - start))
                .with_velocity(VELOCITY)
                .at(start)
        })
        .collect()
}

fn question(settings: &Settings, context: &mut QuestionContext<'_>) -> Result<Question> {
    let included = included_answers(settings)?;
    let inversions: Vec<TriadInversion> = TriadInversion::iter()
        .filter(|inversion| included.contains(&Ustr::from(inversion.to_string().as_str())))
        .collect();
    let inversion = *context.choose(&inversions)?;
    let chord = *context.choose(&TRIADS_IN_C)?;

    let voicing = chord.voicing(
        &VoicingOptionsBuilder::default()
            .inversion(inversion.index())
            .octave(TRIAD_OCTAVE)
            .build()?,
    )?;
    let speed = settings.get_number(ARPEGGIATE_SPEED)?;
    if !(0.0..=100.0).contains(&speed) {
        return Err(anyhow!(
            "the arpeggiate speed must be between 0 and 100, got {speed}"
        ));
    }

    let answer = Ustr::from(inversion.to_string().as_str());
    let after_correct_answer = if settings.get_bool(PLAY_ROOT_AFTER_ANSWER)? {
        let root = voicing[(3 - inversion.index()) % 3];
        Some(vec![AfterCorrectAnswer {
            answer_to_highlight: Some(answer),
            part_to_play: to_steady_part(vec![root], Duration::Whole, Some(VELOCITY)),
        }])
    } else {
        None
    };

    Ok(Question {
        segments: vec![Segment {
            right_answer: answer,
            part_to_play: PartToPlay::Events(arpeggiate(&voicing, speed / 100.0)),
        }],
        after_correct_answer,
        cadence: None,
        info: String::new(),
    })
}

fn answer_list(_: &Settings) -> Result<AnswerList> {
    Ok(AnswerList::rows(
        TriadInversion::iter()
            .map(|inversion| vec![AnswerConfig::new(inversion.to_string().as_str())]),
    ))
}

/// Returns the definition of the exercise.
pub fn definition() -> Result<ExerciseDefinition, ExerciseError> {
    let base = ExerciseDefinition::new(
        ID,
        "Triad Inversions",
        "Identify the inversion of a triad in close position",
        question,
        answer_list,
    )
    .with_defaults(
        &Settings::new()
            .with(ARPEGGIATE_SPEED, 0.0)
            .with(PLAY_ROOT_AFTER_ANSWER, true),
    )
    .with_descriptors([
        SettingsDescriptor::new(
            ARPEGGIATE_SPEED,
            ControlDescriptor::Slider {
                label: "Arpeggiate Speed".to_string(),
                min: 0.0,
                max: 100.0,
                step: 1.0,
            },
        )
        .with_info(indoc! {"
            Plays the notes of the triad one after the other, from the lowest. Zero plays them
            together.
        "}),
        SettingsDescriptor::new(
            PLAY_ROOT_AFTER_ANSWER,
            ControlDescriptor::Checkbox {
                label: "Play Root After Correct Answer".to_string(),
            },
        ),
    ]);

    let all: Vec<String> = TriadInversion::iter().map(|i| i.to_string()).collect();
    let all: Vec<&str> = all.iter().map(String::as_str).collect();
    compose(
        base,
        [
            cadence_type_setting(),
            included_answers_setting(&all, "Inversions"),
        ],
    )
}

/// Creates the exercise with the given options.
pub fn exercise(options: &TonalExerciseOptions) -> Result<TonalExercise, ExerciseError> {
    TonalExercise::new(definition()?, options)
}
