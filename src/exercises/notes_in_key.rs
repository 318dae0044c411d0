//! Contains the exercise in which the student identifies single notes by their scale degree in the
//! key established by the cadence.

use anyhow::{Result, anyhow};
use indoc::indoc;
use ustr::Ustr;

use crate::{
    data::{
        exercise::{
            AfterCorrectAnswer, AnswerConfig, AnswerList, ControlDescriptor, Question, Segment,
            SelectOption, Settings, SettingsDescriptor,
        },
        music::{
            events::{Duration, NoteEvent, PartToPlay},
            keys::Key,
            notes::{Note, NotesRange},
            scale_degrees::{
                Solfege, note_class_to_scale_degree, resolution_notes, scale_degree_to_note_class,
                scale_degree_to_solfege, solfege_to_scale_degree,
            },
        },
    },
    error::ExerciseError,
    exercise::{
        ExerciseDefinition, QuestionContext,
        augmentations::{
            PLAY_AFTER_CORRECT_ANSWER, cadence_type, included_answers, melodic_augmentations,
            number_of_segments,
        },
        compose,
        tonal::{TonalExercise, TonalExerciseOptions},
    },
};

/// The unique ID of the exercise.
pub const ID: &str = "notes_in_key";

/// The key of the setting selecting the register in which the notes are played.
pub const NOTES_RANGE: &str = "notes_range";

/// The registers in which the notes can be played, as the value of the setting, its label, and the
/// lowest and highest notes heard by the student.
const RANGES: [(&str, &str, &str, &str); 4] = [
    ("high", "High", "C4", "G6"),
    ("middle", "Middle", "G2", "E4"),
    ("bass", "Bass", "A1", "C3"),
    ("contrabass", "Contra Bass", "Eb1", "Eb2"),
];

/// The key of the setting choosing how the answers are labeled.
pub const DISPLAY_MODE: &str = "display_mode";

/// The ways of labeling the answers, as the value of the setting and its label. Answers are
/// always solfege syllables, and the numeral mode only changes the text shown for them.
const DISPLAY_MODES: [(&str, &str); 2] = [("solfege", "Movable-Do"), ("numeral", "Numbers")];

/// The octave in which answers are previewed.
const PREVIEW_OCTAVE: i8 = 4;

/// Returns the range of notes heard by the student.
fn notes_range(settings: &Settings) -> Result<NotesRange> {
    let value = settings.get_text(NOTES_RANGE)?;
    let (_, _, lowest, highest) = RANGES
        .iter()
        .find(|(name, ..)| *name == value)
        .ok_or_else(|| anyhow!("unknown notes range {value}"))?;
    Ok(NotesRange::parse(lowest, highest)?)
}

/// Returns the solfege name of a note in C.
fn solfege_in_c(note: &Note) -> Option<Solfege> {
    scale_degree_to_solfege(note_class_to_scale_degree(note.class, Key::REFERENCE))
}

fn to_ustr(solfege: Solfege) -> Ustr {
    Ustr::from(solfege.to_string().as_str())
}

/// Returns every note in the range, in C, that matches one of the given syllables, spelled as the
/// syllable implies.
fn question_options(range: &NotesRange, included: &[Solfege]) -> Vec<(Note, Solfege)> {
    range
        .all_notes()
        .into_iter()
        .flat_map(|note| {
            included.iter().filter_map(move |solfege| {
                let class =
                    scale_degree_to_note_class(solfege_to_scale_degree(*solfege), Key::REFERENCE);
                if class.pitch_class() != note.class.pitch_class() {
                    return None;
                }
                Note::from_pitch_with_letter(note.pitch(), class.0).map(|note| (note, *solfege))
            })
        })
        .collect()
}

/// Returns the line played after a correct answer, which leads from the note back to the tonic.
fn resolution(
    note: Note,
    included: &[Solfege],
    settings: &Settings,
) -> Result<Vec<AfterCorrectAnswer>> {
    let allowed: Vec<_> = included
        .iter()
        .map(|solfege| solfege_to_scale_degree(*solfege))
        .collect();
    let notes = resolution_notes(note, Key::REFERENCE, &allowed, cadence_type(settings)?);
    let last = notes.len().saturating_sub(1);
    Ok(notes
        .iter()
        .enumerate()
        .map(|(index, note)| {
            let duration = match index {
                0 => Duration::Quarter,
                i if i == last => Duration::Half,
                _ => Duration::Eighth,
            };
            AfterCorrectAnswer {
                answer_to_highlight: solfege_in_c(note).map(to_ustr),
                part_to_play: PartToPlay::Events(vec![NoteEvent::new(vec![*note], duration)]),
            }
        })
        .collect())
}

fn question(settings: &Settings, context: &mut QuestionContext<'_>) -> Result<Question> {
    let included = included_answers(settings)?
        .iter()
        .map(|answer| Solfege::parse(answer))
        .collect::<Result<Vec<_>, _>>()?;
    let range = context.range_for_key_of_c(&notes_range(settings)?);
    let options = question_options(&range, &included);
    if options.is_empty() {
        return Err(anyhow!("no included notes fall inside the range"));
    }

    let number = number_of_segments(settings)?;
    let mut notes = Vec::with_capacity(number);
    for _ in 0..number {
        notes.push(*context.choose(&options)?);
    }

    let after_correct_answer = if number == 1 && settings.get_bool(PLAY_AFTER_CORRECT_ANSWER)? {
        Some(resolution(notes[0].0, &included, settings)?)
    } else {
        None
    };
    Ok(Question {
        segments: notes
            .into_iter()
            .map(|(note, solfege)| Segment {
                right_answer: to_ustr(solfege),
                part_to_play: PartToPlay::Note(note),
            })
            .collect(),
        after_correct_answer,
        cadence: None,
        info: String::new(),
    })
}

/// Returns the answer for the syllable, previewed by playing its note in C. In numeral mode the
/// answer is displayed as its scale degree.
fn answer(solfege: Solfege, numerals: bool) -> AnswerConfig {
    let config = AnswerConfig::new(to_ustr(solfege)).with_preview(move |_| {
        let class = scale_degree_to_note_class(solfege_to_scale_degree(solfege), Key::REFERENCE);
        Some(PartToPlay::Note(Note::new(class, PREVIEW_OCTAVE)))
    });
    if numerals {
        config.with_display(solfege_to_scale_degree(solfege).to_string())
    } else {
        config
    }
}

fn answer_list(settings: &Settings) -> Result<AnswerList> {
    use Solfege::*;
    let numerals = match settings.get_text(DISPLAY_MODE)? {
        "solfege" => false,
        "numeral" => true,
        mode => return Err(anyhow!("unknown display mode {mode}")),
    };
    Ok(AnswerList::rows(
        [
            vec![Do, Re, Mi, Fa, Sol, La, Ti],
            vec![Di, Ri, Fi, Si, Li],
            vec![Ra, Me, Se, Le, Te],
        ]
        .map(|row| {
            row.into_iter()
                .map(|solfege| answer(solfege, numerals))
                .collect::<Vec<_>>()
        }),
    ))
}

/// Returns the definition of the exercise.
pub fn definition() -> Result<ExerciseDefinition, ExerciseError> {
    let ranges = RANGES
        .iter()
        .map(|(value, label, ..)| SelectOption {
            value: value.to_string(),
            label: label.to_string(),
        })
        .collect();
    let display_modes = DISPLAY_MODES
        .iter()
        .map(|(value, label)| SelectOption {
            value: value.to_string(),
            label: label.to_string(),
        })
        .collect();
    let base = ExerciseDefinition::new(
        ID,
        "Scale Degrees",
        "Identify monophonic notes based on their tonal context in a particular key",
        question,
        answer_list,
    )
    .with_defaults(
        &Settings::new()
            .with(NOTES_RANGE, "middle")
            .with(DISPLAY_MODE, "solfege"),
    )
    .with_descriptors([
        SettingsDescriptor::new(
            NOTES_RANGE,
            ControlDescriptor::Select {
                label: "Range".to_string(),
                options: ranges,
            },
        )
        .with_info(indoc! {"
            Choose how high or low the notes will be played. The range applies to the notes heard
            in the key of the exercise.
        "}),
        SettingsDescriptor::new(
            DISPLAY_MODE,
            ControlDescriptor::Select {
                label: "Display".to_string(),
                options: display_modes,
            },
        ),
    ]);

    compose(
        base,
        melodic_augmentations(&["Do", "Re", "Mi"], "Scale Degrees", "notes"),
    )
}

/// Creates the exercise with the given options.
pub fn exercise(options: &TonalExerciseOptions) -> Result<TonalExercise, ExerciseError> {
    TonalExercise::new(definition()?, options)
}
