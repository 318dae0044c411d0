//! Contains the augmentations shared by many exercises. Each one adds its settings, their default
//! values, and the controls used to edit them to a definition, and wraps the generators of the
//! definition when the setting changes their behavior.

use anyhow::{Result, anyhow};
use std::sync::Arc;
use strum::IntoEnumIterator;
use ustr::Ustr;

use crate::{
    data::{
        exercise::{
            AnswerList, ControlDescriptor, SelectOption, Settings, SettingsDescriptor,
            filter_included_answers,
        },
        music::cadences::CadenceType,
    },
    exercise::Augmentation,
};

/// The key of the setting selecting the cadence played before each question.
pub const CADENCE_TYPE: &str = "cadence_type";

/// The key of the setting with the number of segments in each question.
pub const NUMBER_OF_SEGMENTS: &str = "number_of_segments";

/// The key of the setting controlling whether music is played after a correct answer.
pub const PLAY_AFTER_CORRECT_ANSWER: &str = "play_after_correct_answer";

/// The key of the setting with the answers included in the questions.
pub const INCLUDED_ANSWERS: &str = "included_answers";

/// The largest number of segments in a question.
const MAX_SEGMENTS: usize = 8;

/// Returns the answers included by the settings.
pub fn included_answers(settings: &Settings) -> Result<Vec<Ustr>> {
    Ok(settings
        .get_list(INCLUDED_ANSWERS)?
        .iter()
        .map(|answer| Ustr::from(answer.as_str()))
        .collect())
}

/// Returns the cadence type selected by the settings.
pub fn cadence_type(settings: &Settings) -> Result<CadenceType> {
    Ok(CadenceType::parse(settings.get_text(CADENCE_TYPE)?)?)
}

/// Returns the number of segments selected by the settings.
pub fn number_of_segments(settings: &Settings) -> Result<usize> {
    let number = settings.get_usize(NUMBER_OF_SEGMENTS)?;
    if !(1..=MAX_SEGMENTS).contains(&number) {
        return Err(anyhow!(
            "the number of segments must be between 1 and {MAX_SEGMENTS}, got {number}"
        ));
    }
    Ok(number)
}

/// Adds the choice of cadence played before each question. The major cadence is the default.
#[must_use]
pub fn cadence_type_setting() -> Augmentation {
    Box::new(|definition| {
        let options = CadenceType::iter()
            .map(|cadence_type| SelectOption {
                value: cadence_type.to_string(),
                label: format!("{} ({})", cadence_type, cadence_type.scale_type()),
            })
            .collect();
        Ok(definition
            .with_defaults(&Settings::new().with(CADENCE_TYPE, CadenceType::Major.to_string()))
            .with_descriptors([SettingsDescriptor::new(
                CADENCE_TYPE,
                ControlDescriptor::Select {
                    label: "Cadence Type".to_string(),
                    options,
                },
            )]))
    })
}

/// Adds the number of segments in each question, which defaults to one. The name describes the
/// segments in the label of the control (e.g. "notes" or "chords").
#[must_use]
pub fn number_of_segments_setting(name: &str) -> Augmentation {
    let label = format!("Number of {name}");
    Box::new(move |definition| {
        Ok(definition
            .with_defaults(&Settings::new().with(NUMBER_OF_SEGMENTS, 1_usize))
            .with_descriptors([SettingsDescriptor::new(
                NUMBER_OF_SEGMENTS,
                ControlDescriptor::Slider {
                    label,
                    min: 1.0,
                    max: MAX_SEGMENTS as f64,
                    step: 1.0,
                },
            )]))
    })
}

/// Adds whether the music after a correct answer is played, which defaults to true. The control
/// is only shown when questions have a single segment. When the setting is false, the music after
/// the answer is removed from every question.
#[must_use]
pub fn play_after_correct_answer_setting() -> Augmentation {
    Box::new(|mut definition| {
        let question = definition.question;
        definition.question = Box::new(move |settings, context| {
            let mut question = question(settings, context)?;
            if !settings.get_bool(PLAY_AFTER_CORRECT_ANSWER)? {
                question.after_correct_answer = None;
            }
            Ok(question)
        });

        Ok(definition
            .with_defaults(&Settings::new().with(PLAY_AFTER_CORRECT_ANSWER, true))
            .with_descriptors([SettingsDescriptor::new(
                PLAY_AFTER_CORRECT_ANSWER,
                ControlDescriptor::Checkbox {
                    label: "Play Resolution".to_string(),
                },
            )
            .with_show(|settings| {
                settings
                    .get_usize(NUMBER_OF_SEGMENTS)
                    .ok()
                    .is_none_or(|number| number == 1)
            })]))
    })
}

/// Adds the choice of the answers included in the questions. The answer list of the definition
/// must contain every answer, and is replaced by one returning only the included answers. At
/// least two answers must be selected by default, all of which must be in the full list. The name
/// describes the answers in the label of the control.
#[must_use]
pub fn included_answers_setting(default_selected: &[&str], name: &str) -> Augmentation {
    let default_selected: Vec<String> = default_selected.iter().map(ToString::to_string).collect();
    let label = format!("Included {name}");
    Box::new(move |mut definition| {
        if default_selected.len() < 2 {
            return Err(
                definition.configuration_error("at least two answers must be selected by default")
            );
        }

        let full_list = (definition.answer_list)(&definition.default_settings)
            .map_err(|e| definition.configuration_error(format!("{e:#}")))?;
        let available = full_list.answers();
        if let Some(missing) = default_selected
            .iter()
            .find(|answer| !available.contains(&Ustr::from(answer.as_str())))
        {
            return Err(definition.configuration_error(format!(
                "default answer {missing} is not in the answer list"
            )));
        }

        let all_answers: Arc<dyn Fn(&Settings) -> Result<AnswerList> + Send + Sync> =
            Arc::from(definition.answer_list);
        let filtered = move |settings: &Settings| -> Result<AnswerList> {
            let full_list = all_answers(settings)?;
            let filtered = filter_included_answers(&full_list, &included_answers(settings)?);
            if filtered.is_empty() {
                return Err(anyhow!("none of the answers are included"));
            }
            Ok(filtered)
        };
        let filtered = Arc::new(filtered);

        let question = definition.question;
        let check = Arc::clone(&filtered);
        definition.question = Box::new(move |settings, context| {
            check(settings)?;
            question(settings, context)
        });
        definition.answer_list = Box::new(move |settings| filtered(settings));

        Ok(definition
            .with_defaults(&Settings::new().with(INCLUDED_ANSWERS, default_selected))
            .with_descriptors([SettingsDescriptor::new(
                INCLUDED_ANSWERS,
                ControlDescriptor::IncludedAnswers {
                    label,
                    answer_list: full_list,
                },
            )]))
    })
}

/// Returns the augmentations shared by every exercise built on a definition with a fixed list of
/// answers and a variable number of segments.
#[must_use]
pub fn melodic_augmentations(
    default_selected: &[&str],
    answers_name: &str,
    segments_name: &str,
) -> Vec<Augmentation> {
    vec![
        included_answers_setting(default_selected, answers_name),
        number_of_segments_setting(segments_name),
        play_after_correct_answer_setting(),
        cadence_type_setting(),
    ]
}
