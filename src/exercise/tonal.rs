//! Contains the exercise that plays questions written in C in another key.
//!
//! The key is picked once, when the exercise is created, and only changes when the key is
//! explicitly reset. Every question, the music played after a correct answer, the cadence, and the
//! previews of the answers are moved from C into that key before they reach the student.

use anyhow::{Result, anyhow};
use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};
use ustr::Ustr;

use crate::{
    data::{
        exercise::{AnswerList, Question, Settings, SettingsDescriptor},
        music::{
            cadences::{CadenceType, cadence_in_c},
            keys::{Key, distance_between_keys},
        },
    },
    error::ExerciseError,
    exercise::{
        Exercise, ExerciseDefinition, QuestionContext,
        augmentations::{CADENCE_TYPE, cadence_type, cadence_type_setting},
    },
    random::{RandomSource, SeededRandom, ThreadRandom},
    transpose::Transpose,
};

/// The options used to create a tonal exercise.
#[derive(Builder, Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct TonalExerciseOptions {
    /// The key of the exercise. A random key is picked if missing.
    #[builder(default, setter(strip_option))]
    #[serde(default)]
    pub key: Option<Key>,

    /// The seed of the random generator used by the exercise. The thread-local generator is used
    /// if missing.
    #[builder(default, setter(strip_option))]
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Returns the text describing the key of a question.
fn key_info(key: Key) -> String {
    format!("Key: {key}")
}

/// Returns a key chosen uniformly from all the keys.
fn random_key(random: &mut dyn RandomSource) -> Key {
    Key::ALL[random.choose_index(Key::ALL.len())]
}

/// Moves a question written in C into the given key, preceded by the cadence of the given type.
/// Any cadence set by the question itself is replaced. The key is prepended to the info of the
/// question.
pub fn question_in_key(
    question_in_c: Question,
    key: Key,
    cadence_type: CadenceType,
) -> Result<Question> {
    if question_in_c.segments.is_empty() {
        return Err(anyhow!("the question does not contain any segments"));
    }

    let cadence = cadence_in_c(cadence_type).to_vec();
    let info = if question_in_c.info.is_empty() {
        key_info(key)
    } else {
        format!("{}\n{}", key_info(key), question_in_c.info)
    };

    let question = Question {
        cadence: Some(cadence),
        ..question_in_c
    }
    .transpose(distance_between_keys(Key::REFERENCE, key));
    Ok(Question { info, ..question })
}

/// Moves an answer list written in C into the given key. The list is laid out in rows, and the
/// music returned by each preview is moved into the key.
#[must_use]
pub fn answer_list_in_key(answer_list_in_c: AnswerList, key: Key) -> AnswerList {
    let interval = distance_between_keys(Key::REFERENCE, key);
    answer_list_in_c.normalized().map(|mut config| {
        if let Some(preview) = config.preview.take() {
            config = config.with_preview(move |question| {
                preview(question).map(|part| part.transpose(interval))
            });
        }
        config
    })
}

/// An exercise whose questions are written in C and heard in another key.
pub struct TonalExercise {
    /// The definition of the exercise.
    definition: ExerciseDefinition,

    /// The key in which the questions are heard.
    key: Key,

    /// The current settings.
    settings: Settings,

    /// The source of randomness for keys and questions.
    random: Box<dyn RandomSource + Send>,
}

impl TonalExercise {
    /// Creates a new exercise from the definition with the given options.
    pub fn new(
        definition: ExerciseDefinition,
        options: &TonalExerciseOptions,
    ) -> Result<TonalExercise, ExerciseError> {
        let random: Box<dyn RandomSource + Send> = match options.seed {
            Some(seed) => Box::new(SeededRandom::new(seed)),
            None => Box::new(ThreadRandom),
        };
        Self::with_random(definition, options.key, random)
    }

    /// Creates a new exercise that uses the given source of randomness. If no key is given, the key
    /// is picked using the same source.
    pub fn with_random(
        definition: ExerciseDefinition,
        key: Option<Key>,
        mut random: Box<dyn RandomSource + Send>,
    ) -> Result<TonalExercise, ExerciseError> {
        // Every tonal exercise plays a cadence, so the setting is added if the definition lacks it.
        let definition = if definition.default_settings.contains_key(CADENCE_TYPE) {
            definition
        } else {
            cadence_type_setting()(definition)?
        };

        let key = match key {
            Some(key) => key,
            None => random_key(&mut *random),
        };
        debug!(exercise = %definition.id, %key, "created tonal exercise");

        let settings = definition.default_settings.clone();
        Ok(TonalExercise {
            definition,
            key,
            settings,
            random,
        })
    }

    /// Returns the key in which the questions are heard.
    #[must_use]
    pub fn key(&self) -> Key {
        self.key
    }

    /// Picks a new random key and returns it.
    pub fn reset_key(&mut self) -> Key {
        self.key = random_key(&mut *self.random);
        debug!(exercise = %self.definition.id, key = %self.key, "reset key");
        self.key
    }

    fn get_question_helper(&mut self) -> Result<Question> {
        let cadence_type = cadence_type(&self.settings)?;
        let mut context = QuestionContext {
            key: self.key,
            random: &mut *self.random,
        };
        let question_in_c = (self.definition.question)(&self.settings, &mut context)?;
        let question = question_in_key(question_in_c, self.key, cadence_type)?;
        trace!(
            exercise = %self.definition.id,
            segments = question.segments.len(),
            "generated question"
        );
        Ok(question)
    }

    fn get_answer_list_helper(&self) -> Result<AnswerList> {
        let answer_list_in_c = (self.definition.answer_list)(&self.settings)?;
        Ok(answer_list_in_key(answer_list_in_c, self.key))
    }

    fn update_settings_helper(&mut self, settings: Settings) -> Result<()> {
        let missing: Vec<&Ustr> = self
            .definition
            .default_settings
            .keys()
            .filter(|key| !settings.contains_key(key))
            .collect();
        if !missing.is_empty() {
            return Err(anyhow!("missing settings {missing:?}"));
        }
        cadence_type(&settings)?;

        debug!(exercise = %self.definition.id, "updated settings");
        self.settings = settings;
        Ok(())
    }
}

impl Exercise for TonalExercise {
    fn id(&self) -> Ustr {
        self.definition.id
    }

    fn name(&self) -> &str {
        &self.definition.name
    }

    fn summary(&self) -> &str {
        &self.definition.summary
    }

    fn get_question(&mut self) -> Result<Question, ExerciseError> {
        let id = self.definition.id;
        self.get_question_helper()
            .map_err(|e| ExerciseError::GetQuestion(id, e))
    }

    fn get_answer_list(&self) -> Result<AnswerList, ExerciseError> {
        self.get_answer_list_helper()
            .map_err(|e| ExerciseError::GetAnswerList(self.definition.id, e))
    }

    fn get_default_settings(&self) -> Settings {
        self.definition.default_settings.clone()
    }

    fn get_settings_descriptors(&self) -> &[SettingsDescriptor] {
        &self.definition.settings_descriptors
    }

    fn update_settings(&mut self, settings: Settings) -> Result<(), ExerciseError> {
        let id = self.definition.id;
        self.update_settings_helper(settings)
            .map_err(|e| ExerciseError::UpdateSettings(id, e))
    }

    fn current_settings(&self) -> &Settings {
        &self.settings
    }
}

#[cfg(test)]
mod test {
    use anyhow::Result;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        data::{
            exercise::{AfterCorrectAnswer, AnswerConfig, Segment},
            music::{
                events::{Duration, NoteEvent, PartToPlay},
                notes::Note,
            },
        },
        random::SequenceRandom,
    };

    fn note(name: &str) -> Note {
        name.parse().unwrap()
    }

    fn definition() -> ExerciseDefinition {
        ExerciseDefinition::new(
            "tonal",
            "Tonal",
            "An exercise used to test the tonal exercise",
            |_, _| {
                Ok(Question {
                    segments: vec![Segment {
                        right_answer: Ustr::from("Mi"),
                        part_to_play: PartToPlay::Events(vec![
                            NoteEvent::new(vec![note("E4")], Duration::Quarter)
                                .with_velocity(0.5)
                                .at(0.25),
                        ]),
                    }],
                    after_correct_answer: Some(vec![AfterCorrectAnswer {
                        answer_to_highlight: Some(Ustr::from("Do")),
                        part_to_play: PartToPlay::Note(note("C4")),
                    }]),
                    cadence: None,
                    info: String::new(),
                })
            },
            |_| {
                Ok(AnswerList::flat([
                    AnswerConfig::new("Do").with_preview(|_| Some(PartToPlay::Note(note("C4")))),
                    AnswerConfig::new("Mi"),
                ]))
            },
        )
    }

    /// Verifies that questions are moved into the key of the exercise.
    #[test]
    fn question_in_g() -> Result<()> {
        let mut exercise = TonalExercise::new(
            definition(),
            &TonalExerciseOptionsBuilder::default().key(Key::G).build()?,
        )?;
        let question = exercise.get_question()?;

        let PartToPlay::Events(events) = &question.segments[0].part_to_play else {
            panic!("expected events");
        };
        assert_eq!(events[0].notes, vec![note("B4")]);
        assert_eq!(events[0].velocity, Some(0.5));
        assert_eq!(events[0].time, Some(0.25));
        assert_eq!(question.segments[0].right_answer.as_str(), "Mi");

        let after = question.after_correct_answer.unwrap_or_default();
        assert_eq!(after[0].part_to_play, PartToPlay::Note(note("G4")));
        assert_eq!(after[0].answer_to_highlight, Some(Ustr::from("Do")));

        let cadence = question.cadence.unwrap_or_default();
        assert_eq!(cadence[0].notes, vec![note("G3"), note("B4"), note("D5"), note("G5")]);
        assert_eq!(question.info, "Key: G");
        Ok(())
    }

    /// Verifies that the minor cadence is used when selected.
    #[test]
    fn minor_cadence() -> Result<()> {
        let mut exercise = TonalExercise::new(
            definition(),
            &TonalExerciseOptionsBuilder::default().key(Key::EFlat).build()?,
        )?;
        let settings = exercise
            .get_default_settings()
            .with(CADENCE_TYPE, CadenceType::Minor.to_string());
        exercise.update_settings(settings)?;
        let cadence = exercise.get_question()?.cadence.unwrap_or_default();
        assert_eq!(
            cadence[0].notes,
            vec![note("Eb3"), note("Gb4"), note("Bb4"), note("Eb5")]
        );
        Ok(())
    }

    /// Verifies that the selected cadence replaces the one set by the question.
    #[test]
    fn selected_cadence_wins() -> Result<()> {
        let question_in_c = Question {
            segments: vec![Segment {
                right_answer: Ustr::from("Do"),
                part_to_play: PartToPlay::Note(note("C4")),
            }],
            cadence: Some(vec![NoteEvent::new(vec![note("C4")], Duration::Whole)]),
            ..Question::default()
        };
        for key in [Key::C, Key::G] {
            let question = question_in_key(question_in_c.clone(), key, CadenceType::Minor)?;
            let expected = cadence_in_c(CadenceType::Minor)
                .to_vec()
                .transpose(distance_between_keys(Key::REFERENCE, key));
            assert_eq!(question.cadence, Some(expected));
        }
        Ok(())
    }

    /// Verifies that previews are moved into the key of the exercise.
    #[test]
    fn previews_in_key() -> Result<()> {
        let exercise = TonalExercise::new(
            definition(),
            &TonalExerciseOptionsBuilder::default().key(Key::BFlat).build()?,
        )?;
        let answer_list = exercise.get_answer_list()?;
        let AnswerList::Rows(rows) = &answer_list else {
            panic!("expected rows");
        };
        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0][0].play_preview(&Question::default()),
            Some(PartToPlay::Note(note("Bb4")))
        );
        assert_eq!(rows[0][1].play_preview(&Question::default()), None);
        Ok(())
    }

    /// Verifies that the key is picked from the random source and only changes when reset.
    #[test]
    fn key_selection() -> Result<()> {
        let random = SequenceRandom::new([3, 7]);
        let mut exercise = TonalExercise::with_random(definition(), None, Box::new(random))?;
        assert_eq!(exercise.key(), Key::A);
        exercise.get_question()?;
        exercise.get_question()?;
        assert_eq!(exercise.key(), Key::A);
        assert_eq!(exercise.reset_key(), Key::DFlat);
        assert_eq!(exercise.key(), Key::DFlat);
        Ok(())
    }

    /// Verifies that exercises with the same seed pick the same key.
    #[test]
    fn seeded_key() -> Result<()> {
        let options = TonalExerciseOptionsBuilder::default().seed(42).build()?;
        let first = TonalExercise::new(definition(), &options)?;
        let second = TonalExercise::new(definition(), &options)?;
        assert_eq!(first.key(), second.key());
        Ok(())
    }

    /// Verifies that a question without segments is an error.
    #[test]
    fn empty_question() -> Result<()> {
        let definition = ExerciseDefinition::new(
            "empty",
            "Empty",
            "An exercise without segments",
            |_, _| Ok(Question::default()),
            |_| Ok(AnswerList::flat(["Do"])),
        );
        let mut exercise = TonalExercise::new(definition, &TonalExerciseOptions::default())?;
        assert!(matches!(
            exercise.get_question(),
            Err(ExerciseError::GetQuestion(_, _))
        ));
        Ok(())
    }

    /// Verifies updating the settings.
    #[test]
    fn update_settings() -> Result<()> {
        let mut exercise = TonalExercise::new(definition(), &TonalExerciseOptions::default())?;
        assert_eq!(exercise.get_default_settings(), exercise.get_default_settings());
        assert_eq!(exercise.current_settings(), &exercise.get_default_settings());

        assert!(matches!(
            exercise.update_settings(Settings::new()),
            Err(ExerciseError::UpdateSettings(_, _))
        ));
        let invalid = exercise.get_default_settings().with(CADENCE_TYPE, "ii V I");
        assert!(exercise.update_settings(invalid).is_err());
        assert_eq!(exercise.current_settings(), &exercise.get_default_settings());
        Ok(())
    }

    /// Verifies that the info of the question follows the key.
    #[test]
    fn question_info() -> Result<()> {
        let question = Question {
            segments: vec![Segment {
                right_answer: Ustr::from("Do"),
                part_to_play: PartToPlay::Note(note("C4")),
            }],
            info: "Root Position".to_string(),
            ..Question::default()
        };
        let in_key = question_in_key(question, Key::D, CadenceType::Major)?;
        assert_eq!(in_key.info, "Key: D\nRoot Position");
        assert_eq!(in_key.segments[0].part_to_play, PartToPlay::Note(note("D4")));
        Ok(())
    }
}
