//! Defines the interface of an exercise and the declarative definitions from which exercises are
//! built.
//!
//! An exercise definition describes how to generate questions and answers in the key of C, along
//! with the settings the student can change. Augmentations add cross-cutting settings and behavior
//! to a definition, and the tonal exercise in [tonal] turns the result into an [Exercise] whose
//! questions are heard in another key.

pub mod augmentations;
pub mod tonal;

use anyhow::Result;
use ustr::Ustr;

use crate::{
    data::{
        exercise::{AnswerList, Question, Settings, SettingsDescriptor},
        music::{
            keys::{Key, distance_between_keys},
            notes::NotesRange,
        },
    },
    error::ExerciseError,
    random::{RandomSource, random_from_list},
    transpose::Transpose,
};

/// The interface exposed to the layer hosting the exercises.
pub trait Exercise {
    /// Returns the unique ID of the exercise.
    fn id(&self) -> Ustr;

    /// Returns the name of the exercise shown to the student.
    fn name(&self) -> &str;

    /// Returns a short description of the exercise.
    fn summary(&self) -> &str;

    /// Generates a new question using the current settings.
    fn get_question(&mut self) -> Result<Question, ExerciseError>;

    /// Returns the answers available with the current settings.
    fn get_answer_list(&self) -> Result<AnswerList, ExerciseError>;

    /// Returns the settings used when the student has not changed any of them.
    fn get_default_settings(&self) -> Settings;

    /// Returns the descriptors of the controls used to edit the settings.
    fn get_settings_descriptors(&self) -> &[SettingsDescriptor];

    /// Replaces the current settings.
    fn update_settings(&mut self, settings: Settings) -> Result<(), ExerciseError>;

    /// Returns the current settings.
    fn current_settings(&self) -> &Settings;
}

/// The state available to a question generator besides the settings.
pub struct QuestionContext<'a> {
    /// The key in which the question will be heard.
    pub key: Key,

    /// The source of randomness for the question.
    pub random: &'a mut dyn RandomSource,
}

impl QuestionContext<'_> {
    /// Returns a random element of the list.
    pub fn choose<'b, T>(&mut self, list: &'b [T]) -> Result<&'b T> {
        random_from_list(&mut *self.random, list)
    }

    /// Returns the range that must be used in C so that, once the question is moved to the key of
    /// the exercise, its notes fall inside the given range.
    #[must_use]
    pub fn range_for_key_of_c(&self, range: &NotesRange) -> NotesRange {
        range.transpose(distance_between_keys(self.key, Key::REFERENCE))
    }
}

/// A function generating a question in the key of C.
pub type QuestionFn =
    Box<dyn Fn(&Settings, &mut QuestionContext<'_>) -> Result<Question> + Send + Sync>;

/// A function returning the answers available with the given settings.
pub type AnswerListFn = Box<dyn Fn(&Settings) -> Result<AnswerList> + Send + Sync>;

/// The declarative definition of an exercise, written in the key of C.
pub struct ExerciseDefinition {
    /// The unique ID of the exercise.
    pub id: Ustr,

    /// The name of the exercise.
    pub name: String,

    /// A short description of the exercise.
    pub summary: String,

    /// The default value of every setting used by the exercise.
    pub default_settings: Settings,

    /// The controls used to edit the settings, in the order in which they are shown.
    pub settings_descriptors: Vec<SettingsDescriptor>,

    /// Generates a question in the key of C.
    pub question: QuestionFn,

    /// Returns the answers available with the given settings.
    pub answer_list: AnswerListFn,
}

impl ExerciseDefinition {
    /// Creates a definition without settings.
    pub fn new(
        id: impl Into<Ustr>,
        name: impl Into<String>,
        summary: impl Into<String>,
        question: impl Fn(&Settings, &mut QuestionContext<'_>) -> Result<Question>
            + Send
            + Sync
            + 'static,
        answer_list: impl Fn(&Settings) -> Result<AnswerList> + Send + Sync + 'static,
    ) -> ExerciseDefinition {
        ExerciseDefinition {
            id: id.into(),
            name: name.into(),
            summary: summary.into(),
            default_settings: Settings::new(),
            settings_descriptors: vec![],
            question: Box::new(question),
            answer_list: Box::new(answer_list),
        }
    }

    /// Adds the given defaults to the definition. Values already in the definition are kept.
    #[must_use]
    pub fn with_defaults(mut self, defaults: &Settings) -> ExerciseDefinition {
        self.default_settings.merge_defaults(defaults);
        self
    }

    /// Appends the given descriptors to the definition.
    #[must_use]
    pub fn with_descriptors(
        mut self,
        descriptors: impl IntoIterator<Item = SettingsDescriptor>,
    ) -> ExerciseDefinition {
        self.settings_descriptors.extend(descriptors);
        self
    }

    /// Returns the error used to report an invalid definition.
    pub(crate) fn configuration_error(&self, message: impl Into<String>) -> ExerciseError {
        ExerciseError::Configuration(self.id, message.into())
    }
}

/// A function extending a definition with additional settings and behavior.
pub type Augmentation =
    Box<dyn FnOnce(ExerciseDefinition) -> Result<ExerciseDefinition, ExerciseError>>;

/// Applies the augmentations to the definition in order.
pub fn compose(
    base: ExerciseDefinition,
    augmentations: impl IntoIterator<Item = Augmentation>,
) -> Result<ExerciseDefinition, ExerciseError> {
    augmentations
        .into_iter()
        .try_fold(base, |definition, augmentation| augmentation(definition))
}
