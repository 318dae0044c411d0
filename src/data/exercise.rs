//! Defines the questions, answers, and settings exchanged between exercises and the layers that
//! play and render them.

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fmt::{Debug, Formatter, Result as FmtResult},
    sync::Arc,
};
use ustr::Ustr;

use crate::{
    data::music::{
        events::{NoteEvent, PartToPlay},
        intervals::Interval,
    },
    transpose::Transpose,
};

/// A part of a question the student must identify.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Segment {
    /// The answer that identifies this segment.
    pub right_answer: Ustr,

    /// The music played for this segment.
    pub part_to_play: PartToPlay,
}

/// Music played once the student has answered a question correctly.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct AfterCorrectAnswer {
    /// The answer highlighted while the part is playing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer_to_highlight: Option<Ustr>,

    /// The music played after the answer.
    pub part_to_play: PartToPlay,
}

/// A question generated by an exercise.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Question {
    /// The segments of the question, in the order in which they must be answered.
    pub segments: Vec<Segment>,

    /// The parts played after the question has been answered correctly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after_correct_answer: Option<Vec<AfterCorrectAnswer>>,

    /// The progression played before the question to establish the key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cadence: Option<Vec<NoteEvent>>,

    /// A description of the question shown to the student.
    #[serde(default)]
    pub info: String,
}

impl Transpose for Segment {
    fn transpose(&self, interval: Interval) -> Self {
        Segment {
            right_answer: self.right_answer,
            part_to_play: self.part_to_play.transpose(interval),
        }
    }
}

impl Transpose for AfterCorrectAnswer {
    fn transpose(&self, interval: Interval) -> Self {
        AfterCorrectAnswer {
            answer_to_highlight: self.answer_to_highlight,
            part_to_play: self.part_to_play.transpose(interval),
        }
    }
}

impl Transpose for Question {
    fn transpose(&self, interval: Interval) -> Self {
        Question {
            segments: self.segments.transpose(interval),
            after_correct_answer: self.after_correct_answer.transpose(interval),
            cadence: self.cadence.transpose(interval),
            info: self.info.clone(),
        }
    }
}

/// A function returning the part played when the student previews an answer. It receives the
/// current question.
pub type Preview = Arc<dyn Fn(&Question) -> Option<PartToPlay> + Send + Sync>;

/// One of the answers the student can choose.
#[derive(Clone, Deserialize, Serialize)]
pub struct AnswerConfig {
    /// The value of the answer, matched against the right answer of each segment.
    pub answer: Ustr,

    /// The text displayed for the answer. The answer itself is displayed if missing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,

    /// The action used to preview the answer.
    #[serde(skip)]
    pub preview: Option<Preview>,
}

impl AnswerConfig {
    /// Creates an answer without a preview.
    pub fn new(answer: impl Into<Ustr>) -> AnswerConfig {
        AnswerConfig {
            answer: answer.into(),
            display: None,
            preview: None,
        }
    }

    /// Returns the answer with the given preview action.
    #[must_use]
    pub fn with_preview(
        mut self,
        preview: impl Fn(&Question) -> Option<PartToPlay> + Send + Sync + 'static,
    ) -> AnswerConfig {
        self.preview = Some(Arc::new(preview));
        self
    }

    /// Returns the answer displayed with the given text.
    #[must_use]
    pub fn with_display(mut self, display: impl Into<String>) -> AnswerConfig {
        self.display = Some(display.into());
        self
    }

    /// Runs the preview action of the answer, if any.
    #[must_use]
    pub fn play_preview(&self, question: &Question) -> Option<PartToPlay> {
        self.preview.as_ref().and_then(|preview| preview(question))
    }
}

impl Debug for AnswerConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("AnswerConfig")
            .field("answer", &self.answer)
            .field("display", &self.display)
            .field("preview", &self.preview.is_some())
            .finish()
    }
}

impl PartialEq for AnswerConfig {
    fn eq(&self, other: &Self) -> bool {
        self.answer == other.answer
            && self.display == other.display
            && self.preview.is_some() == other.preview.is_some()
    }
}

impl From<&str> for AnswerConfig {
    fn from(answer: &str) -> Self {
        AnswerConfig::new(answer)
    }
}

/// The answers available for an exercise, either as a single list or grouped in rows.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum AnswerList {
    /// A flat list of answers.
    Flat(Vec<AnswerConfig>),

    /// Answers grouped in rows. Rows are never empty.
    Rows(Vec<Vec<AnswerConfig>>),
}

impl AnswerList {
    /// Creates a flat list from the given answers.
    pub fn flat<I, A>(answers: I) -> AnswerList
    where
        I: IntoIterator<Item = A>,
        A: Into<AnswerConfig>,
    {
        AnswerList::Flat(answers.into_iter().map(Into::into).collect())
    }

    /// Creates a list with one row per group of answers.
    pub fn rows<I, R, A>(rows: I) -> AnswerList
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = A>,
        A: Into<AnswerConfig>,
    {
        AnswerList::Rows(
            rows.into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
        )
    }

    /// Returns the list laid out in rows. A flat list becomes a single row.
    #[must_use]
    pub fn normalized(self) -> AnswerList {
        match self {
            AnswerList::Flat(answers) if answers.is_empty() => AnswerList::Rows(vec![]),
            AnswerList::Flat(answers) => AnswerList::Rows(vec![answers]),
            rows @ AnswerList::Rows(_) => rows,
        }
    }

    /// Applies the function to every answer, keeping the layout.
    #[must_use]
    pub fn map(self, f: impl Fn(AnswerConfig) -> AnswerConfig) -> AnswerList {
        match self {
            AnswerList::Flat(answers) => AnswerList::Flat(answers.into_iter().map(&f).collect()),
            AnswerList::Rows(rows) => AnswerList::Rows(
                rows.into_iter()
                    .map(|row| row.into_iter().map(&f).collect())
                    .collect(),
            ),
        }
    }

    /// Returns the values of all the answers in the list, in order.
    #[must_use]
    pub fn answers(&self) -> Vec<Ustr> {
        match self {
            AnswerList::Flat(answers) => answers.iter().map(|config| config.answer).collect(),
            AnswerList::Rows(rows) => rows
                .iter()
                .flatten()
                .map(|config| config.answer)
                .collect(),
        }
    }

    /// Returns the answer with the given value.
    #[must_use]
    pub fn find(&self, answer: &str) -> Option<&AnswerConfig> {
        match self {
            AnswerList::Flat(answers) => answers
                .iter()
                .find(|config| config.answer.as_str() == answer),
            AnswerList::Rows(rows) => rows
                .iter()
                .flatten()
                .find(|config| config.answer.as_str() == answer),
        }
    }

    /// Returns whether the list contains no answers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            AnswerList::Flat(answers) => answers.is_empty(),
            AnswerList::Rows(rows) => rows.iter().all(Vec::is_empty),
        }
    }
}

/// Returns the answers in the list which are also in `included`. Rows keep their grouping, and
/// rows left without answers are removed.
#[must_use]
pub fn filter_included_answers(answer_list: &AnswerList, included: &[Ustr]) -> AnswerList {
    let keep = |config: &&AnswerConfig| included.contains(&config.answer);
    match answer_list {
        AnswerList::Flat(answers) => {
            AnswerList::Flat(answers.iter().filter(keep).cloned().collect())
        }
        AnswerList::Rows(rows) => AnswerList::Rows(
            rows.iter()
                .map(|row| row.iter().filter(keep).cloned().collect::<Vec<_>>())
                .filter(|row| !row.is_empty())
                .collect(),
        ),
    }
}

/// The value of a single setting.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
#[allow(missing_docs)]
pub enum SettingValue {
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<String>),
}

impl From<bool> for SettingValue {
    fn from(value: bool) -> Self {
        SettingValue::Bool(value)
    }
}

impl From<f64> for SettingValue {
    fn from(value: f64) -> Self {
        SettingValue::Number(value)
    }
}

impl From<usize> for SettingValue {
    fn from(value: usize) -> Self {
        SettingValue::Number(value as f64)
    }
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self {
        SettingValue::Text(value.to_string())
    }
}

impl From<String> for SettingValue {
    fn from(value: String) -> Self {
        SettingValue::Text(value)
    }
}

impl From<Vec<String>> for SettingValue {
    fn from(value: Vec<String>) -> Self {
        SettingValue::List(value)
    }
}

/// The settings of an exercise, stored as a map from the key of each setting to its value.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Settings(BTreeMap<Ustr, SettingValue>);

impl Settings {
    /// Creates an empty set of settings.
    #[must_use]
    pub fn new() -> Settings {
        Settings::default()
    }

    /// Parses settings serialized as a JSON object.
    pub fn from_json(json: &str) -> Result<Settings> {
        serde_json::from_str(json).context("cannot parse exercise settings")
    }

    /// Serializes the settings as a JSON object.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).context("cannot serialize exercise settings")
    }

    /// Sets the value of a setting, replacing any existing value.
    pub fn insert(&mut self, key: impl Into<Ustr>, value: impl Into<SettingValue>) {
        self.0.insert(key.into(), value.into());
    }

    /// Returns the settings with the given value set.
    #[must_use]
    pub fn with(mut self, key: impl Into<Ustr>, value: impl Into<SettingValue>) -> Settings {
        self.insert(key, value);
        self
    }

    /// Adds the values in `defaults` whose keys are not already set. Existing values always win.
    pub fn merge_defaults(&mut self, defaults: &Settings) {
        for (key, value) in &defaults.0 {
            self.0.entry(*key).or_insert_with(|| value.clone());
        }
    }

    /// Returns the value of the setting, if set.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&SettingValue> {
        self.0.get(&Ustr::from(key))
    }

    /// Returns whether the setting is set.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Returns the keys of all the settings.
    pub fn keys(&self) -> impl Iterator<Item = &Ustr> {
        self.0.keys()
    }

    fn require(&self, key: &str) -> Result<&SettingValue> {
        self.get(key).ok_or_else(|| anyhow!("missing setting {key}"))
    }

    /// Returns the value of a boolean setting.
    pub fn get_bool(&self, key: &str) -> Result<bool> {
        match self.require(key)? {
            SettingValue::Bool(value) => Ok(*value),
            other => Err(anyhow!("setting {key} is not a boolean: {other:?}")),
        }
    }

    /// Returns the value of a numeric setting.
    pub fn get_number(&self, key: &str) -> Result<f64> {
        match self.require(key)? {
            SettingValue::Number(value) => Ok(*value),
            other => Err(anyhow!("setting {key} is not a number: {other:?}")),
        }
    }

    /// Returns the value of a numeric setting that must be a non-negative integer.
    pub fn get_usize(&self, key: &str) -> Result<usize> {
        let value = self.get_number(key)?;
        if value < 0.0 || value.fract() != 0.0 {
            return Err(anyhow!("setting {key} is not a non-negative integer: {value}"));
        }
        Ok(value as usize)
    }

    /// Returns the value of a text setting.
    pub fn get_text(&self, key: &str) -> Result<&str> {
        match self.require(key)? {
            SettingValue::Text(value) => Ok(value),
            other => Err(anyhow!("setting {key} is not a text: {other:?}")),
        }
    }

    /// Returns the value of a list setting.
    pub fn get_list(&self, key: &str) -> Result<&[String]> {
        match self.require(key)? {
            SettingValue::List(value) => Ok(value),
            other => Err(anyhow!("setting {key} is not a list: {other:?}")),
        }
    }
}

/// A predicate deciding whether a setting control is shown given the current settings.
pub type ShowPredicate = Arc<dyn Fn(&Settings) -> bool + Send + Sync>;

/// The control used to edit a setting.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", content = "content")]
pub enum ControlDescriptor {
    /// A slider selecting a number in a range.
    Slider {
        /// The label of the control.
        label: String,

        /// The smallest value.
        min: f64,

        /// The largest value.
        max: f64,

        /// The distance between consecutive values.
        step: f64,
    },

    /// A list of options from which one is selected.
    Select {
        /// The label of the control.
        label: String,

        /// The value and label of each option.
        options: Vec<SelectOption>,
    },

    /// A checkbox toggling a boolean setting.
    Checkbox {
        /// The label of the control.
        label: String,
    },

    /// A grid of answers from which the student picks the ones included in the questions.
    IncludedAnswers {
        /// The label of the control.
        label: String,

        /// The full list of answers.
        answer_list: AnswerList,
    },
}

/// One of the options of a select control.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SelectOption {
    /// The value stored in the settings when the option is selected.
    pub value: String,

    /// The text shown for the option.
    pub label: String,
}

/// Describes how a setting is presented to the student.
#[derive(Clone, Serialize)]
pub struct SettingsDescriptor {
    /// The key of the setting edited by the control.
    pub key: Ustr,

    /// An optional explanation of the setting.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<String>,

    /// The control used to edit the setting.
    pub control: ControlDescriptor,

    /// Decides whether the control is shown. The control is always shown if missing.
    #[serde(skip)]
    pub show: Option<ShowPredicate>,
}

impl SettingsDescriptor {
    /// Creates a descriptor which is always shown and has no explanation.
    pub fn new(key: impl Into<Ustr>, control: ControlDescriptor) -> SettingsDescriptor {
        SettingsDescriptor {
            key: key.into(),
            info: None,
            control,
            show: None,
        }
    }

    /// Returns the descriptor with the given explanation.
    #[must_use]
    pub fn with_info(mut self, info: impl Into<String>) -> SettingsDescriptor {
        self.info = Some(info.into());
        self
    }

    /// Returns the descriptor with the given visibility predicate.
    #[must_use]
    pub fn with_show(
        mut self,
        show: impl Fn(&Settings) -> bool + Send + Sync + 'static,
    ) -> SettingsDescriptor {
        self.show = Some(Arc::new(show));
        self
    }

    /// Returns whether the control is shown given the current settings.
    #[must_use]
    pub fn is_visible(&self, settings: &Settings) -> bool {
        self.show.as_ref().is_none_or(|show| show(settings))
    }
}

impl Debug for SettingsDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("SettingsDescriptor")
            .field("key", &self.key)
            .field("info", &self.info)
            .field("control", &self.control)
            .field("show", &self.show.is_some())
            .finish()
    }
}
