//! Template data model: questions and their answer options

use super::ids::RecordId;
use super::list::Keyed;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Answer widget of a question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    Text,
    Textarea,
    Number,
    Checkbox,
    Radio,
}

impl QuestionType {
    pub const ALL: [QuestionType; 5] = [
        QuestionType::Text,
        QuestionType::Textarea,
        QuestionType::Number,
        QuestionType::Checkbox,
        QuestionType::Radio,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Textarea => "textarea",
            Self::Number => "number",
            Self::Checkbox => "checkbox",
            Self::Radio => "radio",
        }
    }

    /// Whether the option list is meaningful for this type
    pub fn has_options(&self) -> bool {
        matches!(self, Self::Checkbox | Self::Radio)
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuestionType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| anyhow::anyhow!("Unknown question type '{}'", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessType {
    #[default]
    Private,
    Public,
}

impl AccessType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Private => "private",
            Self::Public => "public",
        }
    }
}

impl fmt::Display for AccessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccessType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "private" => Ok(Self::Private),
            "public" => Ok(Self::Public),
            other => anyhow::bail!("Unknown access type '{}'", other),
        }
    }
}

/// One selectable choice of a checkbox or radio question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOption {
    pub id: RecordId,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub checked: bool,
}

impl AnswerOption {
    pub fn empty(id: RecordId) -> Self {
        Self {
            id,
            value: String::new(),
            checked: false,
        }
    }
}

impl Keyed for AnswerOption {
    fn key(&self) -> &RecordId {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: RecordId,
    #[serde(rename = "type")]
    pub kind: QuestionType,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Only rendered for checkbox/radio, but always persisted
    #[serde(default)]
    pub options: Vec<AnswerOption>,
}

impl Question {
    pub fn empty(id: RecordId, kind: QuestionType) -> Self {
        Self {
            id,
            kind,
            title: String::new(),
            description: String::new(),
            options: Vec::new(),
        }
    }
}

impl Keyed for Question {
    fn key(&self) -> &RecordId {
        &self.id
    }
}
