//! Template Store
//!
//! Abstract interface to the hosted backend holding the `templates`,
//! `questions` and `options` tables and the `answers` that reference
//! them, plus the row types exchanged with it.
//! Implementations: [`RestStore`] (PostgREST over HTTP) and [`MemoryStore`].

pub mod constants;
pub mod logging;
pub mod memory;
pub mod rest;

pub use logging::{CallContext, CallLogConfig, CallLogger, LogLevel};
pub use memory::{CallKind, MemoryStore, StoreCall};
pub use rest::RestStore;

use crate::editor::{AccessType, QuestionType};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Scalar columns of a template row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateFields {
    pub title: String,
    pub description: String,
    pub access_type: AccessType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gmail: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionFields {
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: QuestionType,
    pub position: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionFields {
    pub value: String,
    pub checked: bool,
    pub position: i32,
}

/// A template as fetched for editing, questions and options in position order
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TemplateRecord {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub access_type: AccessType,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub gmail: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub questions: Vec<QuestionRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct QuestionRecord {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: QuestionType,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub position: Option<i32>,
    #[serde(default)]
    pub options: Vec<OptionRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OptionRecord {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub checked: bool,
    #[serde(default)]
    pub position: Option<i32>,
}

/// Row of the owner's template listing
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TemplateSummary {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Store ids arrive as JSON strings or numbers depending on the column type
pub(crate) fn id_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    id_from_value(&value).ok_or_else(|| serde::de::Error::custom(format!("invalid record id: {}", value)))
}

/// Persistence collaborator of the synchronizer
///
/// Every call may fail with a store-level error; callers surface it and
/// never retry.
#[async_trait]
pub trait TemplateStore: Send + Sync {
    /// Insert a template row, returning its generated id
    async fn create_template(&self, fields: &TemplateFields) -> anyhow::Result<String>;

    /// Insert a question row for `template_id`, returning its generated id
    async fn create_question(&self, template_id: &str, fields: &QuestionFields) -> anyhow::Result<String>;

    /// Insert option rows for `question_id`, returning their ids in input order
    async fn create_options(&self, question_id: &str, options: &[OptionFields]) -> anyhow::Result<Vec<String>>;

    async fn update_template(&self, id: &str, fields: &TemplateFields) -> anyhow::Result<()>;

    /// Update the question `id`, or insert it when `id` is `None` or unknown
    async fn upsert_question(&self, id: Option<&str>, template_id: &str, fields: &QuestionFields) -> anyhow::Result<String>;

    async fn list_option_ids(&self, question_id: &str) -> anyhow::Result<Vec<String>>;

    /// Delete options and the answers that picked them
    async fn delete_options(&self, ids: &[String]) -> anyhow::Result<()>;

    /// Update the option `id`, or insert it when `id` is `None` or unknown
    async fn upsert_option(&self, id: Option<&str>, question_id: &str, fields: &OptionFields) -> anyhow::Result<String>;

    async fn list_question_ids(&self, template_id: &str) -> anyhow::Result<Vec<String>>;

    /// Delete questions together with their options and answers
    async fn delete_questions(&self, ids: &[String]) -> anyhow::Result<()>;

    /// Template with ordered questions and options, `None` when absent
    async fn fetch_template(&self, id: &str) -> anyhow::Result<Option<TemplateRecord>>;

    async fn list_templates_by_owner(&self, gmail: &str) -> anyhow::Result<Vec<TemplateSummary>>;

    /// Delete a template with all its answers, options and questions
    async fn delete_template(&self, id: &str) -> anyhow::Result<()>;
}
