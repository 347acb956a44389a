//! In-memory template store
//!
//! Keeps the template tables and the answers pointing into them in a mutex, enforces the foreign keys between
//! them and journals every successful call. Failures can be injected per
//! call kind to exercise the synchronizer's abort paths.

use super::{
    OptionFields, OptionRecord, QuestionFields, QuestionRecord, TemplateFields, TemplateRecord,
    TemplateStore, TemplateSummary,
};
use anyhow::{anyhow, bail};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallKind {
    CreateTemplate,
    CreateQuestion,
    CreateOptions,
    UpdateTemplate,
    UpsertQuestion,
    ListOptionIds,
    DeleteOptions,
    UpsertOption,
    ListQuestionIds,
    DeleteQuestions,
    FetchTemplate,
    ListTemplates,
    DeleteTemplate,
}

impl CallKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreateTemplate => "create_template",
            Self::CreateQuestion => "create_question",
            Self::CreateOptions => "create_options",
            Self::UpdateTemplate => "update_template",
            Self::UpsertQuestion => "upsert_question",
            Self::ListOptionIds => "list_option_ids",
            Self::DeleteOptions => "delete_options",
            Self::UpsertOption => "upsert_option",
            Self::ListQuestionIds => "list_question_ids",
            Self::DeleteQuestions => "delete_questions",
            Self::FetchTemplate => "fetch_template",
            Self::ListTemplates => "list_templates_by_owner",
            Self::DeleteTemplate => "delete_template",
        }
    }
}

/// A completed store call, as recorded in the journal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    CreateTemplate { id: String },
    CreateQuestion { template_id: String, id: String },
    CreateOptions { question_id: String, ids: Vec<String> },
    UpdateTemplate { id: String },
    UpsertQuestion {
        requested: Option<String>,
        template_id: String,
        id: String,
        inserted: bool,
    },
    ListOptionIds { question_id: String },
    DeleteOptions { ids: Vec<String> },
    UpsertOption {
        requested: Option<String>,
        question_id: String,
        id: String,
        inserted: bool,
    },
    ListQuestionIds { template_id: String },
    DeleteQuestions { ids: Vec<String> },
    FetchTemplate { id: String },
    ListTemplates { gmail: String },
    DeleteTemplate { id: String },
}

impl StoreCall {
    pub fn kind(&self) -> CallKind {
        match self {
            Self::CreateTemplate { .. } => CallKind::CreateTemplate,
            Self::CreateQuestion { .. } => CallKind::CreateQuestion,
            Self::CreateOptions { .. } => CallKind::CreateOptions,
            Self::UpdateTemplate { .. } => CallKind::UpdateTemplate,
            Self::UpsertQuestion { .. } => CallKind::UpsertQuestion,
            Self::ListOptionIds { .. } => CallKind::ListOptionIds,
            Self::DeleteOptions { .. } => CallKind::DeleteOptions,
            Self::UpsertOption { .. } => CallKind::UpsertOption,
            Self::ListQuestionIds { .. } => CallKind::ListQuestionIds,
            Self::DeleteQuestions { .. } => CallKind::DeleteQuestions,
            Self::FetchTemplate { .. } => CallKind::FetchTemplate,
            Self::ListTemplates { .. } => CallKind::ListTemplates,
            Self::DeleteTemplate { .. } => CallKind::DeleteTemplate,
        }
    }

    /// Whether this call added at least one row
    pub fn is_insert(&self) -> bool {
        match self {
            Self::CreateTemplate { .. } | Self::CreateQuestion { .. } => true,
            Self::CreateOptions { ids, .. } => !ids.is_empty(),
            Self::UpsertQuestion { inserted, .. } | Self::UpsertOption { inserted, .. } => *inserted,
            _ => false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StoredTemplate {
    pub id: String,
    pub fields: TemplateFields,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct StoredQuestion {
    pub id: String,
    pub template_id: String,
    pub fields: QuestionFields,
}

#[derive(Debug, Clone)]
pub struct StoredOption {
    pub id: String,
    pub question_id: String,
    pub fields: OptionFields,
}

/// A filled-in answer referencing a question and optionally the option picked
#[derive(Debug, Clone)]
pub struct StoredAnswer {
    pub id: String,
    pub template_id: String,
    pub question_id: String,
    pub option_id: Option<String>,
    pub value: String,
}

#[derive(Debug, Default)]
struct Inner {
    next_id: u64,
    templates: Vec<StoredTemplate>,
    questions: Vec<StoredQuestion>,
    options: Vec<StoredOption>,
    answers: Vec<StoredAnswer>,
    journal: Vec<StoreCall>,
    attempts: HashMap<CallKind, usize>,
    /// kind -> 1-based attempt number that must fail
    failures: HashMap<CallKind, usize>,
}

impl Inner {
    fn generate_id(&mut self) -> String {
        self.next_id += 1;
        self.next_id.to_string()
    }

    /// Count the attempt and fail it when a failure is armed for it
    fn attempt(&mut self, kind: CallKind) -> anyhow::Result<()> {
        let count = {
            let count = self.attempts.entry(kind).or_insert(0);
            *count += 1;
            *count
        };
        if self.failures.get(&kind) == Some(&count) {
            self.failures.remove(&kind);
            bail!("injected failure on {}", kind.as_str());
        }
        Ok(())
    }

    fn has_template(&self, id: &str) -> bool {
        self.templates.iter().any(|t| t.id == id)
    }

    fn has_question(&self, id: &str) -> bool {
        self.questions.iter().any(|q| q.id == id)
    }

    fn build_record(&self, template: &StoredTemplate) -> TemplateRecord {
        let mut questions: Vec<&StoredQuestion> = self
            .questions
            .iter()
            .filter(|q| q.template_id == template.id)
            .collect();
        questions.sort_by_key(|q| q.fields.position);

        TemplateRecord {
            id: template.id.clone(),
            title: template.fields.title.clone(),
            description: template.fields.description.clone(),
            access_type: template.fields.access_type,
            author: template.fields.author.clone(),
            gmail: template.fields.gmail.clone(),
            created_at: Some(template.created_at),
            questions: questions
                .into_iter()
                .map(|q| {
                    let mut options: Vec<&StoredOption> =
                        self.options.iter().filter(|o| o.question_id == q.id).collect();
                    options.sort_by_key(|o| o.fields.position);
                    QuestionRecord {
                        id: q.id.clone(),
                        kind: q.fields.kind,
                        title: q.fields.title.clone(),
                        description: q.fields.description.clone(),
                        position: Some(q.fields.position),
                        options: options
                            .into_iter()
                            .map(|o| OptionRecord {
                                id: o.id.clone(),
                                value: o.fields.value.clone(),
                                checked: o.fields.checked,
                                position: Some(o.fields.position),
                            })
                            .collect(),
                    }
                })
                .collect(),
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next call of `kind` fail
    pub fn fail_on(&self, kind: CallKind) {
        let mut inner = self.guard();
        let next = inner.attempts.get(&kind).copied().unwrap_or(0) + 1;
        inner.failures.insert(kind, next);
    }

    /// Make the `nth` call of `kind` (counting from now, 1-based) fail
    pub fn fail_on_nth(&self, kind: CallKind, nth: usize) {
        let mut inner = self.guard();
        let done = inner.attempts.get(&kind).copied().unwrap_or(0);
        inner.failures.insert(kind, done + nth.max(1));
    }

    /// Journal of successful calls, oldest first
    pub fn calls(&self) -> Vec<StoreCall> {
        self.guard().journal.clone()
    }

    pub fn calls_of(&self, kind: CallKind) -> Vec<StoreCall> {
        self.guard()
            .journal
            .iter()
            .filter(|call| call.kind() == kind)
            .cloned()
            .collect()
    }

    pub fn clear_calls(&self) {
        self.guard().journal.clear();
    }

    pub fn templates(&self) -> Vec<StoredTemplate> {
        self.guard().templates.clone()
    }

    pub fn questions(&self) -> Vec<StoredQuestion> {
        self.guard().questions.clone()
    }

    pub fn options(&self) -> Vec<StoredOption> {
        self.guard().options.clone()
    }

    pub fn answers(&self) -> Vec<StoredAnswer> {
        self.guard().answers.clone()
    }

    /// Record an answer to `question_id`, as filling in the form would
    ///
    /// Not journaled; answers are written outside the editor.
    pub fn add_answer(&self, question_id: &str, option_id: Option<&str>, value: &str) -> anyhow::Result<String> {
        let mut inner = self.lock()?;
        let template_id = inner
            .questions
            .iter()
            .find(|q| q.id == question_id)
            .map(|q| q.template_id.clone())
            .ok_or_else(|| anyhow!("foreign key violation: question {} does not exist", question_id))?;
        if let Some(option_id) = option_id {
            if !inner.options.iter().any(|o| o.id == option_id && o.question_id == question_id) {
                bail!("foreign key violation: option {} does not exist", option_id);
            }
        }

        let id = inner.generate_id();
        inner.answers.push(StoredAnswer {
            id: id.clone(),
            template_id,
            question_id: question_id.to_string(),
            option_id: option_id.map(str::to_string),
            value: value.to_string(),
        });
        Ok(id)
    }

    fn guard(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock(&self) -> anyhow::Result<MutexGuard<'_, Inner>> {
        self.inner.lock().map_err(|_| anyhow!("memory store lock poisoned"))
    }
}

#[async_trait]
impl TemplateStore for MemoryStore {
    async fn create_template(&self, fields: &TemplateFields) -> anyhow::Result<String> {
        let mut inner = self.lock()?;
        inner.attempt(CallKind::CreateTemplate)?;

        let id = inner.generate_id();
        inner.templates.push(StoredTemplate {
            id: id.clone(),
            fields: fields.clone(),
            created_at: Utc::now(),
        });
        inner.journal.push(StoreCall::CreateTemplate { id: id.clone() });
        Ok(id)
    }

    async fn create_question(&self, template_id: &str, fields: &QuestionFields) -> anyhow::Result<String> {
        let mut inner = self.lock()?;
        inner.attempt(CallKind::CreateQuestion)?;
        if !inner.has_template(template_id) {
            bail!("foreign key violation: template {} does not exist", template_id);
        }

        let id = inner.generate_id();
        inner.questions.push(StoredQuestion {
            id: id.clone(),
            template_id: template_id.to_string(),
            fields: fields.clone(),
        });
        inner.journal.push(StoreCall::CreateQuestion {
            template_id: template_id.to_string(),
            id: id.clone(),
        });
        Ok(id)
    }

    async fn create_options(&self, question_id: &str, options: &[OptionFields]) -> anyhow::Result<Vec<String>> {
        let mut inner = self.lock()?;
        inner.attempt(CallKind::CreateOptions)?;
        if !inner.has_question(question_id) {
            bail!("foreign key violation: question {} does not exist", question_id);
        }

        let mut ids = Vec::with_capacity(options.len());
        for fields in options {
            let id = inner.generate_id();
            inner.options.push(StoredOption {
                id: id.clone(),
                question_id: question_id.to_string(),
                fields: fields.clone(),
            });
            ids.push(id);
        }
        inner.journal.push(StoreCall::CreateOptions {
            question_id: question_id.to_string(),
            ids: ids.clone(),
        });
        Ok(ids)
    }

    async fn update_template(&self, id: &str, fields: &TemplateFields) -> anyhow::Result<()> {
        let mut inner = self.lock()?;
        inner.attempt(CallKind::UpdateTemplate)?;

        let template = inner
            .templates
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| anyhow!("template {} does not exist", id))?;
        // ownership columns are only written on insert
        template.fields = TemplateFields {
            author: template.fields.author.take(),
            gmail: template.fields.gmail.take(),
            ..fields.clone()
        };
        inner.journal.push(StoreCall::UpdateTemplate { id: id.to_string() });
        Ok(())
    }

    async fn upsert_question(&self, id: Option<&str>, template_id: &str, fields: &QuestionFields) -> anyhow::Result<String> {
        let mut inner = self.lock()?;
        inner.attempt(CallKind::UpsertQuestion)?;
        if !inner.has_template(template_id) {
            bail!("foreign key violation: template {} does not exist", template_id);
        }

        let existing = id.and_then(|id| inner.questions.iter_mut().find(|q| q.id == id));
        let (stored_id, inserted) = match existing {
            Some(question) => {
                question.template_id = template_id.to_string();
                question.fields = fields.clone();
                (question.id.clone(), false)
            }
            None => {
                let new_id = match id {
                    Some(id) => id.to_string(),
                    None => inner.generate_id(),
                };
                inner.questions.push(StoredQuestion {
                    id: new_id.clone(),
                    template_id: template_id.to_string(),
                    fields: fields.clone(),
                });
                (new_id, true)
            }
        };
        inner.journal.push(StoreCall::UpsertQuestion {
            requested: id.map(str::to_string),
            template_id: template_id.to_string(),
            id: stored_id.clone(),
            inserted,
        });
        Ok(stored_id)
    }

    async fn list_option_ids(&self, question_id: &str) -> anyhow::Result<Vec<String>> {
        let mut inner = self.lock()?;
        inner.attempt(CallKind::ListOptionIds)?;

        let ids = inner
            .options
            .iter()
            .filter(|o| o.question_id == question_id)
            .map(|o| o.id.clone())
            .collect();
        inner.journal.push(StoreCall::ListOptionIds {
            question_id: question_id.to_string(),
        });
        Ok(ids)
    }

    async fn delete_options(&self, ids: &[String]) -> anyhow::Result<()> {
        let mut inner = self.lock()?;
        inner.attempt(CallKind::DeleteOptions)?;

        inner
            .answers
            .retain(|a| !a.option_id.as_ref().is_some_and(|option| ids.contains(option)));
        inner.options.retain(|o| !ids.contains(&o.id));
        inner.journal.push(StoreCall::DeleteOptions { ids: ids.to_vec() });
        Ok(())
    }

    async fn upsert_option(&self, id: Option<&str>, question_id: &str, fields: &OptionFields) -> anyhow::Result<String> {
        let mut inner = self.lock()?;
        inner.attempt(CallKind::UpsertOption)?;
        if !inner.has_question(question_id) {
            bail!("foreign key violation: question {} does not exist", question_id);
        }

        let existing = id.and_then(|id| inner.options.iter_mut().find(|o| o.id == id));
        let (stored_id, inserted) = match existing {
            Some(option) => {
                option.question_id = question_id.to_string();
                option.fields = fields.clone();
                (option.id.clone(), false)
            }
            None => {
                let new_id = match id {
                    Some(id) => id.to_string(),
                    None => inner.generate_id(),
                };
                inner.options.push(StoredOption {
                    id: new_id.clone(),
                    question_id: question_id.to_string(),
                    fields: fields.clone(),
                });
                (new_id, true)
            }
        };
        inner.journal.push(StoreCall::UpsertOption {
            requested: id.map(str::to_string),
            question_id: question_id.to_string(),
            id: stored_id.clone(),
            inserted,
        });
        Ok(stored_id)
    }

    async fn list_question_ids(&self, template_id: &str) -> anyhow::Result<Vec<String>> {
        let mut inner = self.lock()?;
        inner.attempt(CallKind::ListQuestionIds)?;

        let ids = inner
            .questions
            .iter()
            .filter(|q| q.template_id == template_id)
            .map(|q| q.id.clone())
            .collect();
        inner.journal.push(StoreCall::ListQuestionIds {
            template_id: template_id.to_string(),
        });
        Ok(ids)
    }

    async fn delete_questions(&self, ids: &[String]) -> anyhow::Result<()> {
        let mut inner = self.lock()?;
        inner.attempt(CallKind::DeleteQuestions)?;

        inner.answers.retain(|a| !ids.contains(&a.question_id));
        inner.options.retain(|o| !ids.contains(&o.question_id));
        inner.questions.retain(|q| !ids.contains(&q.id));
        inner.journal.push(StoreCall::DeleteQuestions { ids: ids.to_vec() });
        Ok(())
    }

    async fn fetch_template(&self, id: &str) -> anyhow::Result<Option<TemplateRecord>> {
        let mut inner = self.lock()?;
        inner.attempt(CallKind::FetchTemplate)?;

        let record = inner
            .templates
            .iter()
            .find(|t| t.id == id)
            .map(|t| inner.build_record(t));
        inner.journal.push(StoreCall::FetchTemplate { id: id.to_string() });
        Ok(record)
    }

    async fn list_templates_by_owner(&self, gmail: &str) -> anyhow::Result<Vec<TemplateSummary>> {
        let mut inner = self.lock()?;
        inner.attempt(CallKind::ListTemplates)?;

        let mut summaries: Vec<TemplateSummary> = inner
            .templates
            .iter()
            .filter(|t| t.fields.gmail.as_deref() == Some(gmail))
            .map(|t| TemplateSummary {
                id: t.id.clone(),
                title: t.fields.title.clone(),
                author: t.fields.author.clone(),
                created_at: Some(t.created_at),
            })
            .collect();
        summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        inner.journal.push(StoreCall::ListTemplates { gmail: gmail.to_string() });
        Ok(summaries)
    }

    async fn delete_template(&self, id: &str) -> anyhow::Result<()> {
        let mut inner = self.lock()?;
        inner.attempt(CallKind::DeleteTemplate)?;

        let question_ids: Vec<String> = inner
            .questions
            .iter()
            .filter(|q| q.template_id == id)
            .map(|q| q.id.clone())
            .collect();
        inner.answers.retain(|a| a.template_id != id);
        inner.options.retain(|o| !question_ids.contains(&o.question_id));
        inner.questions.retain(|q| q.template_id != id);
        inner.templates.retain(|t| t.id != id);
        inner.journal.push(StoreCall::DeleteTemplate { id: id.to_string() });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::{AccessType, QuestionType};

    fn template_fields() -> TemplateFields {
        TemplateFields {
            title: "T".to_string(),
            description: String::new(),
            access_type: AccessType::Public,
            author: Some("Ann".to_string()),
            gmail: Some("ann@example.com".to_string()),
        }
    }

    fn question_fields(position: i32) -> QuestionFields {
        QuestionFields {
            title: format!("Q{}", position),
            description: String::new(),
            kind: QuestionType::Radio,
            position,
        }
    }

    #[tokio::test]
    async fn test_foreign_keys_are_enforced() {
        let store = MemoryStore::new();
        assert!(store.create_question("missing", &question_fields(0)).await.is_err());
        assert!(store.upsert_option(None, "missing", &OptionFields {
            value: "x".to_string(),
            checked: false,
            position: 0,
        }).await.is_err());
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn test_upsert_inserts_then_updates() {
        let store = MemoryStore::new();
        let template = store.create_template(&template_fields()).await.unwrap();

        let id = store.upsert_question(None, &template, &question_fields(0)).await.unwrap();
        let same = store.upsert_question(Some(&id), &template, &question_fields(1)).await.unwrap();

        assert_eq!(id, same);
        let calls = store.calls_of(CallKind::UpsertQuestion);
        assert!(calls[0].is_insert());
        assert!(!calls[1].is_insert());
        assert_eq!(store.questions()[0].fields.position, 1);
    }

    #[tokio::test]
    async fn test_injected_failure_hits_only_armed_attempt() {
        let store = MemoryStore::new();
        store.fail_on_nth(CallKind::CreateTemplate, 2);

        assert!(store.create_template(&template_fields()).await.is_ok());
        assert!(store.create_template(&template_fields()).await.is_err());
        assert!(store.create_template(&template_fields()).await.is_ok());
        assert_eq!(store.templates().len(), 2);
    }

    #[tokio::test]
    async fn test_update_keeps_ownership_columns() {
        let store = MemoryStore::new();
        let id = store.create_template(&template_fields()).await.unwrap();

        let update = TemplateFields {
            title: "Renamed".to_string(),
            author: None,
            gmail: None,
            ..template_fields()
        };
        store.update_template(&id, &update).await.unwrap();

        let stored = &store.templates()[0];
        assert_eq!(stored.fields.title, "Renamed");
        assert_eq!(stored.fields.gmail.as_deref(), Some("ann@example.com"));
    }

    #[tokio::test]
    async fn test_delete_template_cascades() {
        let store = MemoryStore::new();
        let template = store.create_template(&template_fields()).await.unwrap();
        let question = store.create_question(&template, &question_fields(0)).await.unwrap();
        store
            .create_options(&question, &[OptionFields { value: "a".to_string(), checked: false, position: 0 }])
            .await
            .unwrap();

        store.delete_template(&template).await.unwrap();

        assert!(store.templates().is_empty());
        assert!(store.questions().is_empty());
        assert!(store.options().is_empty());
        assert!(store.fetch_template(&template).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_deletes_take_answers_with_them() {
        let store = MemoryStore::new();
        let template = store.create_template(&template_fields()).await.unwrap();
        let kept = store.create_question(&template, &question_fields(0)).await.unwrap();
        let dropped = store.create_question(&template, &question_fields(1)).await.unwrap();
        let options = store
            .create_options(&kept, &[
                OptionFields { value: "a".to_string(), checked: false, position: 0 },
                OptionFields { value: "b".to_string(), checked: false, position: 1 },
            ])
            .await
            .unwrap();
        store.add_answer(&kept, Some(&options[0]), "a").unwrap();
        store.add_answer(&kept, Some(&options[1]), "b").unwrap();
        store.add_answer(&dropped, None, "free text").unwrap();
        assert!(store.add_answer(&kept, Some("missing"), "x").is_err());

        store.delete_options(&[options[0].clone()]).await.unwrap();
        store.delete_questions(&[dropped]).await.unwrap();

        let answers = store.answers();
        assert_eq!(answers.len(), 1);
        assert_eq!(answers[0].option_id.as_deref(), Some(options[1].as_str()));
    }
}
