#![allow(dead_code)]

use async_trait::async_trait;
use formsmith::auth::Session;
use formsmith::editor::{QuestionType, RecordId, SequentialIds, TemplateEditor};
use formsmith::notify::MemoryNotifier;
use formsmith::store::{
    MemoryStore, OptionFields, QuestionFields, TemplateFields, TemplateRecord, TemplateStore,
    TemplateSummary,
};
use formsmith::sync::Synchronizer;
use std::sync::Arc;
use tokio::sync::Notify;

pub fn session() -> Session {
    Session::new("ann@example.com", Some("Ann Lee".to_string()), "jwt")
}

pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub sync: Synchronizer,
    pub notifier: Arc<MemoryNotifier>,
    pub editor: TemplateEditor,
}

impl Harness {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let sync = Synchronizer::new(store.clone());
        let notifier = Arc::new(MemoryNotifier::new());
        let editor = TemplateEditor::new()
            .with_id_generator(Arc::new(SequentialIds::new()))
            .with_notifier(notifier.clone());
        Self {
            store,
            sync,
            notifier,
            editor,
        }
    }

    pub async fn save(&mut self) -> formsmith::sync::SaveReport {
        let session = session();
        self.editor
            .save(&self.sync, Some(&session))
            .await
            .expect("save failed")
    }

    /// Add a question with the given option values, returning all new ids
    pub fn question_with_options(&mut self, kind: QuestionType, title: &str, values: &[&str]) -> (RecordId, Vec<RecordId>) {
        let question = self.editor.add_question(kind).expect("capacity");
        self.editor.set_question_title(&question, title);
        let options = values
            .iter()
            .map(|value| {
                let option = self.editor.add_option(&question).expect("question exists");
                self.editor.set_option_value(&question, &option, *value);
                option
            })
            .collect();
        (question, options)
    }

    /// Stored ids of the options of the draft question at `index`
    pub fn stored_option_ids(&self, index: usize) -> Vec<String> {
        self.editor.draft().questions[index]
            .options
            .iter()
            .map(|o| o.id.as_stored().expect("option not stored").to_string())
            .collect()
    }
}

/// Store whose `create_template` waits until released
pub struct GatedStore {
    pub inner: MemoryStore,
    pub entered: Notify,
    pub release: Notify,
}

impl GatedStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryStore::new(),
            entered: Notify::new(),
            release: Notify::new(),
        }
    }
}

#[async_trait]
impl TemplateStore for GatedStore {
    async fn create_template(&self, fields: &TemplateFields) -> anyhow::Result<String> {
        self.entered.notify_one();
        self.release.notified().await;
        self.inner.create_template(fields).await
    }

    async fn create_question(&self, template_id: &str, fields: &QuestionFields) -> anyhow::Result<String> {
        self.inner.create_question(template_id, fields).await
    }

    async fn create_options(&self, question_id: &str, options: &[OptionFields]) -> anyhow::Result<Vec<String>> {
        self.inner.create_options(question_id, options).await
    }

    async fn update_template(&self, id: &str, fields: &TemplateFields) -> anyhow::Result<()> {
        self.inner.update_template(id, fields).await
    }

    async fn upsert_question(&self, id: Option<&str>, template_id: &str, fields: &QuestionFields) -> anyhow::Result<String> {
        self.inner.upsert_question(id, template_id, fields).await
    }

    async fn list_option_ids(&self, question_id: &str) -> anyhow::Result<Vec<String>> {
        self.inner.list_option_ids(question_id).await
    }

    async fn delete_options(&self, ids: &[String]) -> anyhow::Result<()> {
        self.inner.delete_options(ids).await
    }

    async fn upsert_option(&self, id: Option<&str>, question_id: &str, fields: &OptionFields) -> anyhow::Result<String> {
        self.inner.upsert_option(id, question_id, fields).await
    }

    async fn list_question_ids(&self, template_id: &str) -> anyhow::Result<Vec<String>> {
        self.inner.list_question_ids(template_id).await
    }

    async fn delete_questions(&self, ids: &[String]) -> anyhow::Result<()> {
        self.inner.delete_questions(ids).await
    }

    async fn fetch_template(&self, id: &str) -> anyhow::Result<Option<TemplateRecord>> {
        self.inner.fetch_template(id).await
    }

    async fn list_templates_by_owner(&self, gmail: &str) -> anyhow::Result<Vec<TemplateSummary>> {
        self.inner.list_templates_by_owner(gmail).await
    }

    async fn delete_template(&self, id: &str) -> anyhow::Result<()> {
        self.inner.delete_template(id).await
    }
}
