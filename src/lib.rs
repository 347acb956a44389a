//! Form template editing and persistence
//!
//! [`editor`] holds the draft model and the editor controller,
//! [`sync`] turns drafts into calls against a [`store::TemplateStore`].

pub mod auth;
pub mod cli;
pub mod commands;
pub mod config;
pub mod editor;
pub mod i18n;
pub mod notify;
pub mod store;
pub mod sync;
pub mod ui;

pub use auth::{Session, SessionContext};
pub use editor::{TemplateDraft, TemplateEditor};
pub use store::{MemoryStore, RestStore, TemplateStore};
pub use sync::{SaveError, SaveReport, Synchronizer};
