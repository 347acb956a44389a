//! Template editing: ordered lists, the draft aggregate and the editor
//! controller that wraps it for the presentation layer.

pub mod controller;
pub mod draft;
pub mod ids;
pub mod list;
pub mod model;

pub use controller::{EditorEvent, Listener, SubmittedTemplate, TemplateEditor};
pub use draft::{DraftError, TemplateDraft, MAX_QUESTIONS_PER_TYPE};
pub use ids::{IdGenerator, IdMapping, RecordId, SequentialIds, UuidGenerator};
pub use list::{DragEnd, Keyed};
pub use model::{AccessType, AnswerOption, Question, QuestionType};
