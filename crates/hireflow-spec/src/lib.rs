#![allow(missing_docs)]

pub mod answers;
pub mod builder;
pub mod render;
pub mod schema;
pub mod session;
pub mod spec;
pub mod store;
pub mod validate;
pub mod visibility;

pub use answers::{AnswerMap, AnswerValue, ResponseDocument};
pub use builder::{
    apply, check_saveable, save, BuilderError, EditIntent, QuestionPatch, SaveError,
};
pub use render::{
    build_preview_payload, render_json_ui, render_text, PreviewPayload, PreviewProgress,
    PreviewQuestion, PreviewSection,
};
pub use schema::response_schema;
pub use session::{RuntimeSession, SessionError, SessionStatus, SubmitOutcome};
pub use spec::{Assessment, Question, QuestionType, Section, VisibilityPredicate};
pub use store::{AssessmentStore, StoreError};
pub use validate::{first_invalid, is_clean, validate, ValidationMap};
pub use visibility::{resolve_visibility, VisibilityMap};
