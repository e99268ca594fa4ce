//! Consultation wizard: the questionnaire core.
//!
//! A fixed sequence of steps collects profile and preference answers,
//! adapting wording to the grammatical tone chosen on the first step. Each
//! answer is validated locally before it is committed; the terminal step
//! collects contact details and submits the assembled payload to the
//! consultation service.

pub mod answers;
pub mod client;
pub mod display;
pub mod engine;
pub mod payload;
pub mod state;
pub mod steps;
pub mod submission;
pub mod tone;
pub mod validate;

pub use answers::{AnswerKey, AnswerRecord, AnswerStore};
pub use client::{ConsultationClient, ConsultationReply, HttpConsultationClient};
pub use display::{DisplayAction, ResultView, truncate_response};
pub use engine::{WizardEngine, WizardEvent};
pub use payload::{ConsultationPayload, ContactPayload, ProfilePayload};
pub use state::SubmissionPhase;
pub use steps::{StepDefinition, StepId, StepKind};
pub use submission::{SubmissionController, SubmitOutcome};
pub use tone::{ChoiceOption, Tone, ToneCatalog, resolve_tone};
