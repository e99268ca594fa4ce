//! WizardEngine — step sequencing, answer commits, and render-time queries.
//!
//! The engine owns the session's [`AnswerStore`] and broadcasts
//! [`WizardEvent`]s so any rendering layer can follow along without the
//! core knowing how it draws.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::error::{ConfigError, ValidationError};

use super::answers::{AnswerKey, AnswerStore};
use super::display::ResultView;
use super::state::{SubmissionPhase, SubmissionState};
use super::steps::{OptionSource, StepDefinition, StepId, StepKind, builtin_steps};
use super::tone::{ChoiceOption, Tone, ToneCatalog, resolve_tone};
use super::validate;

/// Default broadcast channel capacity.
const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Fallback status when a step has no status text.
const DEFAULT_STATUS: &str = "Respondendo ao questionário.";

const SUBMIT_LABEL_INITIAL: &str = "Consultar Taróloga IA";
const SUBMIT_LABEL_BUSY: &str = "Criando reflexão...";
const SUBMIT_LABEL_AGAIN: &str = "Gerar reflexão personalizada";

/// Notifications for the rendering layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WizardEvent {
    /// The current step changed (or was re-entered).
    StepChanged { index: usize, step: StepId },
    /// New status badge text.
    Status { text: String },
    /// An error to show inline at the current step.
    Error { message: String },
    /// A request to the consultation service is outstanding.
    SubmissionStarted,
    /// The reflection is ready.
    SubmissionSucceeded { view: ResultView },
    /// The request failed; answers are kept for a retry.
    SubmissionFailed { message: String },
    /// All state was discarded and a new session began.
    SessionRestarted { session_id: Uuid },
}

/// The questionnaire state machine for one session.
pub struct WizardEngine {
    session_id: Uuid,
    steps: Vec<StepDefinition>,
    catalog: ToneCatalog,
    index: usize,
    store: AnswerStore,
    submission: SubmissionState,
    last_error: Option<String>,
    status_text: String,
    fixed_today: Option<NaiveDate>,
    tx: broadcast::Sender<WizardEvent>,
}

impl WizardEngine {
    /// Create an engine positioned on the first step with an empty store.
    pub fn new(steps: Vec<StepDefinition>, catalog: ToneCatalog) -> Self {
        assert!(!steps.is_empty(), "wizard needs at least one step");
        let (tx, _rx) = broadcast::channel(DEFAULT_EVENT_CAPACITY);
        let status_text = status_of(&steps[0]);
        let session_id = Uuid::new_v4();
        info!(session_id = %session_id, steps = steps.len(), "Wizard session started");
        Self {
            session_id,
            steps,
            catalog,
            index: 0,
            store: AnswerStore::new(),
            submission: SubmissionState::default(),
            last_error: None,
            status_text,
            fixed_today: None,
            tx,
        }
    }

    /// The built-in questionnaire and tone catalog.
    pub fn builtin() -> Self {
        Self::new(builtin_steps(), ToneCatalog::builtin())
    }

    /// Evaluate ages against `today` instead of the local clock.
    pub fn with_fixed_date(mut self, today: NaiveDate) -> Self {
        self.fixed_today = Some(today);
        self
    }

    /// Subscribe to engine events.
    pub fn subscribe(&self) -> broadcast::Receiver<WizardEvent> {
        self.tx.subscribe()
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn today(&self) -> NaiveDate {
        self.fixed_today.unwrap_or_else(|| Local::now().date_naive())
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn answers(&self) -> &AnswerStore {
        &self.store
    }

    pub fn is_terminal(&self) -> bool {
        self.index == self.steps.len() - 1
    }

    pub fn phase(&self) -> SubmissionPhase {
        self.submission.phase
    }

    pub fn is_submitting(&self) -> bool {
        self.submission.phase.is_in_flight()
    }

    /// Number of requests sent to the service this session.
    pub fn requests_sent(&self) -> u32 {
        self.submission.requests_sent
    }

    pub fn status_text(&self) -> &str {
        &self.status_text
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    // ── Transitions ─────────────────────────────────────────────────

    /// Move one step forward. No-op on the terminal step.
    pub fn advance(&mut self) {
        if self.index + 1 < self.steps.len() {
            self.index += 1;
            self.enter_step();
        }
    }

    /// Move one step back. No-op on the first step and while a submission
    /// is outstanding.
    pub fn retreat(&mut self) {
        if self.is_submitting() {
            debug!(session_id = %self.session_id, "Back ignored while submitting");
            return;
        }
        if self.index > 0 {
            self.index -= 1;
            self.enter_step();
        }
    }

    /// Whether the current step offers a "back" action.
    pub fn can_go_back(&self) -> bool {
        self.index > 0 && !self.is_submitting()
    }

    /// Validate `raw` for `step` and, on success, commit it and advance.
    ///
    /// On failure nothing changes except the current error message.
    pub fn confirm_step(&mut self, step: StepId, raw: &str) -> Result<(), ValidationError> {
        match self.check_step(step, raw) {
            Ok((key, value, age)) => {
                self.store.set(key, value, age);
                debug!(session_id = %self.session_id, step = %step, "Step confirmed");
                self.advance();
                Ok(())
            }
            Err(e) => {
                debug!(session_id = %self.session_id, step = %step, error = %e, "Step rejected");
                self.report_error(e.to_string());
                Err(e)
            }
        }
    }

    fn check_step(
        &self,
        step: StepId,
        raw: &str,
    ) -> Result<(AnswerKey, String, Option<u32>), ValidationError> {
        let def = self.current_step_definition();
        if def.id != step {
            return Err(ValidationError::StepMismatch {
                expected: def.id.to_string(),
                received: step.to_string(),
            });
        }
        let Some(key) = step.answer_key() else {
            return Err(ValidationError::SubmitRequired);
        };
        match &def.kind {
            StepKind::Choice { .. } => {
                let options = self.current_options().unwrap_or_else(|e| {
                    error!(step = %step, error = %e, "Choice step has no options");
                    Vec::new()
                });
                options
                    .into_iter()
                    .find(|o| o.value == raw)
                    .map(|o| (key, o.value, None))
                    .ok_or(ValidationError::UnknownOption)
            }
            StepKind::FreeText { .. } => {
                validate::validate_free_text(raw).map(|value| (key, value, None))
            }
            StepKind::Date => {
                let age = validate::evaluate_age(raw, self.today())?;
                Ok((key, raw.trim().to_string(), Some(age)))
            }
            StepKind::ContactPair => Err(ValidationError::SubmitRequired),
        }
    }

    /// Discard everything and start a new session on the first step.
    /// Ignored while a submission is outstanding.
    pub fn restart(&mut self) {
        if self.is_submitting() {
            warn!(session_id = %self.session_id, "Restart ignored while submitting");
            return;
        }
        self.session_id = Uuid::new_v4();
        self.index = 0;
        self.store = AnswerStore::new();
        self.submission = SubmissionState::default();
        info!(session_id = %self.session_id, "Wizard session restarted");
        self.emit(WizardEvent::SessionRestarted {
            session_id: self.session_id,
        });
        self.enter_step();
    }

    // ── Render-time queries ────────────────────────────────────────

    pub fn current_step_definition(&self) -> &StepDefinition {
        &self.steps[self.index]
    }

    /// Tone resolved from the stored treatment answer.
    pub fn tone(&self) -> Tone {
        resolve_tone(self.store.get(AnswerKey::Gender).unwrap_or_default())
    }

    pub fn current_title(&self) -> String {
        self.current_step_definition().title_for(self.tone())
    }

    pub fn current_helper(&self) -> &'static str {
        self.current_step_definition().helper
    }

    /// Options of the current step; empty for non-choice steps.
    pub fn current_options(&self) -> Result<Vec<ChoiceOption>, ConfigError> {
        match &self.current_step_definition().kind {
            StepKind::Choice {
                options: OptionSource::Static(options),
            } => Ok(options.clone()),
            StepKind::Choice {
                options: OptionSource::Gendered(key),
            } => self.catalog.resolve_variant_options(*key, self.tone()),
            _ => Ok(Vec::new()),
        }
    }

    /// Stored value for the current step, so it can be pre-selected.
    pub fn selected_value(&self) -> Option<&str> {
        self.current_step_definition()
            .id
            .answer_key()
            .and_then(|key| self.store.get(key))
    }

    /// `index / (N - 1)`, in `[0, 1]`.
    pub fn progress_fraction(&self) -> f64 {
        if self.steps.len() < 2 {
            return 1.0;
        }
        self.index as f64 / (self.steps.len() - 1) as f64
    }

    pub fn progress_label(&self) -> String {
        format!("Passo {} de {}", self.index + 1, self.steps.len())
    }

    /// Latest date the birth date input may offer.
    pub fn date_input_max(&self) -> String {
        validate::max_birth_date(self.today())
    }

    /// Live hint for a birth date being typed. Does not touch the store.
    pub fn preview_birth_date(&self, raw: &str) -> String {
        match validate::evaluate_age(raw, self.today()) {
            Ok(age) => format!("Idade calculada: {age} anos."),
            Err(e) => e.to_string(),
        }
    }

    /// Label of the submit action on the terminal step.
    pub fn submit_label(&self) -> &'static str {
        if self.is_submitting() {
            SUBMIT_LABEL_BUSY
        } else if self.submission.requests_sent > 0 {
            SUBMIT_LABEL_AGAIN
        } else {
            SUBMIT_LABEL_INITIAL
        }
    }

    // ── Submission hooks ───────────────────────────────────────────

    pub(crate) fn transition(&mut self, target: SubmissionPhase) -> Result<(), String> {
        let from = self.submission.phase;
        self.submission.transition(target)?;
        debug!(session_id = %self.session_id, from = %from, to = %target, "Submission phase");
        Ok(())
    }

    pub(crate) fn commit_contact(&mut self, email: String, phone: String) {
        self.store.set(AnswerKey::ContactEmail, email, None);
        self.store.set(AnswerKey::ContactPhone, phone, None);
    }

    pub(crate) fn set_status(&mut self, text: &str) {
        self.status_text = text.to_string();
        self.emit(WizardEvent::Status {
            text: text.to_string(),
        });
    }

    pub(crate) fn report_error(&mut self, message: String) {
        self.last_error = Some(message.clone());
        self.emit(WizardEvent::Error { message });
    }

    pub(crate) fn clear_error(&mut self) {
        self.last_error = None;
    }

    pub(crate) fn emit(&self, event: WizardEvent) {
        // ok if nobody is listening
        let _ = self.tx.send(event);
    }

    fn enter_step(&mut self) {
        self.clear_error();
        let step = self.current_step_definition();
        let id = step.id;
        let status = status_of(step);
        debug!(session_id = %self.session_id, index = self.index, step = %id, "Entered step");
        self.emit(WizardEvent::StepChanged {
            index: self.index,
            step: id,
        });
        self.set_status(&status);
    }
}

fn status_of(step: &StepDefinition) -> String {
    if step.status_text.is_empty() {
        DEFAULT_STATUS.to_string()
    } else {
        step.status_text.to_string()
    }
}
