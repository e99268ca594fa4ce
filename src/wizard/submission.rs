//! SubmissionController — guards, sends, and reports one consultation
//! request at a time.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::config::WizardConfig;
use crate::error::{GENERIC_FAILURE_MESSAGE, SubmissionError, ValidationError};

use super::client::ConsultationClient;
use super::display::ResultView;
use super::engine::{WizardEngine, WizardEvent};
use super::payload::ConsultationPayload;
use super::state::SubmissionPhase;
use super::steps::StepId;
use super::validate;

const STATUS_SUBMITTING: &str = "Consultando a terapeuta holística...";
const STATUS_SUCCEEDED: &str = "Reflexão pronta para ser lida.";
const STATUS_FAILED: &str = "Revise os dados e tente novamente.";

/// Result of one press of the submit action.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// A request is already outstanding; nothing was sent.
    Busy,
    /// Local validation failed; nothing was sent.
    Rejected(ValidationError),
    /// The reflection is ready (already truncated for display).
    Succeeded(ResultView),
    /// The service or transport failed; answers are kept for a retry.
    Failed(SubmissionError),
}

/// Drives submissions from the terminal step.
pub struct SubmissionController {
    engine: Arc<RwLock<WizardEngine>>,
    client: Arc<dyn ConsultationClient>,
    config: WizardConfig,
}

impl SubmissionController {
    pub fn new(
        engine: Arc<RwLock<WizardEngine>>,
        client: Arc<dyn ConsultationClient>,
        config: WizardConfig,
    ) -> Self {
        Self {
            engine,
            client,
            config,
        }
    }

    /// Shared handle to the engine this controller submits for.
    pub fn engine(&self) -> Arc<RwLock<WizardEngine>> {
        Arc::clone(&self.engine)
    }

    /// Validate the contact fields and, if they pass, send the payload.
    ///
    /// The engine lock is released while the request is outstanding, so
    /// renderers keep reading state; a concurrent call observes the
    /// `Submitting` phase and returns [`SubmitOutcome::Busy`].
    pub async fn submit(&self, raw_email: &str, raw_phone: &str) -> SubmitOutcome {
        let (payload, session_id) = {
            let mut engine = self.engine.write().await;

            if !engine.is_terminal() {
                let err = ValidationError::StepMismatch {
                    expected: engine.current_step_definition().id.to_string(),
                    received: StepId::Contact.to_string(),
                };
                engine.report_error(err.to_string());
                return SubmitOutcome::Rejected(err);
            }
            if !engine.phase().accepts_submit() {
                debug!(session_id = %engine.session_id(), phase = %engine.phase(), "Submit ignored");
                return SubmitOutcome::Busy;
            }
            if engine.phase() != SubmissionPhase::Idle {
                move_to(&mut engine, SubmissionPhase::Idle);
            }

            engine.clear_error();
            move_to(&mut engine, SubmissionPhase::Validating);
            match validate::validate_contact(raw_email, raw_phone) {
                Ok((email, phone)) => engine.commit_contact(email, phone),
                Err(e) => {
                    debug!(session_id = %engine.session_id(), error = %e, "Contact rejected");
                    engine.report_error(e.to_string());
                    move_to(&mut engine, SubmissionPhase::Idle);
                    return SubmitOutcome::Rejected(e);
                }
            }

            move_to(&mut engine, SubmissionPhase::Submitting);
            engine.set_status(STATUS_SUBMITTING);
            engine.emit(WizardEvent::SubmissionStarted);
            (
                ConsultationPayload::build(engine.answers()),
                engine.session_id(),
            )
        };

        info!(session_id = %session_id, "Submitting consultation");
        let mut in_flight = InFlight {
            engine: Arc::clone(&self.engine),
            armed: true,
        };
        let result = self.client.request(&payload).await;

        let mut engine = self.engine.write().await;
        in_flight.armed = false;
        match result {
            Ok(reply) => {
                move_to(&mut engine, SubmissionPhase::Succeeded);
                let view = ResultView::new(
                    &reply.message,
                    self.config.max_response_chars,
                    &self.config.follow_up_url,
                );
                info!(
                    session_id = %session_id,
                    chars = reply.message.chars().count(),
                    "Consultation succeeded"
                );
                engine.set_status(STATUS_SUCCEEDED);
                engine.emit(WizardEvent::SubmissionSucceeded { view: view.clone() });
                SubmitOutcome::Succeeded(view)
            }
            Err(e) => {
                move_to(&mut engine, SubmissionPhase::Failed);
                let message = e.user_message();
                warn!(session_id = %session_id, error = %e, "Consultation failed");
                engine.report_error(message.clone());
                engine.set_status(STATUS_FAILED);
                engine.emit(WizardEvent::SubmissionFailed { message });
                SubmitOutcome::Failed(e)
            }
        }
    }
}

/// Marks an outstanding submission as failed if `submit` is dropped before
/// the reply is recorded, so the session does not stay locked in
/// `Submitting`.
struct InFlight {
    engine: Arc<RwLock<WizardEngine>>,
    armed: bool,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        match self.engine.try_write() {
            Ok(mut engine) => abandon(&mut engine),
            Err(_) => {
                let engine = Arc::clone(&self.engine);
                if let Ok(handle) = tokio::runtime::Handle::try_current() {
                    handle.spawn(async move { abandon(&mut *engine.write().await) });
                }
            }
        }
    }
}

fn abandon(engine: &mut WizardEngine) {
    if !engine.is_submitting() {
        return;
    }
    warn!(session_id = %engine.session_id(), "Submission dropped before completion");
    move_to(engine, SubmissionPhase::Failed);
    let message = GENERIC_FAILURE_MESSAGE.to_string();
    engine.report_error(message.clone());
    engine.set_status(STATUS_FAILED);
    engine.emit(WizardEvent::SubmissionFailed { message });
}

fn move_to(engine: &mut WizardEngine, target: SubmissionPhase) {
    if let Err(e) = engine.transition(target) {
        warn!(session_id = %engine.session_id(), "Submission phase: {}", e);
    }
}
