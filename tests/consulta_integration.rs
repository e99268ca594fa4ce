//! Integration tests for the wizard against a live consultation server.
//!
//! Each test spins up an Axum server on a random port with a stub
//! generator and drives a wizard session over real HTTP.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tokio::time::timeout;

use tarot_consult::config::WizardConfig;
use tarot_consult::error::{GENERIC_FAILURE_MESSAGE, GenerationError, SubmissionError};
use tarot_consult::server::{ConsultaRouteState, ReflectionGenerator, consulta_routes};
use tarot_consult::wizard::{
    HttpConsultationClient, StepId, SubmissionController, SubmissionPhase, SubmitOutcome,
    WizardEngine,
};

/// Maximum time any test is allowed to run before we consider it hung.
const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Stub generator that records the user prompts it receives.
struct StubGenerator {
    reply: Result<String, GenerationError>,
    prompts: Mutex<Vec<String>>,
}

#[async_trait]
impl ReflectionGenerator for StubGenerator {
    async fn generate(&self, _system: &str, user: &str) -> Result<String, GenerationError> {
        self.prompts.lock().unwrap().push(user.to_string());
        self.reply.clone()
    }
}

/// Start an Axum server on a random port, return (port, generator).
async fn start_server(
    reply: Result<String, GenerationError>,
    today: NaiveDate,
) -> (u16, Arc<StubGenerator>) {
    let generator = Arc::new(StubGenerator {
        reply,
        prompts: Mutex::new(Vec::new()),
    });
    let app = consulta_routes(ConsultaRouteState {
        generator: generator.clone(),
        today: Some(today),
    });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (port, generator)
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn controller_for(port: u16, today: NaiveDate) -> SubmissionController {
    let config = WizardConfig {
        endpoint: format!("http://127.0.0.1:{port}/api/consulta"),
        ..WizardConfig::default()
    };
    let engine = WizardEngine::builtin().with_fixed_date(today);
    let client = Arc::new(HttpConsultationClient::from_config(&config));
    SubmissionController::new(Arc::new(RwLock::new(engine)), client, config)
}

/// Answer every step up to the contact step for "Luna".
async fn fill_profile(controller: &SubmissionController, birth_date: &str) {
    let engine = controller.engine();
    let mut engine = engine.write().await;
    let answers = [
        (StepId::Gender, "Tratamento neutro (elu/delu)"),
        (StepId::Name, "Luna"),
        (StepId::BirthDate, birth_date),
        (StepId::Persona, "Sonhador(e) sensível que segue a intuição"),
        (StepId::Topic, "Autoconhecimento"),
        (StepId::Challenge, "Deseja equilibrar mente, corpo e espírito"),
        (StepId::Emotion, "Se sente esperançose"),
        (StepId::Support, "Prefere passos práticos e diretos"),
        (StepId::Focus, "Quer ouvir melhor a intuição"),
    ];
    for (step, value) in answers {
        engine
            .confirm_step(step, value)
            .unwrap_or_else(|e| panic!("{step}: {e}"));
    }
    assert_eq!(engine.current_step_definition().id, StepId::Contact);
}

#[tokio::test]
async fn neutral_session_gets_truncated_reflection() {
    timeout(TEST_TIMEOUT, async {
        let today = date(2025, 6, 1);
        let long = "a".repeat(5000);
        let (port, generator) = start_server(Ok(long), today).await;
        let controller = controller_for(port, today);
        fill_profile(&controller, "1995-03-10").await;

        let outcome = controller.submit("luna@example.com", "11999990000").await;
        let view = match outcome {
            SubmitOutcome::Succeeded(view) => view,
            other => panic!("unexpected {other:?}"),
        };
        assert_eq!(view.message.chars().count(), 1801);
        assert!(view.message.ends_with('…'));

        let prompts = generator.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        let prompt = &prompts[0];
        assert!(prompt.contains("Nome preferido da pessoa: Luna."));
        assert!(prompt.contains("Idade declarada: 30 anos."));
        assert!(prompt.contains("Modo de tratamento de gênero preferido: Tratamento neutro (elu/delu)."));
        assert!(prompt.contains("Foco pessoal descrito: Quer ouvir melhor a intuição."));
        assert!(prompt.contains("Telefone registrado: 11999990000."));

        let engine = controller.engine();
        assert_eq!(engine.read().await.phase(), SubmissionPhase::Succeeded);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn server_refusal_is_shown_and_answers_kept() {
    timeout(TEST_TIMEOUT, async {
        // The wizard's clock says 18; the server's says 17.
        let (port, generator) = start_server(Ok("nunca".into()), date(2025, 6, 1)).await;
        let controller = controller_for(port, date(2026, 6, 1));
        fill_profile(&controller, "2008-01-15").await;

        let outcome = controller.submit("luna@example.com", "11999990000").await;
        match &outcome {
            SubmitOutcome::Failed(err @ SubmissionError::Remote { status: 400, .. }) => {
                assert_eq!(err.user_message(), "Consulta não permitida.");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(generator.prompts.lock().unwrap().is_empty());

        let engine = controller.engine();
        let engine = engine.read().await;
        assert_eq!(engine.phase(), SubmissionPhase::Failed);
        assert_eq!(engine.last_error(), Some("Consulta não permitida."));
        assert_eq!(engine.current_step_definition().id, StepId::Contact);
        assert_eq!(engine.answers().len(), 11);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn generator_failure_uses_generic_message_then_retry_succeeds() {
    timeout(TEST_TIMEOUT, async {
        let today = date(2025, 6, 1);
        let (port, _generator) = start_server(Err(GenerationError::EmptyResponse), today).await;
        let controller = controller_for(port, today);
        fill_profile(&controller, "1990-01-01").await;

        let outcome = controller.submit("luna@example.com", "11999990000").await;
        match &outcome {
            SubmitOutcome::Failed(err) => assert_eq!(err.user_message(), GENERIC_FAILURE_MESSAGE),
            other => panic!("unexpected {other:?}"),
        }

        // Same session, healthy server: a second press goes through.
        let (healthy_port, _) = start_server(Ok("Reflexão".into()), today).await;
        let engine = controller.engine();
        let config = WizardConfig {
            endpoint: format!("http://127.0.0.1:{healthy_port}/api/consulta"),
            ..WizardConfig::default()
        };
        let retry = SubmissionController::new(
            engine.clone(),
            Arc::new(HttpConsultationClient::from_config(&config)),
            config,
        );
        match retry.submit("luna@example.com", "11999990000").await {
            SubmitOutcome::Succeeded(view) => assert_eq!(view.message, "Reflexão"),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(engine.read().await.requests_sent(), 2);
    })
    .await
    .expect("test timed out");
}
