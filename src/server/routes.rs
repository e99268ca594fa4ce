//! HTTP endpoints for the consultation service.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::NaiveDate;
use tower_http::cors::CorsLayer;

use super::generator::ReflectionGenerator;
use super::intake::{Rejection, check_request};
use super::prompts::{SYSTEM_PROMPT, user_prompt};
use crate::error::GENERIC_FAILURE_MESSAGE;
use crate::wizard::payload::ConsultationPayload;

/// Shared state for consultation routes.
#[derive(Clone)]
pub struct ConsultaRouteState {
    pub generator: Arc<dyn ReflectionGenerator>,
    /// Reference date for age checks; `None` uses the local clock.
    pub today: Option<NaiveDate>,
}

impl ConsultaRouteState {
    pub fn new(generator: Arc<dyn ReflectionGenerator>) -> Self {
        Self {
            generator,
            today: None,
        }
    }

    fn today(&self) -> NaiveDate {
        self.today
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }
}

fn error_reply(status: StatusCode, error: &str, details: &str) -> Response {
    (
        status,
        Json(serde_json::json!({"erro": error, "detalhes": details})),
    )
        .into_response()
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        error_reply(StatusCode::BAD_REQUEST, &self.error, &self.details)
    }
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "tarot-consult"
    }))
}

/// POST /api/consulta
///
/// A body that is not valid JSON is treated as empty, so it is reported
/// as missing fields rather than a parse failure.
async fn consulta(State(state): State<ConsultaRouteState>, body: Bytes) -> Response {
    let payload: ConsultationPayload = serde_json::from_slice(&body).unwrap_or_default();

    let intake = match check_request(&payload, state.today()) {
        Ok(intake) => intake,
        Err(rejection) => {
            tracing::info!(reason = %rejection.error, "Consultation refused");
            return rejection.into_response();
        }
    };

    let prompt = user_prompt(&intake);
    match state.generator.generate(SYSTEM_PROMPT, &prompt).await {
        Ok(text) => {
            tracing::info!(chars = text.chars().count(), "Consultation answered");
            Json(serde_json::json!({"mensagem": text})).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Reflection generation failed");
            error_reply(
                StatusCode::INTERNAL_SERVER_ERROR,
                GENERIC_FAILURE_MESSAGE,
                &e.to_string(),
            )
        }
    }
}

/// Build the consultation routes.
pub fn consulta_routes(state: ConsultaRouteState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/consulta", post(consulta))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use tower::ServiceExt;

    use super::*;
    use crate::error::GenerationError;

    struct StubGenerator {
        reply: Result<String, GenerationError>,
        prompts: Mutex<Vec<String>>,
    }

    impl StubGenerator {
        fn new(reply: Result<String, GenerationError>) -> Arc<Self> {
            Arc::new(Self {
                reply,
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl ReflectionGenerator for StubGenerator {
        async fn generate(&self, _system: &str, user: &str) -> Result<String, GenerationError> {
            self.prompts.lock().unwrap().push(user.to_string());
            self.reply.clone()
        }
    }

    fn app(generator: Arc<StubGenerator>) -> Router {
        consulta_routes(ConsultaRouteState {
            generator,
            today: NaiveDate::from_ymd_opt(2025, 6, 1),
        })
    }

    fn body(birth_date: &str) -> String {
        serde_json::json!({
            "tema": "Autoconhecimento",
            "desafio": "Deseja equilibrar mente, corpo e espírito",
            "objetivo": "Quer ouvir melhor a intuição",
            "perfil": {
                "nome": "Luna",
                "data_nascimento": birth_date,
                "genero": "Tratamento neutro (elu/delu)",
                "arquetipo": "Sonhador(e) sensível que segue a intuição",
                "emocao": "Se sente esperançose",
                "apoio_desejado": "Prefere passos práticos e diretos",
                "foco_pessoal": "Quer ouvir melhor a intuição"
            },
            "contato": {"email": "luna@example.com", "telefone": "11999990000"}
        })
        .to_string()
    }

    async fn post_consulta(app: Router, body: String) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(
                Request::post("/api/consulta")
                    .header("content-type", "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn answers_valid_request() {
        let generator = StubGenerator::new(Ok("Reflexão".into()));
        let (status, json) = post_consulta(app(generator.clone()), body("1995-03-10")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["mensagem"], "Reflexão");
        let prompts = generator.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Idade declarada: 30 anos."));
    }

    #[tokio::test]
    async fn null_optional_fields_are_accepted() {
        let mut json: serde_json::Value = serde_json::from_str(&body("1995-03-10")).unwrap();
        json["objetivo"] = serde_json::Value::Null;
        json["perfil"]["arquetipo"] = serde_json::Value::Null;
        json["perfil"]["foco_pessoal"] = serde_json::Value::Null;

        let generator = StubGenerator::new(Ok("Reflexão".into()));
        let (status, reply) = post_consulta(app(generator.clone()), json.to_string()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(reply["mensagem"], "Reflexão");
        let prompts = generator.prompts.lock().unwrap();
        assert!(prompts[0].contains("Arquétipo ou personalidade predominante: Não informado."));
        assert!(prompts[0].contains("Foco pessoal descrito: Não informado."));
    }

    #[tokio::test]
    async fn empty_body_lists_all_required_fields() {
        let generator = StubGenerator::new(Ok("x".into()));
        let (status, json) = post_consulta(app(generator.clone()), "not json".into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["erro"], "Dados incompletos.");
        assert_eq!(
            json["detalhes"],
            "Campos obrigatórios ausentes: nome, data_nascimento, genero, tema, desafio, email, telefone."
        );
        assert!(generator.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn refuses_underage() {
        let generator = StubGenerator::new(Ok("x".into()));
        let (status, json) = post_consulta(app(generator.clone()), body("2008-06-02")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["erro"], "Consulta não permitida.");
        assert!(generator.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn refuses_malformed_date() {
        let (status, json) = post_consulta(app(StubGenerator::new(Ok("x".into()))), body("1995-13-40")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["erro"], "Data de nascimento inválida.");
        assert_eq!(json["detalhes"], "Use o formato AAAA-MM-DD.");
    }

    #[tokio::test]
    async fn missing_key_is_server_error() {
        let generator = StubGenerator::new(Err(GenerationError::NotConfigured));
        let (status, json) = post_consulta(app(generator), body("1995-03-10")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["erro"], GENERIC_FAILURE_MESSAGE);
        assert_eq!(json["detalhes"], "OPENAI_API_KEY não configurada no ambiente.");
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let response = app(StubGenerator::new(Ok("x".into())))
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
