//! Consultation service: validates a wizard payload and returns a reflection.

pub mod generator;
pub mod intake;
pub mod prompts;
pub mod routes;

use std::sync::Arc;

pub use generator::{OpenAiGenerator, ReflectionGenerator, extract_text};
pub use intake::{Intake, Rejection, check_request};
pub use routes::{ConsultaRouteState, consulta_routes};

use crate::config::ServerConfig;

/// Bind on all interfaces and serve until the listener fails.
pub async fn serve(config: &ServerConfig) -> std::io::Result<()> {
    if config.api_key.is_none() {
        tracing::warn!("OPENAI_API_KEY not set; consultations will fail with 500");
    }
    let generator: Arc<dyn ReflectionGenerator> = Arc::new(OpenAiGenerator::from_config(config));
    let app = consulta_routes(ConsultaRouteState::new(generator));

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    tracing::info!(port = config.port, model = %config.model, "Consultation server started");
    axum::serve(listener, app).await?;
    Ok(())
}
