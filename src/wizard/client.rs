//! Boundary to the consultation service.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::WizardConfig;
use crate::error::SubmissionError;

use super::payload::ConsultationPayload;

/// Successful reply: the generated reflection.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConsultationReply {
    #[serde(rename = "mensagem")]
    pub message: String,
}

/// Error body of a non-2xx reply.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    erro: Option<String>,
}

/// Sends one consultation request.
#[async_trait]
pub trait ConsultationClient: Send + Sync {
    async fn request(
        &self,
        payload: &ConsultationPayload,
    ) -> Result<ConsultationReply, SubmissionError>;
}

/// JSON-over-HTTP client for `POST /api/consulta`.
pub struct HttpConsultationClient {
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl HttpConsultationClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            timeout,
        }
    }

    pub fn from_config(config: &WizardConfig) -> Self {
        Self::new(config.endpoint.clone(), config.request_timeout)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ConsultationClient for HttpConsultationClient {
    async fn request(
        &self,
        payload: &ConsultationPayload,
    ) -> Result<ConsultationReply, SubmissionError> {
        let exchange = async {
            let response = self
                .client
                .post(&self.endpoint)
                .json(payload)
                .send()
                .await
                .map_err(|e| SubmissionError::Transport(e.to_string()))?;
            let status = response.status();
            let body = response
                .text()
                .await
                .map_err(|e| SubmissionError::Transport(e.to_string()))?;
            parse_reply(status.as_u16(), &body)
        };

        tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| SubmissionError::Timeout(self.timeout))?
    }
}

/// Interpret a service reply.
fn parse_reply(status: u16, body: &str) -> Result<ConsultationReply, SubmissionError> {
    if (200..300).contains(&status) {
        return serde_json::from_str::<ConsultationReply>(body)
            .map_err(|e| SubmissionError::InvalidResponse(e.to_string()));
    }
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.erro);
    tracing::warn!(status, has_message = message.is_some(), "Consultation request rejected");
    Err(SubmissionError::Remote { status, message })
}
