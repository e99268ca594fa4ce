//! Error types for the consultation wizard.

use std::time::Duration;

/// Fallback shown when the remote service fails without an explanation.
pub const GENERIC_FAILURE_MESSAGE: &str = "Não foi possível gerar a resposta.";

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Submission error: {0}")]
    Submission(#[from] SubmissionError),

    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),
}

/// Local, recoverable input errors.
///
/// The display strings are the messages shown inline at the current step.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Informe ao menos duas letras.")]
    TooShort,

    #[error("Informe sua data de nascimento.")]
    BirthDateRequired,

    #[error("Data inválida.")]
    InvalidDate,

    #[error("Consulta destinada apenas a maiores de 18 anos.")]
    Underage { age: i32 },

    #[error("Informe um email válido.")]
    InvalidEmail,

    #[error("Informe um telefone válido com DDD.")]
    InvalidPhone,

    #[error("Escolha uma das opções disponíveis.")]
    UnknownOption,

    #[error("Etapa fora de ordem: esperado {expected}, recebido {received}.")]
    StepMismatch { expected: String, received: String },

    #[error("Use o botão de envio para concluir esta etapa.")]
    SubmitRequired,
}

/// Configuration errors. `MissingVariantSet` is a programmer error and is
/// unreachable with the built-in catalog.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("No tone variant set registered for gendered key {key}")]
    MissingVariantSet { key: String },

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Failures talking to the consultation service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmissionError {
    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Service responded {status}: {}", .message.as_deref().unwrap_or(GENERIC_FAILURE_MESSAGE))]
    Remote { status: u16, message: Option<String> },

    #[error("Invalid response from service: {0}")]
    InvalidResponse(String),
}

impl SubmissionError {
    /// Message surfaced to the user: the server-supplied error when there is
    /// one, the generic fallback otherwise.
    pub fn user_message(&self) -> String {
        match self {
            Self::Remote {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            _ => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }
}

/// Server-side text generation errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    #[error("OPENAI_API_KEY não configurada no ambiente.")]
    NotConfigured,

    #[error("Provider {provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("Resposta vazia do modelo.")]
    EmptyResponse,
}

/// Result type alias for the crate.
pub type Result<T> = std::result::Result<T, Error>;
