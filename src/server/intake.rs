//! Server-side checks on an incoming consultation request.
//!
//! The wizard validates locally, but the endpoint does not trust it: the
//! required fields and the age floor are checked again here.

use chrono::NaiveDate;

use crate::wizard::payload::ConsultationPayload;
use crate::wizard::validate::{self, MINIMUM_AGE};

/// Value used when an optional field is blank.
pub const NOT_INFORMED: &str = "Não informado";

/// A request that passed every check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Intake {
    /// Trimmed payload; `foco_pessoal` already has its fallback applied.
    pub payload: ConsultationPayload,
    pub birth_date: NaiveDate,
    pub age: i32,
}

/// Why a request was refused. Maps onto a 400 reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub error: String,
    pub details: String,
}

impl Rejection {
    fn new(error: &str, details: impl Into<String>) -> Self {
        Self {
            error: error.to_string(),
            details: details.into(),
        }
    }
}

fn trimmed(payload: &ConsultationPayload) -> ConsultationPayload {
    let t = |s: &String| s.trim().to_string();
    let mut out = payload.clone();
    out.topic = t(&payload.topic);
    out.challenge = t(&payload.challenge);
    out.objective = t(&payload.objective);
    out.profile.name = t(&payload.profile.name);
    out.profile.birth_date = t(&payload.profile.birth_date);
    out.profile.gender = t(&payload.profile.gender);
    out.profile.archetype = t(&payload.profile.archetype);
    out.profile.emotion = t(&payload.profile.emotion);
    out.profile.desired_support = t(&payload.profile.desired_support);
    out.profile.personal_focus = t(&payload.profile.personal_focus);
    out.contact.email = t(&payload.contact.email);
    out.contact.phone = t(&payload.contact.phone);
    out
}

/// Check required fields and age as of `today`.
pub fn check_request(payload: &ConsultationPayload, today: NaiveDate) -> Result<Intake, Rejection> {
    let mut payload = trimmed(payload);

    let required = [
        ("nome", &payload.profile.name),
        ("data_nascimento", &payload.profile.birth_date),
        ("genero", &payload.profile.gender),
        ("tema", &payload.topic),
        ("desafio", &payload.challenge),
        ("email", &payload.contact.email),
        ("telefone", &payload.contact.phone),
    ];
    let missing: Vec<&str> = required
        .iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(field, _)| *field)
        .collect();
    if !missing.is_empty() {
        return Err(Rejection::new(
            "Dados incompletos.",
            format!("Campos obrigatórios ausentes: {}.", missing.join(", ")),
        ));
    }

    let birth_date = validate::parse_birth_date(&payload.profile.birth_date).map_err(|_| {
        Rejection::new("Data de nascimento inválida.", "Use o formato AAAA-MM-DD.")
    })?;
    let age = validate::calculate_age(birth_date, today);
    if age < MINIMUM_AGE {
        return Err(Rejection::new(
            "Consulta não permitida.",
            "Somente maiores de 18 anos podem receber esta orientação.",
        ));
    }

    if payload.profile.personal_focus.is_empty() {
        payload.profile.personal_focus = if payload.objective.is_empty() {
            NOT_INFORMED.to_string()
        } else {
            payload.objective.clone()
        };
    }

    Ok(Intake {
        payload,
        birth_date,
        age,
    })
}
