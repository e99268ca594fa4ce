//! Keyed storage of confirmed answers for one session.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Keys of the answer store: one per question plus the two contact fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AnswerKey {
    #[serde(rename = "genero")]
    Gender,
    #[serde(rename = "nome")]
    Name,
    #[serde(rename = "data_nascimento")]
    BirthDate,
    #[serde(rename = "persona")]
    Persona,
    #[serde(rename = "tema")]
    Topic,
    #[serde(rename = "desafio")]
    Challenge,
    #[serde(rename = "emocao")]
    Emotion,
    #[serde(rename = "apoio")]
    Support,
    #[serde(rename = "foco")]
    Focus,
    #[serde(rename = "contato_email")]
    ContactEmail,
    #[serde(rename = "contato_telefone")]
    ContactPhone,
}

impl AnswerKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gender => "genero",
            Self::Name => "nome",
            Self::BirthDate => "data_nascimento",
            Self::Persona => "persona",
            Self::Topic => "tema",
            Self::Challenge => "desafio",
            Self::Emotion => "emocao",
            Self::Support => "apoio",
            Self::Focus => "foco",
            Self::ContactEmail => "contato_email",
            Self::ContactPhone => "contato_telefone",
        }
    }
}

impl std::fmt::Display for AnswerKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A committed answer. `age` is only set for the birth date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
}

/// Ordered answer storage. Records are overwritten whole, never removed.
#[derive(Debug, Clone, Default)]
pub struct AnswerStore {
    records: BTreeMap<AnswerKey, AnswerRecord>,
}

impl AnswerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write (or overwrite) the record for `key`.
    pub fn set(&mut self, key: AnswerKey, value: impl Into<String>, age: Option<u32>) {
        self.records.insert(
            key,
            AnswerRecord {
                value: value.into(),
                age,
            },
        );
    }

    pub fn get(&self, key: AnswerKey) -> Option<&str> {
        self.records.get(&key).map(|r| r.value.as_str())
    }

    /// Value for `key`, or an empty string when absent.
    pub fn value_or_empty(&self, key: AnswerKey) -> String {
        self.get(key).unwrap_or_default().to_string()
    }

    pub fn record(&self, key: AnswerKey) -> Option<&AnswerRecord> {
        self.records.get(&key)
    }

    pub fn age(&self) -> Option<u32> {
        self.record(AnswerKey::BirthDate).and_then(|r| r.age)
    }

    pub fn contains(&self, key: AnswerKey) -> bool {
        self.records.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in key order.
    pub fn iter(&self) -> impl Iterator<Item = (AnswerKey, &AnswerRecord)> {
        self.records.iter().map(|(k, r)| (*k, r))
    }
}
