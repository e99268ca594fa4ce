//! Request body sent to the consultation service.

use serde::{Deserialize, Deserializer, Serialize};

use super::answers::{AnswerKey, AnswerStore};

/// Treat an explicit JSON `null` like an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Body of `POST /api/consulta`.
///
/// Field names on the wire are the service's Portuguese names. An absent or
/// `null` field becomes empty, so partial bodies still deserialize.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsultationPayload {
    #[serde(rename = "tema", deserialize_with = "null_as_default")]
    pub topic: String,
    #[serde(rename = "desafio", deserialize_with = "null_as_default")]
    pub challenge: String,
    #[serde(rename = "objetivo", deserialize_with = "null_as_default")]
    pub objective: String,
    #[serde(rename = "perfil", deserialize_with = "null_as_default")]
    pub profile: ProfilePayload,
    #[serde(rename = "contato", deserialize_with = "null_as_default")]
    pub contact: ContactPayload,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfilePayload {
    #[serde(rename = "nome", deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(rename = "data_nascimento", deserialize_with = "null_as_default")]
    pub birth_date: String,
    #[serde(rename = "genero", deserialize_with = "null_as_default")]
    pub gender: String,
    #[serde(rename = "arquetipo", deserialize_with = "null_as_default")]
    pub archetype: String,
    #[serde(rename = "emocao", deserialize_with = "null_as_default")]
    pub emotion: String,
    #[serde(rename = "apoio_desejado", deserialize_with = "null_as_default")]
    pub desired_support: String,
    #[serde(rename = "foco_pessoal", deserialize_with = "null_as_default")]
    pub personal_focus: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactPayload {
    #[serde(deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(rename = "telefone", deserialize_with = "null_as_default")]
    pub phone: String,
}

impl ConsultationPayload {
    /// Map the store onto the payload. Missing answers become empty strings;
    /// the derived age is not sent.
    pub fn build(store: &AnswerStore) -> Self {
        let value = |key| store.value_or_empty(key);
        Self {
            topic: value(AnswerKey::Topic),
            challenge: value(AnswerKey::Challenge),
            objective: value(AnswerKey::Focus),
            profile: ProfilePayload {
                name: value(AnswerKey::Name),
                birth_date: value(AnswerKey::BirthDate),
                gender: value(AnswerKey::Gender),
                archetype: value(AnswerKey::Persona),
                emotion: value(AnswerKey::Emotion),
                desired_support: value(AnswerKey::Support),
                personal_focus: value(AnswerKey::Focus),
            },
            contact: ContactPayload {
                email: value(AnswerKey::ContactEmail),
                phone: value(AnswerKey::ContactPhone),
            },
        }
    }
}
