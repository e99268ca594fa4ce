//! Step definitions for the fixed questionnaire.

use serde::{Deserialize, Serialize};

use super::answers::AnswerKey;
use super::tone::{ChoiceOption, GenderedKey, Tone, gendered_name_title};

/// Stable step identifiers, in questionnaire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StepId {
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
    #[serde(rename = "contato")]
    Contact,
}

impl StepId {
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
            Self::Contact => "contato",
        }
    }

    /// Store key written when this step is confirmed. The contact step has
    /// none: its two fields are committed by the submission guard.
    pub fn answer_key(&self) -> Option<AnswerKey> {
        match self {
            Self::Gender => Some(AnswerKey::Gender),
            Self::Name => Some(AnswerKey::Name),
            Self::BirthDate => Some(AnswerKey::BirthDate),
            Self::Persona => Some(AnswerKey::Persona),
            Self::Topic => Some(AnswerKey::Topic),
            Self::Challenge => Some(AnswerKey::Challenge),
            Self::Emotion => Some(AnswerKey::Emotion),
            Self::Support => Some(AnswerKey::Support),
            Self::Focus => Some(AnswerKey::Focus),
            Self::Contact => None,
        }
    }
}

impl std::fmt::Display for StepId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a choice step gets its options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionSource {
    Static(Vec<ChoiceOption>),
    Gendered(GenderedKey),
}

/// What kind of input a step collects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepKind {
    Choice { options: OptionSource },
    FreeText {
        placeholder: &'static str,
        next_label: &'static str,
    },
    Date,
    ContactPair,
}

/// Step title: fixed, or agreeing with the resolved tone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Title {
    Static(&'static str),
    ToneAgreed,
}

/// One screen of the wizard. Immutable for the process lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepDefinition {
    pub id: StepId,
    pub kind: StepKind,
    pub title: Title,
    pub helper: &'static str,
    pub status_text: &'static str,
}

impl StepDefinition {
    /// Title rendered for `tone`.
    pub fn title_for(&self, tone: Tone) -> String {
        match self.title {
            Title::Static(title) => title.to_string(),
            Title::ToneAgreed => gendered_name_title(tone).to_string(),
        }
    }

    pub fn gendered_key(&self) -> Option<GenderedKey> {
        match &self.kind {
            StepKind::Choice {
                options: OptionSource::Gendered(key),
            } => Some(*key),
            _ => None,
        }
    }
}

fn options(pairs: &[(&str, &str)]) -> OptionSource {
    OptionSource::Static(
        pairs
            .iter()
            .map(|(label, value)| ChoiceOption::new(*label, *value))
            .collect(),
    )
}

/// The questionnaire in order. The contact step is terminal.
pub fn builtin_steps() -> Vec<StepDefinition> {
    vec![
        StepDefinition {
            id: StepId::Gender,
            kind: StepKind::Choice {
                options: options(&[
                    ("Feminino (ela/dela)", "Tratamento feminino (ela/dela)"),
                    ("Masculino (ele/dele)", "Tratamento masculino (ele/dele)"),
                    ("Neutro (elu/delu)", "Tratamento neutro (elu/delu)"),
                ]),
            },
            title: Title::Static("Como devemos tratar você?"),
            helper: "Escolha o tratamento que mais respeita sua identidade ao longo da consulta.",
            status_text: "Ajustando a linguagem da consulta.",
        },
        StepDefinition {
            id: StepId::Name,
            kind: StepKind::FreeText {
                placeholder: "Ex: Luna, Ana, João",
                next_label: "Continuar",
            },
            title: Title::ToneAgreed,
            helper: "Pode ser seu nome ou apelido preferido.",
            status_text: "Estamos te conhecendo.",
        },
        StepDefinition {
            id: StepId::BirthDate,
            kind: StepKind::Date,
            title: Title::Static("Qual é sua data de nascimento?"),
            helper: "Precisamos confirmar para adaptar o tom da orientação.",
            status_text: "Confirmando sua etapa de vida.",
        },
        StepDefinition {
            id: StepId::Persona,
            kind: StepKind::Choice {
                options: OptionSource::Gendered(GenderedKey::Persona),
            },
            title: Title::Static("Qual energia descreve melhor você hoje?"),
            helper: "Escolha o arquétipo com o qual você mais se identifica neste momento.",
            status_text: "Configurando o perfil simbólico.",
        },
        StepDefinition {
            id: StepId::Topic,
            kind: StepKind::Choice {
                options: options(&[
                    ("Amor e relacionamentos", "Amor e relacionamentos"),
                    ("Carreira e propósito", "Carreira e propósito"),
                    ("Prosperidade e recursos", "Prosperidade e recursos"),
                    ("Autoconhecimento", "Autoconhecimento"),
                    ("Família e laços", "Família e laços"),
                    ("Espiritualidade", "Espiritualidade"),
                ]),
            },
            title: Title::Static("Qual tema deseja explorar?"),
            helper: "Escolha a área principal da sua consulta.",
            status_text: "Selecionando o tema central.",
        },
        StepDefinition {
            id: StepId::Challenge,
            kind: StepKind::Choice {
                options: options(&[
                    (
                        "Entender sinais em um relacionamento",
                        "Busca entender os sinais em um relacionamento",
                    ),
                    (
                        "Tomar decisões na carreira",
                        "Precisa clareza para tomar decisões profissionais",
                    ),
                    (
                        "Reorganizar energias internas",
                        "Deseja equilibrar mente, corpo e espírito",
                    ),
                    (
                        "Superar medos financeiros",
                        "Quer superar medos financeiros e destravar prosperidade",
                    ),
                    (
                        "Curar vínculos familiares",
                        "Procura curar vínculos e conversas em família",
                    ),
                    (
                        "Fortalecer a fé e intuição",
                        "Busca fortalecer a fé e a intuição",
                    ),
                ]),
            },
            title: Title::Static("Qual descrição combina com o desafio atual?"),
            helper: "Vamos personalizar a tiragem com base nesta escolha.",
            status_text: "Entendendo a dificuldade principal.",
        },
        StepDefinition {
            id: StepId::Emotion,
            kind: StepKind::Choice {
                options: OptionSource::Gendered(GenderedKey::Emotion),
            },
            title: Title::Static("Como você tem se sentido nos últimos dias?"),
            helper: "Isso ajuda a IA a ajustar o tom da resposta.",
            status_text: "Registrando o clima emocional.",
        },
        StepDefinition {
            id: StepId::Support,
            kind: StepKind::Choice {
                options: options(&[
                    ("Reflexões suaves", "Prefere reflexões suaves e acolhedoras"),
                    ("Passos práticos", "Prefere passos práticos e diretos"),
                    ("Simbolismo profundo", "Prefere simbolismo profundo e meditativo"),
                    ("Motivação inspiradora", "Prefere mensagens motivadoras"),
                ]),
            },
            title: Title::Static("Que tipo de apoio você prefere receber?"),
            helper: "Escolha o estilo de reflexão que mais combina com você.",
            status_text: "Ajustando o estilo da resposta.",
        },
        StepDefinition {
            id: StepId::Focus,
            kind: StepKind::Choice {
                options: options(&[
                    (
                        "Cuidar de mim com carinho",
                        "Quer focar em autocuidado e limites saudáveis",
                    ),
                    (
                        "Avançar com coragem",
                        "Quer avançar com coragem em decisões importantes",
                    ),
                    ("Ouvir minha intuição", "Quer ouvir melhor a intuição"),
                    ("Construir diálogos honestos", "Quer construir diálogos honestos"),
                    (
                        "Atrair prosperidade consciente",
                        "Quer atrair prosperidade consciente",
                    ),
                ]),
            },
            title: Title::Static("Em que foco deseja atuar nos próximos 7 dias?"),
            helper: "Defina o direcionamento da orientação.",
            status_text: "Definindo o foco futuro.",
        },
        StepDefinition {
            id: StepId::Contact,
            kind: StepKind::ContactPair,
            title: Title::Static("Onde devemos enviar a resposta?"),
            helper: "Informe email e telefone. Mostraremos a reflexão aqui e você poderá encaminhar como preferir.",
            status_text: "Preparando o envio seguro.",
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_order_and_terminal_step() {
        let steps = builtin_steps();
        let ids: Vec<StepId> = steps.iter().map(|s| s.id).collect();
        assert_eq!(
            ids,
            vec![
                StepId::Gender,
                StepId::Name,
                StepId::BirthDate,
                StepId::Persona,
                StepId::Topic,
                StepId::Challenge,
                StepId::Emotion,
                StepId::Support,
                StepId::Focus,
                StepId::Contact,
            ]
        );
        assert_eq!(steps.last().unwrap().kind, StepKind::ContactPair);
    }

    #[test]
    fn every_non_terminal_step_has_a_distinct_key() {
        let steps = builtin_steps();
        let mut keys: Vec<AnswerKey> = steps.iter().filter_map(|s| s.id.answer_key()).collect();
        assert_eq!(keys.len(), steps.len() - 1);
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), steps.len() - 1);
    }

    #[test]
    fn only_name_title_depends_on_tone() {
        for step in builtin_steps() {
            let feminine = step.title_for(Tone::Feminine);
            let masculine = step.title_for(Tone::Masculine);
            if step.id == StepId::Name {
                assert_ne!(feminine, masculine);
            } else {
                assert_eq!(feminine, masculine);
            }
        }
    }

    #[test]
    fn gendered_keys() {
        let gendered: Vec<(StepId, GenderedKey)> = builtin_steps()
            .iter()
            .filter_map(|s| s.gendered_key().map(|k| (s.id, k)))
            .collect();
        assert_eq!(
            gendered,
            vec![
                (StepId::Persona, GenderedKey::Persona),
                (StepId::Emotion, GenderedKey::Emotion),
            ]
        );
    }

    #[test]
    fn step_id_display_matches_serde() {
        for step in builtin_steps() {
            let json = serde_json::to_string(&step.id).unwrap();
            assert_eq!(format!("\"{}\"", step.id), json);
        }
    }
}
