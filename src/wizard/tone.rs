//! Grammatical tone resolution and tone-dependent option sets.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Grammatical-gender agreement used to pick wording variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Feminine,
    Masculine,
    #[default]
    Neutral,
}

impl std::fmt::Display for Tone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Feminine => "feminine",
            Self::Masculine => "masculine",
            Self::Neutral => "neutral",
        };
        write!(f, "{s}")
    }
}

/// Derive the tone from the raw answer of the treatment step.
///
/// Case-insensitive substring match; anything unrecognised (including an
/// empty answer) is neutral.
pub fn resolve_tone(raw: &str) -> Tone {
    let lower = raw.to_lowercase();
    if lower.contains("masculino") {
        Tone::Masculine
    } else if lower.contains("feminino") {
        Tone::Feminine
    } else {
        Tone::Neutral
    }
}

/// Title of the name step, which agrees with the resolved tone.
pub fn gendered_name_title(tone: Tone) -> &'static str {
    match tone {
        Tone::Masculine => "Como você quer ser chamado?",
        Tone::Feminine => "Como você quer ser chamada?",
        Tone::Neutral => "Como você quer ser chamade?",
    }
}

/// A selectable option: what the user sees and what gets stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceOption {
    pub label: String,
    pub value: String,
}

impl ChoiceOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// One option rendered three ways. All three renderings are mandatory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToneVariantGroup {
    pub feminine: ChoiceOption,
    pub masculine: ChoiceOption,
    pub neutral: ChoiceOption,
}

impl ToneVariantGroup {
    pub fn for_tone(&self, tone: Tone) -> &ChoiceOption {
        match tone {
            Tone::Feminine => &self.feminine,
            Tone::Masculine => &self.masculine,
            Tone::Neutral => &self.neutral,
        }
    }
}

/// Ordered variant groups for one gendered key.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ToneVariantSet {
    pub groups: Vec<ToneVariantGroup>,
}

impl ToneVariantSet {
    /// Project every group onto `tone`, preserving group order.
    pub fn resolve(&self, tone: Tone) -> Vec<ChoiceOption> {
        self.groups.iter().map(|g| g.for_tone(tone).clone()).collect()
    }
}

/// Keys of steps whose options depend on the tone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GenderedKey {
    Persona,
    Emotion,
}

impl GenderedKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Persona => "persona",
            Self::Emotion => "emocao",
        }
    }
}

/// Registry of variant sets by gendered key.
#[derive(Debug, Clone, Default)]
pub struct ToneCatalog {
    sets: HashMap<GenderedKey, ToneVariantSet>,
}

impl ToneCatalog {
    /// An empty catalog. Mostly useful for tests.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The catalog with the archetype and emotion variant sets.
    pub fn builtin() -> Self {
        let mut catalog = Self::empty();
        catalog.insert(GenderedKey::Persona, persona_variants());
        catalog.insert(GenderedKey::Emotion, emotion_variants());
        catalog
    }

    pub fn insert(&mut self, key: GenderedKey, set: ToneVariantSet) {
        self.sets.insert(key, set);
    }

    pub fn get(&self, key: GenderedKey) -> Option<&ToneVariantSet> {
        self.sets.get(&key)
    }

    /// Resolve the options of `key` for `tone`.
    pub fn resolve_variant_options(
        &self,
        key: GenderedKey,
        tone: Tone,
    ) -> Result<Vec<ChoiceOption>, ConfigError> {
        self.get(key)
            .map(|set| set.resolve(tone))
            .ok_or_else(|| ConfigError::MissingVariantSet {
                key: key.as_str().to_string(),
            })
    }
}

fn group(
    feminine: (&str, &str),
    masculine: (&str, &str),
    neutral: (&str, &str),
) -> ToneVariantGroup {
    ToneVariantGroup {
        feminine: ChoiceOption::new(feminine.0, feminine.1),
        masculine: ChoiceOption::new(masculine.0, masculine.1),
        neutral: ChoiceOption::new(neutral.0, neutral.1),
    }
}

fn persona_variants() -> ToneVariantSet {
    ToneVariantSet {
        groups: vec![
            group(
                ("Sonhadora sensível", "Sonhadora sensível que segue a intuição"),
                ("Sonhador sensível", "Sonhador sensível que segue a intuição"),
                ("Sonhador(e) sensível", "Sonhador(e) sensível que segue a intuição"),
            ),
            group(
                ("Estrategista prática", "Estrategista prática que prefere passos claros"),
                ("Estrategista prático", "Estrategista prático que prefere passos claros"),
                ("Estrategista práticx", "Estrategista práticx que prefere passos claros"),
            ),
            group(
                ("Curadora cuidadosa", "Curadora cuidadosa que acolhe e protege"),
                ("Curador cuidadoso", "Curador cuidadoso que acolhe e protege"),
                ("Curador(e) cuidadose", "Curador(e) cuidadose que acolhe e protege"),
            ),
            group(
                ("Exploradora ousada", "Exploradora ousada que busca novas experiências"),
                ("Explorador ousado", "Explorador ousado que busca novas experiências"),
                ("Explorador(e) ousade", "Explorador(e) ousade que busca novas experiências"),
            ),
        ],
    }
}

fn emotion_variants() -> ToneVariantSet {
    ToneVariantSet {
        groups: vec![
            group(
                ("Esperançosa", "Se sente esperançosa"),
                ("Esperançoso", "Se sente esperançoso"),
                ("Esperançose", "Se sente esperançose"),
            ),
            group(
                ("Apreensiva", "Se sente apreensiva"),
                ("Apreensivo", "Se sente apreensivo"),
                ("Apreensive", "Se sente apreensive"),
            ),
            group(
                ("Cansada", "Se sente cansada e sem energia"),
                ("Cansado", "Se sente cansado e sem energia"),
                ("Cansade", "Se sente cansade e sem energia"),
            ),
            group(
                ("Motivada", "Se sente motivada para agir"),
                ("Motivado", "Se sente motivado para agir"),
                ("Motivade", "Se sente motivade para agir"),
            ),
            group(
                ("Confusa", "Se sente confusa e indecisa"),
                ("Confuso", "Se sente confuso e indeciso"),
                ("Confuse", "Se sente confuse e indecise"),
            ),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_tone_case_insensitively() {
        assert_eq!(resolve_tone("Tratamento masculino (ele/dele)"), Tone::Masculine);
        assert_eq!(resolve_tone("TRATAMENTO FEMININO"), Tone::Feminine);
        assert_eq!(resolve_tone("prefiro MaScUlInO"), Tone::Masculine);
        assert_eq!(resolve_tone("feminino"), Tone::Feminine);
    }

    #[test]
    fn unknown_or_empty_tone_is_neutral() {
        assert_eq!(resolve_tone(""), Tone::Neutral);
        assert_eq!(resolve_tone("Tratamento neutro (elu/delu)"), Tone::Neutral);
        assert_eq!(resolve_tone("qualquer coisa"), Tone::Neutral);
    }

    #[test]
    fn name_title_agrees_with_tone() {
        assert!(gendered_name_title(Tone::Masculine).ends_with("chamado?"));
        assert!(gendered_name_title(Tone::Feminine).ends_with("chamada?"));
        assert!(gendered_name_title(Tone::Neutral).ends_with("chamade?"));
    }

    #[test]
    fn variant_options_one_per_group_in_order() {
        let catalog = ToneCatalog::builtin();
        for key in [GenderedKey::Persona, GenderedKey::Emotion] {
            let set = catalog.get(key).unwrap();
            for tone in [Tone::Feminine, Tone::Masculine, Tone::Neutral] {
                let options = catalog.resolve_variant_options(key, tone).unwrap();
                assert_eq!(options.len(), set.groups.len());
                for (option, group) in options.iter().zip(&set.groups) {
                    assert_eq!(option, group.for_tone(tone));
                }
            }
        }
    }

    #[test]
    fn emotion_variants_agree_with_tone() {
        let catalog = ToneCatalog::builtin();
        let neutral = catalog
            .resolve_variant_options(GenderedKey::Emotion, Tone::Neutral)
            .unwrap();
        assert_eq!(neutral[0].label, "Esperançose");
        let feminine = catalog
            .resolve_variant_options(GenderedKey::Emotion, Tone::Feminine)
            .unwrap();
        assert_eq!(feminine[4].value, "Se sente confusa e indecisa");
    }

    #[test]
    fn missing_variant_set_is_a_configuration_error() {
        let catalog = ToneCatalog::empty();
        let err = catalog
            .resolve_variant_options(GenderedKey::Persona, Tone::Neutral)
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::MissingVariantSet {
                key: "persona".to_string()
            }
        );
    }

    #[test]
    fn display_matches_serde() {
        for tone in [Tone::Feminine, Tone::Masculine, Tone::Neutral] {
            let json = serde_json::to_string(&tone).unwrap();
            assert_eq!(format!("\"{tone}\""), json);
        }
    }
}
