//! Prompts sent to the text generator.

use super::intake::{Intake, NOT_INFORMED};

/// Fixed instructions for the reflection.
pub const SYSTEM_PROMPT: &str = "\
Você é uma terapeuta holística especializada em Tarologia simbólica. Você oferece acolhimento, \
metáforas e reflexões profundas, sempre deixando claro que não fornece previsões absolutas, \
diagnósticos nem conselhos legais. Sua linguagem é empática, humana e em português do Brasil. \
Incentive o autocuidado e evite gerar dependência emocional.

Regras obrigatórias:
- Conteúdo apenas para reflexão e entretenimento.
- Não substitua terapia, medicina ou aconselhamento jurídico.
- Utilize o tarô como metáfora simbólica e inspiradora.
- Mantenha tom acolhedor, esperançoso e realista.
- Nunca prometa certezas ou resultados garantidos.

Formato fixo da resposta:
1. Abertura acolhedora com 1 a 2 frases.
2. Tiragem simbólica de 3 cartas. Para cada carta informar: nome, significado simbólico e conexão com o caso do usuário.
3. Três perguntas de reflexão numeradas.
4. Duas ações práticas simples para os próximos 7 dias.
5. Encerramento curto com o lembrete: \"Use isso como reflexão, não como certeza.\"
";

fn or_default<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() { fallback } else { value }
}

/// Per-request prompt describing the person and their question.
///
/// Contact details are included only so the model knows a private reply
/// channel exists; it is told not to repeat them.
pub fn user_prompt(intake: &Intake) -> String {
    let p = &intake.payload;
    let profile = &p.profile;
    let lines = [
        format!("Nome preferido da pessoa: {}.", or_default(&profile.name, "Visitante")),
        format!("Idade declarada: {} anos.", intake.age),
        format!(
            "Data de nascimento: {}.",
            intake.birth_date.format(crate::wizard::validate::DATE_FORMAT)
        ),
        format!(
            "Modo de tratamento de gênero preferido: {}.",
            or_default(&profile.gender, NOT_INFORMED)
        ),
        format!(
            "Arquétipo ou personalidade predominante: {}.",
            or_default(&profile.archetype, NOT_INFORMED)
        ),
        format!("Estado emocional atual: {}.", or_default(&profile.emotion, NOT_INFORMED)),
        format!(
            "Tipo de apoio esperado na leitura: {}.",
            or_default(&profile.desired_support, NOT_INFORMED)
        ),
        format!(
            "Foco pessoal descrito: {}.",
            or_default(&profile.personal_focus, NOT_INFORMED)
        ),
        format!(
            "Tema escolhido para a consulta: {}.",
            or_default(&p.topic, "Tema não informado")
        ),
        format!(
            "Dificuldade principal relatada: {}.",
            or_default(&p.challenge, "Desafio não informado")
        ),
        format!(
            "Objetivo para os próximos dias: {}.",
            or_default(&p.objective, "Objetivo não informado")
        ),
        format!(
            "Contato fornecido (não mencione o email ou telefone na resposta, apenas considere que \
             o retorno será enviado de forma privada). Email registrado: {}. Telefone registrado: {}.",
            or_default(&p.contact.email, NOT_INFORMED),
            or_default(&p.contact.phone, NOT_INFORMED)
        ),
        "Produza a resposta seguindo estritamente o formato combinado.".to_string(),
    ];
    lines.join("\n")
}
