//! Terminal renderer for the consultation wizard.

use std::io::Write;
use std::pin::Pin;
use std::sync::Arc;

use futures::{Stream, StreamExt, stream};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;

use crate::wizard::{
    DisplayAction, ResultView, StepKind, SubmissionController, SubmitOutcome, WizardEvent,
};

/// Command that moves one step back.
pub const BACK_COMMAND: &str = "voltar";

pub type LineStream = Pin<Box<dyn Stream<Item = String> + Send>>;

/// Lines typed on stdin, ending at EOF.
pub fn stdin_lines() -> LineStream {
    let lines = BufReader::new(tokio::io::stdin()).lines();
    let stream = stream::unfold(lines, |mut lines| async move {
        match lines.next_line().await {
            Ok(Some(line)) => Some((line, lines)),
            Ok(None) => None,
            Err(e) => {
                tracing::error!("Error reading stdin: {}", e);
                None
            }
        }
    });
    Box::pin(stream)
}

/// Print status and error events until the engine goes away.
pub fn spawn_event_printer(mut rx: broadcast::Receiver<WizardEvent>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(WizardEvent::Status { text }) => eprintln!("ℹ️  {}", text),
                Ok(WizardEvent::Error { message }) => eprintln!("❌ {}", message),
                Ok(WizardEvent::SubmissionStarted) => eprintln!("⏳ Enviando..."),
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::debug!(skipped = n, "Event printer lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

/// What to do after a reflection was shown.
enum AfterResult {
    Restart,
    Exit,
}

/// Interactive wizard on a line source and a writer.
pub struct TerminalWizard<W> {
    controller: Arc<SubmissionController>,
    out: W,
}

impl<W: Write> TerminalWizard<W> {
    pub fn new(controller: Arc<SubmissionController>, out: W) -> Self {
        Self { controller, out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Run until the input ends or the user exits.
    pub async fn run(&mut self, lines: &mut LineStream) -> anyhow::Result<()> {
        loop {
            let kind = self.render_step().await?;
            match kind {
                StepKind::ContactPair => {
                    if !self.contact_step(lines).await? {
                        return Ok(());
                    }
                }
                _ => {
                    let Some(line) = self.prompt(lines, "> ").await? else {
                        return Ok(());
                    };
                    self.answer_step(&kind, line.trim()).await;
                }
            }
        }
    }

    async fn render_step(&mut self) -> anyhow::Result<StepKind> {
        let engine = self.controller.engine();
        let engine = engine.read().await;
        let def = engine.current_step_definition();
        let options = engine.current_options()?;
        let selected = engine.selected_value();

        writeln!(self.out)?;
        writeln!(self.out, "── {} ──", engine.progress_label())?;
        writeln!(self.out, "{}", engine.current_title())?;
        writeln!(self.out, "{}", engine.current_helper())?;
        for (i, option) in options.iter().enumerate() {
            let mark = if selected == Some(option.value.as_str()) { "*" } else { " " };
            writeln!(self.out, " {mark} {}) {}", i + 1, option.label)?;
        }
        match &def.kind {
            StepKind::FreeText { placeholder, .. } => {
                writeln!(self.out, "   {placeholder}")?;
            }
            StepKind::Date => {
                writeln!(self.out, "   AAAA-MM-DD, até {}", engine.date_input_max())?;
            }
            _ => {}
        }
        if engine.can_go_back() {
            writeln!(self.out, "   ('{BACK_COMMAND}' para o passo anterior)")?;
        }
        Ok(def.kind.clone())
    }

    async fn answer_step(&mut self, kind: &StepKind, input: &str) {
        let engine = self.controller.engine();
        let mut engine = engine.write().await;
        if input.eq_ignore_ascii_case(BACK_COMMAND) {
            engine.retreat();
            return;
        }

        let step = engine.current_step_definition().id;
        let value = match kind {
            StepKind::Choice { .. } => {
                let options = engine.current_options().unwrap_or_default();
                if input.is_empty() {
                    engine.selected_value().unwrap_or_default().to_string()
                } else {
                    input
                        .parse::<usize>()
                        .ok()
                        .and_then(|n| n.checked_sub(1))
                        .and_then(|i| options.get(i))
                        .map(|o| o.value.clone())
                        .unwrap_or_else(|| input.to_string())
                }
            }
            StepKind::Date => {
                let _ = writeln!(self.out, "{}", engine.preview_birth_date(input));
                input.to_string()
            }
            _ => input.to_string(),
        };
        // Errors reach the user through the event printer.
        let _ = engine.confirm_step(step, &value);
    }

    /// Returns `false` when the session should end.
    async fn contact_step(&mut self, lines: &mut LineStream) -> anyhow::Result<bool> {
        let Some(email) = self.prompt(lines, "Email: ").await? else {
            return Ok(false);
        };
        if email.trim().eq_ignore_ascii_case(BACK_COMMAND) {
            self.controller.engine().write().await.retreat();
            return Ok(true);
        }
        let Some(phone) = self.prompt(lines, "Telefone: ").await? else {
            return Ok(false);
        };

        match self.controller.submit(&email, &phone).await {
            SubmitOutcome::Succeeded(view) => {
                self.show_result(&view)?;
                match self.after_result(lines, &view).await? {
                    AfterResult::Restart => {
                        self.controller.engine().write().await.restart();
                        Ok(true)
                    }
                    AfterResult::Exit => Ok(false),
                }
            }
            SubmitOutcome::Failed(_) | SubmitOutcome::Rejected(_) | SubmitOutcome::Busy => Ok(true),
        }
    }

    fn show_result(&mut self, view: &ResultView) -> std::io::Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "{}", view.message)?;
        writeln!(self.out)?;
        Ok(())
    }

    async fn after_result(
        &mut self,
        lines: &mut LineStream,
        view: &ResultView,
    ) -> anyhow::Result<AfterResult> {
        loop {
            for (i, action) in view.actions.iter().enumerate() {
                let label = match action {
                    DisplayAction::Restart => "Refazer consulta",
                    DisplayAction::RequestFollowUp => "Falar com terapeuta humano",
                };
                writeln!(self.out, "  {}) {}", i + 1, label)?;
            }
            writeln!(self.out, "  {}) Sair", view.actions.len() + 1)?;

            let Some(line) = self.prompt(lines, "> ").await? else {
                return Ok(AfterResult::Exit);
            };
            let picked = line
                .trim()
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1));
            match picked.map(|i| view.actions.get(i)) {
                Some(Some(DisplayAction::Restart)) => return Ok(AfterResult::Restart),
                Some(Some(DisplayAction::RequestFollowUp)) => {
                    writeln!(self.out, "{}", view.follow_up_url)?;
                }
                Some(None) if picked == Some(view.actions.len()) => {
                    return Ok(AfterResult::Exit);
                }
                _ => writeln!(self.out, "Opção inválida.")?,
            }
        }
    }

    async fn prompt(&mut self, lines: &mut LineStream, label: &str) -> std::io::Result<Option<String>> {
        write!(self.out, "{label}")?;
        self.out.flush()?;
        Ok(lines.next().await)
    }
}
