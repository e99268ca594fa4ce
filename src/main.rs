use std::sync::Arc;

use tokio::sync::RwLock;

use tarot_consult::cli::{self, TerminalWizard};
use tarot_consult::config::{self, ServerConfig, WizardConfig};
use tarot_consult::server;
use tarot_consult::wizard::{HttpConsultationClient, SubmissionController, WizardEngine};

fn main() -> anyhow::Result<()> {
    for (key, value) in config::env_file_entries(&config::ENV_FILES)? {
        // SAFETY: single-threaded here; the runtime is built afterwards.
        unsafe { std::env::set_var(key, value) };
    }

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run())
}

async fn run() -> anyhow::Result<()> {
    let command = std::env::args().nth(1);
    let default_level = if command.as_deref() == Some("serve") { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match command.as_deref() {
        Some("serve") => {
            let config = ServerConfig::from_env()?;
            eprintln!("🔮 Tarot Consult v{}", env!("CARGO_PKG_VERSION"));
            eprintln!("   API: http://0.0.0.0:{}/api/consulta", config.port);
            eprintln!("   Model: {}", config.model);
            Ok(server::serve(&config).await?)
        }
        Some(other) => {
            eprintln!("Unknown command: {other}");
            eprintln!("Usage: tarot-consult [serve]");
            std::process::exit(2);
        }
        None => run_wizard().await,
    }
}

async fn run_wizard() -> anyhow::Result<()> {
    let config = WizardConfig::from_env()?;
    let client = Arc::new(HttpConsultationClient::from_config(&config));
    tracing::info!(endpoint = client.endpoint(), "Wizard started");

    let engine = WizardEngine::builtin();
    let printer = cli::spawn_event_printer(engine.subscribe());
    let controller = Arc::new(SubmissionController::new(
        Arc::new(RwLock::new(engine)),
        client,
        config,
    ));

    eprintln!("🔮 Consulta de Tarô. Digite '{}' para voltar.\n", cli::BACK_COMMAND);
    let mut lines = cli::stdin_lines();
    let mut wizard = TerminalWizard::new(controller, std::io::stdout());
    let result = wizard.run(&mut lines).await;
    printer.abort();
    result
}
