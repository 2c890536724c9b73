//! Wiring & DI. Entry point: bootstrap adapters, inject into services, run UI.
//! No business logic here; authentication is delegated to AuthService.

use dotenv::dotenv;
use std::path::PathBuf;
use std::sync::Arc;
use tg_dictate::adapters::delivery::DryRunGateway;
use tg_dictate::adapters::dictation::LineDictationSource;
use tg_dictate::adapters::grammar::gemini_adapter::GEMINI_DEFAULT_MODEL;
use tg_dictate::adapters::grammar::openai_adapter::{GROQ_API_URL, GROQ_DEFAULT_MODEL};
use tg_dictate::adapters::grammar::{
    BasicCorrector, FallbackCorrector, GeminiCorrector, OpenAiCorrector,
};
use tg_dictate::adapters::persistence::JsonContactDirectory;
use tg_dictate::adapters::telegram::{GrammersAuthAdapter, GrammersDeliveryGateway, session};
use tg_dictate::adapters::ui::tui::TuiInputPort;
use tg_dictate::ports::{
    AuthPort, ContactDirectory, DeliveryGateway, DictationSource, GrammarCorrector, InputPort,
};
use tg_dictate::shared::config::AppConfig;
use tg_dictate::usecases::{AuthService, MessageSession, SessionOptions};
use tokio::io::BufReader;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let env_loaded = dotenv();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match &env_loaded {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(_) => info!(cwd = %cwd.display(), "no .env found (check CWD)"),
    }

    tg_dictate::adapters::ui::init_ui();

    let cfg = match AppConfig::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!(error = %e, "config could not be read; using defaults");
            AppConfig::default()
        }
    };

    let data_dir = cfg.data_dir_or_default();
    tokio::fs::create_dir_all(&data_dir)
        .await
        .map_err(|e| anyhow::anyhow!("create data dir {}: {}", data_dir.display(), e))?;
    info!(path = %data_dir.display(), "data directory");

    let contacts = JsonContactDirectory::new(cfg.contacts_path_or_default());
    info!(path = %contacts.path().display(), "contacts file");
    let directory: Arc<dyn ContactDirectory> = Arc::new(contacts);
    let corrector = build_corrector(&cfg);
    info!(provider = corrector.provider(), "grammar correction chain");

    let dictation = open_dictation_source(&cfg).await?;

    // --- Delivery: Telegram (auth first) or dry run ---
    type Delivery = (Arc<dyn DeliveryGateway>, Option<Arc<dyn AuthPort>>);
    let (gateway, auth): Delivery = if cfg.dry_run_or_default() {
        warn!("dry run: messages are logged, not sent");
        (Arc::new(DryRunGateway::new()), None)
    } else {
        let api_hash = cfg.api_hash_or_default();
        if api_hash.is_empty() {
            anyhow::bail!(
                "Set TG_DICTATE_API_HASH (env or .env), or TG_DICTATE_DRY_RUN=true. Get it from https://my.telegram.org"
            );
        }
        let client = session::connect(cfg.api_id.unwrap_or(0), &cfg.session_path_or_default())
            .await
            .map_err(|e| anyhow::anyhow!("{}", e))?;
        let auth: Arc<dyn AuthPort> = Arc::new(GrammersAuthAdapter::new(client.clone()));
        let gateway: Arc<dyn DeliveryGateway> = Arc::new(GrammersDeliveryGateway::new(client));
        (gateway, Some(auth))
    };

    let session = Arc::new(MessageSession::new(
        Arc::clone(&directory),
        Arc::clone(&corrector),
        gateway,
        SessionOptions {
            strip_addressing: cfg.strip_addressing_or_default(),
            fuzzy_threshold: cfg.fuzzy_threshold_or_default(),
        },
    ));

    let tui = Arc::new(TuiInputPort::new(
        session,
        Arc::clone(&directory),
        Arc::clone(&corrector),
        dictation,
        auth.clone(),
    ));

    if let Some(auth) = auth {
        let auth_service = AuthService::new(auth, cfg.api_hash_or_default(), cfg.phone.clone());
        auth_service
            .run_auth_flow(tui.as_ref())
            .await
            .map_err(|e| anyhow::anyhow!("{}", e))?;
    }

    // --- Run (main menu -> Dictate / Type / Contacts / Status) ---
    let input_port: Arc<dyn InputPort> = tui;
    input_port
        .run()
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    info!("bye");
    Ok(())
}

/// Groq, then Gemini (whichever have keys), then the offline cleanup, which never fails.
fn build_corrector(cfg: &AppConfig) -> Arc<dyn GrammarCorrector> {
    let timeout = cfg.correction_timeout();
    let mut chain: Vec<Arc<dyn GrammarCorrector>> = Vec::new();

    if let Some(key) = cfg.groq_api_key() {
        let url = cfg.groq_api_url.clone().unwrap_or_else(|| GROQ_API_URL.to_string());
        let model = cfg
            .groq_model
            .clone()
            .unwrap_or_else(|| GROQ_DEFAULT_MODEL.to_string());
        info!(%url, %model, "groq correction enabled");
        chain.push(Arc::new(OpenAiCorrector::new(url, key, model, timeout)));
    }
    if let Some(key) = cfg.gemini_api_key() {
        let model = cfg
            .gemini_model
            .clone()
            .unwrap_or_else(|| GEMINI_DEFAULT_MODEL.to_string());
        info!(%model, "gemini correction enabled");
        chain.push(Arc::new(GeminiCorrector::new(key, model, timeout)));
    }
    if chain.is_empty() {
        warn!("no GROQ_API_KEY or GEMINI_API_KEY; using basic offline cleanup only");
    }
    chain.push(Arc::new(BasicCorrector::new()));

    Arc::new(FallbackCorrector::new(chain))
}

/// Transcript lines from `transcript_path` (file or FIFO) or stdin.
async fn open_dictation_source(cfg: &AppConfig) -> anyhow::Result<Box<dyn DictationSource>> {
    match cfg.transcript_path.as_deref() {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .map_err(|e| anyhow::anyhow!("open transcript {}: {}", path, e))?;
            info!(path, "dictation from transcript file");
            Ok(Box::new(LineDictationSource::new(BufReader::new(file))))
        }
        None => {
            info!("dictation from stdin");
            Ok(Box::new(LineDictationSource::new(BufReader::new(
                tokio::io::stdin(),
            ))))
        }
    }
}
