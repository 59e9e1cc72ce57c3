//! PDF Chat server binary.

use std::sync::Arc;

use secrecy::ExposeSecret;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use pdf_chat::adapters::ai::{MockAIProvider, OpenAIConfig, OpenAIProvider};
use pdf_chat::adapters::auth::JwtSessionTokens;
use pdf_chat::adapters::http::{
    build_router, AppPorts, AppSettings, AppState, CookieSettings, RouterOptions,
};
use pdf_chat::adapters::pdf::PdfTextExtractor;
use pdf_chat::adapters::sqlite::{
    connect, SqliteDocumentRepository, SqliteHistoryStore, SqliteThreadRepository,
    SqliteUserRepository,
};
use pdf_chat::adapters::storage::LocalFileStorage;
use pdf_chat::application::handlers::UploadLimits;
use pdf_chat::application::EngineSettings;
use pdf_chat::config::{AiProviderKind, AppConfig};
use pdf_chat::ports::AIProvider;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config);
    config.validate()?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = ?config.server.environment,
        "Starting PDF Chat server"
    );

    let pool = connect(&config.database).await?;
    tracing::info!(url = %config.database.url, "Database ready");

    let files = LocalFileStorage::new(&config.storage.upload_dir);
    files.ensure_dir().await?;

    let ai: Arc<dyn AIProvider> = match config.ai.provider {
        AiProviderKind::OpenAI => {
            Arc::new(OpenAIProvider::new(OpenAIConfig::from_app_config(&config.ai)?)?)
        }
        AiProviderKind::Mock => {
            tracing::warn!("Using mock AI provider");
            Arc::new(MockAIProvider::new())
        }
    };
    let info = ai.provider_info();
    tracing::info!(provider = %info.name, model = %info.model, "AI provider ready");

    let tokens = Arc::new(JwtSessionTokens::new(
        config.auth.session_secret.expose_secret(),
        config.auth.token_ttl(),
    ));

    let ports = AppPorts {
        ai,
        users: Arc::new(SqliteUserRepository::new(pool.clone())),
        threads: Arc::new(SqliteThreadRepository::new(pool.clone())),
        documents: Arc::new(SqliteDocumentRepository::new(pool.clone())),
        history: Arc::new(SqliteHistoryStore::new(pool.clone())),
        files: Arc::new(files),
        extractor: Arc::new(PdfTextExtractor::new()),
        validator: tokens.clone(),
        issuer: tokens,
    };
    let settings = AppSettings {
        engine: EngineSettings::from_config(&config.conversation, &config.ai),
        upload: UploadLimits {
            max_bytes: config.storage.max_upload_bytes,
            preview_chars: config.storage.preview_chars,
        },
        cookie: CookieSettings {
            secure: config.auth.cookie_secure,
            max_age_secs: config.auth.token_ttl().as_secs(),
        },
    };

    let app = build_router(
        AppState::new(ports, settings),
        &RouterOptions::from_config(&config.server),
    );

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "PDF Chat server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    tracing::info!("Server shutdown complete");
    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},tower_http=info", config.server.log_level)));

    let registry = tracing_subscriber::registry().with(filter);
    if config.is_production() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
