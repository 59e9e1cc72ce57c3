//! HTTP adapter - axum router, shared state and endpoint modules.
//!
//! - `session` - `GET /` bootstrap and `GET /health`
//! - `documents` - upload and lookup of PDFs
//! - `threads` - thread listing and stored history
//! - `conversation` - streaming `POST /query`

pub mod conversation;
pub mod cookies;
pub mod documents;
pub mod error;
pub mod middleware;
pub mod session;
pub mod threads;

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method, Request};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::application::handlers::{
    BootstrapSessionHandler, DocumentQueryHandler, SubmitQueryHandler, ThreadQueryHandler,
    UploadDocumentHandler, UploadLimits,
};
use crate::application::{ContextAssembler, ConversationEngine, EngineSettings};
use crate::config::ServerConfig;
use crate::ports::{
    AIProvider, DocumentRepository, FileStorage, HistoryStore, SessionIssuer, SessionValidator,
    TextExtractor, ThreadRepository, UserRepository,
};

pub use conversation::{THREAD_CREATED_HEADER, THREAD_ID_HEADER};
pub use cookies::{CookieSettings, AUTH_COOKIE};
pub use error::{ApiError, ErrorResponse};
pub use middleware::AuthState;

/// Port implementations the HTTP layer is wired against.
pub struct AppPorts {
    pub ai: Arc<dyn AIProvider>,
    pub users: Arc<dyn UserRepository>,
    pub threads: Arc<dyn ThreadRepository>,
    pub documents: Arc<dyn DocumentRepository>,
    pub history: Arc<dyn HistoryStore>,
    pub files: Arc<dyn FileStorage>,
    pub extractor: Arc<dyn TextExtractor>,
    pub validator: Arc<dyn SessionValidator>,
    pub issuer: Arc<dyn SessionIssuer>,
}

/// Tunables derived from configuration.
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub engine: EngineSettings,
    pub upload: UploadLimits,
    pub cookie: CookieSettings,
}

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<BootstrapSessionHandler>,
    pub query: Arc<SubmitQueryHandler>,
    pub upload: Arc<UploadDocumentHandler>,
    pub documents: Arc<DocumentQueryHandler>,
    pub threads: Arc<ThreadQueryHandler>,
    pub validator: AuthState,
    pub cookie: CookieSettings,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(ports: AppPorts, settings: AppSettings) -> Self {
        let context = ContextAssembler::new(
            ports.documents.clone(),
            ports.files.clone(),
            ports.extractor.clone(),
        );
        let engine = ConversationEngine::new(ports.ai, ports.history.clone(), settings.engine);

        Self {
            session: Arc::new(BootstrapSessionHandler::new(
                ports.users,
                ports.threads.clone(),
                ports.issuer,
            )),
            query: Arc::new(SubmitQueryHandler::new(
                ports.threads.clone(),
                context.clone(),
                engine,
            )),
            upload: Arc::new(UploadDocumentHandler::new(
                ports.documents.clone(),
                ports.files,
                ports.extractor,
                settings.upload,
            )),
            documents: Arc::new(DocumentQueryHandler::new(ports.documents, context)),
            threads: Arc::new(ThreadQueryHandler::new(ports.threads, ports.history)),
            validator: ports.validator,
            cookie: settings.cookie,
            max_upload_bytes: settings.upload.max_bytes,
        }
    }
}

/// Cross-cutting HTTP options.
#[derive(Debug, Clone)]
pub struct RouterOptions {
    /// Allowed browser origins. Empty mirrors the request origin.
    pub cors_origins: Vec<String>,
    /// Applies until response headers are sent, not to streamed bodies.
    pub request_timeout: Duration,
}

impl RouterOptions {
    pub fn from_config(server: &ServerConfig) -> Self {
        Self {
            cors_origins: server.cors_origins_list(),
            request_timeout: server.request_timeout(),
        }
    }
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            cors_origins: Vec::new(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Builds the full application router.
pub fn build_router(state: AppState, options: &RouterOptions) -> Router {
    let max_upload = state.max_upload_bytes;

    Router::new()
        .merge(session::session_routes())
        .merge(documents::document_routes(max_upload))
        .merge(threads::thread_routes())
        .merge(conversation::conversation_routes())
        .layer(axum::middleware::from_fn_with_state(
            state.validator.clone(),
            middleware::auth_middleware,
        ))
        .merge(session::health_routes())
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
                    let request_id = req
                        .headers()
                        .get("x-request-id")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default();
                    tracing::info_span!(
                        "http_request",
                        method = %req.method(),
                        uri = %req.uri(),
                        request_id,
                        user_id = tracing::field::Empty,
                    )
                }))
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(cors_layer(&options.cors_origins))
                .layer(TimeoutLayer::new(options.request_timeout)),
        )
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.is_empty() {
        AllowOrigin::mirror_request()
    } else {
        let parsed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|o| match HeaderValue::from_str(o) {
                Ok(v) => Some(v),
                Err(_) => {
                    tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(parsed)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, THREAD_ID_HEADER])
        .expose_headers([THREAD_ID_HEADER, THREAD_CREATED_HEADER])
        .allow_credentials(true)
}
