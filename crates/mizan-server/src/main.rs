mod logging;
mod routes;

use axum::{
    routing::{get, post},
    Router,
};
use mizan_core::{
    auth::{Authenticator, JwtAuthenticator},
    config::Config,
    db::Db,
};
use mizan_legal::{
    laws::seed_laws,
    ocr::{MockOcr, OcrProvider},
};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::broadcast;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use logging::{BroadcastLayer, DEFAULT_LOG_FILTER, LOG_RING_CAPACITY};
use routes::*;

// ── AppState ──────────────────────────────────────────────────────────────

pub struct AppState {
    pub db: Arc<Db>,
    pub config: Arc<Config>,
    pub auth: Arc<dyn Authenticator>,
    pub ocr: Arc<dyn OcrProvider>,
    pub start_time: Instant,
    pub log_tx: broadcast::Sender<String>,
    pub log_ring: Arc<std::sync::Mutex<VecDeque<String>>>,
}

// ── Router ────────────────────────────────────────────────────────────────

pub(crate) fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health
        .route("/api/health", get(health))
        // Assessments
        .route("/api/assessments", get(list_assessments))
        .route("/api/assessments/:id", get(get_assessment))
        // Law database
        .route("/api/laws/search", get(search_laws))
        // Admin
        .route("/api/audit", get(get_audit))
        .route("/api/settings", get(get_settings).put(put_settings))
        .route("/api/logs", get(sse_logs))
        // Serverless-style functions
        .route("/functions/v1/risk-assessment", post(risk_assessment))
        .route("/functions/v1/draft-document", post(draft_document))
        .route("/functions/v1/ocr", post(ocr))
        .route("/functions/v1/legal-advisor", post(legal_advisor))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ── main ──────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (log_tx, _) = broadcast::channel::<String>(256);
    let log_ring = Arc::new(std::sync::Mutex::new(VecDeque::with_capacity(
        LOG_RING_CAPACITY,
    )));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(BroadcastLayer {
            tx: log_tx.clone(),
            ring: Arc::clone(&log_ring),
        })
        .init();

    let config = Config::from_env()?;

    std::fs::create_dir_all(&config.data_dir)?;
    let mut db = Db::open(&config.db_path())?;
    db.migrate()?;
    if config.seed_laws {
        seed_laws(&db)?;
    }

    let auth: Arc<dyn Authenticator> = Arc::new(JwtAuthenticator::new(&config.jwt_secret));
    let ocr: Arc<dyn OcrProvider> =
        Arc::new(MockOcr::new(Duration::from_millis(config.ocr_delay_ms)));

    let addr = format!("{}:{}", config.web_bind, config.web_port);
    let state = Arc::new(AppState {
        db: Arc::new(db),
        config: Arc::new(config),
        auth,
        ocr,
        start_time: Instant::now(),
        log_tx,
        log_ring,
    });

    let app = router(state);

    info!("Listening on {addr}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
