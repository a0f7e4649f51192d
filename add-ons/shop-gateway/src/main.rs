//! Axum-based shop assistant gateway. Config-driven via CoreConfig.

mod handlers;

use axum::extract::{Path, State};
use axum::http::{HeaderValue, Method, StatusCode};
use axum::routing::{get, post};
use axum::Router;
use shop_core::{CoreConfig, KbCategory, KnowledgeBase, Responder};
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use handlers::chat::{chat, handle_panic};

/// Loads the configured fact set (built-in when `knowledge_path` is unset).
fn load_knowledge(config: &CoreConfig) -> Result<KnowledgeBase, String> {
    KnowledgeBase::load_or_builtin(config.knowledge_path.as_deref())
        .map_err(|e| format!("Knowledge base rejected: {}", e))
}

/// Per-category key counts, e.g. `products: 4, policies: 3, contact: 3`.
fn knowledge_summary(kb: &KnowledgeBase) -> String {
    KbCategory::all()
        .iter()
        .map(|c| format!("{}: {}", c.label(), kb.keys(*c).len()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Pre-flight check: config loads, knowledge base validates, port is available.
fn run_verify() -> Result<(), String> {
    print!("Loading config... ");
    let config = CoreConfig::load().map_err(|e| format!("Config load failed: {}", e))?;
    println!("OK ({})", config.app_name);

    print!("Loading knowledge base... ");
    let kb = load_knowledge(&config)?;
    let source = config.knowledge_path.as_deref().unwrap_or("built-in facts");
    println!("OK ({} from {})", knowledge_summary(&kb), source);

    let addr = config.bind_addr();
    print!("Checking {}... ", addr);
    match std::net::TcpListener::bind(&addr) {
        Ok(listener) => {
            drop(listener);
            println!("OK (available)");
        }
        Err(e) => {
            return Err(format!("{} BLOCKED: {}", addr, e));
        }
    }

    println!("\nSUCCESS: Ready to start gateway.");
    Ok(())
}

#[tokio::main]
async fn main() {
    // Load .env file if present (before any env::var calls)
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("[shop-gateway] .env not loaded: {} (using system environment)", e);
    }

    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|a| a == "--verify") {
        match run_verify() {
            Ok(()) => std::process::exit(0),
            Err(e) => {
                eprintln!("PRE-FLIGHT FAILED: {}", e);
                std::process::exit(1);
            }
        }
    }

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match CoreConfig::load() {
        Ok(c) => Arc::new(c),
        Err(e) => {
            tracing::error!(target: "shop::gateway", error = %e, "Failed to load config");
            std::process::exit(1);
        }
    };

    let knowledge = match load_knowledge(&config) {
        Ok(kb) => Arc::new(kb),
        Err(e) => {
            tracing::error!(target: "shop::gateway", error = %e, "Failed to load knowledge base");
            std::process::exit(1);
        }
    };
    tracing::info!(
        target: "shop::gateway",
        summary = %knowledge_summary(&knowledge),
        source = config.knowledge_path.as_deref().unwrap_or("built-in"),
        "Knowledge base ready"
    );

    let app = build_app(AppState {
        config: Arc::clone(&config),
        responder: Arc::new(Responder::new(knowledge)),
    });

    let addr = config.bind_addr();
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!(target: "shop::gateway", addr = %addr, error = %e, "Failed to bind");
            std::process::exit(1);
        }
    };
    tracing::info!(target: "shop::gateway", "{} listening on {}", config.app_name, addr);
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(target: "shop::gateway", error = %e, "Server error");
        std::process::exit(1);
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(target: "shop::gateway", error = %e, "Ctrl-C handler unavailable");
        std::future::pending::<()>().await;
    }
    tracing::info!(target: "shop::gateway", "Shutdown signal received");
}

fn frontend_root_dir() -> std::path::PathBuf {
    // Prefer the working directory (run from workspace root); fall back to the manifest-relative path.
    let cwd = std::env::current_dir().unwrap_or_else(|_| std::path::PathBuf::from("."));
    let from_cwd = cwd.join("shop-frontend");
    if from_cwd.exists() {
        return from_cwd;
    }

    std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("shop-frontend")
}

fn cors_layer(config: &CoreConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);
    if config.cors_allow_any() {
        return cors.allow_origin(Any);
    }
    cors.allow_origin(AllowOrigin::list(allowed_origins(config)))
}

/// Configured origins as header values; entries that are not valid header values are skipped.
fn allowed_origins(config: &CoreConfig) -> Vec<HeaderValue> {
    config
        .cors_origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(target: "shop::gateway", origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect()
}

fn build_app(state: AppState) -> Router {
    let frontend_enabled = state.config.frontend_enabled;
    let cors = cors_layer(&state.config);

    let mut app = Router::new()
        .route("/chat", post(chat))
        .route("/api/v1/chat", post(chat))
        .route("/api/v1/health", get(health))
        .route("/v1/status", get(status))
        .route("/api/v1/knowledge", get(knowledge))
        .route("/api/v1/knowledge/:category/:key", get(knowledge_entry))
        .with_state(state);

    if frontend_enabled {
        let frontend_dir = frontend_root_dir();
        // Map `/` -> `shop-frontend/index.html`, `/ui/*` -> `shop-frontend/*`
        app = app
            .route_service("/", ServeFile::new(frontend_dir.join("index.html")))
            .nest_service("/ui", ServeDir::new(frontend_dir));
    }

    app.layer(CatchPanicLayer::custom(handle_panic)).layer(cors)
}

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) config: Arc<CoreConfig>,
    pub(crate) responder: Arc<Responder>,
}

/// GET /api/v1/health – liveness check for UI and scripts.
async fn health() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({ "status": "ok" }))
}

/// GET /v1/status – app identity and knowledge summary.
async fn status(State(state): State<AppState>) -> axum::Json<serde_json::Value> {
    let kb = state.responder.knowledge();
    let rules: Vec<&str> = state.responder.rules().iter().map(|r| r.intent.as_str()).collect();
    axum::Json(serde_json::json!({
        "app_name": state.config.app_name,
        "port": state.config.port,
        "products": kb.keys(KbCategory::Products),
        "rules": rules,
    }))
}

/// GET /api/v1/knowledge – the read-only fact table.
async fn knowledge(State(state): State<AppState>) -> axum::Json<KnowledgeBase> {
    axum::Json(state.responder.knowledge().clone())
}

/// GET /api/v1/knowledge/:category/:key – single fact lookup.
async fn knowledge_entry(
    State(state): State<AppState>,
    Path((category, key)): Path<(String, String)>,
) -> Result<axum::Json<serde_json::Value>, StatusCode> {
    let category = KbCategory::from_name(&category).ok_or(StatusCode::NOT_FOUND)?;
    let value = state
        .responder
        .knowledge()
        .query(category, &key)
        .ok_or(StatusCode::NOT_FOUND)?;
    Ok(axum::Json(serde_json::json!({
        "category": category.label(),
        "key": key,
        "value": value,
    })))
}
