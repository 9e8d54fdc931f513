use axum::{
    Json, Router,
    extract::Extension,
    routing::{get, post},
};
use patent_search_service::config::ServiceConfig;
use patent_search_service::registry::handlers::{handle_get_task_status, handle_list_tasks};
use patent_search_service::registry::store::TaskRegistry;
use patent_search_service::search::handlers::handle_submit_search;
use patent_search_service::search::service::SearchService;
use patent_search_service::source::client::PortalClientFactory;
use std::net::SocketAddr;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args: Vec<String> = std::env::args().collect();

    let mut bind_addr: SocketAddr = "0.0.0.0:8000".parse()?;
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--bind" => {
                if i + 1 >= args.len() {
                    eprintln!("Usage: {} [--bind <addr:port>]", args[0]);
                    std::process::exit(1);
                }
                bind_addr = args[i + 1].parse()?;
                i += 2;
            }
            _ => {
                i += 1;
            }
        }
    }

    let config = Arc::new(ServiceConfig::from_env());

    tracing::info!("Portal base URL: {}", config.portal.base_url);
    tracing::info!("Default countries: {:?}", config.default_countries);
    if let Some(dir) = &config.results_dir {
        tracing::info!("Archiving results to {}", dir.display());
    }

    // 1. Task registry (the only state shared across task runs):
    let registry = TaskRegistry::new();

    // 2. Portal access and the search service:
    let sources = PortalClientFactory::new(Arc::new(config.portal.clone()));
    let service = SearchService::new(registry.clone(), sources, config.clone());

    // 3. HTTP Router:
    let app = Router::new()
        .route("/", get(handle_root))
        .route("/health", get(handle_health))
        .route("/search", post(handle_submit_search))
        .route("/status/:task_id", get(handle_get_task_status))
        .route("/tasks", get(handle_list_tasks))
        .layer(Extension(registry))
        .layer(Extension(service));

    tracing::info!("HTTP server listening on {}", bind_addr);
    tracing::info!("Press Ctrl+C to shutdown");

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn handle_root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Patent Search Service API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "POST /search": "Execute a patent search",
            "GET /status/{task_id}": "Get search task status",
            "GET /tasks": "List all tasks",
            "GET /health": "Health check"
        }
    }))
}

async fn handle_health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}
