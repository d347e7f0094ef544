mod db;
mod error;
mod llm;
mod routes;
mod services;
mod state;

use std::sync::Arc;

use services::auth::AdminConfig;
use services::chat_store::PgChatSessionStore;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()
        .expect("invalid PORT");

    let pool = db::init_pool(&database_url)
        .await
        .expect("database init failed");

    // A missing key is non-fatal: the proxy answers 500 and chat answers 503.
    let llm: Option<Arc<dyn llm::LlmChat>> = match llm::LlmClient::from_env().expect("invalid LLM configuration") {
        Some(client) => {
            tracing::info!(model = client.model(), "LLM client initialized");
            Some(Arc::new(client))
        }
        None => {
            tracing::warn!("GEMINI_API_KEY not configured; AI insights disabled");
            None
        }
    };

    let admins = AdminConfig::from_env();
    tracing::info!(admins = admins.admin_count(), "admin list loaded");

    let sessions = Arc::new(PgChatSessionStore::new(pool.clone()));
    let state = state::AppState::new(pool, llm, sessions, admins);

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "interviewkit listening");
    axum::serve(listener, app).await.expect("server failed");
}
