mod advisor;
mod error;
mod llm;
mod routes;
mod services;
mod state;

use std::path::PathBuf;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::advisor::{AdvisorProfile, ConversationAdapter};
use crate::llm::LlmChat;
use crate::services::chat::ChatConfig;

#[tokio::main]
async fn main() {
    // A missing .env is normal in production.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("acl_advisor=info,tower_http=info")),
        )
        .init();

    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()
        .expect("invalid PORT");

    let profile = AdvisorProfile::from_env().expect("invalid advisor profile");

    // Non-fatal: without a key every reply degrades to the fallback text.
    let llm: Arc<dyn LlmChat> = match llm::LlmClient::from_env() {
        Ok(client) => {
            tracing::info!(model = client.model(), "LLM client initialized");
            Arc::new(client)
        }
        Err(e) => {
            tracing::warn!(error = %e, "LLM client not configured, chat replies will use fallback text");
            Arc::new(llm::UnconfiguredLlm::new(e.to_string()))
        }
    };

    tracing::info!(
        profile = profile.name,
        temperature = profile.temperature,
        images = profile.supports_image,
        grounding = profile.supports_grounding,
        "advisor profile loaded"
    );

    let state = state::AppState::new(ConversationAdapter::new(llm, profile), ChatConfig::from_env());

    // Spawn background idle-session reaper.
    let _reaper = services::chat::spawn_session_reaper(state.clone());

    let website_dir = std::env::var("WEBSITE_DIR").ok().map(PathBuf::from);
    if let Some(dir) = &website_dir {
        tracing::info!(dir = %dir.display(), "serving static site");
    }

    let app = routes::app(state, website_dir);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "acl-advisor listening");
    axum::serve(listener, app).await.expect("server failed");
}
