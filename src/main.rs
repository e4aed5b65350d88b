// Main entry point - Dependency injection and server setup
mod domain;
mod application;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};
use anyhow::Context;
use axum::{routing::{get, post}, Router};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::air_quality_service::AirQualityService;
use crate::application::chat_service::ChatService;
use crate::application::clock::SystemClock;
use crate::infrastructure::config::load_app_config;
use crate::infrastructure::gemini_client::GeminiClient;
use crate::infrastructure::memory_chat_repository::MemoryChatRepository;
use crate::infrastructure::openweather_client::OpenWeatherClient;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    air_pollution, chat_detail, chat_history, chatbot, delete_chat, health_check, update_chat_title,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let app_config = load_app_config()?;
    let offset = app_config.display.offset()?;

    // Create upstream clients (infrastructure layer)
    let pollution = Arc::new(OpenWeatherClient::new(
        app_config.openweather.base_url.clone(),
        app_config.openweather.api_key.clone(),
        app_config.openweather.timeout(),
    )?);
    let generator = Arc::new(GeminiClient::new(
        app_config.gemini.base_url.clone(),
        app_config.gemini.api_key.clone(),
        app_config.gemini.model.clone(),
        app_config.gemini.timeout(),
    )?);
    let clock = Arc::new(SystemClock);
    let chats = Arc::new(MemoryChatRepository::new(clock.clone()));

    // Create services (application layer)
    let air_quality_service = AirQualityService::new(pollution, generator.clone(), clock.clone(), offset);
    let chat_service = ChatService::new(chats, generator, clock);

    // Create application state
    let state = Arc::new(AppState {
        air_quality_service,
        chat_service,
    });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/api/air_pollution", post(air_pollution))
        .route("/api/chatbot", post(chatbot))
        .route("/api/history", get(chat_history))
        .route(
            "/api/history/:id",
            get(chat_detail).put(update_chat_title).delete(delete_chat),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = app_config
        .server
        .bind_addr
        .parse()
        .with_context(|| format!("Invalid server.bind_addr: {}", app_config.server.bind_addr))?;
    tracing::info!("Starting air-quality dashboard service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
