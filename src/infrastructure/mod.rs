// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod gemini_client;
pub mod http_response;
pub mod memory_chat_repository;
pub mod openweather_client;
