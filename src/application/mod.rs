// Application layer - Use cases and the ports they depend on
pub mod air_quality_service;
pub mod chat_repository;
pub mod chat_service;
pub mod clock;
pub mod error;
pub mod pollution_provider;
pub mod text_generator;
