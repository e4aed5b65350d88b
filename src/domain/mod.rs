// Domain layer - Request-scoped data and pure transformations
pub mod aggregation;
pub mod air_quality;
pub mod chat;
