// Provider trait for air-pollution samples
use crate::application::error::UpstreamError;
use crate::domain::air_quality::PollutantReading;
use async_trait::async_trait;

/// `Ok(None)` means the provider answered but the reply carried no sample
/// collection at all.
#[async_trait]
pub trait PollutionProvider: Send + Sync {
    /// Current conditions at the coordinates (normally a single sample)
    async fn current(&self, lat: f64, lon: f64) -> Result<Option<Vec<PollutantReading>>, UpstreamError>;

    /// Multi-day forecast samples, in provider order
    async fn forecast(&self, lat: f64, lon: f64) -> Result<Option<Vec<PollutantReading>>, UpstreamError>;
}
