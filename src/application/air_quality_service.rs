// Air-quality service - Builds the dashboard payload from upstream samples
use crate::application::clock::Clock;
use crate::application::error::{AggregateError, UpstreamError};
use crate::application::pollution_provider::PollutionProvider;
use crate::application::text_generator::TextGenerator;
use crate::domain::aggregation::{clean_advisory, flatten_hourly, group_by_day, summarize_daily};
use crate::domain::air_quality::{
    AdvisoryText, AggregationOutcome, AirQualityReport, AirQualityResponse, CurrentReading,
    FailureReason,
};
use chrono::FixedOffset;
use std::sync::Arc;

const DEFAULT_LOCATION: &str = "Unknown";

#[derive(Clone)]
pub struct AirQualityService {
    provider: Arc<dyn PollutionProvider>,
    generator: Arc<dyn TextGenerator>,
    clock: Arc<dyn Clock>,
    offset: FixedOffset,
}

impl AirQualityService {
    pub fn new(
        provider: Arc<dyn PollutionProvider>,
        generator: Arc<dyn TextGenerator>,
        clock: Arc<dyn Clock>,
        offset: FixedOffset,
    ) -> Self {
        Self {
            provider,
            generator,
            clock,
            offset,
        }
    }

    /// Build the dashboard payload for a location. Only a missing or zero
    /// coordinate is an error; upstream failures come back as a response
    /// with `air_pollution_data` unset.
    pub async fn aggregate(
        &self,
        latitude: Option<f64>,
        longitude: Option<f64>,
        location_label: Option<String>,
    ) -> Result<AirQualityResponse, AggregateError> {
        let outcome = self.aggregate_outcome(latitude, longitude, location_label).await?;
        Ok(outcome.into())
    }

    pub async fn aggregate_outcome(
        &self,
        latitude: Option<f64>,
        longitude: Option<f64>,
        location_label: Option<String>,
    ) -> Result<AggregationOutcome, AggregateError> {
        let (lat, lon) = match (latitude, longitude) {
            (Some(lat), Some(lon)) if is_usable(lat) && is_usable(lon) => (lat, lon),
            _ => return Err(AggregateError::InvalidArgument),
        };
        let label = location_label.unwrap_or_else(|| DEFAULT_LOCATION.to_string());

        match self.build_report(lat, lon, &label).await {
            Ok(report) => {
                tracing::debug!(
                    "Aggregated {} forecast days for ({}, {})",
                    report.weekly_forecast.len(),
                    lat,
                    lon
                );
                Ok(AggregationOutcome::Ready(Box::new(report)))
            }
            Err(UpstreamError::Format(message)) => {
                tracing::error!("Malformed air pollution response: {}", message);
                Ok(AggregationOutcome::Failed {
                    reason: FailureReason::UpstreamFormat,
                    diagnostic: message,
                })
            }
            Err(UpstreamError::Unavailable(message)) => {
                tracing::error!("Air pollution request failed: {}", message);
                Ok(AggregationOutcome::Failed {
                    reason: FailureReason::UpstreamUnavailable,
                    diagnostic: message,
                })
            }
        }
    }

    async fn build_report(&self, lat: f64, lon: f64, label: &str) -> Result<AirQualityReport, UpstreamError> {
        let current = self
            .provider
            .current(lat, lon)
            .await?
            .and_then(|samples| samples.into_iter().next())
            .ok_or_else(|| UpstreamError::Format("Invalid response from air pollution API.".to_string()))?;

        // Rendering time, not measurement time.
        let now = self.clock.now().with_timezone(&self.offset);
        let selected_time = now.format("%I:%M:%S %p").to_string();
        let selected_date = now.format("%Y-%m-%d").to_string();

        let current_reading = CurrentReading::from_reading(&current, label, &self.offset);
        let advisory = self.advisory(current.aqi).await;

        let forecast = self
            .provider
            .forecast(lat, lon)
            .await?
            .ok_or_else(|| UpstreamError::Format("Invalid response from forecast API.".to_string()))?;

        Ok(AirQualityReport {
            current: current_reading,
            advisory,
            weekly_forecast: group_by_day(&forecast, &self.offset),
            hourly: flatten_hourly(&forecast, &self.offset),
            daily: summarize_daily(&forecast, &self.offset),
            selected_time,
            selected_date,
        })
    }

    async fn advisory(&self, aqi: u8) -> AdvisoryText {
        match self.request_advisory(aqi).await {
            Ok(advisory) => advisory,
            Err(e) => {
                tracing::warn!("Advisory generation failed: {:#}", e);
                AdvisoryText::unavailable()
            }
        }
    }

    async fn request_advisory(&self, aqi: u8) -> anyhow::Result<AdvisoryText> {
        let recommendations = self
            .generator
            .generate(&format!(
                "Provide broader recommendations for dealing with current air quality issues at AQI level {} in 3-4 lines without any Markdown or formatting.",
                aqi
            ))
            .await?;
        let suggestions = self
            .generator
            .generate(&format!(
                "Provide broader long-term suggestions for dealing with air quality issues at AQI level {} in 3-4 lines without any Markdown or formatting.",
                aqi
            ))
            .await?;

        Ok(AdvisoryText {
            recommendations: clean_advisory(&recommendations),
            suggestions: clean_advisory(&suggestions),
        })
    }
}

/// Zero counts as missing, as does anything non-finite.
fn is_usable(coordinate: f64) -> bool {
    coordinate.is_finite() && coordinate != 0.0
}
