// Air-quality domain models
use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;

/// Pollutant concentrations reported with every sample, in μg/m³.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Components {
    pub co: f64,
    pub no: f64,
    pub no2: f64,
    pub o3: f64,
    pub so2: f64,
    pub pm2_5: f64,
    pub pm10: f64,
    pub nh3: f64,
}

/// One upstream measurement, immutable once built from provider data.
#[derive(Debug, Clone, PartialEq)]
pub struct PollutantReading {
    pub aqi: u8,
    pub components: Components,
    pub timestamp: DateTime<Utc>,
}

impl PollutantReading {
    pub fn new(aqi: u8, components: Components, timestamp: DateTime<Utc>) -> Self {
        Self {
            aqi,
            components,
            timestamp,
        }
    }

    /// The measurement instant expressed in the display offset.
    pub fn local_time(&self, offset: &FixedOffset) -> DateTime<FixedOffset> {
        self.timestamp.with_timezone(offset)
    }
}

/// The current reading plus its display strings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentReading {
    pub info: String,
    pub aqi: u8,
    #[serde(flatten)]
    pub components: Components,
    pub dt: String,
    pub day: String,
    pub date: String,
    pub time: String,
}

impl CurrentReading {
    pub fn from_reading(reading: &PollutantReading, location_label: &str, offset: &FixedOffset) -> Self {
        let local = reading.local_time(offset);
        Self {
            info: location_label.to_string(),
            aqi: reading.aqi,
            components: reading.components,
            dt: local.format("%A, %B %d, %Y at %I:%M %p").to_string(),
            day: local.format("%A").to_string(),
            date: local.format("%d %b %Y").to_string(),
            time: local.format("%I:%M %p").to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastPoint {
    /// Unix seconds of the sample.
    pub dt: i64,
    pub aqi: u8,
    pub co: f64,
    pub pm2_5: f64,
}

impl From<&PollutantReading> for ForecastPoint {
    fn from(reading: &PollutantReading) -> Self {
        Self {
            dt: reading.timestamp.timestamp(),
            aqi: reading.aqi,
            co: reading.components.co,
            pm2_5: reading.components.pm2_5,
        }
    }
}

/// All forecast samples of one calendar day. The headline values are those
/// of the first sample that fell on that day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayForecastGroup {
    pub day: String,
    pub date: String,
    pub aqi: u8,
    pub co: f64,
    pub pm2_5: f64,
    pub forecasts: Vec<ForecastPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyPoint {
    pub time: String,
    pub value: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HourlySeries {
    pub aqi: Vec<HourlyPoint>,
    pub pm2_5: Vec<HourlyPoint>,
    pub pm10: Vec<HourlyPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySummary {
    pub date: String,
    pub aqi: u8,
    pub pm2_5: f64,
    pub pm10: f64,
    pub co: f64,
    pub o3: f64,
    pub so2: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdvisoryText {
    pub recommendations: String,
    pub suggestions: String,
}

impl AdvisoryText {
    pub fn unavailable() -> Self {
        Self {
            recommendations: "Error fetching recommendations.".to_string(),
            suggestions: "Error fetching suggestions.".to_string(),
        }
    }
}

/// Everything produced by a successful aggregation.
#[derive(Debug, Clone, PartialEq)]
pub struct AirQualityReport {
    pub current: CurrentReading,
    pub advisory: AdvisoryText,
    pub weekly_forecast: Vec<DayForecastGroup>,
    pub hourly: HourlySeries,
    pub daily: Vec<DailySummary>,
    pub selected_time: String,
    pub selected_date: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    UpstreamFormat,
    UpstreamUnavailable,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AggregationOutcome {
    Ready(Box<AirQualityReport>),
    Failed {
        reason: FailureReason,
        diagnostic: String,
    },
}

/// The JSON shape handed to the front-end: populated on success, null and
/// empty fields with explanatory text on failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AirQualityResponse {
    pub air_pollution_data: Option<CurrentReading>,
    pub recommendations: String,
    pub suggestions: String,
    pub weekly_forecast: Vec<DayForecastGroup>,
    pub hourly_data: Vec<HourlyPoint>,
    pub hourly_pm25: Vec<HourlyPoint>,
    pub hourly_pm10: Vec<HourlyPoint>,
    pub selected_time: Option<String>,
    pub daily_data: Vec<DailySummary>,
    pub selected_date: Option<String>,
}

impl AirQualityResponse {
    fn failed(recommendations: String, suggestions: &str) -> Self {
        Self {
            air_pollution_data: None,
            recommendations,
            suggestions: suggestions.to_string(),
            weekly_forecast: Vec::new(),
            hourly_data: Vec::new(),
            hourly_pm25: Vec::new(),
            hourly_pm10: Vec::new(),
            selected_time: None,
            daily_data: Vec::new(),
            selected_date: None,
        }
    }

    pub fn is_failure(&self) -> bool {
        self.air_pollution_data.is_none()
    }
}

impl From<AggregationOutcome> for AirQualityResponse {
    fn from(outcome: AggregationOutcome) -> Self {
        match outcome {
            AggregationOutcome::Ready(report) => {
                let report = *report;
                Self {
                    air_pollution_data: Some(report.current),
                    recommendations: report.advisory.recommendations,
                    suggestions: report.advisory.suggestions,
                    weekly_forecast: report.weekly_forecast,
                    hourly_data: report.hourly.aqi,
                    hourly_pm25: report.hourly.pm2_5,
                    hourly_pm10: report.hourly.pm10,
                    selected_time: Some(report.selected_time),
                    daily_data: report.daily,
                    selected_date: Some(report.selected_date),
                }
            }
            AggregationOutcome::Failed {
                reason: FailureReason::UpstreamUnavailable,
                ..
            } => Self::failed(
                "Error fetching air pollution data.".to_string(),
                "Please try again later.",
            ),
            AggregationOutcome::Failed {
                reason: FailureReason::UpstreamFormat,
                diagnostic,
            } => Self::failed(diagnostic, "Please check the data provided."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(ts: i64) -> PollutantReading {
        PollutantReading::new(
            3,
            Components {
                co: 200.1,
                pm2_5: 12.3,
                pm10: 20.1,
                ..Components::default()
            },
            DateTime::from_timestamp(ts, 0).unwrap(),
        )
    }

    #[test]
    fn test_current_reading_display_fields() {
        let utc = FixedOffset::east_opt(0).unwrap();
        let current = CurrentReading::from_reading(&reading(1_700_000_000), "Delhi", &utc);

        assert_eq!(current.info, "Delhi");
        assert_eq!(current.aqi, 3);
        assert_eq!(current.components.pm2_5, 12.3);
        assert_eq!(current.day, "Tuesday");
        assert_eq!(current.date, "14 Nov 2023");
        assert_eq!(current.time, "10:13 PM");
        assert_eq!(current.dt, "Tuesday, November 14, 2023 at 10:13 PM");
    }

    #[test]
    fn test_current_reading_respects_offset() {
        let ist = FixedOffset::east_opt(5 * 3600 + 1800).unwrap();
        let current = CurrentReading::from_reading(&reading(1_700_000_000), "Delhi", &ist);

        assert_eq!(current.day, "Wednesday");
        assert_eq!(current.date, "15 Nov 2023");
        assert_eq!(current.time, "03:43 AM");
    }

    #[test]
    fn test_current_reading_serializes_flat_components() {
        let utc = FixedOffset::east_opt(0).unwrap();
        let current = CurrentReading::from_reading(&reading(1_700_000_000), "Delhi", &utc);
        let json = serde_json::to_value(&current).unwrap();

        assert_eq!(json["info"], "Delhi");
        assert_eq!(json["pm2_5"], 12.3);
        assert_eq!(json["nh3"], 0.0);
        assert!(json.get("components").is_none());
    }

    #[test]
    fn test_unavailable_outcome_maps_to_retry_text() {
        let response = AirQualityResponse::from(AggregationOutcome::Failed {
            reason: FailureReason::UpstreamUnavailable,
            diagnostic: "connection refused".to_string(),
        });

        assert!(response.is_failure());
        assert_eq!(response.recommendations, "Error fetching air pollution data.");
        assert_eq!(response.suggestions, "Please try again later.");
        assert!(response.weekly_forecast.is_empty());
        assert!(response.selected_time.is_none());
    }

    #[test]
    fn test_format_outcome_carries_diagnostic() {
        let response = AirQualityResponse::from(AggregationOutcome::Failed {
            reason: FailureReason::UpstreamFormat,
            diagnostic: "Invalid response from forecast API.".to_string(),
        });

        assert!(response.is_failure());
        assert_eq!(response.recommendations, "Invalid response from forecast API.");
        assert_eq!(response.suggestions, "Please check the data provided.");
        assert!(response.daily_data.is_empty());
    }
}
