// Reshaping of forecast samples into the dashboard's groupings
use super::air_quality::{
    DailySummary, DayForecastGroup, ForecastPoint, HourlyPoint, HourlySeries, PollutantReading,
};
use chrono::FixedOffset;
use std::collections::HashSet;

const ADVISORY_MAX_LINES: usize = 4;

/// Group samples by calendar day (`DD Mon YYYY`), in the order each day is
/// first seen. Every sample lands in exactly one group.
pub fn group_by_day(samples: &[PollutantReading], offset: &FixedOffset) -> Vec<DayForecastGroup> {
    let mut groups = Vec::new();
    let mut current: Option<DayForecastGroup> = None;

    for sample in samples {
        let local = sample.local_time(offset);
        let date = local.format("%d %b %Y").to_string();

        let same_day = current.as_ref().is_some_and(|g| g.date == date);
        if !same_day {
            if let Some(done) = current.take() {
                groups.push(done);
            }
            current = Some(DayForecastGroup {
                day: local.format("%A").to_string(),
                date,
                aqi: sample.aqi,
                co: sample.components.co,
                pm2_5: sample.components.pm2_5,
                forecasts: Vec::new(),
            });
        }

        if let Some(group) = current.as_mut() {
            group.forecasts.push(ForecastPoint::from(sample));
        }
    }

    if let Some(done) = current {
        groups.push(done);
    }

    groups
}

/// One point per sample per metric; no binning.
pub fn flatten_hourly(samples: &[PollutantReading], offset: &FixedOffset) -> HourlySeries {
    let mut series = HourlySeries {
        aqi: Vec::with_capacity(samples.len()),
        pm2_5: Vec::with_capacity(samples.len()),
        pm10: Vec::with_capacity(samples.len()),
    };

    for sample in samples {
        let time = sample.local_time(offset).format("%H:%M:%S").to_string();
        series.aqi.push(HourlyPoint {
            time: time.clone(),
            value: f64::from(sample.aqi),
        });
        series.pm2_5.push(HourlyPoint {
            time: time.clone(),
            value: sample.components.pm2_5,
        });
        series.pm10.push(HourlyPoint {
            time,
            value: sample.components.pm10,
        });
    }

    series
}

/// One row per ISO date, keeping the first sample seen for that date.
pub fn summarize_daily(samples: &[PollutantReading], offset: &FixedOffset) -> Vec<DailySummary> {
    let mut seen = HashSet::new();

    samples
        .iter()
        .filter_map(|sample| {
            let date = sample.local_time(offset).format("%Y-%m-%d").to_string();
            if !seen.insert(date.clone()) {
                return None;
            }
            Some(DailySummary {
                date,
                aqi: sample.aqi,
                pm2_5: sample.components.pm2_5,
                pm10: sample.components.pm10,
                co: sample.components.co,
                o3: sample.components.o3,
                so2: sample.components.so2,
            })
        })
        .collect()
}

/// Strip markdown emphasis and keep at most the first four lines.
pub fn clean_advisory(text: &str) -> String {
    let stripped: String = text.chars().filter(|c| *c != '*' && *c != '_').collect();
    stripped
        .lines()
        .take(ADVISORY_MAX_LINES)
        .collect::<Vec<_>>()
        .join("\n")
}
