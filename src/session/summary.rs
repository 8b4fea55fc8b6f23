use super::config::TemperatureUnit;
use crate::metrics;
use crate::series::TemperaturePoint;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Immutable record of a finished roast, handed to display and export
/// collaborators when the session ends.
///
/// The series is an owned copy; nothing the recorder does afterwards can
/// change a summary that has already been handed out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoastSummary {
    /// Bean or blend that was roasted
    pub bean_name: String,

    /// Temperature scale of every value below
    pub unit: TemperatureUnit,

    /// Temperature at charge (time zero)
    pub charge_temperature: f64,

    /// Last recorded temperature
    pub final_temperature: f64,

    /// Lowest temperature over the retained series
    pub min_temperature: f64,

    /// Highest temperature over the retained series
    pub max_temperature: f64,

    /// Total roast length in whole seconds
    pub total_elapsed_seconds: u64,

    /// When first crack was marked, in elapsed seconds
    pub first_crack_elapsed_seconds: Option<u64>,

    /// Development Time Ratio percentage derived from the two fields above
    pub development_time_ratio: f64,

    /// Full temperature series in chronological order
    pub series: Vec<TemperaturePoint>,

    /// When the session was created
    pub created_at: DateTime<Utc>,

    /// When the roast was ended
    pub ended_at: DateTime<Utc>,
}

impl RoastSummary {
    /// DTR display color for this roast.
    pub fn dtr_color(&self) -> metrics::Rgb {
        metrics::dtr_color(self.development_time_ratio)
    }
}
