use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Maximum number of points retained in a series: one per second for an hour.
/// Older points are evicted from the front once the cap is exceeded so a
/// long-running session stays bounded in memory.
pub const SERIES_CAPACITY: usize = 3600;

/// A single temperature observation, indexed by elapsed roast time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperaturePoint {
    /// Whole seconds since the roast started
    pub elapsed_seconds: u64,
    /// Temperature in the session's configured unit
    pub temperature: f64,
}

/// Ordered, capacity-bounded temperature time series.
///
/// Insertion order is chronological: `elapsed_seconds` never decreases across
/// stored points. Out-of-order writes are rejected rather than reordered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemperatureSeries {
    points: VecDeque<TemperaturePoint>,
}

impl TemperatureSeries {
    /// Empty series. The recorder never works with one of these directly
    /// (sessions are seeded with the charge point), but the store is usable
    /// on its own.
    pub fn new() -> Self {
        Self::default()
    }

    /// Series holding the charge temperature at time zero.
    pub fn seeded(charge_temperature: f64) -> Self {
        let mut series = Self::new();
        series.push(TemperaturePoint {
            elapsed_seconds: 0,
            temperature: charge_temperature,
        });
        series
    }

    /// Append a point produced by the periodic sampler.
    ///
    /// Rejected unless `elapsed_seconds` is strictly greater than the last
    /// stored point's value: a repeated tick within the same second must not
    /// duplicate the point, and clock jitter must not write backwards.
    /// Returns whether the point was stored.
    pub fn append_sampled(&mut self, elapsed_seconds: u64, temperature: f64) -> bool {
        if let Some(last) = self.last() {
            if elapsed_seconds <= last.elapsed_seconds {
                return false;
            }
        }
        self.push(TemperaturePoint {
            elapsed_seconds,
            temperature,
        });
        true
    }

    /// Append a point produced by an explicit manual temperature change.
    ///
    /// Unlike sampled appends, an elapsed value equal to the last stored
    /// point is accepted: the operator's change stays visible as a step
    /// instead of overwriting history. Writes strictly before the last
    /// stored elapsed value are still rejected.
    pub fn append_manual(&mut self, elapsed_seconds: u64, temperature: f64) -> bool {
        if let Some(last) = self.last() {
            if elapsed_seconds < last.elapsed_seconds {
                return false;
            }
        }
        self.push(TemperaturePoint {
            elapsed_seconds,
            temperature,
        });
        true
    }

    /// Rewrite the time-zero seed point (pre-start charge adjustment).
    ///
    /// No-op unless the series starts at elapsed zero.
    pub fn update_origin(&mut self, temperature: f64) {
        if let Some(first) = self.points.front_mut() {
            if first.elapsed_seconds == 0 {
                first.temperature = temperature;
            }
        }
    }

    fn push(&mut self, point: TemperaturePoint) {
        self.points.push_back(point);
        while self.points.len() > SERIES_CAPACITY {
            self.points.pop_front();
        }
    }

    /// Most recent point, if any.
    pub fn last(&self) -> Option<&TemperaturePoint> {
        self.points.back()
    }

    /// First (oldest retained) point, if any.
    pub fn first(&self) -> Option<&TemperaturePoint> {
        self.points.front()
    }

    /// Lowest temperature over the current contents. `None` when empty.
    pub fn minimum(&self) -> Option<f64> {
        self.points
            .iter()
            .map(|p| p.temperature)
            .fold(None, |min, t| Some(min.map_or(t, |m: f64| m.min(t))))
    }

    /// Highest temperature over the current contents. `None` when empty.
    pub fn maximum(&self) -> Option<f64> {
        self.points
            .iter()
            .map(|p| p.temperature)
            .fold(None, |max, t| Some(max.map_or(t, |m: f64| m.max(t))))
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TemperaturePoint> {
        self.points.iter()
    }

    /// Owned copy of the points in chronological order.
    pub fn to_vec(&self) -> Vec<TemperaturePoint> {
        self.points.iter().copied().collect()
    }
}
