pub mod clock;
pub mod config;
pub mod export;
pub mod metrics;
pub mod series;
pub mod session;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::Config;
pub use metrics::{development_time_ratio, dtr_color, Rgb};
pub use series::{TemperaturePoint, TemperatureSeries, SERIES_CAPACITY};
pub use session::{
    RoastRecorder, RoastSnapshot, RoastStage, RoastSummary, SavedSession, SessionConfig,
    TemperatureUnit, DEFAULT_POLL_INTERVAL,
};
pub use store::SessionStore;
