use super::config::{SessionConfig, TemperatureUnit};
use super::stage::RoastStage;
use super::summary::RoastSummary;
use crate::clock::{Clock, SystemClock};
use crate::metrics::development_time_ratio;
use crate::series::TemperatureSeries;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Default cadence for the background sampler. Sub-second polling keeps the
/// displayed timer responsive; elapsed seconds are always recomputed from
/// wall-clock subtraction, never from counting ticks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Mutable session state, confined behind one lock.
#[derive(Debug)]
struct RecorderState {
    stage: RoastStage,
    elapsed_seconds: u64,
    current_temperature: f64,
    first_crack_elapsed_seconds: Option<u64>,
    series: TemperatureSeries,
    /// Wall-clock reference the sampler subtracts from; `None` while stopped
    anchor_ms: Option<u64>,
}

/// A roast session recorder that tracks elapsed time, logs temperature
/// readings into a bounded series, marks first crack, and produces an
/// immutable summary when the roast ends.
///
/// Operations attempted in a stage that forbids them are logged and ignored,
/// never errors: the recorder sits behind interactive controls and a stray
/// double-press must not corrupt state.
pub struct RoastRecorder {
    /// Session configuration (validated at the boundary)
    config: SessionConfig,

    /// Injected time source; tests drive a manual clock
    clock: Arc<dyn Clock>,

    /// Sampler cadence
    poll_interval: Duration,

    /// When the session was created; part of the persistence key
    created_at: DateTime<Utc>,

    /// Session state, mutated only through the operations below
    state: Arc<Mutex<RecorderState>>,

    /// Whether the sampler task is running
    sampling: Arc<AtomicBool>,

    /// Handle for the sampler task
    sampler_handle: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl RoastRecorder {
    /// Create a new recorder in the `Ready` stage.
    ///
    /// The series starts seeded with the charge temperature at time zero and
    /// the current temperature mirrors the charge value.
    pub fn new(config: SessionConfig, clock: Arc<dyn Clock>, poll_interval: Duration) -> Self {
        info!("Creating roast session: {}", config.bean_name);

        let state = RecorderState {
            stage: RoastStage::Ready,
            elapsed_seconds: 0,
            current_temperature: config.charge_temperature,
            first_crack_elapsed_seconds: None,
            series: TemperatureSeries::seeded(config.charge_temperature),
            anchor_ms: None,
        };

        Self {
            config,
            clock,
            poll_interval,
            created_at: Utc::now(),
            state: Arc::new(Mutex::new(state)),
            sampling: Arc::new(AtomicBool::new(false)),
            sampler_handle: Arc::new(Mutex::new(None)),
        }
    }

    /// Recorder on the real wall clock with the default sampler cadence.
    pub fn with_system_clock(config: SessionConfig) -> Self {
        Self::new(config, Arc::new(SystemClock), DEFAULT_POLL_INTERVAL)
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Persistence key: bean-name slug plus creation timestamp.
    pub fn session_id(&self) -> String {
        session_key(&self.config.bean_name, self.created_at)
    }

    pub fn is_sampling(&self) -> bool {
        self.sampling.load(Ordering::SeqCst)
    }

    /// Start the roast. Legal only from `Ready`; anchors the elapsed-time
    /// reference and spawns the sampler task.
    pub async fn start(&self) {
        {
            let mut state = self.state.lock().await;
            if state.stage != RoastStage::Ready {
                warn!("Start ignored in stage {}", state.stage);
                return;
            }
            state.stage = RoastStage::Started;
            state.anchor_ms = Some(self.clock.now_ms());
        }

        info!("Roast started: {}", self.config.bean_name);
        self.spawn_sampler().await;
    }

    /// Resume sampling on a restored session.
    ///
    /// Restored sessions always come back with the sampler stopped; the
    /// operator resumes explicitly. Re-anchors the wall-clock reference so
    /// the timer continues from the saved elapsed value rather than counting
    /// the reload gap.
    pub async fn resume(&self) {
        if self.is_sampling() {
            warn!("Sampler already running");
            return;
        }
        {
            let mut state = self.state.lock().await;
            if !state.stage.is_running() {
                warn!("Resume ignored in stage {}", state.stage);
                return;
            }
            let now_ms = self.clock.now_ms();
            state.anchor_ms = Some(now_ms.saturating_sub(state.elapsed_seconds * 1000));
        }

        info!("Roast resumed: {}", self.config.bean_name);
        self.spawn_sampler().await;
    }

    async fn spawn_sampler(&self) {
        if self.sampling.swap(true, Ordering::SeqCst) {
            warn!("Sampler already running");
            return;
        }

        let clock = Arc::clone(&self.clock);
        let state = Arc::clone(&self.state);
        let sampling = Arc::clone(&self.sampling);
        let poll_interval = self.poll_interval;

        let task = tokio::spawn(async move {
            info!("Sampler task started");

            let mut ticks = tokio::time::interval(poll_interval);
            ticks.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                ticks.tick().await;
                if !sampling.load(Ordering::SeqCst) {
                    break;
                }
                Self::advance_elapsed(&clock, &state).await;
            }

            info!("Sampler task stopped");
        });

        {
            let mut handle = self.sampler_handle.lock().await;
            *handle = Some(task);
        }
    }

    /// Run one sampler step against the injected clock.
    ///
    /// The sampler task calls this on its cadence; tests and simulations
    /// call it directly after advancing a manual clock.
    pub async fn tick(&self) {
        Self::advance_elapsed(&self.clock, &self.state).await;
    }

    async fn advance_elapsed(clock: &Arc<dyn Clock>, state: &Mutex<RecorderState>) {
        let mut state = state.lock().await;
        if !state.stage.is_running() {
            return;
        }
        let Some(anchor_ms) = state.anchor_ms else {
            return;
        };

        // Wall-clock subtraction, so catch-up after a long suspension lands
        // on the correct second in one step.
        let elapsed = clock.now_ms().saturating_sub(anchor_ms) / 1000;
        if elapsed > state.elapsed_seconds {
            state.elapsed_seconds = elapsed;
            let temperature = state.current_temperature;
            state.series.append_sampled(elapsed, temperature);
        }
    }

    /// Raise the current temperature by one unit step.
    pub async fn increase_temperature(&self) {
        self.adjust_temperature(self.config.unit.step()).await;
    }

    /// Lower the current temperature by one unit step, clamped at 0.
    pub async fn decrease_temperature(&self) {
        self.adjust_temperature(-self.config.unit.step()).await;
    }

    async fn adjust_temperature(&self, delta: f64) {
        let mut state = self.state.lock().await;
        if !state.stage.allows_temperature_change() {
            warn!("Temperature change ignored in stage {}", state.stage);
            return;
        }

        let updated = (state.current_temperature + delta).max(0.0);
        state.current_temperature = updated;

        match state.stage {
            // Before the roast starts the adjustment is the charge value at
            // time zero; there is no elapsed time to record against yet.
            RoastStage::Ready => state.series.update_origin(updated),
            // While running, a manual change is logged immediately so the
            // operator's action shows as a step in the series.
            _ => {
                let elapsed = state.elapsed_seconds;
                state.series.append_manual(elapsed, updated);
            }
        }
    }

    /// Mark first crack. Legal only from `Started`; captures the elapsed
    /// time once, immutable afterwards.
    pub async fn mark_first_crack(&self) {
        let mut state = self.state.lock().await;
        if state.stage != RoastStage::Started {
            warn!("First crack ignored in stage {}", state.stage);
            return;
        }
        state.first_crack_elapsed_seconds = Some(state.elapsed_seconds);
        state.stage = RoastStage::FirstCracked;
        info!("First crack marked at {}s", state.elapsed_seconds);
    }

    /// End the roast and return the finalized summary.
    ///
    /// Legal only from `FirstCracked`: a roast with no first-crack mark has
    /// no meaningful development phase to summarize. The stage flips to
    /// `Ended` under the state lock before the sampler is stopped, so a
    /// stray tick can never append a point after the summary is derived.
    pub async fn end(&self) -> Option<RoastSummary> {
        let summary = {
            let mut state = self.state.lock().await;
            if state.stage != RoastStage::FirstCracked {
                warn!("End ignored in stage {}", state.stage);
                return None;
            }
            state.stage = RoastStage::Ended;
            state.anchor_ms = None;

            let final_temperature = state
                .series
                .last()
                .map(|p| p.temperature)
                .unwrap_or(state.current_temperature);

            RoastSummary {
                bean_name: self.config.bean_name.clone(),
                unit: self.config.unit,
                charge_temperature: self.config.charge_temperature,
                final_temperature,
                min_temperature: state
                    .series
                    .minimum()
                    .unwrap_or(self.config.charge_temperature),
                max_temperature: state
                    .series
                    .maximum()
                    .unwrap_or(self.config.charge_temperature),
                total_elapsed_seconds: state.elapsed_seconds,
                first_crack_elapsed_seconds: state.first_crack_elapsed_seconds,
                development_time_ratio: development_time_ratio(
                    state.first_crack_elapsed_seconds,
                    state.elapsed_seconds,
                ),
                series: state.series.to_vec(),
                created_at: self.created_at,
                ended_at: Utc::now(),
            }
        };

        self.stop_sampling().await;

        info!(
            "Roast ended: {} ({}s, DTR {:.1}%)",
            summary.bean_name, summary.total_elapsed_seconds, summary.development_time_ratio
        );

        Some(summary)
    }

    /// Stop the sampler task and wait for it to finish.
    ///
    /// Safe to call any number of times, including when the sampler was
    /// never started.
    pub async fn stop_sampling(&self) {
        self.sampling.store(false, Ordering::SeqCst);

        let mut handle = self.sampler_handle.lock().await;
        if let Some(task) = handle.take() {
            if let Err(e) = task.await {
                error!("Sampler task panicked: {}", e);
            }
        }
    }

    /// Read-only view of the session for display collaborators.
    pub async fn snapshot(&self) -> RoastSnapshot {
        let state = self.state.lock().await;
        RoastSnapshot {
            bean_name: self.config.bean_name.clone(),
            unit: self.config.unit,
            charge_temperature: self.config.charge_temperature,
            stage: state.stage,
            elapsed_seconds: state.elapsed_seconds,
            current_temperature: state.current_temperature,
            first_crack_elapsed_seconds: state.first_crack_elapsed_seconds,
            series: state.series.clone(),
            sampling: self.is_sampling(),
        }
    }

    /// Capture the full mutable state for persistence.
    pub async fn serialize(&self) -> SavedSession {
        let state = self.state.lock().await;
        SavedSession {
            config: self.config.clone(),
            stage: state.stage,
            elapsed_seconds: state.elapsed_seconds,
            current_temperature: state.current_temperature,
            first_crack_elapsed_seconds: state.first_crack_elapsed_seconds,
            series: state.series.clone(),
            created_at: self.created_at,
        }
    }

    /// Rebuild a recorder from persisted state.
    ///
    /// The sampler is always stopped afterwards regardless of whether the
    /// session was running when saved: wall-clock elapsed time cannot be
    /// trusted across an unknown reload gap, so the operator must resume
    /// explicitly.
    pub fn restore(
        saved: SavedSession,
        clock: Arc<dyn Clock>,
        poll_interval: Duration,
    ) -> Result<Self> {
        let config = SessionConfig::new(
            saved.config.bean_name,
            saved.config.charge_temperature,
            saved.config.unit,
        )
        .context("saved session has an invalid configuration")?;

        info!("Restoring roast session: {}", config.bean_name);

        let state = RecorderState {
            stage: saved.stage,
            elapsed_seconds: saved.elapsed_seconds,
            current_temperature: saved.current_temperature.max(0.0),
            first_crack_elapsed_seconds: saved.first_crack_elapsed_seconds,
            series: saved.series,
            anchor_ms: None,
        };

        Ok(Self {
            config,
            clock,
            poll_interval,
            created_at: saved.created_at,
            state: Arc::new(Mutex::new(state)),
            sampling: Arc::new(AtomicBool::new(false)),
            sampler_handle: Arc::new(Mutex::new(None)),
        })
    }
}

/// Read-only snapshot of a session, handed to display collaborators.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoastSnapshot {
    pub bean_name: String,
    pub unit: TemperatureUnit,
    pub charge_temperature: f64,
    pub stage: RoastStage,
    pub elapsed_seconds: u64,
    pub current_temperature: f64,
    pub first_crack_elapsed_seconds: Option<u64>,
    pub series: TemperatureSeries,
    /// Whether the sampler task is currently running
    pub sampling: bool,
}

/// Opaque persisted representation of a session's full mutable state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedSession {
    pub config: SessionConfig,
    pub stage: RoastStage,
    pub elapsed_seconds: u64,
    pub current_temperature: f64,
    pub first_crack_elapsed_seconds: Option<u64>,
    pub series: TemperatureSeries,
    pub created_at: DateTime<Utc>,
}

impl SavedSession {
    /// Persistence key, identical to the owning recorder's.
    pub fn session_id(&self) -> String {
        session_key(&self.config.bean_name, self.created_at)
    }
}

fn session_key(bean_name: &str, created_at: DateTime<Utc>) -> String {
    let slug = bean_name
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect::<String>();
    let slug = slug
        .split('-')
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("-");
    let slug = if slug.is_empty() { "roast".to_string() } else { slug };
    format!("{}-{}", slug, created_at.timestamp_millis())
}
