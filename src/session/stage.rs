use serde::{Deserialize, Serialize};

/// Lifecycle stage of a roast session.
///
/// Strictly linear: `Ready → Started → FirstCracked → Ended`. There is no
/// way back and no skipping; operations illegal for the current stage are
/// ignored by the recorder rather than surfaced as errors, so a stray
/// double-press on an interactive control cannot corrupt state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoastStage {
    /// Session configured, clock not yet running.
    Ready,
    /// Roast in progress, elapsed time accumulating.
    Started,
    /// First crack marked; development phase in progress.
    FirstCracked,
    /// Roast finished. Terminal; no further mutation.
    Ended,
}

impl RoastStage {
    /// Whether the elapsed-time clock runs in this stage.
    pub fn is_running(self) -> bool {
        matches!(self, RoastStage::Started | RoastStage::FirstCracked)
    }

    /// Whether the operator may adjust the current temperature.
    ///
    /// Allowed before the roast starts (it sets the charge value at time
    /// zero) and while running; not once ended.
    pub fn allows_temperature_change(self) -> bool {
        !matches!(self, RoastStage::Ended)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, RoastStage::Ended)
    }
}

impl std::fmt::Display for RoastStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            RoastStage::Ready => "ready",
            RoastStage::Started => "started",
            RoastStage::FirstCracked => "first_cracked",
            RoastStage::Ended => "ended",
        };
        write!(f, "{label}")
    }
}
