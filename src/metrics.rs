//! Derived roast metrics: Development Time Ratio and its display color.

use serde::{Deserialize, Serialize};

/// Development Time Ratio as a percentage in `[0, 100]`.
///
/// The DTR is the share of total roast time spent after first crack:
/// `100 * (total - first_crack) / total`. Returns 0 when first crack was
/// never marked or no time has elapsed. A first-crack value beyond the total
/// cannot arise from the recorder's monotonic bookkeeping; if it shows up
/// anyway it is clamped so the result never goes negative.
pub fn development_time_ratio(
    first_crack_elapsed_seconds: Option<u64>,
    total_elapsed_seconds: u64,
) -> f64 {
    let Some(first_crack) = first_crack_elapsed_seconds else {
        return 0.0;
    };
    if total_elapsed_seconds == 0 {
        return 0.0;
    }
    let first_crack = first_crack.min(total_elapsed_seconds);
    100.0 * (total_elapsed_seconds - first_crack) as f64 / total_elapsed_seconds as f64
}

/// An sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Lowercase `#rrggbb` form.
    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl std::fmt::Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.hex())
    }
}

/// Light tan shown at 0% development.
pub const DTR_COLOR_LOW: Rgb = Rgb::new(210, 180, 140);
/// Medium brown shown at 30% development.
pub const DTR_COLOR_MID: Rgb = Rgb::new(139, 69, 19);
/// Black shown at 100% development.
pub const DTR_COLOR_HIGH: Rgb = Rgb::new(0, 0, 0);

const DTR_MID_STOP: f64 = 30.0;

/// Map a DTR percentage to its display color.
///
/// Piecewise linear over three stops (0% tan, 30% brown, 100% black),
/// interpolated per channel. Input is clamped to `[0, 100]`.
pub fn dtr_color(percentage: f64) -> Rgb {
    let pct = percentage.clamp(0.0, 100.0);
    if pct <= DTR_MID_STOP {
        lerp(DTR_COLOR_LOW, DTR_COLOR_MID, pct / DTR_MID_STOP)
    } else {
        lerp(
            DTR_COLOR_MID,
            DTR_COLOR_HIGH,
            (pct - DTR_MID_STOP) / (100.0 - DTR_MID_STOP),
        )
    }
}

fn lerp(from: Rgb, to: Rgb, t: f64) -> Rgb {
    Rgb::new(
        lerp_channel(from.r, to.r, t),
        lerp_channel(from.g, to.g, t),
        lerp_channel(from.b, to.b, t),
    )
}

fn lerp_channel(from: u8, to: u8, t: f64) -> u8 {
    (from as f64 + (to as f64 - from as f64) * t).round() as u8
}
