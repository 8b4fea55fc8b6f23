use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Temperature scale for a session.
///
/// The per-degree step table makes the two scales' equivalence explicit:
/// one manual adjustment moves the reading by 1.0 °C or by the corresponding
/// 1.8 °F.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemperatureUnit {
    #[serde(rename = "C")]
    Celsius,
    #[serde(rename = "F")]
    Fahrenheit,
}

impl TemperatureUnit {
    /// Size of one manual temperature adjustment in this unit.
    pub fn step(self) -> f64 {
        match self {
            TemperatureUnit::Celsius => 1.0,
            TemperatureUnit::Fahrenheit => 1.8,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "°C",
            TemperatureUnit::Fahrenheit => "°F",
        }
    }
}

impl std::fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TemperatureUnit::Celsius => write!(f, "C"),
            TemperatureUnit::Fahrenheit => write!(f, "F"),
        }
    }
}

impl FromStr for TemperatureUnit {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "c" | "celsius" => Ok(TemperatureUnit::Celsius),
            "f" | "fahrenheit" => Ok(TemperatureUnit::Fahrenheit),
            other => bail!("unknown temperature unit: {other:?} (expected C or F)"),
        }
    }
}

/// Configuration for a roast session, validated at construction.
///
/// The recorder never sees invalid setup data: an empty bean name or a
/// non-positive charge temperature is rejected here, at the boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Bean or blend being roasted (non-empty, trimmed)
    pub bean_name: String,
    /// Temperature at charge, i.e. time zero of the series
    pub charge_temperature: f64,
    /// Scale both the charge and all readings are expressed in
    pub unit: TemperatureUnit,
}

impl SessionConfig {
    pub fn new(
        bean_name: impl Into<String>,
        charge_temperature: f64,
        unit: TemperatureUnit,
    ) -> Result<Self> {
        let bean_name = bean_name.into().trim().to_string();
        if bean_name.is_empty() {
            bail!("bean name must not be empty");
        }
        if !charge_temperature.is_finite() || charge_temperature <= 0.0 {
            bail!(
                "charge temperature must be a positive number, got {}",
                charge_temperature
            );
        }
        Ok(Self {
            bean_name,
            charge_temperature,
            unit,
        })
    }
}
