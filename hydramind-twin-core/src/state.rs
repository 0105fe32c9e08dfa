//! Process state record for the effluent treatment train.
//!
//! One instance lives for the life of the process. Readings are plain `f64`s;
//! only `efficiency` carries an enforced bound, see [`EFFICIENCY_MIN`] and
//! [`EFFICIENCY_MAX`].

use std::fmt;

use serde::Serialize;

pub const EFFICIENCY_MIN: f64 = 80.0;
pub const EFFICIENCY_MAX: f64 = 98.0;

/// Baseline readings for normal operation.
pub mod baseline {
    pub const COD: f64 = 350.0;
    pub const PHENOL: f64 = 0.8;
    pub const OIL_GREASE: f64 = 15.0;
    pub const SULFIDE: f64 = 2.5;
    pub const PH: f64 = 7.5;
    pub const FLOW: f64 = 120.0;
    pub const EFFICIENCY: f64 = 92.0;
}

/// Operating label reported to the dashboard as `system_status`.
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SystemStatus {
    #[serde(rename = "NORMAL")]
    Normal,
    #[serde(rename = "CRITICAL: DESALTER UPSET")]
    DesalterUpset,
    #[serde(rename = "CRITICAL: SOUR WATER STRIPPER FAILURE")]
    SourWaterFailure,
}

impl SystemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::DesalterUpset => "CRITICAL: DESALTER UPSET",
            Self::SourWaterFailure => "CRITICAL: SOUR WATER STRIPPER FAILURE",
        }
    }

    pub fn is_critical(&self) -> bool {
        !matches!(self, Self::Normal)
    }
}

impl fmt::Display for SystemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current sensor readings plus the status label.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProcessState {
    /// Chemical oxygen demand, mg/L.
    pub cod: f64,
    /// mg/L
    pub phenol: f64,
    /// mg/L
    pub oil_grease: f64,
    /// mg/L
    pub sulfide: f64,
    pub ph: f64,
    /// m³/hr
    pub flow: f64,
    /// Percent, kept inside [EFFICIENCY_MIN, EFFICIENCY_MAX] by `advance`.
    pub efficiency: f64,
    #[serde(skip)]
    pub status: SystemStatus,
}

impl ProcessState {
    pub fn initialize() -> Self {
        Self {
            cod: baseline::COD,
            phenol: baseline::PHENOL,
            oil_grease: baseline::OIL_GREASE,
            sulfide: baseline::SULFIDE,
            ph: baseline::PH,
            flow: baseline::FLOW,
            efficiency: baseline::EFFICIENCY,
            status: SystemStatus::Normal,
        }
    }
}

impl Default for ProcessState {
    fn default() -> Self {
        Self::initialize()
    }
}
