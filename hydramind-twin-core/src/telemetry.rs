//! JSON shapes exchanged with the dashboard.

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize, Serializer};

use crate::digital_twin::Reading;
use crate::prediction::DerivedMetrics;
use crate::state::{ProcessState, SystemStatus};

/// Body of `GET /api/telemetry`.
#[derive(Debug, Clone, Serialize)]
pub struct TelemetryResponse {
    /// Local wall-clock time, ISO-8601 without offset.
    #[serde(serialize_with = "iso_micros")]
    pub timestamp: NaiveDateTime,
    pub sensors: ProcessState,
    pub ai_prediction: DerivedMetrics,
    pub system_status: SystemStatus,
}

impl TelemetryResponse {
    pub fn from_reading(reading: Reading) -> Self {
        Self::at(Local::now().naive_local(), reading)
    }

    pub fn at(timestamp: NaiveDateTime, reading: Reading) -> Self {
        Self {
            timestamp,
            sensors: reading.state,
            ai_prediction: reading.derived,
            system_status: reading.state.status,
        }
    }
}

/// Always six fractional digits, e.g. `2025-03-14T09:26:53.589793`.
fn iso_micros<S: Serializer>(ts: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(&ts.format("%Y-%m-%dT%H:%M:%S%.6f"))
}

/// Body of `POST /api/simulation/trigger`.
///
/// `scenario` stays a raw string so unknown names reach the policy check.
#[derive(Debug, Clone, Deserialize)]
pub struct TriggerRequest {
    #[serde(default)]
    pub scenario: Option<String>,
}

pub const SCENARIO_ACTIVATED: &str = "Scenario Activated";

#[derive(Debug, Clone, Serialize)]
pub struct TriggerResponse {
    pub status: &'static str,
    pub current_state: SystemStatus,
}

impl TriggerResponse {
    pub fn new(current_state: SystemStatus) -> Self {
        Self { status: SCENARIO_ACTIVATED, current_state }
    }
}
