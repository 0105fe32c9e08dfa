//! Closed-form "AI prediction" figures shown next to the live readings.

use serde::Serialize;

use crate::state::ProcessState;

/// Phenol at or above this level (mg/L) breaches the discharge consent.
pub const PHENOL_LIMIT: f64 = 1.0;

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ComplianceStatus {
    #[serde(rename = "COMPLIANT")]
    Compliant,
    #[serde(rename = "NON-COMPLIANT")]
    NonCompliant,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DerivedMetrics {
    pub recommended_dosing_ml_min: f64,
    pub predicted_effluent_cod: f64,
    pub compliance_status: ComplianceStatus,
}

pub fn derive(state: &ProcessState) -> DerivedMetrics {
    let dosing = state.phenol * 10.0 + state.cod * 0.05;
    let effluent = state.cod * (1.0 - state.efficiency / 100.0);
    let compliance = if state.phenol < PHENOL_LIMIT {
        ComplianceStatus::Compliant
    } else {
        ComplianceStatus::NonCompliant
    };
    DerivedMetrics {
        recommended_dosing_ml_min: round2(dosing),
        predicted_effluent_cod: round2(effluent),
        compliance_status: compliance,
    }
}

/// Two decimal places, half away from zero.
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
