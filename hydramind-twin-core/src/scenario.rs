use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

/// Operator-selectable override applied through the trigger endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    /// Oil and COD flood from a desalter upset.
    DesalterFail,
    /// Phenol and sulfide spike from a sour water stripper failure.
    SourWaterFail,
    /// Operator clears the upset.
    Reset,
}

impl Scenario {
    pub const ALL: [Scenario; 3] = [Scenario::DesalterFail, Scenario::SourWaterFail, Scenario::Reset];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DesalterFail => "DESALTER_FAIL",
            Self::SourWaterFail => "SOUR_WATER_FAIL",
            Self::Reset => "RESET",
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScenarioError {
    #[error("unknown scenario: {0}")]
    Unknown(String),
}

impl FromStr for Scenario {
    type Err = ScenarioError;

    /// Names are matched exactly; the dashboard always sends upper case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Scenario::ALL
            .into_iter()
            .find(|sc| sc.as_str() == s)
            .ok_or_else(|| ScenarioError::Unknown(s.to_string()))
    }
}

/// How the trigger endpoint treats bodies it cannot map to a [`Scenario`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioPolicy {
    /// Bad bodies and unknown names leave the state alone and still answer 200.
    #[default]
    Permissive,
    /// Bad bodies get 400/422 and unknown names get 400.
    Strict,
}
