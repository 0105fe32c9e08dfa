//! Digital twin of the effluent treatment train.
//!
//! [`DigitalTwin`] owns the process state and its noise source and is driven
//! synchronously. [`TwinHandle`] is the shared, cloneable view the HTTP layer
//! uses; every mutation happens under one lock so a tick or a scenario override
//! is never observed half-applied.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::info;

use crate::noise::{NoiseConfig, NoiseError, SensorNoise};
use crate::prediction::{self, DerivedMetrics};
use crate::scenario::Scenario;
use crate::state::{baseline, ProcessState, SystemStatus, EFFICIENCY_MAX, EFFICIENCY_MIN};

/// Above this flow (m³/hr) the bio-reactor is overloaded and loses efficiency.
pub const FLOW_OVERLOAD: f64 = 140.0;
const EFFICIENCY_LOSS: f64 = 0.5;
const EFFICIENCY_RECOVERY: f64 = 0.1;

pub struct DigitalTwin {
    state: ProcessState,
    noise: SensorNoise,
}

impl DigitalTwin {
    pub fn new(noise: SensorNoise) -> Self {
        Self { state: ProcessState::initialize(), noise }
    }

    pub fn from_config(noise: NoiseConfig, seed: Option<u64>) -> Result<Self, NoiseError> {
        Ok(Self::new(SensorNoise::new(noise, seed)?))
    }

    pub fn state(&self) -> &ProcessState {
        &self.state
    }

    pub fn status(&self) -> SystemStatus {
        self.state.status
    }

    /// One simulation tick. The status label is left alone.
    pub fn advance(&mut self) -> ProcessState {
        let s = &mut self.state;
        if s.flow > FLOW_OVERLOAD {
            s.efficiency -= EFFICIENCY_LOSS;
        } else {
            s.efficiency += EFFICIENCY_RECOVERY;
        }
        s.efficiency = s.efficiency.clamp(EFFICIENCY_MIN, EFFICIENCY_MAX);

        let n = self.noise.sample();
        s.cod += n.cod;
        s.phenol += n.phenol;
        s.oil_grease += n.oil_grease;

        *s
    }

    /// Applies a scenario override and returns the resulting label.
    pub fn trigger(&mut self, scenario: Scenario) -> SystemStatus {
        match scenario {
            Scenario::DesalterFail => {
                self.state.oil_grease = 150.0;
                self.state.cod = 900.0;
                self.state.status = SystemStatus::DesalterUpset;
            }
            Scenario::SourWaterFail => {
                self.state.phenol = 15.0;
                self.state.sulfide = 25.0;
                self.state.status = SystemStatus::SourWaterFailure;
            }
            Scenario::Reset => self.reset(),
        }
        self.state.status
    }

    /// Sulfide, pH, flow and efficiency keep their current values.
    pub fn reset(&mut self) {
        let s = &mut self.state;
        s.phenol = baseline::PHENOL;
        s.oil_grease = baseline::OIL_GREASE;
        s.cod = baseline::COD;
        s.status = SystemStatus::Normal;
    }
}

/// State after one tick together with the figures derived from it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub state: ProcessState,
    pub derived: DerivedMetrics,
}

#[derive(Clone)]
pub struct TwinHandle {
    inner: Arc<Mutex<DigitalTwin>>,
}

impl TwinHandle {
    pub fn new(twin: DigitalTwin) -> Self {
        Self { inner: Arc::new(Mutex::new(twin)) }
    }

    /// Advances one tick and derives predictions from that same snapshot.
    pub async fn read(&self) -> Reading {
        let state = self.inner.lock().await.advance();
        Reading { state, derived: prediction::derive(&state) }
    }

    pub async fn trigger(&self, scenario: Scenario) -> SystemStatus {
        let status = self.inner.lock().await.trigger(scenario);
        info!(%scenario, %status, "scenario applied");
        status
    }

    /// Current state without advancing.
    pub async fn snapshot(&self) -> ProcessState {
        *self.inner.lock().await.state()
    }
}
