//! Gaussian sensor noise with an optional fixed seed.

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum NoiseError {
    #[error("{channel} sigma must be finite and non-negative, got {sigma}")]
    InvalidSigma { channel: &'static str, sigma: f64 },
}

/// Standard deviations of the zero-mean noise added on each tick.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct NoiseConfig {
    #[serde(default = "default_cod_sigma")]
    pub cod_sigma: f64,
    #[serde(default = "default_phenol_sigma")]
    pub phenol_sigma: f64,
    #[serde(default = "default_oil_grease_sigma")]
    pub oil_grease_sigma: f64,
}

fn default_cod_sigma() -> f64 {
    5.0
}

fn default_phenol_sigma() -> f64 {
    0.05
}

fn default_oil_grease_sigma() -> f64 {
    1.0
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            cod_sigma: default_cod_sigma(),
            phenol_sigma: default_phenol_sigma(),
            oil_grease_sigma: default_oil_grease_sigma(),
        }
    }
}

impl NoiseConfig {
    /// All channels silent. Ticks then only move `efficiency`.
    pub fn silent() -> Self {
        Self { cod_sigma: 0.0, phenol_sigma: 0.0, oil_grease_sigma: 0.0 }
    }
}

/// One noise sample per perturbed channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseSample {
    pub cod: f64,
    pub phenol: f64,
    pub oil_grease: f64,
}

pub struct SensorNoise {
    rng: StdRng,
    cod: Normal<f64>,
    phenol: Normal<f64>,
    oil_grease: Normal<f64>,
}

impl SensorNoise {
    /// `seed: None` draws from OS entropy.
    pub fn new(cfg: NoiseConfig, seed: Option<u64>) -> Result<Self, NoiseError> {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            rng,
            cod: channel("cod", cfg.cod_sigma)?,
            phenol: channel("phenol", cfg.phenol_sigma)?,
            oil_grease: channel("oil_grease", cfg.oil_grease_sigma)?,
        })
    }

    /// Draws are taken in a fixed order (cod, phenol, oil_grease) so a seed
    /// pins the whole sequence.
    pub fn sample(&mut self) -> NoiseSample {
        NoiseSample {
            cod: self.cod.sample(&mut self.rng),
            phenol: self.phenol.sample(&mut self.rng),
            oil_grease: self.oil_grease.sample(&mut self.rng),
        }
    }
}

fn channel(name: &'static str, sigma: f64) -> Result<Normal<f64>, NoiseError> {
    if !sigma.is_finite() || sigma < 0.0 {
        return Err(NoiseError::InvalidSigma { channel: name, sigma });
    }
    Normal::new(0.0, sigma).map_err(|_| NoiseError::InvalidSigma { channel: name, sigma })
}
