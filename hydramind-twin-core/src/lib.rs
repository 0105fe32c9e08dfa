pub mod config;
pub mod digital_twin;
pub mod middleware;
pub mod noise;
pub mod prediction;
pub mod protocols;
pub mod scenario;
pub mod state;
pub mod telemetry;
