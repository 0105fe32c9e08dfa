pub mod rest;

use std::time::Instant;

use hyper::{Body, Request, Response, StatusCode};
use tracing::{debug, Instrument};
use uuid::Uuid;

use crate::config::Config;
use crate::digital_twin::TwinHandle;
use crate::middleware::observability::Metrics;
use crate::scenario::ScenarioPolicy;

/// Everything a request handler needs, cloned per connection.
#[derive(Clone)]
pub struct AppContext {
    pub twin: TwinHandle,
    pub metrics: Metrics,
    pub policy: ScenarioPolicy,
    pub metrics_path: String,
}

impl AppContext {
    pub fn new(twin: TwinHandle, cfg: &Config) -> Self {
        Self {
            twin,
            metrics: Metrics::new(),
            policy: cfg.simulation.scenario_policy,
            metrics_path: cfg.core.observability.metrics_path.clone(),
        }
    }
}

pub async fn handle_http(req: Request<Body>, ctx: AppContext) -> Result<Response<Body>, hyper::Error> {
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("http", %request_id, method=%req.method(), path=%req.uri().path());
    route(req, ctx).instrument(span).await
}

async fn route(req: Request<Body>, ctx: AppContext) -> Result<Response<Body>, hyper::Error> {
    debug!("request");
    let started = Instant::now();
    let metrics = ctx.metrics.clone();
    let method = req.method().as_str().to_owned();
    let path = req.uri().path().to_owned();
    let (route, result) = match (method.as_str(), path.as_str()) {
        ("GET", "/healthz") => ("healthz", Ok(Response::new(Body::from("ok")))),
        ("GET", p) if p == ctx.metrics_path => ("metrics", Ok(ctx.metrics.render())),
        ("GET", "/api/telemetry") => ("telemetry", rest::handle_telemetry(ctx.twin, ctx.metrics).await),
        ("POST", "/api/simulation/trigger") => {
            ("trigger", rest::handle_trigger(req, ctx.twin, ctx.metrics, ctx.policy).await)
        }
        _ => ("other", Ok(rest::status(StatusCode::NOT_FOUND, "not found"))),
    };

    if let Ok(resp) = &result {
        metrics.inc_requests(route, resp.status().as_str());
        metrics.observe_latency(route, started.elapsed().as_secs_f64());
    }
    result
}
