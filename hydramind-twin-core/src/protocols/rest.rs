use hyper::{Body, Request, Response, StatusCode};
use tracing::warn;

use crate::digital_twin::TwinHandle;
use crate::middleware::observability::Metrics;
use crate::scenario::{Scenario, ScenarioPolicy};
use crate::telemetry::{TelemetryResponse, TriggerRequest, TriggerResponse};

/// `GET /api/telemetry`: one tick, then the readings and predictions.
pub async fn handle_telemetry(twin: TwinHandle, metrics: Metrics) -> Result<Response<Body>, hyper::Error> {
    let reading = twin.read().await;
    metrics.set_efficiency(reading.state.efficiency);
    let out = TelemetryResponse::from_reading(reading);
    Ok(json(StatusCode::OK, &out))
}

/// `POST /api/simulation/trigger`.
pub async fn handle_trigger(
    req: Request<Body>,
    twin: TwinHandle,
    metrics: Metrics,
    policy: ScenarioPolicy,
) -> Result<Response<Body>, hyper::Error> {
    let body = hyper::body::to_bytes(req.into_body()).await?;

    let scenario = match parse_scenario(&body) {
        Ok(sc) => Some(sc),
        Err(rejection) => match policy {
            ScenarioPolicy::Strict => {
                warn!(reason=%rejection.message(), "trigger rejected");
                return Ok(status(rejection.status_code(), &rejection.message()));
            }
            ScenarioPolicy::Permissive => {
                warn!(reason=%rejection.message(), "trigger ignored, state unchanged");
                None
            }
        },
    };

    let current = match scenario {
        Some(sc) => {
            metrics.inc_scenario(sc.as_str());
            twin.trigger(sc).await
        }
        None => {
            metrics.inc_scenario("ignored");
            twin.snapshot().await.status
        }
    };

    Ok(json(StatusCode::OK, &TriggerResponse::new(current)))
}

/// Why a trigger body did not name a known scenario.
#[derive(Debug, PartialEq, Eq)]
enum Rejection {
    InvalidJson,
    MissingScenario,
    Unknown(String),
}

impl Rejection {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingScenario => StatusCode::UNPROCESSABLE_ENTITY,
            Self::InvalidJson | Self::Unknown(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn message(&self) -> String {
        match self {
            Self::InvalidJson => "invalid json".to_string(),
            Self::MissingScenario => "scenario required".to_string(),
            Self::Unknown(name) => format!("unknown scenario: {name}"),
        }
    }
}

fn parse_scenario(body: &[u8]) -> Result<Scenario, Rejection> {
    let parsed: TriggerRequest = serde_json::from_slice(body).map_err(|_| Rejection::InvalidJson)?;
    let name = parsed.scenario.ok_or(Rejection::MissingScenario)?;
    name.parse::<Scenario>().map_err(|_| Rejection::Unknown(name))
}

pub(crate) fn json<T: serde::Serialize>(status: StatusCode, v: &T) -> Response<Body> {
    match serde_json::to_vec(v) {
        Ok(body) => {
            let mut r = Response::new(Body::from(body));
            *r.status_mut() = status;
            r.headers_mut()
                .insert(hyper::header::CONTENT_TYPE, hyper::header::HeaderValue::from_static("application/json"));
            r
        }
        Err(e) => {
            warn!(error=%e, "response serialization failed");
            self::status(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
        }
    }
}

pub(crate) fn status(status: StatusCode, msg: &str) -> Response<Body> {
    let mut r = Response::new(Body::from(msg.to_string()));
    *r.status_mut() = status;
    r
}
