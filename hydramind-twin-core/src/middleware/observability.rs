use std::sync::Arc;

use hyper::{Body, Response};
use prometheus::{Encoder, Gauge, HistogramOpts, HistogramVec, IntCounterVec, Registry, TextEncoder};

#[derive(Clone)]
pub struct Metrics {
    inner: Arc<Inner>,
}

struct Inner {
    registry: Registry,
    requests_total: IntCounterVec,
    request_latency: HistogramVec,
    scenarios_total: IntCounterVec,
    efficiency: Gauge,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let requests_total = IntCounterVec::new(
            prometheus::Opts::new("hydramind_requests_total", "Total requests"),
            &["route", "status"],
        )
        .expect("metric");
        let request_latency = HistogramVec::new(
            HistogramOpts::new("hydramind_request_latency_seconds", "Request latency"),
            &["route"],
        )
        .expect("metric");
        let scenarios_total = IntCounterVec::new(
            prometheus::Opts::new("hydramind_scenarios_total", "Scenario triggers by outcome"),
            &["scenario"],
        )
        .expect("metric");
        let efficiency = Gauge::new("hydramind_efficiency_percent", "Treatment efficiency after the last tick")
            .expect("metric");

        registry.register(Box::new(requests_total.clone())).expect("register");
        registry.register(Box::new(request_latency.clone())).expect("register");
        registry.register(Box::new(scenarios_total.clone())).expect("register");
        registry.register(Box::new(efficiency.clone())).expect("register");

        Self {
            inner: Arc::new(Inner { registry, requests_total, request_latency, scenarios_total, efficiency }),
        }
    }

    pub fn render(&self) -> Response<Body> {
        let mf = self.inner.registry.gather();
        let mut buf = Vec::new();
        TextEncoder::new().encode(&mf, &mut buf).expect("encode");

        Response::builder()
            .header("content-type", TextEncoder::new().format_type())
            .body(Body::from(buf))
            .expect("static response parts")
    }

    pub fn inc_requests(&self, route: &'static str, status: &str) {
        self.inner.requests_total.with_label_values(&[route, status]).inc();
    }

    pub fn observe_latency(&self, route: &'static str, seconds: f64) {
        self.inner.request_latency.with_label_values(&[route]).observe(seconds);
    }

    /// `scenario` is the applied name, or `ignored` for permissive no-ops.
    pub fn inc_scenario(&self, scenario: &str) {
        self.inner.scenarios_total.with_label_values(&[scenario]).inc();
    }

    pub fn set_efficiency(&self, pct: f64) {
        self.inner.efficiency.set(pct);
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn render_exposes_recorded_series() {
        let m = Metrics::new();
        m.inc_requests("telemetry", "200");
        m.inc_scenario("RESET");
        m.set_efficiency(92.1);

        let body = hyper::body::to_bytes(m.render().into_body()).await.unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.contains(r#"hydramind_requests_total{route="telemetry",status="200"} 1"#));
        assert!(text.contains(r#"hydramind_scenarios_total{scenario="RESET"} 1"#));
        assert!(text.contains("hydramind_efficiency_percent 92.1"));
    }
}
