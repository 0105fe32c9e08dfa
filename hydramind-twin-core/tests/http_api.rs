use hyper::service::service_fn;
use hyper::{Body, Method, Request, Response, StatusCode};
use serde_json::Value;
use tower::{ServiceBuilder, ServiceExt};

use hydramind_twin_core::config::{Config, CorsConfig};
use hydramind_twin_core::digital_twin::{DigitalTwin, TwinHandle};
use hydramind_twin_core::middleware::cors;
use hydramind_twin_core::noise::NoiseConfig;
use hydramind_twin_core::protocols::{handle_http, AppContext};
use hydramind_twin_core::scenario::ScenarioPolicy;

fn context(policy: ScenarioPolicy) -> AppContext {
    let mut cfg = Config::default();
    cfg.simulation.scenario_policy = policy;
    let twin = DigitalTwin::from_config(NoiseConfig::silent(), None).unwrap();
    AppContext::new(TwinHandle::new(twin), &cfg)
}

fn get(path: &str) -> Request<Body> {
    Request::builder().method(Method::GET).uri(path).body(Body::empty()).unwrap()
}

fn trigger(body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/api/simulation/trigger")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(resp: Response<Body>) -> Value {
    let bytes = hyper::body::to_bytes(resp.into_body()).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_text(resp: Response<Body>) -> String {
    let bytes = hyper::body::to_bytes(resp.into_body()).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn telemetry_advances_and_reports() {
    let ctx = context(ScenarioPolicy::Permissive);
    let resp = handle_http(get("/api/telemetry"), ctx.clone()).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()["content-type"], "application/json");

    let v = body_json(resp).await;
    assert!(v["timestamp"].as_str().unwrap().contains('T'));
    let eff = v["sensors"]["efficiency"].as_f64().unwrap();
    assert!((80.0..=98.0).contains(&eff));
    assert!((eff - 92.1).abs() < 1e-9);
    assert_eq!(v["sensors"]["cod"], 350.0);
    assert_eq!(v["ai_prediction"]["compliance_status"], "COMPLIANT");
    assert_eq!(v["system_status"], "NORMAL");

    let v = body_json(handle_http(get("/api/telemetry"), ctx).await.unwrap()).await;
    assert!((v["sensors"]["efficiency"].as_f64().unwrap() - 92.2).abs() < 1e-9);
}

#[tokio::test]
async fn desalter_fail_then_telemetry() {
    let ctx = context(ScenarioPolicy::Permissive);
    let resp = handle_http(trigger(r#"{"scenario":"DESALTER_FAIL"}"#), ctx.clone()).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        body_json(resp).await,
        serde_json::json!({"status": "Scenario Activated", "current_state": "CRITICAL: DESALTER UPSET"})
    );

    let v = body_json(handle_http(get("/api/telemetry"), ctx).await.unwrap()).await;
    assert_eq!(v["sensors"]["oil_grease"], 150.0);
    assert_eq!(v["sensors"]["cod"], 900.0);
    assert_eq!(v["system_status"], "CRITICAL: DESALTER UPSET");
}

#[tokio::test]
async fn sour_water_fail_is_non_compliant() {
    let ctx = context(ScenarioPolicy::Permissive);
    handle_http(trigger(r#"{"scenario":"SOUR_WATER_FAIL"}"#), ctx.clone()).await.unwrap();

    let v = body_json(handle_http(get("/api/telemetry"), ctx).await.unwrap()).await;
    assert_eq!(v["sensors"]["phenol"], 15.0);
    assert_eq!(v["sensors"]["sulfide"], 25.0);
    assert_eq!(v["ai_prediction"]["compliance_status"], "NON-COMPLIANT");
    assert_eq!(v["ai_prediction"]["recommended_dosing_ml_min"], 167.5);
}

#[tokio::test]
async fn reset_restores_baseline() {
    let ctx = context(ScenarioPolicy::Permissive);
    handle_http(trigger(r#"{"scenario":"DESALTER_FAIL"}"#), ctx.clone()).await.unwrap();
    handle_http(get("/api/telemetry"), ctx.clone()).await.unwrap();
    let resp = handle_http(trigger(r#"{"scenario":"RESET"}"#), ctx.clone()).await.unwrap();
    assert_eq!(body_json(resp).await["current_state"], "NORMAL");

    let s = ctx.twin.snapshot().await;
    assert_eq!((s.phenol, s.oil_grease, s.cod), (0.8, 15.0, 350.0));
}

#[tokio::test]
async fn permissive_ignores_bad_bodies() {
    let ctx = context(ScenarioPolicy::Permissive);
    handle_http(trigger(r#"{"scenario":"SOUR_WATER_FAIL"}"#), ctx.clone()).await.unwrap();
    let before = ctx.twin.snapshot().await;

    for body in [r#"{"scenario":"MELTDOWN"}"#, "{}", "garbage"] {
        let resp = handle_http(trigger(body), ctx.clone()).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let v = body_json(resp).await;
        assert_eq!(v["status"], "Scenario Activated");
        assert_eq!(v["current_state"], "CRITICAL: SOUR WATER STRIPPER FAILURE");
    }
    assert_eq!(ctx.twin.snapshot().await, before);
}

#[tokio::test]
async fn strict_rejects_bad_bodies() {
    let ctx = context(ScenarioPolicy::Strict);

    let resp = handle_http(trigger(r#"{"scenario":"MELTDOWN"}"#), ctx.clone()).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(resp).await, "unknown scenario: MELTDOWN");

    let resp = handle_http(trigger("{}"), ctx.clone()).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let resp = handle_http(trigger("garbage"), ctx.clone()).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(resp).await, "invalid json");

    let resp = handle_http(trigger(r#"{"scenario":"DESALTER_FAIL"}"#), ctx).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn operational_routes() {
    let ctx = context(ScenarioPolicy::Permissive);
    let resp = handle_http(get("/healthz"), ctx.clone()).await.unwrap();
    assert_eq!(body_text(resp).await, "ok");

    handle_http(get("/api/telemetry"), ctx.clone()).await.unwrap();
    let text = body_text(handle_http(get("/metrics"), ctx.clone()).await.unwrap()).await;
    assert!(text.contains(r#"hydramind_requests_total{route="telemetry",status="200"} 1"#));

    let resp = handle_http(get("/api/unknown"), ctx.clone()).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = handle_http(
        Request::builder().method(Method::POST).uri("/api/telemetry").body(Body::empty()).unwrap(),
        ctx,
    )
    .await
    .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn every_route_is_counted_and_timed() {
    let ctx = context(ScenarioPolicy::Strict);
    handle_http(get("/healthz"), ctx.clone()).await.unwrap();
    handle_http(get("/nowhere"), ctx.clone()).await.unwrap();
    handle_http(trigger("{}"), ctx.clone()).await.unwrap();
    handle_http(trigger(r#"{"scenario":"RESET"}"#), ctx.clone()).await.unwrap();
    handle_http(get("/metrics"), ctx.clone()).await.unwrap();

    let text = body_text(handle_http(get("/metrics"), ctx).await.unwrap()).await;
    for series in [
        r#"hydramind_requests_total{route="healthz",status="200"} 1"#,
        r#"hydramind_requests_total{route="other",status="404"} 1"#,
        r#"hydramind_requests_total{route="trigger",status="422"} 1"#,
        r#"hydramind_requests_total{route="trigger",status="200"} 1"#,
        r#"hydramind_requests_total{route="metrics",status="200"} 1"#,
        r#"hydramind_request_latency_seconds_count{route="healthz"} 1"#,
        r#"hydramind_request_latency_seconds_count{route="other"} 1"#,
        r#"hydramind_request_latency_seconds_count{route="trigger"} 2"#,
    ] {
        assert!(text.contains(series), "missing {series}\n{text}");
    }
}

#[tokio::test]
async fn cors_is_open_by_default() {
    let ctx = context(ScenarioPolicy::Permissive);
    let svc = ServiceBuilder::new()
        .layer(cors::layer(&CorsConfig::default()))
        .service(service_fn(move |req| handle_http(req, ctx.clone())));

    let req = Request::builder()
        .method(Method::GET)
        .uri("/api/telemetry")
        .header("origin", "http://dashboard.example")
        .body(Body::empty())
        .unwrap();
    let resp = svc.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()["access-control-allow-origin"], "*");

    let preflight = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/simulation/trigger")
        .header("origin", "http://dashboard.example")
        .header("access-control-request-method", "POST")
        .header("access-control-request-headers", "content-type")
        .body(Body::empty())
        .unwrap();
    let resp = svc.oneshot(preflight).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()["access-control-allow-origin"], "*");
    assert!(resp.headers().contains_key("access-control-allow-methods"));
}

#[tokio::test]
async fn cors_origin_list_is_enforced() {
    let ctx = context(ScenarioPolicy::Permissive);
    let cfg = CorsConfig { allow_origins: vec!["http://localhost:3000".to_string()] };
    let svc = ServiceBuilder::new()
        .layer(cors::layer(&cfg))
        .service(service_fn(move |req| handle_http(req, ctx.clone())));

    let allowed = Request::builder()
        .uri("/healthz")
        .header("origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let resp = svc.clone().oneshot(allowed).await.unwrap();
    assert_eq!(resp.headers()["access-control-allow-origin"], "http://localhost:3000");

    let other = Request::builder()
        .uri("/healthz")
        .header("origin", "http://evil.example")
        .body(Body::empty())
        .unwrap();
    let resp = svc.oneshot(other).await.unwrap();
    assert!(!resp.headers().contains_key("access-control-allow-origin"));
}

#[test]
fn shipped_config_parses() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../config/twin.yaml");
    let cfg = Config::from_path(path).unwrap();
    assert_eq!(cfg.core.bind_http, "127.0.0.1:5000");
    assert_eq!(cfg.simulation.scenario_policy, ScenarioPolicy::Permissive);
    assert_eq!(cfg.simulation.noise, NoiseConfig::default());
}
