use hyper::header::HeaderValue;
use hyper::Method;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::warn;

use crate::config::CorsConfig;

/// Builds the CORS layer wrapped around every route.
///
/// A `"*"` entry (or an empty list) allows any origin; otherwise only the
/// listed origins are echoed back.
pub fn layer(cfg: &CorsConfig) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    if cfg.allow_origins.is_empty() || cfg.allow_origins.iter().any(|o| o == "*") {
        return base.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = cfg
        .allow_origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!(origin=%o, error=%e, "skipping invalid cors origin");
                None
            }
        })
        .collect();
    base.allow_origin(AllowOrigin::list(origins))
}
