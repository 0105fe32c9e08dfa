use std::net::SocketAddr;

use anyhow::Context;
use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Request, Server};
use tower::ServiceBuilder;
use tracing::{error, info};

use hydramind_twin_core::config::Config;
use hydramind_twin_core::digital_twin::{DigitalTwin, TwinHandle};
use hydramind_twin_core::middleware::cors;
use hydramind_twin_core::protocols::{handle_http, AppContext};

const DEFAULT_CONFIG_PATH: &str = "config/twin.yaml";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cfg = Config::resolve(
        parse_config_path_from_args(),
        std::env::var("HYDRAMIND_CONFIG").ok(),
        DEFAULT_CONFIG_PATH,
        std::env::var("HYDRAMIND_BIND").ok(),
    )?;

    let twin = DigitalTwin::from_config(cfg.simulation.noise, cfg.simulation.seed).context("invalid simulation.noise")?;
    let ctx = AppContext::new(TwinHandle::new(twin), &cfg);
    let cors_layer = cors::layer(&cfg.core.cors);

    let http_addr: SocketAddr = cfg.core.bind_http.parse().context("invalid core.bind_http")?;

    let make_svc = make_service_fn(move |_conn| {
        let ctx = ctx.clone();
        let cors_layer = cors_layer.clone();
        async move {
            let svc = ServiceBuilder::new().layer(cors_layer).service(service_fn(move |req: Request<Body>| {
                let ctx = ctx.clone();
                async move { handle_http(req, ctx).await }
            }));
            Ok::<_, hyper::Error>(svc)
        }
    });

    let http_server = Server::try_bind(&http_addr).context("binding http listener")?.serve(make_svc);
    info!(
        %http_addr,
        seed = ?cfg.simulation.seed,
        policy = ?cfg.simulation.scenario_policy,
        "hydramind digital twin listening"
    );

    tokio::select! {
        r = http_server => {
            if let Err(e) = r { error!(error=%e, "http server error"); }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown requested");
        }
    }

    Ok(())
}

fn parse_config_path_from_args() -> Option<String> {
    let mut args = std::env::args().skip(1);
    while let Some(a) = args.next() {
        if a == "--config" {
            return args.next();
        }
        if let Some(v) = a.strip_prefix("--config=") {
            return Some(v.to_string());
        }
    }
    None
}
