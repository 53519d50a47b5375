use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use clap::{Args, Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusHandle;
use missiondesk::config::AppConfig;
use missiondesk::error::AppError;
use missiondesk::marketplace::tiers::eligibility::can_apply;
use missiondesk::marketplace::{
    api_router, parse_follower_count, AccessPolicy, ApiState, FollowerTier, InMemoryStore,
    ProgramTier,
};
use missiondesk::telemetry;
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
struct OpsState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
}

#[derive(Parser, Debug)]
#[command(
    name = "missiondesk",
    about = "Run the KOL mission marketplace service and its tier tooling",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Classify a follower-count input against the tier program
    Tier(TierArgs),
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Args, Debug)]
struct TierArgs {
    /// Follower count as a KOL would type it (e.g. "32000", "10k", "3萬")
    followers: String,
    /// Campaign buckets to evaluate eligibility against (comma separated)
    #[arg(long, value_delimiter = ',', value_parser = parse_bucket)]
    allowed: Vec<FollowerTier>,
}

fn parse_bucket(raw: &str) -> Result<FollowerTier, String> {
    FollowerTier::from_label(raw).ok_or_else(|| {
        let known = FollowerTier::ALL.map(|tier| tier.label()).join(", ");
        format!("unknown bucket '{raw}' (expected one of: {known})")
    })
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => run_server(args).await,
        Command::Tier(args) => run_tier(&args),
    }
}

async fn run_server(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let ops = OpsState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
    };

    let store = Arc::new(InMemoryStore::default());
    let state = ApiState::new(
        store.clone(),
        store.clone(),
        store.clone(),
        store.clone(),
        AccessPolicy::new(config.access.admin_emails.clone()),
    );

    let app = Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .with_state(ops)
        .merge(api_router(state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "mission marketplace ready");

    axum::serve(listener, app).await?;
    Ok(())
}

fn run_tier(args: &TierArgs) -> Result<(), AppError> {
    print!("{}", tier_report(args));
    Ok(())
}

fn tier_report(args: &TierArgs) -> String {
    let mut out = String::new();
    let Some(count) = parse_follower_count(&args.followers) else {
        out.push_str(&format!(
            "No digits found in \"{}\"; nothing to classify.\n",
            args.followers
        ));
        return out;
    };

    let tier = ProgramTier::classify(count);
    let range = match tier.ceiling() {
        Some(max) => format!("{} ~ {}", tier.floor(), max),
        None => format!("{}+", tier.floor()),
    };
    out.push_str(&format!(
        "Follower input: \"{}\" -> {}\n",
        args.followers, count
    ));
    out.push_str(&format!("Program tier: {tier} ({range})\n"));

    if !args.allowed.is_empty() {
        let labels = args
            .allowed
            .iter()
            .map(|tier| tier.label())
            .collect::<Vec<_>>()
            .join(", ");
        let eligible = can_apply(Some(count), &args.allowed);
        out.push_str(&format!("Campaign buckets: {labels}\n"));
        out.push_str(&format!(
            "Eligible: {}\n",
            if eligible { "yes" } else { "no" }
        ));
    }

    out
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<OpsState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(State(state): State<OpsState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
