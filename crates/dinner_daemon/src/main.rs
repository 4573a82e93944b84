mod frame_loop;
mod routes;
mod state;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use dinner_control::Controller;
use dinner_core::{LocalClock, Store};
use dinner_world::{
    apply_overrides, default_seed, load_constants, load_seed, parse_override, FileSlot,
};
use parking_lot::Mutex;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing_subscriber::EnvFilter;

use crate::state::{AppState, BroadcastSurface};

#[derive(Parser)]
#[command(name = "dinner_daemon", about = "Dinner Decider HTTP service")]
struct Args {
    #[arg(long, default_value_t = 3001)]
    port: u16,
    /// Directory holding the saved household state.
    #[arg(long, default_value = "./dinner_data")]
    data_dir: PathBuf,
    /// Constants file to use instead of the built-in defaults.
    #[arg(long)]
    constants: Option<PathBuf>,
    /// Household catalog used when no saved state exists yet.
    #[arg(long)]
    seed_file: Option<PathBuf>,
    /// Override a constant, e.g. `--set spin_duration_ms=2000`. Repeatable.
    #[arg(long = "set", value_name = "KEY=VALUE")]
    overrides: Vec<String>,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long, default_value = "http://localhost:5173")]
    cors_origin: String,
}

fn build_state(args: &Args) -> Result<AppState> {
    let mut constants = load_constants(args.constants.as_deref())?;
    let overrides = args
        .overrides
        .iter()
        .map(|arg| parse_override(arg))
        .collect::<Result<HashMap<_, _>>>()?;
    apply_overrides(&mut constants, &overrides)?;

    let slot = FileSlot::new(&args.data_dir, &constants.storage_key);
    tracing::info!(path = %slot.path().display(), "household state");
    let seed_state = match &args.seed_file {
        Some(path) => load_seed(path)?,
        None => default_seed()?,
    };
    let store = Store::open(Box::new(slot), Box::new(LocalClock), seed_state);

    let seed = args.seed.unwrap_or_else(rand::random);
    let (event_tx, _) = tokio::sync::broadcast::channel(256);
    let controller = Controller::new(
        store,
        constants,
        ChaCha8Rng::seed_from_u64(seed),
        BroadcastSurface::new(event_tx.clone()),
    );
    Ok(AppState {
        controller: Arc::new(Mutex::new(controller)),
        event_tx,
        seed,
        started: Instant::now(),
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();
    let app_state = build_state(&args)?;
    let router = routes::make_router_with_cors(app_state.clone(), &args.cors_origin)
        .with_context(|| format!("invalid CORS origin '{}'", args.cors_origin))?;

    tokio::spawn(frame_loop::run_frame_loop(app_state.clone()));

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!(%addr, seed = app_state.seed, "dinner_daemon listening");
    axum::serve(listener, router).await.context("serving HTTP")?;
    Ok(())
}
