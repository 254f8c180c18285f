/*
 * cellspace
 *
 * Two grid-accelerated sketches sharing one spatial index:
 * - flocking: Reynolds boids steering by separation, alignment, cohesion,
 *   wander and wall avoidance
 * - crystal: diffusion-limited aggregation grown from a single seed
 *
 * Usage: cellspace [flocking|crystal] [config.ron]
 * Set RUST_LOG to change the log level (default `info`).
 */

use anyhow::Context;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cellspace::config::LaunchOptions;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("wgpu=error,naga=warn,cellspace=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .init();
}

fn main() -> anyhow::Result<()> {
    init_logging();

    let options = LaunchOptions::parse(std::env::args().skip(1)).context("invalid command line")?;
    let config = options.resolve().context("failed to load sketch configuration")?;
    tracing::info!("Starting {:?} sketch at {}x{}", config.sketch, config.window_width, config.window_height);

    cellspace::app::run(config).context("failed to start sketch")
}
