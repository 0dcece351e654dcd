use anyhow::{Context, Result};
use retail_clean::{config::Config, pipeline};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    // ─── 1) init logging (stderr; stdout carries the run report) ─────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    // ─── 2) resolve paths ────────────────────────────────────────────
    let config = Config::from_env().context("loading configuration")?;
    info!(
        raw = %config.raw_path.display(),
        clean = %config.clean_path.display(),
        "startup"
    );

    // ─── 3) load → clean → write ─────────────────────────────────────
    let summary = pipeline::run(&config)?;
    info!(
        initial_rows = summary.initial_shape.0,
        cleaned_rows = summary.cleaned_shape.0,
        "all done"
    );
    Ok(())
}
