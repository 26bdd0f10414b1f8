use anyhow::{bail, Result};
use clap::Parser;
use eia860m::{
    config::Config,
    fetch::HttpSource,
    period::Period,
    pipeline::Pipeline,
    schema::Registry,
    write::write_parquet,
};
use std::path::PathBuf;
use tokio::time::Instant;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about = "Merge EIA-860M monthly generator snapshots into one table")]
struct Args {
    /// First snapshot, as YYYY-MM.
    #[arg(long)]
    start: Period,
    /// Last snapshot, inclusive. Defaults to `start`.
    #[arg(long)]
    end: Option<Period>,
    /// YAML run settings.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, default_value = "generators_eia860m.parquet")]
    out: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();

    let args = Args::parse();
    let end = args.end.unwrap_or(args.start);
    if end < args.start {
        bail!("--end {} is before --start {}", end, args.start);
    }

    // ─── 2) settings & layouts ───────────────────────────────────────
    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    let registry = match &config.registry_path {
        Some(path) => Registry::from_path(path)?,
        None => Registry::builtin()?,
    };
    info!(pages = registry.pages().count(), "layout registry loaded");

    // ─── 3) retrieve, extract, merge ─────────────────────────────────
    let started = Instant::now();
    let source = HttpSource::new(config.request_timeout())?;
    let periods = Period::range(args.start, end);
    let merged = Pipeline::new(source, registry, config).run(&periods).await?;
    info!(
        rows = merged.num_rows(),
        columns = merged.num_columns(),
        elapsed = ?started.elapsed(),
        "pipeline finished"
    );

    // ─── 4) write ────────────────────────────────────────────────────
    write_parquet(&merged, &args.out)?;
    Ok(())
}
