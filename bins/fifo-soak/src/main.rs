use anyhow::Context;
use fifo_config::SoakConfig;
use fifo_sim::{AsyncFifo, StreamSink, StreamSource, run_stream};
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG: &str = "fifo-soak.toml";

fn main() -> anyhow::Result<()> {
    let (path, explicit) = match std::env::args().nth(1) {
        Some(path) => (path, true),
        None => (DEFAULT_CONFIG.to_owned(), false),
    };
    let found = Path::new(&path).exists();
    if explicit && !found {
        anyhow::bail!("config file '{path}' not found");
    }
    let cfg = if found {
        SoakConfig::load(&path)?
    } else {
        SoakConfig::default()
    };

    let filter = EnvFilter::try_new(&cfg.log_level)
        .with_context(|| format!("bad log_level '{}'", cfg.log_level))?;
    tracing_subscriber::fmt().with_env_filter(filter).init();
    if !found {
        warn!(path = %path, "config not found, using defaults");
    }

    let params = cfg.controller_params()?;
    let mut fifo = AsyncFifo::<u32>::new(&params)?;
    let mut clocks = cfg.clocks()?;
    let mut source = StreamSource::new(
        (0..cfg.words).map(|i| i.wrapping_mul(2_654_435_761)),
        cfg.write_pattern()?,
    );
    let mut sink = StreamSink::new(cfg.read_mode, cfg.read_pattern()?);

    info!(
        depth = params.depth,
        slots = fifo.controller().geometry().slots(),
        read_mode = ?cfg.read_mode,
        crossing = ?cfg.crossing,
        words = cfg.words,
        "FIFO-SOAK: starting"
    );

    let started = Instant::now();
    let report = run_stream(&mut fifo, &mut clocks, &mut source, &mut sink, cfg.max_instants)
        .context("soak run failed")?;
    let elapsed = started.elapsed();

    info!(
        words = report.words,
        instants = report.instants,
        sim_time_ns = report.end_time_ps / 1000,
        acks = report.acks,
        blocked_writes = report.blocked_writes,
        max_occupancy = report.max_occupancy,
        max_data_count = ?report.max_data_count,
        wall_ms = elapsed.as_millis() as u64,
        "FIFO-SOAK: passed"
    );
    info!(snapshot = ?fifo.controller().snapshot(), "final state");
    Ok(())
}
