use anyhow::Context;
use tracing_subscriber::EnvFilter;

/// Initializes the global tracing subscriber. The default level is `warn`
/// so interactive output stays clean; `--verbose` raises it to `debug` and
/// turns timestamps back on. `RUST_LOG` overrides both.
pub fn init(verbose: bool) -> anyhow::Result<()> {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback))
        .with_context(|| format!("invalid log filter directive: {fallback}"))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact();

    if verbose {
        builder.init();
    } else {
        builder.without_time().init();
    }

    Ok(())
}
