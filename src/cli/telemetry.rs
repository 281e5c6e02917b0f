use anyhow::Result;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Registry};

/// Build the env filter: `RUST_LOG` wins, otherwise the CLI verbosity applies.
///
/// # Errors
///
/// Returns an error if a built-in directive fails to parse.
pub fn filter(verbosity_level: Level) -> Result<EnvFilter> {
    Ok(EnvFilter::builder()
        .with_default_directive(verbosity_level.into())
        .from_env_lossy()
        .add_directive("hyper=error".parse()?)
        .add_directive("reqwest=warn".parse()?))
}

/// Initialize logging to stderr so command output on stdout stays scriptable.
///
/// # Errors
///
/// Returns an error if the filter cannot be built or a global subscriber is already set.
pub fn init(verbosity_level: Option<Level>) -> Result<()> {
    let verbosity_level = verbosity_level.unwrap_or(Level::ERROR);

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true)
        .with_target(false);

    let subscriber = Registry::default()
        .with(fmt_layer)
        .with(filter(verbosity_level)?);

    tracing::subscriber::set_global_default(subscriber)?;

    Ok(())
}
