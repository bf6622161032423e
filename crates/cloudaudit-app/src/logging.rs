/// Install the global `tracing` subscriber, writing to stderr.
///
/// `verbose` lowers the default level to `debug`, `quiet` raises it to `error`. `RUST_LOG`
/// overrides both. Fails if a subscriber is already installed.
pub fn init_tracing(verbose: bool, quiet: bool, json_output: bool) -> anyhow::Result<()> {
    use tracing_subscriber::{EnvFilter, fmt};

    let default_level = if verbose {
        "debug"
    } else if quiet {
        "error"
    } else {
        "warn"
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let result = if json_output {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .with_target(true)
            .try_init()
    } else {
        fmt()
            .compact()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init()
    };

    result.map_err(|e| anyhow::anyhow!("initialize tracing: {e}"))
}
