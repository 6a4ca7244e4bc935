use tracing_subscriber::EnvFilter;

/// Install a stderr subscriber. `RUST_LOG` wins; otherwise `-v` selects debug
/// and `-vv` trace, with info as the default.
pub fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
