use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Compact stderr logging. `RUST_LOG` overrides the default filter.
pub fn init(verbose: bool) {
    let default = if verbose {
        "weather_alert_core=debug,weather_alert_cli=debug,info"
    } else {
        "weather_alert_core=info,weather_alert_cli=info,warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}
