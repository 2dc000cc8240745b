use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Store chatter from the redis client stays at `warn` unless `RUST_LOG` asks.
const DEFAULT_FILTER: &str = "info,actix_web=info,redis=warn";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// JSON logs to stdout; `RUST_LOG` overrides the default filter.
///
/// Events carry the fields of the enclosing `request` span (request id and
/// tournament) but not the whole span stack, which keeps result submissions
/// greppable by tournament.
pub fn init_tracing() {
    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_ansi(false)
        .json()
        .with_current_span(true)
        .with_span_list(false);

    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt_layer)
        .init();
}

