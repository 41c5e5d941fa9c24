use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Installs the console subscriber. `RUST_LOG` overrides the default `bud_scrap=info`.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("bud_scrap=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .init();
}
