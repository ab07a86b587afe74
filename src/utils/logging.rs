use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};
use std::env;
use std::fs;

/// Names a file that receives a plain-text copy of the log
pub const LOG_FILE_ENV: &str = "TABLETOP_LOG_FILE";

fn default_filter(log_level: &str) -> EnvFilter {
    let mut filter = EnvFilter::new(log_level);
    if let Ok(directive) = "tabletop_sim=debug".parse() {
        filter = filter.add_directive(directive);
    }
    // rapier is chatty at debug level
    if let Ok(directive) = "rapier3d=warn".parse() {
        filter = filter.add_directive(directive);
    }
    filter
}

/// Initialize logging: console always, plus a file layer when `TABLETOP_LOG_FILE` is set
pub fn init_logging() {
    let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let enable_backtrace = env::var("RUST_BACKTRACE").unwrap_or_else(|_| "0".to_string()) == "1";

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(&log_level));

    let log_path = env::var(LOG_FILE_ENV).ok();
    let file_layer = log_path.as_ref().and_then(|path| match fs::File::create(path) {
        Ok(file) => Some(
            fmt::layer()
                .with_writer(std::sync::Mutex::new(file))
                .with_span_events(FmtSpan::CLOSE)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_ansi(false) // No ANSI codes in file
                .boxed(),
        ),
        Err(e) => {
            eprintln!("Warning: Failed to create log file {}: {}", path, e);
            None
        }
    });

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer()
            .with_span_events(FmtSpan::CLOSE)
            .with_target(true)
            .with_thread_names(true)
            .with_ansi(true)
        )
        .with(file_layer);

    if subscriber.try_init().is_err() {
        // Already installed, e.g. by an embedding application
        return;
    }

    std::panic::set_hook(Box::new(move |panic_info| {
        tracing::error!("Panic occurred: {}", panic_info);

        if let Some(location) = panic_info.location() {
            tracing::error!(
                "Panic location: {}:{}:{}",
                location.file(),
                location.line(),
                location.column()
            );
        }

        if enable_backtrace {
            tracing::error!("Backtrace:\n{:?}", std::backtrace::Backtrace::capture());
        }
    }));

    tracing::info!("Logging initialized with level: {}", log_level);
    if let Some(path) = log_path {
        tracing::info!("File logging enabled: {}", path);
    }
}

/// Log system information for debugging
pub fn log_system_info() {
    tracing::info!("=== System Information ===");
    tracing::info!("OS: {}", std::env::consts::OS);
    tracing::info!("Architecture: {}", std::env::consts::ARCH);
    tracing::info!("Version: {}", env!("CARGO_PKG_VERSION"));
    tracing::info!("========================");
}
