//! Tracing initialization and subscriber setup.

use super::file_writer::FileWriter;
use super::tracer;
use crate::infrastructure::paths;
use crate::Config;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::resource::Resource;
use std::sync::Arc;
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Installs the global tracing subscriber.
///
/// The subscriber filters with `RUST_LOG` when set, otherwise with
/// `config.trace_level` (default `info`), and fans out to two files in the data
/// directory:
///
/// - `galleria.log`: human-readable events from the `fmt` layer;
/// - `galleria-otlp.json`: finished spans, one JSON object per line.
///
/// Observability is optional: if the data directory cannot be created nothing
/// is installed. Only the first call in a process takes effect.
///
/// # Example
///
/// ```rust
/// use galleria::observability::init_tracing;
/// use galleria::Config;
///
/// let dir = tempfile::tempdir()?;
/// let config = Config {
///     trace_level: Some("debug".to_string()),
///     data_dir: Some(dir.path().to_path_buf()),
///     ..Config::default()
/// };
/// init_tracing(&config);
/// tracing::debug!("tracing is now active");
/// # Ok::<(), std::io::Error>(())
/// ```
pub fn init_tracing(config: &Config) {
    let level = config.trace_level.clone().unwrap_or_else(|| "info".to_string());

    let data_dir = config.data_dir();
    if std::fs::create_dir_all(&data_dir).is_err() {
        return;
    }

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level));

    let resource = Resource::new(vec![
        opentelemetry::KeyValue::new("service.name", "galleria"),
        opentelemetry::KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
    ]);

    let span_writer = Arc::new(FileWriter::new(paths::trace_file(&data_dir)));
    let provider = tracer::create_tracer_provider(span_writer, resource);
    let otel_layer = OpenTelemetryLayer::new(provider.tracer("galleria"));

    let log_writer = Arc::new(FileWriter::new(paths::log_file(&data_dir)));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(log_writer)
        .with_ansi(false)
        .with_thread_names(true)
        .with_target(false);

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .with(otel_layer);

    let _ = subscriber.try_init();
}
