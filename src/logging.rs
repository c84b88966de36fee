//! Subscriber setup and per-request spans
//!
//! Every gateway request runs inside a `request` span, so anchor and store
//! events carry the method and path that caused them. In JSON mode the
//! span fields land next to the event fields on one flat object.

use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;
use tracing::Instrument;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::AppConfig;

/// Crates that are chatty at `info`/`debug` and only matter when they fail.
const QUIET_CRATES: &[&str] = &["sqlx", "hyper", "hyper_util", "h2", "reqwest", "rustls"];

/// `EnvFilter` directives for `config`. `RUST_LOG` still wins when set.
pub fn filter_directives(config: &AppConfig) -> String {
    let mut directives = vec![config.log_level.clone()];
    directives.extend(QUIET_CRATES.iter().map(|c| format!("{}=warn", c)));
    directives.join(",")
}

/// Install the global subscriber. Keep the guard alive for the process lifetime
/// or buffered file output is lost.
pub fn init_logging(config: &AppConfig) -> WorkerGuard {
    let file_appender = match config.rotation.as_str() {
        "hourly" => tracing_appender::rolling::hourly(&config.log_dir, &config.log_file),
        "daily" => tracing_appender::rolling::daily(&config.log_dir, &config.log_file),
        _ => tracing_appender::rolling::never(&config.log_dir, &config.log_file),
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(config)));

    let registry = tracing_subscriber::registry().with(filter);

    if config.use_json {
        // One flat object per event: transfer_id, sep6_id, etc. at top level
        let file_layer = fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(true)
            .with_span_list(false)
            .with_target(true)
            .with_writer(non_blocking)
            .with_ansi(false);
        registry.with(file_layer).init();
    } else {
        let file_layer = fmt::layer()
            .with_target(false)
            .with_writer(non_blocking)
            .with_ansi(false);
        let stdout_layer = fmt::layer().with_target(false).with_ansi(true);
        registry.with(file_layer).with(stdout_layer).init();
    }

    guard
}

/// Gateway middleware: wrap the request in a span and log its outcome.
pub async fn trace_request(request: Request, next: Next) -> Response {
    let span = tracing::info_span!(
        "request",
        method = %request.method(),
        path = %request.uri().path(),
    );
    let started = Instant::now();

    async move {
        let response = next.run(request).await;
        let status = response.status().as_u16();
        let elapsed_ms = started.elapsed().as_millis() as u64;
        if status >= 500 {
            tracing::warn!(status, elapsed_ms, "Request finished");
        } else {
            tracing::debug!(status, elapsed_ms, "Request finished");
        }
        response
    }
    .instrument(span)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(level: &str) -> AppConfig {
        let mut config = AppConfig::from_yaml(
            r#"
log_level: "info"
log_dir: "./logs"
log_file: "anchor_remit.log"
use_json: true
rotation: "daily"
gateway:
  host: "127.0.0.1"
  port: 8080
"#,
        )
        .unwrap();
        config.log_level = level.to_string();
        config
    }

    #[test]
    fn test_filter_directives_quiet_dependencies() {
        let directives = filter_directives(&config("debug"));
        assert!(directives.starts_with("debug,"));
        for quiet in ["sqlx=warn", "hyper=warn", "reqwest=warn"] {
            assert!(directives.split(',').any(|d| d == quiet), "{}", quiet);
        }
        assert!(EnvFilter::try_new(&directives).is_ok());
    }

    #[test]
    fn test_filter_directives_keep_module_levels() {
        let directives = filter_directives(&config("info,anchor_remit::anchor=trace"));
        assert!(directives.starts_with("info,anchor_remit::anchor=trace,"));
        assert!(EnvFilter::try_new(&directives).is_ok());
    }
}
