use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;
use tracing::{debug, error, info, warn, Level};

/// Middleware that logs each request with a level picked from the
/// response status: 2xx/3xx at INFO, 4xx at WARN, 5xx at ERROR.
pub async fn request_logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();

    let method = req.method().to_string();
    let uri = req.uri().to_string();
    let user_agent = req
        .headers()
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());

    debug!(
        method = %method,
        uri = %uri,
        user_agent = ?user_agent,
        "Incoming request"
    );

    let response = next.run(req).await;

    let duration = start.elapsed();
    let status = response.status();

    match status.as_u16() {
        200..=399 => {
            info!(
                method = %method,
                uri = %uri,
                status = %status.as_u16(),
                duration_ms = %duration.as_millis(),
                "Request completed"
            );
        }
        400..=499 => {
            warn!(
                method = %method,
                uri = %uri,
                status = %status.as_u16(),
                duration_ms = %duration.as_millis(),
                user_agent = ?user_agent,
                "Client error"
            );
        }
        500..=599 => {
            error!(
                method = %method,
                uri = %uri,
                status = %status.as_u16(),
                duration_ms = %duration.as_millis(),
                user_agent = ?user_agent,
                "Server error occurred"
            );
        }
        _ => {
            debug!(
                method = %method,
                uri = %uri,
                status = %status.as_u16(),
                duration_ms = %duration.as_millis(),
                "Request completed with unusual status"
            );
        }
    }

    response
}

/// Config log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Debug,
    Error,
}

impl LogLevel {
    pub fn to_tracing_level(&self) -> Level {
        match self {
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Error => Level::ERROR,
        }
    }

    pub fn to_filter_string(&self) -> String {
        match self {
            LogLevel::Info => "coopcredit=info,tower_http=info".to_string(),
            LogLevel::Debug => "coopcredit=debug,tower_http=debug".to_string(),
            LogLevel::Error => "coopcredit=error,tower_http=error".to_string(),
        }
    }
}

/// Initialize logging system with specified level. `RUST_LOG` wins when set.
pub fn init_logging(log_level: LogLevel) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_filter_string()));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_file(true)
                .with_line_number(true),
        )
        .init();

    info!("Logging initialized with level: {:?}", log_level);
}
