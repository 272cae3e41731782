use log::{error, info};

/// Sink for the request log written by the router's logging middleware.
pub trait RequestLogger: Send + Sync {
    fn info(&self, message: &str);
    fn error(&self, message: &str);
}

/// Discards request lines; errors still reach the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogger;

impl RequestLogger for NoopLogger {
    fn info(&self, _message: &str) {}

    fn error(&self, message: &str) {
        error!("{message}");
    }
}

/// Forwards every request line to the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogFacade;

impl RequestLogger for LogFacade {
    fn info(&self, message: &str) {
        info!("{message}");
    }

    fn error(&self, message: &str) {
        error!("{message}");
    }
}
