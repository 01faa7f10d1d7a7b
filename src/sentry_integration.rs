use std::fmt::Display;

use sentry::{ClientInitGuard, ClientOptions, Level};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SentryConfig {
    pub dsn: String,
}

/// Starts reporting to Sentry. Keep the guard alive for the lifetime of the process.
pub fn init(config: Option<&SentryConfig>) -> Option<ClientInitGuard> {
    config.map(|config| {
        info!("Initializing Sentry error reporting");
        sentry::init((
            config.dsn.as_str(),
            ClientOptions {
                release: sentry::release_name!(),
                ..Default::default()
            },
        ))
    })
}

/// Logs the error and sends it to Sentry. Reporting is a no-op without `init`.
pub fn log_and_capture_error<E: Display>(error: E) {
    error!("{}", error);
    sentry::capture_message(&error.to_string(), Level::Error);
}
