//! Structured JSON logging with per-invocation verbosity.
//!
//! Stack authors set `loglevel` and `botolevel` on the resource, so the filter
//! sits behind a reload layer and is swapped at the start of each invocation.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, reload, EnvFilter, Registry};

use crate::runtime::settings::LogLevels;

/// Target prefixes of the AWS SDK and HTTP client stack, governed by
/// `botolevel`. Filter targets match by prefix, so `aws` covers every
/// `aws_sdk_*`, `aws_smithy_*`, `aws_sigv4` and credential crate.
pub const SERVICE_CLIENT_TARGETS: [&str; 6] =
    ["aws", "h2", "hyper", "reqwest", "rustls", "tower"];

pub fn filter_directives(levels: &LogLevels) -> String {
    let client_level = levels.service_clients.as_directive();
    let mut directives = vec![levels.handler.as_directive().to_string()];
    directives.extend(
        SERVICE_CLIENT_TARGETS
            .iter()
            .map(|target| format!("{target}={client_level}")),
    );
    directives.join(",")
}

pub struct LogLevelControl {
    handle: reload::Handle<EnvFilter, Registry>,
}

impl LogLevelControl {
    pub fn apply(&self, levels: &LogLevels) -> Result<(), String> {
        self.handle
            .reload(EnvFilter::new(filter_directives(levels)))
            .map_err(|error| format!("failed to apply log levels: {error}"))
    }
}

/// Installs the global subscriber. Call once, from the binary's `main`.
pub fn init_logging() -> LogLevelControl {
    let (filter, handle) =
        reload::Layer::new(EnvFilter::new(filter_directives(&LogLevels::default())));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().with_current_span(true))
        .init();

    LogLevelControl { handle }
}
