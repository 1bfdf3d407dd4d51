//! Handler configuration read from the event's `ResourceProperties`.
//!
//! The custom resource has no environment-level configuration: everything a
//! stack author can tune travels with the event itself.

use serde_json::Value;

use crate::contract::ResourceProperties;

pub const LOG_LEVEL_PROPERTY: &str = "loglevel";
pub const CLIENT_LOG_LEVEL_PROPERTY: &str = "botolevel";
pub const REGISTRY_NAMES_PROPERTY: &str = "RegistryNames";

/// Logical registry names cleaned up on Delete, in order, when the event does
/// not name its own list.
pub const DEFAULT_REGISTRY_PROPERTY_KEYS: [&str; 5] = [
    "AWXTaskRegistry",
    "AWXWebRegistry",
    "MemcachedRegistry",
    "RabbitMQRegistry",
    "SidecarRegistry",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Debug,
    Info,
    Warn,
    Error,
}

impl Verbosity {
    /// Accepts the level names stack templates already use (`warning`,
    /// `critical`, ...), case-insensitively.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "debug" | "trace" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "warn" | "warning" => Some(Self::Warn),
            "error" | "critical" | "fatal" => Some(Self::Error),
            _ => None,
        }
    }

    pub fn as_directive(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogLevels {
    /// Verbosity of the handler's own logging.
    pub handler: Verbosity,
    /// Verbosity of the AWS SDK and HTTP client stack.
    pub service_clients: Verbosity,
}

impl Default for LogLevels {
    fn default() -> Self {
        Self {
            handler: Verbosity::Warn,
            service_clients: Verbosity::Error,
        }
    }
}

impl LogLevels {
    pub fn from_properties(properties: &ResourceProperties) -> Self {
        let defaults = Self::default();
        Self {
            handler: resolve_level(
                properties.get(LOG_LEVEL_PROPERTY),
                defaults.handler,
                Verbosity::Info,
            ),
            service_clients: resolve_level(
                properties.get(CLIENT_LOG_LEVEL_PROPERTY),
                defaults.service_clients,
                Verbosity::Error,
            ),
        }
    }

    /// Reads the levels straight from an undecoded event so that even an
    /// event that fails to deserialize is logged at the requested verbosity.
    pub fn from_raw_event(event: &Value) -> Self {
        match event.get("ResourceProperties").and_then(Value::as_object) {
            Some(object) => Self::from_properties(
                &object
                    .iter()
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect(),
            ),
            None => Self::default(),
        }
    }
}

// Absent or blank uses the default; present but unrecognized uses the fallback.
fn resolve_level(value: Option<&Value>, default: Verbosity, fallback: Verbosity) -> Verbosity {
    match value.and_then(Value::as_str).map(str::trim) {
        None | Some("") => default,
        Some(name) => Verbosity::parse(name).unwrap_or(fallback),
    }
}

/// Logical registry names whose repositories are purged on Delete.
pub fn registry_property_keys(properties: &ResourceProperties) -> Vec<String> {
    let configured: Vec<String> = match properties.get(REGISTRY_NAMES_PROPERTY) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect(),
        Some(Value::String(list)) => list
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    };

    if configured.is_empty() {
        DEFAULT_REGISTRY_PROPERTY_KEYS
            .iter()
            .map(|name| (*name).to_string())
            .collect()
    } else {
        configured
    }
}
