use url::Url;

use crate::contract::ValidationError;

/// Where a lifecycle response is delivered: the pieces of the presigned
/// `ResponseURL` that the PUT request needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackTarget {
    pub host: String,
    pub path: String,
    pub query: String,
}

impl CallbackTarget {
    /// Path plus query, as sent on the request line.
    pub fn request_target(&self) -> String {
        if self.query.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{}", self.path, self.query)
        }
    }

    /// Always HTTPS, regardless of the scheme the URL arrived with.
    pub fn https_url(&self) -> String {
        format!("https://{}{}", self.host, self.request_target())
    }
}

pub fn parse_callback_url(raw: &str) -> Result<CallbackTarget, ValidationError> {
    let url = Url::parse(raw.trim())
        .map_err(|error| ValidationError::new(format!("Invalid ResponseURL '{raw}': {error}")))?;

    let host = url
        .host_str()
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ValidationError::new(format!("ResponseURL '{raw}' has no host")))?;

    Ok(CallbackTarget {
        host: host.to_string(),
        path: url.path().to_string(),
        query: url.query().unwrap_or_default().to_string(),
    })
}
