//! Shared HTTP plumbing for the bundled REST adapters.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::AcquisitionError;
use crate::normalize::entry_time;

/// Client-side timeout. The pipeline applies its own per-attempt deadline
/// on top of this.
const CLIENT_TIMEOUT: Duration = Duration::from_secs(30);

/// A reqwest client bound to one provider's base URL.
pub(crate) struct JsonClient {
    client: Client,
    provider: &'static str,
    base_url: String,
}

impl JsonClient {
    pub(crate) fn new(provider: &'static str, base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(CLIENT_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            provider,
            base_url: base_url.into(),
        }
    }

    /// GET `endpoint` and decode the JSON body.
    ///
    /// Query values are sent as given; callers add credentials themselves so
    /// they never reach the log line below.
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<T, AcquisitionError> {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!("{} request: {}", self.provider, endpoint);

        let response = self
            .client
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(|e| transport_error(self.provider, &e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("{} returned HTTP {} for {}", self.provider, status, endpoint);
            return Err(status_error(self.provider, status, &body));
        }

        let text = response
            .text()
            .await
            .map_err(|e| transport_error(self.provider, &e))?;

        serde_json::from_str(&text).map_err(|e| AcquisitionError::Parse {
            provider: self.provider.to_string(),
            message: format!("Failed to decode {} response: {}", endpoint, e),
            transient: false,
        })
    }
}

/// Map a non-success HTTP status.
pub(crate) fn status_error(provider: &str, status: StatusCode, body: &str) -> AcquisitionError {
    let provider = provider.to_string();
    let message = match body.trim() {
        "" => format!("HTTP {}", status),
        body => format!("HTTP {} - {}", status, truncate(body, 200)),
    };

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            AcquisitionError::Auth { provider, message }
        }
        StatusCode::TOO_MANY_REQUESTS => AcquisitionError::RemoteRateLimited { provider },
        s if s.is_server_error() => AcquisitionError::ServerError {
            provider,
            status: s.as_u16(),
        },
        _ => AcquisitionError::BadRequest { provider, message },
    }
}

/// Map a reqwest transport failure.
pub(crate) fn transport_error(provider: &str, error: &reqwest::Error) -> AcquisitionError {
    if error.is_timeout() {
        AcquisitionError::Timeout {
            provider: provider.to_string(),
        }
    } else if error.is_decode() {
        AcquisitionError::Parse {
            provider: provider.to_string(),
            message: format!("Failed to read response: {}", error),
            transient: false,
        }
    } else {
        AcquisitionError::Network {
            provider: provider.to_string(),
            message: format!("Request failed: {}", error),
        }
    }
}

/// The forecast entry whose timestamp is closest to `at_time`. Entries
/// without a readable timestamp are skipped.
pub(crate) fn closest_entry(entries: Vec<Value>, at_time: DateTime<Utc>) -> Option<Value> {
    entries
        .into_iter()
        .filter_map(|entry| entry_time(&entry).map(|time| (time, entry)))
        .min_by_key(|(time, _)| (*time - at_time).num_seconds().unsigned_abs())
        .map(|(_, entry)| entry)
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((index, _)) => format!("{}...", &text[..index]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::RetryClass;
    use serde_json::json;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (StatusCode::UNAUTHORIZED, RetryClass::NextProvider),
            (StatusCode::FORBIDDEN, RetryClass::NextProvider),
            (StatusCode::NOT_FOUND, RetryClass::NextProvider),
            (StatusCode::TOO_MANY_REQUESTS, RetryClass::WithBackoff),
            (StatusCode::BAD_GATEWAY, RetryClass::WithBackoff),
            (StatusCode::SERVICE_UNAVAILABLE, RetryClass::WithBackoff),
        ];

        for (status, class) in cases {
            assert_eq!(status_error("openweather", status, "").retry_class(), class, "{}", status);
        }
    }

    #[test]
    fn test_auth_statuses_are_auth_errors() {
        let error = status_error("accuweather", StatusCode::UNAUTHORIZED, "{\"Code\":\"Unauthorized\"}");
        match error {
            AcquisitionError::Auth { provider, message } => {
                assert_eq!(provider, "accuweather");
                assert!(message.contains("401"));
                assert!(message.contains("Unauthorized"));
            }
            other => panic!("expected Auth, got {:?}", other),
        }
    }

    #[test]
    fn test_server_error_keeps_status() {
        let error = status_error("openweather", StatusCode::INTERNAL_SERVER_ERROR, "oops");
        assert!(matches!(error, AcquisitionError::ServerError { status: 500, .. }));
    }

    #[test]
    fn test_closest_entry() {
        let at_time = DateTime::parse_from_rfc3339("2024-12-01T18:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let entries = vec![
            json!({ "dt": at_time.timestamp() - 3 * 3600, "tag": "early" }),
            json!({ "dt": at_time.timestamp() + 3600, "tag": "close" }),
            json!({ "tag": "no time" }),
            json!({ "dt": at_time.timestamp() + 4 * 3600, "tag": "late" }),
        ];

        let closest = closest_entry(entries, at_time).unwrap();
        assert_eq!(closest["tag"], "close");
        assert!(closest_entry(vec![json!({ "tag": "no time" })], at_time).is_none());
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdef", 3), "abc...");
    }
}
