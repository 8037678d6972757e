//! Blocking JSON-over-HTTP with retry and exponential backoff.
//!
//! Shared by the remote embedding providers and the OpenAI answer
//! synthesizer.
//!
//! - HTTP 429 (rate limited) and 5xx (server error) → retry
//! - HTTP 4xx (client error, not 429) → fail immediately
//! - Network errors → retry
//! - Backoff: 1s, 2s, 4s, 8s, 16s, 32s (capped at 2^5)

use anyhow::{bail, Result};
use reqwest::blocking::Client;
use std::time::Duration;
use tracing::{debug, warn};

/// Build a blocking client with a per-request timeout.
pub(crate) fn client(timeout_secs: u64) -> Result<Client> {
    Ok(Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()?)
}

/// Delay before retry number `attempt` (1-based).
pub(crate) fn backoff(attempt: u32) -> Duration {
    Duration::from_secs(1 << (attempt.saturating_sub(1)).min(5))
}

/// POST `body` to `url` and return the parsed JSON response.
///
/// `service` names the remote end in error messages (e.g. `"OpenAI API"`).
pub(crate) fn post_json_with_retry(
    client: &Client,
    url: &str,
    bearer: Option<&str>,
    body: &serde_json::Value,
    max_retries: u32,
    service: &str,
) -> Result<serde_json::Value> {
    let mut last_err = None;

    for attempt in 0..=max_retries {
        if attempt > 0 {
            let delay = backoff(attempt);
            debug!(service, attempt, ?delay, "retrying request");
            std::thread::sleep(delay);
        }

        let mut request = client
            .post(url)
            .header("Content-Type", "application/json")
            .json(body);
        if let Some(token) = bearer {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        match request.send() {
            Ok(response) => {
                let status = response.status();

                if status.is_success() {
                    return Ok(response.json()?);
                }

                let body_text = response.text().unwrap_or_default();
                if status.as_u16() == 429 || status.is_server_error() {
                    warn!(service, %status, "transient error, will retry");
                    last_err = Some(anyhow::anyhow!("{} error {}: {}", service, status, body_text));
                    continue;
                }

                bail!("{} error {}: {}", service, status, body_text);
            }
            Err(e) => {
                warn!(service, error = %e, "request failed, will retry");
                last_err = Some(anyhow::anyhow!("{} connection error ({}): {}", service, url, e));
            }
        }
    }

    Err(last_err.unwrap_or_else(|| anyhow::anyhow!("{} request failed after retries", service)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_and_caps() {
        assert_eq!(backoff(1), Duration::from_secs(1));
        assert_eq!(backoff(2), Duration::from_secs(2));
        assert_eq!(backoff(4), Duration::from_secs(8));
        assert_eq!(backoff(6), Duration::from_secs(32));
        assert_eq!(backoff(20), Duration::from_secs(32));
    }
}
