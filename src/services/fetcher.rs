use std::time::Duration;

use anyhow::Context;
use reqwest::{header::HeaderMap, Client, StatusCode};
use url::Url;

use crate::configuration::FetchSettings;

use super::LookupError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_retries: 5,
            initial_delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    pub fn attempts(&self) -> u32 {
        self.max_retries.max(1)
    }

    /// Pause taken after the `failed`-th failed attempt (1-based): `d * 2^(failed-1)`.
    pub fn delay_after(&self, failed: u32) -> Duration {
        let exponent = failed.saturating_sub(1).min(31);
        self.initial_delay.saturating_mul(1 << exponent)
    }

    pub fn schedule(&self) -> Vec<Duration> {
        (1..=self.attempts()).map(|n| self.delay_after(n)).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Success(String),
    PermanentFailure { last_status: Option<StatusCode> },
}

#[derive(Debug, Clone)]
pub struct FetchReport {
    pub url: String,
    pub outcome: FetchOutcome,
    pub attempts: u32,
    pub pauses: Vec<Duration>,
}

impl FetchReport {
    pub fn into_body(self) -> Result<String, LookupError> {
        match self.outcome {
            FetchOutcome::Success(body) => Ok(body),
            FetchOutcome::PermanentFailure { last_status } => Err(LookupError::Network {
                url: self.url,
                attempts: self.attempts,
                status: last_status,
            }),
        }
    }
}

/// GET with exponential backoff. Only a 200 counts as success; every other
/// status and every transport error is retried until the policy runs out.
#[derive(Clone)]
pub struct Fetcher {
    client: Client,
    policy: RetryPolicy,
}

impl Fetcher {
    pub fn new(client: Client, policy: RetryPolicy) -> Self {
        Fetcher { client, policy }
    }

    pub fn from_settings(settings: &FetchSettings) -> anyhow::Result<Self> {
        let client = Client::builder()
            .cookie_store(true)
            .timeout(settings.timeout())
            .build()
            .context("Failed to build http client")?;

        Ok(Fetcher::new(
            client,
            RetryPolicy {
                max_retries: settings.max_retries,
                initial_delay: settings.initial_delay(),
            },
        ))
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// GETs `url` until it answers 200 or the policy runs out of attempts.
    /// A pause follows every failed attempt, the final one included, so a
    /// permanent failure still costs the full `schedule()` before returning.
    pub async fn fetch(&self, url: &Url, headers: HeaderMap) -> FetchReport {
        let mut pauses = vec![];
        let mut last_status = None;
        let attempts = self.policy.attempts();

        for attempt in 1..=attempts {
            match self.client.get(url.clone()).headers(headers.clone()).send().await {
                Ok(res) if res.status() == StatusCode::OK => match res.text().await {
                    Ok(body) => {
                        return FetchReport {
                            url: url.to_string(),
                            outcome: FetchOutcome::Success(body),
                            attempts: attempt,
                            pauses,
                        };
                    }
                    Err(e) => {
                        log::error!("Failed to read body from {}. Error: {:?}", url, e);
                        last_status = Some(StatusCode::OK);
                    }
                },
                Ok(res) => {
                    log::warn!(
                        "Request to {} returned status {} (attempt {}/{})",
                        url,
                        res.status(),
                        attempt,
                        attempts
                    );
                    last_status = Some(res.status());
                }
                Err(e) => {
                    log::warn!(
                        "No response from {} (attempt {}/{}), error: {:?}",
                        url,
                        attempt,
                        attempts,
                        e
                    );
                }
            }

            let delay = self.policy.delay_after(attempt);
            pauses.push(delay);
            tokio::time::sleep(delay).await;
        }

        log::error!("Giving up on {} after {} attempts", url, attempts);

        FetchReport {
            url: url.to_string(),
            outcome: FetchOutcome::PermanentFailure { last_status },
            attempts,
            pauses,
        }
    }
}
