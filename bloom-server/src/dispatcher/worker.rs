//! Event delivery worker
//!
//! Consumes envelopes from the queue, fans each one out to every matching
//! subscription, and drives the per-subscription retry/health cycle.
//! Subscription health columns are written from here only.

use shared::EventEnvelope;
use shared::models::subscription::WebhookSubscription;
use sqlx::PgPool;
use tokio::sync::mpsc;

use super::sign;
use crate::db;

/// Outbound POST timeout
const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

/// Retry delay cap, seconds
const MAX_BACKOFF_SECS: u64 = 60;

const USER_AGENT: &str = concat!("bloom-server/", env!("CARGO_PKG_VERSION"));

/// Delay before the next attempt: `min(2^retry_count, 60)` seconds
pub fn backoff_delay(retry_count: i32) -> std::time::Duration {
    let exp = retry_count.clamp(0, 6) as u32;
    std::time::Duration::from_secs((1u64 << exp).min(MAX_BACKOFF_SECS))
}

/// Background event delivery worker
pub struct Dispatcher {
    pool: PgPool,
    client: reqwest::Client,
}

impl Dispatcher {
    pub fn new(pool: PgPool) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("reqwest client");
        Self { pool, client }
    }

    /// Run the worker (blocks until the queue closes)
    pub async fn run(self, mut rx: mpsc::Receiver<EventEnvelope>) {
        tracing::info!("Event dispatcher started");

        while let Some(envelope) = rx.recv().await {
            let body = match serde_json::to_vec(&envelope) {
                Ok(body) => body,
                Err(e) => {
                    tracing::error!(event = %envelope.event_type, "Envelope serialization failed: {e}");
                    continue;
                }
            };

            let subs = match db::subscriptions::list_active_for_event(
                &self.pool,
                envelope.event_type.as_str(),
            )
            .await
            {
                Ok(subs) => subs,
                Err(e) => {
                    tracing::error!(event = %envelope.event_type, "Subscription lookup failed: {e}");
                    continue;
                }
            };

            tracing::debug!(
                event = %envelope.event_type,
                subscribers = subs.len(),
                "Dispatching event"
            );

            for sub in subs {
                let pool = self.pool.clone();
                let client = self.client.clone();
                let body = body.clone();
                tokio::spawn(async move {
                    deliver(pool, client, sub, body).await;
                });
            }
        }

        tracing::info!("Event queue closed, dispatcher stopping");
    }
}

/// Deliver one payload to one subscriber, retrying with exponential
/// backoff until it succeeds or the subscription exhausts its budget.
async fn deliver(pool: PgPool, client: reqwest::Client, sub: WebhookSubscription, body: Vec<u8>) {
    loop {
        match post_once(&client, &sub.url, &sub.secret, &body).await {
            Ok(()) => {
                if let Err(e) = db::subscriptions::record_success(&pool, sub.id).await {
                    tracing::error!(subscription = sub.id, "Failed to record success: {e}");
                }
                tracing::debug!(subscription = sub.id, url = %sub.url, "Webhook delivered");
                return;
            }
            Err(reason) => {
                tracing::warn!(
                    subscription = sub.id,
                    url = %sub.url,
                    "Webhook delivery failed: {reason}"
                );

                let retry_count =
                    match db::subscriptions::record_failure(&pool, sub.id, &reason).await {
                        Ok((retry_count, is_active)) => {
                            if !is_active {
                                tracing::warn!(
                                    subscription = sub.id,
                                    retry_count,
                                    "Subscription disabled after exhausting retries"
                                );
                                return;
                            }
                            retry_count
                        }
                        Err(e) => {
                            tracing::error!(subscription = sub.id, "Failed to record failure: {e}");
                            return;
                        }
                    };

                tokio::time::sleep(backoff_delay(retry_count)).await;
            }
        }
    }
}

/// One signed POST; success is any 2xx response
async fn post_once(
    client: &reqwest::Client,
    url: &str,
    secret: &str,
    body: &[u8],
) -> Result<(), String> {
    let signature = sign::signature(secret, body);
    let timestamp = chrono::Utc::now().timestamp();

    let response = client
        .post(url)
        .header(http::header::CONTENT_TYPE, "application/json")
        .header("X-Signature", signature)
        .header("X-Timestamp", timestamp.to_string())
        .header(http::header::USER_AGENT, USER_AGENT)
        .body(body.to_vec())
        .send()
        .await
        .map_err(|e| e.to_string())?;

    if response.status().is_success() {
        Ok(())
    } else {
        Err(format!("HTTP {}", response.status().as_u16()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_schedule() {
        assert_eq!(backoff_delay(0).as_secs(), 1);
        assert_eq!(backoff_delay(1).as_secs(), 2);
        assert_eq!(backoff_delay(2).as_secs(), 4);
        assert_eq!(backoff_delay(3).as_secs(), 8);
        assert_eq!(backoff_delay(5).as_secs(), 32);
    }

    #[test]
    fn test_backoff_caps_at_sixty() {
        assert_eq!(backoff_delay(6).as_secs(), 60);
        assert_eq!(backoff_delay(10).as_secs(), 60);
        assert_eq!(backoff_delay(i32::MAX).as_secs(), 60);
    }

    #[test]
    fn test_backoff_negative_is_sane() {
        assert_eq!(backoff_delay(-1).as_secs(), 1);
    }
}
