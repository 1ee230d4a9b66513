//! Webhook subscription model and health derivation

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Allowed retry budget range
pub const MAX_RETRIES_LIMIT: i32 = 10;

/// Derived delivery health of a subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionHealth {
    /// Deactivated (manually or by exhausting retries)
    Disabled,
    /// At least one delivery currently failing
    Retrying,
    /// A failure was recorded within the past 24h
    Warning,
    /// No successful delivery within the past 24h
    Inactive,
    Healthy,
}

/// Webhook subscription entity
///
/// `secret` signs outbound payloads; it is returned to the caller exactly
/// once, on creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookSubscription {
    pub id: i64,
    pub url: String,
    /// Subscribed event names (see [`crate::event::EventType`])
    pub events: Vec<String>,
    #[serde(skip_serializing)]
    pub secret: String,
    pub is_active: bool,
    pub retry_count: i32,
    pub max_retries: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_success_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_failure_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_failure_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl WebhookSubscription {
    /// Derive the health status at `now`, most severe condition first
    pub fn health(&self, now: DateTime<Utc>) -> SubscriptionHealth {
        if !self.is_active {
            return SubscriptionHealth::Disabled;
        }
        if self.retry_count > 0 {
            return SubscriptionHealth::Retrying;
        }
        if let Some(failed) = self.last_failure_at
            && now - failed < Duration::hours(24)
        {
            return SubscriptionHealth::Warning;
        }
        match self.last_success_at {
            Some(ok) if now - ok < Duration::hours(24) => SubscriptionHealth::Healthy,
            _ => SubscriptionHealth::Inactive,
        }
    }
}

/// Create subscription payload
#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionCreate {
    pub url: String,
    pub events: Vec<String>,
    #[serde(default = "default_max_retries")]
    pub max_retries: i32,
}

fn default_max_retries() -> i32 {
    5
}

/// Update subscription payload
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubscriptionUpdate {
    pub url: Option<String>,
    pub events: Option<Vec<String>>,
    pub max_retries: Option<i32>,
    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sub() -> WebhookSubscription {
        WebhookSubscription {
            id: 1,
            url: "https://example.com/hook".into(),
            events: vec!["booking.created".into()],
            secret: "0".repeat(64),
            is_active: true,
            retry_count: 0,
            max_retries: 5,
            last_success_at: None,
            last_failure_at: None,
            last_failure_reason: None,
            created_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_disabled_wins() {
        let mut s = sub();
        s.is_active = false;
        s.retry_count = 3;
        s.last_success_at = Some(now() - Duration::hours(1));
        assert_eq!(s.health(now()), SubscriptionHealth::Disabled);
    }

    #[test]
    fn test_retrying_over_warning() {
        let mut s = sub();
        s.retry_count = 2;
        s.last_failure_at = Some(now() - Duration::hours(1));
        assert_eq!(s.health(now()), SubscriptionHealth::Retrying);
    }

    #[test]
    fn test_warning_on_recent_failure() {
        let mut s = sub();
        s.last_failure_at = Some(now() - Duration::hours(3));
        s.last_success_at = Some(now() - Duration::hours(1));
        assert_eq!(s.health(now()), SubscriptionHealth::Warning);
    }

    #[test]
    fn test_inactive_without_recent_success() {
        let mut s = sub();
        assert_eq!(s.health(now()), SubscriptionHealth::Inactive);

        s.last_success_at = Some(now() - Duration::hours(25));
        assert_eq!(s.health(now()), SubscriptionHealth::Inactive);
    }

    #[test]
    fn test_healthy() {
        let mut s = sub();
        s.last_success_at = Some(now() - Duration::hours(2));
        assert_eq!(s.health(now()), SubscriptionHealth::Healthy);

        // Old failures do not taint a healthy subscription
        s.last_failure_at = Some(now() - Duration::hours(30));
        assert_eq!(s.health(now()), SubscriptionHealth::Healthy);
    }

    #[test]
    fn test_secret_never_serialized() {
        let json = serde_json::to_string(&sub()).unwrap();
        assert!(!json.contains("secret"));
        assert!(!json.contains(&"0".repeat(64)));
    }
}
