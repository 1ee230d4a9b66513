//! Store model — tenant venue with operating hours and quota settings

use chrono::{DateTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Opening hours for a single weekday, in the store's local time.
///
/// Wire shape is either `{"open": "HH:MM", "close": "HH:MM"}` or
/// `{"closed": true}`. A missing weekday entry also means closed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum DayHours {
    Open { open: String, close: String },
    Closed { closed: bool },
}

impl DayHours {
    /// The `(open, close)` pair if this day is open
    pub fn open_pair(&self) -> Option<(&str, &str)> {
        match self {
            DayHours::Open { open, close } => Some((open, close)),
            DayHours::Closed { .. } => None,
        }
    }
}

/// Weekly operating hours keyed by weekday, local to the store's zone
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OperatingHours {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monday: Option<DayHours>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tuesday: Option<DayHours>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wednesday: Option<DayHours>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thursday: Option<DayHours>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub friday: Option<DayHours>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saturday: Option<DayHours>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sunday: Option<DayHours>,
}

impl OperatingHours {
    /// Entry for a chrono weekday
    pub fn for_weekday(&self, weekday: Weekday) -> Option<&DayHours> {
        match weekday {
            Weekday::Mon => self.monday.as_ref(),
            Weekday::Tue => self.tuesday.as_ref(),
            Weekday::Wed => self.wednesday.as_ref(),
            Weekday::Thu => self.thursday.as_ref(),
            Weekday::Fri => self.friday.as_ref(),
            Weekday::Sat => self.saturday.as_ref(),
            Weekday::Sun => self.sunday.as_ref(),
        }
    }
}

/// Per-store quota and booking-policy settings
///
/// Persisted as a JSONB blob; keys not named here pass through untouched
/// (see [`merge_settings`]). Absent keys take the defaults below.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StoreSettings {
    /// Maximum non-terminal bookings per local day (unset = unlimited)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_daily_bookings: Option<i32>,
    /// Maximum simultaneously overlapping bookings (unset = unlimited)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_concurrent_bookings: Option<i32>,
    pub buffer_time_minutes: i32,
    pub max_advance_booking_days: i32,
    pub cancellation_deadline_hours: i32,
    pub allow_online_booking: bool,
    /// New bookings start as `pending` when true, `confirmed` when false
    pub require_approval: bool,
    /// Unrecognized keys, preserved verbatim
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            max_daily_bookings: None,
            max_concurrent_bookings: None,
            buffer_time_minutes: 15,
            max_advance_booking_days: 90,
            cancellation_deadline_hours: 24,
            allow_online_booking: true,
            require_approval: true,
            extra: serde_json::Map::new(),
        }
    }
}

/// Shallow-merge a settings patch into the current settings object.
///
/// Keys present in `patch` replace the current value; keys absent from
/// `patch` are preserved; an explicit JSON `null` clears the key back to
/// its default. Both arguments must be JSON objects.
pub fn merge_settings(current: &Value, patch: &Value) -> Value {
    let mut merged = current.as_object().cloned().unwrap_or_default();
    if let Some(patch) = patch.as_object() {
        for (key, value) in patch {
            if value.is_null() {
                merged.remove(key);
            } else {
                merged.insert(key.clone(), value.clone());
            }
        }
    }
    Value::Object(merged)
}

/// Store entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Store {
    pub id: i64,
    pub name: String,
    /// IANA timezone name, e.g. `Europe/Madrid`
    pub timezone: String,
    pub operating_hours: OperatingHours,
    pub settings: StoreSettings,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Create store payload
#[derive(Debug, Clone, Deserialize)]
pub struct StoreCreate {
    pub name: String,
    pub timezone: String,
    pub operating_hours: OperatingHours,
    #[serde(default)]
    pub settings: Option<Value>,
}

/// Update store payload
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreUpdate {
    pub name: Option<String>,
    pub timezone: Option<String>,
    pub operating_hours: Option<OperatingHours>,
    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_day_hours_deserialize() {
        let open: DayHours = serde_json::from_value(json!({"open": "09:00", "close": "17:00"})).unwrap();
        assert_eq!(open.open_pair(), Some(("09:00", "17:00")));

        let closed: DayHours = serde_json::from_value(json!({"closed": true})).unwrap();
        assert_eq!(closed.open_pair(), None);
    }

    #[test]
    fn test_missing_weekday_entry_means_closed() {
        let hours: OperatingHours =
            serde_json::from_value(json!({"monday": {"open": "09:00", "close": "17:00"}})).unwrap();
        assert!(hours.for_weekday(Weekday::Mon).is_some());
        assert!(hours.for_weekday(Weekday::Tue).is_none());
        assert!(hours.for_weekday(Weekday::Sun).is_none());
    }

    #[test]
    fn test_settings_defaults() {
        let s: StoreSettings = serde_json::from_value(json!({})).unwrap();
        assert_eq!(s.buffer_time_minutes, 15);
        assert_eq!(s.max_advance_booking_days, 90);
        assert_eq!(s.cancellation_deadline_hours, 24);
        assert!(s.allow_online_booking);
        assert!(s.require_approval);
        assert_eq!(s.max_daily_bookings, None);
    }

    #[test]
    fn test_settings_extra_keys_pass_through() {
        let s: StoreSettings =
            serde_json::from_value(json!({"max_daily_bookings": 5, "theme": "dark"})).unwrap();
        assert_eq!(s.max_daily_bookings, Some(5));
        assert_eq!(s.extra.get("theme").unwrap(), "dark");

        let back = serde_json::to_value(&s).unwrap();
        assert_eq!(back.get("theme").unwrap(), "dark");
    }

    #[test]
    fn test_merge_settings_replaces_and_preserves() {
        let current = json!({"max_daily_bookings": 5, "buffer_time_minutes": 30});
        let patch = json!({"max_daily_bookings": 8});
        let merged = merge_settings(&current, &patch);
        assert_eq!(merged.get("max_daily_bookings").unwrap(), 8);
        assert_eq!(merged.get("buffer_time_minutes").unwrap(), 30);
    }

    #[test]
    fn test_merge_settings_null_clears() {
        let current = json!({"max_daily_bookings": 5, "buffer_time_minutes": 30});
        let patch = json!({"max_daily_bookings": null});
        let merged = merge_settings(&current, &patch);
        assert!(merged.get("max_daily_bookings").is_none());

        // Cleared key falls back to its default on deserialization
        let s: StoreSettings = serde_json::from_value(merged).unwrap();
        assert_eq!(s.max_daily_bookings, None);
        assert_eq!(s.buffer_time_minutes, 30);
    }

    #[test]
    fn test_merge_settings_preserves_unknown_keys() {
        let current = json!({"theme": "dark"});
        let patch = json!({"max_concurrent_bookings": 3});
        let merged = merge_settings(&current, &patch);
        assert_eq!(merged.get("theme").unwrap(), "dark");
        assert_eq!(merged.get("max_concurrent_bookings").unwrap(), 3);
    }
}
