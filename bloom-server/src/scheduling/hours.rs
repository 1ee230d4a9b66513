//! Store-zone time conversions and operating-hours policy
//!
//! All date/time → instant conversions happen here; the db layer only
//! ever sees UTC instants. Day-of-week is always computed in the store's
//! zone.

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::store::Store;

/// Parse a date string (YYYY-MM-DD)
pub fn parse_date(date: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("Invalid date format: {}", date)))
}

/// Parse a local time string (HH:MM)
pub fn parse_hhmm(time: &str) -> AppResult<NaiveTime> {
    NaiveTime::parse_from_str(time, "%H:%M")
        .map_err(|_| AppError::with_message(
            ErrorCode::InvalidOperatingHours,
            format!("Invalid time format: {}", time),
        ))
}

/// Resolve a store's IANA timezone
pub fn store_tz(store: &Store) -> AppResult<Tz> {
    store.timezone.parse::<Tz>().map_err(|_| {
        AppError::with_message(
            ErrorCode::InvalidTimezone,
            format!("Unknown timezone: {}", store.timezone),
        )
    })
}

/// Validate a timezone string without a store at hand
pub fn validate_timezone(tz: &str) -> AppResult<()> {
    tz.parse::<Tz>().map(|_| ()).map_err(|_| {
        AppError::with_message(ErrorCode::InvalidTimezone, format!("Unknown timezone: {tz}"))
    })
}

/// Local date + time → UTC instant.
///
/// Ambiguous local times (DST fall-back) resolve to the later instant;
/// nonexistent local times (spring-forward gap) fall back to the naive
/// UTC reading.
pub fn local_to_utc(date: NaiveDate, time: NaiveTime, tz: Tz) -> DateTime<Utc> {
    let naive = date.and_time(time);
    naive
        .and_local_timezone(tz)
        .latest()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&naive))
}

/// UTC bounds `[start, end)` of a local calendar day.
///
/// DST days are naturally 23 or 25 hours long.
pub fn day_bounds(date: NaiveDate, tz: Tz) -> (DateTime<Utc>, DateTime<Utc>) {
    let next = date.succ_opt().unwrap_or(date);
    (
        local_to_utc(date, NaiveTime::MIN, tz),
        local_to_utc(next, NaiveTime::MIN, tz),
    )
}

/// The local calendar date an instant falls on in the store's zone
pub fn local_date_of(instant: DateTime<Utc>, tz: Tz) -> NaiveDate {
    instant.with_timezone(&tz).date_naive()
}

/// Validate every open-day entry of a weekly schedule
pub fn validate_hours(hours: &shared::models::store::OperatingHours) -> AppResult<()> {
    use chrono::Weekday::*;
    for weekday in [Mon, Tue, Wed, Thu, Fri, Sat, Sun] {
        if let Some(entry) = hours.for_weekday(weekday)
            && let Some((open, close)) = entry.open_pair()
        {
            let open = parse_hhmm(open)?;
            let close = parse_hhmm(close)?;
            if close <= open {
                return Err(AppError::with_message(
                    ErrorCode::InvalidOperatingHours,
                    format!("{weekday:?}: close time {close} is not after open time {open}"),
                ));
            }
        }
    }
    Ok(())
}

/// Operating hours `(open, close)` for a local date, `None` if closed
pub fn hours_for_date(store: &Store, date: NaiveDate) -> AppResult<Option<(NaiveTime, NaiveTime)>> {
    let entry = store.operating_hours.for_weekday(date.weekday());
    let Some(entry) = entry else {
        return Ok(None);
    };
    let Some((open, close)) = entry.open_pair() else {
        return Ok(None);
    };

    let open = parse_hhmm(open)?;
    let close = parse_hhmm(close)?;
    if close <= open {
        return Err(AppError::with_message(
            ErrorCode::InvalidOperatingHours,
            format!("Close time {close} is not after open time {open}"),
        ));
    }
    Ok(Some((open, close)))
}

pub fn is_open_on_date(store: &Store, date: NaiveDate) -> AppResult<bool> {
    Ok(hours_for_date(store, date)?.is_some())
}

/// Whether the store is open at a given instant
pub fn is_open_at(store: &Store, instant: DateTime<Utc>) -> AppResult<bool> {
    let tz = store_tz(store)?;
    let local = instant.with_timezone(&tz);
    match hours_for_date(store, local.date_naive())? {
        Some((open, close)) => Ok(open <= local.time() && local.time() <= close),
        None => Ok(false),
    }
}

pub fn is_open_now(store: &Store) -> AppResult<bool> {
    is_open_at(store, Utc::now())
}

/// Whether the operating window of the booking's local date contains the
/// whole interval `[start, end]`
pub fn window_contains(
    store: &Store,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> AppResult<bool> {
    let tz = store_tz(store)?;
    let date = local_date_of(start, tz);
    let Some((open, close)) = hours_for_date(store, date)? else {
        return Ok(false);
    };
    let open_utc = local_to_utc(date, open, tz);
    let close_utc = local_to_utc(date, close, tz);
    Ok(open_utc <= start && end <= close_utc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::America::New_York;
    use chrono_tz::Europe::Madrid;
    use serde_json::json;
    use shared::models::store::StoreSettings;

    fn store(hours: serde_json::Value) -> Store {
        Store {
            id: 1,
            name: "Test".into(),
            timezone: "Europe/Madrid".into(),
            operating_hours: serde_json::from_value(hours).unwrap(),
            settings: StoreSettings::default(),
            is_active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_parse_hhmm() {
        assert_eq!(parse_hhmm("09:30").unwrap(), NaiveTime::from_hms_opt(9, 30, 0).unwrap());
        assert!(parse_hhmm("9am").is_err());
        assert!(parse_hhmm("25:00").is_err());
    }

    #[test]
    fn test_store_tz_rejects_unknown_zone() {
        let mut s = store(json!({}));
        s.timezone = "Mars/Olympus".into();
        let err = store_tz(&s).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidTimezone);
    }

    #[test]
    fn test_hours_for_date_closed_day() {
        let s = store(json!({
            "monday": {"open": "09:00", "close": "17:00"},
            "tuesday": {"closed": true},
        }));
        // 2026-03-02 is a Monday
        let monday = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let tuesday = NaiveDate::from_ymd_opt(2026, 3, 3).unwrap();
        let sunday = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();

        assert!(hours_for_date(&s, monday).unwrap().is_some());
        assert!(hours_for_date(&s, tuesday).unwrap().is_none());
        // Missing entry means closed
        assert!(hours_for_date(&s, sunday).unwrap().is_none());

        assert!(is_open_on_date(&s, monday).unwrap());
        assert!(!is_open_on_date(&s, sunday).unwrap());
    }

    #[test]
    fn test_hours_for_date_rejects_inverted_window() {
        let s = store(json!({"monday": {"open": "17:00", "close": "09:00"}}));
        let monday = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let err = hours_for_date(&s, monday).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidOperatingHours);
    }

    #[test]
    fn test_day_of_week_computed_in_store_zone() {
        // 2026-03-02 23:30 UTC is already Tuesday 00:30 in Madrid (UTC+1)
        let s = store(json!({
            "monday": {"open": "09:00", "close": "23:59"},
        }));
        let instant = Utc.with_ymd_and_hms(2026, 3, 2, 23, 30, 0).unwrap();
        assert_eq!(
            local_date_of(instant, Madrid),
            NaiveDate::from_ymd_opt(2026, 3, 3).unwrap()
        );
        // Tuesday has no hours, so the store is closed at that instant
        assert!(!is_open_at(&s, instant).unwrap());
    }

    #[test]
    fn test_is_open_at_boundaries() {
        let s = store(json!({"monday": {"open": "09:00", "close": "17:00"}}));
        // Monday 09:00 Madrid == 08:00 UTC (CET)
        let open = Utc.with_ymd_and_hms(2026, 3, 2, 8, 0, 0).unwrap();
        let close = Utc.with_ymd_and_hms(2026, 3, 2, 16, 0, 0).unwrap();
        assert!(is_open_at(&s, open).unwrap());
        assert!(is_open_at(&s, close).unwrap());
        assert!(!is_open_at(&s, open - chrono::Duration::minutes(1)).unwrap());
        assert!(!is_open_at(&s, close + chrono::Duration::minutes(1)).unwrap());
    }

    #[test]
    fn test_day_bounds_normal_day() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let (start, end) = day_bounds(date, New_York);
        assert_eq!(end - start, chrono::Duration::hours(24));
    }

    #[test]
    fn test_day_bounds_spring_forward_is_23h() {
        // US DST starts 2026-03-08
        let date = NaiveDate::from_ymd_opt(2026, 3, 8).unwrap();
        let (start, end) = day_bounds(date, New_York);
        assert_eq!(end - start, chrono::Duration::hours(23));
    }

    #[test]
    fn test_day_bounds_fall_back_is_25h() {
        // US DST ends 2026-11-01
        let date = NaiveDate::from_ymd_opt(2026, 11, 1).unwrap();
        let (start, end) = day_bounds(date, New_York);
        assert_eq!(end - start, chrono::Duration::hours(25));
    }

    #[test]
    fn test_local_to_utc_gap_falls_back() {
        // 02:30 does not exist on the spring-forward day
        let date = NaiveDate::from_ymd_opt(2026, 3, 8).unwrap();
        let t = NaiveTime::from_hms_opt(2, 30, 0).unwrap();
        let converted = local_to_utc(date, t, New_York);
        // Falls back to the naive UTC reading rather than panicking
        assert_eq!(converted, Utc.with_ymd_and_hms(2026, 3, 8, 2, 30, 0).unwrap());
    }

    #[test]
    fn test_local_to_utc_ambiguous_takes_latest() {
        // 01:30 occurs twice on the fall-back day; we take standard time
        let date = NaiveDate::from_ymd_opt(2026, 11, 1).unwrap();
        let t = NaiveTime::from_hms_opt(1, 30, 0).unwrap();
        let converted = local_to_utc(date, t, New_York);
        assert_eq!(converted, Utc.with_ymd_and_hms(2026, 11, 1, 6, 30, 0).unwrap());
    }
}
