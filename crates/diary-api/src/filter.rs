use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};

use diary_db::{DateBound, EntryFilter};
use diary_types::api::EntryQuery;
use diary_types::models::{EntryType, UserId};

use crate::error::ApiError;

/// Translate the list query string into a store predicate for `user_id`.
///
/// `date` selects one calendar day, `[date, date + 1 day)`. A complete
/// `startDate`/`endDate` pair selects `[startDate, endDate]` and replaces any
/// single-day bound. A lone `startDate` or `endDate` is ignored. Empty values
/// count as absent.
pub fn build_filter(user_id: UserId, query: &EntryQuery) -> Result<EntryFilter, ApiError> {
    let mut filter = EntryFilter::for_user(user_id);

    if let Some(raw) = present(&query.date) {
        let day = parse_date(raw)?;
        let next = day
            .checked_add_signed(Duration::days(1))
            .filter(storable)
            .ok_or_else(|| ApiError::InvalidDate(raw.to_string()))?;
        filter.date = Some(DateBound::HalfOpen { gte: day, lt: next });
    }

    if let (Some(start), Some(end)) = (present(&query.start_date), present(&query.end_date)) {
        filter.date = Some(DateBound::Closed {
            gte: parse_date(start)?,
            lte: parse_date(end)?,
        });
    }

    if let Some(raw) = present(&query.entry_type) {
        let entry_type: EntryType = raw.parse().map_err(|_| ApiError::InvalidEntryType)?;
        filter.entry_type = Some(entry_type);
    }

    Ok(filter)
}

/// `YYYY-MM-DD` is midnight UTC; a full RFC 3339 timestamp is taken as is.
/// Either way the UTC year must fall in 0000..=9999.
pub(crate) fn parse_date(raw: &str) -> Result<DateTime<Utc>, ApiError> {
    let parsed = match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(day) => Some(day.and_time(NaiveTime::MIN).and_utc()),
        Err(_) => DateTime::parse_from_rfc3339(raw).ok().map(|ts| ts.with_timezone(&Utc)),
    };

    parsed
        .filter(storable)
        .ok_or_else(|| ApiError::InvalidDate(raw.to_string()))
}

/// Stored dates compare as text, which only orders correctly for four-digit years.
fn storable(ts: &DateTime<Utc>) -> bool {
    (0..=9999).contains(&ts.year())
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
