//! Database row types. These map directly to SQLite rows.
//! Distinct from diary-types API models to keep the DB layer independent.

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};

use diary_types::models::{Entry, EntryId, EntryType, User, UserId};

#[derive(Debug)]
pub struct UserRow {
    pub id: UserId,
    pub email: String,
    pub password: String,
    pub name: Option<String>,
    pub created_at: String,
}

impl UserRow {
    pub fn into_user(self) -> Result<User> {
        Ok(User {
            created_at: parse_timestamp(&self.created_at)
                .with_context(|| format!("corrupt created_at on user {}", self.id))?,
            id: self.id,
            email: self.email,
            name: self.name,
        })
    }
}

pub struct EntryRow {
    pub id: EntryId,
    pub user_id: UserId,
    pub date: String,
    pub entry_type: String,
    pub meal_type: Option<String>,
    pub food_name: Option<String>,
    pub calories: Option<i64>,
    pub symptom_type: Option<String>,
    pub symptom_severity: Option<i64>,
    pub exercise_type: Option<String>,
    pub exercise_intensity: Option<i64>,
    pub exercise_duration: Option<i64>,
    pub notes: Option<String>,
    pub created_at: String,
}

impl EntryRow {
    pub fn into_entry(self) -> Result<Entry> {
        let entry_type: EntryType = self
            .entry_type
            .parse()
            .with_context(|| format!("corrupt entry_type on entry {}", self.id))?;
        let date = parse_timestamp(&self.date)
            .with_context(|| format!("corrupt date on entry {}", self.id))?;
        let created_at = parse_timestamp(&self.created_at)
            .with_context(|| format!("corrupt created_at on entry {}", self.id))?;

        Ok(Entry {
            id: self.id,
            user_id: self.user_id,
            date,
            entry_type,
            meal_type: self.meal_type,
            food_name: self.food_name,
            calories: self.calories,
            symptom_type: self.symptom_type,
            symptom_severity: self.symptom_severity,
            exercise_type: self.exercise_type,
            exercise_intensity: self.exercise_intensity,
            exercise_duration: self.exercise_duration,
            notes: self.notes,
            created_at,
        })
    }
}

/// Timestamps are stored as fixed-width RFC 3339 UTC text with millisecond
/// precision, so string comparison in SQL orders them chronologically.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(raw)?.with_timezone(&Utc))
}
