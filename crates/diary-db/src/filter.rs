use chrono::{DateTime, Utc};
use rusqlite::types::Value;

use diary_types::models::{EntryType, UserId};

use crate::models::format_timestamp;

/// Restriction on an entry's `date` column.
///
/// A single-day query is half-open (`[day, day + 1)`), an explicit range is
/// closed on both ends, so `endDate` is inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateBound {
    HalfOpen { gte: DateTime<Utc>, lt: DateTime<Utc> },
    Closed { gte: DateTime<Utc>, lte: DateTime<Utc> },
}

/// Predicate for listing entries. Always scoped to one user; the other
/// clauses are conjunctive and optional.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryFilter {
    pub user_id: UserId,
    pub date: Option<DateBound>,
    pub entry_type: Option<EntryType>,
}

impl EntryFilter {
    pub fn for_user(user_id: UserId) -> Self {
        Self {
            user_id,
            date: None,
            entry_type: None,
        }
    }

    /// Render the predicate as a `WHERE` clause body and its positional params.
    pub(crate) fn to_sql(&self) -> (String, Vec<Value>) {
        let mut clauses = vec!["user_id = ?1".to_string()];
        let mut params = vec![Value::Integer(self.user_id)];

        let mut push = |clause: &str, value: Value| {
            params.push(value);
            clauses.push(format!("{} ?{}", clause, params.len()));
        };

        match self.date {
            Some(DateBound::HalfOpen { gte, lt }) => {
                push("date >=", Value::Text(format_timestamp(gte)));
                push("date <", Value::Text(format_timestamp(lt)));
            }
            Some(DateBound::Closed { gte, lte }) => {
                push("date >=", Value::Text(format_timestamp(gte)));
                push("date <=", Value::Text(format_timestamp(lte)));
            }
            None => {}
        }

        if let Some(entry_type) = self.entry_type {
            push("entry_type =", Value::Text(entry_type.as_str().to_string()));
        }

        (clauses.join(" AND "), params)
    }
}
