use crate::Database;
use crate::filter::EntryFilter;
use crate::models::{EntryRow, UserRow, format_timestamp};
use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, ErrorCode, Row};

use diary_types::models::{Entry, EntryId, EntryPayload, NewEntry, UserId};

const ENTRY_COLUMNS: &str = "id, user_id, date, entry_type, meal_type, food_name, calories, \
     symptom_type, symptom_severity, exercise_type, exercise_intensity, exercise_duration, \
     notes, created_at";

impl Database {
    // -- Users --

    pub fn create_user(
        &self,
        email: &str,
        password_hash: &str,
        name: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<UserRow> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (email, password, name, created_at) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![email, password_hash, name, format_timestamp(now)],
            )?;
            let id = conn.last_insert_rowid();
            query_user_by_id(conn, id)?.ok_or_else(|| anyhow::anyhow!("User {} vanished after insert", id))
        })
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "email = ?1", email))
    }

    pub fn get_user_by_id(&self, id: UserId) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by_id(conn, id))
    }

    // -- Entries --

    pub fn insert_entry(&self, user_id: UserId, entry: &NewEntry, now: DateTime<Utc>) -> Result<EntryRow> {
        let date = format_timestamp(entry.date.unwrap_or(now));
        let created_at = format_timestamp(now);
        let entry_type = entry.payload.entry_type().as_str();

        self.with_conn(|conn| {
            match &entry.payload {
                EntryPayload::Food { meal_type, food_name, calories } => conn.execute(
                    "INSERT INTO entries (user_id, date, entry_type, meal_type, food_name, calories, notes, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                    rusqlite::params![user_id, date, entry_type, meal_type, food_name, calories, entry.notes, created_at],
                )?,
                EntryPayload::Symptom { symptom_type, severity } => conn.execute(
                    "INSERT INTO entries (user_id, date, entry_type, symptom_type, symptom_severity, notes, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                    rusqlite::params![user_id, date, entry_type, symptom_type, severity, entry.notes, created_at],
                )?,
                EntryPayload::Exercise { exercise_type, intensity, duration } => conn.execute(
                    "INSERT INTO entries (user_id, date, entry_type, exercise_type, exercise_intensity, exercise_duration, notes, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                    rusqlite::params![user_id, date, entry_type, exercise_type, intensity, duration, entry.notes, created_at],
                )?,
            };

            let id = conn.last_insert_rowid();
            query_entry(conn, "id = ?1", rusqlite::params![id])?
                .ok_or_else(|| anyhow::anyhow!("Entry {} vanished after insert", id))
        })
    }

    /// Entries matching `filter`, newest first.
    pub fn list_entries(&self, filter: &EntryFilter) -> Result<Vec<EntryRow>> {
        let (clause, params) = filter.to_sql();

        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {} FROM entries WHERE {} ORDER BY date DESC, id DESC",
                ENTRY_COLUMNS, clause
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(rusqlite::params_from_iter(params), entry_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Scoped lookup: only returns the entry when `user_id` owns it.
    pub fn find_entry_for_user(&self, id: EntryId, user_id: UserId) -> Result<Option<EntryRow>> {
        self.with_conn(|conn| query_entry(conn, "id = ?1 AND user_id = ?2", rusqlite::params![id, user_id]))
    }

    /// Overwrite every mutable column of the entry with `entry.id`.
    /// Ownership is not checked here. Fails if the row is gone.
    pub fn update_entry(&self, entry: &Entry) -> Result<()> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE entries SET
                    date = ?2, entry_type = ?3,
                    meal_type = ?4, food_name = ?5, calories = ?6,
                    symptom_type = ?7, symptom_severity = ?8,
                    exercise_type = ?9, exercise_intensity = ?10, exercise_duration = ?11,
                    notes = ?12
                 WHERE id = ?1",
                rusqlite::params![
                    entry.id,
                    format_timestamp(entry.date),
                    entry.entry_type.as_str(),
                    entry.meal_type,
                    entry.food_name,
                    entry.calories,
                    entry.symptom_type,
                    entry.symptom_severity,
                    entry.exercise_type,
                    entry.exercise_intensity,
                    entry.exercise_duration,
                    entry.notes,
                ],
            )?;
            if changed == 0 {
                anyhow::bail!("Entry {} no longer exists", entry.id);
            }
            Ok(())
        })
    }

    pub fn delete_entry(&self, id: EntryId) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM entries WHERE id = ?1", [id])?;
            Ok(())
        })
    }
}

/// True when `err` comes from a UNIQUE/constraint violation in SQLite.
pub fn is_constraint_violation(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<rusqlite::Error>(),
        Some(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation
    )
}

fn query_user_by_id(conn: &Connection, id: UserId) -> Result<Option<UserRow>> {
    query_user(conn, "id = ?1", id)
}

fn query_user<P: rusqlite::ToSql>(conn: &Connection, clause: &str, param: P) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT id, email, password, name, created_at FROM users WHERE {}",
        clause
    ))?;

    let row = stmt
        .query_row([param], |row| {
            Ok(UserRow {
                id: row.get(0)?,
                email: row.get(1)?,
                password: row.get(2)?,
                name: row.get(3)?,
                created_at: row.get(4)?,
            })
        })
        .optional()?;

    Ok(row)
}

fn query_entry<P: rusqlite::Params>(conn: &Connection, clause: &str, params: P) -> Result<Option<EntryRow>> {
    let mut stmt = conn.prepare(&format!("SELECT {} FROM entries WHERE {}", ENTRY_COLUMNS, clause))?;
    let row = stmt.query_row(params, entry_from_row).optional()?;
    Ok(row)
}

fn entry_from_row(row: &Row<'_>) -> rusqlite::Result<EntryRow> {
    Ok(EntryRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        date: row.get(2)?,
        entry_type: row.get(3)?,
        meal_type: row.get(4)?,
        food_name: row.get(5)?,
        calories: row.get(6)?,
        symptom_type: row.get(7)?,
        symptom_severity: row.get(8)?,
        exercise_type: row.get(9)?,
        exercise_intensity: row.get(10)?,
        exercise_duration: row.get(11)?,
        notes: row.get(12)?,
        created_at: row.get(13)?,
    })
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::DateBound;
    use chrono::TimeZone;
    use diary_types::models::EntryType;

    fn ts(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn food(name: &str, date: DateTime<Utc>) -> NewEntry {
        NewEntry {
            date: Some(date),
            notes: None,
            payload: EntryPayload::Food {
                meal_type: Some("lunch".into()),
                food_name: name.into(),
                calories: Some(400),
            },
        }
    }

    fn setup() -> (Database, UserId, UserId) {
        let db = Database::open_in_memory().unwrap();
        let alice = db.create_user("alice@x.com", "digest-a", Some("Alice"), Utc::now()).unwrap();
        let bob = db.create_user("bob@x.com", "digest-b", None, Utc::now()).unwrap();
        (db, alice.id, bob.id)
    }

    #[test]
    fn duplicate_email_is_a_constraint_violation() {
        let (db, _, _) = setup();
        let err = db.create_user("alice@x.com", "other", None, Utc::now()).unwrap_err();
        assert!(is_constraint_violation(&err));
    }

    #[test]
    fn user_lookup_by_email_and_id() {
        let (db, alice, _) = setup();
        let row = db.get_user_by_email("alice@x.com").unwrap().unwrap();
        assert_eq!(row.id, alice);
        assert_eq!(row.name.as_deref(), Some("Alice"));
        assert!(db.get_user_by_id(alice).unwrap().is_some());
        assert!(db.get_user_by_email("nobody@x.com").unwrap().is_none());
    }

    #[test]
    fn insert_leaves_other_variant_columns_null() {
        let (db, alice, _) = setup();
        let new = NewEntry {
            date: None,
            notes: Some("stiff neck".into()),
            payload: EntryPayload::Symptom {
                symptom_type: "headache".into(),
                severity: Some(4),
            },
        };
        let now = ts(2024, 5, 1, 8);

        let entry = db.insert_entry(alice, &new, now).unwrap().into_entry().unwrap();

        assert_eq!(entry.entry_type, EntryType::Symptom);
        assert_eq!(entry.date, now);
        assert_eq!(entry.symptom_severity, Some(4));
        assert_eq!(entry.food_name, None);
        assert_eq!(entry.exercise_duration, None);
        assert_eq!(entry.notes.as_deref(), Some("stiff neck"));
    }

    #[test]
    fn list_is_scoped_and_newest_first() {
        let (db, alice, bob) = setup();
        db.insert_entry(alice, &food("oats", ts(2024, 1, 15, 7)), Utc::now()).unwrap();
        db.insert_entry(alice, &food("soup", ts(2024, 1, 15, 12)), Utc::now()).unwrap();
        db.insert_entry(bob, &food("pizza", ts(2024, 1, 15, 19)), Utc::now()).unwrap();

        let rows = db.list_entries(&EntryFilter::for_user(alice)).unwrap();
        let names: Vec<_> = rows.iter().map(|r| r.food_name.clone().unwrap()).collect();
        assert_eq!(names, vec!["soup", "oats"]);
    }

    #[test]
    fn half_open_day_excludes_next_midnight() {
        let (db, alice, _) = setup();
        db.insert_entry(alice, &food("start", ts(2024, 1, 15, 0)), Utc::now()).unwrap();
        db.insert_entry(alice, &food("late", Utc.with_ymd_and_hms(2024, 1, 15, 23, 59, 59).unwrap()), Utc::now())
            .unwrap();
        db.insert_entry(alice, &food("next", ts(2024, 1, 16, 0)), Utc::now()).unwrap();

        let filter = EntryFilter {
            date: Some(DateBound::HalfOpen {
                gte: ts(2024, 1, 15, 0),
                lt: ts(2024, 1, 16, 0),
            }),
            ..EntryFilter::for_user(alice)
        };
        let names: Vec<_> = db
            .list_entries(&filter)
            .unwrap()
            .into_iter()
            .map(|r| r.food_name.unwrap())
            .collect();
        assert_eq!(names, vec!["late", "start"]);
    }

    #[test]
    fn closed_range_includes_end_and_type_filter_applies() {
        let (db, alice, _) = setup();
        db.insert_entry(alice, &food("first", ts(2024, 3, 1, 0)), Utc::now()).unwrap();
        db.insert_entry(alice, &food("last", ts(2024, 3, 5, 0)), Utc::now()).unwrap();
        db.insert_entry(alice, &food("after", ts(2024, 3, 5, 1)), Utc::now()).unwrap();
        let run = NewEntry {
            date: Some(ts(2024, 3, 2, 0)),
            notes: None,
            payload: EntryPayload::Exercise {
                exercise_type: "run".into(),
                intensity: Some(3),
                duration: Some(45),
            },
        };
        db.insert_entry(alice, &run, Utc::now()).unwrap();

        let mut filter = EntryFilter {
            date: Some(DateBound::Closed {
                gte: ts(2024, 3, 1, 0),
                lte: ts(2024, 3, 5, 0),
            }),
            ..EntryFilter::for_user(alice)
        };
        assert_eq!(db.list_entries(&filter).unwrap().len(), 3);

        filter.entry_type = Some(EntryType::Food);
        let names: Vec<_> = db
            .list_entries(&filter)
            .unwrap()
            .into_iter()
            .map(|r| r.food_name.unwrap())
            .collect();
        assert_eq!(names, vec!["last", "first"]);
    }

    #[test]
    fn scoped_lookup_hides_other_users_entries() {
        let (db, alice, bob) = setup();
        let row = db.insert_entry(alice, &food("oats", ts(2024, 1, 1, 8)), Utc::now()).unwrap();

        assert!(db.find_entry_for_user(row.id, alice).unwrap().is_some());
        assert!(db.find_entry_for_user(row.id, bob).unwrap().is_none());
        assert!(db.find_entry_for_user(row.id + 100, alice).unwrap().is_none());
    }

    #[test]
    fn update_and_delete_by_id() {
        let (db, alice, _) = setup();
        let mut entry = db
            .insert_entry(alice, &food("oats", ts(2024, 1, 1, 8)), Utc::now())
            .unwrap()
            .into_entry()
            .unwrap();

        entry.notes = Some("with honey".into());
        entry.calories = Some(350);
        db.update_entry(&entry).unwrap();

        let stored = db.find_entry_for_user(entry.id, alice).unwrap().unwrap().into_entry().unwrap();
        assert_eq!(stored, entry);

        db.delete_entry(entry.id).unwrap();
        assert!(db.find_entry_for_user(entry.id, alice).unwrap().is_none());
    }

    #[test]
    fn update_of_deleted_entry_fails() {
        let (db, alice, _) = setup();
        let mut entry = db
            .insert_entry(alice, &food("oats", ts(2024, 1, 1, 8)), Utc::now())
            .unwrap()
            .into_entry()
            .unwrap();
        db.delete_entry(entry.id).unwrap();

        entry.notes = Some("too late".into());
        let err = db.update_entry(&entry).unwrap_err();
        assert!(err.to_string().contains("no longer exists"));
        assert!(db.find_entry_for_user(entry.id, alice).unwrap().is_none());
    }
}
