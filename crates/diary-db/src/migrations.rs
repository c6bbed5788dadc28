use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 =
        conn.query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))?;

    if version < 1 {
        info!("Running migration v1 (users, entries)");
        conn.execute_batch(
            "
            CREATE TABLE users (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                email       TEXT NOT NULL UNIQUE,
                password    TEXT NOT NULL,
                name        TEXT,
                created_at  TEXT NOT NULL
            );

            CREATE TABLE entries (
                id                  INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id             INTEGER NOT NULL REFERENCES users(id),
                date                TEXT NOT NULL,
                entry_type          TEXT NOT NULL CHECK (entry_type IN ('food', 'symptom', 'exercise')),

                meal_type           TEXT,
                food_name           TEXT,
                calories            INTEGER,

                symptom_type        TEXT,
                symptom_severity    INTEGER,

                exercise_type       TEXT,
                exercise_intensity  INTEGER,
                exercise_duration   INTEGER,

                notes               TEXT,
                created_at          TEXT NOT NULL
            );

            CREATE INDEX idx_entries_user_date
                ON entries(user_id, date);

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
