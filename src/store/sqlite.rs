//! SQLite-backed study record store.

use super::models::*;
use super::{demo_user, Storage};
use crate::error::{FocusTubeError, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, instrument};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL UNIQUE,
    password TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS bookmarks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL,
    video_id TEXT NOT NULL,
    title TEXT NOT NULL,
    channel TEXT NOT NULL,
    duration TEXT NOT NULL,
    thumbnail TEXT NOT NULL,
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_bookmarks_user_video ON bookmarks(user_id, video_id);

CREATE TABLE IF NOT EXISTS study_sessions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL,
    duration INTEGER NOT NULL,
    subject TEXT,
    date TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS notes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL,
    title TEXT NOT NULL,
    content TEXT NOT NULL,
    subject TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS tasks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL,
    title TEXT NOT NULL,
    description TEXT,
    priority TEXT NOT NULL,
    status TEXT NOT NULL,
    due_date TEXT,
    subject TEXT,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS flashcards (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL,
    front TEXT NOT NULL,
    back TEXT NOT NULL,
    subject TEXT,
    difficulty TEXT NOT NULL,
    next_review TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS goals (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL,
    title TEXT NOT NULL,
    description TEXT,
    target_date TEXT NOT NULL,
    completed INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS schedules (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL,
    title TEXT NOT NULL,
    subject TEXT,
    start_time TEXT NOT NULL,
    end_time TEXT NOT NULL,
    day_of_week INTEGER NOT NULL,
    color TEXT NOT NULL,
    created_at TEXT NOT NULL
);
"#;

const BOOKMARK_COLUMNS: &str =
    "id, user_id, video_id, title, channel, duration, thumbnail, created_at";
const NOTE_COLUMNS: &str = "id, user_id, title, content, subject, created_at, updated_at";
const TASK_COLUMNS: &str =
    "id, user_id, title, description, priority, status, due_date, subject, created_at";
const FLASHCARD_COLUMNS: &str =
    "id, user_id, front, back, subject, difficulty, next_review, created_at";
const GOAL_COLUMNS: &str = "id, user_id, title, description, target_date, completed, created_at";
const SCHEDULE_COLUMNS: &str =
    "id, user_id, title, subject, start_time, end_time, day_of_week, color, created_at";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// SQLite-based store.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) a database file.
    #[instrument(skip_all)]
    pub fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        let store = Self::init(conn)?;

        info!("Initialized SQLite store at {:?}", path);
        Ok(store)
    }

    /// Create an in-memory database (useful for testing).
    pub fn in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;

        let demo = demo_user();
        conn.execute(
            "INSERT OR IGNORE INTO users (username, password) VALUES (?1, ?2)",
            params![demo.username, demo.password],
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| FocusTubeError::Storage(format!("Failed to acquire lock: {}", e)))
    }
}

// === Row mapping ===

fn timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339()
}

fn conversion_error(
    err: impl Into<Box<dyn std::error::Error + Send + Sync>>,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, err.into())
}

fn parse_timestamp(value: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(conversion_error)
}

fn parse_enum<T: std::str::FromStr<Err = String>>(value: &str) -> rusqlite::Result<T> {
    value.parse().map_err(conversion_error)
}

fn date(value: &NaiveDate) -> String {
    value.format(DATE_FORMAT).to_string()
}

fn parse_date(value: &str) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(conversion_error)
}

fn user_from_row(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        password: row.get(2)?,
    })
}

fn bookmark_from_row(row: &Row) -> rusqlite::Result<Bookmark> {
    let created_at: String = row.get(7)?;
    Ok(Bookmark {
        id: row.get(0)?,
        user_id: row.get(1)?,
        video_id: row.get(2)?,
        title: row.get(3)?,
        channel: row.get(4)?,
        duration: row.get(5)?,
        thumbnail: row.get(6)?,
        created_at: parse_timestamp(&created_at)?,
    })
}

fn session_from_row(row: &Row) -> rusqlite::Result<StudySession> {
    let date: String = row.get(4)?;
    Ok(StudySession {
        id: row.get(0)?,
        user_id: row.get(1)?,
        duration: row.get(2)?,
        subject: row.get(3)?,
        date: parse_timestamp(&date)?,
    })
}

fn note_from_row(row: &Row) -> rusqlite::Result<Note> {
    let created_at: String = row.get(5)?;
    let updated_at: String = row.get(6)?;
    Ok(Note {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        content: row.get(3)?,
        subject: row.get(4)?,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

fn task_from_row(row: &Row) -> rusqlite::Result<Task> {
    let priority: String = row.get(4)?;
    let status: String = row.get(5)?;
    let due_date: Option<String> = row.get(6)?;
    let created_at: String = row.get(8)?;
    Ok(Task {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        priority: parse_enum(&priority)?,
        status: parse_enum(&status)?,
        due_date: due_date.as_deref().map(parse_date).transpose()?,
        subject: row.get(7)?,
        created_at: parse_timestamp(&created_at)?,
    })
}

fn flashcard_from_row(row: &Row) -> rusqlite::Result<Flashcard> {
    let difficulty: String = row.get(5)?;
    let next_review: String = row.get(6)?;
    let created_at: String = row.get(7)?;
    Ok(Flashcard {
        id: row.get(0)?,
        user_id: row.get(1)?,
        front: row.get(2)?,
        back: row.get(3)?,
        subject: row.get(4)?,
        difficulty: parse_enum(&difficulty)?,
        next_review: parse_timestamp(&next_review)?,
        created_at: parse_timestamp(&created_at)?,
    })
}

fn goal_from_row(row: &Row) -> rusqlite::Result<Goal> {
    let target_date: String = row.get(4)?;
    let created_at: String = row.get(6)?;
    Ok(Goal {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        target_date: parse_date(&target_date)?,
        completed: row.get(5)?,
        created_at: parse_timestamp(&created_at)?,
    })
}

fn schedule_from_row(row: &Row) -> rusqlite::Result<Schedule> {
    let created_at: String = row.get(8)?;
    Ok(Schedule {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        subject: row.get(3)?,
        start_time: row.get(4)?,
        end_time: row.get(5)?,
        day_of_week: row.get(6)?,
        color: row.get(7)?,
        created_at: parse_timestamp(&created_at)?,
    })
}

/// Run a query and collect every mapped row.
fn query_all<T, P: rusqlite::Params>(
    conn: &Connection,
    sql: &str,
    params: P,
    map: fn(&Row) -> rusqlite::Result<T>,
) -> Result<Vec<T>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params, map)?;
    Ok(rows.collect::<rusqlite::Result<Vec<T>>>()?)
}

/// Fetch one record owned by `user_id`.
fn query_owned<T>(
    conn: &Connection,
    table: &str,
    columns: &str,
    id: i64,
    user_id: i64,
    map: fn(&Row) -> rusqlite::Result<T>,
) -> Result<Option<T>> {
    let sql = format!("SELECT {columns} FROM {table} WHERE id = ?1 AND user_id = ?2");
    Ok(conn.query_row(&sql, params![id, user_id], map).optional()?)
}

fn delete_owned(conn: &Connection, table: &str, id: i64, user_id: i64) -> Result<bool> {
    let sql = format!("DELETE FROM {table} WHERE id = ?1 AND user_id = ?2");
    let deleted = conn.execute(&sql, params![id, user_id])?;
    debug!("Deleted {} row(s) from {}", deleted, table);
    Ok(deleted > 0)
}

#[async_trait]
impl Storage for SqliteStore {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>> {
        let conn = self.conn()?;
        Ok(conn
            .query_row(
                "SELECT id, username, password FROM users WHERE id = ?1",
                params![id],
                user_from_row,
            )
            .optional()?)
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let conn = self.conn()?;
        Ok(conn
            .query_row(
                "SELECT id, username, password FROM users WHERE username = ?1",
                params![username],
                user_from_row,
            )
            .optional()?)
    }

    #[instrument(skip(self, user))]
    async fn create_user(&self, user: NewUser) -> Result<User> {
        let user = user.normalized()?;
        let conn = self.conn()?;

        let taken: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM users WHERE username = ?1)",
            params![user.username],
            |row| row.get(0),
        )?;
        if taken {
            return Err(FocusTubeError::InvalidInput(format!(
                "Username '{}' is already taken",
                user.username
            )));
        }

        conn.execute(
            "INSERT INTO users (username, password) VALUES (?1, ?2)",
            params![user.username, user.password],
        )?;
        Ok(User {
            id: conn.last_insert_rowid(),
            username: user.username,
            password: user.password,
        })
    }

    async fn list_bookmarks(&self, user_id: i64) -> Result<Vec<Bookmark>> {
        let conn = self.conn()?;
        query_all(
            &conn,
            &format!("SELECT {BOOKMARK_COLUMNS} FROM bookmarks WHERE user_id = ?1 ORDER BY id"),
            params![user_id],
            bookmark_from_row,
        )
    }

    #[instrument(skip(self, bookmark))]
    async fn add_bookmark(&self, user_id: i64, bookmark: NewBookmark) -> Result<Bookmark> {
        let bookmark = bookmark.normalized()?;
        let conn = self.conn()?;

        let existing = conn
            .query_row(
                &format!(
                    "SELECT {BOOKMARK_COLUMNS} FROM bookmarks WHERE user_id = ?1 AND video_id = ?2"
                ),
                params![user_id, bookmark.video_id],
                bookmark_from_row,
            )
            .optional()?;
        if let Some(existing) = existing {
            return Ok(existing);
        }

        let created_at = Utc::now();
        conn.execute(
            "INSERT INTO bookmarks (user_id, video_id, title, channel, duration, thumbnail, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                user_id,
                bookmark.video_id,
                bookmark.title,
                bookmark.channel,
                bookmark.duration,
                bookmark.thumbnail,
                timestamp(&created_at),
            ],
        )?;

        Ok(Bookmark {
            id: conn.last_insert_rowid(),
            user_id,
            video_id: bookmark.video_id,
            title: bookmark.title,
            channel: bookmark.channel,
            duration: bookmark.duration,
            thumbnail: bookmark.thumbnail,
            created_at,
        })
    }

    async fn remove_bookmark(&self, user_id: i64, video_id: &str) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM bookmarks WHERE user_id = ?1 AND video_id = ?2",
            params![user_id, video_id],
        )?;
        Ok(deleted > 0)
    }

    async fn is_bookmarked(&self, user_id: i64, video_id: &str) -> Result<bool> {
        let conn = self.conn()?;
        Ok(conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM bookmarks WHERE user_id = ?1 AND video_id = ?2)",
            params![user_id, video_id],
            |row| row.get(0),
        )?)
    }

    async fn list_study_sessions(&self, user_id: i64) -> Result<Vec<StudySession>> {
        let conn = self.conn()?;
        query_all(
            &conn,
            "SELECT id, user_id, duration, subject, date FROM study_sessions WHERE user_id = ?1 ORDER BY id",
            params![user_id],
            session_from_row,
        )
    }

    async fn add_study_session(&self, user_id: i64, session: NewStudySession) -> Result<StudySession> {
        let session = session.normalized()?;
        let conn = self.conn()?;

        let date = Utc::now();
        conn.execute(
            "INSERT INTO study_sessions (user_id, duration, subject, date) VALUES (?1, ?2, ?3, ?4)",
            params![user_id, session.duration, session.subject, timestamp(&date)],
        )?;

        Ok(StudySession {
            id: conn.last_insert_rowid(),
            user_id,
            duration: session.duration,
            subject: session.subject,
            date,
        })
    }

    async fn total_study_minutes(&self, user_id: i64) -> Result<i64> {
        let conn = self.conn()?;
        Ok(conn.query_row(
            "SELECT COALESCE(SUM(duration), 0) FROM study_sessions WHERE user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )?)
    }

    async fn list_notes(&self, user_id: i64, filter: &SubjectFilter) -> Result<Vec<Note>> {
        let conn = self.conn()?;
        let notes = query_all(
            &conn,
            &format!("SELECT {NOTE_COLUMNS} FROM notes WHERE user_id = ?1 ORDER BY id"),
            params![user_id],
            note_from_row,
        )?;
        Ok(notes
            .into_iter()
            .filter(|n| filter.matches(n.subject.as_deref()))
            .collect())
    }

    async fn create_note(&self, user_id: i64, note: NewNote) -> Result<Note> {
        let note = note.normalized()?;
        let conn = self.conn()?;

        let now = Utc::now();
        conn.execute(
            "INSERT INTO notes (user_id, title, content, subject, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
            params![user_id, note.title, note.content, note.subject, timestamp(&now)],
        )?;

        Ok(Note {
            id: conn.last_insert_rowid(),
            user_id,
            title: note.title,
            content: note.content,
            subject: note.subject,
            created_at: now,
            updated_at: now,
        })
    }

    async fn update_note(&self, user_id: i64, id: i64, note: NewNote) -> Result<Option<Note>> {
        let note = note.normalized()?;
        let conn = self.conn()?;

        let updated = conn.execute(
            "UPDATE notes SET title = ?1, content = ?2, subject = ?3, updated_at = ?4
             WHERE id = ?5 AND user_id = ?6",
            params![note.title, note.content, note.subject, timestamp(&Utc::now()), id, user_id],
        )?;
        if updated == 0 {
            return Ok(None);
        }

        query_owned(&conn, "notes", NOTE_COLUMNS, id, user_id, note_from_row)
    }

    async fn delete_note(&self, user_id: i64, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        delete_owned(&conn, "notes", id, user_id)
    }

    async fn list_tasks(&self, user_id: i64, filter: &TaskFilter) -> Result<Vec<Task>> {
        let conn = self.conn()?;
        let tasks = query_all(
            &conn,
            &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE user_id = ?1 ORDER BY id"),
            params![user_id],
            task_from_row,
        )?;
        Ok(tasks.into_iter().filter(|t| filter.matches(t)).collect())
    }

    async fn create_task(&self, user_id: i64, task: NewTask) -> Result<Task> {
        let task = task.normalized()?;
        let conn = self.conn()?;

        let created_at = Utc::now();
        conn.execute(
            "INSERT INTO tasks (user_id, title, description, priority, status, due_date, subject, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                user_id,
                task.title,
                task.description,
                task.priority.as_str(),
                task.status.as_str(),
                task.due_date.as_ref().map(date),
                task.subject,
                timestamp(&created_at),
            ],
        )?;

        Ok(Task {
            id: conn.last_insert_rowid(),
            user_id,
            title: task.title,
            description: task.description,
            priority: task.priority,
            status: task.status,
            due_date: task.due_date,
            subject: task.subject,
            created_at,
        })
    }

    async fn update_task(&self, user_id: i64, id: i64, patch: TaskPatch) -> Result<Option<Task>> {
        let conn = self.conn()?;

        let Some(mut task) = query_owned(&conn, "tasks", TASK_COLUMNS, id, user_id, task_from_row)?
        else {
            return Ok(None);
        };
        patch.apply(&mut task)?;

        conn.execute(
            "UPDATE tasks SET title = ?1, description = ?2, priority = ?3, status = ?4,
                due_date = ?5, subject = ?6
             WHERE id = ?7 AND user_id = ?8",
            params![
                task.title,
                task.description,
                task.priority.as_str(),
                task.status.as_str(),
                task.due_date.as_ref().map(date),
                task.subject,
                id,
                user_id,
            ],
        )?;
        Ok(Some(task))
    }

    async fn delete_task(&self, user_id: i64, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        delete_owned(&conn, "tasks", id, user_id)
    }

    async fn list_flashcards(&self, user_id: i64, filter: &SubjectFilter) -> Result<Vec<Flashcard>> {
        let conn = self.conn()?;
        let cards = query_all(
            &conn,
            &format!("SELECT {FLASHCARD_COLUMNS} FROM flashcards WHERE user_id = ?1 ORDER BY id"),
            params![user_id],
            flashcard_from_row,
        )?;
        Ok(cards
            .into_iter()
            .filter(|c| filter.matches(c.subject.as_deref()))
            .collect())
    }

    async fn create_flashcard(&self, user_id: i64, card: NewFlashcard) -> Result<Flashcard> {
        let card = card.normalized()?;
        let conn = self.conn()?;

        let now = Utc::now();
        conn.execute(
            "INSERT INTO flashcards (user_id, front, back, subject, difficulty, next_review, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
            params![
                user_id,
                card.front,
                card.back,
                card.subject,
                card.difficulty.as_str(),
                timestamp(&now),
            ],
        )?;

        Ok(Flashcard {
            id: conn.last_insert_rowid(),
            user_id,
            front: card.front,
            back: card.back,
            subject: card.subject,
            difficulty: card.difficulty,
            next_review: now,
            created_at: now,
        })
    }

    async fn rate_flashcard(
        &self,
        user_id: i64,
        id: i64,
        difficulty: Difficulty,
        now: DateTime<Utc>,
    ) -> Result<Option<Flashcard>> {
        let conn = self.conn()?;

        let Some(mut card) =
            query_owned(&conn, "flashcards", FLASHCARD_COLUMNS, id, user_id, flashcard_from_row)?
        else {
            return Ok(None);
        };
        card.rate(difficulty, now);

        conn.execute(
            "UPDATE flashcards SET difficulty = ?1, next_review = ?2 WHERE id = ?3 AND user_id = ?4",
            params![card.difficulty.as_str(), timestamp(&card.next_review), id, user_id],
        )?;
        Ok(Some(card))
    }

    async fn delete_flashcard(&self, user_id: i64, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        delete_owned(&conn, "flashcards", id, user_id)
    }

    async fn list_goals(&self, user_id: i64) -> Result<Vec<Goal>> {
        let conn = self.conn()?;
        query_all(
            &conn,
            &format!("SELECT {GOAL_COLUMNS} FROM goals WHERE user_id = ?1 ORDER BY id"),
            params![user_id],
            goal_from_row,
        )
    }

    async fn goals_for_day(&self, user_id: i64, day: NaiveDate) -> Result<Vec<Goal>> {
        let conn = self.conn()?;
        query_all(
            &conn,
            &format!(
                "SELECT {GOAL_COLUMNS} FROM goals WHERE user_id = ?1 AND target_date = ?2 ORDER BY id"
            ),
            params![user_id, date(&day)],
            goal_from_row,
        )
    }

    async fn create_goal(&self, user_id: i64, goal: NewGoal) -> Result<Goal> {
        let goal = goal.normalized()?;
        let conn = self.conn()?;

        let created_at = Utc::now();
        conn.execute(
            "INSERT INTO goals (user_id, title, description, target_date, completed, created_at)
             VALUES (?1, ?2, ?3, ?4, 0, ?5)",
            params![
                user_id,
                goal.title,
                goal.description,
                date(&goal.target_date),
                timestamp(&created_at),
            ],
        )?;

        Ok(Goal {
            id: conn.last_insert_rowid(),
            user_id,
            title: goal.title,
            description: goal.description,
            target_date: goal.target_date,
            completed: false,
            created_at,
        })
    }

    async fn set_goal_completed(&self, user_id: i64, id: i64, completed: bool) -> Result<Option<Goal>> {
        let conn = self.conn()?;

        let updated = conn.execute(
            "UPDATE goals SET completed = ?1 WHERE id = ?2 AND user_id = ?3",
            params![completed, id, user_id],
        )?;
        if updated == 0 {
            return Ok(None);
        }

        query_owned(&conn, "goals", GOAL_COLUMNS, id, user_id, goal_from_row)
    }

    async fn delete_goal(&self, user_id: i64, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        delete_owned(&conn, "goals", id, user_id)
    }

    async fn list_schedules(&self, user_id: i64, day: Option<u8>) -> Result<Vec<Schedule>> {
        let conn = self.conn()?;
        let order = "ORDER BY day_of_week, start_time, id";

        match day {
            Some(day) => query_all(
                &conn,
                &format!(
                    "SELECT {SCHEDULE_COLUMNS} FROM schedules WHERE user_id = ?1 AND day_of_week = ?2 {order}"
                ),
                params![user_id, day],
                schedule_from_row,
            ),
            None => query_all(
                &conn,
                &format!("SELECT {SCHEDULE_COLUMNS} FROM schedules WHERE user_id = ?1 {order}"),
                params![user_id],
                schedule_from_row,
            ),
        }
    }

    async fn create_schedule(&self, user_id: i64, schedule: NewSchedule) -> Result<Schedule> {
        let schedule = schedule.normalized()?;
        let conn = self.conn()?;

        let color = schedule
            .color
            .unwrap_or_else(|| DEFAULT_SCHEDULE_COLOR.to_string());
        let created_at = Utc::now();
        conn.execute(
            "INSERT INTO schedules (user_id, title, subject, start_time, end_time, day_of_week, color, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                user_id,
                schedule.title,
                schedule.subject,
                schedule.start_time,
                schedule.end_time,
                schedule.day_of_week,
                color,
                timestamp(&created_at),
            ],
        )?;

        Ok(Schedule {
            id: conn.last_insert_rowid(),
            user_id,
            title: schedule.title,
            subject: schedule.subject,
            start_time: schedule.start_time,
            end_time: schedule.end_time,
            day_of_week: schedule.day_of_week,
            color,
            created_at,
        })
    }

    async fn delete_schedule(&self, user_id: i64, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        delete_owned(&conn, "schedules", id, user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::contract;

    fn store() -> SqliteStore {
        SqliteStore::in_memory().unwrap()
    }

    #[tokio::test]
    async fn test_users() {
        contract::users(&store()).await;
    }

    #[tokio::test]
    async fn test_bookmarks() {
        contract::bookmarks(&store()).await;
    }

    #[tokio::test]
    async fn test_study_sessions() {
        contract::study_sessions(&store()).await;
    }

    #[tokio::test]
    async fn test_notes() {
        contract::notes(&store()).await;
    }

    #[tokio::test]
    async fn test_tasks() {
        contract::tasks(&store()).await;
    }

    #[tokio::test]
    async fn test_flashcards() {
        contract::flashcards(&store()).await;
    }

    #[tokio::test]
    async fn test_goals() {
        contract::goals(&store()).await;
    }

    #[tokio::test]
    async fn test_schedules() {
        contract::schedules(&store()).await;
    }

    fn vectors_note() -> NewNote {
        NewNote {
            title: "Vectors".to_string(),
            content: "magnitude and direction".to_string(),
            subject: Some("Physics".to_string()),
        }
    }

    #[tokio::test]
    async fn test_deletes_are_scoped_to_owner() {
        let store = store();
        let note = store.create_note(1, vectors_note()).await.unwrap();

        assert!(!store.delete_note(2, note.id).await.unwrap());
        assert!(store.delete_note(1, note.id).await.unwrap());
        assert!(!store.delete_note(1, note.id).await.unwrap());

        assert!(!store.delete_task(1, 404).await.unwrap());
        assert!(!store.delete_flashcard(1, 404).await.unwrap());
        assert!(!store.delete_goal(1, 404).await.unwrap());
        assert!(!store.delete_schedule(1, 404).await.unwrap());
    }

    #[tokio::test]
    async fn test_corrupt_rows_surface_as_errors() {
        let store = store();
        let task: NewTask = serde_json::from_value(serde_json::json!({ "title": "Essay" })).unwrap();
        let task = store.create_task(1, task).await.unwrap();
        let note = store.create_note(1, vectors_note()).await.unwrap();

        {
            let conn = store.conn().unwrap();
            conn.execute("UPDATE tasks SET priority = 'someday' WHERE id = ?1", params![task.id])
                .unwrap();
            conn.execute("UPDATE notes SET created_at = 'yesterday' WHERE id = ?1", params![note.id])
                .unwrap();
        }

        let tasks = store.list_tasks(1, &TaskFilter::default()).await;
        assert!(matches!(tasks, Err(FocusTubeError::Database(_))));
        let notes = store.list_notes(1, &SubjectFilter::default()).await;
        assert!(matches!(notes, Err(FocusTubeError::Database(_))));
    }

    #[tokio::test]
    async fn test_data_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("focustube.db");

        {
            let store = SqliteStore::new(&path).unwrap();
            let note = NewNote {
                title: "Vectors".to_string(),
                content: "magnitude and direction".to_string(),
                subject: Some("Physics".to_string()),
            };
            store.create_note(1, note).await.unwrap();
        }

        let reopened = SqliteStore::new(&path).unwrap();
        let notes = reopened.list_notes(1, &SubjectFilter::default()).await.unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].title, "Vectors");
        // The demo user is seeded once.
        assert_eq!(reopened.get_user(1).await.unwrap().unwrap().username, "demo");
        assert!(reopened.get_user(2).await.unwrap().is_none());
    }
}
