//! Storage for per-user study records.
//!
//! Provides a trait-based interface with an in-memory backend and a SQLite
//! backend. Every operation is scoped by user; records owned by someone else
//! behave as if they did not exist.

mod memory;
mod models;
mod sqlite;

pub use memory::MemoryStore;
pub use models::{
    Bookmark, Difficulty, Flashcard, Goal, NewBookmark, NewFlashcard, NewGoal, NewNote,
    NewSchedule, NewStudySession, NewTask, NewUser, Note, Priority, Schedule, StudySession,
    SubjectFilter, Task, TaskFilter, TaskPatch, TaskStatus, User, DEFAULT_SCHEDULE_COLOR,
};
pub use sqlite::SqliteStore;

use crate::config::{Settings, StorageProvider};
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Arc;
use tracing::info;

/// Username and password of the account seeded into every new store.
pub const DEMO_USERNAME: &str = "demo";
const DEMO_PASSWORD: &str = "demo";

/// Trait for study record stores.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Backend name, reported by the health endpoint.
    fn name(&self) -> &'static str;

    // Users
    async fn get_user(&self, id: i64) -> Result<Option<User>>;
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;
    /// Fails with invalid input when the username is taken.
    async fn create_user(&self, user: NewUser) -> Result<User>;

    // Bookmarks
    async fn list_bookmarks(&self, user_id: i64) -> Result<Vec<Bookmark>>;
    /// Bookmarking an already bookmarked video returns the existing bookmark.
    async fn add_bookmark(&self, user_id: i64, bookmark: NewBookmark) -> Result<Bookmark>;
    /// Returns whether a bookmark was removed.
    async fn remove_bookmark(&self, user_id: i64, video_id: &str) -> Result<bool>;
    async fn is_bookmarked(&self, user_id: i64, video_id: &str) -> Result<bool>;

    // Study sessions
    async fn list_study_sessions(&self, user_id: i64) -> Result<Vec<StudySession>>;
    async fn add_study_session(&self, user_id: i64, session: NewStudySession) -> Result<StudySession>;
    /// Sum of all session durations in minutes.
    async fn total_study_minutes(&self, user_id: i64) -> Result<i64>;

    // Notes
    async fn list_notes(&self, user_id: i64, filter: &SubjectFilter) -> Result<Vec<Note>>;
    async fn create_note(&self, user_id: i64, note: NewNote) -> Result<Note>;
    /// Replace title, content and subject; `created_at` is kept.
    async fn update_note(&self, user_id: i64, id: i64, note: NewNote) -> Result<Option<Note>>;
    async fn delete_note(&self, user_id: i64, id: i64) -> Result<bool>;

    // Tasks
    async fn list_tasks(&self, user_id: i64, filter: &TaskFilter) -> Result<Vec<Task>>;
    async fn create_task(&self, user_id: i64, task: NewTask) -> Result<Task>;
    async fn update_task(&self, user_id: i64, id: i64, patch: TaskPatch) -> Result<Option<Task>>;
    async fn delete_task(&self, user_id: i64, id: i64) -> Result<bool>;

    // Flashcards
    async fn list_flashcards(&self, user_id: i64, filter: &SubjectFilter) -> Result<Vec<Flashcard>>;
    /// New cards are due immediately.
    async fn create_flashcard(&self, user_id: i64, card: NewFlashcard) -> Result<Flashcard>;
    async fn rate_flashcard(
        &self,
        user_id: i64,
        id: i64,
        difficulty: Difficulty,
        now: DateTime<Utc>,
    ) -> Result<Option<Flashcard>>;
    async fn delete_flashcard(&self, user_id: i64, id: i64) -> Result<bool>;

    // Goals
    async fn list_goals(&self, user_id: i64) -> Result<Vec<Goal>>;
    async fn goals_for_day(&self, user_id: i64, day: NaiveDate) -> Result<Vec<Goal>>;
    async fn create_goal(&self, user_id: i64, goal: NewGoal) -> Result<Goal>;
    async fn set_goal_completed(&self, user_id: i64, id: i64, completed: bool) -> Result<Option<Goal>>;
    async fn delete_goal(&self, user_id: i64, id: i64) -> Result<bool>;

    // Schedules
    /// Ordered by day of week, then start time.
    async fn list_schedules(&self, user_id: i64, day: Option<u8>) -> Result<Vec<Schedule>>;
    async fn create_schedule(&self, user_id: i64, schedule: NewSchedule) -> Result<Schedule>;
    async fn delete_schedule(&self, user_id: i64, id: i64) -> Result<bool>;
}

/// Open the configured store.
pub fn open(settings: &Settings) -> Result<Arc<dyn Storage>> {
    let store: Arc<dyn Storage> = match settings.storage.provider {
        StorageProvider::Memory => Arc::new(MemoryStore::new()),
        StorageProvider::Sqlite => Arc::new(SqliteStore::new(&settings.sqlite_path())?),
    };
    info!("Using {} storage", store.name());
    Ok(store)
}

/// Look up a user by name, creating it when missing.
pub async fn ensure_user(store: &dyn Storage, username: &str) -> Result<User> {
    if let Some(user) = store.get_user_by_username(username).await? {
        return Ok(user);
    }

    info!("Creating user '{}'", username);
    store
        .create_user(NewUser {
            username: username.to_string(),
            password: DEMO_PASSWORD.to_string(),
        })
        .await
}

fn demo_user() -> NewUser {
    NewUser {
        username: DEMO_USERNAME.to_string(),
        password: DEMO_PASSWORD.to_string(),
    }
}
