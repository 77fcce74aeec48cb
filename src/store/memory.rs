//! In-memory study record store.
//!
//! Data lives for the lifetime of the process.

use super::models::*;
use super::{demo_user, Storage};
use crate::error::{FocusTubeError, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

/// Next id per entity kind; every counter starts at 1.
struct Counters {
    user: i64,
    bookmark: i64,
    session: i64,
    note: i64,
    task: i64,
    flashcard: i64,
    goal: i64,
    schedule: i64,
}

impl Default for Counters {
    fn default() -> Self {
        Self {
            user: 1,
            bookmark: 1,
            session: 1,
            note: 1,
            task: 1,
            flashcard: 1,
            goal: 1,
            schedule: 1,
        }
    }
}

fn next_id(counter: &mut i64) -> i64 {
    let id = *counter;
    *counter += 1;
    id
}

#[derive(Default)]
struct Tables {
    ids: Counters,
    users: BTreeMap<i64, User>,
    bookmarks: BTreeMap<i64, Bookmark>,
    sessions: BTreeMap<i64, StudySession>,
    notes: BTreeMap<i64, Note>,
    tasks: BTreeMap<i64, Task>,
    flashcards: BTreeMap<i64, Flashcard>,
    goals: BTreeMap<i64, Goal>,
    schedules: BTreeMap<i64, Schedule>,
}

/// Remove `id` from `table` if it belongs to `user_id`.
fn remove_owned<T>(table: &mut BTreeMap<i64, T>, id: i64, user_id: i64, owner: fn(&T) -> i64) -> bool {
    match table.get(&id) {
        Some(record) if owner(record) == user_id => {
            table.remove(&id);
            true
        }
        _ => false,
    }
}

/// In-memory store backed by ordered maps.
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    /// Create an empty store holding only the demo user.
    pub fn new() -> Self {
        let mut tables = Tables::default();
        let id = next_id(&mut tables.ids.user);
        let demo = demo_user();
        tables.users.insert(
            id,
            User {
                id,
                username: demo.username,
                password: demo.password,
            },
        );

        Self {
            tables: Mutex::new(tables),
        }
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|e| FocusTubeError::Storage(format!("Failed to acquire lock: {}", e)))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Storage for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>> {
        Ok(self.tables()?.users.get(&id).cloned())
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self
            .tables()?
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn create_user(&self, user: NewUser) -> Result<User> {
        let user = user.normalized()?;
        let mut tables = self.tables()?;

        if tables.users.values().any(|u| u.username == user.username) {
            return Err(FocusTubeError::InvalidInput(format!(
                "Username '{}' is already taken",
                user.username
            )));
        }

        let id = next_id(&mut tables.ids.user);
        let user = User {
            id,
            username: user.username,
            password: user.password,
        };
        tables.users.insert(id, user.clone());
        Ok(user)
    }

    async fn list_bookmarks(&self, user_id: i64) -> Result<Vec<Bookmark>> {
        Ok(self
            .tables()?
            .bookmarks
            .values()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn add_bookmark(&self, user_id: i64, bookmark: NewBookmark) -> Result<Bookmark> {
        let bookmark = bookmark.normalized()?;
        let mut tables = self.tables()?;

        if let Some(existing) = tables
            .bookmarks
            .values()
            .find(|b| b.user_id == user_id && b.video_id == bookmark.video_id)
        {
            return Ok(existing.clone());
        }

        let id = next_id(&mut tables.ids.bookmark);
        let bookmark = Bookmark {
            id,
            user_id,
            video_id: bookmark.video_id,
            title: bookmark.title,
            channel: bookmark.channel,
            duration: bookmark.duration,
            thumbnail: bookmark.thumbnail,
            created_at: Utc::now(),
        };
        tables.bookmarks.insert(id, bookmark.clone());
        Ok(bookmark)
    }

    async fn remove_bookmark(&self, user_id: i64, video_id: &str) -> Result<bool> {
        let mut tables = self.tables()?;
        let before = tables.bookmarks.len();
        tables
            .bookmarks
            .retain(|_, b| !(b.user_id == user_id && b.video_id == video_id));
        Ok(tables.bookmarks.len() < before)
    }

    async fn is_bookmarked(&self, user_id: i64, video_id: &str) -> Result<bool> {
        Ok(self
            .tables()?
            .bookmarks
            .values()
            .any(|b| b.user_id == user_id && b.video_id == video_id))
    }

    async fn list_study_sessions(&self, user_id: i64) -> Result<Vec<StudySession>> {
        Ok(self
            .tables()?
            .sessions
            .values()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn add_study_session(&self, user_id: i64, session: NewStudySession) -> Result<StudySession> {
        let session = session.normalized()?;
        let mut tables = self.tables()?;

        let id = next_id(&mut tables.ids.session);
        let session = StudySession {
            id,
            user_id,
            duration: session.duration,
            subject: session.subject,
            date: Utc::now(),
        };
        tables.sessions.insert(id, session.clone());
        Ok(session)
    }

    async fn total_study_minutes(&self, user_id: i64) -> Result<i64> {
        Ok(self
            .tables()?
            .sessions
            .values()
            .filter(|s| s.user_id == user_id)
            .map(|s| s.duration)
            .sum())
    }

    async fn list_notes(&self, user_id: i64, filter: &SubjectFilter) -> Result<Vec<Note>> {
        Ok(self
            .tables()?
            .notes
            .values()
            .filter(|n| n.user_id == user_id && filter.matches(n.subject.as_deref()))
            .cloned()
            .collect())
    }

    async fn create_note(&self, user_id: i64, note: NewNote) -> Result<Note> {
        let note = note.normalized()?;
        let mut tables = self.tables()?;

        let id = next_id(&mut tables.ids.note);
        let now = Utc::now();
        let note = Note {
            id,
            user_id,
            title: note.title,
            content: note.content,
            subject: note.subject,
            created_at: now,
            updated_at: now,
        };
        tables.notes.insert(id, note.clone());
        Ok(note)
    }

    async fn update_note(&self, user_id: i64, id: i64, note: NewNote) -> Result<Option<Note>> {
        let note = note.normalized()?;
        let mut tables = self.tables()?;

        let Some(existing) = tables.notes.get_mut(&id).filter(|n| n.user_id == user_id) else {
            return Ok(None);
        };
        existing.title = note.title;
        existing.content = note.content;
        existing.subject = note.subject;
        existing.updated_at = Utc::now();
        Ok(Some(existing.clone()))
    }

    async fn delete_note(&self, user_id: i64, id: i64) -> Result<bool> {
        Ok(remove_owned(&mut self.tables()?.notes, id, user_id, |n| n.user_id))
    }

    async fn list_tasks(&self, user_id: i64, filter: &TaskFilter) -> Result<Vec<Task>> {
        Ok(self
            .tables()?
            .tasks
            .values()
            .filter(|t| t.user_id == user_id && filter.matches(t))
            .cloned()
            .collect())
    }

    async fn create_task(&self, user_id: i64, task: NewTask) -> Result<Task> {
        let task = task.normalized()?;
        let mut tables = self.tables()?;

        let id = next_id(&mut tables.ids.task);
        let task = Task {
            id,
            user_id,
            title: task.title,
            description: task.description,
            priority: task.priority,
            status: task.status,
            due_date: task.due_date,
            subject: task.subject,
            created_at: Utc::now(),
        };
        tables.tasks.insert(id, task.clone());
        Ok(task)
    }

    async fn update_task(&self, user_id: i64, id: i64, patch: TaskPatch) -> Result<Option<Task>> {
        let mut tables = self.tables()?;

        let Some(existing) = tables.tasks.get_mut(&id).filter(|t| t.user_id == user_id) else {
            return Ok(None);
        };
        patch.apply(existing)?;
        Ok(Some(existing.clone()))
    }

    async fn delete_task(&self, user_id: i64, id: i64) -> Result<bool> {
        Ok(remove_owned(&mut self.tables()?.tasks, id, user_id, |t| t.user_id))
    }

    async fn list_flashcards(&self, user_id: i64, filter: &SubjectFilter) -> Result<Vec<Flashcard>> {
        Ok(self
            .tables()?
            .flashcards
            .values()
            .filter(|c| c.user_id == user_id && filter.matches(c.subject.as_deref()))
            .cloned()
            .collect())
    }

    async fn create_flashcard(&self, user_id: i64, card: NewFlashcard) -> Result<Flashcard> {
        let card = card.normalized()?;
        let mut tables = self.tables()?;

        let id = next_id(&mut tables.ids.flashcard);
        let now = Utc::now();
        let card = Flashcard {
            id,
            user_id,
            front: card.front,
            back: card.back,
            subject: card.subject,
            difficulty: card.difficulty,
            next_review: now,
            created_at: now,
        };
        tables.flashcards.insert(id, card.clone());
        Ok(card)
    }

    async fn rate_flashcard(
        &self,
        user_id: i64,
        id: i64,
        difficulty: Difficulty,
        now: DateTime<Utc>,
    ) -> Result<Option<Flashcard>> {
        let mut tables = self.tables()?;

        let Some(card) = tables.flashcards.get_mut(&id).filter(|c| c.user_id == user_id) else {
            return Ok(None);
        };
        card.rate(difficulty, now);
        Ok(Some(card.clone()))
    }

    async fn delete_flashcard(&self, user_id: i64, id: i64) -> Result<bool> {
        Ok(remove_owned(&mut self.tables()?.flashcards, id, user_id, |c| c.user_id))
    }

    async fn list_goals(&self, user_id: i64) -> Result<Vec<Goal>> {
        Ok(self
            .tables()?
            .goals
            .values()
            .filter(|g| g.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn goals_for_day(&self, user_id: i64, day: NaiveDate) -> Result<Vec<Goal>> {
        Ok(self
            .tables()?
            .goals
            .values()
            .filter(|g| g.user_id == user_id && g.target_date == day)
            .cloned()
            .collect())
    }

    async fn create_goal(&self, user_id: i64, goal: NewGoal) -> Result<Goal> {
        let goal = goal.normalized()?;
        let mut tables = self.tables()?;

        let id = next_id(&mut tables.ids.goal);
        let goal = Goal {
            id,
            user_id,
            title: goal.title,
            description: goal.description,
            target_date: goal.target_date,
            completed: false,
            created_at: Utc::now(),
        };
        tables.goals.insert(id, goal.clone());
        Ok(goal)
    }

    async fn set_goal_completed(&self, user_id: i64, id: i64, completed: bool) -> Result<Option<Goal>> {
        let mut tables = self.tables()?;

        let Some(goal) = tables.goals.get_mut(&id).filter(|g| g.user_id == user_id) else {
            return Ok(None);
        };
        goal.completed = completed;
        Ok(Some(goal.clone()))
    }

    async fn delete_goal(&self, user_id: i64, id: i64) -> Result<bool> {
        Ok(remove_owned(&mut self.tables()?.goals, id, user_id, |g| g.user_id))
    }

    async fn list_schedules(&self, user_id: i64, day: Option<u8>) -> Result<Vec<Schedule>> {
        let mut schedules: Vec<Schedule> = self
            .tables()?
            .schedules
            .values()
            .filter(|s| s.user_id == user_id && day.map_or(true, |d| s.day_of_week == d))
            .cloned()
            .collect();

        schedules.sort_by(|a, b| {
            a.day_of_week
                .cmp(&b.day_of_week)
                .then_with(|| a.start_time.cmp(&b.start_time))
        });
        Ok(schedules)
    }

    async fn create_schedule(&self, user_id: i64, schedule: NewSchedule) -> Result<Schedule> {
        let schedule = schedule.normalized()?;
        let mut tables = self.tables()?;

        let id = next_id(&mut tables.ids.schedule);
        let schedule = Schedule {
            id,
            user_id,
            title: schedule.title,
            subject: schedule.subject,
            start_time: schedule.start_time,
            end_time: schedule.end_time,
            day_of_week: schedule.day_of_week,
            color: schedule.color.unwrap_or_else(|| DEFAULT_SCHEDULE_COLOR.to_string()),
            created_at: Utc::now(),
        };
        tables.schedules.insert(id, schedule.clone());
        Ok(schedule)
    }

    async fn delete_schedule(&self, user_id: i64, id: i64) -> Result<bool> {
        Ok(remove_owned(&mut self.tables()?.schedules, id, user_id, |s| s.user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::contract;

    #[tokio::test]
    async fn test_users() {
        contract::users(&MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn test_bookmarks() {
        contract::bookmarks(&MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn test_study_sessions() {
        contract::study_sessions(&MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn test_notes() {
        contract::notes(&MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn test_tasks() {
        contract::tasks(&MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn test_flashcards() {
        contract::flashcards(&MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn test_goals() {
        contract::goals(&MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn test_schedules() {
        contract::schedules(&MemoryStore::new()).await;
    }
}
