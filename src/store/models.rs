//! Study record types.
//!
//! `New*` types are what clients submit; `normalized` validates them and
//! turns blank optional text into `None` before either store persists them.

use crate::error::{FocusTubeError, Result};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{de::Error as _, Deserialize, Deserializer, Serialize};

/// Default schedule colour.
pub const DEFAULT_SCHEDULE_COLOR: &str = "#3B82F6";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub password: String,
}

impl NewUser {
    pub(crate) fn normalized(self) -> Result<Self> {
        Ok(Self {
            username: required("username", self.username)?,
            password: self.password,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    pub id: i64,
    pub user_id: i64,
    pub video_id: String,
    pub title: String,
    pub channel: String,
    pub duration: String,
    pub thumbnail: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBookmark {
    pub video_id: String,
    pub title: String,
    #[serde(default)]
    pub channel: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub thumbnail: String,
}

impl NewBookmark {
    pub(crate) fn normalized(self) -> Result<Self> {
        Ok(Self {
            video_id: required("videoId", self.video_id)?,
            title: required("title", self.title)?,
            ..self
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudySession {
    pub id: i64,
    pub user_id: i64,
    /// Minutes studied.
    pub duration: i64,
    pub subject: Option<String>,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewStudySession {
    pub duration: i64,
    pub subject: Option<String>,
}

impl NewStudySession {
    pub(crate) fn normalized(self) -> Result<Self> {
        if self.duration <= 0 {
            return Err(FocusTubeError::InvalidInput(
                "duration must be a positive number of minutes".to_string(),
            ));
        }
        Ok(Self {
            duration: self.duration,
            subject: optional(self.subject),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub content: String,
    pub subject: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewNote {
    pub title: String,
    pub content: String,
    pub subject: Option<String>,
}

impl NewNote {
    pub(crate) fn normalized(self) -> Result<Self> {
        Ok(Self {
            title: required("title", self.title)?,
            content: required("content", self.content)?,
            subject: optional(self.subject),
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            "urgent" => Ok(Priority::Urgent),
            _ => Err(format!("Unknown priority: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
        }
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(TaskStatus::Pending),
            "in_progress" => Ok(TaskStatus::InProgress),
            "completed" => Ok(TaskStatus::Completed),
            _ => Err(format!("Unknown task status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub status: TaskStatus,
    pub due_date: Option<NaiveDate>,
    pub subject: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default, deserialize_with = "due_date")]
    pub due_date: Option<NaiveDate>,
    pub subject: Option<String>,
}

impl NewTask {
    pub(crate) fn normalized(self) -> Result<Self> {
        Ok(Self {
            title: required("title", self.title)?,
            description: optional(self.description),
            subject: optional(self.subject),
            ..self
        })
    }
}

/// Partial task update; absent fields are left unchanged.
///
/// A blank `description` or `subject` clears the field.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub status: Option<TaskStatus>,
    #[serde(default, deserialize_with = "due_date")]
    pub due_date: Option<NaiveDate>,
    pub subject: Option<String>,
}

impl TaskPatch {
    /// Apply the patch, validating before touching `task`.
    pub(crate) fn apply(self, task: &mut Task) -> Result<()> {
        let title = self.title.map(|t| required("title", t)).transpose()?;

        if let Some(title) = title {
            task.title = title;
        }
        if let Some(description) = self.description {
            task.description = optional(Some(description));
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(due_date) = self.due_date {
            task.due_date = Some(due_date);
        }
        if let Some(subject) = self.subject {
            task.subject = optional(Some(subject));
        }
        Ok(())
    }
}

/// Task listing filter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    pub subject: Option<String>,
}

impl TaskFilter {
    pub fn matches(&self, task: &Task) -> bool {
        self.status.map_or(true, |s| task.status == s)
            && self.priority.map_or(true, |p| task.priority == p)
            && subject_matches(self.subject.as_deref(), task.subject.as_deref())
    }
}

/// Listing filter for records that carry a subject.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubjectFilter {
    pub subject: Option<String>,
}

impl SubjectFilter {
    pub fn matches(&self, subject: Option<&str>) -> bool {
        subject_matches(self.subject.as_deref(), subject)
    }
}

fn subject_matches(wanted: Option<&str>, actual: Option<&str>) -> bool {
    match wanted.map(str::trim).filter(|w| !w.is_empty()) {
        Some(wanted) => actual == Some(wanted),
        None => true,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    /// Time until a card rated with this difficulty is shown again.
    pub fn review_interval(&self) -> Duration {
        match self {
            Difficulty::Hard => Duration::days(1),
            Difficulty::Medium => Duration::days(3),
            Difficulty::Easy => Duration::days(7),
        }
    }
}

impl std::str::FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(format!("Unknown difficulty: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flashcard {
    pub id: i64,
    pub user_id: i64,
    pub front: String,
    pub back: String,
    pub subject: Option<String>,
    pub difficulty: Difficulty,
    pub next_review: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Flashcard {
    /// Record a review and schedule the next one.
    pub fn rate(&mut self, difficulty: Difficulty, now: DateTime<Utc>) {
        self.difficulty = difficulty;
        self.next_review = now + difficulty.review_interval();
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewFlashcard {
    pub front: String,
    pub back: String,
    pub subject: Option<String>,
    #[serde(default)]
    pub difficulty: Difficulty,
}

impl NewFlashcard {
    pub(crate) fn normalized(self) -> Result<Self> {
        Ok(Self {
            front: required("front", self.front)?,
            back: required("back", self.back)?,
            subject: optional(self.subject),
            difficulty: self.difficulty,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub target_date: NaiveDate,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGoal {
    pub title: String,
    pub description: Option<String>,
    pub target_date: NaiveDate,
}

impl NewGoal {
    pub(crate) fn normalized(self) -> Result<Self> {
        Ok(Self {
            title: required("title", self.title)?,
            description: optional(self.description),
            target_date: self.target_date,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub subject: Option<String>,
    /// `HH:MM`, 24-hour clock.
    pub start_time: String,
    pub end_time: String,
    /// 0 = Sunday.
    pub day_of_week: u8,
    pub color: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSchedule {
    pub title: String,
    pub subject: Option<String>,
    pub start_time: String,
    pub end_time: String,
    pub day_of_week: u8,
    pub color: Option<String>,
}

impl NewSchedule {
    pub(crate) fn normalized(self) -> Result<Self> {
        if self.day_of_week > 6 {
            return Err(FocusTubeError::InvalidInput(format!(
                "dayOfWeek must be between 0 and 6, got {}",
                self.day_of_week
            )));
        }

        let start = parse_clock("startTime", &self.start_time)?;
        let end = parse_clock("endTime", &self.end_time)?;
        if start >= end {
            return Err(FocusTubeError::InvalidInput(
                "startTime must be before endTime".to_string(),
            ));
        }

        Ok(Self {
            title: required("title", self.title)?,
            subject: optional(self.subject),
            start_time: start.format("%H:%M").to_string(),
            end_time: end.format("%H:%M").to_string(),
            day_of_week: self.day_of_week,
            color: Some(optional(self.color).unwrap_or_else(|| DEFAULT_SCHEDULE_COLOR.to_string())),
        })
    }
}

fn parse_clock(field: &str, value: &str) -> Result<NaiveTime> {
    let value = value.trim();
    let valid_shape = value.len() == 5 && value.as_bytes()[2] == b':';
    match NaiveTime::parse_from_str(value, "%H:%M") {
        Ok(time) if valid_shape => Ok(time),
        _ => Err(FocusTubeError::InvalidInput(format!(
            "{} must be HH:MM, got '{}'",
            field, value
        ))),
    }
}

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp, keeping its UTC calendar date.
fn due_date<'de, D>(deserializer: D) -> std::result::Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.with_timezone(&Utc).date_naive()))
        .map(Some)
        .map_err(|_| {
            D::Error::custom(format!(
                "dueDate must be YYYY-MM-DD or an RFC 3339 timestamp, got '{}'",
                raw
            ))
        })
}

fn required(field: &str, value: String) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(FocusTubeError::InvalidInput(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
