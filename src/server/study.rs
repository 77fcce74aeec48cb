//! Study planner: notes, tasks, flashcards, goals and weekly schedules.

use super::error::{ApiError, ApiJson, ApiPath, ApiQuery, ApiResult};
use super::SharedState;
use crate::store::{
    Difficulty, Flashcard, Goal, NewFlashcard, NewGoal, NewNote, NewSchedule, NewTask, Note,
    Schedule, SubjectFilter, Task, TaskFilter, TaskPatch,
};
use axum::extract::State;
use axum::routing::{delete, get, patch, put};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

pub(super) fn routes() -> Router<SharedState> {
    Router::new()
        .route("/api/notes", get(list_notes).post(create_note))
        .route("/api/notes/{id}", put(update_note).delete(delete_note))
        .route("/api/tasks", get(list_tasks).post(create_task))
        .route("/api/tasks/{id}", patch(update_task).delete(delete_task))
        .route("/api/flashcards", get(list_flashcards).post(create_flashcard))
        .route("/api/flashcards/{id}", patch(rate_flashcard).delete(delete_flashcard))
        .route("/api/goals", get(list_goals).post(create_goal))
        .route("/api/goals/today", get(todays_goals))
        .route("/api/goals/{id}", patch(update_goal).delete(delete_goal))
        .route("/api/schedules", get(list_schedules).post(create_schedule))
        .route("/api/schedules/{id}", delete(delete_schedule))
}

fn found<T>(value: Option<T>, what: &str) -> ApiResult<T> {
    value.ok_or_else(|| ApiError::not_found(format!("{} not found", what)))
}

fn deleted(removed: bool, what: &str) -> ApiResult<Json<Value>> {
    if removed {
        Ok(Json(json!({ "success": true })))
    } else {
        Err(ApiError::not_found(format!("{} not found", what)))
    }
}

// === Notes ===

async fn list_notes(
    State(state): State<SharedState>,
    ApiQuery(filter): ApiQuery<SubjectFilter>,
) -> ApiResult<Json<Vec<Note>>> {
    Ok(Json(state.store.list_notes(state.user_id, &filter).await?))
}

async fn create_note(
    State(state): State<SharedState>,
    ApiJson(note): ApiJson<NewNote>,
) -> ApiResult<Json<Note>> {
    Ok(Json(state.store.create_note(state.user_id, note).await?))
}

async fn update_note(
    State(state): State<SharedState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(note): ApiJson<NewNote>,
) -> ApiResult<Json<Note>> {
    let note = state.store.update_note(state.user_id, id, note).await?;
    Ok(Json(found(note, "Note")?))
}

async fn delete_note(
    State(state): State<SharedState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Value>> {
    deleted(state.store.delete_note(state.user_id, id).await?, "Note")
}

// === Tasks ===

async fn list_tasks(
    State(state): State<SharedState>,
    ApiQuery(filter): ApiQuery<TaskFilter>,
) -> ApiResult<Json<Vec<Task>>> {
    Ok(Json(state.store.list_tasks(state.user_id, &filter).await?))
}

async fn create_task(
    State(state): State<SharedState>,
    ApiJson(task): ApiJson<NewTask>,
) -> ApiResult<Json<Task>> {
    Ok(Json(state.store.create_task(state.user_id, task).await?))
}

async fn update_task(
    State(state): State<SharedState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(patch): ApiJson<TaskPatch>,
) -> ApiResult<Json<Task>> {
    let task = state.store.update_task(state.user_id, id, patch).await?;
    Ok(Json(found(task, "Task")?))
}

async fn delete_task(
    State(state): State<SharedState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Value>> {
    deleted(state.store.delete_task(state.user_id, id).await?, "Task")
}

// === Flashcards ===

#[derive(Deserialize)]
struct Rating {
    difficulty: Difficulty,
}

async fn list_flashcards(
    State(state): State<SharedState>,
    ApiQuery(filter): ApiQuery<SubjectFilter>,
) -> ApiResult<Json<Vec<Flashcard>>> {
    Ok(Json(state.store.list_flashcards(state.user_id, &filter).await?))
}

async fn create_flashcard(
    State(state): State<SharedState>,
    ApiJson(card): ApiJson<NewFlashcard>,
) -> ApiResult<Json<Flashcard>> {
    Ok(Json(state.store.create_flashcard(state.user_id, card).await?))
}

/// Record a review; the card comes back due after the difficulty's interval.
async fn rate_flashcard(
    State(state): State<SharedState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(rating): ApiJson<Rating>,
) -> ApiResult<Json<Flashcard>> {
    let card = state
        .store
        .rate_flashcard(state.user_id, id, rating.difficulty, Utc::now())
        .await?;
    Ok(Json(found(card, "Flashcard")?))
}

async fn delete_flashcard(
    State(state): State<SharedState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Value>> {
    deleted(state.store.delete_flashcard(state.user_id, id).await?, "Flashcard")
}

// === Goals ===

#[derive(Deserialize)]
struct GoalUpdate {
    completed: bool,
}

async fn list_goals(State(state): State<SharedState>) -> ApiResult<Json<Vec<Goal>>> {
    Ok(Json(state.store.list_goals(state.user_id).await?))
}

/// Goals whose target date is today (UTC).
async fn todays_goals(State(state): State<SharedState>) -> ApiResult<Json<Vec<Goal>>> {
    let today = Utc::now().date_naive();
    Ok(Json(state.store.goals_for_day(state.user_id, today).await?))
}

async fn create_goal(
    State(state): State<SharedState>,
    ApiJson(goal): ApiJson<NewGoal>,
) -> ApiResult<Json<Goal>> {
    Ok(Json(state.store.create_goal(state.user_id, goal).await?))
}

async fn update_goal(
    State(state): State<SharedState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(update): ApiJson<GoalUpdate>,
) -> ApiResult<Json<Goal>> {
    let goal = state
        .store
        .set_goal_completed(state.user_id, id, update.completed)
        .await?;
    Ok(Json(found(goal, "Goal")?))
}

async fn delete_goal(
    State(state): State<SharedState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Value>> {
    deleted(state.store.delete_goal(state.user_id, id).await?, "Goal")
}

// === Schedules ===

#[derive(Deserialize)]
struct ScheduleQuery {
    day: Option<u8>,
}

async fn list_schedules(
    State(state): State<SharedState>,
    ApiQuery(query): ApiQuery<ScheduleQuery>,
) -> ApiResult<Json<Vec<Schedule>>> {
    Ok(Json(state.store.list_schedules(state.user_id, query.day).await?))
}

async fn create_schedule(
    State(state): State<SharedState>,
    ApiJson(schedule): ApiJson<NewSchedule>,
) -> ApiResult<Json<Schedule>> {
    Ok(Json(state.store.create_schedule(state.user_id, schedule).await?))
}

async fn delete_schedule(
    State(state): State<SharedState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Value>> {
    deleted(state.store.delete_schedule(state.user_id, id).await?, "Schedule")
}
