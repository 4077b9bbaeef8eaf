use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use log::{error, info};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};
use tower_http::cors::CorsLayer;

use crate::error::StoreError;
use crate::sink::TaskSink;
use crate::store::{Statistics, TaskFilter, TaskStore};
use crate::task::{NewTask, Task, TaskId};

/// One lock around the whole store: every request runs its load/mutate/save cycle alone.
pub type SharedStore<S> = Arc<Mutex<TaskStore<S>>>;

#[derive(Deserialize, Default)]
pub struct ListQuery {
    priority: Option<String>,
    status: Option<String>,
    category: Option<String>,
}

#[derive(Deserialize)]
pub struct SearchQuery {
    q: String,
}

#[derive(Debug)]
pub enum ApiError {
    NotFound(TaskId),
    Store(StoreError),
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        ApiError::Store(e)
    }
}

impl From<crate::error::ValidationError> for ApiError {
    fn from(e: crate::error::ValidationError) -> Self {
        ApiError::Store(e.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(id) => (StatusCode::NOT_FOUND, format!("task {id} not found")),
            ApiError::Store(e @ StoreError::Validation(_)) => (StatusCode::BAD_REQUEST, e.to_string()),
            ApiError::Store(e) => {
                error!("store failure: {e}");
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        };
        (status, Json(serde_json::json!({"status": "error", "message": message}))).into_response()
    }
}

pub fn router<S: TaskSink + Send + 'static>(store: SharedStore<S>) -> Router {
    Router::new()
        .route("/api/tasks", get(list_tasks::<S>).post(add_task::<S>))
        .route("/api/tasks/{id}", get(get_task::<S>).delete(delete_task::<S>))
        .route("/api/tasks/{id}/complete", post(complete_task::<S>))
        .route("/api/tasks/{id}/uncomplete", post(uncomplete_task::<S>))
        .route("/api/search", get(search_tasks::<S>))
        .route("/api/stats", get(get_statistics::<S>))
        .layer(CorsLayer::permissive())
        .with_state(store)
}

pub async fn start_server<S: TaskSink + Send + 'static>(
    store: TaskStore<S>,
    port: u16,
) -> anyhow::Result<()> {
    let app = router(Arc::new(Mutex::new(store)));

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening on {addr}");
    println!("🌐 Think-Todo API is running at: http://localhost:{}", port);

    axum::serve(listener, app).await?;
    Ok(())
}

// A panic while holding the lock leaves the store consistent (mutations roll back on save
// failure), so a poisoned lock is still usable.
fn lock<S>(store: &SharedStore<S>) -> MutexGuard<'_, TaskStore<S>> {
    store.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

async fn list_tasks<S: TaskSink>(
    State(store): State<SharedStore<S>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Task>>, ApiError> {
    let filter = TaskFilter::parse(
        query.priority.as_deref(),
        query.status.as_deref(),
        query.category.as_deref(),
    )?;
    let store = lock(&store);
    Ok(Json(store.list_tasks(&filter).into_iter().cloned().collect()))
}

async fn add_task<S: TaskSink>(
    State(store): State<SharedStore<S>>,
    Json(req): Json<NewTask>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let task = lock(&store).add_task(req)?;
    Ok((StatusCode::CREATED, Json(task)))
}

async fn get_task<S: TaskSink>(
    State(store): State<SharedStore<S>>,
    Path(id): Path<TaskId>,
) -> Result<Json<Task>, ApiError> {
    lock(&store)
        .get_task(id)
        .cloned()
        .map(Json)
        .ok_or(ApiError::NotFound(id))
}

async fn delete_task<S: TaskSink>(
    State(store): State<SharedStore<S>>,
    Path(id): Path<TaskId>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if lock(&store).delete_task(id)? {
        Ok(Json(serde_json::json!({"status": "success"})))
    } else {
        Err(ApiError::NotFound(id))
    }
}

async fn complete_task<S: TaskSink>(
    State(store): State<SharedStore<S>>,
    Path(id): Path<TaskId>,
) -> Result<Json<Task>, ApiError> {
    set_completed(&store, id, true)
}

async fn uncomplete_task<S: TaskSink>(
    State(store): State<SharedStore<S>>,
    Path(id): Path<TaskId>,
) -> Result<Json<Task>, ApiError> {
    set_completed(&store, id, false)
}

fn set_completed<S: TaskSink>(
    store: &SharedStore<S>,
    id: TaskId,
    completed: bool,
) -> Result<Json<Task>, ApiError> {
    let mut store = lock(store);
    let found = if completed {
        store.complete_task(id)?
    } else {
        store.uncomplete_task(id)?
    };
    match (found, store.get_task(id)) {
        (true, Some(task)) => Ok(Json(task.clone())),
        _ => Err(ApiError::NotFound(id)),
    }
}

async fn search_tasks<S: TaskSink>(
    State(store): State<SharedStore<S>>,
    Query(query): Query<SearchQuery>,
) -> Json<Vec<Task>> {
    let store = lock(&store);
    Json(store.search_tasks(&query.q).into_iter().cloned().collect())
}

async fn get_statistics<S: TaskSink>(State(store): State<SharedStore<S>>) -> Json<Statistics> {
    Json(lock(&store).get_statistics())
}
