use crate::modules::{
    error::AppError,
    models::request::{ValidatedHandle, USERNAME_REQUIRED},
    state::AppState,
};
use axum::{extract::State, http::StatusCode, Json};
use codeforces_wrapped_libs::{api::HelloResponse, WrappedStats};
use std::sync::Arc;
use tokio::time::Instant;

pub async fn hello() -> Json<HelloResponse> {
    Json(HelloResponse {
        hello: String::from(USERNAME_REQUIRED),
    })
}

pub async fn generate_wrapped(
    State(state): State<Arc<AppState>>,
    ValidatedHandle(handle): ValidatedHandle,
) -> Result<Json<WrappedStats>, AppError> {
    let start_process = Instant::now();

    let stats = state.generator.generate(&handle).await?;

    let time: u32 = Instant::now().duration_since(start_process).as_millis() as u32;
    tracing::info!(
        target: "querylog",
        "elapsed_time={} handle={} solved={} contests={}",
        time, handle, stats.total_problems_solved, stats.contests_participated
    );

    Ok(Json(stats))
}

pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

pub async fn not_found() -> AppError {
    AppError::NotFound
}
