use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::engine::Engine;
use crate::error::AppError;
use crate::screens::{insider, orderflow, velocity};

#[derive(Clone)]
pub struct ApiState {
    pub engine: Arc<Engine>,
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/api/velocity", get(get_velocity))
        .route("/api/insider", get(get_insider))
        .route("/api/orderflow", get(get_orderflow))
        .route("/health", get(get_health))
        .with_state(state)
}

/// Envelope shared by all three screens. `updatedAt` lets the polling front
/// end show data age without trusting its own clock skew.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenResponse<T> {
    pub updated_at: String,
    pub count: usize,
    pub markets: Vec<T>,
}

fn envelope<T>(markets: Vec<T>) -> Json<ScreenResponse<T>> {
    Json(ScreenResponse {
        updated_at: chrono::Utc::now().to_rfc3339(),
        count: markets.len(),
        markets,
    })
}

async fn get_velocity(
    State(state): State<ApiState>,
) -> Result<Json<ScreenResponse<velocity::VelocityRow>>, AppError> {
    let rows = velocity::run(&state.engine).await?;
    Ok(envelope(rows))
}

async fn get_insider(
    State(state): State<ApiState>,
) -> Result<Json<ScreenResponse<insider::InsiderRow>>, AppError> {
    let rows = insider::run(&state.engine).await?;
    Ok(envelope(rows))
}

async fn get_orderflow(
    State(state): State<ApiState>,
) -> Result<Json<ScreenResponse<orderflow::OrderflowRow>>, AppError> {
    let rows = orderflow::run(&state.engine).await?;
    Ok(envelope(rows))
}

async fn get_health(State(state): State<ApiState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "db": state.engine.cfg.db_path,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
