// HTTP request handlers
use crate::infrastructure::http_response::json_error;
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

const USER_HEADER: &str = "x-user-id";

#[derive(Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Deserialize)]
pub struct TitleUpdate {
    #[serde(default)]
    pub title: Option<String>,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Current conditions, forecast and advice for a location
pub async fn air_pollution(State(state): State<Arc<AppState>>, Json(body): Json<Value>) -> Response {
    let Some(fields) = body.as_object().filter(|o| o.contains_key("latitude") && o.contains_key("longitude"))
    else {
        return json_error(StatusCode::BAD_REQUEST, "Missing required fields: latitude, longitude");
    };

    let latitude = fields.get("latitude").and_then(coordinate);
    let longitude = fields.get("longitude").and_then(coordinate);
    let place = fields.get("placeInfo").and_then(Value::as_str).map(str::to_string);

    match state.air_quality_service.aggregate(latitude, longitude, place).await {
        Ok(response) if response.is_failure() => {
            tracing::warn!("Air pollution aggregation failed: {}", response.recommendations);
            json_error(
                StatusCode::BAD_REQUEST,
                "Unable to fetch air pollution data. Please try again later.",
            )
        }
        Ok(response) => Json(response).into_response(),
        Err(e) => json_error(StatusCode::BAD_REQUEST, e.to_string()),
    }
}

/// Coordinates arrive as JSON numbers or numeric strings.
fn coordinate(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Identity of the caller, set by the session layer in front of this service.
fn user_id(headers: &HeaderMap) -> Result<i64, Response> {
    headers
        .get(USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
        .ok_or_else(|| json_error(StatusCode::UNAUTHORIZED, "Unauthorized access"))
}

pub async fn chatbot(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatRequest>,
) -> Response {
    let user = match user_id(&headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    let message = request.message.unwrap_or_default();

    match state.chat_service.send(user, &message).await {
        Ok(reply) => Json(json!({ "response": reply })).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn chat_history(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    let user = match user_id(&headers) {
        Ok(user) => user,
        Err(response) => return response,
    };

    match state.chat_service.history(user).await {
        Ok(history) => Json(json!({ "history": history })).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn chat_detail(
    Path(id): Path<u64>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    let user = match user_id(&headers) {
        Ok(user) => user,
        Err(response) => return response,
    };

    match state.chat_service.detail(user, id).await {
        Ok(entry) => Json(entry).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn update_chat_title(
    Path(id): Path<u64>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(update): Json<TitleUpdate>,
) -> Response {
    let user = match user_id(&headers) {
        Ok(user) => user,
        Err(response) => return response,
    };

    match state.chat_service.rename(user, id, update.title).await {
        Ok(title) => Json(json!({ "message": "Title updated", "title": title })).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn delete_chat(
    Path(id): Path<u64>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    let user = match user_id(&headers) {
        Ok(user) => user,
        Err(response) => return response,
    };

    match state.chat_service.delete(user, id).await {
        Ok(()) => Json(json!({ "message": "Chat deleted successfully" })).into_response(),
        Err(e) => e.into_response(),
    }
}
