use axum::{
    extract::{Json, State},
    http::{StatusCode, Uri},
    response::IntoResponse,
};

use tabstats_app_api::{EmptyRequest, IngestRequest, TabRenderDataRequest};

use crate::{errors::HttpError, state::HttpState};

pub async fn health() -> impl IntoResponse {
    Json(tabstats_app_api::health())
}

pub async fn reports(
    State(state): State<HttpState>,
    Json(_): Json<EmptyRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = tabstats_app_api::reports(&state.context)?;
    Ok(Json(response))
}

pub async fn tab_render_form(
    State(state): State<HttpState>,
    Json(_): Json<EmptyRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = tabstats_app_api::tab_render_form(&state.context)?;
    Ok(Json(response))
}

pub async fn tab_render_data(
    State(state): State<HttpState>,
    Json(req): Json<TabRenderDataRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = tabstats_app_api::tab_render_data(&state.context, req)?;
    Ok(Json(response))
}

pub async fn tabs(
    State(state): State<HttpState>,
    Json(_): Json<EmptyRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = tabstats_app_api::tabs(&state.context)?;
    Ok(Json(response))
}

pub async fn groups(
    State(state): State<HttpState>,
    Json(_): Json<EmptyRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = tabstats_app_api::groups(&state.context)?;
    Ok(Json(response))
}

pub async fn ingest(
    State(state): State<HttpState>,
    Json(req): Json<IngestRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let context = state.context.clone();
    let stats = tokio::task::spawn_blocking(move || tabstats_app_api::ingest(&context, req))
        .await
        .map_err(|err| {
            HttpError::new(StatusCode::INTERNAL_SERVER_ERROR, err.to_string(), None)
        })??;
    Ok(Json(stats))
}

pub async fn not_found(uri: Uri) -> HttpError {
    HttpError::new(
        StatusCode::NOT_FOUND,
        format!("no route for {}", uri.path()),
        Some("not_found".to_string()),
    )
}
