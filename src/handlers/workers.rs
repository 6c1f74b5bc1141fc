// src/handlers/workers.rs

use std::str::FromStr;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use axum_extra::extract::WithRejection;
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        db_utils::get_connection,
        error::{ApiError, AppError},
        query::ListQuery,
        validation,
    },
    config::AppState,
    middleware::i18n::Locale,
    models::workers::{
        AssignmentDetail, AssignmentPatch, AssignmentPayload, WorkerDetail, WorkerPatch, WorkerPayload,
        WorkerRole,
    },
};

// =============================================================================
//  TRABALHADORES
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/workers",
    tag = "Workers",
    params(ListQuery),
    responses(
        (status = 200, description = "Trabalhadores com idade e tempo de casa", body = [WorkerDetail])
    )
)]
pub async fn list_workers(
    State(app_state): State<AppState>,
    locale: Locale,
    WithRejection(Query(query), _): WithRejection<Query<ListQuery>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_connection(&app_state)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let workers = app_state
        .worker_service
        .list_workers(&mut *conn, &query, Utc::now().date_naive())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(workers))
}

#[utoipa::path(
    get,
    path = "/api/workers/by-role/{role}",
    tag = "Workers",
    params(("role" = WorkerRole, Path, description = "Função do trabalhador")),
    responses(
        (status = 200, description = "Trabalhadores ativos com a função", body = [WorkerDetail]),
        (status = 400, description = "Função desconhecida")
    )
)]
pub async fn workers_by_role(
    State(app_state): State<AppState>,
    locale: Locale,
    WithRejection(Path(role), _): WithRejection<Path<String>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let role = WorkerRole::from_str(&role).map_err(|value| {
        AppError::field("role", validation::invalid_choice(&value))
            .to_api_error(&locale, &app_state.i18n_store)
    })?;

    let mut conn = get_connection(&app_state)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let workers = app_state
        .worker_service
        .workers_by_role(&mut *conn, role, Utc::now().date_naive())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(workers))
}

#[utoipa::path(
    post,
    path = "/api/workers",
    tag = "Workers",
    request_body = WorkerPayload,
    responses(
        (status = 201, description = "Trabalhador cadastrado", body = WorkerDetail),
        (status = 400, description = "Dados inválidos"),
        (status = 409, description = "Documento já cadastrado")
    )
)]
pub async fn create_worker(
    State(app_state): State<AppState>,
    locale: Locale,
    WithRejection(Json(payload), _): WithRejection<Json<WorkerPayload>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut conn = get_connection(&app_state)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let worker = app_state
        .worker_service
        .create_worker(&mut *conn, &payload, Utc::now().date_naive())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(worker)))
}

#[utoipa::path(
    get,
    path = "/api/workers/{id}",
    tag = "Workers",
    params(("id" = Uuid, Path, description = "ID do trabalhador")),
    responses(
        (status = 200, description = "Trabalhador", body = WorkerDetail),
        (status = 404, description = "Trabalhador não encontrado")
    )
)]
pub async fn get_worker(
    State(app_state): State<AppState>,
    locale: Locale,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_connection(&app_state)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let worker = app_state
        .worker_service
        .get_worker(&mut *conn, id, Utc::now().date_naive())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(worker))
}

#[utoipa::path(
    put,
    path = "/api/workers/{id}",
    tag = "Workers",
    request_body = WorkerPayload,
    params(("id" = Uuid, Path, description = "ID do trabalhador")),
    responses(
        (status = 200, description = "Trabalhador atualizado", body = WorkerDetail),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Trabalhador não encontrado")
    )
)]
pub async fn update_worker(
    State(app_state): State<AppState>,
    locale: Locale,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
    WithRejection(Json(payload), _): WithRejection<Json<WorkerPayload>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut conn = get_connection(&app_state)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let worker = app_state
        .worker_service
        .update_worker(&mut *conn, id, &payload, Utc::now().date_naive())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(worker))
}

#[utoipa::path(
    patch,
    path = "/api/workers/{id}",
    tag = "Workers",
    request_body = WorkerPatch,
    params(("id" = Uuid, Path, description = "ID do trabalhador")),
    responses(
        (status = 200, description = "Trabalhador atualizado", body = WorkerDetail),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Trabalhador não encontrado")
    )
)]
pub async fn patch_worker(
    State(app_state): State<AppState>,
    locale: Locale,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
    WithRejection(Json(patch), _): WithRejection<Json<WorkerPatch>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_connection(&app_state)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let worker = app_state
        .worker_service
        .patch_worker(&mut *conn, id, patch, Utc::now().date_naive())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(worker))
}

#[utoipa::path(
    delete,
    path = "/api/workers/{id}",
    tag = "Workers",
    params(("id" = Uuid, Path, description = "ID do trabalhador")),
    responses(
        (status = 204, description = "Trabalhador removido com suas atribuições"),
        (status = 404, description = "Trabalhador não encontrado")
    )
)]
pub async fn delete_worker(
    State(app_state): State<AppState>,
    locale: Locale,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_connection(&app_state)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .worker_service
        .delete_worker(&mut *conn, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  ATRIBUIÇÕES
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/assignments",
    tag = "Assignments",
    params(ListQuery),
    responses(
        (status = 200, description = "Atribuições com custo de mão de obra", body = [AssignmentDetail])
    )
)]
pub async fn list_assignments(
    State(app_state): State<AppState>,
    locale: Locale,
    WithRejection(Query(query), _): WithRejection<Query<ListQuery>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_connection(&app_state)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let assignments = app_state
        .worker_service
        .list_assignments(&mut *conn, &query)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(assignments))
}

#[utoipa::path(
    post,
    path = "/api/assignments",
    tag = "Assignments",
    request_body = AssignmentPayload,
    responses(
        (status = 201, description = "Atribuição criada", body = AssignmentDetail),
        (status = 400, description = "Dados inválidos ou referência inexistente"),
        (status = 409, description = "Trabalhador já atribuído à tarefa")
    )
)]
pub async fn create_assignment(
    State(app_state): State<AppState>,
    locale: Locale,
    WithRejection(Json(payload), _): WithRejection<Json<AssignmentPayload>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut conn = get_connection(&app_state)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let assignment = app_state
        .worker_service
        .create_assignment(&mut *conn, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(assignment)))
}

#[utoipa::path(
    get,
    path = "/api/assignments/{id}",
    tag = "Assignments",
    params(("id" = Uuid, Path, description = "ID da atribuição")),
    responses(
        (status = 200, description = "Atribuição", body = AssignmentDetail),
        (status = 404, description = "Atribuição não encontrada")
    )
)]
pub async fn get_assignment(
    State(app_state): State<AppState>,
    locale: Locale,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_connection(&app_state)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let assignment = app_state
        .worker_service
        .get_assignment(&mut *conn, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(assignment))
}

#[utoipa::path(
    put,
    path = "/api/assignments/{id}",
    tag = "Assignments",
    request_body = AssignmentPayload,
    params(("id" = Uuid, Path, description = "ID da atribuição")),
    responses(
        (status = 200, description = "Atribuição atualizada", body = AssignmentDetail),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Atribuição não encontrada")
    )
)]
pub async fn update_assignment(
    State(app_state): State<AppState>,
    locale: Locale,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
    WithRejection(Json(payload), _): WithRejection<Json<AssignmentPayload>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut conn = get_connection(&app_state)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let assignment = app_state
        .worker_service
        .update_assignment(&mut *conn, id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(assignment))
}

#[utoipa::path(
    patch,
    path = "/api/assignments/{id}",
    tag = "Assignments",
    request_body = AssignmentPatch,
    params(("id" = Uuid, Path, description = "ID da atribuição")),
    responses(
        (status = 200, description = "Atribuição atualizada", body = AssignmentDetail),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Atribuição não encontrada")
    )
)]
pub async fn patch_assignment(
    State(app_state): State<AppState>,
    locale: Locale,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
    WithRejection(Json(patch), _): WithRejection<Json<AssignmentPatch>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_connection(&app_state)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let assignment = app_state
        .worker_service
        .patch_assignment(&mut *conn, id, patch)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(assignment))
}

#[utoipa::path(
    delete,
    path = "/api/assignments/{id}",
    tag = "Assignments",
    params(("id" = Uuid, Path, description = "ID da atribuição")),
    responses(
        (status = 204, description = "Atribuição removida"),
        (status = 404, description = "Atribuição não encontrada")
    )
)]
pub async fn delete_assignment(
    State(app_state): State<AppState>,
    locale: Locale,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_connection(&app_state)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .worker_service
        .delete_assignment(&mut *conn, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
