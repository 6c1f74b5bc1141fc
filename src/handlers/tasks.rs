// src/handlers/tasks.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use axum_extra::extract::WithRejection;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        db_utils::get_connection,
        error::{ApiError, AppError},
        query::ListQuery,
    },
    config::AppState,
    middleware::i18n::Locale,
    models::tasks::{
        TaskDetail, TaskPatch, TaskPayload, TaskType, TaskTypePatch, TaskTypePayload,
        TaskWorkerSummary,
    },
};

// =============================================================================
//  TIPOS DE TAREFA
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/task-types",
    tag = "Task Types",
    params(ListQuery),
    responses(
        (status = 200, description = "Catálogo de tipos de tarefa", body = [TaskType])
    )
)]
pub async fn list_task_types(
    State(app_state): State<AppState>,
    locale: Locale,
    WithRejection(Query(query), _): WithRejection<Query<ListQuery>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_connection(&app_state)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let task_types = app_state
        .task_service
        .list_task_types(&mut *conn, &query)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(task_types))
}

#[utoipa::path(
    post,
    path = "/api/task-types",
    tag = "Task Types",
    request_body = TaskTypePayload,
    responses(
        (status = 201, description = "Tipo de tarefa criado", body = TaskType),
        (status = 400, description = "Dados inválidos"),
        (status = 409, description = "Nome já cadastrado")
    )
)]
pub async fn create_task_type(
    State(app_state): State<AppState>,
    locale: Locale,
    WithRejection(Json(payload), _): WithRejection<Json<TaskTypePayload>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut conn = get_connection(&app_state)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let task_type = app_state
        .task_service
        .create_task_type(&mut *conn, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(task_type)))
}

#[utoipa::path(
    get,
    path = "/api/task-types/{id}",
    tag = "Task Types",
    params(("id" = Uuid, Path, description = "ID do tipo de tarefa")),
    responses(
        (status = 200, description = "Tipo de tarefa", body = TaskType),
        (status = 404, description = "Tipo de tarefa não encontrado")
    )
)]
pub async fn get_task_type(
    State(app_state): State<AppState>,
    locale: Locale,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_connection(&app_state)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let task_type = app_state
        .task_service
        .get_task_type(&mut *conn, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(task_type))
}

#[utoipa::path(
    put,
    path = "/api/task-types/{id}",
    tag = "Task Types",
    request_body = TaskTypePayload,
    params(("id" = Uuid, Path, description = "ID do tipo de tarefa")),
    responses(
        (status = 200, description = "Tipo de tarefa atualizado", body = TaskType),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Tipo de tarefa não encontrado")
    )
)]
pub async fn update_task_type(
    State(app_state): State<AppState>,
    locale: Locale,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
    WithRejection(Json(payload), _): WithRejection<Json<TaskTypePayload>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut conn = get_connection(&app_state)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let task_type = app_state
        .task_service
        .update_task_type(&mut *conn, id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(task_type))
}

#[utoipa::path(
    patch,
    path = "/api/task-types/{id}",
    tag = "Task Types",
    request_body = TaskTypePatch,
    params(("id" = Uuid, Path, description = "ID do tipo de tarefa")),
    responses(
        (status = 200, description = "Tipo de tarefa atualizado", body = TaskType),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Tipo de tarefa não encontrado")
    )
)]
pub async fn patch_task_type(
    State(app_state): State<AppState>,
    locale: Locale,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
    WithRejection(Json(patch), _): WithRejection<Json<TaskTypePatch>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_connection(&app_state)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let task_type = app_state
        .task_service
        .patch_task_type(&mut *conn, id, patch)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(task_type))
}

#[utoipa::path(
    delete,
    path = "/api/task-types/{id}",
    tag = "Task Types",
    params(("id" = Uuid, Path, description = "ID do tipo de tarefa")),
    responses(
        (status = 204, description = "Tipo de tarefa removido"),
        (status = 404, description = "Tipo de tarefa não encontrado"),
        (status = 409, description = "Tipo de tarefa ainda usado por tarefas")
    )
)]
pub async fn delete_task_type(
    State(app_state): State<AppState>,
    locale: Locale,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_connection(&app_state)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .task_service
        .delete_task_type(&mut *conn, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  TAREFAS
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/tasks",
    tag = "Tasks",
    params(ListQuery),
    responses(
        (status = 200, description = "Tarefas com contagens e eficiências", body = [TaskDetail])
    )
)]
pub async fn list_tasks(
    State(app_state): State<AppState>,
    locale: Locale,
    WithRejection(Query(query), _): WithRejection<Query<ListQuery>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_connection(&app_state)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let tasks = app_state
        .task_service
        .list_tasks(&mut *conn, &query)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(tasks))
}

#[utoipa::path(
    post,
    path = "/api/tasks",
    tag = "Tasks",
    request_body = TaskPayload,
    responses(
        (status = 201, description = "Tarefa criada", body = TaskDetail),
        (status = 400, description = "Dados inválidos ou lote/tipo inexistente")
    )
)]
pub async fn create_task(
    State(app_state): State<AppState>,
    locale: Locale,
    WithRejection(Json(payload), _): WithRejection<Json<TaskPayload>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut conn = get_connection(&app_state)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let task = app_state
        .task_service
        .create_task(&mut *conn, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(task)))
}

#[utoipa::path(
    get,
    path = "/api/tasks/by-plot/{plot_id}",
    tag = "Tasks",
    params(("plot_id" = Uuid, Path, description = "ID do lote")),
    responses(
        (status = 200, description = "Tarefas do lote", body = [TaskDetail]),
        (status = 404, description = "Lote não encontrado")
    )
)]
pub async fn tasks_by_plot(
    State(app_state): State<AppState>,
    locale: Locale,
    WithRejection(Path(plot_id), _): WithRejection<Path<Uuid>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_connection(&app_state)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let tasks = app_state
        .task_service
        .tasks_by_plot(&mut *conn, plot_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(tasks))
}

#[utoipa::path(
    get,
    path = "/api/tasks/{id}",
    tag = "Tasks",
    params(("id" = Uuid, Path, description = "ID da tarefa")),
    responses(
        (status = 200, description = "Tarefa", body = TaskDetail),
        (status = 404, description = "Tarefa não encontrada")
    )
)]
pub async fn get_task(
    State(app_state): State<AppState>,
    locale: Locale,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_connection(&app_state)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let task = app_state
        .task_service
        .get_task(&mut *conn, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(task))
}

#[utoipa::path(
    put,
    path = "/api/tasks/{id}",
    tag = "Tasks",
    request_body = TaskPayload,
    params(("id" = Uuid, Path, description = "ID da tarefa")),
    responses(
        (status = 200, description = "Tarefa atualizada", body = TaskDetail),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Tarefa não encontrada")
    )
)]
pub async fn update_task(
    State(app_state): State<AppState>,
    locale: Locale,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
    WithRejection(Json(payload), _): WithRejection<Json<TaskPayload>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut conn = get_connection(&app_state)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let task = app_state
        .task_service
        .update_task(&mut *conn, id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(task))
}

#[utoipa::path(
    patch,
    path = "/api/tasks/{id}",
    tag = "Tasks",
    request_body = TaskPatch,
    params(("id" = Uuid, Path, description = "ID da tarefa")),
    responses(
        (status = 200, description = "Tarefa atualizada", body = TaskDetail),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Tarefa não encontrada")
    )
)]
pub async fn patch_task(
    State(app_state): State<AppState>,
    locale: Locale,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
    WithRejection(Json(patch), _): WithRejection<Json<TaskPatch>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_connection(&app_state)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let task = app_state
        .task_service
        .patch_task(&mut *conn, id, patch)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(task))
}

#[utoipa::path(
    delete,
    path = "/api/tasks/{id}",
    tag = "Tasks",
    params(("id" = Uuid, Path, description = "ID da tarefa")),
    responses(
        (status = 204, description = "Tarefa removida com atribuições e consumos"),
        (status = 404, description = "Tarefa não encontrada")
    )
)]
pub async fn delete_task(
    State(app_state): State<AppState>,
    locale: Locale,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_connection(&app_state)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .task_service
        .delete_task(&mut *conn, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/tasks/{id}/workers",
    tag = "Tasks",
    params(("id" = Uuid, Path, description = "ID da tarefa")),
    responses(
        (status = 200, description = "Trabalhadores atribuídos e atribuições pendentes", body = TaskWorkerSummary),
        (status = 404, description = "Tarefa não encontrada")
    )
)]
pub async fn task_workers(
    State(app_state): State<AppState>,
    locale: Locale,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_connection(&app_state)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let summary = app_state
        .task_service
        .task_workers(&mut *conn, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(summary))
}
