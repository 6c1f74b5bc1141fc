// src/handlers/farms.rs

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
    },
    config::AppState,
    middleware::i18n::Locale,
    models::farms::{
        Farm, FarmDetail, FarmListEntry, FarmPatch, FarmPayload, FarmStatistics, Plot, PlotPatch,
        PlotPayload, PlotPendingTasks, PlotPlantingAge,
    },
};

// =============================================================================
//  FAZENDAS
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/farms",
    tag = "Farms",
    params(ListQuery),
    responses(
        (status = 200, description = "Fazendas com a contagem de lotes", body = [FarmListEntry])
    )
)]
pub async fn list_farms(
    State(app_state): State<AppState>,
    locale: Locale,
    WithRejection(Query(query), _): WithRejection<Query<ListQuery>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_connection(&app_state)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let farms = app_state
        .farm_service
        .list_farms(&mut *conn, &query)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(farms))
}

#[utoipa::path(
    post,
    path = "/api/farms",
    tag = "Farms",
    request_body = FarmPayload,
    responses(
        (status = 201, description = "Fazenda criada", body = Farm),
        (status = 400, description = "Dados inválidos"),
        (status = 409, description = "Já existe uma fazenda com este nome")
    )
)]
pub async fn create_farm(
    State(app_state): State<AppState>,
    locale: Locale,
    WithRejection(Json(payload), _): WithRejection<Json<FarmPayload>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut conn = get_connection(&app_state)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let farm = app_state
        .farm_service
        .create_farm(&mut *conn, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(farm)))
}

#[utoipa::path(
    get,
    path = "/api/farms/{id}",
    tag = "Farms",
    params(("id" = Uuid, Path, description = "ID da fazenda")),
    responses(
        (status = 200, description = "Fazenda com seus lotes", body = FarmDetail),
        (status = 404, description = "Fazenda não encontrada")
    )
)]
pub async fn get_farm(
    State(app_state): State<AppState>,
    locale: Locale,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_connection(&app_state)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let farm = app_state
        .farm_service
        .get_farm(&mut *conn, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(farm))
}

#[utoipa::path(
    put,
    path = "/api/farms/{id}",
    tag = "Farms",
    request_body = FarmPayload,
    params(("id" = Uuid, Path, description = "ID da fazenda")),
    responses(
        (status = 200, description = "Fazenda atualizada", body = Farm),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Fazenda não encontrada")
    )
)]
pub async fn update_farm(
    State(app_state): State<AppState>,
    locale: Locale,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
    WithRejection(Json(payload), _): WithRejection<Json<FarmPayload>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut conn = get_connection(&app_state)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let farm = app_state
        .farm_service
        .update_farm(&mut *conn, id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(farm))
}

#[utoipa::path(
    patch,
    path = "/api/farms/{id}",
    tag = "Farms",
    request_body = FarmPatch,
    params(("id" = Uuid, Path, description = "ID da fazenda")),
    responses(
        (status = 200, description = "Fazenda atualizada", body = Farm),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Fazenda não encontrada")
    )
)]
pub async fn patch_farm(
    State(app_state): State<AppState>,
    locale: Locale,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
    WithRejection(Json(patch), _): WithRejection<Json<FarmPatch>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_connection(&app_state)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    // A validação acontece no service, depois do merge com o registro atual
    let farm = app_state
        .farm_service
        .patch_farm(&mut *conn, id, patch)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(farm))
}

#[utoipa::path(
    delete,
    path = "/api/farms/{id}",
    tag = "Farms",
    params(("id" = Uuid, Path, description = "ID da fazenda")),
    responses(
        (status = 204, description = "Fazenda removida com lotes, tarefas e registros das tarefas"),
        (status = 404, description = "Fazenda não encontrada")
    )
)]
pub async fn delete_farm(
    State(app_state): State<AppState>,
    locale: Locale,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_connection(&app_state)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .farm_service
        .delete_farm(&mut *conn, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/farms/{id}/plots",
    tag = "Farms",
    params(("id" = Uuid, Path, description = "ID da fazenda")),
    responses(
        (status = 200, description = "Lotes da fazenda", body = [Plot]),
        (status = 404, description = "Fazenda não encontrada")
    )
)]
pub async fn farm_plots(
    State(app_state): State<AppState>,
    locale: Locale,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_connection(&app_state)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let plots = app_state
        .farm_service
        .farm_plots(&mut *conn, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(plots))
}

#[utoipa::path(
    get,
    path = "/api/farms/{id}/statistics",
    tag = "Farms",
    params(("id" = Uuid, Path, description = "ID da fazenda")),
    responses(
        (status = 200, description = "Área total, lotes e área cultivada", body = FarmStatistics),
        (status = 404, description = "Fazenda não encontrada")
    )
)]
pub async fn farm_statistics(
    State(app_state): State<AppState>,
    locale: Locale,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_connection(&app_state)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let statistics = app_state
        .farm_service
        .farm_statistics(&mut *conn, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(statistics))
}

// =============================================================================
//  LOTES
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/plots",
    tag = "Plots",
    params(ListQuery),
    responses(
        (status = 200, description = "Lotes", body = [Plot])
    )
)]
pub async fn list_plots(
    State(app_state): State<AppState>,
    locale: Locale,
    WithRejection(Query(query), _): WithRejection<Query<ListQuery>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_connection(&app_state)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let plots = app_state
        .farm_service
        .list_plots(&mut *conn, &query)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(plots))
}

#[utoipa::path(
    post,
    path = "/api/plots",
    tag = "Plots",
    request_body = PlotPayload,
    responses(
        (status = 201, description = "Lote criado", body = Plot),
        (status = 400, description = "Dados inválidos ou fazenda inexistente"),
        (status = 409, description = "Código de lote já cadastrado")
    )
)]
pub async fn create_plot(
    State(app_state): State<AppState>,
    locale: Locale,
    WithRejection(Json(payload), _): WithRejection<Json<PlotPayload>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut conn = get_connection(&app_state)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let plot = app_state
        .farm_service
        .create_plot(&mut *conn, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(plot)))
}

#[utoipa::path(
    get,
    path = "/api/plots/{id}",
    tag = "Plots",
    params(("id" = Uuid, Path, description = "ID do lote")),
    responses(
        (status = 200, description = "Lote", body = Plot),
        (status = 404, description = "Lote não encontrado")
    )
)]
pub async fn get_plot(
    State(app_state): State<AppState>,
    locale: Locale,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_connection(&app_state)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let plot = app_state
        .farm_service
        .get_plot(&mut *conn, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(plot))
}

#[utoipa::path(
    put,
    path = "/api/plots/{id}",
    tag = "Plots",
    request_body = PlotPayload,
    params(("id" = Uuid, Path, description = "ID do lote")),
    responses(
        (status = 200, description = "Lote atualizado", body = Plot),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Lote não encontrado")
    )
)]
pub async fn update_plot(
    State(app_state): State<AppState>,
    locale: Locale,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
    WithRejection(Json(payload), _): WithRejection<Json<PlotPayload>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut conn = get_connection(&app_state)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let plot = app_state
        .farm_service
        .update_plot(&mut *conn, id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(plot))
}

#[utoipa::path(
    patch,
    path = "/api/plots/{id}",
    tag = "Plots",
    request_body = PlotPatch,
    params(("id" = Uuid, Path, description = "ID do lote")),
    responses(
        (status = 200, description = "Lote atualizado", body = Plot),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Lote não encontrado")
    )
)]
pub async fn patch_plot(
    State(app_state): State<AppState>,
    locale: Locale,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
    WithRejection(Json(patch), _): WithRejection<Json<PlotPatch>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_connection(&app_state)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let plot = app_state
        .farm_service
        .patch_plot(&mut *conn, id, patch)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(plot))
}

#[utoipa::path(
    delete,
    path = "/api/plots/{id}",
    tag = "Plots",
    params(("id" = Uuid, Path, description = "ID do lote")),
    responses(
        (status = 204, description = "Lote removido com suas tarefas"),
        (status = 404, description = "Lote não encontrado")
    )
)]
pub async fn delete_plot(
    State(app_state): State<AppState>,
    locale: Locale,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_connection(&app_state)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .farm_service
        .delete_plot(&mut *conn, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/plots/{id}/pending-tasks",
    tag = "Plots",
    params(("id" = Uuid, Path, description = "ID do lote")),
    responses(
        (status = 200, description = "Quantidade de tarefas pendentes", body = PlotPendingTasks),
        (status = 404, description = "Lote não encontrado")
    )
)]
pub async fn plot_pending_tasks(
    State(app_state): State<AppState>,
    locale: Locale,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_connection(&app_state)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let pending = app_state
        .farm_service
        .pending_tasks(&mut *conn, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(pending))
}

#[utoipa::path(
    get,
    path = "/api/plots/{id}/days-since-planting",
    tag = "Plots",
    params(("id" = Uuid, Path, description = "ID do lote")),
    responses(
        (status = 200, description = "Dias desde o plantio (null sem data de plantio)", body = PlotPlantingAge),
        (status = 404, description = "Lote não encontrado")
    )
)]
pub async fn plot_days_since_planting(
    State(app_state): State<AppState>,
    locale: Locale,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_connection(&app_state)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let age = app_state
        .farm_service
        .planting_age(&mut *conn, id, Utc::now().date_naive())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(age))
}
