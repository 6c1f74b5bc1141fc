// src/handlers/inputs.rs

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
    },
    config::AppState,
    middleware::i18n::Locale,
    models::inputs::{
        ConsumptionDetail, ConsumptionFilter, ConsumptionPatch, ConsumptionPayload, InputDetail,
        InputFilter, InputPatch, InputPayload, InventorySummary, MovementDetail, MovementFilter,
        MovementPatch, MovementPayload,
    },
};

// =============================================================================
//  INSUMOS
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/inputs",
    tag = "Inputs",
    params(InputFilter),
    responses(
        (status = 200, description = "Insumos com estoque baixo, valor em estoque e total consumido", body = [InputDetail])
    )
)]
pub async fn list_inputs(
    State(app_state): State<AppState>,
    locale: Locale,
    WithRejection(Query(filter), _): WithRejection<Query<InputFilter>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_connection(&app_state)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let inputs = app_state
        .inventory_service
        .list_inputs(&mut *conn, &filter)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(inputs))
}

#[utoipa::path(
    get,
    path = "/api/inputs/summary",
    tag = "Inputs",
    responses(
        (status = 200, description = "Resumo do inventário", body = InventorySummary)
    )
)]
pub async fn inventory_summary(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_connection(&app_state)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let summary = app_state
        .inventory_service
        .inventory_summary(&mut *conn)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(summary))
}

#[utoipa::path(
    post,
    path = "/api/inputs",
    tag = "Inputs",
    request_body = InputPayload,
    responses(
        (status = 201, description = "Insumo criado", body = InputDetail),
        (status = 400, description = "Dados inválidos"),
        (status = 409, description = "Código já cadastrado")
    )
)]
pub async fn create_input(
    State(app_state): State<AppState>,
    locale: Locale,
    WithRejection(Json(payload), _): WithRejection<Json<InputPayload>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut conn = get_connection(&app_state)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let input = app_state
        .inventory_service
        .create_input(&mut *conn, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(input)))
}

#[utoipa::path(
    get,
    path = "/api/inputs/{id}",
    tag = "Inputs",
    params(("id" = Uuid, Path, description = "ID do insumo")),
    responses(
        (status = 200, description = "Insumo", body = InputDetail),
        (status = 404, description = "Insumo não encontrado")
    )
)]
pub async fn get_input(
    State(app_state): State<AppState>,
    locale: Locale,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_connection(&app_state)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let input = app_state
        .inventory_service
        .get_input(&mut *conn, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(input))
}

#[utoipa::path(
    put,
    path = "/api/inputs/{id}",
    tag = "Inputs",
    request_body = InputPayload,
    params(("id" = Uuid, Path, description = "ID do insumo")),
    responses(
        (status = 200, description = "Insumo atualizado", body = InputDetail),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Insumo não encontrado")
    )
)]
pub async fn update_input(
    State(app_state): State<AppState>,
    locale: Locale,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
    WithRejection(Json(payload), _): WithRejection<Json<InputPayload>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut conn = get_connection(&app_state)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let input = app_state
        .inventory_service
        .update_input(&mut *conn, id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(input))
}

#[utoipa::path(
    patch,
    path = "/api/inputs/{id}",
    tag = "Inputs",
    request_body = InputPatch,
    params(("id" = Uuid, Path, description = "ID do insumo")),
    responses(
        (status = 200, description = "Insumo atualizado", body = InputDetail),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Insumo não encontrado")
    )
)]
pub async fn patch_input(
    State(app_state): State<AppState>,
    locale: Locale,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
    WithRejection(Json(patch), _): WithRejection<Json<InputPatch>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_connection(&app_state)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let input = app_state
        .inventory_service
        .patch_input(&mut *conn, id, patch)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(input))
}

#[utoipa::path(
    delete,
    path = "/api/inputs/{id}",
    tag = "Inputs",
    params(("id" = Uuid, Path, description = "ID do insumo")),
    responses(
        (status = 204, description = "Insumo removido com suas movimentações"),
        (status = 404, description = "Insumo não encontrado"),
        (status = 409, description = "Insumo com consumos registrados")
    )
)]
pub async fn delete_input(
    State(app_state): State<AppState>,
    locale: Locale,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_connection(&app_state)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .inventory_service
        .delete_input(&mut *conn, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  MOVIMENTAÇÕES
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/movements",
    tag = "Movements",
    params(MovementFilter),
    responses(
        (status = 200, description = "Movimentações, mais recentes primeiro", body = [MovementDetail])
    )
)]
pub async fn list_movements(
    State(app_state): State<AppState>,
    locale: Locale,
    WithRejection(Query(filter), _): WithRejection<Query<MovementFilter>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_connection(&app_state)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let movements = app_state
        .inventory_service
        .list_movements(&mut *conn, &filter)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(movements))
}

#[utoipa::path(
    post,
    path = "/api/movements",
    tag = "Movements",
    request_body = MovementPayload,
    responses(
        (status = 201, description = "Movimentação registrada", body = MovementDetail),
        (status = 400, description = "Dados inválidos ou estoque insuficiente para a saída")
    )
)]
pub async fn create_movement(
    State(app_state): State<AppState>,
    locale: Locale,
    WithRejection(Json(payload), _): WithRejection<Json<MovementPayload>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut conn = get_connection(&app_state)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let movement = app_state
        .inventory_service
        .create_movement(&mut *conn, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(movement)))
}

#[utoipa::path(
    get,
    path = "/api/movements/{id}",
    tag = "Movements",
    params(("id" = Uuid, Path, description = "ID da movimentação")),
    responses(
        (status = 200, description = "Movimentação", body = MovementDetail),
        (status = 404, description = "Movimentação não encontrada")
    )
)]
pub async fn get_movement(
    State(app_state): State<AppState>,
    locale: Locale,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_connection(&app_state)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let movement = app_state
        .inventory_service
        .get_movement(&mut *conn, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(movement))
}

#[utoipa::path(
    put,
    path = "/api/movements/{id}",
    tag = "Movements",
    request_body = MovementPayload,
    params(("id" = Uuid, Path, description = "ID da movimentação")),
    responses(
        (status = 200, description = "Movimentação atualizada", body = MovementDetail),
        (status = 400, description = "Dados inválidos ou estoque insuficiente"),
        (status = 404, description = "Movimentação não encontrada")
    )
)]
pub async fn update_movement(
    State(app_state): State<AppState>,
    locale: Locale,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
    WithRejection(Json(payload), _): WithRejection<Json<MovementPayload>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut conn = get_connection(&app_state)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let movement = app_state
        .inventory_service
        .update_movement(&mut *conn, id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(movement))
}

#[utoipa::path(
    patch,
    path = "/api/movements/{id}",
    tag = "Movements",
    request_body = MovementPatch,
    params(("id" = Uuid, Path, description = "ID da movimentação")),
    responses(
        (status = 200, description = "Movimentação atualizada", body = MovementDetail),
        (status = 400, description = "Dados inválidos ou estoque insuficiente"),
        (status = 404, description = "Movimentação não encontrada")
    )
)]
pub async fn patch_movement(
    State(app_state): State<AppState>,
    locale: Locale,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
    WithRejection(Json(patch), _): WithRejection<Json<MovementPatch>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_connection(&app_state)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let movement = app_state
        .inventory_service
        .patch_movement(&mut *conn, id, patch)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(movement))
}

#[utoipa::path(
    delete,
    path = "/api/movements/{id}",
    tag = "Movements",
    params(("id" = Uuid, Path, description = "ID da movimentação")),
    responses(
        (status = 204, description = "Movimentação removida"),
        (status = 404, description = "Movimentação não encontrada")
    )
)]
pub async fn delete_movement(
    State(app_state): State<AppState>,
    locale: Locale,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_connection(&app_state)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .inventory_service
        .delete_movement(&mut *conn, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  CONSUMOS
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/consumptions",
    tag = "Consumptions",
    params(ConsumptionFilter),
    responses(
        (status = 200, description = "Consumos, mais recentes primeiro", body = [ConsumptionDetail])
    )
)]
pub async fn list_consumptions(
    State(app_state): State<AppState>,
    locale: Locale,
    WithRejection(Query(filter), _): WithRejection<Query<ConsumptionFilter>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_connection(&app_state)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let consumptions = app_state
        .inventory_service
        .list_consumptions(&mut *conn, &filter)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(consumptions))
}

#[utoipa::path(
    post,
    path = "/api/consumptions",
    tag = "Consumptions",
    request_body = ConsumptionPayload,
    responses(
        (status = 201, description = "Consumo registrado", body = ConsumptionDetail),
        (status = 400, description = "Dados inválidos ou insumo/tarefa inexistente")
    )
)]
pub async fn create_consumption(
    State(app_state): State<AppState>,
    locale: Locale,
    WithRejection(Json(payload), _): WithRejection<Json<ConsumptionPayload>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut conn = get_connection(&app_state)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let consumption = app_state
        .inventory_service
        .create_consumption(&mut *conn, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(consumption)))
}

#[utoipa::path(
    get,
    path = "/api/consumptions/{id}",
    tag = "Consumptions",
    params(("id" = Uuid, Path, description = "ID do consumo")),
    responses(
        (status = 200, description = "Consumo", body = ConsumptionDetail),
        (status = 404, description = "Consumo não encontrado")
    )
)]
pub async fn get_consumption(
    State(app_state): State<AppState>,
    locale: Locale,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_connection(&app_state)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let consumption = app_state
        .inventory_service
        .get_consumption(&mut *conn, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(consumption))
}

#[utoipa::path(
    put,
    path = "/api/consumptions/{id}",
    tag = "Consumptions",
    request_body = ConsumptionPayload,
    params(("id" = Uuid, Path, description = "ID do consumo")),
    responses(
        (status = 200, description = "Consumo atualizado", body = ConsumptionDetail),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Consumo não encontrado")
    )
)]
pub async fn update_consumption(
    State(app_state): State<AppState>,
    locale: Locale,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
    WithRejection(Json(payload), _): WithRejection<Json<ConsumptionPayload>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut conn = get_connection(&app_state)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let consumption = app_state
        .inventory_service
        .update_consumption(&mut *conn, id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(consumption))
}

#[utoipa::path(
    patch,
    path = "/api/consumptions/{id}",
    tag = "Consumptions",
    request_body = ConsumptionPatch,
    params(("id" = Uuid, Path, description = "ID do consumo")),
    responses(
        (status = 200, description = "Consumo atualizado", body = ConsumptionDetail),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Consumo não encontrado")
    )
)]
pub async fn patch_consumption(
    State(app_state): State<AppState>,
    locale: Locale,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
    WithRejection(Json(patch), _): WithRejection<Json<ConsumptionPatch>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_connection(&app_state)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let consumption = app_state
        .inventory_service
        .patch_consumption(&mut *conn, id, patch)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(consumption))
}

#[utoipa::path(
    delete,
    path = "/api/consumptions/{id}",
    tag = "Consumptions",
    params(("id" = Uuid, Path, description = "ID do consumo")),
    responses(
        (status = 204, description = "Consumo removido"),
        (status = 404, description = "Consumo não encontrado")
    )
)]
pub async fn delete_consumption(
    State(app_state): State<AppState>,
    locale: Locale,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_connection(&app_state)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .inventory_service
        .delete_consumption(&mut *conn, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
