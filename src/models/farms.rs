// src/models/farms.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::common::{
    patch::{double_option, merge, merge_nullable},
    validation,
};

// --- Enums ---
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "plot_state", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PlotState {
    #[default]
    Preparing,
    Planted,
    Growing,
    Ready,
    Fallow,
    Inactive,
}

// =============================================================================
//  FAZENDAS
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Farm {
    pub id: Uuid,
    #[schema(example = "La Esperanza")]
    pub name: String,
    #[schema(example = "Vereda El Salitre, Sibaté")]
    pub location: String,
    #[schema(example = "120.5")]
    pub area_total: Decimal,
    pub latitude: Option<Decimal>,
    pub longitude: Option<Decimal>,
    pub owner: String,
    pub registered_on: NaiveDate,
    pub active: bool,
}

// Linha da listagem: a fazenda + contagem de lotes
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FarmListEntry {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub farm: Farm,
    pub total_plots: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FarmDetail {
    #[serde(flatten)]
    pub farm: Farm,
    pub plots: Vec<Plot>,
    pub total_plots: i64,
    pub cultivated_area: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FarmStatistics {
    pub name: String,
    pub area_total: Decimal,
    pub total_plots: i64,
    pub cultivated_area: Decimal,
}

// Payload de criação e de atualização completa (PUT)
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FarmPayload {
    #[validate(length(min = 1, max = 200, message = "length"))]
    #[schema(example = "La Esperanza")]
    pub name: String,

    #[validate(length(min = 1, max = 500, message = "length"))]
    pub location: String,

    #[validate(custom(function = "validation::hectares"))]
    #[schema(example = "120.5")]
    pub area_total: Decimal,

    #[validate(custom(function = "validation::coordinate"))]
    pub latitude: Option<Decimal>,

    #[validate(custom(function = "validation::coordinate"))]
    pub longitude: Option<Decimal>,

    #[validate(length(min = 1, max = 200, message = "length"))]
    pub owner: String,

    #[serde(default = "crate::models::default_true")]
    pub active: bool,
}

// PATCH: só os campos enviados são alterados
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FarmPatch {
    pub name: Option<String>,
    pub location: Option<String>,
    pub area_total: Option<Decimal>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub latitude: Option<Option<Decimal>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub longitude: Option<Option<Decimal>>,
    pub owner: Option<String>,
    pub active: Option<bool>,
}

impl FarmPatch {
    pub fn apply(self, current: Farm) -> FarmPayload {
        FarmPayload {
            name: merge(self.name, current.name),
            location: merge(self.location, current.location),
            area_total: merge(self.area_total, current.area_total),
            latitude: merge_nullable(self.latitude, current.latitude),
            longitude: merge_nullable(self.longitude, current.longitude),
            owner: merge(self.owner, current.owner),
            active: merge(self.active, current.active),
        }
    }
}

// =============================================================================
//  LOTES
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Plot {
    pub id: Uuid,
    pub farm_id: Uuid,
    #[schema(example = "LT-001")]
    pub code: String,
    #[schema(example = "Lote Norte")]
    pub name: String,
    #[schema(example = "12.75")]
    pub area: Decimal,
    #[schema(example = "Café")]
    pub current_crop: String,
    pub planted_on: Option<NaiveDate>,
    pub state: PlotState,
    pub polygon_coordinates: String,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlotPayload {
    pub farm_id: Uuid,

    #[validate(length(min = 1, max = 50, message = "length"))]
    #[schema(example = "LT-001")]
    pub code: String,

    #[validate(length(min = 1, max = 200, message = "length"))]
    pub name: String,

    #[validate(custom(function = "validation::hectares"))]
    #[schema(example = "12.75")]
    pub area: Decimal,

    #[serde(default)]
    #[validate(length(max = 100, message = "max_length"))]
    pub current_crop: String,

    pub planted_on: Option<NaiveDate>,

    #[serde(default)]
    pub state: PlotState,

    /// Polígono em JSON (lista de coordenadas)
    #[serde(default)]
    pub polygon_coordinates: String,

    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlotPatch {
    pub farm_id: Option<Uuid>,
    pub code: Option<String>,
    pub name: Option<String>,
    pub area: Option<Decimal>,
    pub current_crop: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>, format = Date)]
    pub planted_on: Option<Option<NaiveDate>>,
    pub state: Option<PlotState>,
    pub polygon_coordinates: Option<String>,
    pub notes: Option<String>,
}

impl PlotPatch {
    pub fn apply(self, current: Plot) -> PlotPayload {
        PlotPayload {
            farm_id: merge(self.farm_id, current.farm_id),
            code: merge(self.code, current.code),
            name: merge(self.name, current.name),
            area: merge(self.area, current.area),
            current_crop: merge(self.current_crop, current.current_crop),
            planted_on: merge_nullable(self.planted_on, current.planted_on),
            state: merge(self.state, current.state),
            polygon_coordinates: merge(self.polygon_coordinates, current.polygon_coordinates),
            notes: merge(self.notes, current.notes),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlotPendingTasks {
    /// Código do lote
    pub plot: String,
    pub pending_tasks: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlotPlantingAge {
    pub plot: String,
    pub planted_on: Option<NaiveDate>,
    pub days_since_planting: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{error::AppError, i18n::I18nStore};
    use crate::middleware::i18n::Locale;
    use std::str::FromStr;

    fn sample_farm() -> Farm {
        Farm {
            id: Uuid::new_v4(),
            name: "La Esperanza".into(),
            location: "Sibaté".into(),
            area_total: Decimal::from_str("120.50").unwrap(),
            latitude: Some(Decimal::from_str("4.4910000").unwrap()),
            longitude: None,
            owner: "Ana Ruiz".into(),
            registered_on: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            active: true,
        }
    }

    #[test]
    fn farm_payload_rejects_non_positive_area() {
        let payload: FarmPayload = serde_json::from_value(serde_json::json!({
            "name": "El Roble",
            "location": "Tolima",
            "areaTotal": 0,
            "owner": "Luis",
        }))
        .unwrap();

        let errors = payload.validate().unwrap_err();
        let api = AppError::from(errors).to_api_error(&Locale::default(), &I18nStore::new());
        let details = api.details.expect("details");
        assert_eq!(details["areaTotal"][0], "Must be greater than or equal to 0.01.");
        assert!(payload.active);
    }

    #[test]
    fn patch_only_touches_sent_fields() {
        let patch: FarmPatch =
            serde_json::from_value(serde_json::json!({ "owner": "Marta", "latitude": null })).unwrap();

        let merged = patch.apply(sample_farm());
        assert_eq!(merged.owner, "Marta");
        assert_eq!(merged.name, "La Esperanza");
        assert_eq!(merged.latitude, None);
        assert_eq!(merged.area_total, Decimal::from_str("120.50").unwrap());
    }

    #[test]
    fn plot_state_rejects_unknown_values() {
        let result: Result<PlotPayload, _> = serde_json::from_value(serde_json::json!({
            "farmId": Uuid::new_v4(),
            "code": "LT-1",
            "name": "Norte",
            "area": 2,
            "state": "harvested",
        }));
        assert!(result.is_err());
    }

    #[test]
    fn plot_payload_defaults() {
        let payload: PlotPayload = serde_json::from_value(serde_json::json!({
            "farmId": Uuid::new_v4(),
            "code": "LT-1",
            "name": "Norte",
            "area": 2.5,
        }))
        .unwrap();
        assert_eq!(payload.state, PlotState::Preparing);
        assert!(payload.current_crop.is_empty());
        assert!(payload.validate().is_ok());
    }
}
