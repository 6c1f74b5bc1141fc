// src/models/inputs.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::common::{
    patch::{double_option, merge, merge_nullable},
    validation,
};

// --- Enums ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "input_category", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum InputCategory {
    Fertilizer,
    Pesticide,
    Herbicide,
    Fungicide,
    Seed,
    OrganicManure,
    Fuel,
    Tool,
    Other,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "unit_of_measure", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum UnitOfMeasure {
    #[default]
    Kg,
    G,
    L,
    Ml,
    Unit,
    Sack,
    Gallon,
    Tonne,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "movement_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MovementKind {
    Entry,
    Exit,
    Adjustment,
    Loss,
    Return,
}

// =============================================================================
//  INSUMOS
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Input {
    pub id: Uuid,
    #[schema(example = "FER-001")]
    pub code: String,
    #[schema(example = "Urea 46%")]
    pub name: String,
    pub category: InputCategory,
    pub description: String,
    pub unit: UnitOfMeasure,
    #[schema(example = "250.0")]
    pub stock_current: Decimal,
    #[schema(example = "50.0")]
    pub stock_min: Decimal,
    pub stock_max: Option<Decimal>,
    #[schema(example = "3.75")]
    pub unit_price: Decimal,
    pub supplier: String,
    pub expires_on: Option<NaiveDate>,
    pub supplier_batch: String,
    pub requires_prescription: bool,
    pub toxic: bool,
    pub withholding_days: Option<i32>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insumo com os campos calculados.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InputDetail {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub input: Input,
    /// Soma das quantidades consumidas
    pub total_consumed: Decimal,
    #[sqlx(skip)]
    pub stock_low: bool,
    #[sqlx(skip)]
    pub inventory_value: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventorySummary {
    pub total_inputs: i64,
    pub total_inventory_value: Decimal,
    pub inputs_below_minimum: i64,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InputPayload {
    #[validate(length(min = 1, max = 50, message = "length"))]
    #[schema(example = "FER-001")]
    pub code: String,

    #[validate(length(min = 1, max = 200, message = "length"))]
    pub name: String,

    pub category: InputCategory,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub unit: UnitOfMeasure,

    #[serde(default)]
    #[validate(custom(function = "validation::non_negative_amount"))]
    pub stock_current: Decimal,

    #[validate(custom(function = "validation::non_negative_amount"))]
    pub stock_min: Decimal,

    #[validate(custom(function = "validation::non_negative_amount"))]
    pub stock_max: Option<Decimal>,

    #[validate(custom(function = "validation::non_negative_amount"))]
    pub unit_price: Decimal,

    #[serde(default)]
    #[validate(length(max = 200, message = "max_length"))]
    pub supplier: String,

    pub expires_on: Option<NaiveDate>,

    #[serde(default)]
    #[validate(length(max = 100, message = "max_length"))]
    pub supplier_batch: String,

    #[serde(default)]
    pub requires_prescription: bool,

    #[serde(default)]
    pub toxic: bool,

    /// Dias de carência após a aplicação
    #[validate(range(min = 0, message = "min_value"))]
    pub withholding_days: Option<i32>,

    #[serde(default = "crate::models::default_true")]
    pub active: bool,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InputPatch {
    pub code: Option<String>,
    pub name: Option<String>,
    pub category: Option<InputCategory>,
    pub description: Option<String>,
    pub unit: Option<UnitOfMeasure>,
    pub stock_current: Option<Decimal>,
    pub stock_min: Option<Decimal>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub stock_max: Option<Option<Decimal>>,
    pub unit_price: Option<Decimal>,
    pub supplier: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>, format = Date)]
    pub expires_on: Option<Option<NaiveDate>>,
    pub supplier_batch: Option<String>,
    pub requires_prescription: Option<bool>,
    pub toxic: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<i32>)]
    pub withholding_days: Option<Option<i32>>,
    pub active: Option<bool>,
}

impl InputPatch {
    pub fn apply(self, current: Input) -> InputPayload {
        InputPayload {
            code: merge(self.code, current.code),
            name: merge(self.name, current.name),
            category: merge(self.category, current.category),
            description: merge(self.description, current.description),
            unit: merge(self.unit, current.unit),
            stock_current: merge(self.stock_current, current.stock_current),
            stock_min: merge(self.stock_min, current.stock_min),
            stock_max: merge_nullable(self.stock_max, current.stock_max),
            unit_price: merge(self.unit_price, current.unit_price),
            supplier: merge(self.supplier, current.supplier),
            expires_on: merge_nullable(self.expires_on, current.expires_on),
            supplier_batch: merge(self.supplier_batch, current.supplier_batch),
            requires_prescription: merge(self.requires_prescription, current.requires_prescription),
            toxic: merge(self.toxic, current.toxic),
            withholding_days: merge_nullable(self.withholding_days, current.withholding_days),
            active: merge(self.active, current.active),
        }
    }
}

// Filtros da listagem: ?category=...&name=...&supplier=...
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct InputFilter {
    /// Parte da categoria (ex: `fert`)
    pub category: Option<String>,
    /// Parte do nome
    pub name: Option<String>,
    /// Fornecedor exato
    pub supplier: Option<String>,
}

// =============================================================================
//  MOVIMENTAÇÕES
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Movement {
    pub id: Uuid,
    pub input_id: Uuid,
    pub kind: MovementKind,
    #[schema(example = "10.0")]
    pub quantity: Decimal,
    pub moved_at: DateTime<Utc>,
    pub description: String,
    pub reference_document: String,
    pub unit_cost: Option<Decimal>,
    pub responsible: String,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MovementDetail {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub movement: Movement,
    // Preço atual do insumo, lido no JOIN
    #[serde(skip)]
    pub input_unit_price: Decimal,
    #[sqlx(skip)]
    pub total_cost: Decimal,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MovementPayload {
    pub input_id: Uuid,

    pub kind: MovementKind,

    #[validate(custom(function = "validation::positive_quantity"))]
    pub quantity: Decimal,

    #[validate(length(min = 1, message = "required"))]
    pub description: String,

    #[serde(default)]
    #[validate(length(max = 100, message = "max_length"))]
    pub reference_document: String,

    /// Se ausente, o custo usa o preço atual do insumo
    #[validate(custom(function = "validation::non_negative_amount"))]
    pub unit_cost: Option<Decimal>,

    #[validate(length(min = 1, max = 200, message = "length"))]
    pub responsible: String,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MovementPatch {
    pub input_id: Option<Uuid>,
    pub kind: Option<MovementKind>,
    pub quantity: Option<Decimal>,
    pub description: Option<String>,
    pub reference_document: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub unit_cost: Option<Option<Decimal>>,
    pub responsible: Option<String>,
}

impl MovementPatch {
    pub fn apply(self, current: Movement) -> MovementPayload {
        MovementPayload {
            input_id: merge(self.input_id, current.input_id),
            kind: merge(self.kind, current.kind),
            quantity: merge(self.quantity, current.quantity),
            description: merge(self.description, current.description),
            reference_document: merge(self.reference_document, current.reference_document),
            unit_cost: merge_nullable(self.unit_cost, current.unit_cost),
            responsible: merge(self.responsible, current.responsible),
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct MovementFilter {
    pub kind: Option<MovementKind>,
    /// Movimentações a partir desta data (inclusive)
    pub date_after: Option<NaiveDate>,
    /// Movimentações até esta data (inclusive)
    pub date_before: Option<NaiveDate>,
}

// =============================================================================
//  CONSUMOS
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Consumption {
    pub id: Uuid,
    pub input_id: Uuid,
    pub task_id: Uuid,
    pub quantity: Decimal,
    pub consumed_at: DateTime<Utc>,
    pub applicator: String,
    pub applied_dose: String,
    pub weather_conditions: String,
    pub notes: String,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConsumptionDetail {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub consumption: Consumption,
    #[serde(skip)]
    pub input_unit_price: Decimal,
    #[sqlx(skip)]
    pub cost: Decimal,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConsumptionPayload {
    pub input_id: Uuid,

    pub task_id: Uuid,

    #[validate(custom(function = "validation::positive_quantity"))]
    pub quantity: Decimal,

    #[serde(default)]
    #[validate(length(max = 200, message = "max_length"))]
    pub applicator: String,

    /// Dose aplicada (ex: "2 L/ha")
    #[serde(default)]
    #[validate(length(max = 100, message = "max_length"))]
    pub applied_dose: String,

    #[serde(default)]
    #[validate(length(max = 200, message = "max_length"))]
    pub weather_conditions: String,

    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConsumptionPatch {
    pub input_id: Option<Uuid>,
    pub task_id: Option<Uuid>,
    pub quantity: Option<Decimal>,
    pub applicator: Option<String>,
    pub applied_dose: Option<String>,
    pub weather_conditions: Option<String>,
    pub notes: Option<String>,
}

impl ConsumptionPatch {
    pub fn apply(self, current: Consumption) -> ConsumptionPayload {
        ConsumptionPayload {
            input_id: merge(self.input_id, current.input_id),
            task_id: merge(self.task_id, current.task_id),
            quantity: merge(self.quantity, current.quantity),
            applicator: merge(self.applicator, current.applicator),
            applied_dose: merge(self.applied_dose, current.applied_dose),
            weather_conditions: merge(self.weather_conditions, current.weather_conditions),
            notes: merge(self.notes, current.notes),
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct ConsumptionFilter {
    pub input_id: Option<Uuid>,
    pub task_id: Option<Uuid>,
    pub consumed_after: Option<NaiveDate>,
    pub consumed_before: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    #[test]
    fn input_payload_defaults_unit_and_stock() {
        let payload: InputPayload = serde_json::from_value(json!({
            "code": "FER-001",
            "name": "Urea",
            "category": "fertilizer",
            "stockMin": 10,
            "unitPrice": 2.5,
        }))
        .unwrap();

        assert_eq!(payload.unit, UnitOfMeasure::Kg);
        assert_eq!(payload.stock_current, Decimal::ZERO);
        assert!(payload.active);
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn input_payload_rejects_negative_withholding_days() {
        let payload: InputPayload = serde_json::from_value(json!({
            "code": "PES-9",
            "name": "Clorpirifos",
            "category": "pesticide",
            "stockMin": 0,
            "unitPrice": 0,
            "withholdingDays": -1,
        }))
        .unwrap();
        assert!(payload.validate().is_err());
    }

    #[test]
    fn category_uses_snake_case_values() {
        let category: InputCategory = serde_json::from_value(json!("organic_manure")).unwrap();
        assert_eq!(category, InputCategory::OrganicManure);
        assert!(serde_json::from_value::<InputCategory>(json!("OrganicManure")).is_err());
    }

    #[test]
    fn movement_requires_positive_quantity_and_description() {
        let payload: MovementPayload = serde_json::from_value(json!({
            "inputId": Uuid::new_v4(),
            "kind": "exit",
            "quantity": 0,
            "description": "",
            "responsible": "Pedro",
        }))
        .unwrap();

        let errors = payload.validate().unwrap_err();
        assert_eq!(errors.field_errors().len(), 2);
    }

    #[test]
    fn movement_patch_can_clear_unit_cost() {
        let current = Movement {
            id: Uuid::new_v4(),
            input_id: Uuid::new_v4(),
            kind: MovementKind::Entry,
            quantity: Decimal::from(5),
            moved_at: Utc::now(),
            description: "Compra".into(),
            reference_document: "FAC-10".into(),
            unit_cost: Some(Decimal::from_str("3.10").unwrap()),
            responsible: "Pedro".into(),
        };
        let patch: MovementPatch = serde_json::from_value(json!({ "unitCost": null })).unwrap();

        let merged = patch.apply(current);
        assert_eq!(merged.unit_cost, None);
        assert_eq!(merged.kind, MovementKind::Entry);
    }

    #[test]
    fn decimals_are_written_as_strings_and_read_from_numbers() {
        let movement = Movement {
            id: Uuid::new_v4(),
            input_id: Uuid::new_v4(),
            kind: MovementKind::Entry,
            quantity: Decimal::from_str("0.10").unwrap(),
            moved_at: Utc::now(),
            description: "Compra".into(),
            reference_document: String::new(),
            unit_cost: Some(Decimal::from_str("1234567890.12").unwrap()),
            responsible: "Pedro".into(),
        };

        let value = serde_json::to_value(&movement).unwrap();
        assert_eq!(value["quantity"], json!("0.10"));
        assert_eq!(value["unitCost"], json!("1234567890.12"));

        let payload: InputPayload = serde_json::from_value(json!({
            "code": "FER-002",
            "name": "DAP",
            "category": "fertilizer",
            "stockMin": "0.10",
            "unitPrice": 0.1,
        }))
        .unwrap();
        assert_eq!(payload.stock_min, Decimal::from_str("0.1").unwrap());
        assert_eq!(payload.unit_price, Decimal::from_str("0.1").unwrap());
    }

    #[test]
    fn movement_filter_reads_camel_case_dates() {
        let filter: MovementFilter =
            serde_json::from_value(json!({ "kind": "loss", "dateAfter": "2024-05-01" })).unwrap();
        assert_eq!(filter.kind, Some(MovementKind::Loss));
        assert_eq!(filter.date_after, NaiveDate::from_ymd_opt(2024, 5, 1));
        assert!(filter.date_before.is_none());
    }
}
