// src/models/tasks.rs

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
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "task_category", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskCategory {
    LandPreparation,
    Sowing,
    Maintenance,
    Fertilization,
    PestControl,
    Irrigation,
    Pruning,
    Harvest,
    PostHarvest,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "task_state", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    #[default]
    Pending,
    InProgress,
    Done,
    Cancelled,
    Paused,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "task_priority", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

// =============================================================================
//  TIPOS DE TAREFA
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskType {
    pub id: Uuid,
    #[schema(example = "Fumigación")]
    pub name: String,
    pub category: TaskCategory,
    pub description: String,
    #[schema(example = "4.5")]
    pub estimated_duration_hours: Decimal,
    pub requires_machinery: bool,
    pub active: bool,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskTypePayload {
    #[validate(length(min = 1, max = 100, message = "length"))]
    pub name: String,

    pub category: TaskCategory,

    #[serde(default)]
    pub description: String,

    #[validate(custom(function = "validation::positive_hours"))]
    pub estimated_duration_hours: Decimal,

    #[serde(default)]
    pub requires_machinery: bool,

    #[serde(default = "crate::models::default_true")]
    pub active: bool,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskTypePatch {
    pub name: Option<String>,
    pub category: Option<TaskCategory>,
    pub description: Option<String>,
    pub estimated_duration_hours: Option<Decimal>,
    pub requires_machinery: Option<bool>,
    pub active: Option<bool>,
}

impl TaskTypePatch {
    pub fn apply(self, current: TaskType) -> TaskTypePayload {
        TaskTypePayload {
            name: merge(self.name, current.name),
            category: merge(self.category, current.category),
            description: merge(self.description, current.description),
            estimated_duration_hours: merge(
                self.estimated_duration_hours,
                current.estimated_duration_hours,
            ),
            requires_machinery: merge(self.requires_machinery, current.requires_machinery),
            active: merge(self.active, current.active),
        }
    }
}

// =============================================================================
//  TAREFAS
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub plot_id: Uuid,
    pub task_type_id: Uuid,
    #[schema(example = "Fumigación lote norte")]
    pub title: String,
    pub description: String,
    pub scheduled_on: NaiveDate,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub state: TaskState,
    pub priority: Priority,
    #[schema(example = "10.0")]
    pub estimated_hours: Decimal,
    pub actual_hours: Option<Decimal>,
    pub estimated_cost: Option<Decimal>,
    pub actual_cost: Option<Decimal>,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskDetail {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub task: Task,
    pub total_workers: i64,
    pub total_inputs: i64,
    /// Horas estimadas / horas reais × 100
    #[sqlx(skip)]
    pub time_efficiency: Option<Decimal>,
    /// Custo estimado / custo real × 100
    #[sqlx(skip)]
    pub cost_efficiency: Option<Decimal>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskWorkerSummary {
    pub assigned_workers: i64,
    pub pending_assignments: i64,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskPayload {
    pub plot_id: Uuid,

    pub task_type_id: Uuid,

    #[validate(length(min = 1, max = 200, message = "length"))]
    pub title: String,

    #[validate(length(min = 1, message = "required"))]
    pub description: String,

    pub scheduled_on: NaiveDate,

    pub started_at: Option<DateTime<Utc>>,

    pub finished_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub state: TaskState,

    #[serde(default)]
    pub priority: Priority,

    #[validate(custom(function = "validation::positive_hours"))]
    pub estimated_hours: Decimal,

    #[validate(custom(function = "validation::non_negative_hours"))]
    pub actual_hours: Option<Decimal>,

    #[validate(custom(function = "validation::non_negative_amount"))]
    pub estimated_cost: Option<Decimal>,

    #[validate(custom(function = "validation::non_negative_amount"))]
    pub actual_cost: Option<Decimal>,

    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    pub plot_id: Option<Uuid>,
    pub task_type_id: Option<Uuid>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub scheduled_on: Option<NaiveDate>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub started_at: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub finished_at: Option<Option<DateTime<Utc>>>,
    pub state: Option<TaskState>,
    pub priority: Option<Priority>,
    pub estimated_hours: Option<Decimal>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub actual_hours: Option<Option<Decimal>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub estimated_cost: Option<Option<Decimal>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub actual_cost: Option<Option<Decimal>>,
    pub notes: Option<String>,
}

impl TaskPatch {
    pub fn apply(self, current: Task) -> TaskPayload {
        TaskPayload {
            plot_id: merge(self.plot_id, current.plot_id),
            task_type_id: merge(self.task_type_id, current.task_type_id),
            title: merge(self.title, current.title),
            description: merge(self.description, current.description),
            scheduled_on: merge(self.scheduled_on, current.scheduled_on),
            started_at: merge_nullable(self.started_at, current.started_at),
            finished_at: merge_nullable(self.finished_at, current.finished_at),
            state: merge(self.state, current.state),
            priority: merge(self.priority, current.priority),
            estimated_hours: merge(self.estimated_hours, current.estimated_hours),
            actual_hours: merge_nullable(self.actual_hours, current.actual_hours),
            estimated_cost: merge_nullable(self.estimated_cost, current.estimated_cost),
            actual_cost: merge_nullable(self.actual_cost, current.actual_cost),
            notes: merge(self.notes, current.notes),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload_json() -> serde_json::Value {
        json!({
            "plotId": Uuid::new_v4(),
            "taskTypeId": Uuid::new_v4(),
            "title": "Fumigación",
            "description": "Control de broca",
            "scheduledOn": "2024-06-10",
            "estimatedHours": 10,
        })
    }

    #[test]
    fn task_payload_defaults_state_and_priority() {
        let payload: TaskPayload = serde_json::from_value(payload_json()).unwrap();
        assert_eq!(payload.state, TaskState::Pending);
        assert_eq!(payload.priority, Priority::Medium);
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn estimated_hours_must_be_at_least_a_tenth() {
        let mut value = payload_json();
        value["estimatedHours"] = json!(0.05);
        let payload: TaskPayload = serde_json::from_value(value).unwrap();
        assert!(payload.validate().is_err());
    }

    #[test]
    fn any_state_value_is_accepted() {
        // sem grafo de transições: qualquer estado pode ser gravado
        for state in ["pending", "in_progress", "done", "cancelled", "paused"] {
            let mut value = payload_json();
            value["state"] = json!(state);
            assert!(serde_json::from_value::<TaskPayload>(value).is_ok());
        }
    }

    #[test]
    fn task_type_payload_checks_duration_precision() {
        let payload: TaskTypePayload = serde_json::from_value(json!({
            "name": "Poda",
            "category": "pruning",
            "estimatedDurationHours": 1000,
        }))
        .unwrap();
        assert!(payload.validate().is_err());
    }
}
