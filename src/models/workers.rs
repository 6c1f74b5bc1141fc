// src/models/workers.rs

use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::common::{
    patch::{blank_as_none, blank_as_null, double_option, merge, merge_nullable},
    validation,
};

// --- Enums ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "worker_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum WorkerRole {
    Laborer,
    Technician,
    Supervisor,
    MachineOperator,
    Specialist,
    FieldManager,
}

impl WorkerRole {
    pub const ALL: [WorkerRole; 6] = [
        WorkerRole::Laborer,
        WorkerRole::Technician,
        WorkerRole::Supervisor,
        WorkerRole::MachineOperator,
        WorkerRole::Specialist,
        WorkerRole::FieldManager,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkerRole::Laborer => "laborer",
            WorkerRole::Technician => "technician",
            WorkerRole::Supervisor => "supervisor",
            WorkerRole::MachineOperator => "machine_operator",
            WorkerRole::Specialist => "specialist",
            WorkerRole::FieldManager => "field_manager",
        }
    }
}

impl fmt::Display for WorkerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Usado no segmento de rota /workers/by-role/{role}
impl FromStr for WorkerRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WorkerRole::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "contract_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ContractType {
    Permanent,
    #[default]
    Temporary,
    PerJob,
    DayLaborer,
}

// =============================================================================
//  TRABALHADORES
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Worker {
    pub id: Uuid,
    #[schema(example = "1032456789")]
    pub national_id: String,
    #[schema(example = "Carlos")]
    pub first_name: String,
    #[schema(example = "Gómez")]
    pub last_name: String,
    pub birth_date: NaiveDate,
    pub phone: String,
    pub email: Option<String>,
    pub address: String,
    pub role: WorkerRole,
    pub contract_type: ContractType,
    pub hired_on: NaiveDate,
    pub left_on: Option<NaiveDate>,
    pub active: bool,
    pub base_salary: Decimal,
    pub hourly_rate: Decimal,
    pub specialties: String,
    pub certifications: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkerDetail {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub worker: Worker,
    pub total_assignments: i64,
    #[sqlx(skip)]
    pub full_name: String,
    #[sqlx(skip)]
    pub age: i32,
    #[sqlx(skip)]
    pub years_of_service: i32,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkerPayload {
    #[validate(length(min = 1, max = 20, message = "length"), custom(function = "validation::digits_only"))]
    #[schema(example = "1032456789")]
    pub national_id: String,

    #[validate(length(min = 1, max = 100, message = "length"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 100, message = "length"))]
    pub last_name: String,

    pub birth_date: NaiveDate,

    #[serde(default)]
    #[validate(length(max = 15, message = "max_length"))]
    pub phone: String,

    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(email(message = "email"))]
    pub email: Option<String>,

    #[serde(default)]
    pub address: String,

    pub role: WorkerRole,

    #[serde(default)]
    pub contract_type: ContractType,

    pub hired_on: NaiveDate,

    pub left_on: Option<NaiveDate>,

    #[serde(default = "crate::models::default_true")]
    pub active: bool,

    #[validate(custom(function = "validation::non_negative_amount"))]
    pub base_salary: Decimal,

    #[validate(custom(function = "validation::hourly_rate"))]
    pub hourly_rate: Decimal,

    #[serde(default)]
    pub specialties: String,

    #[serde(default)]
    pub certifications: String,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkerPatch {
    pub national_id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "blank_as_null")]
    #[schema(value_type = Option<String>)]
    pub email: Option<Option<String>>,
    pub address: Option<String>,
    pub role: Option<WorkerRole>,
    pub contract_type: Option<ContractType>,
    pub hired_on: Option<NaiveDate>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>, format = Date)]
    pub left_on: Option<Option<NaiveDate>>,
    pub active: Option<bool>,
    pub base_salary: Option<Decimal>,
    pub hourly_rate: Option<Decimal>,
    pub specialties: Option<String>,
    pub certifications: Option<String>,
}

impl WorkerPatch {
    pub fn apply(self, current: Worker) -> WorkerPayload {
        WorkerPayload {
            national_id: merge(self.national_id, current.national_id),
            first_name: merge(self.first_name, current.first_name),
            last_name: merge(self.last_name, current.last_name),
            birth_date: merge(self.birth_date, current.birth_date),
            phone: merge(self.phone, current.phone),
            email: merge_nullable(self.email, current.email),
            address: merge(self.address, current.address),
            role: merge(self.role, current.role),
            contract_type: merge(self.contract_type, current.contract_type),
            hired_on: merge(self.hired_on, current.hired_on),
            left_on: merge_nullable(self.left_on, current.left_on),
            active: merge(self.active, current.active),
            base_salary: merge(self.base_salary, current.base_salary),
            hourly_rate: merge(self.hourly_rate, current.hourly_rate),
            specialties: merge(self.specialties, current.specialties),
            certifications: merge(self.certifications, current.certifications),
        }
    }
}

// =============================================================================
//  ATRIBUIÇÕES (trabalhador x tarefa)
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: Uuid,
    pub worker_id: Uuid,
    pub task_id: Uuid,
    pub assigned_at: DateTime<Utc>,
    #[schema(example = "8.0")]
    pub hours_assigned: Decimal,
    pub hours_worked: Option<Decimal>,
    pub role_in_task: String,
    pub notes: String,
    pub completed: bool,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentDetail {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub assignment: Assignment,
    pub worker_first_name: String,
    pub task_title: String,
    #[serde(skip)]
    pub worker_hourly_rate: Decimal,
    #[sqlx(skip)]
    pub labor_cost: Decimal,
    #[sqlx(skip)]
    pub efficiency: Option<Decimal>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentPayload {
    pub worker_id: Uuid,

    pub task_id: Uuid,

    #[validate(custom(function = "validation::positive_hours"))]
    pub hours_assigned: Decimal,

    #[validate(custom(function = "validation::non_negative_hours"))]
    pub hours_worked: Option<Decimal>,

    #[serde(default)]
    #[validate(length(max = 100, message = "max_length"))]
    pub role_in_task: String,

    #[serde(default)]
    pub notes: String,

    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentPatch {
    pub worker_id: Option<Uuid>,
    pub task_id: Option<Uuid>,
    pub hours_assigned: Option<Decimal>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub hours_worked: Option<Option<Decimal>>,
    pub role_in_task: Option<String>,
    pub notes: Option<String>,
    pub completed: Option<bool>,
}

impl AssignmentPatch {
    pub fn apply(self, current: Assignment) -> AssignmentPayload {
        AssignmentPayload {
            worker_id: merge(self.worker_id, current.worker_id),
            task_id: merge(self.task_id, current.task_id),
            hours_assigned: merge(self.hours_assigned, current.hours_assigned),
            hours_worked: merge_nullable(self.hours_worked, current.hours_worked),
            role_in_task: merge(self.role_in_task, current.role_in_task),
            notes: merge(self.notes, current.notes),
            completed: merge(self.completed, current.completed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload_json() -> serde_json::Value {
        json!({
            "nationalId": "1032456789",
            "firstName": "Carlos",
            "lastName": "Gómez",
            "birthDate": "1990-03-15",
            "role": "machine_operator",
            "hiredOn": "2020-01-01",
            "baseSalary": 1300000,
            "hourlyRate": "6500.00",
        })
    }

    #[test]
    fn role_parses_from_path_segment() {
        assert_eq!(WorkerRole::from_str("field_manager"), Ok(WorkerRole::FieldManager));
        assert_eq!(WorkerRole::from_str("boss"), Err("boss".to_string()));
        for role in WorkerRole::ALL {
            let json = serde_json::to_value(role).unwrap();
            assert_eq!(json, role.as_str());
        }
    }

    #[test]
    fn worker_payload_defaults() {
        let payload: WorkerPayload = serde_json::from_value(payload_json()).unwrap();
        assert_eq!(payload.contract_type, ContractType::Temporary);
        assert!(payload.active);
        assert!(payload.email.is_none());
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn national_id_must_be_digits() {
        let mut value = payload_json();
        value["nationalId"] = json!("CC-1032");
        let payload: WorkerPayload = serde_json::from_value(value).unwrap();
        assert!(payload.validate().is_err());
    }

    #[test]
    fn email_is_validated_when_present() {
        let mut value = payload_json();
        value["email"] = json!("not-an-email");
        let payload: WorkerPayload = serde_json::from_value(value).unwrap();
        assert!(payload.validate().is_err());
    }

    #[test]
    fn blank_email_is_accepted_as_missing() {
        let mut value = payload_json();
        value["email"] = json!("");
        let payload: WorkerPayload = serde_json::from_value(value).unwrap();
        assert!(payload.email.is_none());
        assert!(payload.validate().is_ok());

        let patch: WorkerPatch = serde_json::from_value(json!({ "email": "" })).unwrap();
        assert_eq!(patch.email, Some(None));
    }

    #[test]
    fn salary_and_hourly_rate_are_required() {
        for field in ["baseSalary", "hourlyRate"] {
            let mut value = payload_json();
            value.as_object_mut().unwrap().remove(field);
            let result: Result<WorkerPayload, _> = serde_json::from_value(value);
            let message = result.unwrap_err().to_string();
            assert!(message.contains(field), "{message}");
        }
    }

    #[test]
    fn assignment_payload_rejects_tiny_hours() {
        let payload: AssignmentPayload = serde_json::from_value(json!({
            "workerId": Uuid::new_v4(),
            "taskId": Uuid::new_v4(),
            "hoursAssigned": 0,
        }))
        .unwrap();
        assert!(payload.validate().is_err());
    }
}
