// src/services/task_service.rs

use rust_decimal::Decimal;
use sqlx::{Acquire, PgConnection};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{error::AppError, query::ListQuery},
    db::{FarmRepository, TaskRepository},
    models::tasks::{
        Task, TaskDetail, TaskPatch, TaskPayload, TaskType, TaskTypePatch, TaskTypePayload,
        TaskWorkerSummary,
    },
};

/// `numerator / denominator × 100`, duas casas. `None` se faltar algum valor ou o divisor for zero.
pub(crate) fn percentage(numerator: Option<Decimal>, denominator: Option<Decimal>) -> Option<Decimal> {
    match (numerator, denominator) {
        (Some(n), Some(d)) if !n.is_zero() && !d.is_zero() => Some((n / d * Decimal::ONE_HUNDRED).round_dp(2)),
        _ => None,
    }
}

pub fn time_efficiency(task: &Task) -> Option<Decimal> {
    percentage(Some(task.estimated_hours), task.actual_hours)
}

pub fn cost_efficiency(task: &Task) -> Option<Decimal> {
    percentage(task.estimated_cost, task.actual_cost)
}

fn task_detail(mut detail: TaskDetail) -> TaskDetail {
    detail.time_efficiency = time_efficiency(&detail.task);
    detail.cost_efficiency = cost_efficiency(&detail.task);
    detail
}

#[derive(Clone)]
pub struct TaskService {
    task_repo: TaskRepository,
    farm_repo: FarmRepository,
}

impl TaskService {
    pub fn new(task_repo: TaskRepository, farm_repo: FarmRepository) -> Self {
        Self { task_repo, farm_repo }
    }

    // =========================================================================
    //  TIPOS DE TAREFA
    // =========================================================================

    pub async fn list_task_types(&self, conn: &mut PgConnection, query: &ListQuery) -> Result<Vec<TaskType>, AppError> {
        self.task_repo.list_task_types(conn, query).await
    }

    pub async fn get_task_type(&self, conn: &mut PgConnection, id: Uuid) -> Result<TaskType, AppError> {
        self.task_repo
            .find_task_type(conn, id)
            .await?
            .ok_or(AppError::NotFound("task_type"))
    }

    pub async fn create_task_type(&self, conn: &mut PgConnection, payload: &TaskTypePayload) -> Result<TaskType, AppError> {
        let task_type = self.task_repo.create_task_type(conn, payload).await?;
        tracing::info!("Tipo de tarefa criado: {}", task_type.name);
        Ok(task_type)
    }

    pub async fn update_task_type(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
        payload: &TaskTypePayload,
    ) -> Result<TaskType, AppError> {
        self.task_repo
            .update_task_type(conn, id, payload)
            .await?
            .ok_or(AppError::NotFound("task_type"))
    }

    pub async fn patch_task_type(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
        patch: TaskTypePatch,
    ) -> Result<TaskType, AppError> {
        let mut tx = conn.begin().await?;

        let current = self.get_task_type(&mut tx, id).await?;
        let payload = patch.apply(current);
        payload.validate()?;
        let task_type = self.update_task_type(&mut tx, id, &payload).await?;

        tx.commit().await?;
        Ok(task_type)
    }

    /// Bloqueado enquanto houver tarefas usando o tipo.
    pub async fn delete_task_type(&self, conn: &mut PgConnection, id: Uuid) -> Result<(), AppError> {
        let mut tx = conn.begin().await?;

        if !self.task_repo.lock_task_type(&mut *tx, id).await? {
            return Err(AppError::NotFound("task_type"));
        }

        let tasks = self.task_repo.tasks_using_type(&mut *tx, id).await?;
        if tasks > 0 {
            tracing::warn!("Remoção do tipo de tarefa {} bloqueada: {} tarefa(s)", id, tasks);
            return Err(AppError::ProtectedReference {
                resource: "task_type",
                referenced_by: "task",
                count: tasks,
            });
        }

        if self.task_repo.delete_task_type(&mut *tx, id).await? == 0 {
            return Err(AppError::NotFound("task_type"));
        }

        tx.commit().await?;
        Ok(())
    }

    // =========================================================================
    //  TAREFAS
    // =========================================================================

    pub async fn list_tasks(&self, conn: &mut PgConnection, query: &ListQuery) -> Result<Vec<TaskDetail>, AppError> {
        let tasks = self.task_repo.list_tasks(conn, query).await?;
        Ok(tasks.into_iter().map(task_detail).collect())
    }

    pub async fn tasks_by_plot(&self, conn: &mut PgConnection, plot_id: Uuid) -> Result<Vec<TaskDetail>, AppError> {
        if self.farm_repo.find_plot(&mut *conn, plot_id).await?.is_none() {
            return Err(AppError::NotFound("plot"));
        }
        let tasks = self.task_repo.tasks_of_plot(conn, plot_id).await?;
        Ok(tasks.into_iter().map(task_detail).collect())
    }

    pub async fn get_task(&self, conn: &mut PgConnection, id: Uuid) -> Result<TaskDetail, AppError> {
        self.task_repo
            .find_task(conn, id)
            .await?
            .map(task_detail)
            .ok_or(AppError::NotFound("task"))
    }

    pub async fn create_task(&self, conn: &mut PgConnection, payload: &TaskPayload) -> Result<TaskDetail, AppError> {
        let mut tx = conn.begin().await?;

        let id = self.task_repo.create_task(&mut *tx, payload).await?;
        let task = self.get_task(&mut tx, id).await?;

        tx.commit().await?;
        tracing::info!("Tarefa criada: {} ({}) no lote {}", payload.title, id, payload.plot_id);
        Ok(task)
    }

    pub async fn update_task(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
        payload: &TaskPayload,
    ) -> Result<TaskDetail, AppError> {
        let mut tx = conn.begin().await?;

        if !self.task_repo.update_task(&mut *tx, id, payload).await? {
            return Err(AppError::NotFound("task"));
        }
        let task = self.get_task(&mut tx, id).await?;

        tx.commit().await?;
        Ok(task)
    }

    pub async fn patch_task(&self, conn: &mut PgConnection, id: Uuid, patch: TaskPatch) -> Result<TaskDetail, AppError> {
        let mut tx = conn.begin().await?;

        let current = self.get_task(&mut tx, id).await?;
        let payload = patch.apply(current.task);
        payload.validate()?;
        let task = self.update_task(&mut tx, id, &payload).await?;

        tx.commit().await?;
        Ok(task)
    }

    pub async fn delete_task(&self, conn: &mut PgConnection, id: Uuid) -> Result<(), AppError> {
        let mut tx = conn.begin().await?;

        if self.task_repo.delete_task_cascade(&mut tx, id).await? == 0 {
            return Err(AppError::NotFound("task"));
        }

        tx.commit().await?;
        tracing::info!("Tarefa {} removida (com atribuições e consumos)", id);
        Ok(())
    }

    pub async fn task_workers(&self, conn: &mut PgConnection, id: Uuid) -> Result<TaskWorkerSummary, AppError> {
        self.get_task(&mut *conn, id).await?;
        let (assigned_workers, pending_assignments) = self.task_repo.worker_counts(conn, id).await?;

        Ok(TaskWorkerSummary {
            assigned_workers,
            pending_assignments,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tasks::{Priority, TaskState};
    use chrono::{NaiveDate, Utc};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn task(estimated_hours: &str, actual_hours: Option<&str>) -> Task {
        Task {
            id: Uuid::new_v4(),
            plot_id: Uuid::new_v4(),
            task_type_id: Uuid::new_v4(),
            title: "Fumigación".into(),
            description: "Control de broca".into(),
            scheduled_on: NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
            started_at: None,
            finished_at: None,
            state: TaskState::Done,
            priority: Priority::High,
            estimated_hours: dec(estimated_hours),
            actual_hours: actual_hours.map(dec),
            estimated_cost: None,
            actual_cost: None,
            notes: String::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn time_efficiency_is_estimated_over_actual() {
        assert_eq!(time_efficiency(&task("10", Some("8"))), Some(dec("125.00")));
        assert_eq!(time_efficiency(&task("8", Some("10"))), Some(dec("80")));
    }

    #[test]
    fn time_efficiency_is_none_without_actual_hours() {
        assert_eq!(time_efficiency(&task("10", None)), None);
        assert_eq!(time_efficiency(&task("10", Some("0"))), None);
    }

    #[test]
    fn efficiency_rounds_to_two_places() {
        assert_eq!(time_efficiency(&task("10", Some("3"))), Some(dec("333.33")));
        assert_eq!(time_efficiency(&task("2", Some("3"))), Some(dec("66.67")));
    }

    #[test]
    fn cost_efficiency_needs_both_costs() {
        let mut t = task("1", None);
        t.estimated_cost = Some(dec("500"));
        assert_eq!(cost_efficiency(&t), None);

        t.actual_cost = Some(dec("400"));
        assert_eq!(cost_efficiency(&t), Some(dec("125")));
    }
}
