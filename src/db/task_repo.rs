// src/db/task_repo.rs

use sqlx::{Executor, PgConnection, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::{
        db_utils::map_write_error,
        error::AppError,
        query::{ordering_clause, push_search, ListQuery},
    },
    models::tasks::{TaskDetail, TaskPayload, TaskType, TaskTypePayload},
};

const TASK_TYPE_ORDERING: &[(&str, &str)] = &[("estimatedDurationHours", "tt.estimated_duration_hours")];

const TASK_ORDERING: &[(&str, &str)] = &[("scheduledOn", "t.scheduled_on")];

const TASK_DETAIL_SELECT: &str = r#"
    SELECT t.*,
           (SELECT COUNT(*) FROM assignments a WHERE a.task_id = t.id) AS total_workers,
           (SELECT COUNT(*) FROM consumptions c WHERE c.task_id = t.id) AS total_inputs
    FROM tasks t
    JOIN task_types tt ON tt.id = t.task_type_id
"#;

#[derive(Clone, Copy, Default)]
pub struct TaskRepository;

impl TaskRepository {
    pub fn new() -> Self {
        Self
    }

    // ---
    // Tipos de tarefa
    // ---

    pub async fn list_task_types<'e, E>(&self, executor: E, query: &ListQuery) -> Result<Vec<TaskType>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT tt.* FROM task_types tt WHERE TRUE");
        push_search(&mut qb, query.search.as_deref(), &["tt.category::text", "tt.name"]);
        qb.push(ordering_clause(
            query.ordering.as_deref(),
            TASK_TYPE_ORDERING,
            "tt.category ASC, tt.name ASC",
            "tt.id",
        ));

        let task_types = qb.build_query_as::<TaskType>().fetch_all(executor).await?;
        Ok(task_types)
    }

    pub async fn find_task_type<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<TaskType>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let task_type = sqlx::query_as::<_, TaskType>("SELECT * FROM task_types WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(task_type)
    }

    pub async fn create_task_type<'e, E>(&self, executor: E, payload: &TaskTypePayload) -> Result<TaskType, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, TaskType>(
            r#"
            INSERT INTO task_types (name, category, description, estimated_duration_hours,
                                    requires_machinery, active)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&payload.name)
        .bind(payload.category)
        .bind(&payload.description)
        .bind(payload.estimated_duration_hours)
        .bind(payload.requires_machinery)
        .bind(payload.active)
        .fetch_one(executor)
        .await
        .map_err(map_write_error)
    }

    pub async fn update_task_type<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        payload: &TaskTypePayload,
    ) -> Result<Option<TaskType>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, TaskType>(
            r#"
            UPDATE task_types
            SET name = $2, category = $3, description = $4, estimated_duration_hours = $5,
                requires_machinery = $6, active = $7
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&payload.name)
        .bind(payload.category)
        .bind(&payload.description)
        .bind(payload.estimated_duration_hours)
        .bind(payload.requires_machinery)
        .bind(payload.active)
        .fetch_optional(executor)
        .await
        .map_err(map_write_error)
    }

    /// Mesmo bloqueio de `InputRepository::lock_input`, para o tipo de tarefa.
    pub async fn lock_task_type<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let locked = sqlx::query_scalar::<_, Uuid>("SELECT id FROM task_types WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(locked.is_some())
    }

    pub async fn tasks_using_type<'e, E>(&self, executor: E, task_type_id: Uuid) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tasks WHERE task_type_id = $1")
            .bind(task_type_id)
            .fetch_one(executor)
            .await?;
        Ok(count)
    }

    pub async fn delete_task_type<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM task_types WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    // ---
    // Tarefas
    // ---

    pub async fn list_tasks<'e, E>(&self, executor: E, query: &ListQuery) -> Result<Vec<TaskDetail>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = QueryBuilder::<Postgres>::new(TASK_DETAIL_SELECT);
        qb.push(" WHERE TRUE");
        push_search(&mut qb, query.search.as_deref(), &["t.state::text", "tt.name"]);
        qb.push(ordering_clause(
            query.ordering.as_deref(),
            TASK_ORDERING,
            "t.scheduled_on DESC, t.priority ASC",
            "t.id",
        ));

        let tasks = qb.build_query_as::<TaskDetail>().fetch_all(executor).await?;
        Ok(tasks)
    }

    pub async fn tasks_of_plot<'e, E>(&self, executor: E, plot_id: Uuid) -> Result<Vec<TaskDetail>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let tasks = sqlx::query_as::<_, TaskDetail>(&format!(
            "{TASK_DETAIL_SELECT} WHERE t.plot_id = $1 ORDER BY t.scheduled_on DESC, t.priority ASC, t.id"
        ))
        .bind(plot_id)
        .fetch_all(executor)
        .await?;
        Ok(tasks)
    }

    pub async fn find_task<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<TaskDetail>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let task = sqlx::query_as::<_, TaskDetail>(&format!("{TASK_DETAIL_SELECT} WHERE t.id = $1"))
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(task)
    }

    pub async fn create_task<'e, E>(&self, executor: E, payload: &TaskPayload) -> Result<Uuid, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO tasks (plot_id, task_type_id, title, description, scheduled_on, started_at,
                               finished_at, state, priority, estimated_hours, actual_hours,
                               estimated_cost, actual_cost, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING id
            "#,
        )
        .bind(payload.plot_id)
        .bind(payload.task_type_id)
        .bind(&payload.title)
        .bind(&payload.description)
        .bind(payload.scheduled_on)
        .bind(payload.started_at)
        .bind(payload.finished_at)
        .bind(payload.state)
        .bind(payload.priority)
        .bind(payload.estimated_hours)
        .bind(payload.actual_hours)
        .bind(payload.estimated_cost)
        .bind(payload.actual_cost)
        .bind(&payload.notes)
        .fetch_one(executor)
        .await
        .map_err(map_write_error)
    }

    pub async fn update_task<'e, E>(&self, executor: E, id: Uuid, payload: &TaskPayload) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE tasks
            SET plot_id = $2, task_type_id = $3, title = $4, description = $5, scheduled_on = $6,
                started_at = $7, finished_at = $8, state = $9, priority = $10,
                estimated_hours = $11, actual_hours = $12, estimated_cost = $13,
                actual_cost = $14, notes = $15, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(payload.plot_id)
        .bind(payload.task_type_id)
        .bind(&payload.title)
        .bind(&payload.description)
        .bind(payload.scheduled_on)
        .bind(payload.started_at)
        .bind(payload.finished_at)
        .bind(payload.state)
        .bind(payload.priority)
        .bind(payload.estimated_hours)
        .bind(payload.actual_hours)
        .bind(payload.estimated_cost)
        .bind(payload.actual_cost)
        .bind(&payload.notes)
        .execute(executor)
        .await
        .map_err(map_write_error)?;
        Ok(result.rows_affected() > 0)
    }

    /// (trabalhadores atribuídos, atribuições não concluídas)
    pub async fn worker_counts<'e, E>(&self, executor: E, task_id: Uuid) -> Result<(i64, i64), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let counts = sqlx::query_as::<_, (i64, i64)>(
            "SELECT COUNT(*), COUNT(*) FILTER (WHERE NOT completed) FROM assignments WHERE task_id = $1",
        )
        .bind(task_id)
        .fetch_one(executor)
        .await?;
        Ok(counts)
    }

    pub async fn delete_task_cascade(&self, conn: &mut PgConnection, id: Uuid) -> Result<u64, AppError> {
        sqlx::query("DELETE FROM assignments WHERE task_id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        sqlx::query("DELETE FROM consumptions WHERE task_id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected())
    }
}
