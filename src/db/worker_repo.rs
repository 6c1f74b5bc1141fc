// src/db/worker_repo.rs

use sqlx::{Executor, PgConnection, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::{
        db_utils::map_write_error,
        error::AppError,
        query::{ordering_clause, push_search, ListQuery},
    },
    models::workers::{AssignmentDetail, AssignmentPayload, WorkerDetail, WorkerPayload, WorkerRole},
};

const WORKER_ORDERING: &[(&str, &str)] = &[("hiredOn", "w.hired_on")];

const ASSIGNMENT_ORDERING: &[(&str, &str)] = &[
    ("assignedAt", "a.assigned_at"),
    ("completed", "a.completed"),
];

const WORKER_DETAIL_SELECT: &str = r#"
    SELECT w.*,
           (SELECT COUNT(*) FROM assignments a WHERE a.worker_id = w.id) AS total_assignments
    FROM workers w
"#;

const ASSIGNMENT_DETAIL_SELECT: &str = r#"
    SELECT a.*,
           w.first_name AS worker_first_name,
           w.hourly_rate AS worker_hourly_rate,
           t.title AS task_title
    FROM assignments a
    JOIN workers w ON w.id = a.worker_id
    JOIN tasks t ON t.id = a.task_id
"#;

#[derive(Clone, Copy, Default)]
pub struct WorkerRepository;

impl WorkerRepository {
    pub fn new() -> Self {
        Self
    }

    // ---
    // Trabalhadores
    // ---

    pub async fn list_workers<'e, E>(&self, executor: E, query: &ListQuery) -> Result<Vec<WorkerDetail>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = QueryBuilder::<Postgres>::new(WORKER_DETAIL_SELECT);
        qb.push(" WHERE TRUE");
        push_search(&mut qb, query.search.as_deref(), &["w.first_name", "w.last_name"]);
        qb.push(ordering_clause(
            query.ordering.as_deref(),
            WORKER_ORDERING,
            "w.last_name ASC, w.first_name ASC",
            "w.id",
        ));

        let workers = qb.build_query_as::<WorkerDetail>().fetch_all(executor).await?;
        Ok(workers)
    }

    /// Trabalhadores ativos com o cargo informado.
    pub async fn active_workers_by_role<'e, E>(
        &self,
        executor: E,
        role: WorkerRole,
    ) -> Result<Vec<WorkerDetail>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let workers = sqlx::query_as::<_, WorkerDetail>(&format!(
            "{WORKER_DETAIL_SELECT} WHERE w.role = $1 AND w.active ORDER BY w.last_name ASC, w.first_name ASC, w.id"
        ))
        .bind(role)
        .fetch_all(executor)
        .await?;
        Ok(workers)
    }

    pub async fn find_worker<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<WorkerDetail>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let worker = sqlx::query_as::<_, WorkerDetail>(&format!("{WORKER_DETAIL_SELECT} WHERE w.id = $1"))
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(worker)
    }

    pub async fn create_worker<'e, E>(&self, executor: E, payload: &WorkerPayload) -> Result<Uuid, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO workers (national_id, first_name, last_name, birth_date, phone, email,
                                 address, role, contract_type, hired_on, left_on, active,
                                 base_salary, hourly_rate, specialties, certifications)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING id
            "#,
        )
        .bind(&payload.national_id)
        .bind(&payload.first_name)
        .bind(&payload.last_name)
        .bind(payload.birth_date)
        .bind(&payload.phone)
        .bind(&payload.email)
        .bind(&payload.address)
        .bind(payload.role)
        .bind(payload.contract_type)
        .bind(payload.hired_on)
        .bind(payload.left_on)
        .bind(payload.active)
        .bind(payload.base_salary)
        .bind(payload.hourly_rate)
        .bind(&payload.specialties)
        .bind(&payload.certifications)
        .fetch_one(executor)
        .await
        .map_err(map_write_error)
    }

    pub async fn update_worker<'e, E>(&self, executor: E, id: Uuid, payload: &WorkerPayload) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE workers
            SET national_id = $2, first_name = $3, last_name = $4, birth_date = $5, phone = $6,
                email = $7, address = $8, role = $9, contract_type = $10, hired_on = $11,
                left_on = $12, active = $13, base_salary = $14, hourly_rate = $15,
                specialties = $16, certifications = $17, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&payload.national_id)
        .bind(&payload.first_name)
        .bind(&payload.last_name)
        .bind(payload.birth_date)
        .bind(&payload.phone)
        .bind(&payload.email)
        .bind(&payload.address)
        .bind(payload.role)
        .bind(payload.contract_type)
        .bind(payload.hired_on)
        .bind(payload.left_on)
        .bind(payload.active)
        .bind(payload.base_salary)
        .bind(payload.hourly_rate)
        .bind(&payload.specialties)
        .bind(&payload.certifications)
        .execute(executor)
        .await
        .map_err(map_write_error)?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_worker_cascade(&self, conn: &mut PgConnection, id: Uuid) -> Result<u64, AppError> {
        sqlx::query("DELETE FROM assignments WHERE worker_id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        let result = sqlx::query("DELETE FROM workers WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected())
    }

    // ---
    // Atribuições
    // ---

    pub async fn list_assignments<'e, E>(
        &self,
        executor: E,
        query: &ListQuery,
    ) -> Result<Vec<AssignmentDetail>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = QueryBuilder::<Postgres>::new(ASSIGNMENT_DETAIL_SELECT);
        qb.push(" WHERE TRUE");
        push_search(&mut qb, query.search.as_deref(), &["w.first_name", "t.title"]);
        qb.push(ordering_clause(
            query.ordering.as_deref(),
            ASSIGNMENT_ORDERING,
            "a.assigned_at DESC",
            "a.id",
        ));

        let assignments = qb.build_query_as::<AssignmentDetail>().fetch_all(executor).await?;
        Ok(assignments)
    }

    pub async fn find_assignment<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<AssignmentDetail>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let assignment =
            sqlx::query_as::<_, AssignmentDetail>(&format!("{ASSIGNMENT_DETAIL_SELECT} WHERE a.id = $1"))
                .bind(id)
                .fetch_optional(executor)
                .await?;
        Ok(assignment)
    }

    pub async fn create_assignment<'e, E>(&self, executor: E, payload: &AssignmentPayload) -> Result<Uuid, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO assignments (worker_id, task_id, hours_assigned, hours_worked,
                                     role_in_task, notes, completed)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(payload.worker_id)
        .bind(payload.task_id)
        .bind(payload.hours_assigned)
        .bind(payload.hours_worked)
        .bind(&payload.role_in_task)
        .bind(&payload.notes)
        .bind(payload.completed)
        .fetch_one(executor)
        .await
        .map_err(map_write_error)
    }

    pub async fn update_assignment<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        payload: &AssignmentPayload,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE assignments
            SET worker_id = $2, task_id = $3, hours_assigned = $4, hours_worked = $5,
                role_in_task = $6, notes = $7, completed = $8
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(payload.worker_id)
        .bind(payload.task_id)
        .bind(payload.hours_assigned)
        .bind(payload.hours_worked)
        .bind(&payload.role_in_task)
        .bind(&payload.notes)
        .bind(payload.completed)
        .execute(executor)
        .await
        .map_err(map_write_error)?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_assignment<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM assignments WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
