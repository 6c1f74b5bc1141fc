// src/db/farm_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgConnection, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::{
        db_utils::map_write_error,
        error::AppError,
        query::{ordering_clause, push_search, ListQuery},
    },
    models::farms::{Farm, FarmListEntry, FarmPayload, Plot, PlotPayload},
};

// Campos públicos aceitos em ?ordering= -> coluna
const FARM_ORDERING: &[(&str, &str)] = &[
    ("name", "f.name"),
    ("registeredOn", "f.registered_on"),
    ("areaTotal", "f.area_total"),
];

const PLOT_ORDERING: &[(&str, &str)] = &[
    ("code", "p.code"),
    ("createdAt", "p.created_at"),
    ("state", "p.state"),
];

#[derive(Clone, Copy, Default)]
pub struct FarmRepository;

impl FarmRepository {
    pub fn new() -> Self {
        Self
    }

    // ---
    // Fazendas
    // ---

    pub async fn list_farms<'e, E>(&self, executor: E, query: &ListQuery) -> Result<Vec<FarmListEntry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = QueryBuilder::<Postgres>::new(
            r#"
            SELECT f.*,
                   (SELECT COUNT(*) FROM plots p WHERE p.farm_id = f.id) AS total_plots
            FROM farms f
            WHERE TRUE
            "#,
        );
        push_search(&mut qb, query.search.as_deref(), &["f.name", "f.owner", "f.location"]);
        qb.push(ordering_clause(query.ordering.as_deref(), FARM_ORDERING, "f.name ASC", "f.id"));

        let farms = qb.build_query_as::<FarmListEntry>().fetch_all(executor).await?;
        Ok(farms)
    }

    pub async fn find_farm<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Farm>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let farm = sqlx::query_as::<_, Farm>("SELECT * FROM farms WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(farm)
    }

    pub async fn create_farm<'e, E>(&self, executor: E, payload: &FarmPayload) -> Result<Farm, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Farm>(
            r#"
            INSERT INTO farms (name, location, area_total, latitude, longitude, owner, active)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(&payload.name)
        .bind(&payload.location)
        .bind(payload.area_total)
        .bind(payload.latitude)
        .bind(payload.longitude)
        .bind(&payload.owner)
        .bind(payload.active)
        .fetch_one(executor)
        .await
        .map_err(map_write_error)
    }

    pub async fn update_farm<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        payload: &FarmPayload,
    ) -> Result<Option<Farm>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Farm>(
            r#"
            UPDATE farms
            SET name = $2, location = $3, area_total = $4, latitude = $5,
                longitude = $6, owner = $7, active = $8
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&payload.name)
        .bind(&payload.location)
        .bind(payload.area_total)
        .bind(payload.latitude)
        .bind(payload.longitude)
        .bind(&payload.owner)
        .bind(payload.active)
        .fetch_optional(executor)
        .await
        .map_err(map_write_error)
    }

    /// (quantidade de lotes, soma das áreas) de uma fazenda.
    pub async fn plot_totals<'e, E>(&self, executor: E, farm_id: Uuid) -> Result<(i64, Decimal), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let totals = sqlx::query_as::<_, (i64, Decimal)>(
            "SELECT COUNT(*), COALESCE(SUM(area), 0) FROM plots WHERE farm_id = $1",
        )
        .bind(farm_id)
        .fetch_one(executor)
        .await?;
        Ok(totals)
    }

    /// Remove a fazenda e tudo que pende dela: lotes, tarefas e os registros das tarefas.
    pub async fn delete_farm_cascade(&self, conn: &mut PgConnection, id: Uuid) -> Result<u64, AppError> {
        const TASKS_OF_FARM: &str =
            "SELECT t.id FROM tasks t JOIN plots p ON p.id = t.plot_id WHERE p.farm_id = $1";

        sqlx::query(&format!("DELETE FROM assignments WHERE task_id IN ({TASKS_OF_FARM})"))
            .bind(id)
            .execute(&mut *conn)
            .await?;
        sqlx::query(&format!("DELETE FROM consumptions WHERE task_id IN ({TASKS_OF_FARM})"))
            .bind(id)
            .execute(&mut *conn)
            .await?;
        sqlx::query("DELETE FROM tasks WHERE plot_id IN (SELECT id FROM plots WHERE farm_id = $1)")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        sqlx::query("DELETE FROM plots WHERE farm_id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        let result = sqlx::query("DELETE FROM farms WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected())
    }

    // ---
    // Lotes
    // ---

    pub async fn list_plots<'e, E>(&self, executor: E, query: &ListQuery) -> Result<Vec<Plot>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT p.* FROM plots p JOIN farms f ON f.id = p.farm_id WHERE TRUE",
        );
        push_search(
            &mut qb,
            query.search.as_deref(),
            &["p.name", "p.code", "p.current_crop", "f.name"],
        );
        qb.push(ordering_clause(
            query.ordering.as_deref(),
            PLOT_ORDERING,
            "f.name ASC, p.code ASC",
            "p.id",
        ));

        let plots = qb.build_query_as::<Plot>().fetch_all(executor).await?;
        Ok(plots)
    }

    pub async fn plots_of_farm<'e, E>(&self, executor: E, farm_id: Uuid) -> Result<Vec<Plot>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let plots = sqlx::query_as::<_, Plot>("SELECT * FROM plots WHERE farm_id = $1 ORDER BY code ASC, id")
            .bind(farm_id)
            .fetch_all(executor)
            .await?;
        Ok(plots)
    }

    pub async fn find_plot<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Plot>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let plot = sqlx::query_as::<_, Plot>("SELECT * FROM plots WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(plot)
    }

    pub async fn create_plot<'e, E>(&self, executor: E, payload: &PlotPayload) -> Result<Plot, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Plot>(
            r#"
            INSERT INTO plots (farm_id, code, name, area, current_crop, planted_on, state,
                               polygon_coordinates, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(payload.farm_id)
        .bind(&payload.code)
        .bind(&payload.name)
        .bind(payload.area)
        .bind(&payload.current_crop)
        .bind(payload.planted_on)
        .bind(payload.state)
        .bind(&payload.polygon_coordinates)
        .bind(&payload.notes)
        .fetch_one(executor)
        .await
        .map_err(map_write_error)
    }

    pub async fn update_plot<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        payload: &PlotPayload,
    ) -> Result<Option<Plot>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Plot>(
            r#"
            UPDATE plots
            SET farm_id = $2, code = $3, name = $4, area = $5, current_crop = $6,
                planted_on = $7, state = $8, polygon_coordinates = $9, notes = $10,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(payload.farm_id)
        .bind(&payload.code)
        .bind(&payload.name)
        .bind(payload.area)
        .bind(&payload.current_crop)
        .bind(payload.planted_on)
        .bind(payload.state)
        .bind(&payload.polygon_coordinates)
        .bind(&payload.notes)
        .fetch_optional(executor)
        .await
        .map_err(map_write_error)
    }

    pub async fn pending_task_count<'e, E>(&self, executor: E, plot_id: Uuid) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM tasks WHERE plot_id = $1 AND state = 'pending'")
                .bind(plot_id)
                .fetch_one(executor)
                .await?;
        Ok(count)
    }

    pub async fn delete_plot_cascade(&self, conn: &mut PgConnection, id: Uuid) -> Result<u64, AppError> {
        sqlx::query("DELETE FROM assignments WHERE task_id IN (SELECT id FROM tasks WHERE plot_id = $1)")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        sqlx::query("DELETE FROM consumptions WHERE task_id IN (SELECT id FROM tasks WHERE plot_id = $1)")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        sqlx::query("DELETE FROM tasks WHERE plot_id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        let result = sqlx::query("DELETE FROM plots WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected())
    }
}
