// src/db/input_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgConnection, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::{db_utils::map_write_error, error::AppError, query::like_pattern},
    models::inputs::{
        ConsumptionDetail, ConsumptionFilter, ConsumptionPayload, InputDetail, InputFilter,
        InputPayload, MovementDetail, MovementFilter, MovementPayload,
    },
};

// Insumo + total consumido; o restante é calculado no service
const INPUT_DETAIL_SELECT: &str = r#"
    SELECT i.*,
           COALESCE((SELECT SUM(c.quantity) FROM consumptions c WHERE c.input_id = i.id), 0)
               AS total_consumed
    FROM inputs i
"#;

const MOVEMENT_DETAIL_SELECT: &str = r#"
    SELECT m.*, i.unit_price AS input_unit_price
    FROM movements m
    JOIN inputs i ON i.id = m.input_id
"#;

const CONSUMPTION_DETAIL_SELECT: &str = r#"
    SELECT c.*, i.unit_price AS input_unit_price
    FROM consumptions c
    JOIN inputs i ON i.id = c.input_id
"#;

#[derive(Clone, Copy, Default)]
pub struct InputRepository;

impl InputRepository {
    pub fn new() -> Self {
        Self
    }

    // ---
    // Insumos
    // ---

    pub async fn list_inputs<'e, E>(&self, executor: E, filter: &InputFilter) -> Result<Vec<InputDetail>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = QueryBuilder::<Postgres>::new(INPUT_DETAIL_SELECT);
        qb.push(" WHERE TRUE");

        if let Some(category) = filter.category.as_deref() {
            qb.push(" AND i.category::text ILIKE ");
            qb.push_bind(like_pattern(category));
        }
        if let Some(name) = filter.name.as_deref() {
            qb.push(" AND i.name ILIKE ");
            qb.push_bind(like_pattern(name));
        }
        if let Some(supplier) = filter.supplier.as_deref() {
            qb.push(" AND i.supplier = ");
            qb.push_bind(supplier.to_string());
        }
        qb.push(" ORDER BY i.category ASC, i.name ASC, i.id");

        let inputs = qb.build_query_as::<InputDetail>().fetch_all(executor).await?;
        Ok(inputs)
    }

    pub async fn find_input<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<InputDetail>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let input = sqlx::query_as::<_, InputDetail>(&format!("{INPUT_DETAIL_SELECT} WHERE i.id = $1"))
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(input)
    }

    /// Saldo atual do insumo, com bloqueio da linha até o fim da transação.
    pub async fn lock_stock<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Decimal>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let stock = sqlx::query_scalar::<_, Decimal>("SELECT stock_current FROM inputs WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(stock)
    }

    /// Bloqueia a linha do insumo até o fim da transação. Um consumo novo
    /// referenciando o insumo espera esse bloqueio para checar a chave estrangeira.
    pub async fn lock_input<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let locked = sqlx::query_scalar::<_, Uuid>("SELECT id FROM inputs WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(locked.is_some())
    }

    pub async fn create_input<'e, E>(&self, executor: E, payload: &InputPayload) -> Result<Uuid, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO inputs (code, name, category, description, unit, stock_current, stock_min,
                                stock_max, unit_price, supplier, expires_on, supplier_batch,
                                requires_prescription, toxic, withholding_days, active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING id
            "#,
        )
        .bind(&payload.code)
        .bind(&payload.name)
        .bind(payload.category)
        .bind(&payload.description)
        .bind(payload.unit)
        .bind(payload.stock_current)
        .bind(payload.stock_min)
        .bind(payload.stock_max)
        .bind(payload.unit_price)
        .bind(&payload.supplier)
        .bind(payload.expires_on)
        .bind(&payload.supplier_batch)
        .bind(payload.requires_prescription)
        .bind(payload.toxic)
        .bind(payload.withholding_days)
        .bind(payload.active)
        .fetch_one(executor)
        .await
        .map_err(map_write_error)
    }

    /// Retorna `false` se o insumo não existe.
    pub async fn update_input<'e, E>(&self, executor: E, id: Uuid, payload: &InputPayload) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE inputs
            SET code = $2, name = $3, category = $4, description = $5, unit = $6,
                stock_current = $7, stock_min = $8, stock_max = $9, unit_price = $10,
                supplier = $11, expires_on = $12, supplier_batch = $13,
                requires_prescription = $14, toxic = $15, withholding_days = $16,
                active = $17, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&payload.code)
        .bind(&payload.name)
        .bind(payload.category)
        .bind(&payload.description)
        .bind(payload.unit)
        .bind(payload.stock_current)
        .bind(payload.stock_min)
        .bind(payload.stock_max)
        .bind(payload.unit_price)
        .bind(&payload.supplier)
        .bind(payload.expires_on)
        .bind(&payload.supplier_batch)
        .bind(payload.requires_prescription)
        .bind(payload.toxic)
        .bind(payload.withholding_days)
        .bind(payload.active)
        .execute(executor)
        .await
        .map_err(map_write_error)?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn consumption_count<'e, E>(&self, executor: E, input_id: Uuid) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM consumptions WHERE input_id = $1")
            .bind(input_id)
            .fetch_one(executor)
            .await?;
        Ok(count)
    }

    /// Remove o insumo e suas movimentações. A checagem de consumos fica no service.
    pub async fn delete_input_cascade(&self, conn: &mut PgConnection, id: Uuid) -> Result<u64, AppError> {
        sqlx::query("DELETE FROM movements WHERE input_id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        let result = sqlx::query("DELETE FROM inputs WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected())
    }

    /// (quantidade de insumos, valor total do estoque, insumos abaixo do mínimo)
    pub async fn inventory_totals<'e, E>(&self, executor: E) -> Result<(i64, Decimal, i64), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let totals = sqlx::query_as::<_, (i64, Decimal, i64)>(
            r#"
            SELECT COUNT(*),
                   COALESCE(SUM(stock_current * unit_price), 0),
                   COUNT(*) FILTER (WHERE stock_current < stock_min)
            FROM inputs
            "#,
        )
        .fetch_one(executor)
        .await?;
        Ok(totals)
    }

    // ---
    // Movimentações
    // ---

    pub async fn list_movements<'e, E>(
        &self,
        executor: E,
        filter: &MovementFilter,
    ) -> Result<Vec<MovementDetail>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = QueryBuilder::<Postgres>::new(MOVEMENT_DETAIL_SELECT);
        qb.push(" WHERE TRUE");

        if let Some(kind) = filter.kind {
            qb.push(" AND m.kind = ");
            qb.push_bind(kind);
        }
        if let Some(after) = filter.date_after {
            qb.push(" AND m.moved_at::date >= ");
            qb.push_bind(after);
        }
        if let Some(before) = filter.date_before {
            qb.push(" AND m.moved_at::date <= ");
            qb.push_bind(before);
        }
        qb.push(" ORDER BY m.moved_at DESC, m.id");

        let movements = qb.build_query_as::<MovementDetail>().fetch_all(executor).await?;
        Ok(movements)
    }

    pub async fn find_movement<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<MovementDetail>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let movement = sqlx::query_as::<_, MovementDetail>(&format!("{MOVEMENT_DETAIL_SELECT} WHERE m.id = $1"))
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(movement)
    }

    pub async fn create_movement<'e, E>(&self, executor: E, payload: &MovementPayload) -> Result<Uuid, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO movements (input_id, kind, quantity, description, reference_document,
                                   unit_cost, responsible)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(payload.input_id)
        .bind(payload.kind)
        .bind(payload.quantity)
        .bind(&payload.description)
        .bind(&payload.reference_document)
        .bind(payload.unit_cost)
        .bind(&payload.responsible)
        .fetch_one(executor)
        .await
        .map_err(map_write_error)
    }

    pub async fn update_movement<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        payload: &MovementPayload,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE movements
            SET input_id = $2, kind = $3, quantity = $4, description = $5,
                reference_document = $6, unit_cost = $7, responsible = $8
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(payload.input_id)
        .bind(payload.kind)
        .bind(payload.quantity)
        .bind(&payload.description)
        .bind(&payload.reference_document)
        .bind(payload.unit_cost)
        .bind(&payload.responsible)
        .execute(executor)
        .await
        .map_err(map_write_error)?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_movement<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM movements WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    // ---
    // Consumos
    // ---

    pub async fn list_consumptions<'e, E>(
        &self,
        executor: E,
        filter: &ConsumptionFilter,
    ) -> Result<Vec<ConsumptionDetail>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = QueryBuilder::<Postgres>::new(CONSUMPTION_DETAIL_SELECT);
        qb.push(" WHERE TRUE");

        if let Some(input_id) = filter.input_id {
            qb.push(" AND c.input_id = ");
            qb.push_bind(input_id);
        }
        if let Some(task_id) = filter.task_id {
            qb.push(" AND c.task_id = ");
            qb.push_bind(task_id);
        }
        if let Some(after) = filter.consumed_after {
            qb.push(" AND c.consumed_at::date >= ");
            qb.push_bind(after);
        }
        if let Some(before) = filter.consumed_before {
            qb.push(" AND c.consumed_at::date <= ");
            qb.push_bind(before);
        }
        qb.push(" ORDER BY c.consumed_at DESC, c.id");

        let consumptions = qb.build_query_as::<ConsumptionDetail>().fetch_all(executor).await?;
        Ok(consumptions)
    }

    pub async fn find_consumption<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<ConsumptionDetail>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let consumption =
            sqlx::query_as::<_, ConsumptionDetail>(&format!("{CONSUMPTION_DETAIL_SELECT} WHERE c.id = $1"))
                .bind(id)
                .fetch_optional(executor)
                .await?;
        Ok(consumption)
    }

    pub async fn create_consumption<'e, E>(&self, executor: E, payload: &ConsumptionPayload) -> Result<Uuid, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO consumptions (input_id, task_id, quantity, applicator, applied_dose,
                                      weather_conditions, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(payload.input_id)
        .bind(payload.task_id)
        .bind(payload.quantity)
        .bind(&payload.applicator)
        .bind(&payload.applied_dose)
        .bind(&payload.weather_conditions)
        .bind(&payload.notes)
        .fetch_one(executor)
        .await
        .map_err(map_write_error)
    }

    pub async fn update_consumption<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        payload: &ConsumptionPayload,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE consumptions
            SET input_id = $2, task_id = $3, quantity = $4, applicator = $5,
                applied_dose = $6, weather_conditions = $7, notes = $8
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(payload.input_id)
        .bind(payload.task_id)
        .bind(payload.quantity)
        .bind(&payload.applicator)
        .bind(&payload.applied_dose)
        .bind(&payload.weather_conditions)
        .bind(&payload.notes)
        .execute(executor)
        .await
        .map_err(map_write_error)?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_consumption<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM consumptions WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
