// src/services/inventory_service.rs

use rust_decimal::Decimal;
use sqlx::{Acquire, PgConnection};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    common::error::AppError,
    db::InputRepository,
    models::inputs::{
        Consumption, ConsumptionDetail, ConsumptionFilter, ConsumptionPatch, ConsumptionPayload,
        Input, InputDetail, InputFilter, InputPatch, InputPayload, InventorySummary, Movement,
        MovementDetail, MovementFilter, MovementKind, MovementPatch, MovementPayload,
    },
};

// ---
// Cálculos de estoque
// ---

/// Estoque abaixo do mínimo (igual ao mínimo não conta).
pub fn stock_low(input: &Input) -> bool {
    input.stock_current < input.stock_min
}

pub fn inventory_value(input: &Input) -> Decimal {
    input.stock_current * input.unit_price
}

/// Custo da movimentação: custo unitário informado ou, na falta dele, o preço atual do insumo.
/// Custo unitário zero conta como não informado.
pub fn movement_cost(movement: &Movement, input_unit_price: Decimal) -> Decimal {
    let unit_cost = movement.unit_cost.filter(|cost| !cost.is_zero());
    movement.quantity * unit_cost.unwrap_or(input_unit_price)
}

pub fn consumption_cost(consumption: &Consumption, input_unit_price: Decimal) -> Decimal {
    consumption.quantity * input_unit_price
}

/// Uma saída não pode levar mais do que o saldo atual. O saldo não é alterado aqui.
pub fn check_exit(kind: MovementKind, quantity: Decimal, stock_current: Decimal) -> Result<(), AppError> {
    if kind == MovementKind::Exit && quantity > stock_current {
        let mut err = ValidationError::new("insufficient_stock");
        err.add_param("available".into(), &stock_current.to_string());
        err.message = Some("insufficient_stock".into());
        return Err(AppError::field("quantity", err));
    }
    Ok(())
}

fn input_detail(mut detail: InputDetail) -> InputDetail {
    detail.stock_low = stock_low(&detail.input);
    detail.inventory_value = inventory_value(&detail.input);
    detail
}

fn movement_detail(mut detail: MovementDetail) -> MovementDetail {
    detail.total_cost = movement_cost(&detail.movement, detail.input_unit_price);
    detail
}

fn consumption_detail(mut detail: ConsumptionDetail) -> ConsumptionDetail {
    detail.cost = consumption_cost(&detail.consumption, detail.input_unit_price);
    detail
}

fn unknown_input() -> AppError {
    let mut err = ValidationError::new("unknown_reference");
    err.message = Some("unknown_reference".into());
    AppError::field("inputId", err)
}

#[derive(Clone)]
pub struct InventoryService {
    input_repo: InputRepository,
}

impl InventoryService {
    pub fn new(input_repo: InputRepository) -> Self {
        Self { input_repo }
    }

    // =========================================================================
    //  INSUMOS
    // =========================================================================

    pub async fn list_inputs(&self, conn: &mut PgConnection, filter: &InputFilter) -> Result<Vec<InputDetail>, AppError> {
        let inputs = self.input_repo.list_inputs(conn, filter).await?;
        Ok(inputs.into_iter().map(input_detail).collect())
    }

    pub async fn get_input(&self, conn: &mut PgConnection, id: Uuid) -> Result<InputDetail, AppError> {
        self.input_repo
            .find_input(conn, id)
            .await?
            .map(input_detail)
            .ok_or(AppError::NotFound("input"))
    }

    pub async fn create_input(&self, conn: &mut PgConnection, payload: &InputPayload) -> Result<InputDetail, AppError> {
        let mut tx = conn.begin().await?;

        let id = self.input_repo.create_input(&mut *tx, payload).await?;
        let input = self.get_input(&mut tx, id).await?;

        tx.commit().await?;
        tracing::info!("Insumo criado: {} ({})", input.input.code, id);
        Ok(input)
    }

    pub async fn update_input(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
        payload: &InputPayload,
    ) -> Result<InputDetail, AppError> {
        let mut tx = conn.begin().await?;

        if !self.input_repo.update_input(&mut *tx, id, payload).await? {
            return Err(AppError::NotFound("input"));
        }
        let input = self.get_input(&mut tx, id).await?;

        tx.commit().await?;
        Ok(input)
    }

    pub async fn patch_input(&self, conn: &mut PgConnection, id: Uuid, patch: InputPatch) -> Result<InputDetail, AppError> {
        let mut tx = conn.begin().await?;

        let current = self.get_input(&mut tx, id).await?;
        let payload = patch.apply(current.input);
        payload.validate()?;
        let input = self.update_input(&mut tx, id, &payload).await?;

        tx.commit().await?;
        Ok(input)
    }

    /// Remove o insumo e suas movimentações; bloqueado se houver consumos registrados.
    pub async fn delete_input(&self, conn: &mut PgConnection, id: Uuid) -> Result<(), AppError> {
        let mut tx = conn.begin().await?;

        // Trava o insumo antes da contagem: um consumo concorrente termina antes ou espera a remoção
        if !self.input_repo.lock_input(&mut *tx, id).await? {
            return Err(AppError::NotFound("input"));
        }

        let consumptions = self.input_repo.consumption_count(&mut *tx, id).await?;
        if consumptions > 0 {
            tracing::warn!("Remoção do insumo {} bloqueada: {} consumo(s)", id, consumptions);
            return Err(AppError::ProtectedReference {
                resource: "input",
                referenced_by: "consumption",
                count: consumptions,
            });
        }

        if self.input_repo.delete_input_cascade(&mut tx, id).await? == 0 {
            return Err(AppError::NotFound("input"));
        }

        tx.commit().await?;
        tracing::info!("Insumo {} removido (com movimentações)", id);
        Ok(())
    }

    pub async fn inventory_summary(&self, conn: &mut PgConnection) -> Result<InventorySummary, AppError> {
        let (total_inputs, total_inventory_value, inputs_below_minimum) =
            self.input_repo.inventory_totals(conn).await?;

        Ok(InventorySummary {
            total_inputs,
            total_inventory_value,
            inputs_below_minimum,
        })
    }

    // =========================================================================
    //  MOVIMENTAÇÕES
    // =========================================================================

    pub async fn list_movements(
        &self,
        conn: &mut PgConnection,
        filter: &MovementFilter,
    ) -> Result<Vec<MovementDetail>, AppError> {
        let movements = self.input_repo.list_movements(conn, filter).await?;
        Ok(movements.into_iter().map(movement_detail).collect())
    }

    pub async fn get_movement(&self, conn: &mut PgConnection, id: Uuid) -> Result<MovementDetail, AppError> {
        self.input_repo
            .find_movement(conn, id)
            .await?
            .map(movement_detail)
            .ok_or(AppError::NotFound("movement"))
    }

    // Saídas são conferidas contra o saldo com a linha do insumo bloqueada.
    async fn check_stock_for(&self, conn: &mut PgConnection, payload: &MovementPayload) -> Result<(), AppError> {
        if payload.kind != MovementKind::Exit {
            return Ok(());
        }
        let stock = self
            .input_repo
            .lock_stock(conn, payload.input_id)
            .await?
            .ok_or_else(unknown_input)?;
        check_exit(payload.kind, payload.quantity, stock)
    }

    pub async fn create_movement(
        &self,
        conn: &mut PgConnection,
        payload: &MovementPayload,
    ) -> Result<MovementDetail, AppError> {
        let mut tx = conn.begin().await?;

        self.check_stock_for(&mut tx, payload).await?;
        let id = self.input_repo.create_movement(&mut *tx, payload).await?;
        let movement = self.get_movement(&mut tx, id).await?;

        tx.commit().await?;
        tracing::info!(
            "Movimentação {:?} de {} registrada para o insumo {}",
            payload.kind,
            payload.quantity,
            payload.input_id
        );
        Ok(movement)
    }

    pub async fn update_movement(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
        payload: &MovementPayload,
    ) -> Result<MovementDetail, AppError> {
        let mut tx = conn.begin().await?;

        self.check_stock_for(&mut tx, payload).await?;
        if !self.input_repo.update_movement(&mut *tx, id, payload).await? {
            return Err(AppError::NotFound("movement"));
        }
        let movement = self.get_movement(&mut tx, id).await?;

        tx.commit().await?;
        Ok(movement)
    }

    pub async fn patch_movement(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
        patch: MovementPatch,
    ) -> Result<MovementDetail, AppError> {
        let mut tx = conn.begin().await?;

        let current = self.get_movement(&mut tx, id).await?;
        let payload = patch.apply(current.movement);
        payload.validate()?;
        let movement = self.update_movement(&mut tx, id, &payload).await?;

        tx.commit().await?;
        Ok(movement)
    }

    pub async fn delete_movement(&self, conn: &mut PgConnection, id: Uuid) -> Result<(), AppError> {
        if self.input_repo.delete_movement(conn, id).await? == 0 {
            return Err(AppError::NotFound("movement"));
        }
        Ok(())
    }

    // =========================================================================
    //  CONSUMOS
    // =========================================================================

    pub async fn list_consumptions(
        &self,
        conn: &mut PgConnection,
        filter: &ConsumptionFilter,
    ) -> Result<Vec<ConsumptionDetail>, AppError> {
        let consumptions = self.input_repo.list_consumptions(conn, filter).await?;
        Ok(consumptions.into_iter().map(consumption_detail).collect())
    }

    pub async fn get_consumption(&self, conn: &mut PgConnection, id: Uuid) -> Result<ConsumptionDetail, AppError> {
        self.input_repo
            .find_consumption(conn, id)
            .await?
            .map(consumption_detail)
            .ok_or(AppError::NotFound("consumption"))
    }

    pub async fn create_consumption(
        &self,
        conn: &mut PgConnection,
        payload: &ConsumptionPayload,
    ) -> Result<ConsumptionDetail, AppError> {
        let mut tx = conn.begin().await?;

        let id = self.input_repo.create_consumption(&mut *tx, payload).await?;
        let consumption = self.get_consumption(&mut tx, id).await?;

        tx.commit().await?;
        tracing::info!("Consumo de {} do insumo {} na tarefa {}", payload.quantity, payload.input_id, payload.task_id);
        Ok(consumption)
    }

    pub async fn update_consumption(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
        payload: &ConsumptionPayload,
    ) -> Result<ConsumptionDetail, AppError> {
        let mut tx = conn.begin().await?;

        if !self.input_repo.update_consumption(&mut *tx, id, payload).await? {
            return Err(AppError::NotFound("consumption"));
        }
        let consumption = self.get_consumption(&mut tx, id).await?;

        tx.commit().await?;
        Ok(consumption)
    }

    pub async fn patch_consumption(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
        patch: ConsumptionPatch,
    ) -> Result<ConsumptionDetail, AppError> {
        let mut tx = conn.begin().await?;

        let current = self.get_consumption(&mut tx, id).await?;
        let payload = patch.apply(current.consumption);
        payload.validate()?;
        let consumption = self.update_consumption(&mut tx, id, &payload).await?;

        tx.commit().await?;
        Ok(consumption)
    }

    pub async fn delete_consumption(&self, conn: &mut PgConnection, id: Uuid) -> Result<(), AppError> {
        if self.input_repo.delete_consumption(conn, id).await? == 0 {
            return Err(AppError::NotFound("consumption"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::inputs::{InputCategory, UnitOfMeasure};
    use chrono::Utc;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn input(stock_current: &str, stock_min: &str, unit_price: &str) -> Input {
        Input {
            id: Uuid::new_v4(),
            code: "FER-001".into(),
            name: "Urea".into(),
            category: InputCategory::Fertilizer,
            description: String::new(),
            unit: UnitOfMeasure::Kg,
            stock_current: dec(stock_current),
            stock_min: dec(stock_min),
            stock_max: None,
            unit_price: dec(unit_price),
            supplier: String::new(),
            expires_on: None,
            supplier_batch: String::new(),
            requires_prescription: false,
            toxic: false,
            withholding_days: None,
            active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn movement(quantity: &str, unit_cost: Option<&str>) -> Movement {
        Movement {
            id: Uuid::new_v4(),
            input_id: Uuid::new_v4(),
            kind: MovementKind::Entry,
            quantity: dec(quantity),
            moved_at: Utc::now(),
            description: "Compra".into(),
            reference_document: String::new(),
            unit_cost: unit_cost.map(dec),
            responsible: "Pedro".into(),
        }
    }

    #[test]
    fn stock_low_is_strictly_below_minimum() {
        assert!(stock_low(&input("5", "10", "1")));
        assert!(!stock_low(&input("10", "10", "1")));
        assert!(!stock_low(&input("10.01", "10", "1")));
    }

    #[test]
    fn inventory_value_is_exact() {
        assert_eq!(inventory_value(&input("3.33", "0", "3.00")), dec("9.99"));
        assert_eq!(inventory_value(&input("0.10", "0", "0.20")), dec("0.02"));
    }

    #[test]
    fn movement_cost_prefers_explicit_unit_cost() {
        assert_eq!(movement_cost(&movement("4", Some("2.50")), dec("9")), dec("10"));
        // custo zero cai no preço do insumo
        assert_eq!(movement_cost(&movement("4", Some("0")), dec("9")), dec("36"));
        assert_eq!(movement_cost(&movement("4", Some("0.00")), dec("9")), dec("36"));
        assert_eq!(movement_cost(&movement("4", None), dec("9")), dec("36"));
    }

    #[test]
    fn consumption_cost_uses_current_price() {
        let consumption = Consumption {
            id: Uuid::new_v4(),
            input_id: Uuid::new_v4(),
            task_id: Uuid::new_v4(),
            quantity: dec("2.5"),
            consumed_at: Utc::now(),
            applicator: String::new(),
            applied_dose: String::new(),
            weather_conditions: String::new(),
            notes: String::new(),
        };
        assert_eq!(consumption_cost(&consumption, dec("4")), dec("10"));
    }

    #[test]
    fn exit_cannot_exceed_stock() {
        assert!(check_exit(MovementKind::Exit, dec("10"), dec("10")).is_ok());

        let err = check_exit(MovementKind::Exit, dec("10.01"), dec("10")).unwrap_err();
        match err {
            AppError::ValidationError(errors) => {
                let field_errors = errors.field_errors();
                let field = field_errors["quantity"];
                assert_eq!(field[0].code, "insufficient_stock");
                assert_eq!(field[0].params["available"], "10");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn only_exits_are_checked() {
        for kind in [MovementKind::Entry, MovementKind::Adjustment, MovementKind::Loss, MovementKind::Return] {
            assert!(check_exit(kind, dec("500"), dec("1")).is_ok());
        }
    }

    #[test]
    fn detail_fills_derived_fields() {
        let detail = input_detail(InputDetail {
            input: input("5", "10", "2"),
            total_consumed: dec("7"),
            stock_low: false,
            inventory_value: Decimal::ZERO,
        });
        assert!(detail.stock_low);
        assert_eq!(detail.inventory_value, dec("10"));
        assert_eq!(detail.total_consumed, dec("7"));
    }
}
