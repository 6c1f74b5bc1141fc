// src/services/farm_service.rs

use chrono::NaiveDate;
use sqlx::{Acquire, PgConnection};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{error::AppError, query::ListQuery},
    db::FarmRepository,
    models::farms::{
        Farm, FarmDetail, FarmListEntry, FarmPatch, FarmPayload, FarmStatistics, Plot, PlotPatch,
        PlotPayload, PlotPendingTasks, PlotPlantingAge,
    },
};

/// Dias desde o plantio; `None` quando o lote não tem data de plantio.
pub fn days_since_planting(plot: &Plot, today: NaiveDate) -> Option<i64> {
    plot.planted_on.map(|planted_on| (today - planted_on).num_days())
}

#[derive(Clone)]
pub struct FarmService {
    farm_repo: FarmRepository,
}

impl FarmService {
    pub fn new(farm_repo: FarmRepository) -> Self {
        Self { farm_repo }
    }

    // =========================================================================
    //  FAZENDAS
    // =========================================================================

    pub async fn list_farms(&self, conn: &mut PgConnection, query: &ListQuery) -> Result<Vec<FarmListEntry>, AppError> {
        self.farm_repo.list_farms(conn, query).await
    }

    async fn require_farm(&self, conn: &mut PgConnection, id: Uuid) -> Result<Farm, AppError> {
        self.farm_repo
            .find_farm(conn, id)
            .await?
            .ok_or(AppError::NotFound("farm"))
    }

    pub async fn get_farm(&self, conn: &mut PgConnection, id: Uuid) -> Result<FarmDetail, AppError> {
        let farm = self.require_farm(&mut *conn, id).await?;
        let plots = self.farm_repo.plots_of_farm(&mut *conn, id).await?;
        let (total_plots, cultivated_area) = self.farm_repo.plot_totals(&mut *conn, id).await?;

        Ok(FarmDetail {
            farm,
            plots,
            total_plots,
            cultivated_area,
        })
    }

    pub async fn create_farm(&self, conn: &mut PgConnection, payload: &FarmPayload) -> Result<Farm, AppError> {
        let farm = self.farm_repo.create_farm(conn, payload).await?;
        tracing::info!("Fazenda criada: {} ({})", farm.name, farm.id);
        Ok(farm)
    }

    pub async fn update_farm(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
        payload: &FarmPayload,
    ) -> Result<Farm, AppError> {
        self.farm_repo
            .update_farm(conn, id, payload)
            .await?
            .ok_or(AppError::NotFound("farm"))
    }

    /// PATCH: aplica os campos enviados sobre o registro atual e valida o resultado como um PUT.
    pub async fn patch_farm(&self, conn: &mut PgConnection, id: Uuid, patch: FarmPatch) -> Result<Farm, AppError> {
        let mut tx = conn.begin().await?;

        let current = self.require_farm(&mut tx, id).await?;
        let payload = patch.apply(current);
        payload.validate()?;
        let farm = self.update_farm(&mut tx, id, &payload).await?;

        tx.commit().await?;
        Ok(farm)
    }

    pub async fn delete_farm(&self, conn: &mut PgConnection, id: Uuid) -> Result<(), AppError> {
        let mut tx = conn.begin().await?;

        if self.farm_repo.delete_farm_cascade(&mut tx, id).await? == 0 {
            return Err(AppError::NotFound("farm"));
        }

        tx.commit().await?;
        tracing::info!("Fazenda {} removida (com lotes e tarefas)", id);
        Ok(())
    }

    pub async fn farm_plots(&self, conn: &mut PgConnection, id: Uuid) -> Result<Vec<Plot>, AppError> {
        self.require_farm(&mut *conn, id).await?;
        self.farm_repo.plots_of_farm(conn, id).await
    }

    pub async fn farm_statistics(&self, conn: &mut PgConnection, id: Uuid) -> Result<FarmStatistics, AppError> {
        let farm = self.require_farm(&mut *conn, id).await?;
        let (total_plots, cultivated_area) = self.farm_repo.plot_totals(conn, id).await?;

        Ok(FarmStatistics {
            name: farm.name,
            area_total: farm.area_total,
            total_plots,
            cultivated_area,
        })
    }

    // =========================================================================
    //  LOTES
    // =========================================================================

    pub async fn list_plots(&self, conn: &mut PgConnection, query: &ListQuery) -> Result<Vec<Plot>, AppError> {
        self.farm_repo.list_plots(conn, query).await
    }

    pub async fn get_plot(&self, conn: &mut PgConnection, id: Uuid) -> Result<Plot, AppError> {
        self.farm_repo
            .find_plot(conn, id)
            .await?
            .ok_or(AppError::NotFound("plot"))
    }

    pub async fn create_plot(&self, conn: &mut PgConnection, payload: &PlotPayload) -> Result<Plot, AppError> {
        let plot = self.farm_repo.create_plot(conn, payload).await?;
        tracing::info!("Lote criado: {} na fazenda {}", plot.code, plot.farm_id);
        Ok(plot)
    }

    pub async fn update_plot(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
        payload: &PlotPayload,
    ) -> Result<Plot, AppError> {
        self.farm_repo
            .update_plot(conn, id, payload)
            .await?
            .ok_or(AppError::NotFound("plot"))
    }

    pub async fn patch_plot(&self, conn: &mut PgConnection, id: Uuid, patch: PlotPatch) -> Result<Plot, AppError> {
        let mut tx = conn.begin().await?;

        let current = self.get_plot(&mut tx, id).await?;
        let payload = patch.apply(current);
        payload.validate()?;
        let plot = self.update_plot(&mut tx, id, &payload).await?;

        tx.commit().await?;
        Ok(plot)
    }

    pub async fn delete_plot(&self, conn: &mut PgConnection, id: Uuid) -> Result<(), AppError> {
        let mut tx = conn.begin().await?;

        if self.farm_repo.delete_plot_cascade(&mut tx, id).await? == 0 {
            return Err(AppError::NotFound("plot"));
        }

        tx.commit().await?;
        tracing::info!("Lote {} removido (com tarefas)", id);
        Ok(())
    }

    pub async fn pending_tasks(&self, conn: &mut PgConnection, id: Uuid) -> Result<PlotPendingTasks, AppError> {
        let plot = self.get_plot(&mut *conn, id).await?;
        let pending_tasks = self.farm_repo.pending_task_count(conn, id).await?;

        Ok(PlotPendingTasks {
            plot: plot.code,
            pending_tasks,
        })
    }

    pub async fn planting_age(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
        today: NaiveDate,
    ) -> Result<PlotPlantingAge, AppError> {
        let plot = self.get_plot(conn, id).await?;
        let days = days_since_planting(&plot, today);

        Ok(PlotPlantingAge {
            plot: plot.code,
            planted_on: plot.planted_on,
            days_since_planting: days,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::farms::PlotState;
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn plot(planted_on: Option<NaiveDate>) -> Plot {
        Plot {
            id: Uuid::new_v4(),
            farm_id: Uuid::new_v4(),
            code: "LT-001".into(),
            name: "Norte".into(),
            area: Decimal::new(1275, 2),
            current_crop: "Café".into(),
            planted_on,
            state: PlotState::Planted,
            polygon_coordinates: String::new(),
            notes: String::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn days_since_planting_counts_calendar_days() {
        let p = plot(Some(date(2024, 2, 28)));
        assert_eq!(days_since_planting(&p, date(2024, 3, 1)), Some(2));
        assert_eq!(days_since_planting(&p, date(2024, 2, 28)), Some(0));
    }

    #[test]
    fn days_since_planting_is_none_without_date() {
        assert_eq!(days_since_planting(&plot(None), date(2024, 3, 1)), None);
    }
}
