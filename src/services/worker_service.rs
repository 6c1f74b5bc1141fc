// src/services/worker_service.rs

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use sqlx::{Acquire, PgConnection};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{error::AppError, query::ListQuery},
    db::WorkerRepository,
    models::workers::{
        Assignment, AssignmentDetail, AssignmentPatch, AssignmentPayload, Worker, WorkerDetail,
        WorkerPatch, WorkerPayload, WorkerRole,
    },
    services::task_service::percentage,
};

// ---
// Cálculos de datas e horas
// ---

/// Anos completos entre duas datas: desconta um se o aniversário ainda não chegou.
fn whole_years_between(start: NaiveDate, end: NaiveDate) -> i32 {
    let years = end.year() - start.year();
    if (end.month(), end.day()) < (start.month(), start.day()) {
        years - 1
    } else {
        years
    }
}

pub fn age(worker: &Worker, today: NaiveDate) -> i32 {
    whole_years_between(worker.birth_date, today)
}

/// Anos de casa até a data de saída ou, se ainda ativo, até hoje.
pub fn years_of_service(worker: &Worker, today: NaiveDate) -> i32 {
    whole_years_between(worker.hired_on, worker.left_on.unwrap_or(today))
}

pub fn full_name(worker: &Worker) -> String {
    format!("{} {}", worker.first_name, worker.last_name)
}

/// Horas trabalhadas × valor da hora; sem horas trabalhadas (ou zero), usa as horas atribuídas.
pub fn assignment_labor_cost(assignment: &Assignment, hourly_rate: Decimal) -> Decimal {
    let hours_worked = assignment.hours_worked.filter(|hours| !hours.is_zero());
    hours_worked.unwrap_or(assignment.hours_assigned) * hourly_rate
}

pub fn assignment_efficiency(assignment: &Assignment) -> Option<Decimal> {
    percentage(Some(assignment.hours_assigned), assignment.hours_worked)
}

fn worker_detail(mut detail: WorkerDetail, today: NaiveDate) -> WorkerDetail {
    detail.full_name = full_name(&detail.worker);
    detail.age = age(&detail.worker, today);
    detail.years_of_service = years_of_service(&detail.worker, today);
    detail
}

fn assignment_detail(mut detail: AssignmentDetail) -> AssignmentDetail {
    detail.labor_cost = assignment_labor_cost(&detail.assignment, detail.worker_hourly_rate);
    detail.efficiency = assignment_efficiency(&detail.assignment);
    detail
}

#[derive(Clone)]
pub struct WorkerService {
    worker_repo: WorkerRepository,
}

impl WorkerService {
    pub fn new(worker_repo: WorkerRepository) -> Self {
        Self { worker_repo }
    }

    // =========================================================================
    //  TRABALHADORES
    // =========================================================================

    pub async fn list_workers(
        &self,
        conn: &mut PgConnection,
        query: &ListQuery,
        today: NaiveDate,
    ) -> Result<Vec<WorkerDetail>, AppError> {
        let workers = self.worker_repo.list_workers(conn, query).await?;
        Ok(workers.into_iter().map(|w| worker_detail(w, today)).collect())
    }

    pub async fn workers_by_role(
        &self,
        conn: &mut PgConnection,
        role: WorkerRole,
        today: NaiveDate,
    ) -> Result<Vec<WorkerDetail>, AppError> {
        let workers = self.worker_repo.active_workers_by_role(conn, role).await?;
        Ok(workers.into_iter().map(|w| worker_detail(w, today)).collect())
    }

    pub async fn get_worker(&self, conn: &mut PgConnection, id: Uuid, today: NaiveDate) -> Result<WorkerDetail, AppError> {
        self.worker_repo
            .find_worker(conn, id)
            .await?
            .map(|w| worker_detail(w, today))
            .ok_or(AppError::NotFound("worker"))
    }

    pub async fn create_worker(
        &self,
        conn: &mut PgConnection,
        payload: &WorkerPayload,
        today: NaiveDate,
    ) -> Result<WorkerDetail, AppError> {
        let mut tx = conn.begin().await?;

        let id = self.worker_repo.create_worker(&mut *tx, payload).await?;
        let worker = self.get_worker(&mut tx, id, today).await?;

        tx.commit().await?;
        tracing::info!("Trabalhador cadastrado: {} ({})", worker.full_name, id);
        Ok(worker)
    }

    pub async fn update_worker(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
        payload: &WorkerPayload,
        today: NaiveDate,
    ) -> Result<WorkerDetail, AppError> {
        let mut tx = conn.begin().await?;

        if !self.worker_repo.update_worker(&mut *tx, id, payload).await? {
            return Err(AppError::NotFound("worker"));
        }
        let worker = self.get_worker(&mut tx, id, today).await?;

        tx.commit().await?;
        Ok(worker)
    }

    pub async fn patch_worker(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
        patch: WorkerPatch,
        today: NaiveDate,
    ) -> Result<WorkerDetail, AppError> {
        let mut tx = conn.begin().await?;

        let current = self.get_worker(&mut tx, id, today).await?;
        let payload = patch.apply(current.worker);
        payload.validate()?;
        let worker = self.update_worker(&mut tx, id, &payload, today).await?;

        tx.commit().await?;
        Ok(worker)
    }

    pub async fn delete_worker(&self, conn: &mut PgConnection, id: Uuid) -> Result<(), AppError> {
        let mut tx = conn.begin().await?;

        if self.worker_repo.delete_worker_cascade(&mut tx, id).await? == 0 {
            return Err(AppError::NotFound("worker"));
        }

        tx.commit().await?;
        tracing::info!("Trabalhador {} removido (com atribuições)", id);
        Ok(())
    }

    // =========================================================================
    //  ATRIBUIÇÕES
    // =========================================================================

    pub async fn list_assignments(
        &self,
        conn: &mut PgConnection,
        query: &ListQuery,
    ) -> Result<Vec<AssignmentDetail>, AppError> {
        let assignments = self.worker_repo.list_assignments(conn, query).await?;
        Ok(assignments.into_iter().map(assignment_detail).collect())
    }

    pub async fn get_assignment(&self, conn: &mut PgConnection, id: Uuid) -> Result<AssignmentDetail, AppError> {
        self.worker_repo
            .find_assignment(conn, id)
            .await?
            .map(assignment_detail)
            .ok_or(AppError::NotFound("assignment"))
    }

    pub async fn create_assignment(
        &self,
        conn: &mut PgConnection,
        payload: &AssignmentPayload,
    ) -> Result<AssignmentDetail, AppError> {
        let mut tx = conn.begin().await?;

        let id = self.worker_repo.create_assignment(&mut *tx, payload).await?;
        let assignment = self.get_assignment(&mut tx, id).await?;

        tx.commit().await?;
        tracing::info!("Trabalhador {} atribuído à tarefa {}", payload.worker_id, payload.task_id);
        Ok(assignment)
    }

    pub async fn update_assignment(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
        payload: &AssignmentPayload,
    ) -> Result<AssignmentDetail, AppError> {
        let mut tx = conn.begin().await?;

        if !self.worker_repo.update_assignment(&mut *tx, id, payload).await? {
            return Err(AppError::NotFound("assignment"));
        }
        let assignment = self.get_assignment(&mut tx, id).await?;

        tx.commit().await?;
        Ok(assignment)
    }

    pub async fn patch_assignment(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
        patch: AssignmentPatch,
    ) -> Result<AssignmentDetail, AppError> {
        let mut tx = conn.begin().await?;

        let current = self.get_assignment(&mut tx, id).await?;
        let payload = patch.apply(current.assignment);
        payload.validate()?;
        let assignment = self.update_assignment(&mut tx, id, &payload).await?;

        tx.commit().await?;
        Ok(assignment)
    }

    pub async fn delete_assignment(&self, conn: &mut PgConnection, id: Uuid) -> Result<(), AppError> {
        if self.worker_repo.delete_assignment(conn, id).await? == 0 {
            return Err(AppError::NotFound("assignment"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::workers::ContractType;
    use chrono::Utc;
    use std::str::FromStr;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn worker(birth_date: NaiveDate, hired_on: NaiveDate, left_on: Option<NaiveDate>) -> Worker {
        Worker {
            id: Uuid::new_v4(),
            national_id: "1032456789".into(),
            first_name: "Carlos".into(),
            last_name: "Gómez".into(),
            birth_date,
            phone: String::new(),
            email: None,
            address: String::new(),
            role: WorkerRole::Laborer,
            contract_type: ContractType::Permanent,
            hired_on,
            left_on,
            active: left_on.is_none(),
            base_salary: Decimal::ZERO,
            hourly_rate: dec("12.50"),
            specialties: String::new(),
            certifications: String::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn assignment(hours_assigned: &str, hours_worked: Option<&str>) -> Assignment {
        Assignment {
            id: Uuid::new_v4(),
            worker_id: Uuid::new_v4(),
            task_id: Uuid::new_v4(),
            assigned_at: Utc::now(),
            hours_assigned: dec(hours_assigned),
            hours_worked: hours_worked.map(dec),
            role_in_task: String::new(),
            notes: String::new(),
            completed: false,
        }
    }

    #[test]
    fn age_discounts_birthday_not_yet_reached() {
        let w = worker(date(2000, 7, 1), date(2020, 1, 1), None);
        assert_eq!(age(&w, date(2024, 6, 1)), 23);
        assert_eq!(age(&w, date(2024, 7, 1)), 24);
    }

    #[test]
    fn years_of_service_until_today_or_exit() {
        let active = worker(date(1990, 1, 1), date(2020, 1, 1), None);
        assert_eq!(years_of_service(&active, date(2024, 6, 1)), 4);

        let former = worker(date(1990, 1, 1), date(2020, 1, 1), Some(date(2022, 12, 31)));
        assert_eq!(years_of_service(&former, date(2024, 6, 1)), 2);
    }

    #[test]
    fn full_name_joins_first_and_last() {
        let w = worker(date(1990, 1, 1), date(2020, 1, 1), None);
        assert_eq!(full_name(&w), "Carlos Gómez");
    }

    #[test]
    fn labor_cost_prefers_worked_hours() {
        assert_eq!(assignment_labor_cost(&assignment("8", Some("6")), dec("12.50")), dec("75"));
        assert_eq!(assignment_labor_cost(&assignment("8", None), dec("12.50")), dec("100"));
        // zero horas trabalhadas cai nas horas atribuídas
        assert_eq!(assignment_labor_cost(&assignment("8", Some("0")), dec("12.50")), dec("100"));
    }

    #[test]
    fn efficiency_is_assigned_over_worked() {
        assert_eq!(assignment_efficiency(&assignment("8", Some("10"))), Some(dec("80")));
        assert_eq!(assignment_efficiency(&assignment("8", None)), None);
        assert_eq!(assignment_efficiency(&assignment("8", Some("0"))), None);
    }
}
