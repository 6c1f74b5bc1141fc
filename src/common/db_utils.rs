use sqlx::error::ErrorKind;
use validator::ValidationError;

use crate::common::error::AppError;
use crate::config::AppState;

// ---
// Helper de conexão
// ---
/// Adquire uma conexão da pool para a requisição.
pub(crate) async fn get_connection(
    app_state: &AppState,
) -> Result<sqlx::pool::PoolConnection<sqlx::Postgres>, AppError> {
    // O '?' converte sqlx::Error -> AppError::DatabaseError
    let conn = app_state.db_pool.acquire().await?;
    Ok(conn)
}

// Constraint do banco -> campo do payload (camelCase)
const CONSTRAINT_FIELDS: &[(&str, &str)] = &[
    ("farms_name_key", "name"),
    ("plots_code_key", "code"),
    ("plots_farm_id_fkey", "farmId"),
    ("task_types_name_key", "name"),
    ("tasks_plot_id_fkey", "plotId"),
    ("tasks_task_type_id_fkey", "taskTypeId"),
    ("inputs_code_key", "code"),
    ("movements_input_id_fkey", "inputId"),
    ("consumptions_input_id_fkey", "inputId"),
    ("consumptions_task_id_fkey", "taskId"),
    ("workers_national_id_key", "nationalId"),
    ("assignments_worker_id_task_id_key", "workerId"),
    ("assignments_worker_id_fkey", "workerId"),
    ("assignments_task_id_fkey", "taskId"),
];

pub(crate) fn constraint_field(constraint: &str) -> Option<&'static str> {
    CONSTRAINT_FIELDS
        .iter()
        .find(|(name, _)| *name == constraint)
        .map(|(_, field)| *field)
}

/// Converte violações de unicidade e de chave estrangeira de um INSERT/UPDATE
/// em erros de domínio. Qualquer outro erro segue como `DatabaseError`.
pub(crate) fn map_write_error(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        let field = db_err.constraint().and_then(constraint_field);
        match (db_err.kind(), field) {
            (ErrorKind::UniqueViolation, Some(field)) => {
                return AppError::UniqueViolation(field);
            }
            (ErrorKind::ForeignKeyViolation, Some(field)) => {
                let mut err = ValidationError::new("unknown_reference");
                err.message = Some("unknown_reference".into());
                return AppError::field(field, err);
            }
            _ => {}
        }
    }
    e.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_constraints_map_to_payload_fields() {
        assert_eq!(constraint_field("plots_farm_id_fkey"), Some("farmId"));
        assert_eq!(constraint_field("assignments_worker_id_task_id_key"), Some("workerId"));
        assert_eq!(constraint_field("something_else"), None);
    }

    #[test]
    fn non_database_errors_pass_through() {
        let err = map_write_error(sqlx::Error::RowNotFound);
        assert!(matches!(err, AppError::DatabaseError(sqlx::Error::RowNotFound)));
    }
}
