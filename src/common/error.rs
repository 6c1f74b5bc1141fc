use std::{collections::BTreeMap, sync::LazyLock};

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;
use utoipa::ToSchema;
use validator::{ValidationError, ValidationErrors};

use crate::{
    common::i18n::{I18nStore, DEFAULT_LANGUAGE},
    middleware::i18n::Locale,
};

// Erro interno da aplicação. Os handlers o convertem em `ApiError`
// (com mensagem traduzida) antes de responder.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] ValidationErrors),

    #[error("{0} não encontrado(a)")]
    NotFound(&'static str),

    #[error("Valor duplicado no campo '{0}'")]
    UniqueViolation(&'static str),

    #[error("{resource} ainda é referenciado(a) por {count} registro(s) de {referenced_by}")]
    ProtectedReference {
        resource: &'static str,
        referenced_by: &'static str,
        count: i64,
    },

    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),
}

impl AppError {
    /// Erro de validação de um único campo, no mesmo formato do `validator`.
    pub fn field(field: &'static str, error: ValidationError) -> Self {
        let mut errors = ValidationErrors::new();
        errors.add(field, error);
        AppError::ValidationError(errors)
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::UniqueViolation(_) | AppError::ProtectedReference { .. } => StatusCode::CONFLICT,
            AppError::DatabaseError(_) | AppError::InternalServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn to_api_error(self, locale: &Locale, store: &I18nStore) -> ApiError {
        let lang = locale.0.as_str();
        let status = self.status();

        match self {
            AppError::ValidationError(errors) => ApiError {
                status,
                message: store.translate(lang, "validation_failed"),
                details: Some(validation_details(&errors, lang, store)),
                message_key: None,
            },
            AppError::NotFound(resource) => ApiError {
                status,
                message: store.render(lang, "not_found", [(
                    "resource",
                    store.translate(lang, &format!("resource.{resource}")),
                )]),
                details: None,
                message_key: None,
            },
            AppError::UniqueViolation(field) => ApiError {
                status,
                message: store.translate(lang, "conflict_unique"),
                details: Some(json!({ field: [store.translate(lang, "conflict_unique")] })),
                message_key: None,
            },
            AppError::ProtectedReference { resource, referenced_by, count } => ApiError {
                status,
                message: store.render(lang, "protected_reference", [
                    ("resource", store.translate(lang, &format!("resource.{resource}"))),
                    ("referencedBy", store.translate(lang, &format!("resource.{referenced_by}"))),
                    ("count", count.to_string()),
                ]),
                details: Some(json!({
                    "resource": resource,
                    "referencedBy": referenced_by,
                    "count": count,
                })),
                message_key: None,
            },
            // Banco e erros inesperados viram 500; o detalhe só vai para o log.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                ApiError {
                    status,
                    message: store.translate(lang, "internal_error"),
                    details: None,
                    message_key: None,
                }
            }
        }
    }
}

fn validation_details(errors: &ValidationErrors, lang: &str, store: &I18nStore) -> Value {
    let mut details = BTreeMap::new();
    for (field, field_errors) in errors.field_errors() {
        let messages: Vec<String> = field_errors
            .iter()
            .map(|e| {
                let key = e.message.as_deref().unwrap_or(e.code.as_ref());
                let params = e.params.iter().map(|(name, value)| {
                    let value = match value {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    (name.as_ref(), value)
                });
                store.render(lang, key, params)
            })
            .collect();
        details.insert(camel_case(&field), messages);
    }
    json!(details)
}

// "area_total" -> "areaTotal" (o validator reporta o nome do campo Rust)
fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper_next = false;
    for ch in field.chars() {
        if ch == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}

// Erro já pronto para o cliente.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub details: Option<Value>,
    /// Chave do catálogo ainda não traduzida. As rejeições dos extratores não
    /// conhecem o idioma da requisição; `localize_rejections` completa a mensagem.
    pub message_key: Option<&'static str>,
}

/// Anexado à resposta de uma rejeição para o middleware de idioma reescrever o corpo.
#[derive(Debug, Clone)]
pub struct PendingTranslation {
    pub key: &'static str,
    pub details: Option<Value>,
}

impl ApiError {
    fn malformed(source: &str, text: String) -> Self {
        ApiError {
            status: StatusCode::BAD_REQUEST,
            message: translate_default(MALFORMED_REQUEST),
            details: Some(json!({ source: [text] })),
            message_key: Some(MALFORMED_REQUEST),
        }
    }
}

const MALFORMED_REQUEST: &str = "malformed_request";

// Mensagem no idioma padrão, usada se a resposta não passar pelo middleware.
fn translate_default(key: &str) -> String {
    static STORE: LazyLock<I18nStore> = LazyLock::new(I18nStore::new);
    STORE.translate(DEFAULT_LANGUAGE, key)
}

/// Corpo JSON de toda resposta de erro.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    #[schema(example = "One or more fields are invalid.")]
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub details: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let pending = self.message_key.map(|key| PendingTranslation {
            key,
            details: self.details.clone(),
        });
        let body = ErrorBody {
            error: self.message,
            details: self.details,
        };
        let mut response = (self.status, Json(body)).into_response();
        if let Some(pending) = pending {
            response.extensions_mut().insert(pending);
        }
        response
    }
}

// Rejeições dos extratores do axum (JSON inválido, valor fora do enum, UUID inválido...)
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::malformed("body", rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::malformed("query", rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::malformed("path", rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn en() -> Locale {
        Locale("en".to_string())
    }

    #[test]
    fn validation_errors_are_rendered_per_field() {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &"0.01");
        err.message = Some("min_value".into());

        let api = AppError::field("areaTotal", err).to_api_error(&en(), &I18nStore::new());

        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        let details = api.details.expect("details");
        assert_eq!(details["areaTotal"][0], "Must be greater than or equal to 0.01.");
    }

    #[test]
    fn field_names_are_reported_in_camel_case() {
        assert_eq!(camel_case("area_total"), "areaTotal");
        assert_eq!(camel_case("estimated_duration_hours"), "estimatedDurationHours");
        assert_eq!(camel_case("farmId"), "farmId");
    }

    #[test]
    fn status_codes_follow_error_kind() {
        assert_eq!(AppError::NotFound("farm").status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::UniqueViolation("code").status(), StatusCode::CONFLICT);
        let protected = AppError::ProtectedReference {
            resource: "input",
            referenced_by: "consumption",
            count: 2,
        };
        assert_eq!(protected.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn not_found_message_is_localised() {
        let api = AppError::NotFound("plot").to_api_error(&Locale("es".into()), &I18nStore::new());
        assert_eq!(api.message, "Lote no encontrado(a).");
    }

    #[test]
    fn extractor_rejections_carry_the_catalog_key() {
        let api = ApiError::malformed("body", "missing field `name`".to_string());
        assert_eq!(api.message_key, Some("malformed_request"));
        assert_eq!(api.message, I18nStore::new().translate("en", "malformed_request"));

        let response = api.into_response();
        let pending = response.extensions().get::<PendingTranslation>().expect("pending");
        assert_eq!(pending.key, "malformed_request");
        assert_eq!(pending.details.as_ref().expect("details")["body"][0], "missing field `name`");
    }

    #[test]
    fn translated_errors_are_not_rewritten() {
        let response = AppError::NotFound("farm")
            .to_api_error(&en(), &I18nStore::new())
            .into_response();
        assert!(response.extensions().get::<PendingTranslation>().is_none());
    }

    #[test]
    fn protected_reference_reports_count() {
        let api = AppError::ProtectedReference {
            resource: "task_type",
            referenced_by: "task",
            count: 3,
        }
        .to_api_error(&en(), &I18nStore::new());

        assert_eq!(
            api.message,
            "Task type cannot be deleted: it is still referenced by 3 Task record(s)."
        );
        assert_eq!(api.details.expect("details")["count"], 3);
    }
}
