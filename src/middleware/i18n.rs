// src/middleware/i18n.rs

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::common::{
    error::{ApiError, PendingTranslation},
    i18n::DEFAULT_LANGUAGE,
};
use crate::config::AppState;

const SUPPORTED_LANGUAGES: &[&str] = &["en", "es", "pt"];

// Extrator de idioma (Accept-Language)
#[derive(Debug, Clone)]
pub struct Locale(pub String);

impl Default for Locale {
    fn default() -> Self {
        Locale(DEFAULT_LANGUAGE.to_string())
    }
}

/// Escolhe o primeiro idioma suportado, respeitando os pesos do cabeçalho.
fn negotiate(header_str: &str) -> Option<String> {
    accept_language::parse(header_str)
        .into_iter()
        .map(|tag| {
            // "es-CO" -> "es"
            tag.split('-').next().unwrap_or(&tag).to_lowercase()
        })
        .find(|primary| SUPPORTED_LANGUAGES.contains(&primary.as_str()))
}

impl<S> FromRequestParts<S> for Locale
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        let lang = parts
            .headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|header_value| header_value.to_str().ok())
            .and_then(negotiate)
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());

        Ok(Locale(lang))
    }
}

/// Traduz as rejeições dos extratores (JSON, query, path) para o idioma da requisição.
pub async fn localize_rejections(
    State(app_state): State<AppState>,
    locale: Locale,
    request: Request,
    next: Next,
) -> Response {
    let response = next.run(request).await;

    let Some(pending) = response.extensions().get::<PendingTranslation>().cloned() else {
        return response;
    };

    ApiError {
        status: response.status(),
        message: app_state.i18n_store.translate(&locale.0, pending.key),
        details: pending.details,
        message_key: None,
    }
    .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_primary_subtag_of_first_supported_language() {
        assert_eq!(negotiate("es-CO,es;q=0.9,en;q=0.8").as_deref(), Some("es"));
        assert_eq!(negotiate("pt-BR").as_deref(), Some("pt"));
    }

    #[test]
    fn skips_unsupported_languages() {
        assert_eq!(negotiate("de-DE,en;q=0.5").as_deref(), Some("en"));
        assert_eq!(negotiate("fr"), None);
    }
}
