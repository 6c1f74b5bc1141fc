// src/common/query.rs

use serde::Deserialize;
use sqlx::{Postgres, QueryBuilder};
use utoipa::IntoParams;

// ---
// Parâmetros comuns de listagem: ?search=...&ordering=...
// ---
#[derive(Debug, Default, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// Termos separados por espaço; cada termo precisa aparecer em algum dos campos de busca.
    pub search: Option<String>,
    /// Campos separados por vírgula, prefixo `-` para ordem decrescente (ex: `-areaTotal,name`).
    pub ordering: Option<String>,
}

/// Escapa os curingas do LIKE e envolve o termo em `%...%`.
pub fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for ch in term.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

/// Acrescenta `AND (col1 ILIKE $n OR col2 ILIKE $n ...)` para cada termo da busca.
/// A query já precisa ter um `WHERE`.
pub fn push_search(qb: &mut QueryBuilder<'_, Postgres>, search: Option<&str>, columns: &[&str]) {
    let Some(search) = search else { return };

    for term in search.split(|c: char| c.is_whitespace() || c == ',').filter(|t| !t.is_empty()) {
        let pattern = like_pattern(term);
        qb.push(" AND (");
        for (i, column) in columns.iter().enumerate() {
            if i > 0 {
                qb.push(" OR ");
            }
            qb.push(*column);
            qb.push(" ILIKE ");
            qb.push_bind(pattern.clone());
        }
        qb.push(")");
    }
}

/// Monta a cláusula ORDER BY a partir do parâmetro `ordering`.
///
/// `allowed` mapeia o nome público do campo para a expressão SQL. Campos
/// desconhecidos são ignorados; se nada sobrar, vale a ordenação padrão.
/// `tiebreak` é sempre anexado no fim para a ordem ser estável.
pub fn ordering_clause(
    requested: Option<&str>,
    allowed: &[(&str, &str)],
    default: &str,
    tiebreak: &str,
) -> String {
    let requested: Vec<String> = requested
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter_map(|field| {
            let (descending, name) = match field.strip_prefix('-') {
                Some(name) => (true, name),
                None => (false, field),
            };
            allowed
                .iter()
                .find(|(public, _)| *public == name)
                .map(|(_, column)| {
                    if descending {
                        format!("{column} DESC")
                    } else {
                        format!("{column} ASC")
                    }
                })
        })
        .collect();

    let clauses = if requested.is_empty() {
        default.to_string()
    } else {
        requested.join(", ")
    };

    format!(" ORDER BY {clauses}, {tiebreak}")
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIELDS: &[(&str, &str)] = &[("name", "name"), ("areaTotal", "area_total")];

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("lo_1%"), r"%lo\_1\%%");
        assert_eq!(like_pattern(r"a\b"), r"%a\\b%");
    }

    #[test]
    fn ordering_uses_requested_fields_in_order() {
        let clause = ordering_clause(Some("-areaTotal,name"), FIELDS, "name ASC", "id");
        assert_eq!(clause, " ORDER BY area_total DESC, name ASC, id");
    }

    #[test]
    fn unknown_ordering_fields_fall_back_to_default() {
        let clause = ordering_clause(Some("owner; DROP TABLE farms"), FIELDS, "name ASC", "id");
        assert_eq!(clause, " ORDER BY name ASC, id");

        let clause = ordering_clause(None, FIELDS, "name ASC", "id");
        assert_eq!(clause, " ORDER BY name ASC, id");
    }

    #[test]
    fn search_adds_one_group_per_term() {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM plots WHERE TRUE");
        push_search(&mut qb, Some("lt  norte"), &["code", "name"]);
        assert_eq!(
            qb.sql(),
            "SELECT * FROM plots WHERE TRUE AND (code ILIKE $1 OR name ILIKE $2) AND (code ILIKE $3 OR name ILIKE $4)"
        );
    }

    #[test]
    fn blank_search_adds_nothing() {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM plots WHERE TRUE");
        push_search(&mut qb, Some("   "), &["code"]);
        push_search(&mut qb, None, &["code"]);
        assert_eq!(qb.sql(), "SELECT * FROM plots WHERE TRUE");
    }
}
