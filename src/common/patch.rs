// src/common/patch.rs

use serde::{Deserialize, Deserializer};

/// Distingue "campo ausente" (`None`) de "campo enviado como null" (`Some(None)`)
/// nos payloads de PATCH. Usar com `#[serde(default, deserialize_with = "double_option")]`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Texto opcional em que string vazia (ou só espaços) vale como ausente.
/// Usar com `#[serde(default, deserialize_with = "blank_as_none")]`.
pub fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|text| !text.trim().is_empty()))
}

/// Versão de `double_option` para texto anulável: string vazia limpa o campo como `null`.
pub fn blank_as_null<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    blank_as_none(deserializer).map(Some)
}

/// Aplica um campo de PATCH não anulável sobre o valor atual.
pub fn merge<T>(patch: Option<T>, current: T) -> T {
    patch.unwrap_or(current)
}

/// Aplica um campo de PATCH anulável sobre o valor atual.
pub fn merge_nullable<T>(patch: Option<Option<T>>, current: Option<T>) -> Option<T> {
    match patch {
        Some(value) => value,
        None => current,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "double_option")]
        latitude: Option<Option<i32>>,
    }

    #[test]
    fn absent_null_and_value_are_distinct() {
        let absent: Patch = serde_json::from_str("{}").unwrap();
        let null: Patch = serde_json::from_str(r#"{"latitude": null}"#).unwrap();
        let value: Patch = serde_json::from_str(r#"{"latitude": 4}"#).unwrap();

        assert_eq!(absent.latitude, None);
        assert_eq!(null.latitude, Some(None));
        assert_eq!(value.latitude, Some(Some(4)));
    }

    #[derive(Debug, Deserialize)]
    struct Contact {
        #[serde(default, deserialize_with = "blank_as_none")]
        email: Option<String>,
        #[serde(default, deserialize_with = "blank_as_null")]
        backup_email: Option<Option<String>>,
    }

    #[test]
    fn blank_text_counts_as_missing() {
        let blank: Contact = serde_json::from_str(r#"{"email": "", "backup_email": "  "}"#).unwrap();
        assert_eq!(blank.email, None);
        assert_eq!(blank.backup_email, Some(None));

        let absent: Contact = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.email, None);
        assert_eq!(absent.backup_email, None);

        let filled: Contact = serde_json::from_str(r#"{"email": "ana@finca.co"}"#).unwrap();
        assert_eq!(filled.email.as_deref(), Some("ana@finca.co"));
    }

    #[test]
    fn merge_nullable_keeps_current_when_absent() {
        assert_eq!(merge_nullable(None, Some(1)), Some(1));
        assert_eq!(merge_nullable(Some(None), Some(1)), None);
        assert_eq!(merge_nullable(Some(Some(2)), None), Some(2));
        assert_eq!(merge(None, 5), 5);
        assert_eq!(merge(Some(7), 5), 7);
    }
}
