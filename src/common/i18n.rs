// src/common/i18n.rs

use std::collections::HashMap;

pub const DEFAULT_LANGUAGE: &str = "en";

// Catálogo embutido: (chave, inglês, espanhol, português)
const CATALOG: &[(&str, &str, &str, &str)] = &[
    // --- Erros gerais ---
    ("validation_failed", "One or more fields are invalid.", "Uno o más campos no son válidos.", "Um ou mais campos são inválidos."),
    ("not_found", "{resource} not found.", "{resource} no encontrado(a).", "{resource} não encontrado(a)."),
    ("conflict_unique", "A record with this value already exists.", "Ya existe un registro con este valor.", "Já existe um registro com este valor."),
    ("protected_reference", "{resource} cannot be deleted: it is still referenced by {count} {referencedBy} record(s).", "No se puede eliminar {resource}: aún es referenciado(a) por {count} registro(s) de {referencedBy}.", "Não é possível remover {resource}: ainda é referenciado(a) por {count} registro(s) de {referencedBy}."),
    ("malformed_request", "The request could not be parsed.", "No se pudo interpretar la solicitud.", "Não foi possível interpretar a requisição."),
    ("internal_error", "An unexpected error occurred.", "Ocurrió un error inesperado.", "Ocorreu um erro inesperado."),

    // --- Validação de campos ---
    ("required", "This field is required.", "Este campo es obligatorio.", "Este campo é obrigatório."),
    ("length", "Must have between {min} and {max} characters.", "Debe tener entre {min} y {max} caracteres.", "Deve ter entre {min} e {max} caracteres."),
    ("max_length", "Must have at most {max} characters.", "Debe tener como máximo {max} caracteres.", "Deve ter no máximo {max} caracteres."),
    ("min_value", "Must be greater than or equal to {min}.", "Debe ser mayor o igual a {min}.", "Deve ser maior ou igual a {min}."),
    ("decimal_digits", "Must have at most {max_digits} digits, {decimal_places} of them after the decimal point.", "Debe tener como máximo {max_digits} dígitos, {decimal_places} de ellos decimales.", "Deve ter no máximo {max_digits} dígitos, {decimal_places} deles decimais."),
    ("digits_only", "Must contain digits only.", "Solo debe contener dígitos.", "Deve conter apenas dígitos."),
    ("email", "Enter a valid email address.", "Introduzca un correo electrónico válido.", "Informe um e-mail válido."),
    ("insufficient_stock", "Not enough stock available for this exit (available: {available}).", "No hay suficiente stock disponible para realizar la salida (disponible: {available}).", "Estoque insuficiente para esta saída (disponível: {available})."),
    ("unknown_reference", "The referenced record does not exist.", "El registro referenciado no existe.", "O registro referenciado não existe."),
    ("invalid_choice", "\"{value}\" is not a valid choice.", "\"{value}\" no es una opción válida.", "\"{value}\" não é uma opção válida."),

    // --- Nomes de recursos ---
    ("resource.farm", "Farm", "Finca", "Fazenda"),
    ("resource.plot", "Plot", "Lote", "Lote"),
    ("resource.input", "Input", "Insumo", "Insumo"),
    ("resource.movement", "Movement", "Movimiento", "Movimentação"),
    ("resource.consumption", "Consumption", "Consumo", "Consumo"),
    ("resource.task_type", "Task type", "Tipo de tarea", "Tipo de tarefa"),
    ("resource.task", "Task", "Tarea", "Tarefa"),
    ("resource.worker", "Worker", "Trabajador", "Trabalhador"),
    ("resource.assignment", "Assignment", "Asignación", "Atribuição"),
];

/// Mensagens traduzidas por idioma, com placeholders `{nome}`.
#[derive(Debug, Clone)]
pub struct I18nStore {
    messages: HashMap<&'static str, HashMap<&'static str, &'static str>>,
}

impl I18nStore {
    pub fn new() -> Self {
        let mut messages: HashMap<&'static str, HashMap<&'static str, &'static str>> = HashMap::new();
        for &(key, en, es, pt) in CATALOG {
            messages.entry("en").or_default().insert(key, en);
            messages.entry("es").or_default().insert(key, es);
            messages.entry("pt").or_default().insert(key, pt);
        }
        Self { messages }
    }

    /// Retorna a mensagem da chave no idioma pedido.
    /// Idioma desconhecido cai no inglês; chave desconhecida é devolvida como está.
    pub fn translate(&self, lang: &str, key: &str) -> String {
        self.messages
            .get(lang)
            .or_else(|| self.messages.get(DEFAULT_LANGUAGE))
            .and_then(|table| table.get(key))
            .map(|msg| msg.to_string())
            .unwrap_or_else(|| key.to_string())
    }

    pub fn render<'a, I>(&self, lang: &str, key: &str, params: I) -> String
    where
        I: IntoIterator<Item = (&'a str, String)>,
    {
        let mut message = self.translate(lang, key);
        for (name, value) in params {
            message = message.replace(&format!("{{{name}}}"), &value);
        }
        message
    }
}

impl Default for I18nStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_english_for_unknown_language() {
        let store = I18nStore::new();
        assert_eq!(store.translate("de", "required"), "This field is required.");
        assert_eq!(store.translate("es", "required"), "Este campo es obligatorio.");
    }

    #[test]
    fn unknown_key_is_returned_verbatim() {
        let store = I18nStore::new();
        assert_eq!(store.translate("en", "no_such_key"), "no_such_key");
    }

    #[test]
    fn render_substitutes_placeholders() {
        let store = I18nStore::new();
        let msg = store.render("pt", "min_value", [("min", "0.01".to_string())]);
        assert_eq!(msg, "Deve ser maior ou igual a 0.01.");
    }
}
