// src/common/validation.rs

use rust_decimal::Decimal;
use validator::ValidationError;

// ---
// Validadores customizados para os campos NUMERIC(p, s)
// ---

fn below_minimum(min: Decimal) -> ValidationError {
    let mut err = ValidationError::new("range");
    err.add_param("min".into(), &min.to_string());
    err.message = Some("min_value".into());
    err
}

fn too_many_digits(max_digits: u32, decimal_places: u32) -> ValidationError {
    let mut err = ValidationError::new("decimal_digits");
    err.add_param("max_digits".into(), &max_digits);
    err.add_param("decimal_places".into(), &decimal_places);
    err.message = Some("decimal_digits".into());
    err
}

/// Confere se o valor cabe numa coluna NUMERIC(max_digits, decimal_places).
pub fn fits_numeric(value: &Decimal, max_digits: u32, decimal_places: u32) -> bool {
    let normalized = value.normalize();
    if normalized.scale() > decimal_places {
        return false;
    }
    let whole = normalized.abs().trunc();
    let whole_digits = if whole.is_zero() { 0 } else { whole.to_string().len() as u32 };
    whole_digits <= max_digits - decimal_places
}

fn check(value: &Decimal, min: Option<Decimal>, max_digits: u32, decimal_places: u32) -> Result<(), ValidationError> {
    if let Some(min) = min {
        if *value < min {
            return Err(below_minimum(min));
        }
    }
    if !fits_numeric(value, max_digits, decimal_places) {
        return Err(too_many_digits(max_digits, decimal_places));
    }
    Ok(())
}

/// Área em hectares: NUMERIC(10,2), mínimo 0.01.
pub fn hectares(value: &Decimal) -> Result<(), ValidationError> {
    check(value, Some(Decimal::new(1, 2)), 10, 2)
}

/// Quantidades de insumo: NUMERIC(10,2), mínimo 0.01.
pub fn positive_quantity(value: &Decimal) -> Result<(), ValidationError> {
    check(value, Some(Decimal::new(1, 2)), 10, 2)
}

/// Valores monetários e saldos: NUMERIC(10,2), não negativos.
pub fn non_negative_amount(value: &Decimal) -> Result<(), ValidationError> {
    check(value, Some(Decimal::ZERO), 10, 2)
}

/// Horas estimadas/atribuídas: NUMERIC(5,2), mínimo 0.1.
pub fn positive_hours(value: &Decimal) -> Result<(), ValidationError> {
    check(value, Some(Decimal::new(1, 1)), 5, 2)
}

/// Horas realizadas: NUMERIC(5,2), não negativas.
pub fn non_negative_hours(value: &Decimal) -> Result<(), ValidationError> {
    check(value, Some(Decimal::ZERO), 5, 2)
}

/// Valor da hora: NUMERIC(8,2), não negativo.
pub fn hourly_rate(value: &Decimal) -> Result<(), ValidationError> {
    check(value, Some(Decimal::ZERO), 8, 2)
}

/// Latitude/longitude: NUMERIC(10,7).
pub fn coordinate(value: &Decimal) -> Result<(), ValidationError> {
    check(value, None, 10, 7)
}

pub fn digits_only(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || !value.chars().all(|c| c.is_ascii_digit()) {
        let mut err = ValidationError::new("digits_only");
        err.message = Some("digits_only".into());
        return Err(err);
    }
    Ok(())
}

pub fn invalid_choice(value: &str) -> ValidationError {
    let mut err = ValidationError::new("invalid_choice");
    err.add_param("value".into(), &value);
    err.message = Some("invalid_choice".into());
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn hectares_enforces_minimum() {
        assert!(hectares(&dec("0.01")).is_ok());
        let err = hectares(&dec("0")).unwrap_err();
        assert_eq!(err.code, "range");
        assert_eq!(err.params["min"], "0.01");
    }

    #[test]
    fn numeric_fit_checks_scale_and_whole_digits() {
        assert!(fits_numeric(&dec("99999999.99"), 10, 2));
        assert!(!fits_numeric(&dec("100000000"), 10, 2));
        assert!(!fits_numeric(&dec("1.234"), 10, 2));
        // zeros à direita não contam como casas decimais
        assert!(fits_numeric(&dec("1.2300"), 10, 2));
        assert!(fits_numeric(&dec("-74.0817500"), 10, 7));
        assert!(!fits_numeric(&dec("1000.5"), 10, 7));
    }

    #[test]
    fn hours_use_their_own_precision() {
        assert!(positive_hours(&dec("0.1")).is_ok());
        assert!(positive_hours(&dec("0.09")).is_err());
        assert_eq!(positive_hours(&dec("1000")).unwrap_err().code, "decimal_digits");
        assert!(non_negative_hours(&dec("0")).is_ok());
    }

    #[test]
    fn digits_only_rejects_letters_and_blank() {
        assert!(digits_only("1032456789").is_ok());
        assert!(digits_only("10-32").is_err());
        assert!(digits_only("").is_err());
    }
}
