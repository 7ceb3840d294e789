//! Validación del rango de fechas frente a la frecuencia de búsqueda.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::html::Html;
use crate::markup;

/// Días por defecto cuando la frecuencia no es conocida (trimestral).
pub const DEFAULT_MAX_DAYS: i64 = 90;

/// Máximo de días permitidos para cada frecuencia.
pub fn max_days_for(frequency: &str) -> i64 {
    match frequency {
        "D" => 14,
        "W" => 120,
        "M" => 180,
        "3M" => 365,
        "Y" => 1460,
        _ => DEFAULT_MAX_DAYS,
    }
}

fn frequency_name(frequency: &str) -> &str {
    match frequency {
        "D" => "Daily",
        "W" => "Weekly",
        "M" => "Monthly",
        "3M" => "Quarterly",
        "Y" => "Yearly",
        other => other,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateRangeValidation {
    pub is_valid: bool,
    pub message: String,
}

impl DateRangeValidation {
    fn valid() -> Self {
        Self {
            is_valid: true,
            message: String::new(),
        }
    }
}

/// Interpreta `YYYY-MM-DD` o una fecha-hora ISO. Devuelve milisegundos UTC.
fn parse_instant(value: &str) -> Option<i64> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc().timestamp_millis());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.timestamp_millis());
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|dt| dt.and_utc().timestamp_millis())
}

/// Comprueba que el rango no exceda el máximo derivado de la frecuencia.
///
/// Si falta cualquiera de los valores no hay nada que validar. Una fecha que
/// no se puede interpretar tampoco bloquea el envío: el backend la rechazará.
pub fn validate_date_range(
    start: Option<&str>,
    end: Option<&str>,
    frequency: Option<&str>,
) -> DateRangeValidation {
    let (Some(start), Some(end), Some(frequency)) = (
        start.filter(|s| !s.trim().is_empty()),
        end.filter(|s| !s.trim().is_empty()),
        frequency.filter(|s| !s.trim().is_empty()),
    ) else {
        return DateRangeValidation::valid();
    };

    let (Some(start_ms), Some(end_ms)) = (parse_instant(start), parse_instant(end)) else {
        return DateRangeValidation::valid();
    };

    const DAY_MS: i64 = 24 * 60 * 60 * 1000;
    let diff_ms = (end_ms - start_ms).abs();
    let diff_days = (diff_ms + DAY_MS - 1) / DAY_MS;
    let max_days = max_days_for(frequency);

    if diff_days > max_days {
        return DateRangeValidation {
            is_valid: false,
            message: format!(
                "Date range exceeds maximum allowed for {} frequency. Maximum: {} days. Current range: {} days. Use the endpoint directly for full control",
                frequency_name(frequency),
                max_days,
                diff_days
            ),
        };
    }

    DateRangeValidation::valid()
}

/// Aviso en línea que acompaña al campo de frecuencia.
pub fn render_date_range_error(validation: &DateRangeValidation) -> Html {
    if validation.is_valid {
        return Html::new();
    }
    markup!(
        r#"<div id="dateRangeError" class="mb-5 p-3 bg-red-800 text-white rounded-lg border border-red-600"><strong>⚠️ Date Range Error:</strong> {}</div>"#,
        validation.message
    )
}
