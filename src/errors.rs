//! Errores de dominio del dashboard.
//!
//! La fontanería de la aplicación usa `anyhow`; estos tipos existen para los
//! casos en los que el llamador necesita distinguir qué ha fallado.

use thiserror::Error;

/// Fallos al hablar con el backend del screener.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// El backend rechazó la petición con errores de validación estructurados.
    #[error("Form submission error: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// Respuesta no-2xx sin detalle aprovechable.
    #[error("HTTP error {0}")]
    Http(u16),

    /// Fallo de red o de transporte.
    #[error("{0}")]
    Transport(String),

    /// Cuerpo de respuesta inesperado.
    #[error("Invalid response from backend: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            ClientError::Http(status.as_u16())
        } else {
            ClientError::Transport(err.to_string())
        }
    }
}

/// Motivos por los que un envío del formulario no llega a sondearse.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// El rango de fechas supera el máximo de la frecuencia.
    #[error("{0}")]
    DateRange(String),

    #[error("Company Universe is required.")]
    MissingUniverse,

    #[error("Fiscal Year must be a number or a comma-separated list of numbers.")]
    FiscalYear,

    #[error(transparent)]
    Backend(#[from] ClientError),

    /// Otro envío, demo o carga empezó mientras se esperaba al backend.
    #[error("Submission superseded by a newer request")]
    Superseded,
}

/// Exportación de evidencias sin datos.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExportError {
    #[error("No data to export")]
    Empty,

    #[error("Export failed: {0}")]
    Encode(String),
}
