//! Construcción de la petición al screener a partir del formulario.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::errors::SubmitError;
use crate::models::Watchlist;

/// Longitud de un identificador de entidad individual.
const ENTITY_ID_LEN: usize = 6;

/// Valores del formulario tal y como los envía la página.
#[derive(Debug, Clone, Default, Deserialize, Serialize, JsonSchema)]
#[serde(default)]
pub struct ScreenerForm {
    /// Tema central a explorar.
    pub theme: String,
    /// Instrucciones adicionales para la generación de la taxonomía.
    pub focus: String,
    /// Nombre de watchlist, lista de IDs separados por comas o ID de watchlist.
    pub companies: String,
    pub start_date: String,
    pub end_date: String,
    /// Año fiscal o lista separada por comas.
    pub fiscal_year: String,
    pub llm_model: String,
    pub document_type: String,
    pub frequency: String,
    pub rerank_threshold: String,
    pub document_limit: String,
    pub batch_size: String,
}

/// Universo de compañías resuelto.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CompanyUniverse {
    /// Identificador de watchlist, enviado tal cual.
    Watchlist(String),
    /// Lista de identificadores de entidad.
    Entities(Vec<String>),
}

impl CompanyUniverse {
    /// Texto que se guarda para la insignia de configuración.
    pub fn display_value(&self) -> String {
        match self {
            CompanyUniverse::Watchlist(id) => id.clone(),
            CompanyUniverse::Entities(ids) => ids.join(", "),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FiscalYear {
    Single(i32),
    Many(Vec<i32>),
}

/// Cuerpo JSON de `POST /thematic-screener`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScreenerRequest {
    pub theme: String,
    pub focus: String,
    pub companies: CompanyUniverse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fiscal_year: Option<FiscalYear>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    pub llm_model: String,
    pub document_type: String,
    pub frequency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rerank_threshold: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_limit: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<i64>,
}

/// Resuelve el universo de compañías.
///
/// Una coincidencia exacta con el nombre de una watchlist tiene prioridad
/// sobre cualquier interpretación del texto como lista de identificadores.
pub fn resolve_universe(
    input: &str,
    watchlists: &[Watchlist],
) -> Result<CompanyUniverse, SubmitError> {
    let input = input.trim();
    if let Some(found) = watchlists.iter().find(|w| w.name == input) {
        return Ok(CompanyUniverse::Watchlist(found.id.clone()));
    }
    if input.is_empty() {
        return Err(SubmitError::MissingUniverse);
    }
    if input.contains(',') {
        let ids: Vec<String> = input
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        if ids.is_empty() {
            return Err(SubmitError::MissingUniverse);
        }
        return Ok(CompanyUniverse::Entities(ids));
    }
    if input.chars().count() > ENTITY_ID_LEN {
        return Ok(CompanyUniverse::Watchlist(input.to_string()));
    }
    Ok(CompanyUniverse::Entities(vec![input.to_string()]))
}

/// Interpreta el año fiscal: vacío, un número o una lista separada por comas.
pub fn parse_fiscal_year(input: &str) -> Result<Option<FiscalYear>, SubmitError> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }
    if input.contains(',') {
        let years = input
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| s.parse::<i32>().map_err(|_| SubmitError::FiscalYear))
            .collect::<Result<Vec<_>, _>>()?;
        if years.is_empty() {
            return Ok(None);
        }
        return Ok(Some(FiscalYear::Many(years)));
    }
    input
        .parse::<i32>()
        .map(|year| Some(FiscalYear::Single(year)))
        .map_err(|_| SubmitError::FiscalYear)
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

impl ScreenerForm {
    /// Construye la petición. Los campos opcionales vacíos no se envían.
    pub fn to_request(&self, watchlists: &[Watchlist]) -> Result<ScreenerRequest, SubmitError> {
        let companies = resolve_universe(&self.companies, watchlists)?;
        let fiscal_year = parse_fiscal_year(&self.fiscal_year)?;

        Ok(ScreenerRequest {
            theme: self.theme.trim().to_string(),
            focus: self.focus.trim().to_string(),
            companies,
            fiscal_year,
            start_date: non_empty(&self.start_date),
            end_date: non_empty(&self.end_date),
            llm_model: self.llm_model.trim().to_string(),
            document_type: self.document_type.clone(),
            frequency: self.frequency.clone(),
            rerank_threshold: non_empty(&self.rerank_threshold).and_then(|v| v.parse().ok()),
            document_limit: non_empty(&self.document_limit).and_then(|v| v.parse().ok()),
            batch_size: non_empty(&self.batch_size).and_then(|v| v.parse().ok()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::default_watchlists;
    use pretty_assertions::assert_eq;

    #[test]
    fn watchlist_name_wins_over_raw_identifiers() {
        let watchlists = vec![Watchlist {
            id: "wl-1".into(),
            name: "ABC,DEF".into(),
        }];
        assert_eq!(
            resolve_universe("ABC,DEF", &watchlists).unwrap(),
            CompanyUniverse::Watchlist("wl-1".into())
        );
    }

    #[test]
    fn universe_shapes() {
        let wl = default_watchlists();
        assert_eq!(
            resolve_universe("Dow 30", &wl).unwrap(),
            CompanyUniverse::Watchlist("5b78837c-343d-4559-8f06-98668b09d1df".into())
        );
        assert_eq!(
            resolve_universe(" 4A6F00, D8442A ,", &wl).unwrap(),
            CompanyUniverse::Entities(vec!["4A6F00".into(), "D8442A".into()])
        );
        assert_eq!(
            resolve_universe("NVDA12", &wl).unwrap(),
            CompanyUniverse::Entities(vec!["NVDA12".into()])
        );
        assert_eq!(
            resolve_universe("44118802-9104", &wl).unwrap(),
            CompanyUniverse::Watchlist("44118802-9104".into())
        );
        assert!(matches!(
            resolve_universe("   ", &wl),
            Err(SubmitError::MissingUniverse)
        ));
    }

    #[test]
    fn fiscal_year_parsing() {
        assert_eq!(parse_fiscal_year("").unwrap(), None);
        assert_eq!(parse_fiscal_year("2024").unwrap(), Some(FiscalYear::Single(2024)));
        assert_eq!(
            parse_fiscal_year("2024, 2025").unwrap(),
            Some(FiscalYear::Many(vec![2024, 2025]))
        );
        assert!(matches!(parse_fiscal_year("2024, abc"), Err(SubmitError::FiscalYear)));
    }

    #[test]
    fn request_omits_empty_optionals() {
        let form = ScreenerForm {
            theme: " AI ".into(),
            companies: "NVDA12".into(),
            llm_model: "openai::gpt-4o-mini".into(),
            document_type: "TRANSCRIPTS".into(),
            frequency: "M".into(),
            document_limit: "100".into(),
            ..Default::default()
        };
        let json = serde_json::to_value(form.to_request(&[]).unwrap()).unwrap();
        assert_eq!(json["theme"], "AI");
        assert_eq!(json["companies"], serde_json::json!(["NVDA12"]));
        assert_eq!(json["document_limit"], 100);
        assert!(json.get("start_date").is_none());
        assert!(json.get("fiscal_year").is_none());
        assert!(json.get("rerank_threshold").is_none());
    }
}
