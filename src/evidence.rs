//! Almacén de evidencias: filtrado, paginación y exportación en memoria.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Deserialize;

use crate::errors::ExportError;
use crate::models::EvidenceRecord;

/// Filas por página de la tabla de evidencias.
pub const PAGE_SIZE: usize = 50;

/// Cabecera fija de la exportación CSV.
pub const CSV_HEADER: [&str; 12] = [
    "Time Period",
    "Date",
    "Company",
    "Ticker",
    "Sector",
    "Industry",
    "Country",
    "Document ID",
    "Headline",
    "Quote",
    "Motivation",
    "Theme",
];

/// Criterios de filtrado. Un criterio vacío no restringe.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EvidenceFilter {
    pub company: Option<String>,
    pub theme: Option<String>,
    pub search: Option<String>,
}

impl EvidenceFilter {
    fn normalized(value: &Option<String>) -> Option<String> {
        value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_lowercase)
    }

    fn matches(&self, item: &EvidenceRecord) -> bool {
        let company = Self::normalized(&self.company);
        let theme = Self::normalized(&self.theme);
        let search = Self::normalized(&self.search);

        let matches_company = company.map_or(true, |c| item.company.to_lowercase() == c);
        let matches_theme = theme.map_or(true, |t| item.theme.to_lowercase() == t);
        let matches_search = search.map_or(true, |s| {
            item.quote.to_lowercase().contains(&s)
                || item.headline.to_lowercase().contains(&s)
                || item.motivation.to_lowercase().contains(&s)
        });

        matches_company && matches_theme && matches_search
    }
}

/// Vista filtrable sobre la lista inmutable de evidencias de un informe.
#[derive(Debug, Clone)]
pub struct EvidenceStore {
    all: Arc<[EvidenceRecord]>,
    filtered: Vec<EvidenceRecord>,
    filter: EvidenceFilter,
    page: usize,
}

impl Default for EvidenceStore {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl EvidenceStore {
    pub fn new(records: Vec<EvidenceRecord>) -> Self {
        let all: Arc<[EvidenceRecord]> = records.into();
        Self {
            filtered: all.to_vec(),
            all,
            filter: EvidenceFilter::default(),
            page: 1,
        }
    }

    pub fn all(&self) -> &[EvidenceRecord] {
        &self.all
    }

    pub fn filtered(&self) -> &[EvidenceRecord] {
        &self.filtered
    }

    pub fn filter(&self) -> &EvidenceFilter {
        &self.filter
    }

    pub fn page(&self) -> usize {
        self.page
    }

    /// Recalcula la vista filtrada desde la lista completa y vuelve a la página 1.
    pub fn apply_filters(&mut self, filter: EvidenceFilter) {
        self.filtered = self
            .all
            .iter()
            .filter(|item| filter.matches(item))
            .cloned()
            .collect();
        self.filter = filter;
        self.page = 1;
    }

    pub fn clear_filters(&mut self) {
        self.filter = EvidenceFilter::default();
        self.filtered = self.all.to_vec();
        self.page = 1;
    }

    /// Páginas reales de la vista filtrada (0 si está vacía).
    pub fn total_pages(&self) -> usize {
        self.filtered.len().div_ceil(PAGE_SIZE)
    }

    /// Páginas a mostrar: una vista vacía se presenta como "1 de 1".
    pub fn display_total_pages(&self) -> usize {
        self.total_pages().max(1)
    }

    /// Avanza o retrocede; fuera de `[1, total_pages]` no hace nada.
    pub fn change_page(&mut self, delta: i64) -> bool {
        let target = self.page as i64 + delta;
        if target >= 1 && target <= self.total_pages() as i64 {
            self.page = target as usize;
            true
        } else {
            false
        }
    }

    pub fn can_go_prev(&self) -> bool {
        self.total_pages() > 0 && self.page > 1
    }

    pub fn can_go_next(&self) -> bool {
        self.total_pages() > 0 && self.page < self.total_pages()
    }

    pub fn page_items(&self) -> &[EvidenceRecord] {
        let start = (self.page - 1) * PAGE_SIZE;
        if start >= self.filtered.len() {
            return &[];
        }
        let end = (start + PAGE_SIZE).min(self.filtered.len());
        &self.filtered[start..end]
    }

    /// Compañías distintas, ordenadas, para el desplegable de filtros.
    pub fn companies(&self) -> Vec<&str> {
        self.all
            .iter()
            .map(|r| r.company.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn themes(&self) -> Vec<&str> {
        self.all
            .iter()
            .map(|r| r.theme.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn export_json(&self) -> Result<String, ExportError> {
        if self.filtered.is_empty() {
            return Err(ExportError::Empty);
        }
        serde_json::to_string_pretty(&self.filtered).map_err(|e| ExportError::Encode(e.to_string()))
    }

    /// CSV con todos los campos entrecomillados y las comillas internas duplicadas.
    pub fn export_csv(&self) -> Result<String, ExportError> {
        if self.filtered.is_empty() {
            return Err(ExportError::Empty);
        }
        let mut writer = csv::WriterBuilder::new()
            .quote_style(csv::QuoteStyle::Always)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new());

        let encode = |e: csv::Error| ExportError::Encode(e.to_string());
        writer.write_record(CSV_HEADER).map_err(encode)?;
        for item in &self.filtered {
            writer
                .write_record([
                    item.time_period.as_str(),
                    item.date.as_str(),
                    item.company.as_str(),
                    item.ticker.as_deref().unwrap_or(""),
                    item.sector.as_str(),
                    item.industry.as_str(),
                    item.country.as_str(),
                    item.document_id.as_str(),
                    item.headline.as_str(),
                    item.quote.as_str(),
                    item.motivation.as_str(),
                    item.theme.as_str(),
                ])
                .map_err(encode)?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| ExportError::Encode(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| ExportError::Encode(e.to_string()))
    }
}
