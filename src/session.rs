//! Estado de la vista del dashboard.
//!
//! Una única sesión agrupa el último informe, la configuración mostrada, el
//! almacén de evidencias y el contenido de cada pestaña. Los renderizadores
//! reciben sus datos desde aquí; no hay estado global.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::errors::SubmitError;
use crate::evidence::{EvidenceFilter, EvidenceStore};
use crate::html::Html;
use crate::models::{CurrentConfig, Report, StatusResponse, Watchlist};
use crate::render::company_cards::{render_company_cards, CompanySort};
use crate::render::config_badge::render_config_badge;
use crate::render::dashboard_cards::render_dashboard_cards;
use crate::render::evidence_table::{render_document_modal, render_evidence_tab};
use crate::render::heatmap::render_heatmap;
use crate::render::logs::{render_log_lines, render_status_error};
use crate::render::output::{render_error_banner, render_submit_error};
use crate::render::taxonomy::{render_mindmap, MindmapView, MindmapViews};
use crate::tabs::{Tab, TabController};

pub const SUBMIT_LABEL: &str = "Run Screener";
pub const WAITING_LABEL: &str = "Waiting for response...";

pub const NO_COMPANY_DATA: &str = "No company data available";
pub const NO_TAXONOMY_DATA: &str = "No taxonomy data available";
pub const NO_EVIDENCE_DATA: &str = "No evidence data available";

/// Fase del ciclo envío/sondeo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionPhase {
    #[default]
    Idle,
    Submitting,
    Polling,
    Completed,
    /// El trabajo terminó con `failed`.
    Failed,
    /// El envío no llegó a aceptarse (error local o respuesta no-2xx).
    Rejected,
}

/// Estado del botón de envío.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FormState {
    pub submit_enabled: bool,
    pub submit_label: &'static str,
}

impl FormState {
    fn ready() -> Self {
        Self {
            submit_enabled: true,
            submit_label: SUBMIT_LABEL,
        }
    }

    fn waiting() -> Self {
        Self {
            submit_enabled: false,
            submit_label: WAITING_LABEL,
        }
    }
}

/// Foto serializable del estado para la página.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub session_id: String,
    pub phase: SubmissionPhase,
    pub request_id: Option<String>,
    pub submit_enabled: bool,
    pub submit_label: &'static str,
    pub logs_html: String,
    pub output_html: String,
    pub badge_html: String,
    pub dashboard_html: String,
    pub active_tab: Tab,
    pub has_report: bool,
}

#[derive(Debug)]
pub struct DashboardSession {
    id: Uuid,
    watchlists: Vec<Watchlist>,
    last_report: Option<Arc<Report>>,
    current_config: Option<CurrentConfig>,
    evidence: EvidenceStore,
    tabs: TabController,
    company_sort: CompanySort,
    company_search: String,
    focused_company: Option<String>,
    mindmap_view: MindmapView,
    mindmap_views: MindmapViews,
    form: FormState,
    log_panel: Html,
    output: Html,
    phase: SubmissionPhase,
    active_request: Option<String>,
    /// Se incrementa con cada envío, demo o carga; invalida respuestas que
    /// llegan tarde.
    submission: u64,
}

impl DashboardSession {
    pub fn new(watchlists: Vec<Watchlist>) -> Self {
        Self {
            id: Uuid::new_v4(),
            watchlists,
            last_report: None,
            current_config: None,
            evidence: EvidenceStore::default(),
            tabs: TabController::new(),
            company_sort: CompanySort::default(),
            company_search: String::new(),
            focused_company: None,
            mindmap_view: MindmapView::default(),
            mindmap_views: MindmapViews::default(),
            form: FormState::ready(),
            log_panel: Html::new(),
            output: Html::new(),
            phase: SubmissionPhase::Idle,
            active_request: None,
            submission: 0,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn watchlists(&self) -> &[Watchlist] {
        &self.watchlists
    }

    pub fn last_report(&self) -> Option<&Arc<Report>> {
        self.last_report.as_ref()
    }

    pub fn current_config(&self) -> Option<&CurrentConfig> {
        self.current_config.as_ref()
    }

    pub fn evidence(&self) -> &EvidenceStore {
        &self.evidence
    }

    pub fn tabs(&self) -> &TabController {
        &self.tabs
    }

    pub fn form(&self) -> FormState {
        self.form
    }

    pub fn phase(&self) -> SubmissionPhase {
        self.phase
    }

    pub fn active_request(&self) -> Option<&str> {
        self.active_request.as_deref()
    }

    pub fn log_panel(&self) -> &Html {
        &self.log_panel
    }

    pub fn output(&self) -> &Html {
        &self.output
    }

    pub fn company_sort(&self) -> CompanySort {
        self.company_sort
    }

    pub fn mindmap_view(&self) -> MindmapView {
        self.mindmap_view
    }

    /// `true` si las respuestas de `request_id` todavía deben pintarse.
    pub fn is_active(&self, request_id: &str) -> bool {
        self.active_request.as_deref() == Some(request_id)
    }

    /// Limpia el informe anterior y bloquea el formulario mientras se envía.
    /// Devuelve la generación del nuevo envío.
    pub fn begin_submission(&mut self) -> u64 {
        self.last_report = None;
        self.evidence = EvidenceStore::default();
        self.mindmap_views.clear();
        self.tabs.reset();
        self.log_panel = Html::new();
        self.output = Html::new();
        self.form = FormState::waiting();
        self.phase = SubmissionPhase::Submitting;
        self.active_request = None;
        self.focused_company = None;
        self.submission += 1;
        self.submission
    }

    /// `true` si ningún envío, demo o carga posterior ha empezado.
    pub fn is_current_submission(&self, generation: u64) -> bool {
        self.submission == generation
    }

    pub fn start_polling(&mut self, request_id: &str) {
        self.active_request = Some(request_id.to_string());
        self.form = FormState::waiting();
        self.phase = SubmissionPhase::Polling;
    }

    /// Aviso de fechas inválidas: no cambia la fase ni el formulario.
    pub fn show_validation_error(&mut self, message: &str) {
        self.output = render_submit_error(&SubmitError::DateRange(message.to_string()));
    }

    /// El envío no llegó a convertirse en un trabajo.
    pub fn reject(&mut self, err: &SubmitError) {
        self.output = render_submit_error(err);
        self.form = FormState::ready();
        self.phase = SubmissionPhase::Rejected;
        self.active_request = None;
    }

    /// Error fuera del ciclo de envío (p. ej. un informe de demo ilegible).
    pub fn fail(&mut self, message: &str) {
        self.output = render_error_banner(message);
        self.form = FormState::ready();
    }

    pub fn render_status(&mut self, status: &StatusResponse) {
        self.log_panel = render_log_lines(status);
    }

    pub fn show_status_error(&mut self, message: &str) {
        self.log_panel = render_status_error(message);
    }

    /// El trabajo terminó en `failed`: sin informe.
    pub fn finish_failed(&mut self) {
        self.form = FormState::ready();
        self.phase = SubmissionPhase::Failed;
        self.active_request = None;
    }

    /// Libera el formulario sin informe (sondeo cancelado o trabajo aún abierto).
    pub fn release_form(&mut self) {
        self.form = FormState::ready();
        self.phase = SubmissionPhase::Idle;
        self.active_request = None;
    }

    /// Reparte el informe entre las pestañas y actualiza la insignia.
    pub fn show_report(&mut self, report: Report, config: Option<CurrentConfig>) {
        debug!(session = %self.id, companies = report.theme_scoring.len(), "rendering report");
        let report = Arc::new(report);
        self.evidence = EvidenceStore::new(report.content.clone());
        self.mindmap_views.clear();
        self.focused_company = None;
        self.last_report = Some(report);
        self.current_config = config;
        self.tabs.reset();

        self.render_summary();
        self.render_companies();
        self.render_mindmap();
        self.render_evidence();

        self.output = Html::new();
        self.form = FormState::ready();
        self.phase = SubmissionPhase::Completed;
        self.active_request = None;
    }

    fn render_summary(&mut self) {
        let Some(report) = self.last_report.clone() else {
            return;
        };
        if report.theme_scoring.is_empty() {
            self.tabs.show_empty_state(Tab::Summary, Some(NO_COMPANY_DATA));
            return;
        }
        let mut html = render_dashboard_cards(&report, self.current_config.as_ref());
        html.push(render_heatmap(&report.theme_scoring));
        self.tabs.set_content(Tab::Summary, html);
    }

    fn render_companies(&mut self) {
        let Some(report) = self.last_report.clone() else {
            return;
        };
        if report.theme_scoring.is_empty() {
            self.tabs.show_empty_state(Tab::Companies, Some(NO_COMPANY_DATA));
            return;
        }
        let html = render_company_cards(
            &report.theme_scoring,
            self.company_sort,
            &self.company_search,
            self.focused_company.as_deref(),
        );
        self.tabs.set_content(Tab::Companies, html);
    }

    fn render_mindmap(&mut self) {
        let Some(report) = self.last_report.clone() else {
            return;
        };
        let Some(root) = report.theme_taxonomy.as_ref() else {
            self.tabs.show_empty_state(Tab::Mindmap, Some(NO_TAXONOMY_DATA));
            return;
        };
        self.mindmap_views.ensure(self.mindmap_view, root);
        let html = render_mindmap(&self.mindmap_views, self.mindmap_view);
        self.tabs.set_content(Tab::Mindmap, html);
    }

    fn render_evidence(&mut self) {
        if self.last_report.is_none() {
            return;
        }
        if self.evidence.all().is_empty() {
            self.tabs.show_empty_state(Tab::Evidence, Some(NO_EVIDENCE_DATA));
            return;
        }
        let html = render_evidence_tab(&self.evidence);
        self.tabs.set_content(Tab::Evidence, html);
    }

    pub fn switch_tab(&mut self, tab: Tab) {
        self.tabs.switch_tab(tab);
    }

    pub fn apply_evidence_filters(&mut self, filter: EvidenceFilter) {
        self.evidence.apply_filters(filter);
        self.render_evidence();
    }

    pub fn clear_evidence_filters(&mut self) {
        self.evidence.clear_filters();
        self.render_evidence();
    }

    pub fn change_evidence_page(&mut self, delta: i64) -> bool {
        let changed = self.evidence.change_page(delta);
        if changed {
            self.render_evidence();
        }
        changed
    }

    pub fn sort_companies(&mut self, sort: CompanySort) {
        self.company_sort = sort;
        self.render_companies();
    }

    pub fn search_companies(&mut self, search: &str) {
        self.company_search = search.to_string();
        self.render_companies();
    }

    /// Cambia la vista de la taxonomía; la otra vista se construye la primera
    /// vez que se pide.
    pub fn switch_mindmap_view(&mut self, view: MindmapView) {
        self.mindmap_view = view;
        self.render_mindmap();
    }

    /// Salta a evidencias filtradas por un tema (clic en el Top 10 de temas).
    pub fn filter_by_theme(&mut self, theme: &str) {
        self.tabs.switch_tab(Tab::Evidence);
        self.apply_evidence_filters(EvidenceFilter {
            theme: Some(theme.to_string()),
            ..Default::default()
        });
    }

    /// Salta a la tarjeta de una compañía (clic en el Top 10 de compañías).
    /// La búsqueda se vacía para que la tarjeta resaltada sea visible.
    pub fn focus_company(&mut self, company: &str) {
        self.tabs.switch_tab(Tab::Companies);
        self.company_search.clear();
        self.focused_company = Some(company.to_string());
        self.render_companies();
    }

    pub fn focused_company(&self) -> Option<&str> {
        self.focused_company.as_deref()
    }

    /// Ventana con el identificador del documento de una evidencia.
    pub fn document_details(&self, document_id: &str) -> Html {
        let record = self
            .evidence
            .all()
            .iter()
            .find(|item| item.document_id == document_id);
        render_document_modal(document_id, record)
    }

    pub fn render_badge(&self) -> Html {
        render_config_badge(self.current_config.as_ref(), &self.watchlists)
    }

    /// Navegación y paneles de las cuatro pestañas.
    pub fn render_dashboard(&self) -> Html {
        let mut html = self.tabs.render_nav();
        html.push(self.tabs.render_panels());
        html
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.id.to_string(),
            phase: self.phase,
            request_id: self.active_request.clone(),
            submit_enabled: self.form.submit_enabled,
            submit_label: self.form.submit_label,
            logs_html: self.log_panel.to_string(),
            output_html: self.output.to_string(),
            badge_html: self.render_badge().into_string(),
            dashboard_html: self.render_dashboard().into_string(),
            active_tab: self.tabs.active(),
            has_report: self.last_report.is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::default_watchlists;
    use pretty_assertions::assert_eq;

    const REPORT: &str = r#"{
        "theme_scoring": {
            "Nvidia": {"ticker": "NVDA", "industry": "Semis", "composite_score": 9,
                       "themes": {"Chips": 6, "Cloud": 3}, "motivation": "GPUs"},
            "Oracle": {"ticker": "ORCL", "industry": "Software", "composite_score": 4,
                       "themes": {"Cloud": 4}}
        },
        "theme_taxonomy": {"node": 1, "label": "AI", "children": [{"node": 2, "label": "Chips"}]},
        "content": [
            {"time_period": "Q1", "date": "2025-01-01", "company": "Nvidia", "ticker": "NVDA",
             "sector": "Tech", "industry": "Semis", "country": "US", "document_id": "d1",
             "headline": "h1", "quote": "q1", "motivation": "m1", "theme": "Chips"},
            {"time_period": "Q1", "date": "2025-01-02", "company": "Oracle", "ticker": "ORCL",
             "sector": "Tech", "industry": "Software", "country": "US", "document_id": "d2",
             "headline": "h2", "quote": "q2", "motivation": "m2", "theme": "Cloud"}
        ]
    }"#;

    fn loaded() -> DashboardSession {
        let mut session = DashboardSession::new(default_watchlists());
        let report: Report = serde_json::from_str(REPORT).unwrap();
        session.show_report(report, Some(CurrentConfig::new("AI", "Nasdaq 100", false)));
        session
    }

    #[test]
    fn begin_submission_clears_and_locks_form() {
        let mut session = loaded();
        session.begin_submission();
        assert!(session.last_report().is_none());
        assert!(session.tabs().content(Tab::Summary).is_empty());
        assert!(session.evidence().all().is_empty());
        assert_eq!(session.form(), FormState { submit_enabled: false, submit_label: WAITING_LABEL });
        assert_eq!(session.phase(), SubmissionPhase::Submitting);
    }

    #[test]
    fn report_fills_every_tab_and_unlocks_form() {
        let session = loaded();
        assert!(session.tabs().content(Tab::Summary).as_str().contains("At a Glance"));
        assert!(session.tabs().content(Tab::Summary).as_str().contains("Company-Theme Heatmap"));
        assert!(session.tabs().content(Tab::Companies).as_str().contains("companyCardsContainer"));
        assert!(session.tabs().content(Tab::Mindmap).as_str().contains("tree-node"));
        assert!(session.tabs().content(Tab::Evidence).as_str().contains("evidenceTableBody"));
        assert_eq!(session.form().submit_label, SUBMIT_LABEL);
        assert!(session.render_badge().as_str().contains("Nasdaq 100"));
    }

    #[test]
    fn empty_report_renders_empty_states() {
        let mut session = DashboardSession::new(vec![]);
        let report: Report = serde_json::from_str(r#"{"theme_scoring": {}, "content": []}"#).unwrap();
        session.show_report(report, Some(CurrentConfig::new("AI", "NVDA12", false)));
        for (tab, message) in [
            (Tab::Summary, NO_COMPANY_DATA),
            (Tab::Companies, NO_COMPANY_DATA),
            (Tab::Mindmap, NO_TAXONOMY_DATA),
            (Tab::Evidence, NO_EVIDENCE_DATA),
        ] {
            assert!(session.tabs().content(tab).as_str().contains(message), "{tab}");
        }
    }

    #[test]
    fn theme_focus_switches_to_filtered_evidence() {
        let mut session = loaded();
        session.filter_by_theme("cloud");
        assert_eq!(session.tabs().active(), Tab::Evidence);
        assert_eq!(session.evidence().filtered().len(), 1);
        assert!(session.tabs().content(Tab::Evidence).as_str().contains(">1</span> of 2 items"));
    }

    #[test]
    fn graph_view_is_built_on_first_switch() {
        let mut session = loaded();
        assert!(!session.tabs().content(Tab::Mindmap).as_str().contains("<svg"));
        session.switch_mindmap_view(MindmapView::Graph);
        let html = session.tabs().content(Tab::Mindmap).as_str();
        assert!(html.contains("<svg"));
        assert!(html.contains(r#"id="mindmapTreeView" class="mindmap-view hidden""#));
    }

    #[test]
    fn company_sort_rerenders_companies_only() {
        let mut session = loaded();
        let summary = session.tabs().content(Tab::Summary).clone();
        session.sort_companies(CompanySort::NameDesc);
        let html = session.tabs().content(Tab::Companies).as_str();
        assert!(html.find("Oracle").unwrap() < html.find("Nvidia").unwrap());
        assert_eq!(session.tabs().content(Tab::Summary), &summary);
    }

    #[test]
    fn rejection_reenables_form_with_banner() {
        let mut session = DashboardSession::new(vec![]);
        session.begin_submission();
        session.reject(&SubmitError::MissingUniverse);
        assert_eq!(session.phase(), SubmissionPhase::Rejected);
        assert!(session.form().submit_enabled);
        assert!(session.output().as_str().contains("Company Universe is required."));
    }

    #[test]
    fn company_focus_switches_tab_and_highlights_card() {
        let mut session = loaded();
        session.search_companies("oracle");
        session.focus_company("Nvidia");
        assert_eq!(session.tabs().active(), Tab::Companies);
        assert_eq!(session.focused_company(), Some("Nvidia"));
        let html = session.tabs().content(Tab::Companies).as_str();
        assert!(!html.contains(r#"value="oracle""#));
        assert!(html.contains(r#"data-focused="true" data-company-name="nvidia""#));

        session.begin_submission();
        assert_eq!(session.focused_company(), None);
    }

    #[test]
    fn document_details_include_matching_evidence() {
        let session = loaded();
        let modal = session.document_details("d2").into_string();
        assert!(modal.contains(">d2</div>"));
        assert!(modal.contains("h2"));
        assert!(!session.document_details("missing").as_str().contains("h2"));
    }

    #[test]
    fn later_submission_invalidates_earlier_generation() {
        let mut session = DashboardSession::new(vec![]);
        let first = session.begin_submission();
        let second = session.begin_submission();
        assert!(!session.is_current_submission(first));
        assert!(session.is_current_submission(second));
    }

    #[test]
    fn polling_keeps_form_locked() {
        let mut session = loaded();
        session.start_polling("r1");
        assert_eq!(session.form(), FormState { submit_enabled: false, submit_label: WAITING_LABEL });
        assert!(session.is_active("r1"));
    }
}
