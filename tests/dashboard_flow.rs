//! Flujo completo envío → sondeo → informe contra un backend simulado.
//!
//! El reloj de tokio está pausado: los ticks del sondeo avanzan con
//! `tokio::time::sleep`, sin esperas reales.

use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde_json::json;
use tokio_test::{assert_err, assert_ok};

use screener_dashboard::client::ScreenerBackend;
use screener_dashboard::controller::{lock_session, SharedSession, SubmissionController};
use screener_dashboard::demo::DemoReport;
use screener_dashboard::errors::{ClientError, SubmitError};
use screener_dashboard::models::{default_watchlists, StatusResponse};
use screener_dashboard::request::{ScreenerForm, ScreenerRequest};
use screener_dashboard::session::{DashboardSession, SubmissionPhase, SUBMIT_LABEL};
use screener_dashboard::tabs::Tab;

const INTERVAL: Duration = Duration::from_millis(5000);

// ---------------------------------------------------------------------------
// Backend simulado
// ---------------------------------------------------------------------------

#[derive(Default)]
struct MockBackend {
    /// Respuestas de `submit`, en orden.
    submissions: Mutex<VecDeque<Result<String, ClientError>>>,
    /// Latencia de cada `submit`, en el mismo orden.
    submit_delays: Mutex<VecDeque<Duration>>,
    /// Estados por trabajo; el último se repite indefinidamente.
    statuses: Mutex<HashMap<String, VecDeque<StatusResponse>>>,
    status_calls: Mutex<Vec<String>>,
    submitted: Mutex<Vec<ScreenerRequest>>,
}

impl MockBackend {
    fn accept(&self, result: Result<&str, ClientError>) {
        self.submissions
            .lock()
            .unwrap()
            .push_back(result.map(str::to_string));
    }

    fn script(&self, request_id: &str, statuses: Vec<serde_json::Value>) {
        let statuses = statuses
            .into_iter()
            .map(|s| serde_json::from_value(s).unwrap())
            .collect();
        self.statuses
            .lock()
            .unwrap()
            .insert(request_id.to_string(), statuses);
    }

    fn calls_for(&self, request_id: &str) -> usize {
        self.status_calls
            .lock()
            .unwrap()
            .iter()
            .filter(|id| *id == request_id)
            .count()
    }
}

#[async_trait]
impl ScreenerBackend for MockBackend {
    async fn submit(&self, request: &ScreenerRequest, _token: Option<&str>) -> Result<String, ClientError> {
        self.submitted.lock().unwrap().push(request.clone());
        let response = self
            .submissions
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(ClientError::Http(500)));
        let delay = self.submit_delays.lock().unwrap().pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        response
    }

    async fn status(&self, request_id: &str, _token: Option<&str>) -> Result<StatusResponse, ClientError> {
        self.status_calls.lock().unwrap().push(request_id.to_string());
        let mut statuses = self.statuses.lock().unwrap();
        let queue = statuses.get_mut(request_id).ok_or(ClientError::Http(404))?;
        match queue.len() {
            0 => Err(ClientError::Http(404)),
            1 => Ok(queue[0].clone()),
            _ => Ok(queue.pop_front().unwrap()),
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn setup() -> (Arc<MockBackend>, SubmissionController, SharedSession) {
    setup_with_interval(INTERVAL)
}

fn setup_with_interval(interval: Duration) -> (Arc<MockBackend>, SubmissionController, SharedSession) {
    let backend = Arc::new(MockBackend::default());
    let session: SharedSession = Arc::new(Mutex::new(DashboardSession::new(default_watchlists())));
    let controller = SubmissionController::new(
        backend.clone(),
        Arc::clone(&session),
        default_watchlists(),
        interval,
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("frontend/data"),
    );
    (backend, controller, session)
}

fn form(theme: &str, companies: &str) -> ScreenerForm {
    ScreenerForm {
        theme: theme.to_string(),
        companies: companies.to_string(),
        ..Default::default()
    }
}

/// Deja correr las tareas pendientes sin avanzar el reloj.
async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

async fn next_tick() {
    tokio::time::sleep(INTERVAL).await;
    settle().await;
}

fn running(logs: &[&str]) -> serde_json::Value {
    json!({"status": "running", "logs": logs})
}

fn completed_empty() -> serde_json::Value {
    json!({"status": "completed", "report": {"theme_scoring": {}, "theme_taxonomy": null, "content": []}})
}

// ---------------------------------------------------------------------------
// Escenarios
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn completed_job_with_empty_report_shows_empty_states() {
    let (backend, controller, session) = setup();
    backend.accept(Ok("r1"));
    backend.script("r1", vec![running(&["Info: starting"]), completed_empty()]);

    let request_id = assert_ok!(controller.submit(form("AI", "NVDA12"), None).await);
    assert_eq!(request_id, "r1");
    {
        let submitted = backend.submitted.lock().unwrap();
        assert_eq!(
            serde_json::to_value(&submitted[0].companies).unwrap(),
            json!(["NVDA12"])
        );
    }

    settle().await;
    {
        let s = lock_session(&session);
        assert_eq!(s.phase(), SubmissionPhase::Polling);
        assert!(!s.form().submit_enabled);
        assert!(s.log_panel().as_str().contains("Info: starting"));
        assert!(s.log_panel().as_str().contains("text-sky-400"));
    }

    next_tick().await;
    let s = lock_session(&session);
    assert_eq!(s.phase(), SubmissionPhase::Completed);
    assert!(s.form().submit_enabled);
    assert_eq!(s.form().submit_label, SUBMIT_LABEL);
    assert_eq!(backend.calls_for("r1"), 2);

    let empty = |tab: Tab| s.tabs().content(tab).as_str().to_string();
    assert!(empty(Tab::Summary).contains("No company data available"));
    assert!(empty(Tab::Companies).contains("No company data available"));
    assert!(empty(Tab::Mindmap).contains("No taxonomy data available"));
    assert!(empty(Tab::Evidence).contains("No evidence data available"));

    let config = s.current_config().unwrap();
    assert_eq!(config.theme, "AI");
    assert!(!config.is_demo);
}

#[tokio::test(start_paused = true)]
async fn cancelling_stops_further_status_calls() {
    let (backend, controller, session) = setup();
    backend.accept(Ok("r1"));
    backend.script("r1", vec![running(&["Info: working"])]);

    assert_ok!(controller.submit(form("AI", "NVDA12"), None).await);
    settle().await;
    assert_eq!(backend.calls_for("r1"), 1);
    assert_eq!(controller.polling_request().as_deref(), Some("r1"));

    assert!(controller.cancel());
    for _ in 0..3 {
        next_tick().await;
    }

    assert_eq!(backend.calls_for("r1"), 1);
    assert_eq!(controller.polling_request(), None);
    let s = lock_session(&session);
    assert_eq!(s.phase(), SubmissionPhase::Idle);
    assert!(s.form().submit_enabled);
    assert!(!controller.cancel());
}

#[tokio::test(start_paused = true)]
async fn newer_submission_replaces_the_previous_poll() {
    let (backend, controller, session) = setup();
    backend.accept(Ok("r1"));
    backend.accept(Ok("r2"));
    backend.script("r1", vec![running(&["Info: first job"])]);
    backend.script("r2", vec![running(&["Info: second job"]), completed_empty()]);

    assert_ok!(controller.submit(form("AI", "NVDA12"), None).await);
    settle().await;
    assert_ok!(controller.submit(form("Cloud", "Nasdaq 100"), None).await);
    settle().await;
    let r1_calls = backend.calls_for("r1");

    for _ in 0..3 {
        next_tick().await;
    }

    assert_eq!(backend.calls_for("r1"), r1_calls);
    let s = lock_session(&session);
    assert_eq!(s.phase(), SubmissionPhase::Completed);
    assert!(!s.log_panel().as_str().contains("first job"));
    assert_eq!(s.current_config().unwrap().theme, "Cloud");
}

#[tokio::test(start_paused = true)]
async fn failed_job_reenables_form_without_report() {
    let (backend, controller, session) = setup();
    backend.accept(Ok("r1"));
    backend.script("r1", vec![json!({"status": "failed", "logs": ["Error: out of quota"]})]);

    assert_ok!(controller.submit(form("AI", "Dow 30"), None).await);
    settle().await;

    let s = lock_session(&session);
    assert_eq!(s.phase(), SubmissionPhase::Failed);
    assert!(s.form().submit_enabled);
    assert!(s.last_report().is_none());
    assert!(s.log_panel().as_str().contains("text-red-400"));
}

#[tokio::test(start_paused = true)]
async fn status_errors_are_shown_and_polling_continues() {
    let (backend, controller, session) = setup();
    backend.accept(Ok("r1"));
    backend.script("r1", vec![]);

    assert_ok!(controller.submit(form("AI", "NVDA12"), None).await);
    settle().await;
    assert!(lock_session(&session)
        .log_panel()
        .as_str()
        .contains("Status HTTP error 404"));

    backend.script("r1", vec![completed_empty()]);
    next_tick().await;
    assert_eq!(lock_session(&session).phase(), SubmissionPhase::Completed);
}

#[tokio::test(start_paused = true)]
async fn rejected_submissions_render_banner() {
    let (backend, controller, session) = setup();
    backend.accept(Err(ClientError::Validation(vec!["body, theme: field required".into()])));
    backend.accept(Err(ClientError::Http(500)));

    let err = assert_err!(controller.submit(form("", "NVDA12"), None).await);
    assert!(matches!(err, SubmitError::Backend(ClientError::Validation(_))));
    {
        let s = lock_session(&session);
        assert_eq!(s.phase(), SubmissionPhase::Rejected);
        assert!(s.form().submit_enabled);
        assert!(s.output().as_str().contains("Form submission error:<br>body, theme: field required"));
    }

    assert_err!(controller.submit(form("AI", "NVDA12"), None).await);
    assert!(lock_session(&session).output().as_str().contains("HTTP error 500"));
    assert_eq!(controller.polling_request(), None);
}

#[tokio::test(start_paused = true)]
async fn invalid_date_range_never_reaches_backend() {
    let (backend, controller, session) = setup();
    let mut form = form("AI", "NVDA12");
    form.start_date = "2024-01-01".into();
    form.end_date = "2024-03-01".into();
    form.frequency = "D".into();

    let err = assert_err!(controller.submit(form, None).await);
    assert!(matches!(err, SubmitError::DateRange(_)));
    assert!(backend.submitted.lock().unwrap().is_empty());

    let s = lock_session(&session);
    assert!(s.output().as_str().contains("Maximum: 14 days"));
    assert_eq!(s.phase(), SubmissionPhase::Idle);
}

#[tokio::test(start_paused = true)]
async fn demo_report_is_marked_as_demo() {
    let (_backend, controller, session) = setup();
    assert_ok!(controller.load_demo(DemoReport::AiAutomation).await);

    let s = lock_session(&session);
    let config = s.current_config().unwrap();
    assert!(config.is_demo);
    assert_eq!(config.theme, "AI & Automation");
    assert_eq!(s.phase(), SubmissionPhase::Completed);
    assert!(s.render_badge().as_str().contains("AI &amp; Automation"));
    assert!(!s.evidence().all().is_empty());
}

#[tokio::test(start_paused = true)]
async fn loading_a_finished_request_renders_its_report() {
    let (backend, controller, session) = setup();
    backend.script(
        "old-1",
        vec![json!({
            "status": "completed",
            "logs": ["Success: done"],
            "report": {
                "theme_scoring": {
                    "Nvidia": {"ticker": "NVDA", "industry": "Semis", "composite_score": 3,
                               "themes": {"Chips": 3}}
                }
            }
        })],
    );

    let status = assert_ok!(controller.load_request("old-1", None).await);
    assert_eq!(status.request_id, None);

    let s = lock_session(&session);
    assert_eq!(s.phase(), SubmissionPhase::Completed);
    assert!(s.tabs().content(Tab::Companies).as_str().contains("Nvidia"));
    assert!(s.log_panel().as_str().contains("text-green-400"));
}

#[tokio::test(start_paused = true)]
async fn slow_earlier_submission_does_not_take_over_newer_job() {
    let (backend, controller, session) = setup();
    backend.accept(Ok("old"));
    backend.accept(Ok("new"));
    backend.submit_delays.lock().unwrap().extend([
        Duration::from_millis(2000),
        Duration::from_millis(100),
    ]);
    backend.script("old", vec![running(&["Info: old job"])]);
    backend.script("new", vec![running(&["Info: new job"])]);

    let (first, second) = tokio::join!(controller.submit(form("Old", "NVDA12"), None), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        controller.submit(form("New", "NVDA12"), None).await
    });
    settle().await;

    assert!(matches!(first, Err(SubmitError::Superseded)));
    assert_eq!(assert_ok!(second), "new");
    assert_eq!(controller.polling_request().as_deref(), Some("new"));

    next_tick().await;
    assert_eq!(backend.calls_for("old"), 0);
    let s = lock_session(&session);
    assert_eq!(s.active_request(), Some("new"));
    assert_eq!(s.phase(), SubmissionPhase::Polling);
    assert!(!s.form().submit_enabled);
    assert!(s.log_panel().as_str().contains("new job"));
}

#[tokio::test(start_paused = true)]
async fn demo_loaded_while_submitting_wins() {
    let (backend, controller, session) = setup();
    backend.accept(Ok("r1"));
    backend.submit_delays.lock().unwrap().push_back(Duration::from_millis(500));
    backend.script("r1", vec![running(&["Info: working"])]);

    let (submitted, demo) = tokio::join!(controller.submit(form("AI", "NVDA12"), None), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        controller.load_demo(DemoReport::SupplyChain).await
    });
    settle().await;

    assert!(matches!(submitted, Err(SubmitError::Superseded)));
    assert_ok!(demo);
    assert_eq!(controller.polling_request(), None);
    assert_eq!(backend.calls_for("r1"), 0);
    let s = lock_session(&session);
    assert_eq!(s.phase(), SubmissionPhase::Completed);
    assert!(s.form().submit_enabled);
    assert!(s.current_config().unwrap().is_demo);
}

#[tokio::test(start_paused = true)]
async fn zero_poll_interval_still_polls() {
    let (backend, controller, session) = setup_with_interval(Duration::ZERO);
    backend.accept(Ok("r1"));
    backend.script("r1", vec![running(&["Info: starting"]), completed_empty()]);

    assert_ok!(controller.submit(form("AI", "NVDA12"), None).await);
    settle().await;
    tokio::time::sleep(Duration::from_millis(5)).await;
    settle().await;

    assert!(backend.calls_for("r1") >= 2);
    let s = lock_session(&session);
    assert_eq!(s.phase(), SubmissionPhase::Completed);
    assert!(s.form().submit_enabled);
}
