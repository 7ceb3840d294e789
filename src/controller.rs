//! Envío de trabajos y sondeo de su estado.
//!
//! Cada envío aceptado arranca una única tarea de sondeo identificada por su
//! `request_id`. Un envío nuevo, una demo o la carga de otro trabajo abortan
//! la tarea anterior; además cada tick comprueba que su trabajo sigue siendo
//! el activo de la sesión antes de escribir.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::client::ScreenerBackend;
use crate::demo::DemoReport;
use crate::errors::{ClientError, SubmitError};
use crate::models::{CurrentConfig, JobStatus, StatusResponse, Watchlist};
use crate::request::ScreenerForm;
use crate::session::DashboardSession;
use crate::validators::validate_date_range;

/// Periodo mínimo del sondeo; `tokio::time::interval` no admite cero.
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Sesión compartida entre los handlers y la tarea de sondeo.
pub type SharedSession = Arc<Mutex<DashboardSession>>;

/// Bloquea la sesión recuperándola si otro hilo la envenenó.
pub fn lock_session(session: &SharedSession) -> MutexGuard<'_, DashboardSession> {
    session.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

struct ActivePoll {
    request_id: String,
    handle: JoinHandle<()>,
}

pub struct SubmissionController {
    backend: Arc<dyn ScreenerBackend>,
    session: SharedSession,
    watchlists: Vec<Watchlist>,
    poll_interval: Duration,
    demo_dir: PathBuf,
    poller: Mutex<Option<ActivePoll>>,
}

impl SubmissionController {
    pub fn new(
        backend: Arc<dyn ScreenerBackend>,
        session: SharedSession,
        watchlists: Vec<Watchlist>,
        poll_interval: Duration,
        demo_dir: PathBuf,
    ) -> Self {
        Self {
            backend,
            session,
            watchlists,
            poll_interval: poll_interval.max(MIN_POLL_INTERVAL),
            demo_dir,
            poller: Mutex::new(None),
        }
    }

    /// `request_id` de la tarea de sondeo viva, si la hay.
    pub fn polling_request(&self) -> Option<String> {
        let poller = self.poller.lock().unwrap_or_else(|p| p.into_inner());
        poller
            .as_ref()
            .filter(|poll| !poll.handle.is_finished())
            .map(|poll| poll.request_id.clone())
    }

    fn abort_poll(&self) -> Option<String> {
        let mut poller = self.poller.lock().unwrap_or_else(|p| p.into_inner());
        poller.take().map(|poll| {
            poll.handle.abort();
            poll.request_id
        })
    }

    /// Valida el formulario, envía el trabajo y arranca el sondeo.
    pub async fn submit(&self, form: ScreenerForm, token: Option<String>) -> Result<String, SubmitError> {
        let validation = validate_date_range(
            Some(form.start_date.as_str()),
            Some(form.end_date.as_str()),
            Some(form.frequency.as_str()),
        );
        if !validation.is_valid {
            lock_session(&self.session).show_validation_error(&validation.message);
            return Err(SubmitError::DateRange(validation.message));
        }

        let request = match form.to_request(&self.watchlists) {
            Ok(request) => request,
            Err(err) => {
                lock_session(&self.session).reject(&err);
                return Err(err);
            }
        };

        if let Some(previous) = self.abort_poll() {
            info!(request_id = %previous, "cancelling previous poll");
        }
        let generation = lock_session(&self.session).begin_submission();

        let result = self.backend.submit(&request, token.as_deref()).await;

        // Un envío, demo o carga posterior ya es el dueño de la sesión.
        let mut session = lock_session(&self.session);
        if !session.is_current_submission(generation) {
            match &result {
                Ok(request_id) => info!(%request_id, "discarding superseded submission"),
                Err(err) => debug!(error = %err, "ignoring error of superseded submission"),
            }
            return Err(SubmitError::Superseded);
        }

        let request_id = match result {
            Ok(id) => id,
            Err(err) => {
                warn!(error = %err, "screener submission failed");
                let err = SubmitError::from(err);
                session.reject(&err);
                return Err(err);
            }
        };
        info!(%request_id, theme = %request.theme, "screener job accepted");

        let config = CurrentConfig::new(request.theme.clone(), request.companies.display_value(), false);
        session.start_polling(&request_id);
        self.spawn_poll(request_id.clone(), token, Some(config));
        Ok(request_id)
    }

    /// Se llama con la sesión bloqueada: el orden de bloqueo es sesión y
    /// después `poller`.
    fn spawn_poll(&self, request_id: String, token: Option<String>, config: Option<CurrentConfig>) {
        let handle = tokio::spawn(poll_job(
            Arc::clone(&self.backend),
            Arc::clone(&self.session),
            request_id.clone(),
            token,
            config,
            self.poll_interval,
        ));
        let mut poller = self.poller.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(stale) = poller.replace(ActivePoll { request_id, handle }) {
            stale.handle.abort();
        }
    }

    /// Aborta el sondeo en curso y libera el formulario.
    pub fn cancel(&self) -> bool {
        match self.abort_poll() {
            Some(request_id) => {
                info!(%request_id, "polling cancelled");
                let mut session = lock_session(&self.session);
                if session.is_active(&request_id) {
                    session.release_form();
                }
                true
            }
            None => false,
        }
    }

    /// Consulta una vez el estado de un trabajo existente y pinta su informe
    /// si ya terminó.
    pub async fn load_request(&self, request_id: &str, token: Option<&str>) -> Result<StatusResponse, ClientError> {
        self.abort_poll();
        let generation = lock_session(&self.session).begin_submission();

        let result = self.backend.status(request_id, token).await;

        let mut session = lock_session(&self.session);
        if !session.is_current_submission(generation) {
            debug!(%request_id, "discarding superseded request load");
            return result;
        }
        let status = match result {
            Ok(status) => status,
            Err(err) => {
                warn!(%request_id, error = %err, "could not load request");
                session.reject(&SubmitError::Backend(status_error(err.clone())));
                return Err(err);
            }
        };

        session.render_status(&status);
        match (status.status, status.report.clone()) {
            (JobStatus::Completed, Some(report)) => {
                info!(%request_id, "loaded completed request");
                session.show_report(report, None);
            }
            (JobStatus::Failed, _) => session.finish_failed(),
            _ => session.release_form(),
        }
        Ok(status)
    }

    /// Carga un informe de demo desde disco.
    pub async fn load_demo(&self, demo: DemoReport) -> anyhow::Result<()> {
        let loaded = demo.load(&self.demo_dir).await;
        self.abort_poll();
        match loaded {
            Ok(report) => {
                info!(demo = demo.slug(), "loaded demo report");
                let mut session = lock_session(&self.session);
                session.begin_submission();
                session.show_report(report, Some(CurrentConfig::new(demo.theme(), demo.universe(), true)));
                Ok(())
            }
            Err(err) => {
                error!(demo = demo.slug(), error = %err, "demo report unavailable");
                let mut session = lock_session(&self.session);
                session.release_form();
                session.fail(&format!("{err:#}"));
                Err(err)
            }
        }
    }
}

impl Drop for SubmissionController {
    fn drop(&mut self) {
        self.abort_poll();
    }
}

/// Los errores HTTP del sondeo se muestran con su propio prefijo.
fn status_error(err: ClientError) -> ClientError {
    match err {
        ClientError::Http(code) => ClientError::Transport(format!("Status HTTP error {code}")),
        other => other,
    }
}

/// Bucle de sondeo: primer tick inmediato, después cada `interval`.
async fn poll_job(
    backend: Arc<dyn ScreenerBackend>,
    session: SharedSession,
    request_id: String,
    token: Option<String>,
    config: Option<CurrentConfig>,
    interval: Duration,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        let result = backend.status(&request_id, token.as_deref()).await;

        let mut session = lock_session(&session);
        if !session.is_active(&request_id) {
            debug!(%request_id, "discarding stale poll tick");
            return;
        }

        match result {
            Ok(status) => {
                session.render_status(&status);
                match status.status {
                    JobStatus::Completed => {
                        info!(%request_id, "screener job completed");
                        session.show_report(status.report.unwrap_or_default(), config);
                        return;
                    }
                    JobStatus::Failed => {
                        warn!(%request_id, "screener job failed");
                        session.finish_failed();
                        return;
                    }
                    JobStatus::Pending | JobStatus::Running => {
                        debug!(%request_id, status = ?status.status, "job still in progress");
                    }
                }
            }
            Err(err) => {
                let err = status_error(err);
                warn!(%request_id, error = %err, "status poll failed, retrying next tick");
                session.show_status_error(&err.to_string());
            }
        }
    }
}
